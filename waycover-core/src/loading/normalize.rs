//! Turns a raw Overpass payload into a normalized street segment list:
//! runnability filtering, way splitting at shared nodes and
//! deduplication.

use geo::{Coord, LineString};
use hashbrown::{HashMap, HashSet};
use log::debug;

use super::overpass::{OverpassElement, OverpassPayload, WayTags};
use crate::model::{SegmentSource, StreetSegment};

/// Highway classes that count as runnable city streets.
const RUNNABLE_HIGHWAYS: [&str; 6] = [
    "residential",
    "unclassified",
    "tertiary",
    "secondary",
    "primary",
    "living_street",
];

struct RetainedWay {
    id: i64,
    nodes: Vec<i64>,
    name: String,
}

/// Normalizes an Overpass payload into street segments.
///
/// Ways are filtered to runnable named streets, split at every node
/// shared with another retained way, and deduplicated by normalized name
/// and endpoint pair.
pub fn segments_from_overpass(payload: &OverpassPayload) -> Vec<StreetSegment> {
    // Step 1: node coordinate map.
    let mut coords: HashMap<i64, Coord<f64>> = HashMap::new();
    for element in &payload.elements {
        if let OverpassElement::Node {
            id,
            lat: Some(lat),
            lon: Some(lon),
        } = element
        {
            coords.insert(*id, Coord { x: *lon, y: *lat });
        }
    }

    // Step 2: runnable named ways.
    let mut ways = Vec::new();
    for element in &payload.elements {
        if let OverpassElement::Way { id, nodes, tags } = element {
            if nodes.len() < 2 {
                continue;
            }
            let Some(name) = runnable_street_name(tags) else {
                continue;
            };
            ways.push(RetainedWay {
                id: *id,
                nodes: nodes.clone(),
                name,
            });
        }
    }

    // Step 3: split every way at its endpoints and at interior nodes used
    // by at least one other retained way.
    let mut usage: HashMap<i64, u32> = HashMap::new();
    for way in &ways {
        for node in &way.nodes {
            *usage.entry(*node).or_insert(0) += 1;
        }
    }

    let mut segments = Vec::new();
    for way in &ways {
        segments.extend(split_way(way, &usage, &coords));
    }

    if segments.is_empty() && !ways.is_empty() {
        debug!("way splitting produced nothing; falling back to whole ways");
        for way in &ways {
            if let Some(segment) =
                segment_from_nodes(&way.nodes, &coords, format!("osm-{}", way.id), &way.name)
            {
                segments.push(segment);
            }
        }
    }

    // Step 4: dedupe.
    dedupe_segments(segments)
}

/// The trimmed street name, if the way passes the runnability filter.
fn runnable_street_name(tags: &WayTags) -> Option<String> {
    let highway = tags.highway.as_deref()?;
    if !RUNNABLE_HIGHWAYS.contains(&highway) {
        return None;
    }
    if is_denied(tags.access.as_deref()) || is_denied(tags.foot.as_deref()) {
        return None;
    }
    if tags.area.as_deref() == Some("yes") {
        return None;
    }

    let name = tags.name.as_deref().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }
    let lowered = name.to_lowercase();
    if lowered == "unnamed road" || lowered == "unnamed street" {
        return None;
    }
    Some(name.to_owned())
}

fn is_denied(value: Option<&str>) -> bool {
    matches!(value, Some("private") | Some("no"))
}

fn split_way(
    way: &RetainedWay,
    usage: &HashMap<i64, u32>,
    coords: &HashMap<i64, Coord<f64>>,
) -> Vec<StreetSegment> {
    let last = way.nodes.len() - 1;
    let mut cuts = vec![0];
    for (idx, node) in way.nodes.iter().enumerate().take(last).skip(1) {
        if usage.get(node).copied().unwrap_or(0) >= 2 {
            cuts.push(idx);
        }
    }
    cuts.push(last);

    let mut segments = Vec::new();
    for (piece, window) in cuts.windows(2).enumerate() {
        let (from, to) = (window[0], window[1]);
        let nodes = &way.nodes[from..=to];
        let id = format!(
            "osm-{}-{}-{}-{}",
            way.id,
            nodes[0],
            nodes[nodes.len() - 1],
            piece
        );
        if let Some(segment) = segment_from_nodes(nodes, coords, id, &way.name) {
            segments.push(segment);
        }
    }
    segments
}

/// Builds one segment over a node run. Interior nodes without
/// coordinates are skipped; an unresolvable endpoint drops the segment.
fn segment_from_nodes(
    nodes: &[i64],
    coords: &HashMap<i64, Coord<f64>>,
    id: String,
    name: &str,
) -> Option<StreetSegment> {
    let first = *nodes.first()?;
    let last = *nodes.last()?;
    if !coords.contains_key(&first) || !coords.contains_key(&last) {
        return None;
    }

    let path: Vec<Coord<f64>> = nodes.iter().filter_map(|n| coords.get(n).copied()).collect();
    if path.len() < 2 {
        return None;
    }

    Some(StreetSegment {
        id,
        name: name.to_owned(),
        path: LineString::new(path),
        start_node_id: Some(format!("osm-node-{first}")),
        end_node_id: Some(format!("osm-node-{last}")),
        completed: false,
        source: SegmentSource::Osm,
    })
}

/// Drops later segments that repeat an earlier one's normalized name and
/// unordered endpoint pair. Idempotent.
pub fn dedupe_segments(segments: Vec<StreetSegment>) -> Vec<StreetSegment> {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(segments.len());

    for segment in segments {
        let Some((start, end)) = segment.node_ids() else {
            continue;
        };
        let (low, high) = if start <= end { (start, end) } else { (end, start) };
        let key = (normalize_street_name(&segment.name), low, high);
        if seen.insert(key) {
            kept.push(segment);
        }
    }
    kept
}

/// Lowercases, trims, strips periods and collapses whitespace.
pub fn normalize_street_name(name: &str) -> String {
    name.to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn node(id: i64, lat: f64, lon: f64) -> OverpassElement {
        OverpassElement::Node {
            id,
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    fn way(id: i64, nodes: Vec<i64>, name: &str) -> OverpassElement {
        OverpassElement::Way {
            id,
            nodes,
            tags: WayTags {
                highway: Some("residential".into()),
                name: Some(name.into()),
                ..WayTags::default()
            },
        }
    }

    #[test]
    fn shared_interior_node_splits_the_way() {
        let payload = OverpassPayload {
            elements: vec![
                node(1, 0.0, 0.0),
                node(2, 0.001, 0.0),
                node(3, 0.002, 0.0),
                node(4, 0.001, 0.001),
                way(10, vec![1, 2, 3], "Elm Street"),
                way(11, vec![2, 4], "Oak Avenue"),
            ],
        };
        let segments = segments_from_overpass(&payload);
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["osm-10-1-2-0", "osm-10-2-3-1", "osm-11-2-4-0"]);

        assert_eq!(segments[0].start_node_id.as_deref(), Some("osm-node-1"));
        assert_eq!(segments[0].end_node_id.as_deref(), Some("osm-node-2"));
        assert_eq!(segments[1].start_node_id.as_deref(), Some("osm-node-2"));
        assert_eq!(segments[1].end_node_id.as_deref(), Some("osm-node-3"));
    }

    #[test]
    fn single_way_stays_whole() {
        let payload = OverpassPayload {
            elements: vec![
                node(1, 0.0, 0.0),
                node(2, 0.001, 0.0),
                node(3, 0.002, 0.0),
                way(10, vec![1, 2, 3], "Elm Street"),
            ],
        };
        let segments = segments_from_overpass(&payload);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "osm-10-1-3-0");
        assert_eq!(segments[0].path.0.len(), 3);
    }

    #[test]
    fn runnability_filter_rejects_unsuitable_ways() {
        let reject = [
            WayTags {
                highway: Some("service".into()),
                name: Some("Back Alley".into()),
                ..WayTags::default()
            },
            WayTags {
                highway: Some("residential".into()),
                access: Some("private".into()),
                name: Some("Gated Lane".into()),
                ..WayTags::default()
            },
            WayTags {
                highway: Some("residential".into()),
                foot: Some("no".into()),
                name: Some("No Walking Way".into()),
                ..WayTags::default()
            },
            WayTags {
                highway: Some("residential".into()),
                area: Some("yes".into()),
                name: Some("Parking Lot".into()),
                ..WayTags::default()
            },
            WayTags {
                highway: Some("residential".into()),
                name: Some("   ".into()),
                ..WayTags::default()
            },
            WayTags {
                highway: Some("residential".into()),
                name: Some("Unnamed Road".into()),
                ..WayTags::default()
            },
        ];
        for tags in reject {
            assert!(runnable_street_name(&tags).is_none(), "{tags:?}");
        }

        let keep = WayTags {
            highway: Some("living_street".into()),
            name: Some(" Maple Court ".into()),
            ..WayTags::default()
        };
        assert_eq!(runnable_street_name(&keep).as_deref(), Some("Maple Court"));
    }

    #[test]
    fn dedupe_drops_second_occurrence_across_sources() {
        let osm = StreetSegment {
            id: "osm-1".into(),
            name: "Main St.".into(),
            path: line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
            start_node_id: Some("osm-node-5".into()),
            end_node_id: Some("osm-node-9".into()),
            completed: false,
            source: SegmentSource::Osm,
        };
        let manual = StreetSegment {
            id: "manual-1".into(),
            name: "  main st".into(),
            path: line_string![(x: 0.001, y: 0.0), (x: 0.0, y: 0.0)],
            // Reversed endpoint order; the unordered pair still matches.
            start_node_id: Some("osm-node-9".into()),
            end_node_id: Some("osm-node-5".into()),
            completed: false,
            source: SegmentSource::Manual,
        };
        let kept = dedupe_segments(vec![osm, manual]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "osm-1");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let make = |id: &str, name: &str, from: &str, to: &str| StreetSegment {
            id: id.into(),
            name: name.into(),
            path: line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
            start_node_id: Some(from.into()),
            end_node_id: Some(to.into()),
            completed: false,
            source: SegmentSource::Osm,
        };
        let segments = vec![
            make("a", "Elm Street", "osm-node-1", "osm-node-2"),
            make("b", "elm street", "osm-node-2", "osm-node-1"),
            make("c", "Elm Street", "osm-node-2", "osm-node-3"),
        ];
        let once = dedupe_segments(segments);
        let once_ids: Vec<String> = once.iter().map(|s| s.id.clone()).collect();
        let twice = dedupe_segments(once);
        let twice_ids: Vec<String> = twice.iter().map(|s| s.id.clone()).collect();
        assert_eq!(once_ids, vec!["a", "c"]);
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn street_name_normalization_is_a_fixed_point() {
        let normalized = normalize_street_name("  Main   St.  ");
        assert_eq!(normalized, "main st");
        assert_eq!(normalize_street_name(&normalized), normalized);
    }
}
