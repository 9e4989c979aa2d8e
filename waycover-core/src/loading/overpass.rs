//! Overpass payload model and query construction.
//!
//! The payload parser is deliberately tolerant: elements that do not
//! carry the fields we need are skipped, never raised on.

use serde::Deserialize;

use crate::model::CityBounds;

/// Endpoint failover pool, tried sequentially per query.
pub const OVERPASS_ENDPOINTS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://lz4.overpass-api.de/api/interpreter",
];

/// Raw Overpass JSON payload.
#[derive(Debug, Default, Deserialize)]
pub struct OverpassPayload {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One Overpass element; anything but nodes and ways is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Node {
        id: i64,
        #[serde(default)]
        lat: Option<f64>,
        #[serde(default)]
        lon: Option<f64>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: WayTags,
    },
    #[serde(other)]
    Other,
}

/// The way tags the runnability filter consults.
#[derive(Debug, Default, Deserialize)]
pub struct WayTags {
    #[serde(default)]
    pub highway: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub foot: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Area query: resolves the city by administrative boundary name.
pub fn area_query(city: &str) -> String {
    let city = sanitize_query_value(city);
    format!(
        "[out:json][timeout:120];\n\
         (area[\"name\"=\"{city}\"][\"boundary\"=\"administrative\"][\"admin_level\"~\"5|6|7|8|9\"];\n \
         relation[\"name\"=\"{city}\"][\"boundary\"=\"administrative\"];)->.searchArea;\n\
         (way[\"highway\"](area.searchArea););\n\
         out body; >; out skel qt;"
    )
}

/// BBox query over the resolved city bounds.
pub fn bbox_query(bounds: &CityBounds) -> String {
    format!(
        "[out:json][timeout:120];\n\
         (way[\"highway\"]({},{},{},{}););\n\
         out body; >; out skel qt;",
        bounds.south, bounds.west, bounds.north, bounds.east
    )
}

/// Around query centered on the bounds midpoint.
///
/// Radius is `clamp(5, 24, diagonalKm * 0.32)` km, rounded up to meters.
pub fn around_query(bounds: &CityBounds) -> String {
    let radius_km = (bounds.diagonal_km() * 0.32).clamp(5.0, 24.0);
    let radius_m = (radius_km * 1000.0).ceil() as i64;
    let center = bounds.center();
    format!(
        "[out:json][timeout:120];\n\
         (way[\"highway\"](around:{radius_m},{},{}););\n\
         out body; >; out skel qt;",
        center.y, center.x
    )
}

/// City-name variants tried against Nominatim and the area query:
/// raw, first comma token, first two tokens, raw + ", USA".
pub fn city_name_variants(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let tokens: Vec<&str> = raw.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();

    let mut variants = Vec::new();
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    push(raw.to_owned());
    if let Some(first) = tokens.first() {
        push((*first).to_owned());
    }
    if tokens.len() >= 2 {
        push(format!("{}, {}", tokens[0], tokens[1]));
    }
    push(format!("{raw}, USA"));

    variants
}

fn sanitize_query_value(value: &str) -> String {
    value.trim().replace(['"', '\\'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parsing_skips_unknown_elements() {
        let raw = r#"{
            "elements": [
                {"type": "node", "id": 1, "lat": 42.0, "lon": -71.0},
                {"type": "node", "id": 2},
                {"type": "relation", "id": 3, "members": []},
                {"type": "way", "id": 4, "nodes": [1, 2], "tags": {"highway": "residential", "name": "Elm Street"}},
                {"type": "way", "id": 5}
            ]
        }"#;
        let payload: OverpassPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.elements.len(), 5);
        assert!(matches!(payload.elements[2], OverpassElement::Other));
        match &payload.elements[3] {
            OverpassElement::Way { id, nodes, tags } => {
                assert_eq!(*id, 4);
                assert_eq!(nodes, &[1, 2]);
                assert_eq!(tags.highway.as_deref(), Some("residential"));
            }
            other => panic!("expected way, got {other:?}"),
        }
    }

    #[test]
    fn area_query_names_the_city_and_strips_quotes() {
        let query = area_query("Spring\"field");
        assert!(query.contains("area[\"name\"=\"Springfield\"]"));
        assert!(query.contains("admin_level"));
        assert!(query.contains("out skel qt;"));
    }

    #[test]
    fn bbox_query_orders_coordinates_south_west_north_east() {
        let bounds = CityBounds {
            south: 42.3,
            west: -71.2,
            north: 42.4,
            east: -71.0,
        };
        assert!(bbox_query(&bounds).contains("(42.3,-71.2,42.4,-71)"));
    }

    #[test]
    fn around_query_radius_is_clamped() {
        let tiny = CityBounds {
            south: 42.30,
            west: -71.01,
            north: 42.31,
            east: -71.0,
        };
        // Diagonal under 2 km, so the 5 km floor applies.
        assert!(around_query(&tiny).contains("around:5000,"));
    }

    #[test]
    fn city_variants_cover_the_comma_matrix() {
        let variants = city_name_variants("Cambridge, MA, USA");
        assert_eq!(
            variants,
            vec![
                "Cambridge, MA, USA".to_owned(),
                "Cambridge".to_owned(),
                "Cambridge, MA".to_owned(),
                "Cambridge, MA, USA, USA".to_owned(),
            ]
        );

        let simple = city_name_variants("Boston");
        assert_eq!(simple, vec!["Boston".to_owned(), "Boston, USA".to_owned()]);
    }
}
