//! Eulerization of a selected edge set and Hierholzer traversal.
//!
//! Duplicating the shortest path between pairs of odd-degree vertices
//! makes the multiset Eulerian; the resulting closed or open trail walks
//! every token exactly once.

use hashbrown::HashMap;
use log::warn;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::model::StreetGraph;
use crate::routing::{reconstruct_edges, DijkstraCache, TraversalStep};

/// Edge multiplicities of an Eulerized edge set.
pub type EdgeMultiset = HashMap<EdgeIndex, u32>;

/// Makes the selected edge set Eulerian.
///
/// Starts from multiplicity 1 per edge, then repeatedly pops the first
/// odd-degree node, matches it with its closest odd partner by shortest
/// path and bumps the multiplicity of every path edge. Odd nodes with no
/// reachable partner are dropped with a warning.
pub fn eulerize(
    streets: &StreetGraph,
    selected: &[EdgeIndex],
    cache: &mut DijkstraCache,
) -> EdgeMultiset {
    let mut multiplicity: EdgeMultiset = EdgeMultiset::new();
    for &edge in selected {
        multiplicity.entry(edge).or_insert(1);
    }

    // Degree parity of the initial multiset; self-loops add 2.
    let mut degree: HashMap<NodeIndex, u32> = HashMap::new();
    for (&edge, &count) in &multiplicity {
        let (a, b) = streets.edge_endpoints(edge);
        *degree.entry(a).or_insert(0) += count;
        *degree.entry(b).or_insert(0) += count;
    }

    let mut odd: Vec<NodeIndex> = streets
        .graph
        .node_indices()
        .filter(|idx| degree.get(idx).copied().unwrap_or(0) % 2 == 1)
        .collect();

    while odd.len() >= 2 {
        let node = odd.remove(0);
        let tree = cache.tree(streets, node);

        let mut best: Option<(f64, NodeIndex)> = None;
        for &partner in &odd {
            let d = tree.distance_km(partner);
            if d.is_finite() && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, partner));
            }
        }

        let Some((_, partner)) = best else {
            warn!("odd-degree node {:?} has no reachable partner", node);
            continue;
        };

        let path = reconstruct_edges(tree, node, partner);
        for edge in path {
            *multiplicity.entry(edge).or_insert(0) += 1;
        }
        odd.retain(|&n| n != partner);
    }

    multiplicity
}

/// Hierholzer's algorithm over an edge multiset.
///
/// From `start`, consumes the next unused incident edge token at each
/// node; when stuck, pops back onto the trail. The returned steps chain
/// and use every reachable token exactly once.
pub fn hierholzer(
    streets: &StreetGraph,
    multiplicity: &EdgeMultiset,
    start: NodeIndex,
) -> Vec<TraversalStep> {
    let mut remaining = multiplicity.clone();
    let mut stack: Vec<(NodeIndex, Option<EdgeIndex>)> = vec![(start, None)];
    let mut popped = Vec::new();

    while let Some(&(node, _)) = stack.last() {
        let next = streets
            .incident_edges(node)
            .into_iter()
            .find(|(edge, _)| remaining.get(edge).copied().unwrap_or(0) > 0);

        match next {
            Some((edge, other)) => {
                if let Some(tokens) = remaining.get_mut(&edge) {
                    *tokens -= 1;
                }
                stack.push((other, Some(edge)));
            }
            None => {
                if let Some(entry) = stack.pop() {
                    popped.push(entry);
                }
            }
        }
    }

    // The trail is the reverse of the pop order; each entry's edge is
    // the one leading into it from its predecessor.
    let trail: Vec<(NodeIndex, Option<EdgeIndex>)> = popped.into_iter().rev().collect();
    let mut steps = Vec::with_capacity(trail.len().saturating_sub(1));
    for window in trail.windows(2) {
        let (from, _) = window[0];
        let (to, via) = window[1];
        if let Some(edge) = via {
            steps.push(TraversalStep { edge, from, to });
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SegmentSource, StreetSegment};
    use geo::{line_string, LineString};

    fn segment(id: &str, path: LineString<f64>) -> StreetSegment {
        StreetSegment {
            id: id.into(),
            name: format!("{id} street"),
            path,
            start_node_id: None,
            end_node_id: None,
            completed: false,
            source: SegmentSource::Manual,
        }
    }

    fn degrees(streets: &StreetGraph, multiset: &EdgeMultiset) -> HashMap<NodeIndex, u32> {
        let mut degree = HashMap::new();
        for (&edge, &count) in multiset {
            let (a, b) = streets.edge_endpoints(edge);
            *degree.entry(a).or_insert(0) += count;
            *degree.entry(b).or_insert(0) += count;
        }
        degree
    }

    #[test]
    fn path_graph_doubles_every_edge() {
        let streets = StreetGraph::from_segments(&[
            segment("w", line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)]),
            segment("e", line_string![(x: 0.001, y: 0.0), (x: 0.002, y: 0.0)]),
        ]);
        let selected: Vec<_> = streets.graph.edge_indices().collect();
        let mut cache = DijkstraCache::default();
        let multiset = eulerize(&streets, &selected, &mut cache);

        for degree in degrees(&streets, &multiset).values() {
            assert_eq!(degree % 2, 0);
        }
        assert_eq!(multiset.values().sum::<u32>(), 4);
    }

    #[test]
    fn square_with_spur_only_doubles_the_spur() {
        let streets = StreetGraph::from_segments(&[
            segment("s", line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)]),
            segment("e", line_string![(x: 0.001, y: 0.0), (x: 0.001, y: 0.001)]),
            segment("n", line_string![(x: 0.001, y: 0.001), (x: 0.0, y: 0.001)]),
            segment("w", line_string![(x: 0.0, y: 0.001), (x: 0.0, y: 0.0)]),
            segment("spur", line_string![(x: 0.0, y: 0.0), (x: -0.001, y: 0.0)]),
        ]);
        let selected: Vec<_> = streets.graph.edge_indices().collect();
        let mut cache = DijkstraCache::default();
        let multiset = eulerize(&streets, &selected, &mut cache);

        let spur_edge = streets
            .graph
            .edge_indices()
            .find(|&e| streets.edge(e).street_id == "spur")
            .unwrap();
        assert_eq!(multiset[&spur_edge], 2);
        assert_eq!(multiset.values().sum::<u32>(), 6);
        for degree in degrees(&streets, &multiset).values() {
            assert_eq!(degree % 2, 0);
        }
    }

    #[test]
    fn trail_chains_and_consumes_every_token() {
        let streets = StreetGraph::from_segments(&[
            segment("s", line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)]),
            segment("e", line_string![(x: 0.001, y: 0.0), (x: 0.001, y: 0.001)]),
            segment("n", line_string![(x: 0.001, y: 0.001), (x: 0.0, y: 0.001)]),
            segment("w", line_string![(x: 0.0, y: 0.001), (x: 0.0, y: 0.0)]),
            segment("spur", line_string![(x: 0.0, y: 0.0), (x: -0.001, y: 0.0)]),
        ]);
        let selected: Vec<_> = streets.graph.edge_indices().collect();
        let mut cache = DijkstraCache::default();
        let multiset = eulerize(&streets, &selected, &mut cache);

        let start = streets.node_index("0.00000,0.00000").unwrap();
        let steps = hierholzer(&streets, &multiset, start);

        assert_eq!(steps.len() as u32, multiset.values().sum::<u32>());
        assert_eq!(steps.first().unwrap().from, start);
        for pair in steps.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        // Closed trail: every node has even degree, so it returns home.
        assert_eq!(steps.last().unwrap().to, start);

        let mut used: EdgeMultiset = EdgeMultiset::new();
        for step in &steps {
            *used.entry(step.edge).or_insert(0) += 1;
        }
        assert_eq!(used, multiset);
    }
}
