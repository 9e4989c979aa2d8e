//! Dijkstra shortest paths with predecessor chains and a source-keyed
//! memo scoped to one planning request.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use ordered_float::OrderedFloat;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::StreetGraph;

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: OrderedFloat<f64>,
    node: NodeIndex,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path tree from one source node.
///
/// Unreachable nodes have no `dist` entry (treated as infinity) and no
/// predecessor.
#[derive(Debug, Clone, Default)]
pub struct DijkstraResult {
    pub dist: HashMap<NodeIndex, f64>,
    /// node -> (predecessor node, edge used to reach it)
    pub prev: HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
}

impl DijkstraResult {
    pub fn distance_km(&self, node: NodeIndex) -> f64 {
        self.dist.get(&node).copied().unwrap_or(f64::INFINITY)
    }
}

/// Runs Dijkstra over the whole component reachable from `source`.
pub fn shortest_path_tree(streets: &StreetGraph, source: NodeIndex) -> DijkstraResult {
    let estimated = streets.node_count().min(1000);
    let mut dist: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated);
    let mut prev: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::with_capacity(estimated);
    let mut heap = BinaryHeap::with_capacity(estimated / 4 + 1);

    dist.insert(source, 0.0);
    heap.push(State {
        cost: OrderedFloat(0.0),
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if let Some(&best) = dist.get(&node) {
            if cost.0 > best {
                continue;
            }
        }

        for edge in streets.graph.edges(node) {
            let next = streets.other_endpoint(edge.id(), node);
            let next_cost = cost.0 + edge.weight().distance_km;

            let better = dist.get(&next).is_none_or(|&known| next_cost < known);
            if better {
                dist.insert(next, next_cost);
                prev.insert(next, (node, edge.id()));
                heap.push(State {
                    cost: OrderedFloat(next_cost),
                    node: next,
                });
            }
        }
    }

    DijkstraResult { dist, prev }
}

/// Walks the predecessor chain from `target` back to `source`.
///
/// Returns the edges in travel order, or an empty list when the chain is
/// broken (target unreachable).
pub fn reconstruct_edges(
    result: &DijkstraResult,
    source: NodeIndex,
    target: NodeIndex,
) -> Vec<EdgeIndex> {
    let mut edges = Vec::new();
    let mut current = target;
    while current != source {
        let Some(&(predecessor, edge)) = result.prev.get(&current) else {
            return Vec::new();
        };
        edges.push(edge);
        current = predecessor;
    }
    edges.reverse();
    edges
}

/// Shortest path between two nodes as an edge list.
#[derive(Debug, Clone)]
pub struct ShortestPath {
    pub distance_km: f64,
    pub edges: Vec<EdgeIndex>,
}

/// Source-keyed Dijkstra memo, owned by one planning request.
#[derive(Debug, Default)]
pub struct DijkstraCache {
    results: HashMap<NodeIndex, DijkstraResult>,
}

impl DijkstraCache {
    /// The shortest-path tree from `source`, computed once per source.
    pub fn tree(&mut self, streets: &StreetGraph, source: NodeIndex) -> &DijkstraResult {
        self.results
            .entry(source)
            .or_insert_with(|| shortest_path_tree(streets, source))
    }

    /// Cache lookup plus path reconstruction. Unreachable targets yield
    /// infinite distance and no edges.
    pub fn shortest_path_edges(
        &mut self,
        streets: &StreetGraph,
        from: NodeIndex,
        to: NodeIndex,
    ) -> ShortestPath {
        let tree = self.tree(streets, from);
        let distance_km = tree.distance_km(to);
        if distance_km.is_infinite() {
            return ShortestPath {
                distance_km,
                edges: Vec::new(),
            };
        }
        ShortestPath {
            distance_km,
            edges: reconstruct_edges(tree, from, to),
        }
    }
}

/// One oriented edge traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStep {
    pub edge: EdgeIndex,
    pub from: NodeIndex,
    pub to: NodeIndex,
}

/// Orients an undirected edge list starting at `start` so consecutive
/// steps chain (`step[i].to == step[i+1].from`). Returns `None` when the
/// edges cannot be chained in the given order.
pub fn orient_path_edges(
    streets: &StreetGraph,
    start: NodeIndex,
    edges: &[EdgeIndex],
) -> Option<Vec<TraversalStep>> {
    let mut steps = Vec::with_capacity(edges.len());
    let mut current = start;

    for &edge in edges {
        let (a, b) = streets.edge_endpoints(edge);
        let to = if a == current {
            b
        } else if b == current {
            a
        } else {
            return None;
        };
        steps.push(TraversalStep {
            edge,
            from: current,
            to,
        });
        current = to;
    }
    Some(steps)
}
