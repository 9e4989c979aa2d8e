//! Undirected street multigraph over petgraph.
//!
//! Nodes are segment endpoints, edges carry one street segment each with
//! its full polyline geometry. Parallel edges between the same pair of
//! nodes are permitted; completed segments become edges too, completion
//! only matters to the planner. Node and edge indices are
//! insertion-ordered, which makes every enumeration in the planner
//! deterministic for a given candidate list.

use geo::{Coord, Point};
use hashbrown::HashMap;
use ordered_float::OrderedFloat;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::components::{StreetEdge, StreetNode};
use crate::geometry::{haversine_km, polyline_distance_km};
use crate::model::StreetSegment;
use crate::NodeId;

/// Street network as an undirected multigraph.
#[derive(Debug, Default, Clone)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    node_ids: HashMap<NodeId, NodeIndex>,
}

impl StreetGraph {
    /// Builds the graph from candidate segments.
    ///
    /// Every segment with at least 2 path points becomes an edge; both
    /// endpoint nodes are registered (created on first sight) and the
    /// edge is oriented start node -> end node, matching the segment
    /// polyline direction.
    pub fn from_segments(segments: &[StreetSegment]) -> Self {
        let mut streets = Self::default();

        for segment in segments {
            let Some((start_id, end_id)) = segment.node_ids() else {
                continue;
            };
            let Some((start_point, end_point)) = segment.endpoints() else {
                continue;
            };

            let from = streets.ensure_node(&start_id, start_point);
            let to = streets.ensure_node(&end_id, end_point);

            streets.graph.add_edge(
                from,
                to,
                StreetEdge {
                    street_id: segment.id.clone(),
                    street_name: segment.name.clone(),
                    geometry: segment.path.clone(),
                    distance_km: polyline_distance_km(&segment.path.0),
                    completed: segment.completed,
                },
            );
        }

        streets
    }

    fn ensure_node(&mut self, id: &str, point: Coord<f64>) -> NodeIndex {
        if let Some(&idx) = self.node_ids.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(StreetNode {
            id: id.to_owned(),
            geometry: Point::from(point),
        });
        self.node_ids.insert(id.to_owned(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> &StreetNode {
        &self.graph[idx]
    }

    pub fn edge(&self, idx: EdgeIndex) -> &StreetEdge {
        &self.graph[idx]
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_ids.get(id).copied()
    }

    /// Both endpoints of an edge, in segment polyline order.
    pub fn edge_endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph
            .edge_endpoints(edge)
            .expect("edge index from this graph")
    }

    /// The endpoint of `edge` that is not `node`. For self-loops this is
    /// `node` itself.
    pub fn other_endpoint(&self, edge: EdgeIndex, node: NodeIndex) -> NodeIndex {
        let (a, b) = self.edge_endpoints(edge);
        if a == node {
            b
        } else {
            a
        }
    }

    /// Incident edges with their far endpoints, in a deterministic order.
    pub fn incident_edges(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        self.graph
            .edges(node)
            .map(|edge| (edge.id(), self.other_endpoint(edge.id(), node)))
            .collect()
    }

    /// Graph-theoretic degree of a node; self-loops count twice.
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph
            .edges(node)
            .map(|edge| {
                if edge.source() == edge.target() {
                    2
                } else {
                    1
                }
            })
            .sum()
    }

    /// Node closest to a position by haversine distance.
    ///
    /// Scans every node; candidate graphs stay small enough that no
    /// spatial index is warranted. Ties resolve to the earliest node.
    pub fn nearest_node(&self, position: Point<f64>) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .min_by_key(|&idx| OrderedFloat(haversine_km(position, self.graph[idx].geometry)))
    }

    /// Edge polyline as traversed when entering from `from`.
    ///
    /// The stored geometry runs start node -> end node; entering from the
    /// end node yields the reversed point order.
    pub fn oriented_edge_coords(&self, edge: EdgeIndex, from: NodeIndex) -> Vec<Coord<f64>> {
        let (start, _) = self.edge_endpoints(edge);
        let coords = &self.graph[edge].geometry.0;
        if from == start {
            coords.clone()
        } else {
            coords.iter().rev().copied().collect()
        }
    }
}
