//! Street graph components - intersection nodes and segment edges

use geo::{LineString, Point};

use crate::NodeId;

/// Street graph node (a segment endpoint / intersection).
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// Stable string id (`osm-node-<raw>` or quantized coordinates)
    pub id: NodeId,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge, one per street segment.
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Id of the street segment this edge realises
    pub street_id: String,
    pub street_name: String,
    /// Full polyline geometry, oriented start node -> end node
    pub geometry: LineString<f64>,
    /// Polyline length by haversine summation
    pub distance_km: f64,
    /// Completion state of the underlying street; consulted only by the
    /// planner's reward function
    pub completed: bool,
}
