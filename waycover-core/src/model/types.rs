//! Normalized street dataset types produced by the loaders.

use geo::{Coord, LineString, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::geometry::haversine_coord_km;
use crate::NodeId;

/// Where a street segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentSource {
    Osm,
    Manual,
}

/// One runnable piece of a street.
///
/// Segments are produced once per dataset load and are immutable
/// afterwards except for `completed` toggling. `path[0]` and `path[last]`
/// correspond to the start and end node ids respectively.
#[derive(Debug, Clone)]
pub struct StreetSegment {
    pub id: String,
    pub name: String,
    /// Ordered polyline geometry, at least 2 points.
    pub path: LineString<f64>,
    pub start_node_id: Option<NodeId>,
    pub end_node_id: Option<NodeId>,
    pub completed: bool,
    pub source: SegmentSource,
}

impl StreetSegment {
    /// First and last polyline points, when the path is non-degenerate.
    pub fn endpoints(&self) -> Option<(Coord<f64>, Coord<f64>)> {
        if self.path.0.len() < 2 {
            return None;
        }
        Some((self.path.0[0], *self.path.0.last()?))
    }

    /// Graph node ids of both endpoints: the explicit OSM-derived ids when
    /// present, otherwise ids quantized from the endpoint coordinates.
    pub fn node_ids(&self) -> Option<(NodeId, NodeId)> {
        let (start, end) = self.endpoints()?;
        let start_id = self
            .start_node_id
            .clone()
            .unwrap_or_else(|| quantized_node_id(start));
        let end_id = self
            .end_node_id
            .clone()
            .unwrap_or_else(|| quantized_node_id(end));
        Some((start_id, end_id))
    }
}

/// Node id derived from a coordinate, quantized to 5 decimal places.
pub fn quantized_node_id(c: Coord<f64>) -> NodeId {
    format!("{:.5},{:.5}", c.y, c.x)
}

/// Axis-aligned city bounding box. Invariant: `south < north`, `west < east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl CityBounds {
    pub fn mid_lat(&self) -> f64 {
        (self.south + self.north) * 0.5
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.west + self.east) * 0.5,
            y: self.mid_lat(),
        }
    }

    /// Corner-to-corner extent in kilometers.
    pub fn diagonal_km(&self) -> f64 {
        haversine_coord_km(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    pub fn contains(&self, c: Coord<f64>) -> bool {
        c.y >= self.south && c.y <= self.north && c.x >= self.west && c.x <= self.east
    }
}

/// Polygonal city boundary (outer rings with optional holes).
///
/// When present, it overrides bounding-box containment during dataset
/// normalization.
#[derive(Debug, Clone)]
pub struct CityBoundary(pub MultiPolygon<f64>);
