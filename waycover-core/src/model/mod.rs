//! Data model for street-coverage planning
//!
//! Contains the normalized street dataset types and the street graph.

pub mod streets;
pub mod types;

pub use streets::{StreetEdge, StreetGraph, StreetNode};
pub use types::{CityBoundary, CityBounds, SegmentSource, StreetSegment};
