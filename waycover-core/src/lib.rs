//! Core engine for planning "run every street" coverage routes.
//!
//! Given a set of runnable street segments, a home location and a target
//! mileage, the planner produces one continuous route that maximises
//! coverage of uncompleted streets and intersection nodes within the
//! distance budget. The crate also carries the OSM dataset pipeline the
//! graph invariants depend on (way splitting, runnability filtering,
//! deduplication, city-boundary containment) and the GPX/AML exporters.

pub mod algo;
pub mod error;
pub mod export;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod planner;
pub mod prelude;
pub mod routing;

pub use error::Error;

/// Stable string identifier of a street-graph node.
///
/// OSM-sourced nodes use `osm-node-<raw>`; manually drawn segments derive
/// their node ids by quantizing endpoint coordinates to 5 decimal places.
pub type NodeId = String;

/// A node counts as covered when it lies within this distance (20 ft)
/// of the realised route polyline.
pub const NODE_CAPTURE_RADIUS_METERS: f64 = 6.096;

/// Consecutive edges whose join points differ by no more than this are
/// stitched seamlessly when the route polyline is assembled.
pub const SEAMLESS_JOIN_METERS: f64 = 18.0;
