// Re-export key components
pub use crate::algo::{eulerize, hierholzer};
pub use crate::export::{apple_maps_walking_url, google_maps_walking_url, write_aml, write_gpx};
pub use crate::loading::{fetch_city_dataset, parse_activity_points, CityDataset};
pub use crate::model::{CityBoundary, CityBounds, SegmentSource, StreetGraph, StreetSegment};
pub use crate::planner::{plan_coverage_route, plan_eulerian_route, SuggestedRoute};
pub use crate::routing::{DijkstraCache, TraversalStep};

// Core constants and aliases
pub use crate::Error;
pub use crate::NodeId;
pub use crate::{NODE_CAPTURE_RADIUS_METERS, SEAMLESS_JOIN_METERS};
