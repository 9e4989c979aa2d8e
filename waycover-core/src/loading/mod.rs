//! Dataset ingest: Overpass/Nominatim payload models, street
//! normalization, city-boundary containment and activity imports.

pub mod boundary;
pub mod fetch;
pub mod import;
pub mod nominatim;
pub mod normalize;
pub mod overpass;

pub use fetch::{fetch_city_dataset, CityDataset};
pub use import::parse_activity_points;
pub use normalize::{dedupe_segments, normalize_street_name, segments_from_overpass};
