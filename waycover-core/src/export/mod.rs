//! Route serialization: GPX 1.1, the AML interchange document and
//! launch URLs for external map applications.

pub mod aml;
pub mod gpx;
pub mod links;
mod xml;

pub use aml::write_aml;
pub use gpx::write_gpx;
pub use links::{apple_maps_walking_url, google_maps_walking_url};
