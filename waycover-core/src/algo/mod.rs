//! Graph algorithms layered on the street model.

pub mod eulerize;

pub use eulerize::{eulerize, hierholzer};
