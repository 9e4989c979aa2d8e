//! Shortest-path engine over the street graph.

pub mod dijkstra;

pub use dijkstra::{
    orient_path_edges, reconstruct_edges, shortest_path_tree, DijkstraCache, DijkstraResult,
    ShortestPath, TraversalStep,
};
