//! Geodesic distance algorithms

pub mod haversine;

pub use haversine::{haversine_distance, haversine_distance_with_radius};
