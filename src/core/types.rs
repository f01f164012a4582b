//! Core data types for the tracker

use serde::{Deserialize, Serialize};

/// A position sample in geodetic degrees (WGS-84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another position in meters
    pub fn distance_to(&self, other: &Position) -> f64 {
        crate::algorithms::haversine::haversine_distance(self, other)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
