//! Great-circle distance between two position samples
//!
//! Uses the haversine formula on a spherical Earth. Accurate to roughly 0.5%
//! against the WGS-84 ellipsoid, which is well inside GPS noise for the
//! short hops the movement filter compares.

use crate::core::{Position, EARTH_RADIUS_M};

/// Surface distance between `a` and `b` in meters, using the mean Earth radius
pub fn haversine_distance(a: &Position, b: &Position) -> f64 {
    haversine_distance_with_radius(a, b, EARTH_RADIUS_M)
}

/// Surface distance between `a` and `b` on a sphere of the given radius
pub fn haversine_distance_with_radius(a: &Position, b: &Position, radius_m: f64) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let sin_half_phi = (delta_phi / 2.0).sin();
    let sin_half_lambda = (delta_lambda / 2.0).sin();

    let h = sin_half_phi * sin_half_phi
        + phi1.cos() * phi2.cos() * sin_half_lambda * sin_half_lambda;
    // Rounding can push h a hair past 1.0 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * radius_m * h.sqrt().atan2((1.0 - h).sqrt())
}
