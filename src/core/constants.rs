//! Physical constants and default tracking parameters

/// Mean Earth radius used by the haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default minimum movement between accepted samples (meters)
pub const DEFAULT_THRESHOLD_M: f64 = 5.0;

/// Default minimum interval requested from the location service (milliseconds)
pub const DEFAULT_MIN_TIME_MS: u32 = 1000;

/// Default minimum distance requested from the location service (meters, 0 = unfiltered)
pub const DEFAULT_MIN_DISTANCE_M: f64 = 0.0;

/// Delay between tracker start and location service start (milliseconds)
pub const DEFAULT_START_DELAY_MS: u32 = 1000;
