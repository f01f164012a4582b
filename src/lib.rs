//! GPS Position Tracker
//!
//! Follows the device position on a map: location updates from a platform
//! source pass through a haversine movement filter and, when accepted,
//! reposition the map marker and refresh the coordinates label.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use self::core::{Position, EARTH_RADIUS_M, DEFAULT_THRESHOLD_M};
pub use algorithms::haversine::haversine_distance;
pub use processing::debounce::{should_accept, FilterDecision, MovementFilter};
pub use validation::coordinates::{CoordinateValidator, ValidationError};
pub use hardware::{
    LocationSource, MockLocationSource, PlatformLocationSource, ReplaySource, SourceConfig,
    SourceError, SourceResult, SourceUpdate, UpdateSender,
};
pub use utils::config::{ConfigError, ConfigurationManager, FilterConfig, TrackerConfig};
pub use api::{
    LocationTracker, MapDisplay, MapState, OutputFormat, TerminalDisplay, TrackerError,
    TrackerEvent, TrackerResult, TrackerState,
};
