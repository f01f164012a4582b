//! Location source trait and request parameters

use crate::core::{DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_TIME_MS, DEFAULT_START_DELAY_MS};
use crate::hardware::{SourceError, SourceResult, UpdateSender};
use serde::{Deserialize, Serialize};

/// Abstraction over a platform location service.
///
/// Implementations push [`SourceUpdate`](crate::hardware::SourceUpdate)s into
/// the sink handed to [`start`](LocationSource::start), from whatever thread
/// the platform delivers on. Arrival order is the only ordering guarantee and
/// delivery is best effort.
pub trait LocationSource: Send {
    /// Apply request parameters. Fails with [`SourceError::Unsupported`] when
    /// the platform has no location capability.
    fn configure(&mut self, config: &SourceConfig) -> SourceResult<()>;

    /// Begin delivering updates into `sink`
    fn start(&mut self, sink: UpdateSender) -> SourceResult<()>;

    /// Stop delivering updates
    fn stop(&mut self) -> SourceResult<()>;

    /// Check if the source is currently delivering updates
    fn is_running(&self) -> bool;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Parameters requested from the location service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Minimum interval between updates (milliseconds)
    pub min_time_ms: u32,
    /// Minimum movement between updates at the source (meters, 0 = every fix)
    pub min_distance_m: f64,
    /// Delay between tracker start and source start (milliseconds)
    pub start_delay_ms: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_time_ms: DEFAULT_MIN_TIME_MS,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            start_delay_ms: DEFAULT_START_DELAY_MS,
        }
    }
}

impl SourceConfig {
    /// Request parameters with no pacing and no start delay, for replays and tests
    pub fn immediate() -> Self {
        Self {
            min_time_ms: 0,
            min_distance_m: 0.0,
            start_delay_ms: 0,
        }
    }

    pub fn validate(&self) -> SourceResult<()> {
        if !self.min_distance_m.is_finite() || self.min_distance_m < 0.0 {
            return Err(SourceError::ConfigurationError {
                parameter: "min_distance_m".to_string(),
                value: self.min_distance_m.to_string(),
            });
        }
        Ok(())
    }
}
