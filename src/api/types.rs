//! Common API types and data structures

use crate::core::Position;
use crate::hardware::SourceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Tracker error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The platform has no location capability
    #[error("location unavailable: {reason}")]
    SourceUnavailable { reason: String },
    /// The user refused the location permission
    #[error("location permission denied: {reason}")]
    PermissionDenied { reason: String },
    /// Location source failure
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Operation requires a started tracker
    #[error("tracker not started")]
    NotStarted,
    /// Invalid request parameters
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Output format options for rendered positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable label line
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Comma-separated values with a header
    Csv,
}

/// Tracker state information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    /// `start` completed successfully
    pub started: bool,
    /// Location source was configured (false once reported unavailable)
    pub source_available: bool,
    /// Source started delivering (after the start delay)
    pub source_running: bool,
    /// A finite source reported the end of its stream
    pub source_ended: bool,
    /// Total updates drained from the source
    pub updates_received: u32,
    /// Positions that reached the display
    pub positions_accepted: u32,
    /// Positions dropped by the movement filter
    pub positions_rejected: u32,
    /// Positions dropped by coordinate validation
    pub invalid_samples: u32,
    /// Last position sent to the display
    pub last_accepted: Option<Position>,
    /// Last provider status as (kind, status)
    pub last_status: Option<(String, String)>,
    /// Time since the tracker was created (milliseconds)
    pub uptime_ms: u64,
}
