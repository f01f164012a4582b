//! Tracker API
//!
//! This module wires a location source to a map display: the
//! [`LocationTracker`] orchestrator, the [`MapDisplay`] seam and the output
//! formatters.

pub mod types;
pub mod display;
pub mod formatting;
pub mod tracker;

// Re-export commonly used API types
pub use types::{OutputFormat, TrackerError, TrackerResult, TrackerState};
pub use display::{MapDisplay, MapState, TerminalDisplay};
pub use formatting::{
    CsvFormatter, FormattedPosition, JsonFormatter, LabelFormatter, PositionFormatter, TextFormatter,
};
pub use tracker::{CallbackHandle, EventCallback, LocationTracker, TrackerEvent};
