//! Movement debounce filter
//!
//! Drops position samples that have not moved far enough from the last
//! accepted sample. The "last accepted" slot lives in [`MovementFilter`],
//! owned by whoever drives the update pipeline.

use crate::algorithms::haversine::haversine_distance;
use crate::core::{Position, DEFAULT_THRESHOLD_M};
use crate::utils::config::FilterConfig;
use tracing::trace;

/// Decide whether `candidate` moved at least `threshold_m` from `last`.
///
/// With no prior sample the candidate is always accepted.
pub fn should_accept(last: Option<&Position>, candidate: &Position, threshold_m: f64) -> bool {
    match last {
        None => true,
        Some(last) => haversine_distance(last, candidate) >= threshold_m,
    }
}

/// Outcome of offering a sample to the filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterDecision {
    /// Sample becomes the new last accepted sample.
    /// `distance_m` is `None` for the first sample.
    Accepted { distance_m: Option<f64> },
    /// Sample moved less than the threshold; last accepted sample unchanged
    Rejected { distance_m: f64 },
}

impl FilterDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FilterDecision::Accepted { .. })
    }

    pub fn distance_m(&self) -> Option<f64> {
        match *self {
            FilterDecision::Accepted { distance_m } => distance_m,
            FilterDecision::Rejected { distance_m } => Some(distance_m),
        }
    }
}

/// Stateful movement filter holding the last accepted sample
#[derive(Debug, Clone)]
pub struct MovementFilter {
    /// Minimum movement in meters; `None` forwards every sample
    threshold_m: Option<f64>,
    last: Option<Position>,
}

impl MovementFilter {
    /// Create a filter with the given threshold in meters
    pub fn new(threshold_m: f64) -> Self {
        Self {
            threshold_m: Some(threshold_m),
            last: None,
        }
    }

    /// Create a filter that accepts every sample but still tracks the last one
    pub fn disabled() -> Self {
        Self {
            threshold_m: None,
            last: None,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        if config.enabled {
            Self::new(config.threshold_m)
        } else {
            Self::disabled()
        }
    }

    /// Offer a candidate sample, updating the last accepted sample on acceptance
    pub fn offer(&mut self, candidate: Position) -> FilterDecision {
        let Some(last) = self.last else {
            self.last = Some(candidate);
            return FilterDecision::Accepted { distance_m: None };
        };

        let distance_m = haversine_distance(&last, &candidate);
        let accepted = match self.threshold_m {
            Some(threshold_m) => distance_m >= threshold_m,
            None => true,
        };

        trace!(distance_m, accepted, "movement filter decision");

        if accepted {
            self.last = Some(candidate);
            FilterDecision::Accepted {
                distance_m: Some(distance_m),
            }
        } else {
            FilterDecision::Rejected { distance_m }
        }
    }

    /// Last accepted sample, if any
    pub fn last(&self) -> Option<&Position> {
        self.last.as_ref()
    }

    pub fn threshold_m(&self) -> Option<f64> {
        self.threshold_m
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold_m.is_some()
    }

    /// Forget the last accepted sample; the next sample is accepted unconditionally
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for MovementFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_M)
    }
}
