//! Location source abstraction layer
//!
//! This module hides the platform location service behind the
//! [`LocationSource`] trait. Sources deliver [`SourceUpdate`]s through an
//! [`UpdateSender`], which may be used from any thread.

pub mod source;
pub mod mock;
pub mod replay;
pub mod platform;
pub mod error;

pub use source::{LocationSource, SourceConfig};
pub use mock::MockLocationSource;
pub use replay::ReplaySource;
pub use platform::PlatformLocationSource;
pub use error::{SourceError, SourceResult};

use crate::core::Position;
use std::sync::mpsc::{self, Receiver, Sender};

/// Update delivered by a location source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceUpdate {
    /// New position fix
    Location(Position),
    /// Several fixes delivered at once; only the first one is used
    Batch(Vec<Position>),
    /// Provider status change, e.g. `provider-enabled` / `provider-disabled`
    Status { kind: String, status: String },
    /// A finite source has nothing more to deliver
    Ended,
}

impl SourceUpdate {
    pub fn location(lat: f64, lon: f64) -> Self {
        SourceUpdate::Location(Position::new(lat, lon))
    }

    pub fn status(kind: impl Into<String>, status: impl Into<String>) -> Self {
        SourceUpdate::Status {
            kind: kind.into(),
            status: status.into(),
        }
    }
}

/// Sending half of the update channel handed to a source
#[derive(Debug, Clone)]
pub struct UpdateSender {
    inner: Sender<SourceUpdate>,
}

impl UpdateSender {
    pub fn send(&self, update: SourceUpdate) -> SourceResult<()> {
        self.inner.send(update).map_err(|_| SourceError::ChannelClosed)
    }

    pub fn send_location(&self, position: Position) -> SourceResult<()> {
        self.send(SourceUpdate::Location(position))
    }
}

/// Create a connected sender/receiver pair for source updates
pub fn update_channel() -> (UpdateSender, Receiver<SourceUpdate>) {
    let (tx, rx) = mpsc::channel();
    (UpdateSender { inner: tx }, rx)
}
