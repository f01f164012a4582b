//! Platform location service binding
//!
//! Desktop hosts have no location service this crate can bind to, so the
//! platform source reports itself unsupported. Mobile bindings implement
//! [`LocationSource`] in their own crates and plug into the tracker the same
//! way.

use crate::hardware::{LocationSource, SourceConfig, SourceError, SourceResult, UpdateSender};

/// Location source for the host platform
pub struct PlatformLocationSource {
    platform: String,
}

impl PlatformLocationSource {
    pub fn new() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
        }
    }

    fn unsupported(&self) -> SourceError {
        SourceError::Unsupported {
            platform: self.platform.clone(),
        }
    }
}

impl Default for PlatformLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for PlatformLocationSource {
    fn configure(&mut self, _config: &SourceConfig) -> SourceResult<()> {
        Err(self.unsupported())
    }

    fn start(&mut self, _sink: UpdateSender) -> SourceResult<()> {
        Err(self.unsupported())
    }

    fn stop(&mut self) -> SourceResult<()> {
        Err(SourceError::NotRunning {
            name: self.name().to_string(),
        })
    }

    fn is_running(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "platform"
    }
}
