//! Location source error types

use thiserror::Error;

/// Errors raised by location source implementations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// No location capability on this platform
    #[error("location service not supported on {platform}")]
    Unsupported { platform: String },
    /// The user refused the location permission
    #[error("location permission denied: {permission}")]
    PermissionDenied { permission: String },
    /// Source was started while already delivering updates
    #[error("location source '{name}' already running")]
    AlreadyRunning { name: String },
    /// Operation requires a running source
    #[error("location source '{name}' is not running")]
    NotRunning { name: String },
    /// Invalid request parameter
    #[error("invalid source configuration: {parameter} = {value}")]
    ConfigurationError { parameter: String, value: String },
    /// Receiving side of the update channel is gone
    #[error("update channel closed")]
    ChannelClosed,
    /// Backing file or device could not be read
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
    /// A sample line could not be decoded
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl SourceError {
    /// Whether the platform lacks a location capability altogether
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SourceError::Unsupported { .. })
    }

    /// Whether the source can never deliver on this device, so starting
    /// again is pointless
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SourceError::Unsupported { .. } | SourceError::PermissionDenied { .. }
        )
    }
}

/// Result type for location source operations
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SourceError::Unsupported { platform: "linux".to_string() };
        assert_eq!(err.to_string(), "location service not supported on linux");
        assert!(err.is_unsupported());

        let err = SourceError::Parse { line: 3, reason: "missing longitude".to_string() };
        assert_eq!(err.to_string(), "line 3: missing longitude");
        assert!(!err.is_unsupported());
        assert!(!err.is_unavailable());

        let err = SourceError::PermissionDenied { permission: "fine-location".to_string() };
        assert_eq!(err.to_string(), "location permission denied: fine-location");
        assert!(err.is_unavailable());
        assert!(!err.is_unsupported());
    }
}
