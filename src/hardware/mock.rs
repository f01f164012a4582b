//! Mock location source for testing and development

use crate::core::Position;
use crate::hardware::{
    LocationSource, SourceConfig, SourceError, SourceResult, SourceUpdate, UpdateSender,
};
use std::collections::VecDeque;

/// How the mock answers `configure` and `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockAvailability {
    Available,
    Unsupported,
    PermissionDenied,
}

/// Scripted location source.
///
/// Queued updates are delivered synchronously when the source starts;
/// updates pushed while running go straight to the sink.
pub struct MockLocationSource {
    name: String,
    availability: MockAvailability,
    config: Option<SourceConfig>,
    queue: VecDeque<SourceUpdate>,
    sink: Option<UpdateSender>,
    start_count: u32,
    stop_count: u32,
}

impl MockLocationSource {
    /// Create a new mock source with an empty script
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            availability: MockAvailability::Available,
            config: None,
            queue: VecDeque::new(),
            sink: None,
            start_count: 0,
            stop_count: 0,
        }
    }

    /// Mock source that behaves like a platform without location capability
    pub fn unsupported() -> Self {
        Self {
            availability: MockAvailability::Unsupported,
            ..Self::new()
        }
    }

    /// Mock source whose location permission request is refused
    pub fn permission_denied() -> Self {
        Self {
            availability: MockAvailability::PermissionDenied,
            ..Self::new()
        }
    }

    fn check_available(&self) -> SourceResult<()> {
        match self.availability {
            MockAvailability::Available => Ok(()),
            MockAvailability::Unsupported => Err(SourceError::Unsupported {
                platform: "mock".to_string(),
            }),
            MockAvailability::PermissionDenied => Err(SourceError::PermissionDenied {
                permission: "fine-location".to_string(),
            }),
        }
    }

    /// Mock source preloaded with location fixes
    pub fn with_positions(positions: &[Position]) -> Self {
        let mut source = Self::new();
        for position in positions {
            source.push_location(position.lat, position.lon);
        }
        source
    }

    /// Queue or deliver an update
    pub fn push(&mut self, update: SourceUpdate) {
        match &self.sink {
            Some(sink) => {
                // A dropped tracker just discards the update
                let _ = sink.send(update);
            }
            None => self.queue.push_back(update),
        }
    }

    pub fn push_location(&mut self, lat: f64, lon: f64) {
        self.push(SourceUpdate::location(lat, lon));
    }

    pub fn push_batch(&mut self, positions: &[Position]) {
        self.push(SourceUpdate::Batch(positions.to_vec()));
    }

    pub fn push_status(&mut self, kind: &str, status: &str) {
        self.push(SourceUpdate::status(kind, status));
    }

    /// Sink handle for delivering updates from another thread
    pub fn sink(&self) -> Option<UpdateSender> {
        self.sink.clone()
    }

    pub fn queued_update_count(&self) -> usize {
        self.queue.len()
    }

    /// Request parameters received by the last `configure` call
    pub fn last_config(&self) -> Option<&SourceConfig> {
        self.config.as_ref()
    }

    pub fn start_count(&self) -> u32 {
        self.start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.stop_count
    }
}

impl Default for MockLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for MockLocationSource {
    fn configure(&mut self, config: &SourceConfig) -> SourceResult<()> {
        self.check_available()?;
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn start(&mut self, sink: UpdateSender) -> SourceResult<()> {
        self.check_available()?;
        if self.sink.is_some() {
            return Err(SourceError::AlreadyRunning {
                name: self.name.clone(),
            });
        }

        while let Some(update) = self.queue.pop_front() {
            sink.send(update)?;
        }
        self.sink = Some(sink);
        self.start_count += 1;
        Ok(())
    }

    fn stop(&mut self) -> SourceResult<()> {
        if self.sink.take().is_none() {
            return Err(SourceError::NotRunning {
                name: self.name.clone(),
            });
        }
        self.stop_count += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.sink.is_some()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::update_channel;

    #[test]
    fn test_queued_updates_delivered_on_start() {
        let mut source = MockLocationSource::with_positions(&[
            Position::new(1.0, 1.0),
            Position::new(2.0, 2.0),
        ]);
        assert_eq!(source.queued_update_count(), 2);

        let (tx, rx) = update_channel();
        source.configure(&SourceConfig::default()).unwrap();
        source.start(tx).unwrap();

        assert!(source.is_running());
        assert_eq!(source.queued_update_count(), 0);
        assert_eq!(rx.try_recv().unwrap(), SourceUpdate::location(1.0, 1.0));
        assert_eq!(rx.try_recv().unwrap(), SourceUpdate::location(2.0, 2.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_push_while_running_goes_to_sink() {
        let mut source = MockLocationSource::new();
        let (tx, rx) = update_channel();
        source.start(tx).unwrap();

        source.push_status("provider-enabled", "gps");
        assert_eq!(source.queued_update_count(), 0);
        assert_eq!(rx.try_recv().unwrap(), SourceUpdate::status("provider-enabled", "gps"));
    }

    #[test]
    fn test_unsupported_platform() {
        let mut source = MockLocationSource::unsupported();
        let result = source.configure(&SourceConfig::default());
        assert!(matches!(result, Err(SourceError::Unsupported { .. })));
        assert!(source.last_config().is_none());
    }

    #[test]
    fn test_permission_denied() {
        let mut source = MockLocationSource::permission_denied();
        assert!(matches!(
            source.configure(&SourceConfig::default()),
            Err(SourceError::PermissionDenied { .. })
        ));
        let (tx, _rx) = update_channel();
        assert!(matches!(source.start(tx), Err(SourceError::PermissionDenied { .. })));
        assert_eq!(source.start_count(), 0);
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let mut source = MockLocationSource::new();
        let (tx, _rx) = update_channel();
        source.start(tx.clone()).unwrap();
        assert!(matches!(source.start(tx), Err(SourceError::AlreadyRunning { .. })));

        source.stop().unwrap();
        assert!(!source.is_running());
        assert!(matches!(source.stop(), Err(SourceError::NotRunning { .. })));
        assert_eq!(source.start_count(), 1);
        assert_eq!(source.stop_count(), 1);
    }
}
