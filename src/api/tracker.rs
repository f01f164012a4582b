//! Location tracker: source callbacks in, map updates out
//!
//! The tracker owns the location source, the movement filter and the map
//! display. Sources push updates into a channel from whatever thread the
//! platform uses; [`LocationTracker::process`] drains that channel on the
//! caller's thread, so the filter state and the display have one writer.

use crate::api::display::MapDisplay;
use crate::api::formatting::LabelFormatter;
use crate::api::types::{TrackerError, TrackerResult, TrackerState};
use crate::core::Position;
use crate::hardware::{update_channel, LocationSource, SourceError, SourceUpdate, UpdateSender};
use crate::processing::debounce::{FilterDecision, MovementFilter};
use crate::utils::config::TrackerConfig;
use crate::validation::coordinates::{CoordinateValidator, ValidationError};
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Callback function type for tracker events
pub type EventCallback = Box<dyn Fn(&TrackerEvent)>;

/// Events reported to registered callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Location source is unavailable; reported once
    SourceUnavailable { reason: String },
    /// Location permission was refused; reported once
    PermissionDenied { reason: String },
    /// Location source started delivering updates
    SourceStarted { name: String },
    /// Location source stopped
    SourceStopped { name: String },
    /// Finite source delivered everything it had
    SourceEnded,
    /// Provider status changed
    StatusChanged { kind: String, status: String },
    /// Position passed the filter and was sent to the display
    PositionAccepted {
        position: Position,
        distance_m: Option<f64>,
        sequence_number: u32,
    },
    /// Position moved less than the threshold
    PositionRejected { position: Position, distance_m: f64 },
    /// Position failed coordinate validation
    InvalidSample { position: Position, error: ValidationError },
}

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

/// Drives a location source into a map display
pub struct LocationTracker<D: MapDisplay> {
    source: Box<dyn LocationSource>,
    display: D,
    filter: MovementFilter,
    validator: Option<CoordinateValidator>,
    label: Option<LabelFormatter>,
    config: TrackerConfig,
    state: TrackerState,
    sender: UpdateSender,
    receiver: Receiver<SourceUpdate>,
    /// When the deferred source start is due
    pending_start: Option<Instant>,
    /// Why the source can never start, once that is known
    unavailable: Option<TrackerError>,
    sequence_counter: u32,
    callback_counter: u32,
    event_callbacks: HashMap<CallbackHandle, EventCallback>,
    start_time: Instant,
}

impl<D: MapDisplay> LocationTracker<D> {
    /// Create a tracker over `source` and `display`
    pub fn new(source: Box<dyn LocationSource>, display: D, config: TrackerConfig) -> Self {
        let (sender, receiver) = update_channel();
        let validator = config.validate_coordinates.then(|| CoordinateValidator {
            reject_null_island: config.reject_null_island,
        });
        let label = config
            .display
            .show_label
            .then(|| LabelFormatter::new().with_precision(config.display.label_precision));

        Self {
            source,
            display,
            filter: MovementFilter::from_config(&config.filter),
            validator,
            label,
            config,
            state: TrackerState {
                source_available: true,
                ..Default::default()
            },
            sender,
            receiver,
            pending_start: None,
            unavailable: None,
            sequence_counter: 0,
            callback_counter: 0,
            event_callbacks: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Configure the source and schedule its start after the configured delay.
    ///
    /// An unsupported platform or a refused location permission is reported
    /// once through the log and an event; the display is left untouched and
    /// later calls return the same error without touching the source.
    pub fn start(&mut self) -> TrackerResult<()> {
        if self.state.started {
            return Err(TrackerError::InvalidRequest {
                reason: "tracker already started".to_string(),
            });
        }
        if let Some(err) = &self.unavailable {
            return Err(err.clone());
        }

        if let Err(e) = self.source.configure(&self.config.source) {
            if e.is_unavailable() {
                return Err(self.mark_unavailable(&e));
            }
            return Err(e.into());
        }

        let delay = Duration::from_millis(u64::from(self.config.source.start_delay_ms));
        self.pending_start = Some(Instant::now() + delay);
        self.state.started = true;
        info!(
            source = self.source.name(),
            start_delay_ms = self.config.source.start_delay_ms,
            min_time_ms = self.config.source.min_time_ms,
            min_distance_m = self.config.source.min_distance_m,
            "tracker started"
        );

        if delay.is_zero() {
            self.start_source_if_due()?;
        }
        Ok(())
    }

    /// Drain queued updates on the calling thread, starting the source first
    /// if its delay has elapsed. Returns the number of updates handled.
    pub fn process(&mut self) -> TrackerResult<usize> {
        if !self.state.started {
            return Err(TrackerError::NotStarted);
        }
        self.start_source_if_due()?;

        let mut handled = 0;
        while let Ok(update) = self.receiver.try_recv() {
            self.handle_update(update);
            handled += 1;
        }
        self.state.uptime_ms = self.start_time.elapsed().as_millis() as u64;
        Ok(handled)
    }

    /// Block up to `timeout` for an update, then drain everything queued
    pub fn wait_and_process(&mut self, timeout: Duration) -> TrackerResult<usize> {
        if !self.state.started {
            return Err(TrackerError::NotStarted);
        }

        let mut timeout = timeout;
        if let Some(due) = self.pending_start {
            let until_due = due.saturating_duration_since(Instant::now());
            if until_due >= timeout {
                std::thread::sleep(timeout);
                return self.process();
            }
            std::thread::sleep(until_due);
            timeout -= until_due;
            self.start_source_if_due()?;
        }

        let mut handled = 0;
        match self.receiver.recv_timeout(timeout) {
            Ok(update) => {
                self.handle_update(update);
                handled += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            // The tracker holds a sender, so the channel never disconnects
            Err(RecvTimeoutError::Disconnected) => return Err(SourceError::ChannelClosed.into()),
        }
        Ok(handled + self.process()?)
    }

    /// Stop the source; queued updates stay until the next `process`
    pub fn stop(&mut self) -> TrackerResult<()> {
        if self.pending_start.take().is_some() {
            // Source never started; a later `start` schedules it again
            debug!(source = self.source.name(), "deferred source start cancelled");
            self.state.started = false;
        }
        if self.state.source_running {
            self.source.stop()?;
            self.state.source_running = false;
            info!(source = self.source.name(), "location source stopped");
            self.trigger_event(TrackerEvent::SourceStopped {
                name: self.source.name().to_string(),
            });
        }
        Ok(())
    }

    /// Stop the source, drop callbacks and reset all state
    pub fn shutdown(&mut self) -> TrackerResult<()> {
        self.stop()?;
        self.event_callbacks.clear();
        while self.receiver.try_recv().is_ok() {}
        self.filter.reset();
        self.state = TrackerState {
            source_available: self.state.source_available,
            ..Default::default()
        };
        self.sequence_counter = 0;
        self.callback_counter = 0;
        Ok(())
    }

    /// Sender for platform code that delivers updates itself
    pub fn update_sender(&self) -> UpdateSender {
        self.sender.clone()
    }

    /// Handle one update from the source
    pub fn handle_update(&mut self, update: SourceUpdate) {
        self.state.updates_received += 1;
        match update {
            SourceUpdate::Location(position) => self.handle_location(position),
            SourceUpdate::Batch(positions) => match positions.first() {
                Some(&position) => self.handle_location(position),
                None => debug!("empty location batch"),
            },
            SourceUpdate::Status { kind, status } => {
                info!("GPS status: {} - {}", kind, status);
                self.state.last_status = Some((kind.clone(), status.clone()));
                self.trigger_event(TrackerEvent::StatusChanged { kind, status });
            }
            SourceUpdate::Ended => {
                debug!(source = self.source.name(), "location source ended");
                self.state.source_ended = true;
                self.state.source_running = false;
                self.trigger_event(TrackerEvent::SourceEnded);
            }
        }
    }

    fn handle_location(&mut self, position: Position) {
        debug!(lat = position.lat, lon = position.lon, "location received");

        if let Some(validator) = &self.validator {
            if let Err(error) = validator.validate(&position) {
                warn!("dropping location sample: {}", error);
                self.state.invalid_samples += 1;
                self.trigger_event(TrackerEvent::InvalidSample { position, error });
                return;
            }
        }

        match self.filter.offer(position) {
            FilterDecision::Rejected { distance_m } => {
                debug!(distance_m, "location below movement threshold");
                self.state.positions_rejected += 1;
                self.trigger_event(TrackerEvent::PositionRejected { position, distance_m });
            }
            FilterDecision::Accepted { distance_m } => {
                self.update_display(position);
                self.sequence_counter += 1;
                self.state.positions_accepted += 1;
                self.state.last_accepted = Some(position);
                self.trigger_event(TrackerEvent::PositionAccepted {
                    position,
                    distance_m,
                    sequence_number: self.sequence_counter,
                });
            }
        }
    }

    fn update_display(&mut self, position: Position) {
        if let Some(label) = &self.label {
            let text = label.format(&position);
            self.display.set_label(&text);
        }
        self.display.clear_markers();
        self.display.add_marker(position);
        self.display.center_on(position);
    }

    fn start_source_if_due(&mut self) -> TrackerResult<()> {
        let Some(due) = self.pending_start else {
            return Ok(());
        };
        if Instant::now() < due {
            return Ok(());
        }
        self.pending_start = None;

        match self.source.start(self.sender.clone()) {
            Ok(()) => {
                self.state.source_running = true;
                info!(source = self.source.name(), "location source running");
                self.trigger_event(TrackerEvent::SourceStarted {
                    name: self.source.name().to_string(),
                });
                Ok(())
            }
            Err(e) if e.is_unavailable() => Err(self.mark_unavailable(&e)),
            Err(e) => Err(e.into()),
        }
    }

    fn mark_unavailable(&mut self, error: &SourceError) -> TrackerError {
        self.state.started = false;
        if let Some(err) = &self.unavailable {
            return err.clone();
        }

        let reason = error.to_string();
        let (err, event) = match error {
            SourceError::PermissionDenied { .. } => {
                warn!("Location permission denied. App cannot function: {}", reason);
                (
                    TrackerError::PermissionDenied { reason: reason.clone() },
                    TrackerEvent::PermissionDenied { reason },
                )
            }
            _ => {
                warn!("GPS not supported on this device: {}", reason);
                (
                    TrackerError::SourceUnavailable { reason: reason.clone() },
                    TrackerEvent::SourceUnavailable { reason },
                )
            }
        };
        self.state.source_available = false;
        self.unavailable = Some(err.clone());
        self.trigger_event(event);
        err
    }

    /// Register an event callback
    pub fn register_event_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle(self.callback_counter);
        self.event_callbacks.insert(handle, callback);
        handle
    }

    /// Unregister a callback
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> TrackerResult<()> {
        match self.event_callbacks.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(TrackerError::InvalidRequest {
                reason: "Invalid callback handle".to_string(),
            }),
        }
    }

    pub fn callback_count(&self) -> usize {
        self.event_callbacks.len()
    }

    fn trigger_event(&self, event: TrackerEvent) {
        for callback in self.event_callbacks.values() {
            callback(&event);
        }
    }

    /// Get tracker state information
    pub fn state(&mut self) -> TrackerState {
        self.state.uptime_ms = self.start_time.elapsed().as_millis() as u64;
        self.state.clone()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Consume the tracker, handing back the display
    pub fn into_display(self) -> D {
        self.display
    }

    pub fn filter(&self) -> &MovementFilter {
        &self.filter
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Whether a finite source has ended and nothing is left to process
    pub fn is_finished(&self) -> bool {
        self.state.source_ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::display::MapState;
    use crate::hardware::{MockLocationSource, SourceConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn immediate_config() -> TrackerConfig {
        TrackerConfig {
            source: SourceConfig::immediate(),
            ..Default::default()
        }
    }

    fn tracker_with(source: MockLocationSource, config: TrackerConfig) -> LocationTracker<MapState> {
        LocationTracker::new(Box::new(source), MapState::new(), config)
    }

    fn record_events(tracker: &mut LocationTracker<MapState>) -> Rc<RefCell<Vec<TrackerEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tracker.register_event_callback(Box::new(move |event: &TrackerEvent| sink.borrow_mut().push(event.clone())));
        events
    }

    #[test]
    fn test_accepted_update_moves_marker_and_label() {
        let source = MockLocationSource::with_positions(&[Position::new(-23.55052, -46.633308)]);
        let mut tracker = tracker_with(source, immediate_config());
        tracker.start().unwrap();
        assert_eq!(tracker.process().unwrap(), 1);

        let map = tracker.display();
        assert_eq!(map.markers(), &[Position::new(-23.55052, -46.633308)]);
        assert_eq!(map.center(), Some(Position::new(-23.55052, -46.633308)));
        assert_eq!(map.label(), Some("Location: -23.55052, -46.63331"));
        assert_eq!(tracker.state().positions_accepted, 1);
    }

    #[test]
    fn test_rejected_update_leaves_display_untouched() {
        let source = MockLocationSource::with_positions(&[
            Position::new(0.0, 0.0),
            Position::new(0.00001, 0.0),
        ]);
        let mut tracker = tracker_with(source, immediate_config());
        let events = record_events(&mut tracker);
        tracker.start().unwrap();
        tracker.process().unwrap();

        assert_eq!(tracker.display().markers(), &[Position::new(0.0, 0.0)]);
        assert_eq!(tracker.display().label(), Some("Location: 0.00000, 0.00000"));
        assert_eq!(tracker.filter().last(), Some(&Position::new(0.0, 0.0)));

        let state = tracker.state();
        assert_eq!(state.positions_accepted, 1);
        assert_eq!(state.positions_rejected, 1);
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, TrackerEvent::PositionRejected { .. })));
    }

    #[test]
    fn test_marker_replaced_not_accumulated() {
        let source = MockLocationSource::with_positions(&[
            Position::new(0.0, 0.0),
            Position::new(0.0, 0.0001),
            Position::new(0.0, 0.0002),
        ]);
        let mut tracker = tracker_with(source, immediate_config());
        tracker.start().unwrap();
        tracker.process().unwrap();

        assert_eq!(tracker.display().markers(), &[Position::new(0.0, 0.0002)]);
        assert_eq!(tracker.state().positions_accepted, 3);
    }

    #[test]
    fn test_disabled_filter_forwards_every_sample() {
        let mut config = immediate_config();
        config.filter.enabled = false;
        let source = MockLocationSource::with_positions(&[
            Position::new(0.0, 0.0),
            Position::new(0.00001, 0.0),
            Position::new(0.00001, 0.0),
        ]);
        let mut tracker = tracker_with(source, config);
        tracker.start().unwrap();
        tracker.process().unwrap();

        let state = tracker.state();
        assert_eq!(state.positions_accepted, 3);
        assert_eq!(state.positions_rejected, 0);
    }

    #[test]
    fn test_unavailable_source_reported_once() {
        let mut tracker = tracker_with(MockLocationSource::unsupported(), immediate_config());
        let events = record_events(&mut tracker);

        assert!(matches!(tracker.start(), Err(TrackerError::SourceUnavailable { .. })));
        assert!(matches!(tracker.start(), Err(TrackerError::SourceUnavailable { .. })));
        assert!(matches!(tracker.process(), Err(TrackerError::NotStarted)));

        let unavailable = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TrackerEvent::SourceUnavailable { .. }))
            .count();
        assert_eq!(unavailable, 1);
        assert!(!tracker.display().is_positioned());
        assert!(!tracker.state().source_available);
    }

    #[test]
    fn test_permission_denied_reported_once() {
        let mut tracker = tracker_with(MockLocationSource::permission_denied(), immediate_config());
        let events = record_events(&mut tracker);

        assert!(matches!(tracker.start(), Err(TrackerError::PermissionDenied { .. })));
        assert!(matches!(tracker.start(), Err(TrackerError::PermissionDenied { .. })));
        assert!(matches!(tracker.process(), Err(TrackerError::NotStarted)));

        assert_eq!(
            *events.borrow(),
            vec![TrackerEvent::PermissionDenied {
                reason: "location permission denied: fine-location".to_string(),
            }]
        );
        assert!(!tracker.display().is_positioned());
        let state = tracker.state();
        assert!(!state.source_available);
        assert!(!state.source_running);
    }

    #[test]
    fn test_stop_before_deferred_start() {
        let mut config = immediate_config();
        config.source.start_delay_ms = 60_000;
        let source = MockLocationSource::with_positions(&[Position::new(1.0, 1.0)]);
        let mut tracker = tracker_with(source, config);
        tracker.start().unwrap();

        tracker.stop().unwrap();
        assert!(!tracker.state().started);
        assert!(matches!(tracker.process(), Err(TrackerError::NotStarted)));

        // Can be scheduled again
        tracker.start().unwrap();
        assert!(tracker.state().started);
    }

    #[test]
    fn test_batch_uses_first_fix() {
        let mut source = MockLocationSource::new();
        source.push_batch(&[Position::new(2.0, 2.0), Position::new(3.0, 3.0)]);
        source.push_batch(&[]);
        let mut tracker = tracker_with(source, immediate_config());
        tracker.start().unwrap();
        assert_eq!(tracker.process().unwrap(), 2);

        assert_eq!(tracker.display().markers(), &[Position::new(2.0, 2.0)]);
        let state = tracker.state();
        assert_eq!(state.updates_received, 2);
        assert_eq!(state.positions_accepted, 1);
    }

    #[test]
    fn test_start_delay_defers_source_start() {
        let mut config = immediate_config();
        config.source.start_delay_ms = 60_000;
        let source = MockLocationSource::with_positions(&[Position::new(1.0, 1.0)]);
        let mut tracker = tracker_with(source, config);
        tracker.start().unwrap();

        assert_eq!(tracker.process().unwrap(), 0);
        assert!(!tracker.state().source_running);
        assert!(!tracker.display().is_positioned());
    }

    #[test]
    fn test_wait_and_process_starts_after_delay() {
        let mut config = immediate_config();
        config.source.start_delay_ms = 20;
        let source = MockLocationSource::with_positions(&[Position::new(1.0, 1.0)]);
        let mut tracker = tracker_with(source, config);
        tracker.start().unwrap();

        let handled = tracker.wait_and_process(Duration::from_secs(1)).unwrap();
        assert_eq!(handled, 1);
        assert!(tracker.state().source_running);
        assert!(tracker.display().is_positioned());
    }

    #[test]
    fn test_status_updates_recorded() {
        let mut source = MockLocationSource::new();
        source.push_status("provider-disabled", "gps");
        let mut tracker = tracker_with(source, immediate_config());
        let events = record_events(&mut tracker);
        tracker.start().unwrap();
        tracker.process().unwrap();

        assert_eq!(
            tracker.state().last_status,
            Some(("provider-disabled".to_string(), "gps".to_string()))
        );
        assert!(events.borrow().contains(&TrackerEvent::StatusChanged {
            kind: "provider-disabled".to_string(),
            status: "gps".to_string(),
        }));
    }

    #[test]
    fn test_invalid_samples_dropped() {
        let source = MockLocationSource::with_positions(&[
            Position::new(95.0, 0.0),
            Position::new(f64::NAN, 1.0),
            Position::new(10.0, 10.0),
        ]);
        let mut tracker = tracker_with(source, immediate_config());
        tracker.start().unwrap();
        tracker.process().unwrap();

        let state = tracker.state();
        assert_eq!(state.invalid_samples, 2);
        assert_eq!(state.positions_accepted, 1);
        assert_eq!(tracker.display().markers(), &[Position::new(10.0, 10.0)]);
    }

    #[test]
    fn test_updates_from_another_thread() {
        let mut tracker = tracker_with(MockLocationSource::new(), immediate_config());
        tracker.start().unwrap();
        let sender = tracker.update_sender();

        let handle = std::thread::spawn(move || {
            sender.send_location(Position::new(0.0, 0.0)).unwrap();
            sender.send_location(Position::new(0.0, 0.001)).unwrap();
        });
        handle.join().unwrap();

        assert_eq!(tracker.process().unwrap(), 2);
        assert_eq!(tracker.display().center(), Some(Position::new(0.0, 0.001)));
    }

    #[test]
    fn test_label_hidden_by_config() {
        let mut config = immediate_config();
        config.display.show_label = false;
        let source = MockLocationSource::with_positions(&[Position::new(1.0, 1.0)]);
        let mut tracker = tracker_with(source, config);
        tracker.start().unwrap();
        tracker.process().unwrap();

        assert!(tracker.display().label().is_none());
        assert!(tracker.display().is_positioned());
    }

    #[test]
    fn test_callback_registration() {
        let mut tracker = tracker_with(MockLocationSource::new(), immediate_config());
        let handle = tracker.register_event_callback(Box::new(|_| {}));
        assert_eq!(tracker.callback_count(), 1);
        tracker.unregister_callback(handle).unwrap();
        assert!(tracker.unregister_callback(handle).is_err());
    }

    #[test]
    fn test_stop_and_shutdown() {
        let source = MockLocationSource::with_positions(&[Position::new(1.0, 1.0)]);
        let mut tracker = tracker_with(source, immediate_config());
        let events = record_events(&mut tracker);
        tracker.start().unwrap();
        tracker.process().unwrap();

        tracker.stop().unwrap();
        assert!(!tracker.state().source_running);
        assert!(events.borrow().contains(&TrackerEvent::SourceStopped { name: "mock".to_string() }));

        tracker.shutdown().unwrap();
        assert_eq!(tracker.callback_count(), 0);
        assert!(tracker.filter().last().is_none());
        assert_eq!(tracker.state().positions_accepted, 0);
    }

    #[test]
    fn test_process_before_start() {
        let mut tracker = tracker_with(MockLocationSource::new(), immediate_config());
        assert!(matches!(tracker.process(), Err(TrackerError::NotStarted)));
    }
}
