//! Tracking demo
//!
//! Drives a scripted walk through the tracker with the default 5 m movement
//! threshold and prints what reaches the map.

use gps_tracker::{
    LocationTracker, MockLocationSource, OutputFormat, SourceConfig, SourceUpdate,
    TerminalDisplay, TrackerConfig, TrackerEvent,
};
use std::io;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== GPS Tracker Demo ===\n");

    let mut source = MockLocationSource::new();
    source.push_status("provider-enabled", "gps");
    // Standing still with jitter, then walking north in ~11 m steps
    let walk = [
        (-23.550520, -46.633308),
        (-23.550522, -46.633309),
        (-23.550519, -46.633307),
        (-23.550420, -46.633308),
        (-23.550320, -46.633308),
        (-23.550318, -46.633310),
        (-23.550220, -46.633308),
    ];
    for (lat, lon) in walk {
        source.push(SourceUpdate::location(lat, lon));
    }
    source.push(SourceUpdate::Ended);

    let config = TrackerConfig {
        source: SourceConfig::immediate(),
        ..Default::default()
    };
    println!(
        "Movement threshold: {:.1} m (filter {})\n",
        config.filter.threshold_m,
        if config.filter.enabled { "on" } else { "off" }
    );

    let display = TerminalDisplay::new(io::stdout(), OutputFormat::Text);
    let mut tracker = LocationTracker::new(Box::new(source), display, config);
    tracker.register_event_callback(Box::new(|event: &TrackerEvent| match event {
        TrackerEvent::PositionRejected { distance_m, .. } => {
            println!("   skipped: moved only {:.1} m", distance_m);
        }
        TrackerEvent::StatusChanged { kind, status } => {
            println!("   status: {} - {}", kind, status);
        }
        _ => {}
    }));

    tracker.start()?;
    tracker.process()?;

    let state = tracker.state();
    println!("\n=== Summary ===");
    println!("Updates received:   {}", state.updates_received);
    println!("Positions accepted: {}", state.positions_accepted);
    println!("Positions skipped:  {}", state.positions_rejected);
    if let Some(label) = tracker.display().map().label() {
        println!("Final label:        {}", label);
    }

    Ok(())
}
