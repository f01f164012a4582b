//! Replay of recorded tracks as a location source
//!
//! Reads `lat,lon` lines from a text file on a worker thread and delivers
//! them at the requested interval, the way a platform service would.

use crate::algorithms::haversine::haversine_distance;
use crate::core::Position;
use crate::hardware::{
    LocationSource, SourceConfig, SourceError, SourceResult, SourceUpdate, UpdateSender,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Location source replaying a recorded track file
pub struct ReplaySource {
    name: String,
    path: PathBuf,
    config: SourceConfig,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("replay:{}", path.display()),
            path,
            config: SourceConfig::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> SourceError {
        SourceError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(source = %self.name, "replay worker panicked");
            }
        }
    }
}

impl LocationSource for ReplaySource {
    fn configure(&mut self, config: &SourceConfig) -> SourceResult<()> {
        config.validate()?;
        std::fs::metadata(&self.path).map_err(|e| self.io_error(e))?;
        self.config = config.clone();
        Ok(())
    }

    fn start(&mut self, sink: UpdateSender) -> SourceResult<()> {
        if self.is_running() {
            return Err(SourceError::AlreadyRunning {
                name: self.name.clone(),
            });
        }
        // Reap a worker that already reached the end of its track
        self.join_worker();

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let config = self.config.clone();
        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);

        debug!(source = %self.name, min_time_ms = config.min_time_ms, "starting replay");
        self.worker = Some(thread::spawn(move || {
            replay_lines(BufReader::new(file), &sink, &config, &stop_flag);
        }));
        Ok(())
    }

    fn stop(&mut self) -> SourceResult<()> {
        if self.worker.is_none() {
            return Err(SourceError::NotRunning {
                name: self.name.clone(),
            });
        }
        self.stop_flag.store(true, Ordering::SeqCst);
        self.join_worker();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        self.join_worker();
    }
}

/// Parse one track line.
///
/// Returns `Ok(None)` for blank lines, `#` comments and a `lat,lon` header.
/// Fields after the longitude are ignored.
pub fn parse_sample_line(line: &str, line_no: usize) -> SourceResult<Option<Position>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split(',').map(str::trim);
    let lat_field = fields.next().unwrap_or_default();
    let Some(lon_field) = fields.next() else {
        return Err(SourceError::Parse {
            line: line_no,
            reason: "expected 'lat,lon'".to_string(),
        });
    };

    match (lat_field.parse::<f64>(), lon_field.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Ok(Some(Position::new(lat, lon))),
        (Err(_), Err(_)) if lat_field.eq_ignore_ascii_case("lat")
            || lat_field.eq_ignore_ascii_case("latitude") =>
        {
            Ok(None)
        }
        (Err(_), _) => Err(SourceError::Parse {
            line: line_no,
            reason: format!("invalid latitude '{}'", lat_field),
        }),
        (_, Err(_)) => Err(SourceError::Parse {
            line: line_no,
            reason: format!("invalid longitude '{}'", lon_field),
        }),
    }
}

/// Decode one raw track line; invalid UTF-8 is a parse error like any other
fn decode_line(bytes: &[u8], line_no: usize) -> SourceResult<Option<Position>> {
    match std::str::from_utf8(bytes) {
        Ok(line) => parse_sample_line(line, line_no),
        Err(_) => Err(SourceError::Parse {
            line: line_no,
            reason: "line is not valid UTF-8".to_string(),
        }),
    }
}

fn replay_lines<R: BufRead>(
    mut reader: R,
    sink: &UpdateSender,
    config: &SourceConfig,
    stop_flag: &AtomicBool,
) {
    let interval = Duration::from_millis(u64::from(config.min_time_ms));
    let mut last_sent: Option<Position> = None;
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            return;
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => line_no += 1,
            Err(e) => {
                warn!("track read failed after line {}: {}", line_no, e);
                if sink.send(SourceUpdate::status("provider-error", e.to_string())).is_err() {
                    return;
                }
                break;
            }
        }

        let position = match decode_line(&buf, line_no) {
            Ok(Some(position)) => position,
            Ok(None) => continue,
            Err(e) => {
                warn!("skipping track line: {}", e);
                if sink.send(SourceUpdate::status("provider-error", e.to_string())).is_err() {
                    return;
                }
                continue;
            }
        };

        if let Some(last) = last_sent {
            if config.min_distance_m > 0.0 && haversine_distance(&last, &position) < config.min_distance_m {
                continue;
            }
            if !interval.is_zero() && !sleep_unless_stopped(interval, stop_flag) {
                return;
            }
        }

        if sink.send_location(position).is_err() {
            return;
        }
        last_sent = Some(position);
    }

    // Receiver may already be gone; nothing left to deliver either way
    let _ = sink.send(SourceUpdate::Ended);
}

/// Sleep for `duration`, waking early if the stop flag is raised.
/// Returns false when stopped.
fn sleep_unless_stopped(duration: Duration, stop_flag: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_POLL_INTERVAL.min(deadline - now));
    }
}
