//! Map display seam
//!
//! [`MapDisplay`] is what the tracker drives on each accepted fix. A GUI
//! binding implements it over its map widget; [`MapState`] is the in-memory
//! model and [`TerminalDisplay`] prints each recentering.

use crate::api::formatting::{CsvFormatter, JsonFormatter, PositionFormatter, TextFormatter};
use crate::api::types::OutputFormat;
use crate::core::Position;
use std::io::Write;
use tracing::{debug, warn};

/// Operations the tracker performs on a map view
pub trait MapDisplay {
    /// Remove every marker from the map
    fn clear_markers(&mut self);

    /// Place a marker at `position`
    fn add_marker(&mut self, position: Position);

    /// Center the map view on `position`
    fn center_on(&mut self, position: Position);

    /// Replace the coordinates label text.
    /// Returns false when the layout has no label.
    fn set_label(&mut self, text: &str) -> bool;
}

/// In-memory map model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    markers: Vec<Position>,
    center: Option<Position>,
    label: Option<String>,
    has_label: bool,
}

impl MapState {
    /// Map with a coordinates label
    pub fn new() -> Self {
        Self {
            has_label: true,
            ..Default::default()
        }
    }

    /// Map whose layout has no coordinates label
    pub fn without_label() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Position] {
        &self.markers
    }

    pub fn center(&self) -> Option<Position> {
        self.center
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether the map has ever been centered on a fix
    pub fn is_positioned(&self) -> bool {
        self.center.is_some()
    }
}

impl MapDisplay for MapState {
    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn add_marker(&mut self, position: Position) {
        self.markers.push(position);
    }

    fn center_on(&mut self, position: Position) {
        self.center = Some(position);
    }

    fn set_label(&mut self, text: &str) -> bool {
        if !self.has_label {
            return false;
        }
        self.label = Some(text.to_string());
        true
    }
}

/// Display that keeps a [`MapState`] and writes one line per recentering
pub struct TerminalDisplay<W: Write> {
    map: MapState,
    writer: W,
    format: OutputFormat,
    formatter: PositionFormatter,
    header_written: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            map: MapState::new(),
            writer,
            format,
            formatter: PositionFormatter::new(),
            header_written: false,
        }
    }

    pub fn map(&self) -> &MapState {
        &self.map
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn render(&mut self, position: Position) -> std::io::Result<()> {
        let formatted = self.formatter.format(&position);
        match self.format {
            OutputFormat::Text => {
                let line = TextFormatter::new().format_text(&formatted, self.map.label());
                writeln!(self.writer, "{}", line)?;
            }
            OutputFormat::Json => match JsonFormatter::new().format_json(&formatted) {
                Ok(line) => writeln!(self.writer, "{}", line)?,
                Err(e) => warn!("failed to serialize position: {}", e),
            },
            OutputFormat::Csv => {
                let csv = CsvFormatter::new();
                if !self.header_written {
                    writeln!(self.writer, "{}", csv.header())?;
                    self.header_written = true;
                }
                writeln!(self.writer, "{}", csv.format_csv(&formatted))?;
            }
        }
        self.writer.flush()
    }
}

impl<W: Write> MapDisplay for TerminalDisplay<W> {
    fn clear_markers(&mut self) {
        self.map.clear_markers();
    }

    fn add_marker(&mut self, position: Position) {
        self.map.add_marker(position);
    }

    fn center_on(&mut self, position: Position) {
        self.map.center_on(position);
        if let Err(e) = self.render(position) {
            warn!("failed to write position: {}", e);
        }
    }

    fn set_label(&mut self, text: &str) -> bool {
        debug!(label = text, "label updated");
        self.map.set_label(text)
    }
}
