//! Position output formatting and serialization
//!
//! This module renders accepted positions as the coordinates label shown
//! next to the map and as text, JSON or CSV lines for logging.

use crate::algorithms::haversine::haversine_distance;
use crate::core::Position;
use serde::{Deserialize, Serialize};

/// Formatter for the coordinates label, e.g. `Location: -23.55052, -46.63331`
#[derive(Debug, Clone)]
pub struct LabelFormatter {
    /// Text before the coordinates
    pub prefix: String,
    /// Decimal places
    pub precision: u8,
}

impl Default for LabelFormatter {
    fn default() -> Self {
        Self {
            prefix: "Location".to_string(),
            precision: 5,
        }
    }
}

impl LabelFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    pub fn format(&self, position: &Position) -> String {
        let precision = self.precision as usize;
        format!(
            "{}: {:.*}, {:.*}",
            self.prefix, precision, position.lat, precision, position.lon
        )
    }
}

/// Serializable record of an accepted position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedPosition {
    /// 1-based count of positions formatted so far
    pub sequence: u32,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Distance from the previous formatted position (meters)
    pub distance_from_last_m: Option<f64>,
}

/// Builds [`FormattedPosition`]s, numbering them and tracking movement
#[derive(Debug, Clone)]
pub struct PositionFormatter {
    /// Precision for floating-point values
    pub precision: u8,
    sequence: u32,
    last: Option<Position>,
}

impl Default for PositionFormatter {
    fn default() -> Self {
        Self {
            precision: 6,
            sequence: 0,
            last: None,
        }
    }
}

impl PositionFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    pub fn format(&mut self, position: &Position) -> FormattedPosition {
        self.sequence += 1;
        let distance = self.last.map(|last| haversine_distance(&last, position));
        self.last = Some(*position);

        FormattedPosition {
            sequence: self.sequence,
            latitude_deg: self.round_to_precision(position.lat),
            longitude_deg: self.round_to_precision(position.lon),
            distance_from_last_m: distance.map(|d| (d * 10.0).round() / 10.0),
        }
    }

    /// Round floating-point value to specified precision
    fn round_to_precision(&self, value: f64) -> f64 {
        let multiplier = 10_f64.powi(self.precision as i32);
        (value * multiplier).round() / multiplier
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// Decimal places when no label text is supplied
    pub precision: u8,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { precision: 5 }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format as `#<seq> <label> (+<m> m)`; the coordinates stand in for a missing label
    pub fn format_text(&self, formatted: &FormattedPosition, label: Option<&str>) -> String {
        let precision = self.precision as usize;
        let mut output = format!("#{} ", formatted.sequence);
        match label {
            Some(label) => output.push_str(label),
            None => output.push_str(&format!(
                "{:.*}, {:.*}",
                precision, formatted.latitude_deg, precision, formatted.longitude_deg
            )),
        }
        if let Some(distance) = formatted.distance_from_last_m {
            output.push_str(&format!(" (+{:.1} m)", distance));
        }
        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, formatted: &FormattedPosition) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(formatted)
        } else {
            serde_json::to_string(formatted)
        }
    }
}

/// CSV formatter for track logging
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn header(&self) -> String {
        "sequence,latitude,longitude,distance_m".to_string()
    }

    pub fn format_csv(&self, formatted: &FormattedPosition) -> String {
        let distance = formatted
            .distance_from_last_m
            .map(|d| format!("{:.1}", d))
            .unwrap_or_default();
        format!(
            "{},{:.6},{:.6},{}",
            formatted.sequence, formatted.latitude_deg, formatted.longitude_deg, distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        let formatter = LabelFormatter::new();
        assert_eq!(
            formatter.format(&Position::new(-23.550520, -46.633308)),
            "Location: -23.55052, -46.63331"
        );
        assert_eq!(
            LabelFormatter::new().with_precision(2).format(&Position::new(1.0, 2.0)),
            "Location: 1.00, 2.00"
        );
    }

    #[test]
    fn test_position_formatter_sequence_and_distance() {
        let mut formatter = PositionFormatter::new();
        let first = formatter.format(&Position::new(0.0, 0.0));
        assert_eq!(first.sequence, 1);
        assert_eq!(first.distance_from_last_m, None);

        let second = formatter.format(&Position::new(0.0, 0.0001));
        assert_eq!(second.sequence, 2);
        assert_eq!(second.distance_from_last_m, Some(11.1));
    }

    #[test]
    fn test_rounding() {
        let mut formatter = PositionFormatter::new().with_precision(3);
        let formatted = formatter.format(&Position::new(12.34567, -0.0004));
        assert_eq!(formatted.latitude_deg, 12.346);
        assert_eq!(formatted.longitude_deg, -0.0);
    }

    #[test]
    fn test_text_format() {
        let formatted = FormattedPosition {
            sequence: 3,
            latitude_deg: 1.5,
            longitude_deg: 2.5,
            distance_from_last_m: Some(12.34),
        };
        let text = TextFormatter::new();
        assert_eq!(text.format_text(&formatted, None), "#3 1.50000, 2.50000 (+12.3 m)");
        assert_eq!(
            text.format_text(&formatted, Some("Location: here")),
            "#3 Location: here (+12.3 m)"
        );
    }

    #[test]
    fn test_json_format() {
        let formatted = FormattedPosition {
            sequence: 1,
            latitude_deg: 1.5,
            longitude_deg: 2.5,
            distance_from_last_m: None,
        };
        let json = JsonFormatter::new().format_json(&formatted).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["sequence"], 1);
        assert_eq!(parsed["latitude_deg"], 1.5);
        assert!(parsed["distance_from_last_m"].is_null());
        assert!(JsonFormatter::pretty().format_json(&formatted).unwrap().contains('\n'));
    }

    #[test]
    fn test_csv_format() {
        let csv = CsvFormatter::new();
        let formatted = FormattedPosition {
            sequence: 2,
            latitude_deg: 1.5,
            longitude_deg: 2.5,
            distance_from_last_m: Some(4.0),
        };
        assert_eq!(csv.format_csv(&formatted), "2,1.500000,2.500000,4.0");
    }
}
