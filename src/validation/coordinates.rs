//! Range checks for incoming position samples

use crate::core::Position;
use thiserror::Error;

/// Reasons a position sample is rejected before it reaches the filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("non-finite coordinate: lat={lat}, lon={lon}")]
    NonFinite { lat: f64, lon: f64 },
    #[error("latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { lat: f64 },
    #[error("longitude {lon} outside [-180, 180]")]
    LongitudeOutOfRange { lon: f64 },
    #[error("(0, 0) reported, treated as a missing fix")]
    NullIsland,
}

/// Validator for WGS-84 coordinate ranges
#[derive(Debug, Clone, Default)]
pub struct CoordinateValidator {
    /// Treat (0, 0) as a missing fix ("null island")
    pub reject_null_island: bool,
}

impl CoordinateValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, position: &Position) -> Result<(), ValidationError> {
        if !position.lat.is_finite() || !position.lon.is_finite() {
            return Err(ValidationError::NonFinite {
                lat: position.lat,
                lon: position.lon,
            });
        }
        if !(-90.0..=90.0).contains(&position.lat) {
            return Err(ValidationError::LatitudeOutOfRange { lat: position.lat });
        }
        if !(-180.0..=180.0).contains(&position.lon) {
            return Err(ValidationError::LongitudeOutOfRange { lon: position.lon });
        }
        if self.reject_null_island && position.lat == 0.0 && position.lon == 0.0 {
            return Err(ValidationError::NullIsland);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_positions() {
        let validator = CoordinateValidator::new();
        assert!(validator.validate(&Position::new(0.0, 0.0)).is_ok());
        assert!(validator.validate(&Position::new(90.0, 180.0)).is_ok());
        assert!(validator.validate(&Position::new(-90.0, -180.0)).is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let validator = CoordinateValidator::new();
        assert_eq!(
            validator.validate(&Position::new(91.0, 0.0)),
            Err(ValidationError::LatitudeOutOfRange { lat: 91.0 })
        );
        assert_eq!(
            validator.validate(&Position::new(0.0, -180.5)),
            Err(ValidationError::LongitudeOutOfRange { lon: -180.5 })
        );
    }

    #[test]
    fn test_non_finite() {
        let validator = CoordinateValidator::new();
        assert!(matches!(
            validator.validate(&Position::new(f64::NAN, 0.0)),
            Err(ValidationError::NonFinite { .. })
        ));
        assert!(matches!(
            validator.validate(&Position::new(0.0, f64::INFINITY)),
            Err(ValidationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_null_island_only_when_enabled() {
        let origin = Position::new(0.0, 0.0);
        assert!(CoordinateValidator::new().validate(&origin).is_ok());

        let strict = CoordinateValidator { reject_null_island: true };
        assert_eq!(strict.validate(&origin), Err(ValidationError::NullIsland));
        assert!(strict.validate(&Position::new(0.0, 0.0001)).is_ok());
    }
}
