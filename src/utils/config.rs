use crate::api::types::OutputFormat;
use crate::core::DEFAULT_THRESHOLD_M;
use crate::hardware::SourceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Tracker-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Movement debounce filter settings
    pub filter: FilterConfig,
    /// Parameters requested from the location source
    pub source: SourceConfig,
    /// Label and output settings
    pub display: DisplayConfig,
    /// Drop samples with out-of-range or non-finite coordinates
    pub validate_coordinates: bool,
    /// Treat an exact (0, 0) fix as missing
    pub reject_null_island: bool,
    /// Enable debug logging
    pub debug_logging: bool,
}

/// Movement debounce filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Whether the filter runs at all
    pub enabled: bool,
    /// Minimum movement between accepted samples (meters)
    pub threshold_m: f64,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Update the coordinates label on each accepted sample
    pub show_label: bool,
    /// Decimal places shown in the label
    pub label_precision: u8,
    /// Output format for the terminal display
    pub output_format: OutputFormat,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            source: SourceConfig::default(),
            display: DisplayConfig::default(),
            validate_coordinates: true,
            reject_null_island: false,
            debug_logging: false,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_m: DEFAULT_THRESHOLD_M,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_label: true,
            label_precision: 5,
            output_format: OutputFormat::Text,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    #[error("{message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("{message}")]
    SerializationError { message: String },
    /// Save requested without a known file path
    #[error("no file path set for saving configuration")]
    NoFilePath,
}

/// Configuration validation result
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether configuration is valid
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<ConfigError>,
    /// Validation warnings
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn into_first_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next()
    }
}

/// Main configuration manager
pub struct ConfigurationManager {
    /// Current tracker configuration
    config: TrackerConfig,
    /// Configuration file path
    config_file_path: Option<String>,
    /// Whether configuration has been modified
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    /// Get current configuration
    pub fn get_config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the configuration after validation
    pub fn update_config(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
        let validation = self.validate_config(&config);
        if let Some(error) = validation.into_first_error() {
            return Err(error);
        }

        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: TrackerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        let validation = self.validate_config(&config);
        for warning in &validation.warnings {
            warn!(path = %path_str, "{}", warning);
        }
        if let Some(error) = validation.into_first_error() {
            return Err(error);
        }

        debug!(path = %path_str, "loaded configuration");
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoFilePath),
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Path of the last loaded or saved file
    pub fn config_file_path(&self) -> Option<&str> {
        self.config_file_path.as_deref()
    }

    // Runtime Parameter Adjustment Methods

    /// Update the debounce threshold, returning the old value
    pub fn set_threshold(&mut self, threshold_m: f64) -> Result<f64, ConfigError> {
        check_threshold(threshold_m)?;
        let old_value = self.config.filter.threshold_m;
        self.config.filter.threshold_m = threshold_m;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Enable or disable the debounce filter, returning the old setting
    pub fn set_filter_enabled(&mut self, enabled: bool) -> bool {
        let old_value = self.config.filter.enabled;
        self.config.filter.enabled = enabled;
        self.is_modified = true;
        old_value
    }

    /// Update the requested update interval
    pub fn set_min_time(&mut self, min_time_ms: u32) -> Result<u32, ConfigError> {
        if min_time_ms > MAX_MIN_TIME_MS {
            return Err(ConfigError::InvalidParameter {
                parameter: "source.min_time_ms".to_string(),
                value: min_time_ms.to_string(),
                reason: format!("Update interval must not exceed {} ms", MAX_MIN_TIME_MS),
            });
        }
        let old_value = self.config.source.min_time_ms;
        self.config.source.min_time_ms = min_time_ms;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the source-side minimum distance
    pub fn set_min_distance(&mut self, min_distance_m: f64) -> Result<f64, ConfigError> {
        if !min_distance_m.is_finite() || min_distance_m < 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "source.min_distance_m".to_string(),
                value: min_distance_m.to_string(),
                reason: "Minimum distance must be a non-negative number".to_string(),
            });
        }
        let old_value = self.config.source.min_distance_m;
        self.config.source.min_distance_m = min_distance_m;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the delay before the source is started
    pub fn set_start_delay(&mut self, start_delay_ms: u32) -> Result<u32, ConfigError> {
        if start_delay_ms > MAX_START_DELAY_MS {
            return Err(ConfigError::InvalidParameter {
                parameter: "source.start_delay_ms".to_string(),
                value: start_delay_ms.to_string(),
                reason: format!("Start delay must not exceed {} ms", MAX_START_DELAY_MS),
            });
        }
        let old_value = self.config.source.start_delay_ms;
        self.config.source.start_delay_ms = start_delay_ms;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Validate a tracker configuration
    pub fn validate_config(&self, config: &TrackerConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = check_threshold(config.filter.threshold_m) {
            errors.push(e);
        } else if config.filter.enabled && config.filter.threshold_m > 1000.0 {
            warnings.push("Threshold above 1 km will hide most movement".to_string());
        }

        if !config.filter.enabled && config.source.min_distance_m == 0.0 {
            warnings.push("Filter disabled and source unfiltered: every fix updates the map".to_string());
        }

        if config.source.min_time_ms > MAX_MIN_TIME_MS {
            errors.push(ConfigError::InvalidParameter {
                parameter: "source.min_time_ms".to_string(),
                value: config.source.min_time_ms.to_string(),
                reason: format!("Update interval must not exceed {} ms", MAX_MIN_TIME_MS),
            });
        } else if config.source.min_time_ms < 100 {
            warnings.push("Update interval below 100 ms drains the battery on real devices".to_string());
        }

        if !config.source.min_distance_m.is_finite() || config.source.min_distance_m < 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "source.min_distance_m".to_string(),
                value: config.source.min_distance_m.to_string(),
                reason: "Minimum distance must be a non-negative number".to_string(),
            });
        }

        if config.source.start_delay_ms > MAX_START_DELAY_MS {
            errors.push(ConfigError::InvalidParameter {
                parameter: "source.start_delay_ms".to_string(),
                value: config.source.start_delay_ms.to_string(),
                reason: format!("Start delay must not exceed {} ms", MAX_START_DELAY_MS),
            });
        }

        if config.display.label_precision > MAX_LABEL_PRECISION {
            errors.push(ConfigError::InvalidParameter {
                parameter: "display.label_precision".to_string(),
                value: config.display.label_precision.to_string(),
                reason: format!("Label precision must not exceed {} decimals", MAX_LABEL_PRECISION),
            });
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

const MAX_MIN_TIME_MS: u32 = 3_600_000;
const MAX_START_DELAY_MS: u32 = 60_000;
const MAX_LABEL_PRECISION: u8 = 10;

fn check_threshold(threshold_m: f64) -> Result<(), ConfigError> {
    if !threshold_m.is_finite() || threshold_m < 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "filter.threshold_m".to_string(),
            value: threshold_m.to_string(),
            reason: "Threshold must be a non-negative number of meters".to_string(),
        });
    }
    Ok(())
}
