//! Configuration for the anomaly indicator.

use crate::core::{feature_len, DEFAULT_BASELINE, DEFAULT_WINDOW_LEN};
use crate::hardware::IndicatorPins;
use crate::model::ModelPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application directory name under the platform config/data dirs.
const APP_DIR: &str = "sensor-anomaly-indicator";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sleep between ticks
    #[serde(with = "duration_millis")]
    pub tick_period: Duration,

    /// Number of samples in the sliding window
    pub window_len: usize,

    /// Value the window is filled with before sampling starts
    pub baseline_sample: f64,

    /// I2C bus the converter sits on
    pub i2c_bus: u8,

    /// Converter channel sampled every tick
    pub adc_channel: u8,

    /// GPIO pins of the three indicators
    pub indicator_pins: IndicatorPins,

    /// Model artifact locations
    pub models: ModelPaths,

    /// Session recorder settings
    pub recorder: RecorderConfig,

    /// Path for run statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            tick_period: Duration::from_millis(100),
            window_len: DEFAULT_WINDOW_LEN,
            baseline_sample: DEFAULT_BASELINE,
            i2c_bus: 1,
            adc_channel: 7,
            indicator_pins: IndicatorPins::default(),
            models: ModelPaths::in_dir(&data_dir.join("models")),
            recorder: RecorderConfig::default(),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Length of the feature vectors this configuration produces.
    pub fn feature_len(&self) -> usize {
        feature_len(self.window_len)
    }

    /// Path of the persisted run statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("stats.json")
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_len < 2 {
            return Err(ConfigError::Invalid(format!(
                "window_len must be at least 2, got {}",
                self.window_len
            )));
        }
        if self.adc_channel > crate::hardware::MAX_CHANNEL {
            return Err(ConfigError::Invalid(format!(
                "adc_channel must be 0-{}, got {}",
                crate::hardware::MAX_CHANNEL,
                self.adc_channel
            )));
        }
        if !self.baseline_sample.is_finite() {
            return Err(ConfigError::Invalid(
                "baseline_sample must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the feature-table recording mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Number of ticks (rows) per session
    pub sample_count: usize,
    /// Where the CSV table is written
    pub output_path: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_count: 100,
            output_path: PathBuf::from("features.csv"),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
