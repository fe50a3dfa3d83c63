use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default smoothing window for the overlay curve on series graphs.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 50;

/// Weight magnitude above which a run is considered diverged.
pub const MAXIMUM_WEIGHT_MAGNITUDE: f64 = 1000.0;

/// Recorder configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Root under which one directory per run is created.
    pub log_root: PathBuf,
    /// Whether epoch checkpoints reach durable storage. In-memory recording
    /// is unaffected.
    pub telemetry_enabled: bool,
    pub smoothing_window: usize,
    pub max_weight_magnitude: f64,
    pub plot_width: u32,
    pub plot_height: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            log_root: PathBuf::from("logs"),
            telemetry_enabled: true,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            max_weight_magnitude: MAXIMUM_WEIGHT_MAGNITUDE,
            plot_width: 800,
            plot_height: 600,
        }
    }
}

impl RecorderConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: RecorderConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::Validation(
                "smoothing_window must be >= 1".into(),
            ));
        }
        if !self.max_weight_magnitude.is_finite() || self.max_weight_magnitude <= 0.0 {
            return Err(ConfigError::Validation(
                "max_weight_magnitude must be finite and > 0".into(),
            ));
        }
        if self.plot_width < 64 || self.plot_height < 64 {
            return Err(ConfigError::Validation(
                "plot_width and plot_height must be >= 64".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&RecorderConfig::default())
    }
}
