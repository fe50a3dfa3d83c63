use std::path::PathBuf;

/// Errors that can occur while recording or persisting run telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("agent weights have surpassed reasonable values: max magnitude {max_magnitude} exceeds {limit}")]
    Divergence { max_magnitude: f64, limit: f64 },

    #[error("failed to create run directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render plot {path}: {message}")]
    Plot { path: PathBuf, message: String },

    #[error("failed to extract model snapshot: {0}")]
    Snapshot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_error_display() {
        let err = TelemetryError::Divergence {
            max_magnitude: 1001.0,
            limit: 1000.0,
        };
        assert_eq!(
            err.to_string(),
            "agent weights have surpassed reasonable values: max magnitude 1001 exceeds 1000"
        );
    }

    #[test]
    fn test_write_error_display() {
        let err = TelemetryError::Write {
            path: PathBuf::from("logs/run/actions.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write logs/run/actions.json: denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("smoothing_window must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: smoothing_window must be >= 1"
        );
    }
}
