//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera settings.
    pub camera: CameraDefaults,

    /// Default tracking parameters.
    pub tracking: TrackingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Camera settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDefaults {
    /// Zero-based device index.
    pub index: u32,

    /// Whether to open a preview window when a display is available.
    pub preview: bool,
}

/// Default tracking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingDefaults {
    /// Sensitivity divisor applied to the raw face offset. Must be > 0.
    pub sensitivity: f64,

    /// Minimum milliseconds between audio backend updates.
    pub update_interval_ms: u64,

    /// Route balance updates through eqMac instead of system audio.
    pub eqmac: bool,

    /// Apply the cosmetic cartoon filter to the preview.
    pub cartoon_filter: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sweetspot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera: CameraDefaults::default(),
            tracking: TrackingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            index: 0,
            preview: true,
        }
    }
}

impl Default for TrackingDefaults {
    fn default() -> Self {
        Self {
            sensitivity: 0.8,
            update_interval_ms: 200,
            eqmac: false,
            cartoon_filter: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("sweetspot").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_constants() {
        let config = AppConfig::default();
        assert!((config.tracking.sensitivity - 0.8).abs() < 1e-12);
        assert_eq!(config.tracking.update_interval_ms, 200);
        assert!(!config.tracking.eqmac);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.camera.index, config.camera.index);
        assert_eq!(
            parsed.tracking.update_interval_ms,
            config.tracking.update_interval_ms
        );
    }
}
