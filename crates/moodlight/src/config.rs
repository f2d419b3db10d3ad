use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be within [0, 1] (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Engine tunables.
///
/// Every constant here is empirically chosen; the defaults are the values
/// the engine was tuned with. Windows must be positive and smoothing
/// factors must stay within [0, 1] — [`EngineConfig::validate`] enforces
/// both at construction time, the engine's only failure point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rolling window for scale/key estimation, seconds
    pub scale_window_s: f64,
    /// Minimum gap between scale recomputations, seconds
    pub scale_refresh_s: f64,
    /// How long a candidate chord must persist before acceptance, ms
    pub stability_ms: u64,
    /// How long an accepted chord is kept before a replacement may land, ms
    pub hold_ms: u64,
    /// Confidence improvement a replacement chord must show
    pub improvement_margin: f64,
    /// EMA factor for the emotion vector, per tick
    pub emotion_alpha: f64,
    /// EMA factor for smoothed velocity and note rate, per ingest
    pub energy_alpha: f64,
    /// Weight of the chord contribution when blending emotion
    pub chord_weight: f64,
    /// Weight of the scale contribution when blending emotion
    pub scale_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_window_s: 3.0,
            scale_refresh_s: 1.0,
            stability_ms: 300,
            hold_ms: 800,
            improvement_margin: 0.05,
            emotion_alpha: 0.15,
            energy_alpha: 0.2,
            chord_weight: 0.6,
            scale_weight: 0.5,
        }
    }
}

impl EngineConfig {
    /// Check every tunable. Non-positive windows and out-of-range smoothing
    /// factors are construction-time input errors, not recoverable state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("scale_window_s", self.scale_window_s),
            ("scale_refresh_s", self.scale_refresh_s),
            ("stability_ms", self.stability_ms as f64),
            ("hold_ms", self.hold_ms as f64),
        ];
        for (field, value) in positive {
            // TOML accepts `nan` and `inf`; both would blow up later in
            // Duration::from_secs_f64, so they must die here.
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let unit_range = [
            ("emotion_alpha", self.emotion_alpha),
            ("energy_alpha", self.energy_alpha),
            ("improvement_margin", self.improvement_margin),
        ];
        for (field, value) in unit_range {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        // Blend weights scale independent contributions before
        // normalization, so they only need to be non-negative.
        for (field, value) in [
            ("chord_weight", self.chord_weight),
            ("scale_weight", self.scale_weight),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }

    /// Load from a TOML file, falling back to compiled defaults when the
    /// file does not exist. Unknown fields are ignored; present fields
    /// override defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn scale_window(&self) -> Duration {
        Duration::from_secs_f64(self.scale_window_s)
    }

    pub fn scale_refresh(&self) -> Duration {
        Duration::from_secs_f64(self.scale_refresh_s)
    }

    pub fn stability(&self) -> Duration {
        Duration::from_millis(self.stability_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stability_ms, 300);
        assert_eq!(config.hold_ms, 800);
        assert_eq!(config.scale_window_s, 3.0);
    }

    #[test]
    fn non_positive_window_rejected() {
        let config = EngineConfig {
            scale_window_s: 0.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "scale_window_s",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_alpha_rejected() {
        let config = EngineConfig {
            emotion_alpha: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::OutOfRange {
                field: "emotion_alpha",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_window_rejected() {
        // nan slips past a plain `<= 0.0` check and would panic later in
        // Duration::from_secs_f64, so validation must catch it first.
        let config = EngineConfig {
            scale_window_s: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::NonFinite {
                field: "scale_window_s",
                ..
            }
        ));

        let config = EngineConfig {
            scale_refresh_s: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::NonFinite {
                field: "scale_refresh_s",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_weight_rejected() {
        let config = EngineConfig {
            chord_weight: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::NonFinite {
                field: "chord_weight",
                ..
            }
        ));
    }

    #[test]
    fn nan_in_file_rejected_at_load() {
        // TOML happily parses `nan`; it must not survive load_from.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scale_window_s = nan").unwrap();

        assert!(matches!(
            EngineConfig::load_from(file.path()).unwrap_err(),
            ConfigError::NonFinite {
                field: "scale_window_s",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = EngineConfig::load_from(Path::new("/nonexistent/moodlight.toml")).unwrap();
        assert_eq!(config.stability_ms, EngineConfig::default().stability_ms);
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stability_ms = 450\nhold_ms = 1200").unwrap();

        let config = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.stability_ms, 450);
        assert_eq!(config.hold_ms, 1200);
        // untouched field keeps its default
        assert_eq!(config.scale_window_s, 3.0);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stability_ms = \"soon\"").unwrap();

        assert!(matches!(
            EngineConfig::load_from(file.path()).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn invalid_values_in_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hold_ms = 0").unwrap();

        assert!(matches!(
            EngineConfig::load_from(file.path()).unwrap_err(),
            ConfigError::NonPositive { field: "hold_ms", .. }
        ));
    }
}
