//! Engine tuning loaded from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "random_coefficient": 0.8, "depth": { "first_min": 4, "first_max": 10 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::eval::StageThresholds;
use crate::search::DepthSchedule;
use crate::search::ordering::CaptureRule;
use crate::search::repetition::DEFAULT_SIZE;
use crate::time::TimeConfig;

/// Largest accepted depth cap.
pub const MAX_DEPTH_LIMIT: u8 = 128;

/// All engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Opening spread: book moves are weighted by `(2 - c)^-|eval - best|`.
    /// Values near 2 play almost uniformly, values near 1 favour the top move.
    pub random_coefficient: f64,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    /// Repetition table slots, rounded up to a power of two.
    pub repetition_table_size: usize,
    pub depth: DepthSchedule,
    pub time: TimeConfig,
    pub stages: StageThresholds,
    pub capture_rule: CaptureRule,
    /// JSON opening book to load at startup.
    pub book_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            random_coefficient: 0.5,
            seed: None,
            repetition_table_size: DEFAULT_SIZE,
            depth: DepthSchedule::default(),
            time: TimeConfig::default(),
            stages: StageThresholds::default(),
            capture_rule: CaptureRule::default(),
            book_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load `path` if given, falling back to defaults on any error.
    ///
    /// The failure is logged once; it is never fatal.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded engine config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "config rejected, using defaults");
                Self::default()
            }
        }
    }

    /// Check value ranges that the schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.random_coefficient.is_finite()
            || self.random_coefficient < 0.0
            || self.random_coefficient >= 2.0
        {
            return Err(invalid("random_coefficient", "must be in [0, 2)"));
        }
        if self.repetition_table_size == 0 {
            return Err(invalid("repetition_table_size", "must be positive"));
        }

        let depth = &self.depth;
        if depth.first_max == 0 {
            return Err(invalid("depth.first_max", "must be positive"));
        }
        if depth.first_min > depth.first_max {
            return Err(invalid("depth.first_min", "must not exceed depth.first_max"));
        }
        if depth.limit < depth.first_max || depth.limit > MAX_DEPTH_LIMIT {
            return Err(invalid(
                "depth.limit",
                "must lie between depth.first_max and 128",
            ));
        }

        let fraction = self.time.deepening_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(invalid("time.deepening_fraction", "must be in (0, 1]"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.depth.first_min, 5);
        assert_eq!(config.depth.first_max, 14);
        assert_eq!(config.repetition_table_size, 1 << 21);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "random_coefficient": 0.9, "depth": { "first_min": 3 } }"#)
                .unwrap();
        assert_eq!(config.random_coefficient, 0.9);
        assert_eq!(config.depth.first_min, 3);
        assert_eq!(config.depth.first_max, 14);
        assert_eq!(config.time, TimeConfig::default());
    }

    #[test]
    fn capture_rule_parses_tagged() {
        let config =
            EngineConfig::from_json(r#"{ "capture_rule": { "kind": "exchange", "threshold": 100 } }"#)
                .unwrap();
        assert_eq!(config.capture_rule, CaptureRule::Exchange { threshold: 100 });
    }

    #[test]
    fn unknown_field_rejected() {
        let err = EngineConfig::from_json(r#"{ "hash_mb": 64 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn out_of_range_values_rejected() {
        let err = EngineConfig::from_json(r#"{ "random_coefficient": 2.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "random_coefficient", .. }));

        let err = EngineConfig::from_json(r#"{ "depth": { "first_min": 9, "first_max": 4 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "depth.first_min", .. }));

        let err = EngineConfig::from_json(r#"{ "time": { "deepening_fraction": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "time.deepening_fraction", .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default(Some(Path::new("/nonexistent/kestrel.json")));
        assert_eq!(config, EngineConfig::default());
    }
}
