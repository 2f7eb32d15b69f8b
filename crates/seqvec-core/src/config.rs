//! Configuration management for seqvec
//!
//! Handles loading and validation of `seqvec.toml` configuration files.
//! Every table and key is optional; missing values take the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::idempotent::DEFAULT_MAX_DRAWS;
use crate::logging::LogFormat;
use crate::sequence::{
    DEFAULT_CORRECT_SEQUENCE, DEFAULT_SENTINEL_VALUE, Sequence, SequenceSpace, Value,
};
use crate::sink::DEFAULT_OUTPUT_PATH;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Reference sequences
    #[serde(default)]
    pub sequence: SequenceConfig,

    /// Generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Also append log events to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Reference sequence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceConfig {
    /// The accepted sequence
    #[serde(default = "default_correct")]
    pub correct: Sequence,

    /// Byte repeated to form the sentinel sequence
    #[serde(default = "default_sentinel")]
    pub sentinel: Value,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            correct: default_correct(),
            sentinel: default_sentinel(),
        }
    }
}

fn default_correct() -> Sequence {
    DEFAULT_CORRECT_SEQUENCE
}

fn default_sentinel() -> Value {
    DEFAULT_SENTINEL_VALUE
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Fixed RNG seed; unset means a fresh OS seed per run
    #[serde(default)]
    pub seed: Option<u64>,

    /// Upper bound on fragments per idempotent run
    #[serde(default = "default_max_draws")]
    pub max_idempotent_draws: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_idempotent_draws: default_max_draws(),
        }
    }
}

fn default_max_draws() -> usize {
    DEFAULT_MAX_DRAWS
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Corpus YAML path
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.max_idempotent_draws == 0 {
            return Err(ConfigError::Invalid(
                "generation.max_idempotent_draws must be at least 1".to_string(),
            ));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output.path must not be empty".to_string()));
        }
        self.sequence_space().map(|_| ())
    }

    /// Build the validated sequence space
    pub fn sequence_space(&self) -> Result<SequenceSpace, ConfigError> {
        SequenceSpace::new(self.sequence.correct, self.sequence.sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert!(config.general.log_file.is_none());
        assert_eq!(config.sequence.correct, [36, 19, 56, 101, 73]);
        assert_eq!(config.sequence.sentinel, 255);
        assert_eq!(config.generation.max_idempotent_draws, 10);
        assert_eq!(config.output.path, PathBuf::from("output.yaml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml() {
        let config = Config::from_toml(
            r#"
[general]
log_format = "json"
log_file = "logs/seqvec.log"

[sequence]
correct = [1, 2, 3, 4, 5]
sentinel = 0

[generation]
seed = 42
"#,
        )
        .unwrap();
        assert_eq!(config.general.log_format, LogFormat::Json);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_file, Some(PathBuf::from("logs/seqvec.log")));
        assert_eq!(config.sequence.correct, [1, 2, 3, 4, 5]);
        assert_eq!(config.generation.seed, Some(42));
        assert_eq!(config.generation.max_idempotent_draws, 10);
        assert_eq!(config.sequence_space().unwrap().sentinel_value(), 0);
    }

    #[test]
    fn sentinel_collision_fails_validation() {
        let err = Config::from_toml("[sequence]\nsentinel = 19\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SentinelCollision {
                sentinel: 19,
                position: 1
            }
        ));
    }

    #[test]
    fn zero_draws_rejected() {
        let err = Config::from_toml("[generation]\nmax_idempotent_draws = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn wrong_sequence_length_is_parse_error() {
        let err = Config::from_toml("[sequence]\ncorrect = [1, 2, 3]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = Config::load_from(Path::new("/nonexistent/seqvec.toml")).unwrap_err();
        match err {
            ConfigError::ReadFailed { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/seqvec.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqvec.toml");
        std::fs::write(&path, "[output]\npath = \"vectors/out.yaml\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.path, PathBuf::from("vectors/out.yaml"));
    }
}
