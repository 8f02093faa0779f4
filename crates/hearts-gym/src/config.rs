use hearts_core::GameError;
use hearts_core::game::GameConfig;
use hearts_core::game::state::{DEFAULT_DECK_SIZE, DEFAULT_NUM_PLAYERS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Environment configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EnvConfig {
    #[serde(default = "default_num_players")]
    pub num_players: usize,
    #[serde(default = "default_deck_size")]
    pub deck_size: usize,
    #[serde(default)]
    pub seed: u64,
    /// Reject illegal cards instead of replacing them with a random legal one.
    #[serde(default)]
    pub mask_actions: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_players: DEFAULT_NUM_PLAYERS,
            deck_size: DEFAULT_DECK_SIZE,
            seed: 0,
            mask_actions: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: EnvConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.game_config().validate().map_err(|err| match err {
            GameError::InvalidConfig { field, message } => ValidationError::InvalidField {
                field,
                message,
            },
            other => ValidationError::InvalidField {
                field: "env".to_string(),
                message: other.to_string(),
            },
        })?;
        self.logging.validate()?;
        Ok(())
    }

    /// Engine configuration for the first game dealt from this config.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            num_players: self.num_players,
            deck_size: self.deck_size,
            seed: self.seed,
        }
    }
}

fn default_num_players() -> usize {
    DEFAULT_NUM_PLAYERS
}

fn default_deck_size() -> usize {
    DEFAULT_DECK_SIZE
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log file; stderr when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown level '{}'", self.tracing_level),
            });
        }
        if let Some(file) = &self.file {
            if file.as_os_str().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: "logging.file".to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASIC_YAML: &str = r#"
num_players: 4
deck_size: 52
seed: 42
mask_actions: true
logging:
  enable_structured: true
  tracing_level: "debug"
  format: "pretty"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: EnvConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.seed, 42);
        assert!(cfg.mask_actions);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        assert_eq!(cfg.game_config().num_players, 4);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut cfg: EnvConfig = serde_yaml::from_str("seed: 7\n").expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.num_players, DEFAULT_NUM_PLAYERS);
        assert_eq!(cfg.deck_size, DEFAULT_DECK_SIZE);
        assert!(!cfg.mask_actions);
        assert!(!cfg.logging.enable_structured);
    }

    #[test]
    fn rejects_deck_not_divisible_by_players() {
        let yaml = BASIC_YAML.replace("deck_size: 52", "deck_size: 50");
        let mut cfg: EnvConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("uneven deal");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "deck_size"
        ));
    }

    #[test]
    fn rejects_unknown_tracing_level() {
        let yaml = BASIC_YAML.replace("\"debug\"", "\"chatty\"");
        let mut cfg: EnvConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("bad level");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "logging.tracing_level"
        ));
    }

    #[test]
    fn blank_tracing_level_is_normalized() {
        let yaml = BASIC_YAML.replace("\"debug\"", "\"  \"");
        let mut cfg: EnvConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.tracing_level, "info");
    }

    #[test]
    fn from_path_reports_offending_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"num_players: 1\n").expect("write");

        let err = EnvConfig::from_path(file.path()).expect_err("too few players");
        assert_eq!(err.path(), file.path());
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn from_path_surfaces_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"num_players: [oops\n").expect("write");

        let err = EnvConfig::from_path(file.path()).expect_err("bad yaml");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EnvConfig::from_path(dir.path().join("absent.yaml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
