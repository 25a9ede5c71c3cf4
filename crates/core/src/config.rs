use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::formatter::DEFAULT_MAX_COLUMN_WIDTH;
use crate::gateway::DEFAULT_ROW_LIMIT;

const DEFAULT_TICK_RATE_MS: u64 = 120;
const MIN_COLUMN_WIDTH: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory is unavailable for this platform")]
    ConfigDirUnavailable,
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowserConfig {
    pub max_column_width: usize,
    pub row_limit: usize,
    pub tick_rate_ms: u64,
    pub log: LogConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            row_limit: DEFAULT_ROW_LIMIT,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            log: LogConfig::default(),
        }
    }
}

impl BrowserConfig {
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path()?;
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_column_width < MIN_COLUMN_WIDTH {
            return Err(ConfigError::Invalid {
                field: "max_column_width",
                reason: format!("must be at least {MIN_COLUMN_WIDTH}"),
            });
        }
        if self.row_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "row_limit",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(custom) = env::var_os("BROWSEQL_CONFIG_DIR") {
        return Ok(PathBuf::from(custom).join("config.toml"));
    }

    let base_dir = if cfg!(target_os = "windows") {
        env::var_os("APPDATA")
            .map(PathBuf::from)
            .ok_or(ConfigError::ConfigDirUnavailable)?
    } else if let Some(xdg_config_home) = env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home)
    } else {
        let home = env::var_os("HOME").ok_or(ConfigError::ConfigDirUnavailable)?;
        PathBuf::from(home).join(".config")
    };

    Ok(base_dir.join("browseql").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::{BrowserConfig, ConfigError};

    #[test]
    fn missing_or_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("config.toml");

        let config = BrowserConfig::load_from_path(&path).expect("missing file should load");
        assert_eq!(config, BrowserConfig::default());

        fs::write(&path, "   \n").expect("failed to write config");
        let config = BrowserConfig::load_from_path(&path).expect("empty file should load");
        assert_eq!(config.max_column_width, 30);
        assert_eq!(config.row_limit, 100);
        assert_eq!(config.tick_rate(), Duration::from_millis(120));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "row_limit = 250\n\n[log]\nlevel = \"debug\"\nfile = \"/tmp/browseql.log\"\n",
        )
        .expect("failed to write config");

        let config = BrowserConfig::load_from_path(&path).expect("config should parse");
        assert_eq!(config.row_limit, 250);
        assert_eq!(config.max_column_width, 30);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/browseql.log")));
    }

    #[test]
    fn malformed_file_reports_path() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "row_limit = \"many\"").expect("failed to write config");

        let error = BrowserConfig::load_from_path(&path).expect_err("parse should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("config.toml"));
    }

    #[test]
    fn rejects_unusable_limits() {
        let config = BrowserConfig {
            max_column_width: 2,
            ..BrowserConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "max_column_width",
                ..
            })
        ));

        let config = BrowserConfig {
            row_limit: 0,
            ..BrowserConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "row_limit",
                ..
            })
        ));
    }
}
