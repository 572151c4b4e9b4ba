use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub backup: BackupConfig,
    pub execution: ExecutionConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BackupConfig {
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub default_timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_command: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    pub confirm_risky_ops: bool,
    pub log_commands: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("sysguard"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path of the audit log that sits beside the config file
    pub fn history_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("history.log"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ReadError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Config file not found",
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        // Validate config
        config.validate()?;

        Ok(config)
    }

    /// Load the given file (or the default location), falling back to defaults when absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Ok(path) => path,
                Err(ConfigError::DirectoryNotFound) => return Ok(Self::default_config()),
                Err(e) => return Err(e),
            },
        };

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Validate before saving
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        let backup_root = Self::config_dir()
            .map(|dir| dir.join("backups"))
            .unwrap_or_else(|_| std::env::temp_dir().join("sysguard-backups"));

        Config {
            backup: BackupConfig { root: backup_root },
            execution: ExecutionConfig {
                default_timeout_ms: crate::exec::DEFAULT_TIMEOUT_MS,
                elevation_command: None,
            },
            behavior: BehaviorConfig {
                confirm_risky_ops: true,
                log_commands: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup.root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "backup root must not be empty".to_string(),
            ));
        }

        if self.execution.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "default_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(elevation) = &self.execution.elevation_command {
            if elevation.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "elevation_command must not be empty when set".to_string(),
                ));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "Unknown log level: {}. Expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
