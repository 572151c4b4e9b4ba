pub mod settings;

pub use settings::{BackupConfig, BehaviorConfig, Config, ConfigError, ExecutionConfig, LoggingConfig};
