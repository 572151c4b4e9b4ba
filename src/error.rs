use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::backup::BackupError;
use crate::config::settings::ConfigError;
use crate::exec::ExecutionError;
use crate::tools::ToolError;

/// Top-level application error that wraps all module-specific errors
///
/// Every module error converts into AppError via `From`, so binary code can
/// use `?` across module boundaries without losing the original context.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_backup_error_converts() {
        let err: AppError = BackupError::NotFound(PathBuf::from("/etc/x")).into();
        assert!(matches!(err, AppError::Backup(_)));
        assert!(err.to_string().contains("/etc/x"));
    }

    #[test]
    fn test_tool_error_converts() {
        let err: AppError = ToolError::UnknownTool("nope".to_string()).into();
        assert!(matches!(err, AppError::Tool(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_question_mark_conversion() {
        fn parse() -> AppResult<serde_json::Value> {
            Ok(serde_json::from_str("{not json")?)
        }
        assert!(matches!(parse(), Err(AppError::Json(_))));
    }
}
