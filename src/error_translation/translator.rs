use crate::backup::BackupError;
use crate::error::AppError;
use crate::exec::ExecutionError;
use crate::tools::ToolError;

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Translate an AppError into a user-friendly error message
    pub fn translate_app_error(error: &AppError) -> UserFriendlyError {
        let raw_error = error.to_string();

        let (simple_message, suggestion) = match error {
            AppError::Backup(backup_err) => Self::backup_message(backup_err),
            AppError::Execution(exec_err) => match exec_err {
                ExecutionError::Timeout { timeout_ms, .. } => (
                    format!("Command did not finish within {timeout_ms} ms."),
                    Some("Raise the timeout or check whether the command is waiting for input".to_string()),
                ),
                ExecutionError::SpawnFailure { .. } => (
                    "Command could not be started.".to_string(),
                    Some("Check that the program is installed and on PATH".to_string()),
                ),
            },
            AppError::Config(_) => (
                "Configuration error occurred.".to_string(),
                Some("Check your config file at ~/.config/sysguard/config.toml".to_string()),
            ),
            AppError::Tool(tool_err) => Self::tool_message(tool_err),
            AppError::Json(_) => (
                "Tool parameters are not valid JSON.".to_string(),
                Some("Run `sysguard tools` to see each tool's parameter schema".to_string()),
            ),
            AppError::Cancelled => ("Nothing was run.".to_string(), None),
            AppError::Io(_) => (
                "I/O error occurred.".to_string(),
                Some("Check file permissions and disk space".to_string()),
            ),
        };

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error,
        }
    }

    /// Explain a failed command from its stderr
    pub fn translate_output(stderr: &str) -> UserFriendlyError {
        let (simple_message, suggestion) = Self::match_error_patterns(stderr);

        UserFriendlyError {
            simple_message,
            suggestion,
            raw_error: stderr.to_string(),
        }
    }

    fn backup_message(error: &BackupError) -> (String, Option<String>) {
        match error {
            BackupError::NotFound(_) => ("The file to back up does not exist.".to_string(), None),
            BackupError::PermissionDenied(_) => (
                "Not allowed to read the file to back up.".to_string(),
                Some("Re-run with sufficient privileges".to_string()),
            ),
            BackupError::KindMismatch { .. } => (
                "Backup kind does not match the source.".to_string(),
                Some("Snapshot directories with the directory kind".to_string()),
            ),
            BackupError::UnsupportedKind(_) => (
                "That kind of resource cannot be snapshotted.".to_string(),
                None,
            ),
            BackupError::IoFailure { .. } => (
                "Backup failed part way through.".to_string(),
                Some("Check free space under the backup root".to_string()),
            ),
        }
    }

    fn tool_message(error: &ToolError) -> (String, Option<String>) {
        match error {
            ToolError::UnknownTool(_) => (
                "No tool with that name.".to_string(),
                Some("Run `sysguard tools` to list the available tools".to_string()),
            ),
            ToolError::InvalidParams { .. } | ToolError::InvalidArgument(_) => (
                "Tool parameters were rejected.".to_string(),
                Some("Run `sysguard tools` to see each tool's parameter schema".to_string()),
            ),
            ToolError::NoPackageManager => (
                "No supported package manager was found on this system.".to_string(),
                Some("Supported: apt, yum, dnf, pacman, zypper, apk, brew".to_string()),
            ),
            ToolError::Unsupported(_) => ("That operation is not supported here.".to_string(), None),
        }
    }

    /// Match common command failure patterns and provide user-friendly messages
    fn match_error_patterns(error_text: &str) -> (String, Option<String>) {
        let lower = error_text.to_lowercase();

        // Privileges
        if lower.contains("permission denied")
            || lower.contains("operation not permitted")
            || lower.contains("are you root")
            || lower.contains("must be run as root")
        {
            return (
                "The command needs more privileges.".to_string(),
                Some("Set execution.elevation_command = \"sudo\" in the config, or run as root".to_string()),
            );
        }

        // Package manager lock
        if lower.contains("could not get lock") || lower.contains("waiting for cache lock") {
            return (
                "Another package manager process is running.".to_string(),
                Some("Wait for it to finish and try again".to_string()),
            );
        }

        // Unknown package
        if lower.contains("unable to locate package")
            || lower.contains("no match for argument")
            || lower.contains("target not found")
        {
            return (
                "Package not found in the configured repositories.".to_string(),
                Some("Refresh package lists first, or check the package name".to_string()),
            );
        }

        // Unknown unit
        if lower.contains("could not be found") && lower.contains("unit") {
            return (
                "Service not found.".to_string(),
                Some("List units with: systemctl list-units --type=service".to_string()),
            );
        }

        // Missing process
        if lower.contains("no such process") {
            return ("No process with that id is running.".to_string(), None);
        }

        // Missing file
        if lower.contains("no such file or directory") {
            return (
                "A file or directory in the command does not exist.".to_string(),
                Some("Check the paths and try again".to_string()),
            );
        }

        // Missing program
        if lower.contains("command not found") || lower.contains("not found in path") {
            return (
                "Program is not installed.".to_string(),
                Some("Install it with: sysguard install <package>".to_string()),
            );
        }

        // Disk full
        if lower.contains("no space left on device") {
            return (
                "The disk is full.".to_string(),
                Some("Free space with: sysguard cleanup <dir>".to_string()),
            );
        }

        // Network
        if lower.contains("temporary failure resolving") || lower.contains("could not resolve host") {
            return (
                "Could not reach the package mirrors.".to_string(),
                Some("Check your network connection and DNS".to_string()),
            );
        }

        // Default: return the error as-is with no suggestion
        (error_text.trim().to_string(), None)
    }
}
