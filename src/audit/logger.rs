use crate::backup::BackupError;
use crate::exec::CommandDescriptor;
use crate::orchestrator::OrchestrationResult;
use crate::safety::RiskLevel;
use chrono::Utc;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Size at which `history.log` is moved aside to `history.log.1`
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// One line of the audit trail, before the timestamp and user are prefixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEntry {
    Command {
        level: RiskLevel,
        backup_id: Option<String>,
        exit_code: i32,
        command_line: String,
    },
    BackupFailed {
        source: PathBuf,
        reason: String,
        command_line: String,
    },
}

impl AuditEntry {
    pub fn command(cmd: &CommandDescriptor, result: &OrchestrationResult) -> Self {
        AuditEntry::Command {
            level: result.verdict.level(),
            backup_id: result.backup.as_ref().map(|b| b.id.to_string()),
            exit_code: result.outcome.exit_code,
            command_line: cmd.command_line(),
        }
    }

    pub fn backup_failed(cmd: &CommandDescriptor, source: &Path, error: &BackupError) -> Self {
        AuditEntry::BackupFailed {
            source: source.to_path_buf(),
            reason: error.to_string(),
            command_line: cmd.command_line(),
        }
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEntry::Command {
                level,
                backup_id,
                exit_code,
                command_line,
            } => write!(
                f,
                "[risk:{}] [backup:{}] [exit:{}] {}",
                level,
                backup_id.as_deref().unwrap_or("none"),
                exit_code,
                command_line
            ),
            AuditEntry::BackupFailed {
                source,
                reason,
                command_line,
            } => write!(
                f,
                "[BACKUP-FAILED] source=\"{}\" reason=\"{}\" command=\"{}\"",
                source.display(),
                reason,
                command_line
            ),
        }
    }
}

/// Append-only, size-rotated record of every orchestrated command
#[derive(Debug, Clone)]
pub struct AuditLogger {
    path: PathBuf,
    max_size: u64,
}

impl AuditLogger {
    /// Log to `path`, creating its parent directory
    pub fn with_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path,
            max_size: DEFAULT_MAX_LOG_SIZE,
        })
    }

    /// Rotate once the log grows past `bytes`
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    pub fn log_path(&self) -> &Path {
        &self.path
    }

    pub fn log_command(&self, cmd: &CommandDescriptor, result: &OrchestrationResult) -> io::Result<()> {
        self.record(&AuditEntry::command(cmd, result))
    }

    pub fn log_backup_failure(
        &self,
        cmd: &CommandDescriptor,
        source: &Path,
        error: &BackupError,
    ) -> io::Result<()> {
        self.record(&AuditEntry::backup_failed(cmd, source, error))
    }

    /// Append `entry` as `[rfc3339] [user] <entry>`
    pub fn record(&self, entry: &AuditEntry) -> io::Result<()> {
        self.rotate_if_needed()?;

        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        let line = format!("[{}] [{}] {}\n", Utc::now().to_rfc3339(), user, entry);

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    /// Path the current log is moved to on rotation
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    fn rotate_if_needed(&self) -> io::Result<()> {
        let size = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };

        if size > self.max_size {
            // Only one generation is kept
            fs::rename(&self.path, self.rotated_path())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecutionOutcome;
    use crate::safety::RiskClassifier;
    use tempfile::TempDir;

    fn result_for(cmd: &CommandDescriptor, exit_code: i32) -> OrchestrationResult {
        OrchestrationResult {
            outcome: ExecutionOutcome {
                succeeded: exit_code == 0,
                exit_code,
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: 1,
                failure_message: None,
            },
            verdict: RiskClassifier::with_base_dir("/").classify(cmd),
            backup: None,
        }
    }

    fn logger_in(temp_dir: &TempDir) -> AuditLogger {
        AuditLogger::with_path(temp_dir.path().join("history.log")).unwrap()
    }

    #[test]
    fn test_parent_directory_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("history.log");

        let logger = AuditLogger::with_path(&path).unwrap();
        assert_eq!(logger.log_path(), path);
        assert!(temp_dir.path().join("a/b").is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_command_line_format() {
        let temp_dir = TempDir::new().unwrap();
        let logger = logger_in(&temp_dir);

        let cmd = CommandDescriptor::new("chmod", ["777", "/etc/passwd"]);
        logger.log_command(&cmd, &result_for(&cmd, 0)).unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        let line = content.lines().next().unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("[risk:HIGH] [backup:none] [exit:0] chmod 777 /etc/passwd"));
    }

    #[test]
    fn test_entries_append_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let logger = logger_in(&temp_dir);

        let cmds = [
            CommandDescriptor::new("ps", ["aux"]),
            CommandDescriptor::new("apt", ["install", "-y", "curl"]),
            CommandDescriptor::new("systemctl", ["restart", "missing"]),
        ];
        for (i, cmd) in cmds.iter().enumerate() {
            logger.log_command(cmd, &result_for(cmd, i as i32)).unwrap();
        }

        let content = fs::read_to_string(logger.log_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[risk:SAFE]") && lines[0].contains("[exit:0]"));
        assert!(lines[1].contains("[risk:LOW]") && lines[1].contains("[exit:1]"));
        assert!(lines[2].contains("[risk:MEDIUM]") && lines[2].contains("[exit:2]"));
    }

    #[test]
    fn test_rotation_keeps_one_generation() {
        let temp_dir = TempDir::new().unwrap();
        let logger = logger_in(&temp_dir).with_max_size(64);
        let cmd = CommandDescriptor::new("echo", ["x".repeat(100)]);

        logger.log_command(&cmd, &result_for(&cmd, 0)).unwrap();
        assert!(!logger.rotated_path().exists());

        // The log is now over the cap, so this write rotates first
        let small = CommandDescriptor::new("ps", ["aux"]);
        logger.log_command(&small, &result_for(&small, 0)).unwrap();

        assert_eq!(logger.rotated_path(), temp_dir.path().join("history.log.1"));
        assert!(fs::read_to_string(logger.rotated_path()).unwrap().contains("echo"));
        let current = fs::read_to_string(logger.log_path()).unwrap();
        assert_eq!(current.lines().count(), 1);
        assert!(current.contains("ps aux"));
    }

    #[test]
    fn test_backup_failure_entry() {
        let temp_dir = TempDir::new().unwrap();
        let logger = logger_in(&temp_dir);

        let cmd = CommandDescriptor::new("rm", ["/etc/missing.conf"]);
        let error = BackupError::NotFound(PathBuf::from("/etc/missing.conf"));
        logger
            .log_backup_failure(&cmd, Path::new("/etc/missing.conf"), &error)
            .unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[BACKUP-FAILED] source=\"/etc/missing.conf\""));
        assert!(content.contains("not found"));
        assert!(content.contains("command=\"rm /etc/missing.conf\""));
    }

    #[test]
    fn test_entry_display_with_backup() {
        let entry = AuditEntry::Command {
            level: RiskLevel::Destructive,
            backup_id: Some("abc".to_string()),
            exit_code: -1,
            command_line: "rm -rf /srv/data".to_string(),
        };
        assert_eq!(
            entry.to_string(),
            "[risk:DESTRUCTIVE] [backup:abc] [exit:-1] rm -rf /srv/data"
        );
    }
}
