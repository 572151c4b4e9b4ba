use crate::exec::CommandDescriptor;
use crate::system::is_root;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Default timeout applied when a command carries none
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised by an executor before a command produces an outcome
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Command '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of running a command, relayed verbatim to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl ExecutionOutcome {
    /// Outcome for a command that never produced output
    pub fn failed<S: Into<String>>(message: S, duration_ms: u64) -> Self {
        let message = message.into();
        Self {
            succeeded: false,
            exit_code: -1,
            stdout: String::new(),
            stderr: message.clone(),
            duration_ms,
            failure_message: Some(message),
        }
    }
}

/// Runs commands on behalf of the orchestrator
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and report what happened
    async fn execute(&self, cmd: &CommandDescriptor) -> Result<ExecutionOutcome, ExecutionError>;
}

/// Executes commands as child processes, without a shell
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    default_timeout: Duration,
    elevation_command: Option<String>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            elevation_command: None,
        }
    }

    /// Timeout used when the command does not carry its own
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Prefix for commands that declare a root requirement, e.g. `sudo`.
    ///
    /// Only applied when the current process is not already root.
    pub fn with_elevation<S: Into<String>>(mut self, command: Option<S>) -> Self {
        self.elevation_command = command.map(Into::into);
        self
    }

    /// Program and argument vector actually spawned for `cmd`
    pub fn argv(&self, cmd: &CommandDescriptor) -> (String, Vec<String>) {
        match &self.elevation_command {
            Some(elevation) if cmd.requires_root() && !is_root() => {
                let mut args = Vec::with_capacity(cmd.arguments().len() + 1);
                args.push(cmd.executable().to_string());
                args.extend(cmd.arguments().iter().cloned());
                (elevation.clone(), args)
            }
            _ => (cmd.executable().to_string(), cmd.arguments().to_vec()),
        }
    }

    fn process_output(&self, output: Output, started: Instant) -> ExecutionOutcome {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        // Killed by a signal
        let exit_code = output.status.code().unwrap_or(-1);
        let succeeded = output.status.success();

        let failure_message = (!succeeded).then(|| {
            format!("Command exited with code {}: {}", exit_code, stderr.trim())
        });

        ExecutionOutcome {
            succeeded,
            exit_code,
            stdout,
            stderr,
            duration_ms: started.elapsed().as_millis() as u64,
            failure_message,
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, cmd: &CommandDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
        let (program, args) = self.argv(cmd);
        let timeout = cmd
            .timeout_ms()
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);

        debug!(program = %program, ?args, timeout_ms = timeout.as_millis() as u64, "spawning command");

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cmd.working_dir() {
            command.current_dir(dir);
        }

        let started = Instant::now();
        let child = command.spawn().map_err(|source| ExecutionError::SpawnFailure {
            command: cmd.command_line(),
            source,
        })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(self.process_output(output, started)),
            Ok(Err(source)) => Err(ExecutionError::SpawnFailure {
                command: cmd.command_line(),
                source,
            }),
            Err(_) => Err(ExecutionError::Timeout {
                command: cmd.command_line(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
