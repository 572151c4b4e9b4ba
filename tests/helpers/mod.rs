#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sysguard::backup::BackupStore;
use sysguard::exec::{CommandDescriptor, CommandExecutor, ExecutionError, ExecutionOutcome};
use sysguard::orchestrator::Orchestrator;
use sysguard::safety::RiskClassifier;
use sysguard::system::{PackageManager, SystemInfo};
use tempfile::TempDir;

/// How a [`MockExecutor`] answers every command
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    Succeed,
    Exit(i32),
    TimeOut,
    FailToSpawn,
}

/// Executor that records each command line instead of running it
pub struct MockExecutor {
    behavior: MockBehavior,
    seen: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, cmd: &CommandDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
        self.seen.lock().unwrap().push(cmd.command_line());

        match self.behavior {
            MockBehavior::Succeed => Ok(ExecutionOutcome {
                succeeded: true,
                exit_code: 0,
                stdout: format!("mock: {}", cmd.command_line()),
                stderr: String::new(),
                duration_ms: 1,
                failure_message: None,
            }),
            MockBehavior::Exit(code) => Ok(ExecutionOutcome {
                succeeded: false,
                exit_code: code,
                stdout: String::new(),
                stderr: "mock failure".to_string(),
                duration_ms: 1,
                failure_message: Some(format!("Command exited with code {code}")),
            }),
            MockBehavior::TimeOut => Err(ExecutionError::Timeout {
                command: cmd.command_line(),
                timeout_ms: cmd.timeout_ms().unwrap_or(1),
            }),
            MockBehavior::FailToSpawn => Err(ExecutionError::SpawnFailure {
                command: cmd.command_line(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
            }),
        }
    }
}

/// Orchestrator rooted in a temp dir, backed by `executor`
pub fn test_orchestrator(temp_dir: &TempDir, executor: Arc<dyn CommandExecutor>) -> Orchestrator {
    Orchestrator::from_parts(
        RiskClassifier::with_base_dir(temp_dir.path()),
        BackupStore::new(temp_dir.path().join("backups")),
        executor,
    )
}

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// Small directory tree with nested files
pub fn create_test_tree() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");

    write_file(&root, "a.txt", "alpha");
    write_file(&root, "nested/b.txt", "bravo");
    write_file(&root, "nested/deeper/c.log", "charlie");

    (temp_dir, root)
}

/// Linux host facts with a chosen package manager
pub fn linux_system(pm: PackageManager) -> SystemInfo {
    SystemInfo {
        os: "linux".to_string(),
        distro: "Ubuntu 24.04.1 LTS".to_string(),
        kernel: "6.8.0-45-generic".to_string(),
        arch: "x86_64".to_string(),
        package_manager: pm,
        shell: "/bin/bash".to_string(),
        user: "tester".to_string(),
        is_root: false,
    }
}
