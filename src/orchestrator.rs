use crate::audit::AuditLogger;
use crate::backup::{BackupKind, BackupRecord, BackupStore};
use crate::exec::{CommandDescriptor, CommandExecutor, ExecutionOutcome};
use crate::safety::{RiskClassifier, RiskVerdict};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything one orchestrated command produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub outcome: ExecutionOutcome,
    pub verdict: RiskVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupRecord>,
}

/// Construction parameters for an [`Orchestrator`]
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub backup_root: PathBuf,
    /// Audit log location; `None` disables the audit trail
    pub audit_log: Option<PathBuf>,
    /// Directory relative path arguments resolve against; defaults to the cwd
    pub base_dir: Option<PathBuf>,
}

/// Sequences classify → (maybe) snapshot → execute → report for every command.
///
/// Backup failures never abort a run: the command still executes and the
/// result simply carries no backup.
pub struct Orchestrator {
    classifier: RiskClassifier,
    backups: BackupStore,
    executor: Arc<dyn CommandExecutor>,
    audit: Option<AuditLogger>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        executor: Arc<dyn CommandExecutor>,
    ) -> std::io::Result<Self> {
        let classifier = match &config.base_dir {
            Some(dir) => RiskClassifier::with_base_dir(dir),
            None => RiskClassifier::new(),
        };
        let audit = config
            .audit_log
            .as_ref()
            .map(AuditLogger::with_path)
            .transpose()?;

        Ok(Self {
            classifier,
            backups: BackupStore::new(&config.backup_root),
            executor,
            audit,
        })
    }

    /// Assemble an orchestrator from already-built parts
    pub fn from_parts(
        classifier: RiskClassifier,
        backups: BackupStore,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            classifier,
            backups,
            executor,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn backups(&self) -> &BackupStore {
        &self.backups
    }

    /// Classify without executing
    pub fn assess(&self, cmd: &CommandDescriptor) -> RiskVerdict {
        self.classifier.classify(cmd)
    }

    /// Run a command through the configured executor
    pub async fn run(&self, cmd: &CommandDescriptor) -> OrchestrationResult {
        let executor = Arc::clone(&self.executor);
        self.run_with(cmd, executor.as_ref()).await
    }

    /// Run a command through a caller-supplied executor
    pub async fn run_with(
        &self,
        cmd: &CommandDescriptor,
        executor: &dyn CommandExecutor,
    ) -> OrchestrationResult {
        let verdict = self.classifier.classify(cmd);
        debug!(
            command = %cmd.command_line(),
            level = %verdict.level(),
            reasons = ?verdict.reasons(),
            "command classified"
        );

        // Only the first affected path is snapshotted
        let backup = match verdict.affected_paths().first() {
            Some(path) if verdict.backup_required() => self.snapshot(cmd, path).await,
            _ => None,
        };

        let started = Instant::now();
        let outcome = match executor.execute(cmd).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(command = %cmd.command_line(), error = %err, "execution failed");
                ExecutionOutcome::failed(err.to_string(), started.elapsed().as_millis() as u64)
            }
        };

        info!(
            command = %cmd.command_line(),
            level = %verdict.level(),
            exit_code = outcome.exit_code,
            backup = backup.as_ref().map(|b| b.id.to_string()).unwrap_or_default(),
            "command finished"
        );

        let result = OrchestrationResult {
            outcome,
            verdict,
            backup,
        };

        if let Some(audit) = &self.audit {
            if let Err(err) = audit.log_command(cmd, &result) {
                warn!(error = %err, "failed to write audit log");
            }
        }

        result
    }

    /// Run commands one after another, in order
    pub async fn run_all(&self, cmds: &[CommandDescriptor]) -> Vec<OrchestrationResult> {
        let mut results = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            results.push(self.run(cmd).await);
        }
        results
    }

    async fn snapshot(&self, cmd: &CommandDescriptor, path: &Path) -> Option<BackupRecord> {
        let store = self.backups.clone();
        let source = path.to_path_buf();

        match tokio::task::spawn_blocking(move || store.snapshot(&source, BackupKind::File)).await {
            Ok(Ok(record)) => Some(record),
            Ok(Err(err)) => {
                warn!(
                    source = %path.display(),
                    error = %err,
                    "backup failed, continuing without one"
                );
                if let Some(audit) = &self.audit {
                    if let Err(log_err) = audit.log_backup_failure(cmd, path, &err) {
                        warn!(error = %log_err, "failed to write audit log");
                    }
                }
                None
            }
            Err(join_err) => {
                warn!(source = %path.display(), error = %join_err, "backup task panicked");
                None
            }
        }
    }
}
