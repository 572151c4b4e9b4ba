pub mod audit;
pub mod backup;
pub mod config;
pub mod error;
pub mod error_translation;
pub mod exec;
pub mod logging;
pub mod orchestrator;
pub mod safety;
pub mod system;
pub mod tools;
pub mod ui;

// Re-export commonly used types for convenience
pub use backup::{BackupError, BackupKind, BackupRecord, BackupStore};
pub use error::{AppError, AppResult};
pub use exec::{CommandDescriptor, CommandExecutor, ExecutionError, ExecutionOutcome, ProcessExecutor};
pub use orchestrator::{OrchestrationResult, Orchestrator, OrchestratorConfig};
pub use safety::{RiskClassifier, RiskLevel, RiskVerdict};
pub use system::SystemInfo;
pub use tools::{ToolError, ToolRegistry, ToolReport};
