pub mod command;
pub mod executor;

// Re-export commonly used types
pub use command::CommandDescriptor;
pub use executor::{
    CommandExecutor, DEFAULT_TIMEOUT_MS, ExecutionError, ExecutionOutcome, ProcessExecutor,
};
