use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single host command, described but not yet run.
///
/// Built once through the consuming builder methods and never mutated
/// afterwards; everything downstream borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    executable: String,
    arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    working_dir: Option<PathBuf>,
    #[serde(default)]
    requires_root: bool,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl CommandDescriptor {
    pub fn new<S, I, A>(executable: S, arguments: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            working_dir: None,
            requires_root: false,
            description: String::new(),
            timeout_ms: None,
        }
    }

    /// Build a descriptor from a program and argument vector, e.g. `["apt", "install"]`.
    ///
    /// Returns `None` for an empty vector.
    pub fn from_argv<A: AsRef<str>>(argv: &[A]) -> Option<Self> {
        let (program, rest) = argv.split_first()?;
        Some(Self::new(
            program.as_ref(),
            rest.iter().map(|a| a.as_ref().to_string()),
        ))
    }

    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_root(mut self, requires_root: bool) -> Self {
        self.requires_root = requires_root;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn requires_root(&self) -> bool {
        self.requires_root
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Executable followed by the space-joined arguments
    pub fn command_line(&self) -> String {
        if self.arguments.is_empty() {
            return self.executable.clone();
        }
        format!("{} {}", self.executable, self.arguments.join(" "))
    }
}
