use crate::exec::CommandDescriptor;
use crate::orchestrator::{OrchestrationResult, Orchestrator};
use crate::safety::RiskVerdict;
use crate::system::SystemInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Invalid parameters for {tool}: {source}")]
    InvalidParams {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No supported package manager found")]
    NoPackageManager,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// An administrative capability that turns JSON parameters into host commands.
///
/// Planning is pure apart from reading host facts; nothing runs until the
/// registry hands the plan to an [`Orchestrator`].
pub trait AdminTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the accepted parameters
    fn input_schema(&self) -> Value;

    fn plan(&self, params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError>;
}

/// Commands a tool intends to run, in order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPlan {
    pub tool: String,
    pub commands: Vec<CommandDescriptor>,
    /// Dry runs are previewed but never executed
    pub dry_run: bool,
    /// Set by tools whose commands destroy data however they classify
    pub destructive: bool,
    pub details: Value,
}

impl ToolPlan {
    pub fn new<S: Into<String>>(tool: S, commands: Vec<CommandDescriptor>) -> Self {
        Self {
            tool: tool.into(),
            commands,
            dry_run: false,
            destructive: false,
            details: Value::Null,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_destructive(mut self, destructive: bool) -> Self {
        self.destructive = destructive;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Whether the plan needs the user's go-ahead: it is destructive, or
    /// some planned command is classified as needing confirmation
    pub fn requires_confirmation(&self, orchestrator: &Orchestrator) -> bool {
        self.destructive
            || self
                .commands
                .iter()
                .any(|cmd| orchestrator.assess(cmd).confirmation_required())
    }
}

/// A planned command with the verdict it would receive
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPreview {
    pub command: String,
    pub description: String,
    pub verdict: RiskVerdict,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReport {
    pub tool: String,
    pub success: bool,
    pub dry_run: bool,
    pub results: Vec<OrchestrationResult>,
    pub previews: Vec<CommandPreview>,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
}

/// Named collection of tools sharing one view of the host
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn AdminTool>>,
    system: SystemInfo,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new(system: SystemInfo) -> Self {
        Self {
            tools: BTreeMap::new(),
            system,
        }
    }

    /// Registry with every built-in tool
    pub fn with_defaults(system: SystemInfo) -> Self {
        let mut registry = Self::new(system);
        registry.register(Box::new(super::InstallPackageTool));
        registry.register(Box::new(super::RemovePackageTool));
        registry.register(Box::new(super::SystemInfoTool));
        registry.register(Box::new(super::ExecuteCommandTool));
        registry.register(Box::new(super::ManageServiceTool));
        registry.register(Box::new(super::CleanupFilesTool));
        registry.register(Box::new(super::ManageProcessesTool));
        registry.register(Box::new(super::UpdateSystemTool));
        registry
    }

    /// Add a tool, replacing any previous tool with the same name
    pub fn register(&mut self, tool: Box<dyn AdminTool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AdminTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    /// `{name, description, inputSchema}` for every tool, sorted by name
    pub fn schemas(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect()
    }

    pub fn plan(&self, name: &str, params: Value) -> Result<ToolPlan, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let plan = tool.plan(params, &self.system)?;
        debug!(tool = name, commands = plan.commands.len(), "tool planned");
        Ok(plan)
    }

    /// Classify every planned command without running anything
    pub fn preview(&self, plan: &ToolPlan, orchestrator: &Orchestrator) -> Vec<CommandPreview> {
        plan.commands
            .iter()
            .map(|cmd| CommandPreview {
                command: cmd.command_line(),
                description: cmd.description().to_string(),
                verdict: orchestrator.assess(cmd),
            })
            .collect()
    }

    /// Run a plan through the orchestrator; dry runs stop after the preview
    pub async fn execute(&self, plan: ToolPlan, orchestrator: &Orchestrator) -> ToolReport {
        let previews = self.preview(&plan, orchestrator);

        let results = if plan.dry_run {
            Vec::new()
        } else {
            orchestrator.run_all(&plan.commands).await
        };

        let success = results.iter().all(|r| r.outcome.succeeded);
        info!(
            tool = %plan.tool,
            dry_run = plan.dry_run,
            commands = plan.commands.len(),
            success,
            "tool finished"
        );

        ToolReport {
            tool: plan.tool,
            success,
            dry_run: plan.dry_run,
            results,
            previews,
            details: plan.details,
            timestamp: Utc::now(),
        }
    }

    /// Plan and execute in one step
    pub async fn invoke(
        &self,
        name: &str,
        params: Value,
        orchestrator: &Orchestrator,
    ) -> Result<ToolReport, ToolError> {
        let plan = self.plan(name, params)?;
        Ok(self.execute(plan, orchestrator).await)
    }
}

/// Deserialize tool parameters; a missing (`null`) body counts as `{}`
pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, ToolError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|source| ToolError::InvalidParams {
        tool: tool.to_string(),
        source,
    })
}

/// Turn a package-manager argv into a descriptor, or report why there is none
pub(crate) fn argv_command(
    argv: Option<Vec<String>>,
    missing: impl FnOnce() -> ToolError,
) -> Result<CommandDescriptor, ToolError> {
    argv.as_deref()
        .and_then(CommandDescriptor::from_argv::<String>)
        .ok_or_else(missing)
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArgument(format!(
            "{field} is required and must be a non-empty string"
        )));
    }
    Ok(())
}

pub(crate) fn default_true() -> bool {
    true
}
