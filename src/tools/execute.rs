use super::registry::{AdminTool, ToolError, ToolPlan, parse_params, require_non_empty};
use crate::exec::{CommandDescriptor, DEFAULT_TIMEOUT_MS};
use crate::system::SystemInfo;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteParams {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    timeout: u64,
}

/// `execute_command`: run an arbitrary program under classification
pub struct ExecuteCommandTool;

impl AdminTool for ExecuteCommandTool {
    fn name(&self) -> &'static str {
        "execute_command"
    }

    fn description(&self) -> &'static str {
        "Execute a system command with safety validation"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Command to execute"
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Command arguments"
                },
                "workingDir": {
                    "type": "string",
                    "description": "Working directory for command execution"
                },
                "timeout": {
                    "type": "number",
                    "default": DEFAULT_TIMEOUT_MS,
                    "description": "Timeout in milliseconds"
                }
            },
            "required": ["command"]
        })
    }

    fn plan(&self, params: Value, _system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: ExecuteParams = parse_params(self.name(), params)?;
        require_non_empty("command", &params.command)?;
        if params.timeout == 0 {
            return Err(ToolError::InvalidArgument(
                "timeout must be greater than 0".to_string(),
            ));
        }

        let description = format!("Execute: {} {}", params.command, params.args.join(" "));
        let mut command = CommandDescriptor::new(params.command.trim(), params.args)
            .with_timeout_ms(params.timeout)
            .with_description(description.trim_end());
        if let Some(dir) = params.working_dir {
            command = command.with_working_dir(dir);
        }

        Ok(ToolPlan::new(self.name(), vec![command]))
    }
}
