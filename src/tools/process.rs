use super::registry::{AdminTool, ToolError, ToolPlan, parse_params};
use crate::exec::CommandDescriptor;
use crate::system::SystemInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Signal names accepted by `kill -SIG` and `pkill -SIG`
pub const KNOWN_SIGNALS: &[&str] = &[
    "HUP", "INT", "QUIT", "ABRT", "KILL", "USR1", "USR2", "ALRM", "TERM", "CONT", "STOP", "TSTP",
];

const PS_INFO_FORMAT: &str = "pid,ppid,user,time,comm,args";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessAction {
    List,
    Kill,
    Info,
}

fn default_signal() -> String {
    "TERM".to_string()
}

#[derive(Debug, Deserialize)]
struct ProcessParams {
    action: ProcessAction,
    pid: Option<u32>,
    name: Option<String>,
    #[serde(default = "default_signal")]
    signal: String,
}

/// Canonical upper-case signal name, with an optional `SIG` prefix stripped
pub fn normalize_signal(signal: &str) -> Result<String, ToolError> {
    let upper = signal.trim().to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    if KNOWN_SIGNALS.contains(&name) {
        Ok(name.to_string())
    } else {
        Err(ToolError::InvalidArgument(format!("unknown signal: {signal:?}")))
    }
}

fn validate_pid(pid: u32) -> Result<u32, ToolError> {
    // 0 would signal the whole process group
    if pid == 0 {
        return Err(ToolError::InvalidArgument("pid must be positive".to_string()));
    }
    Ok(pid)
}

/// `manage_processes`: list, signal, or inspect processes
pub struct ManageProcessesTool;

impl AdminTool for ManageProcessesTool {
    fn name(&self) -> &'static str {
        "manage_processes"
    }

    fn description(&self) -> &'static str {
        "List, monitor, or manage system processes"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pid": {
                    "type": "number",
                    "description": "Process ID (for specific process operations)"
                },
                "name": {
                    "type": "string",
                    "description": "Process name (for name-based operations)"
                },
                "action": {
                    "type": "string",
                    "enum": ["list", "kill", "info"],
                    "description": "Action to perform"
                },
                "signal": {
                    "type": "string",
                    "default": "TERM",
                    "description": "Signal to send when killing process (TERM, KILL, etc.)"
                }
            },
            "required": ["action"]
        })
    }

    fn plan(&self, params: Value, _system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: ProcessParams = parse_params(self.name(), params)?;
        let name = params.name.filter(|n| !n.trim().is_empty());

        let command = match params.action {
            ProcessAction::List => {
                let description = match &name {
                    Some(name) => format!("List processes matching: {name}"),
                    None => "List processes".to_string(),
                };
                CommandDescriptor::new("ps", ["aux"]).with_description(description)
            }
            ProcessAction::Kill => {
                let signal = normalize_signal(&params.signal)?;
                match (params.pid, &name) {
                    (Some(pid), _) => {
                        let pid = validate_pid(pid)?;
                        CommandDescriptor::new("kill", [format!("-{signal}"), pid.to_string()])
                            .with_description(format!("Kill process PID {pid} with signal {signal}"))
                    }
                    (None, Some(name)) => {
                        if name.starts_with('-') {
                            return Err(ToolError::InvalidArgument(format!(
                                "invalid process name: {name:?}"
                            )));
                        }
                        CommandDescriptor::new("pkill", [format!("-{signal}"), name.clone()])
                            .with_description(format!("Kill process named {name} with signal {signal}"))
                    }
                    (None, None) => {
                        return Err(ToolError::InvalidArgument(
                            "either pid or name must be provided for kill action".to_string(),
                        ));
                    }
                }
            }
            ProcessAction::Info => {
                let pid = params.pid.ok_or_else(|| {
                    ToolError::InvalidArgument("pid must be provided for info action".to_string())
                })?;
                let pid = validate_pid(pid)?;
                let pid = pid.to_string();
                CommandDescriptor::new("ps", ["-p", pid.as_str(), "-o", PS_INFO_FORMAT])
                    .with_description(format!("Get info for process PID {pid}"))
            }
        };

        Ok(ToolPlan::new(self.name(), vec![command]).with_details(json!({
            "action": params.action,
            "pid": params.pid,
            "name": name,
            "signal": params.signal,
        })))
    }
}
