use super::registry::{AdminTool, ToolError, ToolPlan, parse_params, require_non_empty};
use crate::exec::CommandDescriptor;
use crate::system::SystemInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

const LAUNCH_DAEMONS: &str = "/Library/LaunchDaemons";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Status,
    Enable,
    Disable,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Status => "status",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }

    /// Only `status` is read-only
    pub fn mutates(&self) -> bool {
        *self != ServiceAction::Status
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ServiceParams {
    service: String,
    action: ServiceAction,
}

/// Unit names: letters, digits and `@._:-`; no slashes or whitespace
fn validate_service_name(name: &str) -> Result<(), ToolError> {
    require_non_empty("service", name)?;
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | ':' | '-'));
    if !valid || name.starts_with('-') {
        return Err(ToolError::InvalidArgument(format!(
            "invalid service name: {name:?}"
        )));
    }
    Ok(())
}

/// `manage_service`: systemctl on Linux, launchctl on macOS
pub struct ManageServiceTool;

impl ManageServiceTool {
    fn launchctl_args(service: &str, action: ServiceAction) -> Result<Vec<String>, ToolError> {
        let plist = format!("{LAUNCH_DAEMONS}/{service}.plist");
        let args = match action {
            ServiceAction::Start => vec!["load".to_string(), "-w".to_string(), plist],
            ServiceAction::Stop => vec!["unload".to_string(), "-w".to_string(), plist],
            ServiceAction::Status => vec!["list".to_string(), service.to_string()],
            other => {
                return Err(ToolError::Unsupported(format!(
                    "action {other} not supported on macOS"
                )));
            }
        };
        Ok(args)
    }
}

impl AdminTool for ManageServiceTool {
    fn name(&self) -> &'static str {
        "manage_service"
    }

    fn description(&self) -> &'static str {
        "Manage system services (start, stop, restart, status, enable, disable)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "service": {
                    "type": "string",
                    "description": "Service name"
                },
                "action": {
                    "type": "string",
                    "enum": ["start", "stop", "restart", "status", "enable", "disable"],
                    "description": "Action to perform on the service"
                }
            },
            "required": ["service", "action"]
        })
    }

    fn plan(&self, params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: ServiceParams = parse_params(self.name(), params)?;
        validate_service_name(&params.service)?;
        let ServiceParams { service, action } = params;

        let base = if system.is_macos() {
            CommandDescriptor::new("launchctl", Self::launchctl_args(&service, action)?)
        } else {
            CommandDescriptor::new("systemctl", [action.as_str(), service.as_str()])
        };
        let command = base
            .with_root(action.mutates())
            .with_description(format!("{action} service: {service}"));

        Ok(ToolPlan::new(self.name(), vec![command]).with_details(json!({
            "service": service,
            "action": action,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::PackageManager;

    fn system(os: &str) -> SystemInfo {
        SystemInfo {
            os: os.to_string(),
            distro: "test".to_string(),
            kernel: "1.0".to_string(),
            arch: "aarch64".to_string(),
            package_manager: PackageManager::Unknown,
            shell: "/bin/sh".to_string(),
            user: "admin".to_string(),
            is_root: false,
        }
    }

    #[test]
    fn test_systemctl_plan() {
        let plan = ManageServiceTool
            .plan(json!({"service": "nginx", "action": "restart"}), &system("linux"))
            .unwrap();

        let cmd = &plan.commands[0];
        assert_eq!(cmd.command_line(), "systemctl restart nginx");
        assert!(cmd.requires_root());
        assert_eq!(cmd.description(), "restart service: nginx");
    }

    #[test]
    fn test_status_does_not_require_root() {
        let plan = ManageServiceTool
            .plan(json!({"service": "sshd", "action": "status"}), &system("linux"))
            .unwrap();
        assert!(!plan.commands[0].requires_root());
    }

    #[test]
    fn test_launchctl_plan() {
        let plan = ManageServiceTool
            .plan(json!({"service": "com.example.agent", "action": "start"}), &system("macos"))
            .unwrap();
        assert_eq!(
            plan.commands[0].command_line(),
            "launchctl load -w /Library/LaunchDaemons/com.example.agent.plist"
        );

        let plan = ManageServiceTool
            .plan(json!({"service": "com.example.agent", "action": "status"}), &system("macos"))
            .unwrap();
        assert_eq!(plan.commands[0].command_line(), "launchctl list com.example.agent");
    }

    #[test]
    fn test_launchctl_unsupported_action() {
        let err = ManageServiceTool
            .plan(json!({"service": "com.example.agent", "action": "enable"}), &system("macos"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Unsupported(_)));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = ManageServiceTool
            .plan(json!({"service": "nginx", "action": "explode"}), &system("linux"))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }

    #[test]
    fn test_service_name_validation() {
        for bad in ["", "  ", "../../etc/evil", "nginx; reboot", "--now"] {
            let err = ManageServiceTool
                .plan(json!({"service": bad, "action": "stop"}), &system("linux"))
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArgument(_)), "{bad:?}");
        }

        assert!(
            ManageServiceTool
                .plan(json!({"service": "getty@tty1.service", "action": "status"}), &system("linux"))
                .is_ok()
        );
    }
}
