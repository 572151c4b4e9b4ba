use super::registry::{AdminTool, ToolError, ToolPlan, argv_command, parse_params};
use crate::system::SystemInfo;
use serde::Deserialize;
use serde_json::{Value, json};

const MAX_PACKAGE_NAME_LEN: usize = 256;

/// Letters, digits and `._+-`, shorter than 256 characters
pub fn validate_package_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < MAX_PACKAGE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
}

fn validate_packages(packages: &[String]) -> Result<(), ToolError> {
    if packages.is_empty() {
        return Err(ToolError::InvalidArgument(
            "at least one package is required".to_string(),
        ));
    }
    if let Some(bad) = packages.iter().find(|p| !validate_package_name(p)) {
        return Err(ToolError::InvalidArgument(format!(
            "invalid package name: {bad:?}"
        )));
    }
    Ok(())
}

fn package_schema(flag: &str, flag_schema: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "packages": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of packages"
            },
            flag: flag_schema
        },
        "required": ["packages"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallParams {
    packages: Vec<String>,
    #[serde(default)]
    update_first: bool,
}

/// `install_package`: optional list refresh, then install
pub struct InstallPackageTool;

impl AdminTool for InstallPackageTool {
    fn name(&self) -> &'static str {
        "install_package"
    }

    fn description(&self) -> &'static str {
        "Install system packages using the appropriate package manager"
    }

    fn input_schema(&self) -> Value {
        package_schema(
            "updateFirst",
            json!({
                "type": "boolean",
                "default": false,
                "description": "Update package lists before installation"
            }),
        )
    }

    fn plan(&self, params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: InstallParams = parse_params(self.name(), params)?;
        validate_packages(&params.packages)?;

        let pm = system.package_manager;
        if !pm.is_known() {
            return Err(ToolError::NoPackageManager);
        }

        let mut commands = Vec::with_capacity(2);
        if params.update_first {
            commands.push(
                argv_command(pm.refresh(), || ToolError::NoPackageManager)?
                    .with_root(pm.requires_root())
                    .with_description("Update package lists"),
            );
        }
        commands.push(
            argv_command(pm.install(&params.packages), || ToolError::NoPackageManager)?
                .with_root(pm.requires_root())
                .with_description(format!("Install packages: {}", params.packages.join(", "))),
        );

        Ok(ToolPlan::new(self.name(), commands).with_details(json!({
            "packages": params.packages,
            "packageManager": pm,
        })))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveParams {
    packages: Vec<String>,
    #[serde(default)]
    purge: bool,
}

/// `remove_package`: remove, or purge where apt supports it
pub struct RemovePackageTool;

impl AdminTool for RemovePackageTool {
    fn name(&self) -> &'static str {
        "remove_package"
    }

    fn description(&self) -> &'static str {
        "Remove system packages using the appropriate package manager"
    }

    fn input_schema(&self) -> Value {
        package_schema(
            "purge",
            json!({
                "type": "boolean",
                "default": false,
                "description": "Remove configuration files (where supported)"
            }),
        )
    }

    fn plan(&self, params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: RemoveParams = parse_params(self.name(), params)?;
        validate_packages(&params.packages)?;

        let pm = system.package_manager;
        let command = argv_command(pm.remove(&params.packages, params.purge), || {
            ToolError::NoPackageManager
        })?
        .with_root(pm.requires_root())
        .with_description(format!("Remove packages: {}", params.packages.join(", ")));

        Ok(ToolPlan::new(self.name(), vec![command]).with_details(json!({
            "packages": params.packages,
            "purge": params.purge,
            "packageManager": pm,
        })))
    }
}
