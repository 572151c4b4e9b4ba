use super::registry::{AdminTool, ToolError, ToolPlan, argv_command, default_true, parse_params};
use crate::system::SystemInfo;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    #[serde(default = "default_true")]
    update_package_list: bool,
    #[serde(default)]
    upgrade_packages: bool,
    #[serde(default)]
    security_only: bool,
    #[serde(default = "default_true")]
    dry_run: bool,
}

/// `update_system`: refresh package lists and optionally upgrade
pub struct UpdateSystemTool;

impl AdminTool for UpdateSystemTool {
    fn name(&self) -> &'static str {
        "update_system"
    }

    fn description(&self) -> &'static str {
        "Update package lists and upgrade system packages"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "updatePackageList": {
                    "type": "boolean",
                    "default": true,
                    "description": "Update the package manager's package list"
                },
                "upgradePackages": {
                    "type": "boolean",
                    "default": false,
                    "description": "Upgrade installed packages to latest versions"
                },
                "securityOnly": {
                    "type": "boolean",
                    "default": false,
                    "description": "Only install security updates (where supported)"
                },
                "dryRun": {
                    "type": "boolean",
                    "default": true,
                    "description": "Show what would be updated without actually doing it"
                }
            }
        })
    }

    fn plan(&self, params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: UpdateParams = parse_params(self.name(), params)?;

        let pm = system.package_manager;
        if !pm.is_known() {
            return Err(ToolError::NoPackageManager);
        }

        let mut commands = Vec::with_capacity(2);
        if params.update_package_list {
            commands.push(
                argv_command(pm.refresh(), || ToolError::NoPackageManager)?
                    .with_root(pm.requires_root())
                    .with_description("Update package lists"),
            );
        }

        if params.upgrade_packages {
            let description = if params.security_only {
                "Upgrade security packages only"
            } else {
                "Upgrade all packages"
            };
            commands.push(
                argv_command(pm.upgrade(params.security_only), || {
                    ToolError::Unsupported(format!("security-only upgrades with {pm}"))
                })?
                .with_root(pm.requires_root())
                .with_description(description),
            );
        }

        let planned: Vec<String> = commands.iter().map(|c| c.command_line()).collect();
        Ok(ToolPlan::new(self.name(), commands)
            .with_dry_run(params.dry_run)
            .with_details(json!({
                "updatePackageList": params.update_package_list,
                "upgradePackages": params.upgrade_packages,
                "securityOnly": params.security_only,
                "commands": planned,
                "packageManager": pm,
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::PackageManager;

    fn system(pm: PackageManager) -> SystemInfo {
        SystemInfo {
            os: "linux".to_string(),
            distro: "openSUSE Tumbleweed".to_string(),
            kernel: "6.10.0".to_string(),
            arch: "x86_64".to_string(),
            package_manager: pm,
            shell: "/bin/bash".to_string(),
            user: "admin".to_string(),
            is_root: false,
        }
    }

    fn lines(plan: &ToolPlan) -> Vec<String> {
        plan.commands.iter().map(|c| c.command_line()).collect()
    }

    #[test]
    fn test_defaults_refresh_only_dry_run() {
        let plan = UpdateSystemTool.plan(json!({}), &system(PackageManager::Apt)).unwrap();
        assert!(plan.dry_run);
        assert_eq!(lines(&plan), vec!["apt update"]);
    }

    #[test]
    fn test_full_upgrade() {
        let plan = UpdateSystemTool
            .plan(
                json!({"upgradePackages": true, "dryRun": false}),
                &system(PackageManager::Pacman),
            )
            .unwrap();
        assert!(!plan.dry_run);
        assert_eq!(lines(&plan), vec!["pacman -Sy", "pacman -Syu --noconfirm"]);
        assert!(plan.commands.iter().all(|c| c.requires_root()));
    }

    #[test]
    fn test_security_only() {
        let plan = UpdateSystemTool
            .plan(
                json!({"updatePackageList": false, "upgradePackages": true, "securityOnly": true}),
                &system(PackageManager::Zypper),
            )
            .unwrap();
        assert_eq!(
            lines(&plan),
            vec!["zypper --non-interactive patch --category security"]
        );
    }

    #[test]
    fn test_security_only_unsupported() {
        let err = UpdateSystemTool
            .plan(
                json!({"upgradePackages": true, "securityOnly": true}),
                &system(PackageManager::Apt),
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::Unsupported(_)));
    }

    #[test]
    fn test_unknown_package_manager() {
        let err = UpdateSystemTool
            .plan(json!({}), &system(PackageManager::Unknown))
            .unwrap_err();
        assert!(matches!(err, ToolError::NoPackageManager));
    }

    #[test]
    fn test_nothing_requested() {
        let plan = UpdateSystemTool
            .plan(json!({"updatePackageList": false}), &system(PackageManager::Dnf))
            .unwrap();
        assert!(plan.commands.is_empty());
    }
}
