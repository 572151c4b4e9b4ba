use super::registry::{AdminTool, ToolError, ToolPlan};
use crate::system::{SystemInfo, SystemResources};
use serde_json::{Value, json};

/// `system_info`: host facts and live resource figures; runs nothing
pub struct SystemInfoTool;

impl AdminTool for SystemInfoTool {
    fn name(&self) -> &'static str {
        "system_info"
    }

    fn description(&self) -> &'static str {
        "Get comprehensive system information"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    fn plan(&self, _params: Value, system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        Ok(ToolPlan::new(self.name(), Vec::new()).with_details(json!({
            "system": system,
            "resources": SystemResources::collect(),
        })))
    }
}
