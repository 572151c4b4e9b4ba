pub mod cleanup;
pub mod execute;
pub mod packages;
pub mod process;
pub mod registry;
pub mod service;
pub mod system_info;
pub mod update;

pub use cleanup::CleanupFilesTool;
pub use execute::ExecuteCommandTool;
pub use packages::{InstallPackageTool, RemovePackageTool, validate_package_name};
pub use process::{ManageProcessesTool, ProcessAction, normalize_signal};
pub use registry::{AdminTool, CommandPreview, ToolError, ToolPlan, ToolRegistry, ToolReport};
pub use service::{ManageServiceTool, ServiceAction};
pub use system_info::SystemInfoTool;
pub use update::UpdateSystemTool;
