pub mod detect;
pub mod package_manager;

pub use detect::{SystemInfo, SystemResources, is_root, parse_os_release};
pub use package_manager::PackageManager;
