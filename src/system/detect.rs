use crate::system::PackageManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sysinfo::{Disks, System};

const OS_RELEASE: &str = "/etc/os-release";

/// Facts about the host, detected once and passed explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub distro: String,
    pub kernel: String,
    pub arch: String,
    pub package_manager: PackageManager,
    pub shell: String,
    pub user: String,
    pub is_root: bool,
}

impl SystemInfo {
    /// Inspect the running host
    pub fn detect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            distro: detect_distribution(),
            kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            arch: std::env::consts::ARCH.to_string(),
            package_manager: PackageManager::detect(),
            shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            is_root: is_root(),
        }
    }

    pub fn is_macos(&self) -> bool {
        self.os == "macos"
    }
}

/// Memory, CPU and root-disk figures; byte counts throughout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemResources {
    pub memory_total: u64,
    pub memory_available: u64,
    pub memory_used: u64,
    pub cpu_count: usize,
    pub load_average: [f64; 3],
    pub disk_total: u64,
    pub disk_available: u64,
}

impl SystemResources {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu();

        let load = System::load_average();
        let disks = Disks::new_with_refreshed_list();
        let root_disk = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"));

        Self {
            memory_total: system.total_memory(),
            memory_available: system.available_memory(),
            memory_used: system.used_memory(),
            cpu_count: system.cpus().len(),
            load_average: [load.one, load.five, load.fifteen],
            disk_total: root_disk.map(|d| d.total_space()).unwrap_or(0),
            disk_available: root_disk.map(|d| d.available_space()).unwrap_or(0),
        }
    }
}

/// Whether the current process runs with an effective uid of 0
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::Uid::effective().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}

fn detect_distribution() -> String {
    fs::read_to_string(OS_RELEASE)
        .ok()
        .and_then(|content| parse_os_release(&content))
        .or_else(System::long_os_version)
        .unwrap_or_else(|| "Unknown Linux Distribution".to_string())
}

/// Extract `PRETTY_NAME` from os-release content
pub fn parse_os_release(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|value| !value.is_empty())
}
