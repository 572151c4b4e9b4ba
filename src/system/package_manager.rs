use serde::{Deserialize, Serialize};
use std::fmt;

/// Package manager front ends the tools know how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
    Pacman,
    Zypper,
    Apk,
    Brew,
    Unknown,
}

impl PackageManager {
    /// Probe order used by detection; the first one on PATH wins
    pub const DETECTION_ORDER: [PackageManager; 7] = [
        PackageManager::Apt,
        PackageManager::Yum,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Apk,
        PackageManager::Brew,
    ];

    /// First known package manager found on PATH
    pub fn detect() -> Self {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|pm| pm.binary().is_some_and(|bin| which::which(bin).is_ok()))
            .unwrap_or(PackageManager::Unknown)
    }

    pub fn binary(&self) -> Option<&'static str> {
        match self {
            PackageManager::Apt => Some("apt"),
            PackageManager::Yum => Some("yum"),
            PackageManager::Dnf => Some("dnf"),
            PackageManager::Pacman => Some("pacman"),
            PackageManager::Zypper => Some("zypper"),
            PackageManager::Apk => Some("apk"),
            PackageManager::Brew => Some("brew"),
            PackageManager::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != PackageManager::Unknown
    }

    /// Homebrew refuses to run as root; everything else needs it
    pub fn requires_root(&self) -> bool {
        !matches!(self, PackageManager::Brew | PackageManager::Unknown)
    }

    pub fn install(&self, packages: &[String]) -> Option<Vec<String>> {
        let base: &[&str] = match self {
            PackageManager::Apt => &["apt", "install", "-y"],
            PackageManager::Yum => &["yum", "install", "-y"],
            PackageManager::Dnf => &["dnf", "install", "-y"],
            PackageManager::Pacman => &["pacman", "-S", "--noconfirm"],
            PackageManager::Zypper => &["zypper", "--non-interactive", "install"],
            PackageManager::Apk => &["apk", "add"],
            PackageManager::Brew => &["brew", "install"],
            PackageManager::Unknown => return None,
        };
        Some(with_operands(base, packages))
    }

    /// `purge` also drops configuration where the manager supports it (apt only)
    pub fn remove(&self, packages: &[String], purge: bool) -> Option<Vec<String>> {
        let base: &[&str] = match self {
            PackageManager::Apt if purge => &["apt", "purge", "-y"],
            PackageManager::Apt => &["apt", "remove", "-y"],
            PackageManager::Yum => &["yum", "remove", "-y"],
            PackageManager::Dnf => &["dnf", "remove", "-y"],
            PackageManager::Pacman => &["pacman", "-R", "--noconfirm"],
            PackageManager::Zypper => &["zypper", "--non-interactive", "remove"],
            PackageManager::Apk => &["apk", "del"],
            PackageManager::Brew => &["brew", "uninstall"],
            PackageManager::Unknown => return None,
        };
        Some(with_operands(base, packages))
    }

    /// Refresh package lists
    pub fn refresh(&self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            PackageManager::Apt => &["apt", "update"],
            PackageManager::Yum => &["yum", "makecache"],
            PackageManager::Dnf => &["dnf", "makecache"],
            PackageManager::Pacman => &["pacman", "-Sy"],
            PackageManager::Zypper => &["zypper", "--non-interactive", "refresh"],
            PackageManager::Apk => &["apk", "update"],
            PackageManager::Brew => &["brew", "update"],
            PackageManager::Unknown => return None,
        };
        Some(with_operands(argv, &[]))
    }

    /// Upgrade installed packages. Security-only upgrades exist for yum, dnf
    /// and zypper; `None` means the combination is unsupported.
    pub fn upgrade(&self, security_only: bool) -> Option<Vec<String>> {
        let argv: &[&str] = match (self, security_only) {
            (PackageManager::Apt, false) => &["apt", "upgrade", "-y"],
            (PackageManager::Yum, false) => &["yum", "update", "-y"],
            (PackageManager::Yum, true) => &["yum", "update", "-y", "--security"],
            (PackageManager::Dnf, false) => &["dnf", "upgrade", "-y"],
            (PackageManager::Dnf, true) => &["dnf", "upgrade", "-y", "--security"],
            (PackageManager::Pacman, false) => &["pacman", "-Syu", "--noconfirm"],
            (PackageManager::Zypper, false) => &["zypper", "--non-interactive", "update"],
            (PackageManager::Zypper, true) => {
                &["zypper", "--non-interactive", "patch", "--category", "security"]
            }
            (PackageManager::Apk, false) => &["apk", "upgrade"],
            (PackageManager::Brew, false) => &["brew", "upgrade"],
            _ => return None,
        };
        Some(with_operands(argv, &[]))
    }

    pub fn search(&self, term: &str) -> Option<Vec<String>> {
        let base: &[&str] = match self {
            PackageManager::Apt => &["apt", "search"],
            PackageManager::Yum => &["yum", "search"],
            PackageManager::Dnf => &["dnf", "search"],
            PackageManager::Pacman => &["pacman", "-Ss"],
            PackageManager::Zypper => &["zypper", "search"],
            PackageManager::Apk => &["apk", "search"],
            PackageManager::Brew => &["brew", "search"],
            PackageManager::Unknown => return None,
        };
        Some(with_operands(base, &[term.to_string()]))
    }

    pub fn list_installed(&self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            PackageManager::Apt => &["apt", "list", "--installed"],
            PackageManager::Yum => &["yum", "list", "installed"],
            PackageManager::Dnf => &["dnf", "list", "installed"],
            PackageManager::Pacman => &["pacman", "-Q"],
            PackageManager::Zypper => &["zypper", "search", "--installed-only"],
            PackageManager::Apk => &["apk", "info"],
            PackageManager::Brew => &["brew", "list"],
            PackageManager::Unknown => return None,
        };
        Some(with_operands(argv, &[]))
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary().unwrap_or("unknown"))
    }
}

fn with_operands(base: &[&str], operands: &[String]) -> Vec<String> {
    base.iter()
        .map(|s| s.to_string())
        .chain(operands.iter().cloned())
        .collect()
}
