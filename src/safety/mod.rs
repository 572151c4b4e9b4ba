pub mod classifier;
pub mod paths;
pub mod risk;

pub use classifier::{RiskClassifier, RiskRule, RuleContext, RulePredicate};
pub use risk::{RiskLevel, RiskVerdict};

/// Executables historically capable of destroying state or altering the
/// running system.
///
/// Matched against the basename of the executable, so `/bin/rm` counts as `rm`.
pub const DESTRUCTIVE_EXECUTABLES: &[&str] = &[
    // File removal and movement
    "rm",
    "rmdir",
    "unlink",
    "shred",
    "mv",
    // Low-level disk tools
    "dd",
    "fdisk",
    "mkfs",
    "format",
    // Power state
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
    "init",
    // Service managers
    "systemctl",
    "service",
    "launchctl",
    // Signal senders
    "kill",
    "killall",
    "pkill",
    // Permissions and ownership
    "chmod",
    "chown",
    "chgrp",
];

/// Directories whose contents are treated as core system state.
///
/// A path is protected when one of these is a component prefix of it.
pub const PROTECTED_SYSTEM_PATHS: &[&str] = &[
    "/boot", "/etc", "/usr", "/lib", "/lib64", "/sbin", "/bin", "/sys", "/proc", "/dev", "/root",
];

/// Known package-manager front ends
pub const PACKAGE_MANAGERS: &[&str] = &[
    "apt", "apt-get", "yum", "dnf", "pacman", "zypper", "apk", "brew",
];

/// Executables whose effects can be undone by restoring a file snapshot
pub const FILE_DELETION_EXECUTABLES: &[&str] = &["rm", "rmdir", "unlink", "shred"];

/// Return the final path component of an executable, or the input unchanged
pub fn executable_name(executable: &str) -> &str {
    executable
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(executable)
}
