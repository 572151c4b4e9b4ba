use crate::exec::CommandDescriptor;
use crate::safety::paths::{extract_paths, is_under};
use crate::safety::risk::{RiskLevel, RiskVerdict};
use crate::safety::{
    DESTRUCTIVE_EXECUTABLES, FILE_DELETION_EXECUTABLES, PACKAGE_MANAGERS,
    PROTECTED_SYSTEM_PATHS, executable_name,
};
use regex::Regex;
use std::path::{Path, PathBuf};

/// High-confidence signatures of irreversible operations, matched against
/// the reconstructed command line.
const HIGHLY_DESTRUCTIVE_SIGNATURES: &[&str] = &[
    // Recursive delete of an absolute path
    r"\brm\s+(?:\S+\s+)*(?:-[A-Za-z]*[rR][A-Za-z]*|--recursive)\s+(?:\S+\s+)*/",
    // Raw writes to a block device
    r"\bdd\s+(?:\S+\s+)*of=/dev/",
    // Filesystem creation
    r"\bmkfs(?:\.[A-Za-z0-9]+)?\b",
    // Partitioning
    r"\b(?:fdisk|sfdisk|cfdisk|parted|gdisk|sgdisk|wipefs)\b",
    // Power state
    r"\b(?:shutdown|reboot|halt|poweroff)(?:\s|$)",
    r"\binit\s+[06]\b",
];

/// Everything a rule may look at for one command
#[derive(Debug)]
pub struct RuleContext<'a> {
    /// Basename of the executable
    pub executable: &'a str,
    pub arguments: &'a [String],
    pub command_line: String,
    /// Extracted, normalized path arguments
    pub paths: &'a [PathBuf],
    pub requires_root: bool,
}

/// What a rule tests for
#[derive(Debug, Clone)]
pub enum RulePredicate {
    /// Executable basename is one of the listed names
    ExecutableIn(&'static [&'static str]),
    /// Some extracted path lies under one of the listed directories
    PathUnder(&'static [&'static str]),
    /// The command declares that it needs elevated privilege
    RequiresRoot,
    /// The command line matches any of the patterns
    CommandLineMatches(Vec<Regex>),
}

impl RulePredicate {
    /// Returns the matched detail (possibly empty) when the predicate holds
    fn matches(&self, ctx: &RuleContext<'_>) -> Option<String> {
        match self {
            RulePredicate::ExecutableIn(names) => names
                .contains(&ctx.executable)
                .then(|| ctx.executable.to_string()),
            RulePredicate::PathUnder(dirs) => {
                let hits: Vec<String> = ctx
                    .paths
                    .iter()
                    .filter(|p| is_under(p, dirs))
                    .map(|p| p.display().to_string())
                    .collect();
                (!hits.is_empty()).then(|| hits.join(", "))
            }
            RulePredicate::RequiresRoot => ctx.requires_root.then(String::new),
            RulePredicate::CommandLineMatches(patterns) => patterns
                .iter()
                .find_map(|re| re.find(&ctx.command_line))
                .map(|m| m.as_str().trim().to_string()),
        }
    }
}

/// One row of the classification table
#[derive(Debug, Clone)]
pub struct RiskRule {
    pub name: &'static str,
    pub predicate: RulePredicate,
    /// Minimum level once the rule fires
    pub level_floor: RiskLevel,
    pub requires_backup: bool,
    /// Prefix of the reason recorded when the rule fires
    pub reason: &'static str,
}

impl RiskRule {
    /// Evaluate the rule, returning the reason string if it fires
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let detail = self.predicate.matches(ctx)?;
        if detail.is_empty() {
            Some(self.reason.to_string())
        } else {
            Some(format!("{}: {}", self.reason, detail))
        }
    }
}

/// Default rule table, in evaluation order
pub fn default_rules() -> Vec<RiskRule> {
    let signatures = HIGHLY_DESTRUCTIVE_SIGNATURES
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect();

    vec![
        RiskRule {
            name: "destructive-executable",
            predicate: RulePredicate::ExecutableIn(DESTRUCTIVE_EXECUTABLES),
            level_floor: RiskLevel::Medium,
            requires_backup: false,
            reason: "Potentially destructive command",
        },
        RiskRule {
            name: "system-path",
            predicate: RulePredicate::PathUnder(PROTECTED_SYSTEM_PATHS),
            level_floor: RiskLevel::High,
            requires_backup: true,
            reason: "Modifying system path",
        },
        RiskRule {
            name: "requires-root",
            predicate: RulePredicate::RequiresRoot,
            level_floor: RiskLevel::Medium,
            requires_backup: false,
            reason: "Requires root privileges",
        },
        RiskRule {
            name: "package-manager",
            predicate: RulePredicate::ExecutableIn(PACKAGE_MANAGERS),
            level_floor: RiskLevel::Low,
            requires_backup: false,
            reason: "Package management operation",
        },
        RiskRule {
            name: "highly-destructive",
            predicate: RulePredicate::CommandLineMatches(signatures),
            level_floor: RiskLevel::Destructive,
            requires_backup: true,
            reason: "Highly destructive operation detected",
        },
    ]
}

/// Classifies host commands by risk.
///
/// Pure: no filesystem access, no shared mutable state. Relative path
/// arguments resolve against the command's working directory, or the base
/// directory captured when the classifier was built.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    rules: Vec<RiskRule>,
    base_dir: PathBuf,
}

impl RiskClassifier {
    pub fn new() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_rules(default_rules(), base_dir)
    }

    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        Self::with_rules(default_rules(), base_dir)
    }

    /// Build a classifier around a custom rule table
    pub fn with_rules<P: AsRef<Path>>(rules: Vec<RiskRule>, base_dir: P) -> Self {
        Self {
            rules,
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    /// Classify a command. Never fails; no evidence means SAFE.
    pub fn classify(&self, cmd: &CommandDescriptor) -> RiskVerdict {
        let executable = executable_name(cmd.executable());
        let base = self.resolve_base(cmd.working_dir());
        let paths = extract_paths(cmd.arguments(), &base);

        let ctx = RuleContext {
            executable,
            arguments: cmd.arguments(),
            command_line: cmd.command_line(),
            paths: &paths,
            requires_root: cmd.requires_root(),
        };

        let mut level = RiskLevel::Safe;
        let mut backup_required = false;
        let mut reasons = Vec::new();

        for rule in &self.rules {
            if let Some(reason) = rule.evaluate(&ctx) {
                level = level.join(rule.level_floor);
                backup_required |= rule.requires_backup;
                reasons.push(reason);
            }
        }

        let hint = backup_required.then(|| rollback_hint(executable).to_string());

        RiskVerdict::new(level, reasons, backup_required, hint, paths)
    }

    fn resolve_base(&self, working_dir: Option<&Path>) -> PathBuf {
        match working_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable reversal suggestion, by executable family
pub fn rollback_hint(executable: &str) -> &'static str {
    if FILE_DELETION_EXECUTABLES.contains(&executable) {
        "Restore files from backup"
    } else if PACKAGE_MANAGERS.contains(&executable) {
        "Use package manager to reverse operation"
    } else {
        "Manual intervention may be required for rollback"
    }
}
