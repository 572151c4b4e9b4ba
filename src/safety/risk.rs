use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ordered classification of how dangerous a command is believed to be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Destructive,
}

impl RiskLevel {
    /// Lattice join: the higher of the two levels
    pub fn join(self, other: RiskLevel) -> RiskLevel {
        self.max(other)
    }

    /// Whether a command at this level needs explicit confirmation
    pub fn requires_confirmation(self) -> bool {
        self >= RiskLevel::Medium
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Destructive => "DESTRUCTIVE",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a single command.
///
/// Built only by [`RiskClassifier`](super::RiskClassifier); the confirmation
/// flag is derived from the level at construction and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    level: RiskLevel,
    reasons: Vec<String>,
    confirmation_required: bool,
    backup_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rollback_hint: Option<String>,
    affected_paths: Vec<PathBuf>,
}

impl RiskVerdict {
    pub(crate) fn new(
        level: RiskLevel,
        reasons: Vec<String>,
        backup_required: bool,
        rollback_hint: Option<String>,
        affected_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            level,
            reasons,
            confirmation_required: level.requires_confirmation(),
            backup_required,
            rollback_hint,
            affected_paths,
        }
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    /// One reason per triggering rule, in rule-evaluation order
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn confirmation_required(&self) -> bool {
        self.confirmation_required
    }

    pub fn backup_required(&self) -> bool {
        self.backup_required
    }

    pub fn rollback_hint(&self) -> Option<&str> {
        self.rollback_hint.as_deref()
    }

    /// Absolute, canonical, deduplicated paths in argument order
    pub fn affected_paths(&self) -> &[PathBuf] {
        &self.affected_paths
    }
}
