use crate::backup::BackupRecord;
use crate::orchestrator::OrchestrationResult;
use crate::safety::{RiskLevel, RiskVerdict};
use crate::system::{SystemInfo, SystemResources};
use crate::tools::{CommandPreview, ToolReport};
use crossterm::style::{StyledContent, Stylize};
use std::fmt::Write;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Colored `[LEVEL]` tag
pub fn level_badge(level: RiskLevel) -> StyledContent<String> {
    let tag = format!("[{level}]");
    match level {
        RiskLevel::Safe => tag.green(),
        RiskLevel::Low => tag.cyan(),
        RiskLevel::Medium => tag.yellow(),
        RiskLevel::High => tag.red(),
        RiskLevel::Destructive => tag.red().bold(),
    }
}

pub fn render_verdict(command: &str, verdict: &RiskVerdict) -> String {
    let mut out = format!("{} {}\n", level_badge(verdict.level()), command.bold());
    for reason in verdict.reasons() {
        let _ = writeln!(out, "    - {reason}");
    }
    if !verdict.affected_paths().is_empty() {
        let paths: Vec<String> = verdict
            .affected_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let _ = writeln!(out, "    paths: {}", paths.join(", "));
    }
    if verdict.backup_required() {
        let _ = writeln!(out, "    {}", "backup before running".magenta());
    }
    if let Some(hint) = verdict.rollback_hint() {
        let _ = writeln!(out, "    rollback: {hint}");
    }
    out
}

pub fn render_previews(previews: &[CommandPreview]) -> String {
    if previews.is_empty() {
        return "No commands planned.\n".dim().to_string();
    }
    previews
        .iter()
        .map(|preview| render_verdict(&preview.command, &preview.verdict))
        .collect()
}

pub fn render_backup(record: &BackupRecord) -> String {
    format!(
        "    backup {} of {} ({} bytes, sha256 {})\n",
        record.id,
        record.source_path.display(),
        record.size_bytes,
        record.checksum
    )
}

pub fn render_result(command: &str, result: &OrchestrationResult) -> String {
    let outcome = &result.outcome;
    let status = if outcome.succeeded {
        "ok".green()
    } else {
        "failed".red()
    };

    let mut out = format!(
        "{} {} {} (exit {}, {} ms)\n",
        level_badge(result.verdict.level()),
        command.bold(),
        status,
        outcome.exit_code,
        outcome.duration_ms
    );
    if let Some(record) = &result.backup {
        out.push_str(&render_backup(record));
    }
    for line in outcome.stdout.lines() {
        let _ = writeln!(out, "    {line}");
    }
    for line in outcome.stderr.lines() {
        let _ = writeln!(out, "    {}", line.dark_red());
    }
    if let Some(message) = &outcome.failure_message {
        let _ = writeln!(out, "    {}", message.as_str().red());
    }
    out
}

pub fn render_report(report: &ToolReport) -> String {
    let mut out = String::new();

    if report.dry_run {
        let _ = writeln!(out, "{}", format!("DRY RUN: {}", report.tool).yellow().bold());
        out.push_str(&render_previews(&report.previews));
    } else {
        for (preview, result) in report.previews.iter().zip(&report.results) {
            out.push_str(&render_result(&preview.command, result));
        }
    }

    let summary = if report.success {
        format!("{} succeeded", report.tool).green()
    } else {
        format!("{} failed", report.tool).red()
    };
    let _ = writeln!(out, "{summary}");
    out
}

pub fn render_system(system: &SystemInfo, resources: &SystemResources) -> String {
    let mut out = String::new();
    let rows = [
        ("OS", format!("{} ({})", system.distro, system.os)),
        ("Kernel", system.kernel.clone()),
        ("Architecture", system.arch.clone()),
        ("Package manager", system.package_manager.to_string()),
        ("Shell", system.shell.clone()),
        ("User", format!("{}{}", system.user, if system.is_root { " (root)" } else { "" })),
        ("CPUs", resources.cpu_count.to_string()),
        (
            "Load",
            format!(
                "{:.2} {:.2} {:.2}",
                resources.load_average[0], resources.load_average[1], resources.load_average[2]
            ),
        ),
        (
            "Memory",
            format!(
                "{:.1} GiB used / {:.1} GiB total",
                resources.memory_used as f64 / GIB,
                resources.memory_total as f64 / GIB
            ),
        ),
        (
            "Disk (/)",
            format!(
                "{:.1} GiB free / {:.1} GiB total",
                resources.disk_available as f64 / GIB,
                resources.disk_total as f64 / GIB
            ),
        ),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<16} {}", format!("{label}:").bold(), value);
    }
    out
}
