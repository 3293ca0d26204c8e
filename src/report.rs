//! Report rendering
//!
//! Renders diff, lint, and score outputs as plain text, JSON, Markdown, or
//! GitHub Actions workflow annotations. Rendering consumes the core's
//! outputs; nothing in the core depends on this module.

use serde_json::json;
use std::fmt::Write as _;

use crate::diff::{ChangeRecord, PairDiff, Severity};
use crate::lint::{RuleSeverity, RuleViolation};
use crate::score::ScoreReport;

/// Output format for all reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
    Github,
}

impl OutputFormat {
    /// Resolve a format name. `auto` picks GitHub annotations inside a
    /// GitHub Actions run and plain text everywhere else.
    pub fn detect(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "markdown" => Some(OutputFormat::Markdown),
            "github" => Some(OutputFormat::Github),
            "auto" => {
                if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
                    Some(OutputFormat::Github)
                } else {
                    Some(OutputFormat::Text)
                }
            }
            _ => None,
        }
    }
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Breaking => "🔴",
        Severity::Deprecation => "🟡",
        Severity::Compatible => "🟢",
    }
}

fn github_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Breaking => "error",
        Severity::Deprecation => "warning",
        Severity::Compatible => "notice",
    }
}

fn count_changes(changes: &[ChangeRecord]) -> (usize, usize, usize) {
    let breaking = changes
        .iter()
        .filter(|c| c.severity == Severity::Breaking)
        .count();
    let deprecation = changes
        .iter()
        .filter(|c| c.severity == Severity::Deprecation)
        .count();
    let compatible = changes
        .iter()
        .filter(|c| c.severity == Severity::Compatible)
        .count();
    (breaking, deprecation, compatible)
}

/// Render a diff result.
pub fn render_changes(changes: &[ChangeRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => changes_text(changes),
        OutputFormat::Json => changes_json(changes),
        OutputFormat::Markdown => changes_markdown(changes),
        OutputFormat::Github => changes_github(changes),
    }
}

fn changes_text(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "No changes detected\n".to_string();
    }
    let mut out = String::new();
    out.push_str("SPEC DIFF REPORT\n");
    out.push_str("════════════════\n\n");
    for change in changes {
        let _ = writeln!(
            out,
            "{} [{}] {} — {}",
            severity_marker(change.severity),
            change.kind,
            change.location,
            change.message
        );
    }
    let (breaking, deprecation, compatible) = count_changes(changes);
    let _ = write!(
        out,
        "\n{breaking} breaking | {deprecation} deprecation | {compatible} compatible\n"
    );
    out
}

fn changes_json(changes: &[ChangeRecord]) -> String {
    let (breaking, deprecation, compatible) = count_changes(changes);
    let envelope = json!({
        "summary": {
            "breaking": breaking,
            "deprecation": deprecation,
            "compatible": compatible,
        },
        "changes": changes,
    });
    serde_json::to_string_pretty(&envelope).unwrap_or_default()
}

fn changes_markdown(changes: &[ChangeRecord]) -> String {
    let (breaking, deprecation, compatible) = count_changes(changes);
    let mut out = String::new();
    out.push_str("# Spec Diff Report\n\n");
    out.push_str("## Summary\n\n");
    out.push_str("| Category | Count |\n|----------|-------|\n");
    let _ = writeln!(out, "| 🔴 Breaking | {breaking} |");
    let _ = writeln!(out, "| 🟡 Deprecation | {deprecation} |");
    let _ = writeln!(out, "| 🟢 Compatible | {compatible} |");
    out.push('\n');
    if changes.is_empty() {
        out.push_str("✅ No changes detected.\n");
    } else {
        out.push_str("## Details\n\n");
        for change in changes {
            let _ = writeln!(
                out,
                "- {} **{}** `{}` — {}",
                severity_marker(change.severity),
                change.kind,
                change.location,
                change.message
            );
        }
    }
    out
}

fn changes_github(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "::notice ::No changes detected".to_string();
    }
    let mut lines = Vec::with_capacity(changes.len() + 1);
    for change in changes {
        lines.push(format!(
            "::{} file={}::{}: {}",
            github_level(change.severity),
            change.location,
            change.kind,
            change.message
        ));
    }
    let (breaking, deprecation, compatible) = count_changes(changes);
    let summary_level = if breaking > 0 { "error" } else { "notice" };
    lines.push(format!(
        "::{summary_level} ::Summary: {breaking} breaking, {deprecation} deprecation, {compatible} compatible"
    ));
    lines.join("\n")
}

fn violation_marker(severity: RuleSeverity) -> &'static str {
    match severity {
        RuleSeverity::Error => "🔴",
        RuleSeverity::Warning => "🟡",
    }
}

fn count_violations(violations: &[RuleViolation]) -> (usize, usize) {
    let errors = violations
        .iter()
        .filter(|v| v.severity == RuleSeverity::Error)
        .count();
    (errors, violations.len() - errors)
}

/// Render a lint result.
pub fn render_violations(violations: &[RuleViolation], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => violations_text(violations),
        OutputFormat::Json => violations_json(violations),
        OutputFormat::Markdown => violations_markdown(violations),
        OutputFormat::Github => violations_github(violations),
    }
}

fn violations_text(violations: &[RuleViolation]) -> String {
    if violations.is_empty() {
        return "All design rules pass\n".to_string();
    }
    let mut out = String::new();
    out.push_str("SPEC LINT REPORT\n");
    out.push_str("════════════════\n\n");
    for violation in violations {
        let _ = writeln!(
            out,
            "{} [{}] {} — {}",
            violation_marker(violation.severity),
            violation.rule_id,
            violation.location,
            violation.message
        );
    }
    let (errors, warnings) = count_violations(violations);
    let _ = write!(out, "\n{errors} errors | {warnings} warnings\n");
    out
}

fn violations_json(violations: &[RuleViolation]) -> String {
    let (errors, warnings) = count_violations(violations);
    let envelope = json!({
        "summary": { "errors": errors, "warnings": warnings },
        "violations": violations,
    });
    serde_json::to_string_pretty(&envelope).unwrap_or_default()
}

fn violations_markdown(violations: &[RuleViolation]) -> String {
    let (errors, warnings) = count_violations(violations);
    let mut out = String::new();
    out.push_str("# Spec Lint Report\n\n");
    out.push_str("## Summary\n\n");
    out.push_str("| Level | Count |\n|-------|-------|\n");
    let _ = writeln!(out, "| 🔴 Error | {errors} |");
    let _ = writeln!(out, "| 🟡 Warning | {warnings} |");
    out.push('\n');
    if violations.is_empty() {
        out.push_str("✅ All design rules pass.\n");
    } else {
        out.push_str("## Details\n\n");
        for violation in violations {
            let _ = writeln!(
                out,
                "- {} **{}** `{}` — {}",
                violation_marker(violation.severity),
                violation.rule_id,
                violation.location,
                violation.message
            );
        }
    }
    out
}

fn violations_github(violations: &[RuleViolation]) -> String {
    if violations.is_empty() {
        return "::notice ::All design rules pass".to_string();
    }
    let mut lines = Vec::with_capacity(violations.len() + 1);
    for violation in violations {
        let level = match violation.severity {
            RuleSeverity::Error => "error",
            RuleSeverity::Warning => "warning",
        };
        lines.push(format!(
            "::{} file={}::{}: {}",
            level, violation.location, violation.rule_id, violation.message
        ));
    }
    let (errors, warnings) = count_violations(violations);
    let summary_level = if errors > 0 { "error" } else { "notice" };
    lines.push(format!(
        "::{summary_level} ::Summary: {errors} errors, {warnings} warnings"
    ));
    lines.join("\n")
}

/// Render a score report.
pub fn render_score(report: &ScoreReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Markdown => {
            let mut out = String::new();
            let _ = writeln!(out, "# Consistency Score: {}/100\n", report.score);
            if !report.breakdown.is_empty() {
                out.push_str("| Category | Penalty |\n|----------|---------|\n");
                for (category, penalty) in &report.breakdown {
                    let _ = writeln!(out, "| {} | -{} |", category.as_str(), penalty);
                }
            }
            out
        }
        OutputFormat::Github => format!("::notice ::Consistency score: {}/100", report.score),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "Consistency score: {}/100", report.score);
            for (category, penalty) in &report.breakdown {
                let _ = writeln!(out, "  {}: -{}", category.as_str(), penalty);
            }
            out
        }
    }
}

/// Render a multi-spec consistency run.
pub fn render_pairwise(pairs: &[PairDiff], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let total: usize = pairs.iter().map(|p| p.changes.len()).sum();
            let breaking = pairs.iter().filter(|p| p.has_breaking()).count();
            let envelope = json!({
                "summary": { "pairs": pairs.len(), "changes": total, "breaking_pairs": breaking },
                "pairs": pairs,
            });
            serde_json::to_string_pretty(&envelope).unwrap_or_default()
        }
        _ => {
            let mut out = String::new();
            for pair in pairs {
                let _ = writeln!(
                    out,
                    "── {} vs {} ({} changes)",
                    pair.left,
                    pair.right,
                    pair.changes.len()
                );
                if !pair.changes.is_empty() {
                    out.push_str(&render_changes(&pair.changes, format));
                    out.push('\n');
                }
            }
            let consistent = pairs.iter().filter(|p| p.changes.is_empty()).count();
            let _ = write!(out, "{}/{} pairs consistent\n", consistent, pairs.len());
            out
        }
    }
}
