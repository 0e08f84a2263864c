//! Report formatting and printing utilities.
//!
//! Diagnostics are printed cargo-style. Separate from core logic so fragsync
//! can be used as a library.

use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::Colorize;

use super::commands::{
    CheckSummary, CommandResult, CommandSummary, InitSummary, SyncSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::diagnostics::{FragmentContext, Report, Reported, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print diagnostics in cargo-style format.
pub fn report_to<W: Write>(
    diagnostics: &[Reported],
    texts: &BTreeMap<String, String>,
    writer: &mut W,
) {
    if diagnostics.is_empty() {
        return;
    }

    for reported in diagnostics {
        print_diagnostic(reported, texts, writer);
    }

    print_summary(diagnostics, writer);
}

pub fn print(result: &CommandResult, verbose: bool) {
    let mut out = io::stdout().lock();
    print_to(result, verbose, &mut out);
}

pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Sync(summary) => print_sync(summary, verbose, writer),
        CommandSummary::Check(summary) => print_check(summary, writer),
        CommandSummary::Init(summary) => {
            print_init(summary, writer);
            return;
        }
    }

    report_to(&result.diagnostics, &result.texts, writer);
    if result.diagnostics.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} {} - no issues found",
                result.sources_checked,
                if result.sources_checked == 1 {
                    "source"
                } else {
                    "sources"
                }
            )
            .green()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_diagnostic<W: Write>(
    reported: &Reported,
    texts: &BTreeMap<String, String>,
    writer: &mut W,
) {
    let diagnostic = &reported.diagnostic;
    let severity_str = match reported.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        diagnostic.message(),
        diagnostic.kind().to_string().dimmed().cyan()
    );

    if let Some(context) = diagnostic.context() {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), location(context, texts));
    }

    if let Some(details) = diagnostic.details() {
        let _ = writeln!(writer, "   {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer); // Empty line between diagnostics
}

/// `source:line:col` when the source text is known, `source@start..end`
/// otherwise.
fn location(context: &FragmentContext, texts: &BTreeMap<String, String>) -> String {
    let line_col = texts
        .get(&context.source_id)
        .and_then(|text| line_col(text, context.start));
    match line_col {
        Some((line, col)) => format!("{}:{}:{}", context.source_id, line, col),
        None => format!("{}@{}..{}", context.source_id, context.start, context.end),
    }
}

/// 1-based line and column of a byte offset.
fn line_col(text: &str, offset: usize) -> Option<(usize, usize)> {
    let before = text.get(..offset)?;
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = before[line_start..].chars().count() + 1;
    Some((line, col))
}

fn print_summary<W: Write>(diagnostics: &[Reported], writer: &mut W) {
    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let total_errors = count(Severity::Error);
    let total_warnings = count(Severity::Warning);
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn print_sync<W: Write>(summary: &SyncSummary, verbose: bool, writer: &mut W) {
    if !summary.rewritten.is_empty() {
        let _ = writeln!(
            writer,
            "{} Assigned new ids in {} {}",
            SUCCESS_MARK.green(),
            summary.rewritten.len(),
            if summary.rewritten.len() == 1 {
                "source"
            } else {
                "sources"
            }
        );
        if verbose {
            for source_id in &summary.rewritten {
                let _ = writeln!(writer, "    {}", source_id.dimmed());
            }
        }
    }
    if summary.store_saved {
        let _ = writeln!(writer, "{} Updated the translation store", SUCCESS_MARK.green());
    }
    if verbose {
        let _ = writeln!(
            writer,
            "{} Wrote {} locale bundles",
            SUCCESS_MARK.green(),
            summary.bundles_written
        );
    }
}

fn print_check<W: Write>(summary: &CheckSummary, writer: &mut W) {
    if summary.in_sync {
        let _ = writeln!(writer, "{} Sources and store are in sync", SUCCESS_MARK.green());
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    match &summary.error {
        None => {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!("Created {}", CONFIG_FILE_NAME).green()
            );
        }
        Some(error) => {
            let _ = writeln!(writer, "{} {}", "error:".bold().red(), error);
        }
    }
}

// ============================================================
// Tests
// ============================================================
