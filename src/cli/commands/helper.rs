use std::collections::BTreeMap;

use super::{CommandKind, CommandResult, CommandSummary};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Severity, apply_severities};

pub fn finish(
    kind: CommandKind,
    summary: CommandSummary,
    diagnostics: Vec<Diagnostic>,
    config: &Config,
    texts: BTreeMap<String, String>,
    sources_checked: usize,
    exit_on_errors: bool,
) -> CommandResult {
    let diagnostics = apply_severities(diagnostics, &config.diagnostics);

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    CommandResult {
        kind,
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        diagnostics,
        texts,
        sources_checked,
    }
}
