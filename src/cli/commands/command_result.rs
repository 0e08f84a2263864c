use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::diagnostics::Reported;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Sync,
    Check,
    Init,
}

#[derive(Debug)]
pub enum CommandSummary {
    Sync(SyncSummary),
    Check(CheckSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct SyncSummary {
    /// Source ids whose text was rewritten with new ids.
    pub rewritten: Vec<String>,
    pub store_saved: bool,
    pub bundles_written: usize,
}

#[derive(Debug)]
pub struct CheckSummary {
    pub in_sync: bool,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
    /// Set when the config file already exists.
    pub error: Option<String>,
}

/// Result of running fragsync commands
pub struct CommandResult {
    pub kind: CommandKind,
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
    /// Diagnostics with their effective severity, sorted.
    pub diagnostics: Vec<Reported>,
    /// Source id -> text, used to turn fragment offsets into line:col.
    pub texts: BTreeMap<String, String>,
    pub sources_checked: usize,
}
