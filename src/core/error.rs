use thiserror::Error;

/// Typed errors of the library: fatal reconciliation failures and invalid
/// names parsed from configuration.
///
/// Data inconsistencies (duplicate ids, unsynced stores) are not errors; they
/// surface as diagnostics instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid discard policy \"{0}\" (expected one of: all, untranslated, outdated)")]
    InvalidDiscardPolicy(String),

    #[error("unknown diagnostic kind \"{0}\"")]
    UnknownDiagnosticKind(String),

    #[error("id generator for source \"{source_id}\" produced no unused id after {attempts} attempts")]
    IdGeneratorExhausted { source_id: String, attempts: usize },

    #[error("invalid timestamp \"{0}\" (expected RFC 3339)")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;
