//! fragsync - keeps extracted text fragments in sync with a translation store
//!
//! fragsync assigns stable ids to translatable fragments in source files,
//! reconciles them with a persisted translation store, reports translation
//! coverage gaps and writes per-locale bundles plus a manifest.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (`sync`, `check`, `init`)
//! - `config`: Configuration file loading and parsing
//! - `core`: Reconciliation engine, store model and adapters
//! - `diagnostics`: Diagnostic types, generation and severities

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
