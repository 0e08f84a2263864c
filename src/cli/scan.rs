//! Source unit discovery.
//!
//! Walks the project root and keeps files whose root-relative path matches
//! one of the configured source patterns and none of the ignore patterns.
//! Hidden directories are never entered.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::core::{LineSource, SourceKind, StaticSource};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Root-relative path with `/` separators; doubles as the source id.
    pub source_id: String,
    pub path: PathBuf,
}

pub fn scan_sources(root: &Path, includes: &[String], ignores: &[String]) -> Result<Vec<SourceFile>> {
    let includes = compile(includes, "sources")?;
    let ignores = compile(ignores, "ignores")?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "cannot access path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(source_id) = relative_id(root, entry.path()) else {
            continue;
        };
        let included = includes.iter().any(|p| p.matches_with(&source_id, MATCH_OPTIONS));
        let ignored = ignores.iter().any(|p| p.matches_with(&source_id, MATCH_OPTIONS));
        if included && !ignored {
            files.push(SourceFile {
                source_id,
                path: entry.into_path(),
            });
        }
    }

    debug!(count = files.len(), "discovered source files");
    Ok(files)
}

/// Parse a source file by extension: `.json` holds extracted fragments,
/// everything else is a line resource.
pub fn parse_source(path: &Path, text: &str) -> Result<SourceKind> {
    if path.extension().is_some_and(|ext| ext == "json") {
        let source = StaticSource::from_json(text)
            .with_context(|| format!("Failed to parse fragment list: {}", path.display()))?;
        Ok(SourceKind::Static(source))
    } else {
        Ok(SourceKind::Line(LineSource::parse(text)))
    }
}

fn compile(patterns: &[String], field: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .with_context(|| format!("Invalid glob pattern in '{}': \"{}\"", field, p))
        })
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn relative_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
