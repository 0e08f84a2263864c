//! Store file load/save.
//!
//! A missing or empty store file is an empty store. Output is sorted so the
//! file diffs cleanly: fragments and translations by key (they are
//! `BTreeMap`s), obsolete entries stably by id.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use super::store::StoreData;

pub fn load_store(path: &Path) -> Result<StoreData> {
    if !path.exists() {
        warn!(path = %path.display(), "store file not found, starting with an empty store");
        return Ok(StoreData::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file: {}", path.display()))?;
    parse_store(&content).with_context(|| format!("Failed to parse store file: {}", path.display()))
}

pub fn parse_store(content: &str) -> Result<StoreData> {
    if content.trim().is_empty() {
        return Ok(StoreData::new());
    }
    Ok(serde_json::from_str(content)?)
}

/// Pretty JSON in the on-disk layout, without a trailing newline.
pub fn serialize_store(data: &StoreData) -> Result<String> {
    let mut sorted = data.clone();
    sorted.obsolete.sort_by(|a, b| a.0.cmp(&b.0));
    serde_json::to_string_pretty(&sorted).context("Failed to serialize store")
}

pub fn save_store(path: &Path, data: &StoreData) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut content = serialize_store(data)?;
    content.push('\n');
    fs::write(path, content)
        .with_context(|| format!("Failed to write store file: {}", path.display()))
}
