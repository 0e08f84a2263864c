use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::info;

use super::super::scan::{parse_source, scan_sources};
use crate::config::{Config, load_config};
use crate::core::{Engine, SourceKind, SourceUpdates, StoreData, persist::load_store};

/// Everything loaded from disk before a reconciliation pass.
pub struct Project {
    pub config: Config,
    /// Directory config paths are relative to.
    pub root: PathBuf,
    pub sources: Vec<(String, SourceKind)>,
    /// Source id -> text of sources whose fragment offsets refer to the
    /// file itself.
    pub texts: BTreeMap<String, String>,
    pub store: StoreData,
}

impl Project {
    pub fn load(start_dir: &Path) -> Result<Self> {
        let loaded = load_config(start_dir)?;
        let config = loaded.config;
        let root = loaded.root;
        if !loaded.from_file {
            info!(root = %root.display(), "no config file found, using defaults");
        }

        let mut sources = Vec::new();
        let mut texts = BTreeMap::new();
        for file in scan_sources(&root, &config.sources, &config.ignores)? {
            let text = fs::read_to_string(&file.path)
                .with_context(|| format!("Failed to read source: {}", file.path.display()))?;
            let source = parse_source(&file.path, &text)?;
            if matches!(source, SourceKind::Line(_)) {
                texts.insert(file.source_id.clone(), text);
            }
            sources.push((file.source_id, source));
        }

        let store = load_store(&root.join(&config.store))?;

        Ok(Self {
            config,
            root,
            sources,
            texts,
            store,
        })
    }

    pub fn engine(&self) -> Result<Engine> {
        Ok(Engine::new(StoreData::new(), self.config.discard_policy()?))
    }

    /// Every discovered source plus the loaded store as a fresh snapshot,
    /// so store fragments of deleted source files are dropped too.
    pub fn updates(&self) -> SourceUpdates {
        self.sources
            .iter()
            .cloned()
            .fold(
                SourceUpdates::new().with_store(self.store.clone()),
                |updates, (source_id, source)| updates.update(source_id, source),
            )
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join(&self.config.store)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output.dir)
    }

    pub fn source_path(&self, source_id: &str) -> PathBuf {
        self.root.join(source_id)
    }
}
