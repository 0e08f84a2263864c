use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use super::super::args::SyncCommand;
use super::{CommandKind, CommandResult, CommandSummary, SyncSummary, helper::finish, project::Project};
use crate::core::{
    output::{build_output, write_output},
    persist::save_store,
};
use crate::diagnostics::generate;

/// Reconcile, then persist everything the pass changed.
pub fn sync(cmd: SyncCommand) -> Result<CommandResult> {
    let project = Project::load(&cmd.common.root)?;
    let config = &project.config;
    let mut engine = project.engine()?;

    let result = engine.apply(project.updates())?;

    let mut texts = project.texts.clone();
    for (source_id, text) in &result.modified_sources {
        let path = project.source_path(source_id);
        fs::write(&path, text)
            .with_context(|| format!("Failed to write source: {}", path.display()))?;
        texts.insert(source_id.clone(), text.clone());
        info!(source_id = %source_id, "rewrote source");
    }

    let store_saved = result.store_modified;
    if store_saved {
        save_store(&project.store_path(), engine.store().data())?;
        engine.clear_store_modified();
    }

    let output = build_output(engine.store(), engine.sources(), &config.output_options());
    write_output(&project.output_dir(), &output, &config.manifest)?;

    let diagnostics = generate(&engine, &config.locales());
    let summary = SyncSummary {
        rewritten: result.modified_sources.keys().cloned().collect(),
        store_saved,
        bundles_written: output.bundles.len(),
    };

    Ok(finish(
        CommandKind::Sync,
        CommandSummary::Sync(summary),
        diagnostics,
        config,
        texts,
        project.sources.len(),
        false,
    ))
}
