use anyhow::Result;

use super::super::args::CheckCommand;
use super::{CheckSummary, CommandKind, CommandResult, CommandSummary, helper::finish, project::Project};
use crate::diagnostics::{Diagnostic, OutOfSync, generate};

/// Report what `sync` would change, without writing anything.
///
/// The verify-only pass answers whether sources or the store would change.
/// Diagnostics then come from a regular pass over an in-memory engine, so
/// they describe the state `sync` would produce.
pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let project = Project::load(&cmd.common.root)?;
    let config = &project.config;
    let mut engine = project.engine()?;

    let verified = engine.apply(project.updates().verify_only())?;
    engine.apply(project.updates())?;

    let mut diagnostics = generate(&engine, &config.locales());
    if verified.is_out_of_sync() {
        diagnostics.push(Diagnostic::OutOfSync(OutOfSync {
            sources: verified.modified_sources.keys().cloned().collect(),
            store: verified.store_modified,
        }));
    }

    Ok(finish(
        CommandKind::Check,
        CommandSummary::Check(CheckSummary {
            in_sync: !verified.is_out_of_sync(),
        }),
        diagnostics,
        config,
        project.texts.clone(),
        project.sources.len(),
        true,
    ))
}
