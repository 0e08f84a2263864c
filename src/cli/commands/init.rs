use std::{collections::BTreeMap, fs};

use anyhow::{Context, Result};

use super::super::args::InitCommand;
use super::{CommandKind, CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init(cmd: InitCommand) -> Result<CommandResult> {
    let path = cmd.root.join(CONFIG_FILE_NAME);

    let error = if path.exists() {
        Some(format!("{} already exists", CONFIG_FILE_NAME))
    } else {
        fs::write(&path, default_config_json()? + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        None
    };

    Ok(CommandResult {
        kind: CommandKind::Init,
        error_count: usize::from(error.is_some()),
        warning_count: 0,
        exit_on_errors: true,
        summary: CommandSummary::Init(InitSummary { path, error }),
        diagnostics: Vec::new(),
        texts: BTreeMap::new(),
        sources_checked: 0,
    })
}
