use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, check::check, init::init, sync::sync},
};

/// Dispatch to the command handler.
///
/// # Returns
/// - `Ok(CommandResult)` with diagnostics and exit behavior
/// - `Err` if the command fails (e.g., invalid config, unreadable store)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Init(cmd)) => init(cmd),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
