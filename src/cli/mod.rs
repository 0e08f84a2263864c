//! Command-line interface layer.
//!
//! ## Module Structure
//!
//! - `args`: clap argument definitions
//! - `scan`: source file discovery and parsing
//! - `commands`: `sync`, `check` and `init`
//! - `report`: cargo-style output
//! - `exit_status`: process exit codes

use anyhow::Result;

mod args;
mod commands;
mod exit_status;
mod report;
mod run;
mod scan;

pub use args::{Arguments, Command, CommonArgs};
pub use commands::{CommandKind, CommandResult, CommandSummary};
pub use exit_status::ExitStatus;
pub use scan::{SourceFile, parse_source, scan_sources};

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    let result = run::run(args)?;
    report::print(&result, verbose);

    Ok(exit_status_from_result(&result))
}

fn exit_status_from_result(result: &CommandResult) -> ExitStatus {
    if result.exit_on_errors && result.error_count > 0 {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    }
}
