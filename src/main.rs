//! omnirelease CLI
//!
//! Usage: omnirelease [--json] [-v...] [--config PATH] <COMMAND>
//!
//! Commands:
//!   refresh            Export an environment and record component changes
//!   pending            Components changed since the latest release
//!   check              Dependencies a selection omits
//!   deploy             Deploy a selection and record the release
//!   releases           List recorded releases
//!   history            Release deployment log or rollback history
//!   rollback           Back up and remove a commit's files
//!   redeploy-rollback  Restore a rolled-back commit
//!   redeploy-release   Re-run a recorded release
//!   promote            Deploy a recorded release to another environment

mod cli;
mod commands;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use omnirelease::infrastructure::CancelFlag;

use cli::Cli;
use commands::CommandStatus;
use ui::UiContext;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let json = cli.json;
    match commands::run(cli, cancel) {
        Ok(CommandStatus::Success) => ExitCode::SUCCESS,
        Ok(CommandStatus::Failed) => ExitCode::FAILURE,
        Err(err) => {
            let ui = UiContext::new(json);
            if json {
                if let Err(e) = ui::json::emit(&ui::error::error_document(&err)) {
                    eprintln!("{e}");
                }
            } else {
                eprint!("{}", ui::error::format_error(&err, &ui));
            }
            ExitCode::FAILURE
        }
    }
}
