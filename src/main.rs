//! pms - InsureTech project management console
//!
//! Role-gated dashboard, Kanban board, backlog, phase tracking, permission
//! matrix and AI assistant for the claims review automation project.

use clap::Parser;
use pms::cli::{Cli, Commands};
use pms::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG (or -v for pms=debug).
    // Ignore invalid/huge filters so startup never fails on them.
    // -v is ignored by `ui`: stderr shares the terminal with the screen.
    let verbose = cli.verbose && !matches!(cli.command, Commands::Ui);
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(if verbose { "pms=debug" } else { "off" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
