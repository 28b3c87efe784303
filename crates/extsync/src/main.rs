//! extsync CLI - Keep installed extensions in step with a published feed
//!
//! This is the main entry point for the extsync command-line interface.

mod cli;
mod commands;
mod output;
mod shell;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run::run(args, config).await,
        Commands::Reset => commands::reset::run(config).await,
        Commands::Ledger(args) => commands::ledger::run(args, config),
        Commands::Feed(args) => commands::feed::run(args, config).await,
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Info shows the installer transcript; -v/-vv for more detail
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
