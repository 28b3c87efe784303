//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// extsync - Keep installed extensions in step with a published feed
#[derive(Parser, Debug)]
#[command(name = "extsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to extsync.yaml settings file
    #[arg(short, long, global = true, env = "EXTSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile installed extensions with the feed if it changed
    Run(RunArgs),

    /// Forget the ledger and feed cache, then run
    Reset,

    /// Show the installation ledger and disable-list
    Ledger(LedgerArgs),

    /// Show the cached feed and eligibility for this host
    Feed(FeedArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Fetch the feed now and reconcile even if it is unchanged
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Fetch the feed before listing it
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
