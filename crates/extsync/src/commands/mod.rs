//! CLI command implementations

pub mod feed;
pub mod ledger;
pub mod reset;
pub mod run;
pub mod version;

use extsync_extensions::{CancelFlag, RunOutcome};

use crate::output;

/// Cancel flag tripped by Ctrl-C
///
/// The reconciler finishes its current step and saves the ledger before
/// returning.
pub(crate) fn cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            output::warning("Cancelling after the current step...");
            watcher.cancel();
        }
    });
    cancel
}

/// Print a run outcome
pub(crate) fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::UpToDate => output::success("Extensions are up to date"),
        RunOutcome::Completed { result, cancelled } => {
            if *cancelled {
                output::warning("Run was cancelled; remaining work resumes on the next run");
            }

            if result.is_empty() {
                output::success("Nothing to install");
                return;
            }

            output::header("Installed");
            for outcome in result.outcomes() {
                let restart = if outcome.restart.requires_restart() {
                    "restart required"
                } else {
                    "ready"
                };
                output::kv(&outcome.name, restart);
            }

            if result.must_restart() {
                println!();
                output::warning("Restart the host application to finish installing");
            } else {
                println!();
                output::success(&format!("Processed {} extension(s)", result.len()));
            }
        }
    }
}
