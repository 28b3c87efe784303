//! Run command

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::cli::RunArgs;
use crate::shell::open_service;

use super::{cancel_on_ctrl_c, report};

pub async fn run(args: RunArgs, config: Option<&Path>) -> Result<()> {
    let (mut service, shell) = open_service(config)?;
    debug!("Extensions directory: {}", shell.extensions_dir().display());
    let cancel = cancel_on_ctrl_c();

    let outcome = if args.force {
        service.run_forced(&cancel).await
    } else {
        service.run_if_due(&cancel).await
    };
    shell.finish();

    report(&outcome?);
    Ok(())
}
