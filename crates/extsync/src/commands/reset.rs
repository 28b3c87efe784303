//! Reset command

use anyhow::Result;
use std::path::Path;

use crate::output;
use crate::shell::open_service;

use super::{cancel_on_ctrl_c, report};

pub async fn run(config: Option<&Path>) -> Result<()> {
    let (mut service, shell) = open_service(config)?;
    output::info(&format!(
        "Resetting {}: forgetting installation history and cached feed",
        service.settings().name
    ));

    let cancel = cancel_on_ctrl_c();
    let outcome = service.reset(&cancel).await;
    shell.finish();

    report(&outcome?);
    Ok(())
}
