//! Ledger inspection command

use anyhow::{Context, Result};
use extsync_core::types::LedgerEntry;
use extsync_core::Settings;
use extsync_extensions::host::FileConfigStore;
use extsync_extensions::{DisableListTarget, InstallLedger};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::cli::LedgerArgs;
use crate::output;

/// JSON view of the ledger
#[derive(Debug, Serialize)]
struct LedgerReport<'a> {
    path: String,
    entries: &'a [LedgerEntry],
    disabled: Vec<&'a str>,
}

pub fn run(args: LedgerArgs, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let ledger = open_ledger(&settings)?;

    if args.json {
        let report = LedgerReport {
            path: ledger.path().display().to_string(),
            entries: ledger.entries(),
            disabled: ledger.disabled_ids(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::header(&format!("{} installation ledger", settings.name));
    output::kv("File", &ledger.path().display().to_string());
    println!();

    if ledger.is_empty() {
        output::info("No extensions have been installed yet");
    } else {
        for entry in ledger.entries() {
            println!("  {}", entry);
        }
    }

    println!();
    let disable_list = ledger.disable_list();
    output::kv(
        "Disable list",
        if disable_list.is_empty() {
            "(empty)"
        } else {
            &disable_list
        },
    );
    Ok(())
}

fn open_ledger(settings: &Settings) -> Result<InstallLedger> {
    let store = Arc::new(FileConfigStore::open(settings.config_store_path()?));
    Ok(InstallLedger::load(
        settings.ledger_path()?,
        DisableListTarget::new(
            store,
            settings.registry_sub_key(),
            &settings.disable_value_name,
        ),
    ))
}
