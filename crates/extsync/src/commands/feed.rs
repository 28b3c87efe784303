//! Feed inspection command

use anyhow::{Context, Result};
use extsync_core::types::{ExtensionDescriptor, ProductVersion};
use extsync_core::Settings;
use extsync_extensions::FeedCache;
use std::path::Path;

use crate::cli::FeedArgs;
use crate::output;

pub async fn run(args: FeedArgs, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    settings.validate()?;

    let mut feed = FeedCache::new(&settings.feed_url, settings.feed_cache_path()?)?;

    if args.refresh {
        let spinner = output::spinner(&format!("Fetching {}", feed.url()));
        let changed = feed.update().await;
        spinner.finish_and_clear();

        if changed? {
            output::success("Feed changed since the last fetch");
        } else {
            output::info("Feed unchanged");
        }
    } else {
        feed.parse();
    }

    output::header(&format!("{} feed", settings.name));
    output::kv("Source", feed.url());
    output::kv("Cache", &feed.cache_path().display().to_string());
    if let Some(version) = &settings.host.version {
        output::kv("Host version", &version.to_string());
    }
    println!();

    if feed.extensions().is_empty() {
        output::info("No extensions in the cached feed");
        return Ok(());
    }

    for extension in feed.extensions() {
        println!("  {}", describe(extension, settings.host.version.as_ref()));
    }
    Ok(())
}

/// One listing line: id, name, supported range and eligibility
fn describe(extension: &ExtensionDescriptor, host: Option<&ProductVersion>) -> String {
    let eligibility = match host {
        Some(version) if extension.supports(version) => "eligible",
        Some(_) => "out of range",
        None => "unknown host",
    };
    format!(
        "{:<40} {:<30} [{} - {}] {}",
        extension.id, extension.name, extension.min_version, extension.max_version, eligibility
    )
}
