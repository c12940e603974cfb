//! `brood put` - Store a configuration item from a file.

use std::path::PathBuf;

use anyhow::Context;
use brood_common::config::BroodConfig;
use brood_common::error::BroodError;
use brood_core::store::{ConfigStore, validate_label};
use clap::Args;

/// Arguments for the `put` command.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Container name the item is stored under.
    pub id: String,

    /// File holding the raw configuration.
    pub file: PathBuf,

    /// Format tag of the configuration.
    #[arg(short, long)]
    pub format: String,
}

/// Executes the `put` command.
///
/// Items of the container in other formats are removed first, so a restart
/// recovers only the new item.
///
/// # Errors
///
/// Returns an error if the format is not configured, the file cannot be
/// read, or the store rejects the item.
pub fn execute(args: &PutArgs, settings: &BroodConfig) -> anyhow::Result<()> {
    if !settings.formats.contains(&args.format) {
        return Err(BroodError::UnsupportedFormat {
            format: args.format.clone(),
        }
        .into());
    }
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let _ = validate_label(&args.format)?;
    let store = super::open_store(settings)?;
    store.clear(&args.id)?;
    let location = store.save(&args.id, &args.format, &raw)?;
    tracing::info!(id = %args.id, format = %args.format, location = %location, "stored configuration");
    println!("{location}");
    Ok(())
}
