//! `brood rm` - Remove every configuration item of a container.

use brood_common::config::BroodConfig;
use brood_core::store::ConfigStore;
use clap::Args;

/// Arguments for the `rm` command.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Container name whose items are removed.
    pub id: String,
}

/// Executes the `rm` command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or an item cannot be removed.
pub fn execute(args: &RmArgs, settings: &BroodConfig) -> anyhow::Result<()> {
    let store = super::open_store(settings)?;
    store.clear(&args.id)?;
    tracing::info!(id = %args.id, "removed configuration");
    Ok(())
}
