//! `brood ls` - List stored configuration items.

use brood_common::config::BroodConfig;
use brood_core::store::ConfigStore;
use clap::Args;

use crate::output::{self, Item};

/// Arguments for the `ls` command.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list items of this format.
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Executes the `ls` command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or read.
pub fn execute(args: &LsArgs, settings: &BroodConfig) -> anyhow::Result<()> {
    let store = super::open_store(settings)?;
    let formats = args
        .format
        .as_ref()
        .map_or_else(|| settings.formats.clone(), |f| vec![f.clone()]);

    let mut items = Vec::new();
    for format in &formats {
        for (name, raw) in store.find_all_with_identifier(format)? {
            items.push(Item {
                name,
                format: format.clone(),
                size: raw.len(),
            });
        }
    }
    tracing::debug!(count = items.len(), "listed configuration items");

    if items.is_empty() {
        println!("No configuration items found.");
    } else {
        print!("{}", output::render_items(&items));
    }
    Ok(())
}
