//! `brood config` - Print the resolved configuration.

use brood_common::config::BroodConfig;
use clap::Args;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print on a single line.
    #[arg(long)]
    pub compact: bool,
}

/// Executes the `config` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn execute(args: &ConfigArgs, settings: &BroodConfig) -> anyhow::Result<()> {
    let json = if args.compact {
        serde_json::to_string(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    println!("{json}");
    Ok(())
}
