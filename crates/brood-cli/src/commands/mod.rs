//! CLI command definitions and dispatch.

pub mod config;
pub mod ls;
pub mod put;
pub mod rm;

use std::path::PathBuf;

use brood_common::config::BroodConfig;
use brood_core::store::FileSystemConfigStore;
use clap::{Parser, Subcommand};

/// brood - manage persisted dataset container configuration.
#[derive(Parser, Debug)]
#[command(name = brood_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Working directory; overrides `home` from the configuration file.
    #[arg(long, global = true, env = "BROOD_HOME")]
    pub home: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, global = true, env = "BROOD_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolves the effective configuration from the file and overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn settings(&self) -> anyhow::Result<BroodConfig> {
        let mut settings = match &self.config {
            Some(path) => BroodConfig::load(path)?,
            None => BroodConfig::default(),
        };
        if let Some(home) = &self.home {
            settings.home.clone_from(home);
        }
        Ok(settings)
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored configuration items.
    Ls(ls::LsArgs),
    /// Store a configuration item from a file.
    Put(put::PutArgs),
    /// Remove every configuration item of a container.
    Rm(rm::RmArgs),
    /// Print the resolved configuration as JSON.
    Config(config::ConfigArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    match cli.command {
        Command::Ls(args) => ls::execute(&args, &settings),
        Command::Put(args) => put::execute(&args, &settings),
        Command::Rm(args) => rm::execute(&args, &settings),
        Command::Config(args) => config::execute(&args, &settings),
    }
}

/// Opens the file system store below the configured home.
///
/// # Errors
///
/// Returns an error if the store folder cannot be created.
pub fn open_store(settings: &BroodConfig) -> anyhow::Result<FileSystemConfigStore> {
    Ok(FileSystemConfigStore::open(&settings.home, settings.timeout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_flag_overrides_default() {
        let cli = Cli::parse_from(["brood", "--home", "/srv/gateway", "ls"]);
        let settings = cli.settings().expect("settings");
        assert_eq!(settings.home, PathBuf::from("/srv/gateway"));
        assert_eq!(settings.store_root(), PathBuf::from("/srv/gateway/brood"));
    }

    #[test]
    fn config_file_is_loaded_then_overridden() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("brood.json");
        std::fs::write(&path, r#"{"home": "/from/file", "formats": ["json"]}"#).expect("write");

        let cli = Cli::parse_from([
            "brood",
            "rm",
            "default",
            "--config",
            path.to_str().expect("utf-8 path"),
        ]);
        let settings = cli.settings().expect("settings");
        assert_eq!(settings.home, PathBuf::from("/from/file"));
        assert_eq!(settings.formats, vec!["json".to_owned()]);
    }

    #[test]
    fn put_requires_format() {
        assert!(Cli::try_parse_from(["brood", "put", "default", "mapping.ttl"]).is_err());
    }
}
