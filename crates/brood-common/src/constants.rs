//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default working directory on a host installation.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/brood";

/// `$HOME/.brood`, or [`SYSTEM_DATA_DIR`] when no home is set.
fn resolve_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(|| PathBuf::from(SYSTEM_DATA_DIR), |home| PathBuf::from(home).join(".brood"))
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Default working directory, resolved once per process.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Sub-folder of the working directory holding persisted container configuration.
pub const STORE_FOLDER: &str = "brood";

/// Marker file written into the store folder on open.
pub const STORE_MARKER: &str = ".brood";

/// Separates the item name from its format tag in stored file names.
pub const FORMAT_SEPARATOR: &str = "##";

/// Format tag of mapping-file based container configuration.
pub const MAPPING_FORMAT: &str = "config";

/// Format tag of JSON container descriptors.
pub const JSON_FORMAT: &str = "json";

/// Default maximal wait for lifecycle and store locks, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: i64 = 5_000;

/// Binary name for the CLI.
pub const BIN_NAME: &str = "brood";
