//! Persistent storage of raw container configuration.
//!
//! Items are keyed by `(name, format)`. The warden saves an item before it
//! activates the container built from it and recovers all items of a format
//! on start.

use std::collections::BTreeMap;

use brood_common::error::{BroodError, Result};

pub mod fs;
pub mod memory;

pub use fs::FileSystemConfigStore;
pub use memory::InMemoryConfigStore;

/// Durable key/value storage for configuration items.
pub trait ConfigStore: Send + Sync {
    /// Stores `raw` as item `name` in `format`, replacing an existing item.
    ///
    /// Returns a location string describing where the item was written.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::IllegalLabel`] for a malformed name or format,
    /// or an error if the item could not be written.
    fn save(&self, name: &str, format: &str, raw: &[u8]) -> Result<String>;

    /// Removes every item named `name`, whatever its format.
    ///
    /// Clearing a name with no items is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::IllegalLabel`] for a malformed name, or an error
    /// if an item could not be removed.
    fn clear(&self, name: &str) -> Result<()>;

    /// Returns every item stored in `format`, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::IllegalLabel`] for a malformed format, or an
    /// error if the items could not be read.
    fn find_all_with_identifier(&self, format: &str) -> Result<BTreeMap<String, Vec<u8>>>;
}

/// Accepts labels of at least two characters drawn from `[A-Za-z0-9_.-]`
/// that start with a word character.
///
/// # Errors
///
/// Returns [`BroodError::IllegalLabel`] if `label` does not match.
pub fn validate_label(label: &str) -> Result<&str> {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut chars = label.chars();
    let legal = chars.next().is_some_and(word)
        && !chars.as_str().is_empty()
        && chars.all(|c| word(c) || c == '.' || c == '-');
    if legal {
        Ok(label)
    } else {
        Err(BroodError::IllegalLabel {
            label: label.to_owned(),
        })
    }
}
