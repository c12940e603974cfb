//! Volatile config store for tests and embedded use.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use brood_common::constants::FORMAT_SEPARATOR;
use brood_common::error::Result;

use super::{ConfigStore, validate_label};

/// [`ConfigStore`] that keeps items in memory.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    items: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl InMemoryConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored item, if any.
    pub fn get(&self, name: &str, format: &str) -> Option<Vec<u8>> {
        self.items
            .lock()
            .get(&(name.to_owned(), format.to_owned()))
            .cloned()
    }

    /// Number of stored items across all formats.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn save(&self, name: &str, format: &str, raw: &[u8]) -> Result<String> {
        let key = (
            validate_label(name)?.to_owned(),
            validate_label(format)?.to_owned(),
        );
        let location = format!("memory:///{}{FORMAT_SEPARATOR}{}", key.0, key.1);
        let _ = self.items.lock().insert(key, raw.to_vec());
        Ok(location)
    }

    fn clear(&self, name: &str) -> Result<()> {
        let name = validate_label(name)?;
        self.items.lock().retain(|(item, _), _| item != name);
        Ok(())
    }

    fn find_all_with_identifier(&self, format: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let format = validate_label(format)?;
        Ok(self
            .items
            .lock()
            .iter()
            .filter(|((_, tag), _)| tag == format)
            .map(|((name, _), raw)| (name.clone(), raw.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_find_by_format() {
        let store = InMemoryConfigStore::new();
        let location = store.save("default", "config", b"m").expect("save");
        let _ = store.save("other", "json", b"{}").expect("save");

        assert_eq!(location, "memory:///default##config");
        let found = store.find_all_with_identifier("config").expect("scan");
        assert_eq!(found.len(), 1);
        assert_eq!(found["default"], b"m");
    }

    #[test]
    fn clear_removes_every_format_of_name() {
        let store = InMemoryConfigStore::new();
        let _ = store.save("default", "config", b"m").expect("save");
        let _ = store.save("default", "json", b"{}").expect("save");
        let _ = store.save("keep", "json", b"{}").expect("save");

        store.clear("default").expect("clear");

        assert_eq!(store.len(), 1);
        assert!(store.get("default", "json").is_none());
        assert!(store.get("keep", "json").is_some());
    }
}
