//! Config store backed by one flat directory of files.
//!
//! Every item lives in `<root>/brood/<name>##<format>`. A `.brood` marker file
//! holding the creation time identifies the folder. All operations are
//! serialized by an internal lock that callers wait for at most the
//! configured timeout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use brood_common::constants::{FORMAT_SEPARATOR, STORE_FOLDER, STORE_MARKER};
use brood_common::error::{BroodError, Result};
use brood_common::timeout::Timeout;

use super::{ConfigStore, validate_label};

/// Directory-backed [`ConfigStore`].
#[derive(Debug)]
pub struct FileSystemConfigStore {
    directory: PathBuf,
    wait: Duration,
    lock: Mutex<()>,
}

impl FileSystemConfigStore {
    /// Opens or creates the store folder below `root`.
    ///
    /// An undefined `timeout` makes every operation fail immediately if the
    /// store is in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or its marker cannot be created.
    pub fn open(root: &Path, timeout: Timeout) -> Result<Self> {
        let directory = std::path::absolute(root.join(STORE_FOLDER)).map_err(|e| BroodError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;
        std::fs::create_dir_all(&directory).map_err(|e| BroodError::Io {
            path: directory.clone(),
            source: e,
        })?;
        let marker = directory.join(STORE_MARKER);
        if !marker.exists() {
            let stamp = chrono::Utc::now().to_rfc3339();
            std::fs::write(&marker, stamp).map_err(|e| BroodError::Io {
                path: marker.clone(),
                source: e,
            })?;
        }
        tracing::info!(directory = %directory.display(), "using file system config store");
        Ok(Self {
            directory,
            wait: timeout.as_duration_or(Duration::ZERO),
            lock: Mutex::new(()),
        })
    }

    /// Absolute path of the store folder.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .try_lock_for(self.wait)
            .ok_or(BroodError::StoreBusy { waited: self.wait })
    }

    fn entries(&self) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = std::fs::read_dir(&self.directory).map_err(|e| BroodError::Io {
            path: self.directory.clone(),
            source: e,
        })?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| BroodError::Io {
                path: self.directory.clone(),
                source: e,
            })?;
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
                entries.push((name.to_owned(), entry.path()));
            }
        }
        Ok(entries)
    }
}

impl ConfigStore for FileSystemConfigStore {
    fn save(&self, name: &str, format: &str, raw: &[u8]) -> Result<String> {
        let file_name = format!(
            "{}{FORMAT_SEPARATOR}{}",
            validate_label(name)?,
            validate_label(format)?
        );
        let path = self.directory.join(file_name);
        let _guard = self.acquire()?;
        std::fs::write(&path, raw).map_err(|e| BroodError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "saved config");
        Ok(format!("file://{}", path.display()))
    }

    fn clear(&self, name: &str) -> Result<()> {
        let prefix = format!("{}{FORMAT_SEPARATOR}", validate_label(name)?);
        let _guard = self.acquire()?;
        for (file_name, path) in self.entries()? {
            if file_name.starts_with(&prefix) {
                std::fs::remove_file(&path).map_err(|e| BroodError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                tracing::debug!(path = %path.display(), "removed config");
            }
        }
        Ok(())
    }

    fn find_all_with_identifier(&self, format: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let format = validate_label(format)?;
        let _guard = self.acquire()?;
        let mut found = BTreeMap::new();
        for (file_name, path) in self.entries()? {
            let Some((name, tag)) = file_name.split_once(FORMAT_SEPARATOR) else {
                continue;
            };
            if tag != format {
                continue;
            }
            let raw = std::fs::read(&path).map_err(|e| BroodError::Io {
                path: path.clone(),
                source: e,
            })?;
            let _ = found.insert(name.to_owned(), raw);
        }
        tracing::debug!(format, count = found.len(), "loaded configs");
        Ok(found)
    }
}
