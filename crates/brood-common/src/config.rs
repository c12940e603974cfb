//! Global configuration model for the container orchestrator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{BroodError, Result};
use crate::monitor::UndefinedWait;
use crate::timeout::Timeout;

/// Root configuration for a brood deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroodConfig {
    /// Working directory; the config store lives in `<home>/brood`.
    pub home: PathBuf,
    /// Maximal time to wait for lifecycle and store locks.
    pub timeout: Timeout,
    /// How an undefined `timeout` is applied to lock acquisition.
    pub undefined_wait: UndefinedWait,
    /// Config format tags recovered on start, in order.
    pub formats: Vec<String>,
}

impl Default for BroodConfig {
    fn default() -> Self {
        Self {
            home: constants::data_dir().clone(),
            timeout: Timeout::from_millis(constants::DEFAULT_TIMEOUT_MS),
            undefined_wait: UndefinedWait::default(),
            formats: vec![
                constants::MAPPING_FORMAT.to_owned(),
                constants::JSON_FORMAT.to_owned(),
            ],
        }
    }
}

impl BroodConfig {
    /// Loads a configuration file, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| BroodError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Path of the config store folder below `home`.
    #[must_use]
    pub fn store_root(&self) -> PathBuf {
        self.home.join(constants::STORE_FOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recovers_both_formats() {
        let config = BroodConfig::default();
        assert_eq!(config.formats, vec!["config", "json"]);
        assert_eq!(config.undefined_wait, UndefinedWait::Immediate);
        assert!(config.timeout.is_defined());
    }

    #[test]
    fn load_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("brood.json");
        std::fs::write(
            &path,
            r#"{ "home": "/srv/brood", "timeout": "undefined", "undefined_wait": "indefinite" }"#,
        )
        .expect("write config");

        let config = BroodConfig::load(&path).expect("load");
        assert_eq!(config.home, PathBuf::from("/srv/brood"));
        assert_eq!(config.timeout, Timeout::undefined());
        assert_eq!(config.undefined_wait, UndefinedWait::Indefinite);
        assert_eq!(config.formats, BroodConfig::default().formats);
    }

    #[test]
    fn load_rejects_malformed_timeout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("brood.json");
        std::fs::write(&path, r#"{ "timeout": "soon" }"#).expect("write config");
        assert!(BroodConfig::load(&path).is_err());
    }

    #[test]
    fn load_reports_missing_file_path() {
        let err = BroodConfig::load(Path::new("/nonexistent/brood.json")).unwrap_err();
        assert!(matches!(err, BroodError::Io { .. }));
    }

    #[test]
    fn store_root_is_below_home() {
        let config = BroodConfig {
            home: PathBuf::from("/srv/brood"),
            ..BroodConfig::default()
        };
        assert_eq!(config.store_root(), PathBuf::from("/srv/brood/brood"));
    }
}
