//! Read-optimized lookup of deployed containers, built from events only.
//!
//! Registries never consult the catalog. They subscribe to the event stream
//! and keep their own concurrent map, so request routing can look up
//! containers without touching the orchestrator lock. They reference
//! containers but never close them.
//!
//! Unlike the catalog, a registry does not pair a replacement with a
//! corrective event: a `Deployed` event for an occupied name simply
//! overwrites the entry (last write wins) and logs a diagnostic.

use std::sync::Arc;

use dashmap::DashMap;

use brood_common::error::{BroodError, Result};
use brood_common::types::{Id, Language};

use crate::container::{Container, Engine, same_container};
use crate::event::{ContainerEvent, ContainerListener};

/// Concurrent map of currently deployed containers.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    registry: DashMap<Id, Arc<dyn Container>>,
}

impl ContainerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the container deployed as `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::NotFound`] if no container is known under `id`.
    pub fn find(&self, id: &Id) -> Result<Arc<dyn Container>> {
        self.registry
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BroodError::NotFound {
                kind: "container",
                id: id.to_string(),
            })
    }

    /// Sorted names of all known containers.
    #[must_use]
    pub fn ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.registry.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of known containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no container is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl ContainerListener for ContainerRegistry {
    fn on_deploy(&self, event: &ContainerEvent) {
        let container = Arc::clone(event.container());
        let id = container.name().clone();
        let former = self.registry.insert(id.clone(), Arc::clone(&container));
        if former.is_some_and(|former| !same_container(&former, &container)) {
            tracing::warn!(id = %id, "replacing registered container without a drop event");
        }
    }

    fn on_drop(&self, event: &ContainerEvent) {
        let id = event.container().name();
        if self.registry.remove(id).is_none() {
            tracing::warn!(id = %id, "dropped container was not registered");
        }
    }
}

/// Registry that additionally routes to a container's engine by language.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    containers: ContainerRegistry,
}

impl EngineRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the engine of container `id` that executes `language`.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::NotFound`] if `id` is unknown, which takes
    /// precedence over [`BroodError::LanguageNotSupported`] for a known
    /// container without a matching engine.
    pub fn select(&self, id: &Id, language: Language) -> Result<Arc<dyn Engine>> {
        let container = self.containers.find(id)?;
        container
            .engines()
            .iter()
            .find(|engine| engine.language() == language)
            .cloned()
            .ok_or_else(|| BroodError::LanguageNotSupported {
                id: id.clone(),
                language,
            })
    }

    /// Looks up the container deployed as `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::NotFound`] if no container is known under `id`.
    pub fn find(&self, id: &Id) -> Result<Arc<dyn Container>> {
        self.containers.find(id)
    }

    /// Sorted names of all known containers.
    #[must_use]
    pub fn ids(&self) -> Vec<Id> {
        self.containers.ids()
    }
}

impl ContainerListener for EngineRegistry {
    fn on_deploy(&self, event: &ContainerEvent) {
        self.containers.on_deploy(event);
    }

    fn on_drop(&self, event: &ContainerEvent) {
        self.containers.on_drop(event);
    }
}
