//! Authoritative record of deployed containers.
//!
//! The catalog performs no locking of its own. It is `Send` but not `Sync`,
//! so the only way to share it between threads is behind the warden's
//! [`StatefulMonitor`](brood_common::monitor::StatefulMonitor), which makes
//! every mutation happen while the orchestrator lock is held.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use brood_common::types::Id;

use crate::container::Container;
use crate::event::{ContainerEvent, Emitter};

/// Map of active containers that emits an event for every mutation.
pub struct Catalog {
    entries: RefCell<HashMap<Id, Arc<dyn Container>>>,
    events: Arc<dyn Emitter>,
}

impl Catalog {
    /// Creates an empty catalog publishing to `events`.
    pub fn new(events: Arc<dyn Emitter>) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            events,
        }
    }

    /// Adds `container` under its name, replacing any former entry.
    ///
    /// Emits `Dropped(former)` before `Deployed(container)` when replacing.
    /// Ownership of the returned former container passes to the caller.
    pub fn deploy(&self, container: Arc<dyn Container>) -> Option<Arc<dyn Container>> {
        tracing::debug!(id = %container.name(), "deploying container");
        let former = self
            .entries
            .borrow_mut()
            .insert(container.name().clone(), Arc::clone(&container));
        if let Some(former) = &former {
            self.events.emit(ContainerEvent::dropped(Arc::clone(former)));
        }
        self.events.emit(ContainerEvent::deployed(container));
        former
    }

    /// Removes the container named `id`, if present.
    ///
    /// Emits exactly one `Dropped` event when something was removed and
    /// nothing otherwise.
    pub fn drop(&self, id: &Id) -> Option<Arc<dyn Container>> {
        tracing::debug!(id = %id, "dropping container");
        let removed = self.entries.borrow_mut().remove(id);
        if let Some(removed) = &removed {
            self.events.emit(ContainerEvent::dropped(Arc::clone(removed)));
        }
        removed
    }

    /// Drops every container, returning all that were present.
    pub fn clear(&self) -> Vec<Arc<dyn Container>> {
        let drained: Vec<_> = self.entries.borrow_mut().drain().map(|(_, c)| c).collect();
        tracing::info!(count = drained.len(), "cleared catalog");
        for container in &drained {
            self.events.emit(ContainerEvent::dropped(Arc::clone(container)));
        }
        drained
    }

    /// The container currently deployed as `id`.
    pub fn get(&self, id: &Id) -> Option<Arc<dyn Container>> {
        self.entries.borrow().get(id).cloned()
    }

    /// Whether a container is deployed as `id`.
    pub fn contains(&self, id: &Id) -> bool {
        self.entries.borrow().contains_key(id)
    }

    /// Sorted names of all deployed containers.
    pub fn ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.entries.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of deployed containers.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no container is deployed.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("ids", &self.ids()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::same_container;
    use crate::event::EventKind;
    use crate::mock::{MockContainer, RecordingEmitter};

    fn catalog() -> (Catalog, Arc<RecordingEmitter>) {
        let events = Arc::new(RecordingEmitter::default());
        (Catalog::new(events.clone()), events)
    }

    fn container(name: &str) -> Arc<dyn Container> {
        MockContainer::new(name).shared()
    }

    #[test]
    fn deploy_into_empty_slot_emits_only_deployed() {
        let (catalog, events) = catalog();
        let first = container("first");

        let former = catalog.deploy(first.clone());

        assert!(former.is_none());
        let seen = events.events();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), EventKind::Deployed);
        assert!(same_container(seen[0].container(), &first));
    }

    #[test]
    fn deploy_then_drop_emits_deployed_then_dropped() {
        let (catalog, events) = catalog();
        let c = container("test");

        let _ = catalog.deploy(c.clone());
        let removed = catalog.drop(&Id::new("test")).expect("present");

        assert!(same_container(&removed, &c));
        let seen = events.events();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].kind(), EventKind::Deployed);
        assert_eq!(seen[1].kind(), EventKind::Dropped);
        assert!(same_container(seen[1].container(), &c));
    }

    #[test]
    fn replacement_emits_dropped_old_before_deployed_new() {
        let (catalog, events) = catalog();
        let first = container("test");
        let second = container("test");

        let _ = catalog.deploy(first.clone());
        let former = catalog.deploy(second.clone()).expect("former returned");

        assert!(same_container(&former, &first));
        let seen = events.events();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].kind(), EventKind::Deployed);
        assert!(same_container(seen[0].container(), &first));
        assert_eq!(seen[1].kind(), EventKind::Dropped);
        assert!(same_container(seen[1].container(), &first));
        assert_eq!(seen[2].kind(), EventKind::Deployed);
        assert!(same_container(seen[2].container(), &second));
        assert!(same_container(&catalog.get(&Id::new("test")).expect("deployed"), &second));
    }

    #[test]
    fn drop_of_absent_id_emits_nothing() {
        let (catalog, events) = catalog();
        assert!(catalog.drop(&Id::new("missing")).is_none());
        assert!(events.events().is_empty());
    }

    #[test]
    fn clear_drops_everything_present() {
        let (catalog, events) = catalog();
        let c1 = container("first");
        let c2 = container("second");
        let _ = catalog.deploy(c1.clone());
        let _ = catalog.deploy(c2.clone());
        assert_eq!(catalog.ids(), vec![Id::new("first"), Id::new("second")]);
        assert!(same_container(&catalog.get(&Id::new("first")).expect("c1"), &c1));
        assert!(same_container(&catalog.get(&Id::new("second")).expect("c2"), &c2));
        events.reset();

        let cleared = catalog.clear();

        assert_eq!(cleared.len(), 2);
        assert!(cleared.iter().any(|c| same_container(c, &c1)));
        assert!(cleared.iter().any(|c| same_container(c, &c2)));
        let seen = events.events();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|e| e.kind() == EventKind::Dropped));
        assert!(catalog.is_empty());
    }

    #[test]
    fn clear_on_empty_catalog_emits_nothing() {
        let (catalog, events) = catalog();
        let _ = catalog.deploy(container("only"));
        let _ = catalog.clear();
        events.reset();

        let cleared = catalog.clear();

        assert!(cleared.is_empty());
        assert!(events.events().is_empty());
    }

    #[test]
    fn read_helpers_reflect_contents() {
        let (catalog, _events) = catalog();
        assert!(catalog.is_empty());
        let _ = catalog.deploy(container("b"));
        let _ = catalog.deploy(container("a"));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&Id::new("a")));
        assert!(!catalog.contains(&Id::new("c")));
        assert_eq!(catalog.ids(), vec![Id::new("a"), Id::new("b")]);
    }
}
