//! Container lifecycle events and their synchronous delivery.
//!
//! The [`Catalog`](crate::catalog::Catalog) emits one event per mutation
//! through an [`Emitter`]. The [`EventBus`] fans each event out to every
//! subscribed [`ContainerListener`] on the emitting thread, in subscription
//! order, before `emit` returns. Delivery is never deferred, which keeps the
//! Dropped-before-Deployed order of a replacement intact for every listener.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::container::Container;

/// What happened to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The container became visible under its name.
    Deployed,
    /// The container was removed from service.
    Dropped,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployed => write!(f, "deployed"),
            Self::Dropped => write!(f, "dropped"),
        }
    }
}

/// Immutable notification about a catalog mutation.
#[derive(Debug, Clone)]
pub struct ContainerEvent {
    kind: EventKind,
    container: Arc<dyn Container>,
    timestamp: DateTime<Utc>,
}

impl ContainerEvent {
    /// `container` has been deployed.
    #[must_use]
    pub fn deployed(container: Arc<dyn Container>) -> Self {
        Self::new(EventKind::Deployed, container)
    }

    /// `container` has been dropped.
    #[must_use]
    pub fn dropped(container: Arc<dyn Container>) -> Self {
        Self::new(EventKind::Dropped, container)
    }

    fn new(kind: EventKind, container: Arc<dyn Container>) -> Self {
        Self {
            kind,
            container,
            timestamp: Utc::now(),
        }
    }

    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Event subject, `"deployed"` or `"dropped"`.
    #[must_use]
    pub const fn subject(&self) -> &'static str {
        match self.kind {
            EventKind::Deployed => "deployed",
            EventKind::Dropped => "dropped",
        }
    }

    /// The container this event refers to.
    #[must_use]
    pub const fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    /// When the event was created.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Sink for lifecycle events.
///
/// Implementations run on the mutating thread while the orchestrator lock
/// is held: they must be fast, must not block and must never call back into
/// the warden or the catalog.
pub trait Emitter: Send + Sync {
    /// Delivers `event`. Must not fail for a well-formed event.
    fn emit(&self, event: ContainerEvent);
}

/// Reacts to container lifecycle events.
pub trait ContainerListener: Send + Sync {
    /// Called for every [`EventKind::Deployed`] event.
    fn on_deploy(&self, event: &ContainerEvent);

    /// Called for every [`EventKind::Dropped`] event.
    fn on_drop(&self, event: &ContainerEvent);

    /// Dispatches `event` to the matching handler.
    fn on_event(&self, event: &ContainerEvent) {
        match event.kind() {
            EventKind::Deployed => self.on_deploy(event),
            EventKind::Dropped => self.on_drop(event),
        }
    }
}

/// Synchronous fan-out of events to registered listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Arc<dyn ContainerListener>>>,
}

impl EventBus {
    /// Creates a bus without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` to receive every subsequent event.
    pub fn subscribe(&self, listener: Arc<dyn ContainerListener>) {
        self.listeners.write().push(listener);
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Emitter for EventBus {
    fn emit(&self, event: ContainerEvent) {
        tracing::debug!(
            subject = event.subject(),
            id = %event.container().name(),
            "emitting container event"
        );
        for listener in self.listeners.read().iter() {
            listener.on_event(&event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
