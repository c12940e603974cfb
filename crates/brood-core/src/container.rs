//! Collaborator contracts for deployable containers.
//!
//! A [`Container`] is created dormant by an [`Assembler`], activated by the
//! warden, and closed by whichever component last took ownership of it.
//! Containers are shared as `Arc<dyn Container>` so registries can reference
//! them; only the catalog and the warden ever close one.

use std::fmt;
use std::sync::Arc;

use brood_common::error::Result;
use brood_common::types::{Id, Language};

/// A query capability attached to a container.
pub trait Engine: Send + Sync + fmt::Debug {
    /// The language this engine executes.
    fn language(&self) -> Language;
}

/// A deployable virtual dataset.
pub trait Container: Send + Sync + fmt::Debug {
    /// Name the container is deployed under.
    fn name(&self) -> &Id;

    /// Engines this container exposes.
    fn engines(&self) -> &[Arc<dyn Engine>];

    /// Brings the container into service.
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition such as a reachable datasource is unmet.
    fn activate(&self) -> Result<()>;

    /// Releases all resources held by the container.
    ///
    /// Must be safe to call even if [`activate`](Self::activate) never completed.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource could not be released cleanly.
    fn close(&self) -> Result<()>;
}

/// Turns raw configuration bytes of one format into a dormant container.
pub trait Assembler: Send + Sync {
    /// Format tag of the configuration items this assembler reads.
    fn format(&self) -> &str;

    /// Assembles a container named `id` from `raw`.
    ///
    /// Must not mutate shared state when it fails.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::Assembly`](brood_common::error::BroodError::Assembly)
    /// if the configuration cannot be turned into a container.
    fn assemble(&self, id: &Id, raw: &[u8]) -> Result<Arc<dyn Container>>;
}

/// Closes `container`, logging instead of propagating a failure.
pub fn close_quietly(container: &dyn Container) {
    if let Err(e) = container.close() {
        tracing::warn!(id = %container.name(), error = %e, "error while closing container");
    }
}

/// Returns `true` if both handles point at the same container instance.
pub fn same_container(left: &Arc<dyn Container>, right: &Arc<dyn Container>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}
