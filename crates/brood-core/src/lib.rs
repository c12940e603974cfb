//! Container lifecycle orchestration for the brood dataset gateway.
//!
//! The [`Warden`] is the only component that mutates the [`Catalog`]. Each
//! mutation emits a [`ContainerEvent`] that an [`EventBus`] delivers to the
//! lookup registries used by request routing.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod catalog;
pub mod container;
pub mod event;
pub mod lifecycle;
pub mod mock;
pub mod registry;
pub mod store;
pub mod warden;

pub use catalog::Catalog;
pub use container::{Assembler, Container, Engine};
pub use event::{ContainerEvent, ContainerListener, Emitter, EventBus, EventKind};
pub use lifecycle::Lifecycle;
pub use registry::{ContainerRegistry, EngineRegistry};
pub use store::{ConfigStore, FileSystemConfigStore, InMemoryConfigStore};
pub use warden::Warden;
