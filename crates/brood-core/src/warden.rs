//! The orchestrator owning the catalog.
//!
//! Every catalog mutation runs inside the warden's [`StatefulMonitor`], so
//! `start`, `stop`, deployments and disposals never interleave. Assembly of a
//! new container happens before the lock is taken; persisting, activating
//! and publishing it happen under the lock.
//!
//! A container is closed exactly once by whoever last received it: the
//! warden closes containers it drops, replaces, fails to activate or fails to
//! publish, and `stop` closes everything the catalog still held.

use std::fmt;
use std::sync::Arc;

use brood_common::config::BroodConfig;
use brood_common::error::{BroodError, Result};
use brood_common::monitor::{LockWait, StatefulMonitor};
use brood_common::types::Id;

use crate::catalog::Catalog;
use crate::container::{Assembler, close_quietly};
use crate::event::Emitter;
use crate::lifecycle::Lifecycle;
use crate::store::ConfigStore;

/// Guards the catalog and bridges it to assemblers and the config store.
pub struct Warden {
    monitor: StatefulMonitor<Catalog>,
    store: Arc<dyn ConfigStore>,
    assemblers: Vec<Arc<dyn Assembler>>,
}

impl Warden {
    /// Creates a stopped warden.
    ///
    /// The first assembler is the primary one used by
    /// [`assemble_and_deploy`](Self::assemble_and_deploy); `start` recovers
    /// the formats of all assemblers in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::Config`] if `assemblers` is empty.
    pub fn new(
        events: Arc<dyn Emitter>,
        store: Arc<dyn ConfigStore>,
        assemblers: Vec<Arc<dyn Assembler>>,
        wait: LockWait,
    ) -> Result<Self> {
        if assemblers.is_empty() {
            return Err(BroodError::Config {
                message: "a warden needs at least one assembler".into(),
            });
        }
        Ok(Self {
            monitor: StatefulMonitor::new(Catalog::new(events), wait),
            store,
            assemblers,
        })
    }

    /// Creates a stopped warden whose lock wait and recovered formats follow
    /// `config`.
    ///
    /// Only assemblers whose format is listed in `config.formats` are kept,
    /// in the listed order; the first listed format becomes the primary one.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::UnsupportedFormat`] if a listed format has no
    /// assembler, or [`BroodError::Config`] if no format is listed.
    pub fn from_config(
        config: &BroodConfig,
        events: Arc<dyn Emitter>,
        store: Arc<dyn ConfigStore>,
        assemblers: Vec<Arc<dyn Assembler>>,
    ) -> Result<Self> {
        let selected = config
            .formats
            .iter()
            .map(|format| {
                assemblers
                    .iter()
                    .find(|a| a.format() == format)
                    .cloned()
                    .ok_or_else(|| BroodError::UnsupportedFormat {
                        format: format.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let wait = LockWait::resolve(config.timeout, config.undefined_wait);
        Self::new(events, store, selected, wait)
    }

    /// Format tags handled by this warden, primary first.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.assemblers.iter().map(|a| a.format())
    }

    /// Assembles `raw` with the primary assembler and deploys it as `id`.
    ///
    /// Any container already deployed as `id` is dropped and closed, and
    /// its persisted configuration cleared, before `raw` is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the warden is not running, assembly, persisting
    /// or activation fails, or the lock cannot be acquired in time.
    pub fn assemble_and_deploy(&self, id: &Id, raw: &[u8]) -> Result<()> {
        self.monitor.ensure_active()?;
        let primary = self.assemblers.first().ok_or_else(|| BroodError::Config {
            message: "a warden needs at least one assembler".into(),
        })?;
        self.deploy(primary.as_ref(), id, raw)
    }

    /// Like [`assemble_and_deploy`](Self::assemble_and_deploy) with the
    /// assembler registered for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`BroodError::UnsupportedFormat`] if no assembler handles
    /// `format`, plus every error of `assemble_and_deploy`.
    pub fn deploy_with_format(&self, format: &str, id: &Id, raw: &[u8]) -> Result<()> {
        self.monitor.ensure_active()?;
        let assembler = self
            .assemblers
            .iter()
            .find(|a| a.format() == format)
            .ok_or_else(|| BroodError::UnsupportedFormat {
                format: format.to_owned(),
            })?;
        self.deploy(assembler.as_ref(), id, raw)
    }

    /// Drops and closes the container deployed as `id` and clears its
    /// persisted configuration.
    ///
    /// Returns whether a container was deployed.
    ///
    /// # Errors
    ///
    /// Returns an error if the warden is not running, the lock cannot be
    /// acquired in time, or the configuration cannot be cleared.
    pub fn dispose(&self, id: &Id) -> Result<bool> {
        self.monitor.atomic(|catalog| self.dispose_locked(catalog, id))
    }

    /// Sorted names of the containers currently in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the warden is not running or the lock cannot be
    /// acquired in time.
    pub fn deployed(&self) -> Result<Vec<Id>> {
        self.monitor.atomic(|catalog| Ok::<_, BroodError>(catalog.ids()))
    }

    fn deploy(&self, assembler: &dyn Assembler, id: &Id, raw: &[u8]) -> Result<()> {
        let container = assembler.assemble(id, raw)?;
        let published = self.monitor.atomic(|catalog| {
            let _ = self.dispose_locked(catalog, id)?;
            let location = self.store.save(id.as_str(), assembler.format(), raw)?;
            container.activate()?;
            if let Some(replaced) = catalog.deploy(Arc::clone(&container)) {
                close_quietly(replaced.as_ref());
            }
            tracing::info!(id = %id, format = assembler.format(), location, "deployed container");
            Ok::<_, BroodError>(())
        });
        if published.is_err() {
            close_quietly(container.as_ref());
        }
        published
    }

    fn dispose_locked(&self, catalog: &Catalog, id: &Id) -> Result<bool> {
        let removed = catalog.drop(id);
        if let Some(container) = &removed {
            close_quietly(container.as_ref());
        }
        self.store.clear(id.as_str())?;
        Ok(removed.is_some())
    }

    fn recover_all(&self, catalog: &Catalog) -> Result<()> {
        for assembler in &self.assemblers {
            let format = assembler.format();
            let items = self.store.find_all_with_identifier(format)?;
            tracing::info!(format, count = items.len(), "recovering containers");
            for (name, raw) in items {
                let id = Id::new(name);
                match Self::recover(catalog, assembler.as_ref(), &id, &raw) {
                    Ok(()) => tracing::info!(id = %id, format, "deployed container on startup"),
                    Err(e) => tracing::error!(id = %id, format, error = %e, "skipping container"),
                }
            }
        }
        Ok(())
    }

    fn recover(catalog: &Catalog, assembler: &dyn Assembler, id: &Id, raw: &[u8]) -> Result<()> {
        let container = assembler.assemble(id, raw)?;
        if let Err(e) = container.activate() {
            close_quietly(container.as_ref());
            return Err(e);
        }
        if let Some(replaced) = catalog.deploy(container) {
            close_quietly(replaced.as_ref());
        }
        Ok(())
    }
}

impl Lifecycle for Warden {
    /// Recovers every persisted item of every handled format.
    ///
    /// An item that cannot be assembled or activated is logged and skipped.
    /// A failure to read the store aborts the start and closes every
    /// container recovered so far.
    fn start(&self) -> Result<()> {
        self.monitor.activate(|catalog| {
            if let Err(e) = self.recover_all(catalog) {
                // an inactive warden rejects stop
                let drained = catalog.clear();
                for container in &drained {
                    close_quietly(container.as_ref());
                }
                tracing::error!(error = %e, closed = drained.len(), "aborted start");
                return Err(e);
            }
            tracing::info!(deployed = catalog.len(), "warden started");
            Ok(())
        })
    }

    /// Drains the catalog, closing every container, then runs `callback`.
    fn stop(&self, callback: impl FnOnce()) -> Result<()> {
        self.monitor.disable(|catalog| {
            let drained = catalog.clear();
            for container in &drained {
                close_quietly(container.as_ref());
            }
            tracing::info!(closed = drained.len(), "warden stopped");
            Ok::<_, BroodError>(())
        })?;
        callback();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.monitor.is_active()
    }
}

impl fmt::Debug for Warden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warden")
            .field("monitor", &self.monitor)
            .field("formats", &self.formats().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
