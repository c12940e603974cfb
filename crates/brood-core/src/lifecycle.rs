//! Start/stop hooks invoked by the embedding application's bootstrap.

use brood_common::error::Result;

/// A component with an explicit running phase.
pub trait Lifecycle {
    /// Brings the component into service.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is already running or cannot start.
    fn start(&self) -> Result<()>;

    /// Takes the component out of service, then runs `callback`.
    ///
    /// `callback` is only invoked once the component has stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not running or cannot stop.
    fn stop(&self, callback: impl FnOnce()) -> Result<()>;

    /// Whether the component is in service.
    fn is_running(&self) -> bool;
}
