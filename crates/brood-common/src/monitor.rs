//! Two-state lifecycle guard with bounded lock wait.
//!
//! A [`StatefulMonitor`] owns the value it protects and only hands it to
//! actions while its reentrant lock is held. Every entry point first checks
//! the expected [`MonitorState`] without locking, so callers in the wrong
//! state fail fast instead of queueing behind a long-running operation.
//!
//! Failures of the guard itself are reported as [`MonitorError`]; the
//! action's own error type `E` must absorb them via `From<MonitorError>`,
//! and action errors are passed through to the caller untouched. A panic
//! inside an action unwinds through the monitor unchanged, releasing the
//! lock on the way out.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeout::Timeout;

/// Lifecycle state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorState {
    /// Rejects atomic operations; may be activated.
    Inactive,
    /// Accepts atomic operations; may be disabled.
    Active,
}

impl MonitorState {
    const fn from_flag(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Failures raised by the monitor itself, never by the guarded action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The operation requires a different lifecycle state.
    #[error("monitor is {actual}, expected {expected}")]
    IllegalState {
        /// State the operation requires.
        expected: MonitorState,
        /// State the monitor was in.
        actual: MonitorState,
    },

    /// The lock could not be acquired within the maximal waiting time.
    #[error("timed out after {waited:?} while acquiring monitor lock")]
    LockTimeout {
        /// How long the caller waited.
        waited: Duration,
    },
}

/// How an undefined [`Timeout`] translates into lock waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedWait {
    /// Try the lock once and fail with [`MonitorError::LockTimeout`] if contended.
    #[default]
    Immediate,
    /// Block until the lock is free.
    Indefinite,
}

/// Resolved lock acquisition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// Wait at most the given duration.
    Bounded(Duration),
    /// Wait as long as it takes.
    Indefinite,
}

impl LockWait {
    /// Resolves a configured timeout, applying `policy` when it is undefined.
    #[must_use]
    pub fn resolve(timeout: Timeout, policy: UndefinedWait) -> Self {
        if timeout.is_defined() {
            Self::Bounded(timeout.as_duration_or(Duration::ZERO))
        } else {
            match policy {
                UndefinedWait::Immediate => Self::Bounded(Duration::ZERO),
                UndefinedWait::Indefinite => Self::Indefinite,
            }
        }
    }
}

/// Mutual-exclusion guard over a binary ACTIVE/INACTIVE state.
///
/// The monitor starts [`MonitorState::Inactive`]. State only changes through
/// [`activate`](Self::activate) and [`disable`](Self::disable).
pub struct StatefulMonitor<T = ()> {
    wait: LockWait,
    active: AtomicBool,
    guarded: ReentrantMutex<T>,
}

impl<T> StatefulMonitor<T> {
    /// Creates an inactive monitor guarding `guarded`.
    pub fn new(guarded: T, wait: LockWait) -> Self {
        Self {
            wait,
            active: AtomicBool::new(false),
            guarded: ReentrantMutex::new(guarded),
        }
    }

    /// Creates an inactive monitor that waits up to `timeout` for its lock.
    pub fn with_maximal_waiting_time(guarded: T, timeout: Timeout, policy: UndefinedWait) -> Self {
        Self::new(guarded, LockWait::resolve(timeout, policy))
    }

    /// Non-blocking read of the current state.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Current state as an enum.
    pub fn state(&self) -> MonitorState {
        MonitorState::from_flag(self.is_active())
    }

    /// Fails with [`MonitorError::IllegalState`] unless active. Never locks.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is inactive.
    pub fn ensure_active(&self) -> Result<(), MonitorError> {
        self.ensure_state(MonitorState::Active)
    }

    /// Runs `action` and transitions to ACTIVE if it succeeds.
    ///
    /// If the action fails the monitor stays INACTIVE and the error is
    /// returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is already active, the lock cannot be
    /// acquired in time, or the action fails.
    pub fn activate<E>(&self, action: impl FnOnce(&T) -> Result<(), E>) -> Result<(), E>
    where
        E: From<MonitorError>,
    {
        self.run_locked_expecting_state(MonitorState::Inactive, |guarded| {
            action(guarded)?;
            self.active.store(true, Ordering::Release);
            Ok(())
        })
    }

    /// Transitions to INACTIVE and runs `action`.
    ///
    /// The transition happens whether or not the action succeeds; an action
    /// failure is still reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is inactive, the lock cannot be
    /// acquired in time, or the action fails.
    pub fn disable<E>(&self, action: impl FnOnce(&T) -> Result<(), E>) -> Result<(), E>
    where
        E: From<MonitorError>,
    {
        self.run_locked_expecting_state(MonitorState::Active, |guarded| {
            self.active.store(false, Ordering::Release);
            action(guarded)
        })
    }

    /// Runs `action` under the lock if active, returning its result.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is inactive, the lock cannot be
    /// acquired in time, or the action fails.
    pub fn atomic<R, E>(&self, action: impl FnOnce(&T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<MonitorError>,
    {
        self.run_locked_expecting_state(MonitorState::Active, action)
    }

    /// Shared primitive behind [`activate`](Self::activate),
    /// [`disable`](Self::disable) and [`atomic`](Self::atomic).
    ///
    /// Checks the state without locking, acquires the lock within the
    /// configured wait, re-checks the state, then runs `action`. The lock is
    /// released on every exit path, including unwinding.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is not `expected`, the lock cannot be
    /// acquired in time, or the action fails.
    pub fn run_locked_expecting_state<R, E>(
        &self,
        expected: MonitorState,
        action: impl FnOnce(&T) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<MonitorError>,
    {
        self.ensure_state(expected)?;
        let guard = self.acquire()?;
        // lost a race against another transition while waiting
        self.ensure_state(expected)?;
        action(&guard)
    }

    fn ensure_state(&self, expected: MonitorState) -> Result<(), MonitorError> {
        let actual = self.state();
        if actual == expected {
            Ok(())
        } else {
            Err(MonitorError::IllegalState { expected, actual })
        }
    }

    fn acquire(&self) -> Result<ReentrantMutexGuard<'_, T>, MonitorError> {
        match self.wait {
            LockWait::Indefinite => Ok(self.guarded.lock()),
            LockWait::Bounded(limit) => self
                .guarded
                .try_lock_for(limit)
                .ok_or(MonitorError::LockTimeout { waited: limit }),
        }
    }
}

impl<T> fmt::Debug for StatefulMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulMonitor")
            .field("state", &self.state())
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[derive(Debug, Error)]
    enum ProbeError {
        #[error(transparent)]
        Monitor(#[from] MonitorError),
        #[error("action failed")]
        Failed,
    }

    fn noop(_: &()) -> Result<(), ProbeError> {
        Ok(())
    }

    fn failing(_: &()) -> Result<(), ProbeError> {
        Err(ProbeError::Failed)
    }

    fn inactive() -> StatefulMonitor {
        StatefulMonitor::with_maximal_waiting_time((), Timeout::undefined(), UndefinedWait::Immediate)
    }

    fn active() -> StatefulMonitor {
        let monitor = inactive();
        monitor.activate(noop).expect("activate");
        monitor
    }

    fn is_illegal_state(result: &Result<(), ProbeError>) -> bool {
        matches!(result, Err(ProbeError::Monitor(MonitorError::IllegalState { .. })))
    }

    // ── inactive ─────────────────────────────────────────────────────

    #[test]
    fn starts_inactive() {
        let monitor = inactive();
        assert!(!monitor.is_active());
        assert_eq!(monitor.state(), MonitorState::Inactive);
    }

    #[test]
    fn ensure_active_fails_when_inactive() {
        let err = inactive().ensure_active().unwrap_err();
        assert_eq!(
            err,
            MonitorError::IllegalState {
                expected: MonitorState::Active,
                actual: MonitorState::Inactive,
            }
        );
    }

    #[test]
    fn activate_runs_action_and_becomes_active() {
        let monitor = inactive();
        let called = Cell::new(false);
        monitor
            .activate(|()| -> Result<(), ProbeError> {
                called.set(true);
                Ok(())
            })
            .expect("activate");
        assert!(called.get());
        assert!(monitor.is_active());
    }

    #[test]
    fn failed_activation_stays_inactive_and_can_be_retried() {
        let monitor = inactive();
        let result = monitor.activate(failing);
        assert!(matches!(result, Err(ProbeError::Failed)));
        assert!(!monitor.is_active());

        monitor.activate(noop).expect("second activation");
        assert!(monitor.is_active());
    }

    #[test]
    #[allow(clippy::panic)]
    fn panicking_activation_stays_inactive_and_unlocks() {
        let monitor = inactive();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            monitor.activate(|()| -> Result<(), ProbeError> { panic!("boom") })
        }));
        assert!(outcome.is_err());
        assert!(!monitor.is_active());
        assert!(!monitor.guarded.is_locked());
    }

    #[test]
    fn disable_is_rejected_when_inactive() {
        let monitor = inactive();
        let called = Cell::new(false);
        let result = monitor.disable(|()| -> Result<(), ProbeError> {
            called.set(true);
            Ok(())
        });
        assert!(is_illegal_state(&result));
        assert!(!called.get());
        assert!(!monitor.is_active());
    }

    #[test]
    fn atomic_is_rejected_when_inactive_without_running_action() {
        let monitor = inactive();
        let called = Cell::new(false);
        let result = monitor.atomic(|()| -> Result<(), ProbeError> {
            called.set(true);
            Ok(())
        });
        assert!(is_illegal_state(&result));
        assert!(!called.get());
    }

    // ── active ───────────────────────────────────────────────────────

    #[test]
    fn ensure_active_passes_when_active() {
        assert!(active().ensure_active().is_ok());
    }

    #[test]
    fn activate_is_rejected_when_active() {
        let monitor = active();
        assert!(is_illegal_state(&monitor.activate(noop)));
        assert!(monitor.is_active());
    }

    #[test]
    fn disable_runs_action_and_becomes_inactive() {
        let monitor = active();
        let called = Cell::new(false);
        monitor
            .disable(|()| -> Result<(), ProbeError> {
                called.set(true);
                Ok(())
            })
            .expect("disable");
        assert!(called.get());
        assert!(!monitor.is_active());
    }

    #[test]
    fn failed_disable_still_becomes_inactive_and_reports_failure() {
        let monitor = active();
        let result = monitor.disable(failing);
        assert!(matches!(result, Err(ProbeError::Failed)));
        assert!(!monitor.is_active());

        monitor.activate(noop).expect("reactivation after failed disable");
        assert!(monitor.is_active());
    }

    #[test]
    fn atomic_yields_action_result() {
        let monitor = active();
        let value = monitor
            .atomic(|()| -> Result<i32, ProbeError> { Ok(23) })
            .expect("atomic");
        assert_eq!(value, 23);
        assert!(monitor.is_active());
    }

    #[test]
    fn atomic_passes_action_error_through() {
        let monitor = active();
        let result: Result<i32, ProbeError> = monitor.atomic(|()| Err(ProbeError::Failed));
        assert!(matches!(result, Err(ProbeError::Failed)));
        assert!(monitor.is_active());
    }

    #[test]
    fn atomic_hands_out_guarded_value() {
        let monitor = StatefulMonitor::new(Cell::new(1), LockWait::Indefinite);
        monitor
            .activate(|cell| -> Result<(), MonitorError> {
                cell.set(2);
                Ok(())
            })
            .expect("activate");
        let seen = monitor
            .atomic(|cell| -> Result<i32, MonitorError> { Ok(cell.get()) })
            .expect("atomic");
        assert_eq!(seen, 2);
    }

    // ── locking ──────────────────────────────────────────────────────

    #[test]
    fn lock_is_held_during_action_and_released_after() {
        let monitor = inactive();
        assert!(!monitor.guarded.is_locked());
        monitor
            .run_locked_expecting_state(MonitorState::Inactive, |()| -> Result<(), ProbeError> {
                assert!(monitor.guarded.is_owned_by_current_thread());
                Ok(())
            })
            .expect("run");
        assert!(!monitor.guarded.is_locked());
        assert!(!monitor.is_active());
    }

    #[test]
    fn lock_is_released_when_action_fails() {
        let monitor = inactive();
        let result = monitor.run_locked_expecting_state(MonitorState::Inactive, failing);
        assert!(result.is_err());
        assert!(!monitor.guarded.is_locked());
    }

    #[test]
    fn wrong_state_fails_before_locking() {
        let monitor = inactive();
        let result = monitor.run_locked_expecting_state(MonitorState::Active, noop);
        assert!(is_illegal_state(&result));
        assert!(!monitor.guarded.is_locked());
    }

    #[test]
    fn nested_calls_on_the_same_thread_reenter_the_lock() {
        let monitor = active();
        let value = monitor
            .atomic(|()| monitor.atomic(|()| -> Result<i32, ProbeError> { Ok(7) }))
            .expect("nested atomic");
        assert_eq!(value, 7);
    }

    #[test]
    fn contended_lock_times_out() {
        let monitor = StatefulMonitor::new((), LockWait::Bounded(Duration::from_millis(20)));
        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        thread::scope(|s| {
            let holder = &monitor;
            let _ = s.spawn(move || {
                let _guard = holder.guarded.lock();
                locked_tx.send(()).expect("signal locked");
                let _ = release_rx.recv();
            });

            locked_rx.recv().expect("wait for holder");
            let result = monitor.run_locked_expecting_state(MonitorState::Inactive, noop);
            assert!(matches!(
                result,
                Err(ProbeError::Monitor(MonitorError::LockTimeout { .. }))
            ));
            release_tx.send(()).expect("release holder");
        });
    }

    #[test]
    fn undefined_timeout_resolves_by_policy() {
        assert_eq!(
            LockWait::resolve(Timeout::undefined(), UndefinedWait::Immediate),
            LockWait::Bounded(Duration::ZERO)
        );
        assert_eq!(
            LockWait::resolve(Timeout::undefined(), UndefinedWait::Indefinite),
            LockWait::Indefinite
        );
        assert_eq!(
            LockWait::resolve(Timeout::from_millis(5), UndefinedWait::Indefinite),
            LockWait::Bounded(Duration::from_millis(5))
        );
    }
}
