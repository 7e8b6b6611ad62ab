/*!
 * Wake Signal
 * Level-triggered wakeup flag with a blocking wait, built on parking_lot
 */

use super::cancel::CancelToken;
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Result type for wait operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Wait operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("Wait was cancelled")]
    Cancelled,
}

/// Level-triggered condition flag used to park a dispatcher thread
/// between drain passes.
///
/// `raise` sets the flag and wakes waiters; `lower` clears it without
/// affecting threads that already woke. A flag that is raised before
/// `wait` is called makes the wait return immediately, so a wakeup that
/// lands while the dispatcher is still draining is never lost.
pub struct WakeSignal {
    pending: Mutex<bool>,
    condvar: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Set the flag and wake every waiter.
    pub fn raise(&self) {
        let mut pending = self.pending.lock();
        *pending = true;
        self.condvar.notify_all();
    }

    /// Clear the flag. Waiters that already woke are unaffected.
    pub fn lower(&self) {
        *self.pending.lock() = false;
    }

    /// Non-blocking read of the current flag value.
    pub fn check(&self) -> bool {
        *self.pending.lock()
    }

    /// Block the calling thread until the flag is observed set.
    ///
    /// Returns `Ok(())` once a `raise` is observed, or
    /// `Err(WaitError::Cancelled)` if `cancel` was triggered while
    /// waiting. Cancellation raises the paired signal, so a parked
    /// thread observes it without a timeout.
    pub fn wait(&self, cancel: &CancelToken) -> WaitResult<()> {
        let mut pending = self.pending.lock();
        loop {
            if cancel.is_cancelled() {
                return Err(WaitError::Cancelled);
            }
            if *pending {
                return Ok(());
            }
            self.condvar.wait(&mut pending);
        }
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}
