/*!
 * Cancel Token
 * Cooperative cancellation handle for dispatcher threads
 */

use super::signal::WakeSignal;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable handle that requests dispatcher shutdown.
///
/// `cancel` sets an atomic flag and raises the paired [`WakeSignal`],
/// so a dispatcher parked in `wait` wakes and observes the request.
/// Cancellation is idempotent; repeated calls are harmless.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    signal: Arc<WakeSignal>,
}

impl CancelToken {
    pub fn new(signal: Arc<WakeSignal>) -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                signal,
            }),
        }
    }

    /// Request shutdown and wake the paired dispatcher.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            debug!("dispatch cancellation requested");
            self.inner.signal.raise();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}
