/*!
 * Dispatch Loop
 * Shared drain/recheck/park state machine driven by both schemas
 */

use crate::core::sync::{CancelToken, WakeSignal};
use log::debug;
use std::sync::Arc;

/// Dispatcher states. Initial state is `Idle`; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Draining,
    Stopped,
}

/// The control-flow shape both schemas share: drain until empty, then
/// park on the wake signal; recheck after every pass so a publish that
/// races the transition to idle is picked up without blocking.
///
/// The signal is lowered *before* each pass, so `check()` after the
/// pass reads as "work arrived while draining". A raise at any point
/// of the pass therefore survives to the recheck and triggers another
/// pass instead of being wiped together with the work the pass already
/// consumed.
///
/// Cancellation is observed between passes and inside the wait, never
/// between a pop and its delivery, so an in-flight pass always
/// completes.
pub(crate) struct DispatchLoop {
    signal: Arc<WakeSignal>,
    cancel: CancelToken,
}

impl DispatchLoop {
    pub(crate) fn new(signal: Arc<WakeSignal>, cancel: CancelToken) -> Self {
        Self { signal, cancel }
    }

    /// Run the state machine on the calling thread until cancelled,
    /// invoking `drain_pass` once per `Draining` entry.
    pub(crate) fn run<F: FnMut()>(&self, mut drain_pass: F) {
        let mut state = LoopState::Idle;
        loop {
            state = match state {
                LoopState::Idle => match self.signal.wait(&self.cancel) {
                    Ok(()) => LoopState::Draining,
                    Err(_) => LoopState::Stopped,
                },
                LoopState::Draining => {
                    if self.cancel.is_cancelled() {
                        LoopState::Stopped
                    } else {
                        self.signal.lower();
                        drain_pass();
                        if self.signal.check() {
                            LoopState::Draining
                        } else {
                            LoopState::Idle
                        }
                    }
                }
                LoopState::Stopped => {
                    debug!("dispatch loop stopped");
                    return;
                }
            };
        }
    }
}
