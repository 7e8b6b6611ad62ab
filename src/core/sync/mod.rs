/*!
 * Sync Primitives
 * Wakeup signalling and cooperative cancellation for dispatcher threads
 */

pub mod cancel;
pub mod signal;

pub use cancel::CancelToken;
pub use signal::{WaitError, WaitResult, WakeSignal};
