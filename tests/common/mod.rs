/*!
 * Test Support
 * Shared receiver and polling helpers for dispatch tests
 */

use parking_lot::Mutex;
use pubsub_dispatch::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receiver that records every payload delivered to it.
pub struct RecordingReceiver {
    name: String,
    seen: Mutex<Vec<String>>,
}

impl RecordingReceiver {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Receiver for RecordingReceiver {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, payload: &str) {
        self.seen.lock().push(payload.to_owned());
    }
}

/// Poll `condition` until it holds or `timeout` passes; returns the
/// final evaluation.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
