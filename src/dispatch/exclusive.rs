/*!
 * Exclusive Schema
 * Work-queue delivery: each payload is consumed by exactly one receiver,
 * load-balanced round-robin across receivers sharing a channel name
 */

use super::runner::DispatchLoop;
use super::traits::{Receiver, Schema};
use super::types::{DeliveryMode, DispatchStats, Message};
use crate::core::sync::{CancelToken, WakeSignal};
use crate::core::types::{ChannelName, Payload};
use ahash::RandomState;
use arc_swap::ArcSwap;
use crossbeam_queue::SegQueue;
use dashmap::DashMap;
use log::{debug, info, trace, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Work-queue dispatch schema.
///
/// Receivers form one flat rotation list in registration order; a
/// receiver's name is the channel it consumes from. Each drain pass
/// walks the rotation, popping one payload per visit from the buffer
/// keyed by the visited receiver's name, and ends at the first empty
/// pop. Duplicate registrations are allowed and rotate independently.
///
/// All state is shared behind `Arc`, so clones are cheap handles onto
/// the same instance. Exactly one thread per instance is expected to
/// drive `run`; any thread may publish or register.
pub struct ExclusiveSchema {
    rotation: Arc<ArcSwap<Vec<Arc<dyn Receiver>>>>,
    buffers: Arc<DashMap<ChannelName, SegQueue<Payload>, RandomState>>,
    signal: Arc<WakeSignal>,
    cancel: CancelToken,
    published: Arc<AtomicU64>,
    delivered: Arc<AtomicU64>,
}

impl ExclusiveSchema {
    pub fn new() -> Self {
        let signal = Arc::new(WakeSignal::new());
        let cancel = CancelToken::new(signal.clone());
        info!("exclusive schema initialized");
        Self {
            rotation: Arc::new(ArcSwap::from_pointee(Vec::new())),
            buffers: Arc::new(DashMap::with_hasher(RandomState::new())),
            signal,
            cancel,
            published: Arc::new(AtomicU64::new(0)),
            delivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle for requesting shutdown of the dispatch loop from any thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            mode: DeliveryMode::Exclusive,
            channels: self.buffers.len(),
            buffered: self.buffers.iter().map(|entry| entry.value().len()).sum(),
            receivers: self.rotation.load().len(),
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }

    /// One rotation sweep. Stops at the first receiver whose buffer
    /// yields nothing; a receiver name with no buffer yet pops as empty
    /// rather than faulting.
    fn drain_pass(&self) {
        let rotation = self.rotation.load();
        if rotation.is_empty() {
            return;
        }
        let mut slot = 0;
        loop {
            let receiver = &rotation[slot];
            let payload = match self.buffers.get(receiver.name()).and_then(|queue| queue.pop()) {
                Some(payload) => payload,
                None => break,
            };
            self.deliver(receiver.as_ref(), &payload);
            slot = (slot + 1) % rotation.len();
        }
    }

    /// Hand one payload to one receiver, isolating a panicking callback
    /// so it cannot poison the rest of the pass.
    fn deliver(&self, receiver: &dyn Receiver, payload: &str) {
        let outcome = catch_unwind(AssertUnwindSafe(|| receiver.receive(payload)));
        match outcome {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                trace!("delivered payload on '{}'", receiver.name());
            }
            Err(_) => {
                warn!(
                    "receiver '{}' panicked during delivery, payload dropped",
                    receiver.name()
                );
            }
        }
    }
}

impl Schema for ExclusiveSchema {
    fn add_receiver(&self, receiver: Arc<dyn Receiver>) {
        debug!("receiver '{}' joined rotation", receiver.name());
        self.rotation.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(receiver.clone());
            next
        });
        self.signal.raise();
    }

    fn publish(&self, message: Message) {
        trace!("publish on '{}'", message.channel);
        self.buffers
            .entry(message.channel)
            .or_insert_with(SegQueue::new)
            .push(message.payload);
        self.published.fetch_add(1, Ordering::Relaxed);
        self.signal.raise();
    }

    fn run(&self) {
        DispatchLoop::new(self.signal.clone(), self.cancel.clone()).run(|| self.drain_pass());
    }
}

impl Default for ExclusiveSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ExclusiveSchema {
    fn clone(&self) -> Self {
        Self {
            rotation: Arc::clone(&self.rotation),
            buffers: Arc::clone(&self.buffers),
            signal: Arc::clone(&self.signal),
            cancel: self.cancel.clone(),
            published: Arc::clone(&self.published),
            delivered: Arc::clone(&self.delivered),
        }
    }
}
