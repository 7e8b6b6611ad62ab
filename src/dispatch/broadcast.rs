/*!
 * Broadcast Schema
 * Topic delivery: each payload fans out to every receiver subscribed to
 * its channel at the moment the channel is drained
 */

use super::runner::DispatchLoop;
use super::traits::{Receiver, Schema};
use super::types::{DeliveryMode, DispatchStats, Message};
use crate::core::sync::{CancelToken, WakeSignal};
use crate::core::types::{ChannelName, Payload};
use ahash::RandomState;
use crossbeam_queue::SegQueue;
use dashmap::DashMap;
use log::{debug, info, trace, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Topic fan-out dispatch schema.
///
/// Receivers are grouped under their name as topic key. A drain pass
/// visits every buffered topic; a topic with subscribers is popped
/// until empty, each payload going to every subscriber in registration
/// order, while a topic without subscribers is left untouched and its
/// backlog accumulates. The subscriber list is snapshotted once per
/// topic per pass, so a receiver registered after a payload was popped
/// never sees that payload.
pub struct BroadcastSchema {
    subscribers: Arc<DashMap<ChannelName, Arc<Vec<Arc<dyn Receiver>>>, RandomState>>,
    buffers: Arc<DashMap<ChannelName, SegQueue<Payload>, RandomState>>,
    signal: Arc<WakeSignal>,
    cancel: CancelToken,
    published: Arc<AtomicU64>,
    delivered: Arc<AtomicU64>,
}

impl BroadcastSchema {
    pub fn new() -> Self {
        let signal = Arc::new(WakeSignal::new());
        let cancel = CancelToken::new(signal.clone());
        info!("broadcast schema initialized");
        Self {
            subscribers: Arc::new(DashMap::with_hasher(RandomState::new())),
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

    /// Statistics snapshot. `delivered` counts per-receiver hand-offs,
    /// so one payload fanned out to three subscribers counts three.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            mode: DeliveryMode::Broadcast,
            channels: self.buffers.len(),
            buffered: self.buffers.iter().map(|entry| entry.value().len()).sum(),
            receivers: self.subscribers.iter().map(|entry| entry.value().len()).sum(),
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }

    /// One sweep over every buffered topic.
    fn drain_pass(&self) {
        let topics: Vec<ChannelName> = self
            .buffers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for topic in topics {
            let fanout = match self.subscribers.get(&topic) {
                Some(entry) => Arc::clone(entry.value()),
                None => continue, // nobody subscribed, backlog stays
            };
            loop {
                let payload = match self.buffers.get(&topic).and_then(|queue| queue.pop()) {
                    Some(payload) => payload,
                    None => break,
                };
                for receiver in fanout.iter() {
                    self.deliver(receiver.as_ref(), &payload);
                }
            }
        }
    }

    /// Hand one payload to one receiver, isolating a panicking callback
    /// so the remaining subscribers still get their copy.
    fn deliver(&self, receiver: &dyn Receiver, payload: &str) {
        let outcome = catch_unwind(AssertUnwindSafe(|| receiver.receive(payload)));
        match outcome {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                trace!("delivered payload on '{}'", receiver.name());
            }
            Err(_) => {
                warn!(
                    "receiver on '{}' panicked during delivery, copy dropped",
                    receiver.name()
                );
            }
        }
    }
}

impl Schema for BroadcastSchema {
    fn add_receiver(&self, receiver: Arc<dyn Receiver>) {
        debug!("receiver subscribed to topic '{}'", receiver.name());
        let mut entry = self
            .subscribers
            .entry(receiver.name().to_owned())
            .or_insert_with(|| Arc::new(Vec::new()));
        // Copy-on-write append: an in-flight drain keeps its snapshot
        Arc::make_mut(entry.value_mut()).push(receiver);
        drop(entry);
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

impl Default for BroadcastSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BroadcastSchema {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            buffers: Arc::clone(&self.buffers),
            signal: Arc::clone(&self.signal),
            cancel: self.cancel.clone(),
            published: Arc::clone(&self.published),
            delivered: Arc::clone(&self.delivered),
        }
    }
}
