/*!
 * Dispatch Traits
 * Delivery abstractions exposed to the owning service
 */

use super::types::Message;
use std::sync::Arc;

/// Delivery target registered with a schema.
///
/// The receiver's name doubles as its subscription key: in exclusive
/// mode it names the channel the receiver consumes from (receivers
/// sharing a name share that channel's load), in broadcast mode it is
/// the topic the receiver subscribes to. The core holds a non-owning
/// reference for the lifetime of the process; there is no
/// unregistration.
pub trait Receiver: Send + Sync {
    /// Name of this receiver, used as its channel/topic key
    fn name(&self) -> &str;

    /// Deliver one payload
    fn receive(&self, payload: &str);
}

/// Dispatch schema contract.
///
/// Producers and registrants may call `publish` and `add_receiver` from
/// any thread; exactly one thread per schema instance is expected to
/// drive `run`.
pub trait Schema: Send + Sync {
    /// Register a delivery target; never fails
    fn add_receiver(&self, receiver: Arc<dyn Receiver>);

    /// Enqueue a payload on a named channel; never fails
    fn publish(&self, message: Message);

    /// Execute the dispatch loop on the calling thread until cancelled
    fn run(&self);
}
