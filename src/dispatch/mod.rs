/*!
 * Dispatch Module
 * Message routing with exclusive (work-queue) and broadcast (topic) delivery
 */

pub mod broadcast;
pub mod exclusive;
pub mod traits;
pub mod types;

pub(crate) mod runner;

// Re-export public API
pub use broadcast::BroadcastSchema;
pub use exclusive::ExclusiveSchema;
pub use traits::{Receiver, Schema};
pub use types::{DeliveryMode, DispatchStats, Message};
