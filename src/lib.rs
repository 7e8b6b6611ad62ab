/*!
 * Pub/Sub Dispatch Core
 * In-process message routing between producers and registered receivers
 */

pub mod core;
pub mod dispatch;

// Re-exports
pub use crate::core::sync::{CancelToken, WaitError, WaitResult, WakeSignal};
pub use crate::core::types::{ChannelName, Payload};
pub use dispatch::{
    BroadcastSchema, DeliveryMode, DispatchStats, ExclusiveSchema, Message, Receiver, Schema,
};
