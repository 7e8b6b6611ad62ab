/*!
 * Dispatch Types
 * Message and statistics types shared by the delivery schemas
 */

use crate::core::types::{ChannelName, Payload};
use serde::{Deserialize, Serialize};

/// Immutable channel-name/payload pair supplied by producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: ChannelName,
    pub payload: Payload,
}

impl Message {
    pub fn new(channel: impl Into<ChannelName>, payload: impl Into<Payload>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    pub fn size(&self) -> usize {
        std::mem::size_of::<Self>() + self.channel.len() + self.payload.len()
    }
}

/// Delivery semantics of a schema instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Each message is consumed by exactly one receiver (work-queue)
    Exclusive,
    /// Each message is delivered to every subscriber of its topic
    Broadcast,
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DeliveryMode::Exclusive => write!(f, "exclusive"),
            DeliveryMode::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// Schema statistics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub mode: DeliveryMode,
    /// Channel buffers created so far (lazily, on first publish)
    pub channels: usize,
    /// Payloads currently sitting in channel buffers
    pub buffered: usize,
    /// Registered receivers
    pub receivers: usize,
    /// Payloads accepted by `publish` since construction
    pub published: u64,
    /// Payload hand-offs to receivers since construction
    pub delivered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new() {
        let message = Message::new("weather", "18");
        assert_eq!(message.channel, "weather");
        assert_eq!(message.payload, "18");
    }

    #[test]
    fn test_message_size_includes_strings() {
        let short = Message::new("a", "b");
        let long = Message::new("a", "b".repeat(100));
        assert!(long.size() > short.size());
    }

    #[test]
    fn test_delivery_mode_display() {
        assert_eq!(DeliveryMode::Exclusive.to_string(), "exclusive");
        assert_eq!(DeliveryMode::Broadcast.to_string(), "broadcast");
    }
}
