/*!
 * Core Types
 * Common types used across the dispatch core
 */

/// Channel (topic) name under which payloads are published and receivers subscribe
pub type ChannelName = String;

/// Payload carried through a channel buffer
pub type Payload = String;
