//! Emergency types
//!
//! Emergencies ride on the network's designated emergency channel. Several
//! incoming emergencies can be active at once; at most one outgoing.

use serde::{Deserialize, Serialize};

use crate::types::contact::{Channel, ChannelUser};

/// An emergency started by someone else on the emergency channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEmergency {
    /// The emergency channel it was raised on
    pub channel: Channel,
    /// Who raised it
    pub channel_user: ChannelUser,
    /// Unique identifier, stable for the emergency's lifetime
    pub emergency_id: String,
    /// Milliseconds since the epoch
    pub start_timestamp: i64,
    /// `None` while the emergency is ongoing
    pub end_timestamp: Option<i64>,
}

/// An emergency raised by this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEmergency {
    /// The emergency channel it was raised on
    pub channel: Channel,
    /// Milliseconds since the epoch
    pub start_timestamp: i64,
    /// `None` while the emergency is ongoing
    pub end_timestamp: Option<i64>,
}
