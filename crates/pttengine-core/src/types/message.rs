//! Live message types
//!
//! A message always carries the contact it was exchanged with (for channel
//! traffic, the channel itself), a millisecond timestamp, and a direction.
//! `channel_user` identifies the author of an incoming channel message;
//! outgoing and direct messages never carry one.

use serde::{Deserialize, Serialize};

use crate::types::contact::{ChannelUser, Contact};

/// The state of an outgoing voice message.
///
/// Transitions only along
/// `None -> Connecting -> Sending -> {Sent | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutgoingVoiceState {
    #[default]
    None,
    Connecting,
    Sending,
    Sent,
    Failed,
}

/// Why an outgoing voice message stopped unsuccessfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutgoingVoiceMessageError {
    #[default]
    Unknown,
    NoMicPermission,
}

impl OutgoingVoiceMessageError {
    /// Parse a wire error string, falling back to `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "nomicpermission" => OutgoingVoiceMessageError::NoMicPermission,
            _ => OutgoingVoiceMessageError::Unknown,
        }
    }
}

/// A voice message currently being received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingVoiceMessage {
    pub contact: Contact,
    /// The author, when the message came in over a channel
    pub channel_user: Option<ChannelUser>,
    /// Milliseconds since the epoch
    pub timestamp: i64,
}

/// A voice message being sent (or just finished sending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingVoiceMessage {
    pub contact: Contact,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub state: OutgoingVoiceState,
}

/// An image message, incoming or outgoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub incoming: bool,
    pub timestamp: i64,
    /// Base64-encoded thumbnail, when the sender provided one
    pub thumbnail: Option<String>,
    /// Base64-encoded full image
    pub image: String,
}

/// A plain text message, incoming or outgoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub incoming: bool,
    pub timestamp: i64,
    pub text: String,
}

/// An alert message. Alerts are texts that demand acknowledgment on the
/// receiving device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub incoming: bool,
    pub timestamp: i64,
    pub text: String,
}

/// Which users of a channel an alert is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelAlertLevel {
    /// Users currently connected to the channel
    Connected,
    /// Every member, connected or not
    All,
}

/// A location message, incoming or outgoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub incoming: bool,
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: f64,
    /// Reverse-geocoded address, if available
    pub address: Option<String>,
}

/// The payload kind of the message summarized by a [`RecentEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecentEntryKind {
    Voice,
    Image,
    Alert,
    Text,
    Location,
}

impl RecentEntryKind {
    /// Parse a wire kind string. Unknown kinds drop the record.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "voice" => Some(RecentEntryKind::Voice),
            "image" => Some(RecentEntryKind::Image),
            "alert" => Some(RecentEntryKind::Alert),
            "text" => Some(RecentEntryKind::Text),
            "location" => Some(RecentEntryKind::Location),
            _ => None,
        }
    }
}

/// A read-only row summarizing the latest interaction with a contact.
///
/// The whole list is replaced on every update; entries are never patched in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub contact: Contact,
    /// The author of the latest message, when it was an incoming channel
    /// message
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    pub kind: RecentEntryKind,
    pub incoming: bool,
}
