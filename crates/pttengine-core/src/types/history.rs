//! Message history types
//!
//! History records live in the native layer's store and are fetched on
//! demand. They are keyed by a `history_id` that is stable across sessions;
//! the id is the only valid handle for playback and image retrieval. Unlike
//! live messages, history records carry no inline payloads beyond text and
//! location fields: voice audio and image bytes are fetched lazily by id.

use serde::{Deserialize, Serialize};

use crate::types::contact::{ChannelUser, Contact};

/// A stored voice message. Playable via the engine's history playback calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryVoiceMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    /// Stable identifier, valid across sessions
    pub history_id: String,
    pub incoming: bool,
    /// Length of the recording in milliseconds
    pub duration_ms: u64,
}

/// A stored image message. The image bytes are retrieved separately by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryImageMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    pub history_id: String,
    pub incoming: bool,
}

/// A stored text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTextMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    pub history_id: String,
    pub incoming: bool,
    pub text: String,
}

/// A stored alert message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAlertMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    pub history_id: String,
    pub incoming: bool,
    pub text: String,
}

/// A stored location message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLocationMessage {
    pub contact: Contact,
    pub channel_user: Option<ChannelUser>,
    pub timestamp: i64,
    pub history_id: String,
    pub incoming: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub address: Option<String>,
}

/// Any stored message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryMessage {
    Voice(HistoryVoiceMessage),
    Image(HistoryImageMessage),
    Text(HistoryTextMessage),
    Alert(HistoryAlertMessage),
    Location(HistoryLocationMessage),
}

impl HistoryMessage {
    pub fn contact(&self) -> &Contact {
        match self {
            HistoryMessage::Voice(m) => &m.contact,
            HistoryMessage::Image(m) => &m.contact,
            HistoryMessage::Text(m) => &m.contact,
            HistoryMessage::Alert(m) => &m.contact,
            HistoryMessage::Location(m) => &m.contact,
        }
    }

    pub fn channel_user(&self) -> Option<&ChannelUser> {
        match self {
            HistoryMessage::Voice(m) => m.channel_user.as_ref(),
            HistoryMessage::Image(m) => m.channel_user.as_ref(),
            HistoryMessage::Text(m) => m.channel_user.as_ref(),
            HistoryMessage::Alert(m) => m.channel_user.as_ref(),
            HistoryMessage::Location(m) => m.channel_user.as_ref(),
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            HistoryMessage::Voice(m) => m.timestamp,
            HistoryMessage::Image(m) => m.timestamp,
            HistoryMessage::Text(m) => m.timestamp,
            HistoryMessage::Alert(m) => m.timestamp,
            HistoryMessage::Location(m) => m.timestamp,
        }
    }

    /// The stable id used for playback and image retrieval.
    pub fn history_id(&self) -> &str {
        match self {
            HistoryMessage::Voice(m) => &m.history_id,
            HistoryMessage::Image(m) => &m.history_id,
            HistoryMessage::Text(m) => &m.history_id,
            HistoryMessage::Alert(m) => &m.history_id,
            HistoryMessage::Location(m) => &m.history_id,
        }
    }

    pub fn incoming(&self) -> bool {
        match self {
            HistoryMessage::Voice(m) => m.incoming,
            HistoryMessage::Image(m) => m.incoming,
            HistoryMessage::Text(m) => m.incoming,
            HistoryMessage::Alert(m) => m.incoming,
            HistoryMessage::Location(m) => m.incoming,
        }
    }
}
