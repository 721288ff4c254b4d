//! Canonical client state
//!
//! The single source of truth for everything the native layer has told us.
//! Written exclusively by the event router (one event at a time, fully
//! decoded before the first write), read by application code at any moment
//! through the engine's snapshot accessors. Reads are last-write-wins; there
//! is no transactional view across fields.

use crate::types::{
    AccountStatus, Channel, ConnectionState, ConsoleSettings, Contact, HistoryVoiceMessage,
    IncomingEmergency, IncomingVoiceMessage, OutgoingEmergency, OutgoingVoiceMessage, RecentEntry,
    User,
};

/// Canonical projections of the native event stream.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Connection lifecycle position
    pub connection_state: ConnectionState,
    /// The contact the user is currently interacting with
    pub selected_contact: Option<Contact>,
    /// Users, sorted ascending by case-insensitive name
    pub users: Vec<User>,
    /// Channels (plain and dispatch), sorted ascending by case-insensitive name
    pub channels: Vec<Channel>,
    /// Group conversations, sorted ascending by case-insensitive name
    pub group_conversations: Vec<Channel>,
    /// Only meaningful while connected
    pub account_status: Option<AccountStatus>,
    /// The voice message currently playing in, if any
    pub incoming_voice_message: Option<IncomingVoiceMessage>,
    /// The voice message currently being sent, if any
    pub outgoing_voice_message: Option<OutgoingVoiceMessage>,
    /// The network's designated emergency channel, once seen in a snapshot
    pub emergency_channel: Option<Channel>,
    /// Active incoming emergencies, sorted ascending by start timestamp
    pub incoming_emergencies: Vec<IncomingEmergency>,
    /// The emergency this device raised, if any
    pub outgoing_emergency: Option<OutgoingEmergency>,
    /// Latest-interaction rows, replaced wholesale on every update
    pub recents: Vec<RecentEntry>,
    /// The stored voice message currently playing back, if any
    pub history_voice_message: Option<HistoryVoiceMessage>,
    /// Server-side settings; stale unless connected
    pub console_settings: Option<ConsoleSettings>,
}
