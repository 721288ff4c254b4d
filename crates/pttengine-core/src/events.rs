//! Application-facing events
//!
//! One [`PttEvent`] is emitted per handled native event, after the canonical
//! state has been updated, so a subscriber that reads engine state from an
//! event handler always observes the post-event projection.

use crate::types::{
    AccountStatus, AlertMessage, Channel, ConnectionError, ConnectionState, ConsoleSettings,
    Contact, ChannelUser, DispatchCall, HistoryVoiceMessage, ImageMessage, IncomingEmergency,
    IncomingVoiceMessage, LocationMessage, OutgoingEmergency, OutgoingVoiceMessage,
    OutgoingVoiceMessageError, RecentEntry, TextMessage, User,
};

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PttEvent {
    /// A connection attempt failed; the state returns to `Disconnected`
    ConnectFailed {
        state: ConnectionState,
        error: ConnectionError,
    },
    /// A connection attempt started
    ConnectStarted { state: ConnectionState },
    /// The connection is established
    ConnectSucceeded { state: ConnectionState },
    /// The connection ended
    Disconnected { state: ConnectionState },
    /// The engine is attempting to reconnect
    Reconnecting { state: ConnectionState },

    /// The contact list was replaced with a fresh snapshot, sorted ascending
    /// by case-insensitive name
    ContactListUpdated {
        users: Vec<User>,
        channels: Vec<Channel>,
        group_conversations: Vec<Channel>,
    },
    /// The selected contact changed (`None` clears the selection)
    SelectedContactChanged { contact: Option<Contact> },
    /// The account status changed (`None` clears it)
    AccountStatusChanged { status: Option<AccountStatus> },

    /// A voice message started playing in
    IncomingVoiceMessageStarted { message: IncomingVoiceMessage },
    /// The current incoming voice message finished
    IncomingVoiceMessageStopped { message: IncomingVoiceMessage },
    /// An outgoing voice message is connecting
    OutgoingVoiceMessageConnecting { message: OutgoingVoiceMessage },
    /// The outgoing voice message is sending
    OutgoingVoiceMessageStarted { message: OutgoingVoiceMessage },
    /// The outgoing voice message reached a terminal state. `message.state`
    /// is `Sent` or `Failed`; `error` accompanies failures
    OutgoingVoiceMessageStopped {
        message: OutgoingVoiceMessage,
        error: Option<OutgoingVoiceMessageError>,
    },

    IncomingImageMessage { message: ImageMessage },
    OutgoingImageMessageSent { message: ImageMessage },
    OutgoingImageMessageSendFailed { message: ImageMessage },
    IncomingAlertMessage { message: AlertMessage },
    OutgoingAlertMessageSent { message: AlertMessage },
    OutgoingAlertMessageSendFailed { message: AlertMessage },
    IncomingTextMessage { message: TextMessage },
    OutgoingTextMessageSent { message: TextMessage },
    OutgoingTextMessageSendFailed { message: TextMessage },
    IncomingLocationMessage { message: LocationMessage },
    OutgoingLocationMessageSent { message: LocationMessage },
    OutgoingLocationMessageSendFailed { message: LocationMessage },

    /// Someone raised an emergency on the emergency channel. `emergencies` is
    /// the refreshed full list
    IncomingEmergencyStarted {
        emergency: Option<IncomingEmergency>,
        emergencies: Vec<IncomingEmergency>,
    },
    /// An incoming emergency ended
    IncomingEmergencyStopped {
        emergency: Option<IncomingEmergency>,
        emergencies: Vec<IncomingEmergency>,
    },
    /// This device raised an emergency
    OutgoingEmergencyStarted { emergency: OutgoingEmergency },
    /// This device's emergency ended
    OutgoingEmergencyStopped { emergency: OutgoingEmergency },

    /// The recents list was replaced
    RecentsUpdated { recents: Vec<RecentEntry> },

    /// Stored history changed; consumers should re-query what they display
    HistoryUpdated,
    /// Playback of a stored voice message started
    HistoryPlaybackStarted { message: HistoryVoiceMessage },
    /// Playback of the stored voice message stopped
    HistoryPlaybackStopped,

    /// A dispatch call is waiting for a dispatcher
    DispatchCallPending { channel: Channel, call: DispatchCall },
    /// A dispatcher accepted the call
    DispatchCallActive { channel: Channel, call: DispatchCall },
    /// The call moved to another dispatcher
    DispatchCallTransferred { channel: Channel, call: DispatchCall },
    /// The call ended
    DispatchCallEnded { channel: Channel, call: DispatchCall },

    /// Server-side console settings changed
    ConsoleSettingsChanged { settings: ConsoleSettings },

    /// This account was invited into a group conversation
    GroupConversationInvite { conversation: Channel },
    GroupConversationCreated { conversation: Channel },
    GroupConversationLeft { conversation: Channel },
    GroupConversationRenamed { conversation: Channel },
    GroupConversationUsersAdded {
        conversation: Channel,
        users: Vec<ChannelUser>,
    },
    GroupConversationUsersLeft {
        conversation: Channel,
        users: Vec<ChannelUser>,
    },
}

impl PttEvent {
    /// The connection state carried by connection-lifecycle events.
    pub fn connection_state(&self) -> Option<ConnectionState> {
        match self {
            PttEvent::ConnectFailed { state, .. }
            | PttEvent::ConnectStarted { state }
            | PttEvent::ConnectSucceeded { state }
            | PttEvent::Disconnected { state }
            | PttEvent::Reconnecting { state } => Some(*state),
            _ => None,
        }
    }
}
