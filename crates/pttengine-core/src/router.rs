//! Event routing and state projection
//!
//! The router consumes the single multiplexed native event stream. Each
//! event is a loosely-shaped object whose `eventName` field selects one of
//! ~30 handlers; the handler decodes the payload, updates the canonical
//! [`ClientState`] under one write lock, and re-emits a typed [`PttEvent`].
//!
//! Two rules hold across every handler:
//!
//! - All decoding happens before the first state write, so a malformed event
//!   can never partially apply. When a required field is absent the event is
//!   dropped whole: no mutation, no emission. (The voice-stop handlers are
//!   the deliberate exception: they clear their slot before decoding the
//!   rest, preserving the long-standing native contract that a stop always
//!   ends the current message.)
//! - Unrecognized tags are ignored without so much as a log line; the native
//!   layer ships new event kinds before clients learn them.
//!
//! A decode violation (corrupt rather than missing data) propagates out of
//! [`Router::dispatch`]; the pump drops that single event and keeps going.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::directory;
use crate::error::PttResult;
use crate::events::PttEvent;
use crate::state::ClientState;
use crate::types::{
    AccountStatus, AlertMessage, Channel, ChannelUser, ConnectionError, ConnectionState, Contact,
    HistoryMessage, ImageMessage, IncomingEmergency, LocationMessage, OutgoingEmergency,
    OutgoingVoiceMessageError, OutgoingVoiceState, TextMessage, User,
};
use crate::wire::decode::{
    decode_alert_message, decode_channel, decode_channel_user_list, decode_console_settings,
    decode_contact, decode_dispatch_call, decode_history_message, decode_image_message,
    decode_incoming_emergency, decode_incoming_voice_message, decode_location_message,
    decode_outgoing_voice_message, decode_recent_entry, decode_text_message,
};
use crate::wire::{str_field, timestamp_field};

/// Projects native events into canonical state and application events.
#[derive(Clone)]
pub(crate) struct Router {
    state: Arc<RwLock<ClientState>>,
    event_tx: broadcast::Sender<PttEvent>,
}

impl Router {
    pub(crate) fn new(
        state: Arc<RwLock<ClientState>>,
        event_tx: broadcast::Sender<PttEvent>,
    ) -> Self {
        Self { state, event_tx }
    }

    /// Handle one native event.
    pub(crate) fn dispatch(&self, event: &Value) -> PttResult<()> {
        let Some(tag) = str_field(event, "eventName") else {
            trace!("native event without a tag");
            return Ok(());
        };
        match tag {
            "onConnectFailed" => self.on_connect_failed(event),
            "onConnectStarted" => {
                let state = self.set_connection_state(ConnectionState::Connecting);
                self.emit(PttEvent::ConnectStarted { state });
                Ok(())
            }
            "onConnectSucceeded" => {
                let state = self.set_connection_state(ConnectionState::Connected);
                self.emit(PttEvent::ConnectSucceeded { state });
                Ok(())
            }
            "onDisconnected" => {
                let state = self.set_connection_state(ConnectionState::Disconnected);
                self.emit(PttEvent::Disconnected { state });
                Ok(())
            }
            "onWillReconnect" => {
                let state = self.set_connection_state(ConnectionState::Reconnecting);
                self.emit(PttEvent::Reconnecting { state });
                Ok(())
            }
            "onContactListUpdated" => self.on_contact_list_updated(event),
            "onSelectedContactChanged" => self.on_selected_contact_changed(event),
            "onAccountStatusChanged" => self.on_account_status_changed(event),
            "onIncomingVoiceMessageStarted" => self.on_incoming_voice_started(event),
            "onIncomingVoiceMessageStopped" => self.on_incoming_voice_stopped(event),
            "onOutgoingVoiceMessageConnecting" => {
                self.on_outgoing_voice_progress(event, OutgoingVoiceState::Connecting)
            }
            "onOutgoingVoiceMessageStarted" => {
                self.on_outgoing_voice_progress(event, OutgoingVoiceState::Sending)
            }
            "onOutgoingVoiceMessageStopped" => self.on_outgoing_voice_stopped(event),
            "onIncomingImageMessage" => {
                self.on_image_message(event, true, |message| PttEvent::IncomingImageMessage {
                    message,
                })
            }
            "onOutgoingImageMessageSent" => {
                self.on_image_message(event, false, |message| PttEvent::OutgoingImageMessageSent {
                    message,
                })
            }
            "onOutgoingImageMessageSendFailed" => self.on_image_message(event, false, |message| {
                PttEvent::OutgoingImageMessageSendFailed { message }
            }),
            "onIncomingAlertMessage" => {
                self.on_alert_message(event, true, |message| PttEvent::IncomingAlertMessage {
                    message,
                })
            }
            "onOutgoingAlertMessageSent" => {
                self.on_alert_message(event, false, |message| PttEvent::OutgoingAlertMessageSent {
                    message,
                })
            }
            "onOutgoingAlertMessageSendFailed" => self.on_alert_message(event, false, |message| {
                PttEvent::OutgoingAlertMessageSendFailed { message }
            }),
            "onIncomingTextMessage" => {
                self.on_text_message(event, true, |message| PttEvent::IncomingTextMessage {
                    message,
                })
            }
            "onOutgoingTextMessageSent" => {
                self.on_text_message(event, false, |message| PttEvent::OutgoingTextMessageSent {
                    message,
                })
            }
            "onOutgoingTextMessageSendFailed" => self.on_text_message(event, false, |message| {
                PttEvent::OutgoingTextMessageSendFailed { message }
            }),
            "onIncomingLocationMessage" => {
                self.on_location_message(event, true, |message| PttEvent::IncomingLocationMessage {
                    message,
                })
            }
            "onOutgoingLocationMessageSent" => self.on_location_message(event, false, |message| {
                PttEvent::OutgoingLocationMessageSent { message }
            }),
            "onOutgoingLocationMessageSendFailed" => {
                self.on_location_message(event, false, |message| {
                    PttEvent::OutgoingLocationMessageSendFailed { message }
                })
            }
            "onIncomingEmergencyStarted" => self.on_incoming_emergency(event, true),
            "onIncomingEmergencyStopped" => self.on_incoming_emergency(event, false),
            "onOutgoingEmergencyStarted" => self.on_outgoing_emergency_started(event),
            "onOutgoingEmergencyStopped" => self.on_outgoing_emergency_stopped(event),
            "onRecentsUpdated" => self.on_recents_updated(event),
            "onHistoryUpdated" => {
                self.emit(PttEvent::HistoryUpdated);
                Ok(())
            }
            "onHistoryPlaybackStarted" => self.on_history_playback_started(event),
            "onHistoryPlaybackStopped" => {
                self.state.write().history_voice_message = None;
                self.emit(PttEvent::HistoryPlaybackStopped);
                Ok(())
            }
            "onConsoleSettingsChanged" => {
                let settings = decode_console_settings(event);
                self.state.write().console_settings = Some(settings);
                self.emit(PttEvent::ConsoleSettingsChanged { settings });
                Ok(())
            }
            "onDispatchCallPending" | "onDispatchCallActive" | "onDispatchCallTransferred"
            | "onDispatchCallEnded" => self.on_dispatch_call(event, tag),
            "onGroupConversationInvite" => {
                self.on_group_conversation(event, |conversation| PttEvent::GroupConversationInvite {
                    conversation,
                })
            }
            "onGroupConversationCreated" => self.on_group_conversation(event, |conversation| {
                PttEvent::GroupConversationCreated { conversation }
            }),
            "onGroupConversationLeft" => {
                self.on_group_conversation(event, |conversation| PttEvent::GroupConversationLeft {
                    conversation,
                })
            }
            "onGroupConversationRenamed" => self.on_group_conversation(event, |conversation| {
                PttEvent::GroupConversationRenamed { conversation }
            }),
            "onGroupConversationUsersAdded" => {
                self.on_group_conversation_users(event, |conversation, users| {
                    PttEvent::GroupConversationUsersAdded { conversation, users }
                })
            }
            "onGroupConversationUsersLeft" => {
                self.on_group_conversation_users(event, |conversation, users| {
                    PttEvent::GroupConversationUsersLeft { conversation, users }
                })
            }
            other => {
                trace!(tag = other, "ignoring unrecognized event tag");
                Ok(())
            }
        }
    }

    /// Fan an event out to subscribers. A send error only means nobody is
    /// listening right now; canonical state already reflects the event.
    fn emit(&self, event: PttEvent) {
        let _ = self.event_tx.send(event);
    }

    fn set_connection_state(&self, next: ConnectionState) -> ConnectionState {
        self.state.write().connection_state = next;
        next
    }

    fn on_connect_failed(&self, event: &Value) -> PttResult<()> {
        let state = self.set_connection_state(ConnectionState::Disconnected);
        let error = str_field(event, "error")
            .map(ConnectionError::from_wire)
            .unwrap_or_default();
        self.emit(PttEvent::ConnectFailed { state, error });
        Ok(())
    }

    fn on_contact_list_updated(&self, event: &Value) -> PttResult<()> {
        let (Some(raw_users), Some(raw_channels), Some(raw_conversations)) = (
            event.get("users").and_then(Value::as_array),
            event.get("channels").and_then(Value::as_array),
            event.get("groupConversations").and_then(Value::as_array),
        ) else {
            return Ok(());
        };

        let mut users: Vec<User> = Vec::with_capacity(raw_users.len());
        for raw in raw_users {
            if let Some(Contact::User(user)) = decode_contact(raw)? {
                users.push(user);
            }
        }
        let mut channels: Vec<Channel> = Vec::with_capacity(raw_channels.len());
        for raw in raw_channels {
            if let Some(channel) = decode_channel(raw)? {
                channels.push(channel);
            }
        }
        let mut group_conversations: Vec<Channel> = Vec::with_capacity(raw_conversations.len());
        for raw in raw_conversations {
            if let Some(channel) = decode_channel(raw)? {
                group_conversations.push(channel);
            }
        }
        directory::sort_by_name(&mut users);
        directory::sort_by_name(&mut channels);
        directory::sort_by_name(&mut group_conversations);

        // The emergency channel is set-only: a snapshot that omits it leaves
        // the last known one in place.
        let emergency_channel = event
            .get("emergencyChannel")
            .map(decode_channel)
            .transpose()?
            .flatten();

        {
            let mut state = self.state.write();
            state.users = users.clone();
            state.channels = channels.clone();
            state.group_conversations = group_conversations.clone();
            if let Some(channel) = emergency_channel {
                state.emergency_channel = Some(channel);
            }
        }
        self.emit(PttEvent::ContactListUpdated {
            users,
            channels,
            group_conversations,
        });
        Ok(())
    }

    fn on_selected_contact_changed(&self, event: &Value) -> PttResult<()> {
        let contact = event
            .get("contact")
            .map(decode_contact)
            .transpose()?
            .flatten();
        self.state.write().selected_contact = contact.clone();
        self.emit(PttEvent::SelectedContactChanged { contact });
        Ok(())
    }

    fn on_account_status_changed(&self, event: &Value) -> PttResult<()> {
        match str_field(event, "status") {
            // An absent status clears the projection; an unknown value is a
            // newer native layer talking and the event is dropped instead.
            None => {
                self.state.write().account_status = None;
                self.emit(PttEvent::AccountStatusChanged { status: None });
            }
            Some(raw) => {
                if let Some(status) = AccountStatus::from_wire(raw) {
                    self.state.write().account_status = Some(status);
                    self.emit(PttEvent::AccountStatusChanged {
                        status: Some(status),
                    });
                }
            }
        }
        Ok(())
    }

    fn on_incoming_voice_started(&self, event: &Value) -> PttResult<()> {
        let Some(message) = decode_incoming_voice_message(event)? else {
            return Ok(());
        };
        self.state.write().incoming_voice_message = Some(message.clone());
        self.emit(PttEvent::IncomingVoiceMessageStarted { message });
        Ok(())
    }

    fn on_incoming_voice_stopped(&self, event: &Value) -> PttResult<()> {
        // The slot clears no matter what the rest of the payload looks like.
        self.state.write().incoming_voice_message = None;
        let Some(message) = decode_incoming_voice_message(event)? else {
            return Ok(());
        };
        self.emit(PttEvent::IncomingVoiceMessageStopped { message });
        Ok(())
    }

    fn on_outgoing_voice_progress(
        &self,
        event: &Value,
        voice_state: OutgoingVoiceState,
    ) -> PttResult<()> {
        let Some(message) = decode_outgoing_voice_message(event, voice_state)? else {
            return Ok(());
        };
        self.state.write().outgoing_voice_message = Some(message.clone());
        let app_event = match voice_state {
            OutgoingVoiceState::Connecting => PttEvent::OutgoingVoiceMessageConnecting { message },
            _ => PttEvent::OutgoingVoiceMessageStarted { message },
        };
        self.emit(app_event);
        Ok(())
    }

    fn on_outgoing_voice_stopped(&self, event: &Value) -> PttResult<()> {
        self.state.write().outgoing_voice_message = None;
        // Failure is decided by the presence of an error field; its value
        // only refines the reported error.
        let failed = event.get("error").map(|v| !v.is_null()).unwrap_or(false);
        let terminal = if failed {
            OutgoingVoiceState::Failed
        } else {
            OutgoingVoiceState::Sent
        };
        let Some(message) = decode_outgoing_voice_message(event, terminal)? else {
            return Ok(());
        };
        let error = failed.then(|| {
            str_field(event, "error")
                .map(OutgoingVoiceMessageError::from_wire)
                .unwrap_or_default()
        });
        self.emit(PttEvent::OutgoingVoiceMessageStopped { message, error });
        Ok(())
    }

    fn on_image_message(
        &self,
        event: &Value,
        incoming: bool,
        wrap: impl FnOnce(ImageMessage) -> PttEvent,
    ) -> PttResult<()> {
        if let Some(message) = decode_image_message(event, incoming)? {
            self.emit(wrap(message));
        }
        Ok(())
    }

    fn on_alert_message(
        &self,
        event: &Value,
        incoming: bool,
        wrap: impl FnOnce(AlertMessage) -> PttEvent,
    ) -> PttResult<()> {
        if let Some(message) = decode_alert_message(event, incoming)? {
            self.emit(wrap(message));
        }
        Ok(())
    }

    fn on_text_message(
        &self,
        event: &Value,
        incoming: bool,
        wrap: impl FnOnce(TextMessage) -> PttEvent,
    ) -> PttResult<()> {
        if let Some(message) = decode_text_message(event, incoming)? {
            self.emit(wrap(message));
        }
        Ok(())
    }

    fn on_location_message(
        &self,
        event: &Value,
        incoming: bool,
        wrap: impl FnOnce(LocationMessage) -> PttEvent,
    ) -> PttResult<()> {
        if let Some(message) = decode_location_message(event, incoming)? {
            self.emit(wrap(message));
        }
        Ok(())
    }

    fn on_incoming_emergency(&self, event: &Value, started: bool) -> PttResult<()> {
        let Some(raw_list) = event.get("emergencies").and_then(Value::as_array) else {
            return Ok(());
        };
        let mut emergencies: Vec<IncomingEmergency> = Vec::with_capacity(raw_list.len());
        for raw in raw_list {
            if let Some(emergency) = decode_incoming_emergency(raw)? {
                emergencies.push(emergency);
            }
        }
        // Only the start path re-sorts; the stop path keeps the wire order.
        if started {
            emergencies.sort_by_key(|e| e.start_timestamp);
        }
        let emergency = event
            .get("emergency")
            .map(decode_incoming_emergency)
            .transpose()?
            .flatten();

        self.state.write().incoming_emergencies = emergencies.clone();
        let app_event = if started {
            PttEvent::IncomingEmergencyStarted {
                emergency,
                emergencies,
            }
        } else {
            PttEvent::IncomingEmergencyStopped {
                emergency,
                emergencies,
            }
        };
        self.emit(app_event);
        Ok(())
    }

    fn on_outgoing_emergency_started(&self, event: &Value) -> PttResult<()> {
        let Some(channel) = event
            .get("channel")
            .map(decode_channel)
            .transpose()?
            .flatten()
        else {
            return Ok(());
        };
        let Some(start_timestamp) = timestamp_field(event, "startTimestamp")? else {
            return Ok(());
        };
        let emergency = OutgoingEmergency {
            channel,
            start_timestamp,
            end_timestamp: None,
        };
        self.state.write().outgoing_emergency = Some(emergency.clone());
        self.emit(PttEvent::OutgoingEmergencyStarted { emergency });
        Ok(())
    }

    fn on_outgoing_emergency_stopped(&self, event: &Value) -> PttResult<()> {
        let Some(channel) = event
            .get("channel")
            .map(decode_channel)
            .transpose()?
            .flatten()
        else {
            return Ok(());
        };
        let Some(start_timestamp) = timestamp_field(event, "startTimestamp")? else {
            return Ok(());
        };
        let emergency = OutgoingEmergency {
            channel,
            start_timestamp,
            end_timestamp: timestamp_field(event, "endTimestamp")?,
        };
        self.state.write().outgoing_emergency = None;
        self.emit(PttEvent::OutgoingEmergencyStopped { emergency });
        Ok(())
    }

    fn on_recents_updated(&self, event: &Value) -> PttResult<()> {
        let Some(raw_list) = event.get("recents").and_then(Value::as_array) else {
            return Ok(());
        };
        let mut recents = Vec::with_capacity(raw_list.len());
        for raw in raw_list {
            if let Some(entry) = decode_recent_entry(raw)? {
                recents.push(entry);
            }
        }
        self.state.write().recents = recents.clone();
        self.emit(PttEvent::RecentsUpdated { recents });
        Ok(())
    }

    fn on_history_playback_started(&self, event: &Value) -> PttResult<()> {
        // The payload is the history record itself, at the event's top level.
        let Some(HistoryMessage::Voice(message)) = decode_history_message(event)? else {
            return Ok(());
        };
        self.state.write().history_voice_message = Some(message.clone());
        self.emit(PttEvent::HistoryPlaybackStarted { message });
        Ok(())
    }

    fn on_dispatch_call(&self, event: &Value, tag: &str) -> PttResult<()> {
        // A dispatch event needs both halves; a malformed one is not
        // actionable by the application and is dropped whole.
        let Some(channel) = event
            .get("channel")
            .map(decode_channel)
            .transpose()?
            .flatten()
        else {
            return Ok(());
        };
        if !channel.is_dispatch() {
            return Ok(());
        }
        let Some(call) = event.get("call").and_then(decode_dispatch_call) else {
            return Ok(());
        };
        let app_event = match tag {
            "onDispatchCallPending" => PttEvent::DispatchCallPending { channel, call },
            "onDispatchCallActive" => PttEvent::DispatchCallActive { channel, call },
            "onDispatchCallTransferred" => PttEvent::DispatchCallTransferred { channel, call },
            _ => PttEvent::DispatchCallEnded { channel, call },
        };
        self.emit(app_event);
        Ok(())
    }

    fn on_group_conversation(
        &self,
        event: &Value,
        wrap: impl FnOnce(Channel) -> PttEvent,
    ) -> PttResult<()> {
        let Some(conversation) = event
            .get("conversation")
            .map(decode_channel)
            .transpose()?
            .flatten()
        else {
            return Ok(());
        };
        self.emit(wrap(conversation));
        Ok(())
    }

    fn on_group_conversation_users(
        &self,
        event: &Value,
        wrap: impl FnOnce(Channel, Vec<ChannelUser>) -> PttEvent,
    ) -> PttResult<()> {
        let Some(conversation) = event
            .get("conversation")
            .map(decode_channel)
            .transpose()?
            .flatten()
        else {
            return Ok(());
        };
        let users = decode_channel_user_list(event.get("users"));
        // An empty decoded user list suppresses the event entirely.
        if users.is_empty() {
            return Ok(());
        }
        self.emit(wrap(conversation, users));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelKind, DispatchCallStatus, UserStatus};
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn harness() -> (
        Router,
        Arc<RwLock<ClientState>>,
        broadcast::Receiver<PttEvent>,
    ) {
        let state = Arc::new(RwLock::new(ClientState::default()));
        let (event_tx, event_rx) = broadcast::channel(64);
        (Router::new(state.clone(), event_tx), state, event_rx)
    }

    fn user_payload(name: &str) -> Value {
        json!({
            "name": name,
            "isChannel": false,
            "isMuted": false,
            "displayName": name,
            "status": "available",
        })
    }

    fn channel_payload(name: &str) -> Value {
        json!({ "name": name, "isChannel": true, "isConnected": true })
    }

    fn emergency_payload(id: &str, start: &str) -> Value {
        json!({
            "channel": channel_payload("Emergency"),
            "channelUser": { "name": "alice" },
            "emergencyId": id,
            "startTimestamp": start,
        })
    }

    #[test]
    fn test_connection_lifecycle() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({ "eventName": "onConnectStarted" }))
            .unwrap();
        assert_eq!(state.read().connection_state, ConnectionState::Connecting);
        assert!(matches!(rx.try_recv().unwrap(), PttEvent::ConnectStarted { .. }));

        router
            .dispatch(&json!({ "eventName": "onConnectSucceeded" }))
            .unwrap();
        assert_eq!(state.read().connection_state, ConnectionState::Connected);
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({ "eventName": "onWillReconnect" }))
            .unwrap();
        assert_eq!(state.read().connection_state, ConnectionState::Reconnecting);
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({ "eventName": "onDisconnected" }))
            .unwrap();
        assert_eq!(state.read().connection_state, ConnectionState::Disconnected);
    }

    #[test]
    fn test_connect_failed_decodes_error_with_fallback() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({ "eventName": "onConnectFailed", "error": "InvalidCredentials" }))
            .unwrap();
        assert_eq!(state.read().connection_state, ConnectionState::Disconnected);
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::ConnectFailed { error: ConnectionError::InvalidCredentials, .. }
        ));

        router
            .dispatch(&json!({ "eventName": "onConnectFailed", "error": "flux capacitor" }))
            .unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::ConnectFailed { error: ConnectionError::Unknown, .. }
        ));

        router
            .dispatch(&json!({ "eventName": "onConnectFailed" }))
            .unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::ConnectFailed { error: ConnectionError::Unknown, .. }
        ));
    }

    #[test]
    fn test_contact_list_snapshot_is_sorted_and_replaced() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [user_payload("zoe"), user_payload("Abe")],
                "channels": [channel_payload("ops"), channel_payload("Alpha")],
                "groupConversations": [],
            }))
            .unwrap();
        {
            let state = state.read();
            let names: Vec<&str> = state.users.iter().map(|u| u.name.as_str()).collect();
            assert_eq!(names, vec!["Abe", "zoe"]);
            let names: Vec<&str> = state.channels.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["Alpha", "ops"]);
        }
        assert!(matches!(rx.try_recv().unwrap(), PttEvent::ContactListUpdated { .. }));

        // A second disjoint snapshot fully discards the first.
        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [user_payload("carol")],
                "channels": [],
                "groupConversations": [],
            }))
            .unwrap();
        let state = state.read();
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.users[0].name, "carol");
        assert!(state.channels.is_empty());
    }

    #[test]
    fn test_contact_list_routes_kinds_and_keeps_emergency_channel() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [user_payload("abe"), { "unnamed": true }],
                "channels": [channel_payload("ops")],
                "groupConversations": [{
                    "name": "c##1",
                    "isChannel": true,
                    "isGroupConversation": true,
                    "displayName": "Night shift",
                }],
                "emergencyChannel": channel_payload("Emergency"),
            }))
            .unwrap();
        {
            let state = state.read();
            assert_eq!(state.users.len(), 1);
            assert_eq!(state.group_conversations.len(), 1);
            assert!(state.group_conversations[0].is_group_conversation());
            assert_eq!(
                state.emergency_channel.as_ref().map(|c| c.name.as_str()),
                Some("Emergency")
            );
        }
        rx.try_recv().unwrap();

        // A snapshot without the field leaves the emergency channel alone.
        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [],
                "channels": [],
                "groupConversations": [],
            }))
            .unwrap();
        assert!(state.read().emergency_channel.is_some());
    }

    #[test]
    fn test_contact_list_missing_array_drops_event() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [user_payload("abe")],
            }))
            .unwrap();
        assert!(state.read().users.is_empty());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_selected_contact_set_and_cleared() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onSelectedContactChanged",
                "contact": user_payload("bob"),
            }))
            .unwrap();
        assert!(state.read().selected_contact.is_some());
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::SelectedContactChanged { contact: Some(_) }
        ));

        router
            .dispatch(&json!({ "eventName": "onSelectedContactChanged" }))
            .unwrap();
        assert!(state.read().selected_contact.is_none());
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::SelectedContactChanged { contact: None }
        ));
    }

    #[test]
    fn test_account_status_absent_clears_unknown_drops() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({ "eventName": "onAccountStatusChanged", "status": "BUSY" }))
            .unwrap();
        assert_eq!(state.read().account_status, Some(AccountStatus::Busy));
        rx.try_recv().unwrap();

        // Unknown value: event dropped, projection untouched.
        router
            .dispatch(&json!({ "eventName": "onAccountStatusChanged", "status": "zen" }))
            .unwrap();
        assert_eq!(state.read().account_status, Some(AccountStatus::Busy));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // Absent value: projection cleared, event emitted.
        router
            .dispatch(&json!({ "eventName": "onAccountStatusChanged" }))
            .unwrap();
        assert_eq!(state.read().account_status, None);
        assert!(matches!(
            rx.try_recv().unwrap(),
            PttEvent::AccountStatusChanged { status: None }
        ));
    }

    #[test]
    fn test_outgoing_voice_walks_the_state_machine() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingVoiceMessageConnecting",
                "contact": user_payload("bob"),
                "timestamp": "1700000000000",
            }))
            .unwrap();
        assert_eq!(
            state.read().outgoing_voice_message.as_ref().map(|m| m.state),
            Some(OutgoingVoiceState::Connecting)
        );
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingVoiceMessageStarted",
                "contact": user_payload("bob"),
                "timestamp": "1700000000001",
            }))
            .unwrap();
        assert_eq!(
            state.read().outgoing_voice_message.as_ref().map(|m| m.state),
            Some(OutgoingVoiceState::Sending)
        );
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingVoiceMessageStopped",
                "contact": user_payload("bob"),
                "timestamp": "1700000000002",
            }))
            .unwrap();
        assert!(state.read().outgoing_voice_message.is_none());
        let PttEvent::OutgoingVoiceMessageStopped { message, error } = rx.try_recv().unwrap()
        else {
            panic!("expected a stop event");
        };
        assert_eq!(message.state, OutgoingVoiceState::Sent);
        assert_eq!(error, None);
    }

    #[test]
    fn test_outgoing_voice_stop_with_error_reports_failed() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingVoiceMessageStopped",
                "contact": user_payload("Bob"),
                "timestamp": "1700000000000",
                "error": "nomicpermission",
            }))
            .unwrap();
        assert!(state.read().outgoing_voice_message.is_none());
        let PttEvent::OutgoingVoiceMessageStopped { message, error } = rx.try_recv().unwrap()
        else {
            panic!("expected a stop event");
        };
        assert_eq!(message.state, OutgoingVoiceState::Failed);
        assert_eq!(message.timestamp, 1_700_000_000_000);
        assert_eq!(error, Some(OutgoingVoiceMessageError::NoMicPermission));
    }

    #[test]
    fn test_outgoing_voice_stop_unrecognized_error_still_fails() {
        let (router, _, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onOutgoingVoiceMessageStopped",
                "contact": user_payload("bob"),
                "timestamp": "1",
                "error": "antenna fell off",
            }))
            .unwrap();
        let PttEvent::OutgoingVoiceMessageStopped { message, error } = rx.try_recv().unwrap()
        else {
            panic!("expected a stop event");
        };
        assert_eq!(message.state, OutgoingVoiceState::Failed);
        assert_eq!(error, Some(OutgoingVoiceMessageError::Unknown));
    }

    #[test]
    fn test_incoming_voice_stop_clears_slot_even_when_payload_is_bad() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onIncomingVoiceMessageStarted",
                "contact": user_payload("bob"),
                "channelUser": { "name": "bob" },
                "timestamp": "1",
            }))
            .unwrap();
        assert!(state.read().incoming_voice_message.is_some());
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({ "eventName": "onIncomingVoiceMessageStopped" }))
            .unwrap();
        assert!(state.read().incoming_voice_message.is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_one_shot_message_is_pure_passthrough() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onIncomingTextMessage",
                "contact": user_payload("bob"),
                "channelUser": { "name": "bob", "displayName": "Bob" },
                "timestamp": "1700000000000",
                "text": "copy that",
            }))
            .unwrap();
        let PttEvent::IncomingTextMessage { message } = rx.try_recv().unwrap() else {
            panic!("expected a text event");
        };
        assert_eq!(message.text, "copy that");
        assert!(message.incoming);
        // Nothing canonical tracks one-shot messages.
        assert!(state.read().recents.is_empty());
        assert!(state.read().incoming_voice_message.is_none());
    }

    #[test]
    fn test_incoming_location_emits_full_message() {
        let (router, _, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onIncomingLocationMessage",
                "contact": user_payload("bob"),
                "timestamp": "1",
                "latitude": 30.27,
                "longitude": -97.74,
                "accuracy": 4.5,
            }))
            .unwrap();
        let PttEvent::IncomingLocationMessage { message } = rx.try_recv().unwrap() else {
            panic!("expected a location event");
        };
        assert_eq!(message.latitude, 30.27);
        assert_eq!(message.accuracy, 4.5);
    }

    #[test]
    fn test_recents_replace_and_filter_bad_entries() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onRecentsUpdated",
                "recents": [
                    {
                        "contact": user_payload("bob"),
                        "channelUser": { "name": "bob" },
                        "type": "voice",
                        "timestamp": "1700000000000",
                        "incoming": true,
                    },
                    { "contact": {}, "type": "voice", "timestamp": "1" },
                ],
            }))
            .unwrap();
        let PttEvent::RecentsUpdated { recents } = rx.try_recv().unwrap() else {
            panic!("expected a recents event");
        };
        assert_eq!(recents.len(), 1);
        assert_eq!(state.read().recents.len(), 1);
        assert_eq!(
            state.read().recents[0].channel_user.as_ref().map(|u| u.name.as_str()),
            Some("bob")
        );
    }

    #[test]
    fn test_emergency_start_sorts_stop_does_not() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onIncomingEmergencyStarted",
                "emergency": emergency_payload("b", "200"),
                "emergencies": [
                    emergency_payload("b", "200"),
                    emergency_payload("a", "100"),
                ],
            }))
            .unwrap();
        {
            let state = state.read();
            let ids: Vec<&str> = state
                .incoming_emergencies
                .iter()
                .map(|e| e.emergency_id.as_str())
                .collect();
            assert_eq!(ids, vec!["a", "b"]);
        }
        let PttEvent::IncomingEmergencyStarted { emergency, emergencies } = rx.try_recv().unwrap()
        else {
            panic!("expected an emergency event");
        };
        assert_eq!(emergency.unwrap().emergency_id, "b");
        assert_eq!(emergencies.len(), 2);

        // Stop replaces the list but preserves wire order.
        router
            .dispatch(&json!({
                "eventName": "onIncomingEmergencyStopped",
                "emergency": emergency_payload("b", "200"),
                "emergencies": [
                    emergency_payload("b", "200"),
                    emergency_payload("a", "100"),
                ],
            }))
            .unwrap();
        let state = state.read();
        let ids: Vec<&str> = state
            .incoming_emergencies
            .iter()
            .map(|e| e.emergency_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_outgoing_emergency_set_and_clear() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingEmergencyStarted",
                "channel": channel_payload("Emergency"),
                "startTimestamp": "100",
            }))
            .unwrap();
        assert_eq!(
            state.read().outgoing_emergency.as_ref().map(|e| e.start_timestamp),
            Some(100)
        );
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({
                "eventName": "onOutgoingEmergencyStopped",
                "channel": channel_payload("Emergency"),
                "startTimestamp": "100",
                "endTimestamp": "250",
            }))
            .unwrap();
        assert!(state.read().outgoing_emergency.is_none());
        let PttEvent::OutgoingEmergencyStopped { emergency } = rx.try_recv().unwrap() else {
            panic!("expected an emergency stop");
        };
        assert_eq!(emergency.end_timestamp, Some(250));
    }

    #[test]
    fn test_history_playback_cursor() {
        let (router, state, mut rx) = harness();

        router
            .dispatch(&json!({
                "eventName": "onHistoryPlaybackStarted",
                "contact": user_payload("bob"),
                "type": "voice",
                "timestamp": "1700000000000",
                "historyId": "h-9",
                "incoming": true,
                "durationMs": 2000,
            }))
            .unwrap();
        assert_eq!(
            state.read().history_voice_message.as_ref().map(|m| m.history_id.as_str()),
            Some("h-9")
        );
        rx.try_recv().unwrap();

        router
            .dispatch(&json!({ "eventName": "onHistoryPlaybackStopped" }))
            .unwrap();
        assert!(state.read().history_voice_message.is_none());
        assert!(matches!(rx.try_recv().unwrap(), PttEvent::HistoryPlaybackStopped));
    }

    #[test]
    fn test_history_playback_ignores_non_voice_records() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onHistoryPlaybackStarted",
                "contact": user_payload("bob"),
                "type": "text",
                "text": "hi",
                "timestamp": "1",
                "historyId": "h-1",
            }))
            .unwrap();
        assert!(state.read().history_voice_message.is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_console_settings_projection() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onConsoleSettingsChanged",
                "allowGroupConversations": true,
            }))
            .unwrap();
        let settings = state.read().console_settings.unwrap();
        assert!(settings.allow_group_conversations);
        assert!(!settings.allow_non_dispatchers_to_end_calls);
        assert!(matches!(rx.try_recv().unwrap(), PttEvent::ConsoleSettingsChanged { .. }));
    }

    #[test]
    fn test_dispatch_call_events_need_both_halves() {
        let (router, _, mut rx) = harness();

        let dispatch_channel = json!({
            "name": "Dispatch",
            "isChannel": true,
            "isDispatchChannel": true,
        });

        router
            .dispatch(&json!({
                "eventName": "onDispatchCallActive",
                "channel": dispatch_channel.clone(),
                "call": { "status": "active", "dispatcher": "Dana" },
            }))
            .unwrap();
        let PttEvent::DispatchCallActive { channel, call } = rx.try_recv().unwrap() else {
            panic!("expected an active call");
        };
        assert!(channel.is_dispatch());
        assert_eq!(call.status, DispatchCallStatus::Active);

        // Missing call: dropped.
        router
            .dispatch(&json!({
                "eventName": "onDispatchCallEnded",
                "channel": dispatch_channel,
            }))
            .unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // Non-dispatch channel: dropped.
        router
            .dispatch(&json!({
                "eventName": "onDispatchCallPending",
                "channel": channel_payload("ops"),
                "call": { "status": "pending" },
            }))
            .unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_group_conversation_events() {
        let (router, _, mut rx) = harness();

        let conversation = json!({
            "name": "c##1",
            "isChannel": true,
            "isGroupConversation": true,
            "displayName": "Night shift",
        });

        router
            .dispatch(&json!({
                "eventName": "onGroupConversationInvite",
                "conversation": conversation.clone(),
            }))
            .unwrap();
        assert!(matches!(rx.try_recv().unwrap(), PttEvent::GroupConversationInvite { .. }));

        router
            .dispatch(&json!({
                "eventName": "onGroupConversationUsersAdded",
                "conversation": conversation,
                "users": [{ "name": "alice" }],
            }))
            .unwrap();
        let PttEvent::GroupConversationUsersAdded { users, .. } = rx.try_recv().unwrap() else {
            panic!("expected a users-added event");
        };
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_group_conversation_empty_user_list_suppresses_emission() {
        let (router, _, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onGroupConversationUsersLeft",
                "conversation": {
                    "name": "c##1",
                    "isChannel": true,
                    "isGroupConversation": true,
                },
                "users": [{ "displayName": "nameless" }],
            }))
            .unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_unrecognized_tag_is_ignored() {
        let (router, _, mut rx) = harness();
        router
            .dispatch(&json!({ "eventName": "onQuantumEntanglement", "contact": 42 }))
            .unwrap();
        router.dispatch(&json!({ "payload": "no tag at all" })).unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_malformed_timestamp_drops_event_without_state_damage() {
        let (router, state, mut rx) = harness();
        let result = router.dispatch(&json!({
            "eventName": "onIncomingVoiceMessageStarted",
            "contact": user_payload("bob"),
            "timestamp": "noon-ish",
        }));
        assert!(result.is_err());
        assert!(state.read().incoming_voice_message.is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_user_status_fallback_flows_through_snapshot() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [{
                    "name": "bob",
                    "isChannel": false,
                    "status": "teleporting",
                }],
                "channels": [],
                "groupConversations": [],
            }))
            .unwrap();
        assert_eq!(state.read().users[0].status, UserStatus::Offline);
        rx.try_recv().unwrap();
    }

    #[test]
    fn test_group_conversation_snapshot_keeps_kind_payload() {
        let (router, state, mut rx) = harness();
        router
            .dispatch(&json!({
                "eventName": "onContactListUpdated",
                "users": [],
                "channels": [],
                "groupConversations": [{
                    "name": "c##2",
                    "isChannel": true,
                    "isGroupConversation": true,
                    "displayName": "Field team",
                    "users": [{ "name": "alice" }, { "name": "bob" }],
                    "onlineUsers": [{ "name": "bob" }],
                }],
            }))
            .unwrap();
        let state = state.read();
        let ChannelKind::Conversation { display_name, users, online_users } =
            &state.group_conversations[0].kind
        else {
            panic!("expected a conversation");
        };
        assert_eq!(display_name, "Field team");
        assert_eq!(users.len(), 2);
        assert_eq!(online_users.len(), 1);
        rx.try_recv().unwrap();
    }
}
