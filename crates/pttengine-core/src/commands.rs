//! Outbound command surface
//!
//! Every command that targets a named contact resolves the name against
//! canonical state first (case-insensitive, through the sorted directory) and
//! silently does nothing when the target is unknown. The long-standing
//! contract of this surface is that callers get no errors back, only events.
//! The crate-internal [`CommandOutcome`] keeps that no-op path observable for
//! tests without widening the public API.
//!
//! The two query commands bridge the sink's callback convention into
//! futures. Absence of data resolves to an empty result; these futures never
//! fail. There is deliberately no timeout: a sink that neither invokes nor
//! drops its callback leaves the future pending, exactly as the native
//! contract leaves such a caller waiting.

use tokio::sync::oneshot;
use tracing::debug;

use crate::directory;
use crate::engine::PttEngine;
use crate::types::{
    AccountStatus, ChannelAlertLevel, ContactKind, Credentials, HistoryImageMessage,
    HistoryMessage, HistoryVoiceMessage,
};
use crate::wire::decode::decode_history_message;

/// How many history records to ask for when the caller does not say.
const DEFAULT_HISTORY_SIZE: u32 = 50;

/// What became of a command after target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    /// Forwarded to the native module
    Delivered,
    /// The named target is not in canonical state; nothing was forwarded
    NotFound,
    /// A client-side settings guard stopped the command
    NotAllowed,
}

impl PttEngine {
    // ─── Untargeted commands ────────────────────────────────────────────────

    /// Sign in to a network. Watch for the connect lifecycle events to learn
    /// the outcome.
    pub fn connect(&self, credentials: &Credentials) {
        self.sink.connect(credentials);
    }

    /// Sign out.
    pub fn disconnect(&self) {
        self.sink.disconnect();
    }

    /// Set the signed-in account's availability.
    pub fn set_account_status(&self, status: AccountStatus) {
        self.sink.set_account_status(status);
    }

    /// Stop the outgoing voice message, if one is in flight.
    pub fn stop_voice_message(&self) {
        self.sink.stop_voice_message();
    }

    /// Raise an emergency on the configured emergency channel.
    pub fn start_emergency(&self) {
        self.sink.start_emergency();
    }

    /// End this device's emergency.
    pub fn stop_emergency(&self) {
        self.sink.stop_emergency();
    }

    /// Stop history playback, if any.
    pub fn stop_history_playback(&self) {
        self.sink.stop_history_playback();
    }

    /// Upload diagnostics for support.
    pub fn submit_problem_report(&self) {
        self.sink.submit_problem_report();
    }

    // ─── Contact-targeted commands ──────────────────────────────────────────

    /// Track the contact the user is interacting with.
    pub fn set_selected_contact(&self, name: &str, kind: ContactKind) {
        self.forward_to_contact(name, kind, "set_selected_contact", |engine| {
            engine.sink.set_selected_contact(name, kind);
        });
    }

    /// Begin recording and sending a voice message.
    pub fn start_voice_message(&self, name: &str, kind: ContactKind) {
        self.forward_to_contact(name, kind, "start_voice_message", |engine| {
            engine.sink.start_voice_message(name, kind);
        });
    }

    /// Send image bytes.
    pub fn send_image(&self, name: &str, kind: ContactKind, data: Vec<u8>) {
        self.forward_to_contact(name, kind, "send_image", |engine| {
            engine.sink.send_image(name, kind, data);
        });
    }

    /// Send the device's current location.
    pub fn send_location(&self, name: &str, kind: ContactKind) {
        self.forward_to_contact(name, kind, "send_location", |engine| {
            engine.sink.send_location(name, kind);
        });
    }

    /// Send a text message.
    pub fn send_text(&self, name: &str, kind: ContactKind, text: &str) {
        self.send_text_outcome(name, kind, text);
    }

    pub(crate) fn send_text_outcome(
        &self,
        name: &str,
        kind: ContactKind,
        text: &str,
    ) -> CommandOutcome {
        self.forward_to_contact(name, kind, "send_text", |engine| {
            engine.sink.send_text(name, kind, text);
        })
    }

    /// Send an alert message. `level` addresses a subset of a channel's
    /// users; for non-channel targets it is accepted and ignored downstream.
    pub fn send_alert(
        &self,
        name: &str,
        kind: ContactKind,
        text: &str,
        level: Option<ChannelAlertLevel>,
    ) {
        self.forward_to_contact(name, kind, "send_alert", |engine| {
            engine.sink.send_alert(name, kind, text, level);
        });
    }

    /// Mute a contact. Muted contacts' messages go straight to history.
    pub fn mute_contact(&self, name: &str, kind: ContactKind) {
        self.forward_to_contact(name, kind, "mute_contact", |engine| {
            engine.sink.mute_contact(name, kind);
        });
    }

    /// Unmute a contact.
    pub fn unmute_contact(&self, name: &str, kind: ContactKind) {
        self.forward_to_contact(name, kind, "unmute_contact", |engine| {
            engine.sink.unmute_contact(name, kind);
        });
    }

    /// Connect to a channel or group conversation by name.
    pub fn connect_channel(&self, name: &str) {
        self.connect_channel_outcome(name, true);
    }

    /// Disconnect from a channel or group conversation by name.
    pub fn disconnect_channel(&self, name: &str) {
        self.connect_channel_outcome(name, false);
    }

    pub(crate) fn connect_channel_outcome(&self, name: &str, connect: bool) -> CommandOutcome {
        // Plain and dispatch channels share one collection; conversations
        // have their own. The sink learns which shape actually resolved.
        let Some(kind) = self.resolve_channel_kind(name) else {
            debug!(name, "dropping channel connect change for unknown channel");
            return CommandOutcome::NotFound;
        };
        if connect {
            self.sink.connect_channel(name, kind);
        } else {
            self.sink.disconnect_channel(name, kind);
        }
        CommandOutcome::Delivered
    }

    /// End the call on a dispatch channel. Whether non-dispatchers may do
    /// this is enforced server-side.
    pub fn end_dispatch_call(&self, name: &str) {
        self.end_dispatch_call_outcome(name);
    }

    pub(crate) fn end_dispatch_call_outcome(&self, name: &str) -> CommandOutcome {
        let found = {
            let state = self.state.read();
            directory::sorted_find(&state.channels, name).map(|channel| channel.is_dispatch())
        };
        match found {
            Some(true) => {
                self.sink.end_dispatch_call(name);
                CommandOutcome::Delivered
            }
            _ => {
                debug!(name, "dropping dispatch call end for unknown dispatch channel");
                CommandOutcome::NotFound
            }
        }
    }

    // ─── Group conversation management ──────────────────────────────────────

    /// Provision a new group conversation with the given users.
    pub fn create_group_conversation(&self, user_names: &[String], display_name: Option<&str>) {
        self.create_group_conversation_outcome(user_names, display_name);
    }

    pub(crate) fn create_group_conversation_outcome(
        &self,
        user_names: &[String],
        display_name: Option<&str>,
    ) -> CommandOutcome {
        if !self.group_conversations_allowed() {
            return CommandOutcome::NotAllowed;
        }
        self.sink.create_group_conversation(user_names, display_name);
        CommandOutcome::Delivered
    }

    /// Add users to a group conversation.
    pub fn add_users_to_group_conversation(&self, name: &str, user_names: &[String]) {
        self.add_users_to_group_conversation_outcome(name, user_names);
    }

    pub(crate) fn add_users_to_group_conversation_outcome(
        &self,
        name: &str,
        user_names: &[String],
    ) -> CommandOutcome {
        if !self.group_conversations_allowed() {
            return CommandOutcome::NotAllowed;
        }
        self.forward_to_contact(
            name,
            ContactKind::GroupConversation,
            "add_users_to_group_conversation",
            |engine| {
                engine.sink.add_users_to_group_conversation(name, user_names);
            },
        )
    }

    /// Leave a group conversation.
    pub fn leave_group_conversation(&self, name: &str) {
        if !self.group_conversations_allowed() {
            return;
        }
        self.forward_to_contact(
            name,
            ContactKind::GroupConversation,
            "leave_group_conversation",
            |engine| {
                engine.sink.leave_group_conversation(name);
            },
        );
    }

    /// Rename a group conversation.
    pub fn rename_group_conversation(&self, name: &str, new_name: &str) {
        if !self.group_conversations_allowed() {
            return;
        }
        self.forward_to_contact(
            name,
            ContactKind::GroupConversation,
            "rename_group_conversation",
            |engine| {
                engine.sink.rename_group_conversation(name, new_name);
            },
        );
    }

    // ─── History queries ────────────────────────────────────────────────────

    /// Fetch stored messages for a contact, newest first as the native layer
    /// returns them. Resolves to an empty list when the contact is unknown or
    /// the native layer has nothing; it never fails.
    pub async fn get_history(
        &self,
        name: &str,
        kind: ContactKind,
        size: Option<u32>,
    ) -> Vec<HistoryMessage> {
        if !self.contact_exists(name, kind) {
            debug!(name, "history query for unknown contact resolves empty");
            return Vec::new();
        }
        let (tx, rx) = oneshot::channel();
        self.sink.get_history(
            name,
            kind,
            size.unwrap_or(DEFAULT_HISTORY_SIZE),
            Box::new(move |records| {
                let _ = tx.send(records);
            }),
        );
        let Ok(Some(records)) = rx.await else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| decode_history_message(record).ok().flatten())
            .collect()
    }

    /// Play a stored voice message.
    pub fn play_history_message(&self, message: &HistoryVoiceMessage) {
        let name = message.contact.name();
        let kind = message.contact.kind();
        self.forward_to_contact(name, kind, "play_history_message", |engine| {
            engine
                .sink
                .play_history_message(&message.history_id, name, kind);
        });
    }

    /// Fetch the base64 image data of a stored image message. Resolves to
    /// `None` when the contact is unknown or the native layer has nothing.
    pub async fn get_history_image_data(&self, message: &HistoryImageMessage) -> Option<String> {
        let name = message.contact.name();
        let kind = message.contact.kind();
        if !self.contact_exists(name, kind) {
            debug!(name, "image query for unknown contact resolves empty");
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.sink.get_history_image_data(
            &message.history_id,
            name,
            kind,
            Box::new(move |data| {
                let _ = tx.send(data);
            }),
        );
        rx.await.ok().flatten()
    }

    // ─── Resolution helpers ─────────────────────────────────────────────────

    fn forward_to_contact(
        &self,
        name: &str,
        kind: ContactKind,
        command: &'static str,
        forward: impl FnOnce(&Self),
    ) -> CommandOutcome {
        if !self.contact_exists(name, kind) {
            debug!(name, command, "dropping command for unknown contact");
            return CommandOutcome::NotFound;
        }
        forward(self);
        CommandOutcome::Delivered
    }

    fn contact_exists(&self, name: &str, kind: ContactKind) -> bool {
        let state = self.state.read();
        match kind {
            ContactKind::User => directory::sorted_find(&state.users, name).is_some(),
            ContactKind::Channel | ContactKind::DispatchChannel => {
                directory::sorted_find(&state.channels, name).is_some()
            }
            ContactKind::GroupConversation => {
                directory::sorted_find(&state.group_conversations, name).is_some()
            }
        }
    }

    fn resolve_channel_kind(&self, name: &str) -> Option<ContactKind> {
        let state = self.state.read();
        if let Some(channel) = directory::sorted_find(&state.channels, name) {
            return Some(channel.contact_kind());
        }
        directory::sorted_find(&state.group_conversations, name).map(|c| c.contact_kind())
    }

    fn group_conversations_allowed(&self) -> bool {
        self.state
            .read()
            .console_settings
            .map(|settings| settings.allow_group_conversations)
            .unwrap_or(false)
    }
}
