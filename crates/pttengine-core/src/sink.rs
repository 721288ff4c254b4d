//! The outbound native boundary
//!
//! [`CommandSink`] is the set of procedures the per-platform native module
//! exposes. The sink shares no memory with this crate, so every targeted call
//! takes the raw contact name plus a [`ContactKind`] discriminator instead of
//! a rich object. Calls are fire-and-forget: the sink acknowledges nothing,
//! and any effect of a command comes back later through the event stream.
//!
//! The two query procedures are callback-based, mirroring the native calling
//! convention; the engine wraps them into futures. Nothing obliges the sink
//! to ever invoke a callback.

use serde_json::Value;

use crate::types::{AccountStatus, ChannelAlertLevel, ContactKind, Credentials};

/// Receives the untyped history records for a contact, or `None` when the
/// native layer has nothing.
pub type HistoryCallback = Box<dyn FnOnce(Option<Vec<Value>>) + Send>;

/// Receives the base64 image data for a stored image message, or `None`.
pub type ImageDataCallback = Box<dyn FnOnce(Option<String>) + Send>;

/// The per-platform native command surface.
///
/// Implementations live outside this crate (platform glue in production,
/// recording fakes in tests).
pub trait CommandSink: Send + Sync {
    /// Sign in to a network.
    fn connect(&self, credentials: &Credentials);

    /// Sign out.
    fn disconnect(&self);

    /// Track the contact the user is interacting with.
    fn set_selected_contact(&self, name: &str, kind: ContactKind);

    /// Set the signed-in account's availability.
    fn set_account_status(&self, status: AccountStatus);

    /// Connect to a channel or group conversation.
    fn connect_channel(&self, name: &str, kind: ContactKind);

    /// Disconnect from a channel or group conversation.
    fn disconnect_channel(&self, name: &str, kind: ContactKind);

    /// Begin recording and sending a voice message.
    fn start_voice_message(&self, name: &str, kind: ContactKind);

    /// Stop the outgoing voice message.
    fn stop_voice_message(&self);

    /// Send image bytes.
    fn send_image(&self, name: &str, kind: ContactKind, data: Vec<u8>);

    /// Send the device's current location.
    fn send_location(&self, name: &str, kind: ContactKind);

    /// Send a text message.
    fn send_text(&self, name: &str, kind: ContactKind, text: &str);

    /// Send an alert message. `level` only means something for channels; the
    /// sink ignores it elsewhere.
    fn send_alert(&self, name: &str, kind: ContactKind, text: &str, level: Option<ChannelAlertLevel>);

    /// Mute a contact.
    fn mute_contact(&self, name: &str, kind: ContactKind);

    /// Unmute a contact.
    fn unmute_contact(&self, name: &str, kind: ContactKind);

    /// Raise an emergency on the emergency channel.
    fn start_emergency(&self);

    /// End this device's emergency.
    fn stop_emergency(&self);

    /// Upload diagnostics for support.
    fn submit_problem_report(&self);

    /// Fetch up to `size` stored messages for a contact. Records arrive
    /// untyped; the engine decodes them.
    fn get_history(&self, name: &str, kind: ContactKind, size: u32, callback: HistoryCallback);

    /// Play a stored voice message.
    fn play_history_message(&self, history_id: &str, name: &str, kind: ContactKind);

    /// Stop history playback.
    fn stop_history_playback(&self);

    /// Fetch the image bytes of a stored image message.
    fn get_history_image_data(
        &self,
        history_id: &str,
        name: &str,
        kind: ContactKind,
        callback: ImageDataCallback,
    );

    /// End the call on a dispatch channel.
    fn end_dispatch_call(&self, name: &str);

    /// Provision a new group conversation.
    fn create_group_conversation(&self, user_names: &[String], display_name: Option<&str>);

    /// Add users to a group conversation.
    fn add_users_to_group_conversation(&self, name: &str, user_names: &[String]);

    /// Leave a group conversation.
    fn leave_group_conversation(&self, name: &str);

    /// Rename a group conversation.
    fn rename_group_conversation(&self, name: &str, new_name: &str);
}
