//! Payload decoders
//!
//! Total, side-effect-free translations from untyped payloads into the domain
//! model. The uniform contract:
//!
//! - A missing required field yields `None`; the caller drops that record
//!   (or, for a top-level field, the whole event) and moves on.
//! - A present but corrupt field (today: unparseable timestamps, a contact
//!   claiming two channel kinds) is an error and propagates.
//! - Unknown values of closed enum sets decode to documented fallbacks where
//!   a safe one exists, because the native layer may ship new values before
//!   this crate learns them.
//! - `channel_user` is only ever attached to incoming messages; its absence
//!   is meaningful and is never papered over with a placeholder.

use serde_json::Value;

use crate::error::{PttError, PttResult};
use crate::types::{
    AlertMessage, Channel, ChannelConnectionStatus, ChannelKind, ChannelOptions, ChannelUser,
    ConsoleSettings, Contact, DispatchCall, DispatchCallStatus, HistoryAlertMessage,
    HistoryImageMessage, HistoryLocationMessage, HistoryMessage, HistoryTextMessage,
    HistoryVoiceMessage, ImageMessage, IncomingEmergency, IncomingVoiceMessage, LocationMessage,
    OutgoingVoiceMessage, OutgoingVoiceState, RecentEntry, RecentEntryKind, TextMessage, User,
    UserStatus,
};
use crate::wire::{
    bool_field, f64_field, str_field, string_field, timestamp_field, u32_field, u64_field,
};

/// Decode a channel-user reference. The display name falls back to the name
/// itself when the wire omits it.
pub fn decode_channel_user(value: &Value) -> Option<ChannelUser> {
    let name = string_field(value, "name")?;
    let display_name = string_field(value, "displayName").unwrap_or_else(|| name.clone());
    Some(ChannelUser { name, display_name })
}

/// Decode a dispatch call. An unknown status has no safe fallback, so it
/// drops the call.
pub fn decode_dispatch_call(value: &Value) -> Option<DispatchCall> {
    let status = DispatchCallStatus::from_wire(str_field(value, "status")?)?;
    Some(DispatchCall {
        status,
        dispatcher: string_field(value, "dispatcher"),
    })
}

fn decode_channel_options(value: Option<&Value>) -> ChannelOptions {
    let Some(value) = value else {
        return ChannelOptions::default();
    };
    ChannelOptions {
        no_disconnect: bool_field(value, "noDisconnect"),
        hide_power_button: bool_field(value, "hidePowerButton"),
        listen_only: bool_field(value, "listenOnly"),
        allow_alerts: bool_field(value, "allowAlerts"),
        allow_text_messages: bool_field(value, "allowTextMessages"),
        allow_locations: bool_field(value, "allowLocations"),
    }
}

pub(crate) fn decode_channel_user_list(value: Option<&Value>) -> Vec<ChannelUser> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(decode_channel_user).collect())
        .unwrap_or_default()
}

/// Decode a contact of any kind.
///
/// Kind resolution order matters and is fixed: the `isChannel` flag decides
/// user vs channel; a channel then checks dispatch before group conversation,
/// so stray fields of another kind cannot flip the result. A payload flagged
/// as both dispatch and conversation is ambiguous and is an error, never a
/// guess.
pub fn decode_contact(value: &Value) -> PttResult<Option<Contact>> {
    let Some(name) = string_field(value, "name") else {
        return Ok(None);
    };

    if !bool_field(value, "isChannel") {
        let display_name = string_field(value, "displayName").unwrap_or_else(|| name.clone());
        let status = str_field(value, "status")
            .map(UserStatus::from_wire)
            .unwrap_or_default();
        let supports_group_conversations = value
            .get("supportedFeatures")
            .map(|features| bool_field(features, "groupConversations"))
            .unwrap_or(false);
        return Ok(Some(Contact::User(User {
            name,
            display_name,
            is_muted: bool_field(value, "isMuted"),
            status,
            profile_picture_url: string_field(value, "profilePictureUrl"),
            profile_picture_thumbnail_url: string_field(value, "profilePictureThumbnailUrl"),
            supports_group_conversations,
        })));
    }

    let is_dispatch = bool_field(value, "isDispatchChannel");
    let is_conversation = bool_field(value, "isGroupConversation");
    if is_dispatch && is_conversation {
        return Err(PttError::AmbiguousContactKind { name });
    }

    let connection_status = if bool_field(value, "isConnected") {
        ChannelConnectionStatus::Connected
    } else if bool_field(value, "isConnecting") {
        ChannelConnectionStatus::Connecting
    } else {
        ChannelConnectionStatus::Disconnected
    };

    let kind = if is_dispatch {
        ChannelKind::Dispatch {
            current_call: value.get("currentCall").and_then(decode_dispatch_call),
        }
    } else if is_conversation {
        ChannelKind::Conversation {
            display_name: string_field(value, "displayName").unwrap_or_else(|| name.clone()),
            users: decode_channel_user_list(value.get("users")),
            online_users: decode_channel_user_list(value.get("onlineUsers")),
        }
    } else {
        ChannelKind::Plain
    };

    Ok(Some(Contact::Channel(Channel {
        name,
        is_muted: bool_field(value, "isMuted"),
        connection_status,
        users_online: u32_field(value, "usersOnline"),
        options: decode_channel_options(value.get("options")),
        kind,
    })))
}

/// Decode a contact and require it to be some shape of channel.
pub fn decode_channel(value: &Value) -> PttResult<Option<Channel>> {
    Ok(decode_contact(value)?.and_then(|contact| match contact {
        Contact::Channel(channel) => Some(channel),
        Contact::User(_) => None,
    }))
}

/// Decode console settings. Total: absent flags read as false.
pub fn decode_console_settings(value: &Value) -> ConsoleSettings {
    ConsoleSettings {
        allow_non_dispatchers_to_end_calls: bool_field(value, "allowNonDispatchersToEndCalls"),
        allow_group_conversations: bool_field(value, "allowGroupConversations"),
    }
}

/// Decode an incoming emergency record.
pub fn decode_incoming_emergency(value: &Value) -> PttResult<Option<IncomingEmergency>> {
    let Some(channel) = value.get("channel").map(decode_channel).transpose()?.flatten() else {
        return Ok(None);
    };
    let Some(channel_user) = value.get("channelUser").and_then(decode_channel_user) else {
        return Ok(None);
    };
    let Some(emergency_id) = string_field(value, "emergencyId") else {
        return Ok(None);
    };
    let Some(start_timestamp) = timestamp_field(value, "startTimestamp")? else {
        return Ok(None);
    };
    Ok(Some(IncomingEmergency {
        channel,
        channel_user,
        emergency_id,
        start_timestamp,
        end_timestamp: timestamp_field(value, "endTimestamp")?,
    }))
}

/// The fields every live message shares: contact, timestamp, and (for
/// incoming channel traffic only) the author.
fn decode_message_envelope(
    value: &Value,
    incoming: bool,
) -> PttResult<Option<(Contact, Option<ChannelUser>, i64)>> {
    let Some(contact) = value.get("contact").map(decode_contact).transpose()?.flatten() else {
        return Ok(None);
    };
    let Some(timestamp) = timestamp_field(value, "timestamp")? else {
        return Ok(None);
    };
    let channel_user = if incoming {
        value.get("channelUser").and_then(decode_channel_user)
    } else {
        None
    };
    Ok(Some((contact, channel_user, timestamp)))
}

/// Decode the voice message currently being received.
pub fn decode_incoming_voice_message(value: &Value) -> PttResult<Option<IncomingVoiceMessage>> {
    Ok(decode_message_envelope(value, true)?.map(|(contact, channel_user, timestamp)| {
        IncomingVoiceMessage {
            contact,
            channel_user,
            timestamp,
        }
    }))
}

/// Decode an outgoing voice message in the given state.
pub fn decode_outgoing_voice_message(
    value: &Value,
    state: OutgoingVoiceState,
) -> PttResult<Option<OutgoingVoiceMessage>> {
    Ok(
        decode_message_envelope(value, false)?.map(|(contact, _, timestamp)| OutgoingVoiceMessage {
            contact,
            timestamp,
            state,
        }),
    )
}

/// Decode an image message.
pub fn decode_image_message(value: &Value, incoming: bool) -> PttResult<Option<ImageMessage>> {
    let Some((contact, channel_user, timestamp)) = decode_message_envelope(value, incoming)? else {
        return Ok(None);
    };
    let Some(image) = string_field(value, "image") else {
        return Ok(None);
    };
    Ok(Some(ImageMessage {
        contact,
        channel_user,
        incoming,
        timestamp,
        thumbnail: string_field(value, "thumbnail"),
        image,
    }))
}

/// Decode a text message.
pub fn decode_text_message(value: &Value, incoming: bool) -> PttResult<Option<TextMessage>> {
    let Some((contact, channel_user, timestamp)) = decode_message_envelope(value, incoming)? else {
        return Ok(None);
    };
    let Some(text) = string_field(value, "text") else {
        return Ok(None);
    };
    Ok(Some(TextMessage {
        contact,
        channel_user,
        incoming,
        timestamp,
        text,
    }))
}

/// Decode an alert message.
pub fn decode_alert_message(value: &Value, incoming: bool) -> PttResult<Option<AlertMessage>> {
    let Some((contact, channel_user, timestamp)) = decode_message_envelope(value, incoming)? else {
        return Ok(None);
    };
    let Some(text) = string_field(value, "text") else {
        return Ok(None);
    };
    Ok(Some(AlertMessage {
        contact,
        channel_user,
        incoming,
        timestamp,
        text,
    }))
}

/// Decode a location message.
pub fn decode_location_message(
    value: &Value,
    incoming: bool,
) -> PttResult<Option<LocationMessage>> {
    let Some((contact, channel_user, timestamp)) = decode_message_envelope(value, incoming)? else {
        return Ok(None);
    };
    let (Some(latitude), Some(longitude), Some(accuracy)) = (
        f64_field(value, "latitude"),
        f64_field(value, "longitude"),
        f64_field(value, "accuracy"),
    ) else {
        return Ok(None);
    };
    Ok(Some(LocationMessage {
        contact,
        channel_user,
        incoming,
        timestamp,
        latitude,
        longitude,
        accuracy,
        address: string_field(value, "address"),
    }))
}

/// Decode a recent entry. The author comes from the record itself.
pub fn decode_recent_entry(value: &Value) -> PttResult<Option<RecentEntry>> {
    let Some(contact) = value.get("contact").map(decode_contact).transpose()?.flatten() else {
        return Ok(None);
    };
    let Some(kind) = str_field(value, "type").and_then(RecentEntryKind::from_wire) else {
        return Ok(None);
    };
    let Some(timestamp) = timestamp_field(value, "timestamp")? else {
        return Ok(None);
    };
    Ok(Some(RecentEntry {
        contact,
        channel_user: value.get("channelUser").and_then(decode_channel_user),
        timestamp,
        kind,
        incoming: bool_field(value, "incoming"),
    }))
}

/// Decode a stored history record. Unknown `type` strings drop the record so
/// a newer native layer can add kinds without breaking older clients.
pub fn decode_history_message(value: &Value) -> PttResult<Option<HistoryMessage>> {
    let Some(contact) = value.get("contact").map(decode_contact).transpose()?.flatten() else {
        return Ok(None);
    };
    let Some(history_id) = string_field(value, "historyId") else {
        return Ok(None);
    };
    let Some(timestamp) = timestamp_field(value, "timestamp")? else {
        return Ok(None);
    };
    let channel_user = value.get("channelUser").and_then(decode_channel_user);
    let incoming = bool_field(value, "incoming");

    let message = match str_field(value, "type") {
        Some("voice") => HistoryMessage::Voice(HistoryVoiceMessage {
            contact,
            channel_user,
            timestamp,
            history_id,
            incoming,
            duration_ms: u64_field(value, "durationMs"),
        }),
        Some("image") => HistoryMessage::Image(HistoryImageMessage {
            contact,
            channel_user,
            timestamp,
            history_id,
            incoming,
        }),
        Some("text") => {
            let Some(text) = string_field(value, "text") else {
                return Ok(None);
            };
            HistoryMessage::Text(HistoryTextMessage {
                contact,
                channel_user,
                timestamp,
                history_id,
                incoming,
                text,
            })
        }
        Some("alert") => {
            let Some(text) = string_field(value, "text") else {
                return Ok(None);
            };
            HistoryMessage::Alert(HistoryAlertMessage {
                contact,
                channel_user,
                timestamp,
                history_id,
                incoming,
                text,
            })
        }
        Some("location") => {
            let (Some(latitude), Some(longitude), Some(accuracy)) = (
                f64_field(value, "latitude"),
                f64_field(value, "longitude"),
                f64_field(value, "accuracy"),
            ) else {
                return Ok(None);
            };
            HistoryMessage::Location(HistoryLocationMessage {
                contact,
                channel_user,
                timestamp,
                history_id,
                incoming,
                latitude,
                longitude,
                accuracy,
                address: string_field(value, "address"),
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(message))
}
