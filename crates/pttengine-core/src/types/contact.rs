//! Contact types
//!
//! Everything addressable on the network is a contact: individual users, and
//! channels in their three shapes (plain, dispatch, group conversation). The
//! three channel shapes are mutually exclusive, so they are modeled as a
//! payload enum on [`Channel`] rather than a hierarchy.

use serde::{Deserialize, Serialize};

/// Flat contact discriminator.
///
/// Used wherever a contact is addressed by raw name across the native
/// boundary, which shares no memory with this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    User,
    Channel,
    DispatchChannel,
    GroupConversation,
}

/// The presence of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserStatus {
    /// Connected; messages play live
    Available,
    /// Connected; messages go to history without playing
    Busy,
    /// Disconnected; messages are delivered on reconnect
    Standby,
    /// Disconnected and unreachable
    #[default]
    Offline,
}

impl UserStatus {
    /// Parse a wire status string. Unrecognized values (a newer native layer
    /// may ship ones this crate does not know) fall back to `Offline`.
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "available" => UserStatus::Available,
            "busy" => UserStatus::Busy,
            "standby" => UserStatus::Standby,
            "offline" => UserStatus::Offline,
            _ => UserStatus::Offline,
        }
    }
}

/// A user in the contact list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique within users, compared case-insensitively
    pub name: String,
    /// Non-unique name for display purposes
    pub display_name: String,
    pub is_muted: bool,
    pub status: UserStatus,
    /// URL of the user's profile picture
    pub profile_picture_url: Option<String>,
    /// URL of a smaller rendition, suitable for lists
    pub profile_picture_thumbnail_url: Option<String>,
    /// Whether this user's client can participate in group conversations
    pub supports_group_conversations: bool,
}

/// The connection status of a channel. Connecting is asynchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Advisory flags controlling which affordances a client should offer for a
/// channel. Nothing here is enforced locally; the server is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelOptions {
    /// The user may not disconnect from the channel
    pub no_disconnect: bool,
    /// The user may not change the channel's connection state
    pub hide_power_button: bool,
    /// The user may not talk on the channel
    pub listen_only: bool,
    pub allow_alerts: bool,
    pub allow_text_messages: bool,
    pub allow_locations: bool,
}

/// The status of a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchCallStatus {
    Pending,
    Active,
    Ended,
    Disconnected,
}

impl DispatchCallStatus {
    /// Parse a wire status string. There is no safe fallback for an unknown
    /// call status, so this returns `None` and the whole call is dropped.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(DispatchCallStatus::Pending),
            "active" => Some(DispatchCallStatus::Active),
            "ended" => Some(DispatchCallStatus::Ended),
            "disconnected" => Some(DispatchCallStatus::Disconnected),
            _ => None,
        }
    }
}

/// A call between a user and a dispatcher on a dispatch channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchCall {
    pub status: DispatchCallStatus,
    /// The dispatcher who accepted the call; `None` while pending
    pub dispatcher: Option<String>,
}

/// A user referenced within a channel context. Not necessarily present in the
/// main contact list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUser {
    pub name: String,
    pub display_name: String,
}

/// What shape of channel this is. At most one applies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ChannelKind {
    #[default]
    Plain,
    /// A channel carrying dispatcher calls
    Dispatch {
        /// The call currently on the channel, if any. Only one call can be
        /// current at a time.
        current_call: Option<DispatchCall>,
    },
    /// An ad-hoc, user-provisioned conversation
    Conversation {
        /// Name for display; `Channel::name` is an opaque hashed identifier
        /// for these
        display_name: String,
        /// Members, in wire order
        users: Vec<ChannelUser>,
        /// The subset of members currently online
        online_users: Vec<ChannelUser>,
    },
}

/// A multi-user addressable target requiring explicit connect/disconnect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique within channels, compared case-insensitively
    pub name: String,
    pub is_muted: bool,
    pub connection_status: ChannelConnectionStatus,
    /// Number of users connected to the channel
    pub users_online: u32,
    pub options: ChannelOptions,
    pub kind: ChannelKind,
}

impl Channel {
    /// The flat discriminator for this channel shape.
    pub fn contact_kind(&self) -> ContactKind {
        match self.kind {
            ChannelKind::Plain => ContactKind::Channel,
            ChannelKind::Dispatch { .. } => ContactKind::DispatchChannel,
            ChannelKind::Conversation { .. } => ContactKind::GroupConversation,
        }
    }

    /// The call currently on a dispatch channel.
    pub fn current_call(&self) -> Option<&DispatchCall> {
        match &self.kind {
            ChannelKind::Dispatch { current_call } => current_call.as_ref(),
            _ => None,
        }
    }

    /// Name to show in a UI. For group conversations this is the provisioned
    /// display name; for every other channel the name itself.
    pub fn display_name(&self) -> &str {
        match &self.kind {
            ChannelKind::Conversation { display_name, .. } => display_name,
            _ => &self.name,
        }
    }

    pub fn is_group_conversation(&self) -> bool {
        matches!(self.kind, ChannelKind::Conversation { .. })
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self.kind, ChannelKind::Dispatch { .. })
    }
}

/// Any addressable target of messaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    User(User),
    Channel(Channel),
}

impl Contact {
    /// The contact's unique (per kind) name.
    pub fn name(&self) -> &str {
        match self {
            Contact::User(user) => &user.name,
            Contact::Channel(channel) => &channel.name,
        }
    }

    pub fn kind(&self) -> ContactKind {
        match self {
            Contact::User(_) => ContactKind::User,
            Contact::Channel(channel) => channel.contact_kind(),
        }
    }

    pub fn is_muted(&self) -> bool {
        match self {
            Contact::User(user) => user.is_muted,
            Contact::Channel(channel) => channel.is_muted,
        }
    }

    /// Borrow the channel payload, for any of the three channel shapes.
    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Contact::Channel(channel) => Some(channel),
            Contact::User(_) => None,
        }
    }

    /// Whether two contacts address the same target: same kind and
    /// case-insensitively equal name.
    pub fn is_same(&self, other: &Contact) -> bool {
        self.kind() == other.kind() && self.name().eq_ignore_ascii_case(other.name())
    }
}
