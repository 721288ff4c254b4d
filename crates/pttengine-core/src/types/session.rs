//! Session types: connection lifecycle, account status, sign-in credentials,
//! and server-controlled console settings.

use serde::{Deserialize, Serialize};

/// Where the engine is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Why a connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionError {
    #[default]
    Unknown,
    InvalidCredentials,
    InvalidState,
}

impl ConnectionError {
    /// Parse a wire error string, falling back to `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "invalidcredentials" => ConnectionError::InvalidCredentials,
            "invalidstate" => ConnectionError::InvalidState,
            _ => ConnectionError::Unknown,
        }
    }
}

/// The signed-in account's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Messages play live
    Available,
    /// Messages are received into history without playing
    Busy,
}

impl AccountStatus {
    /// Parse a wire status string. Unknown values are rejected rather than
    /// coerced; the caller decides what a rejection means.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "available" => Some(AccountStatus::Available),
            "busy" => Some(AccountStatus::Busy),
            _ => None,
        }
    }

    /// The string the native layer expects for this status.
    pub fn as_wire(&self) -> &'static str {
        match self {
            AccountStatus::Available => "available",
            AccountStatus::Busy => "busy",
        }
    }
}

/// Credentials for signing in to a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The network subdomain to connect to
    pub network: String,
    pub username: String,
    pub password: String,
}

/// Permissions configured server-side for the whole network.
///
/// Only meaningful while the connection state is `Connected`; anything read
/// outside that window is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether non-dispatchers may end dispatch calls
    pub allow_non_dispatchers_to_end_calls: bool,
    /// Whether users may create and manage group conversations
    pub allow_group_conversations: bool,
}
