//! Domain model
//!
//! Plain value types shared by the wire decoder, the event router, and the
//! command surface. Everything here is inert data; all behavior lives in the
//! components that produce and consume it.

pub mod contact;
pub mod emergency;
pub mod history;
pub mod message;
pub mod session;

pub use contact::{
    Channel, ChannelConnectionStatus, ChannelKind, ChannelOptions, ChannelUser, Contact,
    ContactKind, DispatchCall, DispatchCallStatus, User, UserStatus,
};
pub use emergency::{IncomingEmergency, OutgoingEmergency};
pub use history::{
    HistoryAlertMessage, HistoryImageMessage, HistoryLocationMessage, HistoryMessage,
    HistoryTextMessage, HistoryVoiceMessage,
};
pub use message::{
    AlertMessage, ChannelAlertLevel, ImageMessage, IncomingVoiceMessage, LocationMessage,
    OutgoingVoiceMessage, OutgoingVoiceMessageError, OutgoingVoiceState, RecentEntry,
    RecentEntryKind, TextMessage,
};
pub use session::{AccountStatus, ConnectionError, ConnectionState, ConsoleSettings, Credentials};
