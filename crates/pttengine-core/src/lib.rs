//! Push-to-talk engine core
//!
//! The client-side core of a push-to-talk communication SDK. The protocol
//! engine, audio pipeline, transport, and history store live in an opaque
//! per-platform native module; this crate is the typed boundary in front of
//! it:
//!
//! - commands go out through a [`CommandSink`] the platform implements,
//!   addressed by raw contact name plus kind;
//! - a single multiplexed stream of loosely-shaped native events comes back
//!   in, is decoded, projected into canonical state (sorted contact lists,
//!   voice message slots, emergencies, recents, history playback cursor),
//!   and re-emitted as typed [`PttEvent`]s.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use pttengine_core::{ContactKind, Credentials, PttEngine, PttEvent};
//!
//! let (native_tx, native_rx) = tokio::sync::mpsc::unbounded_channel();
//! let engine = PttEngine::new(Arc::new(platform_sink), native_rx);
//! let mut events = engine.subscribe();
//!
//! engine.connect(&Credentials {
//!     network: "acme".into(),
//!     username: "driver12".into(),
//!     password: "secret".into(),
//! });
//!
//! while let Ok(event) = events.recv().await {
//!     if let PttEvent::ContactListUpdated { channels, .. } = event {
//!         if let Some(ops) = engine.get_channel("ops") {
//!             engine.send_text(&ops.name, ops.contact_kind(), "checking in");
//!         }
//!     }
//! }
//! ```

pub mod directory;
pub mod engine;
pub mod error;
pub mod events;
pub mod sink;
pub mod state;
pub mod types;
pub mod wire;

mod commands;
mod router;

// Re-exports
pub use engine::PttEngine;
pub use error::{PttError, PttResult};
pub use events::PttEvent;
pub use sink::{CommandSink, HistoryCallback, ImageDataCallback};
pub use state::ClientState;
pub use types::{
    AccountStatus, AlertMessage, Channel, ChannelAlertLevel, ChannelConnectionStatus, ChannelKind,
    ChannelOptions, ChannelUser, ConnectionError, ConnectionState, ConsoleSettings, Contact,
    ContactKind, Credentials, DispatchCall, DispatchCallStatus, HistoryAlertMessage,
    HistoryImageMessage, HistoryLocationMessage, HistoryMessage, HistoryTextMessage,
    HistoryVoiceMessage, ImageMessage, IncomingEmergency, IncomingVoiceMessage, LocationMessage,
    OutgoingEmergency, OutgoingVoiceMessage, OutgoingVoiceMessageError, OutgoingVoiceState,
    RecentEntry, RecentEntryKind, TextMessage, User, UserStatus,
};
