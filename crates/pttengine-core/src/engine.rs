//! Engine facade
//!
//! [`PttEngine`] is the one object applications hold: it owns the canonical
//! state, forwards commands to the platform's [`CommandSink`], and projects
//! the native event stream into typed [`PttEvent`]s. There is deliberately no
//! global instance; construct one engine at process start and share it by
//! reference.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pttengine_core::{Credentials, PttEngine};
//!
//! let (native_tx, native_rx) = tokio::sync::mpsc::unbounded_channel();
//! // Platform glue keeps native_tx and feeds every native event into it.
//! let engine = PttEngine::new(Arc::new(platform_sink), native_rx);
//!
//! let mut events = engine.subscribe();
//! engine.connect(&Credentials {
//!     network: "acme".into(),
//!     username: "dispatcher7".into(),
//!     password: "hunter2".into(),
//! });
//! while let Ok(event) = events.recv().await {
//!     // react to typed events; read engine state freely
//! }
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::events::PttEvent;
use crate::router::Router;
use crate::sink::CommandSink;
use crate::state::ClientState;
use crate::types::{
    AccountStatus, Channel, ConnectionState, ConsoleSettings, Contact, HistoryVoiceMessage,
    IncomingEmergency, IncomingVoiceMessage, OutgoingEmergency, OutgoingVoiceMessage, RecentEntry,
    User,
};
use crate::directory;

/// Capacity of the application event channel. A subscriber that falls this
/// far behind observes `Lagged` and keeps going from the oldest retained
/// event.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The push-to-talk engine core.
///
/// Construction subscribes to the native event stream exactly once; the
/// subscription lives until [`PttEngine::shutdown`] or drop. All state
/// accessors return snapshots: reads are last-write-wins with respect to the
/// event stream, never transactional across fields.
pub struct PttEngine {
    pub(crate) state: Arc<RwLock<ClientState>>,
    pub(crate) sink: Arc<dyn CommandSink>,
    event_tx: RwLock<Option<broadcast::Sender<PttEvent>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl PttEngine {
    /// Create the engine over a platform sink and the native event stream.
    ///
    /// Must be called within a tokio runtime: the router pump is spawned
    /// here. The platform glue keeps the sending half of `events` and pushes
    /// every native event object into it verbatim.
    pub fn new(sink: Arc<dyn CommandSink>, events: mpsc::UnboundedReceiver<Value>) -> Self {
        let state = Arc::new(RwLock::new(ClientState::default()));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let router = Router::new(state.clone(), event_tx.clone());

        info!("starting engine event pump");
        let pump = tokio::spawn(async move {
            let mut events = events;
            while let Some(event) = events.recv().await {
                // A violation means the native layer broke its wire contract;
                // that single event is dropped, the stream continues.
                if let Err(err) = router.dispatch(&event) {
                    error!(%err, "dropping malformed native event");
                }
            }
            debug!("native event stream ended");
        });

        Self {
            state,
            sink,
            event_tx: RwLock::new(Some(event_tx)),
            pump: Mutex::new(Some(pump)),
        }
    }

    /// Subscribe to the typed event stream.
    ///
    /// After [`shutdown`](Self::shutdown) the returned receiver is already
    /// closed; re-subscribing after teardown is unsupported.
    pub fn subscribe(&self) -> broadcast::Receiver<PttEvent> {
        match &*self.event_tx.read() {
            Some(event_tx) => event_tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Tear the engine down: stop consuming native events and close every
    /// subscriber's stream. Commands may still be issued afterwards, since
    /// only the event path is severed. Idempotent.
    pub fn shutdown(&self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
        if self.event_tx.write().take().is_some() {
            info!("engine shut down");
        }
    }

    // ─── State snapshots ────────────────────────────────────────────────────

    /// Current connection lifecycle position.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.read().connection_state
    }

    /// The contact the user is interacting with, if any.
    pub fn selected_contact(&self) -> Option<Contact> {
        self.state.read().selected_contact.clone()
    }

    /// Users, sorted ascending by case-insensitive name.
    pub fn users(&self) -> Vec<User> {
        self.state.read().users.clone()
    }

    /// Channels (plain and dispatch), sorted ascending by case-insensitive
    /// name.
    pub fn channels(&self) -> Vec<Channel> {
        self.state.read().channels.clone()
    }

    /// Group conversations, sorted ascending by case-insensitive name.
    pub fn group_conversations(&self) -> Vec<Channel> {
        self.state.read().group_conversations.clone()
    }

    /// The signed-in account's availability. Only meaningful while connected.
    pub fn account_status(&self) -> Option<AccountStatus> {
        self.state.read().account_status
    }

    /// The voice message currently playing in, if any.
    pub fn incoming_voice_message(&self) -> Option<IncomingVoiceMessage> {
        self.state.read().incoming_voice_message.clone()
    }

    /// The voice message currently being sent, if any.
    pub fn outgoing_voice_message(&self) -> Option<OutgoingVoiceMessage> {
        self.state.read().outgoing_voice_message.clone()
    }

    /// The network's designated emergency channel, once a snapshot has
    /// carried it.
    pub fn emergency_channel(&self) -> Option<Channel> {
        self.state.read().emergency_channel.clone()
    }

    /// Active incoming emergencies, sorted ascending by start timestamp.
    pub fn incoming_emergencies(&self) -> Vec<IncomingEmergency> {
        self.state.read().incoming_emergencies.clone()
    }

    /// The emergency this device raised, if any.
    pub fn outgoing_emergency(&self) -> Option<OutgoingEmergency> {
        self.state.read().outgoing_emergency.clone()
    }

    /// Latest-interaction rows, newest projection the native layer sent.
    pub fn recents(&self) -> Vec<RecentEntry> {
        self.state.read().recents.clone()
    }

    /// The stored voice message currently playing back, if any.
    pub fn history_voice_message(&self) -> Option<HistoryVoiceMessage> {
        self.state.read().history_voice_message.clone()
    }

    /// Server-side console settings. Stale unless connected.
    pub fn console_settings(&self) -> Option<ConsoleSettings> {
        self.state.read().console_settings
    }

    // ─── Indexed lookups ────────────────────────────────────────────────────

    /// Find a user by case-insensitive name.
    pub fn get_user(&self, name: &str) -> Option<User> {
        directory::sorted_find(&self.state.read().users, name).cloned()
    }

    /// Find a channel (plain or dispatch) by case-insensitive name.
    pub fn get_channel(&self, name: &str) -> Option<Channel> {
        directory::sorted_find(&self.state.read().channels, name).cloned()
    }

    /// Find a group conversation by case-insensitive name.
    pub fn get_group_conversation(&self, name: &str) -> Option<Channel> {
        directory::sorted_find(&self.state.read().group_conversations, name).cloned()
    }
}

impl Drop for PttEngine {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}
