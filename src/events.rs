//! Cross-task channels between the network task and the main loop.
//!
//! The WebSocket server runs in its own ESP-IDF task.  It never touches
//! showcase state directly: inbound text frames are queued on
//! [`REMOTE_RX`] and drained by the main loop between input polling and the
//! animation update; replies and broadcasts travel back on [`REMOTE_TX`].
//!
//! ```text
//! ┌──────────────┐  RemoteMessage  ┌──────────────┐
//! │  WS task     │───────────────▶│  Main loop   │
//! │  (esp-idf)   │◀───────────────│  (blocking)  │
//! └──────────────┘  RemoteMessage  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

/// Largest text frame carried across the bridge.
pub const REMOTE_TEXT_CAPACITY: usize = 256;

/// Sentinel client id for frames that go to every connected client.
pub const BROADCAST: u32 = u32::MAX;

const RX_DEPTH: usize = 8;
const TX_DEPTH: usize = 16;

/// One WebSocket text frame tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub client_id: u32,
    pub text: String<REMOTE_TEXT_CAPACITY>,
}

impl RemoteMessage {
    /// Wrap `text`, returning `None` when it exceeds the frame capacity.
    pub fn new(client_id: u32, text: &str) -> Option<Self> {
        Some(Self {
            client_id,
            text: String::try_from(text).ok()?,
        })
    }

    pub fn is_broadcast(&self) -> bool {
        self.client_id == BROADCAST
    }
}

/// Inbound frames: WS task → main loop.
pub static REMOTE_RX: Channel<CriticalSectionRawMutex, RemoteMessage, RX_DEPTH> = Channel::new();

/// Outbound frames: main loop → WS task.
pub static REMOTE_TX: Channel<CriticalSectionRawMutex, RemoteMessage, TX_DEPTH> = Channel::new();

/// Queue an inbound frame from the network side.  Drops it when the queue
/// is full, as a slow main loop must not stall the socket task.
pub fn submit_remote(client_id: u32, text: &str) -> bool {
    match RemoteMessage::new(client_id, text) {
        Some(msg) => REMOTE_RX.try_send(msg).is_ok(),
        None => false,
    }
}

/// Non-blocking receive used by the main loop.
pub fn next_remote() -> Option<RemoteMessage> {
    REMOTE_RX.try_receive().ok()
}

/// Queue an outbound frame for the network side.
pub fn publish_remote(client_id: u32, text: &str) -> bool {
    match RemoteMessage::new(client_id, text) {
        Some(msg) => REMOTE_TX.try_send(msg).is_ok(),
        None => false,
    }
}

/// Non-blocking receive used by the WS task.
pub fn next_outbound() -> Option<RemoteMessage> {
    REMOTE_TX.try_receive().ok()
}
