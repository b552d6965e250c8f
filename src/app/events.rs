//! Outbound device events.
//!
//! The [`ModeManager`](super::service::ModeManager) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them: the log sink prints every one, the
//! WebSocket sink forwards the input-related ones to connected clients so
//! remote observers track the physical knob.

use serde::Serialize;

use super::ports::ConfigError;

/// Structured events emitted by the showcase core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// `begin()` finished; carries the restored slot.
    Started { index: usize },

    /// The encoder moved the showcase to a new slot.
    EncoderRotate { index: usize, timestamp_ms: u64 },

    /// The encoder button went down outside a menu.
    EncoderPress { index: usize, timestamp_ms: u64 },

    /// The screen now shows this slot's card.
    MiniatureShown { index: usize, timestamp_ms: u64 },

    /// A top-level mode was picked from the main menu.
    ModeSelected { mode: &'static str },

    /// A mode option was confirmed.
    OptionSelected { mode: &'static str, option: &'static str },

    SleepEntered,
    Woke,
    PoweringOff,

    /// A persistence call failed; the in-memory value stays applied.
    SaveFailed(ConfigError),

    /// Outcome of an "Add Mini" tag read.
    TagRead(TagReadOutcome),
}

/// Three-way result of the NFC read loop, plus the degraded case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagReadOutcome {
    Read,
    ParseError,
    NoTag,
    Unavailable,
}

/// Wire shape of a WebSocket broadcast.
#[derive(Debug, Serialize)]
struct Broadcast {
    #[serde(rename = "type")]
    kind: &'static str,
    event: &'static str,
    index: usize,
    timestamp: u64,
}

impl DeviceEvent {
    /// JSON text for events remote clients subscribe to, `None` for the
    /// rest.
    pub fn to_broadcast_json(&self) -> Option<String> {
        let msg = match *self {
            Self::EncoderRotate {
                index,
                timestamp_ms,
            } => Broadcast {
                kind: "encoder",
                event: "rotate",
                index,
                timestamp: timestamp_ms,
            },
            Self::EncoderPress {
                index,
                timestamp_ms,
            } => Broadcast {
                kind: "encoder",
                event: "press",
                index,
                timestamp: timestamp_ms,
            },
            Self::MiniatureShown {
                index,
                timestamp_ms,
            } => Broadcast {
                kind: "display",
                event: "miniature",
                index,
                timestamp: timestamp_ms,
            },
            _ => return None,
        };
        serde_json::to_string(&msg).ok()
    }
}
