//! Port traits, the hexagonal boundary between showcase logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ModeManager (domain)
//! ```
//!
//! Driven adapters (display, LED strip, encoder, NFC, storage, event sinks)
//! implement these traits.  The [`ModeManager`](super::service::ModeManager)
//! consumes them via generics, so the domain core never touches hardware
//! directly and runs unchanged against the test doubles.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::DeviceSettings;
use crate::drivers::led_patterns::Rgbw;

// ───────────────────────────────────────────────────────────────
// Display port (domain → TFT)
// ───────────────────────────────────────────────────────────────

/// Text-level screen operations.  Pixel layout is the adapter's business.
pub trait DisplayPort {
    /// Render a list of options.  `focus` is highlighted; `selected`, when
    /// present, carries the current-value checkmark.
    fn show_options(
        &mut self,
        options: &[&str],
        focus: usize,
        selected: Option<usize>,
        footer: Option<&str>,
    );

    /// Draw the catalogue card for the miniature at `index`.
    fn show_miniature_info(&mut self, index: usize);

    /// Full-screen title + message.
    fn show_mode(&mut self, title: &str, message: &str);

    /// Four-line info card (name, team, designer, painted date).
    fn show_info(&mut self, title: &str, subtitle: &str, author: &str, date: &str);

    fn set_backlight(&mut self, on: bool);

    fn set_backlight_brightness_percent(&mut self, pct: u8);
}

// ───────────────────────────────────────────────────────────────
// LED strip port (domain → pixel buffer)
// ───────────────────────────────────────────────────────────────

/// Buffered addressable strip.  Writes are staged until [`show`](Self::show).
pub trait LedStripPort {
    fn led_count(&self) -> usize;

    /// Stage one pixel.  Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, colour: Rgbw);

    /// Stage one pixel as pure white at `level` (0–255).
    fn set_pixel_white(&mut self, index: usize, level: u8) {
        self.set_pixel(index, Rgbw::white(level));
    }

    /// Stage every pixel.
    fn fill(&mut self, colour: Rgbw);

    /// Global brightness, 0–100 %.
    fn set_brightness(&mut self, pct: u8);

    /// Push staged pixels to the strip.
    fn show(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Input port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw input levels.  Debouncing and decoding live in the domain.
pub trait InputPort {
    /// Raw quadrature count (two counts per detent).
    fn encoder_count(&mut self) -> i64;

    /// Encoder push button level, `true` while pressed.
    fn encoder_button_pressed(&mut self) -> bool;

    /// Mode button level, `true` while pressed.
    fn mode_button_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// NFC port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// ISO14443A UID, 4 or 7 bytes.
pub type TagUid = Vec<u8, 7>;

/// What a miniature's tag says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniatureRecord {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub team: String,
    #[serde(default = "unknown", rename = "designBy")]
    pub design_by: String,
    #[serde(default = "unknown")]
    pub painted: String,
}

fn unknown() -> String {
    String::from("Unknown")
}

pub trait NfcPort {
    /// `false` when the reader failed to initialise.
    fn is_ready(&self) -> bool;

    /// Poll for a tag in the field.  Non-blocking beyond one reader transaction.
    fn read_tag_uid(&mut self) -> Option<TagUid>;

    /// Read and decode the tag's JSON record.
    fn read_tag_context(&mut self, uid: &TagUid) -> Result<MiniatureRecord, NfcError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block the calling task.  This is the only suspension point the
    /// showcase loops use.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Power port
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Best-effort peripheral shutdown followed by deep sleep with no wake
    /// source.  Does not return on the device.
    fn power_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / WebSocket)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DeviceEvent`](super::events::DeviceEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// WebSocket broadcast, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DeviceEvent);
}

/// Fan out to two sinks, left first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::DeviceEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Settings port (domain ↔ persisted settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`DeviceSettings`].
///
/// Implementations fill absent keys with defaults and return sanitized
/// values; `save` never rejects a value, it stores what it is given.
pub trait SettingsStore {
    fn load(&mut self) -> Result<DeviceSettings, ConfigError>;

    fn save(&mut self, settings: &DeviceSettings) -> Result<(), ConfigError>;

    /// Erase every persisted field so the next `load` yields defaults.
    fn reset(&mut self) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (settings store ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic, with no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;

    /// Drop every key in `namespace`.
    fn erase_namespace(&mut self, namespace: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Hardware bundle
// ───────────────────────────────────────────────────────────────

/// Everything the mode manager drives, as one generic parameter.
pub trait Hardware: DisplayPort + LedStripPort + InputPort + NfcPort + Clock + PowerPort {}

impl<T> Hardware for T where T: DisplayPort + LedStripPort + InputPort + NfcPort + Clock + PowerPort {}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A stored value failed to decode.
    Corrupted,
    /// A value could not be encoded for storage.
    Encode,
    /// A value failed validation.  The `&'static str` names the field.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`NfcPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcError {
    /// Reader did not answer at boot.
    NotReady,
    /// No tag in the field.
    NoTag,
    /// A page read failed mid-transfer.
    ReadFailed,
    /// Tag memory holds no `{ … }` block.
    NoPayload,
    /// The JSON block did not decode.
    Parse,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Full => Self::StorageFull,
            StorageError::NotFound | StorageError::IoError => Self::IoError,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::Encode => write!(f, "encode failed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for NfcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "reader not ready"),
            Self::NoTag => write!(f, "no tag detected"),
            Self::ReadFailed => write!(f, "tag read failed"),
            Self::NoPayload => write!(f, "no JSON payload"),
            Self::Parse => write!(f, "payload parse error"),
        }
    }
}
