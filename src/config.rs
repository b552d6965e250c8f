//! Device settings and timing constants
//!
//! Everything the showcase persists across power cycles lives in
//! [`DeviceSettings`].  Values are loaded from NVS at boot, clamped by
//! [`DeviceSettings::sanitize`], and written back key-by-key by the
//! settings store whenever a setter changes them.

use heapless::String;
use serde::{Deserialize, Serialize};

// ── Geometry ──────────────────────────────────────────────────

/// Number of addressable pixels on the showcase strip.
pub const NUM_LEDS: usize = 3;
/// Number of miniature slots (one pixel per slot).
pub const MAX_MINIATURES: usize = 3;

/// Catalogue card shown for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miniature {
    pub name: &'static str,
    pub author: &'static str,
    pub date: &'static str,
}

pub const DEMO_MINIATURES: [Miniature; MAX_MINIATURES] = [
    Miniature { name: "Knight", author: "John Smith", date: "2020-01-15" },
    Miniature { name: "Dragon", author: "Maria Garcia", date: "2021-05-22" },
    Miniature { name: "Castle", author: "David Lee", date: "2022-11-03" },
];

// ── Input timing ──────────────────────────────────────────────

/// Button level must be stable this long before an edge is accepted.
pub const DEBOUNCE_MS: u64 = 50;
/// Holds at or beyond this duration are long presses.
pub const LONG_PRESS_MS: u64 = 700;
/// Largest index step accepted from a single encoder poll.
pub const MAX_STEP_PER_POLL: i64 = 4;
/// Delay between iterations of every polling loop.
pub const POLL_DELAY_MS: u32 = 10;

// ── Menu / UI timing ──────────────────────────────────────────

/// An open menu with no input for this long resolves as cancel.
pub const MENU_IDLE_TIMEOUT_MS: u64 = 30_000;
/// NFC "Add Mini" waits at most this long for a tag.
pub const NFC_READ_TIMEOUT_MS: u64 = 10_000;
/// Hold-to-adjust moves LED brightness by 1 % per step.
pub const HOLD_ADJUST_STEP_MS: u64 = 50;
/// Each colour of the selection flash is shown this long.
pub const CONFIRM_FLASH_STEP_MS: u32 = 500;
/// Pause before the sleep screen hands over to [`enter_sleep`](crate::app::service::ModeManager::enter_sleep).
pub const SLEEP_SCREEN_MS: u32 = 150;

// ── Persistence timing ────────────────────────────────────────

/// `lastMini` is written this long after the last change.
pub const DEFERRED_SAVE_DELAY_MS: u64 = 1_500;

/// Schema version stored under the `ver` key.
pub const SETTINGS_VERSION: u8 = 1;

// ── Field limits ──────────────────────────────────────────────

pub const SSID_CAPACITY: usize = 32;
pub const PASS_CAPACITY: usize = 64;
pub const MAX_RANDOM_STEP: u8 = 127;

pub type Ssid = String<SSID_CAPACITY>;
pub type Passphrase = String<PASS_CAPACITY>;

/// Persisted showcase configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    // --- Power ---
    /// Inactivity before auto-sleep, in minutes (0 = never)
    pub sleep_timeout_min: u16,

    // --- Brightness (0-100 %) ---
    pub backlight_pct: u8,
    pub led_brightness_pct: u8,
    pub standby_brightness_pct: u8,

    // --- Navigation memory ---
    pub last_miniature_index: u8,
    /// Last top-level mode picked from the main menu, if any
    pub last_main_mode: Option<u8>,

    // --- Ambient lighting ---
    pub ambient_all_pct: u8,
    pub ambient_random_max_pct: u8,
    pub ambient_random_density: u8,
    pub ambient_random_frame_ms: u16,
    pub ambient_random_step: u8,

    // --- WiFi ---
    pub sta_enabled: bool,
    pub sta_ssid: Ssid,
    pub sta_pass: Passphrase,
    pub ap_ssid: Ssid,
    pub ap_pass: Passphrase,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            sleep_timeout_min: 5,

            backlight_pct: 100,
            led_brightness_pct: 40,
            standby_brightness_pct: 30,

            last_miniature_index: 0,
            last_main_mode: None,

            ambient_all_pct: 25,
            ambient_random_max_pct: 50,
            ambient_random_density: 6,
            ambient_random_frame_ms: 40,
            ambient_random_step: 6,

            sta_enabled: true,
            sta_ssid: String::new(),
            sta_pass: String::new(),
            ap_ssid: str_or_empty("Vitrine-ESP32S3"),
            ap_pass: str_or_empty("vitrine1234"),
        }
    }
}

impl DeviceSettings {
    /// Clamp every field into its valid range.  Idempotent.
    pub fn sanitize(&mut self) {
        self.backlight_pct = clamp_percent(self.backlight_pct);
        self.led_brightness_pct = clamp_percent(self.led_brightness_pct);
        self.standby_brightness_pct = clamp_percent(self.standby_brightness_pct);
        self.ambient_all_pct = clamp_percent(self.ambient_all_pct);
        self.ambient_random_max_pct = clamp_percent(self.ambient_random_max_pct);
        self.ambient_random_density = self.ambient_random_density.max(1);
        self.ambient_random_frame_ms = self.ambient_random_frame_ms.max(1);
        self.ambient_random_step = self.ambient_random_step.clamp(1, MAX_RANDOM_STEP);
        if usize::from(self.last_miniature_index) >= MAX_MINIATURES {
            self.last_miniature_index = 0;
        }
    }

    /// Copy of `self` with [`sanitize`](Self::sanitize) applied.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Inactivity window in milliseconds, `None` when auto-sleep is off.
    pub fn sleep_timeout_ms(&self) -> Option<u64> {
        match self.sleep_timeout_min {
            0 => None,
            m => Some(u64::from(m) * 60_000),
        }
    }
}

/// Clamp a percentage to `0..=100`.
pub const fn clamp_percent(pct: u8) -> u8 {
    if pct > 100 { 100 } else { pct }
}

/// Build a heapless string, falling back to empty when `s` overflows `N`.
pub fn str_or_empty<const N: usize>(s: &str) -> String<N> {
    String::try_from(s).unwrap_or_default()
}
