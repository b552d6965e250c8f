//! Hardware adapter, which bridges real peripherals to the domain port traits.
//!
//! Owns the display, the LED strip, the encoder counter, both buttons,
//! the NFC reader, the clock and the power switch, and exposes them as one
//! [`Hardware`](crate::app::ports::Hardware) bundle.  This is the only
//! module in the system that touches input pins directly.  On non-espidf
//! targets every part can be a simulation or a test double.

use embedded_hal::digital::InputPin;

use crate::app::ports::{
    Clock, DisplayPort, InputPort, LedStripPort, MiniatureRecord, NfcError, NfcPort, PowerPort, TagUid,
};
use crate::drivers::led_patterns::Rgbw;
use crate::drivers::led_strip::LedStrip;

use super::power::PowerAdapter;
use super::time::Esp32TimeAdapter;

/// Source of the raw quadrature count.
pub trait QuadratureCounter {
    fn count(&mut self) -> i64;
}

/// Concrete adapter that combines all hardware behind port traits.
///
/// Buttons are wired active-low with pull-ups.
pub struct HardwareAdapter<D, Q, B, N> {
    display: D,
    strip: LedStrip,
    encoder: Q,
    encoder_button: B,
    mode_button: B,
    nfc: N,
    clock: Esp32TimeAdapter,
    power: PowerAdapter,
}

impl<D, Q, B, N> HardwareAdapter<D, Q, B, N>
where
    D: DisplayPort,
    Q: QuadratureCounter,
    B: InputPin,
    N: NfcPort,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        display: D,
        strip: LedStrip,
        encoder: Q,
        encoder_button: B,
        mode_button: B,
        nfc: N,
        clock: Esp32TimeAdapter,
        power: PowerAdapter,
    ) -> Self {
        Self {
            display,
            strip,
            encoder,
            encoder_button,
            mode_button,
            nfc,
            clock,
            power,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn strip(&self) -> &LedStrip {
        &self.strip
    }

    pub fn power(&self) -> &PowerAdapter {
        &self.power
    }

    fn is_low(pin: &mut B) -> bool {
        // A read error counts as released.
        pin.is_low().unwrap_or(false)
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl<D: DisplayPort, Q, B, N> DisplayPort for HardwareAdapter<D, Q, B, N> {
    fn show_options(&mut self, options: &[&str], focus: usize, selected: Option<usize>, footer: Option<&str>) {
        self.display.show_options(options, focus, selected, footer);
    }

    fn show_miniature_info(&mut self, index: usize) {
        self.display.show_miniature_info(index);
    }

    fn show_mode(&mut self, title: &str, message: &str) {
        self.display.show_mode(title, message);
    }

    fn show_info(&mut self, title: &str, subtitle: &str, author: &str, date: &str) {
        self.display.show_info(title, subtitle, author, date);
    }

    fn set_backlight(&mut self, on: bool) {
        self.display.set_backlight(on);
    }

    fn set_backlight_brightness_percent(&mut self, pct: u8) {
        self.display.set_backlight_brightness_percent(pct);
    }
}

// ── LedStripPort ──────────────────────────────────────────────

impl<D, Q, B, N> LedStripPort for HardwareAdapter<D, Q, B, N> {
    fn led_count(&self) -> usize {
        self.strip.led_count()
    }

    fn set_pixel(&mut self, index: usize, colour: Rgbw) {
        self.strip.set_pixel(index, colour);
    }

    fn fill(&mut self, colour: Rgbw) {
        self.strip.fill(colour);
    }

    fn set_brightness(&mut self, pct: u8) {
        self.strip.set_brightness(pct);
    }

    fn show(&mut self) {
        self.strip.show();
    }
}

// ── InputPort ─────────────────────────────────────────────────

impl<D, Q, B, N> InputPort for HardwareAdapter<D, Q, B, N>
where
    D: DisplayPort,
    Q: QuadratureCounter,
    B: InputPin,
    N: NfcPort,
{
    fn encoder_count(&mut self) -> i64 {
        self.encoder.count()
    }

    fn encoder_button_pressed(&mut self) -> bool {
        Self::is_low(&mut self.encoder_button)
    }

    fn mode_button_pressed(&mut self) -> bool {
        Self::is_low(&mut self.mode_button)
    }
}

// ── NfcPort ───────────────────────────────────────────────────

impl<D, Q, B, N: NfcPort> NfcPort for HardwareAdapter<D, Q, B, N> {
    fn is_ready(&self) -> bool {
        self.nfc.is_ready()
    }

    fn read_tag_uid(&mut self) -> Option<TagUid> {
        self.nfc.read_tag_uid()
    }

    fn read_tag_context(&mut self, uid: &TagUid) -> Result<MiniatureRecord, NfcError> {
        self.nfc.read_tag_context(uid)
    }
}

// ── Clock / PowerPort ─────────────────────────────────────────

impl<D, Q, B, N> Clock for HardwareAdapter<D, Q, B, N> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}

impl<D, Q, B, N> PowerPort for HardwareAdapter<D, Q, B, N> {
    fn power_off(&mut self) {
        self.power.power_off();
    }
}

// ── PCNT quadrature counter (device only) ─────────────────────

/// Extends the 16-bit PCNT counter to `i64` by accumulating wrapping
/// deltas between reads.
#[cfg(target_os = "espidf")]
pub struct PcntCounter {
    driver: esp_idf_hal::pcnt::PcntDriver<'static>,
    last: i16,
    total: i64,
}

#[cfg(target_os = "espidf")]
impl PcntCounter {
    pub fn new(driver: esp_idf_hal::pcnt::PcntDriver<'static>) -> Self {
        Self {
            driver,
            last: 0,
            total: 0,
        }
    }
}

#[cfg(target_os = "espidf")]
impl QuadratureCounter for PcntCounter {
    fn count(&mut self) -> i64 {
        match self.driver.get_counter_value() {
            Ok(v) => {
                self.total += i64::from(v.wrapping_sub(self.last));
                self.last = v;
            }
            Err(e) => log::warn!("PCNT read failed: {:?}", e),
        }
        self.total
    }
}
