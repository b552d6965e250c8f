//! SK6812 RGBW strip driver.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: pixels are clocked out on an RMT channel (GRBW order,
//! 800 kHz timing) when [`LedStrip::show`] is called.
//! On host/test: the frame is kept in memory and counted, nothing else.
//!
//! Pixel writes are staged in a buffer; the global brightness is applied
//! at transmit time so the staged values stay exact.

use crate::app::ports::LedStripPort;
use crate::config::{NUM_LEDS, clamp_percent};
use crate::drivers::led_patterns::{Rgbw, percent_to_level};

#[cfg(target_os = "espidf")]
use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};

#[cfg(target_os = "espidf")]
const BITS_PER_PIXEL: usize = 32;

pub struct LedStrip {
    pixels: [Rgbw; NUM_LEDS],
    brightness_pct: u8,
    shown: [Rgbw; NUM_LEDS],
    show_count: u32,
    #[cfg(target_os = "espidf")]
    tx: TxRmtDriver<'static>,
}

impl LedStrip {
    #[cfg(target_os = "espidf")]
    pub fn new(tx: TxRmtDriver<'static>) -> Self {
        Self {
            pixels: [Rgbw::OFF; NUM_LEDS],
            brightness_pct: 0,
            shown: [Rgbw::OFF; NUM_LEDS],
            show_count: 0,
            tx,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            pixels: [Rgbw::OFF; NUM_LEDS],
            brightness_pct: 0,
            shown: [Rgbw::OFF; NUM_LEDS],
            show_count: 0,
        }
    }

    /// Staged (not yet shown) value of a pixel.
    pub fn pixel(&self, index: usize) -> Option<Rgbw> {
        self.pixels.get(index).copied()
    }

    /// What the strip is physically showing, brightness applied.
    pub fn shown(&self) -> &[Rgbw; NUM_LEDS] {
        &self.shown
    }

    pub fn show_count(&self) -> u32 {
        self.show_count
    }

    pub fn brightness_percent(&self) -> u8 {
        self.brightness_pct
    }

    /// Pack one pixel as it goes on the wire: G, R, B, W, MSB first.
    pub fn wire_word(colour: Rgbw) -> u32 {
        (u32::from(colour.g) << 24)
            | (u32::from(colour.r) << 16)
            | (u32::from(colour.b) << 8)
            | u32::from(colour.w)
    }

    #[cfg(target_os = "espidf")]
    fn transmit(&mut self) {
        use core::time::Duration;

        let Ok(ticks_hz) = self.tx.counter_clock() else {
            log::warn!("LedStrip: RMT clock query failed");
            return;
        };
        let pulse = |state, ns| Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(ns));
        let (Ok(t0h), Ok(t0l), Ok(t1h), Ok(t1l)) = (
            pulse(PinState::High, 300),
            pulse(PinState::Low, 900),
            pulse(PinState::High, 600),
            pulse(PinState::Low, 600),
        ) else {
            log::warn!("LedStrip: RMT pulse setup failed");
            return;
        };

        let mut signal = FixedLengthSignal::<{ NUM_LEDS * BITS_PER_PIXEL }>::new();
        for (p, colour) in self.shown.iter().enumerate() {
            let word = Self::wire_word(*colour);
            for bit in 0..BITS_PER_PIXEL {
                let one = word & (1 << (BITS_PER_PIXEL - 1 - bit)) != 0;
                let pair = if one { (t1h, t1l) } else { (t0h, t0l) };
                if signal.set(p * BITS_PER_PIXEL + bit, &pair).is_err() {
                    return;
                }
            }
        }
        if let Err(e) = self.tx.start_blocking(&signal) {
            log::warn!("LedStrip: RMT transmit failed: {:?}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn transmit(&mut self) {}
}

#[cfg(not(target_os = "espidf"))]
impl Default for LedStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl LedStripPort for LedStrip {
    fn led_count(&self) -> usize {
        NUM_LEDS
    }

    fn set_pixel(&mut self, index: usize, colour: Rgbw) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = colour;
        }
    }

    fn fill(&mut self, colour: Rgbw) {
        self.pixels = [colour; NUM_LEDS];
    }

    fn set_brightness(&mut self, pct: u8) {
        self.brightness_pct = clamp_percent(pct);
    }

    fn show(&mut self) {
        let level = percent_to_level(self.brightness_pct);
        for (out, px) in self.shown.iter_mut().zip(self.pixels.iter()) {
            *out = px.scaled(level);
        }
        self.show_count = self.show_count.wrapping_add(1);
        self.transmit();
    }
}
