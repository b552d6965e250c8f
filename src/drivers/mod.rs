//! Peripheral drivers and input decoders.

pub mod button;
pub mod encoder;
pub mod led_patterns;
pub mod led_strip;
pub mod nfc;
pub mod pn532;
pub mod tft_display;
