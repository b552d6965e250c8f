//! GPIO / peripheral pin assignments for the showcase board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// LED strip (SK6812 RGBW, RMT channel 0)
// ---------------------------------------------------------------------------

pub const LED_STRIP_GPIO: i32 = 47;

// ---------------------------------------------------------------------------
// TFT (ST7789 170x320, SPI2)
// ---------------------------------------------------------------------------

pub const TFT_CS_GPIO: i32 = 10;
pub const TFT_DC_GPIO: i32 = 14;
pub const TFT_RST_GPIO: i32 = 18;
pub const TFT_SCLK_GPIO: i32 = 12;
pub const TFT_MOSI_GPIO: i32 = 11;
/// LEDC PWM output; held LOW through deep power-off.
pub const TFT_BACKLIGHT_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// Rotary encoder (PCNT unit 0) and its push button
// ---------------------------------------------------------------------------

pub const ENCODER_A_GPIO: i32 = 15;
pub const ENCODER_B_GPIO: i32 = 16;
/// Active LOW, internal pull-up.
pub const ENCODER_BUTTON_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Mode button (active LOW, internal pull-up)
// ---------------------------------------------------------------------------

pub const MODE_BUTTON_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PN532 NFC reader (I2C0)
// ---------------------------------------------------------------------------

pub const NFC_SDA_GPIO: i32 = 8;
pub const NFC_SCL_GPIO: i32 = 13;
pub const NFC_I2C_FREQ_HZ: u32 = 100_000;
