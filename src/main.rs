//! Vitrine firmware, main entry point.
//!
//! Hexagonal architecture around a single cooperative main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           NvsSettingsStore    LogEventSink    │
//! │  (TFT · strip · encoder ·  (SettingsStore)     RemoteBroadcast │
//! │   buttons · PN532 · power)                     (EventSink)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ModeManager (pure logic)                  │    │
//! │  │  menus · LED engine · sleep · settings                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  REMOTE_RX / REMOTE_TX channels ◀──▶ network task              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, IOPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
use esp_idf_hal::pcnt::{PcntChannel, PcntChannelConfig, PcntControlMode, PcntCountMode, PcntDriver, PinIndex};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::rmt::TxRmtDriver;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::spi::config::Config as SpiConfig;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::FromValueType;

use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, Orientation, Rotation};

use vitrine::adapters::hardware::{HardwareAdapter, PcntCounter};
use vitrine::adapters::log_sink::LogEventSink;
use vitrine::adapters::nvs::{NvsAdapter, NvsSettingsStore};
use vitrine::adapters::power::PowerAdapter;
use vitrine::adapters::time::Esp32TimeAdapter;
use vitrine::adapters::ws_sink::RemoteBroadcastSink;
use vitrine::app::service::ModeManager;
use vitrine::drivers::led_strip::LedStrip;
use vitrine::drivers::nfc::NtagReader;
use vitrine::drivers::pn532::Pn532;
use vitrine::drivers::tft_display::TftDisplay;
use vitrine::error::Error;
use vitrine::{events, pins};

const TFT_WIDTH: u16 = 170;
const TFT_HEIGHT: u16 = 320;
const TFT_COL_OFFSET: u16 = 35;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Vitrine v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let p = Peripherals::take()?;
    let pins = p.pins;

    // ── 2. LED strip (RMT) ────────────────────────────────────
    let rmt_cfg = TransmitConfig::new().clock_divider(1);
    let tx = TxRmtDriver::new(p.rmt.channel0, pins.gpio47, &rmt_cfg)?;
    let strip = LedStrip::new(tx);

    // ── 3. TFT (SPI ST7789 + LEDC backlight) ──────────────────
    let spi = SpiDriver::new(
        p.spi2,
        pins.gpio12,
        pins.gpio11,
        Option::<AnyIOPin>::None,
        &SpiDriverConfig::new(),
    )?;
    let spi_dev = SpiDeviceDriver::new(spi, Some(pins.gpio10), &SpiConfig::new().baudrate(40.MHz().into()))?;
    let dc = PinDriver::output(pins.gpio14)?;
    let rst = PinDriver::output(pins.gpio18)?;
    let buffer: &'static mut [u8; 512] = Box::leak(Box::new([0u8; 512]));
    let mut delay = Delay::new_default();
    let panel = mipidsi::Builder::new(ST7789, SpiInterface::new(spi_dev, dc, buffer))
        .reset_pin(rst)
        .display_size(TFT_WIDTH, TFT_HEIGHT)
        .display_offset(TFT_COL_OFFSET, 0)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .invert_colors(ColorInversion::Inverted)
        .init(&mut delay)
        .map_err(|_| Error::Init("display"))?;

    let ledc_timer = LedcTimerDriver::new(p.ledc.timer0, &TimerConfig::new().frequency(5.kHz().into()))?;
    let backlight = LedcDriver::new(p.ledc.channel0, ledc_timer, pins.gpio19)?;
    let display = TftDisplay::new(panel, backlight);

    // ── 4. Encoder (PCNT) + buttons ───────────────────────────
    let mut pcnt = PcntDriver::new(
        p.pcnt0,
        Some(pins.gpio15),
        Some(pins.gpio16),
        Option::<AnyInputPin>::None,
        Option::<AnyInputPin>::None,
    )?;
    pcnt.channel_config(
        PcntChannel::Channel0,
        PinIndex::Pin0,
        PinIndex::Pin1,
        &PcntChannelConfig {
            lctrl_mode: PcntControlMode::Reverse,
            hctrl_mode: PcntControlMode::Keep,
            pos_mode: PcntCountMode::Decrement,
            neg_mode: PcntCountMode::Increment,
            counter_h_lim: i16::MAX,
            counter_l_lim: i16::MIN,
        },
    )?;
    pcnt.set_filter_value(1023)?;
    pcnt.filter_enable()?;
    pcnt.counter_pause()?;
    pcnt.counter_clear()?;
    pcnt.counter_resume()?;

    let mut encoder_button = PinDriver::input(pins.gpio17.downgrade())?;
    encoder_button.set_pull(Pull::Up)?;
    let mut mode_button = PinDriver::input(pins.gpio9.downgrade())?;
    mode_button.set_pull(Pull::Up)?;

    // ── 5. NFC (PN532 over I2C) ───────────────────────────────
    let i2c = I2cDriver::new(
        p.i2c0,
        pins.gpio8,
        pins.gpio13,
        &I2cConfig::new().baudrate(pins::NFC_I2C_FREQ_HZ.Hz().into()),
    )?;
    let mut pn532 = Pn532::new(i2c, Delay::new_default());
    let nfc = match pn532.begin() {
        Ok(version) => {
            info!("PN532 firmware 0x{:08X}", version);
            NtagReader::new(pn532)
        }
        Err(e) => {
            warn!("NFC init failed ({}), Add Mini disabled", e);
            NtagReader::unavailable()
        }
    };

    // ── 6. Settings store ─────────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), settings will not persist", e);
            NvsAdapter::default()
        }
    };
    let store = NvsSettingsStore::new(nvs);

    // ── 7. Assemble and start ─────────────────────────────────
    let hw = HardwareAdapter::new(
        display,
        strip,
        PcntCounter::new(pcnt),
        encoder_button,
        mode_button,
        nfc,
        Esp32TimeAdapter::new(),
        PowerAdapter::new(),
    );
    let sinks = (LogEventSink::new(), RemoteBroadcastSink::new());
    let mut showcase = ModeManager::new(hw, store, sinks);
    showcase.begin(None);

    // ── 8. Main loop ──────────────────────────────────────────
    loop {
        showcase.poll_inputs();

        while let Some(msg) = events::next_remote() {
            if let Some(reply) = showcase.handle_remote_text(&msg.text)
                && !events::publish_remote(msg.client_id, &reply)
            {
                warn!("WS: reply to client {} dropped", msg.client_id);
            }
        }

        showcase.service();
        showcase.idle_delay();
    }
}
