//! Mock hardware for integration tests.
//!
//! Time only moves when the code under test calls `delay_ms`, so the
//! blocking loops (menus, NFC read, confirmation flash) run instantly and
//! deterministically.  Inputs come from a timeline: each entry fires once
//! the clock reaches its timestamp, the next time an input is sampled.
//! Every display and strip call is recorded.

#![allow(dead_code)]

use vitrine::adapters::nvs::{NvsAdapter, NvsSettingsStore};
use vitrine::app::events::DeviceEvent;
use vitrine::app::ports::{
    Clock, ConfigError, DisplayPort, EventSink, InputPort, LedStripPort, MiniatureRecord, NfcError, NfcPort,
    PowerPort, SettingsStore, TagUid,
};
use vitrine::app::service::ModeManager;
use vitrine::config::{DeviceSettings, NUM_LEDS};
use vitrine::drivers::led_patterns::Rgbw;

// ── Recorded calls ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Options {
        options: Vec<String>,
        focus: usize,
        selected: Option<usize>,
        footer: Option<String>,
    },
    Miniature(usize),
    Mode(String, String),
    Info(String, String, String, String),
    Backlight(bool),
    BacklightPct(u8),
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Turn(i64),
    EncoderButton(bool),
    ModeButton(bool),
}

/// How long a scripted click holds the button down.
pub const CLICK_MS: u64 = 150;
/// How long a scripted long press holds the button down.
pub const HOLD_MS: u64 = 1_000;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub now: u64,
    script: Vec<(u64, Input)>,
    count: i64,
    encoder_down: bool,
    mode_down: bool,

    pub display: Vec<DisplayCall>,

    pub pixels: [Rgbw; NUM_LEDS],
    pub brightness: u8,
    pub frames: Vec<[Rgbw; NUM_LEDS]>,

    pub nfc_ready: bool,
    tag: Option<(u64, Result<MiniatureRecord, NfcError>)>,

    pub power_offs: u32,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            now: 0,
            script: Vec::new(),
            count: 0,
            encoder_down: false,
            mode_down: false,
            display: Vec::new(),
            pixels: [Rgbw::OFF; NUM_LEDS],
            brightness: 0,
            frames: Vec::new(),
            nfc_ready: true,
            tag: None,
            power_offs: 0,
        }
    }

    fn at(&mut self, t: u64, input: Input) {
        self.script.push((t, input));
        self.script.sort_by_key(|(t, _)| *t);
    }

    /// Rotate by `detents` (two raw counts each) at `t`.
    pub fn turn_at(&mut self, t: u64, detents: i64) -> &mut Self {
        self.at(t, Input::Turn(detents));
        self
    }

    pub fn click_at(&mut self, t: u64) -> &mut Self {
        self.at(t, Input::EncoderButton(true));
        self.at(t + CLICK_MS, Input::EncoderButton(false));
        self
    }

    pub fn long_press_at(&mut self, t: u64) -> &mut Self {
        self.at(t, Input::EncoderButton(true));
        self.at(t + HOLD_MS, Input::EncoderButton(false));
        self
    }

    pub fn mode_click_at(&mut self, t: u64) -> &mut Self {
        self.at(t, Input::ModeButton(true));
        self.at(t + CLICK_MS, Input::ModeButton(false));
        self
    }

    /// A tag enters the field at `t` and stays there.
    pub fn present_tag_at(&mut self, t: u64, content: Result<MiniatureRecord, NfcError>) -> &mut Self {
        self.tag = Some((t, content));
        self
    }

    fn apply_script(&mut self) {
        while let Some(&(t, input)) = self.script.first() {
            if t > self.now {
                break;
            }
            self.script.remove(0);
            match input {
                Input::Turn(d) => self.count += 2 * d,
                Input::EncoderButton(down) => self.encoder_down = down,
                Input::ModeButton(down) => self.mode_down = down,
            }
        }
    }

    // ── Query helpers ─────────────────────────────────────────

    pub fn last_display(&self) -> Option<&DisplayCall> {
        self.display
            .iter()
            .rev()
            .find(|c| !matches!(c, DisplayCall::Backlight(_) | DisplayCall::BacklightPct(_)))
    }

    pub fn option_screens(&self) -> Vec<(Vec<String>, usize, Option<usize>)> {
        self.display
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Options {
                    options,
                    focus,
                    selected,
                    ..
                } => Some((options.clone(), *focus, *selected)),
                _ => None,
            })
            .collect()
    }

    pub fn backlight_on(&self) -> Option<bool> {
        self.display.iter().rev().find_map(|c| match c {
            DisplayCall::Backlight(on) => Some(*on),
            _ => None,
        })
    }

    pub fn last_frame(&self) -> [Rgbw; NUM_LEDS] {
        self.frames.last().copied().unwrap_or([Rgbw::OFF; NUM_LEDS])
    }

    pub fn strip_dark(&self) -> bool {
        self.last_frame().iter().all(|p| *p == Rgbw::OFF)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockHardware {
    fn show_options(&mut self, options: &[&str], focus: usize, selected: Option<usize>, footer: Option<&str>) {
        self.display.push(DisplayCall::Options {
            options: options.iter().map(|s| (*s).to_owned()).collect(),
            focus,
            selected,
            footer: footer.map(str::to_owned),
        });
    }

    fn show_miniature_info(&mut self, index: usize) {
        self.display.push(DisplayCall::Miniature(index));
    }

    fn show_mode(&mut self, title: &str, message: &str) {
        self.display
            .push(DisplayCall::Mode(title.to_owned(), message.to_owned()));
    }

    fn show_info(&mut self, title: &str, subtitle: &str, author: &str, date: &str) {
        self.display.push(DisplayCall::Info(
            title.to_owned(),
            subtitle.to_owned(),
            author.to_owned(),
            date.to_owned(),
        ));
    }

    fn set_backlight(&mut self, on: bool) {
        self.display.push(DisplayCall::Backlight(on));
    }

    fn set_backlight_brightness_percent(&mut self, pct: u8) {
        self.display.push(DisplayCall::BacklightPct(pct));
    }
}

impl LedStripPort for MockHardware {
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
        self.brightness = pct;
    }

    fn show(&mut self) {
        self.frames.push(self.pixels);
    }
}

impl InputPort for MockHardware {
    fn encoder_count(&mut self) -> i64 {
        self.apply_script();
        self.count
    }

    fn encoder_button_pressed(&mut self) -> bool {
        self.apply_script();
        self.encoder_down
    }

    fn mode_button_pressed(&mut self) -> bool {
        self.apply_script();
        self.mode_down
    }
}

impl NfcPort for MockHardware {
    fn is_ready(&self) -> bool {
        self.nfc_ready
    }

    fn read_tag_uid(&mut self) -> Option<TagUid> {
        match &self.tag {
            Some((t, _)) if *t <= self.now => TagUid::from_slice(&[0x04, 0xA1, 0xB2, 0xC3]).ok(),
            _ => None,
        }
    }

    fn read_tag_context(&mut self, _uid: &TagUid) -> Result<MiniatureRecord, NfcError> {
        match &self.tag {
            Some((_, content)) => content.clone(),
            None => Err(NfcError::NoTag),
        }
    }
}

impl Clock for MockHardware {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
    }
}

impl PowerPort for MockHardware {
    fn power_off(&mut self) {
        self.power_offs += 1;
    }
}

// ── Sinks and stores ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<DeviceEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &DeviceEvent) {
        self.events.push(event.clone());
    }
}

/// Settings store whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore;

impl SettingsStore for FailingStore {
    fn load(&mut self) -> Result<DeviceSettings, ConfigError> {
        Ok(DeviceSettings::default())
    }

    fn save(&mut self, _: &DeviceSettings) -> Result<(), ConfigError> {
        Err(ConfigError::IoError)
    }

    fn reset(&mut self) -> Result<(), ConfigError> {
        Err(ConfigError::IoError)
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type Showcase = ModeManager<MockHardware, NvsSettingsStore<NvsAdapter>, RecordingSink>;

pub fn nvs_store() -> NvsSettingsStore<NvsAdapter> {
    NvsSettingsStore::new(NvsAdapter::new().expect("host NVS"))
}

/// Showcase over `hw`, started with default settings.
pub fn showcase(hw: MockHardware) -> Showcase {
    showcase_with(hw, DeviceSettings::default())
}

pub fn showcase_with(hw: MockHardware, settings: DeviceSettings) -> Showcase {
    let mut m = ModeManager::new(hw, nvs_store(), RecordingSink::default());
    m.begin(Some(settings));
    m
}

/// Run the main loop until the clock reaches `t`.
pub fn run_until<S, E>(m: &mut ModeManager<MockHardware, S, E>, t: u64)
where
    S: SettingsStore,
    E: EventSink,
{
    while m.hw().now < t {
        m.poll_inputs();
        m.service();
        m.idle_delay();
    }
}
