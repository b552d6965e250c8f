//! Showcase orchestrator, the hexagonal core.
//!
//! [`ModeManager`] owns the hardware bundle, the settings store and the
//! event sink, plus every piece of UI state: encoder decoder, mode-button
//! debouncer, LED animation engine, persisted settings, sleep and
//! maintenance flags.  One instance lives in the main task.
//!
//! ```text
//!  InputPort ──▶ ┌───────────────────────────┐ ──▶ DisplayPort
//!                │        ModeManager        │ ──▶ LedStripPort
//!    NfcPort ──▶ │ menus · sleep · settings  │ ──▶ EventSink
//!                └───────────────────────────┘ ◀─▶ SettingsStore
//! ```
//!
//! The main loop calls, in order: [`poll_inputs`](ModeManager::poll_inputs),
//! [`handle_remote_text`](ModeManager::handle_remote_text) for each queued
//! frame, [`service`](ModeManager::service), then
//! [`idle_delay`](ModeManager::idle_delay).

use log::{debug, info, warn};

use crate::config::{
    DEFERRED_SAVE_DELAY_MS, DeviceSettings, HOLD_ADJUST_STEP_MS, MAX_MINIATURES, NFC_READ_TIMEOUT_MS, POLL_DELAY_MS,
    clamp_percent, str_or_empty,
};
use crate::drivers::button::ButtonDebouncer;
use crate::drivers::encoder::EncoderInput;
use crate::drivers::led_patterns::{LedAnimationEngine, LightingPattern};

use super::commands::{ParsedRemote, RemoteCommand, RemoteReply, parse_remote};
use super::events::{DeviceEvent, TagReadOutcome};
use super::menu::MenuError;
use super::modes::{MAX_MODES, ModeDef, REGISTRY};
use super::ports::{ConfigError, EventSink, Hardware, SettingsStore};

/// Long-press brightness ramp state.
#[derive(Debug, Clone, Copy, Default)]
struct HoldAdjust {
    active: bool,
    increasing: bool,
    last_step_ms: u64,
}

// ───────────────────────────────────────────────────────────────
// ModeManager
// ───────────────────────────────────────────────────────────────

pub struct ModeManager<H, S, E> {
    pub(crate) hw: H,
    store: S,
    sink: E,
    pub(crate) encoder: EncoderInput,
    pub(crate) mode_button: ButtonDebouncer,
    pub(crate) leds: LedAnimationEngine,
    settings: DeviceSettings,
    pub(crate) registry: &'static [ModeDef],

    sleeping: bool,
    powered_off: bool,
    maintenance: bool,
    last_activity_ms: u64,
    /// Deadline of the coalesced last-miniature write.
    pending_save_due: Option<u64>,
    hold: HoldAdjust,
    /// Set while a press that woke the device is still held.
    swallow_release: bool,
    /// Leave the current screen in place when the menu closes.
    pub(crate) keep_screen: bool,
}

impl<H, S, E> ModeManager<H, S, E>
where
    H: Hardware,
    S: SettingsStore,
    E: EventSink,
{
    /// Construct with the built-in mode registry.
    ///
    /// Does **not** touch the hardware. Call [`begin`](Self::begin) next.
    pub fn new(hw: H, store: S, sink: E) -> Self {
        Self::with_registry(hw, store, sink, &REGISTRY)
    }

    pub fn with_registry(hw: H, store: S, sink: E, registry: &'static [ModeDef]) -> Self {
        let seed = (hw.now_ms() as u32) ^ 0x5EED_1234;
        Self {
            hw,
            store,
            sink,
            encoder: EncoderInput::new(),
            mode_button: ButtonDebouncer::new(),
            leds: LedAnimationEngine::new(seed),
            settings: DeviceSettings::default(),
            registry,
            sleeping: false,
            powered_off: false,
            maintenance: false,
            last_activity_ms: 0,
            pending_save_due: None,
            hold: HoldAdjust {
                increasing: true,
                ..HoldAdjust::default()
            },
            swallow_release: false,
            keep_screen: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load (or adopt) settings, push them to the hardware and show the
    /// restored miniature in focus.
    pub fn begin(&mut self, initial: Option<DeviceSettings>) {
        self.settings = match initial {
            Some(s) => s.sanitized(),
            None => match self.store.load() {
                Ok(s) => s.sanitized(),
                Err(e) => {
                    warn!("Settings load failed ({}), using defaults", e);
                    DeviceSettings::default()
                }
            },
        };

        self.apply_settings_to_hardware();

        let index = usize::from(self.settings.last_miniature_index);
        self.encoder.set_current_index(index);
        self.encoder.sync_raw(self.hw.encoder_count());
        self.last_activity_ms = self.hw.now_ms();

        self.hw.show_miniature_info(index);
        self.leds.set_focus_mode(&mut self.hw, index, false);

        self.sink.emit(&DeviceEvent::Started { index });
        info!(
            "Showcase started at slot {} (sleep {} min, LED {}%)",
            index, self.settings.sleep_timeout_min, self.settings.led_brightness_pct
        );
    }

    fn apply_settings_to_hardware(&mut self) {
        self.hw.set_backlight_brightness_percent(self.settings.backlight_pct);
        self.hw.set_backlight(true);
        self.leds
            .set_led_brightness_percent(&mut self.hw, self.settings.led_brightness_pct);
        self.leds
            .set_standby_brightness_percent(self.settings.standby_brightness_pct);
        self.leds.set_ambient_random_speed(
            self.settings.ambient_random_frame_ms,
            self.settings.ambient_random_step,
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Sample inputs and act on them.  May block inside a menu, the
    /// confirmation flash or the NFC read loop.
    pub fn poll_inputs(&mut self) {
        if self.powered_off {
            return;
        }
        let now = self.hw.now_ms();
        self.sample_buttons(now);
        let raw = self.hw.encoder_count();

        if self.sleeping {
            self.poll_while_sleeping(raw);
            return;
        }

        if self.swallow_release {
            if self.encoder.is_button_held() {
                let _ = self.encoder.take_long_press();
            } else {
                self.encoder.clear_pending();
                self.swallow_release = false;
            }
        }

        if let Some(index) = self.encoder.poll_movement(raw) {
            self.on_rotate(index, now);
        }

        if self.encoder.take_press() {
            self.touch();
            self.sink.emit(&DeviceEvent::EncoderPress {
                index: self.encoder.current_index(),
                timestamp_ms: now,
            });
        }

        if self.encoder.take_long_press() {
            self.touch();
            self.hold.active = true;
            self.hold.last_step_ms = now;
            debug!("Hold adjust started ({})", if self.hold.increasing { "up" } else { "down" });
        }
        self.service_hold_adjust(now);

        if self.encoder.take_short_press() {
            self.touch();
            if !self.leds.is_ambient_active() {
                let index = self.encoder.current_index();
                self.leds.set_selected_mode(&mut self.hw, index);
            }
        }

        if self.mode_button.take_press() {
            self.touch();
            self.open_main_menu();
        }
    }

    /// Time-driven work: animation frame, deferred save, auto-sleep.
    pub fn service(&mut self) {
        if self.powered_off {
            return;
        }
        let now = self.hw.now_ms();
        if !self.sleeping {
            self.leds.update(&mut self.hw, now);
        }
        self.tick();
        self.check_auto_sleep(now);
    }

    /// Flush the coalesced last-miniature write once its deadline passes.
    pub fn tick(&mut self) {
        if let Some(due) = self.pending_save_due
            && self.hw.now_ms() >= due
        {
            let _ = self.persist();
        }
    }

    /// The main loop's 10 ms yield.
    pub fn idle_delay(&mut self) {
        self.hw.delay_ms(POLL_DELAY_MS);
    }

    pub(crate) fn sample_buttons(&mut self, now: u64) {
        let encoder_down = self.hw.encoder_button_pressed();
        let mode_down = self.hw.mode_button_pressed();
        self.encoder.update_button(encoder_down, now);
        self.mode_button.update(mode_down, now);
    }

    fn poll_while_sleeping(&mut self, raw: i64) {
        let index = self.encoder.current_index();
        let moved = self.encoder.poll_movement(raw).is_some();
        let pressed = self.encoder.poll_button_events().any();
        let mode = self.mode_button.take_press();
        if !(moved || pressed || mode) {
            return;
        }
        // The waking input only wakes; the showcase stays where it was.
        self.encoder.set_current_index(index);
        self.encoder.clear_pending();
        self.mode_button.clear_pending();
        self.swallow_release = self.encoder.is_button_held();
        self.wake_from_sleep();
    }

    fn on_rotate(&mut self, index: usize, now: u64) {
        self.touch();
        self.set_last_miniature_index(index);
        self.hw.show_miniature_info(index);
        if let LightingPattern::Focus { blend_standby, .. } = self.leds.pattern() {
            self.leds.set_focus_mode(&mut self.hw, index, blend_standby);
        } else if !self.leds.is_ambient_active() {
            self.leds.set_focus_mode(&mut self.hw, index, false);
        }
        self.sink.emit(&DeviceEvent::EncoderRotate {
            index,
            timestamp_ms: now,
        });
        self.sink.emit(&DeviceEvent::MiniatureShown {
            index,
            timestamp_ms: now,
        });
    }

    /// Ramp the LED brightness 1 % per step while the encoder button stays
    /// down after a long press.  Persists once on release and flips the
    /// direction for the next hold.
    fn service_hold_adjust(&mut self, now: u64) {
        if !self.hold.active {
            return;
        }
        if !self.encoder.is_button_held() {
            self.hold.active = false;
            self.hold.increasing = !self.hold.increasing;
            let _ = self.encoder.take_short_press();
            let pct = self.leds.led_brightness_percent();
            if self.settings.led_brightness_pct != pct {
                self.settings.led_brightness_pct = pct;
                if self.persist().is_err() {
                    self.show_save_failed();
                }
            }
            info!("Hold adjust done at {}%", pct);
            return;
        }
        if now.saturating_sub(self.hold.last_step_ms) < HOLD_ADJUST_STEP_MS {
            return;
        }
        self.hold.last_step_ms = now;
        self.touch();
        let pct = self.leds.led_brightness_percent();
        let next = if self.hold.increasing {
            clamp_percent(pct.saturating_add(1))
        } else {
            pct.saturating_sub(1)
        };
        if next != pct {
            self.leds.set_led_brightness_percent(&mut self.hw, next);
        }
    }

    fn touch(&mut self) {
        self.last_activity_ms = self.hw.now_ms();
    }

    // ── Menus ─────────────────────────────────────────────────

    fn open_main_menu(&mut self) {
        self.leds.pause();
        if let Err(e) = self.select_main_mode() {
            warn!("Main menu unavailable: {}", e);
        }
        self.after_menu();
    }

    /// Put the showcase back the way a menu found it.
    fn after_menu(&mut self) {
        self.encoder.clear_pending();
        self.mode_button.clear_pending();
        self.encoder.sync_raw(self.hw.encoder_count());
        if self.sleeping || self.powered_off {
            self.keep_screen = false;
            return;
        }
        self.leds.resume();
        let index = self.encoder.current_index();
        if let LightingPattern::Focus { blend_standby, .. } = self.leds.pattern() {
            self.leds.set_focus_mode(&mut self.hw, index, blend_standby);
        }
        if core::mem::take(&mut self.keep_screen) {
            debug!("Keeping result screen");
        } else {
            self.hw.show_miniature_info(index);
        }
        self.touch();
    }

    /// Top-level menu: every registered mode plus a trailing "Back".
    ///
    /// Focus starts on the last chosen mode.  Returns the picked mode
    /// index after its options ran, `None` on Back or cancel.
    pub fn select_main_mode(&mut self) -> Result<Option<usize>, MenuError> {
        let registry = self.registry;
        if registry.len() > MAX_MODES {
            self.hw.show_mode("Error", "Too many modes");
            self.keep_screen = true;
            return Err(MenuError::TooManyModes);
        }

        let mut labels: heapless::Vec<&str, { MAX_MODES + 1 }> = heapless::Vec::new();
        for mode in registry {
            labels.push(mode.name).map_err(|_| MenuError::TooManyModes)?;
        }
        labels.push("Back").map_err(|_| MenuError::TooManyModes)?;

        let back = registry.len();
        let initial = self
            .settings
            .last_main_mode
            .map(usize::from)
            .filter(|m| *m < back)
            .unwrap_or(back);

        let Some(choice) = self.select_mode(&labels, initial, None, Some("Press: open  Hold: back")) else {
            return Ok(None);
        };
        if choice == back {
            return Ok(None);
        }

        self.set_last_main_mode(choice);
        self.sink.emit(&DeviceEvent::ModeSelected {
            mode: registry[choice].name,
        });
        info!("Mode selected: {}", registry[choice].name);
        self.handle_mode_options(choice)?;
        Ok(Some(choice))
    }

    pub fn num_modes(&self) -> usize {
        self.registry.len()
    }

    pub fn mode_name(&self, index: usize) -> Option<&'static str> {
        self.registry.get(index).map(|m| m.name)
    }

    // ── Sleep / power ─────────────────────────────────────────

    fn check_auto_sleep(&mut self, now: u64) {
        if self.sleeping {
            return;
        }
        if let Some(timeout) = self.settings.sleep_timeout_ms()
            && now.saturating_sub(self.last_activity_ms) >= timeout
        {
            info!("Idle for {} min, sleeping", self.settings.sleep_timeout_min);
            self.enter_sleep();
        }
    }

    /// Blank LEDs and backlight.  Any input wakes.
    pub fn enter_sleep(&mut self) {
        if self.sleeping {
            return;
        }
        if self.pending_save_due.is_some() {
            let _ = self.persist();
        }
        self.hold.active = false;
        self.leds.clear_all(&mut self.hw);
        self.hw.set_backlight(false);
        self.sleeping = true;
        self.sink.emit(&DeviceEvent::SleepEntered);
    }

    pub fn wake_from_sleep(&mut self) {
        if !self.sleeping {
            return;
        }
        self.sleeping = false;
        self.leds.resume();
        self.hw.set_backlight_brightness_percent(self.settings.backlight_pct);
        self.hw.set_backlight(true);
        let index = self.encoder.current_index();
        self.hw.show_miniature_info(index);
        self.leds.set_focus_mode(&mut self.hw, index, false);
        self.touch();
        self.sink.emit(&DeviceEvent::Woke);
        info!("Woke at slot {}", index);
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn is_powered_off(&self) -> bool {
        self.powered_off
    }

    /// Save, blank everything, then hand over to the power port.
    pub fn power_off(&mut self) {
        if self.pending_save_due.is_some() {
            let _ = self.persist();
        }
        self.sink.emit(&DeviceEvent::PoweringOff);
        info!("Powering off");
        self.leds.clear_all(&mut self.hw);
        self.hw.show_mode("Power off", "Bye");
        self.hw.set_backlight(false);
        self.powered_off = true;
        self.hw.power_off();
    }

    // ── NFC ───────────────────────────────────────────────────

    /// Poll for a tag for up to ten seconds and show what it says.
    pub fn add_new_miniature(&mut self) -> TagReadOutcome {
        self.keep_screen = true;
        if !self.hw.is_ready() {
            self.hw.show_mode("NFC Read", "Reader unavailable");
            self.sink.emit(&DeviceEvent::TagRead(TagReadOutcome::Unavailable));
            return TagReadOutcome::Unavailable;
        }

        self.hw.show_mode("NFC Read", "Place tag on reader");
        let start = self.hw.now_ms();
        let mut outcome = TagReadOutcome::NoTag;

        while self.hw.now_ms().saturating_sub(start) < NFC_READ_TIMEOUT_MS {
            if let Some(uid) = self.hw.read_tag_uid() {
                debug!("Tag UID {:02X?}", uid.as_slice());
                outcome = match self.hw.read_tag_context(&uid) {
                    Ok(record) => {
                        self.hw
                            .show_info(&record.name, &record.team, &record.design_by, &record.painted);
                        info!("Tag read: {}", record.name);
                        TagReadOutcome::Read
                    }
                    Err(e) => {
                        warn!("Tag parse failed: {}", e);
                        self.hw.show_mode("NFC Read", "Error reading tag!");
                        TagReadOutcome::ParseError
                    }
                };
                break;
            }
            self.hw.delay_ms(POLL_DELAY_MS);
        }

        if outcome == TagReadOutcome::NoTag {
            self.hw.show_mode("NFC Read", "No tag detected!");
        }
        self.touch();
        self.sink.emit(&DeviceEvent::TagRead(outcome));
        outcome
    }

    // ── Ambient shortcuts ─────────────────────────────────────

    pub fn ambient_all_lights(&mut self) {
        self.leds
            .set_ambient_all_lights(&mut self.hw, self.settings.ambient_all_pct);
    }

    pub fn ambient_random(&mut self) {
        self.leds.start_ambient_random(
            &mut self.hw,
            self.settings.ambient_random_max_pct,
            self.settings.ambient_random_density,
        );
    }

    // ── Settings ──────────────────────────────────────────────

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Write the whole settings record.  A failure is logged and emitted;
    /// the in-memory value stays applied.
    fn persist(&mut self) -> Result<(), ConfigError> {
        self.pending_save_due = None;
        match self.store.save(&self.settings) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Settings save failed: {}", e);
                self.sink.emit(&DeviceEvent::SaveFailed(e));
                Err(e)
            }
        }
    }

    /// Status screen for a settings write that did not stick.
    pub(crate) fn show_save_failed(&mut self) {
        self.hw.show_mode("Settings", "Save failed");
    }

    pub fn set_backlight_brightness_percent(&mut self, pct: u8) -> Result<(), ConfigError> {
        let pct = clamp_percent(pct);
        self.settings.backlight_pct = pct;
        self.hw.set_backlight_brightness_percent(pct);
        self.persist()
    }

    pub fn backlight_brightness_percent(&self) -> u8 {
        self.settings.backlight_pct
    }

    pub fn set_led_brightness_percent(&mut self, pct: u8) -> Result<(), ConfigError> {
        let pct = clamp_percent(pct);
        self.settings.led_brightness_pct = pct;
        self.leds.set_led_brightness_percent(&mut self.hw, pct);
        self.persist()
    }

    pub fn led_brightness_percent(&self) -> u8 {
        self.leds.led_brightness_percent()
    }

    pub fn set_standby_brightness_percent(&mut self, pct: u8) -> Result<(), ConfigError> {
        let pct = clamp_percent(pct);
        self.settings.standby_brightness_pct = pct;
        self.leds.set_standby_brightness_percent(pct);
        self.persist()
    }

    pub fn standby_brightness_percent(&self) -> u8 {
        self.settings.standby_brightness_pct
    }

    pub fn set_ambient_all_lights_brightness_percent(&mut self, pct: u8) -> Result<(), ConfigError> {
        let pct = clamp_percent(pct);
        self.settings.ambient_all_pct = pct;
        if matches!(self.leds.pattern(), LightingPattern::AmbientAll { .. }) {
            self.leds.set_ambient_all_lights(&mut self.hw, pct);
        }
        self.persist()
    }

    pub fn ambient_all_lights_brightness_percent(&self) -> u8 {
        self.settings.ambient_all_pct
    }

    pub fn set_ambient_random_max_brightness_percent(&mut self, pct: u8) -> Result<(), ConfigError> {
        self.settings.ambient_random_max_pct = clamp_percent(pct);
        self.restart_random_if_running();
        self.persist()
    }

    pub fn ambient_random_max_brightness_percent(&self) -> u8 {
        self.settings.ambient_random_max_pct
    }

    pub fn set_ambient_random_density(&mut self, density: u8) -> Result<(), ConfigError> {
        self.settings.ambient_random_density = density.max(1);
        self.restart_random_if_running();
        self.persist()
    }

    pub fn ambient_random_density(&self) -> u8 {
        self.settings.ambient_random_density
    }

    pub fn set_ambient_random_speed(&mut self, frame_ms: u16, step: u8) -> Result<(), ConfigError> {
        self.leds.set_ambient_random_speed(frame_ms, step);
        let (frame_ms, step) = self.leds.ambient_random_speed();
        self.settings.ambient_random_frame_ms = frame_ms;
        self.settings.ambient_random_step = step;
        self.persist()
    }

    pub fn ambient_random_speed(&self) -> (u16, u8) {
        (
            self.settings.ambient_random_frame_ms,
            self.settings.ambient_random_step,
        )
    }

    fn restart_random_if_running(&mut self) {
        if matches!(self.leds.pattern(), LightingPattern::AmbientRandom { .. }) {
            self.ambient_random();
        }
    }

    pub fn set_sleep_timeout_minutes(&mut self, minutes: u16) -> Result<(), ConfigError> {
        self.settings.sleep_timeout_min = minutes;
        self.touch();
        self.persist()
    }

    pub fn sleep_timeout_minutes(&self) -> u16 {
        self.settings.sleep_timeout_min
    }

    /// Record the showcase position.  The write is deferred and coalesced:
    /// each call pushes the deadline out again.
    pub fn set_last_miniature_index(&mut self, index: usize) {
        let index = if index < MAX_MINIATURES { index } else { 0 };
        self.settings.last_miniature_index = index as u8;
        self.pending_save_due = Some(self.hw.now_ms() + DEFERRED_SAVE_DELAY_MS);
    }

    pub fn last_miniature_index(&self) -> usize {
        usize::from(self.settings.last_miniature_index)
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save_due.is_some()
    }

    fn set_last_main_mode(&mut self, mode: usize) {
        let Ok(mode) = u8::try_from(mode) else {
            return;
        };
        if self.settings.last_main_mode != Some(mode) {
            self.settings.last_main_mode = Some(mode);
            let _ = self.persist();
        }
    }

    pub fn last_main_mode(&self) -> Option<usize> {
        self.settings.last_main_mode.map(usize::from)
    }

    /// Station credentials.  `None` keeps the stored passphrase.
    ///
    /// Returns `Ok(false)` and changes nothing when `ssid` does not fit.
    pub fn set_wifi_sta_config(&mut self, enabled: bool, ssid: &str, pass: Option<&str>) -> Result<bool, ConfigError> {
        if ssid.len() > self.settings.sta_ssid.capacity() {
            return Ok(false);
        }
        if let Some(p) = pass
            && p.len() > self.settings.sta_pass.capacity()
        {
            return Ok(false);
        }
        self.settings.sta_enabled = enabled;
        self.settings.sta_ssid = str_or_empty(ssid);
        if let Some(p) = pass {
            self.settings.sta_pass = str_or_empty(p);
        }
        self.persist().map(|()| true)
    }

    /// Access-point credentials.  An empty SSID is rejected; `None` keeps
    /// the stored passphrase.
    pub fn set_wifi_ap_config(&mut self, ssid: &str, pass: Option<&str>) -> Result<bool, ConfigError> {
        if ssid.is_empty() || ssid.len() > self.settings.ap_ssid.capacity() {
            return Ok(false);
        }
        if let Some(p) = pass
            && p.len() > self.settings.ap_pass.capacity()
        {
            return Ok(false);
        }
        self.settings.ap_ssid = str_or_empty(ssid);
        if let Some(p) = pass {
            self.settings.ap_pass = str_or_empty(p);
        }
        self.persist().map(|()| true)
    }

    /// Wipe persisted settings and re-apply defaults live.
    pub fn reset_persisted_settings(&mut self) -> Result<(), ConfigError> {
        self.pending_save_due = None;
        let result = self.store.reset();
        if let Err(e) = result {
            warn!("Settings reset failed: {}", e);
            self.sink.emit(&DeviceEvent::SaveFailed(e));
        }
        self.settings = DeviceSettings::default();
        self.apply_settings_to_hardware();
        info!("Settings reset to defaults");
        result
    }

    // ── Maintenance ───────────────────────────────────────────

    /// While set, remote commands are refused.
    pub fn set_maintenance(&mut self, on: bool) {
        if self.maintenance != on {
            info!("Maintenance {}", if on { "on" } else { "off" });
        }
        self.maintenance = on;
    }

    pub fn is_maintenance(&self) -> bool {
        self.maintenance
    }

    // ── Remote ────────────────────────────────────────────────

    /// Handle one inbound text frame.  Returns the reply to send back to
    /// the originating client, if any.
    pub fn handle_remote_text(&mut self, text: &str) -> Option<String> {
        if self.maintenance {
            return Some(RemoteReply::Error { error: "maintenance" }.to_json());
        }
        match parse_remote(text) {
            ParsedRemote::BadJson => Some(RemoteReply::Error { error: "bad_json" }.to_json()),
            ParsedRemote::Ignored => None,
            ParsedRemote::Command { cmd, command } => {
                self.apply_remote(command, &cmd);
                Some(RemoteReply::Ok { target: "led", cmd: &cmd }.to_json())
            }
        }
    }

    fn apply_remote(&mut self, command: RemoteCommand, cmd: &str) {
        match command {
            // A failed write still replies ok.
            RemoteCommand::Brightness(pct) => {
                if let Err(e) = self.set_led_brightness_percent(pct) {
                    warn!("Remote: brightness applied but not saved ({})", e);
                }
            }
            RemoteCommand::Clear => self.leds.clear_all(&mut self.hw),
            RemoteCommand::Pixel {
                index: Some(index),
                colour,
            } => {
                self.hw.set_pixel(index, colour);
                self.hw.show();
            }
            RemoteCommand::Pixel { index: None, .. } => {}
            RemoteCommand::Standby { brightness_pct } => {
                if let Err(e) = self.set_standby_brightness_percent(brightness_pct) {
                    warn!("Remote: standby applied but not saved ({})", e);
                }
                self.leds.set_standby_mode(&mut self.hw, brightness_pct);
            }
            RemoteCommand::Focus { index } => self.leds.set_focus_mode(&mut self.hw, index, false),
            RemoteCommand::Selected { index } => self.leds.set_selected_mode(&mut self.hw, index),
            RemoteCommand::ModeNoop => {}
            RemoteCommand::Unknown => warn!("Remote: unknown led cmd '{}'", cmd),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn current_index(&self) -> usize {
        self.encoder.current_index()
    }

    pub fn leds(&self) -> &LedAnimationEngine {
        &self.leds
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub(crate) fn emit(&mut self, event: &DeviceEvent) {
        self.sink.emit(event);
    }
}
