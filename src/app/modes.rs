//! Mode registry and option actions.
//!
//! The main menu lists [`REGISTRY`] in order.  Each mode carries a fixed
//! option list; picking an option runs its [`ModeAction`].  Value pickers
//! are nested menus with the current value checked and a trailing "Back".

use log::info;

use super::events::DeviceEvent;
use super::menu::MenuError;
use super::ports::{ConfigError, EventSink, Hardware, SettingsStore};
use super::service::ModeManager;
use crate::config::{DEMO_MINIATURES, MAX_MINIATURES, SLEEP_SCREEN_MS};

/// Upper bound on registry length.
pub const MAX_MODES: usize = 8;
/// Upper bound on options per mode.
pub const MAX_MODE_OPTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    StartNfcRead,
    BacklightBrightness,
    LedBrightness,
    StandbyBrightness,
    AmbientSpeed,
    SleepTimeout,
    PowerOff,
    ResetSettings,
    EnterSleep,
    AmbientAllLights,
    AmbientRandom,
    AmbientAllBrightness,
    AmbientRandomBrightness,
    AmbientRandomDensity,
    ViewDetails,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeOption {
    pub label: &'static str,
    pub action: ModeAction,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeDef {
    pub name: &'static str,
    pub options: &'static [ModeOption],
}

const fn opt(label: &'static str, action: ModeAction) -> ModeOption {
    ModeOption { label, action }
}

pub static REGISTRY: [ModeDef; 5] = [
    ModeDef {
        name: "Add Mini",
        options: &[opt("Start NFC Read", ModeAction::StartNfcRead)],
    },
    ModeDef {
        name: "Settings",
        options: &[
            opt("Backlight Brightness", ModeAction::BacklightBrightness),
            opt("LED Brightness", ModeAction::LedBrightness),
            opt("Standby Brightness", ModeAction::StandbyBrightness),
            opt("Speed ambient lights", ModeAction::AmbientSpeed),
            opt("Sleep timeout", ModeAction::SleepTimeout),
            opt("Power off", ModeAction::PowerOff),
            opt("Reset", ModeAction::ResetSettings),
        ],
    },
    ModeDef {
        name: "Sleep",
        options: &[opt("Enter sleep", ModeAction::EnterSleep)],
    },
    ModeDef {
        name: "Ambient Light",
        options: &[
            opt("All Lights", ModeAction::AmbientAllLights),
            opt("Random", ModeAction::AmbientRandom),
            opt("All Lights Brightness", ModeAction::AmbientAllBrightness),
            opt("Random Brightness", ModeAction::AmbientRandomBrightness),
            opt("Random Density", ModeAction::AmbientRandomDensity),
        ],
    },
    ModeDef {
        name: "Miniature Info",
        options: &[opt("View Details", ModeAction::ViewDetails)],
    },
];

// ── Picker tables ─────────────────────────────────────────────

pub const BACKLIGHT_LEVELS: [(&str, u8); 5] = [("10%", 10), ("25%", 25), ("50%", 50), ("75%", 75), ("100%", 100)];

pub const LED_LEVELS: [(&str, u8); 6] = [
    ("Off", 0),
    ("10%", 10),
    ("25%", 25),
    ("50%", 50),
    ("75%", 75),
    ("100%", 100),
];

/// `(frame_ms, step)` presets.
pub const AMBIENT_SPEEDS: [(&str, (u16, u8)); 3] = [("Slow", (60, 3)), ("Normal", (40, 6)), ("Fast", (20, 10))];

pub const SLEEP_TIMEOUTS: [(&str, u16); 5] = [("Off", 0), ("1 min", 1), ("5 min", 5), ("10 min", 10), ("30 min", 30)];

pub const DENSITIES: [(&str, u8); 5] = [("1", 1), ("2", 2), ("3", 3), ("4", 4), ("6", 6)];

impl<H, S, E> ModeManager<H, S, E>
where
    H: Hardware,
    S: SettingsStore,
    E: EventSink,
{
    /// Option menu for one mode, then its action.
    pub fn handle_mode_options(&mut self, mode_index: usize) -> Result<(), MenuError> {
        let Some(mode) = self.registry.get(mode_index).copied() else {
            return Ok(());
        };
        if mode.options.len() > MAX_MODE_OPTIONS {
            self.hw.show_mode("Error", "Too many options");
            self.keep_screen = true;
            return Err(MenuError::TooManyOptions);
        }

        let mut labels: heapless::Vec<&str, { MAX_MODE_OPTIONS + 1 }> = heapless::Vec::new();
        for option in mode.options {
            labels.push(option.label).map_err(|_| MenuError::TooManyOptions)?;
        }
        labels.push("Back").map_err(|_| MenuError::TooManyOptions)?;

        let Some(choice) = self.select_mode(&labels, 0, None, Some(mode.name)) else {
            return Ok(());
        };
        let Some(option) = mode.options.get(choice) else {
            return Ok(());
        };

        self.emit(&DeviceEvent::OptionSelected {
            mode: mode.name,
            option: option.label,
        });
        info!("{} > {}", mode.name, option.label);
        self.run_action(option.action);
        Ok(())
    }

    pub fn run_action(&mut self, action: ModeAction) {
        match action {
            ModeAction::StartNfcRead => {
                self.add_new_miniature();
            }
            ModeAction::BacklightBrightness => {
                let current = self.backlight_brightness_percent();
                if let Some(v) = self.pick_value("Backlight", &BACKLIGHT_LEVELS, current) {
                    let r = self.set_backlight_brightness_percent(v);
                    self.report_save(r);
                }
            }
            ModeAction::LedBrightness => {
                let current = self.led_brightness_percent();
                if let Some(v) = self.pick_value("LED brightness", &LED_LEVELS, current) {
                    let r = self.set_led_brightness_percent(v);
                    self.report_save(r);
                }
            }
            ModeAction::StandbyBrightness => {
                let current = self.standby_brightness_percent();
                if let Some(v) = self.pick_value("Standby brightness", &LED_LEVELS, current) {
                    let r = self.set_standby_brightness_percent(v);
                    self.report_save(r);
                }
            }
            ModeAction::AmbientSpeed => {
                let current = self.ambient_random_speed();
                if let Some((frame_ms, step)) = self.pick_value("Ambient speed", &AMBIENT_SPEEDS, current) {
                    let r = self.set_ambient_random_speed(frame_ms, step);
                    self.report_save(r);
                }
            }
            ModeAction::SleepTimeout => {
                let current = self.sleep_timeout_minutes();
                if let Some(v) = self.pick_value("Sleep timeout", &SLEEP_TIMEOUTS, current) {
                    let r = self.set_sleep_timeout_minutes(v);
                    self.report_save(r);
                }
            }
            ModeAction::PowerOff => {
                if self.confirm("Power off?") {
                    self.power_off();
                }
            }
            ModeAction::ResetSettings => {
                if self.confirm("Reset settings?") {
                    let r = self.reset_persisted_settings();
                    self.report_save(r);
                }
            }
            ModeAction::EnterSleep => {
                self.hw.show_mode("Sleep", "Zzz...");
                self.hw.delay_ms(SLEEP_SCREEN_MS);
                self.enter_sleep();
            }
            ModeAction::AmbientAllLights => self.ambient_all_lights(),
            ModeAction::AmbientRandom => self.ambient_random(),
            ModeAction::AmbientAllBrightness => {
                let current = self.ambient_all_lights_brightness_percent();
                if let Some(v) = self.pick_value("All lights", &LED_LEVELS, current) {
                    let r = self.set_ambient_all_lights_brightness_percent(v);
                    self.report_save(r);
                }
            }
            ModeAction::AmbientRandomBrightness => {
                let current = self.ambient_random_max_brightness_percent();
                if let Some(v) = self.pick_value("Random max", &LED_LEVELS, current) {
                    let r = self.set_ambient_random_max_brightness_percent(v);
                    self.report_save(r);
                }
            }
            ModeAction::AmbientRandomDensity => {
                let current = self.ambient_random_density();
                if let Some(v) = self.pick_value("Random density", &DENSITIES, current) {
                    let r = self.set_ambient_random_density(v);
                    self.report_save(r);
                }
            }
            ModeAction::ViewDetails => self.view_details(),
        }
    }

    /// Nested picker over `choices`.  The entry equal to `current` is
    /// focused and checked.  `None` on Back or cancel.
    pub fn pick_value<T: Copy + PartialEq>(&mut self, title: &str, choices: &[(&'static str, T)], current: T) -> Option<T> {
        let mut labels: heapless::Vec<&str, { MAX_MODE_OPTIONS + 1 }> = heapless::Vec::new();
        for (label, _) in choices {
            labels.push(*label).ok()?;
        }
        labels.push("Back").ok()?;

        let checked = choices.iter().position(|(_, v)| *v == current);
        let pick = self.select_mode(&labels, checked.unwrap_or(0), checked, Some(title))?;
        choices.get(pick).map(|(_, v)| *v)
    }

    /// Two-entry "No / Yes" menu.  Focus starts on "No".
    pub fn confirm(&mut self, title: &str) -> bool {
        self.select_mode(&["No", "Yes"], 0, None, Some(title)) == Some(1)
    }

    fn report_save(&mut self, result: Result<(), ConfigError>) {
        if result.is_err() {
            self.show_save_failed();
            self.keep_screen = true;
        }
    }

    fn view_details(&mut self) {
        let index = self.current_index();
        let Some(m) = DEMO_MINIATURES.get(index) else {
            return;
        };
        let mut pos: heapless::String<16> = heapless::String::new();
        let _ = core::fmt::write(&mut pos, format_args!("Pos {}/{}", index + 1, MAX_MINIATURES));
        self.hw.show_info(m.name, &pos, m.author, m.date);
        self.keep_screen = true;
    }
}
