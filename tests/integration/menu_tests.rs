//! Main menu, option menus and value pickers driven through the encoder
//! and mode button.

use vitrine::app::events::DeviceEvent;
use vitrine::app::menu::MenuError;
use vitrine::app::modes::{ModeAction, ModeDef, ModeOption};
use vitrine::app::ports::SettingsStore;
use vitrine::app::service::ModeManager;
use vitrine::config::DeviceSettings;
use vitrine::drivers::led_patterns::LightingPattern;

use crate::mock_hw::{DisplayCall, MockHardware, RecordingSink, Showcase, nvs_store, run_until, showcase, showcase_with};

const ALL_LIGHTS: ModeOption = ModeOption {
    label: "All Lights",
    action: ModeAction::AmbientAllLights,
};
const RANDOM: ModeOption = ModeOption {
    label: "Random",
    action: ModeAction::AmbientRandom,
};

static FOUR_MODES: [ModeDef; 4] = [
    ModeDef {
        name: "Alpha",
        options: &[ALL_LIGHTS],
    },
    ModeDef {
        name: "Beta",
        options: &[ALL_LIGHTS, RANDOM],
    },
    ModeDef {
        name: "Gamma",
        options: &[RANDOM],
    },
    ModeDef {
        name: "Delta",
        options: &[ALL_LIGHTS],
    },
];

static NINE_MODES: [ModeDef; 9] = [ModeDef {
    name: "M",
    options: &[ALL_LIGHTS],
}; 9];

fn four_mode_showcase(hw: MockHardware, settings: DeviceSettings) -> Showcase {
    let mut m = ModeManager::with_registry(hw, nvs_store(), RecordingSink::default(), &FOUR_MODES);
    m.begin(Some(settings));
    m
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn main_menu_opens_on_back_and_wraps_to_picked_mode() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000)
        .turn_at(1_500, 2)
        .click_at(2_000)
        .long_press_at(3_000);
    let mut m = four_mode_showcase(hw, DeviceSettings::default());

    run_until(&mut m, 6_000);

    let screens = m.hw().option_screens();
    assert_eq!(screens[0], (labels(&["Alpha", "Beta", "Gamma", "Delta", "Back"]), 4, None));
    assert_eq!(screens[1].1, 1, "two detents from Back wrap to the second mode");
    assert_eq!(screens[2].0, labels(&["All Lights", "Random", "Back"]));
    assert_eq!(screens[2].1, 0);

    assert_eq!(m.last_main_mode(), Some(1));
    assert!(m.sink().events.contains(&DeviceEvent::ModeSelected { mode: "Beta" }));
    assert!(
        !m.sink()
            .events
            .iter()
            .any(|e| matches!(e, DeviceEvent::OptionSelected { .. })),
        "long press backs out of the option menu"
    );
}

#[test]
fn back_entry_closes_menu_without_selection() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000).click_at(1_500);
    let mut m = four_mode_showcase(hw, DeviceSettings::default());

    run_until(&mut m, 3_000);

    assert_eq!(m.hw().option_screens().len(), 1);
    assert_eq!(m.last_main_mode(), None);
    assert!(
        !m.sink()
            .events
            .iter()
            .any(|e| matches!(e, DeviceEvent::ModeSelected { .. }))
    );
    assert_eq!(m.hw().last_display(), Some(&DisplayCall::Miniature(0)));
}

#[test]
fn focus_starts_on_last_main_mode() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000).mode_click_at(1_500);
    let settings = DeviceSettings {
        last_main_mode: Some(2),
        ..Default::default()
    };
    let mut m = four_mode_showcase(hw, settings);

    run_until(&mut m, 2_500);

    assert_eq!(m.hw().option_screens()[0].1, 2);
}

#[test]
fn menu_navigation_leaves_showcase_index_alone() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000).turn_at(1_500, 3).mode_click_at(2_500);
    let settings = DeviceSettings {
        last_miniature_index: 2,
        ..Default::default()
    };
    let mut m = showcase_with(hw, settings);

    run_until(&mut m, 4_000);

    assert_eq!(m.current_index(), 2);
    assert_eq!(m.hw().last_display(), Some(&DisplayCall::Miniature(2)));
    assert!(
        !m.sink()
            .events
            .iter()
            .any(|e| matches!(e, DeviceEvent::EncoderRotate { .. })),
        "turning inside a menu is not a showcase rotation"
    );
    assert_eq!(
        m.leds().pattern(),
        LightingPattern::Focus {
            position: 2,
            blend_standby: false
        }
    );
}

#[test]
fn idle_menu_times_out() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000);
    let mut m = showcase(hw);

    run_until(&mut m, 40_000);

    assert_eq!(m.hw().option_screens().len(), 1);
    assert_eq!(m.hw().last_display(), Some(&DisplayCall::Miniature(0)));
    assert!(!m.leds().is_paused());
}

#[test]
fn oversized_registry_shows_error() {
    let mut m = ModeManager::with_registry(MockHardware::new(), nvs_store(), RecordingSink::default(), &NINE_MODES);
    m.begin(Some(DeviceSettings::default()));

    assert_eq!(m.select_main_mode(), Err(MenuError::TooManyModes));
    assert_eq!(
        m.hw().last_display(),
        Some(&DisplayCall::Mode("Error".into(), "Too many modes".into()))
    );
    assert!(m.hw().option_screens().is_empty());
}

#[test]
fn backlight_picker_marks_current_and_persists_choice() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000)
        .turn_at(1_500, -4)
        .click_at(2_000)
        .click_at(2_500)
        .turn_at(3_000, -2)
        .click_at(3_500);
    let mut m = showcase(hw);

    run_until(&mut m, 5_000);

    let picker = m
        .hw()
        .option_screens()
        .into_iter()
        .find(|(opts, _, _)| opts[0] == "10%")
        .expect("picker shown");
    assert_eq!(picker.0, labels(&["10%", "25%", "50%", "75%", "100%", "Back"]));
    assert_eq!(picker.1, 4);
    assert_eq!(picker.2, Some(4));

    assert_eq!(m.backlight_brightness_percent(), 50);
    assert!(m.hw().display.contains(&DisplayCall::BacklightPct(50)));
    assert_eq!(m.store_mut().load().unwrap().backlight_pct, 50);
    assert!(m.sink().events.contains(&DeviceEvent::OptionSelected {
        mode: "Settings",
        option: "Backlight Brightness"
    }));
}

#[test]
fn sleep_mode_enters_sleep_from_menu() {
    let mut hw = MockHardware::new();
    hw.mode_click_at(1_000)
        .turn_at(1_500, -3)
        .click_at(2_000)
        .click_at(2_500);
    let mut m = showcase(hw);

    run_until(&mut m, 4_000);

    assert!(m.is_sleeping());
    assert!(m.hw().strip_dark());
    assert_eq!(m.hw().backlight_on(), Some(false));
    assert_eq!(
        m.hw().last_display(),
        Some(&DisplayCall::Mode("Sleep".into(), "Zzz...".into()))
    );
}

#[test]
fn power_off_requires_confirmation() {
    let mut hw = MockHardware::new();
    // Settings > Power off > No
    hw.mode_click_at(1_000)
        .turn_at(1_500, -4)
        .click_at(2_000)
        .turn_at(2_500, 3)
        .turn_at(2_700, 2)
        .click_at(3_000)
        .click_at(3_500);
    // Settings is remembered, so the second pass starts on it.
    hw.mode_click_at(5_000)
        .click_at(6_000)
        .turn_at(6_500, 3)
        .turn_at(6_700, 2)
        .click_at(7_000)
        .turn_at(7_500, 1)
        .click_at(8_000);
    let mut m = showcase(hw);

    run_until(&mut m, 4_500);
    assert!(!m.is_powered_off());
    assert_eq!(m.hw().power_offs, 0);

    run_until(&mut m, 10_000);
    assert!(m.is_powered_off());
    assert_eq!(m.hw().power_offs, 1);
    assert!(m.hw().strip_dark());
    assert!(m.sink().events.contains(&DeviceEvent::PoweringOff));
}

#[test]
fn ambient_all_lights_from_menu_survives_rotation() {
    let mut hw = MockHardware::new();
    // Ambient Light > All Lights, then turn the showcase.
    hw.mode_click_at(1_000)
        .turn_at(1_500, -2)
        .click_at(2_000)
        .click_at(2_500)
        .turn_at(4_000, 1);
    let mut m = showcase(hw);

    run_until(&mut m, 5_000);

    assert_eq!(m.leds().pattern(), LightingPattern::AmbientAll { brightness_pct: 25 });
    assert_eq!(m.current_index(), 1);
    assert_eq!(m.hw().last_display(), Some(&DisplayCall::Miniature(1)));
}

#[test]
fn view_details_keeps_info_card_on_screen() {
    let mut hw = MockHardware::new();
    // Miniature Info > View Details
    hw.mode_click_at(1_000).turn_at(1_500, -1).click_at(2_000).click_at(2_500);
    let settings = DeviceSettings {
        last_miniature_index: 1,
        ..Default::default()
    };
    let mut m = showcase_with(hw, settings);

    run_until(&mut m, 4_000);

    assert_eq!(
        m.hw().last_display(),
        Some(&DisplayCall::Info(
            "Dragon".into(),
            "Pos 2/3".into(),
            "Maria Garcia".into(),
            "2021-05-22".into()
        ))
    );
}
