//! Setters, persistence, the deferred position write and hold-to-adjust.

use vitrine::app::events::DeviceEvent;
use vitrine::app::ports::{ConfigError, SettingsStore};
use vitrine::app::service::ModeManager;
use vitrine::config::DeviceSettings;
use vitrine::drivers::led_patterns::{LightingPattern, Rgbw};

use crate::mock_hw::{DisplayCall, FailingStore, MockHardware, RecordingSink, run_until, showcase};

#[test]
fn rotation_moves_focus_and_defers_save() {
    let mut hw = MockHardware::new();
    hw.turn_at(100, 1);
    let mut m = showcase(hw);

    run_until(&mut m, 1_000);
    assert_eq!(m.current_index(), 1);
    assert_eq!(m.last_miniature_index(), 1);
    assert!(m.has_pending_save());
    assert_eq!(m.store_mut().load().unwrap().last_miniature_index, 0);

    let frame = m.hw().last_frame();
    assert_eq!(frame[1], Rgbw::white(255));
    assert_eq!(frame[0], Rgbw::OFF);

    run_until(&mut m, 2_000);
    assert!(!m.has_pending_save());
    assert_eq!(m.store_mut().load().unwrap().last_miniature_index, 1);
}

#[test]
fn rapid_rotations_coalesce_into_one_write() {
    let mut hw = MockHardware::new();
    hw.turn_at(100, 1).turn_at(1_000, 1);
    let mut m = showcase(hw);

    run_until(&mut m, 2_000);
    assert_eq!(m.store_mut().load().unwrap().last_miniature_index, 0);

    run_until(&mut m, 3_000);
    assert_eq!(m.store_mut().load().unwrap().last_miniature_index, 2);
}

#[test]
fn rotation_wraps_and_broadcasts() {
    let mut hw = MockHardware::new();
    hw.turn_at(100, -1);
    let mut m = showcase(hw);

    run_until(&mut m, 500);

    assert_eq!(m.current_index(), 2);
    let events = &m.sink().events;
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DeviceEvent::EncoderRotate { index: 2, .. }))
    );
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DeviceEvent::MiniatureShown { index: 2, .. }))
    );
}

#[test]
fn setters_clamp_and_persist() {
    let mut m = showcase(MockHardware::new());

    m.set_led_brightness_percent(150).unwrap();
    assert_eq!(m.led_brightness_percent(), 100);
    assert_eq!(m.hw().brightness, 100);

    m.set_ambient_random_density(0).unwrap();
    assert_eq!(m.ambient_random_density(), 1);

    m.set_sleep_timeout_minutes(10).unwrap();
    m.set_ambient_random_speed(20, 10).unwrap();

    let stored = m.store_mut().load().unwrap();
    assert_eq!(stored.led_brightness_pct, 100);
    assert_eq!(stored.ambient_random_density, 1);
    assert_eq!(stored.sleep_timeout_min, 10);
    assert_eq!((stored.ambient_random_frame_ms, stored.ambient_random_step), (20, 10));
}

#[test]
fn ambient_brightness_applies_live() {
    let mut m = showcase(MockHardware::new());
    m.ambient_all_lights();
    assert_eq!(m.leds().pattern(), LightingPattern::AmbientAll { brightness_pct: 25 });

    m.set_ambient_all_lights_brightness_percent(60).unwrap();
    assert_eq!(m.leds().pattern(), LightingPattern::AmbientAll { brightness_pct: 60 });

    m.ambient_random();
    m.set_ambient_random_max_brightness_percent(80).unwrap();
    assert!(matches!(
        m.leds().pattern(),
        LightingPattern::AmbientRandom { max_pct: 80, .. }
    ));
}

#[test]
fn failed_save_keeps_value_applied() {
    let mut m = ModeManager::new(MockHardware::new(), FailingStore, RecordingSink::default());
    m.begin(None);

    assert_eq!(m.set_led_brightness_percent(70), Err(ConfigError::IoError));
    assert_eq!(m.led_brightness_percent(), 70);
    assert_eq!(m.hw().brightness, 70);
    assert!(m.sink().events.contains(&DeviceEvent::SaveFailed(ConfigError::IoError)));
}

#[test]
fn reset_restores_defaults_live() {
    let mut m = showcase(MockHardware::new());
    m.set_backlight_brightness_percent(10).unwrap();
    m.set_led_brightness_percent(90).unwrap();

    m.reset_persisted_settings().unwrap();

    assert_eq!(m.settings(), &DeviceSettings::default());
    assert_eq!(m.led_brightness_percent(), 40);
    assert_eq!(m.hw().brightness, 40);
    assert_eq!(
        m.hw().display.last(),
        Some(&DisplayCall::Backlight(true))
    );
    assert_eq!(m.store_mut().load().unwrap(), DeviceSettings::default());
}

#[test]
fn wifi_credentials_are_validated() {
    let mut m = showcase(MockHardware::new());

    assert_eq!(m.set_wifi_sta_config(true, "home", Some("secret")), Ok(true));
    assert_eq!(m.settings().sta_ssid.as_str(), "home");
    assert_eq!(m.settings().sta_pass.as_str(), "secret");

    // None keeps the stored passphrase.
    assert_eq!(m.set_wifi_sta_config(false, "work", None), Ok(true));
    assert_eq!(m.settings().sta_pass.as_str(), "secret");
    assert!(!m.settings().sta_enabled);

    let long = "x".repeat(40);
    assert_eq!(m.set_wifi_sta_config(true, &long, None), Ok(false));
    assert_eq!(m.settings().sta_ssid.as_str(), "work");

    assert_eq!(m.set_wifi_ap_config("", None), Ok(false));
    assert_eq!(m.set_wifi_ap_config("Shelf", Some("pw123456")), Ok(true));

    let stored = m.store_mut().load().unwrap();
    assert_eq!(stored.sta_ssid.as_str(), "work");
    assert_eq!(stored.ap_ssid.as_str(), "Shelf");
}

#[test]
fn short_press_flashes_current_slot() {
    let mut hw = MockHardware::new();
    hw.click_at(1_000);
    let mut m = showcase(hw);

    run_until(&mut m, 5_000);

    assert!(m.hw().frames.iter().any(|f| f[0] == Rgbw::GREEN));
    assert_eq!(
        m.leds().pattern(),
        LightingPattern::Focus {
            position: 0,
            blend_standby: false
        }
    );
    assert!(
        m.sink()
            .events
            .iter()
            .any(|e| matches!(e, DeviceEvent::EncoderPress { index: 0, .. }))
    );
}

#[test]
fn short_press_during_ambient_does_not_flash() {
    let mut hw = MockHardware::new();
    hw.click_at(1_000);
    let mut m = showcase(hw);
    m.ambient_all_lights();

    run_until(&mut m, 2_000);

    assert!(!m.hw().frames.iter().any(|f| f.contains(&Rgbw::GREEN)));
    assert!(m.leds().is_ambient_active());
}

#[test]
fn hold_ramps_brightness_and_alternates_direction() {
    let mut hw = MockHardware::new();
    hw.long_press_at(1_000).long_press_at(3_000);
    let mut m = showcase(hw);

    run_until(&mut m, 2_500);
    let raised = m.led_brightness_percent();
    assert!(raised > 40 && raised < 50, "raised to {}", raised);
    assert_eq!(m.store_mut().load().unwrap().led_brightness_pct, raised);

    run_until(&mut m, 4_500);
    let lowered = m.led_brightness_percent();
    assert!(lowered < raised, "lowered to {}", lowered);
    assert_eq!(m.store_mut().load().unwrap().led_brightness_pct, lowered);

    assert!(
        !m.hw().frames.iter().any(|f| f.contains(&Rgbw::GREEN)),
        "a long press never flashes"
    );
}

#[test]
fn failed_save_after_hold_is_reported_on_screen() {
    let mut hw = MockHardware::new();
    hw.long_press_at(1_000);
    let mut m = ModeManager::new(hw, FailingStore, RecordingSink::default());
    m.begin(None);

    run_until(&mut m, 2_500);

    assert!(m.led_brightness_percent() > 40);
    assert_eq!(
        m.hw().last_display(),
        Some(&DisplayCall::Mode("Settings".into(), "Save failed".into()))
    );
}
