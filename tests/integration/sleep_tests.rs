//! Auto-sleep, waking and power-off.

use vitrine::app::events::DeviceEvent;
use vitrine::app::ports::SettingsStore;
use vitrine::config::DeviceSettings;
use vitrine::drivers::led_patterns::{LightingPattern, Rgbw};

use crate::mock_hw::{DisplayCall, MockHardware, Showcase, run_until, showcase, showcase_with};

fn one_minute_timeout() -> DeviceSettings {
    DeviceSettings {
        sleep_timeout_min: 1,
        ..Default::default()
    }
}

/// Showcase at slot 1, already asleep at t = 1000.
fn asleep_at_slot_one() -> Showcase {
    let settings = DeviceSettings {
        last_miniature_index: 1,
        ..Default::default()
    };
    let mut m = showcase_with(MockHardware::new(), settings);
    run_until(&mut m, 1_000);
    m.enter_sleep();
    assert!(m.is_sleeping());
    m
}

fn flashed(m: &Showcase) -> bool {
    m.hw().frames.iter().any(|f| f.contains(&Rgbw::GREEN))
}

#[test]
fn idle_timeout_blanks_strip_and_backlight() {
    let mut m = showcase_with(MockHardware::new(), one_minute_timeout());

    run_until(&mut m, 59_000);
    assert!(!m.is_sleeping());

    run_until(&mut m, 61_000);
    assert!(m.is_sleeping());
    assert!(m.hw().strip_dark());
    assert_eq!(m.hw().backlight_on(), Some(false));
    assert_eq!(m.leds().pattern(), LightingPattern::Standby { brightness_pct: 0 });
    assert!(m.sink().events.contains(&DeviceEvent::SleepEntered));
}

#[test]
fn activity_postpones_sleep() {
    let mut hw = MockHardware::new();
    hw.turn_at(50_000, 1);
    let mut m = showcase_with(hw, one_minute_timeout());

    run_until(&mut m, 100_000);
    assert!(!m.is_sleeping());

    run_until(&mut m, 111_000);
    assert!(m.is_sleeping());
}

#[test]
fn zero_timeout_never_sleeps() {
    let settings = DeviceSettings {
        sleep_timeout_min: 0,
        ..Default::default()
    };
    let mut m = showcase_with(MockHardware::new(), settings);

    run_until(&mut m, 130_000);
    assert!(!m.is_sleeping());
}

#[test]
fn rotation_wakes_without_moving() {
    let mut m = asleep_at_slot_one();
    m.hw_mut().turn_at(1_100, 1);

    run_until(&mut m, 1_500);

    assert!(!m.is_sleeping());
    assert_eq!(m.current_index(), 1);
    assert_eq!(m.hw().last_display(), Some(&DisplayCall::Miniature(1)));
    assert_eq!(m.hw().backlight_on(), Some(true));
    assert_eq!(
        m.leds().pattern(),
        LightingPattern::Focus {
            position: 1,
            blend_standby: false
        }
    );
    assert!(m.sink().events.contains(&DeviceEvent::Woke));
    assert!(
        !m.sink()
            .events
            .iter()
            .any(|e| matches!(e, DeviceEvent::EncoderRotate { .. }))
    );

    // The next turn is a normal rotation.
    m.hw_mut().turn_at(1_600, 1);
    run_until(&mut m, 1_800);
    assert_eq!(m.current_index(), 2);
}

#[test]
fn waking_click_does_not_flash() {
    let mut m = asleep_at_slot_one();
    m.hw_mut().click_at(1_100);

    run_until(&mut m, 2_000);

    assert!(!m.is_sleeping());
    assert!(!flashed(&m));
}

#[test]
fn waking_hold_does_not_adjust_brightness() {
    let mut m = asleep_at_slot_one();
    m.hw_mut().long_press_at(1_100);

    run_until(&mut m, 3_000);

    assert!(!m.is_sleeping());
    assert_eq!(m.led_brightness_percent(), 40);
    assert!(!flashed(&m));
}

#[test]
fn mode_button_wakes_without_menu() {
    let mut m = asleep_at_slot_one();
    m.hw_mut().mode_click_at(1_100);

    run_until(&mut m, 2_000);

    assert!(!m.is_sleeping());
    assert!(m.hw().option_screens().is_empty());
}

#[test]
fn power_off_flushes_pending_save() {
    let mut hw = MockHardware::new();
    hw.turn_at(100, 1);
    let mut m = showcase(hw);

    run_until(&mut m, 300);
    assert!(m.has_pending_save());

    m.power_off();

    assert!(m.is_powered_off());
    assert_eq!(m.hw().power_offs, 1);
    assert!(m.hw().strip_dark());
    assert_eq!(m.hw().backlight_on(), Some(false));
    assert_eq!(
        m.hw().last_display(),
        Some(&DisplayCall::Mode("Power off".into(), "Bye".into()))
    );
    assert_eq!(m.store_mut().load().unwrap().last_miniature_index, 1);

    // Inputs are ignored from here on.
    m.hw_mut().turn_at(400, 1);
    run_until(&mut m, 800);
    assert_eq!(m.current_index(), 1);
}
