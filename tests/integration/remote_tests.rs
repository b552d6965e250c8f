//! Remote LED commands as they arrive from WebSocket clients.

use vitrine::app::events::DeviceEvent;
use vitrine::app::ports::{ConfigError, SettingsStore};
use vitrine::app::service::ModeManager;
use vitrine::drivers::led_patterns::{LightingPattern, Rgbw};

use crate::mock_hw::{FailingStore, MockHardware, RecordingSink, Showcase, showcase};

fn ok(cmd: &str) -> Option<String> {
    Some(format!(r#"{{"type":"ok","for":"led","cmd":"{}"}}"#, cmd))
}

fn error(what: &str) -> Option<String> {
    Some(format!(r#"{{"type":"error","error":"{}"}}"#, what))
}

fn fresh() -> Showcase {
    showcase(MockHardware::new())
}

#[test]
fn brightness_is_applied_and_persisted() {
    let mut m = fresh();

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"brightness","value":70}"#);

    assert_eq!(reply, ok("brightness"));
    assert_eq!(m.led_brightness_percent(), 70);
    assert_eq!(m.hw().brightness, 70);
    assert_eq!(m.store_mut().load().unwrap().led_brightness_pct, 70);
}

#[test]
fn pixel_lights_one_slot() {
    let mut m = fresh();

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"pixel","index":1,"r":255,"g":0,"b":0}"#);

    assert_eq!(reply, ok("pixel"));
    assert_eq!(m.hw().last_frame()[1], Rgbw::RED);
}

#[test]
fn negative_pixel_index_is_acknowledged_but_ignored() {
    let mut m = fresh();
    let frames = m.hw().frames.len();

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"pixel","index":-1,"r":255}"#);

    assert_eq!(reply, ok("pixel"));
    assert_eq!(m.hw().frames.len(), frames);
}

#[test]
fn standby_mode_persists_its_level() {
    let mut m = fresh();

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"mode","name":"standby","brightness":20}"#);

    assert_eq!(reply, ok("mode"));
    assert_eq!(m.leds().pattern(), LightingPattern::Standby { brightness_pct: 20 });
    assert_eq!(m.standby_brightness_percent(), 20);
    assert_eq!(m.store_mut().load().unwrap().standby_brightness_pct, 20);
    assert!(m.hw().last_frame().iter().all(|p| *p == Rgbw::white_pct(20)));
}

#[test]
fn focus_and_clear() {
    let mut m = fresh();

    assert_eq!(m.handle_remote_text(r#"{"type":"led","cmd":"mode","name":"focus","index":2}"#), ok("mode"));
    assert_eq!(
        m.leds().pattern(),
        LightingPattern::Focus {
            position: 2,
            blend_standby: false
        }
    );

    assert_eq!(m.handle_remote_text(r#"{"type":"led","cmd":"clear"}"#), ok("clear"));
    assert!(m.hw().strip_dark());
    assert_eq!(m.leds().pattern(), LightingPattern::Standby { brightness_pct: 0 });
}

#[test]
fn selected_flashes_then_focuses() {
    let mut m = fresh();
    let start = m.hw().now;

    m.handle_remote_text(r#"{"type":"led","cmd":"mode","name":"selected","index":1}"#);

    assert_eq!(m.hw().now - start, 2_500);
    assert!(m.hw().frames.iter().any(|f| f[1] == Rgbw::GREEN));
    assert_eq!(m.hw().last_frame()[1], Rgbw::white(255));
}

#[test]
fn selected_during_ambient_leaves_only_the_focus_lit() {
    for random in [false, true] {
        let mut m = fresh();
        if random {
            m.ambient_random();
        } else {
            m.ambient_all_lights();
        }

        m.handle_remote_text(r#"{"type":"led","cmd":"mode","name":"selected","index":0}"#);

        assert_eq!(
            m.leds().pattern(),
            LightingPattern::Focus {
                position: 0,
                blend_standby: false
            }
        );
        assert_eq!(m.hw().last_frame(), [Rgbw::white(255), Rgbw::OFF, Rgbw::OFF]);
    }
}

#[test]
fn brightness_reply_stays_ok_when_save_fails() {
    let mut m = ModeManager::new(MockHardware::new(), FailingStore, RecordingSink::default());
    m.begin(None);

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"brightness","value":70}"#);

    assert_eq!(reply, ok("brightness"));
    assert_eq!(m.led_brightness_percent(), 70);
    assert!(m.sink().events.contains(&DeviceEvent::SaveFailed(ConfigError::IoError)));
}

#[test]
fn unknown_cmd_is_acknowledged() {
    let mut m = fresh();
    let frames = m.hw().frames.len();

    assert_eq!(m.handle_remote_text(r#"{"type":"led","cmd":"rainbow"}"#), ok("rainbow"));
    assert_eq!(m.hw().frames.len(), frames);
}

#[test]
fn malformed_and_foreign_frames() {
    let mut m = fresh();

    assert_eq!(m.handle_remote_text("{oops"), error("bad_json"));
    assert_eq!(m.handle_remote_text(r#"{"type":"ota","cmd":"start"}"#), None);
    assert_eq!(m.handle_remote_text(r#"{"type":"led"}"#), None);
}

#[test]
fn maintenance_refuses_commands() {
    let mut m = fresh();
    m.set_maintenance(true);

    let reply = m.handle_remote_text(r#"{"type":"led","cmd":"brightness","value":90}"#);

    assert_eq!(reply, error("maintenance"));
    assert_eq!(m.led_brightness_percent(), 40);

    m.set_maintenance(false);
    assert_eq!(
        m.handle_remote_text(r#"{"type":"led","cmd":"brightness","value":90}"#),
        ok("brightness")
    );
}
