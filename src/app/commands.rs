//! Inbound remote commands.
//!
//! WebSocket clients drive the LEDs with small JSON objects:
//!
//! ```text
//! {"type":"led","cmd":"brightness","value":0..100}
//! {"type":"led","cmd":"clear"}
//! {"type":"led","cmd":"pixel","index":0..N,"r":0..255,"g":0..255,"b":0..255}
//! {"type":"led","cmd":"mode","name":"standby"|"focus"|"selected","index":0..N}
//! ```
//!
//! Parsing is lenient the way the web UI expects: missing or mistyped
//! numeric fields fall back to defaults, out-of-range values are clamped,
//! and frames addressed to other subsystems are dropped without a reply.

use serde::Serialize;
use serde_json::Value;

use crate::config::clamp_percent;
use crate::drivers::led_patterns::Rgbw;

/// Commands that remote clients can send into the showcase core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Global LED brightness, persisted.
    Brightness(u8),
    /// All pixels off.
    Clear,
    /// Light one pixel.  `None` index means the client sent a negative one.
    Pixel { index: Option<usize>, colour: Rgbw },
    /// Standby wash; also persisted as the standby brightness.
    Standby { brightness_pct: u8 },
    Focus { index: usize },
    /// Blocking confirmation flash.
    Selected { index: usize },
    /// `mode` without a usable `name`.
    ModeNoop,
    /// Anything else under `type: "led"`.
    Unknown,
}

/// Result of looking at one inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRemote {
    /// Not JSON.  Answered with `bad_json`.
    BadJson,
    /// Valid JSON for someone else, or no `cmd`.  No reply.
    Ignored,
    /// A command plus the `cmd` string to echo back.
    Command { cmd: String, command: RemoteCommand },
}

/// Reply frames.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteReply<'a> {
    Ok {
        #[serde(rename = "for")]
        target: &'a str,
        cmd: &'a str,
    },
    Error {
        error: &'a str,
    },
}

impl RemoteReply<'_> {
    pub fn to_json(&self) -> String {
        // Serialising a flat struct of strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn int_or(doc: &Value, key: &str, default: i64) -> i64 {
    doc.get(key).and_then(Value::as_i64).unwrap_or(default)
}

fn percent(value: i64) -> u8 {
    clamp_percent(value.clamp(0, 100) as u8)
}

fn index(value: i64) -> usize {
    value.max(0) as usize
}

pub fn parse_remote(text: &str) -> ParsedRemote {
    let Ok(doc) = serde_json::from_str::<Value>(text) else {
        return ParsedRemote::BadJson;
    };
    if doc.get("type").and_then(Value::as_str) != Some("led") {
        return ParsedRemote::Ignored;
    }
    let Some(cmd) = doc.get("cmd").and_then(Value::as_str) else {
        return ParsedRemote::Ignored;
    };

    let command = match cmd {
        "brightness" => RemoteCommand::Brightness(percent(int_or(&doc, "value", -1))),
        "clear" => RemoteCommand::Clear,
        "pixel" => {
            let i = int_or(&doc, "index", -1);
            let channel = |k: &str| (int_or(&doc, k, 0) & 0xFF) as u8;
            RemoteCommand::Pixel {
                index: usize::try_from(i).ok(),
                colour: Rgbw::rgb(channel("r"), channel("g"), channel("b")),
            }
        }
        "mode" => {
            let i = index(int_or(&doc, "index", 0));
            match doc.get("name").and_then(Value::as_str) {
                Some("standby") => {
                    let fallback = int_or(&doc, "value", 50);
                    RemoteCommand::Standby {
                        brightness_pct: percent(int_or(&doc, "brightness", fallback)),
                    }
                }
                Some("focus") => RemoteCommand::Focus { index: i },
                Some("selected") => RemoteCommand::Selected { index: i },
                _ => RemoteCommand::ModeNoop,
            }
        }
        _ => RemoteCommand::Unknown,
    };

    ParsedRemote::Command {
        cmd: cmd.to_owned(),
        command,
    }
}
