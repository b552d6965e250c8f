//! Fuzz target: `parse_remote`
//!
//! Feeds arbitrary text frames into the remote command parser and checks
//! that clamped fields stay in range.
//!
//! cargo fuzz run fuzz_remote_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine::app::commands::{ParsedRemote, RemoteCommand, parse_remote};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let ParsedRemote::Command { command, .. } = parse_remote(text) {
        match command {
            RemoteCommand::Brightness(pct) | RemoteCommand::Standby { brightness_pct: pct } => {
                assert!(pct <= 100, "percentage out of range");
            }
            _ => {}
        }
    }
});
