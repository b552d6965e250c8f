//! Polled button debouncer with press, short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switches with internal pull-ups (encoder push
//! button and the mode button).  The caller samples the pin once per loop
//! iteration and feeds the level into [`ButtonDebouncer::update`]; all
//! timing is derived from the `now_ms` it passes in, so the state machine
//! runs identically on target and in host tests.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                                  | Flag          |
//! |-------------|--------------------------------------------|---------------|
//! | Press       | Level stable LOW for more than 50 ms       | `press`       |
//! | Short press | Released before 700 ms                     | `short_press` |
//! | Long press  | Still held at 700 ms (once per press)      | `long_press`  |
//!
//! Flags are one-shot: each `take_*` call clears the flag it returns.

use crate::config::{DEBOUNCE_MS, LONG_PRESS_MS};

/// Snapshot of the pending one-shot flags, drained in one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEvents {
    pub press: bool,
    pub short_press: bool,
    pub long_press: bool,
}

impl ButtonEvents {
    pub fn any(&self) -> bool {
        self.press || self.short_press || self.long_press
    }
}

#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    /// Debounced level (true = pressed).
    state: bool,
    last_reading: bool,
    last_change_ms: u64,
    press_start_ms: Option<u64>,
    last_press_duration_ms: u64,
    long_press_armed: bool,
    pending: ButtonEvents,
}

impl ButtonDebouncer {
    pub const fn new() -> Self {
        Self {
            state: false,
            last_reading: false,
            last_change_ms: 0,
            press_start_ms: None,
            last_press_duration_ms: 0,
            long_press_armed: false,
            pending: ButtonEvents {
                press: false,
                short_press: false,
                long_press: false,
            },
        }
    }

    /// Feed one raw sample.  `pressed` is the electrical level already
    /// inverted for the active-low wiring.
    pub fn update(&mut self, pressed: bool, now_ms: u64) {
        if pressed != self.last_reading {
            self.last_change_ms = now_ms;
            self.last_reading = pressed;
        }

        if now_ms.saturating_sub(self.last_change_ms) <= DEBOUNCE_MS {
            return;
        }

        if pressed != self.state {
            self.state = pressed;
            if pressed {
                self.press_start_ms = Some(now_ms);
                self.long_press_armed = true;
                self.pending.press = true;
            } else {
                self.last_press_duration_ms = self
                    .press_start_ms
                    .map_or(0, |start| now_ms.saturating_sub(start));
                if self.last_press_duration_ms < LONG_PRESS_MS {
                    self.pending.short_press = true;
                }
                self.press_start_ms = None;
                self.long_press_armed = false;
            }
        }

        if let (true, true, Some(start)) = (self.state, self.long_press_armed, self.press_start_ms) {
            if now_ms.saturating_sub(start) >= LONG_PRESS_MS {
                self.pending.long_press = true;
                self.long_press_armed = false;
            }
        }
    }

    /// Debounced level.
    pub fn is_held(&self) -> bool {
        self.state
    }

    /// How long the current press has lasted, `None` when released.
    pub fn held_for(&self, now_ms: u64) -> Option<u64> {
        self.press_start_ms.map(|start| now_ms.saturating_sub(start))
    }

    pub fn last_press_duration_ms(&self) -> u64 {
        self.last_press_duration_ms
    }

    pub fn take_press(&mut self) -> bool {
        core::mem::take(&mut self.pending.press)
    }

    pub fn take_short_press(&mut self) -> bool {
        core::mem::take(&mut self.pending.short_press)
    }

    pub fn take_long_press(&mut self) -> bool {
        core::mem::take(&mut self.pending.long_press)
    }

    /// Drain all flags at once.
    pub fn take_events(&mut self) -> ButtonEvents {
        core::mem::take(&mut self.pending)
    }

    /// Drop pending flags without touching the debounced level, so a
    /// release that finishes a menu does not leak into the caller.
    pub fn clear_pending(&mut self) {
        self.pending = ButtonEvents::default();
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
