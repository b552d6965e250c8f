//! Rotary encoder decoder.
//!
//! The PCNT unit counts both edges of channel A, so one detent shows up as
//! two raw counts.  [`EncoderInput`] halves the raw count, clamps any jump
//! larger than [`MAX_STEP_PER_POLL`] (missed interrupts, contact chatter on
//! fast spins) and wraps the logical index into the active range.
//!
//! The logical index is independent of the raw counter.  Menus rebind it
//! with [`EncoderInput::set_current_index`] and restore it on exit without
//! touching the hardware, so opening a menu never moves the showcase.

use super::button::{ButtonDebouncer, ButtonEvents};
use crate::config::{MAX_MINIATURES, MAX_STEP_PER_POLL};

/// Wrap `idx` into `0..range`.  A zero range pins to 0.
pub fn wrap_index(idx: i64, range: usize) -> usize {
    if range == 0 {
        return 0;
    }
    idx.rem_euclid(range as i64) as usize
}

#[derive(Debug, Clone)]
pub struct EncoderInput {
    current_index: usize,
    last_position: i64,
    button: ButtonDebouncer,
}

impl EncoderInput {
    pub fn new() -> Self {
        Self {
            current_index: 0,
            last_position: 0,
            button: ButtonDebouncer::new(),
        }
    }

    /// Adopt the hardware counter's current value as the reference point.
    pub fn sync_raw(&mut self, raw_count: i64) {
        self.last_position = raw_count / 2;
    }

    /// Movement over the miniature range.
    pub fn poll_movement(&mut self, raw_count: i64) -> Option<usize> {
        self.poll_movement_with_wrap(raw_count, MAX_MINIATURES)
    }

    /// Movement wrapped into `0..range`.  Returns the new index when the
    /// detent position changed since the last poll.
    pub fn poll_movement_with_wrap(&mut self, raw_count: i64, range: usize) -> Option<usize> {
        let position = raw_count / 2;
        if position == self.last_position {
            return None;
        }
        let delta = (position - self.last_position).clamp(-MAX_STEP_PER_POLL, MAX_STEP_PER_POLL);
        self.current_index = wrap_index(self.current_index as i64 + delta, range);
        self.last_position = position;
        Some(self.current_index)
    }

    /// Sample the push button.
    pub fn update_button(&mut self, pressed: bool, now_ms: u64) {
        self.button.update(pressed, now_ms);
    }

    /// Drain the one-shot press flags.
    pub fn poll_button_events(&mut self) -> ButtonEvents {
        self.button.take_events()
    }

    pub fn take_press(&mut self) -> bool {
        self.button.take_press()
    }

    pub fn take_short_press(&mut self) -> bool {
        self.button.take_short_press()
    }

    pub fn take_long_press(&mut self) -> bool {
        self.button.take_long_press()
    }

    pub fn is_button_held(&self) -> bool {
        self.button.is_held()
    }

    pub fn clear_pending(&mut self) {
        self.button.clear_pending();
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Rebind the logical index.  Raw counters are left alone.
    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }
}

impl Default for EncoderInput {
    fn default() -> Self {
        Self::new()
    }
}
