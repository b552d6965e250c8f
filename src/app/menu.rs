//! Blocking "pick one of N" menu loop.
//!
//! ```text
//!            ┌──────────── render (only when focus changed)
//!            ▼
//!   ┌──▶ sample buttons ──▶ mode edge? ───────────────▶ cancel
//!   │        │
//!   │        ├─▶ encoder moved? ─▶ focus = wrapped index
//!   │        ├─▶ short press ─────────────────────────▶ select(focus)
//!   │        ├─▶ long press ──────────────────────────▶ cancel
//!   │        └─▶ idle > 30 s ─────────────────────────▶ cancel
//!   └── delay 10 ms
//! ```
//!
//! The loop owns the encoder's logical index for its whole duration and
//! hands it back unchanged on every exit path.  Actions run after the loop
//! returns, so a nested menu opened by an action starts from a clean
//! encoder and restores the same index its parent saw.

use core::fmt;

use log::debug;

use super::ports::{EventSink, Hardware, SettingsStore};
use super::service::ModeManager;
use crate::config::{MENU_IDLE_TIMEOUT_MS, POLL_DELAY_MS};

/// Errors from building a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuError {
    /// The registry holds more modes than the menu can list.
    TooManyModes,
    /// A mode lists more options than the menu can list.
    TooManyOptions,
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyModes => write!(f, "too many modes"),
            Self::TooManyOptions => write!(f, "too many options"),
        }
    }
}

/// State of one open menu.  Lives only on the stack of [`ModeManager::select_mode`].
#[derive(Debug)]
pub struct MenuSession<'a> {
    pub options: &'a [&'a str],
    pub focus: usize,
    pub selected: Option<usize>,
    pub saved_index: usize,
    pub footer: Option<&'a str>,
    last_rendered: Option<usize>,
    last_input_ms: u64,
}

impl<'a> MenuSession<'a> {
    pub fn new(
        options: &'a [&'a str],
        initial_focus: usize,
        selected: Option<usize>,
        saved_index: usize,
        footer: Option<&'a str>,
        now_ms: u64,
    ) -> Self {
        Self {
            options,
            focus: initial_focus.min(options.len().saturating_sub(1)),
            selected: selected.filter(|s| *s < options.len()),
            saved_index,
            footer,
            last_rendered: None,
            last_input_ms: now_ms,
        }
    }

    pub fn needs_render(&self) -> bool {
        self.last_rendered != Some(self.focus)
    }

    pub fn mark_rendered(&mut self) {
        self.last_rendered = Some(self.focus);
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.last_input_ms = now_ms;
    }

    pub fn timed_out(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_input_ms) >= MENU_IDLE_TIMEOUT_MS
    }
}

impl<H, S, E> ModeManager<H, S, E>
where
    H: Hardware,
    S: SettingsStore,
    E: EventSink,
{
    /// Run a menu over `options` until the user picks one or backs out.
    ///
    /// Returns the chosen index, or `None` on cancel (long press, mode
    /// button, idle timeout).  The encoder's logical index is identical
    /// before and after the call.
    pub fn select_mode(
        &mut self,
        options: &[&str],
        initial_focus: usize,
        preselected: Option<usize>,
        footer: Option<&str>,
    ) -> Option<usize> {
        if options.is_empty() {
            return None;
        }

        let saved_index = self.encoder.current_index();
        let now = self.hw.now_ms();
        let mut session = MenuSession::new(options, initial_focus, preselected, saved_index, footer, now);

        self.encoder.set_current_index(session.focus);
        self.encoder.sync_raw(self.hw.encoder_count());
        self.encoder.clear_pending();
        self.mode_button.clear_pending();

        let result = loop {
            if session.needs_render() {
                self.hw
                    .show_options(session.options, session.focus, session.selected, session.footer);
                session.mark_rendered();
            }

            let now = self.hw.now_ms();
            self.sample_buttons(now);

            if self.mode_button.take_press() {
                debug!("menu: back via mode button");
                break None;
            }

            let raw = self.hw.encoder_count();
            if let Some(focus) = self.encoder.poll_movement_with_wrap(raw, options.len()) {
                session.focus = focus;
                session.touch(now);
            }

            if self.encoder.take_press() {
                session.touch(now);
            }
            if self.encoder.take_short_press() {
                break Some(session.focus);
            }
            if self.encoder.take_long_press() {
                debug!("menu: back via long press");
                break None;
            }
            if session.timed_out(now) {
                debug!("menu: idle timeout");
                break None;
            }

            self.hw.delay_ms(POLL_DELAY_MS);
        };

        self.encoder.set_current_index(session.saved_index);
        self.encoder.clear_pending();
        self.mode_button.clear_pending();
        result
    }
}
