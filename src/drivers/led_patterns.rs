//! Showcase lighting engine.
//!
//! Holds the active [`LightingPattern`] and renders it onto any
//! [`LedStripPort`].  Exactly one pattern is active at a time; entering a
//! pattern implicitly leaves the previous one.
//!
//! ## Patterns
//!
//! | Pattern        | Output                                        | Animated |
//! |----------------|-----------------------------------------------|----------|
//! | Focus          | One slot at full white, rest off or standby   | no       |
//! | Standby        | Uniform white wash                            | no       |
//! | AmbientAll     | Uniform white wash at the ambient level       | no       |
//! | AmbientRandom  | Independent pixels fading up and down         | yes      |
//!
//! `update()` must be called every loop iteration.  It returns immediately
//! unless the random ambient pattern is active and a frame is due, and it
//! flushes the strip at most once per frame interval.
//!
//! ## Random ambient
//!
//! Each frame, active pixels step their level by their delta, reversing at
//! the configured maximum and going idle at zero.  New fades are then
//! spawned on idle, dark pixels until the active count reaches the density
//! target, with at most [`SPAWN_ATTEMPTS`] random draws per frame.  The
//! active count therefore never exceeds the density but may briefly fall
//! short of it.

use crate::app::ports::{Clock, LedStripPort};
use crate::config::{CONFIRM_FLASH_STEP_MS, MAX_RANDOM_STEP, NUM_LEDS, clamp_percent};

/// Random draws per frame when looking for idle pixels.
pub const SPAWN_ATTEMPTS: u8 = 10;

// ── Colour ────────────────────────────────────────────────────

/// One RGBW pixel value, each channel 0–255.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Rgbw {
    pub const OFF: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// White mixed from the colour channels.
    pub const WHITE_RGB: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    /// Dedicated white channel only.
    pub const fn white(level: u8) -> Self {
        Self { r: 0, g: 0, b: 0, w: level }
    }

    /// Dedicated white channel at a percentage of full scale.
    pub const fn white_pct(pct: u8) -> Self {
        Self::white(percent_to_level(pct))
    }

    /// Scale every channel by `level / 255`.
    pub const fn scaled(self, level: u8) -> Self {
        const fn s(c: u8, level: u8) -> u8 {
            ((c as u16 * level as u16) / 255) as u8
        }
        Self {
            r: s(self.r, level),
            g: s(self.g, level),
            b: s(self.b, level),
            w: s(self.w, level),
        }
    }
}

/// Map 0–100 % onto 0–255.
pub const fn percent_to_level(pct: u8) -> u8 {
    ((clamp_percent(pct) as u16 * 255) / 100) as u8
}

/// Colour sequence of the selection flash, ending on full white.
pub const CONFIRM_SEQUENCE: [Rgbw; 5] = [
    Rgbw::GREEN,
    Rgbw::RED,
    Rgbw::BLUE,
    Rgbw::YELLOW,
    Rgbw::WHITE_RGB,
];

// ── PRNG ──────────────────────────────────────────────────────

/// Xorshift32: small, fast, good enough for twinkle placement.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of the generator.
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..bound` (`bound` > 0).
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }
}

// ── Pattern ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingPattern {
    Focus { position: usize, blend_standby: bool },
    Standby { brightness_pct: u8 },
    AmbientAll { brightness_pct: u8 },
    AmbientRandom { max_pct: u8, density: u8, frame_ms: u16, step: u8 },
}

impl LightingPattern {
    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::AmbientAll { .. } | Self::AmbientRandom { .. })
    }
}

/// Per-pixel fade state of the random ambient pattern.
#[derive(Debug, Clone)]
struct AmbientFades {
    levels: [u8; NUM_LEDS],
    deltas: [i8; NUM_LEDS],
    last_frame_ms: Option<u64>,
}

impl AmbientFades {
    const fn new() -> Self {
        Self {
            levels: [0; NUM_LEDS],
            deltas: [0; NUM_LEDS],
            last_frame_ms: None,
        }
    }
}

// ── Engine ────────────────────────────────────────────────────

pub struct LedAnimationEngine {
    pattern: LightingPattern,
    led_brightness_pct: u8,
    standby_brightness_pct: u8,
    ambient_frame_ms: u16,
    ambient_step: u8,
    fades: AmbientFades,
    paused: bool,
    rng: Xorshift32,
}

impl LedAnimationEngine {
    pub fn new(seed: u32) -> Self {
        Self {
            pattern: LightingPattern::Standby { brightness_pct: 0 },
            led_brightness_pct: 40,
            standby_brightness_pct: 30,
            ambient_frame_ms: 40,
            ambient_step: 6,
            fades: AmbientFades::new(),
            paused: false,
            rng: Xorshift32::new(seed),
        }
    }

    pub fn pattern(&self) -> LightingPattern {
        self.pattern
    }

    // ── Brightness knobs ──────────────────────────────────────

    /// Global strip brightness.  Applied to the hardware immediately.
    pub fn set_led_brightness_percent(&mut self, strip: &mut impl LedStripPort, pct: u8) {
        self.led_brightness_pct = clamp_percent(pct);
        strip.set_brightness(self.led_brightness_pct);
        strip.show();
    }

    pub fn led_brightness_percent(&self) -> u8 {
        self.led_brightness_pct
    }

    /// Level of the wash behind a blended focus.
    pub fn set_standby_brightness_percent(&mut self, pct: u8) {
        self.standby_brightness_pct = clamp_percent(pct);
    }

    pub fn standby_brightness_percent(&self) -> u8 {
        self.standby_brightness_pct
    }

    // ── Static patterns ───────────────────────────────────────

    /// Light `position` at full white.  With `blend_standby` the other
    /// slots keep the standby wash, otherwise they go dark.
    pub fn set_focus_mode(&mut self, strip: &mut impl LedStripPort, position: usize, blend_standby: bool) {
        self.leave_ambient();
        if blend_standby {
            strip.fill(Rgbw::white_pct(self.standby_brightness_pct));
        } else {
            strip.fill(Rgbw::OFF);
        }
        strip.set_pixel(position, Rgbw::white(u8::MAX));
        strip.show();
        self.pattern = LightingPattern::Focus {
            position,
            blend_standby,
        };
    }

    pub fn set_standby_mode(&mut self, strip: &mut impl LedStripPort, brightness_pct: u8) {
        self.leave_ambient();
        let brightness_pct = clamp_percent(brightness_pct);
        strip.fill(Rgbw::white_pct(brightness_pct));
        strip.show();
        self.pattern = LightingPattern::Standby { brightness_pct };
    }

    /// Blocking colour flash on `position`, then back to a focus on it.
    /// Only used as a short UI acknowledgement.  The other slots are
    /// repainted for the resulting focus before the flash starts.
    pub fn set_selected_mode<S>(&mut self, strip: &mut S, position: usize)
    where
        S: LedStripPort + Clock,
    {
        let blend_standby = matches!(
            self.pattern,
            LightingPattern::Focus {
                blend_standby: true,
                ..
            }
        );
        self.leave_ambient();
        if blend_standby {
            strip.fill(Rgbw::white_pct(self.standby_brightness_pct));
        } else {
            strip.fill(Rgbw::OFF);
        }
        for colour in CONFIRM_SEQUENCE {
            strip.set_pixel(position, colour);
            strip.show();
            strip.delay_ms(CONFIRM_FLASH_STEP_MS);
        }
        strip.set_pixel(position, Rgbw::white(u8::MAX));
        strip.show();
        self.pattern = LightingPattern::Focus {
            position,
            blend_standby,
        };
    }

    // ── Ambient patterns ──────────────────────────────────────

    pub fn set_ambient_all_lights(&mut self, strip: &mut impl LedStripPort, brightness_pct: u8) {
        self.leave_ambient();
        let brightness_pct = clamp_percent(brightness_pct);
        strip.fill(Rgbw::white_pct(brightness_pct));
        strip.show();
        self.pattern = LightingPattern::AmbientAll { brightness_pct };
    }

    /// Start twinkling.  All pixels begin dark and idle; the first
    /// `update()` spawns the first fades.
    pub fn start_ambient_random(&mut self, strip: &mut impl LedStripPort, max_pct: u8, density: u8) {
        self.fades = AmbientFades::new();
        self.paused = false;
        strip.fill(Rgbw::OFF);
        strip.show();
        self.pattern = LightingPattern::AmbientRandom {
            max_pct: clamp_percent(max_pct),
            density: density.max(1),
            frame_ms: self.ambient_frame_ms,
            step: self.ambient_step,
        };
    }

    /// Frame interval and per-frame level step.  Takes effect on the next
    /// frame when the random pattern is running.
    pub fn set_ambient_random_speed(&mut self, frame_ms: u16, step: u8) {
        self.ambient_frame_ms = frame_ms.max(1);
        self.ambient_step = step.clamp(1, MAX_RANDOM_STEP);
        if let LightingPattern::AmbientRandom {
            frame_ms: f, step: s, ..
        } = &mut self.pattern
        {
            *f = self.ambient_frame_ms;
            *s = self.ambient_step;
        }
    }

    pub fn ambient_random_speed(&self) -> (u16, u8) {
        (self.ambient_frame_ms, self.ambient_step)
    }

    pub fn is_ambient_active(&self) -> bool {
        self.pattern.is_ambient()
    }

    /// Leave any ambient pattern and blank the strip.
    pub fn stop_ambient(&mut self, strip: &mut impl LedStripPort) {
        if self.is_ambient_active() {
            self.clear_all(strip);
        }
    }

    /// Blank the strip.  The engine rests in `Standby { 0 }`.
    pub fn clear_all(&mut self, strip: &mut impl LedStripPort) {
        self.fades = AmbientFades::new();
        strip.fill(Rgbw::OFF);
        strip.show();
        self.pattern = LightingPattern::Standby { brightness_pct: 0 };
    }

    /// Freeze animation (menus).  The strip keeps its last frame.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.fades.last_frame_ms = None;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ── Animation ─────────────────────────────────────────────

    /// Advance one frame when due.  Returns `true` if the strip was flushed.
    pub fn update(&mut self, strip: &mut impl LedStripPort, now_ms: u64) -> bool {
        let LightingPattern::AmbientRandom {
            max_pct,
            density,
            frame_ms,
            step,
        } = self.pattern
        else {
            return false;
        };
        if self.paused {
            return false;
        }
        if let Some(last) = self.fades.last_frame_ms {
            if now_ms.saturating_sub(last) < u64::from(frame_ms) {
                return false;
            }
        }
        self.fades.last_frame_ms = Some(now_ms);

        let max_level = i16::from(percent_to_level(max_pct));
        let step = step.min(MAX_RANDOM_STEP) as i8;

        for (level, delta) in self.fades.levels.iter_mut().zip(self.fades.deltas.iter_mut()) {
            if *delta == 0 {
                continue;
            }
            let next = i16::from(*level) + i16::from(*delta);
            if next >= max_level {
                *level = max_level as u8;
                *delta = -step;
            } else if next <= 0 {
                *level = 0;
                *delta = 0;
            } else {
                *level = next as u8;
            }
        }

        let mut active = self.active_fades();
        let mut attempts = 0;
        while active < usize::from(density) && attempts < SPAWN_ATTEMPTS {
            attempts += 1;
            let i = self.rng.below(NUM_LEDS);
            if self.fades.deltas[i] == 0 && self.fades.levels[i] == 0 {
                self.fades.deltas[i] = step;
                active += 1;
            }
        }

        for (i, level) in self.fades.levels.iter().enumerate() {
            strip.set_pixel_white(i, *level);
        }
        strip.show();
        true
    }

    /// Pixels currently fading (nonzero delta).
    pub fn active_fades(&self) -> usize {
        self.fades.deltas.iter().filter(|d| **d != 0).count()
    }

    pub fn fade_levels(&self) -> &[u8; NUM_LEDS] {
        &self.fades.levels
    }

    /// Leaving the random pattern drops its per-pixel state.
    fn leave_ambient(&mut self) {
        if matches!(self.pattern, LightingPattern::AmbientRandom { .. }) {
            self.fades = AmbientFades::new();
        }
    }
}
