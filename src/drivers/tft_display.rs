//! ST7789 text renderer.
//!
//! Implements [`DisplayPort`] on top of any embedded-graphics
//! `DrawTarget<Color = Rgb565>` (the mipidsi panel on the device, a
//! framebuffer in tests) and drives the backlight through an embedded-hal
//! PWM channel.
//!
//! ```text
//!  ┌──────────────────────────────────────┐  y
//!  │             TITLE (yellow)           │  15
//!  │            subtitle (magenta)        │  45
//!  │ Design by:                           │  80
//!  │ author (cyan)                        │ 100
//!  │ Painted:                             │ 125
//!  │ date (cyan)                          │ 145
//!  └──────────────────────────────────────┘ 170
//! ```

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::config::{DEMO_MINIATURES, MAX_MINIATURES, clamp_percent};

const LIST_TOP: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const TEXT_X: i32 = 18;
const TRIANGLE_X: i32 = 6;

const DARK_BLUE: Rgb565 = Rgb565::new(0, 0, 10);
const GRAY: Rgb565 = Rgb565::new(21, 42, 21);

pub struct TftDisplay<D, B> {
    target: D,
    backlight: B,
    backlight_on: bool,
    backlight_pct: u8,
}

impl<D, B> TftDisplay<D, B>
where
    D: DrawTarget<Color = Rgb565>,
    B: SetDutyCycle,
{
    pub fn new(target: D, backlight: B) -> Self {
        let mut display = Self {
            target,
            backlight,
            backlight_on: true,
            backlight_pct: 100,
        };
        display.clear();
        display.apply_backlight();
        display
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn backlight_duty_percent(&self) -> u8 {
        if self.backlight_on { self.backlight_pct } else { 0 }
    }

    fn width(&self) -> i32 {
        self.target.bounding_box().size.width as i32
    }

    fn height(&self) -> i32 {
        self.target.bounding_box().size.height as i32
    }

    fn clear(&mut self) {
        let _ = self.target.clear(Rgb565::BLACK);
    }

    fn text(&mut self, s: &str, x: i32, y: i32, font: &'static MonoFont<'static>, colour: Rgb565) {
        let style = MonoTextStyle::new(font, colour);
        let _ = Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(&mut self.target);
    }

    fn centered(&mut self, s: &str, y: i32, font: &'static MonoFont<'static>, colour: Rgb565) {
        let style = MonoTextStyle::new(font, colour);
        let layout = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        let x = self.width() / 2;
        let _ = Text::with_text_style(s, Point::new(x, y), style, layout).draw(&mut self.target);
    }

    fn card(&mut self, title: &str, subtitle: &str, author: &str, date: &str) {
        self.clear();
        self.centered(title, 15, &FONT_10X20, Rgb565::YELLOW);
        self.centered(subtitle, 45, &FONT_10X20, Rgb565::MAGENTA);
        self.text("Design by:", 10, 80, &FONT_10X20, Rgb565::WHITE);
        self.text(author, 10, 100, &FONT_10X20, Rgb565::CYAN);
        self.text("Painted:", 10, 125, &FONT_10X20, Rgb565::WHITE);
        self.text(date, 10, 145, &FONT_10X20, Rgb565::CYAN);
    }

    fn check_mark(&mut self, y: i32) {
        let x = self.width() - 16;
        let mid = y + 10;
        let stroke = PrimitiveStyle::with_stroke(Rgb565::GREEN, 2);
        let _ = Line::new(Point::new(x, mid), Point::new(x + 3, mid + 3))
            .into_styled(stroke)
            .draw(&mut self.target);
        let _ = Line::new(Point::new(x + 3, mid + 3), Point::new(x + 10, mid - 4))
            .into_styled(stroke)
            .draw(&mut self.target);
    }

    fn apply_backlight(&mut self) {
        let duty = self.backlight_duty_percent();
        if self.backlight.set_duty_cycle_percent(duty).is_err() {
            warn!("TFT: backlight PWM write failed");
        }
    }
}

impl<D, B> DisplayPort for TftDisplay<D, B>
where
    D: DrawTarget<Color = Rgb565>,
    B: SetDutyCycle,
{
    fn show_options(&mut self, options: &[&str], focus: usize, selected: Option<usize>, footer: Option<&str>) {
        self.clear();
        let w = self.width() as u32;

        for (i, option) in options.iter().enumerate() {
            let y = LIST_TOP + i as i32 * LINE_HEIGHT;
            let focused = i == focus;
            let checked = selected == Some(i);

            if focused {
                let _ = Rectangle::new(Point::new(0, y - 2), Size::new(w, LINE_HEIGHT as u32))
                    .into_styled(PrimitiveStyle::with_fill(DARK_BLUE))
                    .draw(&mut self.target);
                let _ = Triangle::new(
                    Point::new(TRIANGLE_X, y + 6),
                    Point::new(TRIANGLE_X, y + 14),
                    Point::new(TRIANGLE_X + 6, y + 10),
                )
                .into_styled(PrimitiveStyle::with_fill(Rgb565::YELLOW))
                .draw(&mut self.target);
            }
            if checked {
                self.check_mark(y);
            }

            let colour = if focused {
                Rgb565::YELLOW
            } else if checked {
                Rgb565::GREEN
            } else {
                Rgb565::WHITE
            };
            self.text(option, TEXT_X, y, &FONT_10X20, colour);
        }

        if let Some(hint) = footer.filter(|h| !h.is_empty()) {
            let y = self.height() - 14;
            self.text(hint, 6, y, &FONT_6X10, GRAY);
        }
    }

    fn show_miniature_info(&mut self, index: usize) {
        let Some(m) = DEMO_MINIATURES.get(index) else {
            return;
        };
        self.card(m.name, m.author, m.author, m.date);
        let mut pos: heapless::String<16> = heapless::String::new();
        let _ = core::fmt::write(&mut pos, format_args!("Pos {}/{}", index + 1, MAX_MINIATURES));
        let y = self.height() - 22;
        self.text(&pos, 10, y, &FONT_10X20, Rgb565::WHITE);
    }

    fn show_mode(&mut self, title: &str, message: &str) {
        self.clear();
        self.centered(title, 15, &FONT_10X20, Rgb565::MAGENTA);
        self.centered(message, 100, &FONT_10X20, Rgb565::CYAN);
    }

    fn show_info(&mut self, title: &str, subtitle: &str, author: &str, date: &str) {
        self.card(title, subtitle, author, date);
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight_on = on;
        self.apply_backlight();
    }

    fn set_backlight_brightness_percent(&mut self, pct: u8) {
        self.backlight_pct = clamp_percent(pct);
        self.apply_backlight();
    }
}
