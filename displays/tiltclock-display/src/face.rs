//! Analog watchface
//!
//! Hands run from the dial centre; position 0 points along +x because the
//! panel is mounted a quarter turn clockwise, which is also why every
//! label is drawn with one extra quarter turn of rotation.

use core::fmt::Write;

use heapless::String;
use tiltclock_core::calendar::CalendarTime;
use tiltclock_core::traits::{
    Canvas, Color565, DisplayError, FaceData, Hand, HandSet, Ink, Point, WatchFace,
};

use crate::trig::{cos60, scale, scale_round, sin60};

/// Face colours
pub mod colors {
    use tiltclock_core::traits::Color565;

    pub const BACKGROUND: Color565 = Color565::BLACK;
    pub const FACE: Color565 = Color565::WHITE;
    pub const HOUR_HAND: Color565 = Color565::WHITE;
    pub const MINUTE_HAND: Color565 = Color565::WHITE;
    pub const SECOND_HAND: Color565 = Color565::RED;
    pub const ACCENT: Color565 = Color565::RED;
    pub const STEPS: Color565 = Color565::WHITE;
}

/// Overlay text size
const LABEL_SIZE: u8 = 2;
/// Margin painted around each label box
const LABEL_MARGIN: i16 = 2;

/// Hand lengths in percent of the radius
const HOUR_PERCENT: i32 = 56;
const MINUTE_PERCENT: i32 = 84;
const SECOND_PERCENT: i32 = 90;
const TAIL_PERCENT: i32 = 12;

const HUB_RADIUS: i16 = 6;
const HUB_CAP_RADIUS: i16 = 3;

/// Half width of the five-minute tick marks
const MAJOR_TICK_HALF_WIDTH: i32 = 2;

/// Battery icon geometry, in the label frame
mod icon {
    pub const RESERVE_W: i16 = 24;
    pub const RESERVE_H: i16 = 16;
    pub const BODY_W: i16 = 20;
    pub const BODY_H: i16 = 10;
    pub const NUB_W: i16 = 3;
    pub const NUB_H: i16 = 4;
}

/// The analog face for a round panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogFace {
    center: Point,
    radius: i16,
}

impl AnalogFace {
    /// Geometry of the 240x240 panel
    pub const fn new() -> Self {
        Self::with_geometry(Point::new(120, 119), 120)
    }

    pub const fn with_geometry(center: Point, radius: i16) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    fn length(&self, percent: i32) -> i32 {
        i32::from(self.radius) * percent / 100
    }

    /// Point at dial position `index`, `length` pixels from the centre
    fn along(&self, index: usize, length: i32) -> Point {
        Point::new(
            self.center.x + scale(cos60(index), length) as i16,
            self.center.y + scale(sin60(index), length) as i16,
        )
    }

    fn draw_ticks<C: Canvas>(&self, canvas: &mut C) -> Result<(), DisplayError> {
        let radius = i32::from(self.radius);
        for index in 0..60 {
            let outer = self.along(index, radius - 2);
            if index % 5 == 0 {
                let inner = self.along(index, radius - 14);
                // Normal to the radial direction
                let nx = scale_round(-sin60(index), MAJOR_TICK_HALF_WIDTH) as i16;
                let ny = scale_round(cos60(index), MAJOR_TICK_HALF_WIDTH) as i16;
                let inner_a = inner.offset(nx, ny);
                let inner_b = inner.offset(-nx, -ny);
                let outer_a = outer.offset(nx, ny);
                let outer_b = outer.offset(-nx, -ny);
                canvas.fill_triangle(inner_a, inner_b, outer_a, colors::FACE)?;
                canvas.fill_triangle(outer_a, outer_b, inner_b, colors::FACE)?;
            } else {
                let inner = self.along(index, radius - 6);
                canvas.draw_line(inner, outer, colors::FACE)?;
            }
        }
        Ok(())
    }

    fn draw_date<C: Canvas>(&self, canvas: &mut C, time: &CalendarTime) -> Result<(), DisplayError> {
        let mut day: String<2> = String::new();
        write!(day, "{:02}", time.day()).map_err(|_| DisplayError::Panel)?;

        let anchor = self.center.offset(25, 75);
        label(
            canvas,
            anchor.offset(0, -18),
            time.weekday_name(),
            colors::FACE,
            3,
        )?;
        label(canvas, anchor.offset(-6, 9), &day, colors::ACCENT, 2)
    }

    fn draw_steps<C: Canvas>(&self, canvas: &mut C, steps: u32) -> Result<(), DisplayError> {
        let mut text: String<10> = String::new();
        write!(text, "{}", steps).map_err(|_| DisplayError::Panel)?;
        label(canvas, self.center.offset(-25, 30), &text, colors::STEPS, 6)
    }

    fn draw_battery<C: Canvas>(&self, canvas: &mut C, percent: u8) -> Result<(), DisplayError> {
        let percent = percent.min(100);
        let mut text: String<3> = String::new();
        write!(text, "{}", percent).map_err(|_| DisplayError::Panel)?;

        let anchor = self.center.offset(25, -40);
        quarter_turn(canvas, anchor.offset(-5, -40), |canvas, center| {
            battery_icon(canvas, center, percent)
        })?;
        label(canvas, anchor.offset(0, -1), &text, colors::FACE, 3)?;
        label(canvas, anchor.offset(-12, 15), "%", colors::ACCENT, 1)
    }
}

impl Default for AnalogFace {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchFace for AnalogFace {
    fn hands(&self, time: &CalendarTime) -> HandSet {
        let hour_index = usize::from(time.hour() % 12) * 5 + usize::from(time.minute() / 12);
        let minute_index = usize::from(time.minute() % 60);
        let second_index = usize::from(time.second() % 60);

        let tail = self.length(TAIL_PERCENT);
        HandSet {
            hour: self.along(hour_index, self.length(HOUR_PERCENT)),
            minute: self.along(minute_index, self.length(MINUTE_PERCENT)),
            second: self.along(second_index, self.length(SECOND_PERCENT)),
            second_tail: Point::new(
                self.center.x - scale(cos60(second_index), tail) as i16,
                self.center.y - scale(sin60(second_index), tail) as i16,
            ),
        }
    }

    fn clear<C: Canvas>(&self, canvas: &mut C) -> Result<(), DisplayError> {
        canvas.fill_screen(colors::BACKGROUND)
    }

    fn draw_overlays<C: Canvas>(
        &self,
        canvas: &mut C,
        data: &FaceData,
    ) -> Result<(), DisplayError> {
        self.draw_date(canvas, &data.time)?;
        self.draw_steps(canvas, data.steps_today)?;
        self.draw_battery(canvas, data.battery_percent)?;
        self.draw_ticks(canvas)
    }

    fn draw_hand<C: Canvas>(
        &self,
        canvas: &mut C,
        hand: Hand,
        end: Point,
        ink: Ink,
    ) -> Result<(), DisplayError> {
        let color = match (ink, hand) {
            (Ink::Erase, _) => colors::BACKGROUND,
            (Ink::Draw, Hand::Hour) => colors::HOUR_HAND,
            (Ink::Draw, Hand::Minute) => colors::MINUTE_HAND,
            (Ink::Draw, Hand::Second | Hand::SecondTail) => colors::SECOND_HAND,
        };
        match hand {
            Hand::Hour | Hand::Minute => {
                // Three pixels wide
                canvas.draw_line(self.center, end, color)?;
                canvas.draw_line(self.center.offset(-1, -1), end.offset(-1, -1), color)?;
                canvas.draw_line(self.center.offset(1, 1), end.offset(1, 1), color)
            }
            Hand::Second | Hand::SecondTail => canvas.draw_line(self.center, end, color),
        }
    }

    fn draw_hub<C: Canvas>(&self, canvas: &mut C, ink: Ink) -> Result<(), DisplayError> {
        match ink {
            Ink::Draw => {
                canvas.fill_circle(self.center, HUB_RADIUS, colors::FACE)?;
                canvas.fill_circle(self.center, HUB_CAP_RADIUS, colors::SECOND_HAND)
            }
            Ink::Erase => canvas.fill_circle(self.center, HUB_RADIUS, colors::BACKGROUND),
        }
    }
}

/// Run `draw` one quarter turn clockwise from the current rotation
///
/// `center` is given in the current frame and handed to `draw` in the
/// rotated one. The previous rotation is restored even when drawing fails.
fn quarter_turn<C, F>(canvas: &mut C, center: Point, draw: F) -> Result<(), DisplayError>
where
    C: Canvas,
    F: FnOnce(&mut C, Point) -> Result<(), DisplayError>,
{
    let previous = canvas.rotation();
    let rotated = Point::new(center.y, canvas.width() - 1 - center.x);
    canvas.set_rotation((previous + 1) % 4);
    let result = draw(canvas, rotated);
    canvas.set_rotation(previous);
    result
}

/// Boxed label of up to `max_chars` glyphs centred on `center`
///
/// The whole box is repainted so a shorter value leaves no residue.
fn label<C: Canvas>(
    canvas: &mut C,
    center: Point,
    text: &str,
    color: Color565,
    max_chars: i16,
) -> Result<(), DisplayError> {
    quarter_turn(canvas, center, |canvas, center| {
        let (glyph_w, glyph_h) = canvas.measure_text("0", LABEL_SIZE);
        let box_w = glyph_w * max_chars;
        let top = center.y - glyph_h / 2;
        canvas.fill_rect(
            Point::new(center.x - box_w / 2 - LABEL_MARGIN, top - LABEL_MARGIN),
            box_w + 2 * LABEL_MARGIN,
            glyph_h + 2 * LABEL_MARGIN,
            colors::BACKGROUND,
        )?;
        let (text_w, _) = canvas.measure_text(text, LABEL_SIZE);
        canvas.draw_text(
            Point::new(center.x - text_w / 2, top),
            text,
            color,
            colors::BACKGROUND,
            LABEL_SIZE,
        )
    })
}

/// Width of the charge bar inside a body `inner_width` pixels wide
pub fn battery_fill_width(inner_width: i16, percent: u8) -> i16 {
    let percent = i16::from(percent.min(100));
    (inner_width * percent / 100).clamp(0, inner_width)
}

fn battery_icon<C: Canvas>(canvas: &mut C, center: Point, percent: u8) -> Result<(), DisplayError> {
    use icon::*;

    let reserve = center.offset(-RESERVE_W / 2, -RESERVE_H / 2);
    canvas.fill_rect(
        reserve.offset(-LABEL_MARGIN, -LABEL_MARGIN),
        RESERVE_W + 2 * LABEL_MARGIN,
        RESERVE_H + 2 * LABEL_MARGIN,
        colors::BACKGROUND,
    )?;

    let body = reserve.offset((RESERVE_W - BODY_W) / 2, (RESERVE_H - BODY_H) / 2);
    canvas.draw_rect(body, BODY_W, BODY_H, colors::FACE)?;
    canvas.fill_rect(
        body.offset(BODY_W, (BODY_H - NUB_H) / 2),
        NUB_W,
        NUB_H,
        colors::FACE,
    )?;

    let fill = battery_fill_width(BODY_W - 2, percent);
    if fill > 0 {
        canvas.fill_rect(body.offset(1, 1), fill, BODY_H - 2, colors::FACE)?;
    }
    Ok(())
}
