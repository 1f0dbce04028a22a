//! Statistics page
//!
//! A column of centred text lines drawn a quarter turn clockwise, like
//! the face labels.

use core::fmt::Write;

use heapless::{String, Vec};
use tiltclock_core::calendar::CalendarTime;
use tiltclock_core::traits::{Canvas, DisplayError, InfoData, InfoScreen, Point};

use crate::face::colors;

/// Longest line on the page
pub const LINE_CAPACITY: usize = 32;
/// Most lines on the page
pub const MAX_LINES: usize = 16;

/// Top of the first line
const FIRST_LINE_Y: i16 = 18;

/// One line of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub size: u8,
    pub text: String<LINE_CAPACITY>,
    /// Gap below the line
    pub spacing: i16,
}

/// Lines of the page for `data`, top to bottom
pub fn info_lines(data: &InfoData<'_>) -> Vec<InfoLine, MAX_LINES> {
    let stats = data.stats;
    let mut lines = Vec::new();
    let reason = stats.reset_reason().map_or("?", |reason| reason.label());

    push_line(&mut lines, 2, 10, format_args!("INFO"));
    push_line(&mut lines, 1, 6, format_args!("Hard resets: {}", stats.hard_resets));
    push_line(&mut lines, 1, 6, format_args!("Soft resets: {}", stats.soft_resets));
    push_line(
        &mut lines,
        1,
        6,
        format_args!("Sync ok/fail: {} / {}", stats.sync_successes, stats.sync_failures),
    );
    match &stats.last_sync {
        Some(time) => {
            push_line(&mut lines, 1, 4, format_args!("Last sync:"));
            push_line(&mut lines, 1, 4, format_args!("{}", DateText(time)));
            push_line(&mut lines, 1, 6, format_args!("{}", ClockText(time)));
        }
        None => push_line(&mut lines, 1, 6, format_args!("Last sync: --")),
    }
    push_line(&mut lines, 1, 4, format_args!("Now:"));
    push_line(&mut lines, 1, 4, format_args!("{}", ClockText(&data.now)));
    push_line(&mut lines, 1, 6, format_args!("{}", DateText(&data.now)));
    push_line(
        &mut lines,
        1,
        6,
        format_args!("Battery: {}% {} mV", data.battery.percent, data.battery.millivolts),
    );
    push_line(&mut lines, 1, 6, format_args!("Screen wakes: {}", stats.screen_wakes));
    push_line(&mut lines, 1, 0, format_args!("Reset reason: {}", reason));
    lines
}

fn push_line(
    lines: &mut Vec<InfoLine, MAX_LINES>,
    size: u8,
    spacing: i16,
    args: core::fmt::Arguments<'_>,
) {
    let mut text = String::new();
    // Overlong lines are cut, not dropped
    let _ = text.write_fmt(args);
    let _ = lines.push(InfoLine {
        size,
        text,
        spacing,
    });
}

/// `HH:MM:SS`
struct ClockText<'a>(&'a CalendarTime);

impl core::fmt::Display for ClockText<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

/// `YYYY-MM-DD`
struct DateText<'a>(&'a CalendarTime);

impl core::fmt::Display for DateText<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

/// The statistics page
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoPage;

impl InfoScreen for InfoPage {
    fn draw<C: Canvas>(&self, canvas: &mut C, data: &InfoData<'_>) -> Result<(), DisplayError> {
        let previous = canvas.rotation();
        canvas.set_rotation((previous + 1) % 4);
        let result = draw_lines(canvas, &info_lines(data));
        canvas.set_rotation(previous);
        result
    }
}

fn draw_lines<C: Canvas>(canvas: &mut C, lines: &[InfoLine]) -> Result<(), DisplayError> {
    canvas.fill_screen(colors::BACKGROUND)?;

    let mut y = FIRST_LINE_Y;
    for line in lines {
        let (w, h) = canvas.measure_text(&line.text, line.size);
        let x = (canvas.width() - w) / 2;
        canvas.draw_text(
            Point::new(x, y),
            &line.text,
            colors::FACE,
            colors::BACKGROUND,
            line.size,
        )?;
        y += h + line.spacing;
    }
    Ok(())
}
