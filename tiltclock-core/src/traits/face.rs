//! Watchface and info page traits
//!
//! Hand geometry and face artwork live behind these traits; the refresh
//! scheduler only decides what to erase and redraw and in which order.

use super::canvas::{Canvas, DisplayError, Point};
use crate::battery::BatteryReading;
use crate::calendar::CalendarTime;
use crate::stats::SystemStats;

/// Hands and hand-like strokes of the analog face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hand {
    Hour,
    Minute,
    Second,
    /// Short counterweight stroke opposite the second hand
    SecondTail,
}

/// Paint a stroke in its own colour or in the background colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ink {
    Draw,
    Erase,
}

/// Endpoints of every hand for one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandSet {
    pub hour: Point,
    pub minute: Point,
    pub second: Point,
    pub second_tail: Point,
}

/// Values shown by the face overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceData {
    pub time: CalendarTime,
    pub steps_today: u32,
    pub battery_percent: u8,
}

/// Analog watchface artwork
pub trait WatchFace {
    /// Hand endpoints for a time
    fn hands(&self, time: &CalendarTime) -> HandSet;

    /// Paint the background over the whole screen
    fn clear<C: Canvas>(&self, canvas: &mut C) -> Result<(), DisplayError>;

    /// Date, step count, battery gauge and tick marks
    fn draw_overlays<C: Canvas>(&self, canvas: &mut C, data: &FaceData)
        -> Result<(), DisplayError>;

    /// Stroke one hand from the centre to `end`
    fn draw_hand<C: Canvas>(
        &self,
        canvas: &mut C,
        hand: Hand,
        end: Point,
        ink: Ink,
    ) -> Result<(), DisplayError>;

    /// Centre hub covering the hand roots
    fn draw_hub<C: Canvas>(&self, canvas: &mut C, ink: Ink) -> Result<(), DisplayError>;
}

/// Everything the info page shows
#[derive(Debug, Clone, Copy)]
pub struct InfoData<'a> {
    pub stats: &'a SystemStats,
    pub now: CalendarTime,
    pub battery: BatteryReading,
}

/// Statistics page
pub trait InfoScreen {
    /// Repaint the whole page
    fn draw<C: Canvas>(&self, canvas: &mut C, data: &InfoData<'_>) -> Result<(), DisplayError>;
}
