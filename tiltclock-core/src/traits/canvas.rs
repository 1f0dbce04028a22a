//! Drawing surface trait
//!
//! The runtime never talks to a panel driver directly; it issues these
//! primitives and the board supplies the rasteriser.

use thiserror::Error;

/// Errors from the panel or its bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed
    #[error("display bus error")]
    Bus,
    /// Panel did not accept a command
    #[error("panel command failed")]
    Panel,
}

/// RGB565 colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color565(pub u16);

impl Color565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
}

/// Pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy)
    pub const fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Drawing surface of the round panel
///
/// Coordinates follow the current rotation (0-3, quarter turns clockwise).
pub trait Canvas {
    /// Fill the whole screen
    fn fill_screen(&mut self, color: Color565) -> Result<(), DisplayError>;

    /// Fill a rectangle with its top-left corner at `origin`
    fn fill_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError>;

    /// One pixel outline of a rectangle
    fn draw_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError>;

    /// One pixel line
    fn draw_line(&mut self, from: Point, to: Point, color: Color565) -> Result<(), DisplayError>;

    fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Color565,
    ) -> Result<(), DisplayError>;

    fn fill_circle(&mut self, center: Point, radius: i16, color: Color565)
        -> Result<(), DisplayError>;

    /// Current rotation in quarter turns
    fn rotation(&self) -> u8;

    /// Set rotation in quarter turns (taken modulo 4)
    fn set_rotation(&mut self, rotation: u8);

    /// Draw text with its top-left corner at `origin`
    ///
    /// `size` scales the 6x8 base glyph cell.
    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        foreground: Color565,
        background: Color565,
        size: u8,
    ) -> Result<(), DisplayError>;

    /// Width and height of `text` at `size`
    fn measure_text(&self, text: &str, size: u8) -> (i16, i16) {
        let size = i16::from(size);
        (text.len() as i16 * 6 * size, 8 * size)
    }

    /// Width in the current rotation
    fn width(&self) -> i16;

    /// Height in the current rotation
    fn height(&self) -> i16;

    /// Wake the panel and show its contents
    fn display_on(&mut self) -> Result<(), DisplayError>;

    /// Blank the panel and put it into its sleep mode
    fn display_off(&mut self) -> Result<(), DisplayError>;

    /// Run the panel init sequence again after its rail was cut
    fn reinit(&mut self) -> Result<(), DisplayError>;
}
