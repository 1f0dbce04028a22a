//! Host test doubles

use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use std::vec;
use std::vec::Vec;
use tiltclock_core::traits::DisplayError;

use crate::canvas::PanelPower;

/// In-memory RGB565 frame, black at start
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        self.pixels[(y as u32 * self.width + x as u32) as usize]
    }

    /// Pixels that differ from black
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != Rgb565::BLACK).count()
    }

    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.width
                && (point.y as u32) < self.height
            {
                let index = (point.y as u32 * self.width + point.x as u32) as usize;
                self.pixels[index] = color;
            }
        }
        Ok(())
    }
}

/// Panel power commands as seen by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOp {
    Init,
    Sleep,
    Wake,
}

#[derive(Default)]
pub struct RecordingPanel {
    pub ops: Vec<PanelOp>,
    pub fail: bool,
}

impl PanelPower for RecordingPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.record(PanelOp::Init)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.record(PanelOp::Sleep)
    }

    fn wake(&mut self) -> Result<(), DisplayError> {
        self.record(PanelOp::Wake)
    }
}

impl RecordingPanel {
    fn record(&mut self, op: PanelOp) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Panel);
        }
        self.ops.push(op);
        Ok(())
    }
}
