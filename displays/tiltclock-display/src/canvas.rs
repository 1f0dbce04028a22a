//! `Canvas` on top of an `embedded-graphics` draw target
//!
//! Rotation is done in software: every pixel is mapped from the rotated
//! frame to the physical frame before it reaches the target, and solid
//! fills are mapped as whole rectangles. Text uses a 6x9 monospace font;
//! sizes above one scale each glyph pixel into a square block.

use embedded_graphics::geometry::Dimensions;
use embedded_graphics::mono_font::ascii::FONT_6X9;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{DrawTarget, Pixel, Point as EgPoint, Primitive, Size};
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable as EgDrawable;
use tiltclock_core::traits::{Canvas, Color565, DisplayError, Point};

/// Font behind every `draw_text` call
const FONT: &MonoFont<'static> = &FONT_6X9;

/// Panel commands that are not pixel traffic
///
/// Implemented by the board's panel driver.
pub trait PanelPower {
    /// Run the full init sequence (after the panel rail was cut)
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Display off and sleep-in
    fn sleep(&mut self) -> Result<(), DisplayError>;

    /// Sleep-out and display on
    fn wake(&mut self) -> Result<(), DisplayError>;
}

/// Panel without power control, for simulators and always-on panels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPanel;

impl PanelPower for NoPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn wake(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Convert a packed RGB565 value
pub fn to_rgb565(color: Color565) -> Rgb565 {
    Rgb565::from(RawU16::new(color.0))
}

fn to_eg(point: Point) -> EgPoint {
    EgPoint::new(i32::from(point.x), i32::from(point.y))
}

/// Map a point of the rotated frame to the physical frame
///
/// `physical` is the unrotated target size; rotation is in quarter turns
/// clockwise.
pub fn rotate_point(point: EgPoint, rotation: u8, physical: Size) -> EgPoint {
    let w = physical.width as i32;
    let h = physical.height as i32;
    match rotation % 4 {
        0 => point,
        1 => EgPoint::new(w - 1 - point.y, point.x),
        2 => EgPoint::new(w - 1 - point.x, h - 1 - point.y),
        _ => EgPoint::new(point.y, h - 1 - point.x),
    }
}

/// Draw target seen through a rotation
struct Rotated<'a, D> {
    target: &'a mut D,
    rotation: u8,
    physical: Size,
}

impl<D> Dimensions for Rotated<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        let size = if self.rotation % 2 == 0 {
            self.physical
        } else {
            Size::new(self.physical.height, self.physical.width)
        };
        Rectangle::new(EgPoint::zero(), size)
    }
}

impl<D: DrawTarget<Color = Rgb565>> DrawTarget for Rotated<'_, D> {
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (rotation, physical) = (self.rotation, self.physical);
        self.target.draw_iter(
            pixels
                .into_iter()
                .map(|Pixel(p, c)| Pixel(rotate_point(p, rotation, physical), c)),
        )
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let a = rotate_point(area.top_left, self.rotation, self.physical);
        let b = rotate_point(bottom_right, self.rotation, self.physical);
        self.target.fill_solid(&Rectangle::with_corners(a, b), color)
    }
}

/// Draw target that magnifies every pixel into a `scale` x `scale` block
/// anchored at `origin`
struct Scaled<'a, T> {
    target: &'a mut T,
    origin: EgPoint,
    scale: i32,
}

impl<T: DrawTarget<Color = Rgb565>> Scaled<'_, T> {
    fn block(&self, point: EgPoint) -> EgPoint {
        self.origin + (point - self.origin) * self.scale
    }
}

impl<T: DrawTarget<Color = Rgb565>> Dimensions for Scaled<'_, T> {
    fn bounding_box(&self) -> Rectangle {
        let outer = self.target.bounding_box();
        let scale = self.scale as u32;
        Rectangle::new(
            self.origin,
            Size::new(outer.size.width / scale + 1, outer.size.height / scale + 1),
        )
    }
}

impl<T: DrawTarget<Color = Rgb565>> DrawTarget for Scaled<'_, T> {
    type Color = Rgb565;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let block = Size::new_equal(self.scale as u32);
        for Pixel(point, color) in pixels {
            let top_left = self.block(point);
            self.target.fill_solid(&Rectangle::new(top_left, block), color)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let scaled = Rectangle::new(self.block(area.top_left), area.size * self.scale as u32);
        self.target.fill_solid(&scaled, color)
    }
}

/// [`Canvas`] over an RGB565 draw target plus its panel power commands
pub struct GraphicsCanvas<D, P> {
    target: D,
    panel: P,
    rotation: u8,
}

impl<D, P> GraphicsCanvas<D, P>
where
    D: DrawTarget<Color = Rgb565>,
    P: PanelPower,
{
    /// Wrap a target at rotation 0
    pub fn new(target: D, panel: P) -> Self {
        Self {
            target,
            panel,
            rotation: 0,
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Take the target and panel back
    pub fn release(self) -> (D, P) {
        (self.target, self.panel)
    }

    fn physical(&self) -> Size {
        self.target.bounding_box().size
    }

    fn rotated(&mut self) -> Rotated<'_, D> {
        let physical = self.physical();
        Rotated {
            target: &mut self.target,
            rotation: self.rotation,
            physical,
        }
    }

    fn draw<T>(&mut self, drawable: T) -> Result<(), DisplayError>
    where
        T: EgDrawable<Color = Rgb565>,
    {
        drawable
            .draw(&mut self.rotated())
            .map(|_| ())
            .map_err(|_| DisplayError::Bus)
    }
}

impl<D, P> Canvas for GraphicsCanvas<D, P>
where
    D: DrawTarget<Color = Rgb565>,
    P: PanelPower,
{
    fn fill_screen(&mut self, color: Color565) -> Result<(), DisplayError> {
        self.target
            .clear(to_rgb565(color))
            .map_err(|_| DisplayError::Bus)
    }

    fn fill_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let area = Rectangle::new(to_eg(origin), Size::new(width as u32, height as u32));
        self.rotated()
            .fill_solid(&area, to_rgb565(color))
            .map_err(|_| DisplayError::Bus)
    }

    fn draw_rect(
        &mut self,
        origin: Point,
        width: i16,
        height: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let area = Rectangle::new(to_eg(origin), Size::new(width as u32, height as u32));
        self.draw(area.into_styled(PrimitiveStyle::with_stroke(to_rgb565(color), 1)))
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color565) -> Result<(), DisplayError> {
        let line = Line::new(to_eg(from), to_eg(to));
        self.draw(line.into_styled(PrimitiveStyle::with_stroke(to_rgb565(color), 1)))
    }

    fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Color565,
    ) -> Result<(), DisplayError> {
        let triangle = Triangle::new(to_eg(a), to_eg(b), to_eg(c));
        self.draw(triangle.into_styled(PrimitiveStyle::with_fill(to_rgb565(color))))
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: i16,
        color: Color565,
    ) -> Result<(), DisplayError> {
        if radius < 0 {
            return Ok(());
        }
        let diameter = 2 * radius as u32 + 1;
        let circle = Circle::with_center(to_eg(center), diameter);
        self.draw(circle.into_styled(PrimitiveStyle::with_fill(to_rgb565(color))))
    }

    fn rotation(&self) -> u8 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation % 4;
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        foreground: Color565,
        background: Color565,
        size: u8,
    ) -> Result<(), DisplayError> {
        let style = MonoTextStyleBuilder::new()
            .font(FONT)
            .text_color(to_rgb565(foreground))
            .background_color(to_rgb565(background))
            .build();
        let origin = to_eg(origin);
        let text = Text::with_baseline(text, origin, style, Baseline::Top);

        let mut rotated = self.rotated();
        let result = if size <= 1 {
            text.draw(&mut rotated).map(|_| ())
        } else {
            let mut scaled = Scaled {
                target: &mut rotated,
                origin,
                scale: i32::from(size),
            };
            text.draw(&mut scaled).map(|_| ())
        };
        result.map_err(|_| DisplayError::Bus)
    }

    /// Measured with the 6x9 font cell
    fn measure_text(&self, text: &str, size: u8) -> (i16, i16) {
        let size = i16::from(size.max(1));
        let cell = FONT.character_size;
        (
            text.len() as i16 * cell.width as i16 * size,
            cell.height as i16 * size,
        )
    }

    fn width(&self) -> i16 {
        let physical = self.physical();
        if self.rotation % 2 == 0 {
            physical.width as i16
        } else {
            physical.height as i16
        }
    }

    fn height(&self) -> i16 {
        let physical = self.physical();
        if self.rotation % 2 == 0 {
            physical.height as i16
        } else {
            physical.width as i16
        }
    }

    fn display_on(&mut self) -> Result<(), DisplayError> {
        self.panel.wake()
    }

    fn display_off(&mut self) -> Result<(), DisplayError> {
        self.panel.sleep()
    }

    fn reinit(&mut self) -> Result<(), DisplayError> {
        self.panel.init()?;
        // Panel RAM is undefined after power-up
        self.fill_screen(Color565::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FrameBuffer, PanelOp, RecordingPanel};
    use embedded_graphics::prelude::RgbColor;

    fn canvas(width: u32, height: u32) -> GraphicsCanvas<FrameBuffer, RecordingPanel> {
        GraphicsCanvas::new(FrameBuffer::new(width, height), RecordingPanel::default())
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_rgb565(Color565::RED), Rgb565::RED);
        assert_eq!(to_rgb565(Color565::WHITE), Rgb565::WHITE);
        assert_eq!(to_rgb565(Color565::BLACK), Rgb565::BLACK);
    }

    #[test]
    fn test_rotation_maps_corners() {
        let size = Size::new(240, 240);
        let origin = EgPoint::zero();
        assert_eq!(rotate_point(origin, 0, size), EgPoint::new(0, 0));
        assert_eq!(rotate_point(origin, 1, size), EgPoint::new(239, 0));
        assert_eq!(rotate_point(origin, 2, size), EgPoint::new(239, 239));
        assert_eq!(rotate_point(origin, 3, size), EgPoint::new(0, 239));
    }

    #[test]
    fn test_fill_rect_under_rotation() {
        let mut canvas = canvas(240, 240);
        canvas.set_rotation(1);
        canvas
            .fill_rect(Point::new(0, 0), 2, 1, Color565::RED)
            .unwrap();

        let fb = canvas.target();
        // Rotated x runs down the physical right edge
        assert_eq!(fb.pixel(239, 0), Rgb565::RED);
        assert_eq!(fb.pixel(239, 1), Rgb565::RED);
        assert_eq!(fb.count(Rgb565::RED), 2);
    }

    #[test]
    fn test_dimensions_follow_rotation() {
        let mut canvas = canvas(8, 4);
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
        canvas.set_rotation(5);
        assert_eq!(canvas.rotation(), 1);
        assert_eq!((canvas.width(), canvas.height()), (4, 8));
    }

    #[test]
    fn test_degenerate_rect_is_noop() {
        let mut canvas = canvas(16, 16);
        canvas
            .fill_rect(Point::new(2, 2), 0, 5, Color565::WHITE)
            .unwrap();
        canvas
            .draw_rect(Point::new(2, 2), 5, -1, Color565::WHITE)
            .unwrap();
        assert_eq!(canvas.target().lit(), 0);
    }

    #[test]
    fn test_circle_and_line() {
        let mut canvas = canvas(32, 32);
        canvas
            .fill_circle(Point::new(16, 16), 3, Color565::WHITE)
            .unwrap();
        assert_eq!(canvas.target().pixel(16, 16), Rgb565::WHITE);
        assert_eq!(canvas.target().pixel(16, 19), Rgb565::WHITE);
        assert_eq!(canvas.target().pixel(16, 21), Rgb565::BLACK);

        canvas
            .draw_line(Point::new(0, 0), Point::new(0, 9), Color565::RED)
            .unwrap();
        assert_eq!(canvas.target().count(Rgb565::RED), 10);
    }

    #[test]
    fn test_text_scales_with_background() {
        let mut small = canvas(64, 32);
        small
            .draw_text(Point::new(0, 0), "8", Color565::WHITE, Color565::RED, 1)
            .unwrap();
        let mut large = canvas(64, 32);
        large
            .draw_text(Point::new(0, 0), "8", Color565::WHITE, Color565::RED, 2)
            .unwrap();

        // Background fills the whole cell
        let cell = (6 * 9) as usize;
        let small_fb = small.target();
        assert_eq!(small_fb.lit(), cell);
        assert_eq!(large.target().lit(), 4 * cell);
        assert_eq!(
            large.target().count(Rgb565::WHITE),
            4 * small_fb.count(Rgb565::WHITE)
        );
    }

    #[test]
    fn test_measure_text() {
        let canvas = canvas(16, 16);
        assert_eq!(canvas.measure_text("12:34", 1), (30, 9));
        assert_eq!(canvas.measure_text("SAT", 2), (36, 18));
    }

    #[test]
    fn test_panel_power_commands() {
        let mut canvas = canvas(8, 8);
        canvas.fill_screen(Color565::WHITE).unwrap();
        canvas.display_off().unwrap();
        canvas.display_on().unwrap();
        canvas.reinit().unwrap();

        assert_eq!(
            canvas.panel().ops,
            std::vec![PanelOp::Sleep, PanelOp::Wake, PanelOp::Init]
        );
        assert_eq!(canvas.target().lit(), 0);
    }

    #[test]
    fn test_panel_failure_propagates() {
        let mut canvas = canvas(8, 8);
        let (fb, mut panel) = canvas.release();
        panel.fail = true;
        canvas = GraphicsCanvas::new(fb, panel);
        assert_eq!(canvas.display_on(), Err(DisplayError::Panel));
    }
}
