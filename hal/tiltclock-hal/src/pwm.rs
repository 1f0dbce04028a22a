//! Backlight PWM abstraction

/// Single PWM channel driving the display backlight
///
/// Duty is 8-bit: 0 is dark, 255 is full brightness.
pub trait BacklightPwm {
    /// Set the output duty
    fn set_duty(&mut self, duty: u8);

    /// Connect the PWM peripheral to the backlight pin
    fn attach(&mut self);

    /// Disconnect the PWM peripheral so it can be powered down
    fn detach(&mut self);
}
