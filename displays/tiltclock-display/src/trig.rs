//! Fixed-point trigonometry for the 60 dial positions
//!
//! Values are scaled by [`SCALE`]. Position 0 lies on the positive x
//! axis and positions advance clockwise in screen coordinates (y down),
//! 6 degrees apart.

/// Fixed-point unit
pub const SCALE: i32 = 10_000;

/// Number of dial positions
pub const POSITIONS: usize = 60;

/// sin(k * 6 deg) * SCALE for k = 0..=15
const QUARTER: [i16; 16] = [
    0, 1045, 2079, 3090, 4067, 5000, 5878, 6691, 7431, 8090, 8660, 9135, 9511, 9781, 9945, 10000,
];

/// Sine of dial position `index` (taken modulo 60)
pub fn sin60(index: usize) -> i32 {
    let index = index % POSITIONS;
    let k = index % 15;
    let value = i32::from(match index / 15 {
        0 | 2 => QUARTER[k],
        _ => QUARTER[15 - k],
    });
    if index >= 30 {
        -value
    } else {
        value
    }
}

/// Cosine of dial position `index` (taken modulo 60)
pub fn cos60(index: usize) -> i32 {
    sin60(index % POSITIONS + 15)
}

/// `value * length / SCALE`, truncated toward zero
pub fn scale(value: i32, length: i32) -> i32 {
    value * length / SCALE
}

/// `value * length / SCALE`, rounded half away from zero
pub fn scale_round(value: i32, length: i32) -> i32 {
    let n = value * length;
    if n >= 0 {
        (n + SCALE / 2) / SCALE
    } else {
        (n - SCALE / 2) / SCALE
    }
}
