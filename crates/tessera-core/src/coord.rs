#![forbid(unsafe_code)]

//! Coercion of layout-space coordinates to cell coordinates.
//!
//! Layout produces fractional positions; buffers address whole cells with
//! signed integers so that clipped and scrolled writes can go negative.
//! A NaN coordinate is always an upstream bug, so it panics here instead of
//! being silently clipped away.

/// Convert a layout coordinate to a cell coordinate.
///
/// Fractions are floored and infinities saturate to `i32::MIN`/`i32::MAX`
/// (which every buffer then treats as out of bounds).
///
/// # Panics
///
/// Panics if `value` is NaN.
#[inline]
pub fn cell_coord(value: f32) -> i32 {
    assert!(!value.is_nan(), "cell coordinate is NaN");
    // `as` saturates for out-of-range floats.
    value.floor() as i32
}
