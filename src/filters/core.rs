//! Core utilities shared by the convolution stage.
//!
//! This module provides the two primitives every pixel of a run goes
//! through: border-clamped neighbor sampling and saturating channel
//! truncation.

use ndarray::ArrayView3;

/// Number of channels in every image this stage handles.
pub const RGBA_CHANNELS: usize = 4;

/// Sample the pixel at `(x + dx, y + dy)` with edge replication.
///
/// Out-of-bounds coordinates are clamped to the nearest valid row/column
/// independently, so corner overshoots resolve to the corner pixel. This
/// is replicate padding, not zero padding or wraparound; every call
/// returns a pixel that exists in the source image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4) as u8
/// * `x`, `y` - In-bounds anchor coordinate
/// * `dx`, `dy` - Relative tap offset, may point outside the image
///
/// # Returns
/// A copy of the resolved pixel as `[r, g, b, a]`
#[inline]
pub fn sample_clamped(
    input: &ArrayView3<u8>,
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
) -> [u8; RGBA_CHANNELS] {
    let (height, width, _) = input.dim();

    let nx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
    let ny = (y as isize + dy).clamp(0, height as isize - 1) as usize;

    [
        input[[ny, nx, 0]],
        input[[ny, nx, 1]],
        input[[ny, nx, 2]],
        input[[ny, nx, 3]],
    ]
}

/// Truncate an accumulated channel value into the 8-bit range.
///
/// Values below 0 become 0, values above 255 become 255, everything else
/// is the value itself.
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
