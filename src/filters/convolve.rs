//! The convolution filter itself: accumulation, compositing and the
//! pixel-grid drivers.
//!
//! Weighted sums are accumulated in `i32`, which comfortably holds the
//! worst case of 9 taps of 8-bit channels times 16-bit kernel weights
//! (at most 9 * 32767 * 255, well inside `i32`).
//! Scaling by the divisor rounds to nearest with ties away from zero,
//! then each channel saturates into `[0, 255]`.

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use super::config::{ChannelMask, ConvolveConfig, Kernel3x3};
use super::core::{clamp_channel, sample_clamped, RGBA_CHANNELS};

/// Accumulate the weighted 3x3 neighborhood of `(x, y)` per channel.
///
/// Taps with weight 0 are skipped; that is a short-circuit, not an
/// approximation, since a zero term contributes nothing. Tap `(1, 1)` is
/// the center pixel, so tap `(row, col)` samples at relative offset
/// `(col - 1, row - 1)` with border replication.
pub fn accumulate(
    input: &ArrayView3<u8>,
    x: usize,
    y: usize,
    kernel: &Kernel3x3,
) -> [i32; RGBA_CHANNELS] {
    let mut sums = [0i32; RGBA_CHANNELS];

    for row in 0..3 {
        for col in 0..3 {
            let weight = kernel.weight(row, col);
            if weight == 0 {
                continue;
            }

            let pixel = sample_clamped(input, x, y, col as isize - 1, row as isize - 1);
            for c in 0..RGBA_CHANNELS {
                sums[c] += weight * i32::from(pixel[c]);
            }
        }
    }

    sums
}

/// Scale accumulated sums by the divisor.
///
/// Divisors of `0.0` and `1.0` leave the raw sums untouched. Otherwise
/// each sum is divided and rounded to the nearest integer, ties away
/// from zero.
pub fn scale_sums(sums: [i32; RGBA_CHANNELS], divisor: f32) -> [i32; RGBA_CHANNELS] {
    if divisor == 0.0 || divisor == 1.0 {
        return sums;
    }
    sums.map(|sum| (f64::from(sum) / f64::from(divisor)).round() as i32)
}

/// Merge accumulated values into a destination pixel.
///
/// The destination starts as a copy of the source pixel; every channel
/// enabled in the mask is overwritten with its clamped accumulated
/// value. Disabled channels are untouched copies, never zero.
pub fn composite(
    source: [u8; RGBA_CHANNELS],
    sums: [i32; RGBA_CHANNELS],
    mask: ChannelMask,
) -> [u8; RGBA_CHANNELS] {
    let mut dest = source;
    for c in 0..RGBA_CHANNELS {
        if mask.enabled(c) {
            dest[c] = clamp_channel(sums[c]);
        }
    }
    dest
}

/// Compute the destination pixel at `(x, y)` for one configuration.
#[inline]
pub fn convolve_at(
    input: &ArrayView3<u8>,
    x: usize,
    y: usize,
    config: &ConvolveConfig,
) -> [u8; RGBA_CHANNELS] {
    let sums = scale_sums(accumulate(input, x, y, &config.kernel), config.divisor);
    let source = [
        input[[y, x, 0]],
        input[[y, x, 1]],
        input[[y, x, 2]],
        input[[y, x, 3]],
    ];
    composite(source, sums, config.channels)
}

/// Convolve an RGBA image, reporting per-row progress.
///
/// Walks the pixel grid row by row and, after completing row `y`, calls
/// `report` with `round(100 * y / height)`. The callback is one-way; the
/// driver never waits on it.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4) as u8
/// * `config` - Finalized filter configuration
/// * `report` - Progress sink receiving integer percentages
///
/// # Returns
/// The filtered image at the source's exact dimensions
pub fn convolve_rgba<F>(input: ArrayView3<u8>, config: &ConvolveConfig, mut report: F) -> Array3<u8>
where
    F: FnMut(u8),
{
    let (height, width, channels) = input.dim();
    assert_eq!(channels, RGBA_CHANNELS, "convolution expects RGBA input");

    let mut output = Array3::<u8>::zeros((height, width, channels));
    if height == 0 || width == 0 {
        return output;
    }

    for y in 0..height {
        for x in 0..width {
            let pixel = convolve_at(&input, x, y, config);
            for c in 0..RGBA_CHANNELS {
                output[[y, x, c]] = pixel[c];
            }
        }
        report((100.0 * y as f64 / height as f64).round() as u8);
    }

    output
}

/// Convolve an RGBA image with the rows split across rayon workers.
///
/// Each worker owns a disjoint slice of destination rows and reads the
/// shared source view, so no synchronization is needed. Produces the
/// same output as [`convolve_rgba`]; no intermediate progress is
/// reported.
pub fn convolve_rgba_par(input: ArrayView3<u8>, config: &ConvolveConfig) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    assert_eq!(channels, RGBA_CHANNELS, "convolution expects RGBA input");

    if height == 0 || width == 0 {
        return Array3::<u8>::zeros((height, width, channels));
    }

    let view = &input;
    let mut data = vec![0u8; height * width * channels];
    data.par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let pixel = convolve_at(view, x, y, config);
                row[x * RGBA_CHANNELS..(x + 1) * RGBA_CHANNELS].copy_from_slice(&pixel);
            }
        });

    Array3::from_shape_vec((height, width, channels), data).expect("row buffer matches dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic test image with distinct channel values per pixel.
    fn gradient_image(height: usize, width: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((height, width, 4));
        for y in 0..height {
            for x in 0..width {
                img[[y, x, 0]] = (x * 40 + 7) as u8;
                img[[y, x, 1]] = (y * 40 + 11) as u8;
                img[[y, x, 2]] = ((x + y) * 30) as u8;
                img[[y, x, 3]] = (255 - x * 20 - y * 10) as u8;
            }
        }
        img
    }

    fn config(weights: [i16; 9], divisor: f32, channels: ChannelMask) -> ConvolveConfig {
        ConvolveConfig {
            kernel: Kernel3x3::new(weights),
            divisor,
            channels,
        }
    }

    #[test]
    fn test_identity_kernel_reproduces_source() {
        let img = gradient_image(5, 6);
        let cfg = ConvolveConfig {
            kernel: Kernel3x3::identity(),
            divisor: 1.0,
            channels: ChannelMask::ALL,
        };
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        assert_eq!(out, img);
    }

    #[test]
    fn test_disabled_mask_passes_source_through() {
        let img = gradient_image(4, 4);
        // Aggressive kernel and divisor; none of it may show up.
        let cfg = config([3, -1, 4, -1, 5, -9, 2, -6, 5], 2.5, ChannelMask::NONE);
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        assert_eq!(out, img);
    }

    #[test]
    fn test_divisor_zero_and_one_are_equivalent() {
        let img = gradient_image(4, 5);
        let weights = [1, 0, -1, 2, 0, -2, 1, 0, -1];
        let with_zero = convolve_rgba(
            img.view(),
            &config(weights, 0.0, ChannelMask::ALL),
            |_| {},
        );
        let with_one = convolve_rgba(img.view(), &config(weights, 1.0, ChannelMask::ALL), |_| {});
        assert_eq!(with_zero, with_one);
    }

    #[test]
    fn test_negative_sums_saturate_to_zero() {
        // White image through a pure negative center weight: every sum
        // is -255, which must clamp to 0 on the enabled channels.
        let img = Array3::<u8>::from_elem((3, 3, 4), 255);
        let cfg = config([0, 0, 0, 0, -1, 0, 0, 0, 0], 1.0, ChannelMask::ALL);
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_large_sums_saturate_to_255() {
        // 200 * 2 = 400 per channel, clamps to 255.
        let img = Array3::<u8>::from_elem((3, 3, 4), 200);
        let cfg = config([0, 0, 0, 0, 2, 0, 0, 0, 0], 1.0, ChannelMask::ALL);
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        assert!(out.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_max_weight_on_white_image_saturates_without_overflow() {
        // The widest configuration the parser can produce: every tap at
        // the weight-range extremes over a white image. Sums stay inside
        // i32 and clamp to the channel range.
        let img = Array3::<u8>::from_elem((3, 3, 4), 255);

        let maxed = config([i16::MAX; 9], 1.0, ChannelMask::ALL);
        let out = convolve_rgba(img.view(), &maxed, |_| {});
        assert!(out.iter().all(|&v| v == 255));

        let negated = config([i16::MIN; 9], 1.0, ChannelMask::ALL);
        let out = convolve_rgba(img.view(), &negated, |_| {});
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_scale_sums_rounds_ties_away_from_zero() {
        assert_eq!(scale_sums([3, -3, 5, -5], 2.0), [2, -2, 3, -3]);
        assert_eq!(scale_sums([7, 0, 0, 0], 9.0), [1, 0, 0, 0]);
    }

    #[test]
    fn test_box_blur_averages_clamped_neighborhood() {
        let img = gradient_image(3, 3);
        let cfg = config([1; 9], 9.0, ChannelMask::ALL);
        let out = convolve_rgba(img.view(), &cfg, |_| {});

        // Naive reference: unweighted average of the replicate-padded
        // 3x3 neighborhood, rounded to nearest.
        for y in 0..3usize {
            for x in 0..3usize {
                for c in 0..4usize {
                    let mut sum = 0i32;
                    for dy in -1isize..=1 {
                        for dx in -1isize..=1 {
                            let sy = (y as isize + dy).clamp(0, 2) as usize;
                            let sx = (x as isize + dx).clamp(0, 2) as usize;
                            sum += i32::from(img[[sy, sx, c]]);
                        }
                    }
                    let expected = (f64::from(sum) / 9.0).round() as i32;
                    assert_eq!(
                        i32::from(out[[y, x, c]]),
                        expected.clamp(0, 255),
                        "pixel ({x}, {y}) channel {c}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_partial_mask_mixes_filtered_and_source_channels() {
        let img = gradient_image(4, 4);
        let mask = ChannelMask::from_spec("RB");
        let cfg = config([1; 9], 9.0, mask);
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        let all = convolve_rgba(img.view(), &config([1; 9], 9.0, ChannelMask::ALL), |_| {});

        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out[[y, x, 0]], all[[y, x, 0]]);
                assert_eq!(out[[y, x, 1]], img[[y, x, 1]]);
                assert_eq!(out[[y, x, 2]], all[[y, x, 2]]);
                assert_eq!(out[[y, x, 3]], img[[y, x, 3]]);
            }
        }
    }

    #[test]
    fn test_progress_reported_once_per_row() {
        let img = gradient_image(4, 2);
        let cfg = ConvolveConfig {
            kernel: Kernel3x3::identity(),
            divisor: 1.0,
            channels: ChannelMask::ALL,
        };
        let mut reports = Vec::new();
        convolve_rgba(img.view(), &cfg, |p| reports.push(p));
        assert_eq!(reports, vec![0, 25, 50, 75]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let img = gradient_image(6, 5);
        let cfg = config([1, -2, 1, -2, 4, -2, 1, -2, 1], 3.0, ChannelMask::from_spec("RGA"));
        let sequential = convolve_rgba(img.view(), &cfg, |_| {});
        let parallel = convolve_rgba_par(img.view(), &cfg);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_empty_image_yields_empty_output() {
        let img = Array3::<u8>::zeros((0, 5, 4));
        let cfg = ConvolveConfig::default();
        let out = convolve_rgba(img.view(), &cfg, |_| {});
        assert_eq!(out.dim(), (0, 5, 4));
        let out = convolve_rgba_par(img.view(), &cfg);
        assert_eq!(out.dim(), (0, 5, 4));
    }
}
