//! WebAssembly exports for the convolution stage.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work
//! on flat RGBA byte buffers (length = width * height * 4).

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::filters::config::{ChannelMask, ConvolveConfig, Kernel3x3};
use crate::filters::convolve::convolve_rgba;

/// Apply a 3x3 convolution to an RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `kernel` - 9 row-major kernel weights
/// * `divisor` - Post-accumulation scaling factor; 0 and 1 disable it
/// * `channels` - Combination of the characters `R`, `G`, `B`, `A`
///
/// # Returns
/// Flat array of filtered RGBA bytes
#[wasm_bindgen]
pub fn convolution_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    kernel: Vec<i16>,
    divisor: f32,
    channels: &str,
) -> Vec<u8> {
    let input = Array3::from_shape_vec((height, width, 4), data.to_vec())
        .expect("Invalid dimensions");

    let weights: [i16; 9] = kernel
        .try_into()
        .expect("kernel must contain exactly 9 weights");

    let config = ConvolveConfig {
        kernel: Kernel3x3::new(weights),
        divisor,
        channels: ChannelMask::from_spec(channels),
    };

    let result = convolve_rgba(input.view(), &config, |_| {});
    result.into_raw_vec_and_offset().0
}
