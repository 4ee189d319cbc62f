//! Configuration value types for the convolution stage.
//!
//! A filter run is driven by a single [`ConvolveConfig`] value built by
//! the argument parser and passed into the driver. The configuration is
//! owned by the caller, so concurrent runs with different settings never
//! share mutable state.

/// A fixed 3x3 convolution kernel, weights stored row-major.
///
/// Weights are 16-bit so the worst case of 9 taps of 8-bit channels
/// always fits 32-bit accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel3x3 {
    weights: [i16; 9],
}

impl Kernel3x3 {
    /// Create a kernel from 9 row-major weights.
    pub fn new(weights: [i16; 9]) -> Self {
        Self { weights }
    }

    /// The identity kernel: weight 1 at the center tap, 0 elsewhere.
    pub fn identity() -> Self {
        Self::new([0, 0, 0, 0, 1, 0, 0, 0, 0])
    }

    /// Weight of the tap at `(row, col)`, both in `0..3`, widened for
    /// accumulation.
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> i32 {
        i32::from(self.weights[row * 3 + col])
    }
}

impl Default for Kernel3x3 {
    fn default() -> Self {
        Self::new([0; 9])
    }
}

/// Which destination channels the filter is allowed to overwrite.
///
/// Disabled channels are copied from the source pixel unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl ChannelMask {
    /// No channel enabled; the filter output equals its input.
    pub const NONE: ChannelMask = ChannelMask {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };

    /// All four channels enabled.
    pub const ALL: ChannelMask = ChannelMask {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };

    /// Build a mask from a spec string.
    ///
    /// Every occurrence of an uppercase `R`, `G`, `B` or `A` enables the
    /// corresponding channel; any other character is ignored. Lowercase
    /// letters do not count.
    pub fn from_spec(spec: &str) -> Self {
        let mut mask = ChannelMask::NONE;
        for c in spec.chars() {
            match c {
                'R' => mask.red = true,
                'G' => mask.green = true,
                'B' => mask.blue = true,
                'A' => mask.alpha = true,
                _ => {}
            }
        }
        mask
    }

    /// Whether the channel at `index` (0 = R .. 3 = A) is enabled.
    #[inline]
    pub fn enabled(&self, index: usize) -> bool {
        match index {
            0 => self.red,
            1 => self.green,
            2 => self.blue,
            3 => self.alpha,
            _ => false,
        }
    }
}

/// Complete configuration for one filter invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolveConfig {
    /// The 3x3 weight matrix.
    pub kernel: Kernel3x3,
    /// Post-accumulation scaling factor. `0.0` and `1.0` both mean the
    /// raw weighted sum is used unscaled.
    pub divisor: f32,
    /// Channels the filter may overwrite.
    pub channels: ChannelMask,
}

impl Default for ConvolveConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel3x3::default(),
            divisor: 1.0,
            channels: ChannelMask::NONE,
        }
    }
}
