//! The convolution matrix filter.
//!
//! ## Supported Format
//!
//! The stage operates on RGBA images shaped `(height, width, 4)` with
//! 8-bit channels. The fourth channel is processed exactly like the
//! color channels; whether the caller treats it as alpha or as a spare
//! channel makes no difference to the algorithm.
//!
//! ## Pipeline
//!
//! One invocation flows through the modules in order:
//!
//! 1. [`args`] decodes the host's key/value pairs into a
//!    [`config::ConvolveConfig`] (kernel, divisor, channel mask).
//! 2. [`convolve`] walks the pixel grid; each tap is resolved through
//!    the border-replicating sampler in [`core`], accumulated per
//!    channel, scaled by the divisor and composited under the channel
//!    mask.
//! 3. [`stage`] ties it together behind the host-facing entry points
//!    and classifies the two possible failures (bad arguments, unsizable
//!    destination).
//!
//! Border handling is edge replication throughout: out-of-bounds taps
//! reuse the nearest in-bounds pixel, never zero padding or wraparound.

pub mod args;
pub mod config;
pub mod convolve;
pub mod core;
pub mod stage;
