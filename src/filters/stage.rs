//! Pipeline stage entry points.
//!
//! This is the surface a host pipeline calls: hand in a source image,
//! the raw key/value arguments and optionally a progress sink, get back
//! a freshly allocated destination image or a classified error. The
//! host owns diagnostics rendering; this module only classifies failure
//! and traces its lifecycle through the `log` facade.

use log::trace;
use ndarray::{Array3, ArrayView3};
use thiserror::Error;

use super::args::{parse_args, ConfigError};
use super::convolve::{convolve_rgba, convolve_rgba_par};
use super::core::RGBA_CHANNELS;

/// Ways a stage invocation can fail. No per-pixel errors exist; border
/// clamping resolves every sample, so the only failure points are the
/// arguments and the destination allocation.
#[derive(Debug, Error)]
pub enum StageError {
    /// The argument list did not form a complete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The destination image cannot be sized to match the source.
    #[error("cannot allocate a {width}x{height} destination image")]
    Allocation { width: usize, height: usize },
}

/// Run the convolution stage over `input`, reporting per-row progress.
///
/// Parses `args` into a configuration, sizes the destination to match
/// the source and filters every pixel. On failure nothing is filtered
/// and no destination is produced.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4) as u8
/// * `args` - Ordered key/value argument pairs from the host
/// * `report` - Progress sink receiving integer percentages (0-100)
pub fn process<F>(
    input: ArrayView3<u8>,
    args: &[(String, String)],
    report: F,
) -> Result<Array3<u8>, StageError>
where
    F: FnMut(u8),
{
    trace!("convolution: parsing stage arguments");
    let config = parse_args(args)?;

    let byte_len = destination_len(input)?;
    trace!("convolution: received {byte_len} bytes of image data");

    let output = convolve_rgba(input, &config, report);
    trace!("convolution: processed {byte_len} bytes of data");
    Ok(output)
}

/// Run the convolution stage with rows split across rayon workers.
///
/// Identical output to [`process`]; no intermediate progress is
/// reported.
pub fn process_parallel(
    input: ArrayView3<u8>,
    args: &[(String, String)],
) -> Result<Array3<u8>, StageError> {
    trace!("convolution: parsing stage arguments");
    let config = parse_args(args)?;

    let byte_len = destination_len(input)?;
    trace!("convolution: received {byte_len} bytes of image data");

    let output = convolve_rgba_par(input, &config);
    trace!("convolution: processed {byte_len} bytes of data");
    Ok(output)
}

/// Byte length of a destination sized to match the source.
///
/// A size whose byte length overflows `usize` cannot be allocated and
/// aborts the run before any pixel is touched.
fn destination_len(input: ArrayView3<u8>) -> Result<usize, StageError> {
    let (height, width, _) = input.dim();
    height
        .checked_mul(width)
        .and_then(|pixels| pixels.checked_mul(RGBA_CHANNELS))
        .ok_or(StageError::Allocation { width, height })
}
