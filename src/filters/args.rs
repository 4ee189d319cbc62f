//! Argument parsing for the convolution stage.
//!
//! The host pipeline hands the stage an ordered list of `(key, value)`
//! string pairs. Three keys are recognized:
//!
//! | Key        | Value                                                   |
//! |------------|---------------------------------------------------------|
//! | `kernel`   | 9 comma-separated signed decimal integers, row-major    |
//! | `divisor`  | one decimal/scientific float literal                    |
//! | `channels` | any combination of the characters `R`, `G`, `B`, `A`    |
//!
//! All three keys are required; unknown keys are ignored. Parsing is a
//! pure function from the argument list to a [`ConvolveConfig`], so a
//! failed parse leaves nothing behind.

use log::debug;
use thiserror::Error;

use super::config::{ChannelMask, ConvolveConfig, Kernel3x3};

/// Reasons the argument list cannot be turned into a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One of the three required keys never appeared.
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),
    /// The `kernel` value did not contain exactly 9 weights.
    #[error("kernel argument must contain exactly 9 comma-separated weights")]
    IncompleteKernel,
}

/// Parse a flat key/value argument list into a filter configuration.
///
/// Later occurrences of a key override earlier ones; in particular a
/// second `channels` value starts from an all-disabled mask rather than
/// adding to the first.
pub fn parse_args(args: &[(String, String)]) -> Result<ConvolveConfig, ConfigError> {
    let mut config = ConvolveConfig::default();
    let mut kernel_seen = false;
    let mut kernel_complete = false;
    let mut divisor_seen = false;
    let mut channels_seen = false;

    for (index, (key, value)) in args.iter().enumerate() {
        debug!("convolution: arg {index} => {key}: {value}");
        match key.as_str() {
            "kernel" => {
                let mut weights = [0i16; 9];
                kernel_complete = parse_kernel_value(value, &mut weights);
                kernel_seen = true;
                config.kernel = Kernel3x3::new(weights);
            }
            "divisor" => {
                config.divisor = parse_divisor(value);
                divisor_seen = true;
            }
            "channels" => {
                config.channels = ChannelMask::from_spec(value);
                channels_seen = true;
            }
            other => {
                debug!("convolution: ignoring unknown argument `{other}`");
            }
        }
    }

    if !kernel_seen {
        return Err(ConfigError::MissingArgument("kernel"));
    }
    if !kernel_complete {
        return Err(ConfigError::IncompleteKernel);
    }
    if !divisor_seen {
        return Err(ConfigError::MissingArgument("divisor"));
    }
    if !channels_seen {
        return Err(ConfigError::MissingArgument("channels"));
    }

    Ok(config)
}

/// Fill the kernel slots from a comma-separated list of weights.
///
/// Returns `true` only if the value contained exactly 9 entries. A list
/// with more entries stops filling after the ninth and is rejected.
fn parse_kernel_value(value: &str, weights: &mut [i16; 9]) -> bool {
    let mut filled = 0;
    for token in value.split(',') {
        if filled == weights.len() {
            return false;
        }
        weights[filled] = parse_weight(token);
        filled += 1;
    }
    filled == weights.len()
}

/// Best-effort decimal integer scan in the style of `strtol`.
///
/// Leading whitespace and an optional sign are consumed, then as many
/// ASCII digits as present. A token with no leading digits scans as 0;
/// trailing garbage after the digits is ignored. The result saturates
/// into the 16-bit weight range the accumulator supports.
fn parse_weight(token: &str) -> i16 {
    let rest = token.trim_start();
    let (negative, rest) = match rest.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, rest.strip_prefix('+').unwrap_or(rest)),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    let mut value: i64 = 0;
    for b in rest[..digits_end].bytes() {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative {
        value = -value;
    }

    value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Best-effort float scan in the style of `strtof`.
///
/// Parses the longest leading prefix that forms a float literal, so
/// trailing garbage is ignored (`"9.0abc"` scans as `9.0`). A token
/// with no leading float scans as 0.0.
fn parse_divisor(token: &str) -> f32 {
    let trimmed = token.trim_start();
    let scan_len = trimmed
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();

    // The scanned prefix is all ASCII, so byte slicing is safe.
    let mut candidate = &trimmed[..scan_len];
    loop {
        if candidate.is_empty() {
            return 0.0;
        }
        if let Ok(value) = candidate.parse::<f32>() {
            return value;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
}
