//! Quantum (sample value) constants and helpers
//!
//! Samples are real-valued and nominally span `0.0..=QUANTUM_RANGE`.

/// Largest representable sample value (16-bit quantum)
pub const QUANTUM_RANGE: f64 = 65535.0;

/// Reciprocal of [`QUANTUM_RANGE`]
pub const QUANTUM_SCALE: f64 = 1.0 / QUANTUM_RANGE;

/// Tolerance used for "is this value different" tests
pub const EPSILON: f64 = 1.0e-12;

/// Clamp a computed sample into the quantum range
#[inline]
pub fn clamp_to_quantum(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        0.0
    } else if value >= QUANTUM_RANGE {
        QUANTUM_RANGE
    } else {
        value
    }
}

/// Reciprocal that stays finite for values near zero
///
/// Returns `1/x` unless `|x| < EPSILON`, in which case the result is
/// `sign(x)/EPSILON`.
#[inline]
pub fn perceptible_reciprocal(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    if sign * x >= EPSILON {
        1.0 / x
    } else {
        sign / EPSILON
    }
}

/// Parse a number that may carry a trailing `%`
///
/// A percentage is taken relative to `interval`, so `"50%"` with an
/// interval of `65536` yields `32768`.
pub fn parse_interval(text: &str, interval: f64) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(number) => number.trim().parse::<f64>().ok().map(|v| v * interval / 100.0),
        None => text.parse::<f64>().ok(),
    }
}
