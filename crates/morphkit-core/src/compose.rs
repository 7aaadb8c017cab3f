//! Pixel-wise composite operators
//!
//! Composites combine two images of the same shape sample by sample. Only
//! channels whose trait is [`ChannelTrait::Update`] or
//! [`ChannelTrait::Blend`] are touched; alpha is not used to weight the
//! result (channel synchronization disabled).
//!
//! # Examples
//!
//! ```
//! use morphkit_core::{composite, ChannelLayout, CompositeOp, Image};
//!
//! let mut a = Image::from_data(2, 1, ChannelLayout::Gray, vec![10.0, 50.0]).unwrap();
//! let b = Image::from_data(2, 1, ChannelLayout::Gray, vec![30.0, 20.0]).unwrap();
//! composite(&mut a, &b, CompositeOp::Difference).unwrap();
//! assert_eq!(a.data(), &[20.0, 30.0]);
//! ```
//!
//! [`ChannelTrait::Update`]: crate::ChannelTrait::Update
//! [`ChannelTrait::Blend`]: crate::ChannelTrait::Blend

use crate::error::{Error, Result};
use crate::image::Image;
use crate::quantum::{QUANTUM_RANGE, QUANTUM_SCALE, clamp_to_quantum};
use tracing::trace;

/// Binary per-sample operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeOp {
    /// No rule chosen; callers substitute their own default
    #[default]
    Undefined,
    /// Leave the destination unchanged
    None,
    /// `|dst - src|`
    Difference,
    /// `max(dst, src)`
    Lighten,
    /// `min(dst, src)`
    Darken,
    /// `dst + src`, clamped
    Plus,
    /// `dst - src`, clamped
    Minus,
    /// `dst * src / QuantumRange`
    Multiply,
    /// `dst + src - dst * src / QuantumRange`
    Screen,
}

impl CompositeOp {
    /// Combine one destination sample with one source sample
    #[inline]
    pub fn apply(self, dst: f64, src: f64) -> f64 {
        match self {
            CompositeOp::Undefined | CompositeOp::None => dst,
            CompositeOp::Difference => (dst - src).abs(),
            CompositeOp::Lighten => dst.max(src),
            CompositeOp::Darken => dst.min(src),
            CompositeOp::Plus => clamp_to_quantum(dst + src),
            CompositeOp::Minus => clamp_to_quantum(dst - src),
            CompositeOp::Multiply => dst * src * QUANTUM_SCALE,
            CompositeOp::Screen => clamp_to_quantum(dst + src - dst * src / QUANTUM_RANGE),
        }
    }

    /// True if the operator leaves the destination untouched
    #[inline]
    pub fn is_noop(self) -> bool {
        matches!(self, CompositeOp::Undefined | CompositeOp::None)
    }
}

impl std::str::FromStr for CompositeOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undefined" => Ok(CompositeOp::Undefined),
            "none" => Ok(CompositeOp::None),
            "difference" => Ok(CompositeOp::Difference),
            "lighten" => Ok(CompositeOp::Lighten),
            "darken" => Ok(CompositeOp::Darken),
            "plus" => Ok(CompositeOp::Plus),
            "minus" => Ok(CompositeOp::Minus),
            "multiply" => Ok(CompositeOp::Multiply),
            "screen" => Ok(CompositeOp::Screen),
            other => Err(format!("unknown compose operator '{other}'")),
        }
    }
}

/// Composite `src` into `dst` in place
///
/// # Arguments
///
/// * `dst` - Destination image, overwritten with the result
/// * `src` - Source image (same size and channel count)
/// * `op` - Operator applied to every updated channel
///
/// # Errors
///
/// Returns an error if the images differ in size or channel count.
pub fn composite(dst: &mut Image, src: &Image, op: CompositeOp) -> Result<()> {
    dst.check_same_shape(src)
        .map_err(|e| Error::InvalidParameter(format!("cannot composite: {e}")))?;
    if op.is_noop() {
        return Ok(());
    }
    trace!(?op, width = dst.width(), height = dst.height(), "composite");
    let updated: Vec<bool> = dst.channels().iter().map(|c| c.traits.is_updated()).collect();
    let n = updated.len();
    for (d, s) in dst.data_mut().chunks_exact_mut(n).zip(src.data().chunks_exact(n)) {
        for c in 0..n {
            if updated[c] {
                d[c] = op.apply(d[c], s[c]);
            }
        }
    }
    Ok(())
}
