//! morphkit core - Pixel buffers for the morphology engine
//!
//! This crate provides the image collaborator shared by the kernel and
//! morphology crates:
//!
//! - [`Image`] - Multi-channel real-valued pixel buffer
//! - [`Window`] - Rectangular block fetched with virtual pixels resolved
//! - [`VirtualPixel`] - Policy for reads outside the image
//! - [`CompositeOp`] / [`composite`] - Pixel-wise binary operators
//! - [`ProgressMonitor`] / [`Progress`] - Cancellable progress reporting
//! - [`quantum`] - Sample range constants and helpers

pub mod compose;
pub mod error;
pub mod image;
pub mod progress;
pub mod quantum;

pub use compose::{CompositeOp, composite};
pub use error::{Error, Result};
pub use image::{
    ChannelInfo, ChannelKind, ChannelLayout, ChannelTrait, Image, VirtualPixel, Window,
};
pub use progress::{MORPHOLOGY_TAG, Progress, ProgressMonitor};
pub use quantum::{
    EPSILON, QUANTUM_RANGE, QUANTUM_SCALE, clamp_to_quantum, parse_interval,
    perceptible_reciprocal,
};
