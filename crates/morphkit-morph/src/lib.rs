//! morphkit-morph - Morphology and convolution methods
//!
//! This crate applies kernel lists from `morphkit-kernel` to images from
//! `morphkit-core`:
//!
//! - [`Method`] - Named methods (Erode, Open, TopHat, Thinning, Distance, ...)
//! - [`plan`] - Reduction of a method to primitive stages and loop limits
//! - [`apply_primitive`] - One primitive with one kernel, rows in parallel
//! - [`propagate`] - Two-sweep in-place distance and Voronoi transforms
//! - [`MorphologyOrchestrator`] - Iteration, multi-kernel composition and
//!   post-processing
//! - [`MorphologySettings`] - Bias, scale, compose and display options
//!
//! # Examples
//!
//! ```
//! use morphkit_core::{ChannelLayout, Image};
//! use morphkit_morph::morphology_str;
//!
//! let image = Image::from_data(5, 1, ChannelLayout::Gray, vec![0.0, 0.0, 80.0, 0.0, 0.0]).unwrap();
//! let edges = morphology_str(&image, "EdgeOut", 1, "3x1: 1,1,1").unwrap().unwrap();
//! assert_eq!(edges.data(), &[0.0, 80.0, 0.0, 80.0, 0.0]);
//! ```

mod error;
mod executor;
mod maybe_rayon;
pub mod method;
mod orchestrate;
pub mod plan;
mod propagate;
mod settings;

pub use error::{MorphError, MorphResult};
pub use executor::{apply_primitive, apply_primitive_with_progress};
pub use method::{Method, Primitive, Propagation};
pub use orchestrate::{
    MorphologyOrchestrator, Outcome, morphology, morphology_apply, morphology_str,
};
pub use plan::{Plan, PostProcess, Stage, StagedPlan, compile};
pub use propagate::propagate;
pub use settings::{BIAS_KEY, COMPOSE_KEY, MorphologySettings, SCALE_KEY, SHOW_KERNEL_KEY};
