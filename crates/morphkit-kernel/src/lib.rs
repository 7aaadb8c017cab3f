//! morphkit-kernel - Kernels for morphology and convolution
//!
//! This crate builds and transforms the weighted neighborhoods applied by
//! the morphology engine:
//!
//! - Kernel description parsing (named builtins, explicit arrays, `;` lists,
//!   `@file` loading)
//! - A registry of builtin generators (Gaussian family, blurs, shapes,
//!   hit-and-miss sets, distance metrics) open to extension
//! - Transforms: rotation, reflection, scaling, unity addition and
//!   expansion into rotated or mirrored lists
//! - A text dump of kernels and lists
//!
//! # Examples
//!
//! ```
//! use morphkit_kernel::{KernelList, NormalizeMode};
//!
//! let list: KernelList = "3: -1,-1,-1 -1,8,-1 -1,-1,-1".parse().unwrap();
//! let k = list.first();
//! assert_eq!((k.origin_x(), k.origin_y()), (1, 1));
//! assert!(k.stats().is_zero_summing());
//!
//! let blur = "Gaussian:0x1".parse::<KernelList>().unwrap();
//! let doubled = blur.scale(2.0, NormalizeMode::Normalize);
//! assert!((doubled.first().stats().sum() - 2.0).abs() < 1e-9);
//! ```

mod builtin;
mod display;
mod error;
pub mod geometry;
mod kernel;
mod parse;
mod transform;

pub use builtin::{DefaultsFn, Generator, KernelDescriptor, KernelRegistry};
pub use error::{KernelError, KernelResult};
pub use geometry::{GeometryArgs, GeometryFlags, parse_geometry};
pub use kernel::{Kernel, KernelKind, KernelList, KernelStats, MAX_KERNEL_SIDE, RotationPolicy};
pub use parse::{parse_kernel_list, parse_kernel_list_with};
pub use transform::NormalizeMode;
