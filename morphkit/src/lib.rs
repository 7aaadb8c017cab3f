//! morphkit - Kernel-based morphology and convolution
//!
//! # Overview
//!
//! morphkit applies user-defined or named kernels to multi-channel images:
//!
//! - Kernel descriptions: arrays (`"3: 0,1,0 1,1,1 0,1,0"`), named builtins
//!   (`"Disk:2.5"`, `"Gaussian:0x2"`), `;` lists, rotated expansions and
//!   `@file` references
//! - Kernel transforms: rotation, reflection, scaling and normalization
//! - Methods: convolution, erosion and dilation with their compounds,
//!   hit-and-miss thinning and thickening, distance and Voronoi transforms
//!
//! # Example
//!
//! ```
//! use morphkit::{ChannelLayout, Image, QUANTUM_RANGE};
//! use morphkit::morph::morphology_str;
//!
//! let mut image = Image::new(7, 7, ChannelLayout::Gray).unwrap();
//! image.set_value(3, 3, 0, QUANTUM_RANGE).unwrap();
//!
//! let grown = morphology_str(&image, "Dilate", 1, "Diamond:1").unwrap().unwrap();
//! let white = grown.data().iter().filter(|v| **v == QUANTUM_RANGE).count();
//! assert_eq!(white, 5);
//! ```

// Re-export core types (pixel buffers used everywhere)
pub use morphkit_core::*;

// Re-export the engine crates as modules to avoid name conflicts
pub use morphkit_kernel as kernel;
pub use morphkit_morph as morph;
