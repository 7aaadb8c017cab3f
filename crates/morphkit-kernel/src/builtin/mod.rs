//! Named kernel registry
//!
//! Each builtin kernel is described by a [`KernelDescriptor`]: its kind,
//! rotation policy, the defaults it fills into missing geometry values, and
//! the generator that computes its values. [`KernelRegistry`] maps
//! case-insensitive names to descriptors and is open to extension.
//!
//! # Examples
//!
//! ```
//! use morphkit_kernel::{KernelDescriptor, KernelKind, KernelList, KernelRegistry, Kernel};
//!
//! fn dot(_args: &morphkit_kernel::geometry::GeometryArgs)
//!     -> morphkit_kernel::KernelResult<KernelList> {
//!     Ok(Kernel::unity(KernelKind::Custom("Dot"), 1.0).into())
//! }
//!
//! let mut registry = KernelRegistry::with_builtins();
//! registry.register("Dot", KernelDescriptor::new(KernelKind::Custom("Dot"), dot));
//! let list = morphkit_kernel::parse_kernel_list_with(&registry, "dot; Square").unwrap();
//! assert_eq!(list.len(), 2);
//! ```

mod convolution;
mod distance;
mod hitmiss;
mod shape;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::geometry::{GeometryArgs, parse_geometry};
use crate::kernel::{Kernel, KernelKind, KernelList, RotationPolicy, kernel_side};
use crate::parse::{expand_by_flags, parse_array_kernel};
use crate::{KernelError, KernelResult};
use morphkit_core::{EPSILON, QUANTUM_RANGE, QUANTUM_SCALE, perceptible_reciprocal};

/// Computes a kernel list from geometry arguments
pub type Generator = fn(&GeometryArgs) -> KernelResult<KernelList>;

/// Fills in geometry values the user left out
pub type DefaultsFn = fn(&mut GeometryArgs);

/// How one named kernel is built
#[derive(Debug, Clone, Copy)]
pub struct KernelDescriptor {
    /// Kind stamped on generated kernels
    pub kind: KernelKind,
    /// Rotation policy stamped on generated kernels
    pub rotation: RotationPolicy,
    /// Geometry defaulting rule
    pub defaults: DefaultsFn,
    /// Value generator
    pub generate: Generator,
}

fn no_defaults(_args: &mut GeometryArgs) {}

impl KernelDescriptor {
    /// Descriptor with the kind's default rotation policy and no defaults
    pub fn new(kind: KernelKind, generate: Generator) -> Self {
        KernelDescriptor {
            kind,
            rotation: kind.default_rotation(),
            defaults: no_defaults,
            generate,
        }
    }

    /// Replace the geometry defaulting rule
    pub fn with_defaults(mut self, defaults: DefaultsFn) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the rotation policy
    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Map from kernel name to descriptor
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    entries: HashMap<String, KernelDescriptor>,
}

impl KernelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every builtin kernel
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        convolution::register(&mut registry);
        shape::register(&mut registry);
        hitmiss::register(&mut registry);
        distance::register(&mut registry);
        registry
    }

    /// Shared registry of the builtin kernels
    pub fn standard() -> &'static KernelRegistry {
        static STANDARD: OnceLock<KernelRegistry> = OnceLock::new();
        STANDARD.get_or_init(KernelRegistry::with_builtins)
    }

    /// Add or replace a named kernel, returning the previous descriptor
    pub fn register(&mut self, name: &str, descriptor: KernelDescriptor) -> Option<KernelDescriptor> {
        self.entries.insert(name.to_ascii_lowercase(), descriptor)
    }

    /// Find a descriptor by case-insensitive name
    pub fn lookup(&self, name: &str) -> Option<&KernelDescriptor> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    /// Registered names (lowercase), sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the named kernel from its geometry argument text
    ///
    /// A single generated kernel is expanded by the `@`, `>` or `<` flag;
    /// generators that already produce a list are returned as is.
    ///
    /// # Errors
    ///
    /// Returns `KernelError::InvalidSpec` for an unknown name, malformed
    /// arguments, or arguments the generator rejects.
    pub fn build(&self, name: &str, args: &str) -> KernelResult<KernelList> {
        let descriptor = self
            .lookup(name)
            .ok_or_else(|| KernelError::spec(format!("unknown kernel name '{name}'")))?;
        let mut geometry = parse_geometry(args)?;
        (descriptor.defaults)(&mut geometry);
        let list = (descriptor.generate)(&geometry)?;
        let list = list.map(|k| k.clone().with_rotation(descriptor.rotation));
        tracing::trace!(
            kernel = %descriptor.kind,
            rho = geometry.rho,
            sigma = geometry.sigma,
            xi = geometry.xi,
            psi = geometry.psi,
            count = list.len(),
            "generated builtin kernel"
        );
        if list.len() == 1 {
            return Ok(expand_by_flags(list.first().clone(), &geometry.flags));
        }
        Ok(list)
    }
}

/// Parse a literal table kernel and tag it with `kind`
pub(crate) fn table(kind: KernelKind, text: &str) -> KernelResult<Kernel> {
    parse_array_kernel(text).map(|(k, _)| k.with_kind(kind))
}

/// Odd width `2 * int(radius) + 1` for a radius of at least one, else `small`
pub(crate) fn odd_width(radius: f64, small: usize) -> KernelResult<usize> {
    if radius < 1.0 {
        Ok(small)
    } else {
        kernel_side(2.0 * radius.trunc() + 1.0)
    }
}

/// Width of a 1D Gaussian that holds every perceptible weight
pub(crate) fn optimal_width_1d(radius: f64, sigma: f64) -> KernelResult<usize> {
    if radius > EPSILON {
        return kernel_side(2.0 * radius.ceil() + 1.0);
    }
    let gamma = sigma.abs();
    if gamma <= EPSILON {
        return Ok(3);
    }
    let alpha = perceptible_reciprocal(2.0 * gamma * gamma);
    let beta = perceptible_reciprocal(std::f64::consts::TAU.sqrt() * gamma);
    let mut width = 5usize;
    loop {
        let j = ((width - 1) / 2) as i64;
        let normalize: f64 = (-j..=j)
            .map(|i| (-((i * i) as f64) * alpha).exp() * beta)
            .sum();
        let tail = (-((j * j) as f64) * alpha).exp() * beta / normalize;
        if tail < QUANTUM_SCALE || tail < EPSILON || width > QUANTUM_RANGE as usize {
            break;
        }
        width += 2;
    }
    Ok(width - 2)
}

/// Width of a 2D Gaussian that holds every perceptible weight
pub(crate) fn optimal_width_2d(radius: f64, sigma: f64) -> KernelResult<usize> {
    if radius > EPSILON {
        return kernel_side(2.0 * radius.ceil() + 1.0);
    }
    let gamma = sigma.abs();
    if gamma <= EPSILON {
        return Ok(3);
    }
    let alpha = perceptible_reciprocal(2.0 * gamma * gamma);
    let beta = perceptible_reciprocal(std::f64::consts::TAU * gamma * gamma);
    let mut width = 5usize;
    loop {
        let j = ((width - 1) / 2) as i64;
        let mut normalize = 0.0;
        for v in -j..=j {
            for u in -j..=j {
                normalize += (-((u * u + v * v) as f64) * alpha).exp() * beta;
            }
        }
        let tail = (-((j * j) as f64) * alpha).exp() * beta / normalize;
        if tail < QUANTUM_SCALE || tail < EPSILON || width > QUANTUM_RANGE as usize {
            break;
        }
        width += 2;
    }
    Ok(width - 2)
}
