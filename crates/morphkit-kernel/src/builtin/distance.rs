//! Distance-measuring kernels
//!
//! Each cell holds `scale * d(u, v)` for its distance metric. The scale
//! (`sigma`) defaults to 100; `!` reads it as a maximum pixel distance
//! (`QuantumRange / (scale + 1)`) and `%` as a percentage of the range.

use super::{KernelDescriptor, KernelRegistry, odd_width};
use crate::geometry::GeometryArgs;
use crate::kernel::{Kernel, KernelKind, KernelList};
use crate::KernelResult;
use morphkit_core::QUANTUM_RANGE;

pub(super) fn register(registry: &mut KernelRegistry) {
    for (name, kind, generate) in [
        ("Chebyshev", KernelKind::Chebyshev, chebyshev as super::Generator),
        ("Manhattan", KernelKind::Manhattan, manhattan),
        ("Octagonal", KernelKind::Octagonal, octagonal),
        ("Euclidean", KernelKind::Euclidean, euclidean),
    ] {
        registry.register(
            name,
            KernelDescriptor::new(kind, generate).with_defaults(distance_defaults),
        );
    }
}

fn distance_defaults(args: &mut GeometryArgs) {
    if !args.flags.sigma {
        args.sigma = 100.0;
    } else if args.flags.aspect {
        args.sigma = QUANTUM_RANGE / (args.sigma + 1.0);
    } else if args.flags.percent {
        args.sigma *= QUANTUM_RANGE / 100.0;
    }
}

fn metric<F>(kind: KernelKind, width: usize, scale: f64, distance: F) -> KernelResult<KernelList>
where
    F: Fn(f64, f64) -> f64,
{
    let center = (width - 1) / 2;
    let kernel = Kernel::from_fn(kind, width, width, center, center, |u, v| {
        Some(scale * distance(u.abs() as f64, v.abs() as f64))
    })?;
    Ok(kernel.into())
}

fn chebyshev(args: &GeometryArgs) -> KernelResult<KernelList> {
    metric(KernelKind::Chebyshev, odd_width(args.rho, 3)?, args.sigma, f64::max)
}

fn manhattan(args: &GeometryArgs) -> KernelResult<KernelList> {
    metric(KernelKind::Manhattan, odd_width(args.rho, 3)?, args.sigma, |u, v| u + v)
}

fn octagonal(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = if args.rho < 2.0 { 5 } else { odd_width(args.rho, 5)? };
    metric(KernelKind::Octagonal, width, args.sigma, |u, v| {
        u.max(v).max(((u + v + 1.0) / 1.5).floor())
    })
}

fn euclidean(args: &GeometryArgs) -> KernelResult<KernelList> {
    metric(KernelKind::Euclidean, odd_width(args.rho, 3)?, args.sigma, f64::hypot)
}
