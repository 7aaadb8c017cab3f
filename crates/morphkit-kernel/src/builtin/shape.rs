//! Flat shaped kernels
//!
//! Cells inside the shape carry the scale value (`sigma`, or `xi` for
//! rings); cells outside are masked.

use super::{KernelDescriptor, KernelRegistry, odd_width};
use crate::geometry::GeometryArgs;
use crate::kernel::{Kernel, KernelKind, KernelList, kernel_side};
use crate::{KernelError, KernelResult};

pub(super) fn register(registry: &mut KernelRegistry) {
    for (name, kind, generate) in [
        ("Diamond", KernelKind::Diamond, diamond as super::Generator),
        ("Square", KernelKind::Square, square),
        ("Octagon", KernelKind::Octagon, octagon),
        ("Disk", KernelKind::Disk, disk),
        ("Plus", KernelKind::Plus, plus),
        ("Cross", KernelKind::Cross, cross),
    ] {
        registry.register(
            name,
            KernelDescriptor::new(kind, generate).with_defaults(scale_defaults),
        );
    }
    registry.register(
        "Rectangle",
        KernelDescriptor::new(KernelKind::Rectangle, rectangle).with_defaults(rectangle_defaults),
    );
    registry.register(
        "Ring",
        KernelDescriptor::new(KernelKind::Ring, ring).with_defaults(ring_defaults),
    );
    registry.register("Peaks", KernelDescriptor::new(KernelKind::Peaks, peaks));
}

fn scale_defaults(args: &mut GeometryArgs) {
    if !args.flags.sigma {
        args.sigma = 1.0;
    }
}

fn ring_defaults(args: &mut GeometryArgs) {
    if !args.flags.xi {
        args.xi = 1.0;
    }
}

fn rectangle_defaults(args: &mut GeometryArgs) {
    if !args.flags.rho {
        args.rho = args.sigma;
    }
    if args.rho < 1.0 {
        args.rho = 3.0;
    }
    if args.sigma < 1.0 {
        args.sigma = args.rho;
    }
    if !args.flags.xi {
        args.xi = ((args.rho.trunc() - 1.0) / 2.0).floor();
    }
    if !args.flags.psi {
        args.psi = ((args.sigma.trunc() - 1.0) / 2.0).floor();
    }
}

/// Square kernel of odd `width` with `inside(u, v)` cells set to `scale`
fn centered_shape<F>(kind: KernelKind, width: usize, scale: f64, inside: F) -> KernelResult<KernelList>
where
    F: Fn(i64, i64) -> bool,
{
    let center = (width - 1) / 2;
    let kernel = Kernel::from_fn(kind, width, width, center, center, |u, v| {
        inside(u, v).then_some(scale)
    })?;
    Ok(kernel.into())
}

fn diamond(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = odd_width(args.rho, 3)?;
    let radius = ((width - 1) / 2) as i64;
    centered_shape(KernelKind::Diamond, width, args.sigma, |u, v| {
        u.abs() + v.abs() <= radius
    })
}

fn square(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = if args.rho < 1.0 {
        3
    } else {
        kernel_side(2.0 * args.rho + 1.0)?
    };
    centered_shape(KernelKind::Square, width, args.sigma, |_, _| true)
}

fn rectangle(args: &GeometryArgs) -> KernelResult<KernelList> {
    if args.rho < 1.0 || args.sigma < 1.0 {
        return Err(KernelError::spec(format!(
            "rectangle size {}x{} is too small",
            args.rho, args.sigma
        )));
    }
    let width = kernel_side(args.rho)?;
    let height = kernel_side(args.sigma)?;
    if args.xi < 0.0 || args.psi < 0.0 {
        return Err(KernelError::spec(format!(
            "rectangle origin +{}+{} is negative",
            args.xi, args.psi
        )));
    }
    let kernel = Kernel::from_fn(
        KernelKind::Rectangle,
        width,
        height,
        args.xi as usize,
        args.psi as usize,
        |_, _| Some(1.0),
    )?;
    Ok(kernel.into())
}

fn octagon(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = odd_width(args.rho, 5)?;
    let radius = ((width - 1) / 2) as i64;
    let limit = radius + radius / 2;
    centered_shape(KernelKind::Octagon, width, args.sigma, |u, v| {
        u.abs() + v.abs() <= limit
    })
}

fn disk(args: &GeometryArgs) -> KernelResult<KernelList> {
    let (width, limit) = if args.rho < 0.4 {
        (9, 18)
    } else {
        (odd_width(args.rho.abs(), 1)?, (args.rho * args.rho) as i64)
    };
    centered_shape(KernelKind::Disk, width, args.sigma, |u, v| {
        u * u + v * v <= limit
    })
}

fn plus(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = odd_width(args.rho, 5)?;
    centered_shape(KernelKind::Plus, width, args.sigma, |u, v| u == 0 || v == 0)
}

fn cross(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = odd_width(args.rho, 5)?;
    centered_shape(KernelKind::Cross, width, args.sigma, |u, v| u == v || u == -v)
}

/// Width and squared radius bounds `(inner, outer]` of a ring
fn ring_bounds(args: &GeometryArgs) -> KernelResult<(usize, i64, i64)> {
    let (inner, outer) = if args.rho < args.sigma {
        (args.rho, args.sigma)
    } else {
        (args.sigma, args.rho)
    };
    let limit1 = (inner * inner) as i64;
    let limit2 = (outer * outer) as i64;
    if limit2 <= 0 {
        Ok((7, 7, 11))
    } else {
        Ok((odd_width(outer, 1)?, limit1, limit2))
    }
}

fn ring(args: &GeometryArgs) -> KernelResult<KernelList> {
    let (width, limit1, limit2) = ring_bounds(args)?;
    // Ring values are whole numbers
    let scale = args.xi.trunc();
    centered_shape(KernelKind::Ring, width, scale, |u, v| {
        let r = u * u + v * v;
        limit1 < r && r <= limit2
    })
}

fn peaks(args: &GeometryArgs) -> KernelResult<KernelList> {
    let (width, limit1, limit2) = ring_bounds(args)?;
    let center = (width - 1) / 2;
    let kernel = Kernel::from_fn(KernelKind::Peaks, width, width, center, center, |u, v| {
        let r = u * u + v * v;
        if r == 0 {
            Some(1.0)
        } else if limit1 < r && r <= limit2 {
            Some(0.0)
        } else {
            None
        }
    })?;
    Ok(kernel.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::KernelRegistry;

    fn build(name: &str, args: &str) -> Kernel {
        KernelRegistry::standard()
            .build(name, args)
            .unwrap()
            .first()
            .clone()
    }

    fn mask(k: &Kernel) -> Vec<bool> {
        k.values().iter().map(Option::is_some).collect()
    }

    #[test]
    fn test_diamond() {
        let k = build("Diamond", "1");
        assert_eq!(
            mask(&k),
            vec![false, true, false, true, true, true, false, true, false]
        );
        assert_eq!(k.get(1, 1), Some(1.0));
        assert_eq!(build("Diamond", "").width(), 3);
    }

    #[test]
    fn test_square_scale() {
        let k = build("Square", "2,0.5");
        assert_eq!(k.width(), 5);
        assert_eq!(k.active_count(), 25);
        assert_eq!(k.stats().maximum, 0.5);
    }

    #[test]
    fn test_rectangle_defaults() {
        let k = build("Rectangle", "4x2");
        assert_eq!((k.width(), k.height(), k.origin_x(), k.origin_y()), (4, 2, 1, 0));
        let k = build("Rectangle", "");
        assert_eq!((k.width(), k.height()), (3, 3));
        let k = build("Rectangle", "x5");
        assert_eq!((k.width(), k.height()), (5, 5));
        let k = build("Rectangle", "3x2+0+1");
        assert_eq!((k.origin_x(), k.origin_y()), (0, 1));
        assert!(KernelRegistry::standard().build("Rectangle", "3x2+3+0").is_err());
    }

    #[test]
    fn test_octagon() {
        let k = build("Octagon", "");
        assert_eq!(k.width(), 5);
        // |u|+|v| <= 3 drops only the four corners
        assert_eq!(k.active_count(), 21);
    }

    #[test]
    fn test_disk_default() {
        let k = build("Disk", "");
        assert_eq!(k.width(), 9);
        assert_eq!(k.get(0, 4), Some(1.0));
        assert_eq!(k.get(0, 0), None);
    }

    #[test]
    fn test_plus_and_cross() {
        let p = build("Plus", "");
        assert_eq!((p.width(), p.active_count()), (5, 9));
        let c = build("Cross", "1");
        assert_eq!(c.active_count(), 5);
        assert_eq!(c.get(0, 0), Some(1.0));
        assert_eq!(c.get(1, 0), None);
    }

    #[test]
    fn test_ring_and_peaks() {
        let r = build("Ring", "");
        assert_eq!(r.width(), 7);
        assert_eq!(r.get(3, 3), None);
        assert_eq!(r.get(0, 3), Some(1.0));

        let p = build("Peaks", "1,2");
        assert_eq!(p.width(), 5);
        assert_eq!(p.get(2, 2), Some(1.0));
        assert_eq!(p.get(0, 2), Some(0.0));
        assert_eq!(p.get(1, 2), None);
    }
}
