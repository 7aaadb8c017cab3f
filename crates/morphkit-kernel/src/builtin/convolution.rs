//! Convolution kernels
//!
//! Gaussian family, linear blurs, the binomial kernel and the classic
//! named edge-detection tables.

use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2, TAU};

use super::{
    KernelDescriptor, KernelRegistry, odd_width, optimal_width_1d, optimal_width_2d, table,
};
use crate::geometry::GeometryArgs;
use crate::kernel::{Kernel, KernelKind, KernelList, kernel_side};
use crate::transform::NormalizeMode;
use crate::KernelResult;
use morphkit_core::EPSILON;

pub(super) fn register(registry: &mut KernelRegistry) {
    registry.register(
        "Unity",
        KernelDescriptor::new(KernelKind::Unity, unity).with_defaults(unity_defaults),
    );
    registry.register("Gaussian", KernelDescriptor::new(KernelKind::Gaussian, gaussian));
    registry.register("DoG", KernelDescriptor::new(KernelKind::DoG, dog));
    registry.register("LoG", KernelDescriptor::new(KernelKind::LoG, log));
    registry.register("Blur", KernelDescriptor::new(KernelKind::Blur, blur));
    registry.register("Comet", KernelDescriptor::new(KernelKind::Comet, comet));
    registry.register("Binomial", KernelDescriptor::new(KernelKind::Binomial, binomial));
    registry.register("Laplacian", KernelDescriptor::new(KernelKind::Laplacian, laplacian));
    registry.register("Sobel", KernelDescriptor::new(KernelKind::Sobel, sobel));
    registry.register("Roberts", KernelDescriptor::new(KernelKind::Roberts, roberts));
    registry.register("Prewitt", KernelDescriptor::new(KernelKind::Prewitt, prewitt));
    registry.register("Compass", KernelDescriptor::new(KernelKind::Compass, compass));
    registry.register("Kirsch", KernelDescriptor::new(KernelKind::Kirsch, kirsch));
    registry.register("FreiChen", KernelDescriptor::new(KernelKind::FreiChen, frei_chen));
}

fn unity_defaults(args: &mut GeometryArgs) {
    if !args.flags.rho {
        args.rho = 1.0;
    }
}

fn unity(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(Kernel::unity(KernelKind::Unity, args.rho).into())
}

// ============================================================================
// Gaussian family
// ============================================================================

/// Sampled 2D Gaussian; a vanishing sigma gives a unit impulse
fn sampled_gaussian(r2: f64, sigma: f64, at_origin: bool) -> f64 {
    if sigma > EPSILON {
        let a = 1.0 / (2.0 * sigma * sigma);
        let b = 1.0 / (TAU * sigma * sigma);
        (-r2 * a).exp() * b
    } else if at_origin {
        1.0
    } else {
        0.0
    }
}

fn gaussian_family(kind: KernelKind, args: &GeometryArgs) -> KernelResult<KernelList> {
    let sigma = args.sigma.abs();
    let sigma2 = args.xi.abs();
    let width = if args.rho >= 1.0 {
        odd_width(args.rho, 1)?
    } else if kind != KernelKind::DoG || sigma >= sigma2 {
        optimal_width_2d(args.rho, sigma)?
    } else {
        optimal_width_2d(args.rho, sigma2)?
    };
    let center = (width - 1) / 2;

    let kernel = Kernel::from_fn(kind, width, width, center, center, |u, v| {
        let r2 = (u * u + v * v) as f64;
        let at_origin = u == 0 && v == 0;
        let value = match kind {
            KernelKind::LoG => {
                if sigma > EPSILON {
                    let r = r2 / (2.0 * sigma * sigma);
                    (1.0 - r) * (-r).exp() / (PI * sigma.powi(4))
                } else if at_origin {
                    1.0
                } else {
                    0.0
                }
            }
            KernelKind::DoG => {
                sampled_gaussian(r2, sigma, at_origin) - sampled_gaussian(r2, sigma2, at_origin)
            }
            _ => sampled_gaussian(r2, sigma, at_origin),
        };
        Some(value)
    })?;

    // Clipping by a user radius leaves the kernel unnormalized
    Ok(kernel.scale(1.0, NormalizeMode::CorrelateNormalize).into())
}

fn gaussian(args: &GeometryArgs) -> KernelResult<KernelList> {
    gaussian_family(KernelKind::Gaussian, args)
}

fn dog(args: &GeometryArgs) -> KernelResult<KernelList> {
    gaussian_family(KernelKind::DoG, args)
}

fn log(args: &GeometryArgs) -> KernelResult<KernelList> {
    gaussian_family(KernelKind::LoG, args)
}

/// Oversampling factor of the 1D blur curves
const KERNEL_RANK: usize = 3;

fn blur(args: &GeometryArgs) -> KernelResult<KernelList> {
    let sigma = args.sigma.abs();
    let width = if args.rho >= 1.0 {
        odd_width(args.rho, 1)?
    } else {
        optimal_width_1d(args.rho, sigma)?
    };
    let center = (width - 1) / 2;

    // A curve three times the width, folded back into the kernel cells
    let mut values = vec![0.0; width];
    if sigma > EPSILON {
        let sigma = sigma * KERNEL_RANK as f64;
        let alpha = 1.0 / (2.0 * sigma * sigma);
        let beta = 1.0 / (TAU.sqrt() * sigma);
        let v = ((width * KERNEL_RANK - 1) / 2) as i64;
        for u in -v..=v {
            values[((u + v) as usize) / KERNEL_RANK] += (-((u * u) as f64) * alpha).exp() * beta;
        }
    } else {
        values[center] = 1.0;
    }

    let kernel = Kernel::new(
        KernelKind::Blur,
        width,
        1,
        center,
        0,
        values.into_iter().map(Some).collect(),
    )?;
    Ok(kernel
        .scale(1.0, NormalizeMode::CorrelateNormalize)
        .rotate(args.xi)
        .into())
}

fn comet(args: &GeometryArgs) -> KernelResult<KernelList> {
    let sigma = args.sigma.abs();
    let width = if args.rho < 1.0 {
        (optimal_width_1d(args.rho, sigma)? - 1) / 2 + 1
    } else {
        kernel_side(args.rho)?
    };

    let mut values = vec![0.0; width];
    if sigma > EPSILON {
        let sigma = sigma * KERNEL_RANK as f64;
        let a = 1.0 / (2.0 * sigma * sigma);
        for u in 0..width * KERNEL_RANK {
            values[u / KERNEL_RANK] += (-((u * u) as f64) * a).exp();
        }
    } else {
        values[0] = 1.0;
    }

    let kernel = Kernel::new(
        KernelKind::Comet,
        width,
        1,
        0,
        0,
        values.into_iter().map(Some).collect(),
    )?;
    Ok(kernel
        .scale(1.0, NormalizeMode::Normalize)
        .rotate(args.xi)
        .into())
}

/// Binomial coefficient `C(n, k)` in floating point
fn choose(n: usize, k: usize) -> f64 {
    (0..k)
        .fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
        .round()
}

fn binomial(args: &GeometryArgs) -> KernelResult<KernelList> {
    let width = odd_width(args.rho, 3)?;
    let center = (width - 1) / 2;
    let order = width - 1;
    let kernel = Kernel::from_fn(KernelKind::Binomial, width, width, center, center, |u, v| {
        let x = (u + center as i64) as usize;
        let y = (v + center as i64) as usize;
        Some(choose(order, y) * choose(order, x))
    })?;
    Ok(kernel.into())
}

// ============================================================================
// Named tables
// ============================================================================

const LAPLACIAN_0: &str = "3: -1,-1,-1  -1,8,-1  -1,-1,-1";
const LAPLACIAN_1: &str = "3: 0,-1,0  -1,4,-1  0,-1,0";
const LAPLACIAN_2: &str = "3: -2,1,-2  1,4,1  -2,1,-2";
const LAPLACIAN_3: &str = "3: 1,-2,1  -2,4,-2  1,-2,1";
const LAPLACIAN_5: &str =
    "5: -4,-1,0,-1,-4  -1,2,3,2,-1  0,3,4,3,0  -1,2,3,2,-1  -4,-1,0,-1,-4";
const LAPLACIAN_7: &str = "7: -10,-5,-2,-1,-2,-5,-10  -5,0,3,4,3,0,-5  -2,3,6,7,6,3,-2  \
     -1,4,7,8,7,4,-1  -2,3,6,7,6,3,-2  -5,0,3,4,3,0,-5  -10,-5,-2,-1,-2,-5,-10";
// 5x5 LoG, sigma about 1.4
const LAPLACIAN_15: &str =
    "5: 0,0,-1,0,0  0,-1,-2,-1,0  -1,-2,16,-2,-1  0,-1,-2,-1,0  0,0,-1,0,0";
// 9x9 LoG, sigma about 1.4
const LAPLACIAN_19: &str = "9: 0,-1,-1,-2,-2,-2,-1,-1,0  -1,-2,-4,-5,-5,-5,-4,-2,-1  \
     -1,-4,-5,-3,0,-3,-5,-4,-1  -2,-5,-3,12,24,12,-3,-5,-2  -2,-5,0,24,40,24,0,-5,-2  \
     -2,-5,-3,12,24,12,-3,-5,-2  -1,-4,-5,-3,0,-3,-5,-4,-1  -1,-2,-4,-5,-5,-5,-4,-2,-1  \
     0,-1,-1,-2,-2,-2,-1,-1,0";

fn laplacian(args: &GeometryArgs) -> KernelResult<KernelList> {
    let text = match args.rho as i64 {
        1 => LAPLACIAN_1,
        2 => LAPLACIAN_2,
        3 => LAPLACIAN_3,
        5 => LAPLACIAN_5,
        7 => LAPLACIAN_7,
        15 => LAPLACIAN_15,
        19 => LAPLACIAN_19,
        _ => LAPLACIAN_0,
    };
    Ok(table(KernelKind::Laplacian, text)?.into())
}

fn sobel(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(table(KernelKind::Sobel, "3: 1,0,-1  2,0,-2  1,0,-1")?
        .rotate(args.rho)
        .into())
}

fn roberts(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(table(KernelKind::Roberts, "3: 0,0,0  1,-1,0  0,0,0")?
        .rotate(args.rho)
        .into())
}

fn prewitt(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(table(KernelKind::Prewitt, "3: 1,0,-1  1,0,-1  1,0,-1")?
        .rotate(args.rho)
        .into())
}

fn compass(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(table(KernelKind::Compass, "3: 1,1,-1  1,-2,-1  1,1,-1")?
        .rotate(args.rho)
        .into())
}

fn kirsch(args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(table(KernelKind::Kirsch, "3: 5,-3,-3  5,0,-3  5,-3,-3")?
        .rotate(args.rho)
        .into())
}

/// Replace some cells of a table kernel
fn with_cells(kernel: Kernel, cells: &[(usize, f64)]) -> Kernel {
    let mut values = kernel.values().to_vec();
    for &(index, value) in cells {
        values[index] = Some(value);
    }
    kernel.with_values(values)
}

/// One Frei-Chen basis kernel; unknown variants give the plain edge kernel
fn frei_chen_kernel(variant: i64) -> KernelResult<Kernel> {
    let kind = KernelKind::FreiChen;
    let kernel = match variant {
        2 => with_cells(
            table(kind, "3: 1,2,0  2,0,-2  0,-2,-1")?,
            &[(1, SQRT_2), (3, SQRT_2), (5, -SQRT_2), (7, -SQRT_2)],
        )
        .multiplied(FRAC_1_SQRT_2),
        1 | 11 => with_cells(
            table(kind, "3: 1,0,-1  2,0,-2  1,0,-1")?,
            &[(3, SQRT_2), (5, -SQRT_2)],
        )
        .multiplied(FRAC_1_SQRT_2),
        12 => with_cells(
            table(kind, "3: 1,2,1  0,0,0  1,2,1")?,
            &[(1, SQRT_2), (7, SQRT_2)],
        )
        .multiplied(FRAC_1_SQRT_2),
        13 => with_cells(
            table(kind, "3: 2,-1,0  -1,0,1  0,1,-2")?,
            &[(0, SQRT_2), (8, -SQRT_2)],
        )
        .multiplied(FRAC_1_SQRT_2),
        14 => with_cells(
            table(kind, "3: 0,1,-2  -1,0,1  2,-1,0")?,
            &[(2, -SQRT_2), (6, SQRT_2)],
        )
        .multiplied(FRAC_1_SQRT_2),
        15 => table(kind, "3: 0,-1,0  1,0,1  0,-1,0")?.multiplied(0.5),
        16 => table(kind, "3: 1,0,-1  0,0,0  -1,0,1")?.multiplied(0.5),
        17 => table(kind, "3: 1,-2,1  -2,4,-2  -1,-2,1")?.multiplied(1.0 / 6.0),
        18 => table(kind, "3: -2,1,-2  1,4,1  -2,1,-2")?.multiplied(1.0 / 6.0),
        19 => table(kind, "3: 1,1,1  1,1,1  1,1,1")?.multiplied(1.0 / 3.0),
        _ => with_cells(
            table(kind, "3: 1,0,-1  2,0,-2  1,0,-1")?,
            &[(3, SQRT_2), (5, -SQRT_2)],
        ),
    };
    Ok(kernel)
}

fn frei_chen(args: &GeometryArgs) -> KernelResult<KernelList> {
    let variant = args.rho as i64;
    let list = if variant == 10 {
        // The full orthogonal basis
        let kernels = (11..=19)
            .map(frei_chen_kernel)
            .collect::<KernelResult<Vec<_>>>()?;
        KernelList::from_vec(kernels)?
    } else {
        frei_chen_kernel(variant)?.into()
    };

    // The angle is sigma; an out-of-range type doubles as an angle
    if args.sigma.abs() >= EPSILON {
        Ok(list.rotate(args.sigma))
    } else if args.rho.abs() > 30.0 {
        Ok(list.rotate(args.rho))
    } else {
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn args(rho: f64, sigma: f64, xi: f64) -> GeometryArgs {
        let mut a = GeometryArgs {
            rho,
            sigma,
            xi,
            ..Default::default()
        };
        a.flags.rho = true;
        a.flags.sigma = true;
        a.flags.xi = true;
        a
    }

    #[test]
    fn test_gaussian_normalized() {
        let list = gaussian(&args(0.0, 1.0, 0.0)).unwrap();
        let k = list.first();
        assert_eq!(k.width() % 2, 1);
        assert_relative_eq!(k.stats().sum(), 1.0, epsilon = 1e-9);
        assert_eq!(k.stats().maximum, k.get(k.origin_x(), k.origin_y()).unwrap());
    }

    #[test]
    fn test_gaussian_radius_sets_width() {
        let list = gaussian(&args(2.0, 1.0, 0.0)).unwrap();
        assert_eq!((list.first().width(), list.first().height()), (5, 5));
    }

    #[test]
    fn test_gaussian_zero_sigma_is_impulse() {
        let list = gaussian(&args(1.0, 0.0, 0.0)).unwrap();
        let k = list.first();
        assert_eq!(k.get(1, 1), Some(1.0));
        assert_eq!(k.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_dog_and_log_zero_summing() {
        let d = dog(&args(3.0, 1.0, 2.0)).unwrap();
        assert_relative_eq!(d.first().stats().sum(), 0.0, epsilon = 1e-9);
        let l = log(&args(3.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(l.first().stats().sum(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_blur_is_linear_and_rotatable() {
        let list = blur(&args(2.0, 1.0, 0.0)).unwrap();
        let k = list.first();
        assert_eq!((k.width(), k.height(), k.origin_x()), (5, 1, 2));
        assert_relative_eq!(k.stats().sum(), 1.0, epsilon = 1e-9);

        let column = blur(&args(2.0, 1.0, 90.0)).unwrap();
        assert_eq!((column.first().width(), column.first().height()), (1, 5));
    }

    #[test]
    fn test_comet_one_sided() {
        let list = comet(&args(4.0, 2.0, 0.0)).unwrap();
        let k = list.first();
        assert_eq!((k.width(), k.origin_x()), (4, 0));
        assert_relative_eq!(k.stats().sum(), 1.0, epsilon = 1e-9);
        assert!(k.get(0, 0).unwrap() > k.get(3, 0).unwrap());
    }

    #[test]
    fn test_binomial_values() {
        let list = binomial(&args(1.0, 0.0, 0.0)).unwrap();
        let values: Vec<f64> = list.first().values().iter().flatten().copied().collect();
        assert_eq!(values, vec![1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_laplacian_types() {
        let k = laplacian(&args(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(k.first().get(1, 1), Some(8.0));
        let k = laplacian(&args(19.0, 0.0, 0.0)).unwrap();
        assert_eq!(k.first().width(), 9);
        assert_relative_eq!(k.first().stats().sum(), 0.0);
        assert_eq!(k.first().kind(), KernelKind::Laplacian);
    }

    #[test]
    fn test_sobel_rotation() {
        let k = sobel(&args(90.0, 0.0, 0.0)).unwrap();
        assert_eq!(k.first().get(1, 0), Some(2.0));
        assert_eq!(k.first().get(1, 2), Some(-2.0));
    }

    #[test]
    fn test_frei_chen() {
        let k = frei_chen(&args(0.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(k.first().get(0, 1).unwrap(), SQRT_2);
        let basis = frei_chen(&args(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(basis.len(), 9);
        let k = frei_chen(&args(19.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(k.first().stats().sum(), 3.0, epsilon = 1e-12);
    }
}
