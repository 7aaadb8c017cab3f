//! Kernel transforms
//!
//! Rotation, reflection, scaling and expansion of kernels. Every transform
//! returns a new value; the input kernel is never modified. The list forms
//! apply the transform to each kernel in order.
//!
//! Rotations are limited to what a pixel grid supports exactly:
//!
//! - 45 degree steps on 3x3 kernels (the eight border cells shift by one)
//! - 90 degree steps on square kernels and by transposing 1xN / Nx1 kernels
//! - 180 degree reflection on any kernel
//!
//! Requests the grid cannot honor are logged with `warn!` and leave the
//! kernel unrotated.

use crate::geometry::parse_geometry;
use crate::kernel::{Kernel, KernelList, RotationPolicy};
use crate::KernelResult;
use morphkit_core::EPSILON;
use tracing::warn;

/// How [`Kernel::scale`] normalizes before applying the factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NormalizeMode {
    /// Multiply values by the factor as given
    #[default]
    None,
    /// Divide by the value sum first (by the positive sum if the kernel is
    /// zero-summing)
    Normalize,
    /// Divide positive and negative values by their own sums, making the
    /// kernel zero-summing
    CorrelateNormalize,
}

impl Kernel {
    /// Rotate by `angle` degrees
    ///
    /// Angles within 22.5 degrees of zero leave the kernel unchanged, as do
    /// all angles for rotation-invariant kinds.
    pub fn rotate(&self, angle: f64) -> Kernel {
        let mut angle = angle.rem_euclid(360.0);
        if angle > 337.5 || angle <= 22.5 {
            return self.clone();
        }

        match self.rotation_policy() {
            RotationPolicy::Invariant => return self.clone(),
            RotationPolicy::TransposeOnly => {
                if angle > 135.0 && angle <= 225.0 {
                    return self.clone();
                }
                if angle > 225.0 && angle <= 315.0 {
                    angle -= 180.0;
                }
            }
            RotationPolicy::Free => {}
        }

        let mut out = self.clone();

        let quarter = angle % 90.0;
        if quarter > 22.5 && quarter <= 67.5 {
            if out.width() == 3 && out.height() == 3 {
                out = out.rotated_45();
                angle = (angle + 315.0) % 360.0;
            } else {
                warn!(
                    kind = %out.kind(),
                    width = out.width(),
                    height = out.height(),
                    "unable to rotate non-3x3 kernel by 45 degrees"
                );
            }
        }

        let half = angle % 180.0;
        if half > 45.0 && half <= 135.0 {
            if out.width() == 1 || out.height() == 1 {
                let transposed_to_column = out.height() == 1;
                out = out.transposed();
                if transposed_to_column {
                    angle = (angle + 270.0) % 360.0;
                    out = out.with_angle_step(90.0);
                } else {
                    angle = (angle + 90.0) % 360.0;
                    out = out.with_angle_step(270.0);
                }
            } else if out.width() == out.height() {
                out = out.rotated_90();
                angle = (angle + 270.0) % 360.0;
            } else {
                warn!(
                    kind = %out.kind(),
                    width = out.width(),
                    height = out.height(),
                    "unable to rotate a non-square, non-linear kernel by 90 degrees"
                );
            }
        }

        if angle > 135.0 && angle <= 225.0 {
            out = out.rotated_180();
        }
        out
    }

    /// Reflect through the origin (a 180 degree rotation)
    ///
    /// Unlike [`Kernel::rotate`], reflection ignores the rotation policy;
    /// the executors rely on it for the mathematical convolution order.
    pub fn reflect(&self) -> Kernel {
        self.rotated_180()
    }

    /// Scale the values, optionally normalizing first
    ///
    /// # Examples
    ///
    /// ```
    /// use morphkit_kernel::{KernelList, NormalizeMode};
    ///
    /// let list: KernelList = "3: 1,2,1 2,4,2 1,2,1".parse().unwrap();
    /// let k = list.first().scale(1.0, NormalizeMode::Normalize);
    /// assert!((k.stats().positive_range - 1.0).abs() < 1e-12);
    /// ```
    pub fn scale(&self, factor: f64, mode: NormalizeMode) -> Kernel {
        let stats = *self.stats();
        let (pos_scale, neg_scale) = match mode {
            NormalizeMode::Normalize => {
                let sum = stats.sum();
                let s = if sum.abs() >= EPSILON {
                    sum.abs()
                } else {
                    stats.positive_range
                };
                (s, s)
            }
            NormalizeMode::CorrelateNormalize => (
                if stats.positive_range.abs() >= EPSILON {
                    stats.positive_range
                } else {
                    1.0
                },
                if stats.negative_range.abs() >= EPSILON {
                    -stats.negative_range
                } else {
                    1.0
                },
            ),
            NormalizeMode::None => (1.0, 1.0),
        };
        let pos = factor / pos_scale;
        let neg = factor / neg_scale;
        self.with_values(
            self.values()
                .iter()
                .map(|v| v.map(|v| if v >= 0.0 { v * pos } else { v * neg }))
                .collect(),
        )
    }

    /// Add `amount` to the origin cell
    ///
    /// A masked origin becomes active with value `amount`.
    pub fn unity_add(&self, amount: f64) -> Kernel {
        let index = self.origin_y() * self.width() + self.origin_x();
        let value = self.values()[index].unwrap_or(0.0) + amount;
        self.with_cell(index, Some(value))
    }

    /// Replace every masked cell with zero
    pub fn zero_nans(&self) -> Kernel {
        self.with_values(
            self.values()
                .iter()
                .map(|v| Some(v.unwrap_or(0.0)))
                .collect(),
        )
    }

    /// Expand into the cycle of rotations by `angle`
    ///
    /// Rotated copies are appended until a rotation reproduces this
    /// kernel, so a 3x3 kernel yields at most 8 entries at 45 degrees and
    /// a square kernel at most 4 at 90 degrees.
    pub fn expand_rotate(&self, angle: f64) -> KernelList {
        let mut list = KernelList::single(self.clone());
        // A 45 degree cycle is the longest one a grid rotation can produce.
        for _ in 0..8 {
            let next = list.last().rotate(angle);
            if self.same_as(&next) {
                break;
            }
            list.push(next);
        }
        list
    }

    /// Expand into the four mirror images of this kernel
    ///
    /// The list is: the kernel, its 180 degree reflection, that turned 90
    /// degrees, and the last again reflected.
    pub fn expand_mirror(&self) -> KernelList {
        let mut list = KernelList::single(self.clone());
        for angle in [180.0, 90.0, 180.0] {
            let next = list.last().rotate(angle);
            list.push(next);
        }
        list
    }

    fn with_angle_step(&self, step: f64) -> Kernel {
        self.reshaped(
            self.width(),
            self.height(),
            self.origin_x(),
            self.origin_y(),
            self.values().to_vec(),
            (self.angle() + step) % 360.0,
        )
    }

    /// Shift the border of a 3x3 kernel by one cell clockwise
    fn rotated_45(&self) -> Kernel {
        let old = self.values();
        let mut v = old.to_vec();
        v[0] = old[3];
        v[3] = old[6];
        v[6] = old[7];
        v[7] = old[8];
        v[8] = old[5];
        v[5] = old[2];
        v[2] = old[1];
        v[1] = old[0];

        let mut x = self.origin_x() as i64 - 1;
        let mut y = self.origin_y() as i64 - 1;
        if x == y {
            x = 0;
        } else if x == 0 {
            x = -y;
        } else if x == -y {
            y = 0;
        } else if y == 0 {
            y = x;
        }
        self.reshaped(
            3,
            3,
            (x + 1) as usize,
            (y + 1) as usize,
            v,
            (self.angle() + 45.0) % 360.0,
        )
    }

    /// Swap width and height of a 1xN or Nx1 kernel
    fn transposed(&self) -> Kernel {
        self.reshaped(
            self.height(),
            self.width(),
            self.origin_y(),
            self.origin_x(),
            self.values().to_vec(),
            self.angle(),
        )
    }

    /// Quarter turn of a square kernel
    fn rotated_90(&self) -> Kernel {
        let w = self.width();
        let old = self.values();
        let mut v = Vec::with_capacity(old.len());
        for r in 0..w {
            for c in 0..w {
                v.push(old[(w - 1 - c) * w + r]);
            }
        }
        self.reshaped(
            w,
            w,
            w - 1 - self.origin_y(),
            self.origin_x(),
            v,
            (self.angle() + 90.0) % 360.0,
        )
    }

    fn rotated_180(&self) -> Kernel {
        let mut v = self.values().to_vec();
        v.reverse();
        self.reshaped(
            self.width(),
            self.height(),
            self.width() - 1 - self.origin_x(),
            self.height() - 1 - self.origin_y(),
            v,
            (self.angle() + 180.0) % 360.0,
        )
    }
}

impl KernelList {
    /// Rotate every kernel by `angle` degrees
    pub fn rotate(&self, angle: f64) -> KernelList {
        self.map(|k| k.rotate(angle))
    }

    /// Reflect every kernel through its origin
    pub fn reflect(&self) -> KernelList {
        self.map(Kernel::reflect)
    }

    /// Scale every kernel, each normalized by its own sums
    pub fn scale(&self, factor: f64, mode: NormalizeMode) -> KernelList {
        self.map(|k| k.scale(factor, mode))
    }

    /// Add `amount` to the origin cell of every kernel
    pub fn unity_add(&self, amount: f64) -> KernelList {
        self.map(|k| k.unity_add(amount))
    }

    /// Replace masked cells with zero in every kernel
    pub fn zero_nans(&self) -> KernelList {
        self.map(Kernel::zero_nans)
    }

    /// Expand the whole list as a group into its cycle of rotations
    ///
    /// Each step rotates the previous group by `angle` and appends it,
    /// stopping when the rotated group's first kernel reproduces the
    /// first kernel of this list.
    pub fn expand_rotate(&self, angle: f64) -> KernelList {
        let mut out = self.clone();
        let mut group = self.clone();
        for _ in 0..8 {
            let next = group.rotate(angle);
            if self.first().same_as(next.first()) {
                break;
            }
            out.extend(next.clone());
            group = next;
        }
        out
    }

    /// Expand the whole list as a group into its four mirror images
    pub fn expand_mirror(&self) -> KernelList {
        let mut out = self.clone();
        let mut group = self.clone();
        for angle in [180.0, 90.0, 180.0] {
            group = group.rotate(angle);
            out.extend(group.clone());
        }
        out
    }

    /// Scale by a geometry string `factor[%][!|^][,unity[%]]`
    ///
    /// `%` makes both numbers percentages, `!` normalizes and `^`
    /// correlate-normalizes before scaling. A missing factor is 1. When a
    /// unity amount is given, that much of the identity kernel is added
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `KernelError::InvalidSpec` for a malformed geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use morphkit_kernel::KernelList;
    ///
    /// let list: KernelList = "Gaussian:0,1".parse().unwrap();
    /// let sharpen = list.scale_geometry("-100,200%").unwrap();
    /// assert!((sharpen.first().stats().sum() - 1.0).abs() < 1e-9);
    /// ```
    pub fn scale_geometry(&self, geometry: &str) -> KernelResult<KernelList> {
        let mut args = parse_geometry(geometry)?;
        if args.flags.percent {
            args.rho *= 0.01;
            args.sigma *= 0.01;
        }
        if !args.flags.rho {
            args.rho = 1.0;
        }
        // `^` overrides `!` when both are given
        let mode = if args.flags.minimum {
            NormalizeMode::CorrelateNormalize
        } else if args.flags.aspect {
            NormalizeMode::Normalize
        } else {
            NormalizeMode::None
        };
        let mut scaled = self.scale(args.rho, mode);
        if args.flags.sigma {
            scaled = scaled.unity_add(args.sigma);
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelKind;

    fn user(w: usize, h: usize, ox: usize, oy: usize, values: &[f64]) -> Kernel {
        Kernel::new(
            KernelKind::UserDefined,
            w,
            h,
            ox,
            oy,
            values.iter().map(|&v| Some(v)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_rotate_45_border_shift() {
        let k = user(3, 3, 1, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let r = k.rotate(45.0);
        let values: Vec<f64> = r.values().iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![4.0, 1.0, 2.0, 7.0, 5.0, 3.0, 8.0, 9.0, 6.0]);
        assert_eq!(r.angle(), 45.0);
    }

    #[test]
    fn test_rotate_45_origin() {
        let k = user(3, 3, 0, 0, &[1.0; 9]);
        let r = k.rotate(45.0);
        assert_eq!((r.origin_x(), r.origin_y()), (1, 0));
        let r = r.rotate(45.0);
        assert_eq!((r.origin_x(), r.origin_y()), (2, 0));
    }

    #[test]
    fn test_rotate_90_square() {
        let k = user(3, 3, 0, 0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let r = k.rotate(90.0);
        let values: Vec<f64> = r.values().iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![7.0, 4.0, 1.0, 8.0, 5.0, 2.0, 9.0, 6.0, 3.0]);
        assert_eq!((r.origin_x(), r.origin_y()), (2, 0));
        assert_eq!(r.angle(), 90.0);
    }

    #[test]
    fn test_rotate_90_linear_transpose() {
        let k = user(3, 1, 0, 0, &[1.0, 2.0, 3.0]);
        let r = k.rotate(90.0);
        assert_eq!((r.width(), r.height()), (1, 3));
        assert_eq!(r.angle(), 90.0);
        let back = r.rotate(90.0);
        assert_eq!((back.width(), back.height()), (3, 1));
    }

    #[test]
    fn test_rotate_180() {
        let k = user(2, 1, 0, 0, &[1.0, 2.0]);
        let r = k.rotate(180.0);
        assert_eq!(r.values(), &[Some(2.0), Some(1.0)]);
        assert_eq!((r.origin_x(), r.origin_y()), (1, 0));
    }

    #[test]
    fn test_rotate_non_square_warns_noop() {
        let k = user(3, 2, 1, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(k.rotate(90.0).same_as(&k));
        let k5 = Kernel::from_fn(KernelKind::UserDefined, 5, 5, 2, 2, |u, _| Some(u as f64))
            .unwrap();
        assert!(k5.rotate(45.0).same_as(&k5));
    }

    #[test]
    fn test_rotate_near_zero() {
        let k = user(3, 1, 0, 0, &[1.0, 2.0, 3.0]);
        assert_eq!(k.rotate(20.0), k);
        assert_eq!(k.rotate(-20.0), k);
        assert_eq!(k.rotate(360.0), k);
    }

    #[test]
    fn test_invariant_kind() {
        let k = user(3, 3, 1, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
            .with_kind(KernelKind::Square);
        assert_eq!(k.rotate(90.0), k);
    }

    #[test]
    fn test_scale_modes() {
        let k = user(3, 1, 1, 0, &[-1.0, 3.0, -1.0]);
        let n = k.scale(2.0, NormalizeMode::Normalize);
        assert!((n.stats().sum() - 2.0).abs() < 1e-12);
        let c = k.scale(1.0, NormalizeMode::CorrelateNormalize);
        assert!((c.stats().positive_range - 1.0).abs() < 1e-12);
        assert!((c.stats().negative_range + 1.0).abs() < 1e-12);
        let p = k.scale(-1.0, NormalizeMode::None);
        assert_eq!(p.stats().maximum, 1.0);
        assert_eq!(p.stats().minimum, -3.0);
    }

    #[test]
    fn test_normalize_zero_summing_uses_positive_range() {
        let k = user(3, 1, 1, 0, &[-1.0, 2.0, -1.0]);
        let n = k.scale(1.0, NormalizeMode::Normalize);
        assert!((n.stats().positive_range - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unity_add_masked_origin() {
        let k = Kernel::new(
            KernelKind::UserDefined,
            3,
            1,
            1,
            0,
            vec![Some(1.0), None, Some(1.0)],
        )
        .unwrap();
        let u = k.unity_add(0.5);
        assert_eq!(u.values()[1], Some(0.5));
        assert!((u.stats().sum() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_nans() {
        let k = Kernel::new(KernelKind::UserDefined, 2, 1, 0, 0, vec![Some(1.0), None]).unwrap();
        assert_eq!(k.zero_nans().values(), &[Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_expand_mirror_count() {
        let k = user(3, 3, 1, 1, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(k.expand_mirror().len(), 4);
    }

    #[test]
    fn test_group_expansion() {
        let a = user(3, 3, 1, 1, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = user(3, 3, 1, 1, &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let list = KernelList::from_vec(vec![a.clone(), b.clone()]).unwrap();
        let rotated = list.expand_rotate(90.0);
        assert_eq!(rotated.len(), 8);
        assert!(rotated.get(1).unwrap().same_as(&b));
        assert!(rotated.get(3).unwrap().same_as(&b.rotate(90.0)));
        assert_eq!(list.expand_mirror().len(), 8);
    }

    #[test]
    fn test_expand_rotate_counts() {
        let k = user(3, 3, 1, 1, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(k.expand_rotate(45.0).len(), 8);
        assert_eq!(k.expand_rotate(90.0).len(), 4);
        let sym = user(3, 3, 1, 1, &[1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(sym.expand_rotate(90.0).len(), 1);
    }
}
