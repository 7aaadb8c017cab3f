//! Kernel value type
//!
//! A [`Kernel`] is a small weighted neighborhood with a home ("origin")
//! cell. Each cell is either an active weight (`Some(v)`) or outside the
//! neighborhood mask (`None`); a masked cell is distinct from a zero weight.
//!
//! Kernels are immutable values: every transform returns a new kernel, so a
//! reflected copy can be derived while the original is still in use.
//!
//! Several kernels applied in order form a [`KernelList`].

use crate::{KernelError, KernelResult};
use morphkit_core::EPSILON;

/// Largest width or height a kernel description may ask for
pub const MAX_KERNEL_SIDE: usize = 65535;

/// Convert a real-valued extent to a kernel side, rejecting anything
/// negative, non-finite or above [`MAX_KERNEL_SIDE`]
pub(crate) fn kernel_side(extent: f64) -> KernelResult<usize> {
    if extent.is_finite() && (0.0..=MAX_KERNEL_SIDE as f64).contains(&extent) {
        Ok(extent as usize)
    } else {
        Err(KernelError::spec(format!(
            "kernel extent {extent} outside 0..={MAX_KERNEL_SIDE}"
        )))
    }
}

/// Which generator produced a kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Parsed from an explicit value array
    UserDefined,
    Unity,
    Gaussian,
    DoG,
    LoG,
    Blur,
    Comet,
    Binomial,
    Laplacian,
    Sobel,
    Roberts,
    Prewitt,
    Compass,
    Kirsch,
    FreiChen,
    Diamond,
    Square,
    Rectangle,
    Octagon,
    Disk,
    Plus,
    Cross,
    Ring,
    Peaks,
    Edges,
    Corners,
    Diagonals,
    LineEnds,
    LineJunctions,
    Ridges,
    ConvexHull,
    Skeleton,
    ThinSE,
    Chebyshev,
    Manhattan,
    Octagonal,
    Euclidean,
    /// Produced by a generator registered at run time
    Custom(&'static str),
}

impl KernelKind {
    /// Display name of the kind
    pub fn name(self) -> &'static str {
        match self {
            KernelKind::UserDefined => "User Defined",
            KernelKind::Unity => "Unity",
            KernelKind::Gaussian => "Gaussian",
            KernelKind::DoG => "DoG",
            KernelKind::LoG => "LoG",
            KernelKind::Blur => "Blur",
            KernelKind::Comet => "Comet",
            KernelKind::Binomial => "Binomial",
            KernelKind::Laplacian => "Laplacian",
            KernelKind::Sobel => "Sobel",
            KernelKind::Roberts => "Roberts",
            KernelKind::Prewitt => "Prewitt",
            KernelKind::Compass => "Compass",
            KernelKind::Kirsch => "Kirsch",
            KernelKind::FreiChen => "FreiChen",
            KernelKind::Diamond => "Diamond",
            KernelKind::Square => "Square",
            KernelKind::Rectangle => "Rectangle",
            KernelKind::Octagon => "Octagon",
            KernelKind::Disk => "Disk",
            KernelKind::Plus => "Plus",
            KernelKind::Cross => "Cross",
            KernelKind::Ring => "Ring",
            KernelKind::Peaks => "Peaks",
            KernelKind::Edges => "Edges",
            KernelKind::Corners => "Corners",
            KernelKind::Diagonals => "Diagonals",
            KernelKind::LineEnds => "LineEnds",
            KernelKind::LineJunctions => "LineJunctions",
            KernelKind::Ridges => "Ridges",
            KernelKind::ConvexHull => "ConvexHull",
            KernelKind::Skeleton => "Skeleton",
            KernelKind::ThinSE => "ThinSE",
            KernelKind::Chebyshev => "Chebyshev",
            KernelKind::Manhattan => "Manhattan",
            KernelKind::Octagonal => "Octagonal",
            KernelKind::Euclidean => "Euclidean",
            KernelKind::Custom(name) => name,
        }
    }

    /// How kernels of this kind respond to rotation
    pub fn default_rotation(self) -> RotationPolicy {
        match self {
            // Cylindrical, or already symmetric under 90 degree turns
            KernelKind::Gaussian
            | KernelKind::DoG
            | KernelKind::LoG
            | KernelKind::Disk
            | KernelKind::Peaks
            | KernelKind::Laplacian
            | KernelKind::Chebyshev
            | KernelKind::Manhattan
            | KernelKind::Euclidean
            | KernelKind::Square
            | KernelKind::Diamond
            | KernelKind::Plus
            | KernelKind::Cross => RotationPolicy::Invariant,
            KernelKind::Blur => RotationPolicy::TransposeOnly,
            _ => RotationPolicy::Free,
        }
    }
}

impl std::fmt::Display for KernelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rotation behavior of a kernel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationPolicy {
    /// Rotation never changes the kernel
    Invariant,
    /// Only quarter turns apply; half turns are ignored
    TransposeOnly,
    /// All supported rotations apply
    #[default]
    Free,
}

/// Derived statistics of a kernel's active values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelStats {
    /// Smallest active value
    pub minimum: f64,
    /// Largest active value
    pub maximum: f64,
    /// Sum of the positive active values
    pub positive_range: f64,
    /// Sum of the negative active values (zero or negative)
    pub negative_range: f64,
}

impl KernelStats {
    /// Sum of all active values
    #[inline]
    pub fn sum(&self) -> f64 {
        self.positive_range + self.negative_range
    }

    /// True if the active values sum to zero
    pub fn is_zero_summing(&self) -> bool {
        self.sum().abs() < EPSILON
    }

    /// True if the active values sum to one
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < EPSILON
    }
}

/// Snap near-zero values to zero and recompute statistics
fn compute_stats(values: &mut [Option<f64>]) -> KernelStats {
    let mut stats = KernelStats {
        minimum: f64::INFINITY,
        maximum: f64::NEG_INFINITY,
        positive_range: 0.0,
        negative_range: 0.0,
    };
    for v in values.iter_mut().flatten() {
        if v.abs() < EPSILON {
            *v = 0.0;
        }
        if *v < 0.0 {
            stats.negative_range += *v;
        } else {
            stats.positive_range += *v;
        }
        stats.minimum = stats.minimum.min(*v);
        stats.maximum = stats.maximum.max(*v);
    }
    stats
}

/// A 2D weighted neighborhood with an origin cell
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    kind: KernelKind,
    rotation: RotationPolicy,
    width: usize,
    height: usize,
    origin_x: usize,
    origin_y: usize,
    /// Row-major cells; `None` is outside the mask
    values: Vec<Option<f64>>,
    /// Cumulative rotation in degrees
    angle: f64,
    stats: KernelStats,
}

impl Kernel {
    /// Create a kernel from row-major cell values
    ///
    /// # Arguments
    ///
    /// * `kind` - Generator tag
    /// * `width`, `height` - Extent (both > 0)
    /// * `origin_x`, `origin_y` - Home cell, inside the extent
    /// * `values` - `width * height` cells, `None` for masked cells
    ///
    /// # Errors
    ///
    /// Returns `KernelError::InvalidSpec` for a bad extent, an origin outside
    /// the extent, a wrong value count, or a kernel with no active cell.
    pub fn new(
        kind: KernelKind,
        width: usize,
        height: usize,
        origin_x: usize,
        origin_y: usize,
        mut values: Vec<Option<f64>>,
    ) -> KernelResult<Self> {
        if width == 0 || height == 0 {
            return Err(KernelError::spec(format!(
                "kernel size {width}x{height} is empty"
            )));
        }
        if origin_x >= width || origin_y >= height {
            return Err(KernelError::spec(format!(
                "origin +{origin_x}+{origin_y} outside {width}x{height} kernel"
            )));
        }
        if width.checked_mul(height) != Some(values.len()) {
            return Err(KernelError::spec(format!(
                "{} values given for a {width}x{height} kernel",
                values.len()
            )));
        }
        if values.iter().all(Option::is_none) {
            return Err(KernelError::spec("kernel has no active values"));
        }
        let stats = compute_stats(&mut values);
        Ok(Kernel {
            kind,
            rotation: kind.default_rotation(),
            width,
            height,
            origin_x,
            origin_y,
            values,
            angle: 0.0,
            stats,
        })
    }

    /// Create a kernel by evaluating `f(u, v)` at every cell
    ///
    /// `(u, v)` is the cell position relative to the origin.
    pub fn from_fn<F>(
        kind: KernelKind,
        width: usize,
        height: usize,
        origin_x: usize,
        origin_y: usize,
        mut f: F,
    ) -> KernelResult<Self>
    where
        F: FnMut(i64, i64) -> Option<f64>,
    {
        let len = width
            .checked_mul(height)
            .ok_or(KernelError::AllocationFailed)?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| KernelError::AllocationFailed)?;
        for y in 0..height {
            for x in 0..width {
                values.push(f(
                    x as i64 - origin_x as i64,
                    y as i64 - origin_y as i64,
                ));
            }
        }
        Self::new(kind, width, height, origin_x, origin_y, values)
    }

    /// The single-cell identity kernel with weight `scale`
    pub fn unity(kind: KernelKind, scale: f64) -> Self {
        let mut values = vec![Some(scale)];
        let stats = compute_stats(&mut values);
        Kernel {
            kind,
            rotation: kind.default_rotation(),
            width: 1,
            height: 1,
            origin_x: 0,
            origin_y: 0,
            values,
            angle: 0.0,
            stats,
        }
    }

    /// Generator tag
    #[inline]
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// Rotation behavior
    #[inline]
    pub fn rotation_policy(&self) -> RotationPolicy {
        self.rotation
    }

    /// Kernel width
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Kernel height
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Origin x coordinate
    #[inline]
    pub fn origin_x(&self) -> usize {
        self.origin_x
    }

    /// Origin y coordinate
    #[inline]
    pub fn origin_y(&self) -> usize {
        self.origin_y
    }

    /// Row-major cells
    #[inline]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Cell at `(x, y)`; `None` if masked or outside the kernel
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values[y * self.width + x]
    }

    /// Number of active (unmasked) cells
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Cumulative rotation in degrees
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Derived statistics
    #[inline]
    pub fn stats(&self) -> &KernelStats {
        &self.stats
    }

    /// Copy with a different kind and its default rotation policy
    pub(crate) fn with_kind(mut self, kind: KernelKind) -> Self {
        self.kind = kind;
        self.rotation = kind.default_rotation();
        self
    }

    /// Copy with a different rotation policy
    pub(crate) fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace geometry and values in one step, refreshing statistics
    pub(crate) fn reshaped(
        &self,
        width: usize,
        height: usize,
        origin_x: usize,
        origin_y: usize,
        mut values: Vec<Option<f64>>,
        angle: f64,
    ) -> Self {
        debug_assert_eq!(values.len(), width * height);
        let stats = compute_stats(&mut values);
        Kernel {
            kind: self.kind,
            rotation: self.rotation,
            width,
            height,
            origin_x,
            origin_y,
            values,
            angle,
            stats,
        }
    }

    /// Replace the values only, refreshing statistics
    pub(crate) fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        self.reshaped(
            self.width,
            self.height,
            self.origin_x,
            self.origin_y,
            values,
            self.angle,
        )
    }

    /// Set one cell (row-major index), refreshing statistics
    pub(crate) fn with_cell(&self, index: usize, value: Option<f64>) -> Self {
        let mut values = self.values.clone();
        values[index] = value;
        self.with_values(values)
    }

    /// Multiply every active cell by `factor`
    pub(crate) fn multiplied(&self, factor: f64) -> Self {
        self.with_values(self.values.iter().map(|v| v.map(|v| v * factor)).collect())
    }

    /// True if both kernels have the same geometry, mask and values
    ///
    /// Values are compared with an `EPSILON` tolerance; kind and angle are
    /// ignored.
    pub fn same_as(&self, other: &Kernel) -> bool {
        if self.width != other.width
            || self.height != other.height
            || self.origin_x != other.origin_x
            || self.origin_y != other.origin_y
        {
            return false;
        }
        self.values
            .iter()
            .zip(&other.values)
            .all(|(a, b)| match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => (a - b).abs() < EPSILON,
                _ => false,
            })
    }
}

/// Non-empty ordered list of kernels
#[derive(Debug, Clone, PartialEq)]
pub struct KernelList {
    kernels: Vec<Kernel>,
}

impl KernelList {
    /// Create a list holding one kernel
    pub fn single(kernel: Kernel) -> Self {
        KernelList {
            kernels: vec![kernel],
        }
    }

    /// Create a list from kernels in order
    ///
    /// # Errors
    ///
    /// Returns `KernelError::InvalidSpec` if `kernels` is empty.
    pub fn from_vec(kernels: Vec<Kernel>) -> KernelResult<Self> {
        if kernels.is_empty() {
            return Err(KernelError::spec("empty kernel list"));
        }
        Ok(KernelList { kernels })
    }

    /// Number of kernels (always at least one)
    #[inline]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Always false; lists are never empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// First kernel of the list
    #[inline]
    pub fn first(&self) -> &Kernel {
        &self.kernels[0]
    }

    /// Last kernel of the list
    #[inline]
    pub fn last(&self) -> &Kernel {
        &self.kernels[self.kernels.len() - 1]
    }

    /// Kernel at `index`
    pub fn get(&self, index: usize) -> Option<&Kernel> {
        self.kernels.get(index)
    }

    /// Kernels in order
    #[inline]
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Iterate over the kernels
    pub fn iter(&self) -> std::slice::Iter<'_, Kernel> {
        self.kernels.iter()
    }

    /// Consume the list, returning the kernels
    pub fn into_vec(self) -> Vec<Kernel> {
        self.kernels
    }

    /// Apply `f` to every kernel, producing a new list
    pub fn map<F>(&self, f: F) -> KernelList
    where
        F: FnMut(&Kernel) -> Kernel,
    {
        KernelList {
            kernels: self.kernels.iter().map(f).collect(),
        }
    }

    /// Append every kernel of `other`
    pub(crate) fn extend(&mut self, other: KernelList) {
        self.kernels.extend(other.kernels);
    }

    pub(crate) fn push(&mut self, kernel: Kernel) {
        self.kernels.push(kernel);
    }
}

impl From<Kernel> for KernelList {
    fn from(kernel: Kernel) -> Self {
        KernelList::single(kernel)
    }
}

impl<'a> IntoIterator for &'a KernelList {
    type Item = &'a Kernel;
    type IntoIter = std::slice::Iter<'a, Kernel>;

    fn into_iter(self) -> Self::IntoIter {
        self.kernels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validation() {
        assert!(Kernel::new(KernelKind::UserDefined, 0, 1, 0, 0, vec![]).is_err());
        assert!(Kernel::new(KernelKind::UserDefined, 2, 1, 2, 0, vec![Some(1.0); 2]).is_err());
        assert!(Kernel::new(KernelKind::UserDefined, 2, 1, 0, 0, vec![Some(1.0); 3]).is_err());
        assert!(Kernel::new(KernelKind::UserDefined, 2, 1, 0, 0, vec![None; 2]).is_err());
    }

    #[test]
    fn test_stats_snap_and_ranges() {
        let k = Kernel::new(
            KernelKind::UserDefined,
            3,
            1,
            1,
            0,
            vec![Some(-2.0), Some(1e-15), Some(3.0)],
        )
        .unwrap();
        assert_eq!(k.values()[1], Some(0.0));
        assert_eq!(k.stats().minimum, -2.0);
        assert_eq!(k.stats().maximum, 3.0);
        assert_eq!(k.stats().positive_range, 3.0);
        assert_eq!(k.stats().negative_range, -2.0);
        assert!((k.stats().sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stats_are_true_extremes() {
        let k = Kernel::new(KernelKind::UserDefined, 2, 1, 0, 0, vec![Some(2.0), Some(5.0)])
            .unwrap();
        assert_eq!(k.stats().minimum, 2.0);
        assert_eq!(k.stats().maximum, 5.0);
    }

    #[test]
    fn test_from_fn_relative_coords() {
        let k = Kernel::from_fn(KernelKind::UserDefined, 3, 3, 1, 1, |u, v| {
            Some((u * 10 + v) as f64)
        })
        .unwrap();
        assert_eq!(k.get(0, 0), Some(-11.0));
        assert_eq!(k.get(2, 1), Some(10.0));
        assert_eq!(k.get(3, 0), None);
    }

    #[test]
    fn test_same_as() {
        let a = Kernel::new(KernelKind::UserDefined, 2, 1, 0, 0, vec![Some(1.0), None]).unwrap();
        let b = a.clone().with_kind(KernelKind::Square);
        assert!(a.same_as(&b));
        let c = a.with_cell(1, Some(0.0));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn test_list_non_empty() {
        assert!(KernelList::from_vec(vec![]).is_err());
        let list = KernelList::single(Kernel::unity(KernelKind::Unity, 1.0));
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }
}
