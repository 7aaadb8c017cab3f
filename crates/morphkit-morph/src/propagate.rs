//! Two-sweep propagation
//!
//! Distance and Voronoi transforms update a single buffer in place. The
//! forward sweep visits pixels top-to-bottom, left-to-right and reads only
//! kernel cells that land on pixels already visited in that sweep; the
//! backward sweep runs in reverse over the complementary cells. Each pixel
//! is written before the next one is computed, so values flow across the
//! whole image within a sweep.
//!
//! The kernel is read through its reflection, as with dilation: a cell at
//! `(kx, ky)` samples the pixel at `(x + ox - kx, y + oy - ky)`.

use morphkit_core::{
    EPSILON, Image, MORPHOLOGY_TAG, Progress, ProgressMonitor, QUANTUM_RANGE, clamp_to_quantum,
};
use morphkit_kernel::Kernel;

use crate::method::Propagation;
use crate::{MorphError, MorphResult};

/// A kernel cell as an offset from the pixel being computed
#[derive(Debug, Clone, Copy)]
struct Step {
    dx: i64,
    dy: i64,
    weight: f64,
}

/// Split the kernel into the cells each sweep may read
fn steps(kernel: &Kernel, propagation: Propagation) -> (Vec<Step>, Vec<Step>) {
    let (ox, oy) = (kernel.origin_x() as i64, kernel.origin_y() as i64);
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    for ky in 0..kernel.height() {
        for kx in 0..kernel.width() {
            let Some(weight) = kernel.get(kx, ky) else {
                continue;
            };
            let step = Step {
                dx: ox - kx as i64,
                dy: oy - ky as i64,
                weight,
            };
            let home = step.dx == 0 && step.dy == 0;
            if home && propagation == Propagation::Voronoi {
                continue;
            }
            if step.dy < 0 || (step.dy == 0 && step.dx <= 0) {
                forward.push(step);
            }
            if step.dy > 0 || (step.dy == 0 && step.dx >= 0) {
                backward.push(step);
            }
        }
    }
    (forward, backward)
}

/// Run both sweeps over `image`
///
/// Only channels whose trait is updated take part; other channels keep
/// their samples. Distance starts each sample from `QUANTUM_RANGE` and
/// counts the home cell; Voronoi starts from the current sample and reads
/// neighbors only.
///
/// Returns the number of samples changed across both sweeps.
///
/// # Errors
///
/// Returns `MorphError::Cancelled` if the monitor asks to stop. The image
/// is left partially updated in that case.
pub fn propagate(
    image: &mut Image,
    propagation: Propagation,
    kernel: &Kernel,
    monitor: Option<&dyn ProgressMonitor>,
) -> MorphResult<usize> {
    let (forward, backward) = steps(kernel, propagation);
    let (width, height) = image.dimensions();
    let updated: Vec<bool> = image.channels().iter().map(|c| c.traits.is_updated()).collect();
    let progress = Progress::new(monitor, MORPHOLOGY_TAG, 2 * height as u64);
    let mut sweep = Sweep {
        propagation,
        updated: &updated,
        scratch: vec![0.0; image.channel_count()],
        changed: 0,
    };

    for y in 0..height {
        for x in 0..width {
            sweep.update(image, x, y, &forward);
        }
        if !progress.tick() {
            return Err(MorphError::Cancelled(progress.tag()));
        }
    }
    for y in (0..height).rev() {
        for x in (0..width).rev() {
            sweep.update(image, x, y, &backward);
        }
        if !progress.tick() {
            return Err(MorphError::Cancelled(progress.tag()));
        }
    }
    Ok(sweep.changed)
}

struct Sweep<'a> {
    propagation: Propagation,
    updated: &'a [bool],
    scratch: Vec<f64>,
    changed: usize,
}

impl Sweep<'_> {
    fn update(&mut self, image: &mut Image, x: u32, y: u32, steps: &[Step]) {
        let n = self.scratch.len();
        let center = image.pixel_unchecked(x, y);
        for c in 0..n {
            let old = center[c];
            if !self.updated[c] {
                self.scratch[c] = old;
                continue;
            }
            let start = match self.propagation {
                Propagation::Distance => QUANTUM_RANGE,
                Propagation::Voronoi => old,
            };
            let value = steps.iter().fold(start, |acc, s| {
                let p = image.virtual_pixel_at(x as i64 + s.dx, y as i64 + s.dy);
                acc.min(p[c] + s.weight)
            });
            let value = clamp_to_quantum(value);
            if (value - old).abs() > EPSILON {
                self.changed += 1;
            }
            self.scratch[c] = value;
        }
        let start = x as usize * n;
        image.row_mut(y)[start..start + n].copy_from_slice(&self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphkit_core::ChannelLayout;
    use morphkit_kernel::KernelList;

    fn kernel(spec: &str) -> Kernel {
        spec.parse::<KernelList>().unwrap().first().clone()
    }

    #[test]
    fn test_sweeps_split_kernel() {
        let k = kernel("3: 1,1,1 1,0,1 1,1,1");
        let (forward, backward) = steps(&k, Propagation::Distance);
        assert_eq!(forward.len(), 5);
        assert_eq!(backward.len(), 5);
        assert!(forward.iter().all(|s| s.dy < 0 || (s.dy == 0 && s.dx <= 0)));

        let (forward, backward) = steps(&k, Propagation::Voronoi);
        assert_eq!((forward.len(), backward.len()), (4, 4));
    }

    #[test]
    fn test_distance_needs_both_sweeps() {
        // A row with a single zero: both sweeps are needed
        let mut image = Image::new_with_value(5, 1, ChannelLayout::Gray, QUANTUM_RANGE).unwrap();
        image.set_value(2, 0, 0, 0.0).unwrap();
        let changed = propagate(&mut image, Propagation::Distance, &kernel("3x1: 100,0,100"), None).unwrap();
        assert_eq!(image.data(), &[200.0, 100.0, 0.0, 100.0, 200.0]);
        assert_eq!(changed, 4);
    }

    #[test]
    fn test_voronoi_reads_neighbors_only() {
        let data = vec![10.0, QUANTUM_RANGE, QUANTUM_RANGE, 12.0];
        let mut image = Image::from_data(4, 1, ChannelLayout::Gray, data).unwrap();
        propagate(&mut image, Propagation::Voronoi, &kernel("3x1: 5,0,5"), None).unwrap();
        assert_eq!(image.data(), &[10.0, 15.0, 17.0, 12.0]);
    }

    #[test]
    fn test_cancel_between_sweeps() {
        let mut image = Image::new(3, 2, ChannelLayout::Gray).unwrap();
        let stop = |_: &str, done: u64, _: u64| done <= 2;
        let monitor: &dyn ProgressMonitor = &stop;
        let err = propagate(&mut image, Propagation::Distance, &kernel("Unity"), Some(monitor)).unwrap_err();
        assert!(matches!(err, MorphError::Cancelled(_)));
    }
}
