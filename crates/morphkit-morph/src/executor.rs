//! Neighborhood executor
//!
//! Applies one [`Primitive`] with one kernel to every pixel of an image,
//! producing a new image and the number of samples that changed. Rows are
//! independent: each output row is computed from a window of input rows
//! and written to its own slice of the output buffer, so rows are
//! processed in parallel when the `parallel` feature is enabled.
//!
//! Neighborhoods are read through [`Image::window`], which resolves
//! coordinates outside the image with the image's virtual pixel policy.
//! Convolve and the dilate-family primitives read the kernel reflected
//! about its origin; erode and the hit-and-miss family read it as stored.

use morphkit_core::{
    ChannelTrait, EPSILON, Image, MORPHOLOGY_TAG, Progress, ProgressMonitor, QUANTUM_RANGE,
    QUANTUM_SCALE, clamp_to_quantum, perceptible_reciprocal,
};
use morphkit_kernel::Kernel;

use crate::maybe_rayon::*;
use crate::method::Primitive;
use crate::{MorphError, MorphResult};

/// Threshold at or above which erode treats a weight as "on"
const ERODE_ON: f64 = 0.5;
/// Hit-and-miss foreground weights lie above this
const FOREGROUND: f64 = 0.7;
/// Hit-and-miss background weights lie below this
const BACKGROUND: f64 = 0.3;

/// One active kernel cell, located in the row window
#[derive(Debug, Clone, Copy)]
struct Tap {
    /// Column offset from the pixel's window column
    u: usize,
    /// Window row
    v: usize,
    weight: f64,
}

/// Kernel cells laid out for a row window
struct Footprint {
    /// Window columns left of the pixel
    offset_x: usize,
    /// Window rows above the pixel
    offset_y: usize,
    width: usize,
    height: usize,
    taps: Vec<Tap>,
}

impl Footprint {
    fn new(kernel: &Kernel, reflected: bool) -> Self {
        let (w, h) = (kernel.width(), kernel.height());
        let (offset_x, offset_y) = if reflected {
            (w - kernel.origin_x() - 1, h - kernel.origin_y() - 1)
        } else {
            (kernel.origin_x(), kernel.origin_y())
        };
        let mut taps = Vec::with_capacity(kernel.active_count());
        for ky in 0..h {
            for kx in 0..w {
                let Some(weight) = kernel.get(kx, ky) else {
                    continue;
                };
                let (u, v) = if reflected {
                    (w - 1 - kx, h - 1 - ky)
                } else {
                    (kx, ky)
                };
                taps.push(Tap { u, v, weight });
            }
        }
        Footprint {
            offset_x,
            offset_y,
            width: w,
            height: h,
            taps,
        }
    }

    fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

/// Per-image facts shared by every row
struct Context<'a> {
    image: &'a Image,
    primitive: Primitive,
    footprint: Footprint,
    bias: f64,
    /// Channels the primitive computes
    updated: Vec<bool>,
    /// Channels weighted by neighbor alpha during convolution
    blended: Vec<bool>,
    alpha: Option<usize>,
}

/// Apply a primitive to every pixel
///
/// # Arguments
///
/// * `image` - Input image (not modified)
/// * `primitive` - Neighborhood operation
/// * `kernel` - Kernel, as stored (reflection is applied internally where
///   the primitive needs it)
/// * `bias` - Added to every convolution sum
///
/// Returns the new image and the number of samples whose value changed by
/// more than `EPSILON`.
///
/// # Errors
///
/// Returns an error if a window or the output image cannot be allocated.
///
/// # Examples
///
/// ```
/// use morphkit_core::{ChannelLayout, Image};
/// use morphkit_kernel::KernelList;
/// use morphkit_morph::{Primitive, apply_primitive};
///
/// let image = Image::from_data(3, 1, ChannelLayout::Gray, vec![0.0, 100.0, 0.0]).unwrap();
/// let kernel: KernelList = "3x1: 1,1,1".parse().unwrap();
/// let (dilated, changed) = apply_primitive(&image, Primitive::Dilate, kernel.first(), 0.0).unwrap();
/// assert_eq!(dilated.data(), &[100.0, 100.0, 100.0]);
/// assert_eq!(changed, 2);
/// ```
pub fn apply_primitive(
    image: &Image,
    primitive: Primitive,
    kernel: &Kernel,
    bias: f64,
) -> MorphResult<(Image, usize)> {
    apply_primitive_with_progress(image, primitive, kernel, bias, None)
}

/// [`apply_primitive`] reporting one progress unit per row
///
/// # Errors
///
/// Besides the errors of [`apply_primitive`], returns
/// `MorphError::Cancelled` if the monitor asks to stop.
pub fn apply_primitive_with_progress(
    image: &Image,
    primitive: Primitive,
    kernel: &Kernel,
    bias: f64,
    monitor: Option<&dyn ProgressMonitor>,
) -> MorphResult<(Image, usize)> {
    let blend_alpha = image.has_blended_alpha();
    let ctx = Context {
        image,
        primitive,
        footprint: Footprint::new(kernel, primitive.reads_reflected()),
        bias,
        updated: image.channels().iter().map(|c| c.traits.is_updated()).collect(),
        blended: image
            .channels()
            .iter()
            .map(|c| blend_alpha && c.traits == ChannelTrait::Blend)
            .collect(),
        alpha: image.alpha_channel(),
    };

    let progress = Progress::new(monitor, MORPHOLOGY_TAG, image.height() as u64);
    let mut output = image.try_clone()?;
    let row_len = output.row_len();

    let changes = output
        .data_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .map(|(y, row)| {
            let changed = process_row(&ctx, y as u32, row)?;
            if !progress.tick() {
                return Err(MorphError::Cancelled(progress.tag()));
            }
            Ok(changed)
        })
        .collect::<MorphResult<Vec<usize>>>()?;

    Ok((output, changes.into_iter().sum()))
}

/// Compute one output row; `row` holds the input row on entry
fn process_row(ctx: &Context<'_>, y: u32, row: &mut [f64]) -> MorphResult<usize> {
    let image = ctx.image;
    let fp = &ctx.footprint;
    let window = image.window(
        -(fp.offset_x as i64),
        y as i64 - fp.offset_y as i64,
        image.width() + fp.width as u32 - 1,
        fp.height as u32,
    )?;
    let window = &window;
    let n = image.channel_count();
    let mut changed = 0;

    for (x, out) in row.chunks_exact_mut(n).enumerate() {
        let center = window.pixel(x + fp.offset_x, fp.offset_y);
        let neighbors = || {
            fp.taps
                .iter()
                .map(move |t| (t.weight, window.pixel(x + t.u, t.v)))
        };

        // Intensity primitives copy a whole neighbor pixel
        let selected = match ctx.primitive {
            Primitive::ErodeIntensity => Some(select_by_intensity(image, neighbors(), |a, b| a < b)),
            Primitive::DilateIntensity => Some(select_by_intensity(image, neighbors(), |a, b| a > b)),
            _ => None,
        };

        for c in 0..n {
            if !ctx.updated[c] {
                continue;
            }
            let old = center[c];
            let value = match selected {
                Some(pixel) => pixel.map_or(old, |p| p[c]),
                None => clamp_to_quantum(reduce(ctx, c, old, neighbors())),
            };
            if (value - old).abs() > EPSILON {
                changed += 1;
            }
            out[c] = value;
        }
    }
    Ok(changed)
}

/// Per-channel reduction of the non-intensity primitives
fn reduce<'w, I>(ctx: &Context<'_>, c: usize, center: f64, neighbors: I) -> f64
where
    I: Iterator<Item = (f64, &'w [f64])>,
{
    match ctx.primitive {
        Primitive::Convolve => convolve(ctx, c, neighbors),
        Primitive::Erode => neighbors
            .filter(|(w, _)| *w >= ERODE_ON)
            .fold(QUANTUM_RANGE, |acc, (_, p)| acc.min(p[c])),
        Primitive::Dilate => neighbors
            .filter(|(w, _)| *w > ERODE_ON)
            .fold(0.0, |acc, (_, p)| acc.max(p[c])),
        Primitive::IterativeDistance => {
            neighbors.fold(center, |acc, (w, p)| acc.min(p[c] + w))
        }
        Primitive::HitAndMiss | Primitive::Thinning | Primitive::Thicken => {
            let mut foreground = QUANTUM_RANGE;
            let mut background: f64 = 0.0;
            for (w, p) in neighbors {
                if w > FOREGROUND {
                    foreground = foreground.min(p[c]);
                } else if w < BACKGROUND {
                    background = background.max(p[c]);
                }
            }
            let hit = (foreground - background).max(0.0);
            match ctx.primitive {
                Primitive::Thinning => center - hit,
                Primitive::Thicken => center + hit,
                _ => hit,
            }
        }
        Primitive::ErodeIntensity | Primitive::DilateIntensity => center,
    }
}

fn convolve<'w, I>(ctx: &Context<'_>, c: usize, neighbors: I) -> f64
where
    I: Iterator<Item = (f64, &'w [f64])>,
{
    let mut sum = ctx.bias;
    let mut count = 0usize;
    let gamma = match (ctx.blended[c], ctx.alpha) {
        (true, Some(alpha)) => {
            let mut gamma = 0.0;
            for (w, p) in neighbors {
                let a = QUANTUM_SCALE * p[alpha];
                sum += a * w * p[c];
                gamma += a * w;
                count += 1;
            }
            gamma
        }
        _ => {
            for (w, p) in neighbors {
                sum += w * p[c];
                count += 1;
            }
            1.0
        }
    };
    let mut scale = perceptible_reciprocal(gamma);
    if count != 0 {
        scale *= ctx.footprint.cell_count() as f64 / count as f64;
    }
    scale * sum
}

/// Neighbor pixel with the extreme intensity among "on" cells
///
/// `better(a, b)` says whether intensity `a` replaces the current best `b`;
/// the first of equal candidates wins.
fn select_by_intensity<'w, I, F>(image: &Image, neighbors: I, better: F) -> Option<&'w [f64]>
where
    I: Iterator<Item = (f64, &'w [f64])>,
    F: Fn(f64, f64) -> bool,
{
    let mut best: Option<(f64, &'w [f64])> = None;
    for (w, p) in neighbors {
        if w < ERODE_ON {
            continue;
        }
        let intensity = image.intensity(p);
        if best.is_none_or(|(b, _)| better(intensity, b)) {
            best = Some((intensity, p));
        }
    }
    best.map(|(_, p)| p)
}
