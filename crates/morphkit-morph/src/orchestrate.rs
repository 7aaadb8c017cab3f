//! Method orchestration
//!
//! [`MorphologyOrchestrator`] runs a compiled [`Plan`] over an image. A
//! staged plan is driven by four nested loops, outermost first:
//!
//! 1. the whole method, repeated while anything changes (pattern methods)
//! 2. each kernel of the list
//! 3. each stage of the method
//! 4. the stage primitive, repeated with one kernel while anything changes
//!
//! Per-kernel results are chained (compose rule `None`) or merged into the
//! first kernel's result with a composite operator, in which case every
//! kernel starts again from the input image.
//!
//! Working images are held as `Cow<Image>` so the input is never copied
//! until a primitive produces a new buffer.

use std::borrow::Cow;

use morphkit_core::{CompositeOp, Image, ProgressMonitor, composite};
use morphkit_kernel::{KernelList, parse_kernel_list};
use tracing::{debug, instrument};

use crate::executor::apply_primitive_with_progress;
use crate::method::{Method, Propagation};
use crate::plan::{Plan, PostProcess, StagedPlan, compile};
use crate::propagate::propagate;
use crate::MorphResult;

/// Result of a completed method
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Final image
    pub image: Image,
    /// Samples changed, summed over every primitive application
    pub changed: usize,
    /// Number of primitive applications
    pub steps: usize,
}

/// Drives a morphology method over an image
///
/// # Examples
///
/// ```
/// use morphkit_core::{ChannelLayout, Image};
/// use morphkit_kernel::parse_kernel_list;
/// use morphkit_morph::{Method, MorphologyOrchestrator};
///
/// let image = Image::from_data(5, 1, ChannelLayout::Gray, vec![0.0, 0.0, 9.0, 0.0, 0.0]).unwrap();
/// let kernels = parse_kernel_list("3x1: 1,1,1").unwrap();
/// let out = MorphologyOrchestrator::new(Method::Dilate, 2, &kernels)
///     .apply(&image)
///     .unwrap()
///     .unwrap();
/// assert_eq!(out.data(), &[9.0; 5]);
/// ```
pub struct MorphologyOrchestrator<'a> {
    method: Method,
    iterations: i64,
    kernels: Cow<'a, KernelList>,
    compose: CompositeOp,
    bias: f64,
    monitor: Option<&'a dyn ProgressMonitor>,
}

impl<'a> MorphologyOrchestrator<'a> {
    /// Create an orchestrator
    ///
    /// # Arguments
    ///
    /// * `method` - Method to run
    /// * `iterations` - Repetitions; `-1` runs until nothing changes
    ///   (bounded by the larger image dimension), `0` does nothing
    /// * `kernels` - Kernel list, used as given
    pub fn new(method: Method, iterations: i64, kernels: &'a KernelList) -> Self {
        Self::from_cow(method, iterations, Cow::Borrowed(kernels))
    }

    pub(crate) fn from_cow(method: Method, iterations: i64, kernels: Cow<'a, KernelList>) -> Self {
        MorphologyOrchestrator {
            method,
            iterations,
            kernels,
            compose: CompositeOp::Undefined,
            bias: 0.0,
            monitor: None,
        }
    }

    /// Set how per-kernel results combine
    ///
    /// `Undefined` keeps the method's default (`Lighten` for hit-and-miss,
    /// chaining otherwise); `None` chains each kernel onto the previous
    /// result.
    pub fn with_compose(mut self, compose: CompositeOp) -> Self {
        self.compose = compose;
        self
    }

    /// Set the value added to every convolution sum
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Report progress to `monitor`, which may cancel the method
    pub fn with_progress(mut self, monitor: &'a dyn ProgressMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Kernel list the method will use
    pub fn kernels(&self) -> &KernelList {
        &self.kernels
    }

    /// Run the method and return the image only
    ///
    /// # Errors
    ///
    /// See [`MorphologyOrchestrator::run`].
    pub fn apply(&self, image: &Image) -> MorphResult<Option<Image>> {
        Ok(self.run(image)?.map(|outcome| outcome.image))
    }

    /// Run the method
    ///
    /// Returns `None` when the iteration count is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a buffer cannot be allocated or the progress
    /// monitor cancels. No partial result is returned.
    #[instrument(level = "debug", skip_all, fields(method = %self.method, iterations = self.iterations))]
    pub fn run(&self, image: &Image) -> MorphResult<Option<Outcome>> {
        let plan = compile(
            self.method,
            self.iterations,
            self.compose,
            self.kernels.len(),
            image.dimensions(),
        );
        match plan {
            None => Ok(None),
            Some(Plan::Propagate {
                method,
                propagation,
            }) => self.run_propagation(image, method, propagation).map(Some),
            Some(Plan::Staged(plan)) => self.run_staged(image, &plan).map(Some),
        }
    }

    fn run_propagation(
        &self,
        image: &Image,
        method: Method,
        propagation: Propagation,
    ) -> MorphResult<Outcome> {
        let mut out = image.try_clone()?;
        let changed = propagate(&mut out, propagation, self.kernels.first(), self.monitor)?;
        debug!("{method}:1.0 #1 => Changed {changed}");
        if propagation == Propagation::Voronoi {
            out.deactivate_alpha();
            out.copy_alpha_from(image)?;
        }
        Ok(Outcome {
            image: out,
            changed,
            steps: 1,
        })
    }

    fn run_staged(&self, image: &Image, plan: &StagedPlan) -> MorphResult<Outcome> {
        let reflected = if plan.needs_reflected() {
            Some(self.kernels.reflect())
        } else {
            None
        };
        let single = self.kernels.len() == 1;
        let method = plan.method;

        let mut curr: Cow<'_, Image> = Cow::Borrowed(image);
        let mut result: Option<Image> = None;
        let mut total = 0;
        let mut count = 0;

        let mut method_loop = 0;
        let mut method_changed = 1;
        while method_loop < plan.method_limit && method_changed > 0 {
            method_loop += 1;
            method_changed = 0;

            for (kernel_number, kernel) in self.kernels.iter().enumerate() {
                let mut saved: Option<Image> = None;

                for (stage_index, stage) in plan.stages.iter().enumerate() {
                    let stage_loop = stage_index + 1;
                    if stage.restart {
                        let previous = std::mem::replace(&mut curr, Cow::Borrowed(image));
                        saved = Some(into_owned(previous)?);
                    }
                    let this_kernel = match (&reflected, stage.reflected) {
                        (Some(list), true) => list.get(kernel_number).unwrap_or(kernel),
                        _ => kernel,
                    };

                    let prefix = if plan.stages.len() > 1 {
                        format!("{method}:{method_loop}.{stage_loop} -> ")
                    } else if stage.primitive.name() != method.name() {
                        format!("{method}:{method_loop} -> ")
                    } else {
                        String::new()
                    };
                    let marker = if stage.reflected { "*" } else { "" };

                    let mut kernel_loop = 0;
                    let mut changed = 1;
                    while kernel_loop < plan.kernel_limit && changed > 0 {
                        kernel_loop += 1;
                        let (next, n) = apply_primitive_with_progress(
                            &curr,
                            stage.primitive,
                            this_kernel,
                            self.bias,
                            self.monitor,
                        )?;
                        changed = n;
                        count += 1;
                        method_changed += n;
                        total += n;
                        curr = Cow::Owned(next);
                        debug!(
                            "{prefix}{}{marker}:{}.{kernel_number} #{count} => Changed {changed}",
                            stage.primitive,
                            method_loop + kernel_loop - 1,
                        );
                    }
                }

                match plan.post {
                    PostProcess::None => {}
                    PostProcess::DifferenceWithInput => {
                        debug!("{method}: Difference with original image");
                        let mut out = into_owned(curr)?;
                        composite(&mut out, image, CompositeOp::Difference)?;
                        curr = Cow::Owned(out);
                    }
                    PostProcess::DifferenceWithSaved => {
                        debug!("{method}: Difference of Dilate and Erode");
                        let mut out = into_owned(curr)?;
                        if let Some(saved) = saved.take() {
                            composite(&mut out, &saved, CompositeOp::Difference)?;
                        }
                        curr = Cow::Owned(out);
                    }
                }

                if single || plan.compose == CompositeOp::None {
                    if !single {
                        if kernel_number + 1 == self.kernels.len() {
                            debug!("{method}: (done)");
                        } else {
                            debug!("{method}: (re-iterate)");
                        }
                    }
                    continue;
                }
                let finished = std::mem::replace(&mut curr, Cow::Borrowed(image));
                match result.as_mut() {
                    None => {
                        debug!("{method}: (save for compose)");
                        result = Some(into_owned(finished)?);
                    }
                    Some(acc) => {
                        debug!("{method}: (compose \"{:?}\")", plan.compose);
                        composite(acc, &finished, plan.compose)?;
                    }
                }
            }
        }

        let image = match result {
            Some(image) => image,
            None => into_owned(curr)?,
        };
        Ok(Outcome {
            image,
            changed: total,
            steps: count,
        })
    }
}

/// Take ownership of a working image, copying the input if needed
fn into_owned(image: Cow<'_, Image>) -> MorphResult<Image> {
    match image {
        Cow::Owned(image) => Ok(image),
        Cow::Borrowed(image) => Ok(image.try_clone()?),
    }
}

/// Apply a method with default compose and no bias
///
/// # Errors
///
/// See [`MorphologyOrchestrator::run`].
pub fn morphology(
    image: &Image,
    method: Method,
    iterations: i64,
    kernels: &KernelList,
) -> MorphResult<Option<Image>> {
    MorphologyOrchestrator::new(method, iterations, kernels).apply(image)
}

/// Apply a method with an explicit compose rule and bias
///
/// # Errors
///
/// See [`MorphologyOrchestrator::run`].
pub fn morphology_apply(
    image: &Image,
    method: Method,
    iterations: i64,
    kernels: &KernelList,
    compose: CompositeOp,
    bias: f64,
) -> MorphResult<Option<Image>> {
    MorphologyOrchestrator::new(method, iterations, kernels)
        .with_compose(compose)
        .with_bias(bias)
        .apply(image)
}

/// Apply a method named by string with a kernel description
///
/// # Errors
///
/// Returns `MorphError::InvalidMethod` for an unknown method name and a
/// kernel error for an invalid description.
///
/// # Examples
///
/// ```
/// use morphkit_core::{ChannelLayout, Image};
/// use morphkit_morph::morphology_str;
///
/// let image = Image::from_data(3, 1, ChannelLayout::Gray, vec![5.0, 1.0, 5.0]).unwrap();
/// let out = morphology_str(&image, "Erode", 1, "3x1: 1,1,1").unwrap().unwrap();
/// assert_eq!(out.data(), &[1.0, 1.0, 1.0]);
/// ```
pub fn morphology_str(
    image: &Image,
    method: &str,
    iterations: i64,
    kernel: &str,
) -> MorphResult<Option<Image>> {
    let method: Method = method.parse()?;
    let kernels = parse_kernel_list(kernel)?;
    morphology(image, method, iterations, &kernels)
}
