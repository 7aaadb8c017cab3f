//! Method plan compiler
//!
//! Every method is compiled, before any pixel is touched, into a [`Plan`]:
//! either a single propagation pass, or an ordered list of [`Stage`]s
//! applied to each kernel together with the loop limits, the
//! post-processing step and the rule that combines per-kernel results.
//!
//! | Method | Stages | Post-process |
//! |---|---|---|
//! | Convolve | Convolve | |
//! | Correlate | Convolve* | |
//! | Erode, Dilate, *Intensity, IterativeDistance | the primitive | |
//! | Open | Erode, Dilate | |
//! | Close | Dilate*, Erode* | |
//! | OpenIntensity | ErodeIntensity, DilateIntensity | |
//! | CloseIntensity | DilateIntensity*, ErodeIntensity* | |
//! | Smooth | Erode, Dilate, Dilate*, Erode* | |
//! | EdgeIn / EdgeOut | Erode / Dilate | difference with input |
//! | TopHat / BottomHat | as Open / Close | difference with input |
//! | Edge | Dilate, Erode (restarted from input) | difference of stages |
//! | HitAndMiss, Thinning, Thicken | the primitive | |
//!
//! `*` marks stages that use the reflected kernel.

use morphkit_core::CompositeOp;

use crate::method::{Method, Primitive, Propagation};

/// One primitive application in a staged plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Primitive to apply
    pub primitive: Primitive,
    /// Use the reflected kernel
    pub reflected: bool,
    /// Save the current result and restart from the input image
    pub restart: bool,
}

impl Stage {
    const fn new(primitive: Primitive) -> Self {
        Stage {
            primitive,
            reflected: false,
            restart: false,
        }
    }

    const fn reflected(primitive: Primitive) -> Self {
        Stage {
            primitive,
            reflected: true,
            restart: false,
        }
    }
}

/// Step applied after the stages of one kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Keep the stage output
    None,
    /// Absolute difference with the input image
    DifferenceWithInput,
    /// Absolute difference with the result saved by a restarting stage
    DifferenceWithSaved,
}

/// A compiled staged method
#[derive(Debug, Clone, PartialEq)]
pub struct StagedPlan {
    /// Method the plan was compiled from
    pub method: Method,
    /// Stages applied, in order, for every kernel
    pub stages: Vec<Stage>,
    /// Step after the stages
    pub post: PostProcess,
    /// Upper bound on whole-method repetitions
    pub method_limit: usize,
    /// Upper bound on repetitions of one primitive with one kernel
    pub kernel_limit: usize,
    /// How per-kernel results combine; `None` re-iterates
    pub compose: CompositeOp,
}

impl StagedPlan {
    /// True if any stage needs the reflected kernel list
    pub fn needs_reflected(&self) -> bool {
        self.stages.iter().any(|s| s.reflected)
    }
}

/// A compiled method
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Stages iterated over a kernel list
    Staged(StagedPlan),
    /// One propagation pass with the first kernel
    Propagate {
        /// Method the plan was compiled from
        method: Method,
        /// Pass to run
        propagation: Propagation,
    },
}

/// Compile a method request into a plan
///
/// # Arguments
///
/// * `method` - Requested method
/// * `iterations` - Repetition count; negative means "until nothing
///   changes", bounded by the larger image dimension
/// * `compose` - Caller's multi-kernel rule (`Undefined` for the method's
///   default)
/// * `kernel_count` - Number of kernels in the list
/// * `dimensions` - Image width and height
///
/// Returns `None` when `iterations` is zero.
pub fn compile(
    method: Method,
    iterations: i64,
    compose: CompositeOp,
    kernel_count: usize,
    dimensions: (u32, u32),
) -> Option<Plan> {
    if iterations == 0 {
        return None;
    }
    let limit = if iterations < 0 {
        dimensions.0.max(dimensions.1).max(1) as usize
    } else {
        iterations as usize
    };

    let propagation = match method {
        Method::Distance => Some(Propagation::Distance),
        Method::Voronoi => Some(Propagation::Voronoi),
        _ => None,
    };
    if let Some(propagation) = propagation {
        return Some(Plan::Propagate {
            method,
            propagation,
        });
    }

    use Primitive as P;
    let (stages, post) = match method {
        Method::Convolve => (vec![Stage::new(P::Convolve)], PostProcess::None),
        Method::Correlate => (vec![Stage::reflected(P::Convolve)], PostProcess::None),
        Method::Erode => (vec![Stage::new(P::Erode)], PostProcess::None),
        Method::Dilate => (vec![Stage::new(P::Dilate)], PostProcess::None),
        Method::ErodeIntensity => (vec![Stage::new(P::ErodeIntensity)], PostProcess::None),
        Method::DilateIntensity => (vec![Stage::new(P::DilateIntensity)], PostProcess::None),
        Method::IterativeDistance => {
            (vec![Stage::new(P::IterativeDistance)], PostProcess::None)
        }
        Method::Open => (
            vec![Stage::new(P::Erode), Stage::new(P::Dilate)],
            PostProcess::None,
        ),
        Method::Close => (
            vec![Stage::reflected(P::Dilate), Stage::reflected(P::Erode)],
            PostProcess::None,
        ),
        Method::OpenIntensity => (
            vec![Stage::new(P::ErodeIntensity), Stage::new(P::DilateIntensity)],
            PostProcess::None,
        ),
        Method::CloseIntensity => (
            vec![
                Stage::reflected(P::DilateIntensity),
                Stage::reflected(P::ErodeIntensity),
            ],
            PostProcess::None,
        ),
        Method::Smooth => (
            vec![
                Stage::new(P::Erode),
                Stage::new(P::Dilate),
                Stage::reflected(P::Dilate),
                Stage::reflected(P::Erode),
            ],
            PostProcess::None,
        ),
        Method::EdgeIn => (vec![Stage::new(P::Erode)], PostProcess::DifferenceWithInput),
        Method::EdgeOut => (vec![Stage::new(P::Dilate)], PostProcess::DifferenceWithInput),
        Method::TopHat => (
            vec![Stage::new(P::Erode), Stage::new(P::Dilate)],
            PostProcess::DifferenceWithInput,
        ),
        Method::BottomHat => (
            vec![Stage::reflected(P::Dilate), Stage::reflected(P::Erode)],
            PostProcess::DifferenceWithInput,
        ),
        Method::Edge => (
            vec![
                Stage::new(P::Dilate),
                Stage {
                    restart: true,
                    ..Stage::new(P::Erode)
                },
            ],
            PostProcess::DifferenceWithSaved,
        ),
        Method::HitAndMiss => (vec![Stage::new(P::HitAndMiss)], PostProcess::None),
        Method::Thinning => (vec![Stage::new(P::Thinning)], PostProcess::None),
        Method::Thicken => (vec![Stage::new(P::Thicken)], PostProcess::None),
        Method::Distance | Method::Voronoi => return None,
    };

    // Pattern methods repeat as a whole; everything else iterates the
    // primitive with each kernel.
    let (mut method_limit, kernel_limit) = match method {
        Method::HitAndMiss | Method::Thinning | Method::Thicken => (limit, 1),
        _ => (1, limit),
    };

    let default_compose = if method == Method::HitAndMiss {
        CompositeOp::Lighten
    } else {
        CompositeOp::Undefined
    };
    let compose = match compose {
        CompositeOp::Undefined => default_compose,
        other => other,
    };
    let compose = match compose {
        CompositeOp::Undefined => CompositeOp::None,
        other => other,
    };

    // Composed kernels always restart from the input, so a second method
    // pass would reproduce the first.
    if kernel_count > 1 && compose != CompositeOp::None {
        method_limit = 1;
    }

    Some(Plan::Staged(StagedPlan {
        method,
        stages,
        post,
        method_limit,
        kernel_limit,
        compose,
    }))
}
