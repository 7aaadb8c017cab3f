//! User-settable morphology options
//!
//! [`MorphologySettings`] collects the options a front end would read from
//! its defines (`convolve:bias`, `convolve:scale`, `morphology:compose`,
//! `morphology:showKernel`) and turns a method request into a configured
//! [`MorphologyOrchestrator`]. Bias and scale only affect the convolution
//! methods.

use std::borrow::Cow;

use morphkit_core::{CompositeOp, Image, QUANTUM_RANGE, parse_interval};
use morphkit_kernel::{KernelList, parse_geometry};
use tracing::{info, warn};

use crate::method::Method;
use crate::orchestrate::MorphologyOrchestrator;
use crate::{MorphError, MorphResult};

/// Define key for the convolution bias
pub const BIAS_KEY: &str = "convolve:bias";
/// Define key for the kernel scale geometry
pub const SCALE_KEY: &str = "convolve:scale";
/// Define key for the multi-kernel compose rule
pub const COMPOSE_KEY: &str = "morphology:compose";
/// Define key for logging the final kernel
pub const SHOW_KERNEL_KEY: &str = "morphology:showKernel";

/// Options applied when preparing a morphology request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphologySettings {
    /// Value added to every convolution sum
    pub bias: Option<f64>,
    /// Scale geometry applied to convolution kernels
    pub scale: Option<String>,
    /// Rule combining per-kernel results
    pub compose: Option<CompositeOp>,
    /// Log the kernel list after scaling
    pub show_kernel: bool,
}

impl MorphologySettings {
    /// Settings with every option unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convolution bias
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = Some(bias);
        self
    }

    /// Set the kernel scale geometry, e.g. `"50%!"` or `"-1,100%"`
    pub fn with_scale(mut self, geometry: impl Into<String>) -> Self {
        self.scale = Some(geometry.into());
        self
    }

    /// Set the compose rule
    pub fn with_compose(mut self, compose: CompositeOp) -> Self {
        self.compose = Some(compose);
        self
    }

    /// Log the kernel list before running
    pub fn with_show_kernel(mut self, show: bool) -> Self {
        self.show_kernel = show;
        self
    }

    /// Read settings from `(key, value)` define pairs
    ///
    /// Keys match case-insensitively. Values that cannot be used are
    /// logged and skipped; unknown keys are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use morphkit_core::CompositeOp;
    /// use morphkit_morph::MorphologySettings;
    ///
    /// let settings = MorphologySettings::from_defines([
    ///     ("convolve:bias", "50%"),
    ///     ("morphology:compose", "Darken"),
    ///     ("morphology:showKernel", "1"),
    /// ]);
    /// assert_eq!(settings.bias, Some(32768.0));
    /// assert_eq!(settings.compose, Some(CompositeOp::Darken));
    /// assert!(settings.show_kernel);
    /// ```
    pub fn from_defines<I, K, V>(defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in defines {
            if let Err(e) = settings.define(key.as_ref(), value.as_ref()) {
                warn!("{e}; ignored");
            }
        }
        settings
    }

    /// Apply one define
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidSetting` if the value cannot be parsed.
    /// Unknown keys are accepted and ignored.
    pub fn define(&mut self, key: &str, value: &str) -> MorphResult<()> {
        let invalid = || MorphError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        if key.eq_ignore_ascii_case(BIAS_KEY) {
            self.bias = Some(parse_interval(value, QUANTUM_RANGE + 1.0).ok_or_else(invalid)?);
        } else if key.eq_ignore_ascii_case(SCALE_KEY) {
            parse_geometry(value).map_err(|_| invalid())?;
            self.scale = Some(value.trim().to_string());
        } else if key.eq_ignore_ascii_case(COMPOSE_KEY) {
            self.compose = Some(value.parse().map_err(|_| invalid())?);
        } else if key.eq_ignore_ascii_case(SHOW_KERNEL_KEY) {
            self.show_kernel = is_true(value);
        }
        Ok(())
    }

    /// Build an orchestrator for a request
    ///
    /// The caller's kernel list is not modified; a scaled copy is made
    /// when a scale geometry applies. A scale geometry that fails to apply
    /// is logged and skipped.
    pub fn prepare<'a>(
        &self,
        method: Method,
        iterations: i64,
        kernels: &'a KernelList,
    ) -> MorphologyOrchestrator<'a> {
        let mut list = Cow::Borrowed(kernels);
        let mut bias = 0.0;
        if method.is_convolution() {
            bias = self.bias.unwrap_or(0.0);
            if let Some(geometry) = &self.scale {
                match kernels.scale_geometry(geometry) {
                    Ok(scaled) => list = Cow::Owned(scaled),
                    Err(e) => warn!(geometry = %geometry, "kernel scale not applied: {e}"),
                }
            }
        }
        if self.show_kernel {
            info!("{method} kernel:\n{list}");
        }

        let mut orchestrator = MorphologyOrchestrator::from_cow(method, iterations, list).with_bias(bias);
        if let Some(compose) = self.compose {
            orchestrator = orchestrator.with_compose(compose);
        }
        orchestrator
    }

    /// Prepare and run a request
    ///
    /// # Errors
    ///
    /// See [`MorphologyOrchestrator::run`].
    pub fn request(
        &self,
        image: &Image,
        method: Method,
        iterations: i64,
        kernels: &KernelList,
    ) -> MorphResult<Option<Image>> {
        self.prepare(method, iterations, kernels).apply(image)
    }
}

fn is_true(value: &str) -> bool {
    ["true", "on", "yes", "1"]
        .iter()
        .any(|t| value.trim().eq_ignore_ascii_case(t))
}
