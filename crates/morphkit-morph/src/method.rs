//! Morphology methods and primitives
//!
//! A [`Method`] is what a caller asks for (`Open`, `TopHat`, `Thinning`,
//! ...). The plan compiler reduces every method to one or more
//! [`Primitive`] applications, or to a single [`Propagation`] pass for the
//! distance methods.

use std::fmt;
use std::str::FromStr;

use crate::{MorphError, MorphResult};

/// A morphology method, as named by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Weighted sum with the kernel (mathematical convolution)
    Convolve,
    /// Weighted sum with the reflected kernel
    Correlate,
    /// Minimum over the kernel's "on" cells
    Erode,
    /// Maximum over the kernel's reflected "on" cells
    Dilate,
    /// Whole pixel of lowest intensity
    ErodeIntensity,
    /// Whole pixel of highest intensity
    DilateIntensity,
    /// Minimum of neighbor plus kernel weight, iterated
    IterativeDistance,
    /// Erode then dilate
    Open,
    /// Dilate then erode, both with the reflected kernel
    Close,
    /// Intensity open
    OpenIntensity,
    /// Intensity close
    CloseIntensity,
    /// Open then close
    Smooth,
    /// Difference between the image and its erosion
    EdgeIn,
    /// Difference between the dilation and the image
    EdgeOut,
    /// Difference between dilation and erosion
    Edge,
    /// Difference between the image and its opening
    TopHat,
    /// Difference between the closing and the image
    BottomHat,
    /// Hit-and-miss pattern match
    HitAndMiss,
    /// Remove hit-and-miss matches from the image
    Thinning,
    /// Add hit-and-miss matches to the image
    Thicken,
    /// Two-pass distance transform
    Distance,
    /// Two-pass distance transform that keeps the input alpha
    Voronoi,
}

impl Method {
    /// All methods, in table order
    pub const ALL: [Method; 22] = [
        Method::Convolve,
        Method::Correlate,
        Method::Erode,
        Method::Dilate,
        Method::ErodeIntensity,
        Method::DilateIntensity,
        Method::IterativeDistance,
        Method::Open,
        Method::Close,
        Method::OpenIntensity,
        Method::CloseIntensity,
        Method::Smooth,
        Method::EdgeIn,
        Method::EdgeOut,
        Method::Edge,
        Method::TopHat,
        Method::BottomHat,
        Method::HitAndMiss,
        Method::Thinning,
        Method::Thicken,
        Method::Distance,
        Method::Voronoi,
    ];

    /// Canonical method name
    pub fn name(self) -> &'static str {
        match self {
            Method::Convolve => "Convolve",
            Method::Correlate => "Correlate",
            Method::Erode => "Erode",
            Method::Dilate => "Dilate",
            Method::ErodeIntensity => "ErodeIntensity",
            Method::DilateIntensity => "DilateIntensity",
            Method::IterativeDistance => "IterativeDistance",
            Method::Open => "Open",
            Method::Close => "Close",
            Method::OpenIntensity => "OpenIntensity",
            Method::CloseIntensity => "CloseIntensity",
            Method::Smooth => "Smooth",
            Method::EdgeIn => "EdgeIn",
            Method::EdgeOut => "EdgeOut",
            Method::Edge => "Edge",
            Method::TopHat => "TopHat",
            Method::BottomHat => "BottomHat",
            Method::HitAndMiss => "HitAndMiss",
            Method::Thinning => "Thinning",
            Method::Thicken => "Thicken",
            Method::Distance => "Distance",
            Method::Voronoi => "Voronoi",
        }
    }

    /// True for the methods whose kernel scaling and bias settings apply
    pub fn is_convolution(self) -> bool {
        matches!(self, Method::Convolve | Method::Correlate)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = MorphError;

    /// Parse a method name, ignoring case
    ///
    /// The short forms `ErodeI`, `DilateI`, `OpenI` and `CloseI` name the
    /// intensity methods; `Hmt` and `HitNMiss` name hit-and-miss.
    fn from_str(s: &str) -> MorphResult<Self> {
        let key = s.trim().to_ascii_lowercase();
        let alias = match key.as_str() {
            "erodei" => Some(Method::ErodeIntensity),
            "dilatei" => Some(Method::DilateIntensity),
            "openi" => Some(Method::OpenIntensity),
            "closei" => Some(Method::CloseIntensity),
            "hmt" | "hitnmiss" => Some(Method::HitAndMiss),
            _ => None,
        };
        alias
            .or_else(|| {
                Method::ALL
                    .into_iter()
                    .find(|m| m.name().eq_ignore_ascii_case(&key))
            })
            .ok_or_else(|| MorphError::InvalidMethod(s.trim().to_string()))
    }
}

/// A single neighborhood operation applied by the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Weighted sum plus bias
    Convolve,
    /// Minimum over cells weighted at least 0.5
    Erode,
    /// Maximum over cells weighted above 0.5
    Dilate,
    /// Whole pixel of lowest intensity
    ErodeIntensity,
    /// Whole pixel of highest intensity
    DilateIntensity,
    /// Minimum of neighbor plus weight
    IterativeDistance,
    /// Foreground minimum less background maximum
    HitAndMiss,
    /// Center less the hit-and-miss response
    Thinning,
    /// Center plus the hit-and-miss response
    Thicken,
}

impl Primitive {
    /// Primitive name as used in the method log
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Convolve => "Convolve",
            Primitive::Erode => "Erode",
            Primitive::Dilate => "Dilate",
            Primitive::ErodeIntensity => "ErodeIntensity",
            Primitive::DilateIntensity => "DilateIntensity",
            Primitive::IterativeDistance => "IterativeDistance",
            Primitive::HitAndMiss => "HitAndMiss",
            Primitive::Thinning => "Thinning",
            Primitive::Thicken => "Thicken",
        }
    }

    /// True if the kernel is read through its reflection about the origin
    pub fn reads_reflected(self) -> bool {
        matches!(
            self,
            Primitive::Convolve
                | Primitive::Dilate
                | Primitive::DilateIntensity
                | Primitive::IterativeDistance
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A two-sweep propagation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Distance transform including the home cell
    Distance,
    /// Distance transform over the neighbors only
    Voronoi,
}
