//! Virtual pixel (edge) policies
//!
//! Decides which sample is seen when a neighborhood reaches outside the
//! image.

/// Policy for coordinates outside the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VirtualPixel {
    /// Repeat the nearest edge pixel
    #[default]
    Edge,
    /// Reflect the image at its borders
    Mirror,
    /// Repeat the image periodically
    Tile,
    /// Use the image's background pixel
    Background,
}

impl VirtualPixel {
    /// Map a possibly out-of-range coordinate onto `0..extent`
    ///
    /// Returns `None` when the policy supplies the background pixel instead.
    #[inline]
    pub fn resolve(self, coord: i64, extent: u32) -> Option<u32> {
        let n = extent as i64;
        if (0..n).contains(&coord) {
            return Some(coord as u32);
        }
        match self {
            VirtualPixel::Edge => Some(coord.clamp(0, n - 1) as u32),
            VirtualPixel::Tile => Some(coord.rem_euclid(n) as u32),
            VirtualPixel::Mirror => {
                let period = 2 * n;
                let m = coord.rem_euclid(period);
                Some(if m < n { m } else { period - 1 - m } as u32)
            }
            VirtualPixel::Background => None,
        }
    }
}

impl std::str::FromStr for VirtualPixel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edge" => Ok(VirtualPixel::Edge),
            "mirror" => Ok(VirtualPixel::Mirror),
            "tile" => Ok(VirtualPixel::Tile),
            "background" => Ok(VirtualPixel::Background),
            other => Err(format!("unknown virtual pixel policy '{other}'")),
        }
    }
}
