//! Rectangular pixel windows
//!
//! A [`Window`] is an owned copy of a region of an image, including any
//! virtual pixels outside the image bounds. Executors read neighborhoods
//! from windows so every lookup is in-bounds.

/// Owned rectangular block of interleaved samples
#[derive(Debug, Clone)]
pub struct Window {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<f64>,
}

impl Window {
    pub(crate) fn from_parts(
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * channels);
        Window {
            x,
            y,
            width,
            height,
            channels,
            data,
        }
    }

    /// Image x coordinate of the window's left column
    #[inline]
    pub fn x(&self) -> i64 {
        self.x
    }

    /// Image y coordinate of the window's top row
    #[inline]
    pub fn y(&self) -> i64 {
        self.y
    }

    /// Window width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Window height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// All samples of the pixel at window position `(u, v)`
    ///
    /// # Panics
    ///
    /// Panics if `(u, v)` lies outside the window.
    #[inline]
    pub fn pixel(&self, u: usize, v: usize) -> &[f64] {
        let start = (v * self.width as usize + u) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// One sample of the pixel at window position `(u, v)`
    #[inline]
    pub fn sample(&self, u: usize, v: usize, channel: usize) -> f64 {
        self.data[(v * self.width as usize + u) * self.channels + channel]
    }

    /// Raw interleaved samples
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}
