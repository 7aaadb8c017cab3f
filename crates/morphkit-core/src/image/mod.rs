//! Image - The pixel buffer handed to the morphology engine
//!
//! `Image` is a 2D grid of pixels, each holding one real-valued sample per
//! channel. Samples are interleaved in row-major order, so the pixel at
//! `(x, y)` starts at `(y * width + x) * channels`.
//!
//! Neighborhood operators never index the buffer directly outside its
//! bounds: they request a [`Window`], which resolves out-of-range
//! coordinates through the image's [`VirtualPixel`] policy.
//!
//! # Examples
//!
//! ```
//! use morphkit_core::{ChannelLayout, Image};
//!
//! let mut image = Image::new(4, 3, ChannelLayout::Gray).unwrap();
//! image.set_value(1, 2, 0, 200.0).unwrap();
//! assert_eq!(image.get_value(1, 2, 0).unwrap(), 200.0);
//!
//! // Edge policy: coordinates left of the image repeat column 0
//! assert_eq!(image.virtual_pixel_at(-5, 2)[0], 0.0);
//! ```

mod channel;
mod virtual_pixel;
mod window;

pub use channel::{ChannelInfo, ChannelKind, ChannelLayout, ChannelTrait};
pub use virtual_pixel::VirtualPixel;
pub use window::Window;

use crate::error::{Error, Result};

/// Rec.709 luma weights used for pixel intensity
const LUMA_RED: f64 = 0.212656;
const LUMA_GREEN: f64 = 0.715158;
const LUMA_BLUE: f64 = 0.072186;

/// Allocate a sample buffer, reporting allocation failure as an error
pub(crate) fn alloc_samples(len: usize, value: f64) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed)?;
    data.resize(len, value);
    Ok(data)
}

/// Multi-channel real-valued image
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Channel descriptions, in sample order
    channels: Vec<ChannelInfo>,
    /// Interleaved samples (row-major, no padding)
    data: Vec<f64>,
    /// Edge policy for out-of-range reads
    virtual_pixel: VirtualPixel,
    /// Pixel returned by [`VirtualPixel::Background`]
    background: Vec<f64>,
}

impl Image {
    /// Create a new image with all samples set to zero
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels (must be > 0)
    /// * `height` - Height in pixels (must be > 0)
    /// * `layout` - Channel arrangement
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0, or
    /// `Error::AllocationFailed` if the sample buffer cannot be allocated.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> Result<Self> {
        Self::new_with_value(width, height, layout, 0.0)
    }

    /// Create a new image with every sample set to `value`
    ///
    /// # Errors
    ///
    /// Same as [`Image::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use morphkit_core::{ChannelLayout, Image, QUANTUM_RANGE};
    ///
    /// let white = Image::new_with_value(8, 8, ChannelLayout::Gray, QUANTUM_RANGE).unwrap();
    /// assert_eq!(white.get_value(3, 3, 0).unwrap(), QUANTUM_RANGE);
    /// ```
    pub fn new_with_value(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        value: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let channels = layout.channels();
        let len = width as usize * height as usize * channels.len();
        let data = alloc_samples(len, value)?;
        Ok(Image {
            width,
            height,
            background: vec![0.0; channels.len()],
            channels,
            data,
            virtual_pixel: VirtualPixel::default(),
        })
    }

    /// Create an image from interleaved samples
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `layout` - Channel arrangement
    /// * `data` - Samples in row-major, channel-interleaved order
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length doesn't
    /// match `width * height * channels`.
    pub fn from_data(width: u32, height: u32, layout: ChannelLayout, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let channels = layout.channels();
        let expected = width as usize * height as usize * channels.len();
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{}x{} = {}",
                data.len(),
                width,
                height,
                channels.len(),
                expected
            )));
        }
        Ok(Image {
            width,
            height,
            background: vec![0.0; channels.len()],
            channels,
            data,
            virtual_pixel: VirtualPixel::default(),
        })
    }

    /// Copy the image, reporting allocation failure as an error
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = alloc_samples(0, 0.0)?;
        data.try_reserve_exact(self.data.len())
            .map_err(|_| Error::AllocationFailed)?;
        data.extend_from_slice(&self.data);
        Ok(Image {
            width: self.width,
            height: self.height,
            channels: self.channels.clone(),
            data,
            virtual_pixel: self.virtual_pixel,
            background: self.background.clone(),
        })
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of samples per pixel
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channel descriptions in sample order
    #[inline]
    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    /// Change the trait of one channel
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` for an invalid channel index.
    pub fn set_channel_trait(&mut self, channel: usize, traits: ChannelTrait) -> Result<()> {
        let len = self.channels.len();
        let info = self
            .channels
            .get_mut(channel)
            .ok_or(Error::IndexOutOfBounds { index: channel, len })?;
        info.traits = traits;
        Ok(())
    }

    /// Index of the active alpha channel, if any
    pub fn alpha_channel(&self) -> Option<usize> {
        self.channels
            .iter()
            .position(|c| c.kind == ChannelKind::Alpha && c.traits != ChannelTrait::Undefined)
    }

    /// True if neighbors should be weighted by their alpha
    #[inline]
    pub fn has_blended_alpha(&self) -> bool {
        self.alpha_channel().is_some()
    }

    /// Turn off the alpha channel, keeping its samples
    ///
    /// The alpha channel becomes [`ChannelTrait::Undefined`] and blended
    /// color channels revert to plain [`ChannelTrait::Update`].
    pub fn deactivate_alpha(&mut self) {
        for info in &mut self.channels {
            if info.kind == ChannelKind::Alpha {
                info.traits = ChannelTrait::Undefined;
            } else if info.traits == ChannelTrait::Blend {
                info.traits = ChannelTrait::Update;
            }
        }
    }

    /// Copy the alpha samples of `other` into this image
    ///
    /// # Errors
    ///
    /// Returns an error if the images differ in size or layout. Images
    /// without an alpha channel are left unchanged.
    pub fn copy_alpha_from(&mut self, other: &Image) -> Result<()> {
        self.check_same_shape(other)?;
        let n = self.channels.len();
        let Some(alpha) = self.channels.iter().position(|c| c.kind == ChannelKind::Alpha) else {
            return Ok(());
        };
        for (dst, src) in self.data.chunks_exact_mut(n).zip(other.data.chunks_exact(n)) {
            dst[alpha] = src[alpha];
        }
        Ok(())
    }

    /// Current virtual pixel policy
    #[inline]
    pub fn virtual_pixel(&self) -> VirtualPixel {
        self.virtual_pixel
    }

    /// Set the virtual pixel policy
    pub fn set_virtual_pixel(&mut self, policy: VirtualPixel) {
        self.virtual_pixel = policy;
    }

    /// Background pixel used by [`VirtualPixel::Background`]
    #[inline]
    pub fn background(&self) -> &[f64] {
        &self.background
    }

    /// Set the background pixel
    ///
    /// # Errors
    ///
    /// Returns `Error::ChannelMismatch` if `pixel` has the wrong length.
    pub fn set_background(&mut self, pixel: &[f64]) -> Result<()> {
        if pixel.len() != self.channels.len() {
            return Err(Error::ChannelMismatch {
                expected: self.channels.len(),
                actual: pixel.len(),
            });
        }
        self.background.copy_from_slice(pixel);
        Ok(())
    }

    /// Number of samples in one row
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels.len()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.len()
    }

    /// All samples of the pixel at `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if the coordinates are outside the
    /// image.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[f64]> {
        self.check_bounds(x, y)?;
        Ok(self.pixel_unchecked(x, y))
    }

    /// All samples of the pixel at `(x, y)` without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel_unchecked(&self, x: u32, y: u32) -> &[f64] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels.len()]
    }

    /// Get one sample
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` for an invalid coordinate or channel.
    pub fn get_value(&self, x: u32, y: u32, channel: usize) -> Result<f64> {
        self.check_bounds(x, y)?;
        self.check_channel(channel)?;
        Ok(self.data[self.offset(x, y) + channel])
    }

    /// Set one sample
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` for an invalid coordinate or channel.
    pub fn set_value(&mut self, x: u32, y: u32, channel: usize, value: f64) -> Result<()> {
        self.check_bounds(x, y)?;
        self.check_channel(channel)?;
        let index = self.offset(x, y) + channel;
        self.data[index] = value;
        Ok(())
    }

    /// Pixel at a possibly out-of-range coordinate, resolved by the virtual
    /// pixel policy
    pub fn virtual_pixel_at(&self, x: i64, y: i64) -> &[f64] {
        match (
            self.virtual_pixel.resolve(x, self.width),
            self.virtual_pixel.resolve(y, self.height),
        ) {
            (Some(px), Some(py)) => self.pixel_unchecked(px, py),
            _ => &self.background,
        }
    }

    /// Fetch a rectangular window, resolving out-of-range pixels
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Image coordinates of the window's top-left pixel (may be
    ///   negative)
    /// * `width`, `height` - Window extent (must be > 0)
    ///
    /// # Errors
    ///
    /// Returns `Error::WindowUnavailable` for an empty window and
    /// `Error::AllocationFailed` if the window cannot be allocated.
    pub fn window(&self, x: i64, y: i64, width: u32, height: u32) -> Result<Window> {
        if width == 0 || height == 0 {
            return Err(Error::WindowUnavailable {
                x,
                y,
                width,
                height,
            });
        }
        let n = self.channels.len();
        let mut data = alloc_samples(0, 0.0)?;
        data.try_reserve_exact(width as usize * height as usize * n)
            .map_err(|_| Error::AllocationFailed)?;
        for wy in 0..height as i64 {
            let iy = y + wy;
            // Fast path: the in-bounds span of the row is contiguous.
            if (0..self.height as i64).contains(&iy) {
                let row = self.row(iy as u32);
                for wx in 0..width as i64 {
                    let ix = x + wx;
                    if (0..self.width as i64).contains(&ix) {
                        let start = ix as usize * n;
                        data.extend_from_slice(&row[start..start + n]);
                    } else {
                        data.extend_from_slice(self.virtual_pixel_at(ix, iy));
                    }
                }
            } else {
                for wx in 0..width as i64 {
                    data.extend_from_slice(self.virtual_pixel_at(x + wx, iy));
                }
            }
        }
        Ok(Window::from_parts(x, y, width, height, n, data))
    }

    /// Overwrite one row with new samples
    ///
    /// # Errors
    ///
    /// Returns an error if `y` is out of range or `samples` has the wrong
    /// length.
    pub fn put_row(&mut self, y: u32, samples: &[f64]) -> Result<()> {
        if y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height as usize,
            });
        }
        if samples.len() != self.row_len() {
            return Err(Error::InvalidParameter(format!(
                "row length {} doesn't match {}",
                samples.len(),
                self.row_len()
            )));
        }
        self.row_mut(y).copy_from_slice(samples);
        Ok(())
    }

    /// Samples of one row
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range.
    #[inline]
    pub fn row(&self, y: u32) -> &[f64] {
        let len = self.row_len();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Mutable samples of one row
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [f64] {
        let len = self.row_len();
        let start = y as usize * len;
        &mut self.data[start..start + len]
    }

    /// All samples
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// All samples, mutable
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Scalar intensity of a pixel belonging to this image
    ///
    /// Gray images use the gray sample; color images use Rec.709 luma.
    pub fn intensity(&self, pixel: &[f64]) -> f64 {
        let mut gray = None;
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        for (info, &value) in self.channels.iter().zip(pixel) {
            match info.kind {
                ChannelKind::Gray => gray = Some(value),
                ChannelKind::Red => r = value,
                ChannelKind::Green => g = value,
                ChannelKind::Blue => b = value,
                ChannelKind::Alpha => {}
            }
        }
        gray.unwrap_or(LUMA_RED * r + LUMA_GREEN * g + LUMA_BLUE * b)
    }

    /// Check that two images have the same size and channel layout
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` or `Error::ChannelMismatch`.
    pub fn check_same_shape(&self, other: &Image) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        if self.channels.len() != other.channels.len() {
            return Err(Error::ChannelMismatch {
                expected: self.channels.len(),
                actual: other.channels.len(),
            });
        }
        Ok(())
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width as usize,
            });
        }
        if y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height as usize,
            });
        }
        Ok(())
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels.len() {
            return Err(Error::IndexOutOfBounds {
                index: channel,
                len: self.channels.len(),
            });
        }
        Ok(())
    }
}
