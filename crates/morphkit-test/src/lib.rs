//! morphkit-test - Regression test framework for morphkit
//!
//! Regression tests live in `crates/<crate>/tests/*_reg.rs` and drive a
//! [`RegParams`] through a sequence of numbered checks:
//!
//! - **Compare**: check results against expectations (default)
//! - **Display**: additionally dump every compared image to the log
//!
//! # Usage
//!
//! ```ignore
//! use morphkit_test::RegParams;
//!
//! let mut rp = RegParams::new("primitive");
//! rp.compare_values(255.0, value, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"
//! - `RUST_LOG`: Log filter for the test subscriber (e.g. `morphkit_morph=debug`)

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use morphkit_core::{ChannelLayout, Image, QUANTUM_RANGE};
use tracing_subscriber::EnvFilter;

/// Install a log subscriber writing through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Build a gray image from rows of samples
///
/// # Errors
///
/// Returns `TestError::InvalidFixture` if the rows are empty or ragged.
pub fn gray_from_rows(rows: &[&[f64]]) -> TestResult<Image> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    if width == 0 || rows.iter().any(|r| r.len() != width) {
        return Err(TestError::InvalidFixture(
            "rows must be non-empty and equal length".into(),
        ));
    }
    let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Ok(Image::from_data(
        width as u32,
        height as u32,
        ChannelLayout::Gray,
        data,
    )?)
}

/// Build a binary gray image from a picture of `#` (white) and `.` (black)
///
/// ```
/// let image = morphkit_test::gray_from_art(&["#.", ".#"]).unwrap();
/// assert_eq!(image.get_value(0, 0, 0).unwrap(), morphkit_core::QUANTUM_RANGE);
/// ```
///
/// # Errors
///
/// Returns `TestError::InvalidFixture` for ragged rows or other characters.
pub fn gray_from_art(art: &[&str]) -> TestResult<Image> {
    let rows = art
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| match c {
                    '#' => Ok(QUANTUM_RANGE),
                    '.' => Ok(0.0),
                    other => Err(TestError::InvalidFixture(format!(
                        "unexpected character '{other}'"
                    ))),
                })
                .collect::<TestResult<Vec<f64>>>()
        })
        .collect::<TestResult<Vec<_>>>()?;
    let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
    gray_from_rows(&refs)
}

/// Checkerboard of single black and white pixels; `(0, 0)` is white
///
/// # Errors
///
/// Returns an error for a zero-sized board.
pub fn checkerboard(width: u32, height: u32) -> TestResult<Image> {
    let mut image = Image::new(width, height, ChannelLayout::Gray)?;
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 0 {
                image.set_value(x, y, 0, QUANTUM_RANGE)?;
            }
        }
    }
    Ok(image)
}

/// Constant image with one pixel set to `value`
///
/// # Errors
///
/// Returns an error if the pixel lies outside the image.
pub fn single_pixel(
    width: u32,
    height: u32,
    background: f64,
    x: u32,
    y: u32,
    value: f64,
) -> TestResult<Image> {
    let mut image = Image::new_with_value(width, height, ChannelLayout::Gray, background)?;
    image.set_value(x, y, 0, value)?;
    Ok(image)
}

/// White square of side `size` centered on a black canvas, with isolated
/// one-pixel white specks at the canvas corners
///
/// # Errors
///
/// Returns an error if the canvas is too small to hold the square and specks.
pub fn square_with_specks(canvas: u32, size: u32) -> TestResult<Image> {
    if canvas < size + 4 {
        return Err(TestError::InvalidFixture(format!(
            "canvas {canvas} too small for square {size}"
        )));
    }
    let mut image = Image::new(canvas, canvas, ChannelLayout::Gray)?;
    let start = (canvas - size) / 2;
    for y in start..start + size {
        for x in start..start + size {
            image.set_value(x, y, 0, QUANTUM_RANGE)?;
        }
    }
    for (x, y) in [(0, 0), (canvas - 1, 0), (0, canvas - 1), (canvas - 1, canvas - 1)] {
        image.set_value(x, y, 0, QUANTUM_RANGE)?;
    }
    Ok(image)
}

/// Render the first channel of an image as text, one row per line
pub fn dump(image: &Image) -> String {
    let n = image.channel_count();
    let mut out = String::new();
    for y in 0..image.height() {
        let row: Vec<String> = image
            .row(y)
            .chunks_exact(n)
            .map(|p| format!("{:>7.1}", p[0]))
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}
