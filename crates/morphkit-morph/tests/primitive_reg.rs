//! Primitive regression test
//!
//! Tests:
//!   (1) Unity convolution leaves the image unchanged
//!   (2) Erode and dilate on a checkerboard give uniform images
//!   (3) Dilation of a single pixel traces the kernel shape
//!   (4) Erode/dilate duality under inversion
//!   (5) Normalized convolution preserves a constant image
//!   (6) Intensity primitives move whole pixels
//!
//! Run with:
//! ```
//! cargo test -p morphkit-morph --test primitive_reg
//! ```

use morphkit_core::{ChannelLayout, Image, QUANTUM_RANGE};
use morphkit_kernel::parse_kernel_list;
use morphkit_morph::{Primitive, apply_primitive};
use morphkit_test::{RegParams, checkerboard, dump, init_tracing, single_pixel};

fn invert(image: &Image) -> Image {
    let mut out = image.clone();
    for v in out.data_mut() {
        *v = QUANTUM_RANGE - *v;
    }
    out
}

fn count_at(image: &Image, value: f64) -> usize {
    image.data().iter().filter(|v| **v == value).count()
}

#[test]
fn primitive_reg_identity_and_uniform() {
    init_tracing();
    let mut rp = RegParams::new("primitive_uniform");

    let board = checkerboard(6, 5).unwrap();
    let unity = parse_kernel_list("Unity").unwrap();
    let (same, changed) = apply_primitive(&board, Primitive::Convolve, unity.first(), 0.0).unwrap();
    rp.compare_images(&board, &same, 0.0);
    rp.compare_values(0.0, changed as f64, 0.0);

    // Every 3x3 neighborhood of a checkerboard holds both colors
    let square = parse_kernel_list("Square:1").unwrap();
    let (eroded, _) = apply_primitive(&board, Primitive::Erode, square.first(), 0.0).unwrap();
    rp.compare_values(30.0, count_at(&eroded, 0.0) as f64, 0.0);
    let (dilated, _) = apply_primitive(&board, Primitive::Dilate, square.first(), 0.0).unwrap();
    rp.compare_values(30.0, count_at(&dilated, QUANTUM_RANGE) as f64, 0.0);

    assert!(rp.cleanup(), "primitive uniform tests failed");
}

#[test]
fn primitive_reg_kernel_shapes() {
    init_tracing();
    let mut rp = RegParams::new("primitive_shapes");

    let speck = single_pixel(9, 9, 0.0, 4, 4, QUANTUM_RANGE).unwrap();
    for (spec, expected) in [("Square:1", 9.0), ("Diamond:1", 5.0), ("Diamond:2", 13.0), ("Plus:2", 9.0)] {
        let kernels = parse_kernel_list(spec).unwrap();
        let (out, changed) = apply_primitive(&speck, Primitive::Dilate, kernels.first(), 0.0).unwrap();
        rp.compare_values(expected, count_at(&out, QUANTUM_RANGE) as f64, 0.0);
        rp.compare_values(expected - 1.0, changed as f64, 0.0);
        if rp.display() {
            eprintln!("{spec}:\n{}", dump(&out));
        }
    }

    // An off-center origin shifts the dilated shape
    let kernels = parse_kernel_list("2x1+0+0: 1,1").unwrap();
    let (out, _) = apply_primitive(&speck, Primitive::Dilate, kernels.first(), 0.0).unwrap();
    rp.compare_values(QUANTUM_RANGE, out.get_value(4, 4, 0).unwrap(), 0.0);
    rp.compare_values(QUANTUM_RANGE, out.get_value(5, 4, 0).unwrap(), 0.0);
    rp.compare_values(0.0, out.get_value(3, 4, 0).unwrap(), 0.0);

    assert!(rp.cleanup(), "primitive shape tests failed");
}

#[test]
fn primitive_reg_duality() {
    init_tracing();
    let mut rp = RegParams::new("primitive_duality");

    let data: Vec<f64> = (0..63).map(|i| ((i * 37) % 17) as f64 * 3000.0).collect();
    let image = Image::from_data(9, 7, ChannelLayout::Gray, data).unwrap();
    for spec in ["Square:1", "Diamond:2", "Disk:2.5", "3x2+1+0: 1,1,- 1,-,1"] {
        let kernels = parse_kernel_list(spec).unwrap();
        let kernel = kernels.first();
        let (eroded, _) = apply_primitive(&image, Primitive::Erode, kernel, 0.0).unwrap();
        // Dilation reads the reflected kernel, so reflect it back
        let reflected = kernel.reflect();
        let (dilated, _) = apply_primitive(&invert(&image), Primitive::Dilate, &reflected, 0.0).unwrap();
        rp.compare_images(&eroded, &invert(&dilated), 1e-9);
    }

    assert!(rp.cleanup(), "primitive duality tests failed");
}

#[test]
fn primitive_reg_convolution() {
    init_tracing();
    let mut rp = RegParams::new("primitive_convolution");

    let flat = Image::new_with_value(8, 6, ChannelLayout::Gray, 12345.0).unwrap();
    for spec in ["Gaussian:0x1", "Gaussian:5x2", "Blur:0x2", "Comet:0x1.5"] {
        let kernels = parse_kernel_list(spec).unwrap();
        let (out, _) = apply_primitive(&flat, Primitive::Convolve, kernels.first(), 0.0).unwrap();
        rp.compare_images(&flat, &out, 1e-6);
    }

    // Zero-summing kernels give zero on flat input; bias lifts the result
    let sobel = parse_kernel_list("Sobel").unwrap();
    let (out, _) = apply_primitive(&flat, Primitive::Convolve, sobel.first(), 0.0).unwrap();
    rp.compare_values(0.0, out.data().iter().copied().fold(0.0, f64::max), 1e-6);
    let (out, _) = apply_primitive(&flat, Primitive::Convolve, sobel.first(), 1000.0).unwrap();
    rp.compare_values(1000.0, out.get_value(3, 3, 0).unwrap(), 1e-6);

    assert!(rp.cleanup(), "primitive convolution tests failed");
}

#[test]
fn primitive_reg_intensity() {
    init_tracing();
    let mut rp = RegParams::new("primitive_intensity");

    let mut image = Image::new_with_value(5, 1, ChannelLayout::Rgb, 20000.0).unwrap();
    for c in 0..3 {
        image.set_value(2, 0, c, [50000.0, 0.0, 0.0][c]).unwrap();
    }
    let kernels = parse_kernel_list("3x1: 1,1,1").unwrap();

    // Pure red is darker than mid gray under luma: it spreads under erosion
    let (out, _) = apply_primitive(&image, Primitive::ErodeIntensity, kernels.first(), 0.0).unwrap();
    for x in 1..4 {
        rp.compare_values(50000.0, out.get_value(x, 0, 0).unwrap(), 0.0);
        rp.compare_values(0.0, out.get_value(x, 0, 1).unwrap(), 0.0);
    }
    rp.compare_values(20000.0, out.get_value(0, 0, 1).unwrap(), 0.0);

    // and vanishes under dilation
    let (out, _) = apply_primitive(&image, Primitive::DilateIntensity, kernels.first(), 0.0).unwrap();
    rp.compare_values(20000.0, out.get_value(2, 0, 0).unwrap(), 0.0);
    rp.compare_values(20000.0, out.get_value(2, 0, 2).unwrap(), 0.0);

    assert!(rp.cleanup(), "primitive intensity tests failed");
}
