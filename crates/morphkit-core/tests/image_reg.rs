//! Image regression test
//!
//! Tests image creation, pixel access, virtual pixel policies and window
//! fetches.

use morphkit_core::{ChannelLayout, Image, QUANTUM_RANGE, VirtualPixel};
use morphkit_test::RegParams;

// ==========================================================================
// Test 1: Creation and basic properties
// ==========================================================================

#[test]
fn image_reg_creation() {
    let mut rp = RegParams::new("image_creation");

    let image = Image::new(64, 48, ChannelLayout::Rgb).expect("Image::new failed");
    rp.compare_values(64.0, image.width() as f64, 0.0);
    rp.compare_values(48.0, image.height() as f64, 0.0);
    rp.compare_values(3.0, image.channel_count() as f64, 0.0);
    rp.check(image.data().iter().all(|&v| v == 0.0), "new image is black");

    let white = Image::new_with_value(10, 10, ChannelLayout::Gray, QUANTUM_RANGE).unwrap();
    rp.check(white.data().iter().all(|&v| v == QUANTUM_RANGE), "white fill");

    let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let image = Image::from_data(3, 2, ChannelLayout::Gray, data).expect("from_data failed");
    rp.compare_values(1.0, image.get_value(0, 0, 0).unwrap(), 0.0);
    rp.compare_values(6.0, image.get_value(2, 1, 0).unwrap(), 0.0);

    rp.check(Image::new(0, 10, ChannelLayout::Gray).is_err(), "zero width rejected");
    rp.check(image.get_value(3, 0, 0).is_err(), "out of bounds read rejected");
    rp.check(image.get_value(0, 0, 1).is_err(), "bad channel rejected");

    let copy = image.try_clone().unwrap();
    rp.check(copy == image, "try_clone copies samples");

    assert!(rp.cleanup(), "image_reg creation tests failed");
}

// ==========================================================================
// Test 2: Virtual pixel policies through windows
// ==========================================================================

#[test]
fn image_reg_virtual_pixels() {
    let mut rp = RegParams::new("image_virtual");

    // 4x1 ramp: 10 20 30 40
    let mut image =
        Image::from_data(4, 1, ChannelLayout::Gray, vec![10.0, 20.0, 30.0, 40.0]).unwrap();

    let expect = |policy: VirtualPixel| -> Vec<f64> {
        match policy {
            VirtualPixel::Edge => vec![10.0, 10.0, 10.0, 20.0, 30.0, 40.0, 40.0, 40.0],
            VirtualPixel::Mirror => vec![20.0, 10.0, 10.0, 20.0, 30.0, 40.0, 40.0, 30.0],
            VirtualPixel::Tile => vec![30.0, 40.0, 10.0, 20.0, 30.0, 40.0, 10.0, 20.0],
            VirtualPixel::Background => vec![5.0, 5.0, 10.0, 20.0, 30.0, 40.0, 5.0, 5.0],
        }
    };

    image.set_background(&[5.0]).unwrap();
    for policy in [
        VirtualPixel::Edge,
        VirtualPixel::Mirror,
        VirtualPixel::Tile,
        VirtualPixel::Background,
    ] {
        image.set_virtual_pixel(policy);
        let window = image.window(-2, 0, 8, 1).unwrap();
        rp.check(window.data() == expect(policy).as_slice(), &format!("{policy:?} window"));
    }

    // Rows above and below resolve too
    image.set_virtual_pixel(VirtualPixel::Edge);
    let window = image.window(1, -3, 2, 7).unwrap();
    rp.compare_values(7.0, window.height() as f64, 0.0);
    rp.compare_values(20.0, window.sample(0, 0, 0), 0.0);
    rp.compare_values(30.0, window.sample(1, 6, 0), 0.0);
    rp.compare_values(-3.0, window.y() as f64, 0.0);

    assert!(rp.cleanup(), "image_reg virtual pixel tests failed");
}

// ==========================================================================
// Test 3: Row writes and alpha handling
// ==========================================================================

#[test]
fn image_reg_rows_and_alpha() {
    let mut rp = RegParams::new("image_rows");

    let mut image = Image::new(2, 2, ChannelLayout::GrayAlpha).unwrap();
    image.put_row(1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    rp.compare_values(3.0, image.get_value(1, 1, 0).unwrap(), 0.0);
    rp.compare_values(4.0, image.get_value(1, 1, 1).unwrap(), 0.0);
    rp.check(image.put_row(0, &[1.0]).is_err(), "short row rejected");

    rp.check(image.has_blended_alpha(), "gray+alpha blends");
    image.deactivate_alpha();
    rp.check(!image.has_blended_alpha(), "alpha deactivated");

    assert!(rp.cleanup(), "image_reg rows tests failed");
}
