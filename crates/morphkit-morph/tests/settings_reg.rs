//! Settings regression test
//!
//! Tests:
//!   (1) Defines parse into settings; bad values are skipped
//!   (2) Bias percentages and scale geometry reach convolution only
//!   (3) The compose define overrides the method default
//!
//! Run with:
//! ```
//! cargo test -p morphkit-morph --test settings_reg
//! ```

use morphkit_core::{ChannelLayout, CompositeOp, Image, QUANTUM_RANGE};
use morphkit_kernel::parse_kernel_list;
use morphkit_morph::{Method, MorphologySettings};
use morphkit_test::{RegParams, init_tracing};

#[test]
fn settings_reg_defines() {
    init_tracing();
    let mut rp = RegParams::new("settings_defines");

    let settings = MorphologySettings::from_defines([
        ("convolve:bias", "-10%"),
        ("convolve:scale", "2,1"),
        ("morphology:compose", "Darken"),
        ("morphology:showKernel", "ON"),
    ]);
    rp.compare_values(-(QUANTUM_RANGE + 1.0) / 10.0, settings.bias.unwrap_or(0.0), 1e-9);
    rp.check(settings.scale.as_deref() == Some("2,1"), "scale kept");
    rp.check(settings.compose == Some(CompositeOp::Darken), "compose parsed");
    rp.check(settings.show_kernel, "show kernel");

    let skipped = MorphologySettings::from_defines([
        ("convolve:scale", "two"),
        ("morphology:showKernel", "maybe"),
    ]);
    rp.check(skipped.scale.is_none(), "bad scale skipped");
    rp.check(!skipped.show_kernel, "unknown boolean is false");

    assert!(rp.cleanup(), "settings define tests failed");
}

#[test]
fn settings_reg_convolution() {
    init_tracing();
    let mut rp = RegParams::new("settings_convolution");

    let image = Image::new_with_value(4, 3, ChannelLayout::Gray, 1000.0).unwrap();
    let kernels = parse_kernel_list("Unity").unwrap();

    // Scale by 2, then add 1 to the origin: weight 3
    let settings = MorphologySettings::from_defines([("convolve:scale", "2,1"), ("convolve:bias", "50")]);
    let out = settings.request(&image, Method::Convolve, 1, &kernels).unwrap().unwrap();
    rp.compare_values(3050.0, out.get_value(2, 1, 0).unwrap(), 1e-9);

    let correlated = settings.request(&image, Method::Correlate, 1, &kernels).unwrap().unwrap();
    rp.compare_images(&out, &correlated, 1e-9);

    // Neither applies to erosion
    let eroded = settings.request(&image, Method::Erode, 1, &kernels).unwrap().unwrap();
    rp.compare_images(&image, &eroded, 0.0);

    // A zero scale clears the image
    let zero = MorphologySettings::new().with_bias(0.0).with_scale("0");
    let out = zero.request(&image, Method::Convolve, 1, &kernels).unwrap().unwrap();
    rp.compare_values(0.0, out.get_value(0, 0, 0).unwrap(), 0.0);

    // A scale that cannot be applied is skipped and the kernel used as given
    let unusable = MorphologySettings::new().with_scale("two").with_bias(25.0);
    let out = unusable.request(&image, Method::Convolve, 1, &kernels).unwrap().unwrap();
    rp.compare_values(1025.0, out.get_value(1, 1, 0).unwrap(), 1e-9);

    assert!(rp.cleanup(), "settings convolution tests failed");
}

#[test]
fn settings_reg_compose() {
    init_tracing();
    let mut rp = RegParams::new("settings_compose");

    let line = Image::from_data(
        5,
        1,
        ChannelLayout::Gray,
        vec![0.0, QUANTUM_RANGE, QUANTUM_RANGE, QUANTUM_RANGE, 0.0],
    )
    .unwrap();
    let kernels = parse_kernel_list("3x1: 0,1,-; 3x1: -,1,0").unwrap();

    let default = MorphologySettings::new()
        .request(&line, Method::HitAndMiss, 1, &kernels)
        .unwrap()
        .unwrap();
    rp.compare_values(2.0 * QUANTUM_RANGE, default.data().iter().sum(), 0.0);

    let darken = MorphologySettings::new()
        .with_compose(CompositeOp::Darken)
        .with_show_kernel(true)
        .request(&line, Method::HitAndMiss, 1, &kernels)
        .unwrap()
        .unwrap();
    rp.compare_values(0.0, darken.data().iter().sum(), 0.0);

    assert!(rp.cleanup(), "settings compose tests failed");
}
