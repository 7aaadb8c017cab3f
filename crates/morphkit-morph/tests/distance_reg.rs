//! Distance transform regression test
//!
//! Tests:
//!   (1) Chessboard and city-block distances from a single seed
//!   (2) Two-sweep distance equals iterated distance at its fixed point
//!   (3) Only the first kernel of a list is used
//!   (4) Voronoi keeps the input alpha and never raises a sample
//!   (5) Cancellation
//!
//! Run with:
//! ```
//! cargo test -p morphkit-morph --test distance_reg
//! ```

use morphkit_core::{ChannelLayout, Image, ProgressMonitor, QUANTUM_RANGE};
use morphkit_kernel::parse_kernel_list;
use morphkit_morph::{Method, MorphError, MorphologyOrchestrator, morphology};
use morphkit_test::{RegParams, dump, init_tracing, single_pixel};

fn run(image: &Image, method: Method, iterations: i64, spec: &str) -> Image {
    let kernels = parse_kernel_list(spec).unwrap();
    morphology(image, method, iterations, &kernels).unwrap().unwrap()
}

#[test]
fn distance_reg_metrics() {
    init_tracing();
    let mut rp = RegParams::new("distance_metrics");

    let seed = single_pixel(9, 7, QUANTUM_RANGE, 4, 3, 0.0).unwrap();

    let chessboard = run(&seed, Method::Distance, 1, "Chebyshev");
    let city = run(&seed, Method::Distance, 1, "Manhattan");
    if rp.display() {
        eprintln!("{}", dump(&chessboard));
    }
    for y in 0..7u32 {
        for x in 0..9u32 {
            let dx = (x as f64 - 4.0).abs();
            let dy = (y as f64 - 3.0).abs();
            rp.compare_values(100.0 * dx.max(dy), chessboard.get_value(x, y, 0).unwrap(), 1e-9);
            rp.compare_values(100.0 * (dx + dy), city.get_value(x, y, 0).unwrap(), 1e-9);
        }
    }

    // A larger scale, given as a percentage of the range
    let scaled = run(&seed, Method::Distance, 1, "Chebyshev:1,1%");
    rp.compare_values(QUANTUM_RANGE / 100.0, scaled.get_value(5, 3, 0).unwrap(), 1e-9);

    assert!(rp.cleanup(), "distance metric tests failed");
}

#[test]
fn distance_reg_iterated() {
    init_tracing();
    let mut rp = RegParams::new("distance_iterated");

    let mut image = Image::new_with_value(10, 8, ChannelLayout::Gray, QUANTUM_RANGE).unwrap();
    for (x, y) in [(1, 1), (8, 2), (4, 6)] {
        image.set_value(x, y, 0, 0.0).unwrap();
    }
    for spec in ["Chebyshev", "Manhattan", "Euclidean"] {
        let swept = run(&image, Method::Distance, 1, spec);
        let iterated = run(&image, Method::IterativeDistance, -1, spec);
        rp.compare_images(&iterated, &swept, 1e-9);
    }

    assert!(rp.cleanup(), "distance iterated tests failed");
}

#[test]
fn distance_reg_first_kernel() {
    init_tracing();
    let mut rp = RegParams::new("distance_first_kernel");

    let seed = single_pixel(6, 6, QUANTUM_RANGE, 2, 2, 0.0).unwrap();
    let alone = run(&seed, Method::Distance, 1, "Chebyshev");
    let listed = run(&seed, Method::Distance, 1, "Chebyshev; Manhattan");
    rp.compare_images(&alone, &listed, 0.0);

    assert!(rp.cleanup(), "distance first kernel tests failed");
}

#[test]
fn distance_reg_voronoi() {
    init_tracing();
    let mut rp = RegParams::new("distance_voronoi");

    let (width, height) = (8u32, 6u32);
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let gray = if (x, y) == (1, 1) || (x, y) == (6, 4) { 1000.0 } else { QUANTUM_RANGE };
            data.extend([gray, (x * 1000 + y) as f64]);
        }
    }
    let image = Image::from_data(width, height, ChannelLayout::GrayAlpha, data).unwrap();
    let out = run(&image, Method::Voronoi, 1, "Manhattan");

    rp.check(out.alpha_channel().is_none(), "alpha deactivated");
    for y in 0..height {
        for x in 0..width {
            rp.compare_values(image.get_value(x, y, 1).unwrap(), out.get_value(x, y, 1).unwrap(), 0.0);
            rp.check(
                out.get_value(x, y, 0).unwrap() <= image.get_value(x, y, 0).unwrap(),
                "voronoi never raises a sample",
            );
        }
    }
    rp.compare_values(1000.0, out.get_value(1, 1, 0).unwrap(), 0.0);
    rp.compare_values(1100.0, out.get_value(2, 1, 0).unwrap(), 0.0);
    rp.compare_values(1200.0, out.get_value(6, 2, 0).unwrap(), 0.0);

    assert!(rp.cleanup(), "distance voronoi tests failed");
}

#[test]
fn distance_reg_cancel() {
    init_tracing();
    let mut rp = RegParams::new("distance_cancel");

    let seed = single_pixel(5, 5, QUANTUM_RANGE, 0, 0, 0.0).unwrap();
    let kernels = parse_kernel_list("Chebyshev").unwrap();
    let stop = |_: &str, done: u64, total: u64| done < total / 2;
    let monitor: &dyn ProgressMonitor = &stop;
    let result = MorphologyOrchestrator::new(Method::Distance, 1, &kernels)
        .with_progress(monitor)
        .run(&seed);
    rp.check(
        matches!(result, Err(MorphError::Cancelled(_))),
        "cancelled during the sweeps",
    );

    assert!(rp.cleanup(), "distance cancel tests failed");
}
