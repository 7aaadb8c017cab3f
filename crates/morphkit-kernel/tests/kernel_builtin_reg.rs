//! Builtin kernel regression test
//!
//! Every registered kernel is generated with default and explicit
//! arguments; stored statistics must agree with the cell values.

use morphkit_kernel::{Kernel, KernelKind, KernelList, KernelRegistry, parse_kernel_list};
use morphkit_test::RegParams;

fn recomputed(kernel: &Kernel) -> (f64, f64, f64, f64) {
    let active: Vec<f64> = kernel.values().iter().flatten().copied().collect();
    let min = active.iter().copied().fold(f64::INFINITY, f64::min);
    let max = active.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pos: f64 = active.iter().filter(|v| **v > 0.0).sum();
    let neg: f64 = active.iter().filter(|v| **v < 0.0).sum();
    (min, max, pos, neg)
}

fn check_stats(rp: &mut RegParams, label: &str, list: &KernelList) {
    for kernel in list {
        let (min, max, pos, neg) = recomputed(kernel);
        let stats = kernel.stats();
        rp.compare_values(min, stats.minimum, 1e-9);
        rp.compare_values(max, stats.maximum, 1e-9);
        rp.compare_values(pos, stats.positive_range, 1e-9);
        rp.compare_values(neg, stats.negative_range, 1e-9);
        rp.check(
            kernel.origin_x() < kernel.width() && kernel.origin_y() < kernel.height(),
            &format!("{label} origin inside"),
        );
    }
}

#[test]
fn kernel_builtin_reg_defaults() {
    let mut rp = RegParams::new("builtin_defaults");

    let registry = KernelRegistry::standard();
    for name in registry.names() {
        match registry.build(name, "") {
            Ok(list) => check_stats(&mut rp, name, &list),
            Err(e) => {
                rp.check(false, &format!("{name} failed: {e}"));
            }
        }
    }

    assert!(rp.cleanup(), "kernel_builtin default tests failed");
}

#[test]
fn kernel_builtin_reg_arguments() {
    let mut rp = RegParams::new("builtin_arguments");

    let specs = [
        "Gaussian:3x1.5",
        "DoG:0,1,2",
        "LoG:2x0.8",
        "Blur:0x2+45",
        "Comet:0x2",
        "Binomial:2",
        "Laplacian:7",
        "Laplacian:15",
        "FreiChen:10",
        "Disk:3.5",
        "Octagon:2,3",
        "Rectangle:5x2+1+0",
        "Ring:2,4",
        "Peaks:1.5,3",
        "Euclidean:3,10!",
        "LineJunctions",
        "Skeleton:3",
    ];
    for spec in specs {
        let list = parse_kernel_list(spec).unwrap();
        check_stats(&mut rp, spec, &list);
    }

    assert!(rp.cleanup(), "kernel_builtin argument tests failed");
}

#[test]
fn kernel_builtin_reg_sums() {
    let mut rp = RegParams::new("builtin_sums");

    for spec in ["Gaussian:0x1", "Gaussian:2x1", "Blur:0x1", "Comet:0x1.5"] {
        let list = parse_kernel_list(spec).unwrap();
        rp.compare_values(1.0, list.first().stats().sum(), 1e-9);
    }

    for spec in [
        "DoG:0,1,2",
        "LoG:0x1",
        "Laplacian:0",
        "Laplacian:1",
        "Laplacian:2",
        "Laplacian:3",
        "Sobel",
        "Roberts",
        "Prewitt",
        "Compass",
        "Kirsch",
    ] {
        let list = parse_kernel_list(spec).unwrap();
        rp.check(
            list.first().stats().is_zero_summing(),
            &format!("{spec} is zero-summing"),
        );
    }

    // Binomial rows are Pascal's triangle, so the total is 4^order
    let list = parse_kernel_list("Binomial:2").unwrap();
    rp.compare_values(256.0, list.first().stats().sum(), 0.0);

    assert!(rp.cleanup(), "kernel_builtin sum tests failed");
}

#[test]
fn kernel_builtin_reg_shapes() {
    let mut rp = RegParams::new("builtin_shapes");

    let square = parse_kernel_list("Square:2").unwrap();
    rp.compare_values(25.0, square.first().active_count() as f64, 0.0);

    let diamond = parse_kernel_list("Diamond:2").unwrap();
    rp.compare_values(13.0, diamond.first().active_count() as f64, 0.0);

    let plus = parse_kernel_list("Plus:2").unwrap();
    rp.compare_values(9.0, plus.first().active_count() as f64, 0.0);

    let cross = parse_kernel_list("Cross:2").unwrap();
    rp.compare_values(9.0, cross.first().active_count() as f64, 0.0);

    // Radius 1.5 admits the eight neighbors
    let disk = parse_kernel_list("Disk:1.5").unwrap();
    rp.compare_values(3.0, disk.first().width() as f64, 0.0);
    rp.compare_values(9.0, disk.first().active_count() as f64, 0.0);

    let rect = parse_kernel_list("Rectangle:4x2+0+1").unwrap();
    let rect = rect.first();
    rp.compare_values(4.0, rect.width() as f64, 0.0);
    rp.compare_values(2.0, rect.height() as f64, 0.0);
    rp.compare_values(1.0, rect.origin_y() as f64, 0.0);

    let ring = parse_kernel_list("Ring:1,2").unwrap();
    rp.check(ring.first().get(2, 2).is_none(), "ring center masked");
    rp.check(ring.first().get(2, 0) == Some(1.0), "ring top");

    let scaled = parse_kernel_list("Square:1,5").unwrap();
    rp.compare_values(5.0, scaled.first().stats().maximum, 0.0);

    assert!(rp.cleanup(), "kernel_builtin shape tests failed");
}

#[test]
fn kernel_builtin_reg_hit_and_miss_sets() {
    let mut rp = RegParams::new("builtin_hitmiss");

    for spec in ["Edges", "Corners", "LineEnds", "ConvexHull", "Skeleton"] {
        let list = parse_kernel_list(spec).unwrap();
        for kernel in &list {
            rp.check(
                kernel.values().iter().flatten().all(|v| *v == 0.0 || *v == 1.0),
                &format!("{spec} holds only 0 and 1"),
            );
            rp.check(kernel.kind() != KernelKind::UserDefined, "builtin kind kept");
        }
    }

    assert!(rp.cleanup(), "kernel_builtin hit-and-miss tests failed");
}
