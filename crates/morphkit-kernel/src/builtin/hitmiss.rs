//! Hit-and-miss kernel sets
//!
//! Cells of 1 must be foreground, cells of 0 must be background, and masked
//! cells are ignored. The thinning SEs follow Bloomberg, "Connectivity-
//! preserving morphological image transformations"; they leave the origin
//! masked so the same SE serves both thinning and thickening.

use super::{KernelDescriptor, KernelRegistry, table};
use crate::geometry::GeometryArgs;
use crate::kernel::{KernelKind, KernelList};
use crate::KernelResult;

pub(super) fn register(registry: &mut KernelRegistry) {
    registry.register("Edges", KernelDescriptor::new(KernelKind::Edges, edges));
    registry.register("Corners", KernelDescriptor::new(KernelKind::Corners, corners));
    registry.register("Diagonals", KernelDescriptor::new(KernelKind::Diagonals, diagonals));
    registry.register("LineEnds", KernelDescriptor::new(KernelKind::LineEnds, line_ends));
    registry.register(
        "LineJunctions",
        KernelDescriptor::new(KernelKind::LineJunctions, line_junctions),
    );
    registry.register("Ridges", KernelDescriptor::new(KernelKind::Ridges, ridges));
    registry.register(
        "ConvexHull",
        KernelDescriptor::new(KernelKind::ConvexHull, convex_hull),
    );
    registry.register("Skeleton", KernelDescriptor::new(KernelKind::Skeleton, skeleton));
    registry.register("ThinSE", KernelDescriptor::new(KernelKind::ThinSE, thin_se_builtin));
}

// ============================================================================
// 4-connected thinning SEs
// ============================================================================

const SE_4_1: &str = "3: -,-,1  0,-,1  -,-,1";
const SE_4_2: &str = "3: -,-,1  0,-,1  -,0,-";
const SE_4_3: &str = "3: -,0,-  0,-,1  -,-,1";
const SE_4_4: &str = "3: -,0,-  0,-,1  -,0,-";
const SE_4_5: &str = "3: -,0,1  0,-,1  -,0,-";
const SE_4_6: &str = "3: -,0,-  0,-,1  -,0,1";
const SE_4_7: &str = "3: -,1,1  0,-,1  -,0,-";
const SE_4_8: &str = "3: -,-,1  0,-,1  0,-,1";
const SE_4_9: &str = "3: 0,-,1  0,-,1  -,-,1";

// ============================================================================
// 8-connected thinning SEs
// ============================================================================

const SE_8_1: &str = "3: -,1,-  0,-,1  -,1,-";
const SE_8_2: &str = "3: -,1,-  0,-,1  0,-,-";
const SE_8_3: &str = "3: 0,-,-  0,-,1  -,1,-";
const SE_8_4: &str = "3: 0,-,-  0,-,1  0,-,-";
const SE_8_5: &str = "3: 0,-,1  0,-,1  0,-,-";
const SE_8_6: &str = "3: 0,-,-  0,-,1  0,-,1";
const SE_8_7: &str = "3: -,1,-  0,-,1  0,0,-";
const SE_8_8: &str = "3: -,1,-  0,-,1  0,1,-";
const SE_8_9: &str = "3: 0,1,-  0,-,1  -,1,-";

// ============================================================================
// Combined SEs
// ============================================================================

// SE_4_2 and SE_4_3 together
const SE_4_23: &str = "3: -,-,1  0,-,-  -,0,-";
// SE_8_2 and SE_8_3 together
const SE_8_23: &str = "3: -,1,-  -,-,1  0,-,-";
// General connected corner
const SE_48_1: &str = "3: -,1,1  0,-,1  0,0,-";
// General edge
const SE_48_2: &str = "3: 0,-,1  0,-,1  0,-,1";

/// One thinning SE by its number, rotated by `angle`
fn thin_se(variant: i64, angle: f64, kind: KernelKind) -> KernelResult<KernelList> {
    let text = match variant {
        41 => SE_4_1,
        42 => SE_4_2,
        43 => SE_4_3,
        44 => SE_4_4,
        45 => SE_4_5,
        46 => SE_4_6,
        47 => SE_4_7,
        48 => SE_4_8,
        49 => SE_4_9,
        81 => SE_8_1,
        82 => SE_8_2,
        83 => SE_8_3,
        84 => SE_8_4,
        85 => SE_8_5,
        86 => SE_8_6,
        87 => SE_8_7,
        88 => SE_8_8,
        89 => SE_8_9,
        423 => SE_4_23,
        823 => SE_8_23,
        481 => SE_48_1,
        _ => SE_48_2,
    };
    Ok(table(kind, text)?.rotate(angle).into())
}

fn thin_se_builtin(args: &GeometryArgs) -> KernelResult<KernelList> {
    thin_se(args.rho as i64, args.sigma, KernelKind::ThinSE)
}

fn edges(_args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(thin_se(482, 0.0, KernelKind::Edges)?.expand_mirror())
}

fn corners(_args: &GeometryArgs) -> KernelResult<KernelList> {
    Ok(thin_se(87, 0.0, KernelKind::Corners)?.expand_rotate(90.0))
}

const DIAGONAL_1: &str = "3: 0,0,0  0,-,1  1,1,-";
const DIAGONAL_2: &str = "3: 0,0,1  0,-,1  0,1,-";

fn diagonals(args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::Diagonals;
    let text = match args.rho as i64 {
        1 => DIAGONAL_1,
        2 => DIAGONAL_2,
        _ => {
            let pair = KernelList::from_vec(vec![table(kind, DIAGONAL_1)?, table(kind, DIAGONAL_2)?])?;
            return Ok(pair.expand_mirror());
        }
    };
    Ok(table(kind, text)?.rotate(args.sigma).into())
}

fn line_ends(args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::LineEnds;
    let text = match args.rho as i64 {
        // 4-connected line ends
        1 => "3: 0,0,-  0,1,1  0,0,-",
        // 8-connected additions
        2 => "3: 0,0,0  0,1,0  0,0,1",
        // orthogonal ends only, no corners
        3 => "3: 0,0,0  0,1,1  0,0,0",
        // traditional line end
        4 => "3: 0,0,0  0,1,-  0,0,-",
        _ => {
            let mut all = table(kind, "3: 0,0,-  0,1,1  0,0,-")?.expand_rotate(90.0);
            all.extend(table(kind, "3: 0,0,0  0,1,0  0,0,1")?.expand_rotate(90.0));
            return Ok(all);
        }
    };
    Ok(table(kind, text)?.rotate(args.sigma).into())
}

fn line_junctions(args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::LineJunctions;
    let text = match args.rho as i64 {
        // Y junction
        1 => "3: 1,-,1  -,1,-  -,1,-",
        // diagonal T
        2 => "3: 1,-,-  -,1,-  1,-,1",
        // orthogonal T
        3 => "3: -,-,-  1,1,1  -,1,-",
        // diagonal X
        4 => "3: 1,-,1  -,1,-  1,-,1",
        // orthogonal X
        5 => "3: -,1,-  1,1,1  -,1,-",
        _ => {
            let mut all = table(kind, "3: 1,-,1  -,1,-  -,1,-")?.expand_rotate(45.0);
            all.extend(table(kind, "3: 1,-,-  -,1,-  1,-,1")?.expand_rotate(90.0));
            return Ok(all);
        }
    };
    Ok(table(kind, text)?.rotate(args.sigma).into())
}

/// Stepped thick-line kernels, four orientations each mirrored
const THICK_RIDGES: [&str; 8] = [
    "4x3+1+1: 0,1,1,-  -,1,1,-  -,1,1,0",
    "4x3+2+1: 0,1,1,-  -,1,1,-  -,1,1,0",
    "4x3+1+1: -,1,1,0  -,1,1,-  0,1,1,-",
    "4x3+2+1: -,1,1,0  -,1,1,-  0,1,1,-",
    "3x4+1+1: 0,-,-  1,1,1  1,1,1  -,-,0",
    "3x4+1+2: 0,-,-  1,1,1  1,1,1  -,-,0",
    "3x4+1+1: -,-,0  1,1,1  1,1,1  0,-,-",
    "3x4+1+2: -,-,0  1,1,1  1,1,1  0,-,-",
];

fn ridges(args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::Ridges;
    if args.rho as i64 == 2 {
        let mut all = table(kind, "4x1: 0,1,1,0")?.expand_rotate(90.0);
        for text in THICK_RIDGES {
            all.push(table(kind, text)?);
        }
        return Ok(all);
    }
    Ok(table(kind, "3x1: 0,1,0")?.expand_rotate(90.0))
}

fn convex_hull(_args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::ConvexHull;
    let mut all = table(kind, "3: 1,1,-  1,0,-  1,-,0")?.expand_rotate(90.0);
    all.extend(table(kind, "3: 1,1,1  1,0,-  -,-,0")?.expand_rotate(90.0));
    Ok(all)
}

fn skeleton(args: &GeometryArgs) -> KernelResult<KernelList> {
    let kind = KernelKind::Skeleton;
    match args.rho as i64 {
        // Cyclic skeleton with more forgiving corners
        2 => {
            let mut pair = thin_se(482, 0.0, kind)?;
            pair.extend(thin_se(87, 90.0, kind)?);
            Ok(pair.expand_rotate(90.0))
        }
        // Bloomberg's connectivity-preserving set
        3 => {
            let mut set = thin_se(41, 0.0, kind)?;
            set.extend(thin_se(42, 0.0, kind)?);
            set.extend(thin_se(43, 0.0, kind)?);
            Ok(set.expand_mirror())
        }
        _ => Ok(thin_se(482, 0.0, kind)?.expand_rotate(45.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::KernelRegistry;

    fn count(name: &str, args: &str) -> usize {
        KernelRegistry::standard().build(name, args).unwrap().len()
    }

    #[test]
    fn test_set_sizes() {
        assert_eq!(count("Edges", ""), 4);
        assert_eq!(count("Corners", ""), 4);
        assert_eq!(count("Diagonals", ""), 8);
        assert_eq!(count("Diagonals", "1"), 1);
        assert_eq!(count("LineEnds", ""), 8);
        assert_eq!(count("LineJunctions", ""), 12);
        assert_eq!(count("Ridges", ""), 2);
        assert_eq!(count("Ridges", "2"), 12);
        assert_eq!(count("ConvexHull", ""), 8);
        assert_eq!(count("Skeleton", ""), 8);
        assert_eq!(count("Skeleton", "2"), 8);
        assert_eq!(count("Skeleton", "3"), 12);
    }

    #[test]
    fn test_thin_se_origin_masked() {
        for variant in ["41", "49", "81", "89", "423", "823", "481", "482", "7"] {
            let list = KernelRegistry::standard().build("ThinSE", variant).unwrap();
            assert_eq!(list.first().get(1, 1), None, "ThinSE:{variant}");
        }
    }

    #[test]
    fn test_kinds_are_tagged() {
        let list = KernelRegistry::standard().build("Skeleton", "2").unwrap();
        assert!(list.iter().all(|k| k.kind() == KernelKind::Skeleton));
    }

    #[test]
    fn test_thin_se_rotation() {
        let list = KernelRegistry::standard().build("ThinSE", "482,90").unwrap();
        let k = list.first();
        assert_eq!(k.get(0, 2), Some(1.0));
        assert_eq!(k.get(0, 0), Some(0.0));
    }
}
