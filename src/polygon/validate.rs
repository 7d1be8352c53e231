use super::PolygonLoop;
use crate::error::{PolygonError, Result};
use crate::math::intersect_2d::{segment_segment_intersect_2d, segments_properly_intersect_2d};
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::{Point2, TOLERANCE};

/// Runs the full validation pipeline over the outer loop and holes.
///
/// Loop index 0 is the outer loop; holes are numbered from 1 in the order
/// supplied. Checks run cheapest-first so the reported error is the most
/// fundamental violation.
pub fn check(outer: &PolygonLoop, holes: &[PolygonLoop]) -> Result<()> {
    check_loop(outer, 0, true)?;
    for (i, hole) in holes.iter().enumerate() {
        check_loop(hole, i + 1, false)?;
    }

    for (i, hole) in holes.iter().enumerate() {
        check_hole_inside_outer(outer, hole, i)?;
    }

    // Pairwise disjointness: holes against each other.
    for i in 0..holes.len() {
        for j in (i + 1)..holes.len() {
            check_loops_disjoint(&holes[i], &holes[j], i + 1, j + 1)?;
        }
    }

    Ok(())
}

/// Per-loop checks: vertex count, finiteness, duplicates, area,
/// orientation, self-intersection.
fn check_loop(ring: &PolygonLoop, loop_index: usize, is_outer: bool) -> Result<()> {
    let pts = &ring.points;
    let n = pts.len();

    if n < 3 {
        return Err(PolygonError::TooFewVertices {
            loop_index,
            count: n,
        }
        .into());
    }

    for (vertex, p) in pts.iter().enumerate() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(PolygonError::NonFiniteCoordinate { loop_index, vertex }.into());
        }
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let d = pts[j] - pts[i];
        if d.norm() < TOLERANCE {
            return Err(PolygonError::DuplicateVertex {
                loop_index,
                vertex: j,
            }
            .into());
        }
    }

    let area = ring.signed_area();
    if area.abs() < TOLERANCE {
        return Err(PolygonError::ZeroArea { loop_index }.into());
    }

    // Orientation is a contract, not a suggestion: wrong winding is
    // rejected rather than silently reversed.
    let (expected, ok) = if is_outer {
        ("counter-clockwise", area > 0.0)
    } else {
        ("clockwise", area < 0.0)
    };
    if !ok {
        let found = if area > 0.0 {
            "counter-clockwise"
        } else {
            "clockwise"
        };
        return Err(PolygonError::WrongOrientation {
            loop_index,
            expected,
            found,
        }
        .into());
    }

    check_simple(ring, loop_index)
}

/// Self-intersection scan over all non-adjacent edge pairs.
fn check_simple(ring: &PolygonLoop, loop_index: usize) -> Result<()> {
    let pts = &ring.points;
    let n = pts.len();
    if n < 4 {
        // A triangle with distinct vertices cannot self-intersect.
        return Ok(());
    }

    for i in 0..n {
        let i_next = (i + 1) % n;
        for j in (i + 2)..n {
            let j_next = (j + 1) % n;
            // Skip the pair sharing the wrap-around vertex.
            if j_next == i {
                continue;
            }
            if segments_properly_intersect_2d(&pts[i], &pts[i_next], &pts[j], &pts[j_next]) {
                return Err(PolygonError::SelfIntersection {
                    loop_index,
                    edge_a: i,
                    edge_b: j,
                }
                .into());
            }
        }
    }
    Ok(())
}

/// A hole must lie strictly inside the outer loop: no edge crossings and
/// every vertex interior.
fn check_hole_inside_outer(outer: &PolygonLoop, hole: &PolygonLoop, hole_index: usize) -> Result<()> {
    for (a0, a1) in edges(hole) {
        for (b0, b1) in edges(outer) {
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return Err(PolygonError::HoleOutsideBoundary { hole_index }.into());
            }
        }
    }
    for p in &hole.points {
        if !point_in_polygon_2d(&outer.points, p) {
            return Err(PolygonError::HoleOutsideBoundary { hole_index }.into());
        }
    }
    Ok(())
}

/// Two hole loops must not cross, touch, or nest.
fn check_loops_disjoint(
    a: &PolygonLoop,
    b: &PolygonLoop,
    loop_a: usize,
    loop_b: usize,
) -> Result<()> {
    for (a0, a1) in edges(a) {
        for (b0, b1) in edges(b) {
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return Err(PolygonError::LoopsIntersect { loop_a, loop_b }.into());
            }
        }
    }
    // No edge crossings: nesting would put every vertex of one inside the other.
    if point_in_polygon_2d(&a.points, &b.points[0]) || point_in_polygon_2d(&b.points, &a.points[0])
    {
        return Err(PolygonError::LoopsIntersect { loop_a, loop_b }.into());
    }
    Ok(())
}

fn edges(ring: &PolygonLoop) -> impl Iterator<Item = (&Point2, &Point2)> {
    let pts = &ring.points;
    let n = pts.len();
    (0..n).map(move |i| (&pts[i], &pts[(i + 1) % n]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SkelisError;
    use crate::polygon::PolygonWithHoles;

    fn ccw_square() -> PolygonLoop {
        PolygonLoop::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)])
    }

    fn expect_polygon_err(result: crate::error::Result<PolygonWithHoles>) -> PolygonError {
        match result {
            Err(SkelisError::Polygon(e)) => e,
            other => panic!("expected polygon error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_too_few_vertices() {
        let two = PolygonLoop::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(two, vec![]));
        assert!(matches!(err, PolygonError::TooFewVertices { count: 2, .. }));
    }

    #[test]
    fn rejects_nan_coordinates() {
        let bad = PolygonLoop::from_coords(&[(0.0, 0.0), (1.0, f64::NAN), (1.0, 1.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(bad, vec![]));
        assert!(matches!(
            err,
            PolygonError::NonFiniteCoordinate { vertex: 1, .. }
        ));
    }

    #[test]
    fn rejects_infinite_coordinates() {
        let bad = PolygonLoop::from_coords(&[(0.0, 0.0), (f64::INFINITY, 0.0), (1.0, 1.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(bad, vec![]));
        assert!(matches!(err, PolygonError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn rejects_duplicate_vertices() {
        let bad = PolygonLoop::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(bad, vec![]));
        assert!(matches!(err, PolygonError::DuplicateVertex { vertex: 2, .. }));
    }

    #[test]
    fn rejects_cw_outer() {
        let cw = PolygonLoop::from_coords(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(cw, vec![]));
        assert!(matches!(
            err,
            PolygonError::WrongOrientation { loop_index: 0, .. }
        ));
    }

    #[test]
    fn rejects_ccw_hole() {
        let ccw_hole = PolygonLoop::from_coords(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(ccw_square(), vec![ccw_hole]));
        assert!(matches!(
            err,
            PolygonError::WrongOrientation { loop_index: 1, .. }
        ));
    }

    #[test]
    fn rejects_self_intersecting_loop() {
        // One edge dips below the bottom edge and crosses it.
        let crossed = PolygonLoop::from_coords(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
            (2.0, -1.0),
            (0.0, 3.0),
        ]);
        let err = expect_polygon_err(PolygonWithHoles::new(crossed, vec![]));
        assert!(matches!(err, PolygonError::SelfIntersection { .. }));
    }

    #[test]
    fn zero_area_figure_eight_is_rejected() {
        // The classic bow tie nets out to zero signed area and is caught
        // by the area check before the intersection scan.
        let bow = PolygonLoop::from_coords(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(bow, vec![]));
        assert!(matches!(err, PolygonError::ZeroArea { .. }));
    }

    #[test]
    fn rejects_collinear_zero_area_loop() {
        let flat = PolygonLoop::from_coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(flat, vec![]));
        assert!(matches!(err, PolygonError::ZeroArea { .. }));
    }

    #[test]
    fn rejects_hole_outside_boundary() {
        let outside = PolygonLoop::from_coords(&[(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (6.0, 5.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(ccw_square(), vec![outside]));
        assert!(matches!(
            err,
            PolygonError::HoleOutsideBoundary { hole_index: 0 }
        ));
    }

    #[test]
    fn rejects_hole_crossing_boundary() {
        let crossing = PolygonLoop::from_coords(&[(3.0, 1.0), (3.0, 3.0), (5.0, 3.0), (5.0, 1.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(ccw_square(), vec![crossing]));
        assert!(matches!(err, PolygonError::HoleOutsideBoundary { .. }));
    }

    #[test]
    fn rejects_overlapping_holes() {
        let h1 = PolygonLoop::from_coords(&[(1.0, 1.0), (1.0, 2.5), (2.5, 2.5), (2.5, 1.0)]);
        let h2 = PolygonLoop::from_coords(&[(2.0, 2.0), (2.0, 3.5), (3.5, 3.5), (3.5, 2.0)]);
        let err = expect_polygon_err(PolygonWithHoles::new(ccw_square(), vec![h1, h2]));
        assert!(matches!(
            err,
            PolygonError::LoopsIntersect { loop_a: 1, loop_b: 2 }
        ));
    }

    #[test]
    fn accepts_disjoint_holes() {
        let h1 = PolygonLoop::from_coords(&[(0.5, 0.5), (0.5, 1.5), (1.5, 1.5), (1.5, 0.5)]);
        let h2 = PolygonLoop::from_coords(&[(2.5, 2.5), (2.5, 3.5), (3.5, 3.5), (3.5, 2.5)]);
        assert!(PolygonWithHoles::new(ccw_square(), vec![h1, h2]).is_ok());
    }
}
