use crate::math::Point2;
use crate::skeleton::graph::SkeletonGraph;
use crate::skeleton::wavefront::TIME_EPS;

/// One in-face piece of the offset curve at a fixed distance: it enters the
/// face through one arc crossing and exits through another, running along
/// the face direction.
#[derive(Debug, Clone, Copy)]
pub(super) struct FaceSegment {
    pub enter_arc: usize,
    pub exit_arc: usize,
    pub enter: Point2,
    pub exit: Point2,
}

/// Computes the crossing point of every arc whose endpoint times straddle
/// `distance`, indexed by arc number.
///
/// Arcs are active on the half-open interval `[t0, t1)`, so a query exactly
/// at an event time sees the post-event topology. Instant arcs (`t0 == t1`)
/// never cross.
pub(super) fn arc_crossings(graph: &SkeletonGraph, distance: f64) -> Vec<Option<Point2>> {
    graph
        .arcs()
        .iter()
        .map(|arc| {
            let n0 = graph.node(arc.start);
            let n1 = graph.node(arc.end);
            let span = n1.time - n0.time;
            if span <= TIME_EPS {
                return None;
            }
            if distance < n0.time || distance >= n1.time {
                return None;
            }
            let s = (distance - n0.time) / span;
            Some(Point2::new(
                n0.position.x + (n1.position.x - n0.position.x) * s,
                n0.position.y + (n1.position.y - n0.position.y) * s,
            ))
        })
        .collect()
}

/// Groups crossings by face, sorts them along the face direction, and
/// pairs them into in-face segments.
///
/// Within one face the offset line alternates between inside and outside
/// the face, so consecutive sorted crossings bound the inside intervals.
pub(super) fn face_segments(
    graph: &SkeletonGraph,
    crossings: &[Option<Point2>],
) -> Vec<FaceSegment> {
    let mut segments = Vec::new();
    for (face_index, face) in graph.faces().iter().enumerate() {
        let mut hits: Vec<(f64, usize, Point2)> = graph
            .arcs_of_face(face_index)
            .iter()
            .filter_map(|&arc| crossings[arc].map(|p| (p.coords.dot(&face.dir), arc, p)))
            .collect();
        if hits.len() < 2 {
            continue;
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        // An odd count means a crossing landed exactly on a face corner and
        // was attributed once; the unpaired tail carries no interval.
        for pair in hits.chunks_exact(2) {
            segments.push(FaceSegment {
                enter_arc: pair[0].1,
                exit_arc: pair[1].1,
                enter: pair[0].2,
                exit: pair[1].2,
            });
        }
    }
    segments
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::polygon::{PolygonLoop, PolygonWithHoles};
    use crate::skeleton::WavefrontSimulator;

    fn square_graph() -> SkeletonGraph {
        let polygon = PolygonWithHoles::new(
            PolygonLoop::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            vec![],
        )
        .unwrap();
        WavefrontSimulator::new(polygon).execute().unwrap()
    }

    #[test]
    fn all_spokes_cross_at_interior_distance() {
        let graph = square_graph();
        let crossings = arc_crossings(&graph, 1.0);
        assert_eq!(crossings.iter().filter(|c| c.is_some()).count(), 4);
    }

    #[test]
    fn no_crossings_at_or_beyond_max_time() {
        let graph = square_graph();
        assert!(arc_crossings(&graph, 2.0).iter().all(Option::is_none));
        assert!(arc_crossings(&graph, 3.0).iter().all(Option::is_none));
    }

    #[test]
    fn crossing_interpolates_along_arc() {
        let graph = square_graph();
        let crossings = arc_crossings(&graph, 1.0);
        // Every spoke runs corner -> center; at half the collapse time the
        // crossing sits halfway along the diagonal.
        for (arc, crossing) in graph.arcs().iter().zip(&crossings) {
            let p = crossing.unwrap();
            let corner = graph.node(arc.start).position;
            assert!((p.x - (corner.x + 2.0) * 0.5).abs() < 1e-9);
            assert!((p.y - (corner.y + 2.0) * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn each_face_pairs_its_two_crossings() {
        let graph = square_graph();
        let crossings = arc_crossings(&graph, 1.0);
        let segments = face_segments(&graph, &crossings);
        assert_eq!(segments.len(), 4);
        for seg in &segments {
            assert!(seg.enter_arc != seg.exit_arc);
            assert!((seg.exit - seg.enter).norm() > 0.5);
        }
    }
}
