use super::slice::FaceSegment;
use crate::math::{Point2, TOLERANCE};
use crate::polygon::PolygonLoop;
use std::collections::HashMap;

/// Chains face segments into closed loops.
///
/// Each crossed arc carries the offset curve from one face into the
/// adjacent one: the segment exiting through an arc continues as the
/// segment entering through the same arc on the other side.
pub(super) fn connect(segments: &[FaceSegment]) -> Vec<PolygonLoop> {
    let by_enter: HashMap<usize, usize> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| (seg.enter_arc, i))
        .collect();

    let mut visited = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if visited[start] {
            continue;
        }
        let mut points = Vec::new();
        let mut current = start;
        loop {
            visited[current] = true;
            points.push(segments[current].enter);
            let Some(&next) = by_enter.get(&segments[current].exit_arc) else {
                // Broken chain; drop the fragment rather than emit an open
                // polyline as a loop.
                points.clear();
                break;
            };
            if next == start {
                break;
            }
            if visited[next] {
                points.clear();
                break;
            }
            current = next;
        }

        let ring = dedupe(points);
        if ring.len() >= 3 {
            loops.push(PolygonLoop::new(ring));
        }
    }
    loops
}

/// Removes consecutive duplicates (and a duplicated closing point) left by
/// crossings that landed exactly on a skeleton node.
fn dedupe(points: Vec<Point2>) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if let Some(last) = out.last() {
            if (p - last).norm() < TOLERANCE {
                continue;
            }
        }
        out.push(p);
    }
    while out.len() > 1 {
        let first = out[0];
        let last = out[out.len() - 1];
        if (first - last).norm() < TOLERANCE {
            out.pop();
        } else {
            break;
        }
    }
    out
}
