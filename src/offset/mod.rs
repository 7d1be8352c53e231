mod slice;
mod stitch;

use crate::math::TOLERANCE;
use crate::polygon::PolygonLoop;
use crate::skeleton::graph::SkeletonGraph;

/// Extracts the inward-offset loops of a skeleton at a fixed distance.
///
/// A query is a pure read against the graph: it allocates a fresh result
/// and leaves no state behind, so any number of queries may run
/// concurrently against the same graph.
#[derive(Debug)]
pub struct OffsetQuery<'a> {
    graph: &'a SkeletonGraph,
    distance: f64,
}

impl<'a> OffsetQuery<'a> {
    /// Creates an offset query at the given non-negative distance.
    #[must_use]
    pub fn new(graph: &'a SkeletonGraph, distance: f64) -> Self {
        Self { graph, distance }
    }

    /// Executes the query.
    ///
    /// Distance zero returns the input loops verbatim; a distance at or
    /// beyond the skeleton's maximum time returns an empty list, which is
    /// a valid result and not an error. In between, every skeleton arc
    /// straddling the distance contributes one interpolated crossing, and
    /// the crossings are chained face by face into closed loops. The loop
    /// set only changes at recorded event times.
    #[must_use]
    pub fn execute(&self) -> Vec<PolygonLoop> {
        if self.distance < TOLERANCE {
            return self.graph.polygon().loops().cloned().collect();
        }
        if self.distance >= self.graph.max_time() {
            return Vec::new();
        }

        let crossings = slice::arc_crossings(self.graph, self.distance);
        let segments = slice::face_segments(self.graph, &crossings);
        stitch::connect(&segments)
    }
}
