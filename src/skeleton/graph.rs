use crate::math::{Point2, Vector2, TOLERANCE};
use crate::polygon::PolygonWithHoles;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Unique identifier for a node in a skeleton graph.
    pub struct NodeId;
}

/// A skeleton node: a plane position plus the wavefront time at which it
/// was created. Input vertices are nodes with time zero.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonNode {
    pub position: Point2,
    pub time: f64,
}

/// A skeleton arc: the segment traced by one wavefront vertex between two
/// nodes. `start` is always the earlier node. The arc separates the two
/// wavefront faces named by `face_left` and `face_right`.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonArc {
    pub start: NodeId,
    pub end: NodeId,
    pub face_left: usize,
    pub face_right: usize,
}

/// Classification of a skeleton arc, following the border/spoke/skeleton
/// taxonomy of the classic CGAL-style output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    /// Connects an input boundary vertex to an interior node.
    Spoke,
    /// Connects two interior nodes.
    Ridge,
}

/// One wavefront face: the region swept by a single input edge. Direction
/// and inward normal are fixed for the whole simulation.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonFace {
    /// Start point of the originating input edge.
    pub origin: Point2,
    /// Unit direction of the input edge, following loop orientation.
    pub dir: Vector2,
    /// Inward unit normal (left of `dir`).
    pub normal: Vector2,
    /// Index of the loop this edge belongs to (0 = outer).
    pub loop_index: usize,
}

/// The immutable result of one wavefront simulation run.
///
/// Owns every node and arc the simulation emitted, the face table, and the
/// canonical input polygon. All queries are read-only; a `&SkeletonGraph`
/// may be shared freely across threads.
#[derive(Debug)]
pub struct SkeletonGraph {
    nodes: SlotMap<NodeId, SkeletonNode>,
    arcs: Vec<SkeletonArc>,
    faces: Vec<SkeletonFace>,
    face_arcs: Vec<Vec<usize>>,
    polygon: PolygonWithHoles,
    max_time: f64,
}

impl SkeletonGraph {
    /// Assembles a graph from simulation output, indexing arcs by face and
    /// recording the maximum creation time.
    pub(crate) fn assemble(
        nodes: SlotMap<NodeId, SkeletonNode>,
        arcs: Vec<SkeletonArc>,
        faces: Vec<SkeletonFace>,
        polygon: PolygonWithHoles,
    ) -> Self {
        let max_time = nodes
            .values()
            .map(|n| n.time)
            .fold(0.0f64, f64::max);

        let mut face_arcs = vec![Vec::new(); faces.len()];
        for (i, arc) in arcs.iter().enumerate() {
            face_arcs[arc.face_left].push(i);
            face_arcs[arc.face_right].push(i);
        }

        Self {
            nodes,
            arcs,
            faces,
            face_arcs,
            polygon,
            max_time,
        }
    }

    /// The largest creation time of any node: the distance at which the
    /// wavefront fully collapses. Offsets at or beyond this are empty.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Node lookup. Arcs only ever reference live nodes, so this indexes
    /// directly.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SkeletonNode {
        &self.nodes[id]
    }

    /// Number of skeleton nodes, input vertices included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of skeleton arcs.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// All arcs in emission order.
    #[must_use]
    pub fn arcs(&self) -> &[SkeletonArc] {
        &self.arcs
    }

    /// Iterates the nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &SkeletonNode> {
        self.nodes.values()
    }

    /// The face table, indexed by the face numbers carried on arcs.
    #[must_use]
    pub fn faces(&self) -> &[SkeletonFace] {
        &self.faces
    }

    /// Indices of the arcs bounding the given face.
    #[must_use]
    pub fn arcs_of_face(&self, face: usize) -> &[usize] {
        &self.face_arcs[face]
    }

    /// The validated input polygon the skeleton was built from.
    #[must_use]
    pub fn polygon(&self) -> &PolygonWithHoles {
        &self.polygon
    }

    /// Classifies an arc as spoke (boundary vertex to interior) or ridge
    /// (interior to interior).
    #[must_use]
    pub fn arc_kind(&self, arc: &SkeletonArc) -> ArcKind {
        if self.nodes[arc.start].time < TOLERANCE {
            ArcKind::Spoke
        } else {
            ArcKind::Ridge
        }
    }

    /// All arcs as endpoint coordinate pairs, ordering unspecified.
    #[must_use]
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        self.arcs
            .iter()
            .map(|a| (self.nodes[a.start].position, self.nodes[a.end].position))
            .collect()
    }

    /// All arcs as flat endpoint quadruples `[x0, y0, x1, y1]`; element
    /// count equals [`Self::arc_count`].
    #[must_use]
    pub fn segments_flat(&self) -> Vec<[f64; 4]> {
        self.arcs
            .iter()
            .map(|a| {
                let s = self.nodes[a.start].position;
                let e = self.nodes[a.end].position;
                [s.x, s.y, e.x, e.y]
            })
            .collect()
    }

    /// The input polygon's own edges, for consumers that also draw the
    /// boundary alongside the skeleton.
    #[must_use]
    pub fn border_segments(&self) -> Vec<(Point2, Point2)> {
        let mut out = Vec::with_capacity(self.polygon.vertex_count());
        for ring in self.polygon.loops() {
            let pts = &ring.points;
            for i in 0..pts.len() {
                out.push((pts[i], pts[(i + 1) % pts.len()]));
            }
        }
        out
    }

    /// Length of the longest arc, by Euclidean distance.
    #[must_use]
    pub fn longest_arc_length(&self) -> f64 {
        self.arcs
            .iter()
            .map(|a| (self.nodes[a.end].position - self.nodes[a.start].position).norm())
            .fold(0.0f64, f64::max)
    }
}
