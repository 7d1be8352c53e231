use crate::math::polygon_2d::{cross_2d, left_normal, segment_direction};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::polygon::PolygonWithHoles;
use crate::skeleton::graph::{NodeId, SkeletonFace};

/// Outcome of resolving a vertex velocity from its two face normals.
#[derive(Debug, Clone, Copy)]
pub enum Velocity {
    /// The vertex moves so that both adjacent faces advance at unit speed.
    Moving(Vector2),
    /// The two faces are antiparallel: the local wavefront is a zero-width
    /// strip that vanishes the instant it forms. The vertex keeps its spawn
    /// position and waits for the event that retires its loop.
    Frozen,
}

/// Solves `v · n_left = 1, v · n_right = 1` for the vertex velocity.
///
/// A straight angle degenerates to the shared edge normal. Returns
/// [`Velocity::Frozen`] when the normals are antiparallel within `eps`.
#[must_use]
pub fn resolve_velocity(n_left: Vector2, n_right: Vector2, eps: f64) -> Velocity {
    let det = cross_2d(n_left, n_right);
    if det.abs() > eps {
        return Velocity::Moving(Vector2::new(
            (n_right.y - n_left.y) / det,
            (n_left.x - n_right.x) / det,
        ));
    }
    if n_left.dot(&n_right) > 0.0 {
        // Straight angle: both normals agree, the vertex rides the edge normal.
        let mid = n_left + n_right;
        let len = mid.norm();
        if len > eps {
            return Velocity::Moving(mid / len);
        }
    }
    Velocity::Frozen
}

/// One vertex of the active wavefront.
///
/// Vertices are appended to a grow-only arena and linked into circular
/// loops through `prev`/`next`; surgery relinks indices and flips `active`
/// rather than removing entries. `version` increments whenever the vertex's
/// adjacency or kinematics change, invalidating queued events that
/// captured the old state.
#[derive(Debug, Clone)]
pub struct WavefrontVertex {
    pub spawn_pos: Point2,
    pub spawn_time: f64,
    pub velocity: Vector2,
    pub prev: usize,
    pub next: usize,
    /// Face of the edge arriving at this vertex (between `prev` and self).
    pub face_left: usize,
    /// Face of the edge leaving this vertex (between self and `next`).
    pub face_right: usize,
    pub reflex: bool,
    pub active: bool,
    pub version: u64,
    /// Skeleton node this vertex emanates from.
    pub source: NodeId,
}

/// The active wavefront: a vertex arena plus the static face table.
#[derive(Debug, Default)]
pub struct Front {
    pub vertices: Vec<WavefrontVertex>,
    pub faces: Vec<SkeletonFace>,
    pub active_count: usize,
}

impl Front {
    /// Builds the face table for every edge of every loop of the polygon.
    ///
    /// Returns `None` if any edge has zero length (validation rejects that
    /// earlier, so this is a belt for internal callers).
    #[must_use]
    pub fn build_faces(polygon: &PolygonWithHoles) -> Option<Vec<SkeletonFace>> {
        let mut faces = Vec::with_capacity(polygon.vertex_count());
        for (loop_index, ring) in polygon.loops().enumerate() {
            let pts = &ring.points;
            let n = pts.len();
            for i in 0..n {
                let dir = segment_direction(&pts[i], &pts[(i + 1) % n])?;
                faces.push(SkeletonFace {
                    origin: pts[i],
                    dir,
                    normal: left_normal(dir),
                    loop_index,
                });
            }
        }
        Some(faces)
    }

    /// Position of a vertex at absolute time `t`.
    #[must_use]
    pub fn position_at(&self, idx: usize, t: f64) -> Point2 {
        let v = &self.vertices[idx];
        v.spawn_pos + v.velocity * (t - v.spawn_time)
    }

    /// Whether the interior angle at a vertex bounded by the two given
    /// faces is reflex (interior angle greater than pi).
    #[must_use]
    pub fn is_reflex(&self, face_left: usize, face_right: usize) -> bool {
        cross_2d(self.faces[face_left].dir, self.faces[face_right].dir) < -TOLERANCE
    }

    /// Appends a new active vertex and returns its index. Linkage is set
    /// separately via [`Front::link`].
    pub fn push_vertex(
        &mut self,
        spawn_pos: Point2,
        spawn_time: f64,
        velocity: Vector2,
        face_left: usize,
        face_right: usize,
        source: NodeId,
    ) -> usize {
        let idx = self.vertices.len();
        let reflex = self.is_reflex(face_left, face_right);
        self.vertices.push(WavefrontVertex {
            spawn_pos,
            spawn_time,
            velocity,
            prev: idx,
            next: idx,
            face_left,
            face_right,
            reflex,
            active: true,
            version: 0,
            source,
        });
        self.active_count += 1;
        idx
    }

    /// Links `a -> b` in loop order.
    pub fn link(&mut self, a: usize, b: usize) {
        self.vertices[a].next = b;
        self.vertices[b].prev = a;
    }

    /// Retires a vertex from the wavefront and bumps its version.
    pub fn retire(&mut self, idx: usize) {
        let v = &mut self.vertices[idx];
        if v.active {
            v.active = false;
            self.active_count -= 1;
        }
        v.version += 1;
    }

    /// Bumps a vertex's version without retiring it, invalidating queued
    /// events that reference its current state.
    pub fn touch(&mut self, idx: usize) {
        self.vertices[idx].version += 1;
    }

    #[must_use]
    pub fn is_active(&self, idx: usize) -> bool {
        self.vertices[idx].active
    }

    #[must_use]
    pub fn version(&self, idx: usize) -> u64 {
        self.vertices[idx].version
    }
}
