mod events;
mod front;

pub use events::TIME_EPS;

use crate::error::{Result, SkeletonError};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::polygon::PolygonWithHoles;
use crate::skeleton::graph::{NodeId, SkeletonArc, SkeletonGraph, SkeletonNode};
use events::{
    edge_event_candidate, split_event_candidate, within_edge_extent, EventKind, QueuedEvent,
};
use front::{resolve_velocity, Front, Velocity};
use slotmap::SlotMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Spatial tolerance for coalescing skeleton nodes created by distinct
/// events at the same time and place.
const MERGE_EPS: f64 = 1e-7;

/// Base epsilon for the relaxation ladder applied to event consistency
/// checks before giving up on a construction.
const GEOM_EPS: f64 = 1e-9;

/// Tunables for one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    /// Hard cap on processed events. `None` scales with input size.
    pub event_budget: Option<usize>,
    /// How many times a failing consistency check is retried with a
    /// tenfold-relaxed epsilon before construction fails.
    pub epsilon_retries: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            event_budget: None,
            epsilon_retries: 4,
        }
    }
}

/// Simulates inward propagation of the polygon boundary at unit normal
/// speed and records every topology change as skeleton nodes and arcs.
///
/// The simulation is inherently sequential: each event's outcome feeds the
/// next, so one run owns all its state and runs on the calling thread.
#[derive(Debug)]
pub struct WavefrontSimulator {
    polygon: PolygonWithHoles,
    params: SimulationParams,
}

impl WavefrontSimulator {
    /// Creates a simulator for a validated polygon with default parameters.
    #[must_use]
    pub fn new(polygon: PolygonWithHoles) -> Self {
        Self {
            polygon,
            params: SimulationParams::default(),
        }
    }

    /// Overrides the simulation parameters.
    #[must_use]
    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Runs the simulation to full wavefront collapse.
    ///
    /// # Errors
    ///
    /// Returns `SkeletonError::ConstructionFailed` on unrecoverable
    /// geometric degeneracy, or `SkeletonError::BudgetExceeded` when the
    /// event budget runs out on pathological input. Construction is
    /// all-or-nothing: no partial skeleton is returned.
    pub fn execute(self) -> Result<SkeletonGraph> {
        let n = self.polygon.vertex_count();
        let budget = self
            .params
            .event_budget
            .unwrap_or_else(|| 256 + 64 * n * n);

        let mut sim = Simulation {
            front: Front::default(),
            queue: BinaryHeap::new(),
            nodes: SlotMap::with_key(),
            arcs: Vec::new(),
            recent_nodes: Vec::new(),
            recent_time: 0.0,
            retries: self.params.epsilon_retries,
        };
        sim.initialize(&self.polygon)?;
        sim.run(budget)?;

        let Simulation {
            front, nodes, arcs, ..
        } = sim;
        Ok(SkeletonGraph::assemble(nodes, arcs, front.faces, self.polygon))
    }
}

struct Simulation {
    front: Front,
    queue: BinaryHeap<Reverse<QueuedEvent>>,
    nodes: SlotMap<NodeId, SkeletonNode>,
    arcs: Vec<SkeletonArc>,
    /// Nodes created within the current time window, candidates for
    /// coalescing simultaneous events at one point.
    recent_nodes: Vec<NodeId>,
    recent_time: f64,
    retries: u32,
}

impl Simulation {
    /// Seeds the front: one face per input edge, one vertex and one
    /// time-zero node per input vertex, plus the initial event candidates.
    fn initialize(&mut self, polygon: &PolygonWithHoles) -> Result<()> {
        let faces = Front::build_faces(polygon).ok_or_else(|| {
            construction_failed("zero-length input edge survived validation", 0.0, 0.0)
        })?;
        self.front.faces = faces;

        let mut face_base = 0usize;
        for ring in polygon.loops() {
            let pts = &ring.points;
            let count = pts.len();
            let first = self.front.vertices.len();
            for i in 0..count {
                let face_left = face_base + (i + count - 1) % count;
                let face_right = face_base + i;
                let nl = self.front.faces[face_left].normal;
                let nr = self.front.faces[face_right].normal;
                let velocity = match resolve_velocity(nl, nr, TOLERANCE) {
                    Velocity::Moving(v) => v,
                    Velocity::Frozen => {
                        // A needle vertex: two antiparallel edges meeting at
                        // a point. Validation screens these, so reaching
                        // here means the input is numerically degenerate.
                        return Err(construction_failed(
                            "degenerate needle vertex",
                            pts[i].x,
                            pts[i].y,
                        ));
                    }
                };
                let source = self.nodes.insert(SkeletonNode {
                    position: pts[i],
                    time: 0.0,
                });
                self.front
                    .push_vertex(pts[i], 0.0, velocity, face_left, face_right, source);
            }
            for i in 0..count {
                self.front.link(first + i, first + (i + 1) % count);
            }
            face_base += count;
        }

        for idx in 0..self.front.vertices.len() {
            self.push_edge_candidate(idx, 0.0);
            self.push_split_candidate(idx, 0.0);
        }
        Ok(())
    }

    /// Pops and applies events in time order until the wavefront is gone.
    fn run(&mut self, budget: usize) -> Result<()> {
        let mut processed = 0usize;
        while self.front.active_count > 0 {
            let Some(Reverse(event)) = self.queue.pop() else {
                break;
            };
            processed += 1;
            if processed > budget {
                return Err(SkeletonError::BudgetExceeded {
                    events: processed,
                    budget,
                }
                .into());
            }

            if self.is_stale(&event) {
                // A stale split candidate means the reflex vertex lost its
                // target; rescan so it is not orphaned.
                if event.kind == EventKind::Split && self.front.is_active(event.vertex) {
                    self.push_split_candidate(event.vertex, event.time);
                }
                continue;
            }

            match event.kind {
                EventKind::Edge => self.apply_edge_event(&event)?,
                EventKind::Split => self.apply_split_event(&event)?,
            }
        }

        if self.front.active_count > 0 {
            let idx = self
                .front
                .vertices
                .iter()
                .position(|v| v.active)
                .unwrap_or(0);
            let p = self.front.vertices[idx].spawn_pos;
            return Err(construction_failed(
                "wavefront failed to collapse",
                p.x,
                p.y,
            ));
        }
        Ok(())
    }

    fn is_stale(&self, event: &QueuedEvent) -> bool {
        let v = event.vertex;
        let o = event.other;
        if !self.front.is_active(v) || !self.front.is_active(o) {
            return true;
        }
        if event.versions != (self.front.version(v), self.front.version(o)) {
            return true;
        }
        event.kind == EventKind::Edge && self.front.vertices[v].next != o
    }

    /// The collapsing edge's endpoints merge into one node; the loop loses
    /// a vertex. Two- and three-vertex loops retire entirely.
    fn apply_edge_event(&mut self, event: &QueuedEvent) -> Result<()> {
        let a = event.vertex;
        let b = event.other;
        let t = event.time;

        let pa = self.front.position_at(a, t);
        let pb = self.front.position_at(b, t);
        self.ensure_within((pb - pa).norm(), &pa, "edge endpoints fail to converge")?;
        let p = Point2::new((pa.x + pb.x) * 0.5, (pa.y + pb.y) * 0.5);
        let node = self.node_at(p, t);

        let prev = self.front.vertices[a].prev;
        let next = self.front.vertices[b].next;
        let face_left = self.front.vertices[a].face_left;
        let face_right = self.front.vertices[b].face_right;

        self.emit_arc(a, node);
        self.emit_arc(b, node);
        self.front.retire(a);
        self.front.retire(b);

        if prev == b {
            // The edge was one side of a two-vertex loop; both are gone.
            return Ok(());
        }
        if prev == next {
            // Three-vertex loop: the survivor dies at the same instant.
            self.emit_arc(prev, node);
            self.front.retire(prev);
            return Ok(());
        }

        let velocity = match resolve_velocity(
            self.front.faces[face_left].normal,
            self.front.faces[face_right].normal,
            TOLERANCE,
        ) {
            Velocity::Moving(v) => v,
            Velocity::Frozen => Vector2::zeros(),
        };
        let w = self
            .front
            .push_vertex(p, t, velocity, face_left, face_right, node);
        self.front.link(prev, w);
        self.front.link(w, next);

        self.push_edge_candidate(prev, t);
        self.push_edge_candidate(w, t);
        self.push_split_candidate(w, t);
        Ok(())
    }

    /// The reflex vertex pierces an opposing edge: its loop is divided
    /// there, or a hole loop is merged into the outer contour.
    fn apply_split_event(&mut self, event: &QueuedEvent) -> Result<()> {
        let r = event.vertex;
        let a = event.other;
        let t = event.time;
        let b = self.front.vertices[a].next;
        let face = self.front.vertices[a].face_right;
        let p = self.front.position_at(r, t);

        // The versions pin r and a, but the far endpoint may have moved
        // since the candidate was computed; recheck the extent against the
        // live front and rescan on failure.
        if b == r || !within_edge_extent(&self.front, a, b, face, &p, t) {
            self.push_split_candidate(r, t);
            return Ok(());
        }

        let normal = self.front.faces[face].normal;
        let offset0 = normal.dot(&self.front.faces[face].origin.coords);
        let residual = (normal.dot(&p.coords) - (offset0 + t)).abs();
        self.ensure_within(residual, &p, "split point off the target edge")?;

        let node = self.node_at(p, t);
        self.emit_arc(r, node);

        let rp = self.front.vertices[r].prev;
        let rn = self.front.vertices[r].next;
        let r_face_left = self.front.vertices[r].face_left;
        let r_face_right = self.front.vertices[r].face_right;
        self.front.retire(r);
        self.front.touch(a);

        let w1 = self.front.push_vertex(
            p,
            t,
            self.velocity_or_frozen(r_face_left, face),
            r_face_left,
            face,
            node,
        );
        let w2 = self.front.push_vertex(
            p,
            t,
            self.velocity_or_frozen(face, r_face_right),
            face,
            r_face_right,
            node,
        );
        self.front.link(rp, w1);
        self.front.link(w1, b);
        self.front.link(a, w2);
        self.front.link(w2, rn);

        // A split can pinch off a zero-width strip whose endpoints are both
        // frozen; no edge event will ever fire for it, so it dies here.
        if !self.retire_static_pair(w1, t) {
            self.push_edge_candidate(rp, t);
            self.push_edge_candidate(w1, t);
            self.push_split_candidate(w1, t);
        }
        if !self.retire_static_pair(w2, t) {
            self.push_edge_candidate(a, t);
            self.push_edge_candidate(w2, t);
            self.push_split_candidate(w2, t);
        }
        Ok(())
    }

    /// Retires a two-vertex loop that has stopped shrinking: both members
    /// die in place and the instant ridge between them is recorded.
    fn retire_static_pair(&mut self, x: usize, t: f64) -> bool {
        let y = self.front.vertices[x].next;
        if y == x || self.front.vertices[x].prev != y {
            return false;
        }
        if edge_event_candidate(&self.front, x, t).is_some()
            || edge_event_candidate(&self.front, y, t).is_some()
        {
            return false;
        }

        let px = self.front.position_at(x, t);
        let py = self.front.position_at(y, t);
        let nx = self.node_at(px, t);
        let ny = self.node_at(py, t);
        self.emit_arc(x, nx);
        self.emit_arc(y, ny);
        let face_left = self.front.vertices[x].face_left;
        let face_right = self.front.vertices[x].face_right;
        self.emit_arc_between(nx, ny, face_left, face_right);
        self.front.retire(x);
        self.front.retire(y);
        true
    }

    fn velocity_or_frozen(&self, face_left: usize, face_right: usize) -> Vector2 {
        match resolve_velocity(
            self.front.faces[face_left].normal,
            self.front.faces[face_right].normal,
            TOLERANCE,
        ) {
            Velocity::Moving(v) => v,
            Velocity::Frozen => Vector2::zeros(),
        }
    }

    fn push_edge_candidate(&mut self, idx: usize, now: f64) {
        if self.front.is_active(idx) {
            if let Some(ev) = edge_event_candidate(&self.front, idx, now) {
                self.queue.push(Reverse(ev));
            }
        }
    }

    fn push_split_candidate(&mut self, idx: usize, now: f64) {
        if self.front.is_active(idx) && self.front.vertices[idx].reflex {
            if let Some(ev) = split_event_candidate(&self.front, idx, now) {
                self.queue.push(Reverse(ev));
            }
        }
    }

    /// Returns the skeleton node for an event at `(p, t)`, reusing a node
    /// created by a simultaneous event at the same point.
    fn node_at(&mut self, p: Point2, t: f64) -> NodeId {
        if (t - self.recent_time).abs() > TIME_EPS * 16.0 {
            self.recent_nodes.clear();
            self.recent_time = t;
        }
        for &id in &self.recent_nodes {
            if (self.nodes[id].position - p).norm() < MERGE_EPS {
                return id;
            }
        }
        let id = self.nodes.insert(SkeletonNode { position: p, time: t });
        self.recent_nodes.push(id);
        id
    }

    /// Emits the arc traced by a dying wavefront vertex from its source
    /// node to the event node. Self-arcs (vertex dying where it spawned)
    /// are dropped.
    fn emit_arc(&mut self, vertex: usize, node: NodeId) {
        let v = &self.front.vertices[vertex];
        let (source, face_left, face_right) = (v.source, v.face_left, v.face_right);
        self.emit_arc_between(source, node, face_left, face_right);
    }

    /// Emits an arc between two existing nodes, earlier node first.
    fn emit_arc_between(&mut self, a: NodeId, b: NodeId, face_left: usize, face_right: usize) {
        if a == b {
            return;
        }
        let (start, end) = if self.nodes[a].time <= self.nodes[b].time {
            (a, b)
        } else {
            (b, a)
        };
        self.arcs.push(SkeletonArc {
            start,
            end,
            face_left,
            face_right,
        });
    }

    /// Accepts `value` if it falls under the base epsilon or any rung of
    /// the relaxation ladder; otherwise fails the construction.
    fn ensure_within(&self, value: f64, near: &Point2, reason: &str) -> Result<()> {
        let mut eps = GEOM_EPS;
        for _ in 0..=self.retries {
            if value <= eps {
                return Ok(());
            }
            eps *= 10.0;
        }
        Err(construction_failed(reason, near.x, near.y))
    }
}

fn construction_failed(reason: &str, x: f64, y: f64) -> crate::error::SkelisError {
    SkeletonError::ConstructionFailed {
        reason: reason.to_owned(),
        x,
        y,
    }
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::polygon::PolygonLoop;
    use crate::skeleton::graph::ArcKind;

    fn build(coords: &[(f64, f64)]) -> SkeletonGraph {
        let polygon =
            PolygonWithHoles::new(PolygonLoop::from_coords(coords), vec![]).unwrap();
        WavefrontSimulator::new(polygon).execute().unwrap()
    }

    #[test]
    fn square_collapses_to_single_peak() {
        let graph = build(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        assert!((graph.max_time() - 2.0).abs() < 1e-9);
        assert_eq!(graph.arc_count(), 4);
        // Exactly one interior node, at the center.
        let peaks: Vec<_> = graph.nodes().filter(|n| n.time > 1e-9).collect();
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].position.x - 2.0).abs() < 1e-9);
        assert!((peaks[0].position.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rectangle_has_ridge_between_two_peaks() {
        let graph = build(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        assert!((graph.max_time() - 1.0).abs() < 1e-9);
        // Four spokes plus the horizontal ridge.
        assert_eq!(graph.arc_count(), 5);
        let ridges: Vec<_> = graph
            .arcs()
            .iter()
            .filter(|a| graph.arc_kind(a) == ArcKind::Ridge)
            .collect();
        assert_eq!(ridges.len(), 1);
        let s = graph.node(ridges[0].start).position;
        let e = graph.node(ridges[0].end).position;
        assert!((s.y - 1.0).abs() < 1e-9);
        assert!((e.y - 1.0).abs() < 1e-9);
        assert!(((s.x - e.x).abs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn regular_hexagon_single_simultaneous_collapse() {
        let n = 6usize;
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                (a.cos(), a.sin())
            })
            .collect();
        let graph = build(&coords);
        // All edge events coincide at the inradius; one peak node.
        let inradius = (std::f64::consts::PI / n as f64).cos();
        assert!((graph.max_time() - inradius).abs() < 1e-9);
        let peaks: Vec<_> = graph.nodes().filter(|nd| nd.time > 1e-9).collect();
        assert_eq!(peaks.len(), 1);
        assert_eq!(graph.arc_count(), n);
    }

    #[test]
    fn l_shape_produces_split_event() {
        // Concave hexagon: the reflex corner at (2, 2) must split the
        // wavefront; the skeleton has interior nodes beyond a single peak.
        let graph = build(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]);
        // Every input vertex contributes a spoke.
        let spokes = graph
            .arcs()
            .iter()
            .filter(|a| graph.arc_kind(a) == ArcKind::Spoke)
            .count();
        assert_eq!(spokes, 6);
        // The narrow legs are 2 wide, so the wavefront dies at offset 1.
        assert!((graph.max_time() - 1.0).abs() < 1e-9);
        assert!(graph.arc_count() > 6, "expected interior ridges");
    }

    #[test]
    fn square_with_centered_hole_collapses_at_ring_midline() {
        let outer = PolygonLoop::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = PolygonLoop::from_coords(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        let polygon = PolygonWithHoles::new(outer, vec![hole]).unwrap();
        let graph = WavefrontSimulator::new(polygon).execute().unwrap();
        // Uniform ring of width 1: everything meets at offset 0.5.
        assert!((graph.max_time() - 0.5).abs() < 1e-9, "max_time = {}", graph.max_time());
        // Eight spokes: four outer corners and four hole corners.
        let spokes = graph
            .arcs()
            .iter()
            .filter(|a| graph.arc_kind(a) == ArcKind::Spoke)
            .count();
        assert_eq!(spokes, 8);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let polygon = PolygonWithHoles::new(
            PolygonLoop::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            vec![],
        )
        .unwrap();
        let params = SimulationParams {
            event_budget: Some(1),
            ..SimulationParams::default()
        };
        let err = WavefrontSimulator::new(polygon)
            .with_params(params)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::SkelisError::Skeleton(SkeletonError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn determinism_across_runs() {
        let coords = [
            (0.0, 0.0),
            (5.0, 0.0),
            (6.0, 2.5),
            (4.0, 5.0),
            (1.0, 4.5),
            (-1.0, 2.0),
        ];
        let a = build(&coords);
        let b = build(&coords);
        assert_eq!(a.arc_count(), b.arc_count());
        let fa = a.segments_flat();
        let fb = b.segments_flat();
        for (qa, qb) in fa.iter().zip(fb.iter()) {
            for k in 0..4 {
                assert!((qa[k] - qb[k]).abs() < 1e-12);
            }
        }
    }
}
