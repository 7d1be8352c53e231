use super::front::Front;
use crate::math::Point2;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// Events whose times land on the same epsilon grid cell are ordered by
/// kind (edge before split), then by lowest originating vertex index, so
/// identical input always replays the same topology.
pub const TIME_EPS: f64 = 1e-9;

/// Kind of a pending wavefront event. Ordering matters: edge events win
/// ties against split events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Edge,
    Split,
}

/// A pending event candidate.
///
/// For an edge event, `vertex`/`other` are the two endpoints of the
/// collapsing edge in loop order. For a split event, `vertex` is the
/// reflex vertex and `other` the left endpoint of the target edge.
/// `versions` snapshots both vertices' version counters; a mismatch at pop
/// time marks the candidate stale.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    pub time: f64,
    pub kind: EventKind,
    pub vertex: usize,
    pub other: usize,
    pub versions: (u64, u64),
    pub point: Point2,
}

impl QueuedEvent {
    fn key(&self) -> (OrderedFloat<f64>, EventKind, usize, usize) {
        let snapped = (self.time / TIME_EPS).round() * TIME_EPS;
        (OrderedFloat(snapped), self.kind, self.vertex, self.other)
    }
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Predicts the collapse of the edge leaving `a`, if it is shrinking.
///
/// Both endpoints ride the same supporting line, so the edge length is the
/// signed separation along the face direction; it is linear in time and
/// collapses where it crosses zero.
#[must_use]
pub fn edge_event_candidate(front: &Front, a: usize, now: f64) -> Option<QueuedEvent> {
    let va = &front.vertices[a];
    let b = va.next;
    if b == a {
        return None;
    }
    let vb = &front.vertices[b];
    let dir = front.faces[va.face_right].dir;

    // Trajectories in absolute time: p(t) = p0 + v * t.
    let pa0 = va.spawn_pos - va.velocity * va.spawn_time;
    let pb0 = vb.spawn_pos - vb.velocity * vb.spawn_time;

    let sep0 = (pb0 - pa0).dot(&dir);
    let rate = (vb.velocity - va.velocity).dot(&dir);
    if rate >= -TIME_EPS {
        // Not shrinking.
        return None;
    }
    let t = -sep0 / rate;
    if t < now - TIME_EPS {
        return None;
    }

    let pa = front.position_at(a, t);
    let pb = front.position_at(b, t);
    let point = Point2::new((pa.x + pb.x) * 0.5, (pa.y + pb.y) * 0.5);
    Some(QueuedEvent {
        time: t,
        kind: EventKind::Edge,
        vertex: a,
        other: b,
        versions: (va.version, vb.version),
        point,
    })
}

/// Predicts the earliest crossing of the reflex vertex `r` with the moving
/// supporting line of any non-incident active edge, restricted to the
/// edge's extent at the crossing time.
#[must_use]
pub fn split_event_candidate(front: &Front, r: usize, now: f64) -> Option<QueuedEvent> {
    let vr = &front.vertices[r];
    if !vr.reflex || !vr.active {
        return None;
    }
    let pr0 = vr.spawn_pos - vr.velocity * vr.spawn_time;

    let mut best: Option<QueuedEvent> = None;
    for a in 0..front.vertices.len() {
        let va = &front.vertices[a];
        if !va.active {
            continue;
        }
        let b = va.next;
        // Skip edges incident to the reflex vertex and the faces it already
        // rides on: the bisector never crosses its own supporting lines.
        if a == r || b == r {
            continue;
        }
        let face = va.face_right;
        if face == vr.face_left || face == vr.face_right {
            continue;
        }

        let n = front.faces[face].normal;
        let offset0 = n.dot(&front.faces[face].origin.coords);

        // Crossing of r(t) with the supporting line n . x = offset0 + t.
        let rate = vr.velocity.dot(&n) - 1.0;
        if rate >= -TIME_EPS {
            // Moving parallel to or away from the advancing line.
            continue;
        }
        let t = (offset0 - pr0.coords.dot(&n)) / rate;
        if t < now - TIME_EPS {
            continue;
        }
        if let Some(b_ev) = &best {
            if t >= b_ev.time {
                continue;
            }
        }

        let point = front.position_at(r, t);
        if !within_edge_extent(front, a, b, face, &point, t) {
            continue;
        }

        best = Some(QueuedEvent {
            time: t,
            kind: EventKind::Split,
            vertex: r,
            other: a,
            versions: (vr.version, va.version),
            point,
        });
    }
    best
}

/// Checks that `point` lies between the edge endpoints at time `t`,
/// measured along the face direction.
#[must_use]
pub fn within_edge_extent(
    front: &Front,
    a: usize,
    b: usize,
    face: usize,
    point: &Point2,
    t: f64,
) -> bool {
    let dir = front.faces[face].dir;
    let pa = front.position_at(a, t);
    let pb = front.position_at(b, t);
    let lo = (point - pa).dot(&dir);
    let hi = (pb - point).dot(&dir);
    lo >= -TIME_EPS && hi >= -TIME_EPS
}
