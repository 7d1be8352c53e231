use thiserror::Error;

/// Top-level error type for the Skelis skeleton engine.
#[derive(Debug, Error)]
pub enum SkelisError {
    #[error(transparent)]
    Polygon(#[from] PolygonError),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Errors raised while validating input polygons.
///
/// All of these are detected before any simulation work starts; a polygon
/// that passes validation is never rejected later for input reasons.
#[derive(Debug, Error)]
pub enum PolygonError {
    #[error("loop {loop_index} has {count} vertices, at least 3 required")]
    TooFewVertices { loop_index: usize, count: usize },

    #[error("loop {loop_index} contains a non-finite coordinate at vertex {vertex}")]
    NonFiniteCoordinate { loop_index: usize, vertex: usize },

    #[error("loop {loop_index} repeats vertex {vertex} consecutively")]
    DuplicateVertex { loop_index: usize, vertex: usize },

    #[error("loop {loop_index} intersects itself (edges {edge_a} and {edge_b})")]
    SelfIntersection {
        loop_index: usize,
        edge_a: usize,
        edge_b: usize,
    },

    #[error("loop {loop_index} is {found} wound, expected {expected}")]
    WrongOrientation {
        loop_index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("loop {loop_index} has zero area")]
    ZeroArea { loop_index: usize },

    #[error("hole {hole_index} is not strictly inside the outer boundary")]
    HoleOutsideBoundary { hole_index: usize },

    #[error("loops {loop_a} and {loop_b} intersect each other")]
    LoopsIntersect { loop_a: usize, loop_b: usize },
}

/// Errors raised during skeleton construction.
///
/// Transient numeric degeneracies are retried internally with a relaxed
/// tolerance and only surface as `ConstructionFailed` once retries exhaust.
/// Construction is all-or-nothing: no partial skeleton is ever returned.
#[derive(Debug, Error)]
pub enum SkeletonError {
    #[error("skeleton construction failed: {reason} near ({x}, {y})")]
    ConstructionFailed { reason: String, x: f64, y: f64 },

    #[error("computation budget exceeded after {events} events (budget {budget})")]
    BudgetExceeded { events: usize, budget: usize },
}

/// Errors raised by the skeleton handle store.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("invalid skeleton handle: released or unknown")]
    InvalidHandle,
}

/// Convenience type alias for results using [`SkelisError`].
pub type Result<T> = std::result::Result<T, SkelisError>;
