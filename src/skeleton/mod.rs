pub mod graph;
pub mod wavefront;

pub use graph::{ArcKind, NodeId, SkeletonArc, SkeletonFace, SkeletonGraph, SkeletonNode};
pub use wavefront::{SimulationParams, WavefrontSimulator};
