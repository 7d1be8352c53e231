pub mod error;
pub mod math;
pub mod offset;
pub mod polygon;
pub mod skeleton;
pub mod store;

pub use error::{Result, SkelisError};
pub use offset::OffsetQuery;
pub use polygon::{PolygonLoop, PolygonWithHoles};
pub use skeleton::{SkeletonGraph, WavefrontSimulator};
pub use store::{SkeletonHandle, SkeletonStore};
