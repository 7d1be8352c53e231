use crate::error::{HandleError, Result};
use crate::offset::OffsetQuery;
use crate::polygon::{PolygonLoop, PolygonWithHoles};
use crate::skeleton::graph::SkeletonGraph;
use crate::skeleton::wavefront::{SimulationParams, WavefrontSimulator};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Opaque handle to a skeleton graph owned by a [`SkeletonStore`].
    ///
    /// Generational: a handle is dead forever once released, even if the
    /// store later reuses its slot.
    pub struct SkeletonHandle;
}

/// Central registry that owns built skeleton graphs.
///
/// This is the crate-internal form of the classic foreign-function handle
/// contract: construction returns an opaque handle, queries borrow the
/// graph behind it, and the caller must release the handle explicitly.
/// Using a released or unknown handle fails with
/// [`HandleError::InvalidHandle`]; nothing is ever reclaimed implicitly.
#[derive(Debug, Default)]
pub struct SkeletonStore {
    graphs: SlotMap<SkeletonHandle, SkeletonGraph>,
}

impl SkeletonStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates nothing further (the polygon is already canonical), runs
    /// the wavefront simulation, and stores the resulting graph.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from the simulator; on error
    /// nothing is stored.
    pub fn build(&mut self, polygon: PolygonWithHoles) -> Result<SkeletonHandle> {
        self.build_with_params(polygon, SimulationParams::default())
    }

    /// As [`Self::build`], with explicit simulation parameters.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from the simulator.
    pub fn build_with_params(
        &mut self,
        polygon: PolygonWithHoles,
        params: SimulationParams,
    ) -> Result<SkeletonHandle> {
        let graph = WavefrontSimulator::new(polygon)
            .with_params(params)
            .execute()?;
        Ok(self.graphs.insert(graph))
    }

    /// Borrows the graph behind a handle.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::InvalidHandle` for a released or unknown
    /// handle.
    pub fn graph(&self, handle: SkeletonHandle) -> Result<&SkeletonGraph> {
        self.graphs
            .get(handle)
            .ok_or_else(|| HandleError::InvalidHandle.into())
    }

    /// Releases a handle, dropping the owned graph.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::InvalidHandle` if the handle was already
    /// released or never belonged to this store.
    pub fn release(&mut self, handle: SkeletonHandle) -> Result<()> {
        self.graphs
            .remove(handle)
            .map(|_| ())
            .ok_or_else(|| HandleError::InvalidHandle.into())
    }

    /// Number of live skeletons in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether the store holds no skeletons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Offset loops at the given distance for the skeleton behind `handle`.
    ///
    /// The returned list is caller-owned; the store keeps nothing.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::InvalidHandle` for a dead handle.
    pub fn offset(&self, handle: SkeletonHandle, distance: f64) -> Result<Vec<PolygonLoop>> {
        Ok(OffsetQuery::new(self.graph(handle)?, distance).execute())
    }

    /// All skeleton arcs as flat endpoint quadruples `[x0, y0, x1, y1]`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::InvalidHandle` for a dead handle.
    pub fn skeleton_edges_flat(&self, handle: SkeletonHandle) -> Result<Vec<[f64; 4]>> {
        Ok(self.graph(handle)?.segments_flat())
    }

    /// Offset loops flattened to `[x, y, x, y, ..]` per loop, closure
    /// implicit, matching the raw output contract of the original binding.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::InvalidHandle` for a dead handle.
    pub fn offset_flat(&self, handle: SkeletonHandle, distance: f64) -> Result<Vec<Vec<f64>>> {
        let loops = self.offset(handle, distance)?;
        Ok(loops
            .into_iter()
            .map(|ring| {
                let mut flat = Vec::with_capacity(ring.len() * 2);
                for p in &ring.points {
                    flat.push(p.x);
                    flat.push(p.y);
                }
                flat
            })
            .collect())
    }
}
