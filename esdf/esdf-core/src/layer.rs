//! Block-hashed sparse voxel storage.
//!
//! A [`Layer`] tiles the infinite lattice into cubic blocks of
//! `voxels_per_side` voxels and stores only the allocated blocks in a hash
//! table. Both map layers (occupancy and ESDF) use the same storage with
//! different voxel payloads; block indices agree across layers with equal
//! `voxels_per_side`.

use std::collections::HashMap;

use esdf_types::{BlockIndex, EsdfError, GlobalIndex, Result};

/// A cubic block of voxels with a per-block change marker.
///
/// The `updated` marker means "changed since last consumed": on an
/// occupancy layer it flags blocks that still need ESDF propagation, on an
/// ESDF layer it flags blocks a consumer should republish.
#[derive(Debug, Clone)]
pub struct Block<T> {
    voxels: Vec<T>,
    updated: bool,
}

impl<T: Default + Clone> Block<T> {
    fn new(voxels_per_side: usize) -> Self {
        Self {
            voxels: vec![T::default(); voxels_per_side * voxels_per_side * voxels_per_side],
            updated: false,
        }
    }

    /// Number of voxels in the block.
    #[must_use]
    pub fn num_voxels(&self) -> usize {
        self.voxels.len()
    }

    /// Voxel storage, indexed by intra-block linear offset (x-fastest).
    #[must_use]
    pub fn voxels(&self) -> &[T] {
        &self.voxels
    }

    /// Mutable voxel storage, indexed by intra-block linear offset.
    pub fn voxels_mut(&mut self) -> &mut [T] {
        &mut self.voxels
    }

    /// Returns the change marker.
    #[must_use]
    pub const fn updated(&self) -> bool {
        self.updated
    }

    /// Sets the change marker.
    pub fn set_updated(&mut self, updated: bool) {
        self.updated = updated;
    }
}

/// A sparse voxel layer: a hash table of blocks keyed by block index.
///
/// Voxel lookup by [`GlobalIndex`] is O(1) amortized (one hash probe plus a
/// linear offset). Blocks are allocated on demand and never freed.
///
/// # Example
///
/// ```
/// use esdf_core::Layer;
/// use esdf_types::{GlobalIndex, OccupancyVoxel};
///
/// let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
/// assert!(layer.voxel(GlobalIndex::new(0, 0, 0)).is_none());
///
/// layer.allocate_voxel_mut(GlobalIndex::new(-5, -5, -5)).occupied = true;
/// assert!(layer.has_block(GlobalIndex::new(-5, -5, -5).block_index(8)));
/// ```
#[derive(Debug, Clone)]
pub struct Layer<T> {
    voxel_size: f32,
    voxels_per_side: usize,
    blocks: HashMap<BlockIndex, Block<T>>,
}

impl<T: Default + Clone> Layer<T> {
    /// Creates an empty layer.
    ///
    /// `voxel_size` is clamped to a positive value; `voxels_per_side` must
    /// be at least 1 and is clamped to it.
    #[must_use]
    pub fn new(voxel_size: f32, voxels_per_side: usize) -> Self {
        Self {
            voxel_size: voxel_size.abs().max(f32::EPSILON),
            voxels_per_side: voxels_per_side.max(1),
            blocks: HashMap::new(),
        }
    }

    /// Edge length of a voxel in metric units.
    #[must_use]
    pub const fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Number of voxels along each block edge.
    #[must_use]
    pub const fn voxels_per_side(&self) -> usize {
        self.voxels_per_side
    }

    /// Number of allocated blocks.
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if no block has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns `true` if the block is allocated.
    #[must_use]
    pub fn has_block(&self, index: BlockIndex) -> bool {
        self.blocks.contains_key(&index)
    }

    /// Borrows a block, or `None` if it is not allocated.
    #[must_use]
    pub fn block(&self, index: BlockIndex) -> Option<&Block<T>> {
        self.blocks.get(&index)
    }

    /// Mutably borrows a block, or `None` if it is not allocated.
    pub fn block_mut(&mut self, index: BlockIndex) -> Option<&mut Block<T>> {
        self.blocks.get_mut(&index)
    }

    /// Allocates a block if absent and borrows it. Idempotent: an existing
    /// block is returned untouched.
    pub fn allocate_block(&mut self, index: BlockIndex) -> &mut Block<T> {
        let voxels_per_side = self.voxels_per_side;
        self.blocks
            .entry(index)
            .or_insert_with(|| Block::new(voxels_per_side))
    }

    /// Borrows the voxel at a global index, or `None` if its block is not
    /// allocated.
    #[must_use]
    pub fn voxel(&self, index: GlobalIndex) -> Option<&T> {
        let block = self.blocks.get(&index.block_index(self.voxels_per_side))?;
        block.voxels.get(index.linear_index(self.voxels_per_side))
    }

    /// Mutably borrows the voxel at a global index, or `None` if its block
    /// is not allocated.
    pub fn voxel_mut(&mut self, index: GlobalIndex) -> Option<&mut T> {
        let linear = index.linear_index(self.voxels_per_side);
        let block = self
            .blocks
            .get_mut(&index.block_index(self.voxels_per_side))?;
        block.voxels.get_mut(linear)
    }

    /// Mutably borrows the voxel at a global index, allocating its block if
    /// needed.
    pub fn allocate_voxel_mut(&mut self, index: GlobalIndex) -> &mut T {
        let linear = index.linear_index(self.voxels_per_side);
        let block = self.allocate_block(index.block_index(self.voxels_per_side));
        &mut block.voxels[linear]
    }

    /// Borrows the voxel at a global index, treating an unallocated block
    /// as a contract violation.
    ///
    /// # Errors
    ///
    /// Returns [`EsdfError::MissingVoxel`] if the enclosing block is not
    /// allocated.
    pub fn try_voxel(&self, index: GlobalIndex) -> Result<&T> {
        self.voxel(index).ok_or(EsdfError::MissingVoxel { index })
    }

    /// Mutably borrows the voxel at a global index, treating an unallocated
    /// block as a contract violation.
    ///
    /// # Errors
    ///
    /// Returns [`EsdfError::MissingVoxel`] if the enclosing block is not
    /// allocated.
    pub fn try_voxel_mut(&mut self, index: GlobalIndex) -> Result<&mut T> {
        self.voxel_mut(index).ok_or(EsdfError::MissingVoxel { index })
    }

    /// Indices of all allocated blocks, in unspecified order.
    #[must_use]
    pub fn block_indices(&self) -> Vec<BlockIndex> {
        self.blocks.keys().copied().collect()
    }

    /// Indices of all blocks whose change marker is set, in unspecified
    /// order.
    #[must_use]
    pub fn updated_blocks(&self) -> Vec<BlockIndex> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.updated)
            .map(|(index, _)| *index)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use esdf_types::OccupancyVoxel;

    #[test]
    fn voxel_lookup_requires_allocation() {
        let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
        let idx = GlobalIndex::new(3, 4, 5);
        assert!(layer.voxel(idx).is_none());
        assert!(layer.try_voxel(idx).is_err());

        layer.allocate_block(idx.block_index(8));
        assert!(layer.voxel(idx).is_some());
        assert!(layer.try_voxel(idx).is_ok());
    }

    #[test]
    fn allocate_block_is_idempotent() {
        let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
        let idx = GlobalIndex::new(0, 0, 0);
        layer.allocate_voxel_mut(idx).occupied = true;
        layer.allocate_block(idx.block_index(8));
        assert!(layer.voxel(idx).unwrap().occupied);
        assert_eq!(layer.num_blocks(), 1);
    }

    #[test]
    fn negative_coordinates_map_into_negative_blocks() {
        let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
        let idx = GlobalIndex::new(-5, -5, -5);
        layer.allocate_voxel_mut(idx).observed = true;
        assert!(layer.has_block(BlockIndex::new(-1, -1, -1)));
        assert!(!layer.has_block(BlockIndex::new(0, 0, 0)));
        assert!(layer.voxel(idx).unwrap().observed);
        // A neighboring voxel in the same block shares the allocation.
        assert!(layer.voxel(GlobalIndex::new(-6, -5, -5)).is_some());
    }

    #[test]
    fn updated_markers() {
        let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
        let a = BlockIndex::new(0, 0, 0);
        let b = BlockIndex::new(1, 0, 0);
        layer.allocate_block(a).set_updated(true);
        layer.allocate_block(b);

        assert_eq!(layer.updated_blocks(), vec![a]);
        layer.block_mut(a).unwrap().set_updated(false);
        assert!(layer.updated_blocks().is_empty());
    }

    #[test]
    fn block_voxel_count() {
        let mut layer: Layer<OccupancyVoxel> = Layer::new(0.1, 4);
        let block = layer.allocate_block(BlockIndex::new(0, 0, 0));
        assert_eq!(block.num_voxels(), 64);
    }
}
