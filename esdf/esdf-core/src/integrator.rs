//! Incremental ESDF update engine.
//!
//! The integrator maintains, for every observed voxel inside the current
//! working range, the signed Euclidean distance to the nearest occupied
//! voxel together with that voxel's identity (the closest occupied cell,
//! COC). Updates are incremental: an upstream diff producer loads the sets
//! of voxels that became obstacles (insertions) and ceased to be obstacles
//! (deletions), and one update cycle seeds a bucketed priority queue from
//! those sets and drains it with a BFS-style wavefront over the
//! 24-neighborhood. Obstacles track their dependent voxels in intrusive
//! doubly-linked lists so deletions can orphan exactly the affected set.
//!
//! Reference: Han et al., "FIESTA: Fast Incremental Euclidean Distance
//! Fields for Online Motion Planning of Aerial Robots", IROS 2019.

use std::collections::VecDeque;

use tracing::{debug, trace};

use esdf_types::{
    BlockIndex, EsdfConfig, EsdfVoxel, GlobalIndex, OccupancyVoxel, Result,
};

use crate::dependents;
use crate::layer::Layer;
use crate::neighborhood::neighbors24;
use crate::queue::BucketQueue;
use crate::range::WorkingRange;

/// Per-cycle diagnostic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Number of queue entries expanded (stale entries excluded).
    pub expanded: usize,
    /// Number of expansions corrected by the patch step.
    pub patched: usize,
}

/// Incremental ESDF maintenance engine over an occupancy layer and an ESDF
/// layer.
///
/// The integrator owns both layers. The occupancy layer is written by the
/// sensor side through [`occ_layer_mut`](Self::occ_layer_mut) between
/// cycles and is read-only during a cycle; the ESDF layer is mutated
/// exclusively by the engine. One update cycle runs to completion with no
/// interior suspension point, so callers serialize cycles against any
/// consumer that reads distances.
///
/// # Example
///
/// ```
/// use esdf_core::{EsdfIntegrator, Layer};
/// use esdf_types::{EsdfConfig, EsdfVoxel, GlobalIndex, OccupancyVoxel};
///
/// let config = EsdfConfig::default().with_range_boundary_offset([1, 1, 1]);
/// let occ: Layer<OccupancyVoxel> = Layer::new(0.1, 8);
/// let esdf: Layer<EsdfVoxel> = Layer::new(0.1, 8);
/// let mut integrator = EsdfIntegrator::new(config, occ, esdf).unwrap();
///
/// // Sensor side: observe free space around the origin and one obstacle.
/// let obstacle = GlobalIndex::new(0, 0, 0);
/// {
///     let occ = integrator.occ_layer_mut();
///     for z in -1..=1 {
///         for y in -1..=1 {
///             for x in -1..=1 {
///                 occ.allocate_voxel_mut(GlobalIndex::new(x, y, z)).observed = true;
///             }
///         }
///     }
///     occ.allocate_voxel_mut(obstacle).occupied = true;
///     for block in occ.block_indices() {
///         occ.block_mut(block).unwrap().set_updated(true);
///     }
/// }
///
/// integrator.load_insert_list([obstacle]);
/// let stats = integrator.update_from_occ_layer(true).unwrap();
/// assert!(stats.expanded > 0);
///
/// let vox = integrator.esdf_layer().voxel(GlobalIndex::new(1, 0, 0)).unwrap();
/// assert_eq!(vox.coc_idx, obstacle);
/// assert!((vox.distance - 0.1).abs() < 1e-4);
/// ```
#[derive(Debug)]
pub struct EsdfIntegrator {
    config: EsdfConfig,
    occ_layer: Layer<OccupancyVoxel>,
    esdf_layer: Layer<EsdfVoxel>,
    voxel_size: f32,
    voxels_per_side: usize,
    insert_list: VecDeque<GlobalIndex>,
    delete_list: VecDeque<GlobalIndex>,
    queue: BucketQueue,
    range: WorkingRange,
    total_expansions: u64,
}

impl EsdfIntegrator {
    /// Creates an integrator over the given layers.
    ///
    /// # Errors
    ///
    /// Returns [`esdf_types::EsdfError::InvalidConfig`] for an unusable
    /// configuration and [`esdf_types::EsdfError::LayerMismatch`] if the
    /// layers disagree on voxels per block side.
    pub fn new(
        config: EsdfConfig,
        occ_layer: Layer<OccupancyVoxel>,
        esdf_layer: Layer<EsdfVoxel>,
    ) -> Result<Self> {
        config.validate()?;
        if occ_layer.voxels_per_side() != esdf_layer.voxels_per_side() {
            return Err(esdf_types::EsdfError::layer_mismatch(
                occ_layer.voxels_per_side(),
                esdf_layer.voxels_per_side(),
            ));
        }
        let queue = BucketQueue::new(config.num_buckets(), config.default_distance_m());
        let voxel_size = esdf_layer.voxel_size();
        let voxels_per_side = esdf_layer.voxels_per_side();
        Ok(Self {
            config,
            occ_layer,
            esdf_layer,
            voxel_size,
            voxels_per_side,
            insert_list: VecDeque::new(),
            delete_list: VecDeque::new(),
            queue,
            range: WorkingRange::new(),
            total_expansions: 0,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EsdfConfig {
        &self.config
    }

    /// Borrows the occupancy layer.
    #[must_use]
    pub const fn occ_layer(&self) -> &Layer<OccupancyVoxel> {
        &self.occ_layer
    }

    /// Mutably borrows the occupancy layer for the sensor side to write
    /// between cycles.
    pub fn occ_layer_mut(&mut self) -> &mut Layer<OccupancyVoxel> {
        &mut self.occ_layer
    }

    /// Borrows the ESDF layer.
    #[must_use]
    pub const fn esdf_layer(&self) -> &Layer<EsdfVoxel> {
        &self.esdf_layer
    }

    /// The working range of the most recent update cycle.
    #[must_use]
    pub const fn working_range(&self) -> &WorkingRange {
        &self.range
    }

    /// Lifetime count of queue expansions across all cycles.
    #[must_use]
    pub const fn total_expansions(&self) -> u64 {
        self.total_expansions
    }

    /// Replaces the pending insertion set: voxels that became obstacles
    /// since the last cycle.
    pub fn load_insert_list(&mut self, list: impl IntoIterator<Item = GlobalIndex>) {
        self.insert_list.clear();
        self.insert_list.extend(list);
    }

    /// Replaces the pending deletion set: voxels that ceased to be
    /// obstacles since the last cycle.
    pub fn load_delete_list(&mut self, list: impl IntoIterator<Item = GlobalIndex>) {
        self.delete_list.clear();
        self.delete_list.extend(list);
    }

    /// Runs one update cycle against the occupancy blocks whose change
    /// marker is set, clearing the markers afterwards when `clear_updated`
    /// is true.
    ///
    /// # Errors
    ///
    /// Returns [`esdf_types::EsdfError::MissingVoxel`] if a voxel expected
    /// after range allocation cannot be resolved; this indicates a contract
    /// violation, and the cycle leaves the map partially updated.
    pub fn update_from_occ_layer(&mut self, clear_updated: bool) -> Result<CycleStats> {
        let occ_blocks = self.occ_layer.updated_blocks();
        let stats = self.update_from_occ_blocks(&occ_blocks)?;
        if clear_updated {
            for &block_index in &occ_blocks {
                if let Some(block) = self.occ_layer.block_mut(block_index) {
                    block.set_updated(false);
                }
            }
        }
        Ok(stats)
    }

    /// Runs one update cycle against an explicit set of occupancy blocks.
    ///
    /// Observation state is propagated from the given blocks into the ESDF
    /// layer (allocating mirror blocks as needed), the working range is
    /// recomputed from the loaded insert/delete sets, and the incremental
    /// update runs to completion. With empty input sets this is a no-op.
    ///
    /// # Errors
    ///
    /// See [`update_from_occ_layer`](Self::update_from_occ_layer).
    pub fn update_from_occ_blocks(&mut self, occ_blocks: &[BlockIndex]) -> Result<CycleStats> {
        debug!(
            blocks = occ_blocks.len(),
            inserts = self.insert_list.len(),
            deletes = self.delete_list.len(),
            "starting esdf update cycle"
        );

        self.propagate_observed(occ_blocks);
        self.refresh_working_range();
        self.update_esdf()
    }

    /// Clears the `fixed` flag across the current working range.
    ///
    /// Walks the full range cuboid regardless of observation state, so the
    /// cost is O(range volume); voxels in unallocated blocks are skipped.
    pub fn reset_fixed(&mut self) {
        for index in self.range.iter() {
            if let Some(vox) = self.esdf_layer.voxel_mut(index) {
                vox.fixed = false;
            }
        }
    }

    /// Writes the diagnostic error slot of a voxel.
    ///
    /// # Errors
    ///
    /// Returns [`esdf_types::EsdfError::MissingVoxel`] if the voxel's block
    /// is not allocated.
    pub fn assign_error(&mut self, index: GlobalIndex, error: f32) -> Result<()> {
        self.esdf_layer.try_voxel_mut(index)?.error = error;
        Ok(())
    }

    /// Copies observation state from the given occupancy blocks into the
    /// ESDF layer, seeding newly observed voxels with the default distance.
    fn propagate_observed(&mut self, occ_blocks: &[BlockIndex]) {
        let vps = self.voxels_per_side;
        let default_distance = self.config.default_distance_m();
        let behind_distance = self.config.max_behind_surface_m();

        for &block_index in occ_blocks {
            let Some(occ_block) = self.occ_layer.block(block_index) else {
                continue;
            };
            let esdf_block = self.esdf_layer.allocate_block(block_index);
            esdf_block.set_updated(true);

            for linear in 0..occ_block.num_voxels() {
                let occ_vox = occ_block.voxels()[linear];
                if !occ_vox.observed {
                    continue;
                }
                let esdf_vox = &mut esdf_block.voxels_mut()[linear];
                esdf_vox.behind = occ_vox.behind;
                if !esdf_vox.self_idx.is_defined() {
                    esdf_vox.observed = true;
                    esdf_vox.self_idx = GlobalIndex::from_block_and_linear(block_index, linear, vps);
                    esdf_vox.distance = if esdf_vox.behind {
                        -behind_distance
                    } else {
                        default_distance
                    };
                }
            }
        }
    }

    /// Recomputes the working range from the loaded input sets and
    /// pre-allocates every ESDF block in the inflated cuboid, marking them
    /// for republication.
    fn refresh_working_range(&mut self) {
        let mut update_range = WorkingRange::new();
        for &index in &self.insert_list {
            update_range.include(index);
        }
        for &index in &self.delete_list {
            update_range.include(index);
        }
        self.range = update_range.inflated(self.config.range_boundary_offset());

        if self.range.is_empty() {
            return;
        }
        trace!(min = ?self.range.min(), max = ?self.range.max(), "working range");

        for block_index in self.range.blocks(self.voxels_per_side) {
            let block = self.esdf_layer.allocate_block(block_index);
            block.set_updated(true);
        }
    }

    /// Metric distance between two lattice indices.
    fn dist(&self, a: GlobalIndex, b: GlobalIndex) -> f32 {
        a.distance_to(b) * self.voxel_size
    }

    /// Runs the seeding and propagation phases of one cycle.
    fn update_esdf(&mut self) -> Result<CycleStats> {
        self.seed_inserts()?;
        self.seed_deletes()?;
        self.propagate()
    }

    /// Seeds the queue from the insertion set: each inserted voxel becomes
    /// an obstacle at distance zero with itself as COC.
    fn seed_inserts(&mut self) -> Result<()> {
        while let Some(index) = self.insert_list.pop_front() {
            let old_coc = self.esdf_layer.try_voxel(index)?.coc_idx;
            if old_coc.is_defined() {
                dependents::unlink(&mut self.esdf_layer, old_coc, index)?;
            }
            let vox = self.esdf_layer.try_voxel_mut(index)?;
            vox.distance = 0.0;
            vox.coc_idx = index;
            dependents::push_front(&mut self.esdf_layer, index, index)?;
            self.queue.push(index, 0.0);
        }
        Ok(())
    }

    /// Drains the deletion set: every voxel that claimed a deleted obstacle
    /// is orphaned, re-seeded from its neighbors where possible, and queued
    /// for re-propagation.
    fn seed_deletes(&mut self) -> Result<()> {
        while let Some(obstacle_idx) = self.delete_list.pop_front() {
            // Members are inserted at the head, so the obstacle sits at the
            // tail of its own list and a prev-walk from it visits every
            // member.
            let mut cursor = obstacle_idx;
            while cursor.is_defined() {
                self.esdf_layer.try_voxel_mut(cursor)?.coc_idx = GlobalIndex::UNDEF;

                if self.range.contains(cursor) {
                    self.reseed_orphan(cursor)?;
                }

                // Cache the traversal link before clearing it.
                let prev = {
                    let vox = self.esdf_layer.try_voxel_mut(cursor)?;
                    let prev = vox.prev_idx;
                    vox.prev_idx = GlobalIndex::UNDEF;
                    vox.next_idx = GlobalIndex::UNDEF;
                    prev
                };

                let (coc, behind, distance) = {
                    let vox = self.esdf_layer.try_voxel(cursor)?;
                    (vox.coc_idx, vox.behind, vox.distance)
                };
                if coc.is_defined() {
                    let signed = if behind { -distance } else { distance };
                    self.esdf_layer.try_voxel_mut(cursor)?.distance = signed;
                    self.queue.push(cursor, signed);
                    dependents::push_front(&mut self.esdf_layer, coc, cursor)?;
                }

                cursor = prev;
            }
            self.esdf_layer.try_voxel_mut(obstacle_idx)?.head_idx = GlobalIndex::UNDEF;
        }
        Ok(())
    }

    /// Re-seeds an orphaned in-range voxel: reset to the default distance,
    /// then adopt the best neighbor COC that still refers to an occupied
    /// occupancy voxel.
    fn reseed_orphan(&mut self, member_idx: GlobalIndex) -> Result<()> {
        self.esdf_layer.try_voxel_mut(member_idx)?.distance = self.config.default_distance_m();

        for nbr_idx in neighbors24(member_idx) {
            if !self.range.contains(nbr_idx) {
                continue;
            }
            let nbr = self.esdf_layer.try_voxel(nbr_idx)?;
            let nbr_coc = nbr.coc_idx;
            if !nbr.observed || !nbr_coc.is_defined() {
                continue;
            }
            // The neighbor's assignment may be stale: its obstacle can be
            // part of the same deletion batch.
            if !self.occ_layer.try_voxel(nbr_coc)?.occupied {
                continue;
            }
            let candidate = self.dist(nbr_coc, member_idx);
            let vox = self.esdf_layer.try_voxel_mut(member_idx)?;
            let improved = candidate < vox.distance.abs();
            if improved {
                vox.distance = candidate;
                vox.coc_idx = nbr_coc;
                if self.config.early_break() {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Drains the bucketed queue, relaxing each expanded voxel's
    /// 24-neighborhood; with the patch enabled, each voxel is first
    /// re-checked against its neighbors' assignments.
    fn propagate(&mut self) -> Result<CycleStats> {
        let mut stats = CycleStats::default();

        while let Some(cur_idx) = self.queue.pop() {
            let (cur_coc, cur_distance, cur_behind) = {
                let vox = self.esdf_layer.try_voxel(cur_idx)?;
                (vox.coc_idx, vox.distance, vox.behind)
            };
            // Stale entry: the voxel's assignment was cleared by a deletion
            // after it was queued.
            if !cur_coc.is_defined() {
                continue;
            }

            stats.expanded += 1;
            self.total_expansions += 1;

            let neighbors = neighbors24(cur_idx);

            if self.config.patch_on() {
                let mut best_distance = cur_distance.abs();
                let mut best_coc = cur_coc;
                for &nbr_idx in &neighbors {
                    if !self.range.contains(nbr_idx) {
                        continue;
                    }
                    let nbr = self.esdf_layer.try_voxel(nbr_idx)?;
                    if !nbr.observed || !nbr.coc_idx.is_defined() {
                        continue;
                    }
                    let nbr_coc = nbr.coc_idx;
                    let candidate = self.dist(nbr_coc, cur_idx);
                    if candidate < best_distance {
                        best_distance = candidate;
                        best_coc = nbr_coc;
                    }
                }
                if best_coc != cur_coc {
                    let signed = if cur_behind { -best_distance } else { best_distance };
                    {
                        let vox = self.esdf_layer.try_voxel_mut(cur_idx)?;
                        vox.distance = signed;
                        vox.coc_idx = best_coc;
                    }
                    dependents::unlink(&mut self.esdf_layer, cur_coc, cur_idx)?;
                    dependents::push_front(&mut self.esdf_layer, best_coc, cur_idx)?;
                    self.queue.push(cur_idx, signed);
                    stats.patched += 1;
                    // Re-expand under the corrected assignment instead of
                    // propagating a value that was just proven sub-optimal.
                    continue;
                }
            }

            for &nbr_idx in &neighbors {
                if !self.range.contains(nbr_idx) {
                    continue;
                }
                let (nbr_observed, nbr_distance, nbr_behind, nbr_old_coc) = {
                    let nbr = self.esdf_layer.try_voxel(nbr_idx)?;
                    (nbr.observed, nbr.distance, nbr.behind, nbr.coc_idx)
                };
                // Obstacles (distance zero) are never relaxed.
                if !nbr_observed || nbr_distance.abs() <= 0.0 {
                    continue;
                }
                let candidate = self.dist(cur_coc, nbr_idx);
                if candidate < nbr_distance.abs() {
                    if nbr_old_coc.is_defined() {
                        dependents::unlink(&mut self.esdf_layer, nbr_old_coc, nbr_idx)?;
                    }
                    let signed = if nbr_behind { -candidate } else { candidate };
                    let vox = self.esdf_layer.try_voxel_mut(nbr_idx)?;
                    vox.distance = signed;
                    vox.coc_idx = cur_coc;
                    dependents::push_front(&mut self.esdf_layer, cur_coc, nbr_idx)?;
                    self.queue.push(nbr_idx, signed);
                }
            }
        }

        debug!(
            expanded = stats.expanded,
            patched = stats.patched,
            total = self.total_expansions,
            "wavefront drained"
        );
        Ok(stats)
    }
}
