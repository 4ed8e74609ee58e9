//! Voxel payload types for the occupancy and ESDF layers.

use crate::index::GlobalIndex;

/// A voxel of the occupancy layer.
///
/// Written by the upstream sensor-fusion pipeline; the ESDF engine only
/// reads it. `behind` marks voxels on the occluded side of a surface and
/// selects the sign of the corresponding ESDF value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyVoxel {
    /// The voxel has been observed by at least one sensor ray.
    pub observed: bool,
    /// The voxel is currently believed occupied.
    pub occupied: bool,
    /// The voxel lies behind a surface as seen from the sensor.
    pub behind: bool,
}

/// A voxel of the ESDF layer.
///
/// Besides the signed distance and the identity of its closest occupied
/// cell (COC), every voxel embeds a node of the doubly-linked dependents
/// list owned by its COC: `prev_idx`/`next_idx` thread through all voxels
/// that currently claim the same obstacle, and `head_idx` is the list head
/// when this voxel is itself an obstacle. Links are global indices rather
/// than references, so they are trivially copyable and survive relocation
/// of block storage; an obstacle is its own COC, giving a self-entry in its
/// own list.
///
/// # Example
///
/// ```
/// use esdf_types::{EsdfVoxel, GlobalIndex};
///
/// let vox = EsdfVoxel::default();
/// assert!(!vox.observed);
/// assert!(!vox.self_idx.is_defined());
/// assert!(!vox.coc_idx.is_defined());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EsdfVoxel {
    /// This voxel's own global index; [`GlobalIndex::UNDEF`] until the
    /// voxel is first observed.
    pub self_idx: GlobalIndex,
    /// True once the observation state has been propagated from the
    /// occupancy layer.
    pub observed: bool,
    /// Copied from the occupancy layer; selects the sign of `distance`.
    pub behind: bool,
    /// Flag reserved for external consumers; cleared by
    /// `reset_fixed`, never read by the engine.
    pub fixed: bool,
    /// Signed Euclidean distance to the closest occupied cell, in metric
    /// units. Negative iff `behind` (zero at the obstacle itself).
    pub distance: f32,
    /// Global index of the closest occupied cell, or undefined when the
    /// voxel has no assignment.
    pub coc_idx: GlobalIndex,
    /// Head of this voxel's dependents list when it is an obstacle.
    pub head_idx: GlobalIndex,
    /// Previous member in the dependents list owned by the voxel at
    /// `coc_idx`.
    pub prev_idx: GlobalIndex,
    /// Next member in the dependents list owned by the voxel at `coc_idx`.
    pub next_idx: GlobalIndex,
    /// Diagnostic slot written by external callers only.
    pub error: f32,
}

impl Default for EsdfVoxel {
    fn default() -> Self {
        Self {
            self_idx: GlobalIndex::UNDEF,
            observed: false,
            behind: false,
            fixed: false,
            distance: 0.0,
            coc_idx: GlobalIndex::UNDEF,
            head_idx: GlobalIndex::UNDEF,
            prev_idx: GlobalIndex::UNDEF,
            next_idx: GlobalIndex::UNDEF,
            error: 0.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_default_is_unknown() {
        let vox = OccupancyVoxel::default();
        assert!(!vox.observed);
        assert!(!vox.occupied);
        assert!(!vox.behind);
    }

    #[test]
    fn esdf_default_is_unobserved() {
        let vox = EsdfVoxel::default();
        assert!(!vox.observed);
        assert!(!vox.self_idx.is_defined());
        assert!(!vox.coc_idx.is_defined());
        assert!(!vox.head_idx.is_defined());
        assert!(!vox.prev_idx.is_defined());
        assert!(!vox.next_idx.is_defined());
        assert_eq!(vox.distance, 0.0);
    }
}
