//! The 24-neighborhood used for wavefront propagation.
//!
//! The neighborhood consists of the 6 face and 12 edge neighbors (the unit
//! L∞ ball minus its corners) plus the 6 axial neighbors at distance 2.
//! Propagating over this set instead of a true Euclidean neighborhood is an
//! approximation; the patch step exists to correct the locally sub-optimal
//! assignments it can leave at the frontier between two obstacles.

use esdf_types::GlobalIndex;

/// Number of neighbors in the propagation neighborhood.
pub const NUM_NEIGHBORS: usize = 24;

/// Offsets of the 24-neighborhood: 6 faces, 12 edges, 6 double-step faces.
pub const NEIGHBOR_OFFSETS: [[i64; 3]; NUM_NEIGHBORS] = [
    // faces
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    // edges
    [1, 1, 0],
    [1, -1, 0],
    [-1, 1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [-1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
    [0, -1, 1],
    [0, -1, -1],
    // double-step faces
    [2, 0, 0],
    [-2, 0, 0],
    [0, 2, 0],
    [0, -2, 0],
    [0, 0, 2],
    [0, 0, -2],
];

/// Returns the 24 neighbors of a voxel.
///
/// # Example
///
/// ```
/// use esdf_core::neighborhood::neighbors24;
/// use esdf_types::GlobalIndex;
///
/// let nbrs = neighbors24(GlobalIndex::origin());
/// assert_eq!(nbrs.len(), 24);
/// assert!(nbrs.contains(&GlobalIndex::new(2, 0, 0)));
/// assert!(!nbrs.contains(&GlobalIndex::new(1, 1, 1))); // corners excluded
/// ```
#[must_use]
pub fn neighbors24(index: GlobalIndex) -> [GlobalIndex; NUM_NEIGHBORS] {
    let mut result = [GlobalIndex::origin(); NUM_NEIGHBORS];
    for (out, [dx, dy, dz]) in result.iter_mut().zip(NEIGHBOR_OFFSETS) {
        *out = GlobalIndex::new(index.x + dx, index.y + dy, index.z + dz);
    }
    result
}
