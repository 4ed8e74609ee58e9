//! Voxel and block index types.

use nalgebra::Vector3;

/// Sentinel component value marking "no index".
///
/// A [`GlobalIndex`] with this value in its first component is treated as
/// undefined everywhere; hot paths test only `x` (see
/// [`GlobalIndex::is_defined`]).
pub const UNDEF: i64 = i64::MIN;

/// A discrete 3D coordinate in the infinite voxel lattice.
///
/// Uses `i64` coordinates so the map can grow in any direction from the
/// origin. The sentinel [`GlobalIndex::UNDEF`] stands in for "no index" in
/// voxel payloads that link to other voxels.
///
/// # Example
///
/// ```
/// use esdf_types::GlobalIndex;
///
/// let idx = GlobalIndex::new(1, -2, 3);
/// assert_eq!(idx.x, 1);
/// assert!(idx.is_defined());
/// assert!(!GlobalIndex::UNDEF.is_defined());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalIndex {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
    /// Z coordinate.
    pub z: i64,
}

impl GlobalIndex {
    /// The undefined index: every component is [`UNDEF`].
    pub const UNDEF: Self = Self {
        x: UNDEF,
        y: UNDEF,
        z: UNDEF,
    };

    /// Creates a new global voxel index.
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Creates the index at the origin (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns `true` if this index refers to an actual lattice position.
    ///
    /// Only the first component is inspected; an index is either fully
    /// defined or fully [`UNDEF`], never mixed.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        self.x != UNDEF
    }

    /// Returns the coordinate as an array.
    #[must_use]
    pub const fn as_array(self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }

    /// Index of the block containing this voxel, for a layer with
    /// `voxels_per_side` voxels along each block edge.
    ///
    /// Division rounds toward negative infinity. Truncating division would
    /// map voxels on the negative side of the origin into the wrong block
    /// and leave a one-block gap during range allocation.
    ///
    /// # Example
    ///
    /// ```
    /// use esdf_types::{BlockIndex, GlobalIndex};
    ///
    /// assert_eq!(GlobalIndex::new(7, 0, 0).block_index(8), BlockIndex::new(0, 0, 0));
    /// assert_eq!(GlobalIndex::new(8, 0, 0).block_index(8), BlockIndex::new(1, 0, 0));
    /// assert_eq!(
    ///     GlobalIndex::new(-5, -5, -5).block_index(8),
    ///     BlockIndex::new(-1, -1, -1)
    /// );
    /// ```
    #[must_use]
    pub const fn block_index(self, voxels_per_side: usize) -> BlockIndex {
        let vps = voxels_per_side as i64;
        BlockIndex::new(
            self.x.div_euclid(vps),
            self.y.div_euclid(vps),
            self.z.div_euclid(vps),
        )
    }

    /// Linear offset of this voxel inside its block, x-fastest.
    ///
    /// # Example
    ///
    /// ```
    /// use esdf_types::GlobalIndex;
    ///
    /// assert_eq!(GlobalIndex::new(0, 0, 0).linear_index(8), 0);
    /// assert_eq!(GlobalIndex::new(1, 1, 0).linear_index(8), 9);
    /// // Negative coordinates wrap into the local [0, vps) range.
    /// assert_eq!(GlobalIndex::new(-1, 0, 0).linear_index(8), 7);
    /// ```
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn linear_index(self, voxels_per_side: usize) -> usize {
        let vps = voxels_per_side as i64;
        let lx = self.x.rem_euclid(vps) as usize;
        let ly = self.y.rem_euclid(vps) as usize;
        let lz = self.z.rem_euclid(vps) as usize;
        lx + voxels_per_side * (ly + voxels_per_side * lz)
    }

    /// Reconstructs a global index from a block index and an intra-block
    /// linear offset. Inverse of [`block_index`](Self::block_index) +
    /// [`linear_index`](Self::linear_index).
    ///
    /// # Example
    ///
    /// ```
    /// use esdf_types::{BlockIndex, GlobalIndex};
    ///
    /// let idx = GlobalIndex::new(-5, 3, 17);
    /// let block = idx.block_index(8);
    /// let linear = idx.linear_index(8);
    /// assert_eq!(GlobalIndex::from_block_and_linear(block, linear, 8), idx);
    /// ```
    #[must_use]
    pub const fn from_block_and_linear(
        block: BlockIndex,
        linear: usize,
        voxels_per_side: usize,
    ) -> Self {
        let vps = voxels_per_side as i64;
        let lx = (linear % voxels_per_side) as i64;
        let ly = ((linear / voxels_per_side) % voxels_per_side) as i64;
        let lz = (linear / (voxels_per_side * voxels_per_side)) as i64;
        Self::new(block.x * vps + lx, block.y * vps + ly, block.z * vps + lz)
    }

    /// Euclidean distance to another index, in voxel units.
    ///
    /// Multiply by the layer's voxel size to obtain a metric distance.
    ///
    /// # Example
    ///
    /// ```
    /// use esdf_types::GlobalIndex;
    ///
    /// let a = GlobalIndex::new(0, 0, 0);
    /// let b = GlobalIndex::new(3, 4, 0);
    /// assert!((a.distance_to(b) - 5.0).abs() < 1e-6);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distance_to(self, other: Self) -> f32 {
        Vector3::new(
            (other.x - self.x) as f32,
            (other.y - self.y) as f32,
            (other.z - self.z) as f32,
        )
        .norm()
    }
}

impl From<(i64, i64, i64)> for GlobalIndex {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i64; 3]> for GlobalIndex {
    fn from([x, y, z]: [i64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl std::ops::Add for GlobalIndex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for GlobalIndex {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Index of a block in a layer's block table.
///
/// Blocks tile the lattice in cubes of `voxels_per_side` voxels; block
/// indices are obtained from [`GlobalIndex::block_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockIndex {
    /// X coordinate in block units.
    pub x: i64,
    /// Y coordinate in block units.
    pub y: i64,
    /// Z coordinate in block units.
    pub z: i64,
}

impl BlockIndex {
    /// Creates a new block index.
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl From<(i64, i64, i64)> for BlockIndex {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        Self::new(x, y, z)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn undef_is_not_defined() {
        assert!(!GlobalIndex::UNDEF.is_defined());
        assert!(GlobalIndex::origin().is_defined());
        assert!(GlobalIndex::new(-1, 0, 0).is_defined());
    }

    #[test]
    fn block_index_floors_toward_negative_infinity() {
        assert_eq!(
            GlobalIndex::new(0, 0, 0).block_index(8),
            BlockIndex::new(0, 0, 0)
        );
        assert_eq!(
            GlobalIndex::new(7, 7, 7).block_index(8),
            BlockIndex::new(0, 0, 0)
        );
        assert_eq!(
            GlobalIndex::new(-1, -8, -9).block_index(8),
            BlockIndex::new(-1, -1, -2)
        );
        assert_eq!(
            GlobalIndex::new(-5, -5, -5).block_index(8),
            BlockIndex::new(-1, -1, -1)
        );
    }

    #[test]
    fn linear_index_is_x_fastest() {
        assert_eq!(GlobalIndex::new(3, 0, 0).linear_index(8), 3);
        assert_eq!(GlobalIndex::new(0, 3, 0).linear_index(8), 24);
        assert_eq!(GlobalIndex::new(0, 0, 3).linear_index(8), 192);
        assert_eq!(GlobalIndex::new(7, 7, 7).linear_index(8), 511);
    }

    #[test]
    fn block_linear_roundtrip() {
        for idx in [
            GlobalIndex::new(0, 0, 0),
            GlobalIndex::new(13, -7, 100),
            GlobalIndex::new(-5, -5, -5),
            GlobalIndex::new(-8, 8, -1),
        ] {
            let block = idx.block_index(8);
            let linear = idx.linear_index(8);
            assert_eq!(GlobalIndex::from_block_and_linear(block, linear, 8), idx);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GlobalIndex::new(1, 2, 3);
        let b = GlobalIndex::new(4, 6, 3);
        assert_relative_eq!(a.distance_to(b), 5.0, epsilon = 1e-6);
        assert_relative_eq!(b.distance_to(a), 5.0, epsilon = 1e-6);
        assert_relative_eq!(a.distance_to(a), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn add_sub_operators() {
        let a = GlobalIndex::new(1, 2, 3);
        let b = GlobalIndex::new(4, 5, 6);
        assert_eq!(a + b, GlobalIndex::new(5, 7, 9));
        assert_eq!(b - a, GlobalIndex::new(3, 3, 3));
    }

    #[test]
    fn conversions() {
        let idx: GlobalIndex = (1, 2, 3).into();
        assert_eq!(idx, GlobalIndex::new(1, 2, 3));
        let idx: GlobalIndex = [4, 5, 6].into();
        assert_eq!(idx.as_array(), [4, 5, 6]);
    }
}
