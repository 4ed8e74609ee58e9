//! Error types for ESDF mapping.

use thiserror::Error;

use crate::index::GlobalIndex;

/// Errors that can occur during ESDF maintenance.
///
/// Empty insert/delete input is not an error; an update cycle with no
/// changes is a no-op.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EsdfError {
    /// The occupancy and ESDF layers disagree on block geometry.
    #[error(
        "layer mismatch: occupancy has {occ_voxels_per_side} voxels per side, \
         esdf has {esdf_voxels_per_side}"
    )]
    LayerMismatch {
        /// Voxels per block side in the occupancy layer.
        occ_voxels_per_side: usize,
        /// Voxels per block side in the ESDF layer.
        esdf_voxels_per_side: usize,
    },

    /// A voxel expected to exist after range allocation was missing.
    ///
    /// This indicates a contract violation with the voxel grid, not a
    /// recoverable condition.
    #[error("missing voxel at {index:?} after range allocation")]
    MissingVoxel {
        /// The global index that failed to resolve.
        index: GlobalIndex,
    },

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EsdfError {
    /// Creates a layer mismatch error.
    #[must_use]
    pub const fn layer_mismatch(occ_voxels_per_side: usize, esdf_voxels_per_side: usize) -> Self {
        Self::LayerMismatch {
            occ_voxels_per_side,
            esdf_voxels_per_side,
        }
    }

    /// Creates a missing voxel error.
    #[must_use]
    pub const fn missing_voxel(index: GlobalIndex) -> Self {
        Self::MissingVoxel { index }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for ESDF operations.
pub type Result<T> = std::result::Result<T, EsdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_mismatch_display() {
        let err = EsdfError::layer_mismatch(16, 8);
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn missing_voxel_display() {
        let err = EsdfError::missing_voxel(GlobalIndex::new(1, 2, 3));
        assert!(err.to_string().contains("missing voxel"));
    }

    #[test]
    fn invalid_config_display() {
        let err = EsdfError::invalid_config("num_buckets must be nonzero");
        assert!(err.to_string().contains("invalid configuration"));
    }
}
