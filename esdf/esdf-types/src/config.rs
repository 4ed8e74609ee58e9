//! Configuration for the incremental ESDF engine.

use crate::error::EsdfError;

/// Configuration for the incremental ESDF update engine.
///
/// # Example
///
/// ```
/// use esdf_types::EsdfConfig;
///
/// let config = EsdfConfig::default()
///     .with_default_distance_m(4.0)
///     .with_range_boundary_offset([2, 2, 1])
///     .with_patch_on(true);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EsdfConfig {
    /// Initial positive distance for newly observed voxels; also the span
    /// of the bucketed priority queue.
    default_distance_m: f32,
    /// Magnitude of the initial negative distance for voxels behind a
    /// surface.
    max_behind_surface_m: f32,
    /// Number of buckets in the priority queue.
    num_buckets: usize,
    /// Per-axis inflation of the working range, in voxels.
    range_boundary_offset: [i64; 3],
    /// Re-check each expanded voxel against its neighbors' assignments
    /// before propagating outward.
    patch_on: bool,
    /// During delete seeding, accept the first improving neighbor
    /// candidate instead of scanning the full 24-neighborhood. Faster but
    /// can leave locally sub-optimal assignments for the patch step to
    /// correct.
    early_break: bool,
}

impl EsdfConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults:
    /// - `default_distance_m`: 2.0
    /// - `max_behind_surface_m`: 1.0
    /// - `num_buckets`: 20
    /// - `range_boundary_offset`: [10, 10, 10]
    /// - `patch_on`: true
    /// - `early_break`: true
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_distance_m: 2.0,
            max_behind_surface_m: 1.0,
            num_buckets: 20,
            range_boundary_offset: [10, 10, 10],
            patch_on: true,
            early_break: true,
        }
    }

    /// Sets the initial positive distance (and queue span) in meters.
    #[must_use]
    pub const fn with_default_distance_m(mut self, distance: f32) -> Self {
        self.default_distance_m = distance;
        self
    }

    /// Sets the magnitude of the initial distance for behind-surface voxels.
    #[must_use]
    pub const fn with_max_behind_surface_m(mut self, distance: f32) -> Self {
        self.max_behind_surface_m = distance;
        self
    }

    /// Sets the bucket count of the priority queue.
    #[must_use]
    pub const fn with_num_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = num_buckets;
        self
    }

    /// Sets the per-axis working-range inflation, in voxels.
    #[must_use]
    pub const fn with_range_boundary_offset(mut self, offset: [i64; 3]) -> Self {
        self.range_boundary_offset = offset;
        self
    }

    /// Enables or disables the patch step.
    #[must_use]
    pub const fn with_patch_on(mut self, patch_on: bool) -> Self {
        self.patch_on = patch_on;
        self
    }

    /// Enables or disables early break in the delete-seed neighbor scan.
    #[must_use]
    pub const fn with_early_break(mut self, early_break: bool) -> Self {
        self.early_break = early_break;
        self
    }

    /// Returns the initial positive distance in meters.
    #[must_use]
    pub const fn default_distance_m(&self) -> f32 {
        self.default_distance_m
    }

    /// Returns the behind-surface initial distance magnitude in meters.
    #[must_use]
    pub const fn max_behind_surface_m(&self) -> f32 {
        self.max_behind_surface_m
    }

    /// Returns the bucket count of the priority queue.
    #[must_use]
    pub const fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Returns the per-axis working-range inflation, in voxels.
    #[must_use]
    pub const fn range_boundary_offset(&self) -> [i64; 3] {
        self.range_boundary_offset
    }

    /// Returns whether the patch step is enabled.
    #[must_use]
    pub const fn patch_on(&self) -> bool {
        self.patch_on
    }

    /// Returns whether early break is enabled.
    #[must_use]
    pub const fn early_break(&self) -> bool {
        self.early_break
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EsdfError::InvalidConfig`] if either distance is not
    /// positive and finite, if the behind-surface distance exceeds the
    /// queue span, or if the bucket count is zero.
    pub fn validate(&self) -> Result<(), EsdfError> {
        if !(self.default_distance_m.is_finite() && self.default_distance_m > 0.0) {
            return Err(EsdfError::invalid_config(format!(
                "default_distance_m must be positive and finite, got {}",
                self.default_distance_m
            )));
        }
        if !(self.max_behind_surface_m.is_finite() && self.max_behind_surface_m > 0.0) {
            return Err(EsdfError::invalid_config(format!(
                "max_behind_surface_m must be positive and finite, got {}",
                self.max_behind_surface_m
            )));
        }
        if self.max_behind_surface_m > self.default_distance_m {
            return Err(EsdfError::invalid_config(format!(
                "max_behind_surface_m ({}) exceeds the queue span default_distance_m ({})",
                self.max_behind_surface_m, self.default_distance_m
            )));
        }
        if self.num_buckets == 0 {
            return Err(EsdfError::invalid_config("num_buckets must be nonzero"));
        }
        Ok(())
    }
}

impl Default for EsdfConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        assert!(EsdfConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = EsdfConfig::default()
            .with_default_distance_m(4.0)
            .with_max_behind_surface_m(0.5)
            .with_num_buckets(40)
            .with_range_boundary_offset([1, 2, 3])
            .with_patch_on(false)
            .with_early_break(false);

        assert!((config.default_distance_m() - 4.0).abs() < f32::EPSILON);
        assert!((config.max_behind_surface_m() - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.num_buckets(), 40);
        assert_eq!(config.range_boundary_offset(), [1, 2, 3]);
        assert!(!config.patch_on());
        assert!(!config.early_break());
    }

    #[test]
    fn rejects_nonpositive_distance() {
        let config = EsdfConfig::default().with_default_distance_m(0.0);
        assert!(config.validate().is_err());
        let config = EsdfConfig::default().with_max_behind_surface_m(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_behind_distance_beyond_span() {
        let config = EsdfConfig::default()
            .with_default_distance_m(1.0)
            .with_max_behind_surface_m(2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_buckets() {
        let config = EsdfConfig::default().with_num_buckets(0);
        assert!(config.validate().is_err());
    }
}
