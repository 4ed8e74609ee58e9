//! Incremental Euclidean Signed Distance Field maintenance.
//!
//! This crate maintains, for every observed voxel of a 3D map, the signed
//! Euclidean distance to the nearest occupied voxel and the identity of
//! that voxel, updated incrementally as obstacles appear and disappear
//! (the FIESTA algorithm, Han et al., IROS 2019):
//!
//! - [`Layer`] - block-hashed sparse voxel storage shared by the occupancy
//!   and ESDF map layers
//! - [`BucketQueue`] - monotone bucketed min-queue driving the wavefront
//! - [`WorkingRange`] - the axis-aligned cuboid active in a cycle
//! - [`neighborhood`] - the 24-neighborhood the wavefront propagates over
//! - [`dependents`] - intrusive per-obstacle lists of dependent voxels
//! - [`EsdfIntegrator`] - the update engine tying it all together
//!
//! # Example
//!
//! ```
//! use esdf_core::{EsdfIntegrator, Layer};
//! use esdf_types::EsdfConfig;
//!
//! let config = EsdfConfig::default().with_range_boundary_offset([1, 1, 1]);
//! let occ = Layer::new(0.1, 8);
//! let esdf = Layer::new(0.1, 8);
//! let mut integrator = EsdfIntegrator::new(config, occ, esdf).unwrap();
//!
//! // An update cycle with no loaded changes is a no-op.
//! let stats = integrator.update_from_occ_layer(false).unwrap();
//! assert_eq!(stats.expanded, 0);
//! ```
//!
//! # Concurrency
//!
//! Single-threaded by construction: the integrator owns both layers and a
//! cycle runs to completion with no interior suspension point. Callers
//! serialize list loading and updates against consumers of the distances.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dependents;
mod integrator;
mod layer;
pub mod neighborhood;
mod queue;
mod range;

pub use integrator::{CycleStats, EsdfIntegrator};
pub use layer::{Block, Layer};
pub use queue::BucketQueue;
pub use range::{WorkingRange, WorkingRangeIter};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{BucketQueue, CycleStats, EsdfIntegrator, Layer, WorkingRange};
    pub use esdf_types::{
        EsdfConfig, EsdfError, EsdfVoxel, GlobalIndex, OccupancyVoxel,
    };
}
