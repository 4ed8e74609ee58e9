//! Domain types for incremental ESDF mapping.
//!
//! This crate defines the vocabulary shared by the ESDF mapping stack:
//!
//! - [`GlobalIndex`] / [`BlockIndex`] - voxel coordinates in the infinite
//!   lattice and the block table, with floored block/linear index algebra
//! - [`OccupancyVoxel`] / [`EsdfVoxel`] - the voxel payloads of the two map
//!   layers
//! - [`EsdfConfig`] - engine configuration
//! - [`EsdfError`] - error type for the stack
//!
//! The ESDF voxel embeds its dependents-list node directly (head/prev/next
//! links stored as global indices), so a list over the voxels claiming a
//! given obstacle needs no allocation of its own.
//!
//! # Example
//!
//! ```
//! use esdf_types::{EsdfConfig, GlobalIndex};
//!
//! let config = EsdfConfig::default().with_range_boundary_offset([1, 1, 1]);
//! assert!(config.validate().is_ok());
//!
//! let idx = GlobalIndex::new(-5, -5, -5);
//! assert_eq!(idx.block_index(8).x, -1);
//! ```
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

mod config;
mod error;
mod index;
mod voxel;

pub use config::EsdfConfig;
pub use error::{EsdfError, Result};
pub use index::{BlockIndex, GlobalIndex, UNDEF};
pub use voxel::{EsdfVoxel, OccupancyVoxel};
