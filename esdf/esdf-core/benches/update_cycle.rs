//! Benchmarks for the incremental update cycle.

#![allow(clippy::unwrap_used)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use esdf_core::{EsdfIntegrator, Layer};
use esdf_types::{EsdfConfig, GlobalIndex};

const VOXEL_SIZE: f32 = 0.1;
const VOXELS_PER_SIDE: usize = 8;

/// A wall of obstacles in the x = 0 plane.
fn wall() -> Vec<GlobalIndex> {
    let mut out = Vec::new();
    for z in -5..=5 {
        for y in -5..=5 {
            out.push(GlobalIndex::new(0, y, z));
        }
    }
    out
}

/// An integrator with free space observed around the wall.
fn prepared_integrator(occupied: &[GlobalIndex]) -> EsdfIntegrator {
    let config = EsdfConfig::default().with_range_boundary_offset([3, 3, 3]);
    let mut integ = EsdfIntegrator::new(
        config,
        Layer::new(VOXEL_SIZE, VOXELS_PER_SIDE),
        Layer::new(VOXEL_SIZE, VOXELS_PER_SIDE),
    )
    .unwrap();

    let occ = integ.occ_layer_mut();
    for z in -8..=8 {
        for y in -8..=8 {
            for x in -8..=8 {
                occ.allocate_voxel_mut(GlobalIndex::new(x, y, z)).observed = true;
            }
        }
    }
    for &idx in occupied {
        occ.allocate_voxel_mut(idx).occupied = true;
    }
    for block in occ.block_indices() {
        occ.block_mut(block).unwrap().set_updated(true);
    }
    integ
}

fn bench_insert_wall(c: &mut Criterion) {
    c.bench_function("insert_wall_121", |b| {
        b.iter_batched(
            || prepared_integrator(&wall()),
            |mut integ| {
                integ.load_insert_list(wall());
                integ.update_from_occ_layer(true).unwrap();
                integ
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_delete_wall(c: &mut Criterion) {
    c.bench_function("delete_wall_121", |b| {
        b.iter_batched(
            || {
                let mut integ = prepared_integrator(&wall());
                integ.load_insert_list(wall());
                integ.update_from_occ_layer(true).unwrap();
                let occ = integ.occ_layer_mut();
                for idx in wall() {
                    occ.allocate_voxel_mut(idx).occupied = false;
                }
                for block in occ.block_indices() {
                    occ.block_mut(block).unwrap().set_updated(true);
                }
                integ
            },
            |mut integ| {
                integ.load_delete_list(wall());
                integ.update_from_occ_layer(true).unwrap();
                integ
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_insert_wall, bench_delete_wall);
criterion_main!(benches);
