use octoflat_core::prelude::*;
use octoflat_storage::prelude::*;
use utilities::data_sets::cluttered_room;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const RESOLUTION: f32 = 0.05;

fn octree_leaves_of_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_leaves_of_room");
    for half_extent in [1.0f32, 2.0, 4.0].iter() {
        let (octree, _) = cluttered_room(RESOLUTION, *half_extent);
        group.bench_with_input(
            BenchmarkId::from_parameter(half_extent),
            &octree,
            |b, octree| {
                b.iter(|| {
                    for leaf in octree.leaves() {
                        black_box(leaf);
                    }
                });
            },
        );
    }
    group.finish();
}

fn octree_leaves_in_box_of_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_leaves_in_box_of_room");
    let region = BoundingBox::from_corners(PointN([0.0, -0.5, 0.0]), PointN([2.0, 0.5, 1.0]));
    for half_extent in [1.0f32, 2.0, 4.0].iter() {
        let (octree, _) = cluttered_room(RESOLUTION, *half_extent);
        group.bench_with_input(
            BenchmarkId::from_parameter(half_extent),
            &octree,
            |b, octree| {
                b.iter(|| {
                    for leaf in octree.leaves_in_box(&region) {
                        black_box(leaf);
                    }
                });
            },
        );
    }
    group.finish();
}

fn octree_compact_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_compact_room");
    for half_extent in [1.0f32, 2.0, 4.0].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(half_extent),
            half_extent,
            |b, &half_extent| {
                b.iter_with_setup(
                    || cluttered_room(RESOLUTION, half_extent).0,
                    |mut octree| octree.compact(),
                );
            },
        );
    }
    group.finish();
}

fn octree_write_binary_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_write_binary_room");
    for half_extent in [1.0f32, 2.0, 4.0].iter() {
        let (mut octree, _) = cluttered_room(RESOLUTION, *half_extent);
        octree.compact();
        group.bench_with_input(
            BenchmarkId::from_parameter(half_extent),
            &octree,
            |b, octree| b.iter(|| octree.write_binary()),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    octree_leaves_of_room,
    octree_leaves_in_box_of_room,
    octree_compact_room,
    octree_write_binary_room
);
criterion_main!(benches);
