use octoflat_core::prelude::*;
use octoflat_storage::OccupancyOctree;

/// Calls `f` with the center of every column of a square grid of `2 * half_extent` meters around the origin.
fn for_each_column(resolution: f32, half_extent: f32, mut f: impl FnMut(f32, f32)) {
    let cells = (half_extent / resolution).round() as i32;
    for iy in -cells..cells {
        for ix in -cells..cells {
            f((ix as f32 + 0.5) * resolution, (iy as f32 + 0.5) * resolution);
        }
    }
}

/// A square slab of occupied voxels, one voxel thick, at height `floor_z`.
pub fn flat_floor(resolution: f32, half_extent: f32, floor_z: f32) -> OccupancyOctree {
    let mut octree = OccupancyOctree::new(resolution);
    for_each_column(resolution, half_extent, |x, y| {
        octree
            .set_occupied(PointN([x, y, floor_z]), true)
            .expect("floor voxel outside of the key space");
    });

    octree
}

/// A floor at height zero with low clutter, walls along two edges, a table top and some observed free space.
///
/// Returns the tree and the number of occupied voxels that lie within `2 * resolution` of the floor.
pub fn cluttered_room(resolution: f32, half_extent: f32) -> (OccupancyOctree, usize) {
    let mut octree = OccupancyOctree::new(resolution);
    let mut near_floor = 0;
    let mut cell = 0usize;

    for_each_column(resolution, half_extent, |x, y| {
        let occupy = |z: f32, octree: &mut OccupancyOctree| {
            octree
                .set_occupied(PointN([x, y, z]), true)
                .expect("room voxel outside of the key space");
        };

        occupy(0.5 * resolution, &mut octree);
        near_floor += 1;

        // Debris lying on the floor.
        if cell % 7 == 0 {
            occupy(1.5 * resolution, &mut octree);
            near_floor += 1;
        }

        // Walls.
        if x > half_extent - resolution || y > half_extent - resolution {
            let mut z = 2.5 * resolution;
            while z < 1.5 {
                occupy(z, &mut octree);
                z += resolution;
            }
        }

        // A table top.
        if x.abs() < 0.4 && y.abs() < 0.3 {
            occupy(0.8, &mut octree);
        }

        // Free space seen above the floor.
        if cell % 3 == 0 {
            octree
                .update(PointN([x, y, 0.5]), false)
                .expect("free voxel outside of the key space");
        }

        cell += 1;
    });

    (octree, near_floor)
}
