//! Projection of the occupied voxels in a region onto a 2D height map.
//!
//! Every occupied leaf whose center lies in the region lands in the cell below it, and each cell keeps the tallest height
//! that lands in it. Because the combine rule is a maximum, the order of traversal does not matter.
//!
//! Heights are normalized against the top of the region plus one voxel, measured from world height zero:
//!
//! ```text
//! byte = clamp(round(z / (region.max.z + resolution) * 255), 0, 255)
//! ```

use octoflat_core::prelude::*;
use octoflat_storage::{HeightMap, OccupancyOctree};

/// Counters gathered while rasterizing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RasterStats {
    /// Leaves whose center lies in the region.
    pub visited: usize,
    /// Occupied leaves written to the map.
    pub occupied: usize,
    /// Occupied leaves that fell outside of the grid, which happens on the upper boundary of the region.
    pub out_of_region: usize,
}

/// The number of cells along X and Y of the grid covering `region`. Zero along an axis if the region is narrower than one
/// cell or `resolution` is not positive.
pub fn grid_shape(region: &BoundingBox, resolution: f32) -> (usize, usize) {
    if !(resolution.is_finite() && resolution > 0.0) {
        return (0, 0);
    }
    let cells = |extent: f32| {
        let n = (extent / resolution).floor();
        if n.is_finite() && n > 0.0 {
            n as usize
        } else {
            0
        }
    };
    let shape = region.shape();

    (cells(shape.x()), cells(shape.y()))
}

/// The byte that encodes height `z` in a map of `region`.
#[inline]
pub fn normalize_height(z: f32, region: &BoundingBox, resolution: f32) -> u8 {
    let normalized = (z / (region.max.z() + resolution) * 255.0).round();

    // NaN maps to 0.
    normalized.max(0.0).min(255.0) as u8
}

/// Project the occupied leaves of `octree` within `region` onto a new height map with cells of `resolution` meters.
pub fn rasterize(
    octree: &OccupancyOctree,
    region: &BoundingBox,
    resolution: f32,
) -> (HeightMap, RasterStats) {
    let (width, height) = grid_shape(region, resolution);
    let mut map = HeightMap::new(width, height, resolution);
    let mut stats = RasterStats::default();
    if map.is_empty() {
        return (map, stats);
    }

    let params = *octree.params();
    for voxel in octree.leaves_in_box(region) {
        stats.visited += 1;
        if !params.is_occupied(voxel.log_odds) {
            continue;
        }

        let x = ((voxel.coordinate.x() - region.min.x()) / resolution).floor();
        let y = ((voxel.coordinate.y() - region.min.y()) / resolution).floor();
        let z = normalize_height(voxel.coordinate.z(), region, resolution);

        // Rejects cells past either edge, not just past the end of the buffer.
        if x >= 0.0 && y >= 0.0 && map.raise(x as usize, y as usize, z) {
            stats.occupied += 1;
        } else {
            stats.out_of_region += 1;
        }
    }

    tracing::debug!(
        width,
        height,
        visited = stats.visited,
        occupied = stats.occupied,
        out_of_region = stats.out_of_region,
        "rasterized height map"
    );

    (map, stats)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::seq::SliceRandom;

    const RES: f32 = 0.25;

    fn region(max: [f32; 3]) -> BoundingBox {
        BoundingBox::from_corners(PointN([0.0, 0.0, 0.0]), PointN(max))
    }

    #[test]
    fn grid_dimensions_floor_the_extents() {
        let r = BoundingBox::from_corners(PointN([0.0, -0.5, 0.0]), PointN([2.1, 0.5, 1.0]));
        let (map, _) = rasterize(&OccupancyOctree::new(RES), &r, RES);

        assert_eq!((map.width(), map.height()), (8, 4));
        assert_eq!(map.len(), 32);
    }

    #[test]
    fn empty_tree_gives_all_zero_map() {
        let (map, stats) = rasterize(&OccupancyOctree::new(RES), &region([2.0, 1.0, 1.0]), RES);

        assert_eq!(map.len(), 8 * 4);
        assert_eq!(map.max_value(), 0);
        assert_eq!(stats, RasterStats::default());
    }

    #[test]
    fn degenerate_region_gives_empty_map() {
        let mut octree = OccupancyOctree::new(RES);
        octree.set_occupied(PointN([0.1, 0.1, 0.1]), true).unwrap();

        let (map, stats) = rasterize(&octree, &region([0.0, 1.0, 1.0]), RES);
        assert!(map.is_empty());
        assert_eq!(stats.visited, 0);

        let (map, _) = rasterize(&octree, &region([1.0, 1.0, 1.0]), 0.0);
        assert!(map.is_empty());
    }

    #[test]
    fn tallest_voxel_wins_in_any_order() {
        let heights = [0.125, 0.375, 0.625, 0.875];
        let r = region([1.0, 1.0, 0.75]);
        // The voxel at 0.875 is above the region.
        let expected = normalize_height(0.625, &r, RES);

        let mut shuffled = heights;
        for _ in 0..5 {
            shuffled.shuffle(&mut rand::thread_rng());
            let mut octree = OccupancyOctree::new(RES);
            for &z in shuffled.iter() {
                octree.set_occupied(PointN([0.375, 0.625, z]), true).unwrap();
            }

            let (map, stats) = rasterize(&octree, &r, RES);
            assert_eq!(stats.occupied, 3);
            assert_eq!(map.get(1, 2), Some(expected));
        }
    }

    #[test]
    fn free_voxels_are_not_drawn() {
        let mut octree = OccupancyOctree::new(RES);
        octree.update(PointN([0.375, 0.375, 0.375]), false).unwrap();

        let (map, stats) = rasterize(&octree, &region([1.0, 1.0, 1.0]), RES);
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.occupied, 0);
        assert_eq!(map.max_value(), 0);
    }

    #[test]
    fn voxel_on_upper_boundary_is_skipped() {
        let mut octree = OccupancyOctree::new(RES);
        octree.set_occupied(PointN([0.875, 0.375, 0.125]), true).unwrap();

        // The region ends exactly at the voxel center.
        let r = region([0.875, 1.0, 1.0]);
        let (map, stats) = rasterize(&octree, &r, RES);

        assert_eq!(map.width(), 3);
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.out_of_region, 1);
        assert_eq!(map.max_value(), 0);
    }

    #[test]
    fn normalization_uses_top_of_region() {
        let r = region([1.0, 1.0, 0.75]);

        assert_eq!(normalize_height(0.0, &r, RES), 0);
        assert_eq!(normalize_height(1.0, &r, RES), 255);
        assert_eq!(normalize_height(0.5, &r, RES), 128);
        assert_eq!(normalize_height(-0.3, &r, RES), 0);
        assert_eq!(normalize_height(7.0, &r, RES), 255);
    }
}
