//! Precomputed per-tile clearance values for large-bodied agents.

use skirmish_core::{TerrainSet, TilePoint};
use skirmish_world::CollisionGrid;

/// Dense map of the largest free square anchored at each tile.
///
/// A value of `n` at a tile means an `n x n` block of tiles crossable for
/// the map's terrain set fits with its top-left corner on that tile; zero
/// means the tile itself is blocked. Built once per distinct terrain set and
/// cached against the grid revision.
#[derive(Clone, Debug)]
pub struct ClearanceMap {
    columns: u32,
    rows: u32,
    values: Vec<u32>,
}

impl ClearanceMap {
    /// Computes the clearance values for the grid under a terrain set.
    ///
    /// Dynamic programming from the bottom-right corner: a crossable tile's
    /// clearance is one more than the minimum of its right, down, and
    /// down-right neighbours, with off-grid neighbours contributing zero.
    #[must_use]
    pub fn build(grid: &CollisionGrid, crossable: &TerrainSet) -> Self {
        let columns = grid.columns();
        let rows = grid.rows();
        let mut values = vec![0_u32; columns as usize * rows as usize];

        for y in (0..rows as i32).rev() {
            for x in (0..columns as i32).rev() {
                if grid.is_blocked(crossable, TilePoint::new(x, y)) {
                    continue;
                }
                let right = value_at(&values, columns, rows, x + 1, y);
                let down = value_at(&values, columns, rows, x, y + 1);
                let diagonal = value_at(&values, columns, rows, x + 1, y + 1);
                let index = y as usize * columns as usize + x as usize;
                values[index] = 1 + right.min(down).min(diagonal);
            }
        }

        Self {
            columns,
            rows,
            values,
        }
    }

    /// Clearance at the tile; zero for blocked or off-grid tiles.
    #[must_use]
    pub fn clearance(&self, at: TilePoint) -> u32 {
        value_at(&self.values, self.columns, self.rows, at.x(), at.y())
    }
}

fn value_at(values: &[u32], columns: u32, rows: u32, x: i32, y: i32) -> u32 {
    if x < 0 || y < 0 || x >= columns as i32 || y >= rows as i32 {
        return 0;
    }
    values
        .get(y as usize * columns as usize + x as usize)
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Footprint, ObstructionLevel, WorldPoint};

    fn grid_with_wall() -> CollisionGrid {
        let mut grid = CollisionGrid::new(160.0, 160.0, 32.0);
        // Single blocked tile at (2, 2).
        grid.rebuild_with(
            [(
                Footprint::new(WorldPoint::new(64.0, 64.0), 32.0, 32.0),
                ObstructionLevel::new(1),
            )]
            .into_iter(),
        );
        grid
    }

    #[test]
    fn open_interior_tiles_see_the_far_corner() {
        let grid = CollisionGrid::new(160.0, 160.0, 32.0);
        let map = ClearanceMap::build(&grid, &TerrainSet::open_only());
        assert_eq!(map.clearance(TilePoint::new(0, 0)), 5);
        assert_eq!(map.clearance(TilePoint::new(3, 3)), 2);
        assert_eq!(map.clearance(TilePoint::new(4, 4)), 1);
    }

    #[test]
    fn blocked_tiles_have_zero_clearance() {
        let map = ClearanceMap::build(&grid_with_wall(), &TerrainSet::open_only());
        assert_eq!(map.clearance(TilePoint::new(2, 2)), 0);
        // The tile up-left of the wall can only fit a 2x2 block.
        assert_eq!(map.clearance(TilePoint::new(0, 0)), 2);
    }

    #[test]
    fn terrain_set_changes_the_map() {
        let tolerant = TerrainSet::from_levels([ObstructionLevel::OPEN, ObstructionLevel::new(1)]);
        let map = ClearanceMap::build(&grid_with_wall(), &tolerant);
        assert_eq!(map.clearance(TilePoint::new(2, 2)), 3);
        assert_eq!(map.clearance(TilePoint::new(0, 0)), 5);
    }

    #[test]
    fn off_grid_probes_report_zero() {
        let map = ClearanceMap::build(&grid_with_wall(), &TerrainSet::open_only());
        assert_eq!(map.clearance(TilePoint::new(-1, 0)), 0);
        assert_eq!(map.clearance(TilePoint::new(5, 5)), 0);
    }
}
