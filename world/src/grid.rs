//! Dense tile collision map rebuilt from the zone's static structures.

use skirmish_core::{Direction, Footprint, ObstructionLevel, TerrainSet, TilePoint};

/// Smallest addressable unit of the collision grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    column: u32,
    row: u32,
    size: f32,
    obstruction_level: ObstructionLevel,
    movement_cost: f32,
}

impl Tile {
    fn open(column: u32, row: u32, size: f32) -> Self {
        Self {
            column,
            row,
            size,
            obstruction_level: ObstructionLevel::OPEN,
            movement_cost: 1.0,
        }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Side length of the tile in world units.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Terrain family currently stamped onto the tile.
    #[must_use]
    pub const fn obstruction_level(&self) -> ObstructionLevel {
        self.obstruction_level
    }

    /// Cost of entering the tile.
    #[must_use]
    pub const fn movement_cost(&self) -> f32 {
        self.movement_cost
    }
}

/// Discretized, queryable obstruction map of a zone.
///
/// The grid is created once per zone and rebuilt whenever the static
/// structure layout changes. Mutations only mark the grid dirty; the rebuild
/// itself runs once at the top of the next tick so that many queries against
/// an unchanged layout amortize a single pass.
#[derive(Clone, Debug)]
pub struct CollisionGrid {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
    dirty: bool,
    revision: u64,
}

impl CollisionGrid {
    /// Creates a grid covering the zone, all tiles open.
    ///
    /// Dimensions are `ceil(extent / tile_size)` per axis; callers validate
    /// that the extents and tile size are positive before construction.
    #[must_use]
    pub fn new(zone_width: f32, zone_height: f32, tile_size: f32) -> Self {
        let columns = (zone_width / tile_size).ceil() as u32;
        let rows = (zone_height / tile_size).ceil() as u32;
        let mut grid = Self {
            columns,
            rows,
            tile_size,
            tiles: Vec::new(),
            dirty: false,
            revision: 0,
        };
        grid.reset_tiles();
        log::debug!(
            "collision grid created: {}x{} tiles of {} world units",
            columns,
            rows,
            tile_size
        );
        grid
    }

    fn reset_tiles(&mut self) {
        let capacity = self.columns as usize * self.rows as usize;
        self.tiles.clear();
        self.tiles.reserve(capacity);
        for row in 0..self.rows {
            for column in 0..self.columns {
                self.tiles.push(Tile::open(column, row, self.tile_size));
            }
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Marks the grid out of date; the next rebuild clears the flag.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Reports whether the grid needs a rebuild before trustworthy queries.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Monotonic counter incremented by every rebuild.
    ///
    /// Downstream caches (clearance maps) key their validity to this value
    /// instead of sharing the dirty flag.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Rebuilds the obstruction levels from the provided structure bodies.
    ///
    /// Every tile is first cleared to open ground, then each structure with
    /// a non-open level stamps the inclusive tile range between its top-left
    /// and bottom-right corners. Tiles outside the grid are silently
    /// skipped.
    pub fn rebuild_with(
        &mut self,
        structures: impl Iterator<Item = (Footprint, ObstructionLevel)>,
    ) {
        self.reset_tiles();

        let mut stamped = 0_usize;
        for (footprint, level) in structures {
            if level.is_open() {
                continue;
            }
            let start = TilePoint::from_world(footprint.origin(), self.tile_size);
            let end =
                TilePoint::from_world(footprint.corner(Direction::DownRight), self.tile_size);
            for row in start.y()..=end.y() {
                for column in start.x()..=end.x() {
                    if let Some(index) = self.index(TilePoint::new(column, row)) {
                        self.tiles[index].obstruction_level = level;
                    }
                }
            }
            stamped += 1;
        }

        self.dirty = false;
        self.revision = self.revision.wrapping_add(1);
        log::debug!(
            "collision grid rebuilt: revision {}, {} obstructing structures",
            self.revision,
            stamped
        );
    }

    /// Bounds-checked tile lookup; `None` for coordinates off the grid.
    #[must_use]
    pub fn tile(&self, at: TilePoint) -> Option<&Tile> {
        self.index(at).and_then(|index| self.tiles.get(index))
    }

    fn index(&self, at: TilePoint) -> Option<usize> {
        if at.x() < 0 || at.y() < 0 {
            return None;
        }
        let column = at.x() as u32;
        let row = at.y() as u32;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(row as usize * self.columns as usize + column as usize)
    }

    /// Reports whether an agent with the provided terrain set may not enter
    /// the tile.
    ///
    /// Fails closed: coordinates off the grid are always blocked.
    #[must_use]
    pub fn is_blocked(&self, crossable: &TerrainSet, at: TilePoint) -> bool {
        self.tile(at)
            .map_or(true, |tile| !crossable.contains(tile.obstruction_level))
    }

    /// Exact-match variant: blocked whenever the tile level differs from the
    /// single provided level.
    ///
    /// `is_blocked_level(ObstructionLevel::OPEN, at)` therefore asks "is this
    /// tile anything but empty".
    #[must_use]
    pub fn is_blocked_level(&self, level: ObstructionLevel, at: TilePoint) -> bool {
        self.tile(at)
            .map_or(true, |tile| tile.obstruction_level != level)
    }

    /// Cost of stepping onto the destination tile.
    ///
    /// Currently uniform; the signature reserves room for terrain-dependent
    /// cost without changing callers.
    #[must_use]
    pub fn movement_cost(&self, _crossable: &TerrainSet, _from: TilePoint, to: TilePoint) -> f32 {
        self.tile(to).map_or(1.0, Tile::movement_cost)
    }
}
