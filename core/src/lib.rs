#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish simulation substrate.
//!
//! This crate defines the message surface that connects the external
//! entity/AI layers, the authoritative zone, and pure systems. Callers submit
//! [`Command`] values describing desired mutations, the zone executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Unique identifier assigned to an entity within a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Integer terrain tag carried by tiles and entities.
///
/// Level zero is open ground that everything may traverse; non-zero levels
/// classify obstacle families (walls, water, swamp, ...) that agents must
/// explicitly be permitted to cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstructionLevel(u32);

impl ObstructionLevel {
    /// The universally passable level.
    pub const OPEN: Self = Self(0);

    /// Creates a new obstruction level with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether this is the universally passable level.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.0 == 0
    }
}

/// Set of obstruction levels an agent is permitted to traverse.
///
/// Stored sorted and deduplicated so that equal sets compare and hash equal
/// regardless of construction order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainSet {
    levels: Vec<ObstructionLevel>,
}

impl TerrainSet {
    /// Creates a set containing only open ground.
    #[must_use]
    pub fn open_only() -> Self {
        Self {
            levels: vec![ObstructionLevel::OPEN],
        }
    }

    /// Creates a set from the provided levels, sorting and deduplicating.
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = ObstructionLevel>) -> Self {
        let mut levels: Vec<ObstructionLevel> = levels.into_iter().collect();
        levels.sort_unstable();
        levels.dedup();
        Self { levels }
    }

    /// Reports whether the provided level may be crossed.
    #[must_use]
    pub fn contains(&self, level: ObstructionLevel) -> bool {
        self.levels.binary_search(&level).is_ok()
    }

    /// The contained levels in ascending order.
    #[must_use]
    pub fn levels(&self) -> &[ObstructionLevel] {
        &self.levels
    }
}

impl Default for TerrainSet {
    fn default() -> Self {
        Self::open_only()
    }
}

/// Movement and collision directions, including the neutral `Stay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// No direction at all; the base value of every collision result.
    Stay,
    /// Toward decreasing y.
    Up,
    /// Toward increasing y.
    Down,
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
    /// Toward decreasing x and decreasing y.
    UpLeft,
    /// Toward increasing x and decreasing y.
    UpRight,
    /// Toward decreasing x and increasing y.
    DownLeft,
    /// Toward increasing x and increasing y.
    DownRight,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Stay,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    const fn bit(self) -> u16 {
        match self {
            Self::Stay => 1 << 0,
            Self::Up => 1 << 1,
            Self::Down => 1 << 2,
            Self::Left => 1 << 3,
            Self::Right => 1 << 4,
            Self::UpLeft => 1 << 5,
            Self::UpRight => 1 << 6,
            Self::DownLeft => 1 << 7,
            Self::DownRight => 1 << 8,
        }
    }
}

/// Compact set of [`Direction`] values with deterministic iteration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionSet {
    bits: u16,
}

impl DirectionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Inserts a direction into the set.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= direction.bit();
    }

    /// Reports whether the direction is present.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.bits & direction.bit() != 0
    }

    /// Number of directions present.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Reports whether no direction is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates the contained directions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.contains(*direction))
    }
}

/// Position in world units, measured from the zone's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    dx: f32,
    dy: f32,
}

impl Velocity {
    /// The zero velocity.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates a new velocity from per-axis components.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component in world units per second.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component in world units per second.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }

    /// Reports whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Location of a single tile expressed as signed column and row indices.
///
/// Coordinates are signed so that probes derived from world positions near
/// the zone edge stay representable; the grid answers "blocked" for anything
/// outside its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePoint {
    x: i32,
    y: i32,
}

impl TilePoint {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// The canonical world-to-tile conversion: floor division by tile size.
    ///
    /// Every call site that locates a world position on the collision grid
    /// must go through this helper so that pixel and tile coordinate spaces
    /// never mix.
    #[must_use]
    pub fn from_world(point: WorldPoint, tile_size: f32) -> Self {
        Self {
            x: (point.x() / tile_size).floor() as i32,
            y: (point.y() / tile_size).floor() as i32,
        }
    }
}

/// Axis-aligned body of an entity in world units.
///
/// Extents are inclusive: a body of width `w` anchored at `x` spans
/// `[x, x + w - 1]`. This matches the tile range a structure stamps onto the
/// collision grid, so a 32-wide structure at the origin covers exactly one
/// 32-unit tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    origin: WorldPoint,
    width: f32,
    height: f32,
}

impl Footprint {
    /// Creates a footprint from a top-left origin and extents.
    #[must_use]
    pub const fn new(origin: WorldPoint, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Top-left origin of the body.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Horizontal extent in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Smallest x coordinate covered by the body.
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.origin.x()
    }

    /// Smallest y coordinate covered by the body.
    #[must_use]
    pub const fn min_y(&self) -> f32 {
        self.origin.y()
    }

    /// Largest x coordinate covered by the body (inclusive).
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.origin.x() + self.width - 1.0
    }

    /// Largest y coordinate covered by the body (inclusive).
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.origin.y() + self.height - 1.0
    }

    /// Horizontal center of the body.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.origin.x() + self.width / 2.0
    }

    /// Vertical center of the body.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.origin.y() + self.height / 2.0
    }

    /// Half of the horizontal extent.
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Half of the vertical extent.
    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Returns a copy of the footprint anchored at a new origin.
    #[must_use]
    pub const fn at(&self, origin: WorldPoint) -> Self {
        Self {
            origin,
            width: self.width,
            height: self.height,
        }
    }

    /// The four corner points in up-left, up-right, down-left, down-right
    /// order.
    #[must_use]
    pub fn corners(&self) -> [WorldPoint; 4] {
        [
            self.corner(Direction::UpLeft),
            self.corner(Direction::UpRight),
            self.corner(Direction::DownLeft),
            self.corner(Direction::DownRight),
        ]
    }

    /// The point of the body keyed by direction: corners for the diagonal
    /// directions, edge midpoints for the cardinals, the center for `Stay`.
    #[must_use]
    pub fn corner(&self, direction: Direction) -> WorldPoint {
        match direction {
            Direction::UpLeft => WorldPoint::new(self.min_x(), self.min_y()),
            Direction::UpRight => WorldPoint::new(self.max_x(), self.min_y()),
            Direction::DownLeft => WorldPoint::new(self.min_x(), self.max_y()),
            Direction::DownRight => WorldPoint::new(self.max_x(), self.max_y()),
            Direction::Up => WorldPoint::new(self.center_x(), self.min_y()),
            Direction::Down => WorldPoint::new(self.center_x(), self.max_y()),
            Direction::Left => WorldPoint::new(self.min_x(), self.center_y()),
            Direction::Right => WorldPoint::new(self.max_x(), self.center_y()),
            Direction::Stay => WorldPoint::new(self.center_x(), self.center_y()),
        }
    }

    /// Inclusive axis-aligned intersection test.
    #[must_use]
    pub fn intersects(&self, other: &Footprint) -> bool {
        self.max_x() >= other.min_x()
            && self.min_x() <= other.max_x()
            && self.max_y() >= other.min_y()
            && self.min_y() <= other.max_y()
    }

    /// Reports whether the point lies inside the body (inclusive).
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x() >= self.min_x()
            && point.x() <= self.max_x()
            && point.y() >= self.min_y()
            && point.y() <= self.max_y()
    }
}

/// Discriminates the two entity families tracked by a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A moving agent with velocity and a crossable-terrain set.
    Agent,
    /// A static structure stamped onto the collision grid.
    Structure,
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Whether the entity is a moving agent or a static structure.
    pub kind: EntityKind,
    /// Axis-aligned body of the entity.
    pub footprint: Footprint,
    /// Current velocity; always zero for structures.
    pub velocity: Velocity,
    /// Terrain family the entity itself represents.
    pub obstruction_level: ObstructionLevel,
    /// Levels the entity may traverse; open-only for structures.
    pub crossable: TerrainSet,
    /// Indicates whether the entity is flagged for the next sweep.
    pub removable: bool,
}

/// Read-only snapshot describing all entities within a zone.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot with the provided identifier, if present.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Route produced by the pathfinding engine.
///
/// A path from a tile to itself is a valid single-waypoint route with zero
/// cost; the absence of any route is reported through an error value, never
/// through an empty path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<TilePoint>,
    total_cost: f32,
}

impl Path {
    /// Creates a path from ordered waypoints and their accumulated cost.
    #[must_use]
    pub fn new(waypoints: Vec<TilePoint>, total_cost: f32) -> Self {
        Self {
            waypoints,
            total_cost,
        }
    }

    /// Ordered tile waypoints from start to goal, inclusive.
    #[must_use]
    pub fn waypoints(&self) -> &[TilePoint] {
        &self.waypoints
    }

    /// Accumulated movement cost along the route.
    #[must_use]
    pub const fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// Number of waypoints in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the route holds no waypoints at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Commands that express all permissible zone mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the zone's dimensions and grid resolutions.
    ConfigureZone {
        /// Zone width in world units.
        width: f32,
        /// Zone height in world units.
        height: f32,
        /// Side length of a square collision tile in world units.
        tile_size: f32,
        /// Number of spatial-index bucket columns.
        spatial_columns: u32,
        /// Number of spatial-index bucket rows.
        spatial_rows: u32,
    },
    /// Requests that a new agent be created.
    SpawnAgent {
        /// Top-left position of the agent's body.
        position: WorldPoint,
        /// Horizontal extent of the body in world units.
        width: f32,
        /// Vertical extent of the body in world units.
        height: f32,
        /// Terrain family the agent itself represents.
        obstruction_level: ObstructionLevel,
        /// Levels the agent is permitted to traverse.
        crossable: TerrainSet,
    },
    /// Requests that a new static structure be created.
    PlaceStructure {
        /// Top-left position of the structure's body.
        position: WorldPoint,
        /// Horizontal extent of the body in world units.
        width: f32,
        /// Vertical extent of the body in world units.
        height: f32,
        /// Terrain family stamped onto the collision grid.
        obstruction_level: ObstructionLevel,
    },
    /// Updates an agent's velocity intent.
    SetAgentVelocity {
        /// Identifier of the agent.
        id: EntityId,
        /// New velocity in world units per second.
        velocity: Velocity,
    },
    /// Applies an already-resolved movement result to an agent.
    ///
    /// Emitted by the movement system after collision resolution; the zone
    /// applies position and velocity verbatim.
    MoveAgent {
        /// Identifier of the agent.
        id: EntityId,
        /// Post-resolution top-left position.
        position: WorldPoint,
        /// Post-resolution velocity.
        velocity: Velocity,
    },
    /// Flags an entity for removal at the top of the next tick.
    MarkRemovable {
        /// Identifier of the entity to remove.
        id: EntityId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the zone after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the zone was configured with the given grid dimensions.
    ZoneConfigured {
        /// Number of collision-grid columns.
        columns: u32,
        /// Number of collision-grid rows.
        rows: u32,
    },
    /// Confirms that an agent was created.
    AgentSpawned {
        /// Identifier assigned to the agent.
        id: EntityId,
        /// Top-left position the agent occupies.
        position: WorldPoint,
    },
    /// Confirms that a structure was created.
    StructurePlaced {
        /// Identifier assigned to the structure.
        id: EntityId,
        /// Top-left position the structure occupies.
        position: WorldPoint,
    },
    /// Confirms that an agent's position was updated.
    AgentMoved {
        /// Identifier of the agent that moved.
        id: EntityId,
        /// Position before the move.
        from: WorldPoint,
        /// Position after the move.
        to: WorldPoint,
    },
    /// Confirms that a flagged entity was swept from the zone.
    EntityRemoved {
        /// Identifier of the removed entity.
        id: EntityId,
        /// Family the removed entity belonged to.
        kind: EntityKind,
    },
    /// Announces that the static obstruction layout changed.
    ///
    /// Pathfinding caches must be refreshed before the next query.
    ObstructionLayoutChanged,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        Direction, DirectionSet, EntityId, Footprint, ObstructionLevel, TerrainSet, TilePoint,
        WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn tile_point_round_trips_through_bincode() {
        assert_round_trip(&TilePoint::new(-3, 17));
    }

    #[test]
    fn terrain_set_round_trips_through_bincode() {
        let terrain = TerrainSet::from_levels([ObstructionLevel::new(2), ObstructionLevel::OPEN]);
        assert_round_trip(&terrain);
    }

    #[test]
    fn terrain_set_sorts_and_dedups() {
        let terrain = TerrainSet::from_levels([
            ObstructionLevel::new(5),
            ObstructionLevel::OPEN,
            ObstructionLevel::new(5),
            ObstructionLevel::new(1),
        ]);
        let levels: Vec<u32> = terrain.levels().iter().map(ObstructionLevel::get).collect();
        assert_eq!(levels, vec![0, 1, 5]);
        assert!(terrain.contains(ObstructionLevel::new(1)));
        assert!(!terrain.contains(ObstructionLevel::new(3)));
    }

    #[test]
    fn direction_set_iterates_in_declaration_order() {
        let mut set = DirectionSet::empty();
        set.insert(Direction::Right);
        set.insert(Direction::Stay);
        set.insert(Direction::Up);

        let collected: Vec<Direction> = set.iter().collect();
        assert_eq!(
            collected,
            vec![Direction::Stay, Direction::Up, Direction::Right]
        );
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Direction::Left));
    }

    #[test]
    fn world_to_tile_conversion_floors() {
        assert_eq!(
            TilePoint::from_world(WorldPoint::new(95.0, 64.0), 32.0),
            TilePoint::new(2, 2)
        );
        assert_eq!(
            TilePoint::from_world(WorldPoint::new(-0.5, 31.9), 32.0),
            TilePoint::new(-1, 0)
        );
    }

    #[test]
    fn footprint_corners_are_inclusive() {
        let body = Footprint::new(WorldPoint::new(10.0, 20.0), 32.0, 32.0);
        assert_eq!(body.corner(Direction::UpLeft), WorldPoint::new(10.0, 20.0));
        assert_eq!(
            body.corner(Direction::DownRight),
            WorldPoint::new(41.0, 51.0)
        );
        assert_eq!(body.center_x(), 26.0);
        assert_eq!(body.center_y(), 36.0);
    }

    #[test]
    fn footprint_intersection_is_inclusive() {
        let left = Footprint::new(WorldPoint::new(0.0, 0.0), 32.0, 32.0);
        let touching = Footprint::new(WorldPoint::new(31.0, 0.0), 32.0, 32.0);
        let separated = Footprint::new(WorldPoint::new(32.0, 0.0), 32.0, 32.0);
        assert!(left.intersects(&touching));
        assert!(!left.intersects(&separated));
    }
}
