#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative zone state for the Skirmish simulation substrate.
//!
//! The zone owns the entities, the tile collision grid, and the coarse
//! spatial index. External layers mutate it exclusively through
//! [`apply`] and read it through the [`query`] module; pure systems never
//! touch the state directly.

mod config;
mod grid;
mod spatial;

pub use config::{ConfigError, ZoneConfig};
pub use grid::{CollisionGrid, Tile};
pub use spatial::SpatialIndex;

use skirmish_core::{
    Command, EntityId, EntityKind, EntitySnapshot, Event, Footprint, ObstructionLevel, TerrainSet,
    Velocity,
};

const FIRST_ENTITY_ID: u32 = 1;

#[derive(Clone, Debug)]
struct Agent {
    id: EntityId,
    footprint: Footprint,
    velocity: Velocity,
    obstruction_level: ObstructionLevel,
    crossable: TerrainSet,
    removable: bool,
}

impl Agent {
    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Agent,
            footprint: self.footprint,
            velocity: self.velocity,
            obstruction_level: self.obstruction_level,
            crossable: self.crossable.clone(),
            removable: self.removable,
        }
    }
}

#[derive(Clone, Debug)]
struct Structure {
    id: EntityId,
    footprint: Footprint,
    obstruction_level: ObstructionLevel,
    removable: bool,
}

impl Structure {
    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Structure,
            footprint: self.footprint,
            velocity: Velocity::ZERO,
            obstruction_level: self.obstruction_level,
            crossable: TerrainSet::open_only(),
            removable: self.removable,
        }
    }
}

/// Represents the authoritative state of a single battle zone.
#[derive(Debug)]
pub struct Zone {
    width: f32,
    height: f32,
    tile_size: f32,
    agents: Vec<Agent>,
    structures: Vec<Structure>,
    collision_grid: CollisionGrid,
    spatial: SpatialIndex,
    next_id: u32,
    tick_index: u64,
}

impl Zone {
    /// Creates a zone with the default battlefield configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&ZoneConfig::default())
    }

    /// Creates a zone from a validated configuration.
    #[must_use]
    pub fn with_config(config: &ZoneConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            tile_size: config.tile_size,
            agents: Vec::new(),
            structures: Vec::new(),
            collision_grid: CollisionGrid::new(config.width, config.height, config.tile_size),
            spatial: SpatialIndex::new(
                config.spatial_columns,
                config.spatial_rows,
                config.width,
                config.height,
            ),
            next_id: FIRST_ENTITY_ID,
            tick_index: 0,
        }
    }

    fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }

    fn allocate_id(&mut self) -> EntityId {
        if self.next_id == u32::MAX {
            log::warn!(
                "entity id space exhausted, renumbering {} live entities",
                self.agents.len() + self.structures.len()
            );
            self.renumber();
        }
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Reassigns compact sequential ids to every live entity.
    ///
    /// The spatial index holds stale ids until its next rebuild, which the
    /// renumbering triggers immediately.
    fn renumber(&mut self) {
        self.next_id = FIRST_ENTITY_ID;
        for agent in &mut self.agents {
            agent.id = EntityId::new(self.next_id);
            self.next_id += 1;
        }
        for structure in &mut self.structures {
            structure.id = EntityId::new(self.next_id);
            self.next_id += 1;
        }
        self.rebuild_spatial();
    }

    /// Sweeps every entity flagged removable since the previous tick.
    ///
    /// Removal is deferred to this single point so that the entity
    /// collections are never mutated while systems iterate snapshots taken
    /// earlier in the tick.
    fn sweep_removed(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.agents.len() {
            if self.agents[index].removable {
                let agent = self.agents.remove(index);
                out_events.push(Event::EntityRemoved {
                    id: agent.id,
                    kind: EntityKind::Agent,
                });
            } else {
                index += 1;
            }
        }

        let mut structure_removed = false;
        index = 0;
        while index < self.structures.len() {
            if self.structures[index].removable {
                let structure = self.structures.remove(index);
                out_events.push(Event::EntityRemoved {
                    id: structure.id,
                    kind: EntityKind::Structure,
                });
                structure_removed = true;
            } else {
                index += 1;
            }
        }

        if structure_removed {
            self.collision_grid.mark_dirty();
            out_events.push(Event::ObstructionLayoutChanged);
        }
    }

    fn refresh_collision_grid(&mut self) {
        let structures = &self.structures;
        self.collision_grid.rebuild_with(
            structures
                .iter()
                .map(|structure| (structure.footprint, structure.obstruction_level)),
        );
    }

    fn rebuild_spatial(&mut self) {
        let agents = &self.agents;
        self.spatial
            .rebuild_with(agents.iter().map(|agent| (agent.id, agent.footprint)));
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the zone, mutating state deterministically.
pub fn apply(zone: &mut Zone, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureZone {
            width,
            height,
            tile_size,
            spatial_columns,
            spatial_rows,
        } => {
            zone.width = width;
            zone.height = height;
            zone.tile_size = tile_size;
            zone.agents.clear();
            zone.structures.clear();
            zone.next_id = FIRST_ENTITY_ID;
            zone.tick_index = 0;
            zone.collision_grid = CollisionGrid::new(width, height, tile_size);
            zone.spatial = SpatialIndex::new(spatial_columns, spatial_rows, width, height);
            out_events.push(Event::ZoneConfigured {
                columns: zone.collision_grid.columns(),
                rows: zone.collision_grid.rows(),
            });
        }
        Command::SpawnAgent {
            position,
            width,
            height,
            obstruction_level,
            crossable,
        } => {
            let id = zone.allocate_id();
            let footprint = Footprint::new(position, width, height);
            zone.spatial.insert(id, &footprint);
            zone.agents.push(Agent {
                id,
                footprint,
                velocity: Velocity::ZERO,
                obstruction_level,
                crossable,
                removable: false,
            });
            out_events.push(Event::AgentSpawned { id, position });
        }
        Command::PlaceStructure {
            position,
            width,
            height,
            obstruction_level,
        } => {
            let id = zone.allocate_id();
            zone.structures.push(Structure {
                id,
                footprint: Footprint::new(position, width, height),
                obstruction_level,
                removable: false,
            });
            zone.collision_grid.mark_dirty();
            out_events.push(Event::StructurePlaced { id, position });
            out_events.push(Event::ObstructionLayoutChanged);
        }
        Command::SetAgentVelocity { id, velocity } => {
            if let Some(agent) = zone.agent_mut(id) {
                agent.velocity = velocity;
            }
        }
        Command::MoveAgent {
            id,
            position,
            velocity,
        } => {
            if let Some(agent) = zone.agent_mut(id) {
                let from = agent.footprint.origin();
                agent.footprint = agent.footprint.at(position);
                agent.velocity = velocity;
                out_events.push(Event::AgentMoved {
                    id,
                    from,
                    to: position,
                });
            }
        }
        Command::MarkRemovable { id } => {
            if let Some(agent) = zone.agents.iter_mut().find(|agent| agent.id == id) {
                agent.removable = true;
            } else if let Some(structure) = zone
                .structures
                .iter_mut()
                .find(|structure| structure.id == id)
            {
                structure.removable = true;
            }
        }
        Command::Tick { dt } => {
            zone.tick_index = zone.tick_index.saturating_add(1);
            zone.sweep_removed(out_events);
            if zone.collision_grid.is_dirty() {
                zone.refresh_collision_grid();
            }
            zone.rebuild_spatial();
            out_events.push(Event::TimeAdvanced { dt });
        }
    }
}

/// Query functions that provide read-only access to the zone state.
pub mod query {
    use super::{CollisionGrid, SpatialIndex, Zone};
    use skirmish_core::{
        EntityId, EntitySnapshot, EntityView, Footprint, ObstructionLevel, TilePoint, WorldPoint,
    };

    /// Zone width in world units.
    #[must_use]
    pub fn zone_width(zone: &Zone) -> f32 {
        zone.width
    }

    /// Zone height in world units.
    #[must_use]
    pub fn zone_height(zone: &Zone) -> f32 {
        zone.height
    }

    /// Side length of a collision tile in world units.
    #[must_use]
    pub fn tile_size(zone: &Zone) -> f32 {
        zone.tile_size
    }

    /// Number of ticks processed since the zone was configured.
    #[must_use]
    pub fn tick_index(zone: &Zone) -> u64 {
        zone.tick_index
    }

    /// Provides read-only access to the tile collision grid.
    #[must_use]
    pub fn collision_grid(zone: &Zone) -> &CollisionGrid {
        &zone.collision_grid
    }

    /// Provides read-only access to the coarse spatial index.
    #[must_use]
    pub fn spatial_index(zone: &Zone) -> &SpatialIndex {
        &zone.spatial
    }

    /// Captures a read-only view of every entity, sorted by id.
    #[must_use]
    pub fn entities(zone: &Zone) -> EntityView {
        let mut snapshots: Vec<EntitySnapshot> =
            zone.agents.iter().map(super::Agent::snapshot).collect();
        snapshots.extend(zone.structures.iter().map(super::Structure::snapshot));
        EntityView::from_snapshots(snapshots)
    }

    /// Retrieves the snapshot of a single entity, if it exists.
    #[must_use]
    pub fn entity(zone: &Zone, id: EntityId) -> Option<EntitySnapshot> {
        zone.agents
            .iter()
            .find(|agent| agent.id == id)
            .map(super::Agent::snapshot)
            .or_else(|| {
                zone.structures
                    .iter()
                    .find(|structure| structure.id == id)
                    .map(super::Structure::snapshot)
            })
    }

    /// Finds the entity occupying the provided world position, if any.
    ///
    /// Agents are searched first through the spatial index; structures are
    /// only scanned when the collision grid reports the tile under the point
    /// as anything but empty, so an open tile never pays for a structure
    /// scan. An unoccupied position is an ordinary `None`, not an error.
    #[must_use]
    pub fn entity_at(zone: &Zone, point: WorldPoint) -> Option<EntitySnapshot> {
        let probe = Footprint::new(point, 1.0, 1.0);
        for id in zone.spatial.candidates(&probe) {
            if let Some(agent) = zone.agents.iter().find(|agent| agent.id == id) {
                if agent.footprint.contains(point) {
                    return Some(agent.snapshot());
                }
            }
        }

        let tile = TilePoint::from_world(point, zone.tile_size);
        if zone
            .collision_grid
            .is_blocked_level(ObstructionLevel::OPEN, tile)
        {
            return zone
                .structures
                .iter()
                .find(|structure| structure.footprint.contains(point))
                .map(super::Structure::snapshot);
        }
        None
    }
}
