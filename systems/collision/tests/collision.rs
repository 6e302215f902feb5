use std::time::Duration;

use skirmish_core::{
    Command, Direction, EntityId, ObstructionLevel, TerrainSet, WorldPoint,
};
use skirmish_system_collision::{check_collisions, collided_sides};
use skirmish_world::{self as world, query, Zone};

const AGENT_LEVEL: u32 = 9;

fn tick(zone: &mut Zone) {
    let mut events = Vec::new();
    world::apply(
        zone,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
}

fn spawn_agent(zone: &mut Zone, x: f32, y: f32, crossable: TerrainSet) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        zone,
        Command::SpawnAgent {
            position: WorldPoint::new(x, y),
            width: 32.0,
            height: 32.0,
            obstruction_level: ObstructionLevel::new(AGENT_LEVEL),
            crossable,
        },
        &mut events,
    );
    match events.first() {
        Some(skirmish_core::Event::AgentSpawned { id, .. }) => *id,
        other => panic!("expected AgentSpawned, got {other:?}"),
    }
}

fn place_structure(zone: &mut Zone, x: f32, y: f32, w: f32, h: f32, level: u32) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        zone,
        Command::PlaceStructure {
            position: WorldPoint::new(x, y),
            width: w,
            height: h,
            obstruction_level: ObstructionLevel::new(level),
        },
        &mut events,
    );
    match events.first() {
        Some(skirmish_core::Event::StructurePlaced { id, .. }) => *id,
        other => panic!("expected StructurePlaced, got {other:?}"),
    }
}

fn collisions_for(zone: &Zone, id: EntityId) -> Vec<EntityId> {
    let entities = query::entities(zone);
    let entity = entities.get(id).expect("queried entity exists").clone();
    check_collisions(
        &entity,
        &entities,
        query::spatial_index(zone),
        query::collision_grid(zone),
    )
    .into_iter()
    .map(|snapshot| snapshot.id)
    .collect()
}

#[test]
fn distant_entities_are_never_reported() {
    let mut zone = Zone::new();
    let near = spawn_agent(&mut zone, 100.0, 100.0, TerrainSet::open_only());
    let far = spawn_agent(&mut zone, 1000.0, 1000.0, TerrainSet::open_only());
    tick(&mut zone);

    assert!(collisions_for(&zone, near).is_empty());
    assert!(collisions_for(&zone, far).is_empty());
}

#[test]
fn overlapping_agents_are_reported_exactly_once() {
    let mut zone = Zone::new();
    // Both bodies straddle the bucket boundary at x = 160 and y = 120,
    // so the pair shares four spatial buckets.
    let first = spawn_agent(&mut zone, 140.0, 100.0, TerrainSet::open_only());
    let second = spawn_agent(&mut zone, 150.0, 110.0, TerrainSet::open_only());
    tick(&mut zone);

    assert_eq!(collisions_for(&zone, first), vec![second]);
    assert_eq!(collisions_for(&zone, second), vec![first]);
}

#[test]
fn crossable_agents_are_logically_passable() {
    let mut zone = Zone::new();
    let tolerant = TerrainSet::from_levels([
        ObstructionLevel::OPEN,
        ObstructionLevel::new(AGENT_LEVEL),
    ]);
    let ghost = spawn_agent(&mut zone, 100.0, 100.0, tolerant);
    let other = spawn_agent(&mut zone, 110.0, 100.0, TerrainSet::open_only());
    tick(&mut zone);

    // The tolerant agent may cross the other's obstruction level, so the
    // geometric overlap is not a collision for it; the strict agent still
    // sees the tolerant one.
    assert!(collisions_for(&zone, ghost).is_empty());
    assert_eq!(collisions_for(&zone, other), vec![ghost]);
}

#[test]
fn blocked_corner_pulls_in_structure_collisions() {
    let mut zone = Zone::new();
    let wall = place_structure(&mut zone, 64.0, 64.0, 64.0, 64.0, 1);
    let agent = spawn_agent(&mut zone, 70.0, 70.0, TerrainSet::open_only());
    tick(&mut zone);

    assert_eq!(collisions_for(&zone, agent), vec![wall]);
}

#[test]
fn open_terrain_skips_the_structure_scan() {
    let mut zone = Zone::new();
    let crossable = TerrainSet::from_levels([ObstructionLevel::OPEN, ObstructionLevel::new(1)]);
    let _wade_pool = place_structure(&mut zone, 64.0, 64.0, 64.0, 64.0, 1);
    let agent = spawn_agent(&mut zone, 70.0, 70.0, crossable);
    tick(&mut zone);

    assert!(collisions_for(&zone, agent).is_empty());
}

#[test]
fn sides_report_stay_only_when_clear_of_everything() {
    let mut zone = Zone::new();
    let agent = spawn_agent(&mut zone, 300.0, 300.0, TerrainSet::open_only());
    tick(&mut zone);

    let entities = query::entities(&zone);
    let snapshot = entities.get(agent).expect("agent exists");
    let sides = collided_sides(
        snapshot,
        &[],
        query::zone_width(&zone),
        query::zone_height(&zone),
    );
    assert_eq!(sides.len(), 1);
    assert!(sides.contains(Direction::Stay));
}

#[test]
fn wall_contact_classifies_toward_the_wall() {
    let mut zone = Zone::new();
    let _wall = place_structure(&mut zone, 128.0, 64.0, 32.0, 96.0, 1);
    let agent = spawn_agent(&mut zone, 98.0, 96.0, TerrainSet::open_only());
    tick(&mut zone);

    let entities = query::entities(&zone);
    let snapshot = entities.get(agent).expect("agent exists").clone();
    let colliding = check_collisions(
        &snapshot,
        &entities,
        query::spatial_index(&zone),
        query::collision_grid(&zone),
    );
    assert_eq!(colliding.len(), 1);

    let sides = collided_sides(
        &snapshot,
        &colliding,
        query::zone_width(&zone),
        query::zone_height(&zone),
    );
    assert!(sides.contains(Direction::Stay));
    assert!(sides.contains(Direction::Right));
    assert!(!sides.contains(Direction::Left));
}
