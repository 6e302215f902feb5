use std::time::Duration;

use skirmish_core::{
    Command, EntityId, Event, ObstructionLevel, TerrainSet, Velocity, WorldPoint,
};
use skirmish_system_movement::Movement;
use skirmish_world::{self as world, query, Zone};

fn spawn_agent(zone: &mut Zone, x: f32, y: f32) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        zone,
        Command::SpawnAgent {
            position: WorldPoint::new(x, y),
            width: 32.0,
            height: 32.0,
            obstruction_level: ObstructionLevel::new(9),
            crossable: TerrainSet::open_only(),
        },
        &mut events,
    );
    match events.first() {
        Some(Event::AgentSpawned { id, .. }) => *id,
        other => panic!("expected AgentSpawned, got {other:?}"),
    }
}

fn tick(zone: &mut Zone, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(zone, Command::Tick { dt }, &mut events);
    events
}

fn pump_movement(zone: &mut Zone, movement: &mut Movement, events: &[Event]) {
    let entities = query::entities(zone);
    let mut commands = Vec::new();
    movement.handle(
        events,
        &entities,
        query::spatial_index(zone),
        query::collision_grid(zone),
        query::zone_width(zone),
        query::zone_height(zone),
        &mut commands,
    );
    let mut apply_events = Vec::new();
    for command in commands {
        world::apply(zone, command, &mut apply_events);
    }
}

#[test]
fn free_agent_integrates_velocity_over_the_tick() {
    let mut zone = Zone::new();
    let agent = spawn_agent(&mut zone, 300.0, 300.0);

    let mut events = Vec::new();
    world::apply(
        &mut zone,
        Command::SetAgentVelocity {
            id: agent,
            velocity: Velocity::new(32.0, 16.0),
        },
        &mut events,
    );

    let events = tick(&mut zone, Duration::from_millis(500));
    let mut movement = Movement::default();
    pump_movement(&mut zone, &mut movement, &events);

    let snapshot = query::entity(&zone, agent).expect("agent exists");
    assert_eq!(snapshot.footprint.origin(), WorldPoint::new(316.0, 308.0));
    assert_eq!(snapshot.velocity, Velocity::new(32.0, 16.0));
}

#[test]
fn wall_contact_soft_bounces_the_opposing_axis() {
    let mut zone = Zone::new();
    let mut events = Vec::new();
    // Wall covering tile column 4, rows 2..=4.
    world::apply(
        &mut zone,
        Command::PlaceStructure {
            position: WorldPoint::new(128.0, 64.0),
            width: 32.0,
            height: 96.0,
            obstruction_level: ObstructionLevel::new(1),
        },
        &mut events,
    );
    let agent = spawn_agent(&mut zone, 94.0, 96.0);
    world::apply(
        &mut zone,
        Command::SetAgentVelocity {
            id: agent,
            velocity: Velocity::new(16.0, 0.0),
        },
        &mut events,
    );

    let events = tick(&mut zone, Duration::from_secs(1));
    let mut movement = Movement::default();
    pump_movement(&mut zone, &mut movement, &events);

    // The proposed move would overlap the wall, so the x position falls
    // back to the pre-move value and the x component inverts and halves.
    let snapshot = query::entity(&zone, agent).expect("agent exists");
    assert_eq!(snapshot.footprint.origin(), WorldPoint::new(94.0, 96.0));
    assert_eq!(snapshot.velocity, Velocity::new(-8.0, 0.0));
}

#[test]
fn agents_bounce_off_each_other_without_sticking() {
    let mut zone = Zone::new();
    let mover = spawn_agent(&mut zone, 300.0, 300.0);
    let _blocker = spawn_agent(&mut zone, 348.0, 300.0);

    let mut events = Vec::new();
    world::apply(
        &mut zone,
        Command::SetAgentVelocity {
            id: mover,
            velocity: Velocity::new(64.0, 0.0),
        },
        &mut events,
    );

    let events = tick(&mut zone, Duration::from_millis(500));
    let mut movement = Movement::default();
    pump_movement(&mut zone, &mut movement, &events);

    let snapshot = query::entity(&zone, mover).expect("agent exists");
    assert_eq!(snapshot.footprint.origin(), WorldPoint::new(300.0, 300.0));
    assert_eq!(snapshot.velocity, Velocity::new(-32.0, 0.0));
}

#[test]
fn stationary_agents_emit_no_commands() {
    let mut zone = Zone::new();
    let _idle = spawn_agent(&mut zone, 300.0, 300.0);
    let events = tick(&mut zone, Duration::from_millis(500));

    let entities = query::entities(&zone);
    let mut commands = Vec::new();
    Movement::default().handle(
        &events,
        &entities,
        query::spatial_index(&zone),
        query::collision_grid(&zone),
        query::zone_width(&zone),
        query::zone_height(&zone),
        &mut commands,
    );
    assert!(commands.is_empty());
}
