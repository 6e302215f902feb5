#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that integrates agent velocities and
//! resolves collisions into the historical "soft bounce" response.
//!
//! The system never mutates the zone. It consumes `TimeAdvanced` events plus
//! immutable views, resolves each agent's proposed move against the
//! collision state captured at the top of the tick, and emits
//! [`Command::MoveAgent`] values for the zone to apply verbatim.

use skirmish_core::{
    Command, Direction, EntityKind, EntitySnapshot, EntityView, Event, Velocity, WorldPoint,
};
use skirmish_system_collision::{check_collisions, collided_sides};
use skirmish_world::{CollisionGrid, SpatialIndex};

/// Pure system that reacts to zone events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Consumes zone events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        entities: &EntityView,
        spatial: &SpatialIndex,
        grid: &CollisionGrid,
        zone_width: f32,
        zone_height: f32,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };
            let seconds = dt.as_secs_f32();

            for entity in entities.iter() {
                if entity.kind != EntityKind::Agent || entity.velocity.is_zero() {
                    continue;
                }
                let resolved =
                    resolve_move(entity, entities, spatial, grid, zone_width, zone_height, seconds);
                out.push(Command::MoveAgent {
                    id: entity.id,
                    position: resolved.position,
                    velocity: resolved.velocity,
                });
            }
        }
    }
}

struct ResolvedMove {
    position: WorldPoint,
    velocity: Velocity,
}

/// Integrates one agent's velocity and applies the soft-bounce response.
///
/// For every collision side present, the velocity component opposing that
/// side is inverted and halved, never zeroed, and the position along that
/// axis falls back to the pre-move value. Bleeding momentum this way keeps
/// agents from sticking to whatever they ran into.
fn resolve_move(
    entity: &EntitySnapshot,
    entities: &EntityView,
    spatial: &SpatialIndex,
    grid: &CollisionGrid,
    zone_width: f32,
    zone_height: f32,
    seconds: f32,
) -> ResolvedMove {
    let before = entity.footprint.origin();
    let proposed = WorldPoint::new(
        before.x() + entity.velocity.dx() * seconds,
        before.y() + entity.velocity.dy() * seconds,
    );

    let mut moved = entity.clone();
    moved.footprint = entity.footprint.at(proposed);

    let colliding = check_collisions(&moved, entities, spatial, grid);
    let sides = collided_sides(&moved, &colliding, zone_width, zone_height);

    let mut x = proposed.x();
    let mut y = proposed.y();
    let mut dx = entity.velocity.dx();
    let mut dy = entity.velocity.dy();

    if sides.contains(Direction::Left) {
        dx = -dx / 2.0;
        x = before.x();
    }
    if sides.contains(Direction::Right) {
        dx = -dx / 2.0;
        x = before.x();
    }
    if sides.contains(Direction::Up) {
        dy = -dy / 2.0;
        y = before.y();
    }
    if sides.contains(Direction::Down) {
        dy = -dy / 2.0;
        y = before.y();
    }

    ResolvedMove {
        position: WorldPoint::new(x, y),
        velocity: Velocity::new(dx, dy),
    }
}
