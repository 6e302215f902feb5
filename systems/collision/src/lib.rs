#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure collision resolver combining spatial-index pruning, exact overlap
//! tests, and directional classification.
//!
//! The resolver never mutates the zone; it consumes immutable views captured
//! at the top of the tick and returns plain values the movement layer acts
//! on.

use skirmish_core::{
    Direction, DirectionSet, EntityKind, EntitySnapshot, EntityView, Footprint, TilePoint,
    WorldPoint,
};
use skirmish_world::{CollisionGrid, SpatialIndex};

/// Returns every entity currently colliding with the queried entity.
///
/// The pipeline runs broad to narrow: deduplicated agent candidates from the
/// spatial index, a coarse per-axis half-extent rejection, then the exact
/// body intersection. Static structures are only scanned when the collision
/// grid already reports one of the querying agent's corners as blocked for
/// its terrain set, so agents on open ground never pay for a structure scan.
/// Candidates whose obstruction level the querying agent may cross are
/// dropped last: they overlap geometrically but are logically passable.
#[must_use]
pub fn check_collisions(
    entity: &EntitySnapshot,
    entities: &EntityView,
    spatial: &SpatialIndex,
    grid: &CollisionGrid,
) -> Vec<EntitySnapshot> {
    let mut colliding: Vec<EntitySnapshot> = Vec::new();

    for id in spatial.candidates(&entity.footprint) {
        if id == entity.id {
            continue;
        }
        let Some(candidate) = entities.get(id) else {
            continue;
        };
        if overlaps(entity, candidate) {
            colliding.push(candidate.clone());
        }
    }

    match entity.kind {
        EntityKind::Agent => {
            if corner_on_blocked_tile(entity, grid) {
                add_structure_collisions(entity, entities, &mut colliding);
            }
            colliding.retain(|other| !entity.crossable.contains(other.obstruction_level));
        }
        EntityKind::Structure => {
            add_structure_collisions(entity, entities, &mut colliding);
        }
    }

    colliding
}

/// Classifies which sides of the entity the collisions press against.
///
/// `Stay` is always present. Each collider is classified by center deltas:
/// the axis with the larger absolute delta wins, and X wins exact ties; the
/// historical convention, kept for compatibility rather than physical
/// accuracy. Zone-boundary clamps are applied independently of any
/// collision.
#[must_use]
pub fn collided_sides(
    entity: &EntitySnapshot,
    colliding: &[EntitySnapshot],
    zone_width: f32,
    zone_height: f32,
) -> DirectionSet {
    let mut sides = DirectionSet::empty();
    sides.insert(Direction::Stay);

    let body = &entity.footprint;
    for other in colliding {
        let dx = body.center_x() - other.footprint.center_x();
        let dy = body.center_y() - other.footprint.center_y();
        if dx.abs() >= dy.abs() {
            if body.center_x() <= other.footprint.center_x() {
                sides.insert(Direction::Right);
            } else {
                sides.insert(Direction::Left);
            }
        } else if body.center_y() >= other.footprint.center_y() {
            sides.insert(Direction::Up);
        } else {
            sides.insert(Direction::Down);
        }
    }

    if body.origin().x() <= 0.0 {
        sides.insert(Direction::Left);
    }
    if body.origin().y() <= 0.0 {
        sides.insert(Direction::Up);
    }
    if body.center_x() >= zone_width {
        sides.insert(Direction::Right);
    }
    if body.center_y() >= zone_height {
        sides.insert(Direction::Down);
    }

    sides
}

/// Returns every entity whose body crosses the segment between two points.
///
/// Useful for line-of-sight checks. Every entity is coarse-pruned against
/// the segment's bounding extent before the exact clip test; there is no
/// terrain filtering here, since sight and movement block differently.
#[must_use]
pub fn check_line_collisions(
    start: WorldPoint,
    goal: WorldPoint,
    entities: &EntityView,
) -> Vec<EntitySnapshot> {
    let reach_x = (goal.x() - start.x()).abs();
    let reach_y = (goal.y() - start.y()).abs();

    entities
        .iter()
        .filter(|candidate| {
            let body = &candidate.footprint;
            (body.center_x() - start.x()).abs() <= body.width() + reach_x
                && (body.center_y() - start.y()).abs() <= body.height() + reach_y
        })
        .filter(|candidate| segment_crosses(&candidate.footprint, start, goal))
        .cloned()
        .collect()
}

/// Liang-Barsky clip of a segment against the body's bounds.
fn segment_crosses(body: &Footprint, a: WorldPoint, b: WorldPoint) -> bool {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;

    let clips = [
        (-dx, a.x() - body.min_x()),
        (dx, body.max_x() - a.x()),
        (-dy, a.y() - body.min_y()),
        (dy, body.max_y() - a.y()),
    ];
    for (denominator, distance) in clips {
        if denominator == 0.0 {
            if distance < 0.0 {
                return false;
            }
        } else {
            let t = distance / denominator;
            if denominator < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
        }
    }
    enter <= exit
}

/// Coarse rejection followed by the exact intersection test.
fn overlaps(entity: &EntitySnapshot, candidate: &EntitySnapshot) -> bool {
    let body = &entity.footprint;
    let other = &candidate.footprint;

    let dx = (body.center_x() - other.center_x()).abs();
    let dy = (body.center_y() - other.center_y()).abs();
    if dx > body.half_width() + other.half_width() || dy > body.half_height() + other.half_height()
    {
        return false;
    }

    body.intersects(other)
}

/// Tests the agent's four corners against the grid with its terrain set.
fn corner_on_blocked_tile(entity: &EntitySnapshot, grid: &CollisionGrid) -> bool {
    entity.footprint.corners().into_iter().any(|corner| {
        grid.is_blocked(
            &entity.crossable,
            TilePoint::from_world(corner, grid.tile_size()),
        )
    })
}

fn add_structure_collisions(
    entity: &EntitySnapshot,
    entities: &EntityView,
    colliding: &mut Vec<EntitySnapshot>,
) {
    for candidate in entities.iter() {
        if candidate.kind != EntityKind::Structure || candidate.id == entity.id {
            continue;
        }
        if overlaps(entity, candidate) {
            colliding.push(candidate.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{
        EntityId, EntityKind, Footprint, ObstructionLevel, TerrainSet, Velocity, WorldPoint,
    };

    fn agent(id: u32, x: f32, y: f32, crossable: TerrainSet) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            kind: EntityKind::Agent,
            footprint: Footprint::new(WorldPoint::new(x, y), 32.0, 32.0),
            velocity: Velocity::ZERO,
            obstruction_level: ObstructionLevel::OPEN,
            crossable,
            removable: false,
        }
    }

    #[test]
    fn separated_centers_never_classify_as_overlap() {
        let a = agent(1, 100.0, 100.0, TerrainSet::open_only());
        let b = agent(2, 164.0, 100.0, TerrainSet::open_only());
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn touching_bodies_overlap() {
        let a = agent(1, 100.0, 100.0, TerrainSet::open_only());
        let b = agent(2, 131.0, 100.0, TerrainSet::open_only());
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn stay_is_always_present() {
        let entity = agent(1, 100.0, 100.0, TerrainSet::open_only());
        let sides = collided_sides(&entity, &[], 800.0, 600.0);
        assert_eq!(sides.len(), 1);
        assert!(sides.contains(Direction::Stay));
    }

    #[test]
    fn x_axis_wins_classification_ties() {
        let entity = agent(1, 100.0, 100.0, TerrainSet::open_only());
        // Equal |dx| and |dy|: the X axis must decide, and the collider
        // sits down-right, so the reported side is Right, not Down.
        let diagonal = agent(2, 120.0, 120.0, TerrainSet::open_only());
        let sides = collided_sides(&entity, &[diagonal], 800.0, 600.0);
        assert!(sides.contains(Direction::Right));
        assert!(!sides.contains(Direction::Down));
    }

    #[test]
    fn classifies_each_collider_independently() {
        let entity = agent(1, 100.0, 100.0, TerrainSet::open_only());
        let left = agent(2, 75.0, 100.0, TerrainSet::open_only());
        let below = agent(3, 100.0, 128.0, TerrainSet::open_only());
        let sides = collided_sides(&entity, &[left, below], 800.0, 600.0);
        assert!(sides.contains(Direction::Stay));
        assert!(sides.contains(Direction::Left));
        assert!(sides.contains(Direction::Down));
        assert!(!sides.contains(Direction::Right));
    }

    #[test]
    fn segments_clip_against_bodies() {
        let blocker = agent(1, 64.0, 64.0, TerrainSet::open_only());
        let entities = EntityView::from_snapshots(vec![blocker]);

        let through = check_line_collisions(
            WorldPoint::new(0.0, 80.0),
            WorldPoint::new(200.0, 80.0),
            &entities,
        );
        assert_eq!(through.len(), 1);

        let above = check_line_collisions(
            WorldPoint::new(0.0, 10.0),
            WorldPoint::new(200.0, 10.0),
            &entities,
        );
        assert!(above.is_empty());

        let short = check_line_collisions(
            WorldPoint::new(0.0, 80.0),
            WorldPoint::new(30.0, 80.0),
            &entities,
        );
        assert!(short.is_empty());
    }

    #[test]
    fn zone_edges_clamp_independently_of_collisions() {
        let at_origin = agent(1, 0.0, 0.0, TerrainSet::open_only());
        let sides = collided_sides(&at_origin, &[], 800.0, 600.0);
        assert!(sides.contains(Direction::Left));
        assert!(sides.contains(Direction::Up));

        let far_corner = agent(2, 790.0, 590.0, TerrainSet::open_only());
        let sides = collided_sides(&far_corner, &[], 800.0, 600.0);
        assert!(sides.contains(Direction::Right));
        assert!(sides.contains(Direction::Down));
    }
}
