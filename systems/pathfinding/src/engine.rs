//! Engine wrapper owning the search algorithm and its staleness tracking.

use skirmish_core::{Event, Path, TerrainSet, TilePoint, WorldPoint};
use skirmish_world::CollisionGrid;

use crate::algorithm::{PathfinderAlgorithm, PathfindingError};
use crate::astar::{AStarPathfinder, Expansion, SearchConfigError};
use crate::cost::CostMetric;

/// Route planner for a zone, wrapping a swappable search algorithm.
///
/// The engine listens for [`Event::ObstructionLayoutChanged`] and refreshes
/// the algorithm's cached derived state at most once before the next query,
/// so any number of agents planning against an unchanged layout share one
/// refresh.
#[derive(Debug)]
pub struct PathfindingEngine {
    algorithm: Box<dyn PathfinderAlgorithm>,
    map_out_of_date: bool,
}

impl PathfindingEngine {
    /// Creates an engine around the provided algorithm.
    #[must_use]
    pub fn new(algorithm: Box<dyn PathfinderAlgorithm>) -> Self {
        Self {
            algorithm,
            map_out_of_date: false,
        }
    }

    /// Creates an engine around an A* pathfinder, validating the metric and
    /// expansion pairing.
    pub fn with_astar(
        metric: CostMetric,
        expansion: Expansion,
        search_budget: u32,
    ) -> Result<Self, SearchConfigError> {
        Ok(Self::new(Box::new(AStarPathfinder::new(
            metric,
            expansion,
            search_budget,
        )?)))
    }

    /// Consumes zone events, flagging the engine stale when the static
    /// obstruction layout changed.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if matches!(event, Event::ObstructionLayoutChanged) {
                self.map_out_of_date = true;
            }
        }
    }

    /// Overrides the staleness flag by hand.
    pub fn set_map_out_of_date(&mut self, out_of_date: bool) {
        self.map_out_of_date = out_of_date;
    }

    /// Reports whether the engine will refresh before its next query.
    #[must_use]
    pub const fn is_map_out_of_date(&self) -> bool {
        self.map_out_of_date
    }

    fn refresh_if_stale(&mut self) {
        if self.map_out_of_date {
            self.algorithm.refresh();
            self.map_out_of_date = false;
            log::debug!("pathfinding engine refreshed before query");
        }
    }

    /// Plans a route between two tiles for the provided terrain set.
    pub fn find_path(
        &mut self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError> {
        self.refresh_if_stale();
        self.algorithm.find_path(grid, crossable, start, goal)
    }

    /// Plans a route for a body requiring the provided tile clearance.
    pub fn find_path_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError> {
        self.refresh_if_stale();
        self.algorithm
            .find_path_with_clearance(grid, clearance, crossable, start, goal)
    }

    /// Plans a route between two world positions.
    ///
    /// Both endpoints go through the canonical world-to-tile conversion;
    /// no caller ever converts coordinates by hand.
    pub fn find_path_from_world(
        &mut self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        start: WorldPoint,
        goal: WorldPoint,
    ) -> Result<Path, PathfindingError> {
        let start = TilePoint::from_world(start, grid.tile_size());
        let goal = TilePoint::from_world(goal, grid.tile_size());
        self.find_path(grid, crossable, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_mismatched_configuration() {
        assert!(matches!(
            PathfindingEngine::with_astar(CostMetric::Manhattan, Expansion::EightWay, 64),
            Err(SearchConfigError::IncompatibleMetric { .. })
        ));
        assert!(PathfindingEngine::with_astar(CostMetric::Diagonal, Expansion::EightWay, 64).is_ok());
    }

    #[test]
    fn layout_change_events_mark_the_engine_stale() {
        let mut engine =
            PathfindingEngine::with_astar(CostMetric::Manhattan, Expansion::Cardinal, 64)
                .expect("valid configuration");
        assert!(!engine.is_map_out_of_date());

        engine.handle(&[Event::ObstructionLayoutChanged]);
        assert!(engine.is_map_out_of_date());

        let grid = CollisionGrid::new(320.0, 320.0, 32.0);
        let path = engine
            .find_path(
                &grid,
                &TerrainSet::open_only(),
                TilePoint::new(0, 0),
                TilePoint::new(3, 0),
            )
            .expect("route exists");
        assert_eq!(path.total_cost(), 3.0);
        assert!(!engine.is_map_out_of_date());
    }

    #[test]
    fn world_coordinates_convert_through_the_canonical_helper() {
        let mut engine =
            PathfindingEngine::with_astar(CostMetric::Manhattan, Expansion::Cardinal, 256)
                .expect("valid configuration");
        let grid = CollisionGrid::new(320.0, 320.0, 32.0);

        let path = engine
            .find_path_from_world(
                &grid,
                &TerrainSet::open_only(),
                WorldPoint::new(15.0, 15.0),
                WorldPoint::new(95.0, 15.0),
            )
            .expect("route exists");
        assert_eq!(path.waypoints().first(), Some(&TilePoint::new(0, 0)));
        assert_eq!(path.waypoints().last(), Some(&TilePoint::new(2, 0)));
    }
}
