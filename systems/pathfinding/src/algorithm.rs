//! The swappable search-algorithm seam of the pathfinding engine.

use skirmish_core::{Path, TerrainSet, TilePoint};
use skirmish_world::CollisionGrid;
use thiserror::Error;

/// A grid search strategy the engine can drive.
///
/// Implementations expose their neighbour expansion explicitly so alternative
/// strategies can reuse or override it; the clearance-aware variants consult
/// a per-terrain-set clearance map and therefore take `&mut self` to manage
/// their caches.
pub trait PathfinderAlgorithm: std::fmt::Debug {
    /// Plans a route between two tiles for the provided terrain set.
    fn find_path(
        &mut self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError>;

    /// Plans a route for a body requiring the provided tile clearance.
    fn find_path_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError>;

    /// Passable cardinal neighbours of the tile.
    fn neighbours(
        &self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint>;

    /// Passable cardinal neighbours for a body requiring clearance.
    fn neighbours_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint>;

    /// Passable diagonal neighbours of the tile, corner cutting forbidden.
    fn diagonal_neighbours(
        &self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint>;

    /// Passable diagonal neighbours for a body requiring clearance.
    fn diagonal_neighbours_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint>;

    /// Discards cached derived state after the obstruction layout changed.
    fn refresh(&mut self);
}

/// Explicit pathfinding failure, distinct from an empty-but-valid route.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathfindingError {
    /// No route exists under the current terrain and clearance constraints.
    #[error("no route from ({}, {}) to ({}, {}) under the given terrain and clearance", start.x(), start.y(), goal.x(), goal.y())]
    NoRoute {
        /// Requested start tile.
        start: TilePoint,
        /// Requested goal tile.
        goal: TilePoint,
    },
    /// The search gave up after spending its node-expansion budget.
    #[error("search budget of {budget} node expansions exhausted")]
    BudgetExhausted {
        /// The configured expansion budget.
        budget: u32,
    },
}
