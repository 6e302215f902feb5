//! A* search over the collision grid with clearance-aware expansion.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use skirmish_core::{Path, TerrainSet, TilePoint};
use skirmish_world::CollisionGrid;
use thiserror::Error;

use crate::algorithm::{PathfinderAlgorithm, PathfindingError};
use crate::clearance::ClearanceMap;
use crate::cost::{CostMetric, MoveCostCalculator};

const CARDINAL_STEPS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const DIAGONAL_STEPS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Which neighbour expansion a search uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Four-way movement along the axes only.
    Cardinal,
    /// Eight-way movement including diagonal steps.
    EightWay,
}

/// Configuration misuse rejected before a pathfinder is built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchConfigError {
    /// The metric is not admissible for the chosen neighbour expansion.
    ///
    /// A Manhattan heuristic over eight-way movement overestimates diagonal
    /// travel, and a Diagonal or Euclidean heuristic cannot pay for
    /// cardinal-only detours; either pairing silently degrades path quality,
    /// so both are rejected outright.
    #[error("cost metric {metric:?} breaks admissibility with {expansion:?} neighbour expansion")]
    IncompatibleMetric {
        /// The requested metric.
        metric: CostMetric,
        /// The requested neighbour expansion.
        expansion: Expansion,
    },
    /// The node-expansion budget is zero.
    #[error("search budget must be non-zero")]
    ZeroBudget,
}

/// A* over the collision grid, the default [`PathfinderAlgorithm`].
///
/// Clearance maps are computed lazily per distinct terrain set and cached
/// until the grid revision moves on.
#[derive(Debug)]
pub struct AStarPathfinder {
    calculator: MoveCostCalculator,
    expansion: Expansion,
    search_budget: u32,
    clearance_maps: HashMap<TerrainSet, ClearanceMap>,
    clearance_revision: u64,
}

impl AStarPathfinder {
    /// Creates a pathfinder, rejecting inadmissible configurations.
    pub fn new(
        metric: CostMetric,
        expansion: Expansion,
        search_budget: u32,
    ) -> Result<Self, SearchConfigError> {
        if search_budget == 0 {
            return Err(SearchConfigError::ZeroBudget);
        }
        let compatible = matches!(
            (metric, expansion),
            (CostMetric::Manhattan, Expansion::Cardinal)
                | (CostMetric::Diagonal, Expansion::EightWay)
                | (CostMetric::Euclidean, Expansion::EightWay)
        );
        if !compatible {
            return Err(SearchConfigError::IncompatibleMetric { metric, expansion });
        }
        Ok(Self {
            calculator: MoveCostCalculator::new(metric),
            expansion,
            search_budget,
            clearance_maps: HashMap::new(),
            clearance_revision: 0,
        })
    }

    /// The clearance map for a terrain set, built or fetched from cache.
    fn clearance_map(&mut self, grid: &CollisionGrid, crossable: &TerrainSet) -> &ClearanceMap {
        if self.clearance_revision != grid.revision() {
            self.clearance_maps.clear();
            self.clearance_revision = grid.revision();
        }
        self.clearance_maps
            .entry(crossable.clone())
            .or_insert_with(|| ClearanceMap::build(grid, crossable))
    }

    /// Number of terrain sets with a cached clearance map, for inspection.
    #[must_use]
    pub fn cached_clearance_maps(&self) -> usize {
        self.clearance_maps.len()
    }
}

impl PathfinderAlgorithm for AStarPathfinder {
    fn find_path(
        &mut self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError> {
        self.find_path_with_clearance(grid, 0, crossable, start, goal)
    }

    fn find_path_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        start: TilePoint,
        goal: TilePoint,
    ) -> Result<Path, PathfindingError> {
        let calculator = self.calculator;
        let expansion = self.expansion;
        let budget = self.search_budget;
        let map = if clearance > 1 {
            Some(&*self.clearance_map(grid, crossable))
        } else {
            None
        };
        search(
            calculator, expansion, budget, grid, crossable, map, clearance, start, goal,
        )
    }

    fn neighbours(
        &self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint> {
        cardinal_neighbours_of(grid, crossable, None, 0, at)
    }

    fn neighbours_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint> {
        if clearance <= 1 {
            return self.neighbours(grid, crossable, at);
        }
        let map = self.clearance_map(grid, crossable);
        cardinal_neighbours_of(grid, crossable, Some(map), clearance, at)
    }

    fn diagonal_neighbours(
        &self,
        grid: &CollisionGrid,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint> {
        diagonal_neighbours_of(grid, crossable, None, 0, at)
    }

    fn diagonal_neighbours_with_clearance(
        &mut self,
        grid: &CollisionGrid,
        clearance: u32,
        crossable: &TerrainSet,
        at: TilePoint,
    ) -> Vec<TilePoint> {
        if clearance <= 1 {
            return self.diagonal_neighbours(grid, crossable, at);
        }
        let map = self.clearance_map(grid, crossable);
        diagonal_neighbours_of(grid, crossable, Some(map), clearance, at)
    }

    fn refresh(&mut self) {
        self.clearance_maps.clear();
        log::debug!("pathfinder caches dropped after obstruction layout change");
    }
}

/// A tile may be entered when its terrain is crossable and, for large
/// bodies, when the precomputed clearance fits.
fn passable(
    grid: &CollisionGrid,
    crossable: &TerrainSet,
    map: Option<&ClearanceMap>,
    clearance: u32,
    tile: TilePoint,
) -> bool {
    if grid.is_blocked(crossable, tile) {
        return false;
    }
    map.map_or(true, |map| map.clearance(tile) >= clearance)
}

fn cardinal_neighbours_of(
    grid: &CollisionGrid,
    crossable: &TerrainSet,
    map: Option<&ClearanceMap>,
    clearance: u32,
    at: TilePoint,
) -> Vec<TilePoint> {
    CARDINAL_STEPS
        .iter()
        .map(|(dx, dy)| TilePoint::new(at.x() + dx, at.y() + dy))
        .filter(|next| passable(grid, crossable, map, clearance, *next))
        .collect()
}

/// Diagonal expansion with the corner-cutting prohibition: a diagonal step
/// is illegal when either orthogonally adjacent tile it cuts across is
/// blocked for the terrain set.
fn diagonal_neighbours_of(
    grid: &CollisionGrid,
    crossable: &TerrainSet,
    map: Option<&ClearanceMap>,
    clearance: u32,
    at: TilePoint,
) -> Vec<TilePoint> {
    DIAGONAL_STEPS
        .iter()
        .filter(|(dx, dy)| {
            !grid.is_blocked(crossable, TilePoint::new(at.x() + dx, at.y()))
                && !grid.is_blocked(crossable, TilePoint::new(at.x(), at.y() + dy))
        })
        .map(|(dx, dy)| TilePoint::new(at.x() + dx, at.y() + dy))
        .filter(|next| passable(grid, crossable, map, clearance, *next))
        .collect()
}

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    f: f32,
    g: f32,
    tile: TilePoint,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    /// Orders by f-cost, breaking ties toward the deeper node so equal-cost
    /// plateaus drain along one route instead of flooding breadth-first, and
    /// finally by tile coordinates so the expansion order is reproducible.
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then(other.g.total_cmp(&self.g))
            .then(self.tile.x().cmp(&other.tile.x()))
            .then(self.tile.y().cmp(&other.tile.y()))
    }
}

fn node_index(grid: &CollisionGrid, tile: TilePoint) -> Option<usize> {
    if tile.x() < 0
        || tile.y() < 0
        || tile.x() >= grid.columns() as i32
        || tile.y() >= grid.rows() as i32
    {
        return None;
    }
    Some(tile.y() as usize * grid.columns() as usize + tile.x() as usize)
}

fn search(
    calculator: MoveCostCalculator,
    expansion: Expansion,
    budget: u32,
    grid: &CollisionGrid,
    crossable: &TerrainSet,
    map: Option<&ClearanceMap>,
    clearance: u32,
    start: TilePoint,
    goal: TilePoint,
) -> Result<Path, PathfindingError> {
    if start == goal {
        return Ok(Path::new(vec![start], 0.0));
    }

    let no_route = || PathfindingError::NoRoute { start, goal };

    let Some(start_index) = node_index(grid, start) else {
        return Err(no_route());
    };
    if !passable(grid, crossable, map, clearance, goal) {
        return Err(no_route());
    }

    let node_count = grid.columns() as usize * grid.rows() as usize;
    let mut g = vec![f32::INFINITY; node_count];
    let mut came_from: Vec<Option<TilePoint>> = vec![None; node_count];
    let mut open = BinaryHeap::new();

    g[start_index] = 0.0;
    open.push(Reverse(OpenNode {
        f: calculator.cost(start, goal),
        g: 0.0,
        tile: start,
    }));

    let mut expanded = 0_u32;
    while let Some(Reverse(node)) = open.pop() {
        let Some(index) = node_index(grid, node.tile) else {
            continue;
        };
        if node.g > g[index] {
            continue;
        }
        if node.tile == goal {
            return Ok(reconstruct(grid, &came_from, g[index], start, goal));
        }

        expanded += 1;
        if expanded > budget {
            return Err(PathfindingError::BudgetExhausted { budget });
        }

        let mut relax = |next: TilePoint, open: &mut BinaryHeap<Reverse<OpenNode>>| {
            let Some(next_index) = node_index(grid, next) else {
                return;
            };
            let step = calculator.cost(node.tile, next)
                * grid.movement_cost(crossable, node.tile, next);
            let tentative = node.g + step;
            if tentative < g[next_index] {
                g[next_index] = tentative;
                came_from[next_index] = Some(node.tile);
                open.push(Reverse(OpenNode {
                    f: tentative + calculator.cost(next, goal),
                    g: tentative,
                    tile: next,
                }));
            }
        };

        for next in cardinal_neighbours_of(grid, crossable, map, clearance, node.tile) {
            relax(next, &mut open);
        }
        if expansion == Expansion::EightWay {
            for next in diagonal_neighbours_of(grid, crossable, map, clearance, node.tile) {
                relax(next, &mut open);
            }
        }
    }

    Err(no_route())
}

fn reconstruct(
    grid: &CollisionGrid,
    came_from: &[Option<TilePoint>],
    total_cost: f32,
    start: TilePoint,
    goal: TilePoint,
) -> Path {
    let mut waypoints = vec![goal];
    let mut current = goal;
    while current != start {
        let previous = node_index(grid, current)
            .and_then(|index| came_from.get(index).copied().flatten());
        match previous {
            Some(tile) => {
                waypoints.push(tile);
                current = tile;
            }
            None => break,
        }
    }
    waypoints.reverse();
    Path::new(waypoints, total_cost)
}
