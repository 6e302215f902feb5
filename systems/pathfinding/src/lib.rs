#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid pathfinding for the Skirmish simulation substrate.
//!
//! Route planning runs over the zone's collision grid behind a swappable
//! [`PathfinderAlgorithm`] seam. The default implementation is A* with
//! selectable distance metrics, a corner-cutting prohibition for diagonal
//! movement, per-terrain-set clearance maps for large-bodied agents, and a
//! node-expansion budget so a hopeless search can never stall the tick.

mod algorithm;
mod astar;
mod clearance;
mod cost;
mod engine;

pub use algorithm::{PathfinderAlgorithm, PathfindingError};
pub use astar::{AStarPathfinder, Expansion, SearchConfigError};
pub use clearance::ClearanceMap;
pub use cost::{CostMetric, MoveCostCalculator};
pub use engine::PathfindingEngine;
