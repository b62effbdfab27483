//! Car agent logic
//!
//! A car computes its path exactly once, on its first activation, and then
//! replays that path one waypoint per activation, gated by car occupancy
//! and traffic-light state. There is no replanning: a car whose path is
//! blocked waits, and a car with no path at all stalls at its origin for
//! the rest of the run.

use anyhow::{Context, Result};
use log::debug;

use super::grid::CityGrid;
use super::light::TrafficLight;
use super::pathfinding::find_path;
use super::types::{CarId, DestinationId, Direction, GridPos};

/// Outcome of one car activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarStepResult {
    /// The car advanced one waypoint.
    Moved,
    /// The next waypoint was blocked or a red light held the car.
    Waiting,
    /// The car has no path and will never move (kept on the grid).
    Stalled,
    /// The car entered its destination and must be removed.
    Arrived,
}

/// A car navigating the grid toward its assigned destination
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    pub pos: GridPos,
    pub direction: Direction,
    /// Index into the world's destination table, fixed at spawn time.
    pub destination: DestinationId,
    /// Waypoints from spawn to destination, excluding the spawn cell.
    /// Immutable once computed.
    pub path: Vec<GridPos>,
    /// Cursor into `path`: the next waypoint to enter.
    pub path_index: usize,
    path_computed: bool,
}

impl SimCar {
    pub fn new(id: CarId, pos: GridPos, direction: Direction, destination: DestinationId) -> Self {
        Self {
            id,
            pos,
            direction,
            destination,
            path: Vec::new(),
            path_index: 0,
            path_computed: false,
        }
    }

    /// Whether the pathfinder has run for this car yet
    pub fn path_computed(&self) -> bool {
        self.path_computed
    }

    /// Activate the car for one tick.
    ///
    /// On the first activation the path is computed and, when one exists,
    /// the car immediately attempts its first move within the same
    /// activation.
    pub fn step(
        &mut self,
        grid: &mut CityGrid,
        lights: &[TrafficLight],
        destinations: &[GridPos],
    ) -> Result<CarStepResult> {
        if !self.path_computed {
            let goal = *destinations
                .get(self.destination.0)
                .context("Car assigned an unknown destination")?;
            self.path = find_path(grid, lights, self.pos, self.direction, self.destination, goal)
                .unwrap_or_default();
            self.path_computed = true;
            if self.path.is_empty() && self.pos != goal {
                debug!("Car {:?} found no path from {:?} to {:?}", self.id, self.pos, goal);
            }
        }

        let next = match self.path.get(self.path_index) {
            Some(next) => *next,
            // An empty path means the car is permanently stalled at its
            // origin; an exhausted path cannot happen because arrival
            // removes the car.
            None => return Ok(CarStepResult::Stalled),
        };

        let next_cell = *grid
            .cell(next)
            .context("Path waypoint is out of bounds")?;

        if next_cell.car.is_some() {
            return Ok(CarStepResult::Waiting);
        }

        // A red light on the current cell holds the car in place.
        let current_light = grid.cell(self.pos).and_then(|c| c.light);
        if let Some(light) = current_light {
            if !lights[light.0].state {
                return Ok(CarStepResult::Waiting);
            }
        }

        // A car also may not enter a light cell against a red signal.
        if let Some(light) = next_cell.light {
            if !lights[light.0].state {
                return Ok(CarStepResult::Waiting);
            }
        }

        grid.move_car(self.id, self.pos, next)?;
        self.pos = next;
        self.path_index += 1;

        if let Some(road_dir) = next_cell.road {
            self.direction = road_dir;
        }

        if next_cell.destination == Some(self.destination) {
            grid.remove_car(self.id, next)?;
            return Ok(CarStepResult::Arrived);
        }

        Ok(CarStepResult::Moved)
    }
}
