//! Bounded multigrid holding per-cell occupancy
//!
//! The grid is finite and non-wrapping; out-of-bounds queries return `None`
//! rather than wrapping. Static entities (roads, lights, obstacles,
//! destinations) are placed once at setup and never move; cars are the only
//! occupants that change after setup.

use anyhow::{bail, Context, Result};

use super::types::{CarId, DestinationId, Direction, GridPos, LightId};

/// Contents of a single grid cell
///
/// Typed slots instead of a heterogeneous entity set: the legal
/// combinations are enforced at placement time (a road may share a cell
/// with a light; obstacles and destinations stand alone) and at most one
/// car ever occupies a cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    pub road: Option<Direction>,
    pub light: Option<LightId>,
    pub obstacle: bool,
    pub destination: Option<DestinationId>,
    pub car: Option<CarId>,
}

impl Cell {
    fn has_static(&self) -> bool {
        self.road.is_some() || self.light.is_some() || self.obstacle || self.destination.is_some()
    }
}

/// Finite 2D cell space with occupancy tracking
#[derive(Debug, Clone)]
pub struct CityGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl CityGrid {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            bail!("Grid dimensions must be positive, got {}x{}", width, height);
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: GridPos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Contents of a cell, or `None` when the position is out of bounds
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        if self.in_bounds(pos) {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    fn cell_mut(&mut self, pos: GridPos) -> Result<&mut Cell> {
        if !self.in_bounds(pos) {
            bail!("Position {:?} is out of bounds", pos);
        }
        let idx = self.index(pos);
        Ok(&mut self.cells[idx])
    }

    /// The up-to-8 in-bounds positions adjacent to `pos`
    pub fn neighbors8(&self, pos: GridPos) -> Vec<GridPos> {
        let mut neighbors = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let candidate = pos.offset(dx, dy);
                if self.in_bounds(candidate) {
                    neighbors.push(candidate);
                }
            }
        }
        neighbors
    }

    /// Iterate every cell with its position, row by row from the origin
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as i32;
            (GridPos::new(i % self.width, i / self.width), cell)
        })
    }

    /// Place a road at setup time. A road may share its cell with a traffic
    /// light but not with an obstacle, a destination, or another road.
    pub fn place_road(&mut self, pos: GridPos, direction: Direction) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.road.is_some() || cell.obstacle || cell.destination.is_some() {
            bail!("Cannot place road at {:?}: cell already claimed", pos);
        }
        cell.road = Some(direction);
        Ok(())
    }

    /// Place a traffic light at setup time. Lights may share a cell with a
    /// road only.
    pub fn place_light(&mut self, pos: GridPos, light: LightId) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.light.is_some() || cell.obstacle || cell.destination.is_some() {
            bail!("Cannot place traffic light at {:?}: cell already claimed", pos);
        }
        cell.light = Some(light);
        Ok(())
    }

    /// Place an obstacle at setup time. Obstacles claim their cell
    /// exclusively.
    pub fn place_obstacle(&mut self, pos: GridPos) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.has_static() {
            bail!("Cannot place obstacle at {:?}: cell already claimed", pos);
        }
        cell.obstacle = true;
        Ok(())
    }

    /// Place a destination at setup time. Destinations claim their cell
    /// exclusively among statics.
    pub fn place_destination(&mut self, pos: GridPos, destination: DestinationId) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.has_static() {
            bail!("Cannot place destination at {:?}: cell already claimed", pos);
        }
        cell.destination = Some(destination);
        Ok(())
    }

    /// Register a car on the grid
    pub fn place_car(&mut self, car: CarId, pos: GridPos) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.car.is_some() {
            bail!("Cannot place car at {:?}: cell already has a car", pos);
        }
        if cell.obstacle {
            bail!("Cannot place car at {:?}: cell holds an obstacle", pos);
        }
        cell.car = Some(car);
        Ok(())
    }

    /// Move a car from one cell to another
    pub fn move_car(&mut self, car: CarId, from: GridPos, to: GridPos) -> Result<()> {
        let occupant = self
            .cell(from)
            .context("Car source position out of bounds")?
            .car;
        if occupant != Some(car) {
            bail!("Car {:?} is not at {:?}", car, from);
        }
        if self
            .cell(to)
            .context("Car target position out of bounds")?
            .car
            .is_some()
        {
            bail!("Cannot move car {:?} to {:?}: cell already has a car", car, to);
        }
        self.cell_mut(from)?.car = None;
        self.cell_mut(to)?.car = Some(car);
        Ok(())
    }

    /// Remove a car from the grid
    pub fn remove_car(&mut self, car: CarId, pos: GridPos) -> Result<()> {
        let cell = self.cell_mut(pos)?;
        if cell.car != Some(car) {
            bail!("Car {:?} is not at {:?}", car, pos);
        }
        cell.car = None;
        Ok(())
    }
}
