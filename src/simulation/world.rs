//! Main simulation world that ties everything together
//!
//! Owns the grid, all agents, the spawner, and the global tick counter.
//! Execution is single-threaded and turn-based: each tick runs the spawner,
//! activates every pre-existing agent exactly once in a freshly randomized
//! order, and advances the clock. There are no ambient globals; all state
//! lives here.

use anyhow::{bail, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::car::{CarStepResult, SimCar};
use super::grid::CityGrid;
use super::light::TrafficLight;
use super::spawner::{CarSpawner, DEFAULT_SPAWN_INTERVAL};
use super::types::{CarId, DestinationId, Direction, EntityView, GridPos, LightId};

/// One static entity to place at setup time
#[derive(Debug, Clone, Copy)]
pub enum Placement {
    Road { pos: GridPos, direction: Direction },
    TrafficLight { pos: GridPos, state: bool, period: u64 },
    Obstacle { pos: GridPos },
    Destination { pos: GridPos },
}

/// Agents eligible for activation within a tick
#[derive(Debug, Clone, Copy)]
enum AgentId {
    Light(LightId),
    Car(CarId),
}

/// The main simulation world
pub struct SimWorld {
    /// Cell occupancy for the whole map
    pub grid: CityGrid,

    /// All live cars, keyed by creation order
    pub cars: BTreeMap<CarId, SimCar>,

    /// Traffic light table; `LightId` indexes into it
    pub lights: Vec<TrafficLight>,

    /// Destination table; `DestinationId` indexes into it
    pub destinations: Vec<GridPos>,

    spawner: CarSpawner,

    /// Global tick counter driving light schedules and spawn cadence
    tick_count: u64,

    next_car_id: usize,
    cars_spawned: usize,
    cars_arrived: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(width: i32, height: i32, rng: Option<StdRng>) -> Result<Self> {
        Ok(Self {
            grid: CityGrid::new(width, height)?,
            cars: BTreeMap::new(),
            lights: Vec::new(),
            destinations: Vec::new(),
            spawner: CarSpawner::new(width, height, DEFAULT_SPAWN_INTERVAL),
            tick_count: 0,
            next_car_id: 0,
            cars_spawned: 0,
            cars_arrived: 0,
            rng,
        })
    }

    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::new_internal(width, height, None)
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(width: i32, height: i32, seed: u64) -> Result<Self> {
        Self::new_internal(width, height, Some(StdRng::seed_from_u64(seed)))
    }

    /// Build a world from externally-parsed initial placements
    pub fn from_placements(width: i32, height: i32, placements: &[Placement]) -> Result<Self> {
        let mut world = Self::new(width, height)?;
        world.apply_placements(placements)?;
        Ok(world)
    }

    /// Seeded variant of [`SimWorld::from_placements`]
    pub fn from_placements_with_seed(
        width: i32,
        height: i32,
        placements: &[Placement],
        seed: u64,
    ) -> Result<Self> {
        let mut world = Self::new_with_seed(width, height, seed)?;
        world.apply_placements(placements)?;
        Ok(world)
    }

    fn apply_placements(&mut self, placements: &[Placement]) -> Result<()> {
        for placement in placements {
            match *placement {
                Placement::Road { pos, direction } => self.add_road(pos, direction)?,
                Placement::TrafficLight { pos, state, period } => {
                    self.add_traffic_light(pos, state, period).map(|_| ())?
                }
                Placement::Obstacle { pos } => self.add_obstacle(pos)?,
                Placement::Destination { pos } => self.add_destination(pos).map(|_| ())?,
            }
        }
        Ok(())
    }

    /// Choose a uniformly random destination, using the seeded RNG if available
    fn choose_destination(&mut self) -> Option<DestinationId> {
        if self.destinations.is_empty() {
            return None;
        }
        let index = match &mut self.rng {
            Some(rng) => rng.random_range(0..self.destinations.len()),
            None => rand::rng().random_range(0..self.destinations.len()),
        };
        Some(DestinationId(index))
    }

    /// Shuffle the per-tick activation order, using the seeded RNG if available
    fn shuffle_agents(&mut self, agents: &mut [AgentId]) {
        match &mut self.rng {
            Some(rng) => agents.shuffle(rng),
            None => agents.shuffle(&mut rand::rng()),
        }
    }

    /// Override the spawn cadence (ticks between spawn attempts)
    pub fn set_spawn_interval(&mut self, interval: u64) -> Result<()> {
        if interval == 0 {
            bail!("Spawn interval must be positive");
        }
        self.spawner.set_interval(interval);
        Ok(())
    }

    /// Place a road at setup time
    pub fn add_road(&mut self, pos: GridPos, direction: Direction) -> Result<()> {
        self.grid.place_road(pos, direction)
    }

    /// Place a traffic light at setup time
    pub fn add_traffic_light(&mut self, pos: GridPos, state: bool, period: u64) -> Result<LightId> {
        if period == 0 {
            bail!("Traffic light period must be positive");
        }
        let id = LightId(self.lights.len());
        self.grid.place_light(pos, id)?;
        self.lights.push(TrafficLight::new(id, pos, state, period));
        Ok(id)
    }

    /// Place an obstacle at setup time
    pub fn add_obstacle(&mut self, pos: GridPos) -> Result<()> {
        self.grid.place_obstacle(pos)
    }

    /// Place a destination at setup time
    pub fn add_destination(&mut self, pos: GridPos) -> Result<DestinationId> {
        let id = DestinationId(self.destinations.len());
        self.grid.place_destination(pos, id)?;
        self.destinations.push(pos);
        Ok(id)
    }

    /// Create a car and register it with the grid and scheduler.
    ///
    /// The car is not activated until the next tick.
    pub fn spawn_car(
        &mut self,
        pos: GridPos,
        direction: Direction,
        destination: DestinationId,
    ) -> Result<CarId> {
        if destination.0 >= self.destinations.len() {
            bail!("Unknown destination {:?}", destination);
        }
        let id = CarId(self.next_car_id);
        self.grid.place_car(id, pos)?;
        self.next_car_id += 1;
        self.cars.insert(id, SimCar::new(id, pos, direction, destination));
        self.cars_spawned += 1;
        Ok(id)
    }

    /// Seed one car at every entry corner that carries a road. Corners
    /// without a road or with a car already present are skipped.
    pub fn spawn_corner_cars(&mut self) -> Result<Vec<CarId>> {
        let mut spawned = Vec::new();
        for corner in self.spawner.corners() {
            let cell = match self.grid.cell(corner) {
                Some(cell) => *cell,
                None => continue,
            };
            let direction = match cell.road {
                Some(direction) if cell.car.is_none() => direction,
                _ => continue,
            };
            let destination = match self.choose_destination() {
                Some(destination) => destination,
                None => break,
            };
            spawned.push(self.spawn_car(corner, direction, destination)?);
        }
        Ok(spawned)
    }

    /// Attempt a scheduled spawn at the given entry corner.
    ///
    /// Silently skipped when the corner has no road, already holds a car,
    /// or no destinations exist.
    fn try_spawn_at(&mut self, corner: GridPos) -> Result<()> {
        let cell = match self.grid.cell(corner) {
            Some(cell) => *cell,
            None => return Ok(()),
        };
        let direction = match cell.road {
            Some(direction) => direction,
            None => {
                debug!("No road at spawn corner {:?}, skipping spawn", corner);
                return Ok(());
            }
        };
        if cell.car.is_some() {
            debug!("Spawn corner {:?} is occupied, skipping spawn", corner);
            return Ok(());
        }
        let destination = match self.choose_destination() {
            Some(destination) => destination,
            None => return Ok(()),
        };
        let id = self.spawn_car(corner, direction, destination)?;
        debug!(
            "Spawned car {:?} at {:?} heading {:?} toward destination {:?}",
            id, corner, direction, destination
        );
        Ok(())
    }

    /// Advance the whole simulation by one tick.
    ///
    /// Runs the spawner, activates every agent that existed at the start of
    /// the tick exactly once in a freshly randomized order, and increments
    /// the global tick counter. Within the tick, each car sees the grid as
    /// mutated by the agents activated before it.
    pub fn tick(&mut self) -> Result<()> {
        // Collected before spawning so that cars spawned this tick are not
        // activated until the following tick.
        let mut agents: Vec<AgentId> = self
            .lights
            .iter()
            .map(|light| AgentId::Light(light.id))
            .chain(self.cars.keys().map(|id| AgentId::Car(*id)))
            .collect();

        if self.spawner.due(self.tick_count) {
            let corner = self.spawner.take_corner();
            self.try_spawn_at(corner)?;
        }

        self.shuffle_agents(&mut agents);

        for agent in agents {
            match agent {
                AgentId::Light(id) => {
                    self.lights[id.0].activate(self.tick_count);
                }
                AgentId::Car(id) => {
                    let mut car = match self.cars.remove(&id) {
                        Some(car) => car,
                        None => continue,
                    };
                    let result = car.step(&mut self.grid, &self.lights, &self.destinations)?;
                    match result {
                        CarStepResult::Arrived => {
                            self.cars_arrived += 1;
                            info!("Car {:?} arrived at destination {:?}", id, car.destination);
                        }
                        _ => {
                            self.cars.insert(id, car);
                        }
                    }
                }
            }
        }

        self.tick_count += 1;
        Ok(())
    }

    /// The global tick counter (ticks completed so far)
    pub fn current_tick(&self) -> u64 {
        self.tick_count
    }

    /// Number of cars currently on the grid (stalled cars included)
    pub fn live_car_count(&self) -> usize {
        self.cars.len()
    }

    /// Cumulative number of cars that reached their destination
    pub fn cars_arrived(&self) -> usize {
        self.cars_arrived
    }

    /// Cumulative number of cars ever spawned
    pub fn cars_spawned(&self) -> usize {
        self.cars_spawned
    }

    /// Per-entity renderable state for visualization collaborators
    pub fn entity_views(&self) -> Vec<EntityView> {
        let mut views = Vec::new();
        for (pos, cell) in self.grid.iter() {
            if let Some(direction) = cell.road {
                views.push(EntityView::Road { pos, direction });
            }
            if cell.obstacle {
                views.push(EntityView::Obstacle { pos });
            }
        }
        for light in &self.lights {
            views.push(EntityView::TrafficLight {
                pos: light.pos,
                state: light.state,
            });
        }
        for &pos in &self.destinations {
            views.push(EntityView::Destination { pos });
        }
        for car in self.cars.values() {
            views.push(EntityView::Car {
                pos: car.pos,
                direction: car.direction,
            });
        }
        views
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== City Simulation Summary ===");
        println!("Tick: {}", self.tick_count);
        println!(
            "Grid: {}x{}, lights: {}, destinations: {}",
            self.grid.width(),
            self.grid.height(),
            self.lights.len(),
            self.destinations.len()
        );
        println!(
            "Cars: {} live, {} spawned, {} arrived",
            self.cars.len(),
            self.cars_spawned,
            self.cars_arrived
        );

        if !self.cars.is_empty() {
            println!("--- Live Cars ---");
            for car in self.cars.values() {
                println!(
                    "  Car {:?}: at ({}, {}) facing {:?}, waypoints left: {}",
                    car.id.0,
                    car.pos.x,
                    car.pos.y,
                    car.direction,
                    car.path.len().saturating_sub(car.path_index)
                );
            }
        }
    }

    /// Draw a character map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== City Map ===");
        println!("Legend: C=Car, G/R=TrafficLight, D=Destination, #=Obstacle, <>^v=Road");
        for y in (0..self.grid.height()).rev() {
            let mut line = String::with_capacity(self.grid.width() as usize);
            for x in 0..self.grid.width() {
                let cell = match self.grid.cell(GridPos::new(x, y)) {
                    Some(cell) => cell,
                    None => continue,
                };
                let symbol = if cell.car.is_some() {
                    'C'
                } else if let Some(light) = cell.light {
                    if self.lights[light.0].state {
                        'G'
                    } else {
                        'R'
                    }
                } else if cell.obstacle {
                    '#'
                } else if cell.destination.is_some() {
                    'D'
                } else {
                    match cell.road {
                        Some(Direction::Left) => '<',
                        Some(Direction::Right) => '>',
                        Some(Direction::Up) => '^',
                        Some(Direction::Down) => 'v',
                        None => '.',
                    }
                };
                line.push(symbol);
            }
            println!("{}", line);
        }
        println!();
    }

    /// Create a small demo city: a clockwise ring road with lights, an
    /// obstacle block in the middle, and four destinations just inside the
    /// ring.
    pub fn create_test_world() -> Result<Self> {
        Self::build_test_world(Self::new(12, 12)?)
    }

    /// Demo city with a seeded RNG for reproducible runs
    pub fn create_test_world_with_seed(seed: u64) -> Result<Self> {
        Self::build_test_world(Self::new_with_seed(12, 12, seed)?)
    }

    fn build_test_world(mut world: SimWorld) -> Result<Self> {
        let max = 11;

        // Clockwise ring road around the perimeter.
        for x in 0..max {
            world.add_road(GridPos::new(x, 0), Direction::Right)?;
        }
        for y in 0..max {
            world.add_road(GridPos::new(max, y), Direction::Up)?;
        }
        for x in 1..=max {
            world.add_road(GridPos::new(x, max), Direction::Left)?;
        }
        for y in 1..=max {
            world.add_road(GridPos::new(0, y), Direction::Down)?;
        }

        // Lights on the ring, sharing cells with the roads beneath them.
        world.add_traffic_light(GridPos::new(6, 0), true, 5)?;
        world.add_traffic_light(GridPos::new(max, 6), false, 7)?;

        // A solid city block in the interior.
        for x in 4..=6 {
            for y in 4..=5 {
                world.add_obstacle(GridPos::new(x, y))?;
            }
        }

        // Destinations one cell inside the ring, reachable from each side.
        world.add_destination(GridPos::new(5, 1))?;
        world.add_destination(GridPos::new(10, 6))?;
        world.add_destination(GridPos::new(6, 10))?;
        world.add_destination(GridPos::new(1, 5))?;

        Ok(world)
    }
}
