//! Grid-city traffic simulation engine
//!
//! This module contains the whole simulation core: the occupancy grid, the
//! static entities, the movement legality rule, the direction-aware
//! pathfinder, the car agents, and the tick scheduler. It runs headless and
//! has no dependency on any rendering or serving layer; hosts drive it
//! through [`SimWorld::tick`] and read state back via [`SimWorld::entity_views`].

mod car;
mod grid;
mod light;
mod movement;
mod pathfinding;
mod spawner;
mod types;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use car::{CarStepResult, SimCar};
#[allow(unused_imports)]
pub use grid::{Cell, CityGrid};
#[allow(unused_imports)]
pub use light::TrafficLight;
#[allow(unused_imports)]
pub use movement::{admissible_entries, legal_moves, LightPolicy};
#[allow(unused_imports)]
pub use pathfinding::find_path;
#[allow(unused_imports)]
pub use spawner::{CarSpawner, DEFAULT_SPAWN_INTERVAL};
#[allow(unused_imports)]
pub use types::{CarId, DestinationId, Direction, EntityView, GridPos, LightId};
pub use world::{Placement, SimWorld};
