//! Corner car spawner
//!
//! Cars enter the map at the four grid corners, cycled round-robin. The
//! spawner only decides *where* and *when*; the world performs the actual
//! spawn so it can check the corner's road and occupancy.

use super::types::GridPos;

/// Default number of ticks between spawn attempts
pub const DEFAULT_SPAWN_INTERVAL: u64 = 10;

/// Rotating entry-corner schedule
#[derive(Debug, Clone)]
pub struct CarSpawner {
    corners: [GridPos; 4],
    next_corner: usize,
    interval: u64,
}

impl CarSpawner {
    pub fn new(width: i32, height: i32, interval: u64) -> Self {
        Self {
            corners: [
                GridPos::new(0, 0),
                GridPos::new(0, height - 1),
                GridPos::new(width - 1, 0),
                GridPos::new(width - 1, height - 1),
            ],
            next_corner: 0,
            interval,
        }
    }

    /// Whether a spawn attempt is due on the given tick
    pub fn due(&self, tick: u64) -> bool {
        tick > 0 && tick % self.interval == 0
    }

    /// Change the number of ticks between spawn attempts
    pub fn set_interval(&mut self, interval: u64) {
        self.interval = interval;
    }

    /// The currently-selected entry corner, advancing the rotation.
    ///
    /// The rotation advances on every attempt, whether or not the world
    /// ends up spawning a car there.
    pub fn take_corner(&mut self) -> GridPos {
        let corner = self.corners[self.next_corner];
        self.next_corner = (self.next_corner + 1) % self.corners.len();
        corner
    }

    /// All four entry corners in rotation order
    pub fn corners(&self) -> [GridPos; 4] {
        self.corners
    }
}
