//! Traffic light state machine
//!
//! Lights are driven by the global tick counter rather than per-light
//! timers: a light toggles whenever the counter is a positive multiple of
//! its period. Lights sharing a period therefore toggle in lock-step.

use super::types::{GridPos, LightId};

/// A traffic light occupying one grid cell
///
/// `state == true` means green/passable. Position and period are fixed at
/// setup; only `state` ever changes.
#[derive(Debug, Clone, Copy)]
pub struct TrafficLight {
    pub id: LightId,
    pub pos: GridPos,
    pub state: bool,
    pub period: u64,
}

impl TrafficLight {
    pub fn new(id: LightId, pos: GridPos, state: bool, period: u64) -> Self {
        Self {
            id,
            pos,
            state,
            period,
        }
    }

    /// Activate the light for one tick of the global clock.
    ///
    /// The state is constant on `[0, P)`, flips at tick `P`, is constant on
    /// `[P, 2P)`, flips at `2P`, and so on. Tick 0 never toggles.
    pub fn activate(&mut self, tick: u64) {
        if tick > 0 && tick % self.period == 0 {
            self.state = !self.state;
        }
    }
}
