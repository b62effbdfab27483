//! Movement legality rule
//!
//! The single rule deciding which cells a car facing a given direction may
//! enter next. It is a pure function of the grid snapshot and is the sole
//! neighbor generator for both live movement and pathfinding; the only
//! difference between the two callers is how red lights are treated.

use super::grid::CityGrid;
use super::light::TrafficLight;
use super::types::{DestinationId, Direction, GridPos};

/// How the rule treats a traffic light on a candidate cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPolicy {
    /// The light must currently be green. The engine's own cars replay a
    /// fixed path and gate lights themselves, so this variant is part of
    /// the rule's public contract for live legality queries rather than an
    /// internal code path.
    RequireGreen,
    /// Any light passes; gating happens at execution time (pathfinding).
    IgnoreState,
}

/// Road directions that may legally feed into a cell approached from
/// candidate index `candidate` while facing `facing`.
///
/// The straight-ahead candidate accepts the widest set: the facing
/// direction plus both perpendiculars. Each diagonal accepts the facing
/// direction plus the single perpendicular its lateral component points
/// toward, so the two diagonals are asymmetric.
pub fn admissible_entries(facing: Direction, candidate: usize) -> &'static [Direction] {
    use Direction::*;
    match (facing, candidate) {
        (Left, 0) => &[Left, Up, Down],
        (Left, 1) => &[Left, Up],
        (Left, 2) => &[Left, Down],
        (Right, 0) => &[Right, Up, Down],
        (Right, 1) => &[Right, Up],
        (Right, 2) => &[Right, Down],
        (Up, 0) => &[Up, Left, Right],
        (Up, 1) => &[Up, Right],
        (Up, 2) => &[Up, Left],
        (Down, 0) => &[Down, Left, Right],
        (Down, 1) => &[Down, Right],
        (Down, 2) => &[Down, Left],
        _ => unreachable!("candidate index out of range"),
    }
}

/// Compute the legal next cells for a car at `pos` facing `facing`.
///
/// A candidate is legal when it is in bounds, holds neither an obstacle nor
/// another car, and at least one of the following holds:
/// - it carries a road whose direction is admissible for the approach angle;
/// - it is the car's own assigned destination;
/// - it holds a traffic light, the candidate is straight-ahead, and the
///   light passes `policy`.
///
/// Straight-ahead is additionally rejected when both the current cell and
/// the target cell hold traffic lights, so a car can never skip from one
/// light directly onto the next.
///
/// The result preserves candidate index order (straight, then the two
/// diagonals), which keeps downstream consumers deterministic.
pub fn legal_moves(
    grid: &CityGrid,
    lights: &[TrafficLight],
    pos: GridPos,
    facing: Direction,
    objective: DestinationId,
    policy: LightPolicy,
) -> Vec<GridPos> {
    let current_has_light = grid.cell(pos).map_or(false, |c| c.light.is_some());

    let mut moves = Vec::with_capacity(3);
    for (candidate, (dx, dy)) in facing.candidate_offsets().iter().enumerate() {
        let target = pos.offset(*dx, *dy);
        let cell = match grid.cell(target) {
            Some(cell) => cell,
            None => continue,
        };
        if cell.obstacle || cell.car.is_some() {
            continue;
        }
        if candidate == 0 && current_has_light && cell.light.is_some() {
            continue;
        }

        let admissible = admissible_entries(facing, candidate);
        let road_ok = cell.road.map_or(false, |dir| admissible.contains(&dir));
        let destination_ok = cell.destination == Some(objective);
        let light_ok = candidate == 0
            && cell.light.map_or(false, |id| match policy {
                LightPolicy::IgnoreState => true,
                LightPolicy::RequireGreen => lights[id.0].state,
            });

        if road_ok || destination_ok || light_ok {
            moves.push(target);
        }
    }
    moves
}
