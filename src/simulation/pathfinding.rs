//! Direction-aware shortest-path search
//!
//! Classic A* over grid cells, with one twist: the neighbor function is the
//! movement legality rule, which depends on the traveling direction. The
//! search keeps a single heading variable and resets it to the road
//! direction of each settled node, collapsing the (position, heading) state
//! space to position-only by trusting the lane under the vehicle. This is a
//! deliberate approximation, not a true multi-state search.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::OrderedFloat;

use super::grid::CityGrid;
use super::light::TrafficLight;
use super::movement::{legal_moves, LightPolicy};
use super::types::{DestinationId, Direction, GridPos};

/// Heap entry priority: f-score, then heuristic, then insertion order.
///
/// The two secondary keys make tie-breaking fully deterministic; ties on f
/// prefer the node closer to the goal, then the earlier-inserted node.
type Priority = (OrderedFloat<f32>, OrderedFloat<f32>, u64, GridPos);

/// Find a shortest legal path from `start` to `goal` for a car currently
/// facing `start_facing` and assigned destination `objective`.
///
/// Edge costs and the heuristic are Euclidean (1 orthogonal, sqrt(2)
/// diagonal), so the heuristic is admissible and consistent. Traffic lights
/// are treated as passable regardless of state; light timing is gated at
/// execution time by the car.
///
/// The returned path excludes `start` and ends at `goal`. Returns `None`
/// when the open set empties without reaching the goal. The caller's facing
/// is never mutated; the search threads its own heading.
pub fn find_path(
    grid: &CityGrid,
    lights: &[TrafficLight],
    start: GridPos,
    start_facing: Direction,
    objective: DestinationId,
    goal: GridPos,
) -> Option<Vec<GridPos>> {
    if start == goal {
        return Some(Vec::new());
    }

    let mut open: BinaryHeap<Reverse<Priority>> = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_score: HashMap<GridPos, f32> = HashMap::new();
    let mut closed: HashSet<GridPos> = HashSet::new();
    let mut insertion: u64 = 0;

    // Heading follows the lane: it is reset to the road direction of each
    // settled node and carries over unchanged across non-road cells.
    let mut heading = start_facing;

    g_score.insert(start, 0.0);
    let h_start = start.distance(&goal);
    open.push(Reverse((
        OrderedFloat(h_start),
        OrderedFloat(h_start),
        insertion,
        start,
    )));

    while let Some(Reverse((_, _, _, current))) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if !closed.insert(current) {
            continue;
        }

        if let Some(road_dir) = grid.cell(current).and_then(|c| c.road) {
            heading = road_dir;
        }

        let current_g = g_score[&current];
        for next in legal_moves(grid, lights, current, heading, objective, LightPolicy::IgnoreState)
        {
            if closed.contains(&next) {
                continue;
            }
            let tentative = current_g + current.distance(&next);
            if tentative < *g_score.get(&next).unwrap_or(&f32::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, current);
                insertion += 1;
                let h = next.distance(&goal);
                open.push(Reverse((
                    OrderedFloat(tentative + h),
                    OrderedFloat(h),
                    insertion,
                    next,
                )));
            }
        }
    }

    None
}

/// Follow back-pointers from the goal to the start and reverse, dropping
/// the start cell itself.
fn reconstruct(came_from: &HashMap<GridPos, GridPos>, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
