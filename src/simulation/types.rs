//! Core types for the city traffic simulation
//!
//! These are standalone types with no dependency on any host/UI layer.

/// A unique identifier for a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub usize);

/// Index of a traffic light in the world's light table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub usize);

/// Index of a destination in the world's destination table
///
/// Cars hold this index rather than any owning reference; destinations
/// outlive all cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(pub usize);

/// An integer cell position on the grid
///
/// `Ord` is lexicographic (x, then y) and is relied on for deterministic
/// tie-breaking in the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position shifted by (dx, dy). May be out of bounds.
    pub fn offset(&self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance between two cells (1 for orthogonal neighbors,
    /// sqrt(2) for diagonal neighbors).
    pub fn distance(&self, other: &GridPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A travel direction on the grid
///
/// Governs both a car's candidate moves and a road's permitted traversal
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// The three forward candidate offsets for this facing.
    ///
    /// Index 0 is straight ahead, indices 1 and 2 are the two
    /// forward-diagonals. The index order is significant: the movement
    /// legality rule pairs each index with an admissible-entry-direction
    /// set, and the pathfinder inherits this order for expansion.
    pub fn candidate_offsets(self) -> [(i32, i32); 3] {
        match self {
            Direction::Left => [(-1, 0), (-1, 1), (-1, -1)],
            Direction::Right => [(1, 0), (1, 1), (1, -1)],
            Direction::Up => [(0, 1), (1, 1), (-1, 1)],
            Direction::Down => [(0, -1), (1, -1), (-1, -1)],
        }
    }
}

/// Renderable state of one entity, exported to visualization collaborators
///
/// A closed set: adding an entity kind is a compile-time-checked change for
/// every consumer that matches on this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityView {
    Road { pos: GridPos, direction: Direction },
    TrafficLight { pos: GridPos, state: bool },
    Obstacle { pos: GridPos },
    Destination { pos: GridPos },
    Car { pos: GridPos, direction: Direction },
}
