use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Neighbours in [`Direction::ALL`] order.
    pub fn neighbors(&self) -> [Position; 4] {
        Direction::ALL.map(|dir| self.step(dir))
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }

    pub fn step(&self, dir: Direction) -> Position {
        self.offset(dir, 1)
    }

    pub fn offset(&self, dir: Direction, cells: i32) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx * cells, self.y + dy * cells)
    }

    /// True when both cells share a row or a column.
    pub fn is_aligned(&self, other: &Position) -> bool {
        self.x == other.x || self.y == other.y
    }

    /// Direction of a single orthogonal step from `self` to `to`.
    pub fn direction_to(&self, to: &Position) -> Option<Direction> {
        match (to.x - self.x, to.y - self.y) {
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (0, 1) => Some(Direction::South),
            (0, -1) => Some(Direction::North),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal directions. `y` grows southwards, matching the arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    /// Enumeration order used for every tie-break in the planners.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::North => (0, -1),
        }
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// One of the three vertical bands of the map an agent is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Zone {
    /// Band `group % 3` of a `width` x `height` map. Bounds are half-open.
    pub fn for_group(group: u32, width: i32, height: i32) -> Self {
        let (min_x, max_x) = match group % 3 {
            0 => (0, width / 3),
            1 => (width / 3, 2 * width / 3),
            _ => (2 * width / 3, width),
        };
        Self {
            min_x,
            max_x,
            min_y: 0,
            max_y: height,
        }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.y >= self.min_y && pos.y < self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_follow_direction_order() {
        let pos = Position::new(2, 2);
        assert_eq!(
            pos.neighbors(),
            [
                Position::new(3, 2),
                Position::new(1, 2),
                Position::new(2, 3),
                Position::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_direction_to_only_for_single_steps() {
        let pos = Position::new(4, 4);
        assert_eq!(pos.direction_to(&Position::new(4, 3)), Some(Direction::North));
        assert_eq!(pos.direction_to(&Position::new(5, 4)), Some(Direction::East));
        assert_eq!(pos.direction_to(&Position::new(6, 4)), None);
        assert_eq!(pos.direction_to(&Position::new(5, 5)), None);
    }

    #[test]
    fn test_zones_partition_width() {
        let (width, height) = (10, 4);
        for x in 0..width {
            let pos = Position::new(x, 1);
            let owners = (0..3)
                .filter(|group| Zone::for_group(*group, width, height).contains(&pos))
                .count();
            assert_eq!(owners, 1, "column {} should belong to exactly one zone", x);
        }
        assert!(Zone::for_group(0, width, height).contains(&Position::new(2, 0)));
        assert!(Zone::for_group(1, width, height).contains(&Position::new(3, 3)));
        assert!(Zone::for_group(2, width, height).contains(&Position::new(9, 3)));
        assert!(!Zone::for_group(2, width, height).contains(&Position::new(9, 4)));
    }
}
