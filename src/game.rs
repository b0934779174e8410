use std::cmp::Ordering;
use std::fmt;

use crate::puzzle::PuzzleError;
use crate::zobrist::Zobrist;

pub const MAX_SIZE: usize = 64;
pub const MAX_STONES: usize = 32;

/// Weight of a single stone.
pub type Weight = u32;

/// Accumulated pushed weight along a path.
pub type Cost = u64;

/// A grid coordinate. Positions order row-major: by row, then by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub fn new(x: u8, y: u8) -> Self {
        Position { x, y }
    }

    pub fn manhattan(self, other: Position) -> u32 {
        (self.x.abs_diff(other.x) as u32) + (self.y.abs_diff(other.y) as u32)
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Lowercase move code used in move strings.
    pub fn code(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }

    /// Parse a move code, ignoring case.
    pub fn from_code(code: char) -> Option<Direction> {
        match code.to_ascii_lowercase() {
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Static contents of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Switch,
}

/// What a cell holds in a particular state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Empty,
    Wall,
    Stone(Weight),
    Agent,
}

/// The immutable board: dimensions, walls and switches.
///
/// Tiles are stored row-major in a flat array. The grid also owns the Zobrist
/// keys used to hash states played on it.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u8,
    height: u8,
    tiles: Vec<Tile>,
    switches: Vec<Position>,
    zobrist: Zobrist,
}

impl Grid {
    pub fn new(
        width: usize,
        height: usize,
        walls: &[Position],
        switches: &[Position],
    ) -> Result<Self, PuzzleError> {
        if width == 0 || height == 0 {
            return Err(PuzzleError::EmptyGrid);
        }
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(PuzzleError::TooLarge { width, height });
        }

        let mut tiles = vec![Tile::Floor; width * height];
        let in_bounds = |pos: Position| (pos.x as usize) < width && (pos.y as usize) < height;

        for &wall in walls {
            if !in_bounds(wall) {
                return Err(PuzzleError::OutOfBounds(wall));
            }
            tiles[wall.y as usize * width + wall.x as usize] = Tile::Wall;
        }

        let mut sorted_switches = Vec::with_capacity(switches.len());
        for &switch in switches {
            if !in_bounds(switch) {
                return Err(PuzzleError::OutOfBounds(switch));
            }
            let tile = &mut tiles[switch.y as usize * width + switch.x as usize];
            if *tile == Tile::Wall {
                return Err(PuzzleError::SwitchOnWall(switch));
            }
            *tile = Tile::Switch;
            sorted_switches.push(switch);
        }
        sorted_switches.sort();
        sorted_switches.dedup();

        Ok(Grid {
            width: width as u8,
            height: height as u8,
            tiles,
            switches: sorted_switches,
            zobrist: Zobrist::new(width * height),
        })
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Row-major index of a position.
    pub fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn tile(&self, pos: Position) -> Tile {
        self.tiles[self.index(pos)]
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Wall
    }

    /// Switch positions in row-major order.
    pub fn switches(&self) -> &[Position] {
        &self.switches
    }

    pub fn zobrist(&self) -> &Zobrist {
        &self.zobrist
    }

    /// Step from a position in the given direction.
    /// Returns None if the step would leave the grid.
    pub fn move_position(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = pos.x as i32 + dx as i32;
        let new_y = pos.y as i32 + dy as i32;

        if new_x >= 0 && new_y >= 0 && new_x < self.width as i32 && new_y < self.height as i32 {
            Some(Position::new(new_x as u8, new_y as u8))
        } else {
            None
        }
    }

    /// Iterate over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}
