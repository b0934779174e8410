use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::game::{Grid, MAX_SIZE, MAX_STONES, Position, Weight};
use crate::state::{State, Stone};

/// Error type for puzzle construction.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("puzzle is empty")]
    Empty,

    #[error("grid is empty")]
    EmptyGrid,

    #[error("invalid weight '{0}'")]
    InvalidWeight(String),

    #[error("stone count ({stones}) does not match weight count ({weights})")]
    WeightCountMismatch { stones: usize, weights: usize },

    #[error("no agent found on grid")]
    MissingAgent,

    #[error("multiple agents found (second at {0})")]
    MultipleAgents(Position),

    #[error("grid {width}x{height} exceeds maximum size {max}", max = MAX_SIZE)]
    TooLarge { width: usize, height: usize },

    #[error("{0} stones exceed the maximum of {max}", max = MAX_STONES)]
    TooManyStones(usize),

    #[error("switch at {0} lies on a wall")]
    SwitchOnWall(Position),

    #[error("{0} lies outside the grid")]
    OutOfBounds(Position),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// A parsed puzzle: the static grid and the starting state.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Grid,
    start: State,
}

impl Puzzle {
    /// Parse a weighted puzzle.
    ///
    /// The first line lists stone weights in row-major stone order. The grid
    /// follows, one character per cell:
    /// - `#` = Wall
    /// - `.` = Switch
    /// - `$` = Stone
    /// - `*` = Stone on a switch
    /// - `@` = Agent
    /// - `+` = Agent on a switch
    ///
    /// Any other character is open floor.
    pub fn from_text(text: &str) -> Result<Self, PuzzleError> {
        let mut lines = text.lines();
        let weights_line = lines.next().ok_or(PuzzleError::Empty)?;
        let weights = weights_line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<Weight>()
                    .ok()
                    .filter(|&weight| weight > 0)
                    .ok_or_else(|| PuzzleError::InvalidWeight(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows: Vec<&str> = lines.collect();
        while rows.last().is_some_and(|row| row.trim().is_empty()) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(PuzzleError::EmptyGrid);
        }

        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(PuzzleError::TooLarge { width, height });
        }

        let mut walls = Vec::new();
        let mut switches = Vec::new();
        let mut stones = Vec::new();
        let mut agent = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as u8, y as u8);
                match ch {
                    '#' => walls.push(pos),
                    '.' => switches.push(pos),
                    '$' => stones.push(pos),
                    '*' => {
                        stones.push(pos);
                        switches.push(pos);
                    }
                    '@' | '+' => {
                        if agent.is_some() {
                            return Err(PuzzleError::MultipleAgents(pos));
                        }
                        agent = Some(pos);
                        if ch == '+' {
                            switches.push(pos);
                        }
                    }
                    _ => {}
                }
            }
        }

        if stones.len() != weights.len() {
            return Err(PuzzleError::WeightCountMismatch {
                stones: stones.len(),
                weights: weights.len(),
            });
        }
        if stones.len() > MAX_STONES {
            return Err(PuzzleError::TooManyStones(stones.len()));
        }
        let agent = agent.ok_or(PuzzleError::MissingAgent)?;

        let grid = Grid::new(width, height, &walls, &switches)?;
        let start = State::new(
            &grid,
            agent,
            stones
                .into_iter()
                .zip(weights)
                .map(|(pos, weight)| Stone::new(pos, weight)),
        )?;

        Ok(Puzzle { grid, start })
    }

    /// Parse a puzzle from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> &State {
        &self.start
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Stones are stored in row-major order, which is also the weight order.
        let weights: Vec<String> = self
            .start
            .stones()
            .iter()
            .map(|stone| stone.weight.to_string())
            .collect();
        writeln!(f, "{}", weights.join(" "))?;
        write!(f, "{}", self.start.render(&self.grid))
    }
}
