use arrayvec::ArrayVec;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::game::{Grid, MAX_STONES, Occupant, Position, Tile, Weight};
use crate::puzzle::PuzzleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stone {
    pub position: Position,
    pub weight: Weight,
}

impl Stone {
    pub fn new(position: Position, weight: Weight) -> Self {
        Stone { position, weight }
    }
}

/// One node of the search graph: the agent and the stones.
///
/// Stones are kept sorted by position, which makes the stored form the
/// canonical key. The Zobrist hash of the key is computed once on
/// construction and updated incrementally by moves.
#[derive(Debug, Clone)]
pub struct State {
    agent: Position,
    stones: ArrayVec<Stone, MAX_STONES>,
    hash: u64,
}

impl State {
    /// Build a state, rejecting any placement that breaks the board invariants.
    pub fn new(
        grid: &Grid,
        agent: Position,
        stones: impl IntoIterator<Item = Stone>,
    ) -> Result<Self, PuzzleError> {
        let mut sorted: ArrayVec<Stone, MAX_STONES> = ArrayVec::new();
        for stone in stones {
            if sorted.try_push(stone).is_err() {
                return Err(PuzzleError::TooManyStones(MAX_STONES + 1));
            }
        }
        sorted.sort_unstable();

        if !grid.contains(agent) || grid.is_wall(agent) {
            return Err(PuzzleError::InvalidState(format!(
                "agent at {} is not on an open cell",
                agent
            )));
        }
        for (i, stone) in sorted.iter().enumerate() {
            if !grid.contains(stone.position) || grid.is_wall(stone.position) {
                return Err(PuzzleError::InvalidState(format!(
                    "stone at {} is not on an open cell",
                    stone.position
                )));
            }
            if stone.weight == 0 {
                return Err(PuzzleError::InvalidState(format!(
                    "stone at {} has zero weight",
                    stone.position
                )));
            }
            if stone.position == agent {
                return Err(PuzzleError::InvalidState(format!(
                    "agent and stone share {}",
                    agent
                )));
            }
            if i > 0 && sorted[i - 1].position == stone.position {
                return Err(PuzzleError::InvalidState(format!(
                    "two stones share {}",
                    stone.position
                )));
            }
        }
        let zobrist = grid.zobrist();
        let mut hash = zobrist.agent_hash(grid.index(agent));
        for stone in &sorted {
            hash ^= zobrist.stone_hash(grid.index(stone.position), stone.weight);
        }

        Ok(State {
            agent,
            stones: sorted,
            hash,
        })
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Stones in row-major position order.
    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    pub fn stone_count(&self) -> usize {
        self.stones.len()
    }

    /// Cached hash of the canonical key.
    pub fn hash_key(&self) -> u64 {
        self.hash
    }

    pub fn stone_at(&self, pos: Position) -> Option<Weight> {
        self.stones
            .binary_search_by(|stone| stone.position.cmp(&pos))
            .ok()
            .map(|i| self.stones[i].weight)
    }

    /// What occupies `pos` in this state. Cells outside the grid read as walls.
    pub fn occupant(&self, grid: &Grid, pos: Position) -> Occupant {
        if !grid.contains(pos) || grid.is_wall(pos) {
            Occupant::Wall
        } else if pos == self.agent {
            Occupant::Agent
        } else if let Some(weight) = self.stone_at(pos) {
            Occupant::Stone(weight)
        } else {
            Occupant::Empty
        }
    }

    /// True iff the stones sit exactly on the switches.
    pub fn is_goal(&self, grid: &Grid) -> bool {
        let switches = grid.switches();
        self.stones.len() == switches.len()
            && self
                .stones
                .iter()
                .zip(switches)
                .all(|(stone, &switch)| stone.position == switch)
    }

    /// Number of stones not resting on a switch.
    pub fn stones_off_switch(&self, grid: &Grid) -> usize {
        self.stones
            .iter()
            .filter(|stone| grid.tile(stone.position) != Tile::Switch)
            .count()
    }

    /// The agent steps to an empty cell.
    pub(crate) fn walk(&self, grid: &Grid, to: Position) -> State {
        let zobrist = grid.zobrist();
        let hash = self.hash
            ^ zobrist.agent_hash(grid.index(self.agent))
            ^ zobrist.agent_hash(grid.index(to));
        State {
            agent: to,
            stones: self.stones.clone(),
            hash,
        }
    }

    /// The agent steps onto `from`, moving the stone there to `to`.
    /// Returns None if no stone sits on `from`.
    pub(crate) fn push(&self, grid: &Grid, from: Position, to: Position) -> Option<State> {
        let zobrist = grid.zobrist();
        let mut stones = self.stones.clone();
        let i = stones
            .binary_search_by(|stone| stone.position.cmp(&from))
            .ok()?;
        let weight = stones[i].weight;
        stones[i].position = to;
        // Restore position order; only the moved stone can be out of place.
        stones.sort_unstable();

        let hash = self.hash
            ^ zobrist.agent_hash(grid.index(self.agent))
            ^ zobrist.agent_hash(grid.index(from))
            ^ zobrist.stone_hash(grid.index(from), weight)
            ^ zobrist.stone_hash(grid.index(to), weight);
        Some(State {
            agent: from,
            stones,
            hash,
        })
    }

    /// Flat row-major snapshot of every cell's occupant.
    pub fn snapshot(&self, grid: &Grid) -> Vec<Occupant> {
        grid.positions().map(|pos| self.occupant(grid, pos)).collect()
    }

    /// Display adapter drawing this state on its grid.
    pub fn render<'a>(&'a self, grid: &'a Grid) -> Render<'a> {
        Render { grid, state: self }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.agent == other.agent && self.stones == other.stones
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

pub struct Render<'a> {
    grid: &'a Grid,
    state: &'a State,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.state.snapshot(self.grid);
        for row in snapshot.chunks(self.grid.width()).zip(0u8..) {
            let (cells, y) = row;
            let mut line = String::new();
            for (occupant, x) in cells.iter().zip(0u8..) {
                let on_switch = self.grid.tile(Position::new(x, y)) == Tile::Switch;
                let ch = match (occupant, on_switch) {
                    (Occupant::Wall, _) => '#',
                    (Occupant::Agent, false) => '@',
                    (Occupant::Agent, true) => '+',
                    (Occupant::Stone(_), false) => '$',
                    (Occupant::Stone(_), true) => '*',
                    (Occupant::Empty, false) => ' ',
                    (Occupant::Empty, true) => '.',
                };
                line.push(ch);
            }
            // Puzzle files carry no trailing spaces
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
