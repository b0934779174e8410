use arrayvec::ArrayVec;
use std::fmt;

use crate::game::{ALL_DIRECTIONS, Direction, Grid, Occupant, Position, Weight};
use crate::state::State;

/// A single agent step: a walk into an empty cell or a push of a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    direction: Direction,
    push: bool,
}

impl Move {
    pub fn walk(direction: Direction) -> Self {
        Move {
            direction,
            push: false,
        }
    }

    pub fn push(direction: Direction) -> Self {
        Move {
            direction,
            push: true,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_push(&self) -> bool {
        self.push
    }

    /// Lowercase for walks, uppercase for pushes.
    pub fn code(&self) -> char {
        let code = self.direction.code();
        if self.push {
            code.to_ascii_uppercase()
        } else {
            code
        }
    }

    pub fn from_code(code: char) -> Option<Move> {
        let direction = Direction::from_code(code)?;
        if code.is_ascii_uppercase() {
            Some(Move::push(direction))
        } else {
            Some(Move::walk(direction))
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Successor {
    pub state: State,
    pub action: Move,
    /// Weight of the pushed stone, or 0 for a walk.
    pub cost: Weight,
    /// Where the pushed stone came to rest.
    pub stone_target: Option<Position>,
}

/// Try to move the agent one step in `direction`.
///
/// Returns None if the step is blocked: a wall or the grid edge ahead, or a
/// stone that cannot move because a wall, the edge or another stone is
/// behind it.
pub fn apply(grid: &Grid, state: &State, direction: Direction) -> Option<Successor> {
    let dest = grid.move_position(state.agent(), direction)?;

    match state.occupant(grid, dest) {
        Occupant::Empty => Some(Successor {
            state: state.walk(grid, dest),
            action: Move::walk(direction),
            cost: 0,
            stone_target: None,
        }),
        Occupant::Stone(weight) => {
            let target = grid.move_position(dest, direction)?;
            match state.occupant(grid, target) {
                Occupant::Empty => Some(Successor {
                    state: state.push(grid, dest, target)?,
                    action: Move::push(direction),
                    cost: weight,
                    stone_target: Some(target),
                }),
                Occupant::Wall | Occupant::Stone(_) | Occupant::Agent => None,
            }
        }
        Occupant::Wall | Occupant::Agent => None,
    }
}

/// All legal one-step successors, in up, down, left, right order.
pub fn successors(grid: &Grid, state: &State) -> ArrayVec<Successor, 4> {
    ALL_DIRECTIONS
        .iter()
        .filter_map(|&direction| apply(grid, state, direction))
        .collect()
}
