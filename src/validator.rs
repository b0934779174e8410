use thiserror::Error;

use crate::game::{Cost, Grid};
use crate::state::State;
use crate::transition::{Move, apply};

/// Reasons a move string fails to replay. Steps are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("step {step}: '{code}' is not a move code")]
    InvalidMove { step: usize, code: char },

    #[error("step {step}: move '{code}' is blocked")]
    Blocked { step: usize, code: char },

    #[error("step {step}: move '{code}' is mislabelled, the agent would perform {}", label(.pushed))]
    LabelMismatch {
        step: usize,
        code: char,
        pushed: bool,
    },

    #[error("{stones_off_switch} stone(s) are not on a switch after the last move")]
    NotSolved { stones_off_switch: usize },
}

fn label(pushed: &bool) -> &'static str {
    if *pushed { "a push" } else { "a walk" }
}

/// Summary of a successful replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    /// Total pushed weight.
    pub cost: Cost,
    pub steps: usize,
    pub pushes: usize,
}

/// Replay `moves` from `start` and check that it ends in a goal state.
///
/// Whitespace in `moves` is ignored so files with a trailing newline can be
/// checked directly.
pub fn verify(grid: &Grid, start: &State, moves: &str) -> Result<Replay, VerifyError> {
    let mut state = start.clone();
    let mut replay = Replay {
        cost: 0,
        steps: 0,
        pushes: 0,
    };

    for code in moves.chars().filter(|c| !c.is_whitespace()) {
        let step = replay.steps + 1;
        let expected = Move::from_code(code).ok_or(VerifyError::InvalidMove { step, code })?;
        let successor =
            apply(grid, &state, expected.direction()).ok_or(VerifyError::Blocked { step, code })?;
        if successor.action != expected {
            return Err(VerifyError::LabelMismatch {
                step,
                code,
                pushed: successor.action.is_push(),
            });
        }

        replay.cost += successor.cost as Cost;
        replay.steps = step;
        if successor.action.is_push() {
            replay.pushes += 1;
        }
        state = successor.state;
    }

    if !state.is_goal(grid) {
        return Err(VerifyError::NotSolved {
            stones_off_switch: state.stones_off_switch(grid),
        });
    }
    Ok(replay)
}
