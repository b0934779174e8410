use crate::game::{Cost, Grid, MAX_STONES, Position};
use crate::hungarian::{ArrayMatrix, hungarian_algorithm};
use crate::state::State;

/// Trait for lower-bounding the pushed weight still needed to solve a state.
pub trait Heuristic {
    /// Estimate the remaining cost from `state` to any goal state.
    fn estimate(&self, state: &State) -> Cost;
}

pub struct NullHeuristic;

impl NullHeuristic {
    pub fn new() -> Self {
        NullHeuristic
    }
}

impl Heuristic for NullHeuristic {
    fn estimate(&self, _state: &State) -> Cost {
        0
    }
}

/// Exact minimum-weight assignment of stones to switches under Manhattan
/// distance.
///
/// Every push moves one stone one cell, so a stone of weight `w` at distance
/// `d` from its final switch costs at least `w * d`. Obstacles are ignored,
/// which keeps the bound admissible. Without a perfect matching (stone and
/// switch counts differ) the nearest-switch sum is used instead.
pub struct AssignmentHeuristic {
    switches: Vec<Position>,
}

impl AssignmentHeuristic {
    pub fn new(grid: &Grid) -> Self {
        AssignmentHeuristic {
            switches: grid.switches().to_vec(),
        }
    }
}

impl Heuristic for AssignmentHeuristic {
    fn estimate(&self, state: &State) -> Cost {
        let n = state.stone_count();
        if n != self.switches.len() {
            return nearest_switch_sum(&self.switches, state);
        }

        let mut costs: ArrayMatrix<Cost, { MAX_STONES * MAX_STONES }> = ArrayMatrix::new(n, n);
        for stone in state.stones() {
            for &switch in &self.switches {
                costs.push(stone.weight as Cost * stone.position.manhattan(switch) as Cost);
            }
        }
        hungarian_algorithm(&costs)
    }
}

/// Each stone independently charged for its nearest switch.
///
/// Cheaper than the assignment bound. Several stones may be charged for the
/// same switch.
pub struct NearestSwitchHeuristic {
    switches: Vec<Position>,
}

impl NearestSwitchHeuristic {
    pub fn new(grid: &Grid) -> Self {
        NearestSwitchHeuristic {
            switches: grid.switches().to_vec(),
        }
    }
}

impl Heuristic for NearestSwitchHeuristic {
    fn estimate(&self, state: &State) -> Cost {
        nearest_switch_sum(&self.switches, state)
    }
}

fn nearest_switch_sum(switches: &[Position], state: &State) -> Cost {
    state
        .stones()
        .iter()
        .map(|stone| {
            let nearest = switches
                .iter()
                .map(|&switch| stone.position.manhattan(switch))
                .min()
                .unwrap_or(0);
            stone.weight as Cost * nearest as Cost
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use crate::solver::{SolveResult, Solver, SolverOptions, Strategy};

    fn ucs_cost(puzzle: &Puzzle) -> Option<Cost> {
        let mut solver = Solver::new(
            puzzle.grid(),
            puzzle.start().clone(),
            Strategy::UniformCost,
            NullHeuristic::new(),
            SolverOptions::default(),
        );
        match solver.solve() {
            SolveResult::Solved(solution) => Some(solution.cost),
            _ => None,
        }
    }

    #[test]
    fn test_solved_state_is_zero() {
        let puzzle = Puzzle::from_text("3 4\n#####\n#*@*#\n#####").unwrap();
        let assignment = AssignmentHeuristic::new(puzzle.grid());
        let nearest = NearestSwitchHeuristic::new(puzzle.grid());
        assert_eq!(assignment.estimate(puzzle.start()), 0);
        assert_eq!(nearest.estimate(puzzle.start()), 0);
    }

    #[test]
    fn test_one_stone() {
        let puzzle = Puzzle::from_text("5\n#######\n#@$  .#\n#######").unwrap();
        let heuristic = AssignmentHeuristic::new(puzzle.grid());
        // Distance 3, weight 5
        assert_eq!(heuristic.estimate(puzzle.start()), 15);
    }

    #[test]
    fn test_assignment_keeps_light_stone_on_far_switch() {
        // Switches at x=0 and x=5; light stone at x=1, heavy stone at x=2.
        let puzzle = Puzzle::from_text("1 100\n.$$  .\n@     ").unwrap();
        let grid = puzzle.grid();
        let start = puzzle.start();

        let assignment = AssignmentHeuristic::new(grid).estimate(start);
        // Light stone to x=5 (4 * 1) and heavy stone to x=0 (2 * 100).
        assert_eq!(assignment, 204);

        // Pairing stones with switches in scan order, each taking the closest
        // free switch, sends the light stone to x=0 and the heavy one to x=5.
        let sequential = 1 + 3 * 100;
        assert!(assignment < sequential);

        // Both stones are charged for the switch at x=0.
        let nearest = NearestSwitchHeuristic::new(grid).estimate(start);
        assert_eq!(nearest, 1 + 200);
        assert!(nearest <= assignment);
    }

    #[test]
    fn test_assignment_admissible() {
        let puzzles = [
            "5\n@  \n $ \n  .",
            "1 9\n######\n#.   #\n#.$$ #\n# @  #\n######",
            "2 3\n#######\n#     #\n# $$  #\n#  .. #\n#  @  #\n#######",
            "4 1\n######\n#@   #\n# $$ #\n#.  .#\n######",
        ];
        for text in puzzles {
            let puzzle = Puzzle::from_text(text).unwrap();
            let optimal = ucs_cost(&puzzle).expect("puzzle should be solvable");
            let assignment = AssignmentHeuristic::new(puzzle.grid()).estimate(puzzle.start());
            let nearest = NearestSwitchHeuristic::new(puzzle.grid()).estimate(puzzle.start());
            assert!(assignment <= optimal, "{}: {} > {}", text, assignment, optimal);
            assert!(nearest <= assignment, "{}: {} > {}", text, nearest, assignment);
        }
    }

    #[test]
    fn test_unequal_counts_fall_back_to_nearest() {
        // One stone, two switches: no perfect matching exists.
        let puzzle = Puzzle::from_text("3\n#######\n#.@$ .#\n#######").unwrap();
        let assignment = AssignmentHeuristic::new(puzzle.grid()).estimate(puzzle.start());
        let nearest = NearestSwitchHeuristic::new(puzzle.grid()).estimate(puzzle.start());
        assert_eq!(assignment, 6);
        assert_eq!(assignment, nearest);

        // Two stones, one switch.
        let puzzle = Puzzle::from_text("2 5\n######\n#@$$.#\n######").unwrap();
        let assignment = AssignmentHeuristic::new(puzzle.grid()).estimate(puzzle.start());
        assert_eq!(assignment, 2 * 2 + 5);
    }

    #[test]
    fn test_null_heuristic() {
        let puzzle = Puzzle::from_text("5\n#######\n#@$  .#\n#######").unwrap();
        assert_eq!(NullHeuristic::new().estimate(puzzle.start()), 0);
    }
}
