use crate::game::{ALL_DIRECTIONS, Grid, Position};
use crate::transition::Successor;

pub struct Deadlocks {
    /// Cells from which no stone can be pushed onto any switch.
    dead: Vec<bool>,
}

impl Deadlocks {
    pub fn new(grid: &Grid) -> Self {
        let mut reachable = vec![false; grid.width() * grid.height()];

        // For each switch, walk backwards via pulls to find every cell a stone
        // could be pushed from.
        for &switch in grid.switches() {
            Self::mark_reachable_from_switch(grid, switch, &mut reachable);
        }

        let dead = grid
            .positions()
            .map(|pos| !grid.is_wall(pos) && !reachable[grid.index(pos)])
            .collect();

        Deadlocks { dead }
    }

    fn mark_reachable_from_switch(grid: &Grid, switch: Position, reachable: &mut [bool]) {
        if reachable[grid.index(switch)] {
            return;
        }

        let mut stack = vec![switch];
        reachable[grid.index(switch)] = true;

        while let Some(stone) = stack.pop() {
            for direction in ALL_DIRECTIONS {
                // Pulling the stone one cell needs the agent two cells away.
                let Some(prev) = grid.move_position(stone, direction) else {
                    continue;
                };
                let Some(agent) = grid.move_position(prev, direction) else {
                    continue;
                };
                if !grid.is_wall(prev) && !grid.is_wall(agent) && !reachable[grid.index(prev)] {
                    reachable[grid.index(prev)] = true;
                    stack.push(prev);
                }
            }
        }
    }

    pub fn is_dead(&self, grid: &Grid, pos: Position) -> bool {
        self.dead[grid.index(pos)]
    }

    /// Returns true if the successor pushes a stone onto a dead square.
    pub fn is_push_deadlock(&self, grid: &Grid, successor: &Successor) -> bool {
        successor
            .stone_target
            .is_some_and(|target| self.is_dead(grid, target))
    }

    pub fn dead_count(&self) -> usize {
        self.dead.iter().filter(|&&dead| dead).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use crate::puzzle::Puzzle;
    use crate::transition::apply;

    #[test]
    fn test_corners_are_dead() {
        let puzzle = Puzzle::from_text("1\n#####\n#   #\n# $ #\n#  .#\n#@  #\n#####").unwrap();
        let grid = puzzle.grid();
        let deadlocks = Deadlocks::new(grid);

        assert!(deadlocks.is_dead(grid, Position::new(1, 1)));
        assert!(deadlocks.is_dead(grid, Position::new(3, 1)));
        assert!(deadlocks.is_dead(grid, Position::new(1, 4)));
        assert!(!deadlocks.is_dead(grid, Position::new(3, 3)));
        assert!(!deadlocks.is_dead(grid, Position::new(2, 2)));
        // Walls are never reported as dead squares.
        assert!(!deadlocks.is_dead(grid, Position::new(0, 0)));
    }

    #[test]
    fn test_push_into_corner_is_deadlock() {
        let puzzle = Puzzle::from_text("1\n#####\n#   #\n# $@#\n#  .#\n#####").unwrap();
        let grid = puzzle.grid();
        let deadlocks = Deadlocks::new(grid);

        // Pushing left pins the stone against the left wall.
        let push_left = apply(grid, puzzle.start(), Direction::Left).unwrap();
        assert!(push_left.action.is_push());
        assert!(deadlocks.is_push_deadlock(grid, &push_left));

        let walk_up = apply(grid, puzzle.start(), Direction::Up).unwrap();
        assert!(!deadlocks.is_push_deadlock(grid, &walk_up));
        assert!(deadlocks.dead_count() > 0);
    }

    #[test]
    fn test_switch_is_never_dead() {
        let puzzle = Puzzle::from_text("1\n####\n#.$#\n# @#\n####").unwrap();
        let grid = puzzle.grid();
        let deadlocks = Deadlocks::new(grid);
        assert!(!deadlocks.is_dead(grid, Position::new(1, 1)));
    }
}
