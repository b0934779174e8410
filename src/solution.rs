use std::fmt;

use crate::frontier::NodeId;
use crate::game::Cost;
use crate::solver::Node;
use crate::transition::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Moves from the start state to the goal, in order.
    pub moves: Vec<Move>,
    /// Total pushed weight.
    pub cost: Cost,
    pub nodes_expanded: usize,
}

impl Solution {
    pub fn steps(&self) -> usize {
        self.moves.len()
    }

    pub fn pushes(&self) -> usize {
        self.moves.iter().filter(|m| m.is_push()).count()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.moves {
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

/// Follow parent links from `goal` back to the root and return the path in
/// chronological order.
pub(crate) fn reconstruct(nodes: &[Node], goal: NodeId, nodes_expanded: usize) -> Solution {
    let mut moves = Vec::with_capacity(nodes[goal].depth);
    let mut current = goal;
    while let Some((parent, action)) = nodes[current].parent {
        moves.push(action);
        current = parent;
    }
    moves.reverse();

    Solution {
        moves,
        cost: nodes[goal].cost,
        nodes_expanded,
    }
}
