use std::fmt;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::deadlocks::Deadlocks;
use crate::frontier::{Frontier, Ledger, NodeId, Priority};
use crate::game::{Cost, Grid};
use crate::heuristic::Heuristic;
use crate::solution::{Solution, reconstruct};
use crate::state::State;
use crate::transition::{Move, successors};

/// Frontier discipline of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// FIFO; finds the fewest moves, ignores weight.
    BreadthFirst,
    /// LIFO; no optimality guarantee.
    DepthFirst,
    /// Lowest pushed weight first, then fewest moves.
    UniformCost,
    /// Lowest weight plus heuristic first, then lowest weight.
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::UniformCost,
        Strategy::AStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "BFS",
            Strategy::DepthFirst => "DFS",
            Strategy::UniformCost => "UCS",
            Strategy::AStar => "A*",
        }
    }

    /// Name usable as a directory component.
    pub fn dir_name(self) -> &'static str {
        match self {
            Strategy::AStar => "A",
            other => other.name(),
        }
    }

    /// Whether the ledger compares pushed weight. Cost-unaware disciplines
    /// settle a state the first time it is generated, so it is queued once.
    pub fn is_cost_aware(self) -> bool {
        matches!(self, Strategy::UniformCost | Strategy::AStar)
    }

    fn frontier(self) -> Frontier {
        match self {
            Strategy::BreadthFirst => Frontier::fifo(),
            Strategy::DepthFirst => Frontier::lifo(),
            Strategy::UniformCost | Strategy::AStar => Frontier::ordered(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Expanding,
    Goal,
    Exhausted,
    Cutoff,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Goal | Phase::Exhausted | Phase::Cutoff)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// The node budget ran out first.
    Cutoff,
    /// Every reachable state was expanded without reaching a goal.
    Impossible,
}

#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Maximum number of nodes to expand before giving up.
    pub max_nodes: usize,
    /// Drop pushes that leave a stone on a square it can never leave for a
    /// switch.
    pub prune_dead_squares: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_nodes: usize::MAX,
            prune_dead_squares: false,
        }
    }
}

/// Search node: a state plus the path bookkeeping that reached it.
#[derive(Debug)]
pub(crate) struct Node {
    pub state: Rc<State>,
    /// Pushed weight from the start.
    pub cost: Cost,
    /// Number of moves from the start.
    pub depth: usize,
    pub parent: Option<(NodeId, Move)>,
}

pub struct Solver<'a, H: Heuristic> {
    grid: &'a Grid,
    strategy: Strategy,
    heuristic: H,
    deadlocks: Option<Deadlocks>,
    max_nodes: usize,
    nodes: Vec<Node>,
    frontier: Frontier,
    ledger: Ledger,
    phase: Phase,
    outcome: Option<SolveResult>,
    nodes_expanded: usize,
}

impl<'a, H: Heuristic> Solver<'a, H> {
    pub fn new(
        grid: &'a Grid,
        start: State,
        strategy: Strategy,
        heuristic: H,
        options: SolverOptions,
    ) -> Self {
        let deadlocks = options.prune_dead_squares.then(|| {
            let deadlocks = Deadlocks::new(grid);
            debug!(event = "dead_squares", count = deadlocks.dead_count());
            deadlocks
        });
        let mut solver = Solver {
            grid,
            strategy,
            heuristic,
            deadlocks,
            max_nodes: options.max_nodes,
            nodes: Vec::new(),
            frontier: strategy.frontier(),
            ledger: Ledger::new(),
            phase: Phase::Ready,
            outcome: None,
            nodes_expanded: 0,
        };
        solver.add_node(Rc::new(start), 0, 0, None);
        solver
    }

    /// Run the search to completion.
    pub fn solve(&mut self) -> SolveResult {
        loop {
            if let Some(result) = self.step() {
                return result;
            }
        }
    }

    /// Pop and process one frontier entry. Returns the outcome once the
    /// search has terminated; further calls return the same outcome.
    pub fn step(&mut self) -> Option<SolveResult> {
        if self.phase.is_terminal() {
            return self.outcome.clone();
        }
        self.phase = Phase::Expanding;

        let Some(id) = self.frontier.pop() else {
            return Some(self.finish(Phase::Exhausted, SolveResult::Impossible));
        };
        let state = Rc::clone(&self.nodes[id].state);
        let cost = self.nodes[id].cost;
        let depth = self.nodes[id].depth;

        // Cost-aware entries may be outbid after they were queued; the ledger
        // decides whether this one is still the best.
        let cost_aware = self.strategy.is_cost_aware();
        if cost_aware && self.ledger.dominates(&state, cost) {
            trace!(event = "stale", node = id, cost = cost);
            return None;
        }
        if self.nodes_expanded >= self.max_nodes {
            return Some(self.finish(Phase::Cutoff, SolveResult::Cutoff));
        }
        if cost_aware {
            self.ledger.record(Rc::clone(&state), cost);
        }
        self.nodes_expanded += 1;
        trace!(
            event = "expand",
            node = id,
            key = state.hash_key(),
            cost = cost,
            depth = depth
        );

        if state.is_goal(self.grid) {
            let solution = reconstruct(&self.nodes, id, self.nodes_expanded);
            return Some(self.finish(Phase::Goal, SolveResult::Solved(solution)));
        }

        for successor in successors(self.grid, &state) {
            if let Some(deadlocks) = &self.deadlocks {
                if deadlocks.is_push_deadlock(self.grid, &successor) {
                    continue;
                }
            }
            let new_cost = cost + successor.cost as Cost;
            if self
                .ledger
                .dominates(&successor.state, self.ledger_cost(new_cost))
            {
                continue;
            }
            self.add_node(
                Rc::new(successor.state),
                new_cost,
                depth + 1,
                Some((id, successor.action)),
            );
        }

        None
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// Nodes ever placed on the frontier, including the start node.
    pub fn nodes_generated(&self) -> usize {
        self.nodes.len()
    }

    pub fn peak_frontier(&self) -> usize {
        self.frontier.high_water()
    }

    /// Approximate bytes held by this search: the node table, one shared
    /// state per node, the frontier at its peak and the ledger.
    pub fn memory_bytes(&self) -> usize {
        let rc_state = mem::size_of::<State>() + 2 * mem::size_of::<usize>();
        self.nodes.capacity() * mem::size_of::<Node>()
            + self.nodes.len() * rc_state
            + self.frontier.peak_bytes()
            + self.ledger.bytes()
    }

    fn ledger_cost(&self, cost: Cost) -> Cost {
        if self.strategy.is_cost_aware() {
            cost
        } else {
            0
        }
    }

    fn add_node(
        &mut self,
        state: Rc<State>,
        cost: Cost,
        depth: usize,
        parent: Option<(NodeId, Move)>,
    ) {
        let priority = match self.strategy {
            Strategy::UniformCost => Priority::new(cost, depth as Cost),
            Strategy::AStar => Priority::new(cost + self.heuristic.estimate(&state), cost),
            Strategy::BreadthFirst | Strategy::DepthFirst => Priority::new(0, 0),
        };
        if !self.strategy.is_cost_aware() {
            self.ledger.record(Rc::clone(&state), 0);
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            state,
            cost,
            depth,
            parent,
        });
        self.frontier.push(id, priority);
    }

    fn finish(&mut self, phase: Phase, outcome: SolveResult) -> SolveResult {
        debug!(
            event = "search_end",
            strategy = self.strategy.name(),
            phase = ?phase,
            expanded = self.nodes_expanded,
            generated = self.nodes.len(),
            settled = self.ledger.len(),
            peak_frontier = self.frontier.high_water(),
        );
        self.phase = phase;
        self.outcome = Some(outcome.clone());
        outcome
    }
}
