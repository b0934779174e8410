//! Open-set and best-cost bookkeeping for the search driver.
//!
//! The frontier holds node ids and pops them in the order of its discipline.
//! The ledger maps canonical states to the best cost at which they were
//! expanded and decides whether a node is stale.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::mem;
use std::rc::Rc;

use crate::game::Cost;
use crate::state::State;

pub type NodeId = usize;

/// Ordering key for prioritized frontiers. Smaller keys pop first; equal
/// keys pop in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority {
    pub primary: Cost,
    pub secondary: Cost,
}

impl Priority {
    pub fn new(primary: Cost, secondary: Cost) -> Self {
        Priority { primary, secondary }
    }
}

#[derive(Debug)]
enum Queue {
    Fifo(VecDeque<NodeId>),
    Lifo(Vec<NodeId>),
    Ordered {
        heap: BinaryHeap<Reverse<(Priority, u64, NodeId)>>,
        next_sequence: u64,
    },
}

#[derive(Debug)]
pub struct Frontier {
    queue: Queue,
    high_water: usize,
}

impl Frontier {
    /// First in, first out.
    pub fn fifo() -> Self {
        Self::with_queue(Queue::Fifo(VecDeque::new()))
    }

    /// Last in, first out.
    pub fn lifo() -> Self {
        Self::with_queue(Queue::Lifo(Vec::new()))
    }

    /// Lowest priority first.
    pub fn ordered() -> Self {
        Self::with_queue(Queue::Ordered {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        })
    }

    fn with_queue(queue: Queue) -> Self {
        Frontier {
            queue,
            high_water: 0,
        }
    }

    /// Add a node. `priority` is ignored by the FIFO and LIFO disciplines.
    pub fn push(&mut self, node: NodeId, priority: Priority) {
        match &mut self.queue {
            Queue::Fifo(queue) => queue.push_back(node),
            Queue::Lifo(stack) => stack.push(node),
            Queue::Ordered {
                heap,
                next_sequence,
            } => {
                heap.push(Reverse((priority, *next_sequence, node)));
                *next_sequence += 1;
            }
        }
        self.high_water = self.high_water.max(self.len());
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        match &mut self.queue {
            Queue::Fifo(queue) => queue.pop_front(),
            Queue::Lifo(stack) => stack.pop(),
            Queue::Ordered { heap, .. } => heap.pop().map(|Reverse((_, _, node))| node),
        }
    }

    fn len(&self) -> usize {
        match &self.queue {
            Queue::Fifo(queue) => queue.len(),
            Queue::Lifo(stack) => stack.len(),
            Queue::Ordered { heap, .. } => heap.len(),
        }
    }

    /// Largest size the frontier has reached.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Bytes the frontier's entries occupied at their peak.
    pub fn peak_bytes(&self) -> usize {
        let entry = match &self.queue {
            Queue::Fifo(_) | Queue::Lifo(_) => mem::size_of::<NodeId>(),
            Queue::Ordered { .. } => mem::size_of::<Reverse<(Priority, u64, NodeId)>>(),
        };
        self.high_water * entry
    }
}

/// Best known cost per canonical state.
#[derive(Debug, Default)]
pub struct Ledger {
    best: HashMap<Rc<State>, Cost>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `state` is already recorded at a cost no greater than `cost`.
    pub fn dominates(&self, state: &State, cost: Cost) -> bool {
        self.best.get(state).is_some_and(|&best| best <= cost)
    }

    pub fn record(&mut self, state: Rc<State>, cost: Cost) {
        self.best.insert(state, cost);
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// Bytes of the table's slots; the states are owned by the node table.
    pub fn bytes(&self) -> usize {
        self.best.capacity() * (mem::size_of::<Rc<State>>() + mem::size_of::<Cost>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use crate::transition::successors;

    fn drain(frontier: &mut Frontier) -> Vec<NodeId> {
        std::iter::from_fn(|| frontier.pop()).collect()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::fifo();
        for (node, cost) in [(0, 9), (1, 1), (2, 5)] {
            frontier.push(node, Priority::new(cost, 0));
        }
        assert_eq!(drain(&mut frontier), vec![0, 1, 2]);
    }

    #[test]
    fn test_lifo_order() {
        let mut frontier = Frontier::lifo();
        for (node, cost) in [(0, 9), (1, 1), (2, 5)] {
            frontier.push(node, Priority::new(cost, 0));
        }
        assert_eq!(drain(&mut frontier), vec![2, 1, 0]);
    }

    #[test]
    fn test_ordered_by_primary_then_secondary() {
        let mut frontier = Frontier::ordered();
        frontier.push(0, Priority::new(5, 1));
        frontier.push(1, Priority::new(3, 9));
        frontier.push(2, Priority::new(5, 0));
        frontier.push(3, Priority::new(3, 2));
        assert_eq!(drain(&mut frontier), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_ordered_ties_pop_in_insertion_order() {
        let mut frontier = Frontier::ordered();
        for node in [7, 3, 5] {
            frontier.push(node, Priority::new(1, 1));
        }
        frontier.push(1, Priority::new(0, 4));
        assert_eq!(drain(&mut frontier), vec![1, 7, 3, 5]);
    }

    #[test]
    fn test_high_water() {
        let mut frontier = Frontier::lifo();
        assert_eq!(frontier.len(), 0);
        frontier.push(0, Priority::new(0, 0));
        frontier.push(1, Priority::new(0, 0));
        frontier.pop();
        frontier.push(2, Priority::new(0, 0));
        frontier.pop();
        frontier.pop();
        assert_eq!(frontier.pop(), None);
        assert_eq!(frontier.high_water(), 2);
        assert_eq!(frontier.peak_bytes(), 2 * mem::size_of::<NodeId>());
    }

    #[test]
    fn test_ledger_dominates() {
        let puzzle = Puzzle::from_text("3\n######\n#@$ .#\n######").unwrap();
        let state = Rc::new(puzzle.start().clone());
        let mut ledger = Ledger::new();

        assert!(!ledger.dominates(&state, 10));
        ledger.record(Rc::clone(&state), 10);
        assert!(ledger.dominates(&state, 10));
        assert!(ledger.dominates(&state, 12));
        assert!(!ledger.dominates(&state, 9));

        ledger.record(Rc::clone(&state), 4);
        assert!(ledger.dominates(&state, 4));
        assert!(!ledger.dominates(&state, 3));
        assert_eq!(ledger.len(), 1);

        // A different state is unaffected.
        let next = successors(puzzle.grid(), &state);
        assert!(!ledger.dominates(&next[0].state, 100));
    }
}
