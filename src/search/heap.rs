use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::Frontier;

struct SmallestCostHolder<C> {
    cost: C,
    index: usize,
}

impl<C: PartialEq> Eq for SmallestCostHolder<C> {}

impl<C: PartialEq> PartialEq for SmallestCostHolder<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost) && self.index == other.index
    }
}

impl<C: Ord> PartialOrd for SmallestCostHolder<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for SmallestCostHolder<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the smallest cost first, then the lowest
        // (row-major) index among equal costs.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.index.cmp(&self.index),
            s => s,
        }
    }
}

/// Binary heap frontier with lazy deletion. A cell whose distance improves is pushed again;
/// the outdated entry surfaces later and is skipped by the search because the cell has
/// already been finalized by then.
pub struct HeapFrontier<C> {
    to_see: BinaryHeap<SmallestCostHolder<C>>,
}

impl<C: Ord + Copy> Frontier<C> for HeapFrontier<C> {
    fn new(_cells: usize) -> Self {
        HeapFrontier {
            to_see: BinaryHeap::new(),
        }
    }

    fn push(&mut self, index: usize, cost: C) {
        self.to_see.push(SmallestCostHolder { cost, index });
    }

    fn pop_min(&mut self) -> Option<(usize, C)> {
        self.to_see.pop().map(|h| (h.index, h.cost))
    }
}
