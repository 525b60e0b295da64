use super::Frontier;

/// Frontier that finds the minimum by scanning every pending cell, O(V) per pop. Scanning in
/// index order and only replacing the candidate on a strictly smaller cost gives the row-major
/// tie-break for free.
pub struct ScanFrontier<C> {
    pending: Vec<Option<C>>,
}

impl<C: Ord + Copy> Frontier<C> for ScanFrontier<C> {
    fn new(cells: usize) -> Self {
        ScanFrontier {
            pending: vec![None; cells],
        }
    }

    /// Inserts the cell or lowers its tentative cost.
    fn push(&mut self, index: usize, cost: C) {
        let slot = &mut self.pending[index];
        if slot.map_or(true, |c| cost < c) {
            *slot = Some(cost);
        }
    }

    fn pop_min(&mut self) -> Option<(usize, C)> {
        let mut best: Option<(usize, C)> = None;
        for (index, cost) in self.pending.iter().enumerate() {
            if let Some(cost) = *cost {
                if best.map_or(true, |(_, b)| cost < b) {
                    best = Some((index, cost));
                }
            }
        }
        if let Some((index, _)) = best {
            self.pending[index] = None;
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_by_cost_then_index() {
        let mut frontier: ScanFrontier<u32> = ScanFrontier::new(8);
        frontier.push(5, 2);
        frontier.push(3, 1);
        frontier.push(7, 1);
        frontier.push(1, 2);
        let order: Vec<_> = std::iter::from_fn(|| frontier.pop_min()).collect();
        assert_eq!(order, vec![(3, 1), (7, 1), (1, 2), (5, 2)]);
    }

    #[test]
    fn push_only_lowers_cost() {
        let mut frontier: ScanFrontier<u32> = ScanFrontier::new(2);
        frontier.push(0, 4);
        frontier.push(0, 6);
        frontier.push(1, 5);
        assert_eq!(frontier.pop_min(), Some((0, 4)));
        frontier.push(1, 3);
        assert_eq!(frontier.pop_min(), Some((1, 3)));
        assert_eq!(frontier.pop_min(), None);
    }
}
