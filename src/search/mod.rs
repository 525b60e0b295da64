//! Uniform-cost shortest path search over a [Grid].
//!
//! The search is Dijkstra's algorithm driven by a distance-ordered [Frontier]. On a grid with
//! unit edges it produces the same result as a breadth-first search, but it is written against a
//! generic cost so weighted terrain only needs a different edge cost function.
use std::ops::Add;

use log::{debug, info};
use num_traits::Zero;

use crate::grid::{Cell, Grid};

pub mod heap;
pub mod scan;

use heap::HeapFrontier;
use scan::ScanFrontier;

/// Set of cells discovered but not yet finalized, ordered by tentative cost.
///
/// `pop_min` must return the smallest cost and, among equal costs, the smallest index. Since
/// indices are row-major this makes every trace reproducible for identical grids.
pub trait Frontier<C> {
    fn new(cells: usize) -> Self;
    fn push(&mut self, index: usize, cost: C);
    fn pop_min(&mut self) -> Option<(usize, C)>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrontierKind {
    /// Binary heap, O((V + E) log V).
    #[default]
    Heap,
    /// Linear scan over all pending cells, O(V^2).
    LinearScan,
}

/// Outcome of one search. `visited` lists cells in the order they were finalized and
/// `distances[i]` is the final distance of `visited[i]`. `path` runs from start to end
/// inclusive and is empty when the end cannot be reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult<C = u32> {
    pub visited: Vec<Cell>,
    pub distances: Vec<C>,
    pub path: Vec<Cell>,
}

impl<C> Default for SearchResult<C> {
    fn default() -> Self {
        SearchResult {
            visited: Vec::new(),
            distances: Vec::new(),
            path: Vec::new(),
        }
    }
}

impl<C: Copy> SearchResult<C> {
    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }
    /// Number of moves along the path.
    pub fn path_len(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }
    /// Distance of the end cell, which is always the last cell finalized on success.
    pub fn distance_to_end(&self) -> Option<C> {
        if self.found() {
            self.distances.last().copied()
        } else {
            None
        }
    }
}

/// Search-scoped state, indexed by dense cell id and allocated fresh for every run.
struct SearchState<C> {
    distance: Vec<Option<C>>,
    visited: Vec<bool>,
    predecessor: Vec<Option<usize>>,
}

impl<C: Copy> SearchState<C> {
    fn new(cells: usize) -> Self {
        SearchState {
            distance: vec![None; cells],
            visited: vec![false; cells],
            predecessor: vec![None; cells],
        }
    }

    /// Follows predecessor links back from `end` and returns the path in start to end order.
    fn reconstruct_path(&self, grid: &Grid, end: usize) -> Vec<Cell> {
        let mut path: Vec<Cell> =
            std::iter::successors(Some(end), |&ix| self.predecessor[ix])
                .map(|ix| grid.cell_at_ix(ix))
                .collect();
        path.reverse();
        path
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PathSearch {
    pub frontier: FrontierKind,
}

impl PathSearch {
    pub fn new() -> PathSearch {
        PathSearch::default()
    }
    /// Selects the minimum by scanning all pending cells, like the reference visualizer.
    pub fn linear_scan() -> PathSearch {
        PathSearch {
            frontier: FrontierKind::LinearScan,
        }
    }

    /// Runs the search with unit cost for every move.
    pub fn run(&self, grid: &Grid) -> SearchResult<u32> {
        self.run_weighted(grid, |_, _| 1)
    }

    /// Runs the search with `edge_cost(from, to)` as the cost of moving between neighbours.
    /// Costs must be non-negative for the result to be a shortest path.
    pub fn run_weighted<C, W>(&self, grid: &Grid, edge_cost: W) -> SearchResult<C>
    where
        C: Zero + Ord + Copy + Add<Output = C>,
        W: FnMut(Cell, Cell) -> C,
    {
        match self.frontier {
            FrontierKind::Heap => dijkstra::<C, HeapFrontier<C>, W>(grid, edge_cost),
            FrontierKind::LinearScan => dijkstra::<C, ScanFrontier<C>, W>(grid, edge_cost),
        }
    }
}

fn dijkstra<C, F, W>(grid: &Grid, mut edge_cost: W) -> SearchResult<C>
where
    C: Zero + Ord + Copy + Add<Output = C>,
    F: Frontier<C>,
    W: FnMut(Cell, Cell) -> C,
{
    debug!(
        "Searching {}x{} grid from {} to {}",
        grid.rows(),
        grid.cols(),
        grid.start(),
        grid.end()
    );
    let mut state: SearchState<C> = SearchState::new(grid.cell_count());
    let mut frontier = F::new(grid.cell_count());
    let mut result = SearchResult::default();
    let start_ix = grid.ix(grid.start());
    let end_ix = grid.ix(grid.end());

    // A walled start never propagates; the result is then simply empty.
    if !grid.is_wall_ix(start_ix) {
        state.distance[start_ix] = Some(C::zero());
        frontier.push(start_ix, C::zero());
    }

    while let Some((ix, cost)) = frontier.pop_min() {
        // Outdated entry for a cell that was already finalized at a lower cost
        if state.visited[ix] {
            continue;
        }
        state.visited[ix] = true;
        let cell = grid.cell_at_ix(ix);
        result.visited.push(cell);
        result.distances.push(cost);

        if ix == end_ix {
            result.path = state.reconstruct_path(grid, end_ix);
            debug!(
                "Reached {} after finalizing {} cells, path has {} cells",
                cell,
                result.visited.len(),
                result.path.len()
            );
            return result;
        }

        for n in grid.neighbours(cell) {
            let n_ix = grid.ix(n);
            if grid.is_wall_ix(n_ix) || state.visited[n_ix] {
                continue;
            }
            let new_cost = cost + edge_cost(cell, n);
            if state.distance[n_ix].map_or(true, |c| new_cost < c) {
                state.distance[n_ix] = Some(new_cost);
                state.predecessor[n_ix] = Some(ix);
                frontier.push(n_ix, new_cost);
            }
        }
    }
    info!(
        "{} is unreachable from {}, finalized {} cells",
        grid.end(),
        grid.start(),
        result.visited.len()
    );
    result
}
