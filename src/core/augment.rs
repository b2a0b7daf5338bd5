//! Shortest augmenting path phase
//!
//! For every row left free by augmenting row reduction, a Dijkstra-style
//! search over reduced costs finds the cheapest alternating path to a free
//! column, prices of the columns the search expanded are lowered by how
//! much closer they were than that column, and the path is flipped into
//! the matching.
//!
//! Columns move through three sets during one search:
//! - TODO: labeled with a tentative distance `d[j]`
//! - SCAN: settled at the current minimum distance, waiting to be expanded
//! - READY: expanded; their prices are updated when the search ends
//!
//! The search relies on every assigned row holding a column of minimal
//! reduced cost, which the earlier phases and the price update maintain.

use log::{debug, trace};

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;

/// Scratch arrays for one call, reset per row with a generation stamp
/// instead of clearing `O(n)` entries.
struct ScratchSpace {
    d: Vec<f64>,
    pred: Vec<usize>,
    labeled: Vec<u32>,
    done: Vec<u32>,
    generation: u32,
    todo: Vec<usize>,
    scan: Vec<usize>,
    ready: Vec<usize>,
}

impl ScratchSpace {
    fn new(n: usize) -> Self {
        Self {
            d: vec![f64::INFINITY; n],
            pred: vec![n; n],
            labeled: vec![0; n],
            done: vec![0; n],
            generation: 0,
            todo: Vec::new(),
            scan: Vec::new(),
            ready: Vec::new(),
        }
    }

    #[inline(always)]
    fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Generation wrapped, need full reset
            self.labeled.fill(0);
            self.done.fill(0);
            self.generation = 1;
        }
        self.todo.clear();
        self.scan.clear();
        self.ready.clear();
    }

    #[inline(always)]
    fn is_done(&self, column: usize) -> bool {
        self.done[column] == self.generation
    }

    #[inline(always)]
    fn is_labeled(&self, column: usize) -> bool {
        self.labeled[column] == self.generation
    }

    #[inline(always)]
    fn dist(&self, column: usize) -> f64 {
        if self.is_labeled(column) {
            self.d[column]
        } else {
            f64::INFINITY
        }
    }

    #[inline(always)]
    fn label(&mut self, column: usize, dist: f64, row: usize) {
        self.d[column] = dist;
        self.pred[column] = row;
        self.labeled[column] = self.generation;
    }

    #[inline(always)]
    fn settle(&mut self, column: usize) {
        self.scan.push(column);
        self.done[column] = self.generation;
    }

    /// Move every unsettled TODO column at the smallest distance into SCAN,
    /// keeping TODO order among ties. Returns that distance.
    ///
    /// TODO is compacted on the way, so it only ever holds columns that are
    /// labeled but not yet settled.
    fn next_tier(&mut self) -> f64 {
        self.scan.clear();
        let generation = self.generation;
        let done = &mut self.done;
        let d = &self.d;

        // drop columns settled directly during the last expansion
        self.todo.retain(|&j| done[j] != generation);

        let mut umin = f64::INFINITY;
        for &j in &self.todo {
            let dj = d[j];
            if dj <= umin {
                if dj < umin {
                    self.scan.clear();
                    umin = dj;
                }
                self.scan.push(j);
            }
        }
        for &j in &self.scan {
            done[j] = generation;
        }
        self.todo.retain(|&j| done[j] != generation);
        umin
    }
}

/// Search counters, reported at debug level
#[derive(Debug, Default)]
struct AugmentStats {
    rows: usize,
    tiers: usize,
    expanded: usize,
    path_len: usize,
}

/// Run the search from free row `start` and return the free column it
/// reaches. Column prices of the READY set are updated before returning.
fn find_path(
    graph: &SparseCostGraph,
    state: &mut AssignmentState,
    scratch: &mut ScratchSpace,
    start: usize,
    stats: &mut AugmentStats,
) -> Result<usize> {
    let n = state.sentinel();
    scratch.reset();

    for (j, c) in graph.row_entries(start) {
        let reduced = c - state.v[j];
        if reduced.is_finite() {
            scratch.label(j, reduced, start);
            scratch.todo.push(j);
        }
    }

    let mut lo = 0usize;
    let mut umin = f64::INFINITY;

    let target = 'search: loop {
        if lo == scratch.scan.len() {
            lo = 0;
            umin = scratch.next_tier();
            stats.tiers += 1;
            if scratch.scan.is_empty() || !umin.is_finite() {
                return Err(Error::Infeasible { row: start });
            }
            if let Some(&j) = scratch.scan.iter().find(|&&j| state.y[j] == n) {
                break 'search j;
            }
        }

        let j1 = scratch.scan[lo];
        lo += 1;
        let i1 = state.y[j1];
        scratch.ready.push(j1);
        stats.expanded += 1;

        let assigned_cost = graph.cost(i1, j1)?;
        if !assigned_cost.is_finite() {
            return Err(Error::InvalidInput(format!(
                "assigned pair ({i1}, {j1}) has non-finite cost"
            )));
        }
        let h = assigned_cost - state.v[j1] - umin;

        for (j, c) in graph.row_entries(i1) {
            if scratch.is_done(j) {
                continue;
            }
            let cred = c - state.v[j] - h;
            if cred < scratch.dist(j) {
                let first = !scratch.is_labeled(j);
                scratch.label(j, cred, i1);
                if cred <= umin {
                    if state.y[j] == n {
                        break 'search j;
                    }
                    scratch.settle(j);
                } else if first {
                    scratch.todo.push(j);
                }
            }
        }
    };

    for &j in &scratch.ready {
        state.v[j] += scratch.d[j] - umin;
    }

    trace!(
        "augment: row {start} reached column {target} at distance {umin} ({} ready)",
        scratch.ready.len()
    );
    Ok(target)
}

/// Flip the alternating path ending in `target` back to `start`.
fn reverse_path(
    state: &mut AssignmentState,
    scratch: &ScratchSpace,
    start: usize,
    target: usize,
    stats: &mut AugmentStats,
) -> Result<()> {
    let n = state.sentinel();
    let mut j = target;
    for _ in 0..=n {
        let i = scratch.pred[j];
        if i >= n {
            break;
        }
        state.y[j] = i;
        let next = std::mem::replace(&mut state.x[i], j);
        stats.path_len += 1;
        if i == start {
            return Ok(());
        }
        j = next;
    }
    Err(Error::InvalidInput(format!(
        "augmenting path from row {start} is broken"
    )))
}

/// Augment every row of `free_rows`, then recompute `u` for all rows.
///
/// On success `x`/`y` form a perfect matching and
/// `u[i] = cost(i, x[i]) - v[x[i]]` for every row.
pub fn augment(
    graph: &SparseCostGraph,
    state: &mut AssignmentState,
    free_rows: &[usize],
) -> Result<()> {
    let n = graph.n();
    if state.n() != n {
        return Err(Error::InvalidInput(format!(
            "state has size {} but graph has size {n}",
            state.n()
        )));
    }

    let mut scratch = ScratchSpace::new(n);
    let mut stats = AugmentStats::default();

    for &start in free_rows {
        if start >= n {
            return Err(Error::InvalidInput(format!("free row {start} out of range")));
        }
        if let Some(j) = state.column_of(start) {
            return Err(Error::InvalidInput(format!(
                "row {start} is listed as free but holds column {j}"
            )));
        }

        let target = find_path(graph, state, &mut scratch, start, &mut stats)?;
        reverse_path(state, &scratch, start, target, &mut stats)?;
        stats.rows += 1;
    }

    for i in 0..n {
        let j = state.column_of(i).ok_or(Error::Unassigned { row: i })?;
        state.u[i] = graph.cost(i, j)? - state.v[j];
    }

    debug!(
        "augmentation: {} rows, {} tiers, {} columns expanded, {} path edges",
        stats.rows, stats.tiers, stats.expanded, stats.path_len
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_generation_reset() {
        let mut scratch = ScratchSpace::new(3);
        scratch.reset();
        scratch.label(1, 2.5, 0);
        scratch.settle(1);
        assert!(scratch.is_done(1));
        assert_eq!(scratch.dist(1), 2.5);

        scratch.reset();
        assert!(!scratch.is_done(1));
        assert!(scratch.dist(1).is_infinite());
        assert!(scratch.scan.is_empty());
    }

    #[test]
    fn test_scratch_generation_wrap() {
        let mut scratch = ScratchSpace::new(2);
        scratch.generation = u32::MAX;
        scratch.done[0] = u32::MAX;
        scratch.reset();
        assert_eq!(scratch.generation, 1);
        assert!(!scratch.is_done(0));
    }

    #[test]
    fn test_next_tier_keeps_order_among_ties() {
        let mut scratch = ScratchSpace::new(4);
        scratch.reset();
        for (j, d) in [(3, 2.0), (0, 1.0), (2, 1.0), (1, 4.0)] {
            scratch.label(j, d, 9);
            scratch.todo.push(j);
        }
        assert_eq!(scratch.next_tier(), 1.0);
        assert_eq!(scratch.scan, vec![0, 2]);
        assert!(scratch.is_done(0) && scratch.is_done(2));
        assert_eq!(scratch.todo, vec![3, 1]);

        scratch.scan.clear();
        assert_eq!(scratch.next_tier(), 2.0);
        assert_eq!(scratch.scan, vec![3]);
        assert_eq!(scratch.todo, vec![1]);
    }

    #[test]
    fn test_next_tier_drops_columns_settled_during_expansion() {
        let mut scratch = ScratchSpace::new(4);
        scratch.reset();
        for (j, d) in [(0, 3.0), (1, 5.0), (2, 4.0)] {
            scratch.label(j, d, 9);
            scratch.todo.push(j);
        }
        // column 2 was relabeled at the current tier and settled in place
        scratch.label(2, 1.0, 8);
        scratch.settle(2);

        scratch.scan.clear();
        assert_eq!(scratch.next_tier(), 3.0);
        assert_eq!(scratch.scan, vec![0]);
        assert_eq!(scratch.todo, vec![1]);
    }

    #[test]
    fn test_single_free_row_direct_column() {
        // row 0 holds column 0; row 1 is free and column 1 is free
        let g = SparseCostGraph::from_rows(&[vec![(0, 1.0), (1, 3.0)], vec![(0, 2.0), (1, 5.0)]])
            .unwrap();
        let mut state = AssignmentState::new(2);
        state.assign(0, 0);
        state.v = vec![1.0, 3.0];

        augment(&g, &mut state, &[1]).unwrap();
        // swapping is cheaper: 3 + 2 = 5 < 1 + 5 = 6
        assert_eq!(state.x, vec![1, 0]);
        assert_eq!(state.y, vec![1, 0]);
        for i in 0..2 {
            let j = state.x[i];
            assert_eq!(state.u[i] + state.v[j], g.cost(i, j).unwrap());
        }
    }

    #[test]
    fn test_infeasible_row_is_reported() {
        // both rows can only use column 0
        let g = SparseCostGraph::from_rows(&[vec![(0, 1.0)], vec![(0, 2.0), (1, f64::INFINITY)]])
            .unwrap();
        let mut state = AssignmentState::new(2);
        state.assign(0, 0);
        state.v = vec![1.0, 0.0];
        assert!(matches!(
            augment(&g, &mut state, &[1]),
            Err(Error::Infeasible { row: 1 })
        ));
    }

    #[test]
    fn test_unlisted_free_row_is_reported() {
        let g = SparseCostGraph::from_rows(&[vec![(0, 1.0)], vec![(1, 1.0)]]).unwrap();
        let mut state = AssignmentState::new(2);
        assert!(matches!(
            augment(&g, &mut state, &[0]),
            Err(Error::Unassigned { row: 1 })
        ));
    }

    #[test]
    fn test_long_alternating_path() {
        // the only free column is two alternations away from the free row
        let g = SparseCostGraph::from_rows(&[
            vec![(0, 0.0), (1, 3.0)],
            vec![(1, 0.0), (2, 4.0)],
            vec![(0, 2.0)],
        ])
        .unwrap();
        let mut state = AssignmentState::new(3);
        state.assign(0, 0);
        state.assign(1, 1);

        augment(&g, &mut state, &[2]).unwrap();
        assert!(state.is_perfect());
        assert_eq!(state.x, vec![1, 2, 0]);
        assert_eq!(state.y, vec![2, 0, 1]);
        assert_eq!(state.total_cost(&g).unwrap(), 9.0);
        // settled columns were discounted by their distance gap
        assert_eq!(state.v, vec![-7.0, -4.0, 0.0]);
        assert_eq!(state.u, vec![7.0, 4.0, 9.0]);
    }
}
