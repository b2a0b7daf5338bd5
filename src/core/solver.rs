//! Full solve pipeline
//!
//! column reduction -> reduction transfer -> augmenting row reduction
//! (repeated) -> shortest path augmentation -> optional verification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::core::arr::augmenting_row_reduction;
use crate::core::augment::augment;
use crate::core::error::Result;
use crate::core::graph::SparseCostGraph;
use crate::core::instance::Solution;
use crate::core::options::SolverOptions;
use crate::core::reduction::{column_reduction, reduction_transfer};
use crate::core::state::AssignmentState;
use crate::core::verify::verify;

/// Progress callback for batch solving: `(solved, total)`
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Runs the phases in order with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Solver {
    options: SolverOptions,
}

impl Solver {
    /// Create a solver with the default schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom options
    pub fn with_options(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solve `graph` from a cold start
    pub fn solve(&self, graph: &SparseCostGraph) -> Result<Solution> {
        let mut state = AssignmentState::new(graph.n());
        self.solve_in_place(graph, &mut state)?;
        Solution::from_state(graph, state)
    }

    /// Solve into caller-owned state arrays.
    ///
    /// With column reduction enabled the state is reset first. Without it
    /// the current assignment and duals are kept and only the free rows
    /// go through augmenting row reduction. An assigned row whose column
    /// is not among its cheapest under the current prices is released
    /// first, so any consistent partial solution can be continued.
    pub fn solve_in_place(&self, graph: &SparseCostGraph, state: &mut AssignmentState) -> Result<()> {
        let started = Instant::now();
        let n = graph.n();
        graph.check_coverage()?;
        if state.n() != n {
            *state = AssignmentState::new(n);
        }
        state.check_consistency()?;

        let mut free = if self.options.column_reduction {
            let reduced = column_reduction(graph, state)?;
            reduction_transfer(graph, state, &reduced.transfer_rows)?;
            reduced.free_rows
        } else {
            release_dominated_rows(graph, state)?;
            state.free_rows()
        };

        for pass in 0..self.options.arr_passes {
            if free.is_empty() {
                break;
            }
            debug!("arr pass {}: {} free rows", pass + 1, free.len());
            free = augmenting_row_reduction(graph, state, &free)?;
        }

        augment(graph, state, &free)?;

        if self.options.verify {
            verify(graph, state)?;
        }

        debug!(
            "solved n={} ({} edges) in {:.3?}",
            n,
            graph.num_edges(),
            started.elapsed()
        );
        Ok(())
    }

    /// Solve independent instances in parallel on the current rayon pool.
    ///
    /// Each instance owns its state; results come back in input order.
    pub fn solve_batch(
        &self,
        graphs: &[SparseCostGraph],
        progress: Option<&ProgressCallback>,
    ) -> Vec<Result<Solution>> {
        let total = graphs.len() as u64;
        let solved = AtomicU64::new(0);

        let results: Vec<Result<Solution>> = graphs
            .par_iter()
            .map(|graph| {
                let result = self.solve(graph);
                let done = solved.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = progress {
                    progress(done, total);
                }
                result
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!("batch: {} instances solved, {} failed", results.len() - failed, failed);
        results
    }
}

/// Free every assigned row that holds a column of larger reduced cost
/// than its row minimum. Augmentation relies on the opposite for every
/// row it does not start from. Returns how many rows were released.
fn release_dominated_rows(graph: &SparseCostGraph, state: &mut AssignmentState) -> Result<usize> {
    let n = state.sentinel();
    let mut released = 0usize;

    for i in 0..n {
        let Some(held) = state.column_of(i) else {
            continue;
        };
        let held_reduced = graph.cost(i, held)? - state.v[held];
        let row_min = graph
            .row_entries(i)
            .map(|(j, c)| c - state.v[j])
            .fold(f64::INFINITY, f64::min);

        if !(held_reduced <= row_min) {
            trace!("warm start: row {i} releases column {held} ({held_reduced} > {row_min})");
            state.release_row(i);
            state.y[held] = n;
            released += 1;
        }
    }

    if released > 0 {
        debug!("warm start: released {released} rows not holding a cheapest column");
    }
    Ok(released)
}
