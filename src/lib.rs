//! # sparse-lapjv
//!
//! Minimum-cost perfect matching on sparse bipartite graphs with the
//! Jonker-Volgenant shortest augmenting path method.
//!
//! Each row only lists the columns it can be matched to, in ascending
//! order, with their costs. The solver returns the optimal assignment
//! together with row and column duals that satisfy complementary
//! slackness: `u[i] + v[j] <= cost(i, j)` for every listed pair, with
//! equality on the matching.
//!
//! ## Quick Start
//!
//! ```rust
//! use sparse_lapjv::SparseCostGraph;
//!
//! # fn main() -> sparse_lapjv::Result<()> {
//! let graph = SparseCostGraph::from_rows(&[
//!     vec![(0, 2.0), (1, 1.0)],
//!     vec![(1, 2.0), (2, 1.0)],
//!     vec![(0, 4.0), (2, 2.0)],
//! ])?;
//! let solution = sparse_lapjv::solve(&graph)?;
//! assert_eq!(solution.cost, 6.0);
//! # Ok(())
//! # }
//! ```
//!
//! The individual phases are public as well, for callers that manage the
//! state arrays themselves: [`column_reduction`], [`reduction_transfer`],
//! [`augmenting_row_reduction`] and [`augment`]. All of them use the
//! problem size `n` as the "unassigned" marker in `x` and `y`.

pub mod core;

#[cfg(feature = "c-bindings")]
pub mod ffi;

pub use crate::core::arr::augmenting_row_reduction;
pub use crate::core::augment::augment;
pub use crate::core::error::{Error, Result};
pub use crate::core::reduction::{column_reduction, reduction_transfer, ColumnReduction};
pub use crate::core::verify::{check_solution, verify, InvariantReport};
pub use crate::core::{
    AssignmentState, Instance, ProgressCallback, Solution, Solver, SolverOptions, SparseCostGraph,
};

/// Solve one instance with the default schedule
pub fn solve(graph: &SparseCostGraph) -> Result<Solution> {
    Solver::new().solve(graph)
}

/// Solve one instance with custom options
pub fn solve_with_options(graph: &SparseCostGraph, options: &SolverOptions) -> Result<Solution> {
    Solver::with_options(options.clone()).solve(graph)
}

/// Solve independent instances in parallel, results in input order
pub fn solve_batch(graphs: &[SparseCostGraph], options: &SolverOptions) -> Vec<Result<Solution>> {
    Solver::with_options(options.clone()).solve_batch(graphs, None)
}

/// Library version, as baked in by the build script
pub fn version() -> &'static str {
    env!("SPARSE_LAPJV_VERSION")
}
