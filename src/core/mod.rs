//! Core library modules for sparse-lapjv
//!
//! The kernel phases live in `reduction`, `arr` and `augment`; `solver`
//! chains them. Everything else is data layout, validation and I/O.

pub mod arr;
pub mod augment;
pub mod error;
pub mod graph;
pub mod instance;
pub mod options;
pub mod reduction;
pub mod search;
pub mod solver;
pub mod state;
pub mod verify;

// Re-export main types for internal use
pub use graph::SparseCostGraph;
pub use instance::{Instance, Solution};
pub use options::SolverOptions;
pub use solver::{ProgressCallback, Solver};
pub use state::AssignmentState;
