//! Error types for the sparse-lapjv kernel
//!
//! Every phase validates what it touches and reports problems through a
//! single error enum. After any error the caller must discard the state
//! arrays: partially updated duals and assignments are not meaningful.

use thiserror::Error;

/// Main error type for sparse-lapjv operations
#[derive(Debug, Error)]
pub enum Error {
    /// Mismatched array lengths, out-of-range indices, inconsistent state
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A row's column list is not strictly ascending
    #[error("Row {row} is not strictly ascending at position {position}")]
    UnsortedRow { row: usize, position: usize },

    /// NaN or negative infinity where a cost was expected
    #[error("Invalid cost {cost} for pair ({row}, {column})")]
    InvalidCost { row: usize, column: usize, cost: f64 },

    /// A column that must be in a row's feasible list is not there
    #[error("Column {column} is not a feasible column of row {row}")]
    MissingEdge { row: usize, column: usize },

    /// No augmenting path exists for this row: the instance has no perfect matching
    #[error("Instance is infeasible: no augmenting path from row {row}")]
    Infeasible { row: usize },

    /// A column no row can reach through a finite cost
    #[error("Instance is infeasible: column {column} has no finite cost")]
    UncoveredColumn { column: usize },

    /// A row is still unassigned after augmentation
    #[error("Row {row} is unassigned after augmentation")]
    Unassigned { row: usize },

    /// Post-solve verification found a violated invariant
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed instance or solution document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for sparse-lapjv operations
pub type Result<T> = std::result::Result<T, Error>;
