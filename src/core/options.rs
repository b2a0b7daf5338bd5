//! Solver configuration

/// Options for the full solve pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Number of augmenting row reduction passes before augmentation
    pub arr_passes: usize,

    /// Seed the state with column reduction and reduction transfer
    pub column_reduction: bool,

    /// Check slackness, consistency and perfection on the final state
    pub verify: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            arr_passes: 2,
            column_reduction: true,
            verify: false,
        }
    }
}
