//! Column reduction and reduction transfer
//!
//! Column reduction gives every column the cheapest row that reaches it
//! and sets `v[j]` to that cost. Reduction transfer then moves slack from
//! the column dual to the row dual for rows that ended up with exactly one
//! column, so the row's other columns become competitive in the next phase.

use log::{debug, trace};

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;

/// Rows produced by column reduction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnReduction {
    /// Rows that received no column
    pub free_rows: Vec<usize>,
    /// Rows that received exactly one column; input to reduction transfer
    pub transfer_rows: Vec<usize>,
}

/// Reset `state` and seed it from column minima.
///
/// Ties on a column go to the lowest row index. Columns are then handed
/// out from the highest index down; a row that is the cheapest for
/// several columns keeps the highest one and the others stay free.
pub fn column_reduction(
    graph: &SparseCostGraph,
    state: &mut AssignmentState,
) -> Result<ColumnReduction> {
    let n = graph.n();
    if state.n() != n {
        return Err(Error::InvalidInput(format!(
            "state has size {} but graph has size {n}",
            state.n()
        )));
    }

    *state = AssignmentState::new(n);
    state.v.fill(f64::INFINITY);

    let mut candidate = vec![n; n];
    for i in 0..n {
        for (j, c) in graph.row_entries(i) {
            if c < state.v[j] {
                state.v[j] = c;
                candidate[j] = i;
            }
        }
    }
    if let Some(column) = state.v.iter().position(|v| !v.is_finite()) {
        return Err(Error::UncoveredColumn { column });
    }

    let mut unique = vec![true; n];
    for j in (0..n).rev() {
        let i = candidate[j];
        if state.column_of(i).is_none() {
            state.assign(i, j);
        } else {
            unique[i] = false;
        }
    }

    let mut result = ColumnReduction::default();
    for i in 0..n {
        if state.column_of(i).is_none() {
            result.free_rows.push(i);
        } else if unique[i] {
            result.transfer_rows.push(i);
        }
    }

    debug!(
        "column reduction: {} assigned, {} free, {} eligible for transfer",
        n - result.free_rows.len(),
        result.free_rows.len(),
        result.transfer_rows.len()
    );
    Ok(result)
}

/// Tighten duals for rows that already hold a tentative column.
///
/// For row `i` holding `j1`, with `umin` the smallest `cost(i, j) - v[j]`
/// over its other feasible columns: `v[j1] -= umin - u[i]` and
/// `u[i] = umin`. The assignment itself is left alone. A row without any
/// other finite column is skipped.
pub fn reduction_transfer(
    graph: &SparseCostGraph,
    state: &mut AssignmentState,
    rows: &[usize],
) -> Result<()> {
    let mut skipped = 0usize;
    for &i in rows {
        let j1 = state.column_of(i).ok_or_else(|| {
            Error::InvalidInput(format!("row {i} has no tentative column to transfer from"))
        })?;

        let mut umin = f64::INFINITY;
        for (j, c) in graph.row_entries(i) {
            if j == j1 {
                continue;
            }
            let reduced = c - state.v[j];
            if reduced < umin {
                umin = reduced;
            }
        }

        if !umin.is_finite() {
            trace!("reduction transfer: row {i} has no alternative to column {j1}");
            skipped += 1;
            continue;
        }

        state.v[j1] -= umin - state.u[i];
        state.u[i] = umin;
    }

    debug!(
        "reduction transfer: {} rows, {} without alternatives",
        rows.len(),
        skipped
    );
    Ok(())
}
