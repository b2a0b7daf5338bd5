//! Augmenting row reduction
//!
//! Cheap local search that settles most free rows without a full
//! shortest-path search. Each free row grabs the column with the smallest
//! reduced cost `cost(i, j) - v[j]`; when that column is strictly better
//! than the row's second choice its price drops by the gap, and whoever
//! held it gets another immediate attempt. Rows that cannot be settled
//! this way are returned for augmentation.
//!
//! Invariant kept for every assigned row: its column has the smallest
//! reduced cost in the row. Lowering `v[j1]` only raises `j1`'s reduced
//! cost for other rows, so their choices stay minimal.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;

/// Best and second-best reduced cost of a row
#[derive(Debug, Clone, Copy)]
struct RowMinima {
    j1: usize,
    u1: f64,
    j2: Option<usize>,
    u2: f64,
}

/// Scan a row in column order. A column tied with the current best goes
/// to second place, so the first column reaching the minimum wins.
#[inline(always)]
fn row_minima(graph: &SparseCostGraph, v: &[f64], row: usize) -> Option<RowMinima> {
    let mut j1 = None;
    let mut u1 = f64::INFINITY;
    let mut j2 = None;
    let mut u2 = f64::INFINITY;

    for (j, c) in graph.row_entries(row) {
        let reduced = c - v[j];
        if reduced < u2 {
            if reduced >= u1 {
                u2 = reduced;
                j2 = Some(j);
            } else {
                u2 = u1;
                j2 = j1;
                u1 = reduced;
                j1 = Some(j);
            }
        }
    }

    j1.map(|j1| RowMinima { j1, u1, j2, u2 })
}

/// Run one augmenting row reduction pass over `free_rows`.
///
/// Rows are taken from the front of a queue; a row that loses its column
/// after a strict price drop goes back to the front. A row displaced on a
/// tie goes to the returned free list. After `current * n` iterations
/// (rows consumed times problem size) prices stop moving and every
/// displaced row goes to the free list, which bounds the pass.
pub fn augmenting_row_reduction(
    graph: &SparseCostGraph,
    state: &mut AssignmentState,
    free_rows: &[usize],
) -> Result<Vec<usize>> {
    let n = graph.n();
    if state.n() != n {
        return Err(Error::InvalidInput(format!(
            "state has size {} but graph has size {n}",
            state.n()
        )));
    }

    let total = free_rows.len();
    let mut queue: VecDeque<usize> = free_rows.iter().copied().collect();
    let mut still_free = Vec::new();
    let mut iterations = 0usize;
    let mut capped = false;

    while let Some(i) = queue.pop_front() {
        if i >= n {
            return Err(Error::InvalidInput(format!("free row {i} out of range")));
        }
        if let Some(j) = state.column_of(i) {
            return Err(Error::InvalidInput(format!(
                "row {i} is listed as free but holds column {j}"
            )));
        }

        iterations += 1;
        let current = total - queue.len();

        let RowMinima { j1, u1, j2, u2 } =
            row_minima(graph, &state.v, i).ok_or(Error::Infeasible { row: i })?;
        if !u1.is_finite() {
            return Err(Error::Infeasible { row: i });
        }

        let mut column = j1;
        let mut previous = state.row_of(j1);
        let lowered = if u2.is_finite() {
            let v_new = state.v[j1] - (u2 - u1);
            (v_new < state.v[j1]).then_some(v_new)
        } else {
            None
        };

        if iterations < current * n {
            match (lowered, j2) {
                (Some(v_new), _) => state.v[j1] = v_new,
                (None, Some(j2)) if previous.is_some() => {
                    column = j2;
                    previous = state.row_of(j2);
                }
                _ => {}
            }
            if let Some(i0) = previous {
                state.release_row(i0);
                if lowered.is_some() {
                    queue.push_front(i0);
                } else {
                    still_free.push(i0);
                }
            }
        } else {
            if !capped {
                warn!("augmenting row reduction: iteration cap reached after {iterations} rows");
                capped = true;
            }
            if let Some(i0) = previous {
                state.release_row(i0);
                still_free.push(i0);
            }
        }

        trace!("arr: row {i} -> column {column} (u1={u1}, u2={u2}, displaced={previous:?})");
        state.assign(i, column);
    }

    debug!(
        "augmenting row reduction: {} rows in, {} iterations, {} left for augmentation",
        total,
        iterations,
        still_free.len()
    );
    Ok(still_free)
}
