//! Post-solve invariant checks
//!
//! A finished solve must satisfy:
//! - `x` and `y` describe the same matching
//! - the matching is perfect
//! - every assigned pair is tight: `u[i] + v[j] == cost(i, j)`
//! - every feasible pair is dual feasible: `u[i] + v[j] <= cost(i, j)`
//!
//! Floating point comparisons use a tolerance relative to the cost.

use log::debug;

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;

/// Absolute slack allowed per unit of cost magnitude
const SLACK_TOLERANCE: f64 = 1e-9;

/// Only the first few violations of one kind are listed
const MAX_REPORTED: usize = 5;

#[inline(always)]
fn tolerance(cost: f64) -> f64 {
    SLACK_TOLERANCE * cost.abs().max(1.0)
}

/// Invariant check results
#[derive(Debug, Default)]
pub struct InvariantReport {
    pub passed: bool,
    pub checks_run: usize,
    pub checks_passed: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl InvariantReport {
    fn new() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    fn fail(&mut self, msg: String) {
        self.passed = false;
        self.errors.push(msg);
    }

    fn warn(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn check_passed(&mut self) {
        self.checks_run += 1;
        self.checks_passed += 1;
    }

    fn check_failed(&mut self, msg: String) {
        self.checks_run += 1;
        self.fail(msg);
    }

    fn record(&mut self, violations: Vec<String>, total: usize, what: &str) {
        if total == 0 {
            self.check_passed();
            return;
        }
        self.check_failed(format!("{total} {what}"));
        for msg in violations {
            self.fail(msg);
        }
        if total > MAX_REPORTED {
            self.warn(format!("{} further {what} not listed", total - MAX_REPORTED));
        }
    }
}

/// Run every check against a finished `state`
pub fn check_solution(graph: &SparseCostGraph, state: &AssignmentState) -> InvariantReport {
    let mut report = InvariantReport::new();
    let n = graph.n();

    if state.n() != n || state.y.len() != n || state.u.len() != n || state.v.len() != n {
        report.check_failed(format!(
            "state arrays do not match graph size {n} (x={}, y={}, u={}, v={})",
            state.x.len(),
            state.y.len(),
            state.u.len(),
            state.v.len()
        ));
        return report;
    }

    // 1. Matching consistency
    match state.check_consistency() {
        Ok(()) => report.check_passed(),
        Err(e) => {
            report.check_failed(e.to_string());
            return report;
        }
    }

    // 2. Perfection
    let free = state.free_rows();
    if free.is_empty() {
        report.check_passed();
    } else {
        report.check_failed(format!("{} rows unassigned, first is row {}", free.len(), free[0]));
    }

    // 3. Finite duals
    let non_finite = state
        .u
        .iter()
        .chain(state.v.iter())
        .filter(|d| !d.is_finite())
        .count();
    if non_finite == 0 {
        report.check_passed();
    } else {
        report.check_failed(format!("{non_finite} dual values are not finite"));
    }

    // 4. Assigned pairs are tight
    let mut listed = Vec::new();
    let mut total = 0usize;
    for i in 0..n {
        let Some(j) = state.column_of(i) else {
            continue;
        };
        match graph.try_cost(i, j) {
            Some(c) => {
                let gap = state.u[i] + state.v[j] - c;
                if !(gap.abs() <= tolerance(c)) {
                    total += 1;
                    if listed.len() < MAX_REPORTED {
                        listed.push(format!(
                            "pair ({i}, {j}) is not tight: u + v - cost = {gap:e}"
                        ));
                    }
                }
            }
            None => {
                total += 1;
                if listed.len() < MAX_REPORTED {
                    listed.push(format!("row {i} holds column {j}, which is not feasible"));
                }
            }
        }
    }
    report.record(listed, total, "assigned pairs violate complementary slackness");

    // 5. Dual feasibility on every edge
    let mut listed = Vec::new();
    let mut total = 0usize;
    for i in 0..n {
        for (j, c) in graph.row_entries(i) {
            if !c.is_finite() {
                continue;
            }
            let excess = state.u[i] + state.v[j] - c;
            if excess > tolerance(c) {
                total += 1;
                if listed.len() < MAX_REPORTED {
                    listed.push(format!(
                        "pair ({i}, {j}) has negative reduced cost {:e}",
                        -excess
                    ));
                }
            }
        }
    }
    report.record(listed, total, "edges violate dual feasibility");

    debug!(
        "verify: {}/{} checks passed, {} errors, {} warnings",
        report.checks_passed,
        report.checks_run,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

/// Fail with [`Error::InvariantViolation`] describing the first problem found
pub fn verify(graph: &SparseCostGraph, state: &AssignmentState) -> Result<()> {
    let report = check_solution(graph, state);
    if report.passed {
        return Ok(());
    }
    let first = report
        .errors
        .into_iter()
        .next()
        .unwrap_or_else(|| "unknown violation".to_string());
    Err(Error::InvariantViolation(first))
}
