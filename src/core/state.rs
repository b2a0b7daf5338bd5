//! Dual variables and assignment arrays
//!
//! `x[i]` is the column assigned to row `i` and `y[j]` the row assigned to
//! column `j`. The problem size `n` doubles as the "unassigned" marker in
//! both arrays, which keeps the layout identical to what raw-array callers
//! pass through the C ABI.

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentState {
    /// Row -> column, `n` when the row is free
    pub x: Vec<usize>,
    /// Column -> row, `n` when the column is free
    pub y: Vec<usize>,
    /// Row duals
    pub u: Vec<f64>,
    /// Column duals
    pub v: Vec<f64>,
}

impl AssignmentState {
    /// Cold start: zero duals, nothing assigned
    pub fn new(n: usize) -> Self {
        Self {
            x: vec![n; n],
            y: vec![n; n],
            u: vec![0.0; n],
            v: vec![0.0; n],
        }
    }

    /// Continue from caller-provided arrays, checking lengths and that
    /// `x` and `y` describe the same partial matching.
    pub fn from_parts(x: Vec<usize>, y: Vec<usize>, u: Vec<f64>, v: Vec<f64>) -> Result<Self> {
        let n = x.len();
        if y.len() != n || u.len() != n || v.len() != n {
            return Err(Error::InvalidInput(format!(
                "state arrays differ in length: x={}, y={}, u={}, v={}",
                n,
                y.len(),
                u.len(),
                v.len()
            )));
        }
        let state = Self { x, y, u, v };
        state.check_consistency()?;
        if let Some(i) = state.u.iter().position(|d| !d.is_finite()) {
            return Err(Error::InvalidInput(format!("u[{i}] is not finite")));
        }
        if let Some(j) = state.v.iter().position(|d| !d.is_finite()) {
            return Err(Error::InvalidInput(format!("v[{j}] is not finite")));
        }
        Ok(state)
    }

    /// Problem size, which is also the unassigned sentinel
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.x.len()
    }

    #[inline(always)]
    pub fn sentinel(&self) -> usize {
        self.x.len()
    }

    /// Column currently held by `row`
    #[inline(always)]
    pub fn column_of(&self, row: usize) -> Option<usize> {
        let j = self.x[row];
        (j != self.sentinel()).then_some(j)
    }

    /// Row currently holding `column`
    #[inline(always)]
    pub fn row_of(&self, column: usize) -> Option<usize> {
        let i = self.y[column];
        (i != self.sentinel()).then_some(i)
    }

    /// Pair `row` with `column`, overwriting both sides
    #[inline(always)]
    pub fn assign(&mut self, row: usize, column: usize) {
        self.x[row] = column;
        self.y[column] = row;
    }

    /// Mark `row` free without touching the column it held
    #[inline(always)]
    pub fn release_row(&mut self, row: usize) {
        self.x[row] = self.sentinel();
    }

    pub fn free_rows(&self) -> Vec<usize> {
        (0..self.n()).filter(|&i| self.x[i] == self.sentinel()).collect()
    }

    pub fn assigned_rows(&self) -> Vec<usize> {
        (0..self.n()).filter(|&i| self.x[i] != self.sentinel()).collect()
    }

    /// True once every row and column is assigned
    pub fn is_perfect(&self) -> bool {
        let n = self.sentinel();
        self.x.iter().all(|&j| j != n) && self.y.iter().all(|&i| i != n)
    }

    /// `x[i] = j => y[j] = i` and `y[j] = i => x[i] = j` for real indices
    pub fn check_consistency(&self) -> Result<()> {
        let n = self.sentinel();
        for (i, &j) in self.x.iter().enumerate() {
            if j > n {
                return Err(Error::InvalidInput(format!("x[{i}] = {j} is out of range")));
            }
            if j != n && self.y[j] != i {
                return Err(Error::InvalidInput(format!(
                    "x[{i}] = {j} but y[{j}] = {}",
                    self.y[j]
                )));
            }
        }
        for (j, &i) in self.y.iter().enumerate() {
            if i > n {
                return Err(Error::InvalidInput(format!("y[{j}] = {i} is out of range")));
            }
            if i != n && self.x[i] != j {
                return Err(Error::InvalidInput(format!(
                    "y[{j}] = {i} but x[{i}] = {}",
                    self.x[i]
                )));
            }
        }
        Ok(())
    }

    /// Sum of `cost(i, x[i])` over assigned rows
    pub fn total_cost(&self, graph: &SparseCostGraph) -> Result<f64> {
        let mut total = 0.0;
        for (i, &j) in self.x.iter().enumerate() {
            if j != self.sentinel() {
                total += graph.cost(i, j)?;
            }
        }
        Ok(total)
    }
}
