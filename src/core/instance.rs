//! JSON instance and solution documents
//!
//! An instance lists the feasible `(column, cost)` pairs of every row:
//!
//! ```json
//! {"n": 3, "rows": [[[0, 2.0], [1, 1.0]], [[1, 2.0], [2, 1.0]], [[0, 4.0], [2, 2.0]]]}
//! ```
//!
//! JSON has no infinity, so infeasible pairs are simply left out. A batch
//! is JSON Lines: one instance document per line, blank lines ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;

/// One sparse assignment instance as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub n: usize,
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl Instance {
    /// Validate and convert to the kernel's graph layout
    pub fn to_graph(&self) -> Result<SparseCostGraph> {
        if self.rows.len() != self.n {
            return Err(Error::InvalidInput(format!(
                "instance declares n = {} but lists {} rows",
                self.n,
                self.rows.len()
            )));
        }
        SparseCostGraph::from_rows(&self.rows)
    }

    /// Finite pairs of `graph`; `+inf` entries are dropped
    pub fn from_graph(graph: &SparseCostGraph) -> Self {
        let rows = (0..graph.n())
            .map(|i| graph.row_entries(i).filter(|(_, c)| c.is_finite()).collect())
            .collect();
        Self { n: graph.n(), rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Optimal assignment with its duals
///
/// `n` is the problem size and the unassigned marker in `x` and `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub n: usize,
    pub cost: f64,
    pub x: Vec<usize>,
    pub y: Vec<usize>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl Solution {
    /// Package a finished state, summing the assigned costs
    pub fn from_state(graph: &SparseCostGraph, state: AssignmentState) -> Result<Self> {
        let cost = state.total_cost(graph)?;
        let AssignmentState { x, y, u, v } = state;
        Ok(Self {
            n: graph.n(),
            cost,
            x,
            y,
            u,
            v,
        })
    }

    /// Rebuild the state arrays, checking they describe one matching
    pub fn to_state(&self) -> Result<AssignmentState> {
        if self.x.len() != self.n {
            return Err(Error::InvalidInput(format!(
                "solution declares n = {} but x has {} entries",
                self.n,
                self.x.len()
            )));
        }
        AssignmentState::from_parts(
            self.x.clone(),
            self.y.clone(),
            self.u.clone(),
            self.v.clone(),
        )
    }

    /// `(row, column)` pairs of the matching
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n;
        self.x
            .iter()
            .enumerate()
            .filter(move |&(_, &j)| j != n)
            .map(|(i, &j)| (i, j))
    }
}

/// Read one JSON instance from `path`
pub fn read_instance<P: AsRef<Path>>(path: P) -> Result<Instance> {
    let file = File::open(path)?;
    Instance::from_reader(BufReader::new(file))
}

/// Read one JSON solution from `path`
pub fn read_solution<P: AsRef<Path>>(path: P) -> Result<Solution> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Parse a JSON Lines batch, skipping blank lines
pub fn read_batch<R: BufRead>(reader: R) -> Result<Vec<Instance>> {
    let mut instances = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        instances.push(serde_json::from_str(&line)?);
    }
    Ok(instances)
}

pub fn read_batch_file<P: AsRef<Path>>(path: P) -> Result<Vec<Instance>> {
    let file = File::open(path)?;
    read_batch(BufReader::new(file))
}

/// Write `value` as one pretty JSON document followed by a newline
pub fn write_json<W: Write, T: Serialize>(writer: W, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write every value as one compact JSON line
pub fn write_jsonl<W: Write, T: Serialize>(writer: W, values: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for value in values {
        serde_json::to_writer(&mut writer, value)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
