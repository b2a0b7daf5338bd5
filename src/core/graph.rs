//! Sparse cost graph
//!
//! Ragged (CSR-like) storage: row `i` owns the slice
//! `row_start[i]..row_start[i] + row_count[i]` of the flat `columns` /
//! `costs` arrays. Columns inside a slice are strictly ascending and
//! `costs[k]` is the cost of pairing the row with `columns[k]`.
//!
//! The graph is immutable once built. All construction paths go through
//! [`SparseCostGraph::from_parts`], which validates the layout.

use crate::core::error::{Error, Result};
use crate::core::search;

#[derive(Debug, Clone, PartialEq)]
pub struct SparseCostGraph {
    row_start: Vec<usize>,
    row_count: Vec<usize>,
    columns: Vec<usize>,
    costs: Vec<f64>,
}

impl SparseCostGraph {
    /// Build a graph from raw ragged arrays, validating every slice.
    ///
    /// The problem size `n` is `row_start.len()`; column indices must be
    /// below `n`. Costs may be finite or `+inf` (no edge); NaN and `-inf`
    /// are rejected.
    pub fn from_parts(
        row_start: Vec<usize>,
        row_count: Vec<usize>,
        columns: Vec<usize>,
        costs: Vec<f64>,
    ) -> Result<Self> {
        let n = row_start.len();
        if row_count.len() != n {
            return Err(Error::InvalidInput(format!(
                "row_start has {} entries but row_count has {}",
                n,
                row_count.len()
            )));
        }
        if columns.len() != costs.len() {
            return Err(Error::InvalidInput(format!(
                "columns has {} entries but costs has {}",
                columns.len(),
                costs.len()
            )));
        }

        for row in 0..n {
            let start = row_start[row];
            let end = start
                .checked_add(row_count[row])
                .filter(|&end| end <= columns.len())
                .ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "row {row} slice {start}+{} exceeds {} entries",
                        row_count[row],
                        columns.len()
                    ))
                })?;

            let cols = &columns[start..end];
            for (position, &column) in cols.iter().enumerate() {
                if column >= n {
                    return Err(Error::InvalidInput(format!(
                        "row {row} references column {column} but n = {n}"
                    )));
                }
                if position > 0 && cols[position - 1] >= column {
                    return Err(Error::UnsortedRow { row, position });
                }
                let cost = costs[start + position];
                if cost.is_nan() || cost == f64::NEG_INFINITY {
                    return Err(Error::InvalidCost { row, column, cost });
                }
            }
        }

        Ok(Self {
            row_start,
            row_count,
            columns,
            costs,
        })
    }

    /// Build a graph from per-row `(column, cost)` lists.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[(usize, f64)]>,
    {
        let total: usize = rows.iter().map(|r| r.as_ref().len()).sum();
        let mut row_start = Vec::with_capacity(rows.len());
        let mut row_count = Vec::with_capacity(rows.len());
        let mut columns = Vec::with_capacity(total);
        let mut costs = Vec::with_capacity(total);

        for row in rows {
            let entries = row.as_ref();
            row_start.push(columns.len());
            row_count.push(entries.len());
            for &(column, cost) in entries {
                columns.push(column);
                costs.push(cost);
            }
        }

        Self::from_parts(row_start, row_count, columns, costs)
    }

    /// Build a graph from CSR offsets (`offsets.len() == n + 1`).
    pub fn from_csr(offsets: &[usize], columns: Vec<usize>, costs: Vec<f64>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::InvalidInput("offsets must hold n + 1 entries".into()));
        }
        let mut row_count = Vec::with_capacity(offsets.len() - 1);
        for (row, pair) in offsets.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(Error::InvalidInput(format!(
                    "offsets decrease at row {row}"
                )));
            }
            row_count.push(pair[1] - pair[0]);
        }
        let row_start = offsets[..offsets.len() - 1].to_vec();
        Self::from_parts(row_start, row_count, columns, costs)
    }

    /// Build a graph from a dense square matrix, keeping finite entries only.
    pub fn from_dense(matrix: &[Vec<f64>]) -> Result<Self> {
        let n = matrix.len();
        let mut rows = Vec::with_capacity(n);
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n {
                return Err(Error::InvalidInput(format!(
                    "dense row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            let entries: Vec<(usize, f64)> = row
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_finite())
                .map(|(j, &c)| (j, c))
                .collect();
            rows.push(entries);
        }
        Self::from_rows(&rows)
    }

    /// Pad a rectangular `n_rows x n_cols` instance to a square one.
    ///
    /// Dummy rows reach every column and dummy columns are reachable from
    /// every row, all at `pad_cost`. Real pairs keep their cost.
    pub fn padded<R>(n_rows: usize, n_cols: usize, rows: &[R], pad_cost: f64) -> Result<Self>
    where
        R: AsRef<[(usize, f64)]>,
    {
        if rows.len() != n_rows {
            return Err(Error::InvalidInput(format!(
                "expected {n_rows} rows, got {}",
                rows.len()
            )));
        }
        if !pad_cost.is_finite() {
            return Err(Error::InvalidInput(format!(
                "pad cost must be finite, got {pad_cost}"
            )));
        }

        let size = n_rows.max(n_cols);
        let mut padded: Vec<Vec<(usize, f64)>> = Vec::with_capacity(size);
        for (i, row) in rows.iter().enumerate() {
            let mut entries = row.as_ref().to_vec();
            if let Some(&(column, _)) = entries.iter().find(|(c, _)| *c >= n_cols) {
                return Err(Error::InvalidInput(format!(
                    "row {i} references column {column} but n_cols = {n_cols}"
                )));
            }
            entries.extend((n_cols..size).map(|j| (j, pad_cost)));
            padded.push(entries);
        }
        for _ in n_rows..size {
            padded.push((0..size).map(|j| (j, pad_cost)).collect());
        }

        Self::from_rows(&padded)
    }

    /// Problem size: number of rows, which equals the number of columns
    #[inline]
    pub fn n(&self) -> usize {
        self.row_start.len()
    }

    /// Total number of stored pairs
    pub fn num_edges(&self) -> usize {
        self.row_count.iter().sum()
    }

    /// Feasible columns and their costs for `row`
    #[inline(always)]
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let start = self.row_start[row];
        let end = start + self.row_count[row];
        (&self.columns[start..end], &self.costs[start..end])
    }

    #[inline(always)]
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (columns, costs) = self.row(row);
        columns.iter().copied().zip(costs.iter().copied())
    }

    /// Number of feasible columns of `row`
    #[inline]
    pub fn degree(&self, row: usize) -> usize {
        self.row_count[row]
    }

    /// Cost of a pair that is known to be feasible.
    #[inline(always)]
    pub fn cost(&self, row: usize, column: usize) -> Result<f64> {
        let (columns, costs) = self.row(row);
        search::position(columns, column)
            .map(|k| costs[k])
            .ok_or(Error::MissingEdge { row, column })
    }

    /// Cost of a pair, `None` when the pair is not stored.
    pub fn try_cost(&self, row: usize, column: usize) -> Option<f64> {
        let (columns, costs) = self.row(row);
        search::position(columns, column).map(|k| costs[k])
    }

    /// Check that every row and every column has at least one finite cost.
    ///
    /// This is necessary for a perfect matching, not sufficient; the
    /// augmentation phase reports the remaining infeasible cases.
    pub fn check_coverage(&self) -> Result<()> {
        let n = self.n();
        let mut covered = vec![false; n];
        for row in 0..n {
            let mut any = false;
            for (column, cost) in self.row_entries(row) {
                if cost.is_finite() {
                    covered[column] = true;
                    any = true;
                }
            }
            if !any {
                return Err(Error::Infeasible { row });
            }
        }
        match covered.iter().position(|&c| !c) {
            Some(column) => Err(Error::UncoveredColumn { column }),
            None => Ok(()),
        }
    }

    /// Expand to an `n x n` matrix with `+inf` for pairs that are not stored
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let n = self.n();
        let mut dense = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in dense.iter_mut().enumerate() {
            for (j, c) in self.row_entries(i) {
                row[j] = c;
            }
        }
        dense
    }

    pub fn row_start(&self) -> &[usize] {
        &self.row_start
    }

    pub fn row_count(&self) -> &[usize] {
        &self.row_count
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SparseCostGraph {
        SparseCostGraph::from_rows(&[
            vec![(0, 2.0), (1, 1.0)],
            vec![(0, 3.0), (1, 2.0), (2, 1.0)],
            vec![(1, 4.0), (2, 2.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_rows_layout() {
        let g = small();
        assert_eq!(g.n(), 3);
        assert_eq!(g.num_edges(), 7);
        assert_eq!(g.row_start(), &[0, 2, 5]);
        assert_eq!(g.row_count(), &[2, 3, 2]);
        assert_eq!(g.row(1).0, &[0, 1, 2]);
        assert_eq!(g.row(2).1, &[4.0, 2.0]);
    }

    #[test]
    fn test_cost_lookup() {
        let g = small();
        assert_eq!(g.cost(1, 2).unwrap(), 1.0);
        assert_eq!(g.try_cost(0, 2), None);
        assert!(matches!(
            g.cost(2, 0),
            Err(Error::MissingEdge { row: 2, column: 0 })
        ));
    }

    #[test]
    fn test_rejects_unsorted_and_duplicate_columns() {
        let err = SparseCostGraph::from_rows(&[vec![(1, 1.0), (0, 1.0)], vec![(0, 1.0)]]);
        assert!(matches!(err, Err(Error::UnsortedRow { row: 0, position: 1 })));

        let err = SparseCostGraph::from_rows(&[vec![(0, 1.0)], vec![(1, 1.0), (1, 2.0)]]);
        assert!(matches!(err, Err(Error::UnsortedRow { row: 1, position: 1 })));
    }

    #[test]
    fn test_rejects_bad_costs_and_columns() {
        let err = SparseCostGraph::from_rows(&[vec![(0, f64::NAN)]]);
        assert!(matches!(err, Err(Error::InvalidCost { row: 0, column: 0, .. })));

        let err = SparseCostGraph::from_rows(&[vec![(0, f64::NEG_INFINITY)]]);
        assert!(matches!(err, Err(Error::InvalidCost { .. })));

        let err = SparseCostGraph::from_rows(&[vec![(1, 1.0)]]);
        assert!(matches!(err, Err(Error::InvalidInput(_))));

        // +inf is a legal "no edge" marker
        assert!(SparseCostGraph::from_rows(&[vec![(0, f64::INFINITY)]]).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = SparseCostGraph::from_parts(vec![0, 1], vec![1], vec![0, 1], vec![1.0, 1.0]);
        assert!(matches!(err, Err(Error::InvalidInput(_))));

        let err = SparseCostGraph::from_parts(vec![0], vec![1], vec![0], vec![]);
        assert!(matches!(err, Err(Error::InvalidInput(_))));

        let err = SparseCostGraph::from_parts(vec![0, 1], vec![1, 5], vec![0, 1], vec![1.0, 1.0]);
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_csr_matches_from_rows() {
        let g = SparseCostGraph::from_csr(
            &[0, 2, 5, 7],
            vec![0, 1, 0, 1, 2, 1, 2],
            vec![2.0, 1.0, 3.0, 2.0, 1.0, 4.0, 2.0],
        )
        .unwrap();
        assert_eq!(g, small());
    }

    #[test]
    fn test_dense_round_trip() {
        let g = small();
        let dense = g.to_dense();
        assert!(dense[0][2].is_infinite());
        assert_eq!(dense[1][0], 3.0);
        assert_eq!(SparseCostGraph::from_dense(&dense).unwrap(), g);
    }

    #[test]
    fn test_coverage() {
        assert!(small().check_coverage().is_ok());

        let g = SparseCostGraph::from_rows(&[vec![(0, 1.0)], vec![(0, 2.0)]]).unwrap();
        assert!(matches!(
            g.check_coverage(),
            Err(Error::UncoveredColumn { column: 1 })
        ));

        let g = SparseCostGraph::from_rows(&[vec![(0, 1.0), (1, 1.0)], vec![(1, f64::INFINITY)]])
            .unwrap();
        assert!(matches!(g.check_coverage(), Err(Error::Infeasible { row: 1 })));
    }

    #[test]
    fn test_padded_rectangular() {
        // 2 rows, 3 columns -> one dummy row reaching every column
        let g = SparseCostGraph::padded(2, 3, &[vec![(0, 1.0)], vec![(1, 2.0), (2, 3.0)]], 0.0)
            .unwrap();
        assert_eq!(g.n(), 3);
        assert_eq!(g.row(2).0, &[0, 1, 2]);
        assert_eq!(g.row(0).0, &[0]);

        // 3 rows, 2 columns -> one dummy column appended to every row
        let g = SparseCostGraph::padded(
            3,
            2,
            &[vec![(0, 1.0)], vec![(1, 2.0)], vec![(0, 5.0), (1, 6.0)]],
            9.0,
        )
        .unwrap();
        assert_eq!(g.row(0).0, &[0, 2]);
        assert_eq!(g.cost(2, 2).unwrap(), 9.0);
    }
}
