//! Column lookup inside a row's sorted feasible-column slice

/// Position of `target` inside an ascending column slice.
///
/// Returns `None` when the column is not feasible for the row. Callers in
/// the kernel only look up columns they know to be present; they turn a
/// `None` into [`crate::Error::MissingEdge`] instead of trusting an index.
#[inline(always)]
pub fn position(columns: &[usize], target: usize) -> Option<usize> {
    let k = columns.partition_point(|&c| c < target);
    if k < columns.len() && columns[k] == target {
        Some(k)
    } else {
        None
    }
}
