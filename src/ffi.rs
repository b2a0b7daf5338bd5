//! C-compatible Foreign Function Interface (FFI) for sparse-lapjv
//!
//! Raw-array entry points for callers that own their buffers, typically
//! C, C++ or Python through ctypes/cffi.
//!
//! # Graph layout
//!
//! Row `i` owns `columns[row_start[i] .. row_start[i] + row_count[i]]`
//! (strictly ascending) and the matching slice of `costs`. The flat
//! arrays must be at least as long as the furthest row slice.
//!
//! # State arrays
//!
//! `x`, `y`, `u` and `v` hold `n` entries each. `n` marks an unassigned
//! row in `x` and an unassigned column in `y`. The arrays are read, the
//! phase runs on owned copies, and the results are written back only on
//! success.
//!
//! # Error Handling
//!
//! All functions return a LapResult code:
//! - 0: Success
//! - 1: Invalid parameter (null pointer, malformed graph or state)
//! - 2: Infeasible (no perfect matching)
//! - 3: Unknown error

use std::ffi::CString;
use std::os::raw::c_char;
use std::slice;
use std::sync::OnceLock;

use libc::{c_double, size_t};

use crate::core::error::Error;
use crate::core::graph::SparseCostGraph;
use crate::core::state::AssignmentState;
use crate::core::Solver;

/// Result codes for C FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapResult {
    Success = 0,
    InvalidParameter = 1,
    Infeasible = 2,
    UnknownError = 3,
}

/// Convert Rust Result to C result code
fn convert_error(result: crate::Result<()>) -> LapResult {
    match result {
        Ok(()) => LapResult::Success,
        Err(Error::InvalidInput(_))
        | Err(Error::UnsortedRow { .. })
        | Err(Error::InvalidCost { .. })
        | Err(Error::MissingEdge { .. }) => LapResult::InvalidParameter,
        Err(Error::Infeasible { .. })
        | Err(Error::UncoveredColumn { .. })
        | Err(Error::Unassigned { .. }) => LapResult::Infeasible,
        Err(_) => LapResult::UnknownError,
    }
}

fn null_pointer(name: &str) -> Error {
    Error::InvalidInput(format!("{name} is a null pointer"))
}

/// Borrow `len` elements; a null pointer is only accepted for `len == 0`
unsafe fn borrow<'a, T>(ptr: *const T, len: usize, name: &str) -> crate::Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(null_pointer(name));
    }
    Ok(slice::from_raw_parts(ptr, len))
}

unsafe fn borrow_mut<'a, T>(ptr: *mut T, len: usize, name: &str) -> crate::Result<&'a mut [T]> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(null_pointer(name));
    }
    Ok(slice::from_raw_parts_mut(ptr, len))
}

/// Copy the caller's graph into an owned, validated one
unsafe fn read_graph(
    n: size_t,
    row_start: *const size_t,
    row_count: *const size_t,
    columns: *const size_t,
    costs: *const c_double,
) -> crate::Result<SparseCostGraph> {
    let row_start = borrow(row_start, n, "row_start")?;
    let row_count = borrow(row_count, n, "row_count")?;

    let mut len = 0usize;
    for (i, (&start, &count)) in row_start.iter().zip(row_count).enumerate() {
        let end = start
            .checked_add(count)
            .ok_or_else(|| Error::InvalidInput(format!("row {i} slice overflows")))?;
        len = len.max(end);
    }

    let columns = borrow(columns, len, "columns")?;
    let costs = borrow(costs, len, "costs")?;
    SparseCostGraph::from_parts(
        row_start.to_vec(),
        row_count.to_vec(),
        columns.to_vec(),
        costs.to_vec(),
    )
}

/// Solve a sparse instance from scratch
///
/// # Parameters
/// - `n`: Problem size (rows = columns)
/// - `row_start`, `row_count`, `columns`, `costs`: Sparse graph, see module docs
/// - `x`, `y`, `u`, `v`: Output arrays of `n` entries
///
/// # Returns
/// LapResult code
#[no_mangle]
pub extern "C" fn lapjv_sparse_solve(
    n: size_t,
    row_start: *const size_t,
    row_count: *const size_t,
    columns: *const size_t,
    costs: *const c_double,
    x: *mut size_t,
    y: *mut size_t,
    u: *mut c_double,
    v: *mut c_double,
) -> LapResult {
    let result = (|| -> crate::Result<()> {
        unsafe {
            let graph = read_graph(n, row_start, row_count, columns, costs)?;
            let x = borrow_mut(x, n, "x")?;
            let y = borrow_mut(y, n, "y")?;
            let u = borrow_mut(u, n, "u")?;
            let v = borrow_mut(v, n, "v")?;

            let solution = Solver::new().solve(&graph)?;
            x.copy_from_slice(&solution.x);
            y.copy_from_slice(&solution.y);
            u.copy_from_slice(&solution.u);
            v.copy_from_slice(&solution.v);
            Ok(())
        }
    })();

    convert_error(result)
}

/// Run reduction transfer over `rows`, updating `u` and `v` in place
///
/// # Parameters
/// - `rows`/`n_rows`: Rows that already hold a tentative column in `x`
/// - `x`: Row assignment (read only)
/// - `u`, `v`: Duals, updated in place
///
/// # Returns
/// LapResult code
#[no_mangle]
pub extern "C" fn lapjv_sparse_reduction_transfer(
    n: size_t,
    row_start: *const size_t,
    row_count: *const size_t,
    columns: *const size_t,
    costs: *const c_double,
    rows: *const size_t,
    n_rows: size_t,
    x: *const size_t,
    u: *mut c_double,
    v: *mut c_double,
) -> LapResult {
    let result = (|| -> crate::Result<()> {
        unsafe {
            let graph = read_graph(n, row_start, row_count, columns, costs)?;
            let rows = borrow(rows, n_rows, "rows")?;
            let x = borrow(x, n, "x")?;
            let u = borrow_mut(u, n, "u")?;
            let v = borrow_mut(v, n, "v")?;

            let mut y = vec![n; n];
            for (i, &j) in x.iter().enumerate() {
                if j > n {
                    return Err(Error::InvalidInput(format!("x[{i}] = {j} is out of range")));
                }
                if j < n {
                    if y[j] != n {
                        return Err(Error::InvalidInput(format!(
                            "column {j} is held by rows {} and {i}",
                            y[j]
                        )));
                    }
                    y[j] = i;
                }
            }
            if let Some(&i) = rows.iter().find(|&&i| i >= n) {
                return Err(Error::InvalidInput(format!("row {i} out of range")));
            }

            let mut state = AssignmentState::from_parts(x.to_vec(), y, u.to_vec(), v.to_vec())?;
            crate::reduction_transfer(&graph, &mut state, rows)?;
            u.copy_from_slice(&state.u);
            v.copy_from_slice(&state.v);
            Ok(())
        }
    })();

    convert_error(result)
}

/// Run one augmenting row reduction pass
///
/// # Parameters
/// - `free_rows`/`n_free`: Unassigned rows to process; overwritten with
///   the rows still free afterwards
/// - `x`, `y`, `v`: Assignment and column duals, updated in place
/// - `out_n_free`: Receives the number of rows written back to `free_rows`
///
/// # Returns
/// LapResult code
#[no_mangle]
pub extern "C" fn lapjv_sparse_augmenting_row_reduction(
    n: size_t,
    row_start: *const size_t,
    row_count: *const size_t,
    columns: *const size_t,
    costs: *const c_double,
    free_rows: *mut size_t,
    n_free: size_t,
    x: *mut size_t,
    y: *mut size_t,
    v: *mut c_double,
    out_n_free: *mut size_t,
) -> LapResult {
    if out_n_free.is_null() {
        return LapResult::InvalidParameter;
    }

    let result = (|| -> crate::Result<()> {
        unsafe {
            let graph = read_graph(n, row_start, row_count, columns, costs)?;
            let free_rows = borrow_mut(free_rows, n_free, "free_rows")?;
            let x = borrow_mut(x, n, "x")?;
            let y = borrow_mut(y, n, "y")?;
            let v = borrow_mut(v, n, "v")?;

            let mut state =
                AssignmentState::from_parts(x.to_vec(), y.to_vec(), vec![0.0; n], v.to_vec())?;
            let still_free = crate::augmenting_row_reduction(&graph, &mut state, free_rows)?;
            if still_free.len() > free_rows.len() {
                return Err(Error::InvalidInput(format!(
                    "{} rows left free but the buffer holds {}",
                    still_free.len(),
                    free_rows.len()
                )));
            }

            free_rows[..still_free.len()].copy_from_slice(&still_free);
            x.copy_from_slice(&state.x);
            y.copy_from_slice(&state.y);
            v.copy_from_slice(&state.v);
            *out_n_free = still_free.len();
            Ok(())
        }
    })();

    convert_error(result)
}

/// Augment every row of `free_rows` and recompute `u` for all rows
///
/// # Parameters
/// - `free_rows`/`n_free`: Rows left free by augmenting row reduction
/// - `x`, `y`, `u`, `v`: State arrays, updated in place
///
/// # Returns
/// LapResult code; on success `x`/`y` hold a perfect matching
#[no_mangle]
pub extern "C" fn lapjv_sparse_augment(
    n: size_t,
    row_start: *const size_t,
    row_count: *const size_t,
    columns: *const size_t,
    costs: *const c_double,
    free_rows: *const size_t,
    n_free: size_t,
    x: *mut size_t,
    y: *mut size_t,
    u: *mut c_double,
    v: *mut c_double,
) -> LapResult {
    let result = (|| -> crate::Result<()> {
        unsafe {
            let graph = read_graph(n, row_start, row_count, columns, costs)?;
            let free_rows = borrow(free_rows, n_free, "free_rows")?;
            let x = borrow_mut(x, n, "x")?;
            let y = borrow_mut(y, n, "y")?;
            let u = borrow_mut(u, n, "u")?;
            let v = borrow_mut(v, n, "v")?;

            let mut state =
                AssignmentState::from_parts(x.to_vec(), y.to_vec(), u.to_vec(), v.to_vec())?;
            crate::augment(&graph, &mut state, free_rows)?;
            x.copy_from_slice(&state.x);
            y.copy_from_slice(&state.y);
            u.copy_from_slice(&state.u);
            v.copy_from_slice(&state.v);
            Ok(())
        }
    })();

    convert_error(result)
}

/// Get library version string
///
/// # Returns
/// Static string with version information (does not need to be freed)
#[no_mangle]
pub extern "C" fn lapjv_sparse_version() -> *const c_char {
    static VERSION_STRING: OnceLock<CString> = OnceLock::new();

    VERSION_STRING
        .get_or_init(|| {
            CString::new(format!("sparse-lapjv {}", env!("SPARSE_LAPJV_VERSION")))
                .unwrap_or_default()
        })
        .as_ptr()
}
