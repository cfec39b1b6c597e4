use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// One equation of a tridiagonal system:
/// `sub * x[i-1] + diag * x[i] + sup * x[i+1] = d[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriRow {
    pub sub: f64,
    pub diag: f64,
    pub sup: f64,
}

impl TriRow {
    pub const fn new(sub: f64, diag: f64, sup: f64) -> Self {
        Self { sub, diag, sup }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Tridiagonal system has no rows")]
    Empty,
    #[error("Row count {rows} does not match right-hand side length {rhs}")]
    SizeMismatch { rows: usize, rhs: usize },
    #[error("First row sub-diagonal and last row super-diagonal must be zero")]
    MalformedBoundary,
    #[error("Leading diagonal entry is zero")]
    ZeroLeadingDiagonal,
    #[error("Zero pivot at row {row}: system is singular")]
    Singular { row: usize },
}

/// Solve the tridiagonal system `m . x = d` with the Thomas algorithm.
///
/// Runs in O(n) time with O(n) scratch space. The input is checked before
/// elimination starts and a zero pivot aborts the solve; nothing is retried
/// because a singular system is a property of the input data.
pub fn solve_tridiagonal(rows: &[TriRow], rhs: &[f64]) -> Result<Vec<f64>, SolverError> {
    let n = rows.len();
    if n != rhs.len() {
        return Err(SolverError::SizeMismatch {
            rows: n,
            rhs: rhs.len(),
        });
    }
    if n == 0 {
        return Err(SolverError::Empty);
    }
    if rows[0].sub != 0.0 || rows[n - 1].sup != 0.0 {
        return Err(SolverError::MalformedBoundary);
    }
    if rows[0].diag == 0.0 {
        return Err(SolverError::ZeroLeadingDiagonal);
    }

    // c-prime, and d-prime which becomes the solution in place
    let mut cp = vec![0.0; n];
    let mut x = vec![0.0; n];

    cp[0] = rows[0].sup / rows[0].diag;
    x[0] = rhs[0] / rows[0].diag;
    for i in 1..n {
        let row = &rows[i];
        let denom = row.diag - row.sub * cp[i - 1];
        if denom == 0.0 {
            return Err(SolverError::Singular { row: i });
        }
        cp[i] = row.sup / denom;
        x[i] = (rhs[i] - row.sub * x[i - 1]) / denom;
    }

    for i in (0..n - 1).rev() {
        x[i] -= cp[i] * x[i + 1];
    }

    trace!(rows = n, "tridiagonal system solved");
    Ok(x)
}

/// Row-wise residuals `m . x - d`. Missing neighbours at either end count as zero.
pub fn residuals(rows: &[TriRow], x: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = rows.len().min(x.len()).min(rhs.len());
    (0..n)
        .map(|i| {
            let left = if i > 0 { rows[i].sub * x[i - 1] } else { 0.0 };
            let right = if i + 1 < n { rows[i].sup * x[i + 1] } else { 0.0 };
            left + rows[i].diag * x[i] + right - rhs[i]
        })
        .collect()
}
