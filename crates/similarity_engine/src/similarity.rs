//! Normalized longest-common-subsequence similarity over raw bytes.
//!
//! The table is `(a.len() + 1) * (b.len() + 1)` cells of five bytes each, so
//! memory grows with the product of the two input sizes. Two 10 KiB files
//! need roughly 500 MB. Inputs are never truncated; instead every call takes
//! a cell budget and refuses pairs whose table would exceed it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LcsError {
    #[error("comparison table for {len_a} x {len_b} bytes exceeds the limit of {limit} cells")]
    TableTooLarge { len_a: usize, len_b: usize, limit: u64 },
    #[error("could not allocate comparison table of {cells} cells")]
    Allocation { cells: usize },
}

/// Returns `2 * lcs(a, b) / (a.len() + b.len())`.
///
/// Two empty inputs are identical and score `1.0`.
pub fn similarity(a: &[u8], b: &[u8], max_cells: u64) -> Result<f64, LcsError> {
    let total = a.len() + b.len();
    if total == 0 {
        return Ok(1.0);
    }
    let matches = lcs_len(a, b, max_cells)?;
    Ok((matches as f64 * 2.0) / total as f64)
}

/// Length of the longest common subsequence, recovered by backtracking
/// through the direction table.
pub fn lcs_len(a: &[u8], b: &[u8], max_cells: u64) -> Result<usize, LcsError> {
    if a.is_empty() || b.is_empty() {
        return Ok(0);
    }

    let width = b.len() + 1;
    let cells = (a.len() + 1)
        .checked_mul(width)
        .filter(|cells| u64::try_from(*cells).is_ok_and(|cells| cells <= max_cells))
        .ok_or(LcsError::TableTooLarge {
            len_a: a.len(),
            len_b: b.len(),
            limit: max_cells,
        })?;
    let mut lengths = table(cells, 0u32)?;
    // true: the value came from row i-1 (drop a byte of `a`).
    let mut from_above = table(cells, false)?;

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cell = i * width + j;
            if a[i - 1] == b[j - 1] {
                lengths[cell] = lengths[cell - width - 1] + 1;
            } else {
                let above = lengths[cell - width];
                let left = lengths[cell - 1];
                if above > left {
                    lengths[cell] = above;
                    from_above[cell] = true;
                } else {
                    lengths[cell] = left;
                }
            }
        }
    }

    let mut matches = 0;
    let (mut i, mut j) = (a.len(), b.len());
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            matches += 1;
            i -= 1;
            j -= 1;
        } else if from_above[i * width + j] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    Ok(matches)
}

fn table<T: Clone>(cells: usize, fill: T) -> Result<Vec<T>, LcsError> {
    let mut cells_vec = Vec::new();
    cells_vec
        .try_reserve_exact(cells)
        .map_err(|_| LcsError::Allocation { cells })?;
    cells_vec.resize(cells, fill);
    Ok(cells_vec)
}
