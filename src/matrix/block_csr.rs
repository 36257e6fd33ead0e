//! Local block-CSR storage for the distributed block-sparse matrix.
//!
//! This is the surface the container consumes from the distributed-matrix
//! collaborator: owned block rows in CSR form at block granularity, block
//! column indices running over owned columns first and ghost (halo) columns
//! after them, and an optional `GhostMap` describing where ghost columns live.
//! Block values are column-major `bs × bs` chunks in one flat buffer.

use crate::core::traits::BlockShape;
use crate::error::TriDiError;
use crate::matrix::multivector::BlockMultiVector;
use num_traits::Float;

/// Exchange plan for ghost block columns.
///
/// Ghost column `num_rows + k` of the local matrix is owned by a remote
/// process; the receive side lists ghost columns grouped by source rank, the
/// send side lists owned rows to ship per destination rank. This is the
/// distilled distributor plan an importer needs to fill halo rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostMap {
    pub recv_ranks: Vec<usize>,
    /// Group boundaries into `recv_cols`, one group per entry of `recv_ranks`.
    pub recv_ptr: Vec<usize>,
    /// Local ghost block-column indices (each `>= num_rows`).
    pub recv_cols: Vec<usize>,
    pub send_ranks: Vec<usize>,
    /// Group boundaries into `send_rows`, one group per entry of `send_ranks`.
    pub send_ptr: Vec<usize>,
    /// Owned block rows to ship, grouped by destination rank.
    pub send_rows: Vec<usize>,
}

/// Owned block rows of a block-sparse matrix in CSR form at block granularity.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockCsrMatrix<T> {
    block_size: usize,
    num_rows: usize,
    num_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
    ghosts: Option<GhostMap>,
}

impl<T: Float> BlockCsrMatrix<T> {
    /// Build from raw block-CSR arrays, checking structural invariants.
    pub fn from_block_csr(
        block_size: usize,
        num_rows: usize,
        num_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, TriDiError> {
        if block_size == 0 {
            return Err(TriDiError::Config("block size must be positive".into()));
        }
        if num_cols < num_rows {
            return Err(TriDiError::Config(format!(
                "num_cols ({num_cols}) must cover the owned rows ({num_rows})"
            )));
        }
        if row_ptr.len() != num_rows + 1 || row_ptr[0] != 0 {
            return Err(TriDiError::Config("malformed row pointer array".into()));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(TriDiError::Config("row pointers must be monotone".into()));
        }
        let nnz = row_ptr[num_rows];
        if col_idx.len() != nnz {
            return Err(TriDiError::Config(format!(
                "column index length {} does not match nnz {}",
                col_idx.len(),
                nnz
            )));
        }
        if let Some(&c) = col_idx.iter().find(|&&c| c >= num_cols) {
            return Err(TriDiError::Config(format!(
                "block column {c} out of range (num_cols = {num_cols})"
            )));
        }
        if values.len() != nnz * block_size * block_size {
            return Err(TriDiError::Config(format!(
                "value length {} does not match {} blocks of size {}x{}",
                values.len(),
                nnz,
                block_size,
                block_size
            )));
        }
        Ok(Self {
            block_size,
            num_rows,
            num_cols,
            row_ptr,
            col_idx,
            values,
            ghosts: None,
        })
    }

    /// Build from a list of `(row, col, block)` entries, blocks column-major.
    /// Entries are sorted by row then column; duplicates are rejected.
    pub fn from_block_entries(
        block_size: usize,
        num_rows: usize,
        num_cols: usize,
        mut entries: Vec<(usize, usize, Vec<T>)>,
    ) -> Result<Self, TriDiError> {
        let bs2 = block_size * block_size;
        entries.sort_by_key(|&(r, c, _)| (r, c));
        if entries.windows(2).any(|w| (w[0].0, w[0].1) == (w[1].0, w[1].1)) {
            return Err(TriDiError::Config("duplicate block entry".into()));
        }
        let mut row_ptr = vec![0usize; num_rows + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len() * bs2);
        for (r, c, block) in entries {
            if r >= num_rows {
                return Err(TriDiError::Config(format!("block row {r} out of range")));
            }
            if block.len() != bs2 {
                return Err(TriDiError::Config(format!(
                    "block at ({r}, {c}) has {} entries, expected {bs2}",
                    block.len()
                )));
            }
            row_ptr[r + 1] += 1;
            col_idx.push(c);
            values.extend_from_slice(&block);
        }
        for r in 0..num_rows {
            row_ptr[r + 1] += row_ptr[r];
        }
        Self::from_block_csr(block_size, num_rows, num_cols, row_ptr, col_idx, values)
    }

    /// Attach the ghost exchange plan for the halo columns.
    pub fn with_ghost_map(mut self, ghosts: GhostMap) -> Self {
        self.ghosts = Some(ghosts);
        self
    }

    pub fn ghost_map(&self) -> Option<&GhostMap> {
        self.ghosts.as_ref()
    }

    /// True when the local column space extends past the owned rows.
    pub fn has_halo(&self) -> bool {
        self.num_cols > self.num_rows
    }

    pub fn num_block_entries(&self) -> usize {
        self.col_idx.len()
    }

    /// Entry range of a block row, indexing `block_col`/`block`.
    pub fn row_entries(&self, row: usize) -> std::ops::Range<usize> {
        self.row_ptr[row]..self.row_ptr[row + 1]
    }

    pub fn block_col(&self, entry: usize) -> usize {
        self.col_idx[entry]
    }

    /// Column-major `bs × bs` values of one block entry.
    pub fn block(&self, entry: usize) -> &[T] {
        let bs2 = self.block_size * self.block_size;
        &self.values[entry * bs2..(entry + 1) * bs2]
    }

    pub fn block_mut(&mut self, entry: usize) -> &mut [T] {
        let bs2 = self.block_size * self.block_size;
        &mut self.values[entry * bs2..(entry + 1) * bs2]
    }

    /// Overwrite the values of the block at `(row, col)`, if present.
    pub fn set_block(&mut self, row: usize, col: usize, block: &[T]) -> Result<(), TriDiError> {
        let entry = self
            .row_entries(row)
            .find(|&e| self.col_idx[e] == col)
            .ok_or_else(|| TriDiError::Config(format!("no block at ({row}, {col})")))?;
        self.block_mut(entry).copy_from_slice(block);
        Ok(())
    }

    /// Block sparse matrix-vector product `y = A x` over all RHS columns.
    /// `x` must span the full local column space (owned plus ghost rows).
    pub fn spmv(&self, x: &BlockMultiVector<T>, y: &mut BlockMultiVector<T>) {
        let bs = self.block_size;
        assert_eq!(x.num_rows(), self.num_cols);
        assert_eq!(y.num_rows(), self.num_rows);
        assert_eq!(x.num_vectors(), y.num_vectors());
        for j in 0..y.num_vectors() {
            let xc = x.col(j);
            let yc = y.col_mut(j);
            yc.fill(T::zero());
            for r in 0..self.num_rows {
                for e in self.row_entries(r) {
                    let c = self.col_idx[e];
                    let a = self.block(e);
                    for bj in 0..bs {
                        let xj = xc[c * bs + bj];
                        if xj != T::zero() {
                            for bi in 0..bs {
                                yc[r * bs + bi] = yc[r * bs + bi] + a[bi + bj * bs] * xj;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Dense `f64` expansion of the local rows, for diagnostics and reference
    /// solves in tests. Columns cover the full local column space.
    pub fn to_dense(&self) -> faer::Mat<f64> {
        let bs = self.block_size;
        let mut dense = faer::Mat::zeros(self.num_rows * bs, self.num_cols * bs);
        for r in 0..self.num_rows {
            for e in self.row_entries(r) {
                let c = self.col_idx[e];
                let block = self.block(e);
                for bj in 0..bs {
                    for bi in 0..bs {
                        dense[(r * bs + bi, c * bs + bj)] =
                            block[bi + bj * bs].to_f64().unwrap_or(0.0);
                    }
                }
            }
        }
        dense
    }
}

impl<T> BlockShape for BlockCsrMatrix<T> {
    fn block_size(&self) -> usize {
        self.block_size
    }
    fn num_rows(&self) -> usize {
        self.num_rows
    }
    fn num_cols(&self) -> usize {
        self.num_cols
    }
}
