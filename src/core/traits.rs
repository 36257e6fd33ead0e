//! Core seam traits for blocktridi.

/// Shape of a block-structured operator.
pub trait BlockShape {
    /// Point rows/cols per block row.
    fn block_size(&self) -> usize;
    /// Number of owned block rows.
    fn num_rows(&self) -> usize;
    /// Number of local block columns (owned plus ghost).
    fn num_cols(&self) -> usize;
}
