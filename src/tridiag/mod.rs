//! Block-tridiagonal structure, factorization, and solves.
//!
//! `structure` holds the per-line sub/diag/super storage and the
//! off-tridiagonal remainder (A-minus-D); `symbolic` classifies the matrix
//! structure once; `numeric` re-extracts values and factors every line;
//! `solve` runs the forward/backward block substitution against the factors.

pub mod numeric;
pub mod solve;
pub mod structure;
pub mod symbolic;

pub use numeric::perform_numeric_phase;
pub use solve::solve_tridiags;
pub use structure::{AmD, BlockTridiags, TriDiLine};
pub use symbolic::perform_symbolic_phase;
