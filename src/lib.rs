//! blocktridi: block-tridiagonal line relaxation over block-sparse matrices
//!
//! This crate provides a block-tridiagonal preconditioner container for
//! distributed block-sparse linear systems. Local rows are grouped into parts
//! and lines, each line is factored as a small block-tridiagonal system, and
//! an inverse-Jacobi sweep applies the factored lines together with an
//! explicit off-tridiagonal correction, with support for shared and
//! distributed memory parallelism.

pub mod parallel;

pub mod config;
pub mod container;
pub mod core;
pub mod error;
pub mod halo;
pub mod matrix;
pub mod partition;
pub mod tridiag;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use container::*;
pub use core::*;
pub use error::*;
pub use halo::*;
pub use matrix::*;
pub use partition::*;
pub use tridiag::*;
pub use utils::*;

// Re-export NormManager at the crate root for convenience
pub use utils::norms::NormManager;
