//! Container construction and per-phase parameters.
//!
//! This module provides the option types consumed by the block-tridiagonal
//! container: construction-time switches (`ContainerOptions`), the numeric
//! phase knobs (`ComputeParameters`), and the sweep-loop knobs
//! (`ApplyParameters`).

use bitflags::bitflags;
use num_traits::Float;

bitflags! {
    /// Construction-time switches for the container.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ContainerOptions: u32 {
        /// Gather halo rows through a blocking import instead of the
        /// asynchronous point-to-point exchange.
        const USE_SEQ_METHOD         = 0b0001;
        /// Request overlap of halo communication with interior computation.
        /// The container still starts with overlap disabled; see
        /// `BlockTriDiContainer::set_overlap_communication`.
        const OVERLAP_COMM_AND_COMP  = 0b0010;
    }
}

/// Parameters for the numeric phase (`compute_with`).
#[derive(Copy, Clone, Debug)]
pub struct ComputeParameters<T> {
    /// Scalar added radially (sign-preserving) to every diagonal entry of
    /// every diagonal block before factorization. Zero leaves the blocks
    /// untouched.
    pub add_radially_to_diagonal: T,
}

impl<T: Float> Default for ComputeParameters<T> {
    fn default() -> Self {
        Self {
            add_radially_to_diagonal: T::zero(),
        }
    }
}

/// Parameters for one `apply_inverse_jacobi` call.
#[derive(Copy, Clone, Debug)]
pub struct ApplyParameters<T> {
    /// Treat `y` as uninitialized rather than as a warm start.
    pub zero_starting_solution: bool,
    /// Scales the correction step: `y ← (1-ω)·y + ω·δ`.
    pub damping_factor: T,
    /// Upper bound on the number of sweeps; 0 performs no work.
    pub max_num_sweeps: usize,
    /// Per-RHS convergence tolerance on the correction norm; 0 disables the
    /// check and the sweep count is fixed.
    pub tolerance: T,
    /// Sweep stride between tolerance checks.
    pub check_tolerance_every: usize,
}

impl<T: Float> Default for ApplyParameters<T> {
    fn default() -> Self {
        Self {
            zero_starting_solution: false,
            damping_factor: T::one(),
            max_num_sweeps: 1,
            tolerance: T::zero(),
            check_tolerance_every: 1,
        }
    }
}
