//! Process-level communication backends.
//!
//! The container needs exactly one collective from its communicator: a
//! summed all-reduce over the per-RHS norm accumulators. `Comm` is that seam;
//! `SerialComm` and `RayonComm` cover single-process runs and `MpiComm`
//! (feature `mpi`) covers distributed ones.

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn barrier(&self);
    /// Element-wise summed all-reduce, in place. Every process must call this
    /// collectively and in the same order.
    fn all_reduce_sum(&self, buf: &mut [f64]);
}

/// Single-process communicator: every collective is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn barrier(&self) {}
    fn all_reduce_sum(&self, _buf: &mut [f64]) {}
}

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;

#[cfg(feature = "rayon")]
pub mod rayon_comm;
#[cfg(feature = "rayon")]
pub use rayon_comm::RayonComm;
