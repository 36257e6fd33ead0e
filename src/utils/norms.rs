//! Per-right-hand-side norm tracking across sweeps.
//!
//! The sweep driver accumulates local squared correction norms; on checked
//! sweeps the manager performs the single collective reduction, records the
//! sweep-0 and latest norms, and answers the convergence question. The
//! reduction must be issued by every process collectively, in sweep order.

use crate::parallel::Comm;
use num_traits::Float;

#[derive(Clone, Debug, Default)]
pub struct NormManager<T> {
    num_vectors: usize,
    norms0: Vec<T>,
    norms_final: Vec<T>,
}

impl<T: Float> NormManager<T> {
    pub fn new() -> Self {
        Self {
            num_vectors: 0,
            norms0: Vec::new(),
            norms_final: Vec::new(),
        }
    }

    /// Forget previous norms; called at the start of every apply.
    pub fn reset(&mut self, num_vectors: usize) {
        self.num_vectors = num_vectors;
        self.norms0.clear();
        self.norms_final.clear();
    }

    pub fn num_vectors(&self) -> usize {
        self.num_vectors
    }

    /// Reduce the local squared sums collectively, record the norms, and
    /// report whether every right-hand side is at or below `tol`.
    pub fn check_converged<C: Comm>(&mut self, comm: &C, local_sq: &[f64], tol: T) -> bool {
        debug_assert_eq!(local_sq.len(), self.num_vectors);
        let mut buf = local_sq.to_vec();
        comm.all_reduce_sum(&mut buf);
        let norms: Vec<T> = buf
            .iter()
            .map(|&s| T::from(s.sqrt()).unwrap_or_else(T::zero))
            .collect();
        if self.norms0.is_empty() {
            self.norms0 = norms.clone();
        }
        self.norms_final = norms;
        self.norms_final.iter().all(|&n| n <= tol)
    }

    /// Norms recorded at the first checked sweep; empty before any check.
    pub fn norms0(&self) -> &[T] {
        &self.norms0
    }

    /// Norms recorded at the latest checked sweep; empty before any check.
    pub fn norms_final(&self) -> &[T] {
        &self.norms_final
    }
}
