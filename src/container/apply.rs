//! The inverse-Jacobi sweep driver.
//!
//! Each sweep stages the current iterate (owned rows plus gathered halo),
//! forms the residual-like right-hand side `b = x − (A−D)·z` in the packed
//! layout, solves every factored line, and applies the damped update. With an
//! asynchronous importer and overlap enabled, the exchange is posted first,
//! interior positions are computed while it is in flight, and halo-dependent
//! positions wait for completion.

use crate::config::ApplyParameters;
use crate::container::BlockTriDiContainer;
use crate::core::blocks;
use crate::core::traits::BlockShape;
use crate::error::TriDiError;
use crate::halo::Importer;
use crate::matrix::BlockMultiVector;
use crate::parallel::Comm;
use crate::tridiag::{AmD, solve_tridiags};
use num_traits::Float;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Which packed positions a right-hand-side pass covers.
#[derive(Clone, Copy, PartialEq, Eq)]
enum RhsPass {
    All,
    InteriorOnly,
    HaloOnly,
}

impl<T: Float + Send + Sync, C: Comm> BlockTriDiContainer<T, C> {
    /// Run damped inverse-Jacobi sweeps, `y ← (1−ω)·y + ω·T⁻¹(x − (A−D)·y)`,
    /// and return the number of sweeps performed.
    pub fn apply_inverse_jacobi(
        &mut self,
        x: &BlockMultiVector<T>,
        y: &mut BlockMultiVector<T>,
        params: &ApplyParameters<T>,
    ) -> Result<usize, TriDiError> {
        if !self.is_computed() {
            return Err(TriDiError::NotComputed);
        }
        let n = self.a.num_rows();
        let bs = self.a.block_size();
        if x.block_size() != bs || y.block_size() != bs {
            return Err(TriDiError::Config(format!(
                "vector block size does not match the matrix block size {bs}"
            )));
        }
        if x.num_rows() != n || y.num_rows() != n {
            return Err(TriDiError::Config(format!(
                "vectors must span the {n} owned block rows"
            )));
        }
        if x.num_vectors() != y.num_vectors() {
            return Err(TriDiError::Config(format!(
                "x carries {} vectors but y carries {}",
                x.num_vectors(),
                y.num_vectors()
            )));
        }
        if params.check_tolerance_every == 0 {
            return Err(TriDiError::Config(
                "check_tolerance_every must be positive".into(),
            ));
        }

        let nrhs = x.num_vectors();
        self.norm_manager.reset(nrhs);
        if params.max_num_sweeps == 0 {
            return Ok(0);
        }

        let packed = self.part_interface.packed_len();
        self.work.resize(packed * nrhs * bs, T::zero());
        let mut z = match self.work_z.take() {
            Some(z) if z.num_rows() == self.a.num_cols() && z.num_vectors() == nrhs => z,
            _ => BlockMultiVector::zeros(bs, self.a.num_cols(), nrhs),
        };

        let overlap = self.overlap_communication_and_computation && self.importer.is_async();
        let tol_active = params.tolerance > T::zero();
        let mut sweeps = 0;

        for sweep in 0..params.max_num_sweeps {
            let zero_first = params.zero_starting_solution && sweep == 0;
            if zero_first {
                // the iterate is zero: b = x, no gather, no correction term
                compute_rhs(
                    &mut self.work,
                    x,
                    None,
                    &self.a_minus_d,
                    &self.part_interface.lclrow,
                    nrhs,
                    bs,
                    RhsPass::All,
                );
            } else {
                z.copy_leading_from(y, n);
                match &mut self.importer {
                    Importer::None => {
                        compute_rhs(
                            &mut self.work,
                            x,
                            Some(&z),
                            &self.a_minus_d,
                            &self.part_interface.lclrow,
                            nrhs,
                            bs,
                            RhsPass::All,
                        );
                    }
                    Importer::Sync(imp) => {
                        imp.import(y, &mut z)?;
                        compute_rhs(
                            &mut self.work,
                            x,
                            Some(&z),
                            &self.a_minus_d,
                            &self.part_interface.lclrow,
                            nrhs,
                            bs,
                            RhsPass::All,
                        );
                    }
                    Importer::Async(imp) => {
                        imp.post(y)?;
                        if overlap {
                            compute_rhs(
                                &mut self.work,
                                x,
                                Some(&z),
                                &self.a_minus_d,
                                &self.part_interface.lclrow,
                                nrhs,
                                bs,
                                RhsPass::InteriorOnly,
                            );
                            imp.wait(&mut z)?;
                            compute_rhs(
                                &mut self.work,
                                x,
                                Some(&z),
                                &self.a_minus_d,
                                &self.part_interface.lclrow,
                                nrhs,
                                bs,
                                RhsPass::HaloOnly,
                            );
                        } else {
                            imp.wait(&mut z)?;
                            compute_rhs(
                                &mut self.work,
                                x,
                                Some(&z),
                                &self.a_minus_d,
                                &self.part_interface.lclrow,
                                nrhs,
                                bs,
                                RhsPass::All,
                            );
                        }
                    }
                }
            }

            solve_tridiags(&self.tridiags, &mut self.work, nrhs);

            let local_sq = update_iterate(
                y,
                &self.work,
                &self.part_interface.rowidx,
                nrhs,
                bs,
                params.damping_factor,
                zero_first,
            );
            sweeps += 1;

            if tol_active
                && (sweeps % params.check_tolerance_every == 0 || sweeps == params.max_num_sweeps)
                && self
                    .norm_manager
                    .check_converged(&self.comm, &local_sq, params.tolerance)
            {
                break;
            }
        }

        self.work_z = Some(z);
        Ok(sweeps)
    }

    /// Convenience overload: the container's damping factor, no tolerance
    /// check, a fixed sweep count.
    pub fn apply_inverse_jacobi_basic(
        &mut self,
        x: &BlockMultiVector<T>,
        y: &mut BlockMultiVector<T>,
        zero_starting_solution: bool,
        num_sweeps: usize,
    ) -> Result<usize, TriDiError> {
        let params = ApplyParameters {
            zero_starting_solution,
            damping_factor: self.damping_factor(),
            max_num_sweeps: num_sweeps,
            tolerance: T::zero(),
            check_tolerance_every: 1,
        };
        self.apply_inverse_jacobi(x, y, &params)
    }
}

/// Form `b = x − (A−D)·z` (or just `b = x` when `z` is absent) into the
/// packed work buffer, for the positions selected by `pass`.
#[allow(clippy::too_many_arguments)]
fn compute_rhs<T: Float + Send + Sync>(
    work: &mut [T],
    x: &BlockMultiVector<T>,
    z: Option<&BlockMultiVector<T>>,
    amd: &AmD<T>,
    lclrow: &[usize],
    nrhs: usize,
    bs: usize,
    pass: RhsPass,
) {
    let bs2 = bs * bs;
    let fill = |(pos, w): (usize, &mut [T])| {
        match pass {
            RhsPass::All => {}
            RhsPass::InteriorOnly if !amd.pos_needs_halo[pos] => {}
            RhsPass::HaloOnly if amd.pos_needs_halo[pos] => {}
            _ => return,
        }
        let r = lclrow[pos];
        for j in 0..nrhs {
            w[j * bs..(j + 1) * bs].copy_from_slice(&x.col(j)[r * bs..(r + 1) * bs]);
        }
        if let Some(z) = z {
            for e in amd.entries(pos) {
                let c = amd.cols[e];
                let a_blk = &amd.values[e * bs2..(e + 1) * bs2];
                for j in 0..nrhs {
                    let zc = &z.col(j)[c * bs..(c + 1) * bs];
                    blocks::gemv_minus(a_blk, zc, &mut w[j * bs..(j + 1) * bs], bs);
                }
            }
        }
    };

    #[cfg(feature = "rayon")]
    work.par_chunks_mut(nrhs * bs).enumerate().for_each(fill);
    #[cfg(not(feature = "rayon"))]
    work.chunks_mut(nrhs * bs).enumerate().for_each(fill);
}

/// Apply the damped update and return the per-RHS squared correction norms.
/// With a zero starting solution the correction is taken plainly and the
/// previous iterate counts as zero.
fn update_iterate<T: Float + Send + Sync>(
    y: &mut BlockMultiVector<T>,
    work: &[T],
    rowidx: &[usize],
    nrhs: usize,
    bs: usize,
    damping: T,
    plain: bool,
) -> Vec<f64> {
    let one_minus = T::one() - damping;
    let mut local_sq = vec![0f64; nrhs];
    for (j, sq) in local_sq.iter_mut().enumerate() {
        let update = |(r, chunk): (usize, &mut [T])| -> f64 {
            let pos = rowidx[r];
            let delta = &work[(pos * nrhs + j) * bs..(pos * nrhs + j + 1) * bs];
            let mut acc = 0f64;
            for k in 0..bs {
                let (next, diff) = if plain {
                    (delta[k], delta[k])
                } else {
                    let next = one_minus * chunk[k] + damping * delta[k];
                    (next, next - chunk[k])
                };
                acc += diff.to_f64().unwrap_or(0.0).powi(2);
                chunk[k] = next;
            }
            acc
        };

        #[cfg(feature = "rayon")]
        {
            *sq = y
                .col_mut(j)
                .par_chunks_mut(bs)
                .enumerate()
                .map(update)
                .sum::<f64>();
        }
        #[cfg(not(feature = "rayon"))]
        {
            *sq = y.col_mut(j).chunks_mut(bs).enumerate().map(update).sum::<f64>();
        }
    }
    local_sq
}
