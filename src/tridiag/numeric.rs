//! Numeric phase: re-extract block values and factor every line.
//!
//! Runs on every `compute`. Values flow through the source maps fixed by the
//! symbolic phase, an optional radial addend conditions the diagonal blocks,
//! and each line is eliminated in place: the sub block becomes the multiplier
//! `S = A_sub · D_prev⁻¹`, the next diagonal takes the Schur update
//! `D -= S · C_prev`, and the diagonal is LU-factored. Lines are independent,
//! so the whole phase is a parallel loop over lines.

use crate::core::blocks;
use crate::error::TriDiError;
use crate::matrix::BlockCsrMatrix;
use crate::tridiag::structure::{AmD, BlockTridiags, TriDiLine};
use num_traits::Float;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub fn perform_numeric_phase<T: Float + Send + Sync>(
    a: &BlockCsrMatrix<T>,
    tridiags: &mut BlockTridiags<T>,
    amd: &mut AmD<T>,
    add_radial: T,
) -> Result<(), TriDiError> {
    let bs = tridiags.block_size;

    #[cfg(feature = "rayon")]
    {
        tridiags
            .lines
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(l, line)| extract_and_factor(a, line, l, bs, add_radial))?;
        let bs2 = bs * bs;
        amd.values
            .par_chunks_mut(bs2)
            .zip(amd.src.par_iter())
            .for_each(|(dst, &e)| dst.copy_from_slice(a.block(e)));
    }
    #[cfg(not(feature = "rayon"))]
    {
        tridiags
            .lines
            .iter_mut()
            .enumerate()
            .try_for_each(|(l, line)| extract_and_factor(a, line, l, bs, add_radial))?;
        let bs2 = bs * bs;
        amd.values
            .chunks_mut(bs2)
            .zip(amd.src.iter())
            .for_each(|(dst, &e)| dst.copy_from_slice(a.block(e)));
    }
    Ok(())
}

fn extract_and_factor<T: Float>(
    a: &BlockCsrMatrix<T>,
    line: &mut TriDiLine<T>,
    l: usize,
    bs: usize,
    add_radial: T,
) -> Result<(), TriDiError> {
    let bs2 = bs * bs;

    let pull = |dst: &mut [T], src: Option<usize>| match src {
        Some(e) => dst.copy_from_slice(a.block(e)),
        None => dst.fill(T::zero()),
    };
    for i in 0..line.len {
        pull(&mut line.diag[i * bs2..(i + 1) * bs2], line.diag_src[i]);
    }
    for i in 0..line.len.saturating_sub(1) {
        pull(&mut line.sub[i * bs2..(i + 1) * bs2], line.sub_src[i]);
        pull(&mut line.sup[i * bs2..(i + 1) * bs2], line.sup_src[i]);
    }

    if add_radial != T::zero() {
        for i in 0..line.len {
            blocks::add_radial(&mut line.diag[i * bs2..(i + 1) * bs2], bs, add_radial);
        }
    }

    for i in 0..line.len {
        if i > 0 {
            let (head, tail) = line.diag.split_at_mut(i * bs2);
            let prev_lu = &head[(i - 1) * bs2..];
            let sub = &mut line.sub[(i - 1) * bs2..i * bs2];
            blocks::lu_right_solve(prev_lu, sub, bs);
            let sup = &line.sup[(i - 1) * bs2..i * bs2];
            blocks::gemm_minus(sub, sup, &mut tail[..bs2], bs);
        }
        let diag = &mut line.diag[i * bs2..(i + 1) * bs2];
        blocks::lu_factor(diag, bs).map_err(|entry| TriDiError::ZeroPivot {
            part: line.part,
            line: l,
            block: i,
            entry,
        })?;
    }
    Ok(())
}
