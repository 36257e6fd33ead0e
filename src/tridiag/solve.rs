//! Forward/backward block substitution against the factored lines.
//!
//! Operates on the packed work buffer, laid out `[position][rhs][dof]` so
//! every line owns one contiguous chunk and the lines solve in parallel.

use crate::core::blocks;
use crate::tridiag::structure::{BlockTridiags, TriDiLine};
use num_traits::Float;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Solve `T δ = b` in place for every line. `work` holds the packed
/// right-hand sides on entry and the corrections on return.
pub fn solve_tridiags<T: Float + Send + Sync>(
    tridiags: &BlockTridiags<T>,
    work: &mut [T],
    nrhs: usize,
) {
    let bs = tridiags.block_size;
    let mut chunks: Vec<(&TriDiLine<T>, &mut [T])> = Vec::with_capacity(tridiags.lines.len());
    let mut rest = work;
    for line in &tridiags.lines {
        let (chunk, tail) = rest.split_at_mut(line.len * nrhs * bs);
        chunks.push((line, chunk));
        rest = tail;
    }

    #[cfg(feature = "rayon")]
    chunks
        .into_par_iter()
        .for_each(|(line, w)| solve_line(line, w, nrhs, bs));
    #[cfg(not(feature = "rayon"))]
    chunks
        .into_iter()
        .for_each(|(line, w)| solve_line(line, w, nrhs, bs));
}

fn solve_line<T: Float>(line: &TriDiLine<T>, w: &mut [T], nrhs: usize, bs: usize) {
    let bs2 = bs * bs;
    // forward: y_i ← b_i − S_{i-1} y_{i-1}
    for i in 1..line.len {
        let (prev, cur) = w.split_at_mut(i * nrhs * bs);
        let s = &line.sub[(i - 1) * bs2..i * bs2];
        for j in 0..nrhs {
            let yp = &prev[((i - 1) * nrhs + j) * bs..((i - 1) * nrhs + j + 1) * bs];
            let yc = &mut cur[j * bs..(j + 1) * bs];
            blocks::gemv_minus(s, yp, yc, bs);
        }
    }
    // backward: x_i ← D_i⁻¹ (y_i − C_i x_{i+1})
    for i in (0..line.len).rev() {
        let lu = &line.diag[i * bs2..(i + 1) * bs2];
        if i + 1 < line.len {
            let (head, tail) = w.split_at_mut((i + 1) * nrhs * bs);
            let c = &line.sup[i * bs2..(i + 1) * bs2];
            for j in 0..nrhs {
                let xn = &tail[j * bs..(j + 1) * bs];
                let yc = &mut head[(i * nrhs + j) * bs..(i * nrhs + j + 1) * bs];
                blocks::gemv_minus(c, xn, yc, bs);
                blocks::lu_solve(lu, yc, bs);
            }
        } else {
            for j in 0..nrhs {
                let yc = &mut w[(i * nrhs + j) * bs..(i * nrhs + j + 1) * bs];
                blocks::lu_solve(lu, yc, bs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::BlockCsrMatrix;
    use crate::partition::create_part_interface;
    use crate::tridiag::numeric::perform_numeric_phase;
    use crate::tridiag::symbolic::perform_symbolic_phase;
    use approx::assert_relative_eq;

    #[test]
    fn factored_solve_matches_dense_reference() {
        // bs = 2, one line of 3 block rows; compare against faer on the
        // dense expansion
        let b2 = |m: [[f64; 2]; 2]| vec![m[0][0], m[1][0], m[0][1], m[1][1]];
        let entries = vec![
            (0, 0, b2([[4.0, 1.0], [0.5, 5.0]])),
            (0, 1, b2([[-1.0, 0.2], [0.0, -1.0]])),
            (1, 0, b2([[-1.0, 0.0], [0.3, -1.0]])),
            (1, 1, b2([[5.0, -0.5], [1.0, 4.0]])),
            (1, 2, b2([[-0.7, 0.0], [0.1, -1.2]])),
            (2, 1, b2([[-1.1, 0.4], [0.0, -0.9]])),
            (2, 2, b2([[6.0, 0.3], [-0.2, 5.0]])),
        ];
        let a = BlockCsrMatrix::from_block_entries(2, 3, 3, entries).unwrap();
        let iface = create_part_interface(&a, &[]).unwrap();
        let (mut td, mut amd) = perform_symbolic_phase(&a, &iface);
        perform_numeric_phase(&a, &mut td, &mut amd, 0.0).unwrap();

        let rhs: Vec<f64> = (0..6).map(|i| 1.0 + i as f64 * 0.5).collect();
        // packed work, single RHS; the line order is the natural row order
        let mut work = rhs.clone();
        solve_tridiags(&td, &mut work, 1);

        let dense = a.to_dense();
        let lu = faer::linalg::solvers::FullPivLu::new(dense.as_ref());
        let mut x_ref = rhs.clone();
        {
            use faer::linalg::solvers::SolveCore;
            let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_ref, 6, 1);
            lu.solve_in_place_with_conj(faer::Conj::No, x_mat);
        }
        for i in 0..6 {
            assert_relative_eq!(work[i], x_ref[i], max_relative = 1e-10);
        }
    }

    #[test]
    fn two_rhs_solve_independently() {
        let entries = vec![
            (0, 0, vec![3.0]),
            (0, 1, vec![-1.0]),
            (1, 0, vec![-1.0]),
            (1, 1, vec![3.0]),
        ];
        let a = BlockCsrMatrix::from_block_entries(1, 2, 2, entries).unwrap();
        let iface = create_part_interface(&a, &[]).unwrap();
        let (mut td, mut amd) = perform_symbolic_phase(&a, &iface);
        perform_numeric_phase(&a, &mut td, &mut amd, 0.0).unwrap();

        // layout [position][rhs]; rhs 0 = (1, 0), rhs 1 = (0, 1)
        let mut work = vec![1.0, 0.0, 0.0, 1.0];
        solve_tridiags(&td, &mut work, 2);
        // A^{-1} = 1/8 * [[3, 1], [1, 3]]
        assert_relative_eq!(work[0], 3.0 / 8.0, max_relative = 1e-14);
        assert_relative_eq!(work[1], 1.0 / 8.0, max_relative = 1e-14);
        assert_relative_eq!(work[2], 1.0 / 8.0, max_relative = 1e-14);
        assert_relative_eq!(work[3], 3.0 / 8.0, max_relative = 1e-14);
    }
}
