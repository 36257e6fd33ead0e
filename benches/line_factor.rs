use blocktridi::config::ContainerOptions;
use blocktridi::container::BlockTriDiContainer;
use blocktridi::matrix::{BlockCsrMatrix, BlockMultiVector};
use blocktridi::parallel::SerialComm;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use faer::linalg::solvers::SolveCore;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

fn block_chain(bs: usize, n: usize, rng: &mut StdRng) -> BlockCsrMatrix<f64> {
    let mut rand_block = |diag: bool| {
        let mut b = vec![0.0; bs * bs];
        for j in 0..bs {
            for i in 0..bs {
                b[i + j * bs] = rng.gen_range(-1.0..1.0) * 0.2;
            }
            if diag {
                b[j + j * bs] += 4.0 * bs as f64;
            }
        }
        b
    };
    let mut entries = Vec::new();
    for i in 0..n {
        entries.push((i, i, rand_block(true)));
        if i > 0 {
            entries.push((i, i - 1, rand_block(false)));
            entries.push((i - 1, i, rand_block(false)));
        }
    }
    BlockCsrMatrix::from_block_entries(bs, n, n, entries).unwrap()
}

fn bench_line_vs_faer(c: &mut Criterion) {
    let bs = 2;
    let n = 128;
    let mut rng = StdRng::seed_from_u64(7);
    let a = Arc::new(block_chain(bs, n, &mut rng));
    let x = BlockMultiVector::from_fn(bs, n, 1, |r, k, _| ((r * bs + k) as f64 * 0.3).cos());

    c.bench_function("blocktridi factor+sweep", |ben| {
        let mut cont =
            BlockTriDiContainer::new(a.clone(), &[], ContainerOptions::empty(), 1.0, SerialComm)
                .unwrap();
        let mut y = BlockMultiVector::zeros(bs, n, 1);
        ben.iter(|| {
            cont.compute().unwrap();
            cont.apply_inverse_jacobi_basic(black_box(&x), black_box(&mut y), true, 1)
                .unwrap();
        })
    });

    c.bench_function("faer dense LU", |ben| {
        let dense = a.to_dense();
        let rhs = x.col(0).to_vec();
        ben.iter(|| {
            let factor = faer::linalg::solvers::FullPivLu::new(dense.as_ref());
            let mut y = rhs.clone();
            let m = y.len();
            let y_mat = faer::MatMut::from_column_major_slice_mut(&mut y, m, 1);
            factor.solve_in_place_with_conj(faer::Conj::No, y_mat);
        })
    });
}

criterion_group!(benches, bench_line_vs_faer);
criterion_main!(benches);
