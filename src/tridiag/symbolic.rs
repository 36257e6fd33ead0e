//! Symbolic phase: classify the matrix structure against the partition.
//!
//! One pass over the local block entries. Each entry of a row at packed
//! position `i` of line `l` is either the diagonal block (same row), the sub
//! block (column sits at position `i-1` of `l`), the super block (position
//! `i+1` of `l`), or part of A-minus-D; same-part entries that are not
//! adjacent in the line also land in A-minus-D. Value storage is allocated and zeroed here;
//! matrix values are never read.

use crate::core::traits::BlockShape;
use crate::matrix::BlockCsrMatrix;
use crate::partition::PartInterface;
use crate::tridiag::structure::{AmD, BlockTridiags, TriDiLine};
use num_traits::Float;

pub fn perform_symbolic_phase<T: Float>(
    a: &BlockCsrMatrix<T>,
    iface: &PartInterface,
) -> (BlockTridiags<T>, AmD<T>) {
    let bs = a.block_size();
    let bs2 = bs * bs;
    let n = a.num_rows();
    let packed = iface.packed_len();

    let mut lines = Vec::with_capacity(iface.num_lines());
    for l in 0..iface.num_lines() {
        let range = iface.line_range(l);
        let len = range.len();
        let off = len.saturating_sub(1);
        lines.push(TriDiLine {
            part: iface.linepart[l],
            start: range.start,
            len,
            diag: vec![T::zero(); len * bs2],
            sub: vec![T::zero(); off * bs2],
            sup: vec![T::zero(); off * bs2],
            diag_src: vec![None; len],
            sub_src: vec![None; off],
            sup_src: vec![None; off],
        });
    }

    let mut amd_rows: Vec<Vec<(usize, usize)>> = vec![Vec::new(); packed];
    for pos in 0..packed {
        let r = iface.lclrow[pos];
        let l = iface.pos_line[pos];
        let i = pos - lines[l].start;
        for e in a.row_entries(r) {
            let c = a.block_col(e);
            if c == r {
                lines[l].diag_src[i] = Some(e);
                continue;
            }
            if c < n {
                let cpos = iface.rowidx[c];
                if iface.pos_line[cpos] == l {
                    if cpos + 1 == pos {
                        lines[l].sub_src[i - 1] = Some(e);
                        continue;
                    }
                    if cpos == pos + 1 {
                        lines[l].sup_src[i] = Some(e);
                        continue;
                    }
                }
            }
            amd_rows[pos].push((c, e));
        }
    }

    let mut amd = AmD {
        block_size: bs,
        row_ptr: Vec::with_capacity(packed + 1),
        cols: Vec::new(),
        src: Vec::new(),
        values: Vec::new(),
        pos_needs_halo: Vec::with_capacity(packed),
    };
    amd.row_ptr.push(0);
    for row in &amd_rows {
        amd.pos_needs_halo.push(row.iter().any(|&(c, _)| c >= n));
        for &(c, e) in row {
            amd.cols.push(c);
            amd.src.push(e);
        }
        amd.row_ptr.push(amd.cols.len());
    }
    amd.values = vec![T::zero(); amd.cols.len() * bs2];

    (BlockTridiags { block_size: bs, lines }, amd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::create_part_interface;

    #[test]
    fn classification_partitions_every_entry() {
        // 4-row chain with one long-range coupling 0 <-> 3
        let entries = vec![
            (0, 0, vec![4.0]),
            (0, 1, vec![-1.0]),
            (0, 3, vec![0.5]),
            (1, 0, vec![-1.0]),
            (1, 1, vec![4.0]),
            (1, 2, vec![-1.0]),
            (2, 1, vec![-1.0]),
            (2, 2, vec![4.0]),
            (2, 3, vec![-1.0]),
            (3, 0, vec![0.5]),
            (3, 2, vec![-1.0]),
            (3, 3, vec![4.0]),
        ];
        let a = BlockCsrMatrix::from_block_entries(1, 4, 4, entries).unwrap();
        let iface = create_part_interface(&a, &[]).unwrap();
        let (td, amd) = perform_symbolic_phase(&a, &iface);

        let captured: usize = td
            .lines
            .iter()
            .map(|line| {
                line.diag_src.iter().flatten().count()
                    + line.sub_src.iter().flatten().count()
                    + line.sup_src.iter().flatten().count()
            })
            .sum();
        assert_eq!(captured + amd.num_entries(), a.num_block_entries());
        // the 0<->3 coupling is same-part but not line-adjacent: A-minus-D
        assert_eq!(amd.num_entries(), 2);
        assert!(amd.pos_needs_halo.iter().all(|&h| !h));
    }

    #[test]
    fn ghost_columns_flag_halo_positions() {
        // row 1 touches ghost column 2
        let entries = vec![
            (0, 0, vec![2.0]),
            (0, 1, vec![-1.0]),
            (1, 0, vec![-1.0]),
            (1, 1, vec![2.0]),
            (1, 2, vec![-0.5]),
        ];
        let a = BlockCsrMatrix::from_block_entries(1, 2, 3, entries).unwrap();
        let iface = create_part_interface(&a, &[]).unwrap();
        let (_td, amd) = perform_symbolic_phase(&a, &iface);
        let ghost_pos = iface.rowidx[1];
        assert!(amd.pos_needs_halo[ghost_pos]);
        assert_eq!(amd.pos_needs_halo.iter().filter(|&&h| h).count(), 1);
    }
}
