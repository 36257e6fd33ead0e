//! Partition Builder: parts, lines, and the packed row ordering.
//!
//! A part is a caller-chosen group of owned block rows; within each part the
//! builder reorders rows into maximal lines, the chains the matrix graph
//! lets us treat as one tridiagonal system. A part whose restricted graph is
//! not a single chain is split into several lines. The packed ordering
//! (`lclrow`) concatenates all lines; every per-line kernel downstream indexes
//! through it.

use crate::core::traits::BlockShape;
use crate::error::TriDiError;
use crate::matrix::BlockCsrMatrix;
use num_traits::Float;

/// Row/part/line index maps produced by the Partition Builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartInterface {
    /// Packed position -> local row; a permutation of the owned rows.
    pub lclrow: Vec<usize>,
    /// Local row -> packed position; inverse of `lclrow`.
    pub rowidx: Vec<usize>,
    /// Local row -> owning part.
    pub rowpart: Vec<usize>,
    /// Line boundaries in packed positions; line `l` spans
    /// `lineptr[l]..lineptr[l+1]`.
    pub lineptr: Vec<usize>,
    /// Line -> owning part.
    pub linepart: Vec<usize>,
    /// Part -> line range; part `p` owns lines `partptr[p]..partptr[p+1]`.
    pub partptr: Vec<usize>,
    /// Packed position -> line.
    pub pos_line: Vec<usize>,
}

impl PartInterface {
    pub fn num_parts(&self) -> usize {
        self.partptr.len().saturating_sub(1)
    }

    pub fn num_lines(&self) -> usize {
        self.lineptr.len().saturating_sub(1)
    }

    pub fn packed_len(&self) -> usize {
        self.lclrow.len()
    }

    pub fn line_range(&self, line: usize) -> std::ops::Range<usize> {
        self.lineptr[line]..self.lineptr[line + 1]
    }
}

/// Build the part interface from caller-supplied partitions.
///
/// An empty `partitions` slice selects the default: one part holding all
/// owned rows in natural order. Every owned row must appear in exactly one
/// part; anything else is a fatal configuration error reported before any
/// numeric work.
pub fn create_part_interface<T: Float>(
    a: &BlockCsrMatrix<T>,
    partitions: &[Vec<usize>],
) -> Result<PartInterface, TriDiError> {
    let n = a.num_rows();
    let default_parts;
    let parts: &[Vec<usize>] = if partitions.is_empty() {
        default_parts = vec![(0..n).collect::<Vec<_>>()];
        &default_parts
    } else {
        partitions
    };

    // complete, non-overlapping cover of the owned rows
    const UNASSIGNED: usize = usize::MAX;
    let mut rowpart = vec![UNASSIGNED; n];
    for (p, rows) in parts.iter().enumerate() {
        for &r in rows {
            if r >= n {
                return Err(TriDiError::InvalidPartition(format!(
                    "row {r} in part {p} is out of range (num rows = {n})"
                )));
            }
            if rowpart[r] != UNASSIGNED {
                return Err(TriDiError::InvalidPartition(format!(
                    "row {r} assigned to both part {} and part {p}",
                    rowpart[r]
                )));
            }
            rowpart[r] = p;
        }
    }
    if let Some(r) = rowpart.iter().position(|&p| p == UNASSIGNED) {
        return Err(TriDiError::InvalidPartition(format!(
            "row {r} is not assigned to any part"
        )));
    }

    let mut iface = PartInterface {
        lclrow: Vec::with_capacity(n),
        rowidx: vec![0; n],
        rowpart,
        lineptr: vec![0],
        linepart: Vec::new(),
        partptr: vec![0],
        pos_line: Vec::with_capacity(n),
    };

    // local index of each row within its part, shared scratch
    let mut local_of = vec![0usize; n];
    for (p, rows) in parts.iter().enumerate() {
        for (i, &r) in rows.iter().enumerate() {
            local_of[r] = i;
        }

        // adjacency restricted to this part, symmetrized over the structure
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
        for (i, &r) in rows.iter().enumerate() {
            for e in a.row_entries(r) {
                let c = a.block_col(e);
                if c < n && c != r && iface.rowpart[c] == p {
                    let jc = local_of[c];
                    adj[i].push(jc);
                    adj[jc].push(i);
                }
            }
        }
        for nb in adj.iter_mut() {
            nb.sort_unstable();
            nb.dedup();
        }

        // greedy path cover: each chain becomes a line
        let mut visited = vec![false; rows.len()];
        for start in 0..rows.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut forward = vec![start];
            let mut cur = start;
            while let Some(&next) = adj[cur].iter().find(|&&m| !visited[m]) {
                visited[next] = true;
                forward.push(next);
                cur = next;
            }
            let mut backward = Vec::new();
            cur = start;
            while let Some(&next) = adj[cur].iter().find(|&&m| !visited[m]) {
                visited[next] = true;
                backward.push(next);
                cur = next;
            }
            backward.reverse();
            let line = iface.linepart.len();
            for &i in backward.iter().chain(forward.iter()) {
                iface.lclrow.push(rows[i]);
                iface.pos_line.push(line);
            }
            iface.lineptr.push(iface.lclrow.len());
            iface.linepart.push(p);
        }
        iface.partptr.push(iface.linepart.len());
    }

    for (pos, &r) in iface.lclrow.iter().enumerate() {
        iface.rowidx[r] = pos;
    }
    Ok(iface)
}
