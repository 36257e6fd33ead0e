//! Block multivectors: several right-hand sides over block rows.
//!
//! Storage is one flat buffer, each vector contiguous: value `(row, dof)` of
//! vector `j` lives at `j * num_rows * bs + row * bs + dof`. A multivector
//! sized to the full local column space (owned plus ghost rows) doubles as the
//! halo staging buffer during sweeps.

use num_traits::Float;

#[derive(Clone, Debug, PartialEq)]
pub struct BlockMultiVector<T> {
    block_size: usize,
    num_rows: usize,
    num_vectors: usize,
    values: Vec<T>,
}

impl<T: Float> BlockMultiVector<T> {
    pub fn zeros(block_size: usize, num_rows: usize, num_vectors: usize) -> Self {
        Self {
            block_size,
            num_rows,
            num_vectors,
            values: vec![T::zero(); block_size * num_rows * num_vectors],
        }
    }

    /// Fill from `(row, dof, vector) -> value`.
    pub fn from_fn(
        block_size: usize,
        num_rows: usize,
        num_vectors: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut mv = Self::zeros(block_size, num_rows, num_vectors);
        for j in 0..num_vectors {
            for r in 0..num_rows {
                for k in 0..block_size {
                    let v = f(r, k, j);
                    mv.values[j * num_rows * block_size + r * block_size + k] = v;
                }
            }
        }
        mv
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_vectors(&self) -> usize {
        self.num_vectors
    }

    /// One vector as a flat point-value slice of length `num_rows * bs`.
    pub fn col(&self, j: usize) -> &[T] {
        let n = self.num_rows * self.block_size;
        &self.values[j * n..(j + 1) * n]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        let n = self.num_rows * self.block_size;
        &mut self.values[j * n..(j + 1) * n]
    }

    pub fn value(&self, row: usize, dof: usize, j: usize) -> T {
        self.values[j * self.num_rows * self.block_size + row * self.block_size + dof]
    }

    /// Copy the leading `rows` block rows of every vector from `src`.
    /// Used to stage owned values into an owned+halo buffer before a gather.
    pub fn copy_leading_from(&mut self, src: &Self, rows: usize) {
        debug_assert_eq!(self.block_size, src.block_size);
        debug_assert_eq!(self.num_vectors, src.num_vectors);
        let n = rows * self.block_size;
        for j in 0..self.num_vectors {
            let dst_base = j * self.num_rows * self.block_size;
            let src_base = j * src.num_rows * src.block_size;
            self.values[dst_base..dst_base + n]
                .copy_from_slice(&src.values[src_base..src_base + n]);
        }
    }

    pub fn fill(&mut self, v: T) {
        self.values.fill(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_copy() {
        let x = BlockMultiVector::from_fn(2, 3, 2, |r, k, j| (100 * j + 10 * r + k) as f64);
        assert_eq!(x.value(1, 1, 0), 11.0);
        assert_eq!(x.value(2, 0, 1), 120.0);
        assert_eq!(x.col(1)[0], 100.0);

        let mut z = BlockMultiVector::zeros(2, 5, 2);
        z.copy_leading_from(&x, 3);
        assert_eq!(z.value(2, 1, 1), 121.0);
        assert_eq!(z.value(3, 0, 0), 0.0);
        assert_eq!(z.value(4, 1, 1), 0.0);
    }
}
