//! Blocking MPI halo importer built from a matrix's ghost exchange plan.
//!
//! Posts nonblocking receives for every ghost group, sends the owned rows
//! each peer needs, and completes everything before returning: one blocking
//! import per call, matching the sequential gather method. Requires the
//! matrix to carry a `GhostMap`.

use crate::error::TriDiError;
use crate::halo::HaloImport;
use crate::matrix::{BlockMultiVector, GhostMap};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use num_traits::Float;

pub struct MpiHaloImporter {
    world: SimpleCommunicator,
    plan: GhostMap,
    /// First ghost block row in the staging vector.
    num_owned: usize,
    block_size: usize,
}

impl MpiHaloImporter {
    pub fn new(
        world: SimpleCommunicator,
        plan: GhostMap,
        num_owned: usize,
        block_size: usize,
    ) -> Self {
        Self {
            world,
            plan,
            num_owned,
            block_size,
        }
    }
}

impl<T: Float + Equivalence> HaloImport<T> for MpiHaloImporter {
    fn import(
        &mut self,
        x: &BlockMultiVector<T>,
        z: &mut BlockMultiVector<T>,
    ) -> Result<(), TriDiError> {
        let bs = self.block_size;
        let nrhs = x.num_vectors();
        if x.num_rows() != self.num_owned {
            return Err(TriDiError::HaloExchange(format!(
                "source vector has {} rows, importer expects {}",
                x.num_rows(),
                self.num_owned
            )));
        }

        // pack owned rows per destination rank
        let send_bufs: Vec<Vec<T>> = self
            .plan
            .send_ranks
            .iter()
            .enumerate()
            .map(|(g, _)| {
                let rows = &self.plan.send_rows[self.plan.send_ptr[g]..self.plan.send_ptr[g + 1]];
                let mut buf = Vec::with_capacity(rows.len() * bs * nrhs);
                for &r in rows {
                    for j in 0..nrhs {
                        for k in 0..bs {
                            buf.push(x.value(r, k, j));
                        }
                    }
                }
                buf
            })
            .collect();

        let mut recv_bufs: Vec<Vec<T>> = self
            .plan
            .recv_ranks
            .iter()
            .enumerate()
            .map(|(g, _)| {
                let count = self.plan.recv_ptr[g + 1] - self.plan.recv_ptr[g];
                vec![T::zero(); count * bs * nrhs]
            })
            .collect();

        mpi::request::scope(|scope| {
            let mut reqs = Vec::new();
            for (g, buf) in recv_bufs.iter_mut().enumerate() {
                let peer = self.world.process_at_rank(self.plan.recv_ranks[g] as i32);
                reqs.push(peer.immediate_receive_into(scope, &mut buf[..]));
            }
            for (g, buf) in send_bufs.iter().enumerate() {
                let peer = self.world.process_at_rank(self.plan.send_ranks[g] as i32);
                reqs.push(peer.immediate_send(scope, &buf[..]));
            }
            for req in reqs {
                req.wait();
            }
        });

        // unpack into the ghost rows of the staging vector
        for (g, buf) in recv_bufs.iter().enumerate() {
            let cols = &self.plan.recv_cols[self.plan.recv_ptr[g]..self.plan.recv_ptr[g + 1]];
            for (ci, &c) in cols.iter().enumerate() {
                for j in 0..nrhs {
                    let src = &buf[(ci * nrhs + j) * bs..(ci * nrhs + j + 1) * bs];
                    z.col_mut(j)[c * bs..(c + 1) * bs].copy_from_slice(src);
                }
            }
        }
        Ok(())
    }
}
