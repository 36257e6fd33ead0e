// Block-sparse matrix surface and block multivectors

pub mod block_csr;
pub mod multivector;

pub use block_csr::{BlockCsrMatrix, GhostMap};
pub use multivector::BlockMultiVector;
