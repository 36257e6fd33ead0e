//! Halo gathering: how remote block rows reach the A-minus-D product.
//!
//! The container needs ghost rows of the current iterate before it can apply
//! the off-tridiagonal correction. Exactly one of the two importer kinds
//! (a blocking import, or an asynchronous post/wait pair) is populated after
//! setup, or neither when the matrix has no ghost columns. The
//! concrete transports are collaborator territory; this module owns the seam
//! traits, the tagged variant, and the MPI blocking importer (feature `mpi`).

use crate::error::TriDiError;
use crate::matrix::BlockMultiVector;

/// Blocking halo import: fill the ghost block rows of `z` from the owned
/// rows of `x` on the processes that own them.
pub trait HaloImport<T> {
    fn import(
        &mut self,
        x: &BlockMultiVector<T>,
        z: &mut BlockMultiVector<T>,
    ) -> Result<(), TriDiError>;
}

/// Non-blocking halo import: `post` starts the exchange for `x`, `wait`
/// completes it into the ghost rows of `z`. Between the two calls the engine
/// is free to compute on rows that do not depend on ghost data.
pub trait AsyncHaloImport<T> {
    fn post(&mut self, x: &BlockMultiVector<T>) -> Result<(), TriDiError>;
    fn wait(&mut self, z: &mut BlockMultiVector<T>) -> Result<(), TriDiError>;
}

/// The importer actually wired into a container: none, synchronous, or
/// asynchronous, never both.
pub enum Importer<T> {
    None,
    Sync(Box<dyn HaloImport<T>>),
    Async(Box<dyn AsyncHaloImport<T>>),
}

impl<T> Importer<T> {
    pub fn is_none(&self) -> bool {
        matches!(self, Importer::None)
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Importer::Async(_))
    }
}

impl<T> std::fmt::Debug for Importer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Importer::None => "None",
            Importer::Sync(_) => "Sync",
            Importer::Async(_) => "Async",
        };
        write!(f, "Importer::{kind}")
    }
}

#[cfg(feature = "mpi")]
pub mod mpi_import;
#[cfg(feature = "mpi")]
pub use mpi_import::MpiHaloImporter;
