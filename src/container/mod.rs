//! The block-tridiagonal preconditioner container.
//!
//! Thin façade over the pipeline: the Partition Builder runs at
//! construction, the symbolic phase at `initialize`, the numeric phase at
//! every `compute`, and the sweep driver in `apply_inverse_jacobi`
//! (see `apply`). The container owns the factored values, the halo staging
//! buffer, and the norm manager; calls on one instance must be serialized by
//! the caller.

pub mod apply;

use std::sync::Arc;

use crate::config::{ComputeParameters, ContainerOptions};
use crate::core::traits::BlockShape;
use crate::error::TriDiError;
use crate::halo::Importer;
use crate::matrix::{BlockCsrMatrix, BlockMultiVector};
use crate::parallel::{Comm, SerialComm};
use crate::partition::{PartInterface, create_part_interface};
use crate::tridiag::{AmD, BlockTridiags, perform_numeric_phase, perform_symbolic_phase};
use crate::utils::NormManager;
use num_traits::Float;

pub struct BlockTriDiContainer<T, C = SerialComm> {
    a: Arc<BlockCsrMatrix<T>>,
    comm: C,
    importer: Importer<T>,
    options: ContainerOptions,
    overlap_communication_and_computation: bool,
    damping_factor: T,
    part_interface: PartInterface,
    tridiags: BlockTridiags<T>,
    a_minus_d: AmD<T>,
    work: Vec<T>,
    work_z: Option<BlockMultiVector<T>>,
    norm_manager: NormManager<T>,
    is_initialized: bool,
    is_computed: bool,
}

impl<T: Float + Send + Sync, C: Comm> BlockTriDiContainer<T, C> {
    /// Construct with a default importer choice: matrices without ghost
    /// columns need none; anything else must come through `with_importer`
    /// with a transport from the import service.
    pub fn new(
        a: Arc<BlockCsrMatrix<T>>,
        partitions: &[Vec<usize>],
        options: ContainerOptions,
        damping_factor: T,
        comm: C,
    ) -> Result<Self, TriDiError> {
        if a.has_halo() {
            return Err(TriDiError::Config(
                "matrix has ghost columns; construct the container with with_importer \
                 and a halo transport"
                    .into(),
            ));
        }
        Self::init_internal(a, partitions, Importer::None, options, damping_factor, comm)
    }

    /// Construct with a caller-supplied importer. Exactly one of the
    /// synchronous/asynchronous kinds is wired in; `Importer::None` is only
    /// valid when the matrix has no ghost columns.
    pub fn with_importer(
        a: Arc<BlockCsrMatrix<T>>,
        partitions: &[Vec<usize>],
        importer: Importer<T>,
        damping_factor: T,
        comm: C,
    ) -> Result<Self, TriDiError> {
        if a.has_halo() && importer.is_none() {
            return Err(TriDiError::Config(
                "matrix has ghost columns but no importer was supplied".into(),
            ));
        }
        let options = match &importer {
            Importer::Sync(_) => ContainerOptions::USE_SEQ_METHOD,
            _ => ContainerOptions::empty(),
        };
        Self::init_internal(a, partitions, importer, options, damping_factor, comm)
    }

    fn init_internal(
        a: Arc<BlockCsrMatrix<T>>,
        partitions: &[Vec<usize>],
        importer: Importer<T>,
        options: ContainerOptions,
        damping_factor: T,
        comm: C,
    ) -> Result<Self, TriDiError> {
        let part_interface = create_part_interface(a.as_ref(), partitions)?;
        Ok(Self {
            a,
            comm,
            importer,
            options,
            // overlap is a validated-later capability; the public entry point
            // forces it off regardless of construction flags
            overlap_communication_and_computation: false,
            damping_factor,
            part_interface,
            tridiags: BlockTridiags::default(),
            a_minus_d: AmD::default(),
            work: Vec::new(),
            work_z: None,
            norm_manager: NormManager::new(),
            is_initialized: false,
            is_computed: false,
        })
    }

    /// Symbolic phase: build the tridiagonal and A-minus-D structures.
    /// Idempotent, but always resets the computed state.
    pub fn initialize(&mut self) {
        let (tridiags, a_minus_d) = perform_symbolic_phase(self.a.as_ref(), &self.part_interface);
        self.tridiags = tridiags;
        self.a_minus_d = a_minus_d;
        self.is_initialized = true;
        self.is_computed = false;
    }

    /// Numeric phase with default parameters.
    pub fn compute(&mut self) -> Result<(), TriDiError> {
        self.compute_with(&ComputeParameters::default())
    }

    /// Numeric phase: re-extract values and factor every line. Invokes
    /// `initialize` first if needed.
    pub fn compute_with(&mut self, params: &ComputeParameters<T>) -> Result<(), TriDiError> {
        self.is_computed = false;
        if !self.is_initialized {
            self.initialize();
        }
        perform_numeric_phase(
            self.a.as_ref(),
            &mut self.tridiags,
            &mut self.a_minus_d,
            params.add_radially_to_diagonal,
        )?;
        self.is_computed = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_computed(&self) -> bool {
        self.is_computed
    }

    /// Release all structure, value, halo, and norm storage and reset the
    /// status flags. The matrix handle and importer are retained, so
    /// `initialize`/`compute` rebuild the container from scratch.
    pub fn clear_blocks(&mut self) {
        self.tridiags = BlockTridiags::default();
        self.a_minus_d = AmD::default();
        self.work = Vec::new();
        self.work_z = None;
        self.norm_manager = NormManager::new();
        self.is_initialized = false;
        self.is_computed = false;
    }

    /// Opt into overlapping the asynchronous halo exchange with interior
    /// computation. Restricted feature pending validation: construction
    /// always starts with overlap disabled, and the setting only has an
    /// effect when an asynchronous importer is wired in.
    pub fn set_overlap_communication(&mut self, enable: bool) {
        self.overlap_communication_and_computation = enable;
    }

    pub fn overlap_communication(&self) -> bool {
        self.overlap_communication_and_computation
    }

    pub fn damping_factor(&self) -> T {
        self.damping_factor
    }

    /// Per-RHS norms at the first checked sweep of the last apply.
    pub fn norms0(&self) -> &[T] {
        self.norm_manager.norms0()
    }

    /// Per-RHS norms at the last checked sweep of the last apply.
    pub fn norms_final(&self) -> &[T] {
        self.norm_manager.norms_final()
    }

    pub fn matrix(&self) -> &Arc<BlockCsrMatrix<T>> {
        &self.a
    }

    pub fn part_interface(&self) -> &PartInterface {
        &self.part_interface
    }

    pub fn tridiags(&self) -> &BlockTridiags<T> {
        &self.tridiags
    }

    pub fn a_minus_d(&self) -> &AmD<T> {
        &self.a_minus_d
    }

    /// Legacy single-vector interface; not provided by this container.
    pub fn apply(
        &self,
        _x: &BlockMultiVector<T>,
        _y: &mut BlockMultiVector<T>,
    ) -> Result<(), TriDiError> {
        Err(TriDiError::Unsupported(
            "BlockTriDiContainer::apply is not implemented; use the sweep-based \
             apply_inverse_jacobi interface",
        ))
    }

    /// Legacy weighted interface; not provided by this container.
    pub fn weighted_apply(
        &self,
        _x: &BlockMultiVector<T>,
        _y: &mut BlockMultiVector<T>,
        _d: &BlockMultiVector<T>,
    ) -> Result<(), TriDiError> {
        Err(TriDiError::Unsupported(
            "BlockTriDiContainer::weighted_apply is not implemented; use the \
             sweep-based apply_inverse_jacobi interface",
        ))
    }

    pub fn name() -> &'static str {
        "BlockTriDi"
    }

    /// One-line status string.
    pub fn description(&self) -> String {
        let status = match (self.is_initialized, self.is_computed) {
            (true, true) => "initialized, computed",
            (true, false) => "initialized, not computed",
            _ => "not initialized, not computed",
        };
        format!("BlockTriDiContainer{{status = {status}}}")
    }

    /// Multi-line status report.
    pub fn describe(&self, verbose: bool) -> String {
        if !verbose {
            return self.description();
        }
        let mut out = String::new();
        out.push_str(&"=".repeat(80));
        out.push_str("\nblocktridi::BlockTriDiContainer\n");
        out.push_str(&format!(
            "Number of parts         = {}\n",
            self.part_interface.num_parts()
        ));
        out.push_str(&format!(
            "Number of lines         = {}\n",
            self.part_interface.num_lines()
        ));
        out.push_str(&format!("Block size              = {}\n", self.a.block_size()));
        out.push_str(&format!("Options                 = {:?}\n", self.options));
        out.push_str(&format!("Importer                = {:?}\n", self.importer));
        out.push_str(&format!("is_initialized()        = {}\n", self.is_initialized));
        out.push_str(&format!("is_computed()           = {}\n", self.is_computed));
        out.push_str(&"=".repeat(80));
        out.push('\n');
        out
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }
}

impl<T: Float + Send + Sync, C: Comm> std::fmt::Display for BlockTriDiContainer<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
