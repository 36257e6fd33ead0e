pub mod options;

pub use options::{ApplyParameters, ComputeParameters, ContainerOptions};
