pub mod norms;

pub use norms::NormManager;
