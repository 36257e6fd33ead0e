use thiserror::Error;

// Unified error type for blocktridi

#[derive(Error, Debug)]
pub enum TriDiError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid partition: {0}")]
    InvalidPartition(String),
    #[error("zero pivot in part {part}, line {line}, block {block}, entry {entry}")]
    ZeroPivot {
        part: usize,
        line: usize,
        block: usize,
        entry: usize,
    },
    #[error("halo exchange error: {0}")]
    HaloExchange(String),
    #[error("container is not computed; call compute() before applying")]
    NotComputed,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
