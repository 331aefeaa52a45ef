use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatmulError {
    #[error("1D to 3D arrays only (got ranks {rank_a} and {rank_b})")]
    RankOutOfRange { rank_a: usize, rank_b: usize },
    #[error("size mismatch: inner dimension {a} vs {b}")]
    SizeMismatch { a: usize, b: usize },
    #[error("batch size mismatch at axis {axis}: {a} vs {b}")]
    BatchSizeMismatch { axis: usize, a: usize, b: usize },
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: String, got: String },
    #[error("shape {shape:?} has more elements than fit in memory")]
    ShapeOverflow { shape: Vec<usize> },
    #[error("buffer length mismatch: expected {expected} elements, got {got}")]
    BufferLength { expected: usize, got: usize },
    #[error("invalid dispatch config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MatmulError>;
