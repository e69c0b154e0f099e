use thiserror::Error;

use crate::shape::Shape;

#[derive(Error, Debug)]
pub enum MatmulError {
    #[error("invalid shape: {0}")]
    Shape(String),
    #[error("matmul dimension mismatch: {lhs} @ {rhs}")]
    DimensionMismatch { lhs: Shape, rhs: Shape },
    #[error("index ({row}, {col}) out of bounds for {shape} matrix")]
    IndexOutOfBounds { row: usize, col: usize, shape: Shape },
    #[error("backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },
    #[error("backend '{backend}' multiply failed: {reason}")]
    MultiplyFailure { backend: String, reason: String },
}

pub type Result<T> = std::result::Result<T, MatmulError>;
