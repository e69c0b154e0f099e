use mb_tensor::MatmulError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("backend '{backend}' failed on pair {index}: {source}")]
    PairFailed {
        backend: String,
        index: usize,
        source: MatmulError,
    },
    #[error("invalid config file '{path}': {source}")]
    Config {
        path: String,
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Matmul(#[from] MatmulError),
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
