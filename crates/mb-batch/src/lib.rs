//! `mb-batch` - Random matrix-pair batches for matmul-bench.

pub mod generator;
pub mod spec;

pub use generator::{BatchGenerator, BatchIter, MatrixPair};
pub use spec::BatchSpec;
