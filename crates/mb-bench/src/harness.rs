//! Core timing loop.

use std::borrow::Borrow;
use std::hint::black_box;
use std::time::Instant;

use log::debug;
use mb_batch::MatrixPair;
use mb_tensor::MatmulBackend;

use crate::error::{BenchError, BenchResult};
use crate::measurement::Measurement;

/// Times one backend over one batch.
///
/// Pairs are multiplied strictly in order, one isolated `multiply` call per
/// pair, with a timestamp taken immediately before and after each call. No
/// warm-up, pinning, or outlier rejection is applied; callers wanting those
/// layer them on top of the raw `Measurement`.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkHarness;

impl BenchmarkHarness {
    pub fn new() -> Self {
        BenchmarkHarness
    }

    /// Run `backend` over every pair of `batch`.
    ///
    /// Accepts a materialised batch (`&[MatrixPair]`) or a lazy one
    /// (`BatchGenerator::pairs`).
    ///
    /// # Errors
    /// Any multiply failure aborts the whole run with
    /// `BenchError::PairFailed` carrying the index of the failing pair; no
    /// partial measurement is returned. An empty batch is rejected.
    pub fn run<I>(&self, backend: &dyn MatmulBackend, batch: I) -> BenchResult<Measurement>
    where
        I: IntoIterator,
        I::Item: Borrow<MatrixPair>,
    {
        let mut durations = Vec::new();

        for (index, pair) in batch.into_iter().enumerate() {
            let pair = pair.borrow();

            let start = Instant::now();
            let result = backend.multiply(&pair.lhs, &pair.rhs);
            let elapsed = start.elapsed();

            let product = result.map_err(|source| BenchError::PairFailed {
                backend: backend.name().to_string(),
                index,
                source,
            })?;
            black_box(&product);

            debug!("{} pair {}: {:?}", backend.name(), index, elapsed);
            durations.push(elapsed);
        }

        if durations.is_empty() {
            return Err(BenchError::InvalidArgument(format!(
                "empty batch for backend '{}'",
                backend.name()
            )));
        }

        Ok(Measurement::new(backend.name(), durations))
    }
}
