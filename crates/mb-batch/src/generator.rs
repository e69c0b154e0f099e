use mb_tensor::MatrixBuffer;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::spec::BatchSpec;

/// One operand pair of a batch: `lhs` is `[m x k]`, `rhs` is `[k x n]`.
#[derive(Debug, Clone)]
pub struct MatrixPair {
    pub lhs: MatrixBuffer,
    pub rhs: MatrixBuffer,
}

/// Produces batches of random matrix pairs with entries drawn uniformly
/// from `[0, 1)`.
///
/// Without a seed every call to [`BatchGenerator::pairs`] draws from fresh
/// entropy, so repeated batches are independent. With a seed every call
/// replays the same values.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    spec: BatchSpec,
    seed: Option<u64>,
}

impl BatchGenerator {
    /// Create an unseeded generator.
    pub fn new(spec: BatchSpec) -> Self {
        Self { spec, seed: None }
    }

    /// Create a generator that reproduces the same batch on every call.
    pub fn seeded(spec: BatchSpec, seed: u64) -> Self {
        Self {
            spec,
            seed: Some(seed),
        }
    }

    pub fn spec(&self) -> &BatchSpec {
        &self.spec
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Lazily generate `batch_size` pairs. Each call restarts the sequence.
    pub fn pairs(&self) -> BatchIter {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        BatchIter {
            spec: self.spec,
            rng,
            dist: Uniform::new(0.0f32, 1.0f32),
            remaining: self.spec.batch_size(),
        }
    }

    /// Materialise a whole batch, so several backends can run on the same
    /// pairs.
    pub fn generate(&self) -> Vec<MatrixPair> {
        self.pairs().collect()
    }
}

/// Lazy, finite iterator over the pairs of one batch.
pub struct BatchIter {
    spec: BatchSpec,
    rng: StdRng,
    dist: Uniform<f32>,
    remaining: usize,
}

impl Iterator for BatchIter {
    type Item = MatrixPair;

    fn next(&mut self) -> Option<MatrixPair> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let (rng, dist) = (&mut self.rng, &self.dist);
        let lhs = MatrixBuffer::from_fn(self.spec.lhs_shape(), |_, _| dist.sample(&mut *rng));
        let rhs = MatrixBuffer::from_fn(self.spec.rhs_shape(), |_, _| dist.sample(&mut *rng));
        Some(MatrixPair { lhs, rhs })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BatchIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BatchSpec {
        BatchSpec::new(5, 3, 4, 2).unwrap()
    }

    #[test]
    fn test_batch_shapes() {
        let gen = BatchGenerator::new(spec());
        for _ in 0..2 {
            let batch = gen.generate();
            assert_eq!(batch.len(), 5);
            for pair in &batch {
                assert_eq!((pair.lhs.rows(), pair.lhs.cols()), (3, 4));
                assert_eq!((pair.rhs.rows(), pair.rhs.cols()), (4, 2));
            }
        }
    }

    #[test]
    fn test_values_in_unit_interval() {
        let gen = BatchGenerator::new(BatchSpec::new(3, 16, 16, 16).unwrap());
        for pair in gen.pairs() {
            for &v in pair.lhs.as_slice().iter().chain(pair.rhs.as_slice()) {
                assert!((0.0..1.0).contains(&v), "value {} outside [0, 1)", v);
            }
        }
    }

    #[test]
    fn test_lazy_iterator_length() {
        let gen = BatchGenerator::new(spec());
        let mut iter = gen.pairs();
        assert_eq!(iter.len(), 5);
        iter.next();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.count(), 4);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let gen = BatchGenerator::seeded(spec(), 42);
        let first = gen.generate();
        let second = gen.generate();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.lhs, b.lhs);
            assert_eq!(a.rhs, b.rhs);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = BatchGenerator::seeded(spec(), 1).generate();
        let b = BatchGenerator::seeded(spec(), 2).generate();
        assert_ne!(a[0].lhs, b[0].lhs);
    }

    #[test]
    fn test_unseeded_batches_are_independent() {
        let gen = BatchGenerator::new(BatchSpec::new(1, 8, 8, 8).unwrap());
        assert!(gen.seed().is_none());
        let a = gen.generate();
        let b = gen.generate();
        assert_ne!(a[0].lhs, b[0].lhs);
    }
}
