use crate::backend::{alloc_output, check_operands, MatmulBackend};
use crate::error::Result;

/// Pure-Rust reference backend.
///
/// A straightforward i-j-k triple loop accumulating in `f32`, single
/// threaded. Serves as the correctness oracle and the slow baseline.
#[derive(Debug, Clone)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    pub const NAME: &'static str = "reference";

    pub fn new() -> Self {
        ReferenceBackend
    }
}

impl Default for ReferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MatmulBackend for ReferenceBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn gemm(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        check_operands(Self::NAME, a, b, m, k, n)?;
        let mut c = alloc_output(Self::NAME, m * n)?;
        naive_gemm(a, b, &mut c, m, k, n);
        Ok(c)
    }
}

/// Naive row-major product written into `c`, which must hold `m * n` elements.
pub(crate) fn naive_gemm(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatmulError;
    use crate::matrix::MatrixBuffer;

    fn backend() -> ReferenceBackend {
        ReferenceBackend::new()
    }

    #[test]
    fn test_gemm_identity() {
        let b = backend();
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let c = b.gemm(&a, &x, 2, 2, 2).unwrap();
        assert_eq!(c, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_multiply_exact_2x2() {
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = MatrixBuffer::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        let x = MatrixBuffer::from_rows(&[&[5.0, 6.0], &[7.0, 8.0]]).unwrap();
        let c = backend().multiply(&a, &x).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_multiply_rectangular() {
        // [1x3] @ [3x2]
        let a = MatrixBuffer::new(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
        let x = MatrixBuffer::new(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let c = backend().multiply(&a, &x).unwrap();
        assert_eq!(c.rows(), 1);
        assert_eq!(c.cols(), 2);
        assert_eq!(c.as_slice(), &[4.0, 5.0]);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = MatrixBuffer::zeros(crate::Shape::new(3, 5).unwrap());
        let x = MatrixBuffer::zeros(crate::Shape::new(4, 6).unwrap());
        assert!(matches!(
            backend().multiply(&a, &x),
            Err(MatmulError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_gemm_length_mismatch() {
        let b = backend();
        assert!(b.gemm(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2, 2, 1).is_err());
    }

    #[test]
    fn test_operands_unchanged() {
        let a = MatrixBuffer::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        let x = a.clone();
        let _ = backend().multiply(&a, &x).unwrap();
        assert_eq!(a.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(x.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }
}
