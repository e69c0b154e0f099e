use ndarray::{ArrayView2, ShapeError};

use crate::backend::{check_operands, MatmulBackend};
use crate::error::{MatmulError, Result};

/// Comparison backend built on `ndarray`'s `dot`.
///
/// Treated as an opaque high-level library call; the only work done here is
/// wrapping the operand slices as 2-D views and copying the product out in
/// row-major order.
#[derive(Debug, Clone)]
pub struct NdarrayBackend;

impl NdarrayBackend {
    pub const NAME: &'static str = "external-tensor-lib";

    pub fn new() -> Self {
        NdarrayBackend
    }

    fn failure(err: ShapeError) -> MatmulError {
        MatmulError::MultiplyFailure {
            backend: Self::NAME.to_string(),
            reason: err.to_string(),
        }
    }
}

impl Default for NdarrayBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MatmulBackend for NdarrayBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn gemm(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        check_operands(Self::NAME, a, b, m, k, n)?;
        let a = ArrayView2::from_shape((m, k), a).map_err(Self::failure)?;
        let b = ArrayView2::from_shape((k, n), b).map_err(Self::failure)?;

        let c = a.dot(&b);
        if c.is_standard_layout() {
            Ok(c.into_raw_vec())
        } else {
            Ok(c.iter().copied().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixBuffer;
    use crate::reference::ReferenceBackend;
    use crate::shape::Shape;

    #[test]
    fn test_multiply_2x2() {
        let a = MatrixBuffer::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        let b = MatrixBuffer::from_rows(&[&[5.0, 6.0], &[7.0, 8.0]]).unwrap();
        let c = NdarrayBackend::new().multiply(&a, &b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matches_reference_rectangular() {
        let (m, k, n) = (3, 7, 5);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 11) as f32 * 0.25).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 7) as f32 * 0.5 - 1.0).collect();
        let a = MatrixBuffer::new(m, k, a).unwrap();
        let b = MatrixBuffer::new(k, n, b).unwrap();

        let expected = ReferenceBackend::new().multiply(&a, &b).unwrap();
        let got = NdarrayBackend::new().multiply(&a, &b).unwrap();
        assert_eq!(got.shape(), expected.shape());
        assert!(got.max_relative_diff(&expected).unwrap() <= 1e-3);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = MatrixBuffer::zeros(Shape::new(3, 5).unwrap());
        let b = MatrixBuffer::zeros(Shape::new(4, 6).unwrap());
        match NdarrayBackend::new().multiply(&a, &b) {
            Err(MatmulError::DimensionMismatch { lhs, rhs }) => {
                assert_eq!(lhs, a.shape());
                assert_eq!(rhs, b.shape());
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(NdarrayBackend::new().gemm(&[1.0; 3], &[1.0; 4], 2, 2, 2).is_err());
    }
}
