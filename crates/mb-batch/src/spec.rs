use mb_tensor::{MatmulError, Result, Shape};

/// Dimensions of one benchmark batch: `batch_size` pairs of
/// `[m x k] @ [k x n]` matrices.
///
/// The inner dimension is shared by construction, so every generated pair is
/// multipliable. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpec {
    batch_size: usize,
    lhs: Shape,
    rhs: Shape,
}

impl BatchSpec {
    /// Create a batch spec.
    ///
    /// # Errors
    /// Returns `MatmulError::Shape` if `batch_size < 1` or any of `m`, `k`,
    /// `n` is zero.
    pub fn new(batch_size: usize, m: usize, k: usize, n: usize) -> Result<Self> {
        if batch_size < 1 {
            return Err(MatmulError::Shape(format!(
                "batch size must be at least 1, got {}",
                batch_size
            )));
        }
        Ok(BatchSpec {
            batch_size,
            lhs: Shape::new(m, k)?,
            rhs: Shape::new(k, n)?,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn m(&self) -> usize {
        self.lhs.rows()
    }

    pub fn k(&self) -> usize {
        self.lhs.cols()
    }

    pub fn n(&self) -> usize {
        self.rhs.cols()
    }

    /// Shape of every left operand, `[m x k]`.
    pub fn lhs_shape(&self) -> Shape {
        self.lhs
    }

    /// Shape of every right operand, `[k x n]`.
    pub fn rhs_shape(&self) -> Shape {
        self.rhs
    }

    /// Shape of every product, `[m x n]`.
    pub fn output_shape(&self) -> Result<Shape> {
        Shape::matmul_output(&self.lhs, &self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let spec = BatchSpec::new(10, 128, 256, 64).unwrap();
        assert_eq!(spec.batch_size(), 10);
        assert_eq!((spec.m(), spec.k(), spec.n()), (128, 256, 64));
        assert_eq!(spec.lhs_shape(), Shape::new(128, 256).unwrap());
        assert_eq!(spec.rhs_shape(), Shape::new(256, 64).unwrap());
        assert_eq!(spec.output_shape().unwrap(), Shape::new(128, 64).unwrap());
    }

    #[test]
    fn test_rejects_empty_batch() {
        assert!(matches!(
            BatchSpec::new(0, 2, 2, 2),
            Err(MatmulError::Shape(_))
        ));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(BatchSpec::new(1, 0, 2, 2).is_err());
        assert!(BatchSpec::new(1, 2, 0, 2).is_err());
        assert!(BatchSpec::new(1, 2, 2, 0).is_err());
    }
}
