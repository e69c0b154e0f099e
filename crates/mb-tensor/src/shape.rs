use crate::error::{MatmulError, Result};
use std::fmt;

/// The shape of a rank-2 matrix: `rows x cols`, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Create a new shape.
    ///
    /// # Errors
    /// Returns `MatmulError::Shape` if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MatmulError::Shape(format!(
                "dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        Ok(Shape { rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements (`rows * cols`).
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    /// Row-major offset of element `(row, col)`, or `None` when out of range.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Shape of `lhs @ rhs`.
    ///
    /// # Errors
    /// Returns `MatmulError::DimensionMismatch` naming both shapes when
    /// `lhs.cols != rhs.rows`.
    pub fn matmul_output(lhs: &Shape, rhs: &Shape) -> Result<Shape> {
        if lhs.cols != rhs.rows {
            return Err(MatmulError::DimensionMismatch {
                lhs: *lhs,
                rhs: *rhs,
            });
        }
        Ok(Shape {
            rows: lhs.rows,
            cols: rhs.cols,
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(3, 4).unwrap();
        assert_eq!(s.rows(), 3);
        assert_eq!(s.cols(), 4);
        assert_eq!(s.numel(), 12);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(Shape::new(0, 4), Err(MatmulError::Shape(_))));
        assert!(matches!(Shape::new(4, 0), Err(MatmulError::Shape(_))));
    }

    #[test]
    fn test_offset() {
        let s = Shape::new(2, 3).unwrap();
        assert_eq!(s.offset(0, 0), Some(0));
        assert_eq!(s.offset(1, 2), Some(5));
        assert_eq!(s.offset(2, 0), None);
        assert_eq!(s.offset(0, 3), None);
    }

    #[test]
    fn test_matmul_output() {
        let a = Shape::new(2, 3).unwrap();
        let b = Shape::new(3, 5).unwrap();
        let c = Shape::matmul_output(&a, &b).unwrap();
        assert_eq!(c, Shape::new(2, 5).unwrap());
    }

    #[test]
    fn test_matmul_output_mismatch() {
        let a = Shape::new(3, 5).unwrap();
        let b = Shape::new(4, 6).unwrap();
        match Shape::matmul_output(&a, &b) {
            Err(MatmulError::DimensionMismatch { lhs, rhs }) => {
                assert_eq!(lhs, a);
                assert_eq!(rhs, b);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(3, 5).unwrap().to_string(), "[3x5]");
    }
}
