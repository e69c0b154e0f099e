use std::ops::Index;

use crate::dtype::DType;
use crate::error::{MatmulError, Result};
use crate::shape::Shape;

/// A dense, row-major, single-precision matrix.
///
/// The backing store always holds exactly `rows * cols` elements. A buffer is
/// owned by whoever created it; backends only ever borrow their operands
/// immutably and hand back a freshly allocated result.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixBuffer {
    data: Vec<f32>,
    shape: Shape,
}

impl MatrixBuffer {
    /// Create a matrix from row-major data.
    ///
    /// # Errors
    /// Returns `MatmulError::Shape` if a dimension is zero or if
    /// `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let shape = Shape::new(rows, cols)?;
        Self::from_shape(shape, data)
    }

    /// Create a matrix from an already validated shape and row-major data.
    pub fn from_shape(shape: Shape, data: Vec<f32>) -> Result<Self> {
        if data.len() != shape.numel() {
            return Err(MatmulError::Shape(format!(
                "data length {} does not match shape {} (numel={})",
                data.len(),
                shape,
                shape.numel()
            )));
        }
        Ok(MatrixBuffer { data, shape })
    }

    /// Create a matrix from a slice of equally long rows.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(MatmulError::Shape(format!(
                "ragged rows: expected {} columns, found a row with {}",
                cols,
                bad.len()
            )));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(rows.len(), cols, data)
    }

    /// Create a matrix whose element `(row, col)` is `f(row, col)`, filled in
    /// row-major order.
    pub fn from_fn(shape: Shape, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(shape.numel());
        for row in 0..shape.rows() {
            for col in 0..shape.cols() {
                data.push(f(row, col));
            }
        }
        MatrixBuffer { data, shape }
    }

    /// Create a zero-filled matrix, used for backend outputs.
    pub fn zeros(shape: Shape) -> Self {
        MatrixBuffer {
            data: vec![0.0; shape.numel()],
            shape,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    pub fn dtype(&self) -> DType {
        DType::F32
    }

    /// Size of the backing store in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * self.dtype().size_in_bytes()
    }

    /// Read element `(row, col)`.
    ///
    /// # Errors
    /// Returns `MatmulError::IndexOutOfBounds` outside `[0,rows) x [0,cols)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.shape
            .offset(row, col)
            .map(|i| self.data[i])
            .ok_or(MatmulError::IndexOutOfBounds {
                row,
                col,
                shape: self.shape,
            })
    }

    /// Contiguous row-major view of the data, for backend interop.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the matrix, returning its row-major data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Largest element-wise relative difference between two equally shaped
    /// matrices, using `|a - b| / max(|a|, |b|)` (zero when both are zero).
    ///
    /// # Errors
    /// Returns `MatmulError::Shape` if the shapes differ.
    pub fn max_relative_diff(&self, other: &MatrixBuffer) -> Result<f32> {
        if self.shape != other.shape {
            return Err(MatmulError::Shape(format!(
                "cannot compare {} with {}",
                self.shape, other.shape
            )));
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| {
                let scale = a.abs().max(b.abs());
                if scale == 0.0 {
                    0.0
                } else {
                    (a - b).abs() / scale
                }
            })
            .fold(0.0f32, f32::max))
    }
}

impl Index<(usize, usize)> for MatrixBuffer {
    type Output = f32;

    /// # Panics
    /// Panics if `(row, col)` is out of bounds; use [`MatrixBuffer::get`]
    /// for a fallible read.
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        match self.shape.offset(row, col) {
            Some(i) => &self.data[i],
            None => panic!(
                "index ({}, {}) out of bounds for {} matrix",
                row, col, self.shape
            ),
        }
    }
}
