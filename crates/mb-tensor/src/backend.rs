use std::fmt::Debug;

use crate::error::{MatmulError, Result};
use crate::matrix::MatrixBuffer;
use crate::shape::Shape;

/// Trait for interchangeable matrix-multiplication backends.
///
/// Implementors provide the raw kernel, [`MatmulBackend::gemm`], over
/// row-major slices. Callers go through [`MatmulBackend::multiply`], which
/// validates shapes before any computation starts and wraps the output in a
/// new `MatrixBuffer` owned by the caller.
pub trait MatmulBackend: Send + Sync + Debug {
    /// Returns the stable name of this backend (e.g., "vendor", "reference").
    fn name(&self) -> &str;

    /// Raw product kernel: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    ///
    /// Slice lengths have already been checked against the dimensions when
    /// called through `multiply`.
    fn gemm(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;

    /// Matrix product of two matrices.
    ///
    /// Fails with `DimensionMismatch` when `a.cols() != b.rows()`, without
    /// touching the kernel. Operands are never mutated.
    fn multiply(&self, a: &MatrixBuffer, b: &MatrixBuffer) -> Result<MatrixBuffer> {
        let out_shape = Shape::matmul_output(&a.shape(), &b.shape())?;
        let (m, k, n) = (a.rows(), a.cols(), b.cols());

        let data = self.gemm(a.as_slice(), b.as_slice(), m, k, n)?;
        if data.len() != out_shape.numel() {
            return Err(MatmulError::MultiplyFailure {
                backend: self.name().to_string(),
                reason: format!(
                    "kernel returned {} elements for a {} result",
                    data.len(),
                    out_shape
                ),
            });
        }
        MatrixBuffer::from_shape(out_shape, data)
    }
}

/// Allocates a zeroed output buffer, reporting allocation failure as a
/// `MultiplyFailure` instead of aborting.
pub(crate) fn alloc_output(backend: &str, len: usize) -> Result<Vec<f32>> {
    let mut c = Vec::new();
    c.try_reserve_exact(len)
        .map_err(|e| MatmulError::MultiplyFailure {
            backend: backend.to_string(),
            reason: format!("cannot allocate {} result elements: {}", len, e),
        })?;
    c.resize(len, 0.0);
    Ok(c)
}

/// Checks that raw operand slices match the `[m, k] @ [k, n]` dimensions.
pub(crate) fn check_operands(
    backend: &str,
    a: &[f32],
    b: &[f32],
    m: usize,
    k: usize,
    n: usize,
) -> Result<()> {
    if a.len() != m * k {
        return Err(MatmulError::MultiplyFailure {
            backend: backend.to_string(),
            reason: format!("a.len()={} but expected m*k={}", a.len(), m * k),
        });
    }
    if b.len() != k * n {
        return Err(MatmulError::MultiplyFailure {
            backend: backend.to_string(),
            reason: format!("b.len()={} but expected k*n={}", b.len(), k * n),
        });
    }
    Ok(())
}
