//! `mb-tensor` - Dense matrices and pluggable matmul backends for matmul-bench.
//!
//! This crate provides:
//! - A `MatrixBuffer` type: row-major f32 storage with an explicit shape
//! - A `MatmulBackend` trait for interchangeable multiply implementations
//! - A `ReferenceBackend` (naive loop, correctness oracle)
//! - A `VendorBlasBackend` (runtime-loaded CBLAS `sgemm`, feature `vendor`)
//! - An `NdarrayBackend` (comparison against a high-level array library)

pub mod backend;
pub mod dtype;
pub mod error;
pub mod external;
pub mod matrix;
pub mod reference;
pub mod shape;
pub mod vendor;

// Re-export primary types at the crate root for convenience.
pub use backend::MatmulBackend;
pub use dtype::DType;
pub use error::{MatmulError, Result};
pub use external::NdarrayBackend;
pub use matrix::MatrixBuffer;
pub use reference::ReferenceBackend;
pub use shape::Shape;
#[cfg(feature = "vendor")]
pub use vendor::VendorBlasBackend;
pub use vendor::VendorConfig;
