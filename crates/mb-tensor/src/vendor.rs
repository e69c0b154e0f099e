//! Vendor BLAS backend.
//!
//! The vendor library (Intel MKL's single dynamic library by default, or any
//! library exporting a CBLAS `cblas_sgemm`) is loaded at runtime from an
//! explicitly configured location. A missing library or symbol surfaces once,
//! as `BackendUnavailable`, when the backend is constructed.
//!
//! Thread count and blocking inside the vendor call are controlled by the
//! vendor's own environment (e.g. `MKL_NUM_THREADS`), not by this crate.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[cfg(feature = "vendor")]
pub use blas::VendorBlasBackend;

/// Default installation root, matching the oneAPI layout.
pub const DEFAULT_VENDOR_ROOT: &str = "/opt/intel/oneapi/mkl/latest";

/// Below this size in every dimension the plain loop beats the vendor
/// call's dispatch overhead.
pub const DEFAULT_SMALL_THRESHOLD: usize = 32;

/// Startup configuration for locating the vendor library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Installation root of the vendor library.
    pub root: PathBuf,
    /// Directory under `root` holding the shared object.
    pub lib_subdir: PathBuf,
    /// File name of the shared object.
    pub library: String,
    /// Use the naive loop when M, N and K are all at most this value.
    pub small_threshold: usize,
    /// Also try loading `library` by bare name through the system search path.
    pub system_search: bool,
}

impl Default for VendorConfig {
    fn default() -> Self {
        VendorConfig {
            root: PathBuf::from(DEFAULT_VENDOR_ROOT),
            lib_subdir: PathBuf::from("lib").join("intel64"),
            library: format!("{}mkl_rt{}", DLL_PREFIX, DLL_SUFFIX),
            small_threshold: DEFAULT_SMALL_THRESHOLD,
            system_search: false,
        }
    }
}

impl VendorConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        VendorConfig {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Full path of the shared object to load.
    pub fn library_path(&self) -> PathBuf {
        self.root.join(&self.lib_subdir).join(&self.library)
    }
}

#[cfg(feature = "vendor")]
mod blas {
    use std::fmt;
    use std::os::raw::c_int;
    use std::path::{Path, PathBuf};

    use libloading::Library;

    use super::VendorConfig;
    use crate::backend::{alloc_output, check_operands, MatmulBackend};
    use crate::error::{MatmulError, Result};
    use crate::reference::naive_gemm;

    const CBLAS_ROW_MAJOR: c_int = 101;
    const CBLAS_NO_TRANS: c_int = 111;

    type CblasSgemm = unsafe extern "C" fn(
        layout: c_int,
        trans_a: c_int,
        trans_b: c_int,
        m: c_int,
        n: c_int,
        k: c_int,
        alpha: f32,
        a: *const f32,
        lda: c_int,
        b: *const f32,
        ldb: c_int,
        beta: f32,
        c: *mut f32,
        ldc: c_int,
    );

    /// Backend delegating to a runtime-loaded CBLAS `sgemm`.
    ///
    /// The call may run multi-threaded inside the vendor library. The library
    /// stays loaded for as long as the backend lives.
    pub struct VendorBlasBackend {
        sgemm: CblasSgemm,
        small_threshold: usize,
        path: PathBuf,
        _library: Library,
    }

    impl VendorBlasBackend {
        pub const NAME: &'static str = "vendor";

        /// Load the vendor library described by `config` and resolve
        /// `cblas_sgemm`.
        ///
        /// # Errors
        /// Returns `MatmulError::BackendUnavailable` if the library cannot be
        /// loaded or does not export the symbol.
        pub fn load(config: &VendorConfig) -> Result<Self> {
            let primary = config.library_path();
            let (library, path) = match open(&primary) {
                Ok(lib) => (lib, primary),
                Err(first) if config.system_search => {
                    let bare = PathBuf::from(&config.library);
                    match open(&bare) {
                        Ok(lib) => (lib, bare),
                        Err(second) => {
                            return Err(unavailable(format!(
                                "{}: {}; system search for {}: {}",
                                primary.display(),
                                first,
                                config.library,
                                second
                            )))
                        }
                    }
                }
                Err(e) => {
                    return Err(unavailable(format!("{}: {}", primary.display(), e)));
                }
            };

            // SAFETY: the symbol is declared with the standard CBLAS signature;
            // the fn pointer is only used while `library` is kept alive.
            let sgemm = unsafe { library.get::<CblasSgemm>(b"cblas_sgemm\0") }
                .map(|sym| *sym)
                .map_err(|e| {
                    unavailable(format!("{}: missing cblas_sgemm: {}", path.display(), e))
                })?;

            Ok(VendorBlasBackend {
                sgemm,
                small_threshold: config.small_threshold,
                path,
                _library: library,
            })
        }

        /// Path the library was loaded from.
        pub fn library_path(&self) -> &Path {
            &self.path
        }

        pub fn small_threshold(&self) -> usize {
            self.small_threshold
        }
    }

    impl fmt::Debug for VendorBlasBackend {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("VendorBlasBackend")
                .field("path", &self.path)
                .field("small_threshold", &self.small_threshold)
                .finish_non_exhaustive()
        }
    }

    fn open(path: &Path) -> std::result::Result<Library, libloading::Error> {
        // SAFETY: loading runs the library's initialisers; the vendor library
        // is trusted configuration supplied at startup.
        unsafe { Library::new(path) }
    }

    fn unavailable(reason: String) -> MatmulError {
        MatmulError::BackendUnavailable {
            backend: VendorBlasBackend::NAME.to_string(),
            reason,
        }
    }

    fn blas_int(value: usize) -> Result<c_int> {
        c_int::try_from(value).map_err(|_| MatmulError::MultiplyFailure {
            backend: VendorBlasBackend::NAME.to_string(),
            reason: format!("dimension {} exceeds the BLAS integer range", value),
        })
    }

    impl MatmulBackend for VendorBlasBackend {
        fn name(&self) -> &str {
            Self::NAME
        }

        fn gemm(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
            check_operands(Self::NAME, a, b, m, k, n)?;
            let mut c = alloc_output(Self::NAME, m * n)?;

            let t = self.small_threshold;
            if m <= t && n <= t && k <= t {
                naive_gemm(a, b, &mut c, m, k, n);
                return Ok(c);
            }

            let (mi, ki, ni) = (blas_int(m)?, blas_int(k)?, blas_int(n)?);
            // SAFETY: a is m*k, b is k*n and c is m*n, all row-major and
            // checked above; lda/ldb/ldc are the row lengths.
            unsafe {
                (self.sgemm)(
                    CBLAS_ROW_MAJOR,
                    CBLAS_NO_TRANS,
                    CBLAS_NO_TRANS,
                    mi,
                    ni,
                    ki,
                    1.0,
                    a.as_ptr(),
                    ki,
                    b.as_ptr(),
                    ni,
                    0.0,
                    c.as_mut_ptr(),
                    ni,
                );
            }
            Ok(c)
        }
    }
}
