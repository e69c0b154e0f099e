//! Backend selection by stable name and one-time initialisation.

use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use mb_tensor::{MatmulBackend, MatmulError, NdarrayBackend, ReferenceBackend, VendorConfig};
use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// The built-in backends, identified by stable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    Vendor,
    Reference,
    ExternalTensorLib,
}

impl BackendId {
    pub const ALL: [BackendId; 3] = [
        BackendId::Vendor,
        BackendId::Reference,
        BackendId::ExternalTensorLib,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendId::Vendor => "vendor",
            BackendId::Reference => "reference",
            BackendId::ExternalTensorLib => "external-tensor-lib",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BackendId::Vendor => "runtime-loaded vendor BLAS cblas_sgemm",
            BackendId::Reference => "naive triple loop (correctness oracle)",
            BackendId::ExternalTensorLib => "ndarray dot product",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendId {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| BenchError::UnknownBackend(s.to_string()))
    }
}

/// Initialisation outcome of one configured backend.
#[derive(Debug)]
pub enum BackendState {
    Ready(Box<dyn MatmulBackend>),
    Unavailable(MatmulError),
}

#[derive(Debug)]
pub struct BackendEntry {
    pub name: String,
    pub state: BackendState,
}

impl BackendEntry {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, BackendState::Ready(_))
    }
}

/// Backends in report order, each initialised exactly once.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    entries: Vec<BackendEntry>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise every backend in `ids`, in order. Failures are recorded as
    /// unavailable entries instead of aborting; duplicates keep the first
    /// occurrence.
    pub fn initialise(ids: &[BackendId], vendor: &VendorConfig) -> Self {
        let mut registry = Self::new();
        for &id in ids {
            if registry.contains(id.name()) {
                continue;
            }
            match create(id, vendor) {
                Ok(backend) => {
                    info!("backend '{}' ready", id);
                    registry.push(id.name(), BackendState::Ready(backend));
                }
                Err(e) => {
                    warn!("backend '{}' skipped: {}", id, e);
                    registry.push(id.name(), BackendState::Unavailable(e));
                }
            }
        }
        registry
    }

    /// Add an already constructed backend under its own name.
    pub fn with_backend(mut self, backend: Box<dyn MatmulBackend>) -> Self {
        let name = backend.name().to_string();
        if !self.contains(&name) {
            self.push(&name, BackendState::Ready(backend));
        }
        self
    }

    fn push(&mut self, name: &str, state: BackendState) {
        self.entries.push(BackendEntry {
            name: name.to_string(),
            state,
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entries(&self) -> &[BackendEntry] {
        &self.entries
    }

    pub fn ready_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ready()).count()
    }

    /// True when no configured backend initialised.
    pub fn all_unavailable(&self) -> bool {
        self.ready_count() == 0
    }
}

fn create(id: BackendId, vendor: &VendorConfig) -> mb_tensor::Result<Box<dyn MatmulBackend>> {
    match id {
        BackendId::Vendor => create_vendor(vendor),
        BackendId::Reference => Ok(Box::new(ReferenceBackend::new())),
        BackendId::ExternalTensorLib => Ok(Box::new(NdarrayBackend::new())),
    }
}

#[cfg(feature = "vendor")]
fn create_vendor(config: &VendorConfig) -> mb_tensor::Result<Box<dyn MatmulBackend>> {
    info!("loading vendor library from {}", config.library_path().display());
    let backend = mb_tensor::VendorBlasBackend::load(config)?;
    info!(
        "vendor library loaded from {} (plain loop up to {} per dimension)",
        backend.library_path().display(),
        backend.small_threshold()
    );
    Ok(Box::new(backend))
}

#[cfg(not(feature = "vendor"))]
fn create_vendor(_config: &VendorConfig) -> mb_tensor::Result<Box<dyn MatmulBackend>> {
    Err(MatmulError::BackendUnavailable {
        backend: BackendId::Vendor.name().to_string(),
        reason: "built without the `vendor` feature".to_string(),
    })
}
