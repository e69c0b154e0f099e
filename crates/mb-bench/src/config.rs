use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use mb_batch::BatchSpec;
use mb_tensor::VendorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::registry::BackendId;
use crate::report::ReportFormat;

/// One benchmark phase: a labelled batch shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    #[serde(default)]
    pub label: String,
    pub batch_size: usize,
    pub m: usize,
    pub k: usize,
    pub n: usize,
}

impl PhaseConfig {
    pub fn new(label: impl Into<String>, batch_size: usize, m: usize, k: usize, n: usize) -> Self {
        PhaseConfig {
            label: label.into(),
            batch_size,
            m,
            k,
            n,
        }
    }

    /// Validated batch spec for this phase.
    pub fn spec(&self) -> BenchResult<BatchSpec> {
        Ok(BatchSpec::new(self.batch_size, self.m, self.k, self.n)?)
    }

    /// The configured label, or one derived from the shape when empty.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            format!("matrix {}x{} @ {}x{}", self.m, self.k, self.k, self.n)
        } else {
            self.label.clone()
        }
    }
}

/// Complete benchmark configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Backends to run, in report order.
    pub backends: Vec<BackendId>,
    /// Phases to run, in order.
    pub phases: Vec<PhaseConfig>,
    /// When set, phase `i` is generated with seed `seed + i`.
    pub seed: Option<u64>,
    pub vendor: VendorConfig,
    pub format: ReportFormat,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            backends: vec![BackendId::Vendor, BackendId::ExternalTensorLib],
            phases: Self::default_phases(),
            seed: None,
            vendor: VendorConfig::default(),
            format: ReportFormat::Text,
        }
    }
}

impl BenchConfig {
    /// A large, memory-bound phase followed by a small, dispatch-bound one.
    pub fn default_phases() -> Vec<PhaseConfig> {
        vec![
            PhaseConfig::new("large matrix: 8164*2048", 10, 8164, 8164, 2048),
            PhaseConfig::new("smaller matrix: 128*256", 10, 128, 256, 256),
        ]
    }

    /// Load a JSON config file. Fields missing from the file keep their
    /// defaults; a missing file falls back to the defaults entirely.
    pub fn load(path: &Path) -> BenchResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!("loading config from {}", path.display());
                serde_json::from_str(&content).map_err(|source| BenchError::Config {
                    path: path.display().to_string(),
                    source,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "config file '{}' not found, using default configuration",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(BenchError::Io(e)),
        }
    }

    /// Point the vendor backend at a different installation root.
    pub fn with_vendor_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.vendor.root = root.into();
        self
    }

    /// Seed used for phase `index`, if seeding is enabled.
    pub fn phase_seed(&self, index: usize) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(index as u64))
    }

    /// Check that there is something to run and every phase is well formed.
    pub fn validate(&self) -> BenchResult<()> {
        if self.backends.is_empty() {
            return Err(BenchError::InvalidArgument(
                "no backends configured".to_string(),
            ));
        }
        if self.phases.is_empty() {
            return Err(BenchError::InvalidArgument(
                "no phases configured".to_string(),
            ));
        }
        for phase in &self.phases {
            phase.spec()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(
            config.backends,
            vec![BackendId::Vendor, BackendId::ExternalTensorLib]
        );
        assert_eq!(config.phases.len(), 2);
        assert_eq!(config.phases[1].m, 128);
        assert!(config.seed.is_none());
        assert_eq!(config.format, ReportFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "backends": ["reference", "external-tensor-lib"],
                "phases": [{{"batch_size": 2, "m": 4, "k": 4, "n": 4}}],
                "seed": 9,
                "vendor": {{"root": "/opt/openblas", "library": "libopenblas.so"}}
            }}"#
        )
        .unwrap();

        let config = BenchConfig::load(file.path()).unwrap();
        assert_eq!(
            config.backends,
            vec![BackendId::Reference, BackendId::ExternalTensorLib]
        );
        assert_eq!(config.phases, vec![PhaseConfig::new("", 2, 4, 4, 4)]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.vendor.root, PathBuf::from("/opt/openblas"));
        assert_eq!(config.vendor.library, "libopenblas.so");
        assert_eq!(config.vendor.small_threshold, 32);
        assert_eq!(config.format, ReportFormat::Text);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            BenchConfig::load(file.path()),
            Err(BenchError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_phase() {
        let config = BenchConfig {
            phases: vec![PhaseConfig::new("bad", 0, 4, 4, 4)],
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BenchConfig {
            backends: vec![],
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_phase_seed_and_label() {
        let config = BenchConfig {
            seed: Some(100),
            ..BenchConfig::default()
        };
        assert_eq!(config.phase_seed(2), Some(102));
        assert_eq!(PhaseConfig::new("", 1, 2, 3, 4).display_label(), "matrix 2x3 @ 3x4");
    }

    #[test]
    fn test_with_vendor_root() {
        let config = BenchConfig::default().with_vendor_root("/tmp/mkl");
        assert_eq!(config.vendor.root, PathBuf::from("/tmp/mkl"));
    }
}
