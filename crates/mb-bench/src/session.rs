//! End-to-end benchmark run: initialise backends once, then time every
//! ready backend on every phase.

use std::io::Write;

use log::{error, info, warn};
use mb_batch::BatchGenerator;
use mb_tensor::MatmulError;

use crate::config::BenchConfig;
use crate::error::BenchResult;
use crate::harness::BenchmarkHarness;
use crate::registry::{BackendRegistry, BackendState};
use crate::report::{reporter_for, BackendOutcome, Outcome, PhaseReport};

/// Outcomes of a whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub phases: Vec<PhaseReport>,
    /// True when every configured backend failed to initialise.
    pub all_unavailable: bool,
}

impl SessionSummary {
    /// Process exit code: non-zero only when no backend could be initialised.
    pub fn exit_code(&self) -> i32 {
        if self.all_unavailable {
            1
        } else {
            0
        }
    }
}

pub struct BenchmarkSession {
    config: BenchConfig,
    registry: BackendRegistry,
    harness: BenchmarkHarness,
}

impl BenchmarkSession {
    /// Validate `config` and initialise its backends.
    pub fn new(config: BenchConfig) -> BenchResult<Self> {
        config.validate()?;
        let registry = BackendRegistry::initialise(&config.backends, &config.vendor);
        Ok(Self::with_registry(config, registry))
    }

    /// Use an already initialised registry instead of `config.backends`.
    pub fn with_registry(config: BenchConfig, registry: BackendRegistry) -> Self {
        BenchmarkSession {
            config,
            registry,
            harness: BenchmarkHarness::new(),
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run every phase, writing the report to `out` as results arrive.
    ///
    /// A failed run is reported and the session moves on to the next
    /// backend; only configuration and I/O errors abort the session.
    pub fn run(&self, out: &mut dyn Write) -> BenchResult<SessionSummary> {
        let mut reporter = reporter_for(self.config.format);
        let mut phases = Vec::with_capacity(self.config.phases.len());

        if self.registry.all_unavailable() {
            warn!("no backend could be initialised; nothing will be timed");
        }

        for (index, phase) in self.config.phases.iter().enumerate() {
            let spec = phase.spec()?;
            let label = phase.display_label();
            reporter.begin_phase(out, &label, &spec)?;

            let batch = if self.registry.all_unavailable() {
                Vec::new()
            } else {
                info!(
                    "phase '{}': generating {} pairs of {} @ {} -> {}",
                    label,
                    spec.batch_size(),
                    spec.lhs_shape(),
                    spec.rhs_shape(),
                    spec.output_shape()?
                );
                let generator = match self.config.phase_seed(index) {
                    Some(seed) => BatchGenerator::seeded(spec, seed),
                    None => BatchGenerator::new(spec),
                };
                generator.generate()
            };

            let mut outcomes = Vec::with_capacity(self.registry.entries().len());
            for entry in self.registry.entries() {
                let outcome = match &entry.state {
                    BackendState::Ready(backend) => {
                        match self.harness.run(backend.as_ref(), &batch) {
                            Ok(measurement) => Outcome::Completed(measurement),
                            Err(e) => {
                                error!("phase '{}': {}", label, e);
                                Outcome::Failed(e.to_string())
                            }
                        }
                    }
                    BackendState::Unavailable(e) => Outcome::Unavailable(unavailable_reason(e)),
                };
                let outcome = BackendOutcome {
                    backend: entry.name.clone(),
                    outcome,
                };
                reporter.outcome(out, &outcome)?;
                outcomes.push(outcome);
            }

            reporter.end_phase(out)?;
            out.flush()?;
            phases.push(PhaseReport {
                label,
                spec,
                outcomes,
            });
        }

        Ok(SessionSummary {
            phases,
            all_unavailable: self.registry.all_unavailable(),
        })
    }
}

fn unavailable_reason(err: &MatmulError) -> String {
    match err {
        MatmulError::BackendUnavailable { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
