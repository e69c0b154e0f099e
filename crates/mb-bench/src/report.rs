//! Presentation of benchmark outcomes.
//!
//! The session hands structured outcomes to a `Reporter`; the text and JSON
//! renderings are interchangeable.

use std::io::{self, Write};

use mb_batch::BatchSpec;
use serde::{Deserialize, Serialize};

use crate::measurement::{Measurement, MeasurementSummary};

/// Width the backend name is padded to in text reports.
pub const NAME_WIDTH: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Result of one backend on one phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Measurement),
    Unavailable(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendOutcome {
    pub backend: String,
    pub outcome: Outcome,
}

/// All outcomes of one phase, in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub label: String,
    pub spec: BatchSpec,
    pub outcomes: Vec<BackendOutcome>,
}

impl PhaseReport {
    pub fn measurement(&self, backend: &str) -> Option<&Measurement> {
        self.outcomes
            .iter()
            .find(|o| o.backend == backend)
            .and_then(|o| match &o.outcome {
                Outcome::Completed(m) => Some(m),
                _ => None,
            })
    }
}

pub trait Reporter {
    fn begin_phase(&mut self, out: &mut dyn Write, label: &str, spec: &BatchSpec) -> io::Result<()>;

    fn outcome(&mut self, out: &mut dyn Write, outcome: &BackendOutcome) -> io::Result<()>;

    fn end_phase(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

pub fn reporter_for(format: ReportFormat) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Text => Box::new(TextReporter),
        ReportFormat::Json => Box::new(JsonReporter::default()),
    }
}

/// Formats a single text report line.
pub fn format_line(outcome: &BackendOutcome) -> String {
    let name = &outcome.backend;
    match &outcome.outcome {
        Outcome::Completed(m) => format!(
            "{:<width$}: {:.6} seconds per matmul (avg over {})",
            name,
            m.average_secs(),
            m.len(),
            width = NAME_WIDTH
        ),
        Outcome::Unavailable(reason) => {
            format!("{:<width$}: unavailable ({})", name, reason, width = NAME_WIDTH)
        }
        Outcome::Failed(reason) => {
            format!("{:<width$}: failed ({})", name, reason, width = NAME_WIDTH)
        }
    }
}

/// Line-per-backend text output, written as each outcome arrives.
#[derive(Debug, Default)]
pub struct TextReporter;

impl Reporter for TextReporter {
    fn begin_phase(&mut self, out: &mut dyn Write, label: &str, _spec: &BatchSpec) -> io::Result<()> {
        writeln!(out, "{}", label)
    }

    fn outcome(&mut self, out: &mut dyn Write, outcome: &BackendOutcome) -> io::Result<()> {
        writeln!(out, "{}", format_line(outcome))
    }

    fn end_phase(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum OutcomeRecord {
    Completed {
        measurement: MeasurementSummary,
        gflops: Option<f64>,
    },
    Unavailable { backend: String, reason: String },
    Failed { backend: String, reason: String },
}

#[derive(Debug, Serialize)]
struct PhaseRecord {
    label: String,
    batch_size: usize,
    m: usize,
    k: usize,
    n: usize,
    results: Vec<OutcomeRecord>,
}

/// One JSON document per phase, written when the phase ends.
#[derive(Debug, Default)]
pub struct JsonReporter {
    current: Option<PhaseRecord>,
}

impl Reporter for JsonReporter {
    fn begin_phase(&mut self, _out: &mut dyn Write, label: &str, spec: &BatchSpec) -> io::Result<()> {
        self.current = Some(PhaseRecord {
            label: label.to_string(),
            batch_size: spec.batch_size(),
            m: spec.m(),
            k: spec.k(),
            n: spec.n(),
            results: Vec::new(),
        });
        Ok(())
    }

    fn outcome(&mut self, _out: &mut dyn Write, outcome: &BackendOutcome) -> io::Result<()> {
        let phase = self.current.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "outcome reported outside a phase")
        })?;
        let record = match &outcome.outcome {
            Outcome::Completed(m) => OutcomeRecord::Completed {
                measurement: m.summary(),
                gflops: m.gflops(phase.m, phase.k, phase.n),
            },
            Outcome::Unavailable(reason) => OutcomeRecord::Unavailable {
                backend: outcome.backend.clone(),
                reason: reason.clone(),
            },
            Outcome::Failed(reason) => OutcomeRecord::Failed {
                backend: outcome.backend.clone(),
                reason: reason.clone(),
            },
        };
        phase.results.push(record);
        Ok(())
    }

    fn end_phase(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if let Some(phase) = self.current.take() {
            serde_json::to_writer(&mut *out, &phase)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
