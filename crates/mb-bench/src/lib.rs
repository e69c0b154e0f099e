//! `mb-bench` - Benchmark harness comparing matmul backends.
//!
//! This crate provides:
//! - `BenchmarkHarness`: per-call wall-clock timing of one backend over a batch
//! - `Measurement`: the raw timings and derived statistics of one run
//! - `BackendRegistry`: backend selection by stable name, initialised once
//! - `BenchConfig` / `CliArgs`: startup configuration from defaults, a JSON
//!   file, the environment, and command-line flags
//! - `Reporter`: text or JSON presentation of outcomes
//! - `BenchmarkSession`: the end-to-end run used by the `mb-bench` binary

pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod measurement;
pub mod registry;
pub mod report;
pub mod session;

pub use cli::CliArgs;
pub use config::{BenchConfig, PhaseConfig};
pub use error::{BenchError, BenchResult};
pub use harness::BenchmarkHarness;
pub use measurement::{Measurement, MeasurementSummary};
pub use registry::{BackendId, BackendRegistry, BackendState};
pub use report::{Outcome, PhaseReport, ReportFormat, Reporter};
pub use session::{BenchmarkSession, SessionSummary};
