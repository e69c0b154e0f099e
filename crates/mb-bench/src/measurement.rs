use std::time::Duration;

use serde::Serialize;

/// Raw per-call timings of one backend over one batch.
///
/// `durations[i]` is the wall-clock time of the multiply of pair `i`. Built
/// once by the harness and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    backend_name: String,
    durations: Vec<Duration>,
}

impl Measurement {
    pub fn new(backend_name: impl Into<String>, durations: Vec<Duration>) -> Self {
        Measurement {
            backend_name: backend_name.into(),
            durations,
        }
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Per-call durations in batch order.
    pub fn durations(&self) -> &[Duration] {
        &self.durations
    }

    /// Number of timed calls.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.durations.iter().sum()
    }

    /// Arithmetic mean of the per-call durations (zero for an empty run).
    pub fn average_duration(&self) -> Duration {
        if self.durations.is_empty() {
            return Duration::ZERO;
        }
        let nanos = self.total_duration().as_nanos() / self.durations.len() as u128;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Mean in seconds, computed in f64 without rounding to whole nanoseconds.
    pub fn average_secs(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        self.total_duration().as_secs_f64() / self.durations.len() as f64
    }

    pub fn min_duration(&self) -> Option<Duration> {
        self.durations.iter().min().copied()
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.durations.iter().max().copied()
    }

    /// Throughput in GFLOP/s for `[m x k] @ [k x n]` products, counting
    /// `2*m*k*n` operations per call. `None` if the average is zero.
    pub fn gflops(&self, m: usize, k: usize, n: usize) -> Option<f64> {
        let secs = self.average_secs();
        if secs <= 0.0 {
            return None;
        }
        Some(2.0 * m as f64 * k as f64 * n as f64 / secs / 1e9)
    }

    /// Serialisable view with durations in seconds.
    pub fn summary(&self) -> MeasurementSummary {
        let secs = |d: Duration| d.as_secs_f64();
        MeasurementSummary {
            backend: self.backend_name.clone(),
            calls: self.len(),
            average_secs: self.average_secs(),
            total_secs: secs(self.total_duration()),
            min_secs: self.min_duration().map(secs).unwrap_or(0.0),
            max_secs: self.max_duration().map(secs).unwrap_or(0.0),
            durations_secs: self.durations.iter().copied().map(secs).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSummary {
    pub backend: String,
    pub calls: usize,
    pub average_secs: f64,
    pub total_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
    pub durations_secs: Vec<f64>,
}
