//! Final outcome types of one analysis

use crate::diagnostics::DiagnosticsRow;
use crate::plot::PlotData;
use serde::Serialize;
use ssd_confidence::ConfidenceInterval;
use ssd_core::{AnalysisMode, Error, Warning};
use std::fmt;
use thiserror::Error as ThisError;

/// How many bootstrap iterations were requested and how many were usable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapSummary {
    pub requested: usize,
    pub successes: usize,
}

impl BootstrapSummary {
    pub fn discarded(&self) -> usize {
        self.requested - self.successes
    }
}

/// Successful analysis result
#[derive(Debug, Clone, Serialize)]
pub struct SsdReport {
    pub mode: AnalysisMode,
    pub protection_level: f64,
    /// Number of valid observations the distributions were fitted to
    pub sample_size: usize,
    /// Model-averaged (or single-model) hazard concentration
    pub hcp: f64,
    /// Two-sided bootstrap interval for `hcp`; `None` when unavailable
    pub hcp_interval: Option<ConfidenceInterval>,
    pub diagnostics: Vec<DiagnosticsRow>,
    pub plot: PlotData,
    pub bootstrap: BootstrapSummary,
    pub warnings: Vec<Warning>,
}

impl fmt::Display for SsdReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HC{} ({}): {:.4}",
            self.protection_level * 100.0,
            self.mode,
            self.hcp
        )?;
        if let Some(ci) = &self.hcp_interval {
            write!(
                f,
                " [{:.4}, {:.4}] at {:.0}%",
                ci.lower,
                ci.upper,
                ci.confidence_level * 100.0
            )?;
        }
        Ok(())
    }
}

/// Failed analysis: the error plus whatever warnings were raised before it
#[derive(Debug, ThisError)]
#[error("{error}")]
pub struct AnalysisFailure {
    #[source]
    pub error: Error,
    pub warnings: Vec<Warning>,
}

impl AnalysisFailure {
    pub fn new(error: Error, warnings: Vec<Warning>) -> Self {
        Self { error, warnings }
    }

    /// Human-readable reason
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl From<Error> for AnalysisFailure {
    fn from(error: Error) -> Self {
        Self::new(error, Vec::new())
    }
}
