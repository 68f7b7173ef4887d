//! Non-fatal conditions collected while an analysis runs.

use crate::types::DistributionFamily;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A condition worth reporting that does not stop the analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Non-positive or non-finite concentrations removed before fitting
    DroppedObservations { count: usize },
    /// A candidate failed to fit on the original data
    CandidateExcluded {
        family: DistributionFamily,
        reason: String,
    },
    /// A candidate fitted but its AICc is not finite
    NonFiniteAicc { family: DistributionFamily },
    /// Some bootstrap resamples produced no usable ensemble
    IterationsDiscarded { discarded: usize, requested: usize },
    /// The share of successful resamples fell below the threshold
    Unreliable {
        successes: usize,
        requested: usize,
        threshold: f64,
    },
    /// Too few successful resamples to form any interval
    IntervalsUnavailable { successes: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DroppedObservations { count } => {
                write!(f, "{count} non-positive or non-finite observations were dropped")
            }
            Warning::CandidateExcluded { family, reason } => {
                write!(f, "{family} excluded: {reason}")
            }
            Warning::NonFiniteAicc { family } => {
                write!(f, "{family} excluded: AICc is not finite")
            }
            Warning::IterationsDiscarded {
                discarded,
                requested,
            } => write!(
                f,
                "{discarded} of {requested} bootstrap iterations were discarded"
            ),
            Warning::Unreliable {
                successes,
                requested,
                threshold,
            } => write!(
                f,
                "Only {successes} of {requested} bootstrap iterations succeeded \
                 (below {:.0}%); confidence intervals may be unreliable",
                threshold * 100.0
            ),
            Warning::IntervalsUnavailable { successes } => write!(
                f,
                "Confidence intervals unavailable: only {successes} bootstrap iterations succeeded"
            ),
        }
    }
}

/// Ordered list of warnings; each entry is also emitted through `tracing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WarningLog {
    entries: Vec<Warning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        warn!("{warning}");
        self.entries.push(warning);
    }

    pub fn extend(&mut self, other: WarningLog) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}
