//! Analysis configuration

use crate::error::{Error, Result};
use crate::types::{DistributionFamily, SpeciesAggregation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of bootstrap resamples.
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 1000;

/// Number of points on the concentration grid.
pub const GRID_POINTS: usize = 200;

/// Padding, in natural-log units, added on each side of the data range.
pub const GRID_LOG_PADDING: f64 = 2.0;

/// Minimum share of successful bootstrap iterations before a reliability
/// warning is raised.
pub const DEFAULT_RELIABILITY_THRESHOLD: f64 = 0.8;

/// Which candidate families take part in the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// One named family with weight 1.0
    Single(DistributionFamily),
    /// All families combined with Akaike weights
    Averaged,
}

impl AnalysisMode {
    /// Families fitted under this mode.
    pub fn families(&self) -> Vec<DistributionFamily> {
        match self {
            AnalysisMode::Single(family) => vec![*family],
            AnalysisMode::Averaged => DistributionFamily::ALL.to_vec(),
        }
    }

    pub fn is_averaged(&self) -> bool {
        matches!(self, AnalysisMode::Averaged)
    }
}

impl Default for AnalysisMode {
    fn default() -> Self {
        Self::Averaged
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Single(family) => write!(f, "single ({family})"),
            AnalysisMode::Averaged => f.write_str("model averaged"),
        }
    }
}

/// Everything `analyze` needs besides the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsdConfig {
    /// Protection quantile p in (0, 1); HCp is the p-th quantile.
    pub protection_level: f64,
    pub mode: AnalysisMode,
    pub bootstrap_iterations: usize,
    pub seed: u64,
    pub confidence_level: f64,
    pub reliability_threshold: f64,
    pub species_aggregation: SpeciesAggregation,
}

impl Default for SsdConfig {
    fn default() -> Self {
        Self {
            protection_level: 0.05,
            mode: AnalysisMode::default(),
            bootstrap_iterations: DEFAULT_BOOTSTRAP_ITERATIONS,
            seed: DEFAULT_SEED,
            confidence_level: 0.95,
            reliability_threshold: DEFAULT_RELIABILITY_THRESHOLD,
            species_aggregation: SpeciesAggregation::default(),
        }
    }
}

impl Hash for SsdConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protection_level.to_bits().hash(state);
        self.mode.hash(state);
        self.bootstrap_iterations.hash(state);
        self.seed.hash(state);
        self.confidence_level.to_bits().hash(state);
        self.reliability_threshold.to_bits().hash(state);
        self.species_aggregation.hash(state);
    }
}

impl SsdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protection level p
    pub fn with_protection_level(mut self, p: f64) -> Self {
        assert!(p > 0.0 && p < 1.0, "Protection level must be in (0, 1)");
        self.protection_level = p;
        self
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of bootstrap iterations
    pub fn with_bootstrap_iterations(mut self, n: usize) -> Self {
        assert!(n > 0, "Number of bootstrap iterations must be positive");
        self.bootstrap_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the confidence level
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        assert!(
            level > 0.0 && level < 1.0,
            "Confidence level must be in (0, 1)"
        );
        self.confidence_level = level;
        self
    }

    pub fn with_reliability_threshold(mut self, threshold: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&threshold),
            "Reliability threshold must be in [0, 1]"
        );
        self.reliability_threshold = threshold;
        self
    }

    pub fn with_species_aggregation(mut self, aggregation: SpeciesAggregation) -> Self {
        self.species_aggregation = aggregation;
        self
    }

    /// Check every field, for configs built without the setters (e.g.
    /// deserialized).
    pub fn validate(&self) -> Result<()> {
        let p = self.protection_level;
        if !(p.is_finite() && p > 0.0 && p < 1.0) {
            return Err(Error::invalid_quantile(p));
        }
        if self.bootstrap_iterations == 0 {
            return Err(Error::InvalidParameter(
                "Number of bootstrap iterations must be positive".to_string(),
            ));
        }
        let c = self.confidence_level;
        if !(c.is_finite() && c > 0.0 && c < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "Confidence level {c} must be in (0, 1)"
            )));
        }
        let r = self.reliability_threshold;
        if !(0.0..=1.0).contains(&r) {
            return Err(Error::InvalidParameter(format!(
                "Reliability threshold {r} must be in [0, 1]"
            )));
        }
        Ok(())
    }
}
