//! Species sensitivity distributions with model averaging
//!
//! Fits log-normal, log-logistic, Weibull and gamma distributions to
//! per-species toxicity concentrations, combines them with AICc weights,
//! derives the hazard concentration HCp and attaches nonparametric bootstrap
//! confidence intervals.
//!
//! This crate re-exports the workspace crates and adds the [`analyze`] entry
//! point plus an optional [`AnalysisCache`]:
//!
//! - [`ssd_core`]: observations, configuration, errors, execution engines
//! - [`ssd_fit`]: per-family maximum likelihood fits and goodness of fit
//! - [`ssd_ensemble`]: Akaike weighting and the combined CDF
//! - [`ssd_confidence`]: bootstrap resampling and percentile intervals
//! - [`ssd_report`]: the assembled [`SsdReport`]
//!
//! # Example
//!
//! ```rust
//! use ssd_stats::prelude::*;
//!
//! let data = Dataset::from_concentrations(&[0.6, 1.4, 2.1, 3.3, 4.0, 7.5, 12.0, 19.0]);
//! let config = SsdConfig::new()
//!     .with_mode(AnalysisMode::Single(DistributionFamily::LogNormal))
//!     .with_bootstrap_iterations(100);
//!
//! let report = analyze(&data, &config).unwrap();
//! assert!(report.hcp > 0.0);
//! assert!(report.hcp_interval.is_some());
//! ```

pub mod analysis;
pub mod cache;

pub use ssd_confidence;
pub use ssd_core;
pub use ssd_ensemble;
pub use ssd_fit;
pub use ssd_report;

pub use analysis::{analyze, analyze_with};
pub use cache::{AnalysisCache, AnalysisKey, AnalysisOutcome, CachePolicy, CacheStats};
pub use ssd_core::{
    AnalysisMode, CancellationToken, Dataset, DistributionFamily, Error, Observation,
    SpeciesAggregation, SsdConfig, Warning,
};
pub use ssd_report::{AnalysisFailure, SsdReport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{analyze, analyze_with};
    pub use crate::cache::{AnalysisCache, CachePolicy};
    pub use ssd_confidence::ConfidenceInterval;
    pub use ssd_core::prelude::*;
    pub use ssd_report::{AnalysisFailure, DiagnosticsRow, PlotData, SsdReport};
}
