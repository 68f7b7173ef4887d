//! Bootstrap confidence intervals for species sensitivity distributions
//!
//! [`BootstrapEngine`] resamples the original concentrations, re-fits the
//! same [`ModelEnsemble`](ssd_ensemble::ModelEnsemble) on every resample and
//! turns the resulting HCp values and CDF curves into percentile intervals.
//!
//! # Example
//!
//! ```rust
//! use ssd_confidence::BootstrapEngine;
//! use ssd_core::{sequential, AnalysisMode, DistributionFamily};
//! use ssd_ensemble::{ConcentrationGrid, ModelEnsemble};
//!
//! let data = [0.6, 1.1, 1.8, 2.5, 3.9, 5.2, 8.8, 13.0];
//! let grid = ConcentrationGrid::from_sample(&data)?;
//! let ensemble = ModelEnsemble::new(AnalysisMode::Single(DistributionFamily::LogNormal), 0.05);
//! let original = ensemble.fit(&data, &grid)?;
//!
//! let output = BootstrapEngine::percentile(sequential())
//!     .with_iterations(100)
//!     .with_seed(42)
//!     .run(&data, &ensemble, &grid, &original)?;
//!
//! if let Some(ci) = output.hcp_interval {
//!     println!("HC5: {:.3} [{:.3}, {:.3}]", ci.estimate, ci.lower, ci.upper);
//! }
//! # Ok::<(), ssd_core::Error>(())
//! ```

mod bootstrap;
mod methods;
mod types;

pub use bootstrap::{
    BootstrapDistribution, BootstrapEngine, BootstrapOutput, MIN_SUCCESSFUL_ITERATIONS,
};
pub use methods::{BootstrapMethod, PercentileBootstrap};
pub use types::{ConfidenceInterval, ConfidenceLevel};
