//! Core types for species sensitivity distribution analysis
//!
//! This crate holds everything the fitting, ensemble, bootstrap and report
//! crates share:
//!
//! - [`types`]: observations, datasets and the closed set of distribution
//!   families
//! - [`config`]: [`SsdConfig`] and [`AnalysisMode`]
//! - [`error`]: the unified [`Error`] type
//! - [`execution`]: sequential and parallel execution engines
//! - [`progress`]: progress observers and cancellation
//! - [`diagnostics`]: non-fatal [`Warning`]s
//!
//! # Example
//!
//! ```rust
//! use ssd_core::{Dataset, SsdConfig, AnalysisMode, DistributionFamily};
//!
//! let data = Dataset::from_concentrations(&[1.2, 3.4, 0.8, 5.6, 2.2, 9.1]);
//! let config = SsdConfig::new()
//!     .with_mode(AnalysisMode::Single(DistributionFamily::LogNormal))
//!     .with_bootstrap_iterations(200);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(data.require_valid().unwrap().len(), 6);
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod execution;
pub mod math;
pub mod progress;
pub mod types;

pub use config::{
    AnalysisMode, SsdConfig, DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_RELIABILITY_THRESHOLD,
    DEFAULT_SEED, GRID_LOG_PADDING, GRID_POINTS,
};
pub use diagnostics::{Warning, WarningLog};
pub use error::{Error, Result};
pub use execution::{auto_engine, sequential, ExecutionEngine, ExecutionStrategy, SequentialEngine};
#[cfg(feature = "parallel")]
pub use execution::{parallel, ParallelEngine};
pub use progress::{CancellationToken, FnProgress, NullProgress, ProgressObserver, TracingProgress};
pub use types::{
    Dataset, DistributionFamily, FitScale, Observation, SpeciesAggregation, MIN_OBSERVATIONS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisMode, CancellationToken, Dataset, DistributionFamily, Error, ExecutionEngine,
        Observation, ProgressObserver, Result, SpeciesAggregation, SsdConfig, Warning,
    };
}
