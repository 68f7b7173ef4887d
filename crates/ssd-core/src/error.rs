//! Error types for species sensitivity distribution analysis
//!
//! Provides a unified error type for all ssd-stats crates. Errors are split
//! by how far they propagate: fitting and bootstrap-iteration errors are
//! recovered locally by the caller, while input, ensemble and cancellation
//! errors terminate the invocation.

use crate::types::DistributionFamily;
use thiserror::Error;

/// Core error type for SSD operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few valid (positive, finite) observations
    #[error("Insufficient data: expected at least {expected} valid observations, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// A single candidate distribution could not be fitted
    #[error("Could not fit {family}: {reason}")]
    Fitting {
        family: DistributionFamily,
        reason: String,
    },

    /// No candidate survived fitting on the original data
    #[error("No distribution could be fitted to the data: {0}")]
    Ensemble(String),

    /// A single bootstrap resample could not be evaluated
    #[error("Bootstrap iteration {iteration} failed: {reason}")]
    BootstrapIteration { iteration: usize, reason: String },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Threading or parallelization error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Cooperative cancellation between bootstrap iterations
    #[error("Analysis cancelled after {completed} of {total} bootstrap iterations")]
    Cancelled { completed: usize, total: usize },

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a dataset below the minimum size
    pub fn insufficient_data(expected: usize, actual: usize) -> Self {
        Self::InsufficientData { expected, actual }
    }

    /// Create an error for a protection level outside (0, 1)
    pub fn invalid_quantile(p: f64) -> Self {
        Self::InvalidParameter(format!("Protection level {p} must be in (0, 1)"))
    }

    /// Create a fitting error for one family
    pub fn fitting(family: DistributionFamily, reason: impl Into<String>) -> Self {
        Self::Fitting {
            family,
            reason: reason.into(),
        }
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }

    /// Whether the error ends the whole invocation rather than a single
    /// candidate or bootstrap iteration.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Fitting { .. } | Self::BootstrapIteration { .. }
        )
    }
}
