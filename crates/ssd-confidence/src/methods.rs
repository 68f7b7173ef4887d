//! Bootstrap interval methods

use crate::types::{ConfidenceInterval, ConfidenceLevel};
use ssd_core::math::{percentile_sorted, sorted};
use ssd_core::{Error, Result};

/// Bootstrap method for calculating confidence intervals
///
/// Turns a bootstrap distribution of one quantity into an interval.
pub trait BootstrapMethod: Clone + Send + Sync {
    /// Calculate confidence interval from bootstrap distribution
    fn calculate_interval(
        &self,
        bootstrap_estimates: &[f64],
        original_estimate: f64,
        confidence_level: ConfidenceLevel,
    ) -> Result<ConfidenceInterval>;

    /// Method name for documentation
    fn name(&self) -> &'static str;
}

/// Percentile bootstrap method
///
/// Uses the empirical percentiles of the bootstrap distribution, with linear
/// interpolation between order statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentileBootstrap;

impl BootstrapMethod for PercentileBootstrap {
    fn calculate_interval(
        &self,
        bootstrap_estimates: &[f64],
        original_estimate: f64,
        confidence_level: ConfidenceLevel,
    ) -> Result<ConfidenceInterval> {
        if bootstrap_estimates.is_empty() {
            return Err(Error::InvalidInput("No bootstrap estimates".to_string()));
        }
        if bootstrap_estimates.iter().any(|v| v.is_nan()) {
            return Err(Error::non_finite("Bootstrap estimates"));
        }

        let sorted = sorted(bootstrap_estimates);
        let (lo_q, hi_q) = confidence_level.percentiles();

        Ok(ConfidenceInterval::new(
            percentile_sorted(&sorted, lo_q)?,
            percentile_sorted(&sorted, hi_q)?,
            original_estimate,
            confidence_level.value(),
        ))
    }

    fn name(&self) -> &'static str {
        "Percentile Bootstrap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_bootstrap() {
        let bootstrap_estimates: Vec<f64> = (1..=10).map(f64::from).collect();
        let original_estimate = 5.5;

        let method = PercentileBootstrap;
        let ci = method
            .calculate_interval(&bootstrap_estimates, original_estimate, ConfidenceLevel::new(0.90))
            .unwrap();

        // positions 9 * 0.05 = 0.45 and 9 * 0.95 = 8.55
        assert_relative_eq!(ci.lower, 1.45, epsilon = 1e-12);
        assert_relative_eq!(ci.upper, 9.55, epsilon = 1e-12);
        assert_eq!(ci.estimate, 5.5);
        assert_eq!(ci.confidence_level, 0.90);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = [3.0, 1.0, 2.0, 5.0, 4.0];
        let b = [1.0, 2.0, 3.0, 4.0, 5.0];
        let m = PercentileBootstrap;
        let level = ConfidenceLevel::NINETY_FIVE;
        assert_eq!(
            m.calculate_interval(&a, 3.0, level).unwrap(),
            m.calculate_interval(&b, 3.0, level).unwrap()
        );
    }

    #[test]
    fn test_empty_estimates() {
        let err = PercentileBootstrap
            .calculate_interval(&[], 1.0, ConfidenceLevel::NINETY_FIVE)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
