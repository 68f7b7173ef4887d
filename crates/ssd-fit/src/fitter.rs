//! Fitting a single named family to a sample of concentrations

use crate::aicc::aicc;
use crate::families::FittedModel;
use crate::goodness::GoodnessOfFit;
use ssd_core::{DistributionFamily, Error, FitScale, Result, MIN_OBSERVATIONS};
use tracing::{debug, instrument};

/// Optional work performed alongside the likelihood fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Compute KS and Anderson-Darling statistics
    pub goodness_of_fit: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            goodness_of_fit: true,
        }
    }
}

impl FitOptions {
    /// Options for bootstrap resamples, where diagnostics are never read
    pub fn bootstrap() -> Self {
        Self {
            goodness_of_fit: false,
        }
    }
}

/// Outcome of fitting one family to one sample
#[derive(Debug, Clone)]
pub struct FitResult {
    pub family: DistributionFamily,
    /// Parameters on the fit scale
    pub params: [f64; 2],
    /// Log-likelihood in concentration units (Jacobian corrected for
    /// log-scale families)
    pub log_likelihood: f64,
    pub aicc: f64,
    /// Hazard concentration at the requested protection level
    pub hcp: f64,
    pub goodness_of_fit: Option<GoodnessOfFit>,
    /// Akaike weight, assigned by the ensemble
    pub weight: f64,
    pub model: FittedModel,
}

impl FitResult {
    /// Fitted CDF at a concentration
    pub fn cdf(&self, concentration: f64) -> f64 {
        self.model.cdf_at_concentration(concentration)
    }
}

/// Fit `family` to `sample` (positive concentrations) and evaluate HCp at `p`.
///
/// Candidate-level problems (non-convergence, degenerate data, invalid HCp)
/// are reported as [`Error::Fitting`]; invalid arguments are reported as
/// parameter or input errors.
#[instrument(skip(sample, options), fields(n = sample.len()))]
pub fn fit_distribution(
    family: DistributionFamily,
    sample: &[f64],
    p: f64,
    options: FitOptions,
) -> Result<FitResult> {
    if !(p.is_finite() && p > 0.0 && p < 1.0) {
        return Err(Error::invalid_quantile(p));
    }
    if sample.len() < MIN_OBSERVATIONS {
        return Err(Error::insufficient_data(MIN_OBSERVATIONS, sample.len()));
    }
    if sample.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
        return Err(Error::InvalidInput(
            "Concentrations must be positive and finite".to_string(),
        ));
    }
    let (min, max) = sample
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if min == max {
        return Err(Error::fitting(family, "sample has zero variance"));
    }

    let scale = family.fit_scale();
    let target: Vec<f64> = sample.iter().map(|&x| scale.transform(x)).collect();
    let model = FittedModel::fit(family, &target)?;

    let mut log_likelihood: f64 = target.iter().map(|&x| model.ln_pdf(x)).sum();
    if scale == FitScale::Log {
        // Change of variables back to concentration units
        log_likelihood -= sample.iter().map(|x| x.ln()).sum::<f64>();
    }
    if !log_likelihood.is_finite() {
        return Err(Error::fitting(family, "log-likelihood is not finite"));
    }

    let aicc = aicc(log_likelihood, family.param_count(), sample.len());

    let hcp = model.quantile_concentration(p);
    if !(hcp.is_finite() && hcp > 0.0) {
        return Err(Error::fitting(family, format!("invalid HCp ({hcp})")));
    }

    let goodness_of_fit = options
        .goodness_of_fit
        .then(|| GoodnessOfFit::evaluate(&target, |x| model.cdf(x)));

    debug!(%family, log_likelihood, aicc, hcp, "fitted candidate");

    Ok(FitResult {
        family,
        params: model.params(),
        log_likelihood,
        aicc,
        hcp,
        goodness_of_fit,
        weight: 0.0,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statrs::distribution::{Continuous, LogNormal};

    const SAMPLE: [f64; 8] = [0.42, 0.95, 1.3, 2.2, 3.1, 4.4, 7.9, 12.5];

    fn fit(family: DistributionFamily, sample: &[f64], p: f64) -> FitResult {
        fit_distribution(family, sample, p, FitOptions::default()).unwrap()
    }

    #[test]
    fn test_lognormal_jacobian() {
        let fit = fit(DistributionFamily::LogNormal, &SAMPLE, 0.05);
        let [mu, sigma] = fit.params;
        let dist = LogNormal::new(mu, sigma).unwrap();
        let expected: f64 = SAMPLE.iter().map(|&x| dist.ln_pdf(x)).sum();
        assert_relative_eq!(fit.log_likelihood, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_loglogistic_jacobian() {
        let fit = fit(DistributionFamily::LogLogistic, &SAMPLE, 0.05);
        let [mu, s] = fit.params;
        let alpha = mu.exp();
        let beta = 1.0 / s;
        let expected: f64 = SAMPLE
            .iter()
            .map(|&x| {
                let r = (x / alpha).powf(beta);
                ((beta / alpha) * (x / alpha).powf(beta - 1.0) / ((1.0 + r) * (1.0 + r))).ln()
            })
            .sum();
        assert_relative_eq!(fit.log_likelihood, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_hcp_is_quantile() {
        for family in DistributionFamily::ALL {
            let fit = fit(family, &SAMPLE, 0.1);
            assert!(fit.hcp > 0.0);
            assert_relative_eq!(fit.cdf(fit.hcp), 0.1, epsilon = 1e-7);
            assert!(fit.aicc.is_finite());
            assert!(fit.goodness_of_fit.is_some());
        }
    }

    #[test]
    fn test_lognormal_hcp_closed_form() {
        let fit = fit(DistributionFamily::LogNormal, &SAMPLE, 0.05);
        let [mu, sigma] = fit.params;
        let expected = (mu - 1.6448536269514722 * sigma).exp();
        assert_relative_eq!(fit.hcp, expected, max_relative = 1e-8);
    }

    #[test]
    fn test_bootstrap_options_skip_diagnostics() {
        let fit =
            fit_distribution(DistributionFamily::Gamma, &SAMPLE, 0.05, FitOptions::bootstrap())
                .unwrap();
        assert!(fit.goodness_of_fit.is_none());
    }

    #[test]
    fn test_argument_errors() {
        let weibull = |sample: &[f64], p: f64| {
            fit_distribution(DistributionFamily::Weibull, sample, p, FitOptions::default())
        };

        let err = weibull(&SAMPLE, 1.0).unwrap_err();
        assert!(err.is_fatal());

        let err = weibull(&SAMPLE[..4], 0.05).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));

        let err = weibull(&[1.0, 2.0, -1.0, 3.0, 4.0], 0.05).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_degenerate_sample_is_candidate_failure() {
        for family in DistributionFamily::ALL {
            let err = fit_distribution(family, &[2.0; 6], 0.05, FitOptions::default()).unwrap_err();
            assert!(matches!(err, Error::Fitting { .. }), "{family}: {err}");
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_constant_samples_fail_for_every_family() {
        // Values whose logarithms do not average back exactly
        for (value, n) in [(2.5, 12), (3.0, 12), (0.1, 7), (1.5, 9), (7.0, 12), (3.0, 8)] {
            let sample = vec![value; n];
            for family in DistributionFamily::ALL {
                let result = fit_distribution(family, &sample, 0.05, FitOptions::default());
                match result {
                    Err(Error::Fitting { .. }) => {}
                    other => panic!("{family} on [{value}; {n}]: {other:?}"),
                }
            }
        }
    }
}
