//! Per-family maximum-likelihood models
//!
//! Each model works on its own fit scale: log-scale families receive
//! `ln(concentration)`, raw-scale families receive the concentrations
//! themselves. [`FittedModel`] dispatches over the closed family set.

mod gamma;
mod logistic;
mod normal;
mod weibull;

pub use gamma::GammaModel;
pub use logistic::LogisticModel;
pub use normal::NormalModel;
pub use weibull::WeibullModel;

use ssd_core::{DistributionFamily, FitScale, Result};

/// Contract every candidate family implements
pub trait FamilyModel: Sized {
    /// Family this model belongs to
    const FAMILY: DistributionFamily;

    /// Maximum-likelihood fit to values already on the fit scale
    fn fit(sample: &[f64]) -> Result<Self>;

    /// The two fitted parameters, in the order of
    /// [`DistributionFamily::param_names`]
    fn params(&self) -> [f64; 2];

    fn ln_pdf(&self, x: f64) -> f64;

    fn cdf(&self, x: f64) -> f64;

    /// Inverse CDF on the fit scale
    fn ppf(&self, p: f64) -> f64;
}

/// A fitted model of any family
#[derive(Debug, Clone)]
pub enum FittedModel {
    LogNormal(NormalModel),
    LogLogistic(LogisticModel),
    Weibull(WeibullModel),
    Gamma(GammaModel),
}

macro_rules! dispatch {
    ($self:expr, $model:ident => $body:expr) => {
        match $self {
            FittedModel::LogNormal($model) => $body,
            FittedModel::LogLogistic($model) => $body,
            FittedModel::Weibull($model) => $body,
            FittedModel::Gamma($model) => $body,
        }
    };
}

impl FittedModel {
    /// Fit `family` to values on its fit scale
    pub fn fit(family: DistributionFamily, sample: &[f64]) -> Result<Self> {
        Ok(match family {
            DistributionFamily::LogNormal => FittedModel::LogNormal(NormalModel::fit(sample)?),
            DistributionFamily::LogLogistic => {
                FittedModel::LogLogistic(LogisticModel::fit(sample)?)
            }
            DistributionFamily::Weibull => FittedModel::Weibull(WeibullModel::fit(sample)?),
            DistributionFamily::Gamma => FittedModel::Gamma(GammaModel::fit(sample)?),
        })
    }

    pub fn family(&self) -> DistributionFamily {
        match self {
            FittedModel::LogNormal(_) => NormalModel::FAMILY,
            FittedModel::LogLogistic(_) => LogisticModel::FAMILY,
            FittedModel::Weibull(_) => WeibullModel::FAMILY,
            FittedModel::Gamma(_) => GammaModel::FAMILY,
        }
    }

    pub fn fit_scale(&self) -> FitScale {
        self.family().fit_scale()
    }

    pub fn params(&self) -> [f64; 2] {
        dispatch!(self, m => m.params())
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        dispatch!(self, m => m.ln_pdf(x))
    }

    pub fn cdf(&self, x: f64) -> f64 {
        dispatch!(self, m => m.cdf(x))
    }

    pub fn ppf(&self, p: f64) -> f64 {
        dispatch!(self, m => m.ppf(p))
    }

    /// CDF at a concentration, regardless of fit scale
    pub fn cdf_at_concentration(&self, concentration: f64) -> f64 {
        self.cdf(self.fit_scale().transform(concentration))
    }

    /// Quantile in concentration units
    pub fn quantile_concentration(&self, p: f64) -> f64 {
        self.fit_scale().inverse(self.ppf(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cdf_ppf_inverse_for_every_family() {
        let raw = [0.8, 1.3, 2.1, 2.9, 3.7, 5.2, 6.8, 9.9];
        for family in DistributionFamily::ALL {
            let sample: Vec<f64> = raw.iter().map(|&x| family.fit_scale().transform(x)).collect();
            let model = FittedModel::fit(family, &sample).unwrap();
            assert_eq!(model.family(), family);
            for p in [0.01, 0.05, 0.5, 0.9] {
                let q = model.ppf(p);
                assert_relative_eq!(model.cdf(q), p, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_concentration_helpers() {
        let raw: [f64; 6] = [0.8, 1.3, 2.1, 2.9, 3.7, 5.2];
        let sample: Vec<f64> = raw.iter().map(|x| x.ln()).collect();
        let model = FittedModel::fit(DistributionFamily::LogNormal, &sample).unwrap();
        let hc = model.quantile_concentration(0.2);
        assert!(hc > 0.0);
        assert_relative_eq!(model.cdf_at_concentration(hc), 0.2, epsilon = 1e-9);
    }
}
