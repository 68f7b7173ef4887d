use super::FamilyModel;
use ssd_core::math::{mean, population_std, SPREAD_TOLERANCE};
use ssd_core::{DistributionFamily, Error, Result};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Normal distribution on `ln(concentration)`, i.e. the Log-Normal family
#[derive(Debug, Clone)]
pub struct NormalModel {
    loc: f64,
    scale: f64,
    dist: Normal,
}

impl NormalModel {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        let dist = Normal::new(loc, scale).map_err(|e| {
            Error::fitting(Self::FAMILY, format!("invalid parameters ({loc}, {scale}): {e}"))
        })?;
        Ok(Self { loc, scale, dist })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl FamilyModel for NormalModel {
    const FAMILY: DistributionFamily = DistributionFamily::LogNormal;

    /// Closed-form MLE: sample mean and population standard deviation
    fn fit(sample: &[f64]) -> Result<Self> {
        let loc = mean(sample);
        let scale = population_std(sample);
        if !(loc.is_finite() && scale.is_finite()) {
            return Err(Error::fitting(Self::FAMILY, "non-finite parameters"));
        }
        if scale <= SPREAD_TOLERANCE * loc.abs().max(1.0) {
            return Err(Error::fitting(Self::FAMILY, "sample has zero variance"));
        }
        Self::new(loc, scale)
    }

    fn params(&self) -> [f64; 2] {
        [self.loc, self.scale]
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        self.dist.ln_pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    fn ppf(&self, p: f64) -> f64 {
        self.dist.inverse_cdf(p)
    }
}
