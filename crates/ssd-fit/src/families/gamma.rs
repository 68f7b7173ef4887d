use super::FamilyModel;
use ssd_core::math::{bisect, mean};
use ssd_core::{DistributionFamily, Error, Result};
use statrs::distribution::{Continuous, Gamma};
use statrs::function::gamma::{checked_gamma_lr, digamma};

const SHAPE_LOWER: f64 = 1e-8;
const SHAPE_UPPER: f64 = 1e10;

/// Two-parameter Gamma on raw concentrations (location fixed at 0)
#[derive(Debug, Clone)]
pub struct GammaModel {
    shape: f64,
    scale: f64,
    dist: Gamma,
}

impl GammaModel {
    pub fn new(shape: f64, scale: f64) -> Result<Self> {
        let dist = Gamma::new(shape, 1.0 / scale).map_err(|e| {
            Error::fitting(Self::FAMILY, format!("invalid parameters ({shape}, {scale}): {e}"))
        })?;
        Ok(Self { shape, scale, dist })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Minka's closed-form approximation to the shape MLE
fn minka_start(s: f64) -> f64 {
    (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s)
}

impl FamilyModel for GammaModel {
    const FAMILY: DistributionFamily = DistributionFamily::Gamma;

    /// Solves `ln a - digamma(a) = ln(mean x) - mean(ln x)` for the shape
    fn fit(sample: &[f64]) -> Result<Self> {
        if sample.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
            return Err(Error::fitting(Self::FAMILY, "sample must be positive"));
        }

        let m = mean(sample);
        let mean_ln = sample.iter().map(|x| x.ln()).sum::<f64>() / sample.len() as f64;
        let s = m.ln() - mean_ln;
        if !(s.is_finite() && s > 1e-14) {
            return Err(Error::fitting(Self::FAMILY, "sample has zero variance"));
        }

        // ln a - digamma(a) is strictly decreasing from +inf to 0
        let f = |a: f64| a.ln() - digamma(a) - s;
        let start = minka_start(s);
        let mut lo = start;
        while f(lo) < 0.0 {
            lo /= 2.0;
            if lo < SHAPE_LOWER {
                return Err(Error::fitting(Self::FAMILY, "shape did not converge"));
            }
        }
        let mut hi = start;
        while f(hi) > 0.0 {
            hi *= 2.0;
            if hi > SHAPE_UPPER {
                return Err(Error::fitting(Self::FAMILY, "shape did not converge"));
            }
        }

        let shape = if lo == hi {
            lo
        } else {
            bisect(f, lo, hi, 1e-14, 300)
                .ok_or_else(|| Error::fitting(Self::FAMILY, "shape did not converge"))?
        };
        let scale = m / shape;
        if !(shape.is_finite() && scale.is_finite() && scale > 0.0) {
            return Err(Error::fitting(Self::FAMILY, "non-finite parameters"));
        }
        Self::new(shape, scale)
    }

    fn params(&self) -> [f64; 2] {
        [self.shape, self.scale]
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        self.dist.ln_pdf(x)
    }

    /// Regularized lower incomplete gamma of `x / scale`, saturating where
    /// the scaled argument under- or overflows
    fn cdf(&self, x: f64) -> f64 {
        let y = x / self.scale;
        if y.is_nan() {
            return f64::NAN;
        }
        if y <= 0.0 {
            return 0.0;
        }
        if y.is_infinite() {
            return 1.0;
        }
        checked_gamma_lr(self.shape, y).unwrap_or(if y < self.shape { 0.0 } else { 1.0 })
    }

    /// Inverse CDF by bisection on the CDF
    fn ppf(&self, p: f64) -> f64 {
        if !(p > 0.0 && p < 1.0) {
            return f64::NAN;
        }
        let mut hi = self.shape * self.scale;
        while self.cdf(hi) < p {
            hi *= 2.0;
            if !hi.is_finite() {
                return f64::NAN;
            }
        }
        let target = |x: f64| self.cdf(x) - p;
        let mut lo = hi / 2.0;
        while lo > f64::MIN_POSITIVE && target(lo) > 0.0 {
            lo /= 2.0;
        }
        bisect(target, lo, hi, 1e-15, 400).unwrap_or(f64::NAN)
    }
}
