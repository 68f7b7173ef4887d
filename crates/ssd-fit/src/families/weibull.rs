use super::FamilyModel;
use ssd_core::math::bisect;
use ssd_core::{DistributionFamily, Error, Result};
use statrs::distribution::{Continuous, ContinuousCDF, Weibull};

const SHAPE_LOWER: f64 = 1e-3;
const SHAPE_UPPER: f64 = 1e4;

/// Two-parameter Weibull on raw concentrations (location fixed at 0)
#[derive(Debug, Clone)]
pub struct WeibullModel {
    shape: f64,
    scale: f64,
    dist: Weibull,
}

impl WeibullModel {
    pub fn new(shape: f64, scale: f64) -> Result<Self> {
        let dist = Weibull::new(shape, scale).map_err(|e| {
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

/// Profile score in the shape `k` for data rescaled to `y = x / max(x)`.
///
/// Increasing in `k`; negative near zero and positive for large `k` unless
/// every value is equal.
fn profile_score(ln_y: &[f64], mean_ln_y: f64, k: f64) -> f64 {
    let (mut sum_w, mut sum_w_ln) = (0.0, 0.0);
    for &l in ln_y {
        let w = (k * l).exp();
        sum_w += w;
        sum_w_ln += w * l;
    }
    sum_w_ln / sum_w - 1.0 / k - mean_ln_y
}

impl FamilyModel for WeibullModel {
    const FAMILY: DistributionFamily = DistributionFamily::Weibull;

    fn fit(sample: &[f64]) -> Result<Self> {
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max.is_finite() && max > 0.0) || sample.iter().any(|&x| x <= 0.0) {
            return Err(Error::fitting(Self::FAMILY, "sample must be positive"));
        }

        let ln_y: Vec<f64> = sample.iter().map(|&x| (x / max).ln()).collect();
        let mean_ln_y = ln_y.iter().sum::<f64>() / ln_y.len() as f64;
        if mean_ln_y == 0.0 {
            return Err(Error::fitting(Self::FAMILY, "sample has zero variance"));
        }

        let score = |k: f64| profile_score(&ln_y, mean_ln_y, k);
        let mut hi = 1.0;
        while score(hi) < 0.0 {
            hi *= 2.0;
            if hi > SHAPE_UPPER {
                return Err(Error::fitting(Self::FAMILY, "shape did not converge"));
            }
        }
        let mut lo = hi / 2.0;
        while score(lo) > 0.0 {
            lo /= 2.0;
            if lo < SHAPE_LOWER {
                return Err(Error::fitting(Self::FAMILY, "shape did not converge"));
            }
        }

        let shape = bisect(score, lo, hi, 1e-13, 300)
            .ok_or_else(|| Error::fitting(Self::FAMILY, "shape did not converge"))?;
        let mean_yk = ln_y.iter().map(|&l| (shape * l).exp()).sum::<f64>() / ln_y.len() as f64;
        let scale = max * mean_yk.powf(1.0 / shape);
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

    fn cdf(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    fn ppf(&self, p: f64) -> f64 {
        self.scale * (-(-p).ln_1p()).powf(1.0 / self.shape)
    }
}
