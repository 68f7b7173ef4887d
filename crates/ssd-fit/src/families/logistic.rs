use super::FamilyModel;
use nalgebra::{Matrix2, Vector2};
use ssd_core::math::{logistic_cdf, mean, population_std, softplus, SPREAD_TOLERANCE};
use ssd_core::{DistributionFamily, Error, Result};
use std::f64::consts::PI;
use tracing::trace;

const MAX_ITERATIONS: usize = 200;
const MAX_HALVINGS: usize = 60;
const GRADIENT_TOLERANCE: f64 = 1e-10;

/// Logistic distribution on `ln(concentration)`, i.e. the Log-Logistic family
#[derive(Debug, Clone, Copy)]
pub struct LogisticModel {
    loc: f64,
    scale: f64,
}

impl LogisticModel {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        if !(loc.is_finite() && scale.is_finite() && scale > 0.0) {
            return Err(Error::fitting(
                Self::FAMILY,
                format!("invalid parameters ({loc}, {scale})"),
            ));
        }
        Ok(Self { loc, scale })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn log_likelihood(sample: &[f64], loc: f64, scale: f64) -> f64 {
    let ln_s = scale.ln();
    sample
        .iter()
        .map(|&x| {
            let z = (x - loc) / scale;
            -z - ln_s - 2.0 * softplus(-z)
        })
        .sum()
}

/// Score vector and Hessian of the log-likelihood in `(loc, scale)`.
fn score_and_hessian(sample: &[f64], loc: f64, scale: f64) -> (Vector2<f64>, Matrix2<f64>) {
    let n = sample.len() as f64;
    let (mut sum_t, mut sum_zt, mut sum_f, mut sum_fz, mut sum_fz2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &x in sample {
        let z = (x - loc) / scale;
        let t = (z / 2.0).tanh();
        let cdf = logistic_cdf(z);
        let f = cdf * (1.0 - cdf);
        sum_t += t;
        sum_zt += z * t;
        sum_f += f;
        sum_fz += f * z;
        sum_fz2 += f * z * z;
    }

    let s2 = scale * scale;
    let grad = Vector2::new(sum_t / scale, (sum_zt - n) / scale);
    let h_mm = -2.0 * sum_f / s2;
    let h_ms = -(sum_t + 2.0 * sum_fz) / s2;
    let h_ss = -(2.0 * sum_zt - n + 2.0 * sum_fz2) / s2;
    (grad, Matrix2::new(h_mm, h_ms, h_ms, h_ss))
}

impl FamilyModel for LogisticModel {
    const FAMILY: DistributionFamily = DistributionFamily::LogLogistic;

    /// Newton-Raphson on the score equations with step halving, started from
    /// the moment estimates.
    fn fit(sample: &[f64]) -> Result<Self> {
        let sd = population_std(sample);
        let mut loc = mean(sample);
        if !(sd.is_finite() && sd > SPREAD_TOLERANCE * loc.abs().max(1.0)) {
            return Err(Error::fitting(Self::FAMILY, "sample has zero variance"));
        }

        let mut scale = sd * 3f64.sqrt() / PI;
        let mut ll = log_likelihood(sample, loc, scale);

        for iteration in 0..MAX_ITERATIONS {
            let (grad, hessian) = score_and_hessian(sample, loc, scale);
            if grad.norm() * scale < GRADIENT_TOLERANCE * sample.len() as f64 {
                trace!(iteration, loc, scale, "logistic fit converged");
                return Self::new(loc, scale);
            }

            // Newton direction when the Hessian is negative definite, gradient
            // ascent otherwise.
            let newton = hessian
                .try_inverse()
                .map(|inv| -(inv * grad))
                .filter(|step| step.dot(&grad) > 0.0);
            let mut step = newton.unwrap_or_else(|| grad * (scale * scale / sample.len() as f64));

            let mut improved = false;
            for _ in 0..MAX_HALVINGS {
                let next_loc = loc + step[0];
                let next_scale = scale + step[1];
                if next_scale > 0.0 {
                    let next_ll = log_likelihood(sample, next_loc, next_scale);
                    if next_ll.is_finite() && next_ll >= ll {
                        let delta = (next_loc - loc).abs() + (next_scale - scale).abs();
                        loc = next_loc;
                        scale = next_scale;
                        ll = next_ll;
                        improved = true;
                        if delta < 1e-14 * (1.0 + loc.abs() + scale) {
                            return Self::new(loc, scale);
                        }
                        break;
                    }
                }
                step /= 2.0;
            }

            if !improved {
                // No ascent step exists at machine precision: we are at the optimum.
                return Self::new(loc, scale);
            }
        }

        Err(Error::fitting(
            Self::FAMILY,
            format!("Newton-Raphson did not converge in {MAX_ITERATIONS} iterations"),
        ))
    }

    fn params(&self) -> [f64; 2] {
        [self.loc, self.scale]
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        -z - self.scale.ln() - 2.0 * softplus(-z)
    }

    fn cdf(&self, x: f64) -> f64 {
        logistic_cdf((x - self.loc) / self.scale)
    }

    fn ppf(&self, p: f64) -> f64 {
        self.loc + self.scale * (p / (1.0 - p)).ln()
    }
}
