//! Small numerical helpers shared by the fitting and bootstrap crates.

use crate::config::{GRID_LOG_PADDING, GRID_POINTS};
use crate::error::{Error, Result};

/// Sort a slice of floats in ascending order (NaN last).
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Return a sorted copy.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    sort_ascending(&mut out);
    out
}

/// Relative spread below which a sample is treated as constant.
pub const SPREAD_TOLERANCE: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (maximum-likelihood) standard deviation.
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / values.len() as f64).sqrt()
}

/// Percentile `q` (in percent) of already sorted data, interpolating linearly
/// between order statistics.
///
/// Matches the default ("linear") convention: position `(n - 1) * q / 100`.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(Error::InvalidInput(
            "Cannot compute percentile of empty data".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidParameter(format!(
            "Percentile {q} must be in [0, 100]"
        )));
    }

    let pos = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Ok(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Percentile of unsorted data.
pub fn percentile(values: &[f64], q: f64) -> Result<f64> {
    percentile_sorted(&sorted(values), q)
}

/// `num` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Concentration grid spanning `[ln min - 2, ln max + 2]` in log space,
/// returned on the concentration scale.
pub fn log_spaced_grid(min: f64, max: f64) -> Result<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max >= min) {
        return Err(Error::InvalidInput(format!(
            "Grid bounds must be positive and ordered, got [{min}, {max}]"
        )));
    }
    Ok(linspace(
        min.ln() - GRID_LOG_PADDING,
        max.ln() + GRID_LOG_PADDING,
        GRID_POINTS,
    )
    .into_iter()
    .map(f64::exp)
    .collect())
}

/// Standard logistic CDF, stable for large |z|.
#[inline]
pub fn logistic_cdf(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^x)` without overflow.
#[inline]
pub fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Bracketed root of a continuous function by bisection.
///
/// `lo` and `hi` must bracket a sign change.
pub fn bisect<F>(f: F, mut lo: f64, mut hi: f64, tol: f64, max_iter: usize) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo.signum() == f_hi.signum() {
        return None;
    }
    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return None;
        }
        if f_mid == 0.0 || (hi - lo) < tol * mid.abs().max(1.0) {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}
