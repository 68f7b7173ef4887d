//! Goodness-of-fit statistics against a fitted CDF
//!
//! These are diagnostics only: they never feed into model weighting.

use nalgebra::DMatrix;
use serde::Serialize;

/// Sample size above which the asymptotic Kolmogorov distribution is used.
const EXACT_KS_MAX_N: usize = 1000;

/// Rescaling threshold used while raising the MTW matrix to the n-th power.
const SCALE: f64 = 1e140;

/// Goodness-of-fit summary for one fitted candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoodnessOfFit {
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub ad_statistic: f64,
}

impl GoodnessOfFit {
    /// Evaluate KS and Anderson-Darling for `sample` against `cdf`.
    pub fn evaluate<F: Fn(f64) -> f64>(sample: &[f64], cdf: F) -> Self {
        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let probs: Vec<f64> = sorted.iter().map(|&x| cdf(x)).collect();

        let ks_statistic = ks_statistic_from_probs(&probs);
        Self {
            ks_statistic,
            ks_p_value: ks_p_value(ks_statistic, sorted.len()),
            ad_statistic: anderson_darling_from_probs(&probs),
        }
    }
}

/// Two-sided one-sample KS statistic `D_n` given fitted CDF values of the
/// sorted sample.
fn ks_statistic_from_probs(probs: &[f64]) -> f64 {
    let n = probs.len() as f64;
    probs
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            let d_plus = (i + 1) as f64 / n - f;
            let d_minus = f - i as f64 / n;
            d_plus.max(d_minus)
        })
        .fold(0.0, f64::max)
}

/// KS statistic of `sample` against `cdf`.
pub fn ks_statistic<F: Fn(f64) -> f64>(sample: &[f64], cdf: F) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let probs: Vec<f64> = sorted.iter().map(|&x| cdf(x)).collect();
    ks_statistic_from_probs(&probs)
}

/// Two-sided p-value `P(D_n >= d)`.
pub fn ks_p_value(d: f64, n: usize) -> f64 {
    if n == 0 || d.is_nan() {
        return f64::NAN;
    }
    if d <= 0.0 {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }

    let nd2 = n as f64 * d * d;
    let p = if n > EXACT_KS_MAX_N {
        kolmogorov_sf(d * (n as f64).sqrt())
    } else if nd2 > 7.24 || (nd2 > 3.76 && n > 99) {
        // Far tail: the exact matrix would be large and the answer is tiny.
        2.0 * (-(2.000071 + 0.331 / (n as f64).sqrt() + 1.409 / n as f64) * nd2).exp()
    } else {
        1.0 - mtw_cdf(n, d)
    };
    p.clamp(0.0, 1.0)
}

/// Asymptotic Kolmogorov survival function `P(K > x)`.
pub fn kolmogorov_sf(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < 0.27 {
        return 1.0;
    }
    let mut sum = 0.0;
    for j in 1..=100 {
        let jf = j as f64;
        let term = (-2.0 * jf * jf * x * x).exp();
        sum += if j % 2 == 1 { term } else { -term };
        if term < 1e-16 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Exact `P(D_n < d)` by the Marsaglia-Tsang-Wang matrix method.
fn mtw_cdf(n: usize, d: f64) -> f64 {
    let nd = n as f64 * d;
    let k = nd.floor() as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nd;

    let mut hm = DMatrix::<f64>::from_fn(m, m, |i, j| if i + 1 >= j { 1.0 } else { 0.0 });
    for i in 0..m {
        hm[(i, 0)] -= h.powi(i as i32 + 1);
        hm[(m - 1, i)] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        hm[(m - 1, 0)] += (2.0 * h - 1.0).powi(m as i32);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                for g in 1..=(i + 1 - j) {
                    hm[(i, j)] /= g as f64;
                }
            }
        }
    }

    let (q, mut exponent) = matrix_power(&hm, n, k - 1);
    let mut s = q[(k - 1, k - 1)];
    for i in 1..=n {
        s = s * i as f64 / n as f64;
        if s < 1.0 / SCALE {
            s *= SCALE;
            exponent -= 1;
        }
    }
    s * SCALE.powi(exponent)
}

/// `a^n` with the result scaled by `SCALE^exponent` to avoid overflow.
fn matrix_power(a: &DMatrix<f64>, n: usize, centre: usize) -> (DMatrix<f64>, i32) {
    if n == 1 {
        return (a.clone(), 0);
    }
    let (half, half_exp) = matrix_power(a, n / 2, centre);
    let mut b = &half * &half;
    let mut exponent = 2 * half_exp;
    if n % 2 == 1 {
        b = a * &b;
    }
    if b[(centre, centre)] > SCALE {
        b /= SCALE;
        exponent += 1;
    }
    (b, exponent)
}

fn anderson_darling_from_probs(probs: &[f64]) -> f64 {
    let n = probs.len();
    if n == 0 {
        return f64::NAN;
    }
    let clamp = |p: f64| p.clamp(1e-300, 1.0 - 1e-16);
    let sum: f64 = (0..n)
        .map(|i| {
            let lower = clamp(probs[i]).ln();
            let upper = (1.0 - clamp(probs[n - 1 - i])).ln();
            (2 * i + 1) as f64 * (lower + upper)
        })
        .sum();
    -(n as f64) - sum / n as f64
}

/// Anderson-Darling statistic `A^2` of `sample` against `cdf`.
pub fn anderson_darling<F: Fn(f64) -> f64>(sample: &[f64], cdf: F) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let probs: Vec<f64> = sorted.iter().map(|&x| cdf(x)).collect();
    anderson_darling_from_probs(&probs)
}
