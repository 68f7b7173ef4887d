//! Akaike weights

use ssd_core::{Error, Result};

/// Normalized Akaike weights, referenced to the minimum AICc.
///
/// `w_i = exp(-(AICc_i - AICc_min) / 2) / Σ_j exp(-(AICc_j - AICc_min) / 2)`.
/// Every input must be finite.
pub fn akaike_weights(aicc: &[f64]) -> Result<Vec<f64>> {
    if aicc.is_empty() {
        return Err(Error::InvalidInput(
            "Cannot weight an empty candidate set".to_string(),
        ));
    }
    if aicc.iter().any(|a| !a.is_finite()) {
        return Err(Error::non_finite("AICc"));
    }

    let min = aicc.iter().copied().fold(f64::INFINITY, f64::min);
    let raw: Vec<f64> = aicc.iter().map(|a| (-0.5 * (a - min)).exp()).collect();
    // The minimum contributes exp(0) = 1, so the total is at least 1
    let total: f64 = raw.iter().sum();
    Ok(raw.into_iter().map(|w| w / total).collect())
}
