//! Per-candidate diagnostics table

use serde::Serialize;
use ssd_core::DistributionFamily;
use ssd_ensemble::EnsembleResult;
use ssd_fit::FitResult;

/// One row of the diagnostics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsRow {
    pub family: DistributionFamily,
    pub param_names: [&'static str; 2],
    /// Parameters on the family's fit scale
    pub params: [f64; 2],
    pub log_likelihood: f64,
    pub aicc: f64,
    pub weight: f64,
    pub hcp: f64,
    pub ks_statistic: Option<f64>,
    pub ks_p_value: Option<f64>,
    pub ad_statistic: Option<f64>,
}

impl From<&FitResult> for DiagnosticsRow {
    fn from(fit: &FitResult) -> Self {
        let gof = fit.goodness_of_fit;
        Self {
            family: fit.family,
            param_names: fit.family.param_names(),
            params: fit.params,
            log_likelihood: fit.log_likelihood,
            aicc: fit.aicc,
            weight: fit.weight,
            hcp: fit.hcp,
            ks_statistic: gof.map(|g| g.ks_statistic),
            ks_p_value: gof.map(|g| g.ks_p_value),
            ad_statistic: gof.map(|g| g.ad_statistic),
        }
    }
}

/// Rows for every candidate with a finite, positive weight, by ascending AICc
pub fn diagnostics_table(result: &EnsembleResult) -> Vec<DiagnosticsRow> {
    let mut rows: Vec<DiagnosticsRow> = result
        .fits
        .iter()
        .filter(|f| f.weight.is_finite() && f.weight > 0.0)
        .map(DiagnosticsRow::from)
        .collect();
    rows.sort_by(|a, b| a.aicc.total_cmp(&b.aicc));
    rows
}
