//! Running the candidate set and combining it into one curve

use crate::grid::ConcentrationGrid;
use crate::weights::akaike_weights;
use ssd_core::{AnalysisMode, DistributionFamily, Error, Result, Warning};
use ssd_fit::{fit_distribution, FitOptions, FitResult};
use tracing::{debug, instrument};

/// A candidate left out of the ensemble, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedCandidate {
    pub family: DistributionFamily,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    /// The fitter reported a candidate-level error
    FitFailed(String),
    /// The fit succeeded but AICc is not finite
    NonFiniteAicc,
}

impl ExcludedCandidate {
    pub fn to_warning(&self) -> Warning {
        match &self.reason {
            ExclusionReason::FitFailed(reason) => Warning::CandidateExcluded {
                family: self.family,
                reason: reason.clone(),
            },
            ExclusionReason::NonFiniteAicc => Warning::NonFiniteAicc {
                family: self.family,
            },
        }
    }
}

/// Surviving fits, their weights and the combined estimates
#[derive(Debug, Clone)]
pub struct EnsembleResult {
    /// Surviving candidates, each with its normalized weight set
    pub fits: Vec<FitResult>,
    pub excluded: Vec<ExcludedCandidate>,
    /// `Σ w_i HCp_i`
    pub weighted_hcp: f64,
    /// `Σ w_i F_i(x)` at every grid point
    pub weighted_cdf: Vec<f64>,
}

impl EnsembleResult {
    pub fn weights(&self) -> Vec<f64> {
        self.fits.iter().map(|f| f.weight).collect()
    }

    pub fn fit_for(&self, family: DistributionFamily) -> Option<&FitResult> {
        self.fits.iter().find(|f| f.family == family)
    }

    /// Warnings describing every excluded candidate, in fitting order
    pub fn warnings(&self) -> Vec<Warning> {
        self.excluded.iter().map(ExcludedCandidate::to_warning).collect()
    }
}

/// Fits the active candidate set for one dataset
#[derive(Debug, Clone)]
pub struct ModelEnsemble {
    mode: AnalysisMode,
    protection_level: f64,
    fit_options: FitOptions,
}

impl ModelEnsemble {
    pub fn new(mode: AnalysisMode, protection_level: f64) -> Self {
        assert!(
            protection_level > 0.0 && protection_level < 1.0,
            "Protection level must be in (0, 1)"
        );
        Self {
            mode,
            protection_level,
            fit_options: FitOptions::default(),
        }
    }

    pub fn with_fit_options(mut self, options: FitOptions) -> Self {
        self.fit_options = options;
        self
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn protection_level(&self) -> f64 {
        self.protection_level
    }

    /// Fit every candidate to `sample`, weight the survivors and evaluate
    /// the combined CDF on `grid`.
    ///
    /// Candidate failures are recorded in [`EnsembleResult::excluded`]; if no
    /// candidate survives the result is [`Error::Ensemble`].
    #[instrument(skip(self, sample, grid), fields(mode = %self.mode, n = sample.len()))]
    pub fn fit(&self, sample: &[f64], grid: &ConcentrationGrid) -> Result<EnsembleResult> {
        let mut fits = Vec::new();
        let mut excluded = Vec::new();

        for family in self.mode.families() {
            match fit_distribution(family, sample, self.protection_level, self.fit_options) {
                Ok(fit) if self.mode.is_averaged() && !fit.aicc.is_finite() => {
                    debug!(%family, "excluded: non-finite AICc");
                    excluded.push(ExcludedCandidate {
                        family,
                        reason: ExclusionReason::NonFiniteAicc,
                    });
                }
                Ok(fit) => fits.push(fit),
                Err(e) if !e.is_fatal() => {
                    debug!(%family, error = %e, "excluded candidate");
                    excluded.push(ExcludedCandidate {
                        family,
                        reason: ExclusionReason::FitFailed(match e {
                            Error::Fitting { reason, .. } => reason,
                            other => other.to_string(),
                        }),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if fits.is_empty() {
            let reasons: Vec<String> = excluded
                .iter()
                .map(|c| c.to_warning().to_string())
                .collect();
            return Err(Error::Ensemble(reasons.join("; ")));
        }

        let weights = match self.mode {
            AnalysisMode::Single(_) => vec![1.0],
            AnalysisMode::Averaged => {
                let aicc: Vec<f64> = fits.iter().map(|f| f.aicc).collect();
                akaike_weights(&aicc)?
            }
        };
        for (fit, w) in fits.iter_mut().zip(weights) {
            fit.weight = w;
            debug!(family = %fit.family, aicc = fit.aicc, weight = w, "candidate weight");
        }

        let weighted_hcp = fits.iter().map(|f| f.weight * f.hcp).sum();
        let weighted_cdf = grid
            .points()
            .iter()
            .map(|&x| fits.iter().map(|f| f.weight * f.cdf(x)).sum())
            .collect();

        Ok(EnsembleResult {
            fits,
            excluded,
            weighted_hcp,
            weighted_cdf,
        })
    }
}
