//! Merging the original ensemble with bootstrap output

use crate::diagnostics::diagnostics_table;
use crate::plot::{empirical_points, PlotData};
use crate::report::{BootstrapSummary, SsdReport};
use ssd_confidence::BootstrapOutput;
use ssd_core::{AnalysisMode, Dataset, WarningLog};
use ssd_ensemble::{ConcentrationGrid, EnsembleResult};
use tracing::debug;

/// Builds the final [`SsdReport`]
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    mode: AnalysisMode,
    protection_level: f64,
}

impl ResultAssembler {
    pub fn new(mode: AnalysisMode, protection_level: f64) -> Self {
        Self {
            mode,
            protection_level,
        }
    }

    /// Combine everything produced for one dataset.
    ///
    /// `dataset` supplies the empirical series; only its valid observations
    /// are plotted.
    pub fn assemble(
        &self,
        dataset: &Dataset,
        grid: &ConcentrationGrid,
        original: &EnsembleResult,
        bootstrap: BootstrapOutput,
        warnings: WarningLog,
    ) -> SsdReport {
        let diagnostics = diagnostics_table(original);
        let empirical = empirical_points(dataset.observations());
        let sample_size = empirical.len();

        let plot = PlotData::new(
            empirical,
            grid.points(),
            &original.weighted_cdf,
            bootstrap.band.as_deref(),
            original.weighted_hcp,
            self.protection_level,
        );

        debug!(
            rows = diagnostics.len(),
            warnings = warnings.len(),
            "assembled report"
        );

        SsdReport {
            mode: self.mode,
            protection_level: self.protection_level,
            sample_size,
            hcp: original.weighted_hcp,
            hcp_interval: bootstrap.hcp_interval,
            diagnostics,
            plot,
            bootstrap: BootstrapSummary {
                requested: bootstrap.requested,
                successes: bootstrap.successes,
            },
            warnings: warnings.into_vec(),
        }
    }
}
