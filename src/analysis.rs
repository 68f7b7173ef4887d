//! The single entry point driving fitting, bootstrap and report assembly

use ssd_confidence::BootstrapEngine;
use ssd_core::{
    auto_engine, CancellationToken, Dataset, ExecutionEngine, ProgressObserver, Result,
    SsdConfig, TracingProgress, Warning, WarningLog,
};
use ssd_ensemble::{ConcentrationGrid, ModelEnsemble};
use ssd_report::{AnalysisFailure, ResultAssembler, SsdReport};
use tracing::{info, instrument};

/// Analyze `dataset` under `config` on the default execution engine,
/// logging bootstrap progress through `tracing`.
///
/// Every call ends in exactly one of two states: a complete [`SsdReport`],
/// or an [`AnalysisFailure`] carrying the reason and the warnings raised
/// before it.
pub fn analyze(
    dataset: &Dataset,
    config: &SsdConfig,
) -> std::result::Result<SsdReport, AnalysisFailure> {
    analyze_with(
        dataset,
        config,
        &auto_engine(),
        &TracingProgress::new("bootstrap"),
        &CancellationToken::new(),
    )
}

/// [`analyze`] with an explicit engine, progress observer and cancellation
/// token.
#[instrument(
    skip_all,
    fields(observations = dataset.len(), mode = %config.mode, p = config.protection_level)
)]
pub fn analyze_with<E: ExecutionEngine>(
    dataset: &Dataset,
    config: &SsdConfig,
    engine: &E,
    progress: &dyn ProgressObserver,
    cancel: &CancellationToken,
) -> std::result::Result<SsdReport, AnalysisFailure> {
    let mut warnings = WarningLog::new();
    match run(dataset, config, engine, progress, cancel, &mut warnings) {
        Ok(report) => {
            info!(hcp = report.hcp, warnings = report.warnings.len(), "analysis complete");
            Ok(report)
        }
        Err(error) => {
            info!(%error, "analysis failed");
            Err(AnalysisFailure::new(error, warnings.into_vec()))
        }
    }
}

fn run<E: ExecutionEngine>(
    dataset: &Dataset,
    config: &SsdConfig,
    engine: &E,
    progress: &dyn ProgressObserver,
    cancel: &CancellationToken,
    warnings: &mut WarningLog,
) -> Result<SsdReport> {
    config.validate()?;

    let dropped = dataset.invalid_count();
    if dropped > 0 {
        warnings.push(Warning::DroppedObservations { count: dropped });
    }

    let data = dataset.aggregate(config.species_aggregation);
    let sample = data.require_valid()?;
    let grid = ConcentrationGrid::from_sample(&sample)?;

    let ensemble = ModelEnsemble::new(config.mode, config.protection_level);
    let original = ensemble.fit(&sample, &grid)?;
    for warning in original.warnings() {
        warnings.push(warning);
    }

    let bootstrap = BootstrapEngine::percentile(engine.clone())
        .with_iterations(config.bootstrap_iterations)
        .with_seed(config.seed)
        .with_confidence_level(config.confidence_level)
        .with_reliability_threshold(config.reliability_threshold)
        .run_observed(&sample, &ensemble, &grid, &original, progress, cancel)?;
    for warning in bootstrap.warnings.iter().cloned() {
        warnings.push(warning);
    }

    let assembler = ResultAssembler::new(config.mode, config.protection_level);
    Ok(assembler.assemble(&data, &grid, &original, bootstrap, std::mem::take(warnings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssd_core::{sequential, Error, FnProgress, NullProgress, Observation};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_dataset() -> Dataset {
        Dataset::from_concentrations(&[0.4, 0.9, 1.3, 2.2, 3.0, 4.8, 7.1, 11.0, 16.5])
    }

    #[test]
    fn test_invalid_config_fails_before_fitting() {
        let config = SsdConfig {
            protection_level: 1.5,
            ..SsdConfig::default()
        };
        let failure = analyze(&sample_dataset(), &config).unwrap_err();
        assert!(matches!(failure.error, Error::InvalidParameter(_)));
        assert!(failure.warnings.is_empty());
    }

    #[test]
    fn test_dropped_observations_are_reported() {
        let mut data = sample_dataset();
        data.push(Observation::new("neg", -3.0));
        data.push(Observation::new("nan", f64::NAN));
        let config = SsdConfig::new().with_bootstrap_iterations(20);

        let report = analyze_with(
            &data,
            &config,
            &sequential(),
            &NullProgress,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.sample_size, 9);
        assert_eq!(report.warnings[0], Warning::DroppedObservations { count: 2 });
    }

    #[test]
    fn test_failure_keeps_earlier_warnings() {
        let data = Dataset::from_concentrations(&[1.0, 2.0, 3.0, -1.0]);
        let failure = analyze(&data, &SsdConfig::default()).unwrap_err();
        assert!(matches!(failure.error, Error::InsufficientData { .. }));
        assert_eq!(failure.warnings, vec![Warning::DroppedObservations { count: 1 }]);
    }

    #[test]
    fn test_progress_and_cancellation() {
        let calls = AtomicUsize::new(0);
        let progress = FnProgress::new(|_completed: usize, _total: usize| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        let config = SsdConfig::new().with_bootstrap_iterations(25);
        analyze_with(
            &sample_dataset(),
            &config,
            &sequential(),
            &progress,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 25);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let failure = analyze_with(
            &sample_dataset(),
            &config,
            &sequential(),
            &NullProgress,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(failure.error, Error::Cancelled { .. }));
    }
}
