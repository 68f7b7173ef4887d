//! Nonparametric bootstrap over the model ensemble
//!
//! Each iteration resamples the original valid concentrations with
//! replacement, re-runs the ensemble with the same mode and grid, and records
//! the weighted HCp and the weighted CDF curve. Iterations that fail are
//! counted and skipped. Aggregation happens only after every iteration has
//! finished.
//!
//! Iteration `i` draws from sub-stream `i` of a ChaCha8 generator seeded once
//! from the caller's seed, so results do not depend on the execution engine
//! or the order in which iterations complete.

use crate::methods::{BootstrapMethod, PercentileBootstrap};
use crate::types::{ConfidenceInterval, ConfidenceLevel};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ssd_core::{
    CancellationToken, Error, ExecutionEngine, NullProgress, ProgressObserver, Result, Warning,
    DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_RELIABILITY_THRESHOLD, DEFAULT_SEED,
};
use ssd_ensemble::{ConcentrationGrid, EnsembleResult, ModelEnsemble};
use ssd_fit::FitOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument};

/// Fewer successful iterations than this and no interval is formed
pub const MIN_SUCCESSFUL_ITERATIONS: usize = 3;

/// Raw bootstrap distribution before aggregation
#[derive(Debug, Clone)]
pub struct BootstrapDistribution {
    /// Weighted HCp of every successful iteration, in iteration order
    pub hcp: Vec<f64>,
    /// Weighted CDF curve of every successful iteration, aligned with `hcp`
    pub curves: Vec<Vec<f64>>,
    pub requested: usize,
    /// Failed iterations as `(iteration, reason)`
    pub failures: Vec<(usize, String)>,
}

impl BootstrapDistribution {
    pub fn successes(&self) -> usize {
        self.hcp.len()
    }

    pub fn discarded(&self) -> usize {
        self.failures.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.successes() as f64 / self.requested as f64
        }
    }

    /// Values of every successful curve at one grid point; `None` if any
    /// curve is shorter than `index + 1`
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        self.curves.iter().map(|c| c.get(index).copied()).collect()
    }
}

/// Aggregated bootstrap output
#[derive(Debug, Clone)]
pub struct BootstrapOutput {
    /// Interval for the weighted HCp; `None` when too few iterations succeeded
    pub hcp_interval: Option<ConfidenceInterval>,
    /// Pointwise interval for the weighted CDF at every grid point
    pub band: Option<Vec<ConfidenceInterval>>,
    pub successes: usize,
    pub requested: usize,
    pub warnings: Vec<Warning>,
}

enum Iteration {
    Success { hcp: f64, curve: Vec<f64> },
    Failed(Error),
    Cancelled,
}

fn discard(iteration: usize, reason: impl Into<String>) -> Iteration {
    Iteration::Failed(Error::BootstrapIteration {
        iteration,
        reason: reason.into(),
    })
}

/// Bootstrap engine driving resampling through an [`ExecutionEngine`]
#[derive(Clone)]
pub struct BootstrapEngine<E, M = PercentileBootstrap> {
    engine: E,
    method: M,
    iterations: usize,
    confidence_level: ConfidenceLevel,
    seed: u64,
    reliability_threshold: f64,
}

impl<E: ExecutionEngine> BootstrapEngine<E, PercentileBootstrap> {
    /// Percentile bootstrap on `engine`
    pub fn percentile(engine: E) -> Self {
        Self::new(engine, PercentileBootstrap)
    }
}

impl<E, M> BootstrapEngine<E, M>
where
    E: ExecutionEngine,
    M: BootstrapMethod,
{
    /// Create a new bootstrap engine
    pub fn new(engine: E, method: M) -> Self {
        Self {
            engine,
            method,
            iterations: DEFAULT_BOOTSTRAP_ITERATIONS,
            confidence_level: ConfidenceLevel::default(),
            seed: DEFAULT_SEED,
            reliability_threshold: DEFAULT_RELIABILITY_THRESHOLD,
        }
    }

    /// Set the number of bootstrap iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        assert!(iterations > 0, "Number of bootstrap iterations must be positive");
        self.iterations = iterations;
        self
    }

    /// Set the confidence level
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = ConfidenceLevel::new(confidence_level);
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Minimum success rate below which a reliability warning is raised
    pub fn with_reliability_threshold(mut self, threshold: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&threshold),
            "Reliability threshold must be in [0, 1]"
        );
        self.reliability_threshold = threshold;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Resample and aggregate in one step
    pub fn run(
        &self,
        sample: &[f64],
        ensemble: &ModelEnsemble,
        grid: &ConcentrationGrid,
        original: &EnsembleResult,
    ) -> Result<BootstrapOutput> {
        self.run_observed(
            sample,
            ensemble,
            grid,
            original,
            &NullProgress,
            &CancellationToken::new(),
        )
    }

    /// [`run`](Self::run) with a progress observer and a cancellation token
    pub fn run_observed(
        &self,
        sample: &[f64],
        ensemble: &ModelEnsemble,
        grid: &ConcentrationGrid,
        original: &EnsembleResult,
        progress: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<BootstrapOutput> {
        let distribution = self.resample(sample, ensemble, grid, progress, cancel)?;
        self.summarize(&distribution, original)
    }

    /// Run every iteration and collect the raw bootstrap distribution.
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before all iterations
    /// have run; no partial distribution is returned.
    #[instrument(
        skip_all,
        fields(n = sample.len(), iterations = self.iterations, seed = self.seed)
    )]
    pub fn resample(
        &self,
        sample: &[f64],
        ensemble: &ModelEnsemble,
        grid: &ConcentrationGrid,
        progress: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<BootstrapDistribution> {
        if sample.is_empty() {
            return Err(Error::InvalidInput("Empty sample".to_string()));
        }

        let n = sample.len();
        let total = self.iterations;
        let ensemble = ensemble.clone().with_fit_options(FitOptions::bootstrap());
        let base_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let completed = AtomicUsize::new(0);

        debug!(
            strategy = ?self.engine.strategy(),
            threads = self.engine.num_threads(),
            "running bootstrap"
        );

        let outcomes = self.engine.execute_batch(total, |i| {
            if cancel.is_cancelled() {
                return Iteration::Cancelled;
            }

            let mut rng = base_rng.clone();
            rng.set_stream(i as u64);
            let resample: Vec<f64> = (0..n).map(|_| sample[rng.gen_range(0..n)]).collect();

            let outcome = match ensemble.fit(&resample, grid) {
                Ok(result) if result.weighted_hcp.is_finite() && result.weighted_hcp > 0.0 => {
                    Iteration::Success {
                        hcp: result.weighted_hcp,
                        curve: result.weighted_cdf,
                    }
                }
                Ok(result) => discard(i, format!("invalid weighted HCp ({})", result.weighted_hcp)),
                Err(e) => discard(i, e.to_string()),
            };

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.on_progress(done, total);
            outcome
        });

        let mut distribution = BootstrapDistribution {
            hcp: Vec::with_capacity(total),
            curves: Vec::with_capacity(total),
            requested: total,
            failures: Vec::new(),
        };
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                Iteration::Success { hcp, curve } => {
                    distribution.hcp.push(hcp);
                    distribution.curves.push(curve);
                }
                Iteration::Failed(e) => {
                    debug!(error = %e, "discarded bootstrap iteration");
                    if let Error::BootstrapIteration { iteration, reason } = e {
                        distribution.failures.push((iteration, reason));
                    }
                }
                Iteration::Cancelled => cancelled = true,
            }
        }

        if cancelled {
            return Err(Error::Cancelled {
                completed: completed.load(Ordering::Relaxed),
                total,
            });
        }

        info!(
            successes = distribution.successes(),
            discarded = distribution.discarded(),
            "bootstrap finished"
        );
        Ok(distribution)
    }

    /// Turn a bootstrap distribution into intervals and warnings
    pub fn summarize(
        &self,
        distribution: &BootstrapDistribution,
        original: &EnsembleResult,
    ) -> Result<BootstrapOutput> {
        let grid_len = original.weighted_cdf.len();
        if distribution.curves.len() != distribution.hcp.len() {
            return Err(Error::InvalidInput(format!(
                "{} bootstrap curves for {} HCp values",
                distribution.curves.len(),
                distribution.hcp.len()
            )));
        }
        if let Some(curve) = distribution.curves.iter().find(|c| c.len() != grid_len) {
            return Err(Error::InvalidInput(format!(
                "bootstrap curve has {} points, grid has {grid_len}",
                curve.len()
            )));
        }

        let successes = distribution.successes();
        let requested = distribution.requested;
        let mut warnings = Vec::new();

        if distribution.discarded() > 0 {
            warnings.push(Warning::IterationsDiscarded {
                discarded: distribution.discarded(),
                requested,
            });
        }
        if distribution.success_rate() < self.reliability_threshold {
            warnings.push(Warning::Unreliable {
                successes,
                requested,
                threshold: self.reliability_threshold,
            });
        }

        if successes < MIN_SUCCESSFUL_ITERATIONS {
            warnings.push(Warning::IntervalsUnavailable { successes });
            return Ok(BootstrapOutput {
                hcp_interval: None,
                band: None,
                successes,
                requested,
                warnings,
            });
        }

        let hcp_interval = self.method.calculate_interval(
            &distribution.hcp,
            original.weighted_hcp,
            self.confidence_level,
        )?;

        let band = original
            .weighted_cdf
            .iter()
            .enumerate()
            .map(|(j, &estimate)| {
                let column = distribution.column(j).ok_or_else(|| {
                    Error::InvalidInput(format!("bootstrap curves are missing grid point {j}"))
                })?;
                self.method
                    .calculate_interval(&column, estimate, self.confidence_level)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BootstrapOutput {
            hcp_interval: Some(hcp_interval),
            band: Some(band),
            successes,
            requested,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssd_core::{sequential, AnalysisMode, DistributionFamily, FnProgress};
    use std::sync::Mutex;

    const SAMPLE: [f64; 12] = [0.4, 0.9, 1.2, 1.7, 2.3, 2.9, 3.8, 4.4, 6.1, 7.9, 11.0, 15.5];

    fn setup(mode: AnalysisMode) -> (ModelEnsemble, ConcentrationGrid, EnsembleResult) {
        let ensemble = ModelEnsemble::new(mode, 0.05);
        let grid = ConcentrationGrid::from_sample(&SAMPLE).unwrap();
        let original = ensemble.fit(&SAMPLE, &grid).unwrap();
        (ensemble, grid, original)
    }

    #[test]
    fn test_bootstrap_construction() {
        let engine = BootstrapEngine::percentile(sequential())
            .with_iterations(50)
            .with_seed(7)
            .with_confidence_level(0.9);
        assert_eq!(engine.iterations(), 50);
        assert_eq!(engine.seed(), 7);
    }

    #[test]
    #[should_panic(expected = "Number of bootstrap iterations must be positive")]
    fn test_zero_iterations_panics() {
        let _ = BootstrapEngine::percentile(sequential()).with_iterations(0);
    }

    #[test]
    fn test_same_seed_same_distribution() {
        let (ensemble, grid, _) = setup(AnalysisMode::Single(DistributionFamily::LogNormal));
        let engine = BootstrapEngine::percentile(sequential()).with_iterations(40).with_seed(42);
        let token = CancellationToken::new();
        let a = engine.resample(&SAMPLE, &ensemble, &grid, &NullProgress, &token).unwrap();
        let b = engine.resample(&SAMPLE, &ensemble, &grid, &NullProgress, &token).unwrap();
        assert_eq!(a.hcp, b.hcp);

        let c = engine
            .clone()
            .with_seed(43)
            .resample(&SAMPLE, &ensemble, &grid, &NullProgress, &token)
            .unwrap();
        assert_ne!(a.hcp, c.hcp);
    }

    #[test]
    fn test_interval_contains_estimate() {
        let (ensemble, grid, original) = setup(AnalysisMode::Averaged);
        let out = BootstrapEngine::percentile(sequential())
            .with_iterations(200)
            .run(&SAMPLE, &ensemble, &grid, &original)
            .unwrap();

        let ci = out.hcp_interval.unwrap();
        assert!(ci.lower <= ci.upper);
        assert!(ci.lower > 0.0);
        assert_eq!(ci.estimate, original.weighted_hcp);

        let band = out.band.unwrap();
        assert_eq!(band.len(), grid.len());
        assert!(band.iter().all(|b| b.lower <= b.upper));
        assert_eq!(out.requested, 200);
        assert!(out.successes <= 200);
    }

    #[test]
    fn test_summarize_rejects_misaligned_curves() {
        let (_, grid, original) = setup(AnalysisMode::Single(DistributionFamily::LogNormal));
        let engine = BootstrapEngine::percentile(sequential());
        let full = original.weighted_cdf.clone();

        let short = BootstrapDistribution {
            hcp: vec![0.3, 0.4, 0.5, 0.6],
            curves: vec![full.clone(), full.clone(), full[..grid.len() - 1].to_vec(), full.clone()],
            requested: 4,
            failures: Vec::new(),
        };
        let err = engine.summarize(&short, &original).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(short.column(grid.len() - 1), None);

        let unpaired = BootstrapDistribution {
            hcp: vec![0.3, 0.4, 0.5],
            curves: vec![full.clone(), full],
            requested: 3,
            failures: Vec::new(),
        };
        assert!(matches!(
            engine.summarize(&unpaired, &original),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_progress_reaches_total() {
        let (ensemble, grid, original) = setup(AnalysisMode::Single(DistributionFamily::Gamma));
        let last = Mutex::new(0usize);
        let token = CancellationToken::new();
        let observer = FnProgress::new(|done, _total| {
            let mut last = last.lock().unwrap();
            *last = (*last).max(done);
        });
        BootstrapEngine::percentile(sequential())
            .with_iterations(25)
            .run_observed(&SAMPLE, &ensemble, &grid, &original, &observer, &token)
            .unwrap();
        assert_eq!(*last.lock().unwrap(), 25);
    }

    #[test]
    fn test_cancellation() {
        let (ensemble, grid, _) = setup(AnalysisMode::Single(DistributionFamily::LogNormal));
        let token = CancellationToken::new();
        let cancel_after = FnProgress::new(|done, _total| {
            if done == 5 {
                token.cancel();
            }
        });
        let err = BootstrapEngine::percentile(sequential())
            .with_iterations(100)
            .resample(&SAMPLE, &ensemble, &grid, &cancel_after, &token)
            .unwrap_err();
        match err {
            Error::Cancelled { completed, total } => {
                assert_eq!(completed, 5);
                assert_eq!(total, 100);
            }
            other => panic!("expected cancellation, got {other}"),
        }
    }

    #[test]
    fn test_too_few_successes() {
        let (_, _, original) = setup(AnalysisMode::Averaged);
        let distribution = BootstrapDistribution {
            hcp: vec![0.2, 0.3],
            curves: vec![original.weighted_cdf.clone(), original.weighted_cdf.clone()],
            requested: 10,
            failures: (0..8).map(|i| (i, "no candidate survived".to_string())).collect(),
        };
        let out = BootstrapEngine::percentile(sequential())
            .summarize(&distribution, &original)
            .unwrap();
        assert!(out.hcp_interval.is_none());
        assert!(out.band.is_none());
        assert!(out.warnings.contains(&Warning::IntervalsUnavailable { successes: 2 }));
        assert!(out
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::Unreliable { successes: 2, requested: 10, .. })));
        assert!(out
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::IterationsDiscarded { discarded: 8, .. })));
    }

    #[test]
    fn test_reliability_warning_keeps_bounds() {
        let (_, _, original) = setup(AnalysisMode::Averaged);
        let distribution = BootstrapDistribution {
            hcp: vec![0.2, 0.25, 0.3, 0.35],
            curves: vec![original.weighted_cdf.clone(); 4],
            requested: 10,
            failures: (0..6).map(|i| (i, "x".to_string())).collect(),
        };
        let out = BootstrapEngine::percentile(sequential())
            .summarize(&distribution, &original)
            .unwrap();
        assert!(out.hcp_interval.is_some());
        assert!(out.warnings.iter().any(|w| matches!(w, Warning::Unreliable { .. })));
    }
}
