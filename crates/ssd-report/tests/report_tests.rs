use proptest::prelude::*;
use ssd_confidence::BootstrapEngine;
use ssd_core::{sequential, AnalysisMode, Dataset, Observation, Warning, WarningLog};
use ssd_ensemble::{ConcentrationGrid, ModelEnsemble};
use ssd_report::{empirical_points, ResultAssembler};

fn dataset() -> Dataset {
    let values = [0.35, 0.8, 1.2, 1.6, 2.7, 3.1, 4.9, 6.6, 9.4, 14.2, 21.0, 37.5];
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let group = if i % 2 == 0 { "Fish" } else { "Invertebrate" };
            Observation::new(format!("sp{i}"), v).with_group(group)
        })
        .collect()
}

#[test]
fn test_assembled_report_serializes() {
    let data = dataset();
    let sample = data.require_valid().unwrap();
    let grid = ConcentrationGrid::from_sample(&sample).unwrap();
    let ensemble = ModelEnsemble::new(AnalysisMode::Averaged, 0.05);
    let original = ensemble.fit(&sample, &grid).unwrap();
    let bootstrap = BootstrapEngine::percentile(sequential())
        .with_iterations(60)
        .run(&sample, &ensemble, &grid, &original)
        .unwrap();

    let mut warnings = WarningLog::new();
    for w in original.warnings().into_iter().chain(bootstrap.warnings.clone()) {
        warnings.push(w);
    }

    let report = ResultAssembler::new(AnalysisMode::Averaged, 0.05).assemble(
        &data,
        &grid,
        &original,
        bootstrap,
        warnings,
    );

    assert_eq!(report.sample_size, 12);
    assert_eq!(report.plot.grid.len(), report.plot.fitted_percent.len());
    assert_eq!(report.plot.hcp_marker.concentration, report.hcp);
    assert!(report.to_string().starts_with("HC5"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "averaged");
    assert!(json["diagnostics"].as_array().unwrap().len() >= 1);
    assert_eq!(json["plot"]["empirical"][0]["group_label"], "Fish");
}

#[test]
fn test_warning_kinds_survive_serialization() {
    let w = Warning::IntervalsUnavailable { successes: 1 };
    let json = serde_json::to_value(&w).unwrap();
    assert_eq!(json["kind"], "intervals_unavailable");
}

proptest! {
    // Property: empirical percentiles are strictly increasing and inside (0, 100)
    #[test]
    fn prop_empirical_series(values in prop::collection::vec(1e-6f64..1e6, 1..100)) {
        let ds = Dataset::from_concentrations(&values);
        let points = empirical_points(ds.observations());
        prop_assert_eq!(points.len(), values.len());
        for w in points.windows(2) {
            prop_assert!(w[0].percentile < w[1].percentile);
            prop_assert!(w[0].concentration <= w[1].concentration);
        }
        prop_assert!(points.iter().all(|p| p.percentile > 0.0 && p.percentile < 100.0));
    }
}
