//! Property-based tests for the shared numerical helpers and dataset handling

use proptest::prelude::*;
use ssd_core::math::{log_spaced_grid, percentile};
use ssd_core::{Dataset, Observation, SpeciesAggregation, GRID_POINTS};

proptest! {
    // Property: percentiles stay within the data range and are monotone in q
    #[test]
    fn prop_percentile_bounded_and_monotone(
        data in prop::collection::vec(-1e6f64..1e6, 1..200),
        q1 in 0.0f64..100.0,
        q2 in 0.0f64..100.0,
    ) {
        let (lo_q, hi_q) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let a = percentile(&data, lo_q).unwrap();
        let b = percentile(&data, hi_q).unwrap();
        prop_assert!(a >= min && a <= max);
        prop_assert!(b >= min && b <= max);
        prop_assert!(a <= b + 1e-9 * (1.0 + b.abs()));
    }

    // Property: the grid always covers the data with padding
    #[test]
    fn prop_grid_covers_data(min in 1e-6f64..1e3, span in 1.0f64..1e3) {
        let max = min * span;
        let grid = log_spaced_grid(min, max).unwrap();
        prop_assert_eq!(grid.len(), GRID_POINTS);
        prop_assert!(grid[0] < min);
        prop_assert!(grid[GRID_POINTS - 1] > max);
    }

    // Property: aggregation yields one value per species within that species' range
    #[test]
    fn prop_aggregation_one_per_species(
        values in prop::collection::vec((0usize..5, 1e-3f64..1e3), 1..60),
    ) {
        let ds: Dataset = values
            .iter()
            .map(|(s, v)| Observation::new(format!("sp{s}"), *v))
            .collect();

        for method in [SpeciesAggregation::GeometricMean, SpeciesAggregation::MostSensitive] {
            let agg = ds.aggregate(method);
            let mut species: Vec<_> =
                agg.observations().iter().map(|o| o.species_id.clone()).collect();
            let n = species.len();
            species.sort();
            species.dedup();
            prop_assert_eq!(species.len(), n);

            for obs in agg.observations() {
                let own: Vec<f64> = ds
                    .observations()
                    .iter()
                    .filter(|o| o.species_id == obs.species_id)
                    .map(|o| o.concentration)
                    .collect();
                let lo = own.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = own.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(obs.concentration >= lo * (1.0 - 1e-12));
                prop_assert!(obs.concentration <= hi * (1.0 + 1e-12));
            }
        }
    }
}
