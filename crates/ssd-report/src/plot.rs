//! Plot-ready series aligned on one concentration grid
//!
//! All curve values are percentages and are capped at the largest empirical
//! plotting position, so no series extends above the data.

use serde::Serialize;
use ssd_confidence::ConfidenceInterval;
use ssd_core::Observation;

/// One observed concentration with its plotting position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmpiricalPoint {
    pub concentration: f64,
    /// `i / (n + 1) * 100` for the i-th smallest of n values
    pub percentile: f64,
    pub species_id: String,
    pub group_label: Option<String>,
}

/// Location of the HCp on the plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HcpMarker {
    pub concentration: f64,
    pub percent: f64,
}

/// Everything a presentation layer needs to draw the SSD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub empirical: Vec<EmpiricalPoint>,
    pub grid: Vec<f64>,
    pub fitted_percent: Vec<f64>,
    pub lower_percent: Option<Vec<f64>>,
    pub upper_percent: Option<Vec<f64>>,
    pub hcp_marker: HcpMarker,
}

/// Empirical plotting positions of valid observations, ascending.
///
/// Ties keep their input order.
pub fn empirical_points<'a, I>(observations: I) -> Vec<EmpiricalPoint>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut valid: Vec<&Observation> = observations.into_iter().filter(|o| o.is_valid()).collect();
    valid.sort_by(|a, b| a.concentration.total_cmp(&b.concentration));
    let n = valid.len() as f64;
    valid
        .into_iter()
        .enumerate()
        .map(|(i, o)| EmpiricalPoint {
            concentration: o.concentration,
            percentile: (i + 1) as f64 / (n + 1.0) * 100.0,
            species_id: o.species_id.clone(),
            group_label: o.group_label.clone(),
        })
        .collect()
}

fn capped_percent(values: impl Iterator<Item = f64>, cap: f64) -> Vec<f64> {
    values.map(|v| (v * 100.0).min(cap)).collect()
}

impl PlotData {
    /// Build the plot bundle.
    ///
    /// `weighted_cdf` holds probabilities on `grid`; `band`, when present,
    /// holds one interval per grid point.
    pub fn new(
        empirical: Vec<EmpiricalPoint>,
        grid: &[f64],
        weighted_cdf: &[f64],
        band: Option<&[ConfidenceInterval]>,
        hcp: f64,
        protection_level: f64,
    ) -> Self {
        let cap = empirical.last().map_or(100.0, |p| p.percentile);

        let fitted_percent = capped_percent(weighted_cdf.iter().copied(), cap);
        let lower_percent = band.map(|b| capped_percent(b.iter().map(|ci| ci.lower), cap));
        let upper_percent = band.map(|b| capped_percent(b.iter().map(|ci| ci.upper), cap));

        Self {
            empirical,
            grid: grid.to_vec(),
            fitted_percent,
            lower_percent,
            upper_percent,
            hcp_marker: HcpMarker {
                concentration: hcp,
                percent: protection_level * 100.0,
            },
        }
    }

    /// Largest empirical plotting position
    pub fn cap(&self) -> f64 {
        self.empirical.last().map_or(100.0, |p| p.percentile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empirical_positions() {
        let obs = vec![
            Observation::new("c", 3.0),
            Observation::new("a", 1.0).with_group("Fish"),
            Observation::new("bad", -1.0),
            Observation::new("b", 2.0),
        ];
        let points = empirical_points(&obs);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].species_id, "a");
        assert_eq!(points[0].group_label.as_deref(), Some("Fish"));
        assert_relative_eq!(points[0].percentile, 25.0);
        assert_relative_eq!(points[2].percentile, 75.0);
    }

    #[test]
    fn test_curves_are_capped() {
        let obs: Vec<Observation> = (1..=3)
            .map(|i| Observation::new(format!("s{i}"), i as f64))
            .collect();
        let points = empirical_points(&obs);
        let grid = [0.5, 1.0, 5.0];
        let cdf = [0.1, 0.5, 0.99];
        let band = [
            ConfidenceInterval::new(0.05, 0.2, 0.1, 0.95),
            ConfidenceInterval::new(0.3, 0.7, 0.5, 0.95),
            ConfidenceInterval::new(0.9, 1.0, 0.99, 0.95),
        ];

        let plot = PlotData::new(points, &grid, &cdf, Some(&band), 0.4, 0.05);
        assert_relative_eq!(plot.cap(), 75.0);
        assert_relative_eq!(plot.fitted_percent[0], 10.0);
        assert_relative_eq!(plot.fitted_percent[2], 75.0);
        assert_relative_eq!(plot.upper_percent.as_ref().unwrap()[2], 75.0);
        assert_relative_eq!(plot.lower_percent.as_ref().unwrap()[0], 5.0);
        assert_relative_eq!(plot.hcp_marker.percent, 5.0);
    }

    #[test]
    fn test_missing_band() {
        let points = empirical_points(&[Observation::new("x", 1.0)]);
        let plot = PlotData::new(points, &[1.0], &[0.5], None, 0.1, 0.05);
        assert!(plot.lower_percent.is_none());
        assert!(plot.upper_percent.is_none());
    }
}
