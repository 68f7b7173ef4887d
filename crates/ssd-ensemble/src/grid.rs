use serde::Serialize;
use ssd_core::math::log_spaced_grid;
use ssd_core::{Error, Result};

/// Fixed log-spaced concentration grid on which CDFs are evaluated.
///
/// Built once from the original data and shared by every bootstrap
/// iteration so that curves line up point for point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConcentrationGrid {
    points: Vec<f64>,
}

impl ConcentrationGrid {
    /// Grid spanning `[ln min - 2, ln max + 2]` of the sample
    pub fn from_sample(sample: &[f64]) -> Result<Self> {
        if sample.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot build a grid from an empty sample".to_string(),
            ));
        }
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            points: log_spaced_grid(min, max)?,
        })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ssd_core::GRID_POINTS;

    #[test]
    fn test_grid_bounds() {
        let grid = ConcentrationGrid::from_sample(&[5.0, 0.5, 50.0]).unwrap();
        assert_eq!(grid.len(), GRID_POINTS);
        assert_relative_eq!(grid.points()[0], 0.5 * (-2.0f64).exp(), max_relative = 1e-12);
        let last = grid.points()[GRID_POINTS - 1];
        assert_relative_eq!(last, 50.0 * 2.0f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_bad_samples() {
        assert!(ConcentrationGrid::from_sample(&[]).is_err());
        assert!(ConcentrationGrid::from_sample(&[-1.0, 2.0]).is_err());
    }
}
