//! Shared data model: observations, datasets and the closed family set.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Minimum number of valid observations required to fit an SSD.
pub const MIN_OBSERVATIONS: usize = 5;

/// A single toxicity endpoint for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub species_id: String,
    pub concentration: f64,
    /// Display-only grouping (e.g. taxonomic group) assigned upstream.
    #[serde(default)]
    pub group_label: Option<String>,
}

impl Observation {
    pub fn new(species_id: impl Into<String>, concentration: f64) -> Self {
        Self {
            species_id: species_id.into(),
            concentration,
            group_label: None,
        }
    }

    pub fn with_group(mut self, group_label: impl Into<String>) -> Self {
        self.group_label = Some(group_label.into());
        self
    }

    /// Positive and finite concentrations are usable for fitting.
    pub fn is_valid(&self) -> bool {
        self.concentration.is_finite() && self.concentration > 0.0
    }
}

impl Hash for Observation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.species_id.hash(state);
        self.concentration.to_bits().hash(state);
        self.group_label.hash(state);
    }
}

/// How repeated observations of the same species are collapsed before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesAggregation {
    /// Every observation is used as-is.
    #[default]
    None,
    /// One value per species: geometric mean of its valid concentrations.
    GeometricMean,
    /// One value per species: its lowest valid concentration.
    MostSensitive,
}

/// A collection of observations supplied by the data-retrieval layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Build a dataset from bare concentrations, naming species `S1..Sn`.
    pub fn from_concentrations(values: &[f64]) -> Self {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(format!("S{}", i + 1), v))
            .collect();
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Observations with a positive, finite concentration.
    pub fn valid_observations(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| o.is_valid())
    }

    /// Number of observations that will be dropped as invalid.
    pub fn invalid_count(&self) -> usize {
        self.observations.iter().filter(|o| !o.is_valid()).count()
    }

    /// Valid concentrations in input order.
    pub fn valid_concentrations(&self) -> Vec<f64> {
        self.valid_observations().map(|o| o.concentration).collect()
    }

    /// Valid concentrations, or `InsufficientData` when fewer than
    /// [`MIN_OBSERVATIONS`] remain.
    pub fn require_valid(&self) -> Result<Vec<f64>> {
        let values = self.valid_concentrations();
        if values.len() < MIN_OBSERVATIONS {
            return Err(Error::insufficient_data(MIN_OBSERVATIONS, values.len()));
        }
        Ok(values)
    }

    /// Collapse repeated species according to `method`.
    ///
    /// Invalid observations are dropped. Species keep their first-seen order
    /// and the group label of their first valid observation.
    pub fn aggregate(&self, method: SpeciesAggregation) -> Dataset {
        if method == SpeciesAggregation::None {
            return self.clone();
        }

        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, (Option<&String>, Vec<f64>)> = HashMap::new();
        for obs in self.valid_observations() {
            let entry = groups.entry(obs.species_id.as_str()).or_insert_with(|| {
                order.push(obs.species_id.as_str());
                (obs.group_label.as_ref(), Vec::new())
            });
            entry.1.push(obs.concentration);
        }

        let observations = order
            .into_iter()
            .filter_map(|species| {
                let (group, values) = groups.get(species)?;
                let concentration = match method {
                    SpeciesAggregation::GeometricMean => {
                        let n = values.len() as f64;
                        let mean_ln = values.iter().map(|v| v.ln()).sum::<f64>() / n;
                        mean_ln.exp()
                    }
                    SpeciesAggregation::MostSensitive => {
                        values.iter().copied().fold(f64::INFINITY, f64::min)
                    }
                    SpeciesAggregation::None => values[0],
                };
                Some(Observation {
                    species_id: species.to_string(),
                    concentration,
                    group_label: group.cloned(),
                })
            })
            .collect();

        Dataset { observations }
    }
}

impl Hash for Dataset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.observations.hash(state);
    }
}

impl FromIterator<Observation> for Dataset {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

/// Scale on which a family is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitScale {
    /// Fitted to `ln(concentration)`.
    Log,
    /// Fitted to the raw concentration with location fixed at 0.
    Raw,
}

impl FitScale {
    /// Map a concentration onto this scale.
    #[inline]
    pub fn transform(self, concentration: f64) -> f64 {
        match self {
            FitScale::Log => concentration.ln(),
            FitScale::Raw => concentration,
        }
    }

    /// Map a value on this scale back to concentration units.
    #[inline]
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            FitScale::Log => value.exp(),
            FitScale::Raw => value,
        }
    }
}

/// The closed set of candidate distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistributionFamily {
    #[serde(rename = "Log-Normal")]
    LogNormal,
    #[serde(rename = "Log-Logistic")]
    LogLogistic,
    Weibull,
    Gamma,
}

impl DistributionFamily {
    /// Every family, in reporting order.
    pub const ALL: [DistributionFamily; 4] = [
        DistributionFamily::LogNormal,
        DistributionFamily::LogLogistic,
        DistributionFamily::Weibull,
        DistributionFamily::Gamma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionFamily::LogNormal => "Log-Normal",
            DistributionFamily::LogLogistic => "Log-Logistic",
            DistributionFamily::Weibull => "Weibull",
            DistributionFamily::Gamma => "Gamma",
        }
    }

    /// Number of free parameters (used by AICc).
    pub fn param_count(self) -> usize {
        2
    }

    pub fn fit_scale(self) -> FitScale {
        match self {
            DistributionFamily::LogNormal | DistributionFamily::LogLogistic => FitScale::Log,
            DistributionFamily::Weibull | DistributionFamily::Gamma => FitScale::Raw,
        }
    }

    /// Names of the two fitted parameters, on the fit scale.
    pub fn param_names(self) -> [&'static str; 2] {
        match self {
            DistributionFamily::LogNormal | DistributionFamily::LogLogistic => ["loc", "scale"],
            DistributionFamily::Weibull | DistributionFamily::Gamma => ["shape", "scale"],
        }
    }
}

impl fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "lognormal" => Ok(DistributionFamily::LogNormal),
            "loglogistic" => Ok(DistributionFamily::LogLogistic),
            "weibull" => Ok(DistributionFamily::Weibull),
            "gamma" => Ok(DistributionFamily::Gamma),
            _ => Err(Error::InvalidParameter(format!(
                "Unknown distribution family '{s}'"
            ))),
        }
    }
}
