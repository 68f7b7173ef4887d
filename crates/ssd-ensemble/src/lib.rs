//! Model-averaged species sensitivity distributions
//!
//! [`ModelEnsemble`] fits the candidate families selected by an
//! [`AnalysisMode`](ssd_core::AnalysisMode), drops candidates that fail,
//! assigns Akaike weights to the survivors and combines their HCp values and
//! CDFs. The CDF is evaluated on a [`ConcentrationGrid`] derived from the
//! original data.

pub mod ensemble;
pub mod grid;
pub mod weights;

pub use ensemble::{EnsembleResult, ExcludedCandidate, ExclusionReason, ModelEnsemble};
pub use grid::ConcentrationGrid;
pub use weights::akaike_weights;
