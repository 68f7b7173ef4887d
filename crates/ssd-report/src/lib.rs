//! Report assembly for species sensitivity distributions
//!
//! Turns the ensemble fitted to the original data and the bootstrap output
//! into a serializable [`SsdReport`]: the HCp and its interval, a diagnostics
//! table, plot-ready series and the accumulated warnings. Failures are
//! reported as [`AnalysisFailure`].

pub mod assembler;
pub mod diagnostics;
pub mod plot;
pub mod report;

pub use assembler::ResultAssembler;
pub use diagnostics::{diagnostics_table, DiagnosticsRow};
pub use plot::{empirical_points, EmpiricalPoint, HcpMarker, PlotData};
pub use report::{AnalysisFailure, BootstrapSummary, SsdReport};
