//! Maximum-likelihood fitting of species sensitivity distributions
//!
//! [`fit_distribution`] fits one [`DistributionFamily`] to a sample of
//! positive concentrations and returns a [`FitResult`] carrying the
//! Jacobian-corrected log-likelihood, AICc, the hazard concentration at the
//! requested protection level and, optionally, goodness-of-fit statistics.
//!
//! Log-Normal and Log-Logistic are fitted on `ln(concentration)`; their
//! log-likelihoods are shifted by `-Σ ln x` so that AICc values are
//! comparable with the raw-scale Weibull and Gamma fits.
//!
//! ```rust
//! use ssd_core::DistributionFamily;
//! use ssd_fit::{fit_distribution, FitOptions};
//!
//! let data = [0.4, 1.1, 2.3, 3.0, 4.7, 8.2];
//! let fit = fit_distribution(DistributionFamily::LogNormal, &data, 0.05, FitOptions::default())?;
//! assert!(fit.hcp > 0.0 && fit.hcp < 1.0);
//! # Ok::<(), ssd_core::Error>(())
//! ```

pub mod aicc;
pub mod families;
pub mod fitter;
pub mod goodness;

pub use aicc::aicc;
pub use families::{FamilyModel, FittedModel};
pub use fitter::{fit_distribution, FitOptions, FitResult};
pub use goodness::{anderson_darling, ks_p_value, ks_statistic, GoodnessOfFit};

pub use ssd_core::DistributionFamily;
