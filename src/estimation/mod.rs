//! estimation — Baum-Welch EM fitting for HMMs.
//!
//! Purpose
//! -------
//! Drive maximum-likelihood parameter estimation: configuration
//! ([`EMOptions`]), emission-location initialization policies ([`Init`]),
//! and the EM loop itself ([`run_em`]), which alternates forward-backward
//! E-steps with the closed-form M-steps of the domain layer.
//!
//! Key behaviors
//! -------------
//! - Termination is explicit: [`FitStatus::Converged`] when the
//!   log-likelihood change drops below tolerance,
//!   [`FitStatus::MaxIterationsReached`] when the budget runs out. Both
//!   are normal; neither is an error.
//! - The full log-likelihood trace is returned in [`FitOutcome`] for
//!   post-hoc inspection.
//! - A decrease beyond [`MONOTONICITY_ATOL`] logs a warning (`log`
//!   crate) and the fit continues.
//!
//! Conventions
//! -----------
//! - All randomness is drawn from a caller-provided RNG; a seeded
//!   generator makes initialization and therefore the whole fit
//!   reproducible.
//! - Errors are surfaced as [`EstimationResult`], wrapping domain and
//!   inference failures alongside option-validation variants.

pub mod em;
pub mod errors;
pub mod init;
pub mod options;

pub use self::em::{run_em, FitOutcome, FitStatus, MONOTONICITY_ATOL};
pub use self::errors::{EstimationError, EstimationResult};
pub use self::init::{initial_locations, Init};
pub use self::options::EMOptions;
