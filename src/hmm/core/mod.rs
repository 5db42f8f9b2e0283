//! core — shared HMM data, parameters, and emission families.
//!
//! Purpose
//! -------
//! Collect the domain building blocks for discrete-state hidden Markov
//! models: the validated observation container, the initial-state and
//! transition distributions, the emission families (Gaussian and
//! Poisson), and the validation helpers they all share. The inference and
//! estimation layers build on these primitives and assume their
//! invariants hold.
//!
//! Key behaviors
//! -------------
//! - Carry observations in validated [`ObsSequence`] instances (finite
//!   entries; counts additionally non-negative and integer-valued).
//! - Own probability parameters in [`StartModel`] and [`TransitionModel`],
//!   validated stochastic at construction and re-normalized at every
//!   M-step, each with a cached log view for the inference layer.
//! - Abstract the observation family behind [`EmissionModel`], with
//!   [`GaussianEmission`] (full-covariance, Cholesky-backed) and
//!   [`PoissonEmission`] (independent per-channel rates) as the concrete
//!   implementations.
//! - Centralize tolerance conventions and numeric checks in
//!   [`validation`], keyed on [`PROB_ATOL`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every probability row/vector held by a constructed parameter object
//!   sums to 1 within [`PROB_ATOL`]; log caches are always element-wise
//!   `ln` of the current probabilities (zero maps to `-inf`).
//! - Gaussian covariances are symmetric positive definite; constructors
//!   and M-steps verify this via Cholesky factorization.
//! - Parameter objects are single-owner values; nothing in this module
//!   shares mutable state, so independent models are freely usable from
//!   separate threads.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; observation rows store the oldest timestep at
//!   index 0. Permutations map old label `i` to `perm[i]`.
//! - This module performs no I/O and no logging; error conditions are
//!   surfaced as [`HMMResult`](crate::hmm::errors::HMMResult).

pub mod data;
pub mod emissions;
pub mod start;
pub mod transition;
pub mod validation;

pub use self::data::ObsSequence;
pub use self::emissions::{EmissionModel, GaussianEmission, PoissonEmission};
pub use self::start::StartModel;
pub use self::transition::TransitionModel;
pub use self::validation::PROB_ATOL;
