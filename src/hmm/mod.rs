//! hmm — discrete-state hidden Markov model stack: core parameters,
//! model containers, and errors.
//!
//! Purpose
//! -------
//! Provide a cohesive hidden-Markov-model layer that bundles validated
//! data and parameter types, the emission-family abstraction, the
//! user-facing [`HMM`] container, and shared error types under a single
//! namespace. This is the surface most consumers should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect domain building blocks in [`core`]: the observation
//!   container, initial-state and transition distributions, Gaussian and
//!   Poisson emission families, and shared validation helpers.
//! - Expose the model API in [`models`] via [`HMM`]: ancestral sampling,
//!   marginal scoring, posterior smoothing, Viterbi decoding, EM fitting,
//!   and state relabeling.
//! - Centralize domain error types in [`errors`] ([`HMMError`] and the
//!   [`HMMResult`] alias) so callers see a uniform error surface, with
//!   inference-layer failures wrapped rather than flattened.
//! - Re-export the everyday types directly from this module and via
//!   [`prelude`] for ergonomic imports.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations are carried in validated [`ObsSequence`] instances:
//!   finite, non-empty, and (for the Poisson path) non-negative
//!   integer-valued counts.
//! - All probability parameters are stochastic within
//!   [`PROB_ATOL`](crate::hmm::core::PROB_ATOL) for the model's whole
//!   lifetime; constructors validate and M-steps re-normalize.
//! - A constructed [`HMM`] has components agreeing on the state count K
//!   and dimensionality D, so the inference layer never sees
//!   inconsistent shapes.
//! - Models own their parameters and RNG state is injected per call;
//!   independent fits can run on separate threads without coordination.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout; observation rows store the oldest
//!   timestep at index 0.
//! - Likelihood work is done in log space end to end; `-inf` encodes
//!   zero probability and flows through the recursions without
//!   special-casing.
//! - State relabeling uses `perm[old] = new` everywhere, and applying a
//!   permutation never changes any sequence's likelihood.
//! - The stack performs no I/O; the only logging lives in the estimation
//!   layer's monotonicity warning. Errors are surfaced as [`HMMResult`];
//!   panics indicate programming errors.
//!
//! Downstream usage
//! ----------------
//! - Typical end-to-end flow:
//!   1. Construct an [`ObsSequence`] (via `new` or `counts`).
//!   2. Build an emission family ([`GaussianEmission`] or
//!      [`PoissonEmission`]) and wrap it with [`HMM::uniform`].
//!   3. Fit with [`HMM::fit`] given
//!      [`EMOptions`](crate::estimation::EMOptions) and an
//!      [`Init`](crate::estimation::Init) policy.
//!   4. Decode with [`HMM::most_likely_states`], score held-out data with
//!      [`HMM::log_probability`], or inspect [`HMM::results`].
//! - When comparing fits against a reference labeling, align labels with
//!   the [`alignment`](crate::alignment) utilities and apply the result
//!   through [`HMM::permute_states`].
//!
//! Testing notes
//! -------------
//! - Unit tests in [`core`] cover construction validation, reestimation
//!   normalization and smoothing, closed-form density values, seeded
//!   sampling determinism, and permutation relabeling.
//! - Unit tests in [`models`] cover component agreement, sampling shapes,
//!   scoring coherence, and permutation invariance of the likelihood.
//! - End-to-end recovery of generating parameters from sampled data is
//!   exercised by the integration tests.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    EmissionModel, GaussianEmission, ObsSequence, PoissonEmission, StartModel,
    TransitionModel,
};

pub use self::errors::{HMMError, HMMResult};

pub use self::models::HMM;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::{
        EmissionModel, GaussianEmission, HMM, HMMError, HMMResult, ObsSequence,
        PoissonEmission, StartModel, TransitionModel,
    };
}
