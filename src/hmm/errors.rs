//! Errors for discrete-state HMMs (data validation, parameter checks,
//! reestimation failures, and model-state guards).
//!
//! This module defines the model error type, [`HMMError`], used across the
//! domain layer (`hmm::core`, `hmm::models`). Inference-layer failures are
//! wrapped via [`HMMError::Inference`] so that model-level entry points
//! surface a single error surface to callers.
//!
//! ## Conventions
//! - **Indices are 0-based** and reported as `(row, col)` for data issues,
//!   `state` / `channel` for parameter issues.
//! - Probability vectors and transition rows must sum to 1 within `1e-9`
//!   absolute tolerance.
//! - Reestimation errors (`DegenerateCovariance`, `NegativeRate`,
//!   `NonStochasticRow`) identify the offending state so callers can decide
//!   on regularization or re-seeding policies; the engine never retries on
//!   its own.
use crate::inference::errors::InferenceError;

/// Crate-wide result alias for model operations that may produce [`HMMError`].
pub type HMMResult<T> = Result<T, HMMError>;

/// Unified error type for HMM construction, validation, and reestimation.
///
/// Covers observation-data validation, parameter construction, M-step
/// failures, and model-state guards. Implements `Display`/`Error`; inference
/// failures reached through model-level entry points are wrapped in
/// [`HMMError::Inference`].
#[derive(Debug, Clone, PartialEq)]
pub enum HMMError {
    // ---- Observation data validation ----
    /// Observation sequence has zero timesteps or zero channels.
    EmptySequence,

    /// An observation entry is NaN/±inf.
    NonFiniteData { row: usize, col: usize, value: f64 },

    /// A count observation is negative (Poisson path).
    NegativeCount { row: usize, col: usize, value: f64 },

    /// A count observation is not integer-valued (Poisson path).
    NonIntegerCount { row: usize, col: usize, value: f64 },

    /// Observation dimensionality disagrees with the model's D.
    DimensionMismatch { expected: usize, actual: usize },

    // ---- Parameter construction ----
    /// State count must satisfy K >= 1.
    InvalidStateCount { n_states: usize },

    /// State index out of range for a K-state model.
    StateOutOfRange { state: usize, n_states: usize },

    /// A probability vector fails to normalize (entries finite, >= 0,
    /// summing to 1 within tolerance).
    NonStochasticVector { sum: f64 },

    /// A transition row fails to normalize, either at construction or
    /// because it received zero total weight during reestimation.
    NonStochasticRow { state: usize, sum: f64 },

    /// A parameter entry is NaN/±inf.
    NonFiniteParam { state: usize, value: f64 },

    /// A covariance matrix is not symmetric.
    AsymmetricCovariance { state: usize },

    /// A Poisson rate is negative (at construction or after reestimation
    /// with malformed weights).
    NegativeRate { state: usize, channel: usize, value: f64 },

    // ---- Reestimation ----
    /// Weighted covariance is not positive definite after regularization.
    DegenerateCovariance { state: usize },

    /// Posterior weight matrix shape disagrees with (T, K).
    WeightShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A posterior weight is non-finite or negative.
    InvalidWeight { t: usize, state: usize, value: f64 },

    // ---- Permutations ----
    /// Permutation is not a bijection on {0, ..., K-1}.
    InvalidPermutation { len: usize, n_states: usize },

    // ---- Model state ----
    /// Model hasn't been fitted yet.
    ModelNotFitted,

    // ---- Wrapped inference failures ----
    /// Forward-backward / Viterbi failure reached through a model entry point.
    Inference(InferenceError),
}

impl std::error::Error for HMMError {}

impl std::fmt::Display for HMMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Observation data validation ----
            HMMError::EmptySequence => {
                write!(f, "Observation sequence is empty.")
            }
            HMMError::NonFiniteData { row, col, value } => {
                write!(f, "Observation at ({row}, {col}) is non-finite: {value}")
            }
            HMMError::NegativeCount { row, col, value } => {
                write!(f, "Count observation at ({row}, {col}) is negative: {value}")
            }
            HMMError::NonIntegerCount { row, col, value } => {
                write!(f, "Count observation at ({row}, {col}) is not integer-valued: {value}")
            }
            HMMError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Observation dimensionality mismatch: model expects D = {expected}, got {actual}"
                )
            }
            // ---- Parameter construction ----
            HMMError::InvalidStateCount { n_states } => {
                write!(f, "State count must be >= 1; got: {n_states}")
            }
            HMMError::StateOutOfRange { state, n_states } => {
                write!(f, "State index {state} out of range for a {n_states}-state model.")
            }
            HMMError::NonStochasticVector { sum } => {
                write!(f, "Probability vector must sum to 1 within tolerance; sums to {sum}")
            }
            HMMError::NonStochasticRow { state, sum } => {
                write!(f, "Transition row for state {state} fails to normalize; sums to {sum}")
            }
            HMMError::NonFiniteParam { state, value } => {
                write!(f, "Parameter for state {state} is non-finite: {value}")
            }
            HMMError::AsymmetricCovariance { state } => {
                write!(f, "Covariance matrix for state {state} is not symmetric.")
            }
            HMMError::NegativeRate { state, channel, value } => {
                write!(f, "Poisson rate for state {state}, channel {channel} is negative: {value}")
            }
            // ---- Reestimation ----
            HMMError::DegenerateCovariance { state } => {
                write!(
                    f,
                    "Weighted covariance for state {state} is singular after regularization."
                )
            }
            HMMError::WeightShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Posterior weight shape mismatch: expected {:?}, got {:?}",
                    expected, actual
                )
            }
            HMMError::InvalidWeight { t, state, value } => {
                write!(
                    f,
                    "Posterior weight at (t = {t}, state = {state}) must be finite and >= 0; got {value}"
                )
            }
            // ---- Permutations ----
            HMMError::InvalidPermutation { len, n_states } => {
                write!(
                    f,
                    "Permutation of length {len} is not a bijection on {{0, ..., {}}}.",
                    n_states.saturating_sub(1)
                )
            }
            // ---- Model state ----
            HMMError::ModelNotFitted => {
                write!(f, "Model hasn't been fitted yet.")
            }
            // ---- Wrapped inference failures ----
            HMMError::Inference(err) => {
                write!(f, "Inference failed: {err}")
            }
        }
    }
}

impl From<InferenceError> for HMMError {
    fn from(err: InferenceError) -> HMMError {
        HMMError::Inference(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Display formatting of representative variants from each error group.
    // - The `From<InferenceError>` wrapping conversion.
    //
    // They intentionally DO NOT cover:
    // - The conditions under which each error is produced; those are tested in
    //   the modules that raise them.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that Display output carries the identifying indices and values
    // for data-validation and reestimation variants.
    //
    // Given
    // -----
    // - A `NonFiniteData` error at (3, 1) and a `DegenerateCovariance` for
    //   state 2.
    //
    // Expect
    // ------
    // - The formatted messages contain the indices and, where applicable,
    //   the offending value.
    fn display_carries_indices_and_values() {
        let err = HMMError::NonFiniteData { row: 3, col: 1, value: f64::NAN };
        let msg = err.to_string();
        assert!(msg.contains("(3, 1)"), "message should contain the index pair: {msg}");

        let err = HMMError::DegenerateCovariance { state: 2 };
        assert!(err.to_string().contains("state 2"));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `InferenceError` converts into `HMMError::Inference` and
    // that the inner message is preserved in Display output.
    //
    // Given
    // -----
    // - An `InferenceError::EmptySequence`.
    //
    // Expect
    // ------
    // - `HMMError::from` yields the `Inference` variant whose Display output
    //   embeds the inner error's message.
    fn inference_errors_wrap_with_message() {
        let inner = InferenceError::EmptySequence;
        let inner_msg = inner.to_string();
        let wrapped = HMMError::from(inner);
        match &wrapped {
            HMMError::Inference(e) => assert_eq!(e.to_string(), inner_msg),
            other => panic!("expected HMMError::Inference, got {:?}", other),
        }
        assert!(wrapped.to_string().contains(&inner_msg));
    }
}
