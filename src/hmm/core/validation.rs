//! Validation helpers shared across the HMM core.
//!
//! Centralizes the numeric checks used by data containers, parameter
//! constructors, and reestimation routines: probability-vector and
//! row-stochastic checks, posterior-weight checks, dimensionality
//! agreement, and permutation validity. Keeping these in one place makes
//! the tolerance conventions uniform across the domain layer.
//!
//! ## Conventions
//! - Probability vectors and transition rows must have finite, non-negative
//!   entries summing to 1 within [`PROB_ATOL`] absolute tolerance.
//! - Posterior weights must be finite and non-negative but need not
//!   normalize; reestimation handles their totals explicitly.
use crate::hmm::errors::{HMMError, HMMResult};
use ndarray::{ArrayView1, ArrayView2};

/// Absolute tolerance for probability normalization checks.
///
/// Rows of the transition matrix and the initial-state distribution must
/// sum to 1 within this tolerance after construction and after every
/// reestimation.
pub const PROB_ATOL: f64 = 1e-9;

/// Validate that `probs` is a probability vector: finite, non-negative
/// entries summing to 1 within [`PROB_ATOL`].
///
/// # Errors
/// - [`HMMError::NonFiniteParam`] if an entry is NaN/±inf or negative
///   (reported with the offending index as `state`).
/// - [`HMMError::NonStochasticVector`] if the sum deviates from 1 beyond
///   tolerance.
pub fn validate_probability_vector(probs: ArrayView1<f64>) -> HMMResult<()> {
    for (index, &value) in probs.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(HMMError::NonFiniteParam { state: index, value });
        }
    }
    let sum = probs.sum();
    if (sum - 1.0).abs() > PROB_ATOL {
        return Err(HMMError::NonStochasticVector { sum });
    }
    Ok(())
}

/// Validate that every row of `matrix` is a probability vector.
///
/// # Errors
/// - [`HMMError::NonFiniteParam`] for non-finite or negative entries.
/// - [`HMMError::NonStochasticRow`] identifying the first row whose sum
///   deviates from 1 beyond [`PROB_ATOL`].
pub fn validate_row_stochastic(matrix: ArrayView2<f64>) -> HMMResult<()> {
    for (state, row) in matrix.outer_iter().enumerate() {
        for &value in row.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(HMMError::NonFiniteParam { state, value });
            }
        }
        let sum = row.sum();
        if (sum - 1.0).abs() > PROB_ATOL {
            return Err(HMMError::NonStochasticRow { state, sum });
        }
    }
    Ok(())
}

/// Validate that an observation dimensionality matches the model's D.
///
/// # Errors
/// - [`HMMError::DimensionMismatch`] if the dimensions disagree. This is
///   the fail-fast check performed before any computation touches data.
pub fn validate_obs_dim(expected: usize, actual: usize) -> HMMResult<()> {
    if expected != actual {
        return Err(HMMError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Validate a state index against the model's state count.
///
/// # Errors
/// - [`HMMError::StateOutOfRange`] if `state >= n_states`.
pub fn validate_state_index(state: usize, n_states: usize) -> HMMResult<()> {
    if state >= n_states {
        return Err(HMMError::StateOutOfRange { state, n_states });
    }
    Ok(())
}

/// Validate a T×K posterior-weight matrix against the expected shape and
/// check that every weight is finite and non-negative.
///
/// # Errors
/// - [`HMMError::WeightShapeMismatch`] if the shape disagrees with
///   `(n_obs, n_states)`.
/// - [`HMMError::InvalidWeight`] identifying the first malformed entry.
pub fn validate_weights(
    weights: ArrayView2<f64>, n_obs: usize, n_states: usize,
) -> HMMResult<()> {
    if weights.nrows() != n_obs || weights.ncols() != n_states {
        return Err(HMMError::WeightShapeMismatch {
            expected: (n_obs, n_states),
            actual: (weights.nrows(), weights.ncols()),
        });
    }
    for ((t, state), &value) in weights.indexed_iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(HMMError::InvalidWeight { t, state, value });
        }
    }
    Ok(())
}

/// Validate that `perm` is a bijection on {0, ..., n_states - 1}.
///
/// # Errors
/// - [`HMMError::InvalidPermutation`] if the length disagrees with
///   `n_states` or any target index is repeated or out of range.
pub fn validate_permutation(perm: &[usize], n_states: usize) -> HMMResult<()> {
    if perm.len() != n_states {
        return Err(HMMError::InvalidPermutation { len: perm.len(), n_states });
    }
    let mut seen = vec![false; n_states];
    for &target in perm {
        if target >= n_states || seen[target] {
            return Err(HMMError::InvalidPermutation { len: perm.len(), n_states });
        }
        seen[target] = true;
    }
    Ok(())
}
