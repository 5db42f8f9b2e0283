//! Forward-backward smoothing in log space.
//!
//! ## Purpose
//! Compute exact posterior state marginals γ (T×K) and pairwise transition
//! posteriors ξ ((T-1)×K×K) for a hidden-state sequence, given the
//! log-domain model quantities: an emission log-likelihood matrix `log_b`
//! (T×K), a transition log-matrix `log_a` (K×K), and an initial-state
//! log-distribution `log_pi` (K).
//!
//! ## Key behaviors
//! - [`forward`]: α recursion plus the total sequence log-likelihood.
//! - [`backward`]: β recursion.
//! - [`forward_backward`]: both passes, the forward-vs-backward
//!   consistency check, and the assembled [`Posteriors`].
//!
//! ## Invariants & assumptions
//! - All arithmetic stays in log space until the final exponentiation of
//!   γ and ξ, so sequences of tens of thousands of steps do not underflow.
//! - The two independent estimates of the total log-likelihood (from the
//!   α and β recursions) must agree within [`FB_CONSISTENCY_RTOL`]
//!   relative tolerance; disagreement is reported as an error rather than
//!   silently returning inconsistent posteriors.
//! - Each γ row sums to 1 and each ξ slice sums to the corresponding γ
//!   row (up to round-off); the tests assert both.
//!
//! ## Downstream usage
//! The EM driver consumes [`Posteriors`] directly: γ weights the emission
//! and start M-steps, and [`Posteriors::transition_counts`] feeds the
//! transition M-step.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    logspace::{logsumexp, LOG_ZERO},
};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};

/// Relative tolerance for the forward-vs-backward total log-likelihood
/// consistency check.
pub const FB_CONSISTENCY_RTOL: f64 = 1e-6;

/// Posterior quantities produced by one smoothing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Posteriors {
    /// T×K marginal posteriors: `gamma[[t, j]] = P(state_t = j | obs)`.
    pub gamma: Array2<f64>,
    /// (T-1)×K×K pairwise posteriors:
    /// `xi[[t, i, j]] = P(state_t = i, state_{t+1} = j | obs)`.
    pub xi: Array3<f64>,
    /// Total sequence log-likelihood from the forward pass.
    pub log_likelihood: f64,
}

impl Posteriors {
    /// Expected transition counts: ξ summed over time, a K×K matrix whose
    /// (i, j) entry is the expected number of i→j transitions. This is the
    /// sufficient statistic for the transition M-step.
    pub fn transition_counts(&self) -> Array2<f64> {
        self.xi.sum_axis(Axis(0))
    }
}

/// Check `log_b` against `log_a`, returning (T, K).
fn validate_core(
    log_b: ArrayView2<f64>, log_a: ArrayView2<f64>,
) -> InferenceResult<(usize, usize)> {
    let (t_len, k) = log_b.dim();
    if t_len == 0 || k == 0 {
        return Err(InferenceError::EmptySequence);
    }
    if log_a.nrows() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "transition matrix rows",
            expected: k,
            actual: log_a.nrows(),
        });
    }
    if log_a.ncols() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "transition matrix columns",
            expected: k,
            actual: log_a.ncols(),
        });
    }
    Ok((t_len, k))
}

fn validate_initial(log_pi: ArrayView1<f64>, k: usize) -> InferenceResult<()> {
    if log_pi.len() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "initial distribution length",
            expected: k,
            actual: log_pi.len(),
        });
    }
    Ok(())
}

/// Forward (α) recursion.
///
/// Returns the T×K log-α matrix and the total sequence log-likelihood
/// `logsumexp(α[T-1, ·])`. An impossible sequence yields `-inf` as the
/// log-likelihood; this is a valid score, and only the posterior-producing
/// entry point rejects it.
///
/// # Errors
/// - [`InferenceError::EmptySequence`] / [`InferenceError::ShapeMismatch`]
///   on malformed inputs.
pub fn forward(
    log_b: ArrayView2<f64>, log_a: ArrayView2<f64>, log_pi: ArrayView1<f64>,
) -> InferenceResult<(Array2<f64>, f64)> {
    let (t_len, k) = validate_core(log_b, log_a)?;
    validate_initial(log_pi, k)?;

    let mut alpha = Array2::from_elem((t_len, k), LOG_ZERO);
    for j in 0..k {
        alpha[[0, j]] = log_pi[j] + log_b[[0, j]];
    }
    let mut scratch = ndarray::Array1::from_elem(k, LOG_ZERO);
    for t in 1..t_len {
        for j in 0..k {
            for i in 0..k {
                scratch[i] = alpha[[t - 1, i]] + log_a[[i, j]];
            }
            alpha[[t, j]] = logsumexp(scratch.view()) + log_b[[t, j]];
        }
    }
    let log_likelihood = logsumexp(alpha.row(t_len - 1));
    Ok((alpha, log_likelihood))
}

/// Backward (β) recursion.
///
/// Returns the T×K log-β matrix with the terminal convention
/// `β[T-1, ·] = 0`.
///
/// # Errors
/// - [`InferenceError::EmptySequence`] / [`InferenceError::ShapeMismatch`]
///   on malformed inputs.
pub fn backward(
    log_b: ArrayView2<f64>, log_a: ArrayView2<f64>,
) -> InferenceResult<Array2<f64>> {
    let (t_len, k) = validate_core(log_b, log_a)?;

    let mut beta = Array2::zeros((t_len, k));
    let mut scratch = ndarray::Array1::from_elem(k, LOG_ZERO);
    for t in (0..t_len.saturating_sub(1)).rev() {
        for i in 0..k {
            for j in 0..k {
                scratch[j] = log_a[[i, j]] + log_b[[t + 1, j]] + beta[[t + 1, j]];
            }
            beta[[t, i]] = logsumexp(scratch.view());
        }
    }
    Ok(beta)
}

/// Full smoothing pass: forward, backward, consistency check, posteriors.
///
/// The backward pass yields an independent estimate of the total
/// log-likelihood, `logsumexp(log_pi + log_b[0, ·] + β[0, ·])`; the two
/// estimates must agree within [`FB_CONSISTENCY_RTOL`] (relative to the
/// magnitude of the forward estimate, with an absolute floor of 1).
///
/// # Errors
/// - [`InferenceError::EmptySequence`] / [`InferenceError::ShapeMismatch`]
///   on malformed inputs.
/// - [`InferenceError::ZeroProbabilitySequence`] if the sequence has zero
///   probability under the model; γ and ξ are undefined in that case.
/// - [`InferenceError::ForwardBackwardMismatch`] if the consistency check
///   fails.
pub fn forward_backward(
    log_b: ArrayView2<f64>, log_a: ArrayView2<f64>, log_pi: ArrayView1<f64>,
) -> InferenceResult<Posteriors> {
    let (alpha, log_likelihood) = forward(log_b, log_a, log_pi)?;
    let beta = backward(log_b, log_a)?;
    let (t_len, k) = alpha.dim();

    if log_likelihood == LOG_ZERO {
        return Err(InferenceError::ZeroProbabilitySequence);
    }
    let mut terminal = ndarray::Array1::from_elem(k, LOG_ZERO);
    for j in 0..k {
        terminal[j] = log_pi[j] + log_b[[0, j]] + beta[[0, j]];
    }
    let backward_total = logsumexp(terminal.view());
    let scale = log_likelihood.abs().max(1.0);
    if (log_likelihood - backward_total).abs() > FB_CONSISTENCY_RTOL * scale {
        return Err(InferenceError::ForwardBackwardMismatch {
            forward: log_likelihood,
            backward: backward_total,
        });
    }

    let mut gamma = Array2::zeros((t_len, k));
    for t in 0..t_len {
        for j in 0..k {
            gamma[[t, j]] = (alpha[[t, j]] + beta[[t, j]] - log_likelihood).exp();
        }
    }
    let mut xi = Array3::zeros((t_len - 1, k, k));
    for t in 0..t_len.saturating_sub(1) {
        for i in 0..k {
            for j in 0..k {
                xi[[t, i, j]] = (alpha[[t, i]]
                    + log_a[[i, j]]
                    + log_b[[t + 1, j]]
                    + beta[[t + 1, j]]
                    - log_likelihood)
                    .exp();
            }
        }
    }
    Ok(Posteriors { gamma, xi, log_likelihood })
}
