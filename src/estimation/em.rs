//! Baum-Welch EM driver.
//!
//! ## Purpose
//! Alternate exact E-steps (forward-backward posteriors) with closed-form
//! M-steps (start, transition, and emission reestimation) until the total
//! log-likelihood stops improving or the iteration budget runs out.
//!
//! ## Key behaviors
//! - The log-likelihood trace (one entry per E-step) is recorded in the
//!   returned [`FitOutcome`], so callers can inspect convergence behavior
//!   after the fact.
//! - Convergence is declared when the absolute change between consecutive
//!   log-likelihoods drops below the configured tolerance.
//! - A decrease beyond [`MONOTONICITY_ATOL`] is logged as a warning and the
//!   fit continues: with regularized M-steps a small decrease indicates
//!   numerical strain, not a bug worth aborting a long fit over.
//!
//! ## Invariants & assumptions
//! - Parameter objects are valid on entry (their constructors enforce this)
//!   and remain valid after every M-step (reestimation re-normalizes).
//! - The driver borrows the three parameter objects disjointly, so the
//!   model container can hand out its fields without cloning.
use crate::{
    estimation::{errors::EstimationResult, options::EMOptions},
    hmm::core::{
        data::ObsSequence, emissions::EmissionModel, start::StartModel,
        transition::TransitionModel,
    },
    inference::forward_backward::forward_backward,
};

/// Tolerated log-likelihood decrease before a warning is emitted.
pub const MONOTONICITY_ATOL: f64 = 1e-6;

/// Why the EM loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// The log-likelihood change dropped below tolerance after
    /// `iterations` completed M-steps.
    Converged { iterations: usize },

    /// The iteration budget was exhausted. A normal termination, not an
    /// error; the parameters reflect the final M-step.
    MaxIterationsReached { iterations: usize },
}

/// Record of one EM fit: the log-likelihood trace and the stop reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    /// Total log-likelihood per E-step, oldest first. Never empty.
    pub log_likelihoods: Vec<f64>,
    /// Why the loop stopped.
    pub status: FitStatus,
}

impl FitOutcome {
    /// The last recorded log-likelihood.
    pub fn final_log_likelihood(&self) -> f64 {
        // The trace always holds at least the initial E-step's score.
        self.log_likelihoods[self.log_likelihoods.len() - 1]
    }

    /// Completed M-step count.
    pub fn iterations(&self) -> usize {
        match self.status {
            FitStatus::Converged { iterations } => iterations,
            FitStatus::MaxIterationsReached { iterations } => iterations,
        }
    }
}

/// Run EM to a local optimum, mutating the parameter objects in place.
///
/// Each loop iteration scores the current parameters with an E-step,
/// checks convergence against the previous score, and then applies the
/// M-step. The score of the final M-step's parameters is therefore not in
/// the trace unless the loop ran again; callers needing it can rescore.
///
/// # Errors
/// - [`EstimationError`](crate::estimation::errors::EstimationError)
///   variants for invalid options, E-step failures (including a
///   zero-probability sequence), and M-step failures such as a degenerate
///   covariance.
pub fn run_em<E: EmissionModel>(
    start: &mut StartModel, transition: &mut TransitionModel, emission: &mut E,
    obs: &ObsSequence, options: &EMOptions,
) -> EstimationResult<FitOutcome> {
    options.validate()?;

    let mut log_likelihoods: Vec<f64> = Vec::with_capacity(options.max_iter);
    for iteration in 0..options.max_iter {
        let log_b = emission.log_likelihood_matrix(obs)?;
        let posteriors =
            forward_backward(log_b.view(), transition.log_matrix(), start.log_probs())?;

        if let Some(&previous) = log_likelihoods.last() {
            if posteriors.log_likelihood < previous - MONOTONICITY_ATOL {
                log::warn!(
                    "EM log-likelihood decreased from {previous} to {} at iteration {iteration}",
                    posteriors.log_likelihood
                );
            }
            if (posteriors.log_likelihood - previous).abs() < options.tol {
                log_likelihoods.push(posteriors.log_likelihood);
                return Ok(FitOutcome {
                    log_likelihoods,
                    status: FitStatus::Converged { iterations: iteration },
                });
            }
        }
        log_likelihoods.push(posteriors.log_likelihood);

        start.reestimate(posteriors.gamma.row(0), options.start_pseudocount)?;
        let counts = posteriors.transition_counts();
        transition.reestimate(counts.view(), options.trans_pseudocount)?;
        emission.reestimate(obs, posteriors.gamma.view(), options.cov_regularizer)?;
    }

    Ok(FitOutcome {
        log_likelihoods,
        status: FitStatus::MaxIterationsReached { iterations: options.max_iter },
    })
}
