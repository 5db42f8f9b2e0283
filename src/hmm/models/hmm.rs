//! Hidden Markov model container.
//!
//! ## Purpose
//! [`HMM`] owns one complete, mutually consistent parameter set (an
//! initial-state distribution, a row-stochastic transition model, and an
//! emission family) and exposes the user-facing operations: ancestral
//! sampling, sequence scoring, posterior smoothing, Viterbi decoding, EM
//! fitting, and state relabeling.
//!
//! ## Key behaviors
//! - Construction checks that all three components agree on the state
//!   count K, so the inference layer never sees inconsistent shapes.
//! - `fit` seeds the emission locations through the chosen
//!   [`Init`](crate::estimation::init::Init) policy, runs EM in place, and
//!   retains the [`FitOutcome`] for later inspection via
//!   [`HMM::results`].
//! - All randomness (sampling and initialization) flows through a
//!   caller-provided [`Rng`], so each fit owns its state and independent
//!   models can run on separate threads without coordination.
//!
//! ## Downstream usage
//! Label sequences produced by [`HMM::most_likely_states`] feed the
//! alignment utilities when comparing fits against references.
use crate::{
    estimation::{
        em::{run_em, FitOutcome},
        errors::EstimationResult,
        init::{initial_locations, Init},
        options::EMOptions,
    },
    hmm::{
        core::{
            data::ObsSequence, emissions::EmissionModel, start::StartModel,
            transition::TransitionModel,
        },
        errors::{HMMError, HMMResult},
    },
    inference::{
        forward_backward::{forward, forward_backward, Posteriors},
        viterbi::viterbi,
    },
};
use ndarray::Array2;
use rand::Rng;

/// A hidden Markov model over K latent states emitting D-dimensional
/// observations, generic over the emission family.
#[derive(Debug, Clone)]
pub struct HMM<E: EmissionModel> {
    start: StartModel,
    transition: TransitionModel,
    emission: E,
    fit_outcome: Option<FitOutcome>,
}

impl<E: EmissionModel> HMM<E> {
    /// Assemble a model from its three components.
    ///
    /// # Errors
    /// - [`HMMError::DimensionMismatch`] if the components disagree on the
    ///   state count (reported as expected = start model's K).
    pub fn new(
        start: StartModel, transition: TransitionModel, emission: E,
    ) -> HMMResult<Self> {
        let k = start.n_states();
        if transition.n_states() != k {
            return Err(HMMError::DimensionMismatch {
                expected: k,
                actual: transition.n_states(),
            });
        }
        if emission.n_states() != k {
            return Err(HMMError::DimensionMismatch {
                expected: k,
                actual: emission.n_states(),
            });
        }
        Ok(HMM { start, transition, emission, fit_outcome: None })
    }

    /// Assemble a model with uniform start and transition distributions
    /// around the given emission family. The usual entry point before
    /// [`HMM::fit`].
    ///
    /// # Errors
    /// - [`HMMError::InvalidStateCount`] if the emission family declares
    ///   zero states.
    pub fn uniform(emission: E) -> HMMResult<Self> {
        let k = emission.n_states();
        HMM::new(StartModel::uniform(k)?, TransitionModel::uniform(k)?, emission)
    }

    /// Number of latent states K.
    pub fn n_states(&self) -> usize {
        self.start.n_states()
    }

    /// Observation dimensionality D.
    pub fn dim(&self) -> usize {
        self.emission.dim()
    }

    /// Borrow the initial-state distribution.
    pub fn start(&self) -> &StartModel {
        &self.start
    }

    /// Borrow the transition model.
    pub fn transition(&self) -> &TransitionModel {
        &self.transition
    }

    /// Borrow the emission family.
    pub fn emission(&self) -> &E {
        &self.emission
    }

    /// The record of the most recent [`HMM::fit`] call.
    ///
    /// # Errors
    /// - [`HMMError::ModelNotFitted`] if no fit has run on this instance.
    pub fn results(&self) -> HMMResult<&FitOutcome> {
        self.fit_outcome.as_ref().ok_or(HMMError::ModelNotFitted)
    }

    /// Ancestral sampling: draw a latent state path of length `num_steps`
    /// and one observation per step.
    ///
    /// # Returns
    /// - The state path and the T×D observation matrix, row t emitted by
    ///   state path\[t\].
    ///
    /// # Errors
    /// - [`HMMError::EmptySequence`] if `num_steps == 0`.
    pub fn sample<R: Rng + ?Sized>(
        &self, num_steps: usize, rng: &mut R,
    ) -> HMMResult<(Vec<usize>, Array2<f64>)> {
        if num_steps == 0 {
            return Err(HMMError::EmptySequence);
        }
        let mut states = Vec::with_capacity(num_steps);
        let mut observations = Array2::zeros((num_steps, self.dim()));

        let mut state = self.start.sample(rng);
        for t in 0..num_steps {
            if t > 0 {
                state = self.transition.sample(state, rng)?;
            }
            states.push(state);
            let draw = self.emission.sample(state, rng)?;
            observations.row_mut(t).assign(&draw);
        }
        Ok((states, observations))
    }

    /// Total log-probability of a sequence, marginalized over all state
    /// paths (the forward recursion's total). `-inf` for a sequence the
    /// model assigns zero probability.
    ///
    /// # Errors
    /// - [`HMMError::DimensionMismatch`] if the sequence dimensionality
    ///   disagrees with the model's D.
    pub fn log_probability(&self, obs: &ObsSequence) -> HMMResult<f64> {
        let log_b = self.emission.log_likelihood_matrix(obs)?;
        let (_, log_likelihood) = forward(
            log_b.view(),
            self.transition.log_matrix(),
            self.start.log_probs(),
        )?;
        Ok(log_likelihood)
    }

    /// Posterior state marginals and pairwise transition posteriors for a
    /// sequence under the current parameters.
    ///
    /// # Errors
    /// - [`HMMError::DimensionMismatch`] on dimensionality disagreement.
    /// - [`HMMError::Inference`] wrapping the forward-backward failure
    ///   modes, including a zero-probability sequence.
    pub fn posteriors(&self, obs: &ObsSequence) -> HMMResult<Posteriors> {
        let log_b = self.emission.log_likelihood_matrix(obs)?;
        let posteriors = forward_backward(
            log_b.view(),
            self.transition.log_matrix(),
            self.start.log_probs(),
        )?;
        Ok(posteriors)
    }

    /// Most probable state path (Viterbi) and its joint log-probability.
    ///
    /// Ties break deterministically toward the lowest state index.
    ///
    /// # Errors
    /// - [`HMMError::DimensionMismatch`] on dimensionality disagreement.
    pub fn most_likely_states(&self, obs: &ObsSequence) -> HMMResult<(Vec<usize>, f64)> {
        let log_b = self.emission.log_likelihood_matrix(obs)?;
        let decoded = viterbi(
            log_b.view(),
            self.transition.log_matrix(),
            self.start.log_probs(),
        )?;
        Ok(decoded)
    }

    /// Fit the model to a sequence with EM, mutating all parameters in
    /// place.
    ///
    /// Emission locations are first seeded through `init`; start and
    /// transition parameters are fitted from their current values, so a
    /// caller wanting a cold start should construct via [`HMM::uniform`].
    /// The returned [`FitOutcome`] is also retained for [`HMM::results`].
    ///
    /// # Errors
    /// - [`EstimationError`](crate::estimation::errors::EstimationError)
    ///   variants for invalid options or initialization, and for E-step or
    ///   M-step failures.
    pub fn fit<R: Rng + ?Sized>(
        &mut self, obs: &ObsSequence, options: &EMOptions, init: &Init, rng: &mut R,
    ) -> EstimationResult<FitOutcome> {
        let locations = initial_locations(init, obs, self.n_states(), rng)?;
        self.emission.seed_locations(locations.view())?;
        let outcome = run_em(
            &mut self.start,
            &mut self.transition,
            &mut self.emission,
            obs,
            options,
        )?;
        self.fit_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Relabel states across all components so that old state `i` becomes
    /// `perm[i]`. Applying a permutation leaves every sequence's
    /// log-probability unchanged; only the numbering moves.
    ///
    /// # Errors
    /// - [`HMMError::InvalidPermutation`] if `perm` is not a bijection on
    ///   {0, ..., K-1}.
    pub fn permute_states(&mut self, perm: &[usize]) -> HMMResult<()> {
        self.start.permute(perm)?;
        self.transition.permute(perm)?;
        self.emission.permute(perm)?;
        Ok(())
    }
}
