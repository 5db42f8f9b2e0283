//! Initial-state distribution.
//!
//! [`StartModel`] owns the K-length probability vector over the first
//! latent state, with the same validation, pseudocount-smoothed
//! reestimation, and permutation support as the transition rows. The
//! forward-backward engine consumes its log view; the M-step updates it
//! from the time-0 posterior.
use crate::hmm::{
    core::validation::{validate_permutation, validate_probability_vector},
    errors::{HMMError, HMMResult},
};
use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Validated K-length distribution over the initial latent state.
#[derive(Debug, Clone, PartialEq)]
pub struct StartModel {
    probs: Array1<f64>,
    log_probs: Array1<f64>,
}

impl StartModel {
    /// Construct a validated [`StartModel`].
    ///
    /// # Errors
    /// - [`HMMError::InvalidStateCount`] if the vector is empty.
    /// - [`HMMError::NonFiniteParam`] / [`HMMError::NonStochasticVector`]
    ///   if the probability checks fail.
    pub fn new(probs: Array1<f64>) -> HMMResult<Self> {
        if probs.is_empty() {
            return Err(HMMError::InvalidStateCount { n_states: 0 });
        }
        validate_probability_vector(probs.view())?;
        let log_probs = probs.mapv(f64::ln);
        Ok(StartModel { probs, log_probs })
    }

    /// Construct the uniform distribution over `n_states` states.
    ///
    /// # Errors
    /// - [`HMMError::InvalidStateCount`] if `n_states == 0`.
    pub fn uniform(n_states: usize) -> HMMResult<Self> {
        if n_states == 0 {
            return Err(HMMError::InvalidStateCount { n_states });
        }
        StartModel::new(Array1::from_elem(n_states, 1.0 / n_states as f64))
    }

    /// Number of states K.
    pub fn n_states(&self) -> usize {
        self.probs.len()
    }

    /// Borrow the probability vector.
    pub fn probs(&self) -> ArrayView1<f64> {
        self.probs.view()
    }

    /// Borrow the cached element-wise log of the probability vector.
    pub fn log_probs(&self) -> ArrayView1<f64> {
        self.log_probs.view()
    }

    /// Draw the initial state from the categorical distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (state, &p) in self.probs.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return state;
            }
        }
        self.n_states() - 1
    }

    /// Reestimate from the time-0 posterior (M-step) with pseudocount
    /// smoothing, mirroring [`TransitionModel::reestimate`].
    ///
    /// [`TransitionModel::reestimate`]: crate::hmm::core::transition::TransitionModel::reestimate
    ///
    /// # Errors
    /// - [`HMMError::WeightShapeMismatch`] if `gamma0` is not K-length.
    /// - [`HMMError::InvalidWeight`] if a weight is non-finite or negative.
    /// - [`HMMError::NonStochasticVector`] if the total (including
    ///   pseudocounts) is not strictly positive.
    pub fn reestimate(&mut self, gamma0: ArrayView1<f64>, pseudocount: f64) -> HMMResult<()> {
        let k = self.n_states();
        if gamma0.len() != k {
            return Err(HMMError::WeightShapeMismatch {
                expected: (1, k),
                actual: (1, gamma0.len()),
            });
        }
        for (state, &value) in gamma0.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(HMMError::InvalidWeight { t: 0, state, value });
            }
        }
        let total = gamma0.sum() + k as f64 * pseudocount;
        if total <= 0.0 {
            return Err(HMMError::NonStochasticVector { sum: total });
        }
        for (state, &weight) in gamma0.iter().enumerate() {
            self.probs[state] = (weight + pseudocount) / total;
        }
        self.log_probs = self.probs.mapv(f64::ln);
        Ok(())
    }

    /// Relabel states so that old state `i` becomes `perm[i]`.
    ///
    /// # Errors
    /// - [`HMMError::InvalidPermutation`] if `perm` is not a bijection.
    pub fn permute(&mut self, perm: &[usize]) -> HMMResult<()> {
        validate_permutation(perm, self.n_states())?;
        let mut permuted = Array1::zeros(self.n_states());
        for (old, &new) in perm.iter().enumerate() {
            permuted[new] = self.probs[old];
        }
        self.probs = permuted;
        self.log_probs = self.probs.mapv(f64::ln);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    // Purpose
    // -------
    // Verify construction, log caching, and rejection of non-stochastic
    // vectors.
    //
    // Given
    // -----
    // - A valid distribution [0.3, 0.7] and an invalid one [0.3, 0.6].
    //
    // Expect
    // ------
    // - The first constructs with matching log view; the second fails with
    //   `NonStochasticVector`.
    fn new_validates_and_caches_log() {
        let start = StartModel::new(array![0.3, 0.7]).expect("valid distribution");
        assert!((start.log_probs()[1] - 0.7_f64.ln()).abs() < 1e-12);
        assert!(matches!(
            StartModel::new(array![0.3, 0.6]),
            Err(HMMError::NonStochasticVector { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify that reestimation normalizes the time-0 posterior and that a
    // degenerate all-zero posterior without smoothing is rejected.
    //
    // Given
    // -----
    // - gamma0 = [0.2, 0.8] with pseudocount 0, and gamma0 = [0, 0] with
    //   and without pseudocount.
    //
    // Expect
    // ------
    // - The first reproduces [0.2, 0.8]; zero mass with smoothing yields
    //   uniform; zero mass without smoothing errors.
    fn reestimate_normalizes_and_requires_mass() {
        let mut start = StartModel::uniform(2).unwrap();
        start.reestimate(array![0.2, 0.8].view(), 0.0).unwrap();
        assert!((start.probs()[0] - 0.2).abs() < 1e-12);

        let mut start = StartModel::uniform(2).unwrap();
        start.reestimate(array![0.0, 0.0].view(), 0.5).unwrap();
        assert!((start.probs()[0] - 0.5).abs() < 1e-12);

        let mut start = StartModel::uniform(2).unwrap();
        assert!(matches!(
            start.reestimate(array![0.0, 0.0].view(), 0.0),
            Err(HMMError::NonStochasticVector { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify seeded sampling determinism and permutation relabeling.
    //
    // Given
    // -----
    // - A skewed distribution, two identically seeded RNGs, and the swap
    //   permutation.
    //
    // Expect
    // ------
    // - Identical draw streams; after permuting, probabilities move to
    //   their new labels.
    fn sample_and_permute_behave_deterministically() {
        let mut start = StartModel::new(array![0.9, 0.1]).unwrap();
        let mut rng_a = ChaCha8Rng::seed_from_u64(11);
        let mut rng_b = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(start.sample(&mut rng_a), start.sample(&mut rng_b));
        }
        start.permute(&[1, 0]).unwrap();
        assert!((start.probs()[1] - 0.9).abs() < 1e-12);
    }
}
