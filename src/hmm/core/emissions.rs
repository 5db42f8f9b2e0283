//! Emission families for discrete-state HMMs.
//!
//! This module defines [`EmissionModel`], the seam between the model layer
//! and the two supported observation families, plus the concrete
//! implementations:
//!
//! - [`GaussianEmission`]: per-state multivariate normal with full
//!   covariance. Log-densities, sampling, and positive-definiteness checks
//!   all go through a Cholesky factorization (`nalgebra`), so the
//!   D×D solve is performed once per state rather than once per
//!   observation.
//! - [`PoissonEmission`]: per-state, per-channel independent Poisson
//!   rates. The log-mass normalizer uses `ln_gamma` for stability at
//!   large counts.
//!
//! ## Numerics
//! - All likelihood evaluation is in log space; impossible observations
//!   (e.g., a positive count under a zero rate) produce `-inf`, which the
//!   inference layer handles without special-casing.
//! - Gaussian reestimation adds a caller-supplied diagonal regularizer to
//!   the weighted covariance *before* factorization; a factorization
//!   failure after regularization is surfaced as
//!   [`HMMError::DegenerateCovariance`].
//!
//! ## Conventions
//! - Parameters are mutated only by `reestimate` (M-step),
//!   `seed_locations` (initialization), and `permute` (relabeling).
//! - Count validity for the Poisson family is the data container's
//!   contract ([`ObsSequence::counts`]); likelihood evaluation assumes
//!   validated inputs and does not re-check them.
use crate::hmm::{
    core::{
        data::ObsSequence,
        validation::{validate_obs_dim, validate_permutation, validate_state_index, validate_weights},
    },
    errors::{HMMError, HMMResult},
};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::{Poisson, StandardNormal};
use statrs::{consts::LN_SQRT_2PI, function::gamma};

// Constants
const SYMMETRY_ATOL: f64 = 1e-8;

/// Seam between the model layer and a parametric observation family.
///
/// Implementors own the per-state emission parameters and expose
/// log-likelihood evaluation, generative sampling, weighted-MLE
/// reestimation, initialization seeding, and state relabeling. The model
/// container ([`HMM`](crate::hmm::models::hmm::HMM)) is generic over this
/// trait, so each fit owns its parameters and no shared mutable state
/// exists across concurrent fits.
pub trait EmissionModel {
    /// Number of states K.
    fn n_states(&self) -> usize;

    /// Observation dimensionality D.
    fn dim(&self) -> usize;

    /// Log-likelihood of a single observation under `state`'s distribution.
    ///
    /// # Errors
    /// - [`HMMError::StateOutOfRange`] if `state >= K`.
    /// - [`HMMError::DimensionMismatch`] if the observation is not D-length.
    fn log_likelihood(&self, obs: ArrayView1<f64>, state: usize) -> HMMResult<f64>;

    /// Batched T×K emission log-likelihood matrix for a whole sequence.
    ///
    /// The default implementation loops over [`EmissionModel::log_likelihood`];
    /// families with per-state setup cost (e.g., a covariance factorization)
    /// should override it.
    ///
    /// # Errors
    /// - [`HMMError::DimensionMismatch`] before any computation if the
    ///   sequence dimensionality disagrees with the model's D.
    fn log_likelihood_matrix(&self, obs: &ObsSequence) -> HMMResult<Array2<f64>> {
        validate_obs_dim(self.dim(), obs.dim())?;
        let mut log_b = Array2::zeros((obs.len(), self.n_states()));
        for (t, row) in obs.data().outer_iter().enumerate() {
            for state in 0..self.n_states() {
                log_b[[t, state]] = self.log_likelihood(row, state)?;
            }
        }
        Ok(log_b)
    }

    /// Draw one observation from `state`'s distribution.
    ///
    /// # Errors
    /// - [`HMMError::StateOutOfRange`] if `state >= K`.
    fn sample<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> HMMResult<Array1<f64>>;

    /// Reestimate parameters from posterior weights (M-step).
    ///
    /// `weights` is the T×K marginal-posterior matrix γ from the E-step;
    /// `regularizer` is the family-specific regularization constant
    /// (diagonal covariance jitter for the Gaussian family; ignored by the
    /// Poisson family). States with zero total weight keep their previous
    /// parameters: an unreachable state has no data to estimate from, and
    /// the transition M-step flags it separately.
    ///
    /// # Errors
    /// - [`HMMError::WeightShapeMismatch`] / [`HMMError::InvalidWeight`] on
    ///   malformed weights.
    /// - [`HMMError::DegenerateCovariance`] (Gaussian) if a reestimated
    ///   covariance is singular after regularization.
    /// - [`HMMError::NegativeRate`] (Poisson) if malformed upstream data
    ///   produces a negative rate.
    fn reestimate(
        &mut self, obs: &ObsSequence, weights: ArrayView2<f64>, regularizer: f64,
    ) -> HMMResult<()>;

    /// Seed per-state locations (Gaussian means / Poisson rates) from a
    /// K×D array, typically produced by an initialization policy.
    ///
    /// # Errors
    /// - [`HMMError::WeightShapeMismatch`] if the array is not K×D
    ///   (reported as `expected: (K, D)`).
    /// - Family-specific validity errors on the values.
    fn seed_locations(&mut self, locations: ArrayView2<f64>) -> HMMResult<()>;

    /// Relabel states so that old state `i` becomes `perm[i]`.
    ///
    /// # Errors
    /// - [`HMMError::InvalidPermutation`] if `perm` is not a bijection.
    fn permute(&mut self, perm: &[usize]) -> HMMResult<()>;
}

// ---- Gaussian family -------------------------------------------------------

/// Per-state multivariate normal emissions with full covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianEmission {
    means: Array2<f64>,            // K×D
    covariances: Vec<Array2<f64>>, // K matrices, each D×D
}

impl GaussianEmission {
    /// Construct a validated [`GaussianEmission`].
    ///
    /// # Errors
    /// - [`HMMError::InvalidStateCount`] if K = 0, [`HMMError::EmptySequence`]
    ///   if D = 0.
    /// - [`HMMError::WeightShapeMismatch`] if `covariances.len() != K` or a
    ///   covariance is not D×D.
    /// - [`HMMError::NonFiniteParam`] for non-finite entries.
    /// - [`HMMError::AsymmetricCovariance`] if a covariance is asymmetric
    ///   beyond `1e-8`.
    /// - [`HMMError::DegenerateCovariance`] if a covariance is not positive
    ///   definite.
    pub fn new(means: Array2<f64>, covariances: Vec<Array2<f64>>) -> HMMResult<Self> {
        let k = means.nrows();
        let d = means.ncols();
        if k == 0 {
            return Err(HMMError::InvalidStateCount { n_states: 0 });
        }
        if d == 0 {
            return Err(HMMError::EmptySequence);
        }
        if covariances.len() != k {
            return Err(HMMError::WeightShapeMismatch {
                expected: (k, d),
                actual: (covariances.len(), d),
            });
        }
        for (state, row) in means.outer_iter().enumerate() {
            for &value in row.iter() {
                if !value.is_finite() {
                    return Err(HMMError::NonFiniteParam { state, value });
                }
            }
        }
        for (state, cov) in covariances.iter().enumerate() {
            if cov.nrows() != d || cov.ncols() != d {
                return Err(HMMError::WeightShapeMismatch {
                    expected: (d, d),
                    actual: (cov.nrows(), cov.ncols()),
                });
            }
            for &value in cov.iter() {
                if !value.is_finite() {
                    return Err(HMMError::NonFiniteParam { state, value });
                }
            }
            for i in 0..d {
                for j in (i + 1)..d {
                    if (cov[[i, j]] - cov[[j, i]]).abs() > SYMMETRY_ATOL {
                        return Err(HMMError::AsymmetricCovariance { state });
                    }
                }
            }
            if factor(cov).is_none() {
                return Err(HMMError::DegenerateCovariance { state });
            }
        }
        Ok(GaussianEmission { means, covariances })
    }

    /// Construct a [`GaussianEmission`] with a shared isotropic covariance
    /// `variance · I` for every state.
    ///
    /// # Errors
    /// - Everything [`GaussianEmission::new`] can return; in particular
    ///   `variance <= 0` surfaces as [`HMMError::DegenerateCovariance`].
    pub fn spherical(means: Array2<f64>, variance: f64) -> HMMResult<Self> {
        let k = means.nrows();
        let d = means.ncols();
        let covariances = (0..k).map(|_| Array2::eye(d) * variance).collect();
        GaussianEmission::new(means, covariances)
    }

    /// Borrow the K×D matrix of state means.
    pub fn means(&self) -> ArrayView2<f64> {
        self.means.view()
    }

    /// Borrow the covariance matrix of `state`.
    ///
    /// # Errors
    /// - [`HMMError::StateOutOfRange`] if `state >= K`.
    pub fn covariance(&self, state: usize) -> HMMResult<ArrayView2<f64>> {
        validate_state_index(state, self.n_states())?;
        Ok(self.covariances[state].view())
    }

    fn log_density(&self, obs: ArrayView1<f64>, state: usize, chol: &Cholesky<f64, Dyn>) -> f64 {
        let d = self.dim();
        let centered = DVector::from_fn(d, |i, _| obs[i] - self.means[[state, i]]);
        let solved = chol.solve(&centered);
        let quad = centered.dot(&solved);
        let log_det: f64 = (0..d).map(|i| chol.l()[(i, i)].ln()).sum::<f64>() * 2.0;
        -(d as f64) * LN_SQRT_2PI - 0.5 * (log_det + quad)
    }
}

impl EmissionModel for GaussianEmission {
    fn n_states(&self) -> usize {
        self.means.nrows()
    }

    fn dim(&self) -> usize {
        self.means.ncols()
    }

    fn log_likelihood(&self, obs: ArrayView1<f64>, state: usize) -> HMMResult<f64> {
        validate_state_index(state, self.n_states())?;
        validate_obs_dim(self.dim(), obs.len())?;
        let chol = factor(&self.covariances[state])
            .ok_or(HMMError::DegenerateCovariance { state })?;
        Ok(self.log_density(obs, state, &chol))
    }

    /// Batched evaluation factoring each state's covariance exactly once.
    fn log_likelihood_matrix(&self, obs: &ObsSequence) -> HMMResult<Array2<f64>> {
        validate_obs_dim(self.dim(), obs.dim())?;
        let k = self.n_states();
        let mut factors = Vec::with_capacity(k);
        for state in 0..k {
            factors.push(
                factor(&self.covariances[state])
                    .ok_or(HMMError::DegenerateCovariance { state })?,
            );
        }
        let mut log_b = Array2::zeros((obs.len(), k));
        for (t, row) in obs.data().outer_iter().enumerate() {
            for (state, chol) in factors.iter().enumerate() {
                log_b[[t, state]] = self.log_density(row, state, chol);
            }
        }
        Ok(log_b)
    }

    fn sample<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> HMMResult<Array1<f64>> {
        validate_state_index(state, self.n_states())?;
        let d = self.dim();
        let chol = factor(&self.covariances[state])
            .ok_or(HMMError::DegenerateCovariance { state })?;
        let z = DVector::from_fn(d, |_, _| rng.sample::<f64, _>(StandardNormal));
        let correlated = chol.l() * z;
        Ok(Array1::from_iter(
            (0..d).map(|i| self.means[[state, i]] + correlated[i]),
        ))
    }

    fn reestimate(
        &mut self, obs: &ObsSequence, weights: ArrayView2<f64>, regularizer: f64,
    ) -> HMMResult<()> {
        validate_obs_dim(self.dim(), obs.dim())?;
        validate_weights(weights, obs.len(), self.n_states())?;
        let d = self.dim();
        for state in 0..self.n_states() {
            let weight_sum: f64 = weights.column(state).sum();
            if weight_sum <= 0.0 {
                // No posterior mass reached this state; keep its previous
                // parameters rather than dividing by zero.
                continue;
            }
            let mut mean = Array1::<f64>::zeros(d);
            for (t, row) in obs.data().outer_iter().enumerate() {
                mean.scaled_add(weights[[t, state]], &row);
            }
            mean /= weight_sum;

            let mut cov = Array2::<f64>::zeros((d, d));
            for (t, row) in obs.data().outer_iter().enumerate() {
                let w = weights[[t, state]];
                if w == 0.0 {
                    continue;
                }
                let diff = &row - &mean;
                for i in 0..d {
                    for j in 0..d {
                        cov[[i, j]] += w * diff[i] * diff[j];
                    }
                }
            }
            cov /= weight_sum;
            for i in 0..d {
                cov[[i, i]] += regularizer;
            }
            if factor(&cov).is_none() {
                return Err(HMMError::DegenerateCovariance { state });
            }
            for i in 0..d {
                self.means[[state, i]] = mean[i];
            }
            self.covariances[state] = cov;
        }
        Ok(())
    }

    fn seed_locations(&mut self, locations: ArrayView2<f64>) -> HMMResult<()> {
        let (k, d) = (self.n_states(), self.dim());
        if locations.nrows() != k || locations.ncols() != d {
            return Err(HMMError::WeightShapeMismatch {
                expected: (k, d),
                actual: (locations.nrows(), locations.ncols()),
            });
        }
        for (state, row) in locations.outer_iter().enumerate() {
            for &value in row.iter() {
                if !value.is_finite() {
                    return Err(HMMError::NonFiniteParam { state, value });
                }
            }
        }
        self.means.assign(&locations);
        Ok(())
    }

    fn permute(&mut self, perm: &[usize]) -> HMMResult<()> {
        validate_permutation(perm, self.n_states())?;
        let mut means = Array2::zeros(self.means.raw_dim());
        let mut covariances = vec![Array2::zeros((0, 0)); self.n_states()];
        for (old, &new) in perm.iter().enumerate() {
            means.row_mut(new).assign(&self.means.row(old));
            covariances[new] = self.covariances[old].clone();
        }
        self.means = means;
        self.covariances = covariances;
        Ok(())
    }
}

/// Cholesky factorization of a covariance candidate; `None` when the
/// matrix is not positive definite.
fn factor(cov: &Array2<f64>) -> Option<Cholesky<f64, Dyn>> {
    let d = cov.nrows();
    Cholesky::new(DMatrix::from_fn(d, d, |i, j| cov[[i, j]]))
}

// ---- Poisson family --------------------------------------------------------

/// Per-state, per-channel independent Poisson emissions.
///
/// The log-mass of a D-channel count vector is the sum of the per-channel
/// Poisson log-masses. A zero rate assigns probability 1 to a zero count
/// and probability 0 (log-mass `-inf`) to any positive count.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonEmission {
    rates: Array2<f64>, // K×D
}

impl PoissonEmission {
    /// Construct a validated [`PoissonEmission`] from a K×D rate matrix.
    ///
    /// # Errors
    /// - [`HMMError::InvalidStateCount`] if K = 0, [`HMMError::EmptySequence`]
    ///   if D = 0.
    /// - [`HMMError::NonFiniteParam`] for non-finite rates.
    /// - [`HMMError::NegativeRate`] for negative rates.
    pub fn new(rates: Array2<f64>) -> HMMResult<Self> {
        if rates.nrows() == 0 {
            return Err(HMMError::InvalidStateCount { n_states: 0 });
        }
        if rates.ncols() == 0 {
            return Err(HMMError::EmptySequence);
        }
        for ((state, channel), &value) in rates.indexed_iter() {
            if !value.is_finite() {
                return Err(HMMError::NonFiniteParam { state, value });
            }
            if value < 0.0 {
                return Err(HMMError::NegativeRate { state, channel, value });
            }
        }
        Ok(PoissonEmission { rates })
    }

    /// Borrow the K×D rate matrix.
    pub fn rates(&self) -> ArrayView2<f64> {
        self.rates.view()
    }
}

impl EmissionModel for PoissonEmission {
    fn n_states(&self) -> usize {
        self.rates.nrows()
    }

    fn dim(&self) -> usize {
        self.rates.ncols()
    }

    /// Independent-per-channel Poisson log-mass, summed over channels.
    ///
    /// Assumes count-validated observations (see [`ObsSequence::counts`]);
    /// negative or fractional inputs are the caller's error and are not
    /// re-checked here.
    fn log_likelihood(&self, obs: ArrayView1<f64>, state: usize) -> HMMResult<f64> {
        validate_state_index(state, self.n_states())?;
        validate_obs_dim(self.dim(), obs.len())?;
        let mut total = 0.0;
        for (channel, &x) in obs.iter().enumerate() {
            let rate = self.rates[[state, channel]];
            if rate == 0.0 {
                if x != 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                continue;
            }
            total += x * rate.ln() - rate - gamma::ln_gamma(x + 1.0);
        }
        Ok(total)
    }

    fn sample<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> HMMResult<Array1<f64>> {
        validate_state_index(state, self.n_states())?;
        let mut draw = Array1::zeros(self.dim());
        for channel in 0..self.dim() {
            let rate = self.rates[[state, channel]];
            if rate > 0.0 {
                // `Poisson::new` rejects only non-positive or non-finite
                // rates, both excluded by construction.
                let poisson = Poisson::new(rate)
                    .map_err(|_| HMMError::NegativeRate { state, channel, value: rate })?;
                draw[channel] = rng.sample::<f64, _>(poisson);
            }
        }
        Ok(draw)
    }

    fn reestimate(
        &mut self, obs: &ObsSequence, weights: ArrayView2<f64>, _regularizer: f64,
    ) -> HMMResult<()> {
        validate_obs_dim(self.dim(), obs.dim())?;
        validate_weights(weights, obs.len(), self.n_states())?;
        let d = self.dim();
        for state in 0..self.n_states() {
            let weight_sum: f64 = weights.column(state).sum();
            if weight_sum <= 0.0 {
                continue;
            }
            let mut rate = Array1::<f64>::zeros(d);
            for (t, row) in obs.data().outer_iter().enumerate() {
                rate.scaled_add(weights[[t, state]], &row);
            }
            rate /= weight_sum;
            for (channel, &value) in rate.iter().enumerate() {
                // Weights are validated non-negative above, so a negative
                // rate can only come from negative observations upstream.
                if value < 0.0 {
                    return Err(HMMError::NegativeRate { state, channel, value });
                }
            }
            self.rates.row_mut(state).assign(&rate);
        }
        Ok(())
    }

    fn seed_locations(&mut self, locations: ArrayView2<f64>) -> HMMResult<()> {
        let (k, d) = (self.n_states(), self.dim());
        if locations.nrows() != k || locations.ncols() != d {
            return Err(HMMError::WeightShapeMismatch {
                expected: (k, d),
                actual: (locations.nrows(), locations.ncols()),
            });
        }
        for ((state, channel), &value) in locations.indexed_iter() {
            if !value.is_finite() {
                return Err(HMMError::NonFiniteParam { state, value });
            }
            if value < 0.0 {
                return Err(HMMError::NegativeRate { state, channel, value });
            }
        }
        self.rates.assign(&locations);
        Ok(())
    }

    fn permute(&mut self, perm: &[usize]) -> HMMResult<()> {
        validate_permutation(perm, self.n_states())?;
        let mut rates = Array2::zeros(self.rates.raw_dim());
        for (old, &new) in perm.iter().enumerate() {
            rates.row_mut(new).assign(&self.rates.row(old));
        }
        self.rates = rates;
        Ok(())
    }
}
