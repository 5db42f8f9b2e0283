//! Initialization policies for EM.
//!
//! EM converges to a local optimum, so where the emission locations start
//! matters. [`Init`] offers three policies: distinct observation rows
//! chosen at random, a short k-means refinement of that choice, or
//! caller-supplied locations. All randomness flows through the injected
//! RNG, so a seeded generator makes initialization reproducible.
use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    hmm::core::data::ObsSequence,
};
use ndarray::{Array1, Array2};
use rand::Rng;

/// Emission-location initialization policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// Seed each state's location with a distinct observation row chosen
    /// uniformly at random.
    Random,

    /// Run `n_iter` Lloyd iterations of k-means from a [`Init::Random`]
    /// seed. Empty clusters are reseeded to a random observation row.
    KMeans { n_iter: usize },

    /// Use the given K×D locations verbatim.
    Locations(Array2<f64>),
}

/// Produce the K×D initial location matrix for the given policy.
///
/// # Errors
/// - [`EstimationError::InvalidInit`] if the policy is inconsistent with
///   the data: zero states, more states than observations, a zero
///   iteration count for k-means, or a malformed location matrix.
pub fn initial_locations<R: Rng + ?Sized>(
    init: &Init, obs: &ObsSequence, n_states: usize, rng: &mut R,
) -> EstimationResult<Array2<f64>> {
    if n_states == 0 {
        return Err(EstimationError::InvalidInit { reason: "state count must be >= 1" });
    }
    match init {
        Init::Random => random_rows(obs, n_states, rng),
        Init::KMeans { n_iter } => {
            if *n_iter == 0 {
                return Err(EstimationError::InvalidInit {
                    reason: "k-means iteration count must be >= 1",
                });
            }
            let mut centers = random_rows(obs, n_states, rng)?;
            lloyd(&mut centers, obs, *n_iter, rng);
            Ok(centers)
        }
        Init::Locations(locations) => {
            if locations.nrows() != n_states || locations.ncols() != obs.dim() {
                return Err(EstimationError::InvalidInit {
                    reason: "location matrix must be K x D",
                });
            }
            if locations.iter().any(|value| !value.is_finite()) {
                return Err(EstimationError::InvalidInit {
                    reason: "location matrix entries must be finite",
                });
            }
            Ok(locations.clone())
        }
    }
}

/// K distinct observation rows, uniformly at random.
fn random_rows<R: Rng + ?Sized>(
    obs: &ObsSequence, n_states: usize, rng: &mut R,
) -> EstimationResult<Array2<f64>> {
    if n_states > obs.len() {
        return Err(EstimationError::InvalidInit {
            reason: "more states than observations",
        });
    }
    let chosen = rand::seq::index::sample(rng, obs.len(), n_states);
    let mut centers = Array2::zeros((n_states, obs.dim()));
    for (state, row_index) in chosen.iter().enumerate() {
        centers.row_mut(state).assign(&obs.data().row(row_index));
    }
    Ok(centers)
}

/// In-place Lloyd iterations: nearest-center assignment (squared
/// Euclidean, lowest index on ties) then mean update.
fn lloyd<R: Rng + ?Sized>(
    centers: &mut Array2<f64>, obs: &ObsSequence, n_iter: usize, rng: &mut R,
) {
    let k = centers.nrows();
    let d = centers.ncols();
    let mut assignment = vec![0usize; obs.len()];
    for _ in 0..n_iter {
        for (t, row) in obs.data().outer_iter().enumerate() {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for state in 0..k {
                let dist: f64 = (0..d)
                    .map(|i| {
                        let diff = row[i] - centers[[state, i]];
                        diff * diff
                    })
                    .sum();
                if dist < best_dist {
                    best_dist = dist;
                    best = state;
                }
            }
            assignment[t] = best;
        }
        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = Array1::<f64>::zeros(k);
        for (t, row) in obs.data().outer_iter().enumerate() {
            sums.row_mut(assignment[t]).scaled_add(1.0, &row);
            counts[assignment[t]] += 1.0;
        }
        for state in 0..k {
            if counts[state] > 0.0 {
                let count = counts[state];
                centers
                    .row_mut(state)
                    .assign(&(&sums.row(state) / count));
            } else {
                // Empty cluster: reseed to a random observation.
                let row_index = rng.gen_range(0..obs.len());
                centers.row_mut(state).assign(&obs.data().row(row_index));
            }
        }
    }
}
