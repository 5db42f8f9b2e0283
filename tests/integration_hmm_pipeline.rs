//! End-to-end pipeline tests: sample from a ground-truth model, fit a
//! fresh model with EM, align labels up to permutation, and check
//! recovery quality. Everything runs on seeded RNGs so failures are
//! reproducible.

use ndarray::{array, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_hmm::alignment::{agreement, apply_permutation, find_permutation};
use rust_hmm::estimation::{EMOptions, FitStatus, Init, MONOTONICITY_ATOL};
use rust_hmm::hmm::prelude::*;

/// Five Gaussian states at radius 3 on equally spaced angles with tight
/// (0.1·I) covariance and sticky dynamics; adjacent means sit roughly
/// eleven standard deviations apart.
fn gaussian_ground_truth() -> HMM<GaussianEmission> {
    let n_states = 5;
    let radius = 3.0;
    let mut means = Array2::zeros((n_states, 2));
    for state in 0..n_states {
        let angle = 2.0 * std::f64::consts::PI * state as f64 / n_states as f64;
        means[[state, 0]] = radius * angle.cos();
        means[[state, 1]] = radius * angle.sin();
    }
    let emission = GaussianEmission::spherical(means, 0.1).expect("valid spherical emission");

    let mut matrix = Array2::from_elem((n_states, n_states), 0.05);
    for state in 0..n_states {
        matrix[[state, state]] = 0.8;
    }
    let transition = TransitionModel::new(matrix).expect("sticky matrix is stochastic");
    let start = StartModel::uniform(n_states).expect("n_states >= 1");
    HMM::new(start, transition, emission).expect("components agree on K")
}

fn sampled_sequence<E: EmissionModel>(
    model: &HMM<E>, num_steps: usize, seed: u64,
) -> (Vec<usize>, ObsSequence) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (states, observations) = model.sample(num_steps, &mut rng).expect("num_steps > 0");
    let obs = ObsSequence::new(observations).expect("sampled data is finite");
    (states, obs)
}

#[test]
// Purpose
// -------
// Verify end-to-end Gaussian recovery: a cold-started model fitted to
// sampled data should relearn the generating structure up to a label
// permutation.
//
// Given
// -----
// - 1000 steps sampled from the five-state circular ground truth; a fresh
//   uniform model fitted with k-means initialization and defaults.
//
// Expect
// ------
// - The fit terminates (converged or budget), the log-likelihood trace is
//   non-decreasing up to the tolerated slack and improves overall, and
//   the decoded path agrees with the true path on more than 90% of steps
//   after alignment.
fn gaussian_fit_recovers_generating_states() {
    let truth = gaussian_ground_truth();
    let (true_states, obs) = sampled_sequence(&truth, 1000, 42);

    let blank =
        GaussianEmission::spherical(Array2::zeros((5, 2)), 1.0).expect("valid blank emission");
    let mut model = HMM::uniform(blank).expect("uniform construction");
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let outcome = model
        .fit(&obs, &EMOptions::default(), &Init::KMeans { n_iter: 20 }, &mut rng)
        .expect("fit should succeed on well-separated data");

    for pair in outcome.log_likelihoods.windows(2) {
        assert!(pair[1] >= pair[0] - MONOTONICITY_ATOL);
    }
    assert!(outcome.final_log_likelihood() > outcome.log_likelihoods[0]);

    let (decoded, _) = model.most_likely_states(&obs).expect("decoding should succeed");
    let perm = find_permutation(&decoded, &true_states, 5).expect("valid label sequences");
    let aligned = apply_permutation(&decoded, &perm).expect("valid permutation");
    let score = agreement(&aligned, &true_states).expect("equal lengths");
    assert!(score > 0.9, "aligned agreement too low: {score}");
}

#[test]
// Purpose
// -------
// Verify that relabeling the fitted model through the alignment
// permutation reproduces the aligned decoding directly.
//
// Given
// -----
// - The fitted model from a 600-step Gaussian run, permuted via
//   `permute_states` with the alignment permutation.
//
// Expect
// ------
// - Decoding after the permutation equals the permuted decoding before
//   it, and the sequence log-probability is unchanged within 1e-8.
fn permuting_the_model_matches_permuting_labels() {
    let truth = gaussian_ground_truth();
    let (true_states, obs) = sampled_sequence(&truth, 600, 11);

    let blank =
        GaussianEmission::spherical(Array2::zeros((5, 2)), 1.0).expect("valid blank emission");
    let mut model = HMM::uniform(blank).expect("uniform construction");
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    model
        .fit(&obs, &EMOptions::default(), &Init::KMeans { n_iter: 20 }, &mut rng)
        .expect("fit should succeed");

    let score_before = model.log_probability(&obs).expect("scoring should succeed");
    let (decoded, _) = model.most_likely_states(&obs).expect("decoding should succeed");
    let perm = find_permutation(&decoded, &true_states, 5).expect("valid label sequences");
    let relabeled = apply_permutation(&decoded, &perm).expect("valid permutation");

    model.permute_states(&perm).expect("alignment permutation is a bijection");
    let (decoded_after, _) = model.most_likely_states(&obs).expect("decoding should succeed");
    assert_eq!(decoded_after, relabeled);

    let score_after = model.log_probability(&obs).expect("scoring should succeed");
    assert!((score_before - score_after).abs() < 1e-8);
}

#[test]
// Purpose
// -------
// Verify Poisson fitting and cross-model scoring.
//
// Given
// -----
// - 400 steps sampled from a two-state Poisson model with rates 5 and 40
//   and sticky dynamics; a fresh model fitted with k-means
//   initialization; and a deliberately mismatched model with swapped-in
//   wrong rates.
//
// Expect
// ------
// - The fitted model recovers the state path (>90% aligned agreement)
//   and rates within 20% of truth, and the data scores strictly higher
//   under the generating model than under the mismatched one.
fn poisson_fit_and_cross_scoring() {
    let emission = PoissonEmission::new(array![[5.0], [40.0]]).expect("valid rates");
    let transition =
        TransitionModel::new(array![[0.9, 0.1], [0.15, 0.85]]).expect("stochastic matrix");
    let start = StartModel::uniform(2).expect("two states");
    let truth = HMM::new(start, transition, emission).expect("components agree on K");

    let (true_states, obs) = sampled_sequence(&truth, 400, 3);

    let blank = PoissonEmission::new(array![[1.0], [2.0]]).expect("valid placeholder rates");
    let mut model = HMM::uniform(blank).expect("uniform construction");
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    model
        .fit(&obs, &EMOptions::default(), &Init::KMeans { n_iter: 20 }, &mut rng)
        .expect("fit should succeed on well-separated rates");

    let (decoded, _) = model.most_likely_states(&obs).expect("decoding should succeed");
    let perm = find_permutation(&decoded, &true_states, 2).expect("valid label sequences");
    let aligned = apply_permutation(&decoded, &perm).expect("valid permutation");
    assert!(agreement(&aligned, &true_states).expect("equal lengths") > 0.9);

    let mut fitted_rates: Vec<f64> =
        model.emission().rates().column(0).iter().copied().collect();
    fitted_rates.sort_by(|a, b| a.partial_cmp(b).expect("rates are finite"));
    assert!((fitted_rates[0] - 5.0).abs() / 5.0 < 0.2);
    assert!((fitted_rates[1] - 40.0).abs() / 40.0 < 0.2);

    let mismatched_emission =
        PoissonEmission::new(array![[40.0], [5.0]]).expect("valid rates");
    let mismatched_transition =
        TransitionModel::new(array![[0.1, 0.9], [0.85, 0.15]]).expect("stochastic matrix");
    let mismatched = HMM::new(
        StartModel::uniform(2).expect("two states"),
        mismatched_transition,
        mismatched_emission,
    )
    .expect("components agree on K");
    // Same emission support but anti-sticky dynamics mismatched to the data.
    let under_truth = truth.log_probability(&obs).expect("scoring should succeed");
    let under_mismatch = mismatched.log_probability(&obs).expect("scoring should succeed");
    assert!(under_truth > under_mismatch);
}

#[test]
// Purpose
// -------
// Verify near-noiseless Viterbi recovery and posterior coherence.
//
// Given
// -----
// - 300 steps from the circular ground truth with variance shrunk to
//   0.01, decoded and smoothed under the generating parameters.
//
// Expect
// ------
// - The decoded path matches the generating path on >99% of steps, every
//   posterior row sums to 1 within 1e-9, and the Viterbi score never
//   exceeds the total log-probability.
fn near_noiseless_decoding_recovers_the_path() {
    let truth = gaussian_ground_truth();
    let sharp = GaussianEmission::spherical(truth.emission().means().to_owned(), 0.01)
        .expect("valid sharp emission");
    let sharp_model = HMM::new(
        StartModel::uniform(5).expect("five states"),
        truth.transition().clone(),
        sharp,
    )
    .expect("components agree on K");

    let (true_states, obs) = sampled_sequence(&sharp_model, 300, 17);

    let (decoded, viterbi_score) =
        sharp_model.most_likely_states(&obs).expect("decoding should succeed");
    assert!(agreement(&decoded, &true_states).expect("equal lengths") > 0.99);

    let total = sharp_model.log_probability(&obs).expect("scoring should succeed");
    assert!(total.is_finite());
    assert!(viterbi_score <= total + 1e-9);

    let posteriors = sharp_model.posteriors(&obs).expect("smoothing should succeed");
    for row in posteriors.gamma.outer_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
    assert!((posteriors.log_likelihood - total).abs() < 1e-9);
}

#[test]
// Purpose
// -------
// Verify the single-state edge case end to end.
//
// Given
// -----
// - A one-state Gaussian model fitted to 50 arbitrary observations.
//
// Expect
// ------
// - The fit converges almost immediately, the stored results match the
//   returned outcome, and decoding yields the all-zero path.
fn single_state_model_converges_immediately() {
    let blank = GaussianEmission::spherical(Array2::zeros((1, 2)), 1.0)
        .expect("valid one-state emission");
    let mut model = HMM::uniform(blank).expect("uniform construction");

    let truth = gaussian_ground_truth();
    let (_, obs) = sampled_sequence(&truth, 50, 23);

    let mut rng = ChaCha8Rng::seed_from_u64(29);
    let outcome = model
        .fit(&obs, &EMOptions::default(), &Init::KMeans { n_iter: 5 }, &mut rng)
        .expect("fit should succeed");

    match outcome.status {
        FitStatus::Converged { iterations } => assert!(iterations <= 2),
        other => panic!("expected convergence, got {:?}", other),
    }
    assert_eq!(model.results().expect("fit was stored"), &outcome);

    let (decoded, _) = model.most_likely_states(&obs).expect("decoding should succeed");
    assert!(decoded.iter().all(|&s| s == 0));
}
