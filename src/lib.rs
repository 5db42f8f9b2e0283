//! rust_hmm — hidden Markov models with Gaussian and Poisson emissions.
//!
//! Purpose
//! -------
//! Serve as the crate root for a discrete-state HMM stack: validated
//! parameter and data types, log-space exact inference, Baum-Welch EM
//! estimation, and label-alignment utilities for comparing fits across
//! relabelings.
//!
//! Key behaviors
//! -------------
//! - [`hmm`] holds the domain layer: the [`HMM`](hmm::HMM) container, the
//!   emission families, and the probability parameter objects.
//! - [`inference`] implements forward-backward smoothing (with a
//!   forward-vs-backward consistency check) and Viterbi decoding over
//!   plain log-probability arrays.
//! - [`estimation`] drives EM: options, initialization policies, and the
//!   fitting loop with its log-likelihood trace.
//! - [`alignment`] matches state labelings up to permutation.
//!
//! Conventions
//! -----------
//! - Likelihood arithmetic is in log space end to end; `-inf` encodes
//!   zero probability.
//! - Randomness is injected: every sampling or initialization entry point
//!   takes an `&mut impl Rng`, so seeded generators give reproducible
//!   runs and independent models can run on separate threads.
//! - Errors are explicit `Result` values layer by layer; panics indicate
//!   programming errors.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use ndarray::array;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rust_hmm::estimation::{EMOptions, Init};
//! use rust_hmm::hmm::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let emission = GaussianEmission::spherical(array![[0.0, 0.0], [5.0, 5.0]], 1.0)?;
//! let mut model = HMM::uniform(emission)?;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let (_states, observations) = model.sample(500, &mut rng)?;
//! let obs = ObsSequence::new(observations)?;
//!
//! let outcome = model.fit(&obs, &EMOptions::default(), &Init::KMeans { n_iter: 10 }, &mut rng)?;
//! println!("final log-likelihood: {}", outcome.final_log_likelihood());
//! let (path, _score) = model.most_likely_states(&obs)?;
//! # let _ = path;
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod estimation;
pub mod hmm;
pub mod inference;
