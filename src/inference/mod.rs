//! inference — log-space forward-backward smoothing and Viterbi decoding.
//!
//! Purpose
//! -------
//! Implement the exact-inference algorithms over plain log-probability
//! arrays, decoupled from the model layer: the forward/backward
//! recursions with their consistency check ([`forward_backward`]), and
//! maximum a posteriori path decoding ([`viterbi`]). Operating on raw
//! arrays keeps the layer testable in isolation and reusable by any
//! emission family.
//!
//! Conventions
//! -----------
//! - Inputs are a T×K emission log-likelihood matrix, a K×K transition
//!   log-matrix, and a K-length initial log-distribution; `-inf` encodes
//!   zero probability throughout ([`LOG_ZERO`]).
//! - All accumulation goes through [`logsumexp`]; nothing in this layer
//!   exponentiates before the final posterior assembly.
//! - Errors are surfaced as [`InferenceResult`]; this layer performs no
//!   I/O and no logging.

pub mod errors;
pub mod forward_backward;
pub mod logspace;
pub mod viterbi;

pub use self::errors::{InferenceError, InferenceResult};
pub use self::forward_backward::{
    backward, forward, forward_backward, Posteriors, FB_CONSISTENCY_RTOL,
};
pub use self::logspace::{logsumexp, LOG_ZERO};
pub use self::viterbi::viterbi;
