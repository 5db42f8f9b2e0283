//! Errors for the inference layer (forward-backward and Viterbi).
//!
//! Inference functions operate on plain log-probability arrays rather than
//! model objects, so their error conditions are purely structural (shape
//! agreement between the emission matrix, transition matrix, and initial
//! distribution) or numerical (the forward/backward consistency check).

/// Result alias for inference routines that may produce [`InferenceError`].
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Error type for forward-backward and Viterbi computations.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Emission log-likelihood matrix has zero timesteps.
    EmptySequence,

    /// An input array dimension disagrees with the implied state count K.
    ///
    /// `what` names the offending input (e.g., "transition matrix rows").
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    /// Forward-pass and backward-pass total log-likelihoods disagree beyond
    /// tolerance. This indicates a numerical problem in the recursions, not
    /// a property of the data.
    ForwardBackwardMismatch { forward: f64, backward: f64 },

    /// The sequence has zero probability under the model (total
    /// log-likelihood `-inf`), so posterior quantities are undefined.
    ZeroProbabilitySequence,
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::EmptySequence => {
                write!(f, "Emission log-likelihood matrix has zero timesteps.")
            }
            InferenceError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Shape mismatch for {what}: expected {expected}, got {actual}")
            }
            InferenceError::ForwardBackwardMismatch { forward, backward } => {
                write!(
                    f,
                    "Forward ({forward}) and backward ({backward}) total log-likelihoods disagree beyond tolerance."
                )
            }
            InferenceError::ZeroProbabilitySequence => {
                write!(
                    f,
                    "Sequence has zero probability under the model; posteriors are undefined."
                )
            }
        }
    }
}
