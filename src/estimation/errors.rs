//! Errors for the EM estimation layer.
//!
//! The EM driver composes the domain layer (emission/transition/start
//! reestimation) with the inference layer (forward-backward), so its error
//! type wraps both alongside its own configuration-validation variants.
//! Non-convergence is **not** an error: reaching the iteration budget is a
//! normal termination surfaced as a [`FitStatus`](crate::estimation::em::FitStatus).
use crate::{hmm::errors::HMMError, inference::errors::InferenceError};

/// Result alias for estimation routines that may produce [`EstimationError`].
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Error type for EM configuration and execution.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    // ---- Options validation ----
    /// Convergence tolerance must be finite and > 0.
    InvalidTolerance { value: f64 },

    /// Maximum iteration count must be >= 1.
    InvalidMaxIter { value: usize },

    /// Covariance regularizer must be finite and >= 0.
    InvalidRegularizer { value: f64 },

    /// Dirichlet-style pseudocount must be finite and >= 0.
    InvalidPseudocount { value: f64 },

    /// Initialization policy configuration is invalid.
    InvalidInit { reason: &'static str },

    // ---- Wrapped lower-layer failures ----
    /// Domain-layer failure (validation or M-step reestimation).
    Model(HMMError),

    /// Inference-layer failure (E-step forward-backward).
    Inference(InferenceError),
}

impl std::error::Error for EstimationError {}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationError::InvalidTolerance { value } => {
                write!(f, "Convergence tolerance must be finite and > 0; got: {value}")
            }
            EstimationError::InvalidMaxIter { value } => {
                write!(f, "Maximum iteration count must be >= 1; got: {value}")
            }
            EstimationError::InvalidRegularizer { value } => {
                write!(f, "Covariance regularizer must be finite and >= 0; got: {value}")
            }
            EstimationError::InvalidPseudocount { value } => {
                write!(f, "Pseudocount must be finite and >= 0; got: {value}")
            }
            EstimationError::InvalidInit { reason } => {
                write!(f, "Invalid initialization policy: {reason}")
            }
            EstimationError::Model(err) => {
                write!(f, "M-step failed: {err}")
            }
            EstimationError::Inference(err) => {
                write!(f, "E-step failed: {err}")
            }
        }
    }
}

impl From<HMMError> for EstimationError {
    fn from(err: HMMError) -> EstimationError {
        // Inference failures reaching the estimator through a model-level
        // wrapper are unwrapped so callers see the original condition.
        match err {
            HMMError::Inference(inner) => EstimationError::Inference(inner),
            other => EstimationError::Model(other),
        }
    }
}

impl From<InferenceError> for EstimationError {
    fn from(err: InferenceError) -> EstimationError {
        EstimationError::Inference(err)
    }
}
