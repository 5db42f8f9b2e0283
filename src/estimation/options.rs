//! EM configuration.
//!
//! [`EMOptions`] gathers the convergence and regularization knobs of the
//! fitting loop. Fields are public for struct-literal construction; the
//! driver re-validates on entry, so a hand-built literal with bad values
//! fails at `fit` time rather than silently misbehaving.
use crate::estimation::errors::{EstimationError, EstimationResult};

/// Configuration for one EM fit.
#[derive(Debug, Clone, PartialEq)]
pub struct EMOptions {
    /// Convergence tolerance on the absolute change in total
    /// log-likelihood between consecutive iterations.
    pub tol: f64,

    /// Iteration budget. Reaching it is a normal termination
    /// ([`FitStatus::MaxIterationsReached`]), not an error.
    ///
    /// [`FitStatus::MaxIterationsReached`]: crate::estimation::em::FitStatus::MaxIterationsReached
    pub max_iter: usize,

    /// Diagonal jitter added to every reestimated covariance before
    /// factorization (Gaussian family only).
    pub cov_regularizer: f64,

    /// Pseudocount added to every expected transition count in the
    /// transition M-step. Keeps rows strictly positive so log-space
    /// inference never sees a structurally impossible transition that the
    /// data alone would create.
    pub trans_pseudocount: f64,

    /// Pseudocount added to the time-0 posterior in the start M-step.
    pub start_pseudocount: f64,
}

impl EMOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`EstimationError::InvalidTolerance`] if `tol` is not finite and
    ///   strictly positive.
    /// - [`EstimationError::InvalidMaxIter`] if `max_iter == 0`.
    /// - [`EstimationError::InvalidRegularizer`] /
    ///   [`EstimationError::InvalidPseudocount`] if a regularization
    ///   constant is negative or non-finite.
    pub fn new(
        tol: f64, max_iter: usize, cov_regularizer: f64, trans_pseudocount: f64,
        start_pseudocount: f64,
    ) -> EstimationResult<Self> {
        let options = EMOptions {
            tol,
            max_iter,
            cov_regularizer,
            trans_pseudocount,
            start_pseudocount,
        };
        options.validate()?;
        Ok(options)
    }

    /// Re-check all fields; called by the EM driver on entry.
    pub fn validate(&self) -> EstimationResult<()> {
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(EstimationError::InvalidTolerance { value: self.tol });
        }
        if self.max_iter == 0 {
            return Err(EstimationError::InvalidMaxIter { value: self.max_iter });
        }
        if !self.cov_regularizer.is_finite() || self.cov_regularizer < 0.0 {
            return Err(EstimationError::InvalidRegularizer { value: self.cov_regularizer });
        }
        for &pseudocount in [self.trans_pseudocount, self.start_pseudocount].iter() {
            if !pseudocount.is_finite() || pseudocount < 0.0 {
                return Err(EstimationError::InvalidPseudocount { value: pseudocount });
            }
        }
        Ok(())
    }
}

impl Default for EMOptions {
    /// Defaults: `tol = 1e-6`, `max_iter = 100`, `cov_regularizer = 1e-6`,
    /// both pseudocounts `1e-3`.
    fn default() -> Self {
        EMOptions {
            tol: 1e-6,
            max_iter: 100,
            cov_regularizer: 1e-6,
            trans_pseudocount: 1e-3,
            start_pseudocount: 1e-3,
        }
    }
}
