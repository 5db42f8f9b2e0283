//! Log-space numerics for long-sequence inference.
//!
//! All forward-backward and Viterbi arithmetic runs in log space so that
//! products of many small probabilities never underflow; this is mandatory
//! for sequences beyond a few hundred steps. The only nontrivial primitive
//! is [`logsumexp`], implemented with the usual max-shift guard.

use ndarray::ArrayView1;

/// Log of probability zero. Used to initialize accumulators and to encode
/// impossible transitions/emissions without special-casing.
pub const LOG_ZERO: f64 = f64::NEG_INFINITY;

/// Numerically stable `log(sum(exp(values)))`.
///
/// Shifts by the maximum before exponentiating so the largest term maps to
/// `exp(0) = 1` and the sum stays in a well-conditioned regime. An all
/// `-inf` input returns `-inf` (the log of an empty probability mass), and
/// an empty input likewise returns [`LOG_ZERO`].
///
/// # Parameters
/// - `values`: log-domain terms; `-inf` entries are admissible.
///
/// # Returns
/// - `log(Σ exp(values[i]))` as `f64`.
pub fn logsumexp(values: ArrayView1<f64>) -> f64 {
    let max = values.fold(LOG_ZERO, |acc, &v| acc.max(v));
    if !max.is_finite() {
        // All -inf (or empty): the sum of zero masses is zero mass. A +inf
        // or NaN input propagates unchanged.
        return max;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}
