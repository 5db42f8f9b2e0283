//! Maximum a posteriori state-path decoding.
//!
//! The Viterbi recursion shares the forward pass's log-domain inputs but
//! replaces the sum over predecessors with a max, tracking back-pointers
//! to reconstruct the single most probable state path. Ties are broken
//! deterministically toward the lowest state index, both in the
//! per-step argmax and in the terminal state selection, so decoding the
//! same inputs always yields the same path.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    logspace::LOG_ZERO,
};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Decode the most probable state path and its joint log-probability.
///
/// # Parameters
/// - `log_b`: T×K emission log-likelihood matrix.
/// - `log_a`: K×K transition log-matrix.
/// - `log_pi`: K-length initial-state log-distribution.
///
/// # Returns
/// - The length-T state path and `max_path log P(path, obs)`. The score is
///   `-inf` when every path has zero probability; the returned path is
///   then the all-lowest-index path from the tie-break rule.
///
/// # Errors
/// - [`InferenceError::EmptySequence`] if `log_b` has zero timesteps or
///   zero states.
/// - [`InferenceError::ShapeMismatch`] if `log_a` or `log_pi` disagrees
///   with the state count implied by `log_b`.
pub fn viterbi(
    log_b: ArrayView2<f64>, log_a: ArrayView2<f64>, log_pi: ArrayView1<f64>,
) -> InferenceResult<(Vec<usize>, f64)> {
    let (t_len, k) = log_b.dim();
    if t_len == 0 || k == 0 {
        return Err(InferenceError::EmptySequence);
    }
    if log_a.nrows() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "transition matrix rows",
            expected: k,
            actual: log_a.nrows(),
        });
    }
    if log_a.ncols() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "transition matrix columns",
            expected: k,
            actual: log_a.ncols(),
        });
    }
    if log_pi.len() != k {
        return Err(InferenceError::ShapeMismatch {
            what: "initial distribution length",
            expected: k,
            actual: log_pi.len(),
        });
    }

    let mut delta = Array2::from_elem((t_len, k), LOG_ZERO);
    let mut back = Array2::<usize>::zeros((t_len, k));
    for j in 0..k {
        delta[[0, j]] = log_pi[j] + log_b[[0, j]];
    }
    for t in 1..t_len {
        for j in 0..k {
            // Ascending scan with strict `>` keeps the lowest-index
            // predecessor on ties.
            let mut best_state = 0;
            let mut best_score = delta[[t - 1, 0]] + log_a[[0, j]];
            for i in 1..k {
                let score = delta[[t - 1, i]] + log_a[[i, j]];
                if score > best_score {
                    best_score = score;
                    best_state = i;
                }
            }
            delta[[t, j]] = best_score + log_b[[t, j]];
            back[[t, j]] = best_state;
        }
    }

    let mut last = 0;
    let mut score = delta[[t_len - 1, 0]];
    for j in 1..k {
        if delta[[t_len - 1, j]] > score {
            score = delta[[t_len - 1, j]];
            last = j;
        }
    }

    let mut path = vec![0; t_len];
    path[t_len - 1] = last;
    for t in (1..t_len).rev() {
        path[t - 1] = back[[t, path[t]]];
    }
    Ok((path, score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify path recovery on a problem with a clearly dominant path and
    // that the returned score equals that path's joint log-probability.
    //
    // Given
    // -----
    // - Sharp emissions favoring 0 → 1 → 1 with a sticky transition
    //   matrix.
    //
    // Expect
    // ------
    // - The decoded path is [0, 1, 1] and the score matches the manual
    //   log-joint within 1e-12.
    fn recovers_dominant_path_with_matching_score() {
        let b = array![[0.95, 0.05], [0.1, 0.9], [0.2, 0.8]].mapv(f64::ln);
        let a = array![[0.7, 0.3], [0.2, 0.8]].mapv(f64::ln);
        let pi = array![0.5, 0.5].mapv(f64::ln);
        let (path, score) = viterbi(b.view(), a.view(), pi.view()).unwrap();
        assert_eq!(path, vec![0, 1, 1]);
        let manual =
            pi[0] + b[[0, 0]] + a[[0, 1]] + b[[1, 1]] + a[[1, 1]] + b[[2, 1]];
        assert!((score - manual).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the deterministic lowest-index tie-break.
    //
    // Given
    // -----
    // - A fully symmetric problem where every path has identical
    //   probability.
    //
    // Expect
    // ------
    // - The decoded path is all zeros.
    fn ties_break_toward_lowest_index() {
        let b = array![[0.5, 0.5], [0.5, 0.5], [0.5, 0.5]].mapv(f64::ln);
        let a = array![[0.5, 0.5], [0.5, 0.5]].mapv(f64::ln);
        let pi = array![0.5, 0.5].mapv(f64::ln);
        let (path, _) = viterbi(b.view(), a.view(), pi.view()).unwrap();
        assert_eq!(path, vec![0, 0, 0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify the single-timestep and zero-probability edge cases.
    //
    // Given
    // -----
    // - T = 1 with asymmetric initial mass; and emissions that are `-inf`
    //   everywhere at one timestep.
    //
    // Expect
    // ------
    // - T = 1 picks the argmax of `log_pi + log_b[0]`; the impossible
    //   problem returns a path with score `-inf` rather than an error.
    fn handles_single_step_and_impossible_sequences() {
        let b = array![[0.1, 0.9]].mapv(f64::ln);
        let a = array![[0.5, 0.5], [0.5, 0.5]].mapv(f64::ln);
        let pi = array![0.5, 0.5].mapv(f64::ln);
        let (path, _) = viterbi(b.view(), a.view(), pi.view()).unwrap();
        assert_eq!(path, vec![1]);

        let impossible = array![[LOG_ZERO, LOG_ZERO], [LOG_ZERO, LOG_ZERO]];
        let (path, score) = viterbi(impossible.view(), a.view(), pi.view()).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(score, LOG_ZERO);
    }
}
