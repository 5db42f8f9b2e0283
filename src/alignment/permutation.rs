//! State-label alignment across relabelings.
//!
//! HMM states are identifiable only up to a permutation of labels: two
//! fits of the same data can recover the same structure under different
//! numbering. These utilities align a predicted label sequence with a
//! reference sequence by building a confusion matrix, extracting a
//! greedy maximum-overlap permutation, and measuring post-alignment
//! agreement. The greedy matcher is deterministic (row-major scan, strict
//! improvement), so identical inputs always align identically.
//!
//! Permutations use the same convention as the model layer: `perm[old]`
//! is the new label for `old`, so applying the permutation returned by
//! [`find_permutation`] to the predicted labels maps them onto the
//! reference numbering.
use crate::alignment::errors::{AlignmentError, AlignmentResult};
use ndarray::Array2;

fn validate_labels(labels: &[usize], n_states: usize) -> AlignmentResult<()> {
    if labels.is_empty() {
        return Err(AlignmentError::EmptyLabels);
    }
    for (index, &label) in labels.iter().enumerate() {
        if label >= n_states {
            return Err(AlignmentError::LabelOutOfRange { index, label, n_states });
        }
    }
    Ok(())
}

/// K×K co-occurrence counts: entry (i, j) is the number of positions where
/// `predicted` holds i and `reference` holds j.
///
/// # Errors
/// - [`AlignmentError::LengthMismatch`] / [`AlignmentError::EmptyLabels`]
///   on malformed sequence pairs.
/// - [`AlignmentError::LabelOutOfRange`] identifying the first bad label.
pub fn confusion_matrix(
    predicted: &[usize], reference: &[usize], n_states: usize,
) -> AlignmentResult<Array2<usize>> {
    if predicted.len() != reference.len() {
        return Err(AlignmentError::LengthMismatch {
            left: predicted.len(),
            right: reference.len(),
        });
    }
    validate_labels(predicted, n_states)?;
    validate_labels(reference, n_states)?;
    let mut counts = Array2::zeros((n_states, n_states));
    for (&p, &r) in predicted.iter().zip(reference.iter()) {
        counts[[p, r]] += 1;
    }
    Ok(counts)
}

/// Greedy maximum-overlap matching of predicted labels onto reference
/// labels.
///
/// Repeatedly takes the largest remaining confusion cell (row-major scan
/// with strict improvement, so the earliest maximum wins) and pairs its
/// predicted label with its reference label; predicted labels left
/// without a pair receive the remaining reference labels in ascending
/// order. Greedy matching is not guaranteed optimal for adversarial
/// confusion matrices, but it is exact whenever states are well separated
/// and it avoids a Hungarian-algorithm dependency.
///
/// # Returns
/// - A permutation with `perm[predicted_label] = reference_label`.
///
/// # Errors
/// - Everything [`confusion_matrix`] can return.
pub fn find_permutation(
    predicted: &[usize], reference: &[usize], n_states: usize,
) -> AlignmentResult<Vec<usize>> {
    let counts = confusion_matrix(predicted, reference, n_states)?;

    let mut perm = vec![usize::MAX; n_states];
    let mut row_taken = vec![false; n_states];
    let mut col_taken = vec![false; n_states];
    for _ in 0..n_states {
        let mut best: Option<(usize, usize, usize)> = None;
        for i in 0..n_states {
            if row_taken[i] {
                continue;
            }
            for j in 0..n_states {
                if col_taken[j] {
                    continue;
                }
                let cell = counts[[i, j]];
                match best {
                    Some((_, _, value)) if cell <= value => {}
                    _ => best = Some((i, j, cell)),
                }
            }
        }
        // n_states >= 1 here because validate_labels rejected empty input,
        // so each round finds an untaken cell.
        if let Some((i, j, _)) = best {
            perm[i] = j;
            row_taken[i] = true;
            col_taken[j] = true;
        }
    }
    Ok(perm)
}

/// Relabel `labels` through `perm` (`perm[old] = new`).
///
/// # Errors
/// - [`AlignmentError::InvalidPermutation`] if `perm` is not a bijection
///   on the permutation's own length.
/// - [`AlignmentError::EmptyLabels`] / [`AlignmentError::LabelOutOfRange`]
///   on malformed labels.
pub fn apply_permutation(labels: &[usize], perm: &[usize]) -> AlignmentResult<Vec<usize>> {
    let n_states = perm.len();
    let mut seen = vec![false; n_states];
    for &target in perm {
        if target >= n_states || seen[target] {
            return Err(AlignmentError::InvalidPermutation { len: perm.len(), n_states });
        }
        seen[target] = true;
    }
    validate_labels(labels, n_states)?;
    Ok(labels.iter().map(|&label| perm[label]).collect())
}

/// Fraction of positions where the two sequences agree.
///
/// # Errors
/// - [`AlignmentError::LengthMismatch`] / [`AlignmentError::EmptyLabels`]
///   on malformed sequence pairs.
pub fn agreement(left: &[usize], right: &[usize]) -> AlignmentResult<f64> {
    if left.len() != right.len() {
        return Err(AlignmentError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    if left.is_empty() {
        return Err(AlignmentError::EmptyLabels);
    }
    let matches = left.iter().zip(right.iter()).filter(|(a, b)| a == b).count();
    Ok(matches as f64 / left.len() as f64)
}
