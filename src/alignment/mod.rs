//! alignment — label-permutation matching between state sequences.
//!
//! HMM labels are identifiable only up to permutation; these utilities
//! ([`confusion_matrix`], [`find_permutation`], [`apply_permutation`],
//! [`agreement`]) align a predicted labeling with a reference one so that
//! fits can be compared meaningfully. They operate on plain `&[usize]`
//! label slices and have no dependency on the model layer.

pub mod errors;
pub mod permutation;

pub use self::errors::{AlignmentError, AlignmentResult};
pub use self::permutation::{agreement, apply_permutation, confusion_matrix, find_permutation};
