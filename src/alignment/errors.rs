//! Errors for label-sequence alignment.

/// Result alias for alignment routines that may produce [`AlignmentError`].
pub type AlignmentResult<T> = Result<T, AlignmentError>;

/// Error type for confusion-matrix construction and permutation finding.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// The two label sequences have different lengths.
    LengthMismatch { left: usize, right: usize },

    /// Label sequences are empty; agreement and matching are undefined.
    EmptyLabels,

    /// A label exceeds the declared state count.
    LabelOutOfRange { index: usize, label: usize, n_states: usize },

    /// A permutation is not a bijection on {0, ..., K-1}.
    InvalidPermutation { len: usize, n_states: usize },
}

impl std::error::Error for AlignmentError {}

impl std::fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::LengthMismatch { left, right } => {
                write!(f, "Label sequences have different lengths: {left} vs {right}")
            }
            AlignmentError::EmptyLabels => {
                write!(f, "Label sequences are empty.")
            }
            AlignmentError::LabelOutOfRange { index, label, n_states } => {
                write!(
                    f,
                    "Label {label} at index {index} out of range for {n_states} states."
                )
            }
            AlignmentError::InvalidPermutation { len, n_states } => {
                write!(
                    f,
                    "Permutation of length {len} is not a bijection on {{0, ..., {}}}.",
                    n_states.saturating_sub(1)
                )
            }
        }
    }
}
