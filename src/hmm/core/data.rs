//! Validated observation-sequence container.
//!
//! [`ObsSequence`] wraps a dense T×D array of observations (rows are
//! timesteps, columns are channels) and guarantees finiteness on
//! construction so downstream code can assume well-formed inputs. The
//! counts-checking constructor additionally enforces the Poisson-path
//! requirements (non-negative, integer-valued entries).
//!
//! The container is immutable once constructed; fitting and decoding never
//! mutate observations.
use crate::hmm::errors::{HMMError, HMMResult};
use ndarray::Array2;

/// An ordered sequence of T observations, each a D-vector.
///
/// Rows index timesteps (oldest at index 0), columns index channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsSequence {
    data: Array2<f64>,
}

impl ObsSequence {
    /// Construct a validated [`ObsSequence`] from real-valued observations.
    ///
    /// # Errors
    /// - [`HMMError::EmptySequence`] if T = 0 or D = 0.
    /// - [`HMMError::NonFiniteData`] identifying the first NaN/±inf entry.
    pub fn new(data: Array2<f64>) -> HMMResult<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(HMMError::EmptySequence);
        }
        for ((row, col), &value) in data.indexed_iter() {
            if !value.is_finite() {
                return Err(HMMError::NonFiniteData { row, col, value });
            }
        }
        Ok(ObsSequence { data })
    }

    /// Construct a validated [`ObsSequence`] of count observations.
    ///
    /// Applies the checks of [`ObsSequence::new`] plus the count-data
    /// requirements of the Poisson emission family: every entry must be
    /// non-negative and integer-valued (stored as `f64`).
    ///
    /// # Errors
    /// - Everything [`ObsSequence::new`] can return.
    /// - [`HMMError::NegativeCount`] for negative entries.
    /// - [`HMMError::NonIntegerCount`] for fractional entries.
    pub fn counts(data: Array2<f64>) -> HMMResult<Self> {
        let seq = ObsSequence::new(data)?;
        for ((row, col), &value) in seq.data.indexed_iter() {
            if value < 0.0 {
                return Err(HMMError::NegativeCount { row, col, value });
            }
            if value.fract() != 0.0 {
                return Err(HMMError::NonIntegerCount { row, col, value });
            }
        }
        Ok(seq)
    }

    /// Number of timesteps T.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether the sequence holds zero timesteps. Always false for a
    /// successfully constructed instance.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Observation dimensionality D.
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying T×D array.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    // Purpose
    // -------
    // Verify that `ObsSequence::new` accepts finite data and reports shape
    // accessors correctly.
    //
    // Given
    // -----
    // - A 3×2 finite observation array.
    //
    // Expect
    // ------
    // - Construction succeeds with `len() == 3` and `dim() == 2`.
    fn new_accepts_finite_data() {
        let seq = ObsSequence::new(array![[0.0, 1.0], [2.0, -3.0], [4.5, 5.5]])
            .expect("finite data should be accepted");
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.dim(), 2);
        assert!(!seq.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Verify that empty and non-finite inputs are rejected with the
    // documented variants.
    //
    // Given
    // -----
    // - A 0×2 array and a 2×2 array containing NaN at (1, 0).
    //
    // Expect
    // ------
    // - `EmptySequence` and `NonFiniteData { row: 1, col: 0, .. }`.
    fn new_rejects_empty_and_non_finite() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert_eq!(ObsSequence::new(empty), Err(HMMError::EmptySequence));

        let bad = array![[0.0, 1.0], [f64::NAN, 2.0]];
        match ObsSequence::new(bad) {
            Err(HMMError::NonFiniteData { row, col, .. }) => assert_eq!((row, col), (1, 0)),
            other => panic!("expected NonFiniteData, got {:?}", other),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `ObsSequence::counts` enforces the count-data checks on
    // top of the base validation.
    //
    // Given
    // -----
    // - An integer-valued array, one with a negative entry, and one with a
    //   fractional entry.
    //
    // Expect
    // ------
    // - The first is accepted; the others fail with `NegativeCount` and
    //   `NonIntegerCount` respectively.
    fn counts_enforces_non_negative_integers() {
        assert!(ObsSequence::counts(array![[0.0, 3.0], [12.0, 1.0]]).is_ok());

        match ObsSequence::counts(array![[0.0, -1.0]]) {
            Err(HMMError::NegativeCount { row, col, .. }) => assert_eq!((row, col), (0, 1)),
            other => panic!("expected NegativeCount, got {:?}", other),
        }

        match ObsSequence::counts(array![[0.5, 1.0]]) {
            Err(HMMError::NonIntegerCount { row, col, .. }) => assert_eq!((row, col), (0, 0)),
            other => panic!("expected NonIntegerCount, got {:?}", other),
        }
    }
}
