//! models — user-facing HMM containers.
//!
//! The [`HMM`] container assembles the core parameter objects into a
//! complete model and exposes sampling, scoring, decoding, fitting, and
//! relabeling. See [`hmm::core`](crate::hmm::core) for the building
//! blocks it composes.

pub mod hmm;

pub use self::hmm::HMM;
