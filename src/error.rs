//! Error types for the bit-string GA.
//!
//! Every failure is local and synchronous: it is raised at the point of
//! violation and never retried. Plan contract violations surface as
//! [`GaError::InvalidState`].

use thiserror::Error;

/// Error type for genotype, individual and engine operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GaError {
    /// The locus-width specification is unusable (empty, zero width, zero repeat).
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// The locus width does not fit the requested accessor.
    #[error("Invalid access to locus {locus} ({width} bits): {reason}")]
    InvalidAccess {
        locus: usize,
        width: usize,
        reason: &'static str,
    },

    /// A probability or value argument is out of its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two genotypes with different layouts were combined.
    #[error("Incompatible schema: {left:?} vs {right:?}")]
    IncompatibleSchema {
        left: Vec<usize>,
        right: Vec<usize>,
    },

    /// An index or rank is outside its bounds.
    #[error("{what} {index} out of range [{lower}, {upper})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        lower: usize,
        upper: usize,
    },

    /// A collaborator broke the plan contract, or an operation needs a
    /// fitness that has not been computed.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for GA operations.
pub type GaResult<T> = Result<T, GaError>;

/// Checks that `value` is a probability in `[0, 1]`. NaN is rejected.
pub(crate) fn check_probability(name: &str, value: f64) -> GaResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GaError::InvalidArgument(format!(
            "{name} must be in [0, 1]: {value}"
        )))
    }
}

/// Checks `index < upper`.
pub(crate) fn check_index(what: &'static str, index: usize, upper: usize) -> GaResult<()> {
    if index < upper {
        Ok(())
    } else {
        Err(GaError::OutOfRange {
            what,
            index,
            lower: 0,
            upper,
        })
    }
}
