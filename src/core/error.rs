//! Error handling logic

use thiserror::Error;

/// Errors raised by the state store, the contraction engine and the search driver.
///
/// Every failure is local and synchronous: it is returned at the point of the
/// offending call, before any amplitude has been modified.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KqbitError {
    /// A length does not agree with the declared qubit count, or an operator's
    /// size does not agree with the number of target qubits.
    #[error("Dimension mismatch ({context}): expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The size required by the declared shape.
        expected: usize,
        /// The size that was supplied.
        actual: usize,
        /// Which quantity was being checked.
        context: &'static str,
    },

    /// Duplicate or out-of-range qubit indices in a target list.
    #[error("Invalid target qubits: {message}")]
    InvalidTargets {
        /// InvalidTargets failure message
        message: String,
    },

    /// Marked-state strings of inconsistent length, an empty marked set, or a
    /// marked set covering the whole state space.
    #[error("Invalid marked state: {message}")]
    InvalidMarkedState {
        /// InvalidMarkedState failure message
        message: String,
    },

    /// Raised only when unitarity validation is enabled.
    #[error("Operator is not unitary: max |U·U† - I| = {deviation:e} exceeds tolerance {tolerance:e}")]
    NonUnitaryOperator {
        /// Largest entry-wise deviation of `U·U†` from the identity.
        deviation: f64,
        /// Tolerance that was exceeded.
        tolerance: f64,
    },

    /// Zero qubits, or a register whose dimension would overflow `usize`.
    #[error("Invalid qubit count: {0}")]
    InvalidQubitCount(usize),

    /// The state vector does not have unit norm (or has zero norm when sampling).
    #[error("State vector is not normalized: sum(|c_i|^2) = {norm_sqr} (tolerance {tolerance:e})")]
    NotNormalized {
        /// Observed squared norm.
        norm_sqr: f64,
        /// Tolerance that was exceeded.
        tolerance: f64,
    },

    /// An inbound gate identifier is not part of the gate set.
    #[error("Gate '{0}' is not defined")]
    UnknownGate(String),

    /// Tensor reshape failed inside the contraction engine.
    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, KqbitError>;
