// src/validation/mod.rs

//! Checks on states and operators.
//!
//! None of these run on the hot path by default. The contraction engine calls
//! [`check_unitary`] only when unitarity validation is switched on in the
//! [`SimulatorConfig`](crate::simulation::SimulatorConfig).

use crate::core::{DEFAULT_TOLERANCE, KqbitError, Result, StateVector};
use crate::operations::Operator;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to [`DEFAULT_TOLERANCE`].
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(KqbitError::NotNormalized)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let norm_sqr = state.norm_sqr();
    if (norm_sqr - 1.0).abs() > effective_tolerance {
        Err(KqbitError::NotNormalized {
            norm_sqr,
            tolerance: effective_tolerance,
        })
    } else {
        Ok(())
    }
}

/// Checks `U·U† = I` entry-wise within `tolerance` (default [`DEFAULT_TOLERANCE`]).
pub fn check_unitary(operator: &Operator, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let deviation = operator.unitarity_deviation();
    if deviation > effective_tolerance {
        Err(KqbitError::NonUnitaryOperator {
            deviation,
            tolerance: effective_tolerance,
        })
    } else {
        Ok(())
    }
}

/// Performs basic validation checks on a state: the qubit count must match
/// the amplitude count and the vector must be normalized.
pub fn validate_state(state: &StateVector, norm_tolerance: Option<f64>) -> Result<()> {
    let expected = 1usize << state.num_qubits();
    if state.dim() != expected {
        return Err(KqbitError::DimensionMismatch {
            expected,
            actual: state.dim(),
            context: "amplitude count vs. qubit count",
        });
    }
    check_normalization(state, norm_tolerance)
}
