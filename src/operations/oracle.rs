// src/operations/oracle.rs

//! Operators used by amplitude amplification: the marked-state phase oracle
//! and the two reflections that make up the diffusion step.

use super::Operator;
use crate::core::convention::bitstring_to_index;
use crate::core::state::dimension_for;
use crate::core::{KqbitError, Result, StateVector};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::collections::BTreeSet;

/// Flips the sign of every marked basis state and leaves the rest alone.
///
/// The oracle is diagonal, so it is held as its set of marked basis indices.
/// [`PhaseOracle::to_operator`] gives the dense `2^n x 2^n` form;
/// [`PhaseOracle::apply_diagonal`] applies the same map directly to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOracle {
    num_qubits: usize,
    marked: BTreeSet<usize>,
}

impl PhaseOracle {
    /// Builds an oracle from marked basis indices.
    ///
    /// # Errors
    /// `InvalidMarkedState` if the set is empty, contains duplicates or
    /// out-of-range indices, or marks every basis state.
    pub fn new<I>(num_qubits: usize, marked: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let dim = dimension_for(num_qubits)?;
        let mut set = BTreeSet::new();
        for index in marked {
            if index >= dim {
                return Err(KqbitError::InvalidMarkedState {
                    message: format!("marked index {} is outside the {}-state space", index, dim),
                });
            }
            if !set.insert(index) {
                return Err(KqbitError::InvalidMarkedState {
                    message: format!("marked index {} appears more than once", index),
                });
            }
        }
        if set.is_empty() {
            return Err(KqbitError::InvalidMarkedState {
                message: "at least one state must be marked".to_string(),
            });
        }
        if set.len() >= dim {
            return Err(KqbitError::InvalidMarkedState {
                message: format!("all {} basis states are marked; nothing to search for", dim),
            });
        }
        Ok(Self {
            num_qubits,
            marked: set,
        })
    }

    /// Builds an oracle from marked bit strings, each exactly `num_qubits` long.
    pub fn from_bitstrings<S: AsRef<str>>(num_qubits: usize, marked: &[S]) -> Result<Self> {
        let indices = marked
            .iter()
            .map(|bits| bitstring_to_index(bits.as_ref(), num_qubits))
            .collect::<Result<Vec<_>>>()?;
        Self::new(num_qubits, indices)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Marked basis indices in ascending order.
    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    pub fn num_marked(&self) -> usize {
        self.marked.len()
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    /// Dense form: the identity with `-1` on every marked diagonal entry.
    ///
    /// Its row index is the basis index, so it must be applied with the
    /// register targets of the active bit order.
    pub fn to_operator(&self) -> Operator {
        let dim = 1usize << self.num_qubits;
        let diagonal: Vec<Complex64> = (0..dim)
            .map(|i| Complex64::new(if self.is_marked(i) { -1.0 } else { 1.0 }, 0.0))
            .collect();
        Operator::from_fixed(Array2::from_diag(&Array1::from(diagonal)))
    }

    /// Applies the oracle in place without building the dense matrix.
    pub fn apply_diagonal(&self, state: &mut StateVector) -> Result<()> {
        if state.num_qubits() != self.num_qubits {
            return Err(KqbitError::DimensionMismatch {
                expected: self.num_qubits,
                actual: state.num_qubits(),
                context: "oracle qubit count vs. state qubit count",
            });
        }
        let mut amplitudes = state.amplitudes().to_vec();
        for &index in &self.marked {
            amplitudes[index] = -amplitudes[index];
        }
        state.replace(amplitudes)
    }
}

/// Dense phase oracle over `num_qubits` qubits marking `marked` basis indices.
pub fn phase_oracle<I>(num_qubits: usize, marked: I) -> Result<Operator>
where
    I: IntoIterator<Item = usize>,
{
    Ok(PhaseOracle::new(num_qubits, marked)?.to_operator())
}

/// Reflection about the all-zero state, `2|0><0| - I`.
pub fn zero_reflection(num_qubits: usize) -> Result<Operator> {
    let dim = dimension_for(num_qubits)?;
    let mut diagonal = vec![Complex64::new(-1.0, 0.0); dim];
    diagonal[0] = Complex64::new(1.0, 0.0);
    Operator::from_diagonal(&diagonal)
}

/// Applies `2|0><0| - I` in place by negating every amplitude except the
/// first. Same result as contracting [`zero_reflection`] over the whole
/// register, without the `2^n x 2^n` matrix.
pub fn reflect_about_zero(state: &mut StateVector) -> Result<()> {
    let mut amplitudes = state.amplitudes().to_vec();
    for amplitude in amplitudes.iter_mut().skip(1) {
        *amplitude = -*amplitude;
    }
    state.replace(amplitudes)
}

/// Inversion about the mean, `2|s><s| - I` with `|s>` the uniform superposition.
///
/// Equal to `zero_reflection` conjugated by a Hadamard on every qubit.
pub fn inversion_about_mean(num_qubits: usize) -> Result<Operator> {
    let dim = dimension_for(num_qubits)?;
    let weight = 2.0 / dim as f64;
    Operator::from_array(Array2::from_shape_fn((dim, dim), |(r, c)| {
        Complex64::new(if r == c { weight - 1.0 } else { weight }, 0.0)
    }))
}
