// src/core/state.rs

use super::convention::index_to_bitstring;
use super::error::{KqbitError, Result};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;

/// Dimension `2^num_qubits` of a register, rejecting zero qubits and overflow.
pub(crate) fn dimension_for(num_qubits: usize) -> Result<usize> {
    if num_qubits == 0 {
        return Err(KqbitError::InvalidQubitCount(num_qubits));
    }
    u32::try_from(num_qubits)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .ok_or(KqbitError::InvalidQubitCount(num_qubits))
}

/// The amplitude store: the full state of `n` qubits as a dense vector of
/// `2^n` complex amplitudes.
///
/// The store never normalizes on its own; keeping the norm at one is the job
/// of whatever operator is applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// The all-zero basis state `|0...0>`.
    pub fn zero(num_qubits: usize) -> Result<Self> {
        Self::basis(num_qubits, 0)
    }

    /// The computational basis state with the given index.
    pub fn basis(num_qubits: usize, index: usize) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        if index >= dim {
            return Err(KqbitError::DimensionMismatch {
                expected: dim,
                actual: index,
                context: "basis index must be below the register dimension",
            });
        }
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[index] = Complex64::one();
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Equal superposition over all `2^n` basis states.
    pub fn uniform(num_qubits: usize) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        let weight = (dim as f64).sqrt().recip();
        Ok(Self {
            num_qubits,
            amplitudes: vec![Complex64::new(weight, 0.0); dim],
        })
    }

    /// Wraps an explicit amplitude array. Its length must be `2^num_qubits`.
    pub fn from_amplitudes(num_qubits: usize, amplitudes: Vec<Complex64>) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        if amplitudes.len() != dim {
            return Err(KqbitError::DimensionMismatch {
                expected: dim,
                actual: amplitudes.len(),
                context: "amplitude array length",
            });
        }
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Read-only view of the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Amplitude of a single basis state.
    pub fn amplitude(&self, index: usize) -> Option<Complex64> {
        self.amplitudes.get(index).copied()
    }

    /// Replaces the whole vector. The store is left untouched on error.
    pub fn replace(&mut self, amplitudes: Vec<Complex64>) -> Result<()> {
        if amplitudes.len() != self.amplitudes.len() {
            return Err(KqbitError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: amplitudes.len(),
                context: "replacement vector length",
            });
        }
        self.amplitudes = amplitudes;
        Ok(())
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes, `2^num_qubits`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Born-rule probability of every basis state, indexed like the amplitudes.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Consumes the store, handing back the raw amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StateVector[{} qubits]", self.num_qubits)?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            if c.norm_sqr() > 0.0 {
                writeln!(
                    f,
                    "  |{}> {:.4} (p = {:.4})",
                    index_to_bitstring(i, self.num_qubits),
                    c,
                    c.norm_sqr()
                )?;
            }
        }
        Ok(())
    }
}
