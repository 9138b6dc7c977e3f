// src/operations/mod.rs

//! Operator factory: dense unitary matrices and the named gate set.
//!
//! Everything in this module is a pure constructor. Operators know nothing
//! about the register they will be applied to; placing them on qubits is the
//! job of the contraction engine in [`crate::simulation::engine`].

mod gates;
mod oracle;

pub use gates::Gate;
pub use oracle::{
    PhaseOracle, inversion_about_mean, phase_oracle, reflect_about_zero, zero_reflection,
};

use crate::core::state::dimension_for;
use crate::core::{KqbitError, Result};
use ndarray::{Array2, linalg::kron, s};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;

/// A k-qubit operator stored as a dense `2^k x 2^k` complex matrix.
///
/// Row and column indices follow the order of the target list the operator is
/// applied with: the first target is the most significant bit of the index.
///
/// Construction checks the shape only. Unitarity is checked on demand with
/// [`Operator::is_unitary`] or by an engine running in validation mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    matrix: Array2<Complex64>,
    num_qubits: usize,
}

impl Operator {
    /// Wraps a square matrix whose dimension is a power of two (at least 2).
    pub fn from_array(matrix: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(KqbitError::DimensionMismatch {
                expected: rows,
                actual: cols,
                context: "operator matrix must be square",
            });
        }
        if rows < 2 || !rows.is_power_of_two() {
            return Err(KqbitError::DimensionMismatch {
                expected: rows.next_power_of_two().max(2),
                actual: rows,
                context: "operator dimension must be a power of two",
            });
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        })
    }

    /// Builds an operator from row-major complex rows.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Result<Self> {
        let dim = rows.len();
        let mut flat = Vec::with_capacity(dim * dim);
        for row in &rows {
            if row.len() != dim {
                return Err(KqbitError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                    context: "operator matrix must be square",
                });
            }
            flat.extend_from_slice(row);
        }
        Self::from_array(Array2::from_shape_vec((dim, dim), flat)?)
    }

    /// Builds an operator from row-major real rows.
    pub fn from_real_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.as_ref().iter().map(|&re| Complex64::new(re, 0.0)).collect())
                .collect(),
        )
    }

    /// Diagonal operator with the given entries.
    pub fn from_diagonal(diagonal: &[Complex64]) -> Result<Self> {
        let dim = diagonal.len();
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for (i, d) in diagonal.iter().enumerate() {
            matrix[[i, i]] = *d;
        }
        Self::from_array(matrix)
    }

    /// The `2^k x 2^k` identity.
    pub fn identity(num_qubits: usize) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        Ok(Self {
            matrix: Array2::eye(dim),
            num_qubits,
        })
    }

    /// Used by the fixed gate constructors, whose shapes are known to be valid.
    pub(crate) fn from_fixed(matrix: Array2<Complex64>) -> Self {
        let num_qubits = matrix.nrows().trailing_zeros() as usize;
        Self { matrix, num_qubits }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Number of qubits `k` the operator acts on.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension `2^k`.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self {
            matrix: self.matrix.t().mapv(|c| c.conj()),
            num_qubits: self.num_qubits,
        }
    }

    /// Matrix product `self · rhs`: applying the result means applying `rhs`
    /// first, then `self`.
    pub fn product(&self, rhs: &Operator) -> Result<Self> {
        if self.dim() != rhs.dim() {
            return Err(KqbitError::DimensionMismatch {
                expected: self.dim(),
                actual: rhs.dim(),
                context: "operator product requires equal dimensions",
            });
        }
        Ok(Self {
            matrix: self.matrix.dot(&rhs.matrix),
            num_qubits: self.num_qubits,
        })
    }

    /// Tensor product `self ⊗ rhs`; `self` acts on the leading targets.
    pub fn tensor(&self, rhs: &Operator) -> Self {
        Self {
            matrix: kron(&self.matrix, &rhs.matrix),
            num_qubits: self.num_qubits + rhs.num_qubits,
        }
    }

    /// Controlled version of this operator on `k + 1` qubits. The control is
    /// the first target; the operator acts on the remaining targets when the
    /// control is 1.
    pub fn controlled(&self) -> Self {
        let dim = self.dim();
        let mut matrix = Array2::<Complex64>::zeros((2 * dim, 2 * dim));
        for i in 0..dim {
            matrix[[i, i]] = Complex64::one();
        }
        matrix.slice_mut(s![dim.., dim..]).assign(&self.matrix);
        Self {
            matrix,
            num_qubits: self.num_qubits + 1,
        }
    }

    /// Largest entry-wise deviation of `U·U†` from the identity.
    pub fn unitarity_deviation(&self) -> f64 {
        let gram = self.matrix.dot(&self.dagger().matrix);
        gram.indexed_iter()
            .map(|((r, c), v)| {
                let expected = if r == c {
                    Complex64::one()
                } else {
                    Complex64::zero()
                };
                (*v - expected).norm()
            })
            .fold(0.0, f64::max)
    }

    /// Whether `U·U† = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.unitarity_deviation() <= tolerance
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operator[{} qubits, {}x{}]", self.num_qubits, self.dim(), self.dim())?;
        for row in self.matrix.rows() {
            write!(f, "  [")?;
            for (i, c) in row.iter().enumerate() {
                write!(f, "{}{:.3}", if i > 0 { ", " } else { "" }, c)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
