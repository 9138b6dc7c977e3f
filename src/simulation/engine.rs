// src/simulation/engine.rs

//! The tensor contraction engine.
//!
//! Applies a dense `2^k x 2^k` operator to `k` chosen qubits of an `n`-qubit
//! state without building the `2^n x 2^n` operator:
//!
//! 1. view the flat amplitudes as a row-major rank-`n` tensor of 2s;
//! 2. permute the target axes (in target order) to the front, keeping the
//!    remaining axes in their original relative order;
//! 3. reshape to a `2^k x 2^(n-k)` matrix and left-multiply by the operator;
//! 4. reshape back to rank `n`, undo the permutation and flatten.
//!
//! The engine holds configuration only and never owns a state.

use crate::core::state::dimension_for;
use crate::core::{BitOrder, DEFAULT_TOLERANCE, KqbitError, Result, StateVector};
use crate::operations::{Gate, Operator};
use crate::validation::check_unitary;
use ndarray::{Array2, ArrayD, ArrayViewD, IxDyn};
use num_complex::Complex64;
use tracing::trace;

/// Stateless, re-entrant gate application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractionEngine {
    bit_order: BitOrder,
    validate_unitarity: bool,
    tolerance: f64,
}

impl Default for ContractionEngine {
    fn default() -> Self {
        Self::new(BitOrder::default())
    }
}

impl ContractionEngine {
    /// An engine using `bit_order` and no unitarity validation.
    pub fn new(bit_order: BitOrder) -> Self {
        Self {
            bit_order,
            validate_unitarity: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Check every operator for unitarity before applying it.
    pub fn with_unitarity_validation(mut self, tolerance: f64) -> Self {
        self.validate_unitarity = true;
        self.tolerance = tolerance;
        self
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    pub fn validates_unitarity(&self) -> bool {
        self.validate_unitarity
    }

    /// Returns the state obtained by applying `operator` to `targets`.
    ///
    /// The first target corresponds to the most significant bit of the
    /// operator's row index.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `state.len() != 2^num_qubits` or the operator
    ///   is not `2^k x 2^k` for `k = targets.len()`.
    /// * `InvalidTargets` for duplicate or out-of-range targets.
    /// * `NonUnitaryOperator` in validation mode.
    pub fn apply(
        &self,
        state: &[Complex64],
        operator: &Operator,
        targets: &[usize],
        num_qubits: usize,
    ) -> Result<Vec<Complex64>> {
        let dim = dimension_for(num_qubits)?;
        if state.len() != dim {
            return Err(KqbitError::DimensionMismatch {
                expected: dim,
                actual: state.len(),
                context: "state vector length vs. qubit count",
            });
        }
        if targets.len() != operator.num_qubits() {
            return Err(KqbitError::DimensionMismatch {
                expected: operator.num_qubits(),
                actual: targets.len(),
                context: "target count vs. operator qubit count",
            });
        }
        validate_targets(targets, num_qubits)?;
        if self.validate_unitarity {
            check_unitary(operator, Some(self.tolerance))?;
        }

        trace!(k = targets.len(), n = num_qubits, ?targets, "contracting operator");

        let axes: Vec<usize> = targets
            .iter()
            .map(|&qubit| self.bit_order.axis(qubit, num_qubits))
            .collect();
        let permutation = leading_permutation(&axes, num_qubits);
        let inverse = inverse_permutation(&permutation);
        let shape = vec![2usize; num_qubits];
        let rows = operator.dim();
        let cols = dim / rows;

        let tensor = ArrayViewD::from_shape(IxDyn(&shape), state)?;
        let permuted = tensor.permuted_axes(IxDyn(&permutation));
        let flattened = Array2::from_shape_vec((rows, cols), permuted.iter().copied().collect())?;

        let contracted = operator.matrix().dot(&flattened);

        let restored = ArrayD::from_shape_vec(IxDyn(&shape), contracted.iter().copied().collect())?;
        Ok(restored
            .permuted_axes(IxDyn(&inverse))
            .iter()
            .copied()
            .collect())
    }

    /// Applies `operator` to a store. The store is only replaced once the
    /// contraction has fully succeeded.
    pub fn apply_to(
        &self,
        state: &mut StateVector,
        operator: &Operator,
        targets: &[usize],
    ) -> Result<()> {
        let updated = self.apply(state.amplitudes(), operator, targets, state.num_qubits())?;
        state.replace(updated)
    }

    /// Applies a named gate to a store.
    pub fn apply_gate(&self, state: &mut StateVector, gate: Gate, targets: &[usize]) -> Result<()> {
        self.apply_to(state, &gate.operator(), targets)
    }
}

/// Applies `operator` to `targets` with the default engine (big-endian, no
/// unitarity validation).
pub fn apply_unitary(
    state: &[Complex64],
    operator: &Operator,
    targets: &[usize],
    num_qubits: usize,
) -> Result<Vec<Complex64>> {
    ContractionEngine::default().apply(state, operator, targets, num_qubits)
}

/// Targets must be distinct and inside `0..num_qubits`.
pub(crate) fn validate_targets(targets: &[usize], num_qubits: usize) -> Result<()> {
    let mut seen = vec![false; num_qubits];
    for &qubit in targets {
        if qubit >= num_qubits {
            return Err(KqbitError::InvalidTargets {
                message: format!(
                    "qubit {} is out of range for a {}-qubit register",
                    qubit, num_qubits
                ),
            });
        }
        if std::mem::replace(&mut seen[qubit], true) {
            return Err(KqbitError::InvalidTargets {
                message: format!("qubit {} appears more than once in {:?}", qubit, targets),
            });
        }
    }
    Ok(())
}

/// `axes` first (in the given order), then every other axis in ascending order.
fn leading_permutation(axes: &[usize], rank: usize) -> Vec<usize> {
    let mut permutation = axes.to_vec();
    permutation.extend((0..rank).filter(|axis| !axes.contains(axis)));
    permutation
}

fn inverse_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; permutation.len()];
    for (position, &axis) in permutation.iter().enumerate() {
        inverse[axis] = position;
    }
    inverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    const TEST_TOLERANCE: f64 = 1e-12;

    fn basis(num_qubits: usize, index: usize) -> Vec<Complex64> {
        StateVector::basis(num_qubits, index).unwrap().into_amplitudes()
    }

    fn nonzero_index(state: &[Complex64]) -> usize {
        let hits: Vec<usize> = state
            .iter()
            .enumerate()
            .filter(|(_, c)| c.norm_sqr() > TEST_TOLERANCE)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits.len(), 1, "expected a basis state, got {:?}", state);
        hits[0]
    }

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(actual: &[Complex64], expected: &[Complex64], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i,
                actual[i],
                expected[i],
                context
            );
        }
    }

    #[test]
    fn permutation_moves_targets_to_front() {
        assert_eq!(leading_permutation(&[2, 0], 4), vec![2, 0, 1, 3]);
        assert_eq!(inverse_permutation(&[2, 0, 1, 3]), vec![1, 2, 0, 3]);
        assert_eq!(leading_permutation(&[0, 1, 2], 3), vec![0, 1, 2]);
    }

    #[test]
    fn cnot_leaves_zero_state_unchanged() {
        let cnot = Gate::CX.operator();
        let out = apply_unitary(&basis(3, 0b000), &cnot, &[0, 1], 3).unwrap();
        assert_eq!(out, basis(3, 0b000));
    }

    #[test]
    fn cnot_flips_target_when_control_set() {
        let cnot = Gate::CX.operator();
        // |100> -> |110>
        let out = apply_unitary(&basis(3, 0b100), &cnot, &[0, 1], 3).unwrap();
        assert_eq!(nonzero_index(&out), 0b110);
    }

    #[test]
    fn target_order_changes_the_result() {
        let cnot = Gate::CX.operator();
        let input = basis(3, 0b010);
        // control = qubit 0 (clear): unchanged
        let forward = apply_unitary(&input, &cnot, &[0, 1], 3).unwrap();
        // control = qubit 1 (set): qubit 0 flips, |010> -> |110>
        let reversed = apply_unitary(&input, &cnot, &[1, 0], 3).unwrap();
        assert_eq!(nonzero_index(&forward), 0b010);
        assert_eq!(nonzero_index(&reversed), 0b110);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn non_adjacent_targets_are_supported() {
        // CNOT with control 2 and target 0 on |001> gives |101>
        let out = apply_unitary(&basis(3, 0b001), &Gate::CX.operator(), &[2, 0], 3).unwrap();
        assert_eq!(nonzero_index(&out), 0b101);
    }

    #[test]
    fn identity_is_an_exact_no_op() {
        let state = StateVector::uniform(3).unwrap();
        let mut input = state.into_amplitudes();
        input[5] = Complex64::new(-0.25, 0.125);
        for (k, targets) in [(1, vec![1]), (2, vec![2, 0]), (3, vec![1, 2, 0])] {
            let id = Operator::identity(k).unwrap();
            let out = apply_unitary(&input, &id, &targets, 3).unwrap();
            assert_eq!(out, input, "identity on {:?}", targets);
        }
    }

    #[test]
    fn bit_flip_twice_restores_the_state() {
        let input: Vec<Complex64> = (0..8)
            .map(|i| Complex64::new(i as f64 * 0.1, -(i as f64) * 0.05))
            .collect();
        let x = Gate::X.operator();
        let once = apply_unitary(&input, &x, &[1], 3).unwrap();
        assert_ne!(once, input);
        let twice = apply_unitary(&once, &x, &[1], 3).unwrap();
        assert_eq!(twice, input);
    }

    #[test]
    fn two_qubit_tensor_matches_separate_single_qubit_gates() {
        let input: Vec<Complex64> = (0..8).map(|i| Complex64::new(1.0, i as f64)).collect();
        let engine = ContractionEngine::default();
        let xz = Gate::X.operator().tensor(&Gate::Z.operator());
        let joint = engine.apply(&input, &xz, &[2, 0], 3).unwrap();
        let step = engine.apply(&input, &Gate::X.operator(), &[2], 3).unwrap();
        let separate = engine.apply(&step, &Gate::Z.operator(), &[0], 3).unwrap();
        assert_complex_vec_approx_equal(&joint, &separate, "X(2) Z(0)");
    }

    #[test]
    fn little_endian_places_qubit_zero_in_the_low_bit() {
        let engine = ContractionEngine::new(BitOrder::LittleEndian);
        // X on qubit 0 of |000> gives index 1 in little-endian order
        let out = engine.apply(&basis(3, 0), &Gate::X.operator(), &[0], 3).unwrap();
        assert_eq!(nonzero_index(&out), 0b001);
        // CNOT(control 0, target 1) on index 1 sets bit 1: index 3
        let out = engine.apply(&out, &Gate::CX.operator(), &[0, 1], 3).unwrap();
        assert_eq!(nonzero_index(&out), 0b011);
    }

    #[test]
    fn full_register_operator_acts_on_basis_indices() {
        let engine = ContractionEngine::default();
        let swap_01 = Operator::from_real_rows(&[
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let out = engine
            .apply(&basis(2, 1), &swap_01, &BitOrder::BigEndian.register_targets(2), 2)
            .unwrap();
        assert_eq!(nonzero_index(&out), 0);

        let little = ContractionEngine::new(BitOrder::LittleEndian);
        let out = little
            .apply(&basis(2, 1), &swap_01, &BitOrder::LittleEndian.register_targets(2), 2)
            .unwrap();
        assert_eq!(nonzero_index(&out), 0);
    }

    #[test]
    fn operator_too_large_for_targets_is_rejected() {
        let mut state = StateVector::basis(2, 2).unwrap();
        let before = state.clone();
        let err = ContractionEngine::default()
            .apply_to(&mut state, &Gate::CX.operator(), &[0])
            .unwrap_err();
        assert!(matches!(
            err,
            KqbitError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn state_length_must_match_qubit_count() {
        let err = apply_unitary(&basis(2, 0), &Gate::X.operator(), &[0], 3).unwrap_err();
        assert!(matches!(err, KqbitError::DimensionMismatch { expected: 8, actual: 4, .. }));
    }

    #[test]
    fn duplicate_and_out_of_range_targets_are_rejected() {
        let cnot = Gate::CX.operator();
        assert!(matches!(
            apply_unitary(&basis(2, 0), &cnot, &[1, 1], 2),
            Err(KqbitError::InvalidTargets { .. })
        ));
        assert!(matches!(
            apply_unitary(&basis(2, 0), &cnot, &[0, 2], 2),
            Err(KqbitError::InvalidTargets { .. })
        ));
    }

    #[test]
    fn validation_mode_rejects_non_unitary_operator() {
        let skew = Operator::from_real_rows(&[[1.0, 1.0], [0.0, 1.0]]).unwrap();
        let input = basis(1, 1);
        assert!(apply_unitary(&input, &skew, &[0], 1).is_ok());

        let strict = ContractionEngine::default().with_unitarity_validation(1e-9);
        let mut state = StateVector::from_amplitudes(1, input.clone()).unwrap();
        assert!(matches!(
            strict.apply_to(&mut state, &skew, &[0]),
            Err(KqbitError::NonUnitaryOperator { .. })
        ));
        assert_eq!(state.amplitudes(), input.as_slice());
    }

    #[test]
    fn hadamard_on_every_qubit_gives_uniform_superposition() {
        let engine = ContractionEngine::default();
        let mut state = StateVector::zero(4).unwrap();
        for q in 0..4 {
            engine.apply_gate(&mut state, Gate::H, &[q]).unwrap();
        }
        let uniform = StateVector::uniform(4).unwrap();
        assert_complex_vec_approx_equal(state.amplitudes(), uniform.amplitudes(), "H on 4 qubits");
        assert!(state.amplitudes().iter().all(|c| !c.is_zero()));
        assert!((state.norm_sqr() - f64::one()).abs() < TEST_TOLERANCE);
    }
}
