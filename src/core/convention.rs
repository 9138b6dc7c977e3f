// src/core/convention.rs

//! The bit-ordering convention tying qubit indices to basis indices.
//!
//! A basis index `i` in `0..2^n` is always rendered as the zero-padded binary
//! string of `i` (most significant bit first). The [`BitOrder`] decides which
//! qubit owns which bit of that index, and therefore which character of the
//! string. State construction, the contraction engine, oracle construction and
//! outcome decoding all go through the same `BitOrder`.

use super::error::{KqbitError, Result};
use serde::{Deserialize, Serialize};

/// Which bit of a basis index belongs to qubit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Qubit 0 is the most significant bit of the basis index and the leftmost
    /// character of a bit string: `|q0 q1 ... q(n-1)>`.
    #[default]
    BigEndian,
    /// Qubit 0 is the least significant bit of the basis index and the
    /// rightmost character of a bit string: `|q(n-1) ... q1 q0>`.
    LittleEndian,
}

impl BitOrder {
    /// Tensor axis of `qubit` when the flat state is viewed as a row-major
    /// rank-`num_qubits` tensor of 2s (axis 0 is the most significant bit).
    pub fn axis(self, qubit: usize, num_qubits: usize) -> usize {
        match self {
            BitOrder::BigEndian => qubit,
            BitOrder::LittleEndian => num_qubits - 1 - qubit,
        }
    }

    /// Position of `qubit`'s bit in a basis index, counted from the least
    /// significant bit.
    pub fn bit_position(self, qubit: usize, num_qubits: usize) -> usize {
        match self {
            BitOrder::BigEndian => num_qubits - 1 - qubit,
            BitOrder::LittleEndian => qubit,
        }
    }

    /// Value (0 or 1) of `qubit` in basis state `index`.
    pub fn qubit_value(self, index: usize, qubit: usize, num_qubits: usize) -> u8 {
        ((index >> self.bit_position(qubit, num_qubits)) & 1) as u8
    }

    /// All qubits ordered from the most to the least significant bit.
    ///
    /// Applying a `2^n x 2^n` operator with these targets makes its row and
    /// column indices coincide with basis indices.
    pub fn register_targets(self, num_qubits: usize) -> Vec<usize> {
        match self {
            BitOrder::BigEndian => (0..num_qubits).collect(),
            BitOrder::LittleEndian => (0..num_qubits).rev().collect(),
        }
    }
}

/// Renders basis index `index` of an `num_qubits`-qubit register as a bit string.
pub fn index_to_bitstring(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
}

/// Parses a bit string into the basis index it names.
///
/// The string must be exactly `num_qubits` characters of `'0'`/`'1'`.
pub fn bitstring_to_index(bits: &str, num_qubits: usize) -> Result<usize> {
    if bits.len() != num_qubits {
        return Err(KqbitError::InvalidMarkedState {
            message: format!(
                "bit string '{}' has length {}, expected {}",
                bits,
                bits.len(),
                num_qubits
            ),
        });
    }
    bits.chars().try_fold(0usize, |acc, c| match c {
        '0' => Ok(acc << 1),
        '1' => Ok((acc << 1) | 1),
        other => Err(KqbitError::InvalidMarkedState {
            message: format!("bit string '{}' contains non-binary character '{}'", bits, other),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_maps_qubit_zero_to_leading_bit() {
        let order = BitOrder::BigEndian;
        assert_eq!(order.axis(0, 3), 0);
        assert_eq!(order.bit_position(0, 3), 2);
        // |100> is index 4
        assert_eq!(order.qubit_value(4, 0, 3), 1);
        assert_eq!(order.qubit_value(4, 2, 3), 0);
        assert_eq!(order.register_targets(3), vec![0, 1, 2]);
    }

    #[test]
    fn little_endian_maps_qubit_zero_to_trailing_bit() {
        let order = BitOrder::LittleEndian;
        assert_eq!(order.axis(0, 3), 2);
        assert_eq!(order.bit_position(0, 3), 0);
        assert_eq!(order.qubit_value(1, 0, 3), 1);
        assert_eq!(order.register_targets(3), vec![2, 1, 0]);
    }

    #[test]
    fn bitstrings_are_binary_renderings_of_indices() {
        assert_eq!(index_to_bitstring(6, 3), "110");
        assert_eq!(index_to_bitstring(1, 4), "0001");
        assert_eq!(bitstring_to_index("110", 3).unwrap(), 6);
        assert_eq!(bitstring_to_index("0001", 4).unwrap(), 1);
    }

    #[test]
    fn malformed_bitstrings_are_rejected() {
        assert!(matches!(
            bitstring_to_index("10", 3),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
        assert!(matches!(
            bitstring_to_index("1x0", 3),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
    }
}
