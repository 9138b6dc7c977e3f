// src/simulation/results.rs
use crate::core::{StateVector, index_to_bitstring};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Histogram of sampled bit strings.
///
/// Serializes as a plain `{"bitstring": count}` map, keys in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, usize>,
}

impl Counts {
    /// An empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation of `bitstring`.
    pub fn record(&mut self, bitstring: impl Into<String>) {
        *self.counts.entry(bitstring.into()).or_insert(0) += 1;
    }

    /// Number of times `bitstring` was observed.
    pub fn get(&self, bitstring: &str) -> usize {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots recorded.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Fraction of shots that produced `bitstring` (0.0 when empty).
    pub fn frequency(&self, bitstring: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(bitstring) as f64 / total as f64
    }

    /// The most frequent outcome. Ties go to the lexicographically smallest string.
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (bits, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((bits.as_str(), count)),
            })
    }

    /// Outcomes and their counts in ascending bit-string order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(bits, &count)| (bits.as_str(), count))
    }

    /// Number of distinct outcomes observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The underlying ordered map.
    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        writeln!(f, "Counts ({} shots):", total)?;
        for (bits, count) in self.iter() {
            writeln!(f, "  {}: {} ({:.4})", bits, count, count as f64 / total as f64)?;
        }
        Ok(())
    }
}

/// Holds the results of a circuit simulation: the outcome of every qubit
/// measured along the way, the classical register those outcomes were written
/// to, and the final (possibly collapsed) state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    measurements: BTreeMap<usize, u8>,
    classical_bits: Vec<u8>,
    final_state: StateVector,
}

impl SimulationResult {
    pub(crate) fn new(
        measurements: BTreeMap<usize, u8>,
        classical_bits: Vec<u8>,
        final_state: StateVector,
    ) -> Self {
        Self {
            measurements,
            classical_bits,
            final_state,
        }
    }

    /// Outcome of the last measurement of `qubit`, if it was measured.
    pub fn get_measurement(&self, qubit: usize) -> Option<u8> {
        self.measurements.get(&qubit).copied()
    }

    /// Returns a reference to the map containing all recorded outcomes.
    pub fn all_measurements(&self) -> &BTreeMap<usize, u8> {
        &self.measurements
    }

    /// Value of classical bit `clbit`, or `None` past the end of the
    /// register. Bits no measurement wrote read as 0.
    pub fn get_classical_bit(&self, clbit: usize) -> Option<u8> {
        self.classical_bits.get(clbit).copied()
    }

    /// The classical register, bit 0 first.
    pub fn classical_bits(&self) -> &[u8] {
        &self.classical_bits
    }

    /// The classical register as a string of `0`/`1`, bit 0 leftmost.
    pub fn classical_register(&self) -> String {
        self.classical_bits
            .iter()
            .map(|bit| if *bit == 0 { '0' } else { '1' })
            .collect()
    }

    /// The state after the last instruction.
    pub fn final_state(&self) -> &StateVector {
        &self.final_state
    }

    /// Consumes the result, keeping only the final state.
    pub fn into_final_state(self) -> StateVector {
        self.final_state
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.measurements.is_empty() {
            writeln!(f, "  No qubits were measured.")?;
        } else {
            writeln!(f, "  Measurements:")?;
            for (qubit, bit) in &self.measurements {
                writeln!(f, "    q{}: {}", qubit, bit)?;
            }
            writeln!(f, "  Classical register: {}", self.classical_register())?;
        }
        writeln!(f, "  Final state:")?;
        let n = self.final_state.num_qubits();
        for (index, p) in self.final_state.probabilities().iter().enumerate() {
            if *p > crate::core::AMPLITUDE_EPSILON {
                writeln!(f, "    |{}>: {:.6}", index_to_bitstring(index, n), p)?;
            }
        }
        Ok(())
    }
}
