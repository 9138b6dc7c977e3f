// src/simulation/measurement.rs

//! Born-rule sampling and projective measurement.
//!
//! Sampling reads the store and never modifies it. The `measure_*` functions
//! collapse the store onto the observed outcome and renormalize.

use super::results::Counts;
use crate::core::{
    AMPLITUDE_EPSILON, BitOrder, DEFAULT_TOLERANCE, KqbitError, Result, StateVector,
    index_to_bitstring,
};
use num_complex::Complex64;
use num_traits::Zero;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

fn outcome_distribution(state: &StateVector) -> Result<WeightedIndex<f64>> {
    let probabilities = state.probabilities();
    let norm_sqr = state.norm_sqr();
    if norm_sqr > AMPLITUDE_EPSILON && (norm_sqr - 1.0).abs() > DEFAULT_TOLERANCE {
        warn!(norm_sqr, "sampling from a state that is not normalized");
    }
    WeightedIndex::new(&probabilities).map_err(|_| KqbitError::NotNormalized {
        norm_sqr,
        tolerance: AMPLITUDE_EPSILON,
    })
}

/// Draws one basis index with probability `|amplitude|^2`.
///
/// Weights are used as given, so a slightly denormalized state still samples
/// proportionally. A state with no weight at all is `NotNormalized`.
pub fn sample_index<R: Rng + ?Sized>(state: &StateVector, rng: &mut R) -> Result<usize> {
    Ok(outcome_distribution(state)?.sample(rng))
}

/// Draws one outcome from a seeded generator and renders it as a bit string.
pub fn sample(state: &StateVector, seed: u64) -> Result<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let index = sample_index(state, &mut rng)?;
    Ok(index_to_bitstring(index, state.num_qubits()))
}

/// Draws `shots` independent outcomes from a seeded generator.
pub fn sample_many(state: &StateVector, shots: usize, seed: u64) -> Result<Counts> {
    sample_many_with(state, shots, &mut StdRng::seed_from_u64(seed))
}

/// Draws `shots` independent outcomes using the caller's generator.
pub fn sample_many_with<R: Rng + ?Sized>(
    state: &StateVector,
    shots: usize,
    rng: &mut R,
) -> Result<Counts> {
    let distribution = outcome_distribution(state)?;
    let n = state.num_qubits();
    let mut counts = Counts::new();
    for _ in 0..shots {
        counts.record(index_to_bitstring(distribution.sample(rng), n));
    }
    debug!(shots, distinct = counts.len(), "sampled outcomes");
    Ok(counts)
}

/// Measures a single qubit, collapsing the state onto the observed value.
///
/// Returns the observed bit. Amplitudes inconsistent with it are zeroed and
/// the rest are rescaled so the state has unit norm again.
pub fn measure_qubit<R: Rng + ?Sized>(
    state: &mut StateVector,
    qubit: usize,
    bit_order: BitOrder,
    rng: &mut R,
) -> Result<u8> {
    let n = state.num_qubits();
    if qubit >= n {
        return Err(KqbitError::InvalidTargets {
            message: format!("cannot measure qubit {} of a {}-qubit register", qubit, n),
        });
    }
    let total = state.norm_sqr();
    if total <= AMPLITUDE_EPSILON {
        return Err(KqbitError::NotNormalized {
            norm_sqr: total,
            tolerance: AMPLITUDE_EPSILON,
        });
    }
    let p_zero: f64 = state
        .amplitudes()
        .iter()
        .enumerate()
        .filter(|(index, _)| bit_order.qubit_value(*index, qubit, n) == 0)
        .map(|(_, amplitude)| amplitude.norm_sqr())
        .sum();

    let outcome = if rng.random::<f64>() * total < p_zero { 0u8 } else { 1u8 };
    let p_outcome = if outcome == 0 { p_zero } else { total - p_zero };
    let scale = p_outcome.sqrt().recip();

    let collapsed: Vec<Complex64> = state
        .amplitudes()
        .iter()
        .enumerate()
        .map(|(index, amplitude)| {
            if bit_order.qubit_value(index, qubit, n) == outcome {
                *amplitude * scale
            } else {
                Complex64::zero()
            }
        })
        .collect();
    state.replace(collapsed)?;
    trace!(qubit, outcome, probability = p_outcome / total, "measured qubit");
    Ok(outcome)
}

/// Measures every qubit at once, collapsing onto one basis state.
pub fn measure_all<R: Rng + ?Sized>(state: &mut StateVector, rng: &mut R) -> Result<String> {
    let index = sample_index(state, rng)?;
    let n = state.num_qubits();
    *state = StateVector::basis(n, index)?;
    Ok(index_to_bitstring(index, n))
}

/// Outcome probabilities keyed by bit string, omitting negligible entries.
pub fn probability_map(state: &StateVector) -> BTreeMap<String, f64> {
    let n = state.num_qubits();
    state
        .probabilities()
        .into_iter()
        .enumerate()
        .filter(|(_, p)| *p > AMPLITUDE_EPSILON)
        .map(|(index, p)| (index_to_bitstring(index, n), p))
        .collect()
}
