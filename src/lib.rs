// src/lib.rs

//! `kqbit` - dense state-vector quantum simulation
//!
//! The full state of `n` qubits is held as `2^n` complex amplitudes. Gates are
//! applied to any subset of qubits by tensor contraction, so a `k`-qubit
//! operator never has to be expanded to the full `2^n x 2^n` matrix. On top
//! of that sit Born-rule sampling, a small circuit runner and an amplitude
//! amplification driver.

pub mod circuits;
pub mod core;
pub mod operations;
pub mod search;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use circuits::{Circuit, CircuitBuilder, Instruction};
pub use core::{BitOrder, KqbitError, Result, StateVector};
pub use operations::{Gate, Operator, PhaseOracle};
pub use search::{GroverSearch, OracleRepresentation, SearchOutcome, optimal_iterations};
pub use simulation::{
    ContractionEngine, Counts, SimulationResult, Simulator, SimulatorConfig, apply_unitary,
    sample, sample_many,
};
pub use validation::{check_normalization, check_unitary, validate_state};

// Example 1: Bell pair
// Entangles two qubits and checks that only correlated outcomes are sampled.
/// ```
/// use kqbit::{CircuitBuilder, Gate, Simulator, SimulatorConfig};
///
/// let circuit = CircuitBuilder::new(2)
///     .gate(Gate::H, &[0])
///     .gate(Gate::CX, &[0, 1])
///     .build();
///
/// let simulator = Simulator::with_config(SimulatorConfig::new().with_seed(7));
/// let counts = simulator.sample_counts(&circuit, 500).unwrap();
/// println!("Circuit:\n{}", circuit);
/// println!("{}", counts);
///
/// assert_eq!(counts.total(), 500);
/// assert_eq!(counts.get("01") + counts.get("10"), 0);
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Direct contraction
// Applies CNOT to qubits [0, 1] of |100> without any circuit layer.
/// ```
/// use kqbit::{Gate, StateVector, apply_unitary, core::index_to_bitstring};
///
/// let state = StateVector::basis(3, 0b100).unwrap();
/// let out = apply_unitary(state.amplitudes(), &Gate::CX.operator(), &[0, 1], 3).unwrap();
/// let hit = out.iter().position(|a| a.norm_sqr() > 0.5).unwrap();
/// assert_eq!(index_to_bitstring(hit, 3), "110");
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Amplitude amplification
/// ```
/// use kqbit::{GroverSearch, SimulatorConfig};
///
/// let config = SimulatorConfig::new().with_seed(2024);
/// let search = GroverSearch::with_config(&["110", "111"], config).unwrap();
/// assert_eq!(search.iterations(), 1);
///
/// let outcome = search.measure(1000).unwrap();
/// println!("{}", outcome.counts());
/// assert!(outcome.marked_frequency() > 0.9);
/// ```
#[doc(hidden)]
const _: () = ();
