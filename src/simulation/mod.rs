// src/simulation/mod.rs

//! Runs a [`Circuit`] against a dense state vector.
//!
//! The `Simulator` owns a [`SimulatorConfig`] and nothing else. Every run
//! allocates its own state and random source, so one simulator can serve any
//! number of independent runs.

mod config;
pub mod engine;
pub mod measurement;
mod results;

pub use config::SimulatorConfig;
pub use engine::{ContractionEngine, apply_unitary};
pub use measurement::{
    measure_all, measure_qubit, probability_map, sample, sample_index, sample_many,
    sample_many_with,
};
pub use results::{Counts, SimulationResult};

use crate::circuits::{Circuit, Instruction};
use crate::core::{KqbitError, Result, StateVector};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// The main simulator orchestrating the execution of circuits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Simulator that runs every circuit under `config`.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// The contraction engine this simulator applies operators with.
    pub fn engine(&self) -> ContractionEngine {
        self.config.engine()
    }

    /// Runs `circuit` from `|0...0>`.
    ///
    /// # Returns
    /// * `Ok(SimulationResult)` with every mid-circuit measurement outcome, the
    ///   classical register and the final state.
    /// * `Err(KqbitError)` on the first instruction that fails. Nothing after
    ///   it is applied.
    pub fn run(&self, circuit: &Circuit) -> Result<SimulationResult> {
        self.run_from(circuit, StateVector::zero(circuit.num_qubits())?)
    }

    /// Runs `circuit` from a caller-supplied initial state.
    pub fn run_from(&self, circuit: &Circuit, initial: StateVector) -> Result<SimulationResult> {
        let mut rng = self.config.rng();
        self.execute(circuit, initial, &mut rng)
    }

    /// Runs `circuit` `shots` times and histograms the final full-register
    /// outcome of each run.
    ///
    /// A circuit without measurements is evolved once and its final state
    /// sampled `shots` times. Otherwise every shot re-runs the circuit, since
    /// mid-circuit collapse differs from shot to shot.
    #[instrument(skip(self, circuit), fields(num_qubits = circuit.num_qubits()))]
    pub fn sample_counts(&self, circuit: &Circuit, shots: usize) -> Result<Counts> {
        let mut rng = self.config.rng();
        if !circuit.has_measurements() {
            let initial = StateVector::zero(circuit.num_qubits())?;
            let result = self.execute(circuit, initial, &mut rng)?;
            return sample_many_with(result.final_state(), shots, &mut rng);
        }
        let mut counts = Counts::new();
        for _ in 0..shots {
            let initial = StateVector::zero(circuit.num_qubits())?;
            let mut state = self.execute(circuit, initial, &mut rng)?.into_final_state();
            counts.record(measure_all(&mut state, &mut rng)?);
        }
        Ok(counts)
    }

    #[instrument(skip_all, fields(num_qubits = circuit.num_qubits(), instructions = circuit.len()))]
    fn execute<R: Rng + ?Sized>(
        &self,
        circuit: &Circuit,
        initial: StateVector,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        if initial.num_qubits() != circuit.num_qubits() {
            return Err(KqbitError::DimensionMismatch {
                expected: circuit.num_qubits(),
                actual: initial.num_qubits(),
                context: "initial state qubit count vs. circuit qubit count",
            });
        }

        let engine = self.config.engine();
        let mut state = initial;
        let mut measurements = BTreeMap::new();
        let mut classical_bits = vec![0u8; circuit.num_clbits()];

        for instruction in circuit.instructions() {
            match instruction {
                Instruction::Gate { gate, targets } => {
                    engine.apply_gate(&mut state, *gate, targets)?;
                }
                Instruction::Unitary { operator, targets } => {
                    engine.apply_to(&mut state, operator, targets)?;
                }
                Instruction::Measure { qubit, clbit } => {
                    let bit = measure_qubit(&mut state, *qubit, self.config.bit_order, rng)?;
                    measurements.insert(*qubit, bit);
                    classical_bits[*clbit] = bit;
                }
            }
        }

        debug!(measured = measurements.len(), "circuit complete");
        Ok(SimulationResult::new(measurements, classical_bits, state))
    }
}
