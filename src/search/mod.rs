// src/search/mod.rs

//! Amplitude amplification over a marked set of basis states.
//!
//! A [`GroverSearch`] walks a small state machine:
//!
//! * `Init`: the register is `|0...0>`; [`GroverSearch::prepare`] applies a
//!   Hadamard to every qubit.
//! * `Iterating`: each [`GroverSearch::step`] applies the phase oracle followed
//!   by the diffusion operator (Hadamard layer, reflection about `|0...0>`,
//!   Hadamard layer).
//! * Measured: [`GroverSearch::measure`] consumes the driver and samples the
//!   final distribution.
//!
//! The round count is fixed at construction to
//! `floor(pi / (4 * asin(sqrt(M / 2^n))))`.

use crate::core::state::dimension_for;
use crate::core::{KqbitError, Result, StateVector, index_to_bitstring};
use crate::operations::{Gate, Operator, PhaseOracle, reflect_about_zero, zero_reflection};
use crate::simulation::{ContractionEngine, Counts, SimulatorConfig, probability_map, sample_many_with};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::{debug, instrument, trace};

/// Round count that maximizes the marked-state probability.
///
/// # Errors
/// `InvalidMarkedState` unless `1 <= num_marked < 2^num_qubits`.
pub fn optimal_iterations(num_marked: usize, num_qubits: usize) -> Result<usize> {
    let dim = dimension_for(num_qubits)?;
    if num_marked == 0 || num_marked >= dim {
        return Err(KqbitError::InvalidMarkedState {
            message: format!(
                "{} marked states is outside 1..{} for {} qubits",
                num_marked, dim, num_qubits
            ),
        });
    }
    let angle = (num_marked as f64 / dim as f64).sqrt().asin();
    Ok((PI / (4.0 * angle)).floor() as usize)
}

/// How the oracle and the reflection about `|0...0>` are applied each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleRepresentation {
    /// `2^n x 2^n` diagonal matrices through the contraction engine, built
    /// on the first round.
    #[default]
    Dense,
    /// Sign flips directly on the amplitudes. No matrix is ever built.
    Diagonal,
}

/// Where a [`GroverSearch`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// The register is still `|0...0>`.
    Init,
    /// The register is in superposition and `completed` rounds have run.
    Iterating { completed: usize },
}

#[derive(Debug, Clone)]
struct DenseOperators {
    oracle: Operator,
    reflection: Operator,
}

/// Amplitude-amplification driver over one register.
#[derive(Debug, Clone)]
pub struct GroverSearch {
    oracle: PhaseOracle,
    representation: OracleRepresentation,
    dense: Option<DenseOperators>,
    hadamard: Operator,
    engine: ContractionEngine,
    config: SimulatorConfig,
    iterations: usize,
    state: StateVector,
    phase: SearchPhase,
}

impl GroverSearch {
    /// Searches for `marked` bit strings with default settings. The qubit
    /// count is the length of the strings.
    pub fn new<S: AsRef<str>>(marked: &[S]) -> Result<Self> {
        Self::with_config(marked, SimulatorConfig::default())
    }

    /// Like [`GroverSearch::new`] with explicit settings.
    pub fn with_config<S: AsRef<str>>(marked: &[S], config: SimulatorConfig) -> Result<Self> {
        let num_qubits = marked
            .first()
            .map(|bits| bits.as_ref().len())
            .ok_or_else(|| KqbitError::InvalidMarkedState {
                message: "at least one state must be marked".to_string(),
            })?;
        Self::with_qubits(num_qubits, marked, config)
    }

    /// Searches an `num_qubits`-qubit register. Every marked string must be
    /// exactly `num_qubits` characters long.
    pub fn with_qubits<S: AsRef<str>>(
        num_qubits: usize,
        marked: &[S],
        config: SimulatorConfig,
    ) -> Result<Self> {
        let oracle = PhaseOracle::from_bitstrings(num_qubits, marked)?;
        Self::from_oracle(oracle, config)
    }

    /// Builds the driver around an existing oracle.
    ///
    /// No full-register matrix is built here. In `Dense` mode the oracle and
    /// reflection matrices are built on the first round and reused after.
    pub fn from_oracle(oracle: PhaseOracle, config: SimulatorConfig) -> Result<Self> {
        let num_qubits = oracle.num_qubits();
        let iterations = optimal_iterations(oracle.num_marked(), num_qubits)?;
        let state = StateVector::zero(num_qubits)?;
        debug!(
            num_qubits,
            marked = oracle.num_marked(),
            iterations,
            "configured amplitude amplification"
        );
        Ok(Self {
            oracle,
            representation: OracleRepresentation::default(),
            dense: None,
            hadamard: Gate::H.operator(),
            engine: config.engine(),
            config,
            iterations,
            state,
            phase: SearchPhase::Init,
        })
    }

    /// Switches how the oracle and reflection are applied. Both forms give
    /// the same state. Switching to `Diagonal` drops any matrices already
    /// built.
    pub fn with_oracle_representation(mut self, representation: OracleRepresentation) -> Self {
        self.representation = representation;
        if representation == OracleRepresentation::Diagonal {
            self.dense = None;
        }
        self
    }

    /// How the oracle and reflection are currently applied.
    pub fn oracle_representation(&self) -> OracleRepresentation {
        self.representation
    }

    /// Whether the full-register matrices currently exist.
    pub fn has_dense_operators(&self) -> bool {
        self.dense.is_some()
    }

    pub fn num_qubits(&self) -> usize {
        self.oracle.num_qubits()
    }

    /// Total rounds this search performs.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn oracle(&self) -> &PhaseOracle {
        &self.oracle
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// The register as it stands after the rounds run so far.
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Puts the register in uniform superposition. Does nothing once the
    /// search has left `Init`.
    pub fn prepare(&mut self) -> Result<()> {
        if self.phase != SearchPhase::Init {
            return Ok(());
        }
        self.hadamard_layer()?;
        self.phase = SearchPhase::Iterating { completed: 0 };
        Ok(())
    }

    /// Runs one oracle + diffusion round, preparing first if needed.
    ///
    /// Returns `Ok(false)` without touching the state once every round has run.
    pub fn step(&mut self) -> Result<bool> {
        self.prepare()?;
        let completed = match self.phase {
            SearchPhase::Iterating { completed } => completed,
            SearchPhase::Init => 0,
        };
        if completed >= self.iterations {
            return Ok(false);
        }

        self.apply_oracle()?;
        self.diffuse()?;

        self.phase = SearchPhase::Iterating {
            completed: completed + 1,
        };
        trace!(
            round = completed + 1,
            success = self.success_probability(),
            "amplification round"
        );
        Ok(true)
    }

    /// Runs every remaining round.
    pub fn amplify(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Probability of observing any marked state right now.
    pub fn success_probability(&self) -> f64 {
        let probabilities = self.state.probabilities();
        self.oracle
            .marked()
            .iter()
            .map(|&index| probabilities[index])
            .sum()
    }

    /// Finishes amplification and draws `shots` samples from the final state.
    #[instrument(skip(self), fields(num_qubits = self.num_qubits(), iterations = self.iterations))]
    pub fn measure(mut self, shots: usize) -> Result<SearchOutcome> {
        self.amplify()?;
        let mut rng = self.config.rng();
        let counts = sample_many_with(&self.state, shots, &mut rng)?;
        let success_probability = self.success_probability();
        let n = self.num_qubits();
        let marked = self
            .oracle
            .marked()
            .iter()
            .map(|&index| index_to_bitstring(index, n))
            .collect();
        debug!(success_probability, "search measured");
        Ok(SearchOutcome {
            counts,
            iterations: self.iterations,
            success_probability,
            marked,
            final_state: self.state,
        })
    }

    fn hadamard_layer(&mut self) -> Result<()> {
        for qubit in 0..self.num_qubits() {
            self.engine
                .apply_to(&mut self.state, &self.hadamard, &[qubit])?;
        }
        Ok(())
    }

    fn build_dense_operators(&mut self) -> Result<()> {
        if self.representation == OracleRepresentation::Dense && self.dense.is_none() {
            let num_qubits = self.num_qubits();
            self.dense = Some(DenseOperators {
                oracle: self.oracle.to_operator(),
                reflection: zero_reflection(num_qubits)?,
            });
            debug!(num_qubits, "built dense oracle and reflection");
        }
        Ok(())
    }

    fn apply_oracle(&mut self) -> Result<()> {
        self.build_dense_operators()?;
        match &self.dense {
            Some(dense) => {
                let register = self.config.bit_order.register_targets(self.num_qubits());
                self.engine.apply_to(&mut self.state, &dense.oracle, &register)
            }
            None => self.oracle.apply_diagonal(&mut self.state),
        }
    }

    // H layer, reflection about |0...0>, H layer
    fn diffuse(&mut self) -> Result<()> {
        self.build_dense_operators()?;
        self.hadamard_layer()?;
        match &self.dense {
            Some(dense) => {
                let register = self.config.bit_order.register_targets(self.num_qubits());
                self.engine
                    .apply_to(&mut self.state, &dense.reflection, &register)?;
            }
            None => reflect_about_zero(&mut self.state)?,
        }
        self.hadamard_layer()
    }
}

/// What a finished search observed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    counts: Counts,
    iterations: usize,
    success_probability: f64,
    marked: Vec<String>,
    final_state: StateVector,
}

impl SearchOutcome {
    /// Histogram of the sampled shots.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    /// Rounds that were applied before sampling.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Exact marked-state probability of the final state.
    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }

    /// Fraction of shots that landed on a marked state.
    pub fn marked_frequency(&self) -> f64 {
        self.marked
            .iter()
            .map(|bits| self.counts.frequency(bits))
            .sum()
    }

    /// Marked bit strings in ascending order.
    pub fn marked(&self) -> &[String] {
        &self.marked
    }

    /// The most frequently sampled outcome.
    pub fn best(&self) -> Option<&str> {
        self.counts.most_frequent().map(|(bits, _)| bits)
    }

    /// Exact outcome probabilities of the final state, keyed by bit string.
    /// Negligible entries are left out.
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        probability_map(&self.final_state)
    }

    /// The amplified state the shots were drawn from.
    pub fn final_state(&self) -> &StateVector {
        &self.final_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BitOrder;
    use crate::operations::inversion_about_mean;

    #[test]
    fn iteration_counts_follow_the_optimal_formula() {
        assert_eq!(optimal_iterations(2, 3).unwrap(), 1);
        assert_eq!(optimal_iterations(1, 2).unwrap(), 1);
        assert_eq!(optimal_iterations(1, 3).unwrap(), 2);
        assert_eq!(optimal_iterations(1, 4).unwrap(), 3);
        assert_eq!(optimal_iterations(1, 5).unwrap(), 4);
    }

    #[test]
    fn iteration_count_rejects_degenerate_marked_sets() {
        assert!(matches!(optimal_iterations(0, 3), Err(KqbitError::InvalidMarkedState { .. })));
        assert!(matches!(optimal_iterations(8, 3), Err(KqbitError::InvalidMarkedState { .. })));
        assert!(matches!(optimal_iterations(1, 0), Err(KqbitError::InvalidQubitCount(0))));
    }

    #[test]
    fn phases_advance_until_rounds_run_out() {
        let mut search = GroverSearch::new(&["101"]).unwrap();
        assert_eq!(search.phase(), SearchPhase::Init);
        search.prepare().unwrap();
        assert_eq!(search.phase(), SearchPhase::Iterating { completed: 0 });
        assert!((search.success_probability() - 0.125).abs() < 1e-12);
        assert!(search.step().unwrap());
        assert!(search.step().unwrap());
        assert!(!search.step().unwrap());
        assert_eq!(search.phase(), SearchPhase::Iterating { completed: 2 });
    }

    #[test]
    fn two_qubit_single_mark_is_found_exactly() {
        let mut search = GroverSearch::new(&["10"]).unwrap();
        search.amplify().unwrap();
        assert!((search.success_probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_oracle_matches_dense_oracle() {
        for order in [BitOrder::BigEndian, BitOrder::LittleEndian] {
            let config = SimulatorConfig::new().with_bit_order(order);
            let mut dense = GroverSearch::with_qubits(4, &["0110", "1011"], config).unwrap();
            let mut diagonal = GroverSearch::with_qubits(4, &["0110", "1011"], config)
                .unwrap()
                .with_oracle_representation(OracleRepresentation::Diagonal);
            assert_eq!(diagonal.oracle_representation(), OracleRepresentation::Diagonal);
            dense.amplify().unwrap();
            diagonal.amplify().unwrap();
            assert!(dense.has_dense_operators());
            assert!(!diagonal.has_dense_operators());
            for (a, b) in dense.state().amplitudes().iter().zip(diagonal.state().amplitudes()) {
                assert!((a - b).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn diffusion_equals_inversion_about_the_mean() {
        // H^n (2|0><0| - I) H^n == 2|s><s| - I, checked on one amplified state
        let mut search = GroverSearch::new(&["011"]).unwrap();
        search.prepare().unwrap();
        search.apply_oracle().unwrap();
        let mut expected = search.state().clone();
        let engine = ContractionEngine::default();
        engine
            .apply_to(&mut expected, &inversion_about_mean(3).unwrap(), &[0, 1, 2])
            .unwrap();

        let mut diagonal = search
            .clone()
            .with_oracle_representation(OracleRepresentation::Diagonal);
        search.diffuse().unwrap();
        diagonal.diffuse().unwrap();

        for ((a, b), c) in search
            .state()
            .amplitudes()
            .iter()
            .zip(expected.amplitudes())
            .zip(diagonal.state().amplitudes())
        {
            assert!((a - b).norm() < 1e-12);
            assert!((c - b).norm() < 1e-12);
        }
    }

    #[test]
    fn dense_operators_are_built_on_first_round_only_in_dense_mode() {
        let mut dense = GroverSearch::new(&["0101"]).unwrap();
        assert!(!dense.has_dense_operators());
        dense.prepare().unwrap();
        assert!(!dense.has_dense_operators());
        dense.step().unwrap();
        assert!(dense.has_dense_operators());

        let mut diagonal = GroverSearch::new(&["0101"])
            .unwrap()
            .with_oracle_representation(OracleRepresentation::Diagonal);
        diagonal.amplify().unwrap();
        assert!(!diagonal.has_dense_operators());

        let switched = dense.with_oracle_representation(OracleRepresentation::Diagonal);
        assert!(!switched.has_dense_operators());
    }

    #[test]
    fn marked_strings_must_match_the_register() {
        let config = SimulatorConfig::default();
        assert!(matches!(
            GroverSearch::with_qubits(3, &["10"], config),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
        assert!(matches!(
            GroverSearch::new(&["101", "1"]),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            GroverSearch::new(&none),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
        assert!(matches!(
            GroverSearch::new(&["0", "1"]),
            Err(KqbitError::InvalidMarkedState { .. })
        ));
    }

    #[test]
    fn outcome_reports_marked_frequency() {
        let config = SimulatorConfig::new().with_seed(99);
        let outcome = GroverSearch::with_config(&["11"], config)
            .unwrap()
            .measure(100)
            .unwrap();
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.counts().get("11"), 100);
        assert!((outcome.marked_frequency() - 1.0).abs() < 1e-12);
        assert_eq!(outcome.best(), Some("11"));
        assert_eq!(outcome.marked(), ["11".to_string()]);
    }
}
