// src/simulation/config.rs

use super::engine::ContractionEngine;
use crate::core::{BitOrder, DEFAULT_TOLERANCE};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Settings shared by every part of a simulation run.
///
/// One `SimulatorConfig` fixes the bit-ordering convention for state
/// construction, gate placement, oracle construction and outcome decoding, so
/// those can never disagree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Which bit of a basis index belongs to qubit 0.
    pub bit_order: BitOrder,
    /// Check `U·U† = I` before every operator application.
    pub validate_unitarity: bool,
    /// Tolerance for unitarity and normalization checks.
    pub tolerance: f64,
    /// Seed for measurement sampling. `None` seeds from OS entropy once per run.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bit_order: BitOrder::BigEndian,
            validate_unitarity: false,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Big-endian, no unitarity validation, default tolerance, unseeded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the convention mapping qubit indices to basis-index bits.
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Turns the `U·U† = I` check before each application on or off. A
    /// failing operator is rejected with `NonUnitaryOperator` and the state
    /// is left untouched.
    pub fn with_unitarity_validation(mut self, enabled: bool) -> Self {
        self.validate_unitarity = enabled;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fixes the sampling seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Contraction engine configured with this bit order and validation mode.
    pub fn engine(&self) -> ContractionEngine {
        let engine = ContractionEngine::new(self.bit_order);
        if self.validate_unitarity {
            engine.with_unitarity_validation(self.tolerance)
        } else {
            engine
        }
    }

    /// A fresh random source for one run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
