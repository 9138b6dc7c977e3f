//! Numeric constants shared by the simulator.

/// Default tolerance for unitarity and normalization checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Squared magnitudes below this are treated as zero probability.
pub const AMPLITUDE_EPSILON: f64 = 1e-12;

/// Hadamard and T gate entries.
pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
