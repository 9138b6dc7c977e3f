// src/core/mod.rs

//! Core data structures and types

pub mod constants;
pub mod convention;
pub mod error;
pub mod state;

// Re-export public types for convenient access via `kqbit::core::TypeName`
pub use constants::{AMPLITUDE_EPSILON, DEFAULT_TOLERANCE};
pub use convention::{BitOrder, bitstring_to_index, index_to_bitstring};
pub use error::{KqbitError, Result};
pub use state::StateVector;
