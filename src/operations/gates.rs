// src/operations/gates.rs

use super::Operator;
use crate::core::KqbitError;
use crate::core::constants::FRAC_1_SQRT_2;
use ndarray::{Array2, array};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;
use std::str::FromStr;

/// The elementary gate set understood by the simulator.
///
/// Parametric gates carry their angle in radians. For multi-qubit gates the
/// control qubits come first in the target list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    /// Square root of X.
    SX,
    /// `diag(1, e^(iθ))`.
    Phase(f64),
    Rx(f64),
    Ry(f64),
    Rz(f64),
    CX,
    CY,
    CZ,
    Swap,
    /// Toffoli: two controls, one target.
    CCX,
    /// Fredkin: one control, two swapped targets.
    CSwap,
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn diagonal_phase(theta: f64) -> Array2<Complex64> {
    array![
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), Complex64::from_polar(1.0, theta)]
    ]
}

impl Gate {
    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::CX | Gate::CY | Gate::CZ | Gate::Swap => 2,
            Gate::CCX | Gate::CSwap => 3,
            _ => 1,
        }
    }

    /// Lower-case identifier, as accepted by [`Gate::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "i",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::SX => "sx",
            Gate::Phase(_) => "p",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::CX => "cx",
            Gate::CY => "cy",
            Gate::CZ => "cz",
            Gate::Swap => "swap",
            Gate::CCX => "ccx",
            Gate::CSwap => "cswap",
        }
    }

    /// The dense unitary for this gate.
    pub fn operator(&self) -> Operator {
        let zero = Complex64::zero();
        let one = Complex64::one();
        let i = Complex64::i();
        let matrix = match *self {
            Gate::I => Array2::eye(2),
            Gate::X => array![[zero, one], [one, zero]],
            Gate::Y => array![[zero, -i], [i, zero]],
            Gate::Z => array![[one, zero], [zero, -one]],
            Gate::H => array![
                [c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)],
                [c(FRAC_1_SQRT_2, 0.0), c(-FRAC_1_SQRT_2, 0.0)]
            ],
            Gate::S => array![[one, zero], [zero, i]],
            Gate::Sdg => array![[one, zero], [zero, -i]],
            Gate::T => array![[one, zero], [zero, c(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]],
            Gate::Tdg => array![[one, zero], [zero, c(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)]],
            Gate::SX => array![[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]],
            Gate::Phase(theta) => diagonal_phase(theta),
            Gate::Rx(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(0.0, -sin)], [c(0.0, -sin), c(cos, 0.0)]]
            }
            Gate::Ry(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(-sin, 0.0)], [c(sin, 0.0), c(cos, 0.0)]]
            }
            Gate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)]
            ],
            Gate::CX => return Gate::X.operator().controlled(),
            Gate::CY => return Gate::Y.operator().controlled(),
            Gate::CZ => return Gate::Z.operator().controlled(),
            Gate::Swap => array![
                [one, zero, zero, zero],
                [zero, zero, one, zero],
                [zero, one, zero, zero],
                [zero, zero, zero, one]
            ],
            Gate::CCX => return Gate::CX.operator().controlled(),
            Gate::CSwap => return Gate::Swap.operator().controlled(),
        };
        Operator::from_fixed(matrix)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Phase(theta) | Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) => {
                write!(f, "{}({})", self.name(), theta)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for Gate {
    type Err = KqbitError;

    /// Parses identifiers such as `"h"`, `"cnot"` or `"rx(1.5708)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ident = s.trim().to_ascii_lowercase();
        let unknown = || KqbitError::UnknownGate(s.to_string());

        if let Some((name, rest)) = ident.split_once('(') {
            let angle: f64 = rest
                .strip_suffix(')')
                .and_then(|a| a.trim().parse().ok())
                .ok_or_else(unknown)?;
            return match name.trim() {
                "p" | "phase" => Ok(Gate::Phase(angle)),
                "rx" => Ok(Gate::Rx(angle)),
                "ry" => Ok(Gate::Ry(angle)),
                "rz" => Ok(Gate::Rz(angle)),
                _ => Err(unknown()),
            };
        }

        match ident.as_str() {
            "i" | "id" => Ok(Gate::I),
            "x" => Ok(Gate::X),
            "y" => Ok(Gate::Y),
            "z" => Ok(Gate::Z),
            "h" => Ok(Gate::H),
            "s" => Ok(Gate::S),
            "sdg" => Ok(Gate::Sdg),
            "t" => Ok(Gate::T),
            "tdg" => Ok(Gate::Tdg),
            "sx" => Ok(Gate::SX),
            "cx" | "cnot" => Ok(Gate::CX),
            "cy" => Ok(Gate::CY),
            "cz" => Ok(Gate::CZ),
            "swap" => Ok(Gate::Swap),
            "ccx" | "toffoli" => Ok(Gate::CCX),
            "cswap" | "fredkin" => Ok(Gate::CSwap),
            _ => Err(unknown()),
        }
    }
}
