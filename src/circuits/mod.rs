// src/circuits/mod.rs

//! Ordered instruction sequences over a fixed-size register.
//!
//! A `Circuit` is pure data. It is validated when it runs, not when it is
//! built, so the builder never fails except when parsing gate identifiers.

use crate::core::Result;
use crate::operations::{Gate, Operator};
use std::fmt;

/// One step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// A named gate. Controls come first in `targets`.
    Gate { gate: Gate, targets: Vec<usize> },
    /// An arbitrary dense operator. `targets[0]` is the most significant bit
    /// of the operator's row index.
    Unitary { operator: Operator, targets: Vec<usize> },
    /// Projective measurement of `qubit` in the computational basis. The
    /// observed bit is written to classical bit `clbit`.
    Measure { qubit: usize, clbit: usize },
}

impl Instruction {
    /// Every qubit this instruction touches, in target order.
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Instruction::Gate { targets, .. } | Instruction::Unitary { targets, .. } => {
                targets.clone()
            }
            Instruction::Measure { qubit, .. } => vec![*qubit],
        }
    }
}

/// An ordered list of instructions applied to `num_qubits` qubits starting
/// from `|0...0>` (or a caller-supplied state).
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Creates a new, empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            instructions: Vec::new(),
        }
    }

    /// Appends a single instruction to the end of the circuit.
    ///
    /// # Arguments
    /// * `instruction` - The `Instruction` to append. Targets are checked
    ///   when the circuit runs.
    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Appends every instruction yielded by `instructions`, in order.
    pub fn add_instructions<I>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
    }

    /// Width of the quantum register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Width of the classical register: one past the highest classical bit
    /// any measurement writes, or 0 without measurements.
    pub fn num_clbits(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Measure { clbit, .. } => Some(clbit + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// The instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// `true` if any instruction is a measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions
            .iter()
            .any(|instruction| matches!(instruction, Instruction::Measure { .. }))
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Method-chaining construction of a [`Circuit`].
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Starts an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
        }
    }

    /// Adds a named gate.
    ///
    /// # Arguments
    /// * `gate` - The gate to apply.
    /// * `targets` - Qubits it acts on, controls first. The first target is
    ///   the most significant bit of the gate matrix's row index.
    pub fn gate(mut self, gate: Gate, targets: &[usize]) -> Self {
        self.circuit.add_instruction(Instruction::Gate {
            gate,
            targets: targets.to_vec(),
        });
        self
    }

    /// Adds a gate given by identifier, e.g. `"h"`, `"cnot"` or `"rz(0.25)"`.
    pub fn named_gate(self, name: &str, targets: &[usize]) -> Result<Self> {
        let gate: Gate = name.parse()?;
        Ok(self.gate(gate, targets))
    }

    /// Adds an arbitrary operator acting on `targets`, listed in the same
    /// order as for [`CircuitBuilder::gate`].
    pub fn unitary(mut self, operator: Operator, targets: &[usize]) -> Self {
        self.circuit.add_instruction(Instruction::Unitary {
            operator,
            targets: targets.to_vec(),
        });
        self
    }

    /// Measures `qubit` into the classical bit with the same index.
    pub fn measure(self, qubit: usize) -> Self {
        self.measure_into(qubit, qubit)
    }

    /// Measures `qubit` and stores the outcome in classical bit `clbit`.
    ///
    /// # Arguments
    /// * `qubit` - The qubit to collapse.
    /// * `clbit` - Index into the classical register. A later measurement
    ///   into the same bit overwrites it.
    pub fn measure_into(mut self, qubit: usize, clbit: usize) -> Self {
        self.circuit
            .add_instruction(Instruction::Measure { qubit, clbit });
        self
    }

    /// Measures every qubit in index order, each into its own classical bit.
    pub fn measure_all(mut self) -> Self {
        let n = self.circuit.num_qubits();
        self.circuit.add_instructions(
            (0..n).map(|qubit| Instruction::Measure { qubit, clbit: qubit }),
        );
        self
    }

    /// Appends an already-built instruction.
    pub fn add_instruction(mut self, instruction: Instruction) -> Self {
        self.circuit.add_instruction(instruction);
        self
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Gate { gate, targets } => write!(f, "{} {:?}", gate, targets),
            Instruction::Unitary { operator, targets } => {
                write!(f, "unitary<{}q> {:?}", operator.num_qubits(), targets)
            }
            Instruction::Measure { qubit, clbit } => {
                write!(f, "measure {} -> c{}", qubit, clbit)
            }
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "kqbit::Circuit[{} instructions on {} qubits]",
            self.instructions.len(),
            self.num_qubits
        )?;
        for (step, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", step, instruction)?;
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KqbitError;

    #[test]
    fn builder_records_instructions_in_order() {
        let circuit = CircuitBuilder::new(2)
            .gate(Gate::H, &[0])
            .gate(Gate::CX, &[0, 1])
            .measure_all()
            .build();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 4);
        assert!(circuit.has_measurements());
        assert_eq!(circuit.instructions()[1].qubits(), vec![0, 1]);
        assert_eq!(
            circuit.instructions()[3],
            Instruction::Measure { qubit: 1, clbit: 1 }
        );
        assert_eq!(circuit.num_clbits(), 2);
    }

    #[test]
    fn measurements_can_target_any_classical_bit() {
        let circuit = CircuitBuilder::new(2)
            .measure_into(0, 3)
            .measure_into(1, 0)
            .build();
        assert_eq!(circuit.num_clbits(), 4);
        assert_eq!(circuit.instructions()[0].qubits(), vec![0]);
        assert_eq!(
            circuit.instructions()[1],
            Instruction::Measure { qubit: 1, clbit: 0 }
        );
        assert_eq!(Circuit::new(2).num_clbits(), 0);
    }

    #[test]
    fn named_gates_parse_or_fail() {
        let circuit = CircuitBuilder::new(1).named_gate("rx(0.5)", &[0]).unwrap().build();
        assert_eq!(
            circuit.instructions()[0],
            Instruction::Gate {
                gate: Gate::Rx(0.5),
                targets: vec![0]
            }
        );
        assert!(matches!(
            CircuitBuilder::new(1).named_gate("warp", &[0]),
            Err(KqbitError::UnknownGate(_))
        ));
    }

    #[test]
    fn display_lists_one_instruction_per_line() {
        let circuit = CircuitBuilder::new(3)
            .gate(Gate::CX, &[0, 2])
            .unitary(Gate::Swap.operator(), &[1, 2])
            .measure_into(1, 0)
            .build();
        let text = circuit.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "kqbit::Circuit[3 instructions on 3 qubits]");
        assert_eq!(lines[1], "    0: cx [0, 2]");
        assert_eq!(lines[2], "    1: unitary<2q> [1, 2]");
        assert_eq!(lines[3], "    2: measure 1 -> c0");
    }

    #[test]
    fn empty_circuit_displays_header_only() {
        let circuit = Circuit::new(2);
        assert!(circuit.is_empty());
        assert_eq!(circuit.to_string(), "kqbit::Circuit[0 instructions on 2 qubits]\n");
    }
}
