//! High-level circuit builder API.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Which qubit namespace a circuit's indices refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitLevel {
    /// Abstract qubits, no hardware constraints.
    #[default]
    Logical,
    /// Device qubits; two-qubit gates are expected on coupled pairs.
    Physical,
}

/// A quantum circuit: an ordered instruction list over `num_qubits` qubits.
///
/// Every instruction is checked on insertion, so a `Circuit` always has
/// in-range qubit indices, no repeated qubit within an instruction, and gate
/// arity matching the qubit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    #[serde(default)]
    level: CircuitLevel,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty logical circuit.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            level: CircuitLevel::Logical,
            instructions: vec![],
        }
    }

    /// Create an empty circuit at the given level.
    pub fn with_level(name: impl Into<String>, num_qubits: u32, level: CircuitLevel) -> Self {
        Self {
            level,
            ..Self::new(name, num_qubits)
        }
    }

    /// Build a circuit from instructions, validating each one.
    pub fn from_instructions(
        name: impl Into<String>,
        num_qubits: u32,
        level: CircuitLevel,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut circuit = Self::with_level(name, num_qubits, level);
        for inst in instructions {
            circuit.push(inst)?;
        }
        Ok(circuit)
    }

    /// Append an instruction after validating it.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());

        if let Some(gate) = instruction.as_gate() {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
            if !(1..=2).contains(&expected) {
                return Err(IrError::UnsupportedArity {
                    gate_name: gate.name().to_string(),
                    num_qubits: expected,
                });
            }
        }

        for (i, q) in instruction.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit: *q,
                    num_qubits: self.num_qubits,
                    gate_name: gate_name(),
                });
            }
            if instruction.qubits[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: gate_name(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::I, qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Tdg, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::SX, qubit))
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::SXdg, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))
    }

    /// Apply phase gate.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::P(lambda), qubit))
    }

    /// Apply universal U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::U(theta, phi, lambda),
            qubit,
        ))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CY, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CZ, control, target))
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CH, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::ISwap, q1, q2))
    }

    /// Apply controlled-Rx gate.
    pub fn crx(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRx(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-Ry gate.
    pub fn cry(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRy(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRz(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, lambda: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CP(lambda),
            control,
            target,
        ))
    }

    /// Apply RXX (XX rotation) gate.
    pub fn rxx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RXX(theta), q1, q2))
    }

    /// Apply RYY (YY rotation) gate.
    pub fn ryy(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RYY(theta), q1, q2))
    }

    /// Apply RZZ (ZZ rotation) gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RZZ(theta), q1, q2))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply any gate, standard or custom.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Measure the given qubits.
    pub fn measure(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubits))
    }

    /// Measure every qubit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::measure((0..self.num_qubits).map(QubitId)))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::barrier((0..self.num_qubits).map(QubitId)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The namespace of this circuit's qubit indices.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Mark the circuit as logical or physical.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// True if the circuit uses physical qubit indices.
    pub fn is_physical(&self) -> bool {
        self.level == CircuitLevel::Physical
    }

    /// The instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit and return its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Number of two-qubit gate instructions.
    pub fn two_qubit_gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .count()
    }

    /// Count of each instruction name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth: the longest chain of instructions sharing qubits.
    /// Barriers do not add depth but synchronize the qubits they span.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits as usize];
        let mut depth = 0;
        for inst in &self.instructions {
            let start = inst.qubits.iter().map(|q| level[q.index()]).max().unwrap_or(0);
            let end = if inst.is_barrier() { start } else { start + 1 };
            for q in &inst.qubits {
                level[q.index()] = end;
            }
            depth = depth.max(end);
        }
        depth
    }

    /// True if no measurement appears in the circuit.
    pub fn is_unitary(&self) -> bool {
        !self.instructions.iter().any(Instruction::is_measure)
    }

    /// The highest qubit index referenced by any instruction.
    pub fn max_qubit_in_use(&self) -> Option<QubitId> {
        self.instructions
            .iter()
            .flat_map(|i| i.qubits.iter().copied())
            .max()
    }

    /// Change the declared qubit count. Growing adds idle qubits; shrinking
    /// fails if a dropped qubit is referenced.
    pub fn resize(&mut self, num_qubits: u32) -> IrResult<()> {
        if let Some(q) = self.max_qubit_in_use() {
            if q.0 >= num_qubits {
                return Err(IrError::ResizeInUse {
                    requested: num_qubits,
                    in_use: q,
                });
            }
        }
        self.num_qubits = num_qubits;
        Ok(())
    }

    /// Relabel every qubit through `map` into a circuit of `num_qubits`
    /// qubits at `level`. The result is validated.
    pub fn relabelled(
        &self,
        num_qubits: u32,
        level: CircuitLevel,
        mut map: impl FnMut(QubitId) -> QubitId,
    ) -> IrResult<Self> {
        Self::from_instructions(
            self.name.clone(),
            num_qubits,
            level,
            self.instructions.iter().map(|inst| inst.remapped(&mut map)),
        )
    }

    /// An empty circuit with the same name, size and level.
    pub fn empty_like(&self) -> Self {
        Self::with_level(self.name.clone(), self.num_qubits, self.level)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::new("ghz", n);
        if n == 0 {
            return Ok(circuit);
        }

        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }

        Ok(circuit)
    }

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::new("qft", n);

        for i in 0..n {
            circuit.h(QubitId(i))?;

            for j in (i + 1)..n {
                let k = j - i;
                let angle = PI / f64::from(1u32 << k);
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }

        // Bit reversal
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }

        Ok(circuit)
    }
}

/// Number of gates named `gate_name` in `circuit`.
pub fn count_gates_of_type(circuit: &Circuit, gate_name: &str) -> usize {
    circuit
        .instructions()
        .iter()
        .filter(|inst| inst.name() == gate_name)
        .count()
}
