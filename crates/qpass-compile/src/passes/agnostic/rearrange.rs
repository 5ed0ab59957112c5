//! Gate fusion into generic unitaries.

use rustc_hash::FxHashMap;
use tracing::debug;

use qpass_ir::{Circuit, CustomGate, Instruction, QubitId, Unitary2x2, Unitary4x4};

use crate::error::{CompileError, CompileResult};
use crate::pass::Optimizer;
use crate::property::Target;

/// Name given to fused gates.
pub const FUSED_GATE_NAME: &str = "unitary";

/// Fuses runs of gates into single generic unitaries.
///
/// With `max_qubits = 1` every run of one-qubit gates on a qubit becomes
/// one 2x2 unitary. With `max_qubits = 2` every block of gates confined to a
/// qubit pair becomes one 4x4 unitary, which the unroller re-synthesizes
/// with at most three entanglers. The product is exact: no global phase is
/// dropped. A block holding a single gate is left as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rearrange {
    max_qubits: u32,
}

impl Default for Rearrange {
    fn default() -> Self {
        Self { max_qubits: 1 }
    }
}

impl Rearrange {
    /// Fuse blocks acting on at most `max_qubits` qubits (1 or 2).
    pub fn new(max_qubits: u32) -> CompileResult<Self> {
        if !(1..=2).contains(&max_qubits) {
            return Err(CompileError::InvalidConfiguration(format!(
                "rearrange fuses 1 or 2 qubit blocks, got {max_qubits}"
            )));
        }
        Ok(Self { max_qubits })
    }

    /// Largest block width.
    pub fn max_qubits(&self) -> u32 {
        self.max_qubits
    }
}

impl Optimizer for Rearrange {
    fn name(&self) -> &'static str {
        "Rearrange"
    }

    fn optimize(&self, circuit: &Circuit, _target: &Target) -> CompileResult<Circuit> {
        let mut fuser = Fuser {
            max_qubits: self.max_qubits as usize,
            blocks: vec![],
            open: FxHashMap::default(),
            out: Vec::with_capacity(circuit.len()),
        };
        for inst in circuit.instructions() {
            fuser.push(inst);
        }
        fuser.close_all();
        debug!("Fused {} instructions into {}", circuit.len(), fuser.out.len());
        Ok(Circuit::from_instructions(
            circuit.name(),
            circuit.num_qubits(),
            circuit.level(),
            fuser.out,
        )?)
    }
}

/// Gates collected on a set of at most two qubits.
struct Block {
    qubits: Vec<QubitId>,
    gates: Vec<Instruction>,
}

impl Block {
    /// The fused instruction, or the single gate if there is only one.
    fn into_instruction(mut self) -> Instruction {
        if self.gates.len() == 1 {
            return self.gates.remove(0);
        }
        match self.qubits.as_slice() {
            [q] => {
                let u = self
                    .gates
                    .iter()
                    .filter_map(|g| g.as_gate().and_then(|g| g.matrix_1q()))
                    .fold(Unitary2x2::identity(), |acc, m| m * acc);
                Instruction::gate(CustomGate::from_unitary_1q(FUSED_GATE_NAME, &u), [*q])
            }
            [q0, q1] => {
                let mut u = Unitary4x4::identity();
                for inst in &self.gates {
                    if let Some(m) = embed(inst, *q0) {
                        u = m * u;
                    }
                }
                Instruction::gate(
                    CustomGate::from_unitary_2q(FUSED_GATE_NAME, &u),
                    [*q0, *q1],
                )
            }
            _ => unreachable!("blocks hold one or two qubits"),
        }
    }
}

/// The 4x4 matrix of `inst` on the pair whose first qubit is `first`.
fn embed(inst: &Instruction, first: QubitId) -> Option<Unitary4x4> {
    let gate = inst.as_gate()?;
    match inst.qubits.as_slice() {
        [q] if *q == first => Some(Unitary4x4::kron(&gate.matrix_1q()?, &Unitary2x2::identity())),
        [_] => Some(Unitary4x4::kron(&Unitary2x2::identity(), &gate.matrix_1q()?)),
        [a, _] => {
            let m = gate.matrix_2q()?;
            Some(if *a == first { m } else { m.reversed_qubits() })
        }
        _ => None,
    }
}

/// Streaming block collector.
///
/// A block is emitted when an instruction touches one of its qubits without
/// joining it. Every instruction emitted meanwhile acts on other qubits and
/// commutes with the block, so emitting the block late keeps the unitary.
struct Fuser {
    max_qubits: usize,
    blocks: Vec<Option<Block>>,
    open: FxHashMap<QubitId, usize>,
    out: Vec<Instruction>,
}

impl Fuser {
    fn push(&mut self, inst: &Instruction) {
        let fusable = inst.as_gate().is_some_and(|g| match inst.qubits.len() {
            1 => g.matrix_1q().is_some(),
            2 => g.matrix_2q().is_some(),
            _ => false,
        }) && inst.qubits.len() <= self.max_qubits;

        let mut touched: Vec<usize> = inst
            .qubits
            .iter()
            .filter_map(|q| self.open.get(q).copied())
            .collect();
        touched.sort_unstable();
        touched.dedup();

        if !fusable {
            for index in touched {
                self.close(index);
            }
            self.out.push(inst.clone());
            return;
        }

        let mut qubits: Vec<QubitId> = vec![];
        for &index in &touched {
            if let Some(block) = &self.blocks[index] {
                qubits.extend(block.qubits.iter().copied());
            }
        }
        for q in &inst.qubits {
            if !qubits.contains(q) {
                qubits.push(*q);
            }
        }

        let gates = if qubits.len() <= self.max_qubits {
            let mut gates = vec![];
            for index in touched {
                if let Some(block) = self.blocks[index].take() {
                    gates.extend(block.gates);
                }
            }
            gates
        } else {
            for index in touched {
                self.close(index);
            }
            qubits = inst.qubits.clone();
            vec![]
        };

        let mut block = Block { qubits, gates };
        block.gates.push(inst.clone());
        let index = self.blocks.len();
        for q in &block.qubits {
            self.open.insert(*q, index);
        }
        self.blocks.push(Some(block));
    }

    fn close(&mut self, index: usize) {
        if let Some(block) = self.blocks[index].take() {
            for q in &block.qubits {
                self.open.remove(q);
            }
            self.out.push(block.into_instruction());
        }
    }

    fn close_all(&mut self) {
        for index in 0..self.blocks.len() {
            self.close(index);
        }
    }
}
