//! Padding a logical circuit to the device size.

use tracing::debug;

use qpass_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::Optimizer;
use crate::property::Target;

/// Pads the circuit's qubit count to the device's physical count.
///
/// The added qubits are idle. Placers and routers accept a smaller circuit
/// too, so this pass mostly makes the padding explicit before custom
/// passes that expect it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessing;

impl Optimizer for Preprocessing {
    fn name(&self) -> &'static str {
        "Preprocessing"
    }

    fn optimize(&self, circuit: &Circuit, target: &Target) -> CompileResult<Circuit> {
        let available = target.num_qubits();
        if circuit.num_qubits() > available {
            return Err(CompileError::CircuitTooLarge {
                required: circuit.num_qubits() as usize,
                available,
            });
        }
        let mut padded = circuit.clone();
        if padded.num_qubits() < available {
            debug!("Padding {} qubits to {}", padded.num_qubits(), available);
            padded.resize(available)?;
        }
        Ok(padded)
    }
}
