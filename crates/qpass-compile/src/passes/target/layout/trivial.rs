//! Identity placement.

use qpass_ir::Circuit;

use super::check_fits;
use crate::connectivity::Connectivity;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::pass::Placer;

/// Trivial placement.
///
/// Maps logical qubit i to physical qubit i. This is the simplest strategy
/// and the default when a pipeline has no placer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialPlacer;

impl Placer for TrivialPlacer {
    fn name(&self) -> &'static str {
        "TrivialPlacer"
    }

    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout> {
        check_fits(circuit, connectivity)?;
        Ok(Layout::trivial(connectivity.num_qubits()))
    }
}
