//! Placement for star-shaped devices.

use qpass_ir::Circuit;

use super::{check_fits, two_qubit_degrees};
use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::Placer;

/// Places the logical qubit with the most two-qubit gates on the star
/// center.
///
/// Ties go to the lowest logical index. The hub trades places with the
/// qubit the trivial placement puts on the center; everything else stays
/// trivial.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarPlacer;

impl Placer for StarPlacer {
    fn name(&self) -> &'static str {
        "StarPlacer"
    }

    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout> {
        check_fits(circuit, connectivity)?;
        let center = connectivity.center().ok_or_else(|| {
            CompileError::InvalidConnectivity("star placer requires a star graph".into())
        })?;

        let degrees = two_qubit_degrees(circuit);
        let mut hub = 0u32;
        for (q, &degree) in degrees.iter().enumerate() {
            if degree > degrees[hub as usize] {
                hub = q as u32;
            }
        }

        let mut layout = Layout::trivial(connectivity.num_qubits());
        if hub != center {
            layout.swap_physical(hub, center);
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::star_connectivity;
    use qpass_ir::QubitId;

    #[test]
    fn test_hub_on_center() {
        let mut circuit = Circuit::new("test", 5);
        circuit.cz(QubitId(4), QubitId(0)).unwrap();
        circuit.cz(QubitId(4), QubitId(1)).unwrap();
        circuit.cz(QubitId(3), QubitId(4)).unwrap();
        circuit.cz(QubitId(0), QubitId(3)).unwrap();

        let layout = StarPlacer.place(&circuit, &star_connectivity(5)).unwrap();
        assert_eq!(layout.physical(4), 2);
        assert_eq!(layout.physical(2), 4);
        assert_eq!(layout.physical(0), 0);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let mut circuit = Circuit::new("test", 3);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();

        let layout = StarPlacer.place(&circuit, &star_connectivity(3)).unwrap();
        assert_eq!(layout.physical(0), 1);
        assert_eq!(layout.physical(1), 0);
    }

    #[test]
    fn test_rejects_non_star() {
        let circuit = Circuit::new("test", 4);
        let err = StarPlacer
            .place(&circuit, &Connectivity::cycle(4))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidConnectivity(_)));
    }
}
