//! Seeded random placement.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use qpass_ir::Circuit;

use super::check_fits;
use crate::connectivity::Connectivity;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::pass::Placer;

/// Uniformly random placement, reproducible from its seed.
#[derive(Debug, Clone, Copy)]
pub struct RandomPlacer {
    seed: u64,
}

impl RandomPlacer {
    /// Create a placer drawing from `StdRng::seed_from_u64(seed)`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Placer for RandomPlacer {
    fn name(&self) -> &'static str {
        "RandomPlacer"
    }

    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout> {
        check_fits(circuit, connectivity)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut physical: Vec<u32> = (0..connectivity.num_qubits()).collect();
        physical.shuffle(&mut rng);
        Layout::from_physical(physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_reproducible() {
        let circuit = Circuit::new("test", 4);
        let grid = Connectivity::grid(3, 3);
        let a = RandomPlacer::new(42).place(&circuit, &grid).unwrap();
        let b = RandomPlacer::new(42).place(&circuit, &grid).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 9);
    }

    #[test]
    fn test_seeds_differ() {
        let circuit = Circuit::new("test", 8);
        let line = Connectivity::line(16);
        let layouts: Vec<Layout> = (0..4)
            .map(|seed| RandomPlacer::new(seed).place(&circuit, &line).unwrap())
            .collect();
        assert!(layouts.windows(2).any(|w| w[0] != w[1]));
    }
}
