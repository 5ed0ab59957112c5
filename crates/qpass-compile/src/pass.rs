//! Pass traits and the closed set of pass kinds.

use qpass_ir::Circuit;

use crate::connectivity::Connectivity;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::passes::Unroller;
use crate::property::Target;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Rewrites a circuit without changing its qubit namespace.
    Optimizer,
    /// Chooses the initial layout.
    Placer,
    /// Inserts SWAPs so every two-qubit gate acts on a coupled pair.
    Router,
    /// Rewrites gates into the native gate set.
    Unroller,
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PassKind::Optimizer => "optimizer",
            PassKind::Placer => "placer",
            PassKind::Router => "router",
            PassKind::Unroller => "unroller",
        };
        f.write_str(name)
    }
}

/// A pass that rewrites a circuit in place of its namespace.
pub trait Optimizer: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Produce the optimized circuit.
    fn optimize(&self, circuit: &Circuit, target: &Target) -> CompileResult<Circuit>;
}

/// A pass that maps logical qubits onto physical ones.
pub trait Placer: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Choose an initial layout over `connectivity.num_qubits()` qubits.
    ///
    /// Fails with `CircuitTooLarge` if the circuit needs more qubits than
    /// the device has.
    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout>;
}

/// Output of a [`Router`].
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    /// The physical circuit, sized to the device.
    pub circuit: Circuit,
    /// Layout after the last instruction.
    pub layout: Layout,
    /// Number of SWAPs inserted.
    pub num_swaps: usize,
}

/// A pass that makes a circuit respect the device connectivity.
pub trait Router: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Route `circuit`, whose indices are logical, starting from `layout`.
    ///
    /// The output contains every input instruction relabelled to physical
    /// qubits, plus inserted SWAPs. Every two-qubit gate in it acts on an
    /// edge of `connectivity`.
    fn route(
        &self,
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Routed>;
}

/// One entry of a pipeline.
pub enum Pass {
    /// Circuit-to-circuit rewrite.
    Optimizer(Box<dyn Optimizer>),
    /// Initial placement.
    Placer(Box<dyn Placer>),
    /// SWAP insertion.
    Router(Box<dyn Router>),
    /// Native gate decomposition.
    Unroller(Unroller),
}

impl Pass {
    /// Wrap an optimizer.
    pub fn optimizer(pass: impl Optimizer + 'static) -> Self {
        Pass::Optimizer(Box::new(pass))
    }

    /// Wrap a placer.
    pub fn placer(pass: impl Placer + 'static) -> Self {
        Pass::Placer(Box::new(pass))
    }

    /// Wrap a router.
    pub fn router(pass: impl Router + 'static) -> Self {
        Pass::Router(Box::new(pass))
    }

    /// The default unroller.
    pub fn unroller() -> Self {
        Pass::Unroller(Unroller::new())
    }

    /// Get the kind of this pass.
    pub fn kind(&self) -> PassKind {
        match self {
            Pass::Optimizer(_) => PassKind::Optimizer,
            Pass::Placer(_) => PassKind::Placer,
            Pass::Router(_) => PassKind::Router,
            Pass::Unroller(_) => PassKind::Unroller,
        }
    }

    /// Get the name of this pass.
    pub fn name(&self) -> &str {
        match self {
            Pass::Optimizer(p) => p.name(),
            Pass::Placer(p) => p.name(),
            Pass::Router(p) => p.name(),
            Pass::Unroller(p) => p.name(),
        }
    }
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPass;

    impl Optimizer for TestPass {
        fn name(&self) -> &'static str {
            "test"
        }

        fn optimize(&self, circuit: &Circuit, _target: &Target) -> CompileResult<Circuit> {
            Ok(circuit.clone())
        }
    }

    #[test]
    fn test_pass_kind() {
        let pass = Pass::optimizer(TestPass);
        assert_eq!(pass.kind(), PassKind::Optimizer);
        assert_eq!(pass.name(), "test");
        assert_eq!(format!("{pass:?}"), "optimizer(test)");
        assert_eq!(Pass::unroller().kind(), PassKind::Unroller);
    }
}
