//! Pipeline for orchestrating compilation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qpass_ir::{Circuit, CircuitLevel, QubitId};

use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Optimizer, Pass, PassKind, Placer, Router};
use crate::passes::{
    DEFAULT_VERIFY_TOLERANCE, DEFAULT_VERIFY_TRIALS, Preprocessing, verify_equivalence,
};
use crate::property::{NativeGates, Target};

/// Settings of the equivalence check run after the last pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    /// Largest accepted deviation per random state.
    pub tolerance: f64,
    /// Number of random states.
    pub trials: usize,
    /// Seed of the first random state.
    pub seed: u64,
}

impl Default for Verification {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_VERIFY_TOLERANCE,
            trials: DEFAULT_VERIFY_TRIALS,
            seed: 0,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transpiled {
    /// The physical circuit.
    pub circuit: Circuit,
    /// Layout chosen by placement (trivial without a placer).
    pub initial_layout: Layout,
    /// Layout after the last instruction.
    pub final_layout: Layout,
    /// SWAPs inserted by all routers.
    pub swaps_inserted: usize,
}

/// Check the ordering rules of a pass list.
///
/// There is at most one placer and no router runs before it. Without a
/// placer, routers start from the trivial layout and may appear anywhere.
pub fn validate_structure(passes: &[Pass]) -> CompileResult<()> {
    let placers: Vec<usize> = passes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind() == PassKind::Placer)
        .map(|(i, _)| i)
        .collect();

    match placers.as_slice() {
        [] => Ok(()),
        [placer] => {
            match passes[..*placer]
                .iter()
                .position(|p| p.kind() == PassKind::Router)
            {
                Some(router) => Err(CompileError::PipelineStructure(format!(
                    "router '{}' at position {router} runs before placer '{}' at position {placer}",
                    passes[router].name(),
                    passes[*placer].name()
                ))),
                None => Ok(()),
            }
        }
        _ => Err(CompileError::PipelineStructure(format!(
            "at most one placer is allowed, found {} at positions {placers:?}",
            placers.len()
        ))),
    }
}

/// A validated, reusable list of passes bound to a target.
pub struct Pipeline {
    passes: Vec<Pass>,
    target: Target,
    verification: Option<Verification>,
}

impl Pipeline {
    /// Validate `passes` and bind them to `target`.
    pub fn new(passes: Vec<Pass>, target: Target) -> CompileResult<Self> {
        validate_structure(&passes)?;
        Ok(Self {
            passes,
            target,
            verification: None,
        })
    }

    /// Start a builder for `target`.
    pub fn builder(target: Target) -> PipelineBuilder {
        PipelineBuilder::new(target)
    }

    /// Preprocessing, `placer`, `router` and the default unroller.
    pub fn standard(
        target: Target,
        placer: impl Placer + 'static,
        router: impl Router + 'static,
    ) -> CompileResult<Self> {
        Self::builder(target)
            .optimizer(Preprocessing)
            .placer(placer)
            .router(router)
            .unroller()
            .build()
    }

    /// The passes, in execution order.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// The target the pipeline compiles for.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the pipeline has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass on `circuit`.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit) -> CompileResult<Transpiled> {
        let connectivity = &self.target.connectivity;
        let n = connectivity.num_qubits();
        if circuit.num_qubits() > n {
            return Err(CompileError::CircuitTooLarge {
                required: circuit.num_qubits() as usize,
                available: n,
            });
        }
        info!(
            "Running pipeline with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        let mut current = circuit.clone();
        let mut initial_layout = Layout::trivial(n);
        let mut layout = initial_layout.clone();
        let mut swaps_inserted = 0;

        for pass in &self.passes {
            debug!("Running pass: {:?}", pass);
            match pass {
                Pass::Optimizer(optimizer) => {
                    current = optimizer.optimize(&current, &self.target)?;
                }
                Pass::Placer(placer) => {
                    if current.is_physical() {
                        return Err(CompileError::PipelineStructure(format!(
                            "placer '{}' needs a logical circuit",
                            placer.name()
                        )));
                    }
                    layout = placer.place(&current, connectivity)?;
                    initial_layout = layout.clone();
                }
                Pass::Router(router) => {
                    if current.is_physical() {
                        // Re-route from the identity and compose the result.
                        let routed = router.route(&current, &Layout::trivial(n), connectivity)?;
                        layout = layout.then(&routed.layout)?;
                        swaps_inserted += routed.num_swaps;
                        current = routed.circuit;
                    } else {
                        let routed = router.route(&current, &layout, connectivity)?;
                        layout = routed.layout;
                        swaps_inserted += routed.num_swaps;
                        current = routed.circuit;
                    }
                }
                Pass::Unroller(unroller) => {
                    current = unroller.decompose(&current, &self.target.natives)?;
                }
            }
            debug!("Pass {} completed, ops: {}", pass.name(), current.len());
        }

        if !current.is_physical() {
            current = current.relabelled(n, CircuitLevel::Physical, |q| {
                QubitId(layout.physical(q.0))
            })?;
        }

        if let Some(v) = &self.verification {
            let deviation = verify_equivalence(
                circuit,
                &current,
                &initial_layout,
                &layout,
                v.tolerance,
                v.trials,
                v.seed,
            )?;
            debug!("Verified equivalence, deviation {:.3e}", deviation);
        }

        info!(
            "Pipeline completed, depth: {}, ops: {}, swaps: {}",
            current.depth(),
            current.len(),
            swaps_inserted
        );

        Ok(Transpiled {
            circuit: current,
            initial_layout,
            final_layout: layout,
            swaps_inserted,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("passes", &self.passes)
            .field("num_qubits", &self.target.num_qubits())
            .field("verification", &self.verification)
            .finish()
    }
}

/// Builder for [`Pipeline`]. Validation happens in [`build`](Self::build).
pub struct PipelineBuilder {
    passes: Vec<Pass>,
    target: Target,
    verification: Option<Verification>,
}

impl PipelineBuilder {
    /// Create an empty builder for `target`.
    pub fn new(target: Target) -> Self {
        Self {
            passes: vec![],
            target,
            verification: None,
        }
    }

    /// Append a pass.
    #[must_use]
    pub fn pass(mut self, pass: Pass) -> Self {
        self.passes.push(pass);
        self
    }

    /// Append an optimizer.
    #[must_use]
    pub fn optimizer(self, pass: impl Optimizer + 'static) -> Self {
        self.pass(Pass::optimizer(pass))
    }

    /// Append a placer.
    #[must_use]
    pub fn placer(self, pass: impl Placer + 'static) -> Self {
        self.pass(Pass::placer(pass))
    }

    /// Append a router.
    #[must_use]
    pub fn router(self, pass: impl Router + 'static) -> Self {
        self.pass(Pass::router(pass))
    }

    /// Append the default unroller.
    #[must_use]
    pub fn unroller(self) -> Self {
        self.pass(Pass::unroller())
    }

    /// Check the result for equivalence after the last pass.
    #[must_use]
    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = Some(verification);
        self
    }

    /// Validate the pass order and build the pipeline.
    pub fn build(self) -> CompileResult<Pipeline> {
        let mut pipeline = Pipeline::new(self.passes, self.target)?;
        pipeline.verification = self.verification;
        Ok(pipeline)
    }
}

/// Transpile `circuit` with `passes` for a device.
///
/// Returns the physical circuit and the final layout.
pub fn transpile(
    circuit: &Circuit,
    passes: Vec<Pass>,
    connectivity: &Connectivity,
    natives: &NativeGates,
) -> CompileResult<(Circuit, Layout)> {
    let target = Target::new(connectivity.clone(), natives.clone());
    let transpiled = Pipeline::new(passes, target)?.run(circuit)?;
    Ok((transpiled.circuit, transpiled.final_layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{ShortestPathRouter, StarPlacer, StarRouter, TrivialPlacer};

    fn star_target(n: u32) -> Target {
        Target::new(Connectivity::star(n), NativeGates::default())
    }

    #[test]
    fn test_empty_pipeline_relabels() {
        let pipeline = Pipeline::new(vec![], star_target(3)).unwrap();
        assert!(pipeline.is_empty());

        let mut circuit = Circuit::new("test", 2);
        circuit.h(QubitId(0)).unwrap();
        let out = pipeline.run(&circuit).unwrap();
        assert!(out.circuit.is_physical());
        assert_eq!(out.circuit.num_qubits(), 3);
        assert!(out.final_layout.is_trivial());
        assert_eq!(out.swaps_inserted, 0);
    }

    #[test]
    fn test_two_placers_rejected() {
        let err = Pipeline::builder(star_target(3))
            .placer(TrivialPlacer)
            .placer(StarPlacer)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompileError::PipelineStructure(_)));
    }

    #[test]
    fn test_router_before_placer_rejected() {
        let passes = vec![Pass::router(StarRouter::new()), Pass::placer(TrivialPlacer)];
        assert!(matches!(
            validate_structure(&passes),
            Err(CompileError::PipelineStructure(_))
        ));
    }

    #[test]
    fn test_router_without_placer_allowed() {
        let passes = vec![Pass::unroller(), Pass::router(ShortestPathRouter)];
        assert!(validate_structure(&passes).is_ok());
    }

    #[test]
    fn test_second_router_composes_layout() {
        let mut circuit = Circuit::new("test", 4);
        circuit.cz(QubitId(0), QubitId(3)).unwrap();
        circuit.cz(QubitId(1), QubitId(2)).unwrap();

        let target = Target::new(Connectivity::line(4), NativeGates::default());
        let out = Pipeline::builder(target)
            .placer(TrivialPlacer)
            .router(ShortestPathRouter)
            .router(ShortestPathRouter)
            .with_verification(Verification::default())
            .build()
            .unwrap()
            .run(&circuit)
            .unwrap();

        // The first router already satisfies the line, so the second adds
        // nothing.
        assert_eq!(out.swaps_inserted, 2);
        assert_eq!(out.final_layout.physical(0), 2);
    }

    #[test]
    fn test_transpile() {
        let mut circuit = Circuit::new("test", 3);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let passes = vec![
            Pass::optimizer(Preprocessing),
            Pass::placer(TrivialPlacer),
            Pass::router(StarRouter::new()),
            Pass::unroller(),
        ];
        let (out, layout) = transpile(
            &circuit,
            passes,
            &Connectivity::star(3),
            &NativeGates::default(),
        )
        .unwrap();
        assert!(out.is_physical());
        assert_eq!(layout.len(), 3);
        assert_eq!(qpass_ir::count_gates_of_type(&out, "cx"), 0);
    }
}
