//! JSON configuration of a transpilation run.
//!
//! A [`TranspileConfig`] names the device, the native gates and the passes
//! to run, and builds the matching [`Pipeline`]:
//!
//! ```json
//! {
//!   "connectivity": { "kind": "star", "num_qubits": 5 },
//!   "natives": ["id", "z", "rz", "u", "cz", "measure"],
//!   "placer": { "kind": "subgraph" },
//!   "router": { "kind": "sabre", "seed": 42 },
//!   "verify": { "tolerance": 1e-6 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use qpass_ir::Circuit;

use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Pass, Placer, Routed, Router};
use crate::passes::{
    Preprocessing, RandomPlacer, Rearrange, ReverseTraversalPlacer, SabreHeuristic, SabreRouter,
    ShortestPathRouter, StarPlacer, StarRouter, SubgraphPlacer, TrivialPlacer,
};
use crate::pipeline::{Pipeline, Verification};
use crate::property::{NativeGates, Target};

/// Device coupling graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectivityConfig {
    /// Star with the center at `num_qubits / 2`.
    Star { num_qubits: u32 },
    /// Linear chain.
    Line { num_qubits: u32 },
    /// Ring.
    Cycle { num_qubits: u32 },
    /// All-to-all.
    Complete { num_qubits: u32 },
    /// Rectangular grid.
    Grid { rows: u32, cols: u32 },
    /// 20-qubit IQM layout.
    Iqm20,
    /// Explicit edge list, checked when parsed.
    Custom(Connectivity),
}

impl ConnectivityConfig {
    /// Build the graph.
    pub fn build(&self) -> CompileResult<Connectivity> {
        Ok(match self {
            Self::Star { num_qubits } => Connectivity::star(*num_qubits),
            Self::Line { num_qubits } => Connectivity::line(*num_qubits),
            Self::Cycle { num_qubits } => Connectivity::cycle(*num_qubits),
            Self::Complete { num_qubits } => Connectivity::complete(*num_qubits),
            Self::Grid { rows, cols } => Connectivity::grid(*rows, *cols),
            Self::Iqm20 => Connectivity::iqm20(),
            Self::Custom(connectivity) => connectivity.clone(),
        })
    }
}

/// Routing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouterConfig {
    /// Greedy star router.
    Star {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lookahead: Option<usize>,
    },
    /// Shortest-path router.
    ShortestPath,
    /// SABRE router.
    Sabre {
        #[serde(default)]
        seed: u64,
        #[serde(default)]
        heuristic: SabreHeuristic,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        iteration_cap: Option<usize>,
    },
}

impl RouterConfig {
    fn build(&self) -> Box<dyn Router> {
        match self {
            Self::Star { lookahead } => {
                let router = StarRouter::new();
                Box::new(match lookahead {
                    Some(gates) => router.with_lookahead(*gates),
                    None => router,
                })
            }
            Self::ShortestPath => Box::new(ShortestPathRouter),
            Self::Sabre {
                seed,
                heuristic,
                iteration_cap,
            } => {
                let router = SabreRouter::new(*seed).with_heuristic(*heuristic);
                Box::new(match iteration_cap {
                    Some(steps) => router.with_iteration_cap(*steps),
                    None => router,
                })
            }
        }
    }
}

/// Placement strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacerConfig {
    /// Logical `i` on physical `i`.
    Trivial,
    /// Busiest qubit on the star center.
    Star,
    /// Seeded random permutation.
    Random { seed: u64 },
    /// Interaction-graph embedding with a trivial fallback.
    Subgraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_budget: Option<usize>,
    },
    /// Forward/backward traversal with a router.
    ReverseTraversal {
        router: RouterConfig,
        #[serde(default = "default_iterations")]
        iterations: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<usize>,
    },
}

fn default_iterations() -> usize {
    1
}

impl PlacerConfig {
    fn build(&self) -> Box<dyn Placer> {
        match self {
            Self::Trivial => Box::new(TrivialPlacer),
            Self::Star => Box::new(StarPlacer),
            Self::Random { seed } => Box::new(RandomPlacer::new(*seed)),
            Self::Subgraph { step_budget } => {
                let placer = SubgraphPlacer::new();
                Box::new(match step_budget {
                    Some(steps) => placer.with_step_budget(*steps),
                    None => placer,
                })
            }
            Self::ReverseTraversal {
                router,
                iterations,
                depth,
            } => {
                let placer = ReverseTraversalPlacer::new(BoxedRouter(router.build()), *iterations);
                Box::new(match depth {
                    Some(gates) => placer.with_depth(*gates),
                    None => placer,
                })
            }
        }
    }
}

/// Lets a configured router be handed to passes that take `impl Router`.
struct BoxedRouter(Box<dyn Router>);

impl Router for BoxedRouter {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn route(
        &self,
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Routed> {
        self.0.route(circuit, layout, connectivity)
    }
}

/// Optimizers run before placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Pad the circuit to the device size.
    pub preprocessing: bool,
    /// Fuse blocks of at most this many qubits.
    pub rearrange: Option<u32>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            preprocessing: true,
            rearrange: None,
        }
    }
}

fn default_unroll() -> bool {
    true
}

/// A complete transpilation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranspileConfig {
    /// Device coupling graph.
    pub connectivity: ConnectivityConfig,
    /// Native gate set.
    #[serde(default)]
    pub natives: NativeGates,
    /// Optimizers run first.
    #[serde(default)]
    pub optimizers: OptimizerConfig,
    /// Placement; trivial if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placer: Option<PlacerConfig>,
    /// Routing; none if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<RouterConfig>,
    /// Run the unroller last.
    #[serde(default = "default_unroll")]
    pub unroll: bool,
    /// Equivalence check after the last pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<Verification>,
}

impl TranspileConfig {
    /// Default passes on `connectivity`: preprocessing, trivial placement,
    /// SABRE routing and unrolling.
    pub fn new(connectivity: ConnectivityConfig) -> Self {
        Self {
            connectivity,
            natives: NativeGates::default(),
            optimizers: OptimizerConfig::default(),
            placer: Some(PlacerConfig::Trivial),
            router: Some(RouterConfig::Sabre {
                seed: 0,
                heuristic: SabreHeuristic::default(),
                iteration_cap: None,
            }),
            unroll: true,
            verify: None,
        }
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The device described by this configuration.
    pub fn target(&self) -> CompileResult<Target> {
        Ok(Target::new(self.connectivity.build()?, self.natives.clone()))
    }

    /// The pass list, in execution order.
    pub fn passes(&self) -> CompileResult<Vec<Pass>> {
        let mut passes = vec![];
        if self.optimizers.preprocessing {
            passes.push(Pass::optimizer(Preprocessing));
        }
        if let Some(max_qubits) = self.optimizers.rearrange {
            passes.push(Pass::optimizer(Rearrange::new(max_qubits)?));
        }
        if let Some(placer) = &self.placer {
            passes.push(Pass::Placer(placer.build()));
        }
        if let Some(router) = &self.router {
            passes.push(Pass::Router(router.build()));
        }
        if self.unroll {
            passes.push(Pass::unroller());
        }
        Ok(passes)
    }

    /// Build the pipeline.
    pub fn build(&self) -> CompileResult<Pipeline> {
        if self.unroll && self.natives.gates().is_empty() {
            return Err(CompileError::InvalidConfiguration(
                "unrolling requires a non-empty native gate set".into(),
            ));
        }
        let mut builder = Pipeline::builder(self.target()?);
        for pass in self.passes()? {
            builder = builder.pass(pass);
        }
        if let Some(verification) = self.verify {
            builder = builder.with_verification(verification);
        }
        builder.build()
    }
}
