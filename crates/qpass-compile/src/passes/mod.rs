//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that only look at the circuit
//! - [`target`]: passes that need the device connectivity or native gates

pub mod agnostic;
pub mod target;

pub use agnostic::{
    DEFAULT_VERIFY_TOLERANCE, DEFAULT_VERIFY_TRIALS, Rearrange, check_connectivity, check_native,
    verify_equivalence,
};
pub use target::{
    Preprocessing, RandomPlacer, ReverseTraversalPlacer, SabreHeuristic, SabreRouter,
    ScoreContext, ShortestPathRouter, StarPlacer, StarRouter, SubgraphPlacer, SwapScore,
    TrivialPlacer, Unroller,
};
