//! Target-specific compilation passes.
//!
//! These passes read the device connectivity or native gate set and turn a
//! logical circuit into one the device can execute.

pub mod layout;
pub mod preprocessing;
pub mod routing;
pub mod unroller;

pub use layout::{RandomPlacer, ReverseTraversalPlacer, StarPlacer, SubgraphPlacer, TrivialPlacer};
pub use preprocessing::Preprocessing;
pub use routing::{
    SabreHeuristic, SabreRouter, ScoreContext, ShortestPathRouter, StarRouter, SwapScore,
};
pub use unroller::Unroller;
