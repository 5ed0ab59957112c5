//! Target-agnostic passes and checks.
//!
//! These operate on the circuit alone and are safe to run on any circuit
//! regardless of the device.

pub mod rearrange;
pub mod verification;

pub use rearrange::Rearrange;
pub use verification::{
    DEFAULT_VERIFY_TOLERANCE, DEFAULT_VERIFY_TRIALS, check_connectivity, check_native,
    verify_equivalence,
};
