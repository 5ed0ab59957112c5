//! Circuit fixtures and router comparison for qpass.
//!
//! - **Fixtures**: seeded random control circuits and the QFT
//! - **Counters**: SWAP, CZ and total gate counts of a circuit
//! - **Comparison**: SWAP-count distributions of shortest-path and SABRE
//!   routing over many seeded random circuits

pub mod circuits;
pub mod compare;
pub mod counts;

pub use circuits::{qft, random_control_circuit};
pub use compare::{ComparisonConfig, ComparisonReport, RouterStats, compare_routers};
pub use counts::{count_cz, count_gates, count_swaps};
