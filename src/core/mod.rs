//! Core deterministic primitives.
//!
//! Fixed-point math, seeded randomness and state hashing. Nothing in here
//! touches the clock or the hardware, so a run can be replayed exactly.

pub mod fixed;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
