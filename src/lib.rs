//! # VGA Flappy Controller
//!
//! Deterministic side-scroller control loop for an FPGA VGA peripheral.
//! The game runs here; the fabric only draws what the register file says.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      VGA FLAPPY                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Key snapshots, edge detection, recording  │
//! │  ├── state.rs    - Actor, obstacles, run status              │
//! │  ├── tick.rs     - Authoritative simulation step             │
//! │  ├── collision.rs- Envelope vs obstacle tests                │
//! │  ├── obstacle.rs - Scrolling, respawn, difficulty            │
//! │  └── events.rs   - Game events                               │
//! │                                                              │
//! │  hw/             - Hardware (non-deterministic)              │
//! │  ├── registers.rs- Register map and snapshot codec           │
//! │  ├── channel.rs  - Register write path                       │
//! │  └── keyboard.rs - hidraw reader thread                      │
//! │                                                              │
//! │  config.rs       - JSON configuration and validation         │
//! │  runtime.rs      - Fixed-rate tick loop                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same config, seed and input frames, a run replays exactly
//! and ends with the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod hw;
pub mod config;
pub mod runtime;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::rng::DeterministicRng;
pub use config::{AppConfig, GameConfig, RuntimeConfig};
pub use game::input::{InputFrame, InputRecording};
pub use game::state::{GameState, GameStatus};
pub use game::tick::GameEngine;
pub use hw::registers::RegisterSnapshot;
pub use runtime::{LoopSummary, TickLoop};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
