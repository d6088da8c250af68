//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Key snapshots, jump/reset/quit edge detection, recordings
//! - `state`: Actor, obstacles, run status
//! - `tick`: Authoritative simulation step and the engine that owns it
//! - `collision`: Envelope vs obstacle tests
//! - `obstacle`: Scrolling, respawn and difficulty
//! - `events`: Game events for logging and replay verification

pub mod input;
pub mod state;
pub mod tick;
pub mod collision;
pub mod obstacle;
pub mod events;

// Re-export key types
pub use input::{InputFrame, InputRecording, InputSampler, KeyBindings, KeySnapshot, KeySource};
pub use state::{Actor, GameState, GameStatus, Obstacle};
pub use tick::{GameEngine, TickResult};
pub use collision::CollisionKind;
pub use events::{GameEvent, GameEventData};
