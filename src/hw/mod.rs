//! Hardware Module
//!
//! Everything that touches the outside world: the register map of the VGA
//! peripheral, the channel that writes it, and keyboard sources.
//!
//! ## Module Structure
//!
//! - `registers`: Address map and the snapshot codec
//! - `channel`: Register write path (device file or in-memory)
//! - `keyboard`: hidraw reader thread, watch-backed and scripted key sources

pub mod registers;
pub mod channel;
pub mod keyboard;

pub use registers::{RegisterSnapshot, StatusFlags, REGISTER_COUNT};
pub use channel::{open_channel, ChannelError, MemoryChannel, RegisterChannel};
pub use keyboard::{HidrawKeyboard, ScriptedKeys, WatchKeys};
