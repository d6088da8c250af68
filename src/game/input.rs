//! Input Capture and Normalization
//!
//! Turns raw keyboard snapshots into the three signals the engine consumes
//! (jump, reset, quit) and records them per tick for replay.

use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::trace;

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// KEY SNAPSHOTS
// =============================================================================

/// Number of concurrently pressed key codes in a boot-protocol report.
pub const KEY_SLOTS: usize = 6;

/// Size of a USB HID boot-protocol keyboard report.
pub const BOOT_REPORT_LEN: usize = 8;

/// Keys held down at the moment of one poll.
///
/// Mirrors the USB boot keyboard report: a modifier byte plus up to six
/// concurrently pressed usage codes. Code 0 marks an empty slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySnapshot {
    /// Modifier bitmask (ctrl/shift/alt/gui, left and right).
    pub modifiers: u8,
    /// Pressed key usage codes.
    pub keys: [u8; KEY_SLOTS],
}

impl KeySnapshot {
    /// No keys pressed.
    pub const EMPTY: Self = Self { modifiers: 0, keys: [0; KEY_SLOTS] };

    /// Build a snapshot from a list of pressed codes (extra codes are dropped).
    pub fn pressed(codes: &[u8]) -> Self {
        let mut keys = [0u8; KEY_SLOTS];
        for (slot, code) in keys.iter_mut().zip(codes) {
            *slot = *code;
        }
        Self { modifiers: 0, keys }
    }

    /// Parse an 8-byte boot-protocol report: `[modifiers, reserved, k0..k5]`.
    pub fn from_boot_report(report: &[u8]) -> Result<Self, InputError> {
        if report.len() < BOOT_REPORT_LEN {
            return Err(InputError::ShortReport(report.len()));
        }
        let mut keys = [0u8; KEY_SLOTS];
        keys.copy_from_slice(&report[2..BOOT_REPORT_LEN]);
        Ok(Self { modifiers: report[0], keys })
    }

    /// True if `code` appears in any slot.
    #[inline]
    pub fn contains(&self, code: u8) -> bool {
        code != 0 && self.keys.contains(&code)
    }

    /// True if no key is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.iter().all(|&k| k == 0)
    }
}

/// Key codes bound to the engine's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Jump (level-triggered). Default: space (0x2C).
    pub jump: u8,
    /// Reset (edge-triggered). Default: enter (0x28).
    pub reset: u8,
    /// Quit (edge-triggered). Default: escape (0x29).
    pub quit: u8,
}

impl KeyBindings {
    /// USB usage code for the space bar.
    pub const SPACE: u8 = 0x2C;
    /// USB usage code for enter.
    pub const ENTER: u8 = 0x28;
    /// USB usage code for escape.
    pub const ESCAPE: u8 = 0x29;
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            jump: Self::SPACE,
            reset: Self::ENTER,
            quit: Self::ESCAPE,
        }
    }
}

// =============================================================================
// INPUT SOURCE
// =============================================================================

/// Input acquisition errors.
///
/// None of these reach the tick loop: the sampler turns them into an
/// all-false frame.
#[derive(Debug, Error)]
pub enum InputError {
    /// Nothing arrived within the poll timeout.
    #[error("input poll timed out")]
    Timeout,

    /// The producing side went away (device unplugged, worker exited).
    #[error("input source disconnected")]
    Disconnected,

    /// Report shorter than a boot-protocol report.
    #[error("short keyboard report: {0} bytes")]
    ShortReport(usize),

    /// Could not open the input device.
    #[error("failed to open input device {path}: {source}")]
    Open {
        /// Device path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Read failure on an open device.
    #[error("input read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can hand out the currently pressed keys.
pub trait KeySource {
    /// Return the latest key snapshot, waiting at most `timeout`.
    fn poll_keys(&mut self, timeout: Duration) -> Result<KeySnapshot, InputError>;
}

impl<S: KeySource + ?Sized> KeySource for Box<S> {
    fn poll_keys(&mut self, timeout: Duration) -> Result<KeySnapshot, InputError> {
        (**self).poll_keys(timeout)
    }
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Normalized input for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Action flags (packed bits):
    /// - Bit 0: Jump held
    /// - Bit 1: Reset pressed this tick
    /// - Bit 2: Quit pressed this tick
    /// - Bit 3-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x01;

    /// Reset flag bit
    pub const FLAG_RESET: u8 = 0x02;

    /// Quit flag bit
    pub const FLAG_QUIT: u8 = 0x04;

    /// Create a new empty input frame.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame with only jump set.
    pub const fn jump() -> Self {
        Self { flags: Self::FLAG_JUMP }
    }

    /// Frame with only reset set.
    pub const fn reset() -> Self {
        Self { flags: Self::FLAG_RESET }
    }

    /// Frame with only quit set.
    pub const fn quit() -> Self {
        Self { flags: Self::FLAG_QUIT }
    }

    /// Check if jump is requested this frame.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Check if reset is requested this frame.
    #[inline]
    pub fn reset_pressed(&self) -> bool {
        self.flags & Self::FLAG_RESET != 0
    }

    /// Check if quit is requested this frame.
    #[inline]
    pub fn quit_pressed(&self) -> bool {
        self.flags & Self::FLAG_QUIT != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Set jump flag.
    #[inline]
    pub fn set_jump(&mut self, pressed: bool) {
        self.set_flag(Self::FLAG_JUMP, pressed);
    }

    /// Set reset flag.
    #[inline]
    pub fn set_reset(&mut self, pressed: bool) {
        self.set_flag(Self::FLAG_RESET, pressed);
    }

    /// Set quit flag.
    #[inline]
    pub fn set_quit(&mut self, pressed: bool) {
        self.set_flag(Self::FLAG_QUIT, pressed);
    }

    #[inline]
    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}

// =============================================================================
// INPUT SAMPLER
// =============================================================================

/// Polls a [`KeySource`] and normalizes the snapshot into an [`InputFrame`].
///
/// Jump is level-triggered: holding the key keeps requesting a jump.
/// Reset and quit fire only on the poll where their code first appears,
/// compared against the last snapshot that was successfully acquired.
pub struct InputSampler<S> {
    source: S,
    keys: KeyBindings,
    previous: KeySnapshot,
}

impl<S: KeySource> InputSampler<S> {
    /// Create a sampler over `source` with the given bindings.
    pub fn new(source: S, keys: KeyBindings) -> Self {
        Self {
            source,
            keys,
            previous: KeySnapshot::EMPTY,
        }
    }

    /// Poll once. Never fails: an unavailable snapshot is an idle frame.
    pub fn poll(&mut self, timeout: Duration) -> InputFrame {
        let snapshot = match self.source.poll_keys(timeout) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                trace!("No input snapshot: {}", e);
                return InputFrame::new();
            }
        };

        let mut frame = InputFrame::new();
        frame.set_jump(snapshot.contains(self.keys.jump));
        frame.set_reset(
            snapshot.contains(self.keys.reset) && !self.previous.contains(self.keys.reset),
        );
        frame.set_quit(
            snapshot.contains(self.keys.quit) && !self.previous.contains(self.keys.quit),
        );

        self.previous = snapshot;
        frame
    }

    /// Bindings in use.
    pub fn bindings(&self) -> KeyBindings {
        self.keys
    }

    /// Borrow the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Delta-compressed input entry.
///
/// Only stored when input CHANGES (not every tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u32, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

/// Complete input recording for one run.
///
/// Together with the seed this reproduces the run exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// RNG seed used for this run
    pub rng_seed: u64,

    /// Starting tick (usually 1, the first stepped tick)
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    /// Delta-compressed input data.
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            start_tick: 1,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta::new(tick, frame));
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick.
    pub fn get_input_at(&self, tick: u32) -> InputFrame {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Get all deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Create iterator over all inputs for replay.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }

    /// Hash of the recorded inputs.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_recording();
        hasher.update_u64(self.rng_seed);
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.frame.flags);
        }
        hasher.finalize()
    }

    /// Serialize with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        let mut recording: Self = bincode::deserialize(bytes)?;
        recording.last_frame = recording
            .deltas
            .last()
            .map(|d| d.frame)
            .unwrap_or_default();
        Ok(recording)
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick <= self.current_tick {
                self.current_frame = delta.frame;
                self.delta_idx += 1;
            } else {
                break;
            }
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
