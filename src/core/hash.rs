//! State Hashing for Verification
//!
//! Provides deterministic hashing of engine state for:
//! - Replay validation (recorded inputs must reproduce the same run)
//! - Comparing a board run against a workstation run

use sha2::{Sha256, Digest};
use super::fixed::Fixed;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for engine state.
///
/// Wraps SHA-256 with helpers for fixed-point types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for engine state.
    pub fn for_engine_state() -> Self {
        Self::new(b"VGA_FLAPPY_STATE_V1")
    }

    /// Create hasher for an input recording.
    pub fn for_input_recording() -> Self {
        Self::new(b"VGA_FLAPPY_INPUTS_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Fixed value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i32(value);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for run verification.
///
/// This function is called by `GameEngine::compute_hash()`.
/// The closure adds the engine-specific fields.
pub fn compute_state_hash<F>(tick: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_engine_state();

    // Always hash tick and seed first
    hasher.update_u32(tick);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
