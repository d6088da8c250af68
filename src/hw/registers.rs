//! Register Map
//!
//! The VGA peripheral exposes 18 byte-wide registers. Wider values are split
//! low/high; 10-bit coordinates keep bits 9..8 in bits 1..0 of the high
//! register. Values that do not fit saturate to the field maximum.
//!
//! ```text
//! 0x00 ACTOR_Y_LO   0x02+4i OBS_X_LO(i)   0x0E SPEED
//! 0x01 ACTOR_Y_HI   0x03+4i OBS_X_HI(i)   0x0F SCORE_HI
//!                   0x04+4i OBS_GAP_LO(i) 0x10 SCORE_LO
//!                   0x05+4i OBS_GAP_HI(i) 0x11 STATUS
//! ```

use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::game::state::{GameState, GameStatus};

// =============================================================================
// ADDRESSES
// =============================================================================

/// Actor y, bits 7..0.
pub const ACTOR_Y_LO: u8 = 0x00;
/// Actor y, bits 9..8.
pub const ACTOR_Y_HI: u8 = 0x01;
/// Obstacle speed.
pub const SPEED: u8 = 0x0E;
/// Score, bits 15..8.
pub const SCORE_HI: u8 = 0x0F;
/// Score, bits 7..0.
pub const SCORE_LO: u8 = 0x10;
/// Status flags.
pub const STATUS: u8 = 0x11;

/// Number of registers in the map.
pub const REGISTER_COUNT: usize = 18;

/// Obstacle register blocks.
pub const OBSTACLE_SLOTS: usize = 3;

/// Largest value a 10-bit coordinate register holds.
pub const FIELD_10BIT_MAX: u16 = 0x3FF;

/// Enabled flag in `OBS_X_HI`.
pub const OBSTACLE_ENABLED: u8 = 0x80;

const OBSTACLE_BASE: u8 = 0x02;
const OBSTACLE_STRIDE: u8 = 4;

/// `OBS_X_LO(i)`.
#[inline]
pub const fn obs_x_lo(i: usize) -> u8 {
    OBSTACLE_BASE + OBSTACLE_STRIDE * i as u8
}

/// `OBS_X_HI(i)`.
#[inline]
pub const fn obs_x_hi(i: usize) -> u8 {
    obs_x_lo(i) + 1
}

/// `OBS_GAP_LO(i)`.
#[inline]
pub const fn obs_gap_lo(i: usize) -> u8 {
    obs_x_lo(i) + 2
}

/// `OBS_GAP_HI(i)`.
#[inline]
pub const fn obs_gap_hi(i: usize) -> u8 {
    obs_x_lo(i) + 3
}

// =============================================================================
// FIELD CODECS
// =============================================================================

/// Saturate a pixel coordinate into the 10-bit register range.
#[inline]
pub fn saturate10(px: i32) -> u16 {
    px.clamp(0, FIELD_10BIT_MAX as i32) as u16
}

/// Split a 10-bit value into (lo, hi). Saturates.
#[inline]
pub fn split10(value: u16) -> (u8, u8) {
    let v = value.min(FIELD_10BIT_MAX);
    ((v & 0xFF) as u8, ((v >> 8) & 0x03) as u8)
}

/// Join (lo, hi) into a 10-bit value. Bits above 1 of `hi` are ignored.
#[inline]
pub fn join10(lo: u8, hi: u8) -> u16 {
    ((hi as u16 & 0x03) << 8) | lo as u16
}

/// Split a 16-bit value into (hi, lo).
#[inline]
pub fn split16(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xFF) as u8)
}

/// Join (hi, lo) into a 16-bit value.
#[inline]
pub fn join16(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

// =============================================================================
// STATUS
// =============================================================================

/// Contents of the STATUS register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// Actor moving upward after an impulse.
    pub const JUMP_ACTIVE: Self = Self(0x01);
    /// Run ended.
    pub const GAME_OVER: Self = Self(0x02);
    /// A reset happened this tick.
    pub const RESET: Self = Self(0x04);
    /// Physics and obstacles active.
    pub const RUNNING: Self = Self(0x08);

    const ALL: u8 = 0x0F;

    /// No flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// From a raw register value; undefined bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Raw register value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// All flags in `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Flags for the current engine state.
    pub fn from_state(state: &GameState) -> Self {
        let mut flags = Self::empty();
        match state.status {
            GameStatus::Ready => {}
            GameStatus::Running => {
                flags.insert(Self::RUNNING);
                if state.actor.is_rising() {
                    flags.insert(Self::JUMP_ACTIVE);
                }
            }
            GameStatus::GameOver => flags.insert(Self::GAME_OVER),
        }
        if state.reset_latched {
            flags.insert(Self::RESET);
        }
        flags
    }
}

impl std::ops::BitOr for StatusFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Register view of one obstacle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleRegisters {
    /// Left edge, 10-bit
    pub x: u16,
    /// Gap top, 10-bit
    pub gap_y: u16,
    /// Drawn and collidable
    pub enabled: bool,
}

/// Everything published to the peripheral after a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    /// Actor top edge, 10-bit
    pub actor_y: u16,
    /// Obstacle blocks; unused slots are disabled
    pub obstacles: [ObstacleRegisters; OBSTACLE_SLOTS],
    /// Current obstacle speed
    pub speed: u8,
    /// Encoded score (binary or BCD per config)
    pub score: u16,
    /// Status flags
    pub status: StatusFlags,
}

impl RegisterSnapshot {
    /// Capture the register view of an engine state.
    pub fn capture(state: &GameState, config: &GameConfig) -> Self {
        let mut obstacles = [ObstacleRegisters::default(); OBSTACLE_SLOTS];
        for (slot, obstacle) in obstacles.iter_mut().zip(&state.obstacles) {
            *slot = ObstacleRegisters {
                x: saturate10(obstacle.x),
                gap_y: saturate10(obstacle.gap_y),
                enabled: obstacle.enabled,
            };
        }

        Self {
            actor_y: saturate10(state.actor.y_px()),
            obstacles,
            speed: state.speed(),
            score: config.score_encoding.encode(state.score),
            status: StatusFlags::from_state(state),
        }
    }

    /// Register file image, indexed by address.
    pub fn encode(&self) -> [u8; REGISTER_COUNT] {
        let mut regs = [0u8; REGISTER_COUNT];

        let (lo, hi) = split10(self.actor_y);
        regs[ACTOR_Y_LO as usize] = lo;
        regs[ACTOR_Y_HI as usize] = hi;

        for (i, o) in self.obstacles.iter().enumerate() {
            let (x_lo, x_hi) = split10(o.x);
            let (gap_lo, gap_hi) = split10(o.gap_y);
            regs[obs_x_lo(i) as usize] = x_lo;
            regs[obs_x_hi(i) as usize] = if o.enabled { x_hi | OBSTACLE_ENABLED } else { x_hi };
            regs[obs_gap_lo(i) as usize] = gap_lo;
            regs[obs_gap_hi(i) as usize] = gap_hi;
        }

        regs[SPEED as usize] = self.speed;
        let (score_hi, score_lo) = split16(self.score);
        regs[SCORE_HI as usize] = score_hi;
        regs[SCORE_LO as usize] = score_lo;
        regs[STATUS as usize] = self.status.bits();

        regs
    }

    /// Decode a register file image.
    pub fn decode(regs: &[u8; REGISTER_COUNT]) -> Self {
        let mut obstacles = [ObstacleRegisters::default(); OBSTACLE_SLOTS];
        for (i, slot) in obstacles.iter_mut().enumerate() {
            let x_hi = regs[obs_x_hi(i) as usize];
            *slot = ObstacleRegisters {
                x: join10(regs[obs_x_lo(i) as usize], x_hi),
                gap_y: join10(regs[obs_gap_lo(i) as usize], regs[obs_gap_hi(i) as usize]),
                enabled: x_hi & OBSTACLE_ENABLED != 0,
            };
        }

        Self {
            actor_y: join10(regs[ACTOR_Y_LO as usize], regs[ACTOR_Y_HI as usize]),
            obstacles,
            speed: regs[SPEED as usize],
            score: join16(regs[SCORE_HI as usize], regs[SCORE_LO as usize]),
            status: StatusFlags::from_bits(regs[STATUS as usize]),
        }
    }
}
