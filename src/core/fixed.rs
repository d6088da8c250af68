//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the actor physics.
//! All operations use integer arithmetic only - no floats in the tick.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 px                         │
//! │  Precision: 1/65536 px                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The playfield is at most 1024 px tall (10-bit registers), so the
//! integer part has plenty of headroom for velocities and clamping.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// GAME CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Gravity: 1 px/tick² = 65536
pub const GRAVITY: Fixed = 65536;

/// Jump strength: 10 px/tick = 10 * 65536 = 655360
pub const JUMP_STRENGTH: Fixed = 655360;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use vga_flappy::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Whole pixels to fixed-point (wrapping).
#[inline]
pub const fn from_px(px: i32) -> Fixed {
    px.wrapping_shl(FIXED_SCALE as u32)
}

/// Fixed-point to whole pixels, rounding toward negative infinity.
#[inline]
pub const fn to_px(f: Fixed) -> i32 {
    f >> FIXED_SCALE
}

/// Narrow a wide intermediate back to `Fixed`, saturating at the i32 range.
#[inline]
pub fn saturate(wide: i64) -> Fixed {
    wide.clamp(i32::MIN as i64, i32::MAX as i64) as Fixed
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

/// Position after `t` ticks of uniform acceleration:
/// `y0 + v0*t + g*t²/2`.
///
/// Computed in i64 so long falls never wrap; the caller clamps.
#[inline]
pub fn kinematic_position(y0: Fixed, v0: Fixed, g: Fixed, t: u32) -> i64 {
    let t = t as i64;
    y0 as i64 + v0 as i64 * t + (g as i64 * t * t) / 2
}

/// Velocity after `t` ticks of uniform acceleration: `v0 + g*t`.
#[inline]
pub fn kinematic_velocity(v0: Fixed, g: Fixed, t: u32) -> Fixed {
    saturate(v0 as i64 + g as i64 * t as i64)
}

// =============================================================================
// TESTS
// =============================================================================
