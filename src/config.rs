//! Configuration
//!
//! `GameConfig` drives the simulation, `RuntimeConfig` the loop around it.
//! Both load from one JSON file; every field has a default so a partial
//! file (or none at all) is valid. Geometry that would make the game
//! unwinnable or unencodable is rejected here, before the loop starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, GRAVITY, JUMP_STRENGTH};
use crate::game::input::KeyBindings;
use crate::hw::registers::{FIELD_10BIT_MAX, OBSTACLE_SLOTS};

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV: &str = "VGA_FLAPPY_CONFIG";

// =============================================================================
// POLICIES
// =============================================================================

/// How gravity is integrated each Running tick.
///
/// The two strategies produce different trajectories for the same
/// constants and are never mixed within a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// `velocity += gravity; position += velocity`
    #[default]
    Incremental,
    /// `position = y0 + v0*t + g*t²/2`, with `t` ticks since the last impulse
    Kinematic,
}

/// What earns a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// One point per `ticks_per_point` Running ticks
    #[default]
    Elapsed,
    /// One point each time an obstacle's trailing edge passes the actor
    ObstaclePass,
}

/// Register encoding of the score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreEncoding {
    /// Plain 16-bit binary
    #[default]
    Binary,
    /// Four packed BCD digits, for seven-segment style score displays
    Bcd,
}

impl ScoreEncoding {
    /// Largest score ceiling the encoding can represent (exclusive).
    pub fn max_ceiling(self) -> u32 {
        match self {
            ScoreEncoding::Binary => 1 << 16,
            ScoreEncoding::Bcd => 10_000,
        }
    }

    /// Encode a score into the 16-bit register value.
    pub fn encode(self, score: u32) -> u16 {
        match self {
            ScoreEncoding::Binary => score.min(u16::MAX as u32) as u16,
            ScoreEncoding::Bcd => {
                let mut s = score.min(9999);
                let mut out = 0u16;
                for shift in [0, 4, 8, 12] {
                    out |= ((s % 10) as u16) << shift;
                    s /= 10;
                }
                out
            }
        }
    }

    /// Decode a 16-bit register value back into a score.
    pub fn decode(self, raw: u16) -> u32 {
        match self {
            ScoreEncoding::Binary => raw as u32,
            ScoreEncoding::Bcd => {
                let mut score = 0u32;
                for shift in [12, 8, 4, 0] {
                    score = score * 10 + ((raw >> shift) & 0xF) as u32;
                }
                score
            }
        }
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// Simulation parameters. Pixel units, y grows downward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield width (px)
    pub field_width: i32,
    /// Playfield height (px)
    pub field_height: i32,

    /// Fixed horizontal position of the actor's left edge
    pub actor_x: i32,
    /// Actor envelope width
    pub actor_width: i32,
    /// Actor envelope height
    pub actor_height: i32,
    /// Actor top edge on reset
    pub actor_start_y: i32,

    /// Gravity per tick (Q16.16 px/tick²)
    pub gravity: Fixed,
    /// Upward impulse magnitude (Q16.16 px/tick)
    pub jump_strength: Fixed,
    /// Integration strategy
    pub integration: Integration,

    /// Concurrent obstacles (1..=3)
    pub obstacle_count: usize,
    /// Obstacle width
    pub obstacle_width: i32,
    /// Horizontal distance between consecutive obstacles at spawn
    pub obstacle_spacing: i32,
    /// Respawn x-coordinate
    pub spawn_x: i32,
    /// Obstacles at or left of this x are recycled
    pub left_boundary: i32,
    /// Gap window height
    pub gap_size: i32,
    /// Lowest allowed gap top
    pub gap_min: i32,
    /// Highest allowed gap top
    pub gap_max: i32,
    /// Scroll speed at the start of a run (px/tick)
    pub initial_speed: u8,
    /// Speed cap
    pub max_speed: u8,
    /// Points between difficulty steps
    pub difficulty_interval: u32,

    /// Scoring policy
    pub scoring: ScoringPolicy,
    /// Running ticks per point under `ScoringPolicy::Elapsed`
    pub ticks_per_point: u32,
    /// Score wraps to zero on reaching this value
    pub score_ceiling: u32,
    /// Score register encoding
    pub score_encoding: ScoreEncoding,

    /// Key bindings
    pub keys: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 640,
            field_height: 480,

            actor_x: 100,
            actor_width: 30,
            actor_height: 20,
            actor_start_y: 240,

            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            integration: Integration::Incremental,

            obstacle_count: 3,
            obstacle_width: 50,
            obstacle_spacing: 120,
            spawn_x: 640,
            left_boundary: 0,
            gap_size: 150,
            gap_min: 100,
            gap_max: 200,
            initial_speed: 2,
            max_speed: 8,
            difficulty_interval: 10,

            scoring: ScoringPolicy::Elapsed,
            ticks_per_point: 60,
            score_ceiling: 10_000,
            score_encoding: ScoreEncoding::Binary,

            keys: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    /// Top-edge position at which the actor touches the field's top.
    pub fn lower_bound(&self) -> i32 {
        0
    }

    /// Top-edge position at which the actor touches the field's bottom.
    pub fn upper_bound(&self) -> i32 {
        self.field_height - self.actor_height
    }

    /// Spawn x of obstacle `index` at the start of a run.
    pub fn initial_obstacle_x(&self, index: usize) -> i32 {
        self.spawn_x + self.obstacle_spacing * index as i32
    }

    /// Reject configurations that cannot be simulated or encoded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = FIELD_10BIT_MAX as i32;

        if self.field_width <= 0 || self.field_height <= 0
            || self.field_width > max + 1 || self.field_height > max + 1
        {
            return Err(ConfigError::Field {
                width: self.field_width,
                height: self.field_height,
            });
        }

        // Every coordinate and size must fit a 10-bit register before any
        // sum below is formed.
        for (name, value) in [
            ("actor_x", self.actor_x),
            ("actor_width", self.actor_width),
            ("actor_height", self.actor_height),
            ("actor_start_y", self.actor_start_y),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_spacing", self.obstacle_spacing),
            ("spawn_x", self.spawn_x),
            ("left_boundary", self.left_boundary),
            ("gap_size", self.gap_size),
            ("gap_min", self.gap_min),
            ("gap_max", self.gap_max),
        ] {
            if !(0..=max + 1).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        if self.actor_width <= 0 || self.actor_height <= 0
            || self.actor_x < 0 || self.actor_x + self.actor_width > self.field_width
        {
            return Err(ConfigError::Actor("envelope outside the field"));
        }
        if self.actor_start_y <= self.lower_bound() || self.actor_start_y >= self.upper_bound() {
            return Err(ConfigError::Actor("start position touches a field bound"));
        }

        if self.gravity < 0 {
            return Err(ConfigError::Physics("gravity must not be negative"));
        }
        if self.jump_strength <= 0 {
            return Err(ConfigError::Physics("jump strength must be positive"));
        }

        if self.obstacle_count == 0 || self.obstacle_count > OBSTACLE_SLOTS {
            return Err(ConfigError::ObstacleCount(self.obstacle_count));
        }
        if self.obstacle_width <= 0 || self.obstacle_spacing < 0 {
            return Err(ConfigError::Obstacle("width must be positive and spacing non-negative"));
        }
        if self.left_boundary < 0 || self.spawn_x <= self.left_boundary {
            return Err(ConfigError::Obstacle("spawn x must lie right of a non-negative left boundary"));
        }
        let furthest = self.initial_obstacle_x(self.obstacle_count - 1);
        if furthest > max {
            return Err(ConfigError::SpawnOutOfRange { x: furthest });
        }

        if self.gap_min < 0 || self.gap_min > self.gap_max {
            return Err(ConfigError::GapBand {
                min: self.gap_min,
                max: self.gap_max,
            });
        }
        if self.gap_max + self.gap_size > self.field_height {
            return Err(ConfigError::GapOutsideField {
                max: self.gap_max,
                size: self.gap_size,
                height: self.field_height,
            });
        }
        if self.gap_size <= self.actor_height {
            return Err(ConfigError::GapTooSmall {
                gap: self.gap_size,
                actor: self.actor_height,
            });
        }

        if self.initial_speed == 0 || self.initial_speed > self.max_speed {
            return Err(ConfigError::Speed {
                initial: self.initial_speed,
                max: self.max_speed,
            });
        }
        // A faster obstacle could step from one side of the actor to the
        // other without any tick overlapping it.
        let window = self.obstacle_width + self.actor_width;
        if i32::from(self.max_speed) > window {
            return Err(ConfigError::SpeedSkipsActor {
                max: self.max_speed,
                window,
            });
        }
        if self.difficulty_interval == 0 {
            return Err(ConfigError::ZeroInterval("difficulty_interval"));
        }
        if self.ticks_per_point == 0 {
            return Err(ConfigError::ZeroInterval("ticks_per_point"));
        }

        if self.score_ceiling == 0 || self.score_ceiling > self.score_encoding.max_ceiling() {
            return Err(ConfigError::ScoreCeiling {
                ceiling: self.score_ceiling,
                encoding: self.score_encoding,
            });
        }

        let k = self.keys;
        if k.jump == 0 || k.reset == 0 || k.quit == 0
            || k.jump == k.reset || k.jump == k.quit || k.reset == k.quit
        {
            return Err(ConfigError::Keys(k));
        }

        Ok(())
    }
}

// =============================================================================
// RUNTIME CONFIG
// =============================================================================

/// Spacing of consecutive registers on the bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStride {
    /// Byte-addressed registers
    #[default]
    Byte,
    /// One register per 32-bit word
    Word,
}

impl RegisterStride {
    /// Bytes between consecutive register addresses.
    pub fn bytes(self) -> u64 {
        match self {
            RegisterStride::Byte => 1,
            RegisterStride::Word => 4,
        }
    }
}

/// Where register writes go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelConfig {
    /// Positioned I/O on a device file (`/dev/mem` or a driver node).
    Device {
        /// Device path
        path: PathBuf,
        /// Byte offset of register 0 within the file
        base: u64,
        /// Register spacing
        #[serde(default)]
        stride: RegisterStride,
    },
    /// In-process register file (dry runs without hardware).
    Memory,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig::Device {
            path: PathBuf::from("/dev/mem"),
            // Lightweight HPS-to-FPGA bridge
            base: 0xFF20_0000,
            stride: RegisterStride::Byte,
        }
    }
}

/// Loop and device parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Ticks per second
    pub tick_rate_hz: u32,
    /// hidraw node of the keyboard
    pub input_device: PathBuf,
    /// Input poll timeout (ms)
    pub poll_timeout_ms: u64,
    /// Register channel
    pub channel: ChannelConfig,
    /// Fixed RNG seed; derived from the start time when absent
    pub seed: Option<u64>,
    /// Save the input recording here on exit
    pub recording_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            input_device: PathBuf::from("/dev/hidraw0"),
            poll_timeout_ms: 1,
            channel: ChannelConfig::default(),
            seed: None,
            recording_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Duration of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_rate_hz.max(1) as u64)
    }

    /// Input poll timeout.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Reject loop parameters that would stall or spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(ConfigError::TickRate(self.tick_rate_hz));
        }
        if self.poll_timeout() >= self.tick_duration() {
            return Err(ConfigError::PollTimeout {
                timeout_ms: self.poll_timeout_ms,
                tick_rate_hz: self.tick_rate_hz,
            });
        }
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Top-level config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulation parameters
    pub game: GameConfig,
    /// Loop parameters
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    /// Parse from JSON text and validate.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Validate both halves and the parameters they share.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        self.runtime.validate()?;

        // Elapsed scoring awards one point per wall-clock second.
        if self.game.scoring == ScoringPolicy::Elapsed
            && self.game.ticks_per_point != self.runtime.tick_rate_hz
        {
            return Err(ConfigError::ScoringPace {
                ticks_per_point: self.game.ticks_per_point,
                tick_rate_hz: self.runtime.tick_rate_hz,
            });
        }
        Ok(())
    }
}

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file unreadable.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Field dimensions outside the 10-bit register range.
    #[error("field {width}x{height} must be positive and at most 1024 px per side")]
    Field {
        /// Configured width
        width: i32,
        /// Configured height
        height: i32,
    },

    /// A coordinate or size outside `0..=1024`.
    #[error("{name} = {value} outside 0..=1024")]
    OutOfRange {
        /// Config field name
        name: &'static str,
        /// Configured value
        value: i32,
    },

    /// Actor geometry invalid.
    #[error("actor: {0}")]
    Actor(&'static str),

    /// Physics constants invalid.
    #[error("physics: {0}")]
    Physics(&'static str),

    /// Obstacle count outside 1..=3.
    #[error("obstacle count {0} outside 1..=3")]
    ObstacleCount(usize),

    /// Obstacle geometry invalid.
    #[error("obstacles: {0}")]
    Obstacle(&'static str),

    /// Initial obstacle position does not fit the 10-bit x register.
    #[error("obstacle spawn x {x} exceeds the 10-bit register range")]
    SpawnOutOfRange {
        /// Spawn x of the furthest obstacle
        x: i32,
    },

    /// Gap band empty or negative.
    #[error("gap band [{min}, {max}] is empty or negative")]
    GapBand {
        /// Lowest gap top
        min: i32,
        /// Highest gap top
        max: i32,
    },

    /// Gap window can extend past the bottom of the field.
    #[error("gap top {max} + gap {size} exceeds field height {height}")]
    GapOutsideField {
        /// Highest gap top
        max: i32,
        /// Gap window height
        size: i32,
        /// Field height
        height: i32,
    },

    /// Gap too small for the actor to pass.
    #[error("gap {gap} px does not fit actor height {actor} px")]
    GapTooSmall {
        /// Gap window height
        gap: i32,
        /// Actor height
        actor: i32,
    },

    /// Speeds inconsistent.
    #[error("initial speed {initial} must be in 1..=max speed {max}")]
    Speed {
        /// Initial speed
        initial: u8,
        /// Speed cap
        max: u8,
    },

    /// Speed cap lets an obstacle pass the actor between two ticks.
    #[error("max speed {max} exceeds the {window} px overlap window")]
    SpeedSkipsActor {
        /// Speed cap
        max: u8,
        /// Obstacle width plus actor width
        window: i32,
    },

    /// Interval of zero.
    #[error("{0} must be non-zero")]
    ZeroInterval(&'static str),

    /// Score ceiling not representable.
    #[error("score ceiling {ceiling} not representable with {encoding:?} encoding")]
    ScoreCeiling {
        /// Configured ceiling
        ceiling: u32,
        /// Configured encoding
        encoding: ScoreEncoding,
    },

    /// Key bindings missing or overlapping.
    #[error("key bindings must be distinct and non-zero: {0:?}")]
    Keys(KeyBindings),

    /// Tick rate outside 1..=1000 Hz.
    #[error("tick rate {0} Hz outside 1..=1000")]
    TickRate(u32),

    /// Poll timeout would consume the whole tick.
    #[error("poll timeout {timeout_ms} ms does not fit a {tick_rate_hz} Hz tick")]
    PollTimeout {
        /// Poll timeout (ms)
        timeout_ms: u64,
        /// Tick rate
        tick_rate_hz: u32,
    },

    /// Elapsed scoring would not award one point per second.
    #[error("ticks_per_point {ticks_per_point} must equal tick rate {tick_rate_hz} Hz under elapsed scoring")]
    ScoringPace {
        /// Running ticks per point
        ticks_per_point: u32,
        /// Tick rate
        tick_rate_hz: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(
            r#"{ "game": { "obstacle_count": 2, "scoring": "obstacle_pass" },
                 "runtime": { "channel": { "kind": "memory" }, "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.game.obstacle_count, 2);
        assert_eq!(config.game.scoring, ScoringPolicy::ObstaclePass);
        assert_eq!(config.game.gap_size, 150);
        assert_eq!(config.runtime.channel, ChannelConfig::Memory);
        assert_eq!(config.runtime.seed, Some(7));
        assert_eq!(config.runtime.tick_rate_hz, 60);
    }

    #[test]
    fn test_device_channel_json() {
        let config = AppConfig::from_json(
            r#"{ "runtime": { "channel": { "kind": "device", "path": "/dev/vga_ball", "base": 0, "stride": "word" } } }"#,
        )
        .unwrap();
        assert_eq!(
            config.runtime.channel,
            ChannelConfig::Device {
                path: PathBuf::from("/dev/vga_ball"),
                base: 0,
                stride: RegisterStride::Word,
            }
        );
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(AppConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_gap_band_rejected() {
        let config = GameConfig { gap_min: 250, gap_max: 200, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::GapBand { .. })));

        let config = GameConfig { gap_max: 400, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::GapOutsideField { .. })));

        let config = GameConfig { gap_size: 20, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::GapTooSmall { .. })));
    }

    #[test]
    fn test_obstacle_limits_rejected() {
        let config = GameConfig { obstacle_count: 0, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ObstacleCount(0))));

        let config = GameConfig { obstacle_count: 4, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ObstacleCount(4))));

        // 640 + 2 * 200 = 1040 does not fit 10 bits
        let config = GameConfig { obstacle_spacing: 200, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::SpawnOutOfRange { x: 1040 })));
    }

    #[test]
    fn test_speed_and_score_rejected() {
        let config = GameConfig { initial_speed: 9, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Speed { .. })));

        let config = GameConfig {
            score_encoding: ScoreEncoding::Bcd,
            score_ceiling: 20_000,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ScoreCeiling { .. })));
    }

    #[test]
    fn test_extreme_geometry_rejected_without_overflow() {
        let configs = [
            GameConfig { gap_size: i32::MAX, ..GameConfig::default() },
            GameConfig { gap_max: i32::MAX, ..GameConfig::default() },
            GameConfig { actor_width: i32::MAX, ..GameConfig::default() },
            GameConfig { actor_x: i32::MAX, ..GameConfig::default() },
            GameConfig { obstacle_spacing: i32::MAX, ..GameConfig::default() },
            GameConfig { spawn_x: i32::MAX, ..GameConfig::default() },
            GameConfig { left_boundary: i32::MIN, ..GameConfig::default() },
        ];
        for config in configs {
            assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));
        }

        let config = GameConfig { obstacle_width: 1025, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { name: "obstacle_width", value: 1025 })
        ));
    }

    #[test]
    fn test_speed_that_skips_actor_rejected() {
        // 50 px obstacle + 30 px actor
        let config = GameConfig { max_speed: 81, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpeedSkipsActor { max: 81, window: 80 })
        ));

        let config = GameConfig { max_speed: 80, ..GameConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_elapsed_scoring_follows_tick_rate() {
        let mut config = AppConfig::default();
        config.runtime.tick_rate_hz = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScoringPace { ticks_per_point: 60, tick_rate_hz: 30 })
        ));

        config.game.ticks_per_point = 30;
        assert!(config.validate().is_ok());

        // Obstacle-pass scoring does not count ticks
        config.game.scoring = ScoringPolicy::ObstaclePass;
        config.game.ticks_per_point = 60;
        assert!(config.validate().is_ok());

        assert!(AppConfig::from_json(r#"{ "runtime": { "tick_rate_hz": 50 } }"#).is_err());
        assert!(AppConfig::from_json(
            r#"{ "game": { "ticks_per_point": 50 }, "runtime": { "tick_rate_hz": 50 } }"#
        )
        .is_ok());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let keys = KeyBindings { jump: 0x2C, reset: 0x2C, quit: 0x29 };
        let config = GameConfig { keys, ..GameConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Keys(_))));
    }

    #[test]
    fn test_runtime_limits() {
        let rt = RuntimeConfig { tick_rate_hz: 0, ..RuntimeConfig::default() };
        assert!(matches!(rt.validate(), Err(ConfigError::TickRate(0))));

        let rt = RuntimeConfig { poll_timeout_ms: 20, ..RuntimeConfig::default() };
        assert!(matches!(rt.validate(), Err(ConfigError::PollTimeout { .. })));

        assert_eq!(RuntimeConfig::default().tick_duration(), Duration::from_micros(16_666));
    }

    #[test]
    fn test_bcd_encoding() {
        let bcd = ScoreEncoding::Bcd;
        assert_eq!(bcd.encode(0), 0x0000);
        assert_eq!(bcd.encode(1234), 0x1234);
        assert_eq!(bcd.encode(907), 0x0907);
        assert_eq!(bcd.decode(0x0907), 907);
        for score in 0..10_000 {
            assert_eq!(bcd.decode(bcd.encode(score)), score);
        }
        assert_eq!(ScoreEncoding::Binary.encode(70_000), u16::MAX);
    }
}
