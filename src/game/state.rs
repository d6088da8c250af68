//! Game State Definitions
//!
//! Everything the engine mutates per tick lives in [`GameState`]. There is
//! no process-wide state: the tick loop owns exactly one of these.

use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::fixed::{Fixed, from_px, to_px};
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::collision::{CollisionKind, Envelope};
use crate::game::events::GameEvent;
use crate::game::obstacle::spawn_obstacles;

// =============================================================================
// GAME STATUS
// =============================================================================

/// Engine state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum GameStatus {
    /// Actor idle, no gravity, waiting for the first jump
    #[default]
    Ready,
    /// Physics and obstacles active
    Running,
    /// Frozen until reset
    GameOver,
}

// =============================================================================
// ACTOR
// =============================================================================

/// Start of the current kinematic arc (only used by `Integration::Kinematic`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinematicAnchor {
    /// Position at the impulse
    pub y0: Fixed,
    /// Velocity at the impulse
    pub v0: Fixed,
    /// Ticks since the impulse
    pub ticks: u32,
}

/// The controlled body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Top edge of the envelope (Q16.16 px, y grows downward)
    pub y: Fixed,

    /// Vertical velocity (Q16.16 px/tick, negative is up)
    pub velocity: Fixed,

    /// Left edge of the envelope (px, fixed for the run)
    pub x: i32,

    /// Envelope width (px)
    pub width: i32,

    /// Envelope height (px)
    pub height: i32,

    /// False once a collision ended the run
    pub alive: bool,

    /// Kinematic integration anchor
    pub anchor: KinematicAnchor,
}

impl Actor {
    /// Actor at its configured start position, at rest.
    pub fn new(config: &GameConfig) -> Self {
        let y = from_px(config.actor_start_y);
        Self {
            y,
            velocity: 0,
            x: config.actor_x,
            width: config.actor_width,
            height: config.actor_height,
            alive: true,
            anchor: KinematicAnchor { y0: y, v0: 0, ticks: 0 },
        }
    }

    /// Top edge in whole pixels.
    #[inline]
    pub fn y_px(&self) -> i32 {
        to_px(self.y)
    }

    /// Collision envelope in whole pixels.
    #[inline]
    pub fn envelope(&self) -> Envelope {
        Envelope {
            x: self.x,
            y: self.y_px(),
            width: self.width,
            height: self.height,
        }
    }

    /// Moving upward (used for the jump-active status bit).
    #[inline]
    pub fn is_rising(&self) -> bool {
        self.velocity < 0
    }
}

// =============================================================================
// OBSTACLE
// =============================================================================

/// A scrolling obstacle with a vertical gap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge (px), decreasing over time
    pub x: i32,

    /// Top of the gap window (px)
    pub gap_y: i32,

    /// Height of the gap window (px)
    pub gap_size: i32,

    /// Width (px)
    pub width: i32,

    /// Scroll speed (px/tick)
    pub speed: u8,

    /// Disabled obstacles neither scroll nor collide
    pub enabled: bool,
}

impl Obstacle {
    /// Top bound of the gap window.
    #[inline]
    pub fn gap_top(&self) -> i32 {
        self.gap_y
    }

    /// Bottom bound of the gap window.
    #[inline]
    pub fn gap_bottom(&self) -> i32 {
        self.gap_y + self.gap_size
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete simulation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Ticks stepped since the engine was created
    pub tick: u32,

    /// State machine position
    pub status: GameStatus,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    #[serde(skip)]
    pub rng: DeterministicRng,

    /// The controlled body
    pub actor: Actor,

    /// Fixed-size obstacle set, index order is register order
    pub obstacles: Vec<Obstacle>,

    /// Current score (wraps at the configured ceiling)
    pub score: u32,

    /// Score recorded when the last run ended
    pub final_score: Option<u32>,

    /// What ended the last run
    pub collision: Option<CollisionKind>,

    /// Running ticks in the current run (elapsed scoring)
    pub running_ticks: u32,

    /// Obstacle recycles in the current run
    pub recycles: u32,

    /// Difficulty steps taken in the current run
    pub difficulty_level: u32,

    /// Set on the tick a reset happened, cleared on the next
    pub reset_latched: bool,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh state in `Ready`.
    pub fn new(config: &GameConfig, rng_seed: u64) -> Self {
        let mut rng = DeterministicRng::new(rng_seed);
        let obstacles = spawn_obstacles(config, &mut rng);

        Self {
            tick: 0,
            status: GameStatus::Ready,
            rng_seed,
            rng,
            actor: Actor::new(config),
            obstacles,
            score: 0,
            final_score: None,
            collision: None,
            running_ticks: 0,
            recycles: 0,
            difficulty_level: 0,
            reset_latched: false,
            pending_events: Vec::new(),
        }
    }

    /// Return actor, obstacles and score to their initial configuration.
    ///
    /// The RNG keeps its sequence so consecutive runs get different gaps.
    pub fn reinitialize(&mut self, config: &GameConfig) {
        self.actor = Actor::new(config);
        self.obstacles = spawn_obstacles(config, &mut self.rng);
        self.score = 0;
        self.collision = None;
        self.running_ticks = 0;
        self.recycles = 0;
        self.difficulty_level = 0;
        self.status = GameStatus::Ready;
        self.reset_latched = true;
    }

    /// Add an event to pending list.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Current obstacle speed (the first enabled obstacle's).
    pub fn speed(&self) -> u8 {
        self.obstacles
            .iter()
            .find(|o| o.enabled)
            .map(|o| o.speed)
            .unwrap_or(0)
    }

    /// Compute deterministic hash of simulation state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u8(self.status as u8);

            hasher.update_fixed(self.actor.y);
            hasher.update_fixed(self.actor.velocity);
            hasher.update_bool(self.actor.alive);
            hasher.update_fixed(self.actor.anchor.y0);
            hasher.update_fixed(self.actor.anchor.v0);
            hasher.update_u32(self.actor.anchor.ticks);

            hasher.update_u32(self.obstacles.len() as u32);
            for obstacle in &self.obstacles {
                hasher.update_i32(obstacle.x);
                hasher.update_i32(obstacle.gap_y);
                hasher.update_u8(obstacle.speed);
                hasher.update_bool(obstacle.enabled);
            }

            hasher.update_u32(self.score);
            hasher.update_u32(self.running_ticks);
            hasher.update_u32(self.recycles);
            hasher.update_u32(self.difficulty_level);

            let rng_state = self.rng.state();
            hasher.update_u64(rng_state[0]);
            hasher.update_u64(rng_state[1]);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready() {
        let config = GameConfig::default();
        let state = GameState::new(&config, 42);

        assert_eq!(state.status, GameStatus::Ready);
        assert_eq!(state.actor.y_px(), 240);
        assert_eq!(state.actor.velocity, 0);
        assert!(state.actor.alive);
        assert_eq!(state.obstacles.len(), 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.speed(), 2);
    }

    #[test]
    fn test_obstacle_gap_bounds() {
        let o = Obstacle { x: 300, gap_y: 120, gap_size: 150, width: 50, speed: 2, enabled: true };
        assert_eq!(o.gap_top(), 120);
        assert_eq!(o.gap_bottom(), 270);
        assert_eq!(o.right(), 350);
    }

    #[test]
    fn test_hash_tracks_state() {
        let config = GameConfig::default();
        let a = GameState::new(&config, 1);
        let mut b = GameState::new(&config, 1);
        assert_eq!(a.compute_hash(), b.compute_hash());

        b.actor.velocity = 5;
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_reinitialize() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 9);
        state.status = GameStatus::GameOver;
        state.score = 17;
        state.actor.y = 0;
        state.actor.alive = false;
        state.obstacles[0].speed = 6;

        state.reinitialize(&config);

        assert_eq!(state.status, GameStatus::Ready);
        assert_eq!(state.score, 0);
        assert!(state.actor.alive);
        assert_eq!(state.actor.y_px(), config.actor_start_y);
        assert!(state.obstacles.iter().all(|o| o.speed == config.initial_speed));
        assert!(state.reset_latched);
    }
}
