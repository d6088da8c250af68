//! Game Events
//!
//! Events generated during simulation for logging, replay and tests.

use serde::{Serialize, Deserialize};
use crate::core::fixed::Fixed;
use crate::game::collision::CollisionKind;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// First jump left the Ready state
    Started,

    /// Jump impulse applied
    Jumped {
        /// Velocity after the impulse
        velocity: Fixed,
    },

    /// Obstacle reached the left boundary and respawned
    ObstacleRecycled {
        /// Obstacle slot
        index: u8,
        /// Newly drawn gap top
        gap_y: i32,
    },

    /// Score advanced by one point
    Scored {
        /// Score after the point
        score: u32,
    },

    /// Score wrapped at the configured ceiling
    ScoreWrapped {
        /// Ceiling that was reached
        ceiling: u32,
    },

    /// Difficulty step: speeds bumped, one gap re-drawn
    DifficultyRaised {
        /// Difficulty level reached
        level: u32,
        /// Scroll speed after the bump
        speed: u8,
        /// Obstacle slot whose gap was re-drawn
        regapped: u8,
    },

    /// Actor hit an obstacle or a field bound
    Collided {
        /// What was hit
        kind: CollisionKind,
        /// Score frozen at game over
        final_score: u32,
    },

    /// Engine returned to Ready
    Reset,
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create run started event.
    pub fn started(tick: u32) -> Self {
        Self::new(tick, GameEventData::Started)
    }

    /// Create jumped event.
    pub fn jumped(tick: u32, velocity: Fixed) -> Self {
        Self::new(tick, GameEventData::Jumped { velocity })
    }

    /// Create obstacle recycled event.
    pub fn obstacle_recycled(tick: u32, index: u8, gap_y: i32) -> Self {
        Self::new(tick, GameEventData::ObstacleRecycled { index, gap_y })
    }

    /// Create scored event.
    pub fn scored(tick: u32, score: u32) -> Self {
        Self::new(tick, GameEventData::Scored { score })
    }

    /// Create collision event.
    pub fn collided(tick: u32, kind: CollisionKind, final_score: u32) -> Self {
        Self::new(tick, GameEventData::Collided { kind, final_score })
    }

    /// Create reset event.
    pub fn reset(tick: u32) -> Self {
        Self::new(tick, GameEventData::Reset)
    }

    /// True for events worth an `info!` line.
    pub fn is_milestone(&self) -> bool {
        matches!(
            self.data,
            GameEventData::Started
                | GameEventData::DifficultyRaised { .. }
                | GameEventData::ScoreWrapped { .. }
                | GameEventData::Collided { .. }
                | GameEventData::Reset
        )
    }
}
