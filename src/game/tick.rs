//! Authoritative Simulation Tick
//!
//! One call to [`tick`] advances the state machine by exactly one step:
//! input → physics → obstacle scroll → scoring → one collision evaluation.
//! Deterministic given the config, the seed and the input sequence.

use serde::{Serialize, Deserialize};

use crate::config::{GameConfig, Integration, ScoringPolicy};
use crate::core::fixed::{
    Fixed, from_px, saturate, fixed_clamp,
    kinematic_position, kinematic_velocity,
};
use crate::core::hash::StateHash;
use crate::game::collision::{check_obstacle_collisions, CollisionKind};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::InputFrame;
use crate::game::obstacle::{raise_difficulty, scroll_obstacles};
use crate::game::state::{GameState, GameStatus, KinematicAnchor};

/// Result of a tick.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Status after the tick
    pub status: GameStatus,
    /// Set on the tick the run ended
    pub collision: Option<CollisionKind>,
}

/// Run one simulation tick.
pub fn tick(state: &mut GameState, input: InputFrame, config: &GameConfig) -> TickResult {
    let mut result = TickResult::default();

    state.tick = state.tick.wrapping_add(1);
    state.reset_latched = false;

    match state.status {
        GameStatus::Ready => {
            if input.jump_pressed() {
                start_run(state, config);
            }
        }
        GameStatus::GameOver => {
            if input.reset_pressed() {
                reset(state, config);
            }
        }
        GameStatus::Running => {
            if input.reset_pressed() {
                reset(state, config);
            } else {
                result.collision = run_tick(state, config, input.jump_pressed());
            }
        }
    }

    result.status = state.status;
    result.events = state.take_events();
    result
}

/// Ready → Running: impulse only, no gravity and no movement this tick.
fn start_run(state: &mut GameState, config: &GameConfig) {
    state.status = GameStatus::Running;
    state.push_event(GameEvent::started(state.tick));
    apply_jump(state, config);
}

/// Back to Ready with a fresh actor, obstacle set and score.
fn reset(state: &mut GameState, config: &GameConfig) {
    state.reinitialize(config);
    state.push_event(GameEvent::reset(state.tick));
}

/// Overwrite velocity with the impulse and re-anchor the kinematic arc.
fn apply_jump(state: &mut GameState, config: &GameConfig) {
    let actor = &mut state.actor;
    actor.velocity = -config.jump_strength;
    actor.anchor = KinematicAnchor {
        y0: actor.y,
        v0: actor.velocity,
        ticks: 0,
    };
    let velocity = actor.velocity;
    state.push_event(GameEvent::jumped(state.tick, velocity));
}

/// One Running tick. Returns the collision that ended the run, if any.
fn run_tick(state: &mut GameState, config: &GameConfig, jump: bool) -> Option<CollisionKind> {
    let bound_hit = update_physics(state, config, jump);
    let passed = scroll_obstacles(state, config);
    update_score(state, config, passed);

    // Single evaluation against the post-update state
    let collision = bound_hit.or_else(|| check_obstacle_collisions(state));
    if let Some(kind) = collision {
        end_run(state, kind);
    }
    collision
}

/// Integrate the actor and clamp to the field. Reports a bound contact.
fn update_physics(state: &mut GameState, config: &GameConfig, jump: bool) -> Option<CollisionKind> {
    match config.integration {
        Integration::Incremental => {
            let actor = &mut state.actor;
            actor.velocity = actor.velocity.saturating_add(config.gravity);
            if jump {
                actor.velocity = -config.jump_strength;
            }
            let y = saturate(actor.y as i64 + actor.velocity as i64);
            actor.y = y;
        }
        Integration::Kinematic => {
            if jump {
                // Arc restarts here; position holds for this tick
                state.actor.velocity = -config.jump_strength;
                state.actor.anchor = KinematicAnchor {
                    y0: state.actor.y,
                    v0: state.actor.velocity,
                    ticks: 0,
                };
            } else {
                let actor = &mut state.actor;
                let a = &mut actor.anchor;
                a.ticks = a.ticks.saturating_add(1);
                actor.y = saturate(kinematic_position(a.y0, a.v0, config.gravity, a.ticks));
                actor.velocity = kinematic_velocity(a.v0, config.gravity, a.ticks);
            }
        }
    }

    if jump {
        let velocity = state.actor.velocity;
        state.push_event(GameEvent::jumped(state.tick, velocity));
    }

    clamp_to_field(&mut state.actor.y, config)
}

/// Clamp a top-edge position; touching either bound is a contact.
fn clamp_to_field(y: &mut Fixed, config: &GameConfig) -> Option<CollisionKind> {
    let lower = from_px(config.lower_bound());
    let upper = from_px(config.upper_bound());

    let hit = if *y <= lower {
        Some(CollisionKind::LowerBound)
    } else if *y >= upper {
        Some(CollisionKind::UpperBound)
    } else {
        None
    };
    *y = fixed_clamp(*y, lower, upper);
    hit
}

/// Apply the configured scoring policy for this tick.
fn update_score(state: &mut GameState, config: &GameConfig, passed: u32) {
    state.running_ticks = state.running_ticks.wrapping_add(1);

    let points = match config.scoring {
        ScoringPolicy::Elapsed => {
            u32::from(state.running_ticks % config.ticks_per_point == 0)
        }
        ScoringPolicy::ObstaclePass => passed,
    };

    for _ in 0..points {
        add_point(state, config);
    }
}

/// Add one point, wrapping at the ceiling, and step difficulty on
/// every non-zero multiple of the interval.
fn add_point(state: &mut GameState, config: &GameConfig) {
    state.score += 1;
    if state.score >= config.score_ceiling {
        state.score = 0;
        let event = GameEvent::new(
            state.tick,
            GameEventData::ScoreWrapped { ceiling: config.score_ceiling },
        );
        state.push_event(event);
    }
    state.push_event(GameEvent::scored(state.tick, state.score));

    if state.score != 0 && state.score % config.difficulty_interval == 0 {
        raise_difficulty(state, config);
    }
}

/// Running → GameOver.
fn end_run(state: &mut GameState, kind: CollisionKind) {
    state.status = GameStatus::GameOver;
    state.actor.alive = false;
    state.collision = Some(kind);
    state.final_score = Some(state.score);
    state.push_event(GameEvent::collided(state.tick, kind, state.score));
}

// =============================================================================
// ENGINE
// =============================================================================

/// Owns the configuration and the simulation state.
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
}

impl GameEngine {
    /// Create an engine in `Ready`. The config must already be validated.
    pub fn new(config: GameConfig, rng_seed: u64) -> Self {
        let state = GameState::new(&config, rng_seed);
        Self { config, state }
    }

    /// Advance one tick.
    pub fn step(&mut self, input: InputFrame) -> TickResult {
        tick(&mut self.state, input, &self.config)
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state, for scenario setup.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// State hash for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        self.state.compute_hash()
    }
}

/// Replay a run from a sequence of frames.
///
/// Returns the final engine and every event produced.
pub fn replay_run<I>(config: GameConfig, rng_seed: u64, frames: I) -> (GameEngine, Vec<GameEvent>)
where
    I: IntoIterator<Item = InputFrame>,
{
    let mut engine = GameEngine::new(config, rng_seed);
    let mut all_events = Vec::new();

    for frame in frames {
        let result = engine.step(frame);
        all_events.extend(result.events);
    }

    (engine, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{FIXED_ONE, GRAVITY, JUMP_STRENGTH, to_px};
    use crate::game::input::InputRecording;
    use proptest::prelude::*;

    /// Engine already Running with the actor at `y` px, velocity `v` px/tick
    /// and every obstacle switched off.
    fn running_without_obstacles(config: GameConfig, y: i32, v: i32) -> GameEngine {
        let mut engine = GameEngine::new(config, 1);
        let state = engine.state_mut();
        state.status = GameStatus::Running;
        state.actor.y = from_px(y);
        state.actor.velocity = from_px(v);
        state.actor.anchor = KinematicAnchor { y0: from_px(y), v0: from_px(v), ticks: 0 };
        for o in state.obstacles.iter_mut() {
            o.enabled = false;
        }
        engine
    }

    fn quiet_config() -> GameConfig {
        // Long scoring interval so scoring never interferes with scenarios
        GameConfig { ticks_per_point: 10_000, ..GameConfig::default() }
    }

    #[test]
    fn test_free_fall_ten_ticks() {
        let mut engine = running_without_obstacles(quiet_config(), 240, 0);

        for _ in 0..10 {
            let result = engine.step(InputFrame::new());
            assert_eq!(result.status, GameStatus::Running);
        }

        let actor = &engine.state().actor;
        assert_eq!(actor.y, from_px(295));
        assert_eq!(actor.velocity, 10 * FIXED_ONE);
    }

    #[test]
    fn test_clamp_to_lower_bound_ends_run_same_tick() {
        let mut engine = running_without_obstacles(quiet_config(), 5, -10);

        let result = engine.step(InputFrame::new());

        assert_eq!(engine.state().actor.y, 0);
        assert_eq!(result.status, GameStatus::GameOver);
        assert_eq!(result.collision, Some(CollisionKind::LowerBound));
        assert!(!engine.state().actor.alive);
    }

    #[test]
    fn test_clamp_to_upper_bound_ends_run() {
        let mut engine = running_without_obstacles(quiet_config(), 455, 10);
        let result = engine.step(InputFrame::new());
        assert_eq!(to_px(engine.state().actor.y), engine.config().upper_bound());
        assert_eq!(result.collision, Some(CollisionKind::UpperBound));
    }

    #[test]
    fn test_ready_to_running_on_jump() {
        let mut engine = GameEngine::new(GameConfig::default(), 3);
        let y0 = engine.state().actor.y;

        // Idle ticks change nothing
        for _ in 0..5 {
            engine.step(InputFrame::new());
        }
        assert_eq!(engine.status(), GameStatus::Ready);
        assert_eq!(engine.state().actor.y, y0);

        let result = engine.step(InputFrame::jump());
        assert_eq!(result.status, GameStatus::Running);
        assert!(result.events.iter().any(|e| e.data == GameEventData::Started));
        // Impulse only: no gravity, no movement on the starting tick
        assert_eq!(engine.state().actor.velocity, -JUMP_STRENGTH);
        assert_eq!(engine.state().actor.y, y0);
    }

    #[test]
    fn test_jump_overrides_fall() {
        let mut engine = running_without_obstacles(quiet_config(), 200, 7);
        engine.step(InputFrame::jump());
        assert_eq!(engine.state().actor.velocity, -JUMP_STRENGTH);
        // Moved up by the full impulse
        assert_eq!(engine.state().actor.y, from_px(190));
    }

    #[test]
    fn test_kinematic_arc() {
        let config = GameConfig { integration: Integration::Kinematic, ..quiet_config() };
        let mut engine = running_without_obstacles(config, 300, 0);

        // Jump re-anchors without moving
        engine.step(InputFrame::jump());
        assert_eq!(engine.state().actor.y, from_px(300));
        assert_eq!(engine.state().actor.velocity, -JUMP_STRENGTH);

        // y = 300 - 10t + t²/2 at t = 4 → 268
        for _ in 0..4 {
            engine.step(InputFrame::new());
        }
        assert_eq!(engine.state().actor.y, from_px(268));
        assert_eq!(engine.state().actor.velocity, -6 * FIXED_ONE);
    }

    #[test]
    fn test_integrations_diverge() {
        let run = |integration| {
            let config = GameConfig { integration, ..quiet_config() };
            let mut engine = running_without_obstacles(config, 100, 0);
            engine.step(InputFrame::jump());
            for _ in 0..6 {
                engine.step(InputFrame::new());
            }
            engine.state().actor.y
        };
        assert_ne!(run(Integration::Incremental), run(Integration::Kinematic));
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut engine = running_without_obstacles(quiet_config(), 5, -10);
        engine.step(InputFrame::new());
        assert_eq!(engine.status(), GameStatus::GameOver);

        let actor = engine.state().actor.clone();
        let obstacles = engine.state().obstacles.clone();
        let score = engine.score();

        for frame in [InputFrame::new(), InputFrame::jump(), InputFrame::quit()] {
            for _ in 0..20 {
                let result = engine.step(frame);
                assert_eq!(result.status, GameStatus::GameOver);
                assert!(result.events.is_empty());
            }
        }

        assert_eq!(engine.state().actor, actor);
        assert_eq!(engine.state().obstacles, obstacles);
        assert_eq!(engine.score(), score);
        assert_eq!(engine.state().final_score, Some(score));
    }

    #[test]
    fn test_reset_returns_to_ready() {
        let mut engine = running_without_obstacles(quiet_config(), 5, -10);
        engine.step(InputFrame::new());

        let result = engine.step(InputFrame::reset());
        assert_eq!(result.status, GameStatus::Ready);
        assert!(result.events.iter().any(|e| e.data == GameEventData::Reset));
        assert!(engine.state().reset_latched);
        assert!(engine.state().actor.alive);
        assert_eq!(engine.state().actor.y, from_px(240));
        assert_eq!(engine.score(), 0);
        assert!(engine.state().obstacles.iter().all(|o| o.enabled));

        // Latch clears on the next tick
        engine.step(InputFrame::new());
        assert!(!engine.state().reset_latched);
    }

    #[test]
    fn test_reset_in_ready_is_noop() {
        let mut engine = GameEngine::new(GameConfig::default(), 3);
        let before = engine.state().obstacles.clone();
        let result = engine.step(InputFrame::reset());
        assert!(result.events.is_empty());
        assert_eq!(engine.state().obstacles, before);
    }

    #[test]
    fn test_obstacle_recycles_on_tick() {
        let mut engine = running_without_obstacles(quiet_config(), 240, -1);
        {
            let o = &mut engine.state_mut().obstacles[0];
            o.enabled = true;
            o.x = 2;
            o.speed = 2;
        }
        engine.step(InputFrame::new());
        let o = &engine.state().obstacles[0];
        let config = engine.config();
        assert_eq!(o.x, config.spawn_x);
        assert!(o.gap_y >= config.gap_min && o.gap_y <= config.gap_max);
    }

    #[test]
    fn test_obstacle_collision_ends_run() {
        let mut engine = running_without_obstacles(quiet_config(), 240, -1);
        {
            let o = &mut engine.state_mut().obstacles[1];
            o.enabled = true;
            o.x = 112;
            o.gap_y = 300;
        }
        let result = engine.step(InputFrame::new());
        assert_eq!(result.collision, Some(CollisionKind::Obstacle(1)));
        assert_eq!(engine.state().collision, Some(CollisionKind::Obstacle(1)));
    }

    #[test]
    fn test_elapsed_scoring_and_difficulty() {
        let config = GameConfig {
            ticks_per_point: 2,
            difficulty_interval: 3,
            gravity: 0,
            ..GameConfig::default()
        };
        let mut engine = running_without_obstacles(config, 240, 0);

        for _ in 0..6 {
            engine.step(InputFrame::new());
        }
        assert_eq!(engine.score(), 3);
        assert_eq!(engine.state().difficulty_level, 1);
        assert!(engine.state().obstacles.iter().all(|o| o.speed == 3));
    }

    #[test]
    fn test_pass_scoring() {
        let config = GameConfig { scoring: ScoringPolicy::ObstaclePass, gravity: 0, ..GameConfig::default() };
        let mut engine = running_without_obstacles(config, 240, 0);
        {
            let o = &mut engine.state_mut().obstacles[0];
            o.enabled = true;
            // Right edge 103 → 101 → 99 crosses the actor's x of 100
            o.x = 53;
            o.gap_y = 200;
        }
        engine.step(InputFrame::new());
        assert_eq!(engine.score(), 0);
        engine.step(InputFrame::new());
        assert_eq!(engine.score(), 1);
        // Elapsed ticks do not score under this policy
        for _ in 0..120 {
            engine.step(InputFrame::new());
        }
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn test_score_wraps_at_ceiling() {
        let config = GameConfig {
            ticks_per_point: 1,
            score_ceiling: 5,
            difficulty_interval: 1_000,
            gravity: 0,
            ..GameConfig::default()
        };
        let mut engine = running_without_obstacles(config, 240, 0);
        let mut wrapped = false;
        for _ in 0..5 {
            let result = engine.step(InputFrame::new());
            wrapped |= result
                .events
                .iter()
                .any(|e| e.data == GameEventData::ScoreWrapped { ceiling: 5 });
        }
        assert!(wrapped);
        assert_eq!(engine.score(), 0);
        engine.step(InputFrame::new());
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn test_replay_determinism() {
        let frames: Vec<InputFrame> = (0..2_000u32)
            .map(|t| if t % 23 < 2 { InputFrame::jump() } else { InputFrame::new() })
            .collect();

        let (a, events_a) = replay_run(GameConfig::default(), 99_999, frames.clone());
        let (b, events_b) = replay_run(GameConfig::default(), 99_999, frames);

        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(events_a, events_b);
    }

    #[test]
    fn test_recorded_inputs_reproduce_run() {
        let mut live = GameEngine::new(GameConfig::default(), 4242);
        let mut recording = InputRecording::new(4242);

        for t in 0..600u32 {
            let frame = if t % 17 == 0 { InputFrame::jump() } else { InputFrame::new() };
            live.step(frame);
            recording.record(live.state().tick, frame);
        }

        let (replayed, _) = replay_run(
            GameConfig::default(),
            recording.rng_seed,
            recording.replay_iter().map(|(_, f)| f),
        );
        assert_eq!(replayed.compute_hash(), live.compute_hash());
    }

    proptest! {
        #[test]
        fn prop_position_stays_in_bounds(
            y in 1i32..460, v in -40i32..40,
            jumps in proptest::collection::vec(any::<bool>(), 1..200),
            kinematic in any::<bool>(),
        ) {
            let integration = if kinematic { Integration::Kinematic } else { Integration::Incremental };
            let config = GameConfig { integration, ..quiet_config() };
            let mut engine = running_without_obstacles(config, y, v);
            for jump in jumps {
                let frame = if jump { InputFrame::jump() } else { InputFrame::new() };
                engine.step(frame);
                let y = engine.state().actor.y;
                prop_assert!(y >= from_px(engine.config().lower_bound()));
                prop_assert!(y <= from_px(engine.config().upper_bound()));
                if engine.status() == GameStatus::GameOver {
                    break;
                }
            }
        }

        #[test]
        fn prop_jump_sets_exact_velocity(y in 100i32..400, v in -30i32..30, g in 0i32..(4 * GRAVITY)) {
            let config = GameConfig { gravity: g, ..quiet_config() };
            let mut engine = running_without_obstacles(config, y, v);
            engine.step(InputFrame::jump());
            prop_assert_eq!(engine.state().actor.velocity, -JUMP_STRENGTH);
        }

        #[test]
        fn prop_speed_non_decreasing(seed in any::<u64>(), ticks in 100usize..2_000) {
            let config = GameConfig { ticks_per_point: 3, difficulty_interval: 4, gravity: 0, ..GameConfig::default() };
            let mut engine = running_without_obstacles(config, 240, 0);
            engine.state_mut().rng = crate::core::rng::DeterministicRng::new(seed);
            for o in engine.state_mut().obstacles.iter_mut() {
                o.enabled = true;
                o.gap_y = 200;
            }
            let mut last = engine.state().speed();
            for _ in 0..ticks {
                engine.step(InputFrame::new());
                if engine.status() != GameStatus::Running {
                    break;
                }
                let speed = engine.state().speed();
                prop_assert!(speed >= last);
                let (gap_min, gap_max) = (engine.config().gap_min, engine.config().gap_max);
                let in_band = engine
                    .state()
                    .obstacles
                    .iter()
                    .all(|o| o.gap_y >= gap_min && o.gap_y <= gap_max);
                prop_assert!(in_band);
                last = speed;
            }
        }
    }
}
