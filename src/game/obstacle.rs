//! Obstacle Scrolling and Respawn
//!
//! Obstacles scroll left by their speed each Running tick. One that reaches
//! the left boundary respawns at `spawn_x` with a gap drawn uniformly from
//! `[gap_min, gap_max]`.

use crate::config::GameConfig;
use crate::core::rng::DeterministicRng;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::{GameState, Obstacle};

/// Draw a gap top inside the configured band.
#[inline]
pub fn draw_gap(config: &GameConfig, rng: &mut DeterministicRng) -> i32 {
    rng.next_int_range(config.gap_min, config.gap_max)
}

/// Build the initial obstacle set, spaced `obstacle_spacing` apart
/// starting at `spawn_x`.
pub fn spawn_obstacles(config: &GameConfig, rng: &mut DeterministicRng) -> Vec<Obstacle> {
    (0..config.obstacle_count)
        .map(|i| Obstacle {
            x: config.initial_obstacle_x(i),
            gap_y: draw_gap(config, rng),
            gap_size: config.gap_size,
            width: config.obstacle_width,
            speed: config.initial_speed,
            enabled: true,
        })
        .collect()
}

/// Scroll every enabled obstacle and recycle those past the left boundary.
///
/// Returns how many obstacles' trailing edges crossed the actor's left edge
/// this tick (used by pass-based scoring).
pub fn scroll_obstacles(state: &mut GameState, config: &GameConfig) -> u32 {
    let actor_x = state.actor.x;
    let tick = state.tick;
    let mut passed = 0;

    for index in 0..state.obstacles.len() {
        let obstacle = &mut state.obstacles[index];
        if !obstacle.enabled {
            continue;
        }

        let old_right = obstacle.right();
        obstacle.x -= obstacle.speed as i32;

        if old_right >= actor_x && obstacle.right() < actor_x {
            passed += 1;
        }

        if obstacle.x <= config.left_boundary {
            obstacle.x = config.spawn_x;
            obstacle.gap_y = draw_gap(config, &mut state.rng);
            let gap_y = obstacle.gap_y;

            state.recycles += 1;
            state.push_event(GameEvent::obstacle_recycled(tick, index as u8, gap_y));
        }
    }

    passed
}

/// One difficulty step: every obstacle speeds up by 1 (capped) and obstacle
/// `(score / interval) % count` gets a fresh gap.
pub fn raise_difficulty(state: &mut GameState, config: &GameConfig) {
    state.difficulty_level += 1;

    for obstacle in state.obstacles.iter_mut() {
        obstacle.speed = obstacle.speed.saturating_add(1).min(config.max_speed);
    }

    let step = (state.score / config.difficulty_interval.max(1)) as usize;
    let regapped = step % state.obstacles.len().max(1);
    if let Some(obstacle) = state.obstacles.get_mut(regapped) {
        obstacle.gap_y = draw_gap(config, &mut state.rng);
    }

    let event = GameEvent::new(
        state.tick,
        GameEventData::DifficultyRaised {
            level: state.difficulty_level,
            speed: state.speed(),
            regapped: regapped as u8,
        },
    );
    state.push_event(event);
}
