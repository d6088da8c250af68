//! Collision Detection
//!
//! Axis-aligned tests between the actor envelope and obstacles. All
//! intervals are closed: an envelope at `y` with height `h` occupies rows
//! `y..=y+h`, an obstacle at `x` with width `w` columns `x..=x+w`.

use serde::{Serialize, Deserialize};

use crate::game::state::{GameState, Obstacle};

/// What ended a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Actor reached the top of the field
    LowerBound,
    /// Actor reached the bottom of the field
    UpperBound,
    /// Actor hit obstacle `index` outside its gap
    Obstacle(u8),
}

/// Axis-aligned rectangle in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Envelope {
    /// Right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Closed-interval overlap between the envelope and the obstacle's columns.
#[inline]
pub fn horizontal_overlap(actor: &Envelope, obstacle: &Obstacle) -> bool {
    actor.x <= obstacle.right() && obstacle.x <= actor.right()
}

/// Envelope pokes out of the gap window above or below.
#[inline]
pub fn outside_gap(actor: &Envelope, obstacle: &Obstacle) -> bool {
    actor.y < obstacle.gap_top() || actor.bottom() > obstacle.gap_bottom()
}

/// Collision predicate for one obstacle. Pure.
#[inline]
pub fn obstacle_collides(actor: &Envelope, obstacle: &Obstacle) -> bool {
    obstacle.enabled && horizontal_overlap(actor, obstacle) && outside_gap(actor, obstacle)
}

/// First obstacle the actor collides with, if any.
pub fn check_obstacle_collisions(state: &GameState) -> Option<CollisionKind> {
    let envelope = state.actor.envelope();
    state
        .obstacles
        .iter()
        .position(|o| obstacle_collides(&envelope, o))
        .map(|i| CollisionKind::Obstacle(i as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obstacle(x: i32, gap_y: i32) -> Obstacle {
        Obstacle { x, gap_y, gap_size: 150, width: 50, speed: 2, enabled: true }
    }

    fn actor_at(y: i32) -> Envelope {
        Envelope { x: 100, y, width: 30, height: 20 }
    }

    #[test]
    fn test_inside_gap_no_collision() {
        let o = obstacle(110, 150);
        // Flush with the top of the gap
        assert!(!obstacle_collides(&actor_at(150), &o));
        // Flush with the bottom: 280 + 20 = 300 = gap bottom
        assert!(!obstacle_collides(&actor_at(280), &o));
    }

    #[test]
    fn test_one_pixel_outside_gap_collides() {
        let o = obstacle(110, 150);
        assert!(obstacle_collides(&actor_at(149), &o));
        assert!(obstacle_collides(&actor_at(281), &o));
    }

    #[test]
    fn test_no_horizontal_overlap_no_collision() {
        // Obstacle entirely right of the actor (actor spans 100..=130)
        assert!(!obstacle_collides(&actor_at(0), &obstacle(131, 150)));
        // Touching edges count as overlap
        assert!(obstacle_collides(&actor_at(0), &obstacle(130, 150)));
        // Entirely left (49 + 50 = 99)
        assert!(!obstacle_collides(&actor_at(0), &obstacle(49, 150)));
        assert!(obstacle_collides(&actor_at(0), &obstacle(50, 150)));
    }

    #[test]
    fn test_disabled_obstacle_ignored() {
        let mut o = obstacle(110, 150);
        o.enabled = false;
        assert!(!obstacle_collides(&actor_at(0), &o));
    }

    /// Pixel-by-pixel reference: does any actor pixel land on a solid
    /// obstacle pixel?
    fn brute_force(actor: &Envelope, o: &Obstacle) -> bool {
        if !o.enabled {
            return false;
        }
        for px in actor.x..=actor.right() {
            if px < o.x || px > o.right() {
                continue;
            }
            for py in actor.y..=actor.bottom() {
                if py < o.gap_top() || py > o.gap_bottom() {
                    return true;
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            ax in 0i32..200, ay in -20i32..500, aw in 1i32..40, ah in 1i32..40,
            ox in 0i32..260, gap_y in 0i32..300, gap_size in 30i32..180, ow in 1i32..60,
            enabled in any::<bool>(),
        ) {
            let actor = Envelope { x: ax, y: ay, width: aw, height: ah };
            let o = Obstacle { x: ox, gap_y, gap_size, width: ow, speed: 1, enabled };
            let verdict = obstacle_collides(&actor, &o);
            prop_assert_eq!(verdict, brute_force(&actor, &o));
            // Deterministic
            prop_assert_eq!(verdict, obstacle_collides(&actor, &o));
        }
    }
}
