//! Movement duration calculation
//!
//! Converts a target position into a timed trajectory. Speed comes from the
//! entity class's run animation (vertical travel per cycle over cycle
//! duration) scaled by the entity's movement-speed stat; classes without a
//! run cycle move instantly.

use crate::data::AnimationProvider;
use crate::game::entity::{Entity, MotionState, Movement};
use crate::util::vec2::Vec2;

/// Commits a `Moving` trajectory from the entity's current position to
/// `target`, starting at `now_ms`. Repeating an already-committed target
/// while standing on it is a no-op.
pub fn move_towards(
    entity: &mut Entity,
    target: Vec2,
    now_ms: u64,
    animations: &dyn AnimationProvider,
) {
    if target == entity.position && target == entity.movement.target {
        return;
    }

    let duration_ms = match animations.run_animation(entity.class) {
        Some(anim) if anim.duration_ms > 0 && anim.travel_distance > 0.0 => {
            // world units per millisecond
            let base_speed = anim.travel_distance / anim.duration_ms as f32;
            let speed = base_speed * entity.move_speed;
            if speed > 0.0 {
                (entity.position.distance_to(target) / speed) as u64
            } else {
                0
            }
        }
        _ => 0,
    };

    entity.movement = Movement {
        start: entity.position,
        target,
        started_at: now_ms,
        duration_ms,
    };
    entity.motion = MotionState::Moving;
}
