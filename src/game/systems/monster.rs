//! Monster wander behaviour
//!
//! Each idle monster whose decision timer elapsed picks random candidate
//! positions near itself until one is reachable in a straight line, then
//! commits a trajectory and tells every nearby player about it. A monster
//! boxed in by terrain simply stays put and retries next time.

use rand::Rng;

use crate::data::AnimationProvider;
use crate::game::constants::monster::MOVE_ATTEMPTS;
use crate::game::entity::{EntityKind, MotionState};
use crate::game::map::Map;
use crate::game::systems::{movement, TickContext};
use crate::game::vid::Vid;
use crate::net::notify::VisibilityPusher;
use crate::util::vec2::Vec2;

pub fn run(
    map: &mut Map,
    pusher: &VisibilityPusher,
    ctx: &mut TickContext,
    now_ms: u64,
    animations: &dyn AnimationProvider,
) {
    // Collect due monsters first; deciding mutates entities and the rng
    ctx.vid_buf.clear();
    for (&vid, entity) in &map.entities {
        if entity.motion != MotionState::Idle {
            continue;
        }
        if let EntityKind::Monster(state) = &entity.kind {
            if now_ms >= state.next_movement_time {
                ctx.vid_buf.push(vid);
            }
        }
    }

    for i in 0..ctx.vid_buf.len() {
        let vid = ctx.vid_buf[i];
        decide(map, pusher, ctx, vid, now_ms, animations);
    }
}

fn decide(
    map: &mut Map,
    pusher: &VisibilityPusher,
    ctx: &mut TickContext,
    vid: Vid,
    now_ms: u64,
    animations: &dyn AnimationProvider,
) {
    let (position, wander_radius, interval_ms, jitter_ms) = {
        let Some(entity) = map.entities.get(&vid) else {
            return;
        };
        let EntityKind::Monster(state) = &entity.kind else {
            return;
        };
        (
            entity.position,
            state.definition.wander_radius,
            state.definition.wander_interval_ms,
            state.definition.wander_jitter_ms,
        )
    };

    // Non-positive radius means the species does not wander
    if wander_radius <= 0.0 {
        return;
    }

    let mut rng = rand::thread_rng();
    let mut target = None;
    for _ in 0..MOVE_ATTEMPTS {
        let offset = Vec2::new(
            rng.gen_range(-wander_radius..wander_radius),
            rng.gen_range(-wander_radius..wander_radius),
        );
        let candidate = position + offset;
        if map.is_walkable_path(position, candidate) {
            target = Some(candidate);
            break;
        }
    }

    // Exhausting every attempt is expected on cramped terrain; stay idle
    let Some(target) = target else {
        return;
    };

    if let Some(entity) = map.entities.get_mut(&vid) {
        movement::move_towards(entity, target, now_ms, animations);
        entity.rotation = (target - position).angle();
        if let EntityKind::Monster(state) = &mut entity.kind {
            let jitter = if jitter_ms > 0 {
                rng.gen_range(0..jitter_ms)
            } else {
                0
            };
            state.next_movement_time = now_ms + interval_ms + jitter;
        }
    }

    // Broadcast the committed trajectory to every nearby player
    ctx.nearby_buf.clear();
    if let Some(entity) = map.entities.get(&vid) {
        ctx.nearby_buf.extend(entity.nearby.iter().copied());
    }
    for i in 0..ctx.nearby_buf.len() {
        let other = ctx.nearby_buf[i];
        if let Some(other_entity) = map.entities.get(&other) {
            if let Some(session) = other_entity.session() {
                if let Some(me) = map.entities.get(&vid) {
                    pusher.movement(session, me);
                }
            }
        }
    }
}
