//! Per-tick update: movement interpolation, spatial sync, interest diffing
//!
//! Runs over every live entity after spawns and despawns have settled. The
//! interest diff is incremental: only players whose position actually changed
//! re-query their surroundings, and only the delta against their current
//! nearby set produces notifications.

use crate::game::entity::MotionState;
use crate::game::map::Map;
use crate::game::systems::TickContext;
use crate::game::vid::Vid;
use crate::net::notify::VisibilityPusher;

pub fn run(
    map: &mut Map,
    pusher: &VisibilityPusher,
    ctx: &mut TickContext,
    now_ms: u64,
    view_distance: f32,
) {
    // Stable iteration snapshot; link churn below mutates the arena values
    // but never inserts or removes entities.
    ctx.vid_buf.clear();
    ctx.vid_buf.extend(map.entities.keys().copied());

    for i in 0..ctx.vid_buf.len() {
        let vid = ctx.vid_buf[i];
        step_entity(map, pusher, ctx, vid, now_ms, view_distance);
    }
}

fn step_entity(
    map: &mut Map,
    pusher: &VisibilityPusher,
    ctx: &mut TickContext,
    vid: Vid,
    now_ms: u64,
    view_distance: f32,
) {
    // (a) movement interpolation
    let (position, tag, changed, session) = {
        let Some(entity) = map.entities.get_mut(&vid) else {
            return;
        };
        if entity.motion == MotionState::Moving {
            let movement = entity.movement;
            let rate = if movement.duration_ms == 0 {
                1.0
            } else {
                let elapsed = now_ms.saturating_sub(movement.started_at);
                (elapsed as f32 / movement.duration_ms as f32).min(1.0)
            };
            entity.position = movement.start.lerp(movement.target, rate);
            entity.position_changed = true;
            if rate >= 1.0 {
                entity.motion = MotionState::Idle;
            }
        }
        let changed = entity.position_changed;
        entity.position_changed = false;
        (entity.position, entity.kind.tag(), changed, entity.session())
    };

    if !changed {
        return;
    }

    // (b) spatial sync
    map.tree.update_position(vid, tag, position);

    // (c) interest re-evaluation, players only
    let Some(session) = session else {
        return;
    };

    ctx.query_buf.clear();
    ctx.fresh.clear();
    ctx.gone.clear();
    ctx.added.clear();

    map.tree
        .query_around(&mut ctx.query_buf, position.x, position.y, view_distance, None);
    for &found in &ctx.query_buf {
        if found != vid {
            ctx.fresh.insert(found);
        }
    }

    if let Some(entity) = map.entities.get(&vid) {
        for &old in &entity.nearby {
            if !ctx.fresh.contains(&old) {
                ctx.gone.push(old);
            }
        }
        for &new in &ctx.fresh {
            if !entity.nearby.contains(&new) {
                ctx.added.push(new);
            }
        }
    }

    for i in 0..ctx.gone.len() {
        let old = ctx.gone[i];
        map.unlink_nearby(vid, old);
        pusher.hide(session, old);
        if let Some(other) = map.entities.get(&old) {
            if let Some(other_session) = other.session() {
                pusher.hide(other_session, vid);
            }
        }
    }

    for i in 0..ctx.added.len() {
        let new = ctx.added[i];
        map.link_nearby(vid, new);
        if let Some(other) = map.entities.get(&new) {
            pusher.show(session, other);
            if let Some(other_session) = other.session() {
                if let Some(me) = map.entities.get(&vid) {
                    pusher.show(other_session, me);
                }
            }
        }
    }
}
