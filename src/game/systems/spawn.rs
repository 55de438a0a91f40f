//! Spawn service: entry side of interest management
//!
//! Drains the map's pending-spawn queue on the tick thread. An entity whose
//! position fails tree insertion (outside map bounds) is dropped silently;
//! its vid is not released here. Player spawns immediately learn their area
//! of interest; non-player spawns announce nothing, nearby players discover
//! them through the per-tick update diff.

use tracing::debug;

use crate::game::map::Map;
use crate::game::systems::TickContext;
use crate::net::notify::VisibilityPusher;

/// Promotes every queued entity to live. Runs first in the tick order so a
/// same-tick despawn request for a fresh entity resolves correctly.
pub fn drain(map: &mut Map, pusher: &VisibilityPusher, ctx: &mut TickContext, view_distance: f32) {
    while let Ok(entity) = map.spawn_rx.try_recv() {
        spawn_one(map, *entity, pusher, ctx, view_distance);
    }
}

fn spawn_one(
    map: &mut Map,
    entity: crate::game::entity::Entity,
    pusher: &VisibilityPusher,
    ctx: &mut TickContext,
    view_distance: f32,
) {
    let vid = entity.vid;
    let position = entity.position;

    if !map.tree.insert(vid, entity.kind.tag(), position) {
        debug!(vid, map = map.name(), x = position.x, y = position.y,
            "spawn position outside map bounds, entity dropped");
        return;
    }

    let session = entity.session();
    map.entities.insert(vid, entity);

    // Only players establish interest on spawn
    let Some(session) = session else {
        return;
    };

    ctx.query_buf.clear();
    map.tree
        .query_around(&mut ctx.query_buf, position.x, position.y, view_distance, None);

    for i in 0..ctx.query_buf.len() {
        let other = ctx.query_buf[i];
        if other == vid {
            continue;
        }
        map.link_nearby(vid, other);

        if let Some(other_entity) = map.entities.get(&other) {
            pusher.show(session, other_entity);
            // Mutual interest when the neighbour is also a player
            if let Some(other_session) = other_entity.session() {
                if let Some(me) = map.entities.get(&vid) {
                    pusher.show(other_session, me);
                }
            }
        }
    }
}
