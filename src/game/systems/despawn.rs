//! Despawn service: exit side of interest management
//!
//! Drains the map's pending-removal queue after spawns, so a spawn and
//! despawn of the same entity queued within one tick resolve in order. Fully
//! detaches the entity: live arena, spatial index, and every reciprocal
//! nearby link. Player counterparts are told to hide the entity; the vid is
//! not released here.

use tracing::debug;

use crate::game::map::Map;
use crate::game::vid::Vid;
use crate::net::notify::VisibilityPusher;

pub fn drain(map: &mut Map, pusher: &VisibilityPusher) {
    while let Ok(vid) = map.removal_rx.try_recv() {
        despawn_one(map, vid, pusher);
    }
}

fn despawn_one(map: &mut Map, vid: Vid, pusher: &VisibilityPusher) {
    let Some(mut entity) = map.entities.remove(&vid) else {
        debug!(vid, map = map.name(), "removal requested for unknown entity");
        return;
    };
    map.tree.remove(vid);

    for other in entity.nearby.drain() {
        if let Some(other_entity) = map.entities.get_mut(&other) {
            other_entity.nearby.remove(&vid);
            if let Some(session) = other_entity.session() {
                pusher.hide(session, vid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Entity;
    use crate::net::notify::{RecordingSink, VisibilityMessage};
    use crate::util::vec2::Vec2;
    use std::sync::Arc;
    use uuid::Uuid;

    fn setup() -> (Map, Arc<RecordingSink>, VisibilityPusher) {
        let map = Map::new("despawn-test", Vec2::ZERO, 500.0, 500.0, 4).unwrap();
        let sink = Arc::new(RecordingSink::new());
        let pusher = VisibilityPusher::new(sink.clone());
        (map, sink, pusher)
    }

    /// Places an entity directly into live state and links it to `linked`.
    fn place(map: &mut Map, entity: Entity, linked: &[crate::game::vid::Vid]) {
        let vid = entity.vid;
        map.tree.insert(vid, entity.kind.tag(), entity.position);
        map.entities.insert(vid, entity);
        for &other in linked {
            map.link_nearby(vid, other);
        }
    }

    #[test]
    fn test_despawn_with_nearby_player_sends_one_hide() {
        let (mut map, sink, pusher) = setup();
        let session = Uuid::new_v4();
        place(&mut map, Entity::player(1, session, 0, Vec2::new(50.0, 50.0)), &[]);
        place(&mut map, Entity::other(2, 0, Vec2::new(60.0, 50.0)), &[1]);

        map.removal_queue().send(2).unwrap();
        drain(&mut map, &pusher);

        let sent = sink.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, session);
        assert_eq!(sent[0].1, VisibilityMessage::Disappear { vid: 2 });

        assert!(!map.entities.contains_key(&2));
        assert!(!map.tree.tracks(2));
        assert!(map.entities[&1].nearby.is_empty());
    }

    #[test]
    fn test_despawn_with_non_player_neighbours_is_silent() {
        let (mut map, sink, pusher) = setup();
        place(&mut map, Entity::other(1, 0, Vec2::new(50.0, 50.0)), &[]);
        place(&mut map, Entity::other(2, 0, Vec2::new(60.0, 50.0)), &[1]);

        map.removal_queue().send(2).unwrap();
        drain(&mut map, &pusher);

        assert!(sink.is_empty());
        assert!(map.entities[&1].nearby.is_empty());
    }

    #[test]
    fn test_despawn_unknown_vid_is_harmless() {
        let (mut map, sink, pusher) = setup();
        map.removal_queue().send(99).unwrap();
        drain(&mut map, &pusher);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_despawning_player_gets_no_message_about_itself() {
        let (mut map, sink, pusher) = setup();
        let leaving = Uuid::new_v4();
        let staying = Uuid::new_v4();
        place(&mut map, Entity::player(1, staying, 0, Vec2::new(50.0, 50.0)), &[]);
        place(&mut map, Entity::player(2, leaving, 0, Vec2::new(60.0, 50.0)), &[1]);

        map.removal_queue().send(2).unwrap();
        drain(&mut map, &pusher);

        let sent = sink.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, staying);
    }
}
