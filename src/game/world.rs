//! World orchestrator: everything that happens in one tick
//!
//! Owns the maps, the collaborator handles, and the shared per-tick scratch
//! buffers. `tick` is the single entry point the scheduler drives; all of it
//! runs on the tick thread.

use std::sync::Arc;

use crate::config::WorldConfig;
use crate::data::AnimationProvider;
use crate::game::map::Map;
use crate::game::systems::{despawn, monster, spawn, update, TickContext};
use crate::net::notify::{NotificationSink, VisibilityPusher};

pub struct World {
    maps: Vec<Map>,
    pusher: VisibilityPusher,
    animations: Arc<dyn AnimationProvider>,
    view_distance: f32,
    ctx: TickContext,
    tick: u64,
}

impl World {
    pub fn new(
        config: &WorldConfig,
        sink: Arc<dyn NotificationSink>,
        animations: Arc<dyn AnimationProvider>,
    ) -> Self {
        Self {
            maps: Vec::new(),
            pusher: VisibilityPusher::new(sink),
            animations,
            view_distance: config.view_distance,
            ctx: TickContext::new(),
            tick: 0,
        }
    }

    pub fn add_map(&mut self, map: Map) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[Map] {
        &self.maps
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Total live entities across all maps.
    pub fn entity_count(&self) -> usize {
        self.maps.iter().map(Map::len).sum()
    }

    /// Runs one simulation step at `now_ms`. Per map, strictly in order:
    /// drain spawns, drain despawns, movement/interest update, monster
    /// decisions. Spawns go first so a same-tick removal of a fresh entity
    /// resolves, and despawns free index room before the update queries run.
    pub fn tick(&mut self, now_ms: u64) {
        self.tick += 1;
        for map in &mut self.maps {
            spawn::drain(map, &self.pusher, &mut self.ctx, self.view_distance);
            despawn::drain(map, &self.pusher);
            update::run(map, &self.pusher, &mut self.ctx, now_ms, self.view_distance);
            monster::run(map, &self.pusher, &mut self.ctx, now_ms, self.animations.as_ref());
        }
    }
}
