//! Entity state held in the per-map arena
//!
//! Entities are plain values keyed by vid; cross-entity relations (the nearby
//! sets) and the spatial back-reference are id lookups, never pointers.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::data::MonsterDefinition;
use crate::game::vid::Vid;
use crate::util::vec2::Vec2;

/// Key into the static entity-class tables (animations, definitions)
pub type EntityClassId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Moving,
}

/// Lightweight kind tag used by the spatial index and type filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKindTag {
    Player,
    Monster,
    Other,
}

/// Closed set of entity kinds. Visibility routing matches on this instead of
/// downcasting.
#[derive(Debug)]
pub enum EntityKind {
    Player(PlayerHandle),
    Monster(MonsterState),
    Other,
}

impl EntityKind {
    pub fn tag(&self) -> EntityKindTag {
        match self {
            EntityKind::Player(_) => EntityKindTag::Player,
            EntityKind::Monster(_) => EntityKindTag::Monster,
            EntityKind::Other => EntityKindTag::Other,
        }
    }
}

#[derive(Debug)]
pub struct PlayerHandle {
    /// Session the notification sink delivers to
    pub session: Uuid,
}

/// Behaviour state carried by monster entities
#[derive(Debug)]
pub struct MonsterState {
    /// Next wander decision is gated on this timestamp (ms)
    pub next_movement_time: u64,
    /// Immutable shared definition data
    pub definition: Arc<MonsterDefinition>,
}

/// Committed trajectory for a moving entity
#[derive(Debug, Clone, Copy, Default)]
pub struct Movement {
    pub start: Vec2,
    pub target: Vec2,
    /// Timestamp the movement started (ms)
    pub started_at: u64,
    pub duration_ms: u64,
}

#[derive(Debug)]
pub struct Entity {
    pub vid: Vid,
    pub position: Vec2,
    pub rotation: f32,
    pub class: EntityClassId,
    /// Movement-speed stat, multiplies animation-derived base speed
    pub move_speed: f32,
    pub kind: EntityKind,
    pub motion: MotionState,
    pub movement: Movement,
    /// Symmetric AOI relation: contains `b` iff `b`'s set contains us
    pub nearby: HashSet<Vid>,
    /// Marks the entity for spatial re-indexing this tick
    pub position_changed: bool,
}

impl Entity {
    fn new(vid: Vid, class: EntityClassId, position: Vec2, kind: EntityKind) -> Self {
        Self {
            vid,
            position,
            rotation: 0.0,
            class,
            move_speed: 1.0,
            kind,
            motion: MotionState::Idle,
            movement: Movement::default(),
            nearby: HashSet::new(),
            position_changed: false,
        }
    }

    pub fn player(vid: Vid, session: Uuid, class: EntityClassId, position: Vec2) -> Self {
        Self::new(vid, class, position, EntityKind::Player(PlayerHandle { session }))
    }

    pub fn monster(vid: Vid, definition: Arc<MonsterDefinition>, position: Vec2) -> Self {
        let class = definition.class;
        let move_speed = definition.move_speed;
        let mut entity = Self::new(
            vid,
            class,
            position,
            EntityKind::Monster(MonsterState {
                next_movement_time: 0,
                definition,
            }),
        );
        entity.move_speed = move_speed;
        entity
    }

    pub fn other(vid: Vid, class: EntityClassId, position: Vec2) -> Self {
        Self::new(vid, class, position, EntityKind::Other)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    /// Session id when this entity is player-controlled.
    pub fn session(&self) -> Option<Uuid> {
        match &self.kind {
            EntityKind::Player(handle) => Some(handle.session),
            _ => None,
        }
    }
}
