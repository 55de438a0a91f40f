//! Visibility notifications
//!
//! The simulation decides *what* a player perceives; turning that into wire
//! bytes belongs to the session layer behind [`NotificationSink`]. Sends are
//! fire-and-forget: they never block a tick and delivery failures are
//! invisible here.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::game::entity::{Entity, EntityClassId, EntityKindTag};
use crate::game::vid::Vid;
use crate::util::vec2::Vec2;

/// Protocol-agnostic perception updates pushed to player sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VisibilityMessage {
    /// An entity entered the viewer's area of interest
    Appear {
        vid: Vid,
        kind: EntityKindTag,
        class: EntityClassId,
        position: Vec2,
        rotation: f32,
    },
    /// An entity left the viewer's area of interest
    Disappear { vid: Vid },
    /// A visible entity committed a new trajectory
    Move {
        vid: Vid,
        from: Vec2,
        to: Vec2,
        duration_ms: u64,
    },
}

/// Fire-and-forget delivery to a player session.
pub trait NotificationSink: Send + Sync {
    fn send(&self, session: Uuid, message: VisibilityMessage);
}

/// Builds show/hide/move messages for entity+viewer pairs and pushes them
/// through the sink.
pub struct VisibilityPusher {
    sink: Arc<dyn NotificationSink>,
}

impl VisibilityPusher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Tell `viewer` that `target` is now visible.
    pub fn show(&self, viewer: Uuid, target: &Entity) {
        self.sink.send(
            viewer,
            VisibilityMessage::Appear {
                vid: target.vid,
                kind: target.kind.tag(),
                class: target.class,
                position: target.position,
                rotation: target.rotation,
            },
        );
    }

    /// Tell `viewer` that the entity with `vid` is no longer visible.
    pub fn hide(&self, viewer: Uuid, vid: Vid) {
        self.sink.send(viewer, VisibilityMessage::Disappear { vid });
    }

    /// Tell `viewer` about a visible entity's committed trajectory.
    pub fn movement(&self, viewer: Uuid, entity: &Entity) {
        self.sink.send(
            viewer,
            VisibilityMessage::Move {
                vid: entity.vid,
                from: entity.movement.start,
                to: entity.movement.target,
                duration_ms: entity.movement.duration_ms,
            },
        );
    }
}

/// Sink that logs every message; stands in for a real session layer.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn send(&self, session: Uuid, message: VisibilityMessage) {
        debug!(%session, ?message, "visibility push");
    }
}

/// Sink that records every message, for tests and local inspection.
#[derive(Default)]
pub struct RecordingSink {
    messages: parking_lot::Mutex<Vec<(Uuid, VisibilityMessage)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(Uuid, VisibilityMessage)> {
        std::mem::take(&mut self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, session: Uuid, message: VisibilityMessage) {
        self.messages.lock().push((session, message));
    }
}
