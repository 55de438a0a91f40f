//! Contracts for the static game-data collaborators
//!
//! Loading these from disk or another service is outside the simulation core;
//! only the query surfaces matter here. `StaticAnimations` is the in-memory
//! implementation used by tests and the demo wiring in `main`.

use hashbrown::HashMap;

use crate::game::entity::EntityClassId;

/// Run-cycle metrics for one entity class, taken from animation data: how far
/// the cycle travels vertically and how long it plays.
#[derive(Debug, Clone, Copy)]
pub struct AnimationInfo {
    pub travel_distance: f32,
    pub duration_ms: u32,
}

/// Read-only animation data keyed by entity class.
pub trait AnimationProvider: Send + Sync {
    /// Running-animation metrics, or None when the class has no run cycle.
    fn run_animation(&self, class: EntityClassId) -> Option<AnimationInfo>;
}

/// Immutable per-species monster data shared by every instance.
#[derive(Debug, Clone)]
pub struct MonsterDefinition {
    pub class: EntityClassId,
    pub name: String,
    /// Movement-speed stat applied on top of the animation-derived base speed
    pub move_speed: f32,
    /// Wander candidates are offsets within this radius of the current position
    pub wander_radius: f32,
    /// Base delay between wander decisions (ms)
    pub wander_interval_ms: u64,
    /// Random extra delay added on reschedule (ms)
    pub wander_jitter_ms: u64,
}

/// In-memory animation table.
#[derive(Debug, Default)]
pub struct StaticAnimations {
    table: HashMap<EntityClassId, AnimationInfo>,
}

impl StaticAnimations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: EntityClassId, info: AnimationInfo) -> Self {
        self.table.insert(class, info);
        self
    }
}

impl AnimationProvider for StaticAnimations {
    fn run_animation(&self, class: EntityClassId) -> Option<AnimationInfo> {
        self.table.get(&class).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_animations_lookup() {
        let animations = StaticAnimations::new().with(
            1,
            AnimationInfo {
                travel_distance: 100.0,
                duration_ms: 1_000,
            },
        );
        assert!(animations.run_animation(1).is_some());
        assert!(animations.run_animation(2).is_none());
    }
}
