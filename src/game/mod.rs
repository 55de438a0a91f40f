pub mod constants;
pub mod entity;
pub mod map;
pub mod quadtree;
pub mod scheduler;
pub mod systems;
pub mod terrain;
pub mod vid;
pub mod world;

/// Errors raised at construction time. Steady-state tick operations never
/// return errors; invalid geometry fails fast here instead.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid spatial bounds: {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },

    #[error("invalid quadtree capacity: {0}")]
    InvalidCapacity(usize),

    #[error("invalid terrain grid: {0}")]
    InvalidTerrain(String),
}
