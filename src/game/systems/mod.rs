pub mod despawn;
pub mod monster;
pub mod movement;
pub mod spawn;
pub mod update;

use hashbrown::HashSet;

use crate::game::vid::Vid;

/// Reusable per-tick scratch buffers, owned by the orchestrator and passed
/// explicitly into each system. Each user clears what it borrows before use;
/// nothing here survives a tick semantically.
#[derive(Default)]
pub struct TickContext {
    /// Snapshot of live vids for stable iteration while the arena mutates
    pub vid_buf: Vec<Vid>,
    /// Raw spatial query results
    pub query_buf: Vec<Vid>,
    /// Fresh view-distance membership during interest diffing
    pub fresh: HashSet<Vid>,
    /// Links to break this pass
    pub gone: Vec<Vid>,
    /// Links to establish this pass
    pub added: Vec<Vid>,
    /// Nearby-set snapshot for notification fan-out
    pub nearby_buf: Vec<Vid>,
}

impl TickContext {
    pub fn new() -> Self {
        Self::default()
    }
}
