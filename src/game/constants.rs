/// Spatial index tuning
pub mod tree {
    /// Starting leaf bucket capacity for fresh quadtree nodes
    pub const NODE_CAPACITY: usize = 8;
    /// Nodes narrower than this on either axis grow their bucket instead of
    /// splitting, which caps tree depth in crowded corners
    pub const MIN_SPLIT_EXTENT: f32 = 16.0;
}

/// Monster behaviour tuning
pub mod monster {
    /// Candidate positions tried per wander decision before giving up
    pub const MOVE_ATTEMPTS: usize = 16;
}

/// Simulation defaults (overridable via WorldConfig)
pub mod sim {
    /// Server tick rate in Hz
    pub const TICK_RATE: u32 = 20;
    /// Longest frame the accumulator will credit after a stall (ms)
    pub const MAX_FRAME_MS: u64 = 250;
    /// Interest-management query radius in world units
    pub const VIEW_DISTANCE: f32 = 320.0;
    /// Seconds between tick-rate reports
    pub const REPORT_INTERVAL_SECS: u64 = 30;
    /// Bound on the scheduler join at shutdown (ms)
    pub const JOIN_TIMEOUT_MS: u64 = 2_000;
}
