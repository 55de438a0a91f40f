use crate::game::constants::sim;

/// World simulation configuration
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Whether the tick scheduler runs at all
    pub enabled: bool,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Clamp for a single wall-clock frame, in milliseconds
    pub max_frame_ms: u64,
    /// Seconds between tick-rate reports
    pub report_interval_secs: u64,
    /// How long stop() waits for the tick thread, in milliseconds
    pub join_timeout_ms: u64,
    /// Radius of a player's area of interest, in world units
    pub view_distance: f32,
    /// Entries per quadtree node before it subdivides
    pub quadtree_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_rate: sim::TICK_RATE,
            max_frame_ms: sim::MAX_FRAME_MS,
            report_interval_secs: sim::REPORT_INTERVAL_SECS,
            join_timeout_ms: sim::JOIN_TIMEOUT_MS,
            view_distance: sim::VIEW_DISTANCE,
            quadtree_capacity: crate::game::constants::tree::NODE_CAPACITY,
        }
    }
}

impl WorldConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(enabled) = std::env::var("WORLD_ENABLED") {
            match enabled.parse::<bool>() {
                Ok(parsed) => config.enabled = parsed,
                Err(_) => tracing::warn!("Invalid WORLD_ENABLED '{}', using default", enabled),
            }
        }

        if let Ok(rate) = std::env::var("WORLD_TICK_RATE") {
            if let Ok(parsed) = rate.parse::<u32>() {
                if parsed > 0 && parsed <= 1000 {
                    config.tick_rate = parsed;
                } else {
                    tracing::warn!("WORLD_TICK_RATE must be 1-1000, using default");
                }
            } else {
                tracing::warn!("Invalid WORLD_TICK_RATE '{}', using default", rate);
            }
        }

        if let Ok(clamp) = std::env::var("WORLD_MAX_FRAME_MS") {
            if let Ok(parsed) = clamp.parse::<u64>() {
                if parsed > 0 {
                    config.max_frame_ms = parsed;
                } else {
                    tracing::warn!("WORLD_MAX_FRAME_MS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid WORLD_MAX_FRAME_MS '{}', using default", clamp);
            }
        }

        if let Ok(interval) = std::env::var("WORLD_REPORT_INTERVAL_SECS") {
            if let Ok(parsed) = interval.parse::<u64>() {
                config.report_interval_secs = parsed.max(1);
            } else {
                tracing::warn!(
                    "Invalid WORLD_REPORT_INTERVAL_SECS '{}', using default",
                    interval
                );
            }
        }

        if let Ok(timeout) = std::env::var("WORLD_JOIN_TIMEOUT_MS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                config.join_timeout_ms = parsed;
            } else {
                tracing::warn!("Invalid WORLD_JOIN_TIMEOUT_MS '{}', using default", timeout);
            }
        }

        if let Ok(distance) = std::env::var("WORLD_VIEW_DISTANCE") {
            if let Ok(parsed) = distance.parse::<f32>() {
                if parsed > 0.0 {
                    config.view_distance = parsed;
                } else {
                    tracing::warn!("WORLD_VIEW_DISTANCE must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid WORLD_VIEW_DISTANCE '{}', using default", distance);
            }
        }

        if let Ok(capacity) = std::env::var("WORLD_QUADTREE_CAPACITY") {
            if let Ok(parsed) = capacity.parse::<usize>() {
                if parsed > 0 {
                    config.quadtree_capacity = parsed;
                } else {
                    tracing::warn!("WORLD_QUADTREE_CAPACITY must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid WORLD_QUADTREE_CAPACITY '{}', using default", capacity);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate == 0 {
            return Err("tick_rate cannot be 0".to_string());
        }
        if self.max_frame_ms == 0 {
            return Err("max_frame_ms cannot be 0".to_string());
        }
        if !self.view_distance.is_finite() || self.view_distance <= 0.0 {
            return Err("view_distance must be positive and finite".to_string());
        }
        if self.quadtree_capacity == 0 {
            return Err("quadtree_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
