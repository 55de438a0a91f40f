//! Fixed-timestep tick scheduler
//!
//! Drives a [`World`] from a dedicated thread at a fixed tick rate using an
//! accumulator loop. Wall-clock frames longer than the configured clamp are
//! truncated so a stall produces a slow-motion hiccup instead of a spiral of
//! catch-up ticks. Simulation time passed to the world is milliseconds since
//! scheduler start, derived from a monotonic clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::config::WorldConfig;
use crate::game::world::World;

pub struct Scheduler {
    enabled: bool,
    timestep: Duration,
    max_frame: Duration,
    report_interval: Duration,
    join_timeout: Duration,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(config: &WorldConfig) -> Self {
        // validate() rejects tick_rate 0; clamp so a raw config cannot divide by zero
        let tick_rate = config.tick_rate.max(1);
        Self {
            enabled: config.enabled,
            timestep: Duration::from_nanos(1_000_000_000 / tick_rate as u64),
            max_frame: Duration::from_millis(config.max_frame_ms),
            report_interval: Duration::from_secs(config.report_interval_secs),
            join_timeout: Duration::from_millis(config.join_timeout_ms),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Takes ownership of the world and starts ticking it. No-op when the
    /// scheduler is disabled by config or already running.
    pub fn start(&mut self, world: World) {
        if !self.enabled {
            info!("tick scheduler disabled, world will not advance");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("tick scheduler already running, start ignored");
            return;
        }

        let running = self.running.clone();
        let timestep = self.timestep;
        let max_frame = self.max_frame;
        let report_interval = self.report_interval;

        let spawned = thread::Builder::new()
            .name("world-tick".into())
            .spawn(move || run_loop(world, running, timestep, max_frame, report_interval));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!(
                    timestep_ms = self.timestep.as_millis() as u64,
                    "tick scheduler started"
                );
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                error!(error = %e, "failed to spawn tick thread");
            }
        }
    }

    /// Signals the tick thread to finish its current frame and waits up to
    /// the join timeout for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return;
        };

        let deadline = Instant::now() + self.join_timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("tick thread did not stop within timeout, detaching");
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        if handle.join().is_err() {
            error!("tick thread panicked");
        } else {
            info!("tick scheduler stopped");
        }
    }
}

fn run_loop(
    mut world: World,
    running: Arc<AtomicBool>,
    timestep: Duration,
    max_frame: Duration,
    report_interval: Duration,
) {
    let epoch = Instant::now();
    let mut previous = epoch;
    let mut accumulator = Duration::ZERO;
    let mut last_report = epoch;
    let mut ticks_since_report: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let frame = (now - previous).min(max_frame);
        previous = now;
        accumulator += frame;

        while accumulator >= timestep {
            accumulator -= timestep;
            world.tick(epoch.elapsed().as_millis() as u64);
            ticks_since_report += 1;
        }

        if now - last_report >= report_interval {
            let elapsed = (now - last_report).as_secs_f64();
            let actual_tps = ticks_since_report as f64 / elapsed;
            let target_tps = 1.0 / timestep.as_secs_f64();
            info!(
                actual_tps = format!("{actual_tps:.1}"),
                target_tps = format!("{target_tps:.1}"),
                entities = world.entity_count(),
                ticks = world.tick_count(),
                "tick report"
            );
            last_report = now;
            ticks_since_report = 0;
        }

        if let Some(remainder) = timestep.checked_sub(accumulator) {
            thread::sleep(remainder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StaticAnimations;
    use crate::net::notify::LogSink;

    fn test_world(config: &WorldConfig) -> World {
        World::new(
            config,
            Arc::new(LogSink),
            Arc::new(StaticAnimations::new()),
        )
    }

    fn fast_config() -> WorldConfig {
        WorldConfig {
            tick_rate: 100,
            join_timeout_ms: 1_000,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_disabled_scheduler_does_not_start() {
        let config = WorldConfig {
            enabled: false,
            ..WorldConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        scheduler.start(test_world(&config));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_start_then_stop() {
        let config = fast_config();
        let mut scheduler = Scheduler::new(&config);
        scheduler.start(test_world(&config));
        assert!(scheduler.is_running());

        thread::sleep(Duration::from_millis(100));
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_double_start_is_ignored() {
        let config = fast_config();
        let mut scheduler = Scheduler::new(&config);
        scheduler.start(test_world(&config));
        scheduler.start(test_world(&config));
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[test]
    fn test_zero_tick_rate_clamps_instead_of_dividing_by_zero() {
        let config = WorldConfig {
            tick_rate: 0,
            enabled: false,
            ..WorldConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        scheduler.start(test_world(&config));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let config = fast_config();
        let mut scheduler = Scheduler::new(&config);
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
