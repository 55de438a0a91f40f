use std::sync::Arc;

use tracing::{info, Level};

use mistvale_world::config::WorldConfig;
use mistvale_world::data::{AnimationInfo, MonsterDefinition, StaticAnimations};
use mistvale_world::game::map::Map;
use mistvale_world::game::scheduler::Scheduler;
use mistvale_world::game::vid::VidAllocator;
use mistvale_world::game::world::World;
use mistvale_world::net::notify::LogSink;
use mistvale_world::util::vec2::Vec2;

const CLASS_BOAR: u32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Mistvale World v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = WorldConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: tick_rate={}, view_distance={}",
        config.tick_rate, config.view_distance
    );

    let animations = Arc::new(StaticAnimations::new().with(
        CLASS_BOAR,
        AnimationInfo {
            travel_distance: 120.0,
            duration_ms: 1_000,
        },
    ));

    let mut world = World::new(&config, Arc::new(LogSink), animations);
    world.add_map(Map::new(
        "mistvale",
        Vec2::ZERO,
        4096.0,
        4096.0,
        config.quadtree_capacity,
    )?);

    // Seed a few wandering monsters so a bare server has something to simulate
    let vids = Arc::new(VidAllocator::new());
    let boar = Arc::new(MonsterDefinition {
        class: CLASS_BOAR,
        name: "mist boar".into(),
        move_speed: 1.0,
        wander_radius: 96.0,
        wander_interval_ms: 5_000,
        wander_jitter_ms: 2_000,
    });
    let spawns = world.maps()[0].spawn_queue();
    for i in 0..8u32 {
        let position = Vec2::new(512.0 + 256.0 * (i % 4) as f32, 512.0 + 256.0 * (i / 4) as f32);
        spawns.send(Box::new(mistvale_world::game::entity::Entity::monster(
            vids.allocate(),
            boar.clone(),
            position,
        )))?;
    }

    let mut scheduler = Scheduler::new(&config);
    scheduler.start(world);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.stop();
    info!("World stopped");

    Ok(())
}
