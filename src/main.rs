//! Synced Read demo
//!
//! Builds a small two-sided world, runs it for a few seconds of game
//! time and prints what each side is allowed to read about the other.
//!
//! Usage: `synced-read [rules.json]`

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use synced_read::{
    core::fixed::{from_int, GAME_SPEED},
    world::{DefRegistry, FeatureDef, Ground, TeamRegistry, UnitDef},
    AccessContext, DeterministicRng, FixedVec3, QueryRegistry, RulesConfig, Value, World, VERSION,
};

const DEMO_FRAMES: u32 = GAME_SPEED * 10;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Synced Read v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => RulesConfig::load(&path).with_context(|| format!("reading rules config {path}"))?,
        None => RulesConfig::default(),
    };

    let mut world = demo_world(config)?;
    let scout = world.spawn_unit(10, 1, FixedVec3::from_ints(900, 0, 100))?;
    let radar = world.spawn_unit(20, 0, FixedVec3::from_ints(300, 0, 300))?;
    world.spawn_feature(1, None, FixedVec3::from_ints(500, 0, 500))?;
    info!(scout, radar, "demo units spawned");

    let queries = QueryRegistry::new();
    info!(queries = queries.len(), "query registry ready");

    let mut rng = DeterministicRng::new(world.rng_seed);
    for _ in 0..DEMO_FRAMES {
        let step = world.advance_frame(&mut rng);
        // Scout drives towards the radar, two elmos per frame.
        if let Some(pos) = world.units.get(scout).map(|u| u.pos) {
            let next = FixedVec3::new(pos.x - from_int(2), pos.y, pos.z + from_int(2));
            world.move_unit(scout, next)?;
        }
        if step.frame % GAME_SPEED == 0 {
            report(&world, &queries, scout)?;
        }
    }

    let hash = world.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    Ok(())
}

fn demo_world(config: RulesConfig) -> Result<World> {
    let mut defs = DefRegistry::new();
    let mut scout = UnitDef::new(10, "scout", from_int(120));
    scout.sensors.los = from_int(200);
    defs.add_unit_def(scout)?;
    let mut radar = UnitDef::new(20, "radar", from_int(300));
    radar.is_building = true;
    radar.sensors.los = from_int(150);
    radar.sensors.radar = from_int(700);
    defs.add_unit_def(radar)?;
    defs.add_feature_def(FeatureDef::new(1, "rock", from_int(50)))?;

    let mut teams = TeamRegistry::new(2);
    teams.add_team(0)?;
    teams.add_team(1)?;

    config.validate()?;
    Ok(World::new(config, defs, teams, Ground::flat(128, 128, 0), 0x5EED))
}

/// What team 0 and a spectator read about the scout this second.
fn report(world: &World, queries: &QueryRegistry, scout: u32) -> Result<()> {
    let id = [Value::from(scout)];
    for (who, ctx) in [
        ("team0", AccessContext::as_team(world, 0)),
        ("spectator", AccessContext::spectator()),
    ] {
        let los = serde_json::to_string(&queries.call(world, &ctx, "GetUnitLosState", &id)?)?;
        let pos = serde_json::to_string(&queries.call(world, &ctx, "GetUnitPosition", &id)?)?;
        let health = serde_json::to_string(&queries.call(world, &ctx, "GetUnitHealth", &id)?)?;
        info!(
            frame = world.frame,
            who,
            los = %los,
            pos = %pos,
            health = %health,
            "scout"
        );
    }
    Ok(())
}
