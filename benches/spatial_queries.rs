//! # Spatial Query Benchmark
//!
//! Region and nearest-unit queries over a populated map, through the
//! full dispatch path (argument checking, visibility filtering).
//!
//! Run with: `cargo bench --bench spatial_queries`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use synced_read::core::fixed::from_int;
use synced_read::world::{DefRegistry, Ground, TeamRegistry, UnitDef};
use synced_read::{AccessContext, FixedVec3, QueryRegistry, RulesConfig, Value, World};

/// Map edge in squares (4096 elmos).
const MAP_SQUARES: usize = 512;

fn populated_world(units: usize) -> World {
    let mut defs = DefRegistry::new();
    let mut tank = UnitDef::new(1, "tank", from_int(100));
    tank.sensors.los = from_int(160);
    tank.sensors.radar = from_int(400);
    defs.add_unit_def(tank).expect("unit def");
    let mut teams = TeamRegistry::new(2);
    teams.add_team(0).expect("team");
    teams.add_team(1).expect("team");
    let mut world = World::new(
        RulesConfig::default(),
        defs,
        teams,
        Ground::flat(MAP_SQUARES, MAP_SQUARES, 0),
        7,
    );

    let mut rng = StdRng::seed_from_u64(42);
    for i in 0..units {
        let x = rng.gen_range(0..4096);
        let z = rng.gen_range(0..4096);
        world
            .spawn_unit(1, i % 2, FixedVec3::from_ints(x, 0, z))
            .expect("spawn");
    }
    world
}

fn n(x: f64) -> Value {
    Value::Number(x)
}

fn bench_region_queries(c: &mut Criterion) {
    let queries = QueryRegistry::new();
    let mut group = c.benchmark_group("region_queries");

    for count in [1_000, 5_000] {
        let world = populated_world(count);
        let team = AccessContext::as_team(&world, 0);
        let spectator = AccessContext::spectator();

        group.bench_with_input(BenchmarkId::new("rectangle_team", count), &count, |b, _| {
            let args = [n(1000.0), n(1000.0), n(2000.0), n(2000.0)];
            b.iter(|| black_box(queries.call(&world, &team, "GetUnitsInRectangle", &args)))
        });
        group.bench_with_input(BenchmarkId::new("rectangle_spectator", count), &count, |b, _| {
            let args = [n(1000.0), n(1000.0), n(2000.0), n(2000.0)];
            b.iter(|| black_box(queries.call(&world, &spectator, "GetUnitsInRectangle", &args)))
        });
        group.bench_with_input(BenchmarkId::new("sphere_team", count), &count, |b, _| {
            let args = [n(2048.0), n(0.0), n(2048.0), n(600.0)];
            b.iter(|| black_box(queries.call(&world, &team, "GetUnitsInSphere", &args)))
        });
        group.bench_with_input(BenchmarkId::new("cylinder_enemy", count), &count, |b, _| {
            let args = [n(2048.0), n(2048.0), n(600.0), n(-4.0)];
            b.iter(|| black_box(queries.call(&world, &team, "GetUnitsInCylinder", &args)))
        });
    }

    group.finish();
}

fn bench_nearest_enemy(c: &mut Criterion) {
    let queries = QueryRegistry::new();
    let world = populated_world(5_000);
    let ctx = AccessContext::as_team(&world, 0);
    let probe = world.units.team_units(0).next().expect("team 0 unit");

    c.bench_function("nearest_enemy_5k", |b| {
        let args = [Value::from(probe), n(1000.0)];
        b.iter(|| black_box(queries.call(&world, &ctx, "GetUnitNearestEnemy", &args)))
    });
}

criterion_group!(benches, bench_region_queries, bench_nearest_enemy);
criterion_main!(benches);
