//! Property-based tests for the visibility guarantees.
//!
//! - Disclosure tiers nest: anything shown in LOS is also typed, anything
//!   typed is also on the radar view
//! - Destroyed ids read as absent from every perspective
//! - Team counts agree with team listings for every observer
//! - Per-definition count buckets, unknown included, sum to the team count
//! - Identical worlds answer identically, radar error included

use proptest::prelude::*;

use synced_read::core::fixed::from_int;
use synced_read::sensor::{LosStatus, LOS_INLOS};
use synced_read::world::{DefRegistry, Ground, TeamRegistry, UnitDef};
use synced_read::{AccessContext, DeterministicRng, FixedVec3, QueryRegistry, RulesConfig, Value, World};

// =============================================================================
// HELPERS
// =============================================================================

fn world(seed: u64) -> World {
    let mut defs = DefRegistry::new();
    defs.add_unit_def(UnitDef::new(42, "tank", from_int(100))).unwrap();
    let mut decoy = UnitDef::new(43, "faketank", from_int(50));
    decoy.decoy_of = Some(42);
    defs.add_unit_def(decoy).unwrap();
    let mut teams = TeamRegistry::new(2);
    teams.add_team(0).unwrap();
    teams.add_team(1).unwrap();
    World::new(RulesConfig::default(), defs, teams, Ground::flat(128, 128, 0), seed)
}

fn id(unit: u32) -> [Value; 1] {
    [Value::from(unit)]
}

fn sensor_passes() -> impl Strategy<Value = Vec<(bool, bool)>> {
    prop::collection::vec((any::<bool>(), any::<bool>()), 0..12)
}

fn status_after(passes: &[(bool, bool)]) -> LosStatus {
    passes
        .iter()
        .fold(LosStatus::NONE, |status, &(los, radar)| status.updated(los, radar))
}

/// Nothing, radar blip, typed but out of LOS, in LOS.
fn status_of(kind: u8) -> LosStatus {
    match kind {
        0 => LosStatus::NONE,
        1 => LosStatus::radar_blip(),
        2 => LosStatus::seen().without(LOS_INLOS),
        _ => LosStatus::seen(),
    }
}

/// Team 1 units with the given (status, is decoy) pairs, observed by ally team 0.
fn scouted(seed: u64, units: &[(u8, bool)]) -> World {
    let mut world = world(seed);
    for (i, &(kind, decoy)) in units.iter().enumerate() {
        let def = if decoy { 43 } else { 42 };
        let unit = world.spawn_unit(def, 1, FixedVec3::from_ints(40 * i as i64 + 20, 0, 700)).unwrap();
        world.ledger.set_status(unit, 0, status_of(kind));
    }
    world
}

fn contexts(world: &World) -> Vec<AccessContext> {
    vec![
        AccessContext::synced(),
        AccessContext::spectator(),
        AccessContext::no_access(),
        AccessContext::as_team(world, 0),
        AccessContext::as_team(world, 1),
    ]
}

// =============================================================================
// DISCLOSURE TIERS
// =============================================================================

proptest! {
    #[test]
    fn disclosure_tiers_nest(passes in sensor_passes()) {
        let mut world = world(1);
        let tank = world.spawn_unit(42, 1, FixedVec3::from_ints(400, 0, 400)).unwrap();
        world.ledger.set_status(tank, 0, status_after(&passes));

        let queries = QueryRegistry::new();
        let ctx = AccessContext::as_team(&world, 0);
        let health = queries.call(&world, &ctx, "GetUnitHealth", &id(tank)).unwrap();
        let def = queries.call(&world, &ctx, "GetUnitDefID", &id(tank)).unwrap();
        let pos = queries.call(&world, &ctx, "GetUnitPosition", &id(tank)).unwrap();
        let internals = queries.call(&world, &ctx, "GetUnitResources", &id(tank)).unwrap();

        if !health.is_empty() {
            prop_assert!(!def.is_empty());
        }
        if !def.is_empty() {
            prop_assert!(!pos.is_empty());
        }
        prop_assert!(internals.is_empty());
    }

    #[test]
    fn destroyed_units_read_as_absent(count in 1usize..8, doomed in prop::collection::vec(any::<bool>(), 8)) {
        let mut world = world(2);
        let ids: Vec<u32> = (0..count)
            .map(|i| world.spawn_unit(42, i % 2, FixedVec3::from_ints(100 + 50 * i as i64, 0, 300)).unwrap())
            .collect();
        let mut dead = Vec::new();
        for (unit, kill) in ids.iter().zip(&doomed) {
            if *kill {
                world.destroy_unit(*unit).unwrap();
                dead.push(*unit);
            }
        }

        let queries = QueryRegistry::new();
        for ctx in contexts(&world) {
            for unit in &dead {
                let valid = queries.call(&world, &ctx, "ValidUnitID", &id(*unit)).unwrap();
                prop_assert_eq!(valid, vec![Value::Bool(false)]);
                prop_assert!(queries.call(&world, &ctx, "GetUnitPosition", &id(*unit)).unwrap().is_empty());
                prop_assert!(queries.call(&world, &ctx, "GetUnitIsDead", &id(*unit)).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn team_count_matches_listing(units in prop::collection::vec((0u8..4, any::<bool>()), 0..10)) {
        let world = scouted(3, &units);

        let queries = QueryRegistry::new();
        let team = [Value::from(1u32)];
        for ctx in contexts(&world) {
            let count = queries.call(&world, &ctx, "GetTeamUnitCount", &team).unwrap();
            let listing = queries.call(&world, &ctx, "GetTeamUnits", &team).unwrap();
            match (count.first(), listing.first()) {
                (Some(count), Some(listing)) => {
                    let listed = listing.as_table().map_or(0, |t| t.array_len());
                    prop_assert_eq!(count.as_number(), Some(listed as f64));
                }
                (None, None) => {}
                other => prop_assert!(false, "count and listing disagree on access: {:?}", other),
            }
        }
    }

    #[test]
    fn count_buckets_sum_to_team_count(units in prop::collection::vec((0u8..4, any::<bool>()), 0..12)) {
        let world = scouted(4, &units);

        let queries = QueryRegistry::new();
        let team = [Value::from(1u32)];
        for ctx in contexts(&world) {
            let count = queries.call(&world, &ctx, "GetTeamUnitCount", &team).unwrap();
            let buckets = queries.call(&world, &ctx, "GetTeamUnitsCounts", &team).unwrap();
            match (count.first(), buckets.first()) {
                (Some(count), Some(buckets)) => {
                    let table = buckets.as_table().unwrap();
                    let total: f64 = table.iter().filter_map(|(_, v)| v.as_number()).sum();
                    prop_assert_eq!(count.as_number(), Some(total));
                }
                (None, None) => {}
                other => prop_assert!(false, "count and buckets disagree on access: {:?}", other),
            }
        }

        // Enemies never see a decoy bucket, only the definition it imitates
        let enemy = AccessContext::as_team(&world, 0);
        let buckets = queries.call(&world, &enemy, "GetTeamUnitsCounts", &team).unwrap();
        let table = buckets[0].as_table().unwrap();
        prop_assert!(table.iter().all(|(_, v)| v.as_number() != Some(0.0)));
        let visible = units.iter().filter(|(kind, _)| *kind > 0).count() as f64;
        let total: f64 = table.iter().filter_map(|(_, v)| v.as_number()).sum();
        prop_assert_eq!(total, visible);
    }

    #[test]
    fn identical_worlds_answer_identically(frames in 0u32..120, x in 50i64..950, z in 50i64..950) {
        let run = || {
            let mut world = world(99);
            let tank = world.spawn_unit(42, 1, FixedVec3::from_ints(x, 0, z)).unwrap();
            world.ledger.set_status(tank, 0, LosStatus::radar_blip());
            let mut rng = DeterministicRng::new(world.rng_seed);
            for _ in 0..frames {
                world.advance_frame(&mut rng);
            }
            let ctx = AccessContext::as_team(&world, 0);
            let pos = QueryRegistry::new().call(&world, &ctx, "GetUnitPosition", &id(tank)).unwrap();
            (pos, world.compute_hash())
        };
        prop_assert_eq!(run(), run());
    }
}
