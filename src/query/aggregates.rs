//! Per-team unit listings and counts.
//!
//! Three disclosure regimes:
//!
//! - allied callers get raw, authoritative data from the registry indices
//! - enemy units that are typed count under the definition they show, so
//!   decoys fold into the bucket of the definition they imitate
//! - enemy units that are visible but not typed go to one `"unknown"`
//!   bucket, keeping bucket totals equal to the visible unit count
//!
//! Callers without sensor access get nothing.

use std::collections::{BTreeMap, BTreeSet};

use crate::access::allegiance::reads_team_raw;
use crate::access::resolver::{effective_unit_def, is_unit_typed, is_unit_visible};
use crate::access::{AccessContext, ReadScope};
use crate::error::{QueryError, QueryResult};
use crate::world::{TeamId, Unit, UnitDefId, UnitId, World};
use super::teams::parse_team;
use super::value::{Table, Value};
use super::{nothing, Args, QueryRegistry};

/// Bucket key for visible units of unknown type.
pub const UNKNOWN_BUCKET: &str = "unknown";

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetAllUnits", get_all_units);
    registry.register("GetTeamUnits", get_team_units);
    registry.register("GetTeamUnitsSorted", get_team_units_sorted);
    registry.register("GetTeamUnitsCounts", get_team_units_counts);
    registry.register("GetTeamUnitsByDefs", get_team_units_by_defs);
    registry.register("GetTeamUnitDefCount", get_team_unit_def_count);
    registry.register("GetTeamUnitCount", get_team_unit_count);
}

fn team_units<'w>(world: &'w World, team: TeamId) -> impl Iterator<Item = &'w Unit> + 'w {
    world.units.team_units(team).filter_map(|id| world.units.get(id))
}

/// Enemy view of a team: typed units per shown definition, plus the ids
/// of visible units not yet identified.
fn enemy_buckets(world: &World, ctx: &AccessContext, team: TeamId) -> (BTreeMap<UnitDefId, Vec<UnitId>>, Vec<UnitId>) {
    let mut typed: BTreeMap<UnitDefId, Vec<UnitId>> = BTreeMap::new();
    let mut unknown = Vec::new();
    for unit in team_units(world, team) {
        if !is_unit_visible(world, ctx, unit) {
            continue;
        }
        match effective_unit_def(world, ctx, unit) {
            Some(def) if is_unit_typed(world, ctx, unit) => typed.entry(def.id).or_default().push(unit.id),
            _ => unknown.push(unit.id),
        }
    }
    (typed, unknown)
}

fn get_all_units(world: &World, ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    let ids = world
        .units
        .iter()
        .filter(|unit| ctx.full_read || is_unit_visible(world, ctx, unit))
        .map(|unit| unit.id);
    Ok(vec![Value::from(Table::array(ids))])
}

fn get_team_units(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    let raw = reads_team_raw(world, ctx, team);
    let ids = team_units(world, team)
        .filter(|unit| raw || is_unit_visible(world, ctx, unit))
        .map(|unit| unit.id);
    Ok(vec![Value::from(Table::array(ids))])
}

/// `{ [defID] = {unitID, ...}, unknown = {unitID, ...} }`
fn get_team_units_sorted(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    let mut table = Table::new();
    if reads_team_raw(world, ctx, team) {
        let mut by_def: BTreeMap<UnitDefId, Vec<UnitId>> = BTreeMap::new();
        for unit in team_units(world, team) {
            by_def.entry(unit.def_id).or_default().push(unit.id);
        }
        for (def, ids) in by_def {
            table.set(i64::from(def), Table::array(ids));
        }
        return Ok(vec![table.into()]);
    }
    let (typed, unknown) = enemy_buckets(world, ctx, team);
    for (def, ids) in typed {
        table.set(i64::from(def), Table::array(ids));
    }
    if !unknown.is_empty() {
        table.set(UNKNOWN_BUCKET, Table::array(unknown));
    }
    Ok(vec![table.into()])
}

/// `{ [defID] = count, unknown = count }`
fn get_team_units_counts(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    let mut table = Table::new();
    if reads_team_raw(world, ctx, team) {
        for (def, count) in world.units.team_def_counts(team).filter(|&(_, count)| count > 0) {
            table.set(i64::from(def), count);
        }
        return Ok(vec![table.into()]);
    }
    let (typed, unknown) = enemy_buckets(world, ctx, team);
    for (def, ids) in typed {
        table.set(i64::from(def), ids.len());
    }
    if !unknown.is_empty() {
        table.set(UNKNOWN_BUCKET, unknown.len());
    }
    Ok(vec![table.into()])
}

/// Definitions whose units answer a search for `def_id`.
///
/// Allies search exactly what they name. Enemies cannot search for a
/// decoy definition, and a search for a real one also finds its decoys.
fn search_defs(world: &World, def_id: i64, allied: bool, out: &mut BTreeSet<UnitDefId>) {
    let Some(def) = u32::try_from(def_id).ok().and_then(|id| world.defs.unit_def(id)) else {
        return;
    };
    if allied {
        out.insert(def.id);
        return;
    }
    if def.decoy_of.is_some() {
        return;
    }
    out.insert(def.id);
    out.extend(world.defs.decoys_of(def.id).iter().copied());
}

fn get_team_units_by_defs(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    let allied = reads_team_raw(world, ctx, team);
    let mut defs = BTreeSet::new();
    match args.get(2) {
        Some(Value::Number(n)) => search_defs(world, *n as i64, allied, &mut defs),
        Some(Value::Table(t)) => {
            for (_, value) in t.iter() {
                if let Some(n) = value.as_number() {
                    search_defs(world, n as i64, allied, &mut defs);
                }
            }
        }
        _ => return Err(args.usage("teamID, unitDefID | { unitDefID, ... }")),
    }
    let ids = team_units(world, team)
        .filter(|unit| defs.contains(&unit.def_id))
        .filter(|unit| allied || is_unit_typed(world, ctx, unit))
        .map(|unit| unit.id);
    Ok(vec![Value::from(Table::array(ids))])
}

fn get_team_unit_def_count(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    let raw_def = args.check_int(2)?;
    let def = u32::try_from(raw_def)
        .ok()
        .and_then(|id| world.defs.unit_def(id))
        .ok_or(QueryError::BadUnitDef { func: args.func(), def_id: raw_def })?;

    if reads_team_raw(world, ctx, team) {
        return Ok(vec![world.units.def_count(team, def.id).into()]);
    }
    // Enemy decoys are never countable as themselves
    if def.decoy_of.is_some() {
        return Ok(vec![Value::from(0u32)]);
    }
    let mut defs = BTreeSet::new();
    search_defs(world, i64::from(def.id), false, &mut defs);
    let count = team_units(world, team)
        .filter(|unit| defs.contains(&unit.def_id) && is_unit_typed(world, ctx, unit))
        .count();
    Ok(vec![count.into()])
}

fn get_team_unit_count(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess {
        return nothing();
    }
    let team = parse_team(world, &args, 1)?.id;
    if reads_team_raw(world, ctx, team) {
        return Ok(vec![world.units.team_count(team).into()]);
    }
    let count = team_units(world, team).filter(|unit| is_unit_visible(world, ctx, unit)).count();
    Ok(vec![count.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fixture::*;
    use crate::core::vec3::FixedVec3;
    use crate::sensor::LosStatus;

    /// Team 1 owns a seen tank, a seen decoy, a radar-only tank and a
    /// hidden tank, as observed by ally team 0.
    fn scouted() -> (World, [UnitId; 4]) {
        let mut world = world();
        let mut spawn = |def| world.spawn_unit(def, 1, FixedVec3::from_ints(600, 0, 600)).unwrap();
        let ids = [spawn(42), spawn(43), spawn(42), spawn(42)];
        world.ledger.set_status(ids[0], 0, LosStatus::seen());
        world.ledger.set_status(ids[1], 0, LosStatus::seen());
        world.ledger.set_status(ids[2], 0, LosStatus::radar_blip());
        world.ledger.set_status(ids[3], 0, LosStatus::NONE);
        (world, ids)
    }

    #[test]
    fn test_counts_fold_decoys_and_bucket_unknown() {
        let (world, _) = scouted();
        let enemy = AccessContext::as_team(&world, 0);
        let out = call(&world, &enemy, "GetTeamUnitsCounts", &[n(1)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.index(42), Some(&n(2)));
        assert_eq!(table.index(43), None);
        assert_eq!(table.get_str(UNKNOWN_BUCKET), Some(&n(1)));

        let visible = call(&world, &enemy, "GetTeamUnitCount", &[n(1)]).unwrap();
        assert_eq!(visible, vec![n(3)]);

        let own = AccessContext::as_team(&world, 1);
        let out = call(&world, &own, "GetTeamUnitsCounts", &[n(1)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.index(42), Some(&n(3)));
        assert_eq!(table.index(43), Some(&n(1)));
        assert!(table.get_str(UNKNOWN_BUCKET).is_none());
    }

    #[test]
    fn test_sorted_lists_ids_per_bucket() {
        let (world, ids) = scouted();
        let enemy = AccessContext::as_team(&world, 0);
        let out = call(&world, &enemy, "GetTeamUnitsSorted", &[n(1)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.index(42), Some(&Value::from(Table::array([ids[0], ids[1]]))));
        assert_eq!(table.get_str(UNKNOWN_BUCKET), Some(&Value::from(Table::array([ids[2]]))));
    }

    #[test]
    fn test_def_count_hides_decoys_from_enemies() {
        let (world, _) = scouted();
        let enemy = AccessContext::as_team(&world, 0);
        assert_eq!(call(&world, &enemy, "GetTeamUnitDefCount", &[n(1), n(42)]).unwrap(), vec![n(2)]);
        assert_eq!(call(&world, &enemy, "GetTeamUnitDefCount", &[n(1), n(43)]).unwrap(), vec![n(0)]);
        assert_eq!(
            call(&world, &enemy, "GetTeamUnitDefCount", &[n(1), n(999)]),
            Err(QueryError::BadUnitDef { func: "GetTeamUnitDefCount", def_id: 999 })
        );
    }

    #[test]
    fn test_by_defs_accepts_number_or_table() {
        let (world, ids) = scouted();
        let enemy = AccessContext::as_team(&world, 0);
        let out = call(&world, &enemy, "GetTeamUnitsByDefs", &[n(1), n(42)]).unwrap();
        assert_eq!(out, vec![Value::from(Table::array([ids[0], ids[1]]))]);

        let own = AccessContext::as_team(&world, 1);
        let defs = Value::from(Table::array([43]));
        let out = call(&world, &own, "GetTeamUnitsByDefs", &[n(1), defs]).unwrap();
        assert_eq!(out, vec![Value::from(Table::array([ids[1]]))]);

        assert!(matches!(
            call(&world, &own, "GetTeamUnitsByDefs", &[n(1)]),
            Err(QueryError::Usage { .. })
        ));
    }

    #[test]
    fn test_no_access_gets_nothing() {
        let (world, _) = scouted();
        let ctx = AccessContext::no_access();
        for name in ["GetTeamUnits", "GetTeamUnitsSorted", "GetTeamUnitsCounts", "GetTeamUnitCount"] {
            assert!(call(&world, &ctx, name, &[n(1)]).unwrap().is_empty(), "{name}");
        }
    }

    #[test]
    fn test_all_units_visible_only() {
        let (world, ids) = scouted();
        let out = call(&world, &AccessContext::as_team(&world, 0), "GetAllUnits", &[]).unwrap();
        assert_eq!(out, vec![Value::from(Table::array([ids[0], ids[1], ids[2]]))]);
        let out = call(&world, &AccessContext::spectator(), "GetAllUnits", &[]).unwrap();
        assert_eq!(out[0].as_table().map(Table::len), Some(4));
    }
}
