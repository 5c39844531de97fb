//! Region and nearest-unit queries.
//!
//! Every unit region query is one call to [`units_in_region`] with the
//! shape parsed from the arguments and the allegiance filter of the
//! trailing argument.

use crate::access::resolver::{is_feature_visible, is_projectile_visible};
use crate::access::{AccessContext, Allegiance};
use crate::core::fixed::{Fixed, from_f64, to_f64};
use crate::core::vec3::FixedVec3;
use crate::error::{QueryError, QueryResult};
use crate::spatial::{Plane, Rect, Shape, features_in_region, nearest_unit, projectiles_in_rect, units_in_region};
use crate::world::{ProjectileKind, UnitId, World};
use super::value::{Table, Value};
use super::{nothing, parse, Args, QueryRegistry};

/// Range used when a nearest-unit query names none.
const DEFAULT_SEARCH_RANGE: f64 = 1.0e9;

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetUnitsInRectangle", get_units_in_rectangle);
    registry.register("GetUnitsInBox", get_units_in_box);
    registry.register("GetUnitsInSphere", get_units_in_sphere);
    registry.register("GetUnitsInCylinder", get_units_in_cylinder);
    registry.register("GetUnitsInPlanes", get_units_in_planes);
    registry.register("GetUnitNearestAlly", get_unit_nearest_ally);
    registry.register("GetUnitNearestEnemy", get_unit_nearest_enemy);
    registry.register("GetFeaturesInRectangle", get_features_in_rectangle);
    registry.register("GetFeaturesInSphere", get_features_in_sphere);
    registry.register("GetFeaturesInCylinder", get_features_in_cylinder);
    registry.register("GetProjectilesInRectangle", get_projectiles_in_rectangle);
}

fn id_table(ids: Vec<UnitId>) -> QueryResult {
    Ok(vec![Value::from(Table::array(ids))])
}

fn units_in(world: &World, ctx: &AccessContext, args: &Args<'_>, shape: Shape, allegiance_pos: usize) -> QueryResult {
    let allegiance = Allegiance::parse(world, args.maybe_int(allegiance_pos)?, args.func())?;
    id_table(units_in_region(world, &shape, allegiance.filter(world, ctx)))
}

fn rect_arg(args: &Args<'_>, first: usize) -> Result<Rect, QueryError> {
    Ok(Rect::new(
        args.check_fixed(first)?,
        args.check_fixed(first + 1)?,
        args.check_fixed(first + 2)?,
        args.check_fixed(first + 3)?,
    ))
}

// =============================================================================
// UNITS
// =============================================================================

/// `(xmin, zmin, xmax, zmax [, allegiance])`
fn get_units_in_rectangle(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let rect = rect_arg(&args, 1)?;
    units_in(world, ctx, &args, Shape::Rectangle(rect), 5)
}

/// `(xmin, ymin, zmin, xmax, ymax, zmax [, allegiance])`
fn get_units_in_box(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (x1, y1, z1) = (args.check_fixed(1)?, args.check_fixed(2)?, args.check_fixed(3)?);
    let (x2, y2, z2) = (args.check_fixed(4)?, args.check_fixed(5)?, args.check_fixed(6)?);
    let shape = Shape::Box {
        rect: Rect::new(x1, z1, x2, z2),
        ymin: y1.min(y2),
        ymax: y1.max(y2),
    };
    units_in(world, ctx, &args, shape, 7)
}

/// `(x, y, z, radius [, allegiance])`
fn get_units_in_sphere(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let centre = FixedVec3::new(args.check_fixed(1)?, args.check_fixed(2)?, args.check_fixed(3)?);
    let radius = args.check_fixed(4)?;
    units_in(world, ctx, &args, Shape::Sphere { centre, radius }, 5)
}

/// `(x, z, radius [, allegiance])`
fn get_units_in_cylinder(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let shape = Shape::Cylinder {
        x: args.check_fixed(1)?,
        z: args.check_fixed(2)?,
        radius: args.check_fixed(3)?,
    };
    units_in(world, ctx, &args, shape, 4)
}

/// `({ {nx, ny, nz, d}, ... } [, allegiance])`
///
/// Entries that are not four-number arrays are skipped.
fn get_units_in_planes(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(table) = args.table(1) else {
        return Err(args.usage("{ {nx, ny, nz, d}, ... } [, allegiance]"));
    };
    let planes = table
        .iter()
        .filter_map(|(_, entry)| entry.as_table())
        .filter_map(|entry| {
            let v: Vec<f64> = entry.array_values().into_iter().filter_map(Value::as_number).collect();
            match v.as_slice() {
                &[nx, ny, nz, d] => Some(Plane {
                    normal: FixedVec3::new(from_f64(nx), from_f64(ny), from_f64(nz)),
                    d: from_f64(d),
                }),
                _ => None,
            }
        })
        .collect();
    units_in(world, ctx, &args, Shape::Planes(planes), 2)
}

fn search_range(world: &World, args: &Args<'_>, pos: usize) -> Result<Fixed, QueryError> {
    let range = args.opt_number(pos, DEFAULT_SEARCH_RANGE)?;
    // Nothing is further apart than the map diagonal
    let limit = world.ground.max_x() + world.ground.max_z();
    Ok(from_f64(range.clamp(0.0, to_f64(limit))))
}

/// `(unitID [, range])`: closest unit of the same ally team.
fn get_unit_nearest_ally(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let range = search_range(world, &args, 2)?;
    let found = nearest_unit(world, unit.pos, range, unit.id, |other| other.ally_team == unit.ally_team);
    Ok(found.map(Value::from).into_iter().collect())
}

/// `(unitID [, range [, useLOS]])`: closest unit of a non-allied ally
/// team. Only full-read callers may skip the sensor test.
fn get_unit_nearest_enemy(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let range = search_range(world, &args, 2)?;
    let test_los = !ctx.full_read || args.opt_bool(3, true);
    let found = nearest_unit(world, unit.pos, range, unit.id, |other| {
        if world.teams.ally_teams_allied(unit.ally_team, other.ally_team) {
            return false;
        }
        if !test_los {
            return true;
        }
        let status = world.ledger.status(other.id, unit.ally_team);
        status.in_los() || status.in_radar()
    });
    Ok(found.map(Value::from).into_iter().collect())
}

// =============================================================================
// FEATURES AND PROJECTILES
// =============================================================================

fn features_in(world: &World, ctx: &AccessContext, shape: Shape) -> QueryResult {
    let ids = features_in_region(world, &shape, |f| is_feature_visible(world, ctx, f));
    Ok(vec![Value::from(Table::array(ids))])
}

/// `(xmin, zmin, xmax, zmax)`
fn get_features_in_rectangle(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let rect = rect_arg(&args, 1)?;
    features_in(world, ctx, Shape::Rectangle(rect))
}

/// `(x, y, z, radius)`
fn get_features_in_sphere(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let centre = FixedVec3::new(args.check_fixed(1)?, args.check_fixed(2)?, args.check_fixed(3)?);
    let radius = args.check_fixed(4)?;
    features_in(world, ctx, Shape::Sphere { centre, radius })
}

/// `(x, z, radius)`
fn get_features_in_cylinder(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let shape = Shape::Cylinder {
        x: args.check_fixed(1)?,
        z: args.check_fixed(2)?,
        radius: args.check_fixed(3)?,
    };
    features_in(world, ctx, shape)
}

/// `(xmin, zmin, xmax, zmax [, excludeWeapons [, excludePieces]])`
fn get_projectiles_in_rectangle(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let rect = rect_arg(&args, 1)?;
    let exclude_weapons = args.opt_bool(5, false);
    let exclude_pieces = args.opt_bool(6, false);
    let ids = projectiles_in_rect(world, rect, |p| {
        let excluded = match p.kind {
            ProjectileKind::Weapon { .. } => exclude_weapons,
            ProjectileKind::Piece { .. } => exclude_pieces,
        };
        !excluded && is_projectile_visible(world, ctx, p)
    });
    Ok(vec![Value::from(Table::array(ids))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fixture::*;
    use crate::access::{ALLY_UNITS, ENEMY_UNITS, MY_UNITS};
    use crate::sensor::LosStatus;
    use crate::world::ProjectileTarget;

    fn ids(out: &[Value]) -> Vec<f64> {
        let mut v: Vec<f64> = out[0]
            .as_table()
            .map(|t| t.array_values().into_iter().filter_map(Value::as_number).collect())
            .unwrap_or_default();
        v.sort_by(f64::total_cmp);
        v
    }

    /// Own tank and ally-team-2 tank near (200, 200), enemy tanks near
    /// (220, 220) (visible) and (700, 700) (hidden), seen by team 1.
    fn battlefield() -> (World, [UnitId; 4]) {
        let mut world = world();
        let own = world.spawn_unit(42, 1, FixedVec3::from_ints(200, 0, 200)).unwrap();
        let ally = world.spawn_unit(42, 2, FixedVec3::from_ints(210, 0, 200)).unwrap();
        let seen = world.spawn_unit(42, 0, FixedVec3::from_ints(220, 0, 220)).unwrap();
        let hidden = world.spawn_unit(42, 0, FixedVec3::from_ints(700, 0, 700)).unwrap();
        world.ledger.set_status(seen, 1, LosStatus::seen());
        world.ledger.set_status(hidden, 1, LosStatus::NONE);
        world.ledger.set_status(ally, 1, LosStatus::seen());
        (world, [own, ally, seen, hidden])
    }

    #[test]
    fn test_rectangle_allegiances() {
        let (world, [own, ally, seen, _]) = battlefield();
        let ctx = AccessContext::as_team(&world, 1);
        let rect = [n(0), n(0), n(1000), n(1000)];
        let with = |a: i64| {
            let mut args = rect.to_vec();
            args.push(Value::from(a));
            ids(&call(&world, &ctx, "GetUnitsInRectangle", &args).unwrap())
        };
        assert_eq!(ids(&call(&world, &ctx, "GetUnitsInRectangle", &rect).unwrap()).len(), 3);
        assert_eq!(with(MY_UNITS), vec![f64::from(own)]);
        assert_eq!(with(ALLY_UNITS), vec![f64::from(own)]);
        assert_eq!(with(ENEMY_UNITS), vec![f64::from(ally), f64::from(seen)]);
        assert_eq!(with(0), vec![f64::from(seen)]);
        assert!(matches!(
            call(&world, &ctx, "GetUnitsInRectangle", &[n(0), n(0), n(1), n(1), n(-9)]),
            Err(QueryError::BadAllegiance { value: -9, .. })
        ));
    }

    #[test]
    fn test_sphere_and_cylinder() {
        let (world, [own, ally, ..]) = battlefield();
        let ctx = AccessContext::synced();
        let out = call(&world, &ctx, "GetUnitsInCylinder", &[n(205), n(200), n(6)]).unwrap();
        assert_eq!(ids(&out), vec![f64::from(own), f64::from(ally)]);
        let out = call(&world, &ctx, "GetUnitsInSphere", &[n(200), n(0), n(200), n(5)]).unwrap();
        assert_eq!(ids(&out), vec![f64::from(own)]);
    }

    #[test]
    fn test_extreme_extents_never_overflow() {
        let (world, units) = battlefield();
        let ctx = AccessContext::synced();
        let everything = units.len();
        let out = call(&world, &ctx, "GetUnitsInCylinder", &[n(100), n(100), n(1e15)]).unwrap();
        assert_eq!(ids(&out).len(), everything);
        let out = call(&world, &ctx, "GetUnitsInSphere", &[n(0), n(0), n(0), n(1e30)]).unwrap();
        assert_eq!(ids(&out).len(), everything);
        let out = call(&world, &ctx, "GetUnitsInRectangle", &[n(-1e30), n(-1e30), n(1e30), n(1e30)]).unwrap();
        assert_eq!(ids(&out).len(), everything);
        let out = call(&world, &ctx, "GetUnitsInCylinder", &[n(1e30), n(-1e30), n(10)]).unwrap();
        assert!(ids(&out).is_empty());
        let out = call(&world, &ctx, "GetFeaturesInSphere", &[n(1e30), n(0), n(1e30), n(1e30)]).unwrap();
        assert_eq!(out.len(), 1);
        let near = call(&world, &ctx, "GetUnitNearestEnemy", &[n(units[0]), n(1e30)]).unwrap();
        assert!(near.len() <= 1);
    }

    #[test]
    fn test_planes_need_table() {
        let (world, _) = battlefield();
        let ctx = AccessContext::synced();
        assert!(matches!(
            call(&world, &ctx, "GetUnitsInPlanes", &[n(1)]),
            Err(QueryError::Usage { .. })
        ));
        // x <= 300
        let plane = Value::from(Table::array([1, 0, 0, -300]));
        let out = call(&world, &ctx, "GetUnitsInPlanes", &[Value::from(Table::array([plane]))]).unwrap();
        assert_eq!(ids(&out).len(), 3);
    }

    #[test]
    fn test_nearest_enemy_uses_sensors() {
        let (world, [own, _, seen, _]) = battlefield();
        let ctx = AccessContext::as_team(&world, 1);
        let out = call(&world, &ctx, "GetUnitNearestEnemy", &[n(own)]).unwrap();
        assert_eq!(out, vec![n(seen)]);

        let mut world = world;
        world.ledger.set_status(seen, 1, LosStatus::NONE);
        let out = call(&world, &ctx, "GetUnitNearestEnemy", &[n(own)]).unwrap();
        assert!(out.is_empty());
        let out = call(&world, &AccessContext::synced(), "GetUnitNearestEnemy", &[n(own), Value::Nil, Value::Bool(false)])
            .unwrap();
        assert_eq!(out, vec![n(seen)]);
    }

    #[test]
    fn test_nearest_ally_requires_own_unit() {
        let (world, [own, ally, seen, _]) = battlefield();
        let ctx = AccessContext::as_team(&world, 1);
        assert!(call(&world, &ctx, "GetUnitNearestAlly", &[n(seen)]).unwrap().is_empty());
        // ally team 2 is allied, not the same ally team
        assert!(call(&world, &ctx, "GetUnitNearestAlly", &[n(own)]).unwrap().is_empty());
        let ctx = AccessContext::as_team(&world, 2);
        assert!(call(&world, &ctx, "GetUnitNearestAlly", &[n(ally), n(5)]).unwrap().is_empty());
    }

    #[test]
    fn test_features_follow_visibility_policy() {
        let mut world = world();
        world.config.feature_visibility = crate::config::FeatureVisibility::None;
        let rock = world.spawn_feature(1, None, FixedVec3::from_ints(400, 0, 400)).unwrap();
        let rect = [n(300), n(300), n(500), n(500)];
        let out = call(&world, &AccessContext::as_team(&world, 0), "GetFeaturesInRectangle", &rect).unwrap();
        assert!(ids(&out).is_empty());
        let out = call(&world, &AccessContext::spectator(), "GetFeaturesInRectangle", &rect).unwrap();
        assert_eq!(ids(&out), vec![f64::from(rock)]);
        let out = call(&world, &AccessContext::spectator(), "GetFeaturesInCylinder", &[n(400), n(400), n(1)]).unwrap();
        assert_eq!(ids(&out), vec![f64::from(rock)]);
    }

    #[test]
    fn test_projectile_kind_filters() {
        let mut world = world();
        let shell = world
            .spawn_projectile(
                None,
                0,
                FixedVec3::from_ints(100, 10, 100),
                FixedVec3::from_ints(1, 0, 0),
                ProjectileKind::Weapon { def_id: 7, target: ProjectileTarget::Ground(FixedVec3::ZERO), intercepted: false, ttl: 30 },
            )
            .unwrap();
        let rect = [n(0), n(0), n(200), n(200)];
        let ctx = AccessContext::spectator();
        assert_eq!(ids(&call(&world, &ctx, "GetProjectilesInRectangle", &rect).unwrap()), vec![f64::from(shell)]);
        let mut args = rect.to_vec();
        args.push(Value::Bool(true));
        assert!(ids(&call(&world, &ctx, "GetProjectilesInRectangle", &args).unwrap()).is_empty());
        let enemy = AccessContext::as_team(&world, 1);
        assert!(ids(&call(&world, &enemy, "GetProjectilesInRectangle", &rect).unwrap()).is_empty());
    }
}
