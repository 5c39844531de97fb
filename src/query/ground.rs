//! Terrain queries.

use crate::access::resolver::{is_feature_visible, is_unit_in_los};
use crate::access::{AccessContext, ReadScope};
use crate::error::QueryResult;
use crate::world::ground::{BlockingObject, TerrainType, NUM_TERRAIN_TYPES};
use crate::world::World;
use super::value::Value;
use super::{nothing, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetGroundHeight", get_ground_height);
    registry.register("GetGroundOrigHeight", get_ground_orig_height);
    registry.register("GetGroundNormal", get_ground_normal);
    registry.register("GetGroundInfo", get_ground_info);
    registry.register("GetTerrainTypeData", get_terrain_type_data);
    registry.register("GetGroundBlocked", get_ground_blocked);
    registry.register("GetGroundExtremes", get_ground_extremes);
}

fn get_ground_height(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (x, z) = (args.check_fixed(1)?, args.check_fixed(2)?);
    Ok(vec![Value::fixed(world.ground.height_at(x, z))])
}

fn get_ground_orig_height(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (x, z) = (args.check_fixed(1)?, args.check_fixed(2)?);
    Ok(vec![Value::fixed(world.ground.orig_height_at(x, z))])
}

/// `(x, z [, raw])` -> `nx, ny, nz, slope`; smoothed unless `raw`.
fn get_ground_normal(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (x, z) = (args.check_fixed(1)?, args.check_fixed(2)?);
    let normal = if args.opt_bool(3, false) {
        world.ground.normal_at(x, z)
    } else {
        world.ground.smooth_normal_at(x, z)
    };
    Ok(vec![
        Value::fixed(normal.x),
        Value::fixed(normal.y),
        Value::fixed(normal.z),
        Value::fixed(world.ground.slope_at(x, z)),
    ])
}

fn push_terrain(out: &mut Vec<Value>, terrain: &TerrainType) {
    out.push(Value::fixed(terrain.hardness));
    out.push(Value::fixed(terrain.tank_speed));
    out.push(Value::fixed(terrain.kbot_speed));
    out.push(Value::fixed(terrain.hover_speed));
    out.push(Value::fixed(terrain.ship_speed));
    out.push(terrain.receive_tracks.into());
}

/// `ix, iz, typeIndex, name, metal, hardness, tankSpeed, kbotSpeed,
/// hoverSpeed, shipSpeed, receiveTracks`
fn get_ground_info(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (x, z) = (args.check_fixed(1)?, args.check_fixed(2)?);
    let info = world.ground.info_at(x, z);
    let mut out = vec![
        info.ix.into(),
        info.iz.into(),
        info.type_index.into(),
        info.terrain.name.as_str().into(),
        Value::fixed(info.metal),
    ];
    push_terrain(&mut out, info.terrain);
    Ok(out)
}

fn get_terrain_type_data(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let index = args.check_int(1)?;
    if !(0..NUM_TERRAIN_TYPES as i64).contains(&index) {
        return nothing();
    }
    let Some(terrain) = world.ground.terrain_type(index as usize) else {
        return nothing();
    };
    let mut out = vec![index.into(), terrain.name.as_str().into()];
    push_terrain(&mut out, terrain);
    Ok(out)
}

/// `(x, z)` or `(x1, z1, x2, z2)`
///
/// First visible occupant of the covered squares as `"unit"|"feature", id`,
/// or `false` when none is visible.
fn get_ground_blocked(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if ctx.read_scope == ReadScope::NoAccess && !ctx.full_read {
        return nothing();
    }
    let (x1, z1, x2, z2) = match args.len() {
        2 => {
            let (x, z) = (args.check_fixed(1)?, args.check_fixed(2)?);
            (x, z, x, z)
        }
        4 => (args.check_fixed(1)?, args.check_fixed(2)?, args.check_fixed(3)?, args.check_fixed(4)?),
        _ => return Err(args.usage("x, z [, x2, z2]")),
    };
    let ground = &world.ground;
    let (tx1, tz1) = ground.square_of(x1, z1);
    let (tx2, tz2) = ground.square_of(x2, z2);

    for sz in tz1..=tz2 {
        for sx in tx1..=tx2 {
            match ground.blocked_at(sx, sz) {
                Some(BlockingObject::Feature(id)) => {
                    if world.features.get(id).is_some_and(|f| is_feature_visible(world, ctx, f)) {
                        return Ok(vec!["feature".into(), id.into()]);
                    }
                }
                Some(BlockingObject::Unit(id)) => {
                    if world.units.get(id).is_some_and(|u| is_unit_in_los(world, ctx, u)) {
                        return Ok(vec!["unit".into(), id.into()]);
                    }
                }
                None => {}
            }
        }
    }
    Ok(vec![Value::Bool(false)])
}

/// `initMin, initMax, currMin, currMax`
fn get_ground_extremes(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    let init = world.ground.init_extremes();
    let curr = world.ground.curr_extremes();
    Ok(vec![
        Value::fixed(init.min),
        Value::fixed(init.max),
        Value::fixed(curr.min),
        Value::fixed(curr.max),
    ])
}
