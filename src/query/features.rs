//! Per-feature queries.
//!
//! Features have a single visibility tier: a feature the caller cannot
//! see resolves to nothing, one it can see discloses everything.

use crate::access::resolver::{feature_los_mask, is_feature_visible};
use crate::access::AccessContext;
use crate::error::QueryResult;
use crate::world::{Feature, World};
use super::value::{push_vec3, Table, Value};
use super::{nothing, parse, rules, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("ValidFeatureID", valid_feature_id);
    registry.register("GetAllFeatures", get_all_features);
    registry.register("GetFeatureDefID", get_feature_def_id);
    registry.register("GetFeatureTeam", get_feature_team);
    registry.register("GetFeatureAllyTeam", get_feature_ally_team);
    registry.register("GetFeatureHealth", get_feature_health);
    registry.register("GetFeatureHeight", get_feature_height);
    registry.register("GetFeatureRadius", get_feature_radius);
    registry.register("GetFeatureMass", get_feature_mass);
    registry.register("GetFeaturePosition", get_feature_position);
    registry.register("GetFeatureVelocity", get_feature_velocity);
    registry.register("GetFeatureHeading", get_feature_heading);
    registry.register("GetFeatureResources", get_feature_resources);
    registry.register("GetFeatureBlocking", get_feature_blocking);
    registry.register("GetFeatureNoSelect", get_feature_no_select);
    registry.register("GetFeatureResurrect", get_feature_resurrect);
    registry.register("GetFeatureSeparation", get_feature_separation);
    registry.register("GetFeatureRulesParam", get_feature_rules_param);
    registry.register("GetFeatureRulesParams", get_feature_rules_params);
}

fn with<F>(feature: Option<&Feature>, f: F) -> QueryResult
where
    F: FnOnce(&Feature) -> Vec<Value>,
{
    Ok(feature.map(f).unwrap_or_default())
}

fn valid_feature_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if !args.is_number(1) {
        return Ok(vec![Value::Bool(false)]);
    }
    let valid = parse::feature(world, ctx, &args, 1)?.is_some();
    Ok(vec![Value::Bool(valid)])
}

/// Ids of every feature the caller can see, in id order.
fn get_all_features(world: &World, ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    let ids = world
        .features
        .iter()
        .filter(|f| is_feature_visible(world, ctx, f))
        .map(|f| Value::from(f.id));
    Ok(vec![Table::array(ids).into()])
}

fn get_feature_def_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![f.def_id.into()])
}

/// Map features report team -1.
fn get_feature_team(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let team = match (f.team, f.ally_team) {
            (Some(team), Some(_)) => team as i64,
            _ => -1,
        };
        vec![team.into()]
    })
}

fn get_feature_ally_team(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        vec![f.ally_team.map_or(-1, |at| at as i64).into()]
    })
}

/// `health, maxHealth, resurrectProgress`
fn get_feature_health(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let max = world.defs.feature_def(f.def_id).map_or(f.health, |d| d.health);
        vec![Value::fixed(f.health), Value::fixed(max), Value::fixed(f.resurrect_progress)]
    })
}

fn get_feature_height(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![Value::fixed(f.height)])
}

fn get_feature_radius(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![Value::fixed(f.radius)])
}

fn get_feature_mass(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![Value::fixed(f.mass)])
}

/// `(featureID [, midPos [, aimPos]])`; features carry no radar error.
fn get_feature_position(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(feature) = parse::feature(world, ctx, &args, 1)? else {
        return nothing();
    };
    let mut out = Vec::with_capacity(9);
    push_vec3(&mut out, feature.pos);
    if args.opt_bool(2, false) {
        push_vec3(&mut out, feature.mid_pos);
    }
    if args.opt_bool(3, false) {
        push_vec3(&mut out, feature.aim_pos);
    }
    Ok(out)
}

fn get_feature_velocity(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let mut out = Vec::with_capacity(4);
        push_vec3(&mut out, f.velocity);
        out.push(Value::fixed(f.velocity.length()));
        out
    })
}

fn get_feature_heading(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![f.heading.into()])
}

/// `metal, defMetal, energy, defEnergy, reclaimLeft, reclaimTime`
fn get_feature_resources(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let def = world.defs.feature_def(f.def_id);
        let (metal, energy, time) = def.map_or((0, 0, 0), |d| (d.metal, d.energy, d.reclaim_time));
        vec![
            Value::fixed(f.metal),
            Value::fixed(metal),
            Value::fixed(f.energy),
            Value::fixed(energy),
            Value::fixed(f.reclaim_left),
            Value::fixed(time),
        ]
    })
}

fn get_feature_blocking(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let b = f.blocking;
        vec![
            b.blocking.into(),
            b.solid_objects.into(),
            b.projectiles.into(),
            b.rays.into(),
            b.crushable.into(),
            b.block_enemy_pushing.into(),
            b.block_height_changes.into(),
        ]
    })
}

fn get_feature_no_select(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| vec![f.no_select.into()])
}

/// Name of the unit a resurrection yields ("" for none), then its facing.
fn get_feature_resurrect(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::feature(world, ctx, &args, 1)?, |f| {
        let name = f
            .resurrect_def
            .and_then(|id| world.defs.unit_def(id))
            .map(|d| d.name.clone())
            .unwrap_or_default();
        vec![name.into(), f.build_facing.into()]
    })
}

/// `(featureID1, featureID2 [, in2d])`
fn get_feature_separation(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let a = parse::feature(world, ctx, &args, 1)?;
    let b = parse::feature(world, ctx, &args, 2)?;
    let (Some(a), Some(b)) = (a, b) else {
        return nothing();
    };
    let dist = if args.opt_bool(3, false) { a.pos.distance_2d(b.pos) } else { a.pos.distance(b.pos) };
    Ok(vec![Value::fixed(dist)])
}

fn get_feature_rules_param(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(feature) = parse::feature(world, ctx, &args, 1)? else {
        return nothing();
    };
    let key = args.check_string(2)?;
    Ok(rules::lookup(&feature.rules_params, &key, feature_los_mask(world, ctx, feature)))
}

fn get_feature_rules_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(feature) = parse::feature(world, ctx, &args, 1)? else {
        return nothing();
    };
    Ok(rules::dump(&feature.rules_params, feature_los_mask(world, ctx, feature)))
}
