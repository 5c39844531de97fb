//! Per-unit queries.
//!
//! Each handler resolves its unit through the gate that matches what it
//! discloses: identity needs the unit typed, live state needs it in LOS,
//! internals need it allied. Positions only need a radar contact but
//! carry the caller's radar error.

use crate::access::resolver::{
    effective_los_ally_team, effective_unit_def, is_ally_unit, is_unit_visible, position_error,
    shown_health, unit_los_mask,
};
use crate::access::{AccessContext, ReadScope};
use crate::core::fixed::{fixed_mul, Fixed, GAME_SPEED};
use crate::core::vec3::FixedVec3;
use crate::error::{QueryError, QueryResult};
use crate::sensor::{LosStatus, RadarError};
use crate::world::{MoveTypeData, Unit, World};
use super::value::{push_vec3, Table, Value};
use super::{nothing, parse, rules, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("ValidUnitID", valid_unit_id);
    registry.register("GetUnitIsDead", get_unit_is_dead);
    registry.register("GetUnitTeam", get_unit_team);
    registry.register("GetUnitAllyTeam", get_unit_ally_team);
    registry.register("GetUnitNeutral", get_unit_neutral);
    registry.register("GetUnitHealth", get_unit_health);
    registry.register("GetUnitIsStunned", get_unit_is_stunned);
    registry.register("GetUnitIsBeingBuilt", get_unit_is_being_built);
    registry.register("GetUnitResources", get_unit_resources);
    registry.register("GetUnitExperience", get_unit_experience);
    registry.register("GetUnitStates", get_unit_states);
    registry.register("GetUnitArmored", get_unit_armored);
    registry.register("GetUnitIsActive", get_unit_is_active);
    registry.register("GetUnitIsCloaked", get_unit_is_cloaked);
    registry.register("GetUnitSelfDTime", get_unit_self_d_time);
    registry.register("GetUnitStockpile", get_unit_stockpile);
    registry.register("GetUnitSensorRadius", get_unit_sensor_radius);
    registry.register("GetUnitPosErrorParams", get_unit_pos_error_params);
    registry.register("GetUnitTooltip", get_unit_tooltip);
    registry.register("GetUnitDefID", get_unit_def_id);
    registry.register("GetUnitHeight", get_unit_height);
    registry.register("GetUnitRadius", get_unit_radius);
    registry.register("GetUnitMass", get_unit_mass);
    registry.register("GetUnitPosition", get_unit_position);
    registry.register("GetUnitBasePosition", get_unit_base_position);
    registry.register("GetUnitVectors", get_unit_vectors);
    registry.register("GetUnitDirection", get_unit_direction);
    registry.register("GetUnitHeading", get_unit_heading);
    registry.register("GetUnitVelocity", get_unit_velocity);
    registry.register("GetUnitBuildFacing", get_unit_build_facing);
    registry.register("GetUnitIsBuilding", get_unit_is_building);
    registry.register("GetUnitTransporter", get_unit_transporter);
    registry.register("GetUnitIsTransporting", get_unit_is_transporting);
    registry.register("GetUnitLastAttacker", get_unit_last_attacker);
    registry.register("GetUnitMaxRange", get_unit_max_range);
    registry.register("GetUnitWeaponState", get_unit_weapon_state);
    registry.register("GetUnitBlocking", get_unit_blocking);
    registry.register("GetUnitSeparation", get_unit_separation);
    registry.register("GetUnitFeatureSeparation", get_unit_feature_separation);
    registry.register("GetUnitDefDimensions", get_unit_def_dimensions);
    registry.register("GetUnitLosState", get_unit_los_state);
    registry.register("IsUnitInLos", is_unit_in_los);
    registry.register("IsUnitInAirLos", is_unit_in_air_los);
    registry.register("IsUnitInRadar", is_unit_in_radar);
    registry.register("IsUnitInJammer", is_unit_in_jammer);
    registry.register("GetUnitRulesParam", get_unit_rules_param);
    registry.register("GetUnitRulesParams", get_unit_rules_params);
    registry.register("GetUnitMoveTypeData", get_unit_move_type_data);
}

/// Run `f` on the unit when the gate lets it through.
fn with<F>(unit: Option<&Unit>, f: F) -> QueryResult
where
    F: FnOnce(&Unit) -> Vec<Value>,
{
    Ok(unit.map(f).unwrap_or_default())
}

/// Per-frame rate to per-second rate.
#[inline]
fn per_second(rate: Fixed) -> Value {
    Value::fixed(rate.saturating_mul(GAME_SPEED as i64))
}

// =============================================================================
// IDENTITY AND OWNERSHIP
// =============================================================================

fn valid_unit_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    if !args.is_number(1) {
        return Ok(vec![Value::Bool(false)]);
    }
    let valid = parse::unit(world, ctx, &args, 1)?.is_some();
    Ok(vec![Value::Bool(valid)])
}

fn get_unit_is_dead(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::unit(world, ctx, &args, 1)?, |u| vec![u.is_dead.into()])
}

fn get_unit_team(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::unit(world, ctx, &args, 1)?, |u| vec![u.team.into()])
}

fn get_unit_ally_team(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::unit(world, ctx, &args, 1)?, |u| vec![u.ally_team.into()])
}

fn get_unit_neutral(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::unit(world, ctx, &args, 1)?, |u| vec![u.neutral.into()])
}

/// Shown definition id: the true one for allies, the imitated one for
/// anyone who has identified the unit, nothing otherwise.
fn get_unit_def_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    if is_ally_unit(ctx, unit) {
        return Ok(vec![unit.def_id.into()]);
    }
    if parse::typed_unit(world, ctx, &args, 1)?.is_none() {
        return nothing();
    }
    Ok(effective_unit_def(world, ctx, unit).map(|d| vec![d.id.into()]).unwrap_or_default())
}

fn get_unit_tooltip(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::typed_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let Some(def) = world.defs.unit_def(unit.def_id) else {
        return nothing();
    };
    let shown = effective_unit_def(world, ctx, unit).unwrap_or(def);

    let tooltip = if shown.show_player_name {
        let team = world.teams.team(unit.team);
        let leader = team
            .and_then(|t| t.leader)
            .and_then(|p| world.players.get(p as i64));
        match (team, leader) {
            (Some(team), Some(player)) if team.has_ai => format!("AI@{}", player.name),
            (_, Some(player)) => player.name.clone(),
            _ => String::new(),
        }
    } else if shown.id != def.id {
        format!("{} - {}", shown.human_name, shown.tooltip)
    } else if unit.tooltip.is_empty() {
        format!("{} - {}", def.human_name, def.tooltip)
    } else {
        unit.tooltip.clone()
    };
    Ok(vec![tooltip.into()])
}

// =============================================================================
// STATE
// =============================================================================

/// `health, maxHealth, paralyzeDamage, captureProgress, buildProgress`
///
/// Hidden-damage definitions report nil health values to enemies.
fn get_unit_health(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::in_los_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let enemy = !is_ally_unit(ctx, unit);
    let hidden = enemy && world.defs.unit_def(unit.def_id).is_some_and(|d| d.hide_damage);

    let mut out = Vec::with_capacity(5);
    if hidden {
        out.extend([Value::Nil, Value::Nil, Value::Nil]);
    } else {
        let (health, max_health) = shown_health(world, ctx, unit, args.func())?;
        let paralyze = match effective_unit_def(world, ctx, unit) {
            Some(shown) if enemy && shown.id != unit.def_id => world
                .defs
                .health_ratio(unit.def_id, shown.id)
                .map_or(unit.paralyze_damage, |r| fixed_mul(unit.paralyze_damage, r)),
            _ => unit.paralyze_damage,
        };
        out.extend([Value::fixed(health), Value::fixed(max_health), Value::fixed(paralyze)]);
    }
    out.push(Value::fixed(unit.capture_progress));
    out.push(Value::fixed(unit.build_progress));
    Ok(out)
}

/// `stunnedOrBeingBuilt, stunned, beingBuilt`
fn get_unit_is_stunned(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        vec![(u.stunned || u.being_built).into(), u.stunned.into(), u.being_built.into()]
    })
}

fn get_unit_is_being_built(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        vec![u.being_built.into(), Value::fixed(u.build_progress)]
    })
}

/// `metalMake, metalUse, energyMake, energyUse`
fn get_unit_resources(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::ally_unit(world, ctx, &args, 1)?, |u| {
        let r = u.resources;
        vec![
            Value::fixed(r.metal_make),
            Value::fixed(r.metal_use),
            Value::fixed(r.energy_make),
            Value::fixed(r.energy_use),
        ]
    })
}

fn get_unit_experience(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::ally_unit(world, ctx, &args, 1)?, |u| {
        vec![Value::fixed(u.experience), Value::fixed(u.lim_experience)]
    })
}

/// `(unitID [, asTable = true [, binaryStates [, airStates]]])`
///
/// Binary and aircraft states default to the table flag. Aircraft states
/// are only present for air move types.
fn get_unit_states(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let as_table = args.opt_bool(2, true);
    let binary = args.opt_bool(3, as_table);
    let air = args.opt_bool(4, as_table);

    let states = &unit.states;
    let repair_level = states.repair_below_health.map_or(Value::from(-1), Value::fixed);
    let mut fields: Vec<(&str, Value)> = vec![
        ("firestate", states.fire_state.into()),
        ("movestate", states.move_state.into()),
        ("autorepairlevel", repair_level),
    ];
    if binary {
        fields.push(("repeat", states.repeat.into()));
        fields.push(("cloak", unit.want_cloak.into()));
        fields.push(("active", unit.activated.into()));
        fields.push(("trajectory", states.high_trajectory.into()));
    }
    if air {
        match &unit.move_type {
            MoveTypeData::HoverAir(m) => {
                fields.push(("autoland", m.auto_land.into()));
                fields.push(("loopbackattack", false.into()));
            }
            MoveTypeData::StrafeAir(m) => {
                fields.push(("autoland", m.auto_land.into()));
                fields.push(("loopbackattack", m.loopback_attack.into()));
            }
            MoveTypeData::Ground(_) | MoveTypeData::Static | MoveTypeData::Scripted => {}
        }
    }

    if !as_table {
        return Ok(fields.into_iter().map(|(_, v)| v).collect());
    }
    let mut table = Table::new();
    for (key, value) in fields {
        table.set(key, value);
    }
    Ok(vec![table.into()])
}

fn get_unit_armored(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        vec![u.armored.into(), Value::fixed(u.armored_multiple)]
    })
}

fn get_unit_is_active(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| vec![u.activated.into()])
}

fn get_unit_is_cloaked(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::ally_unit(world, ctx, &args, 1)?, |u| vec![u.is_cloaked.into()])
}

fn get_unit_self_d_time(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::ally_unit(world, ctx, &args, 1)?, |u| vec![u.self_d_countdown.into()])
}

/// `numStockpiled, numQueued, buildPercent`; nothing without a stockpile weapon.
fn get_unit_stockpile(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let stockpile = parse::ally_unit(world, ctx, &args, 1)?.and_then(|u| u.stockpile);
    Ok(stockpile
        .map(|s| vec![s.num_stockpiled.into(), s.num_queued.into(), Value::fixed(s.build_percent)])
        .unwrap_or_default())
}

fn get_unit_sensor_radius(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let name = args.check_string(2)?;
    let s = &unit.sensors;
    let radius = match name.as_str() {
        "los" => s.los,
        "airLos" => s.air_los,
        "radar" => s.radar,
        "sonar" => s.sonar,
        "seismic" => s.seismic,
        "radarJammer" => s.radar_jammer,
        "sonarJammer" => s.sonar_jammer,
        _ => return Err(QueryError::UnknownSensor { func: args.func(), name }),
    };
    Ok(vec![Value::fixed(radius)])
}

/// `(unitID [, allyTeamID = 0])`
///
/// Error vector, per-frame delta, frames to the next update and whether
/// the error applies to the ally team. The ally team is clamped into the
/// valid range.
fn get_unit_pos_error_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let last = world.teams.num_ally_teams().saturating_sub(1) as i64;
    let ally_team = args.opt_int(2, 0)?.clamp(0, last) as usize;

    let fallback = RadarError::default();
    let err = world.ledger.error(unit.id).unwrap_or(&fallback);
    let mut out = Vec::with_capacity(8);
    push_vec3(&mut out, err.vector);
    push_vec3(&mut out, err.delta);
    out.push(err.next_update.into());
    out.push(err.applies_to(ally_team).into());
    Ok(out)
}

// =============================================================================
// GEOMETRY
// =============================================================================

fn get_unit_height(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::typed_unit(world, ctx, &args, 1)?, |u| vec![Value::fixed(u.height)])
}

fn get_unit_radius(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::typed_unit(world, ctx, &args, 1)?, |u| vec![Value::fixed(u.radius)])
}

fn get_unit_mass(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| vec![Value::fixed(u.mass)])
}

/// `(unitID [, midPos [, aimPos]])`
///
/// Base position, optionally followed by mid and aim points, all shifted
/// by the caller's radar error.
fn get_unit_position(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let error = position_error(world, ctx, unit);
    let mut out = Vec::with_capacity(9);
    push_vec3(&mut out, unit.pos.add(error));
    if args.opt_bool(2, false) {
        push_vec3(&mut out, unit.mid_pos.add(error));
    }
    if args.opt_bool(3, false) {
        push_vec3(&mut out, unit.aim_pos.add(error));
    }
    Ok(out)
}

fn get_unit_base_position(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let mut out = Vec::with_capacity(3);
    push_vec3(&mut out, unit.pos.add(position_error(world, ctx, unit)));
    Ok(out)
}

fn vec3_table(v: FixedVec3) -> Value {
    Table::array([Value::fixed(v.x), Value::fixed(v.y), Value::fixed(v.z)]).into()
}

/// `front, up, right` as three-element arrays.
fn get_unit_vectors(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        vec![vec3_table(u.front), vec3_table(u.up), vec3_table(u.right)]
    })
}

fn get_unit_direction(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        let mut out = Vec::with_capacity(3);
        push_vec3(&mut out, u.front);
        out
    })
}

fn get_unit_heading(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| vec![u.heading.into()])
}

/// `vx, vy, vz, speed`
fn get_unit_velocity(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        let mut out = Vec::with_capacity(4);
        push_vec3(&mut out, u.velocity);
        out.push(Value::fixed(u.velocity.length()));
        out
    })
}

fn get_unit_build_facing(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| vec![u.build_facing.into()])
}

/// `(unitID1, unitID2 [, in2d [, surfaceDistance]])`
///
/// Mid-point distance as the caller sees it; the surface distance drops
/// both radii and never goes negative.
fn get_unit_separation(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let a = parse::unit(world, ctx, &args, 1)?;
    let b = parse::unit(world, ctx, &args, 2)?;
    let (Some(a), Some(b)) = (a, b) else {
        return nothing();
    };
    let pa = a.mid_pos.add(position_error(world, ctx, a));
    let pb = b.mid_pos.add(position_error(world, ctx, b));
    let dist = if args.opt_bool(3, false) { pa.distance_2d(pb) } else { pa.distance(pb) };
    let dist = if args.opt_bool(4, false) {
        dist.saturating_sub(a.radius).saturating_sub(b.radius).max(0)
    } else {
        dist
    };
    Ok(vec![Value::fixed(dist)])
}

/// `(unitID, featureID [, in2d])`
fn get_unit_feature_separation(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let Some(feature) = parse::feature(world, ctx, &args, 2)? else {
        return nothing();
    };
    let pu = unit.mid_pos.add(position_error(world, ctx, unit));
    let dist = if args.opt_bool(3, false) {
        pu.distance_2d(feature.mid_pos)
    } else {
        pu.distance(feature.mid_pos)
    };
    Ok(vec![Value::fixed(dist)])
}

/// Model bounds of a unit definition.
fn get_unit_def_dimensions(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let id = args.check_int(1)?;
    let Some(def) = u32::try_from(id).ok().and_then(|id| world.defs.unit_def(id)) else {
        return nothing();
    };
    let m = &def.model;
    let table = Table::new()
        .with("height", Value::fixed(m.height))
        .with("radius", Value::fixed(m.radius))
        .with("midx", Value::fixed(m.mid.x))
        .with("minx", Value::fixed(m.mins.x))
        .with("maxx", Value::fixed(m.maxs.x))
        .with("midy", Value::fixed(m.mid.y))
        .with("miny", Value::fixed(m.mins.y))
        .with("maxy", Value::fixed(m.maxs.y))
        .with("midz", Value::fixed(m.mid.z))
        .with("minz", Value::fixed(m.mins.z))
        .with("maxz", Value::fixed(m.maxs.z));
    Ok(vec![table.into()])
}

// =============================================================================
// ACTIVITY AND TRANSPORT
// =============================================================================

fn get_unit_is_building(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let building = parse::ally_unit(world, ctx, &args, 1)?.and_then(|u| u.capability.cur_build());
    Ok(building.map(|id| vec![id.into()]).unwrap_or_default())
}

fn get_unit_transporter(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let transporter = parse::in_los_unit(world, ctx, &args, 1)?.and_then(|u| u.transporter);
    Ok(transporter.map(|id| vec![id.into()]).unwrap_or_default())
}

/// Carried unit ids; nothing for units that cannot transport.
fn get_unit_is_transporting(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    if !world.defs.unit_def(unit.def_id).is_some_and(|d| d.is_transport) {
        return nothing();
    }
    Ok(vec![Table::array(unit.transported.iter().copied()).into()])
}

/// Last attacker, when the caller can see it.
fn get_unit_last_attacker(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let attacker = parse::unit(world, ctx, &args, 1)?
        .and_then(|u| u.last_attacker)
        .and_then(|id| world.units.get(id))
        .filter(|a| is_unit_visible(world, ctx, a));
    Ok(attacker.map(|a| vec![a.id.into()]).unwrap_or_default())
}

// =============================================================================
// WEAPONS AND COLLISION
// =============================================================================

fn get_unit_max_range(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::ally_unit(world, ctx, &args, 1)?, |u| vec![Value::fixed(u.max_range)])
}

/// `(unitID, weaponNum [, key])`
///
/// Without a key: `angleGood, reloaded, reloadFrame, salvoLeft,
/// numStockpiled`. With a key: that single field, nothing if unknown.
/// Weapon numbers are 1-based.
fn get_unit_weapon_state(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let num = args.check_int(2)?;
    let Some(weapon) = usize::try_from(num.saturating_sub(1)).ok().and_then(|i| unit.weapons.get(i)) else {
        return nothing();
    };
    let key = if args.is_none(3) { String::new() } else { args.check_string(3)? };

    if key.is_empty() {
        return Ok(vec![
            weapon.angle_good.into(),
            (weapon.reload_frame <= world.frame).into(),
            weapon.reload_frame.into(),
            weapon.salvo_left.into(),
            weapon.num_stockpiled.into(),
        ]);
    }
    let seconds = |frames: u32| Value::from(f64::from(frames) / f64::from(GAME_SPEED));
    let value = match key.as_str() {
        "reloadState" | "reloadFrame" => weapon.reload_frame.into(),
        "reloadTime" => seconds(weapon.reload_time),
        "accuracy" => Value::fixed(weapon.accuracy),
        "sprayAngle" => Value::fixed(weapon.spray_angle),
        "range" => Value::fixed(weapon.range),
        "projectileSpeed" => Value::fixed(weapon.projectile_speed),
        "burst" => weapon.burst.into(),
        "burstRate" => seconds(weapon.burst_rate),
        "projectiles" => weapon.projectiles.into(),
        "salvoLeft" => weapon.salvo_left.into(),
        "nextSalvo" => weapon.next_salvo.into(),
        _ => return nothing(),
    };
    Ok(vec![value])
}

/// `blocking, solidObjects, projectiles, rays, crushable,
/// blockEnemyPushing, blockHeightChanges`
fn get_unit_blocking(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::in_los_unit(world, ctx, &args, 1)?, |u| {
        let b = u.blocking;
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

// =============================================================================
// SENSOR STATE
// =============================================================================

fn scope_status(world: &World, unit: &Unit, scope: ReadScope) -> LosStatus {
    match scope {
        ReadScope::AllyTeam(at) => world.ledger.status(unit.id, at),
        ReadScope::AllAccess => LosStatus::FULL,
        ReadScope::NoAccess => LosStatus::NONE,
    }
}

/// `(unitID [, allyTeamID [, raw]])`
///
/// A table of the set flags (`los`, `radar`, `typed`), or the raw bits.
/// Callers without full read get the history bits only when the unit is
/// typed, and never the mask bits.
fn get_unit_los_state(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let scope = effective_los_ally_team(world, ctx, args.maybe_int(2)?, args.func(), 2)?;
    let status = scope_status(world, unit, scope);

    if args.opt_bool(3, false) {
        let shown = if ctx.full_read { status } else { status.redacted() };
        return Ok(vec![shown.bits().into()]);
    }
    let mut table = Table::new();
    if status.in_los() {
        table.set("los", true);
    }
    if status.in_radar() {
        table.set("radar", true);
    }
    if status.in_los() || status.is_typed() {
        table.set("typed", true);
    }
    Ok(vec![table.into()])
}

/// Shared body of the sensor-coverage unit tests. No-access scopes see
/// nothing, all-access scopes everything.
fn unit_sensor_test(
    world: &World,
    ctx: &AccessContext,
    args: &Args<'_>,
    test: fn(&World, &Unit, usize) -> bool,
) -> QueryResult {
    let Some(unit) = parse::typed_unit(world, ctx, args, 1)? else {
        return nothing();
    };
    let covered = match effective_los_ally_team(world, ctx, args.maybe_int(2)?, args.func(), 2)? {
        ReadScope::AllyTeam(at) => test(world, unit, at),
        ReadScope::AllAccess => true,
        ReadScope::NoAccess => false,
    };
    Ok(vec![covered.into()])
}

fn is_unit_in_los(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    unit_sensor_test(world, ctx, &args, |w, u, at| w.ledger.unit_in_los(u, at))
}

fn is_unit_in_air_los(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    unit_sensor_test(world, ctx, &args, |w, u, at| w.ledger.unit_in_air_los(u, at))
}

fn is_unit_in_radar(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    unit_sensor_test(world, ctx, &args, |w, u, at| w.ledger.unit_in_radar(u, at))
}

/// Jammer coverage has no meaning without a concrete ally team.
fn is_unit_in_jammer(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::typed_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    match effective_los_ally_team(world, ctx, args.maybe_int(2)?, args.func(), 2)? {
        ReadScope::AllyTeam(at) => Ok(vec![world.ledger.unit_in_jammer(unit, at).into()]),
        ReadScope::AllAccess | ReadScope::NoAccess => {
            Err(QueryError::InvalidAllyTeam { func: args.func(), arg: 2 })
        }
    }
}

// =============================================================================
// RULES PARAMS AND MOVEMENT
// =============================================================================

fn get_unit_rules_param(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let key = args.check_string(2)?;
    Ok(rules::lookup(&unit.rules_params, &key, unit_los_mask(world, ctx, unit)))
}

fn get_unit_rules_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    Ok(rules::dump(&unit.rules_params, unit_los_mask(world, ctx, unit)))
}

fn get_unit_move_type_data(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let common = &unit.move_common;
    let mut t = Table::new()
        .with("maxSpeed", per_second(common.max_speed))
        .with("maxWantedSpeed", per_second(common.max_wanted_speed))
        .with("goalx", Value::fixed(common.goal.x))
        .with("goaly", Value::fixed(common.goal.y))
        .with("goalz", Value::fixed(common.goal.z))
        .with("progressState", common.progress.name());

    match &unit.move_type {
        MoveTypeData::Ground(m) => {
            t = t
                .with("name", "ground")
                .with("turnRate", Value::fixed(m.turn_rate))
                .with("accRate", Value::fixed(m.acc_rate))
                .with("decRate", Value::fixed(m.dec_rate))
                .with("maxReverseSpeed", per_second(m.max_reverse_speed))
                .with("wantedSpeed", per_second(m.wanted_speed))
                .with("currentSpeed", per_second(m.current_speed))
                .with("goalRadius", Value::fixed(m.goal_radius))
                .with("currwaypointx", Value::fixed(m.curr_waypoint.x))
                .with("currwaypointy", Value::fixed(m.curr_waypoint.y))
                .with("currwaypointz", Value::fixed(m.curr_waypoint.z))
                .with("nextwaypointx", Value::fixed(m.next_waypoint.x))
                .with("nextwaypointy", Value::fixed(m.next_waypoint.y))
                .with("nextwaypointz", Value::fixed(m.next_waypoint.z));
        }
        MoveTypeData::HoverAir(m) => {
            t = t
                .with("name", "gunship")
                .with("wantedHeight", Value::fixed(m.wanted_height))
                .with("collide", m.collide)
                .with("useSmoothMesh", m.use_smooth_mesh)
                .with("aircraftState", m.aircraft_state.name())
                .with("flyState", m.fly_state.name())
                .with("goalDistance", Value::fixed(m.goal_distance))
                .with("bankingAllowed", m.banking_allowed)
                .with("currentBank", Value::fixed(m.current_bank))
                .with("currentPitch", Value::fixed(m.current_pitch))
                .with("turnRate", Value::fixed(m.turn_rate))
                .with("accRate", Value::fixed(m.acc_rate))
                .with("decRate", Value::fixed(m.dec_rate))
                .with("altitudeRate", Value::fixed(m.altitude_rate))
                .with("dontLand", !m.allow_landing)
                .with("maxDrift", Value::fixed(m.max_drift));
        }
        MoveTypeData::StrafeAir(m) => {
            t = t
                .with("name", "airplane")
                .with("aircraftState", m.aircraft_state.name())
                .with("wantedHeight", Value::fixed(m.wanted_height))
                .with("collide", m.collide)
                .with("useSmoothMesh", m.use_smooth_mesh)
                .with("myGravity", Value::fixed(m.my_gravity))
                .with("maxBank", Value::fixed(m.max_bank))
                .with("maxPitch", Value::fixed(m.max_pitch))
                .with("turnRadius", Value::fixed(m.turn_radius))
                .with("maxAcc", Value::fixed(m.max_acc))
                .with("maxAileron", Value::fixed(m.max_aileron))
                .with("maxElevator", Value::fixed(m.max_elevator))
                .with("maxRudder", Value::fixed(m.max_rudder));
        }
        MoveTypeData::Static => t = t.with("name", "static"),
        MoveTypeData::Scripted => t = t.with("name", "script"),
    }
    Ok(vec![t.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fixture::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::sensor::{LOS_INLOS, LOS_INRADAR, LOS_PREVLOS, LOS_CONTRADAR};
    use crate::core::fixed::FIXED_ONE;
    use crate::world::Capability;
    use crate::world::unit::{AircraftState, FlyState, HoverAirMove, Stockpile, WeaponState};

    /// Team 1 tank at (300, 0, 300), seen only on radar by ally team 0.
    fn radar_only() -> (World, u32) {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.ledger.set_status(id, 0, LosStatus::radar_blip());
        world.ledger.set_ally_error_size(0, from_int(10));
        let err = world.ledger.error_mut(id).unwrap();
        err.vector = FixedVec3::new(FIXED_ONE, 0, FIXED_ONE);
        err.set_applies_to(0, true);
        (world, id)
    }

    fn enemy_ctx(world: &World) -> AccessContext {
        AccessContext::as_team(world, 0)
    }

    #[test]
    fn test_radar_only_unit() {
        let (world, id) = radar_only();
        let ctx = enemy_ctx(&world);

        assert!(call(&world, &ctx, "GetUnitHealth", &[n(id)]).unwrap().is_empty());
        assert!(call(&world, &ctx, "GetUnitDefID", &[n(id)]).unwrap().is_empty());

        let seen = call(&world, &ctx, "GetUnitPosition", &[n(id)]).unwrap();
        let owner = call(&world, &AccessContext::as_team(&world, 1), "GetUnitPosition", &[n(id)]).unwrap();
        assert_eq!(owner, vec![n(300), n(0), n(300)]);
        assert_eq!(seen.len(), 3);
        assert_ne!(seen, owner);
    }

    #[test]
    fn test_position_stable_within_frame() {
        let (world, id) = radar_only();
        let ctx = enemy_ctx(&world);
        let a = call(&world, &ctx, "GetUnitPosition", &[n(id), Value::Bool(true), Value::Bool(true)]).unwrap();
        let b = call(&world, &ctx, "GetUnitPosition", &[n(id), Value::Bool(true), Value::Bool(true)]).unwrap();
        assert_eq!(a.len(), 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_typed_unit_reports_def() {
        let (mut world, id) = radar_only();
        world.ledger.set_status(id, 0, LosStatus::from_bits(LOS_INRADAR | LOS_PREVLOS | LOS_CONTRADAR));
        let ctx = enemy_ctx(&world);
        assert_eq!(call(&world, &ctx, "GetUnitDefID", &[n(id)]).unwrap(), vec![n(42)]);
        assert!(call(&world, &ctx, "GetUnitHealth", &[n(id)]).unwrap().is_empty());
    }

    #[test]
    fn test_decoy_health_and_def() {
        let mut world = world();
        let id = world.spawn_unit(43, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.units.get_mut(id).unwrap().health = from_int(25);
        world.ledger.set_status(id, 0, LosStatus::seen());

        let enemy = enemy_ctx(&world);
        assert_eq!(call(&world, &enemy, "GetUnitDefID", &[n(id)]).unwrap(), vec![n(42)]);
        let health = call(&world, &enemy, "GetUnitHealth", &[n(id)]).unwrap();
        assert_eq!(health[0], n(50));
        assert_eq!(health[1], n(100));

        let owner = AccessContext::as_team(&world, 1);
        assert_eq!(call(&world, &owner, "GetUnitDefID", &[n(id)]).unwrap(), vec![n(43)]);
        let health = call(&world, &owner, "GetUnitHealth", &[n(id)]).unwrap();
        assert_eq!(health[0], n(25));
        assert_eq!(health[1], n(50));
    }

    #[test]
    fn test_hidden_damage() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.ledger.set_status(id, 0, LosStatus::seen());
        let mut defs = world.defs.clone();
        let mut def = defs.unit_def(42).unwrap().clone();
        def.hide_damage = true;
        def.id = 44;
        def.name = "stealthtank".into();
        defs.add_unit_def(def).unwrap();
        world.defs = defs;
        world.units.get_mut(id).unwrap().def_id = 44;

        let health = call(&world, &enemy_ctx(&world), "GetUnitHealth", &[n(id)]).unwrap();
        assert_eq!(health.len(), 5);
        assert_eq!(&health[..3], &[Value::Nil, Value::Nil, Value::Nil]);
        assert_eq!(health[4], n(1));
    }

    #[test]
    fn test_ally_only_state() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.ledger.set_status(id, 0, LosStatus::seen());
        world.units.get_mut(id).unwrap().experience = to_fixed(0.5);

        let enemy = enemy_ctx(&world);
        assert!(call(&world, &enemy, "GetUnitExperience", &[n(id)]).unwrap().is_empty());
        assert!(call(&world, &enemy, "GetUnitStates", &[n(id)]).unwrap().is_empty());

        let owner = AccessContext::as_team(&world, 1);
        assert_eq!(call(&world, &owner, "GetUnitExperience", &[n(id)]).unwrap()[0], n(0.5));

        // team 2 is on an allied but different ally team
        let friend = AccessContext::as_team(&world, 2);
        assert!(call(&world, &friend, "GetUnitExperience", &[n(id)]).unwrap().is_empty());
    }

    #[test]
    fn test_states_table_and_flat() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.units.get_mut(id).unwrap().move_type = MoveTypeData::HoverAir(HoverAirMove {
            wanted_height: from_int(80),
            collide: true,
            use_smooth_mesh: true,
            aircraft_state: AircraftState::Flying,
            fly_state: FlyState::Cruising,
            goal_distance: 0,
            banking_allowed: true,
            current_bank: 0,
            current_pitch: 0,
            turn_rate: 0,
            acc_rate: 0,
            dec_rate: 0,
            altitude_rate: 0,
            allow_landing: true,
            max_drift: 0,
            auto_land: true,
        });
        let ctx = AccessContext::synced();

        let out = call(&world, &ctx, "GetUnitStates", &[n(id)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.get_str("firestate"), Some(&n(2)));
        assert_eq!(table.get_str("autoland"), Some(&Value::Bool(true)));
        assert_eq!(table.get_str("loopbackattack"), Some(&Value::Bool(false)));

        let flat = call(&world, &ctx, "GetUnitStates", &[n(id), Value::Bool(false)]).unwrap();
        assert_eq!(flat, vec![n(2), n(1), n(0)]);
        let flat = call(&world, &ctx, "GetUnitStates", &[n(id), Value::Bool(false), Value::Bool(true)]).unwrap();
        assert_eq!(flat.len(), 7);
    }

    #[test]
    fn test_sensor_radius() {
        let mut world = world();
        let id = world.spawn_unit(60, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        let ctx = AccessContext::as_team(&world, 1);
        assert_eq!(call(&world, &ctx, "GetUnitSensorRadius", &[n(id), Value::from("radar")]).unwrap(), vec![n(2000)]);
        let err = call(&world, &ctx, "GetUnitSensorRadius", &[n(id), Value::from("psychic")]).unwrap_err();
        assert_eq!(err, QueryError::UnknownSensor { func: "GetUnitSensorRadius", name: "psychic".into() });
        world.units.get_mut(id).unwrap().sensors.radar = 0;
        assert_eq!(call(&world, &ctx, "GetUnitSensorRadius", &[n(id), Value::from("radar")]).unwrap(), vec![n(0)]);
    }

    #[test]
    fn test_pos_error_params_clamp() {
        let (mut world, id) = radar_only();
        assert_eq!(world.teams.num_ally_teams(), 3);
        let err = world.ledger.error_mut(id).unwrap();
        err.set_applies_to(2, false);
        err.set_applies_to(3, true);
        let ctx = AccessContext::synced();
        let out = call(&world, &ctx, "GetUnitPosErrorParams", &[n(id), n(99)]).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(&out[..3], &[n(1), n(0), n(1)]);
        // 99 clamps to the last ally team (2), not one past it
        assert_eq!(out[7], Value::Bool(false));
        let out = call(&world, &ctx, "GetUnitPosErrorParams", &[n(id), n(2)]).unwrap();
        assert_eq!(out[7], Value::Bool(false));
        let out = call(&world, &ctx, "GetUnitPosErrorParams", &[n(id), Value::Number(1e30)]).unwrap();
        assert_eq!(out[7], Value::Bool(false));
        let out = call(&world, &ctx, "GetUnitPosErrorParams", &[n(id), n(-4)]).unwrap();
        assert_eq!(out[7], Value::Bool(true));
    }

    #[test]
    fn test_tombstoned_unit_is_gone() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        let ctx = AccessContext::synced();
        assert_eq!(call(&world, &ctx, "ValidUnitID", &[n(id)]).unwrap(), vec![Value::Bool(true)]);
        world.destroy_unit(id).unwrap();
        assert_eq!(call(&world, &ctx, "ValidUnitID", &[n(id)]).unwrap(), vec![Value::Bool(false)]);
        assert!(call(&world, &ctx, "GetUnitTeam", &[n(id)]).unwrap().is_empty());
        assert_eq!(call(&world, &ctx, "ValidUnitID", &[Value::from("x")]).unwrap(), vec![Value::Bool(false)]);
        assert!(call(&world, &ctx, "GetUnitTeam", &[Value::from("x")]).is_err());
    }

    #[test]
    fn test_los_state() {
        let (world, id) = radar_only();
        let ctx = enemy_ctx(&world);
        let out = call(&world, &ctx, "GetUnitLosState", &[n(id)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.get_str("radar"), Some(&Value::Bool(true)));
        assert!(table.get_str("los").is_none());
        assert!(table.get_str("typed").is_none());

        let raw = call(&world, &ctx, "GetUnitLosState", &[n(id), Value::Nil, Value::Bool(true)]).unwrap();
        assert_eq!(raw, vec![n(LOS_INRADAR as u32)]);

        let err = call(&world, &ctx, "GetUnitLosState", &[n(id), n(1)]).unwrap_err();
        assert_eq!(err, QueryError::InvalidAllyTeam { func: "GetUnitLosState", arg: 2 });

        let spec = AccessContext::spectator();
        let raw = call(&world, &spec, "GetUnitLosState", &[n(id), n(0), Value::Bool(true)]).unwrap();
        assert_eq!(raw, vec![n(LosStatus::radar_blip().bits() as u32)]);
    }

    #[test]
    fn test_unit_in_los_scopes() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.ledger.set_status(id, 0, LosStatus::from_bits(LOS_INLOS | LOS_INRADAR));
        let spec = AccessContext::spectator();
        assert_eq!(call(&world, &spec, "IsUnitInLos", &[n(id), n(-2)]).unwrap(), vec![Value::Bool(true)]);
        assert_eq!(call(&world, &spec, "IsUnitInLos", &[n(id), n(-1)]).unwrap(), vec![Value::Bool(false)]);
        assert!(call(&world, &spec, "IsUnitInJammer", &[n(id), n(-2)]).is_err());
        assert_eq!(call(&world, &spec, "IsUnitInJammer", &[n(id), n(0)]).unwrap(), vec![Value::Bool(false)]);
    }

    #[test]
    fn test_separation_surface() {
        let mut world = world();
        let a = world.spawn_unit(42, 1, FixedVec3::from_ints(100, 0, 100)).unwrap();
        let b = world.spawn_unit(42, 1, FixedVec3::from_ints(130, 0, 140)).unwrap();
        let ctx = AccessContext::synced();
        assert_eq!(call(&world, &ctx, "GetUnitSeparation", &[n(a), n(b)]).unwrap(), vec![n(50)]);
        let surface = call(&world, &ctx, "GetUnitSeparation", &[n(a), n(b), Value::Bool(false), Value::Bool(true)]).unwrap();
        assert_eq!(surface, vec![n(34)]);
    }

    #[test]
    fn test_weapon_state() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(100, 0, 100)).unwrap();
        world.units.get_mut(id).unwrap().weapons.push(WeaponState {
            def_id: 7,
            angle_good: true,
            reload_frame: 0,
            reload_time: 60,
            salvo_left: 0,
            next_salvo: 0,
            num_stockpiled: 0,
            accuracy: 0,
            spray_angle: 0,
            range: from_int(300),
            projectile_speed: from_int(10),
            burst: 3,
            burst_rate: 15,
            projectiles: 1,
        });
        let ctx = AccessContext::synced();
        let out = call(&world, &ctx, "GetUnitWeaponState", &[n(id), n(1)]).unwrap();
        assert_eq!(out[..2], [Value::Bool(true), Value::Bool(true)]);
        assert_eq!(call(&world, &ctx, "GetUnitWeaponState", &[n(id), n(1), Value::from("reloadTime")]).unwrap(), vec![n(2)]);
        assert!(call(&world, &ctx, "GetUnitWeaponState", &[n(id), n(2)]).unwrap().is_empty());
        assert!(call(&world, &ctx, "GetUnitWeaponState", &[n(id), n(1), Value::from("nonsense")]).unwrap().is_empty());
        for huge in [-1e30, 1e30, f64::NEG_INFINITY] {
            assert!(call(&world, &ctx, "GetUnitWeaponState", &[n(id), Value::Number(huge)]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_building_and_stockpile() {
        let mut world = world();
        let lab = world.spawn_unit(50, 1, FixedVec3::from_ints(100, 0, 100)).unwrap();
        let tank = world.spawn_unit(42, 1, FixedVec3::from_ints(100, 0, 100)).unwrap();
        let ctx = AccessContext::as_team(&world, 1);
        assert!(call(&world, &ctx, "GetUnitIsBuilding", &[n(lab)]).unwrap().is_empty());
        world.units.get_mut(lab).unwrap().capability = Capability::Factory {
            cur_build: Some(tank),
            new_unit_commands: Default::default(),
        };
        assert_eq!(call(&world, &ctx, "GetUnitIsBuilding", &[n(lab)]).unwrap(), vec![n(tank)]);

        assert!(call(&world, &ctx, "GetUnitStockpile", &[n(tank)]).unwrap().is_empty());
        world.units.get_mut(tank).unwrap().stockpile = Some(Stockpile { num_stockpiled: 2, num_queued: 1, build_percent: FIXED_ONE / 2 });
        assert_eq!(call(&world, &ctx, "GetUnitStockpile", &[n(tank)]).unwrap(), vec![n(2), n(1), n(0.5)]);
    }

    #[test]
    fn test_move_type_data() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(100, 0, 100)).unwrap();
        world.units.get_mut(id).unwrap().move_common.max_speed = from_int(2);
        let out = call(&world, &AccessContext::synced(), "GetUnitMoveTypeData", &[n(id)]).unwrap();
        let table = out[0].as_table().unwrap();
        assert_eq!(table.get_str("name"), Some(&Value::from("ground")));
        assert_eq!(table.get_str("maxSpeed"), Some(&n(60)));
        assert_eq!(table.get_str("progressState"), Some(&Value::from("done")));
    }

    #[test]
    fn test_def_dimensions() {
        let world = world();
        let out = call(&world, &AccessContext::no_access(), "GetUnitDefDimensions", &[n(42)]).unwrap();
        assert_eq!(out[0].as_table().unwrap().get_str("radius"), Some(&n(8)));
        assert!(call(&world, &AccessContext::no_access(), "GetUnitDefDimensions", &[n(999)]).unwrap().is_empty());
    }
}
