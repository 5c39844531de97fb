//! Per-projectile queries.
//!
//! A projectile is visible to its own ally team and to anyone with its
//! position in LOS. Weapon-only queries return nothing for debris.

use crate::access::AccessContext;
use crate::error::QueryResult;
use crate::world::{Projectile, ProjectileKind, ProjectileTarget, World};
use super::value::{push_vec3, Table, Value};
use super::{parse, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetProjectilePosition", get_projectile_position);
    registry.register("GetProjectileDirection", get_projectile_direction);
    registry.register("GetProjectileVelocity", get_projectile_velocity);
    registry.register("GetProjectileGravity", get_projectile_gravity);
    registry.register("GetProjectileTarget", get_projectile_target);
    registry.register("GetProjectileIsIntercepted", get_projectile_is_intercepted);
    registry.register("GetProjectileTimeToLive", get_projectile_time_to_live);
    registry.register("GetProjectileOwnerID", get_projectile_owner_id);
    registry.register("GetProjectileTeamID", get_projectile_team_id);
    registry.register("GetProjectileAllyTeamID", get_projectile_ally_team_id);
    registry.register("GetProjectileType", get_projectile_type);
    registry.register("GetProjectileDefID", get_projectile_def_id);
}

fn with<F>(projectile: Option<&Projectile>, f: F) -> QueryResult
where
    F: FnOnce(&Projectile) -> Vec<Value>,
{
    Ok(projectile.map(f).unwrap_or_default())
}

fn get_projectile_position(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        let mut out = Vec::with_capacity(3);
        push_vec3(&mut out, p.pos);
        out
    })
}

fn get_projectile_direction(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        let mut out = Vec::with_capacity(3);
        push_vec3(&mut out, p.dir);
        out
    })
}

/// `vx, vy, vz, speed`
fn get_projectile_velocity(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        let mut out = Vec::with_capacity(4);
        push_vec3(&mut out, p.velocity);
        out.push(Value::fixed(p.velocity.length()));
        out
    })
}

fn get_projectile_gravity(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| vec![Value::fixed(p.gravity)])
}

/// Target type code, then the target id or a `{x, y, z}` ground point.
fn get_projectile_target(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        let ProjectileKind::Weapon { target, .. } = &p.kind else {
            return Vec::new();
        };
        let what = match *target {
            ProjectileTarget::Ground(pos) => {
                Table::array([Value::fixed(pos.x), Value::fixed(pos.y), Value::fixed(pos.z)]).into()
            }
            ProjectileTarget::Unit(id) | ProjectileTarget::Feature(id) | ProjectileTarget::Projectile(id) => {
                Value::from(id)
            }
        };
        vec![target.code().into(), what]
    })
}

fn get_projectile_is_intercepted(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| match p.kind {
        ProjectileKind::Weapon { intercepted, .. } => vec![intercepted.into()],
        ProjectileKind::Piece { .. } => Vec::new(),
    })
}

/// Frames left.
fn get_projectile_time_to_live(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| match p.kind {
        ProjectileKind::Weapon { ttl, .. } => vec![ttl.into()],
        ProjectileKind::Piece { .. } => Vec::new(),
    })
}

fn get_projectile_owner_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        p.owner.map(|id| vec![id.into()]).unwrap_or_default()
    })
}

fn get_projectile_team_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        if world.teams.team(p.team).is_none() {
            return Vec::new();
        }
        vec![p.team.into()]
    })
}

fn get_projectile_ally_team_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| {
        if p.ally_team >= world.teams.num_ally_teams() {
            return Vec::new();
        }
        vec![p.ally_team.into()]
    })
}

/// `isWeapon, isPiece`
fn get_projectile_type(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| vec![p.is_weapon().into(), p.is_piece().into()])
}

fn get_projectile_def_id(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    with(parse::projectile(world, ctx, &args, 1)?, |p| match p.kind {
        ProjectileKind::Weapon { def_id, .. } if world.defs.weapon_def(def_id).is_some() => vec![def_id.into()],
        _ => Vec::new(),
    })
}
