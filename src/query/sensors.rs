//! Point sensor lookups.
//!
//! Every query taking an explicit ally team resolves it through
//! `effective_los_ally_team`. The all-access scope answers `true` to
//! everything, the no-access scope `false`.

use crate::access::resolver::effective_los_ally_team;
use crate::access::{AccessContext, ReadScope};
use crate::core::vec3::FixedVec3;
use crate::error::{QueryError, QueryResult};
use crate::world::{AllyTeamId, World};
use super::value::Value;
use super::{nothing, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetPositionLosState", get_position_los_state);
    registry.register("IsPosInLos", is_pos_in_los);
    registry.register("IsPosInRadar", is_pos_in_radar);
    registry.register("IsPosInAirLos", is_pos_in_air_los);
    registry.register("GetGlobalLos", get_global_los);
    registry.register("GetRadarErrorParams", get_radar_error_params);
}

/// `(x, y, z [, allyTeamID])` resolved to a point and a scope.
fn point_and_scope(world: &World, ctx: &AccessContext, args: &Args<'_>) -> Result<(FixedVec3, ReadScope), QueryError> {
    let pos = FixedVec3::new(args.check_fixed(1)?, args.check_fixed(2)?, args.check_fixed(3)?);
    let scope = effective_los_ally_team(world, ctx, args.maybe_int(4)?, args.func(), 4)?;
    Ok((pos, scope))
}

fn point_test(world: &World, ctx: &AccessContext, args: &Args<'_>, test: fn(&World, FixedVec3, AllyTeamId) -> bool) -> QueryResult {
    let (pos, scope) = point_and_scope(world, ctx, args)?;
    let seen = match scope {
        ReadScope::AllyTeam(at) => test(world, pos, at),
        ReadScope::AllAccess => true,
        ReadScope::NoAccess => false,
    };
    Ok(vec![seen.into()])
}

/// `inLosOrRadar, inLos, inRadar, inJammer`
fn get_position_los_state(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (pos, scope) = point_and_scope(world, ctx, &args)?;
    let at = match scope {
        ReadScope::AllyTeam(at) => at,
        other => {
            let full = other == ReadScope::AllAccess;
            return Ok(vec![Value::Bool(full); 4]);
        }
    };
    let ledger = &world.ledger;
    let in_los = ledger.in_los(pos, at);
    let in_radar = ledger.in_radar(pos, at);
    Ok(vec![
        (in_los || in_radar).into(),
        in_los.into(),
        in_radar.into(),
        ledger.in_jammer(pos, at).into(),
    ])
}

fn is_pos_in_los(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    point_test(world, ctx, &args, |w, pos, at| w.ledger.in_los(pos, at))
}

fn is_pos_in_radar(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    point_test(world, ctx, &args, |w, pos, at| w.ledger.in_radar(pos, at))
}

fn is_pos_in_air_los(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    point_test(world, ctx, &args, |w, pos, at| w.ledger.in_air_los(pos, at))
}

/// `([allyTeamID])`; nothing for an unknown ally team.
fn get_global_los(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let requested = match args.maybe_int(1)? {
        Some(id) => id,
        None => ctx.read_scope.as_script_id(),
    };
    if !world.teams.is_valid_ally_team(requested) {
        return nothing();
    }
    Ok(vec![world.ledger.global_los(requested as usize).into()])
}

/// `allyErrorSize, baseErrorSize, baseErrorMult`
///
/// An ally team outside the caller's alliance reports the base size in
/// place of its own.
fn get_radar_error_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let requested = args.maybe_int(1)?.unwrap_or(-1);
    if !world.teams.is_valid_ally_team(requested) {
        return nothing();
    }
    let at = requested as usize;
    let ledger = &world.ledger;
    let allied = ctx.full_read
        || ctx
            .read_ally_team()
            .is_some_and(|own| own == at || world.teams.ally_teams_allied(own, at));
    let size = if allied { ledger.ally_error_size(at) } else { ledger.base_error_size() };
    Ok(vec![
        Value::fixed(size),
        Value::fixed(ledger.base_error_size()),
        Value::fixed(ledger.base_error_mult()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fixture::*;
    use crate::access::{ALL_ACCESS_TEAM, NO_ACCESS_TEAM};
    use crate::core::fixed::from_int;

    fn radar_world() -> World {
        let mut world = world();
        world.spawn_unit(60, 0, FixedVec3::from_ints(500, 0, 500)).unwrap();
        world
    }

    fn at(x: i32, z: i32) -> [Value; 3] {
        [n(x), n(0), n(z)]
    }

    #[test]
    fn test_position_los_state() {
        let world = radar_world();
        let ctx = AccessContext::as_team(&world, 0);
        let near = call(&world, &ctx, "GetPositionLosState", &at(520, 500)).unwrap();
        assert_eq!(near, vec![Value::Bool(true), Value::Bool(true), Value::Bool(true), Value::Bool(false)]);
        let far = call(&world, &ctx, "GetPositionLosState", &at(900, 500)).unwrap();
        assert_eq!(far, vec![Value::Bool(true), Value::Bool(false), Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn test_point_queries_per_scope() {
        let world = radar_world();
        let enemy = AccessContext::as_team(&world, 1);
        assert_eq!(call(&world, &enemy, "IsPosInLos", &at(520, 500)).unwrap(), vec![Value::Bool(false)]);
        let own = AccessContext::as_team(&world, 0);
        assert_eq!(call(&world, &own, "IsPosInLos", &at(520, 500)).unwrap(), vec![Value::Bool(true)]);
        assert_eq!(call(&world, &own, "IsPosInRadar", &at(900, 500)).unwrap(), vec![Value::Bool(true)]);

        let mut args = at(520, 500).to_vec();
        args.push(n(ALL_ACCESS_TEAM as i32));
        let spec = AccessContext::spectator();
        assert_eq!(call(&world, &spec, "IsPosInAirLos", &args).unwrap(), vec![Value::Bool(true)]);
        let state = call(&world, &spec, "GetPositionLosState", &args).unwrap();
        assert_eq!(state, vec![Value::Bool(true); 4]);

        args[3] = n(NO_ACCESS_TEAM as i32);
        assert_eq!(call(&world, &own, "IsPosInLos", &args).unwrap(), vec![Value::Bool(false)]);
    }

    #[test]
    fn test_foreign_ally_team_argument_rejected() {
        let world = radar_world();
        let enemy = AccessContext::as_team(&world, 1);
        let mut args = at(520, 500).to_vec();
        args.push(n(0));
        let err = call(&world, &enemy, "IsPosInLos", &args).unwrap_err();
        assert_eq!(err, QueryError::InvalidAllyTeam { func: "IsPosInLos", arg: 4 });
        let spec = AccessContext::spectator();
        assert_eq!(call(&world, &spec, "IsPosInLos", &args).unwrap(), vec![Value::Bool(true)]);
    }

    #[test]
    fn test_global_los() {
        let mut world = radar_world();
        world.ledger.set_global_los(1, true);
        let ctx = AccessContext::as_team(&world, 1);
        assert_eq!(call(&world, &ctx, "GetGlobalLos", &[]).unwrap(), vec![Value::Bool(true)]);
        assert_eq!(call(&world, &ctx, "GetGlobalLos", &[n(0)]).unwrap(), vec![Value::Bool(false)]);
        assert!(call(&world, &ctx, "GetGlobalLos", &[n(9)]).unwrap().is_empty());
        assert!(call(&world, &AccessContext::spectator(), "GetGlobalLos", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_radar_error_params_hide_enemy_size() {
        let mut world = radar_world();
        world.ledger.set_ally_error_size(2, from_int(40));
        let base = world.ledger.base_error_size();
        let ally = AccessContext::as_team(&world, 1);
        let out = call(&world, &ally, "GetRadarErrorParams", &[n(2)]).unwrap();
        assert_eq!(out[0], n(40));
        let enemy = AccessContext::as_team(&world, 0);
        let out = call(&world, &enemy, "GetRadarErrorParams", &[n(2)]).unwrap();
        assert_eq!(out[0], Value::fixed(base));
        assert_eq!(out.len(), 3);
        assert!(call(&world, &enemy, "GetRadarErrorParams", &[n(7)]).unwrap().is_empty());
    }
}
