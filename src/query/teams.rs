//! Team, ally-team and player queries.

use std::collections::BTreeMap;

use crate::access::resolver::{is_ally_unit, is_player_hidden, player_los_mask, team_los_mask};
use crate::access::allegiance::reads_team_raw;
use crate::access::AccessContext;
use crate::core::fixed::GAME_SPEED;
use crate::error::{QueryError, QueryResult};
use crate::world::team::{ResourceState, Team, TeamStatistics};
use crate::world::World;
use super::value::{Table, Value};
use super::{nothing, rules, Args, QueryRegistry};

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetTeamList", get_team_list);
    registry.register("GetAllyTeamList", get_ally_team_list);
    registry.register("GetPlayerList", get_player_list);
    registry.register("GetTeamInfo", get_team_info);
    registry.register("GetTeamAllyTeamID", get_team_ally_team_id);
    registry.register("GetTeamResources", get_team_resources);
    registry.register("GetTeamUnitStats", get_team_unit_stats);
    registry.register("GetTeamResourceStats", get_team_resource_stats);
    registry.register("GetTeamStatsHistory", get_team_stats_history);
    registry.register("GetTeamScriptAI", get_team_script_ai);
    registry.register("GetAllyTeamInfo", get_ally_team_info);
    registry.register("AreTeamsAllied", are_teams_allied);
    registry.register("ArePlayersAllied", are_players_allied);
    registry.register("GetPlayerInfo", get_player_info);
    registry.register("GetPlayerControlledUnit", get_player_controlled_unit);
    registry.register("GetTeamRulesParam", get_team_rules_param);
    registry.register("GetTeamRulesParams", get_team_rules_params);
    registry.register("GetPlayerRulesParam", get_player_rules_param);
    registry.register("GetPlayerRulesParams", get_player_rules_params);
}

/// Team argument that must name an existing team.
pub(crate) fn parse_team<'w>(world: &'w World, args: &Args<'_>, pos: usize) -> Result<&'w Team, QueryError> {
    let id = args.check_int(pos)?;
    if !world.teams.is_valid_team(id) {
        return Err(QueryError::BadTeam { func: args.func(), team: id });
    }
    world
        .teams
        .team(id as usize)
        .ok_or(QueryError::BadTeam { func: args.func(), team: id })
}

fn options_table(options: &BTreeMap<String, String>) -> Value {
    let mut table = Table::new();
    for (key, value) in options {
        table.set(key.as_str(), value.as_str());
    }
    Value::Table(table)
}

fn resource<'t>(team: &'t Team, name: &str) -> Option<&'t ResourceState> {
    match name.as_bytes().first() {
        Some(b'm') => Some(&team.metal),
        Some(b'e') => Some(&team.energy),
        _ => None,
    }
}

// =============================================================================
// LISTS
// =============================================================================

fn get_team_list(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let ally_team = match args.get(1) {
        None | Some(Value::Nil) => None,
        Some(Value::Number(n)) => Some(*n as i64),
        Some(_) => return Err(args.usage("[allyTeamID]")),
    };
    if let Some(at) = ally_team {
        if !world.teams.is_valid_ally_team(at) {
            return nothing();
        }
    }
    let ids = world
        .teams
        .teams()
        .filter(|team| ally_team.map_or(true, |at| team.ally_team as i64 == at))
        .map(|team| team.id);
    Ok(vec![Value::from(Table::array(ids))])
}

fn get_ally_team_list(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![Table::array(0..world.teams.num_ally_teams()).into()])
}

/// `([teamID [, onlyActive]])` or `([onlyActive [, teamID]])`.
fn get_player_list(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let (team, only_active) = match args.get(1) {
        Some(Value::Number(n)) => (*n as i64, args.opt_bool(2, false)),
        Some(Value::Bool(b)) => (args.opt_int(2, -1)?, *b),
        _ => (-1, false),
    };
    if team >= world.teams.num_teams() as i64 {
        return nothing();
    }
    let ids = world
        .players
        .iter()
        .filter(|p| !is_player_hidden(world, ctx, p))
        .filter(|p| !only_active || p.active)
        .filter(|p| team < 0 || (!p.spectator && p.team as i64 == team))
        .map(|p| p.id);
    Ok(vec![Value::from(Table::array(ids))])
}

// =============================================================================
// TEAM INFO
// =============================================================================

fn get_team_info(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let id = args.check_int(1)?;
    let Some(team) = usize::try_from(id).ok().and_then(|id| world.teams.team(id)) else {
        return nothing();
    };
    let mut out = vec![
        team.id.into(),
        team.leader.map_or(-1, |p| p as i64).into(),
        team.is_dead.into(),
        team.has_ai.into(),
        team.side.as_str().into(),
        team.ally_team.into(),
        Value::fixed(team.income_multiplier),
    ];
    if args.opt_bool(2, true) {
        out.push(options_table(&team.custom_options));
    }
    Ok(out)
}

fn get_team_ally_team_id(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let id = args.check_int(1)?;
    Ok(usize::try_from(id)
        .ok()
        .and_then(|id| world.teams.ally_team_of(id))
        .map(Value::from)
        .into_iter()
        .collect())
}

/// Current, storage, pull, income, expense, share, sent, received, excess.
fn get_team_resources(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    if !reads_team_raw(world, ctx, team.id) {
        return nothing();
    }
    let name = args.check_string(2)?;
    let Some(res) = resource(team, &name) else {
        return nothing();
    };
    Ok([
        res.current, res.storage, res.pull, res.income, res.expense,
        res.share, res.sent, res.received, res.excess,
    ]
    .into_iter()
    .map(Value::fixed)
    .collect())
}

fn stats_readable(world: &World, ctx: &AccessContext, team: &Team) -> bool {
    world.game_over || reads_team_raw(world, ctx, team.id)
}

/// Killed, died, captured, out-captured, received, sent.
fn get_team_unit_stats(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    if !stats_readable(world, ctx, team) {
        return nothing();
    }
    let s = &team.current_stats;
    Ok(vec![
        s.units_killed.into(),
        s.units_died.into(),
        s.units_captured.into(),
        s.units_out_captured.into(),
        s.units_received.into(),
        s.units_sent.into(),
    ])
}

/// Used, produced, excess, received, sent.
fn get_team_resource_stats(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    if !stats_readable(world, ctx, team) {
        return nothing();
    }
    let s = &team.current_stats;
    let name = args.check_string(2)?;
    let values = match name.as_bytes().first() {
        Some(b'm') => [s.metal_used, s.metal_produced, s.metal_excess, s.metal_received, s.metal_sent],
        Some(b'e') => [s.energy_used, s.energy_produced, s.energy_excess, s.energy_received, s.energy_sent],
        _ => return nothing(),
    };
    Ok(values.into_iter().map(Value::fixed).collect())
}

fn stats_table(sample: &TeamStatistics, frame: u32) -> Table {
    Table::new()
        .with("time", f64::from(frame) / f64::from(GAME_SPEED))
        .with("frame", frame)
        .with("metalUsed", Value::fixed(sample.metal_used))
        .with("metalProduced", Value::fixed(sample.metal_produced))
        .with("metalExcess", Value::fixed(sample.metal_excess))
        .with("metalReceived", Value::fixed(sample.metal_received))
        .with("metalSent", Value::fixed(sample.metal_sent))
        .with("energyUsed", Value::fixed(sample.energy_used))
        .with("energyProduced", Value::fixed(sample.energy_produced))
        .with("energyExcess", Value::fixed(sample.energy_excess))
        .with("energyReceived", Value::fixed(sample.energy_received))
        .with("energySent", Value::fixed(sample.energy_sent))
        .with("damageDealt", Value::fixed(sample.damage_dealt))
        .with("damageReceived", Value::fixed(sample.damage_received))
        .with("unitsProduced", sample.units_produced)
        .with("unitsDied", sample.units_died)
        .with("unitsReceived", sample.units_received)
        .with("unitsSent", sample.units_sent)
        .with("unitsCaptured", sample.units_captured)
        .with("unitsOutCaptured", sample.units_out_captured)
        .with("unitsKilled", sample.units_killed)
}

/// Sample count with one argument, otherwise the 1-based inclusive range
/// `[start, end]` clamped to the history.
fn get_team_stats_history(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    if !stats_readable(world, ctx, team) {
        return nothing();
    }
    let history = &team.stats_history;
    if args.is_none(2) {
        return Ok(vec![history.len().into()]);
    }
    let mut table = Table::new();
    if history.is_empty() {
        return Ok(vec![table.into()]);
    }
    let last = history.len() as i64 - 1;
    let start = args.opt_int(2, 1)?.saturating_sub(1).clamp(0, last);
    let end = match args.maybe_int(3)? {
        Some(end) => end.saturating_sub(1).clamp(0, last),
        None => start,
    };
    for i in start..=end {
        let sample = &history[i as usize];
        let frame = if i == last { world.frame } else { sample.frame };
        table.push(stats_table(sample, frame));
    }
    Ok(vec![table.into()])
}

fn get_team_script_ai(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    Ok(team.script_ai.as_deref().map(Value::from).into_iter().collect())
}

fn get_ally_team_info(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let id = args.check_int(1)?;
    let Some(ally_team) = usize::try_from(id).ok().and_then(|id| world.teams.ally_team(id)) else {
        return nothing();
    };
    Ok(vec![options_table(&ally_team.custom_options)])
}

// =============================================================================
// ALLIANCES AND PLAYERS
// =============================================================================

fn are_teams_allied(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let a = args.check_int(1)?;
    let b = args.check_int(2)?;
    if !world.teams.is_valid_team(a) || !world.teams.is_valid_team(b) {
        return nothing();
    }
    Ok(vec![world.teams.teams_allied(a as usize, b as usize).into()])
}

fn are_players_allied(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let a = world.players.get(args.check_int(1)?);
    let b = world.players.get(args.check_int(2)?);
    let (Some(a), Some(b)) = (a, b) else {
        return nothing();
    };
    if is_player_hidden(world, ctx, a) || is_player_hidden(world, ctx, b) {
        return nothing();
    }
    Ok(vec![world.teams.teams_allied(a.team, b.team).into()])
}

/// Name, active, spectator, team, ally team, ping (s), cpu, country, rank,
/// AI on team, options (or nil), desynced.
fn get_player_info(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(player) = world.players.get(args.check_int(1)?) else {
        return nothing();
    };
    if is_player_hidden(world, ctx, player) {
        return nothing();
    }
    let team = world.teams.team(player.team);
    let options = if args.opt_bool(2, true) {
        options_table(&player.custom_options)
    } else {
        Value::Nil
    };
    Ok(vec![
        player.name.as_str().into(),
        player.active.into(),
        player.spectator.into(),
        player.team.into(),
        team.map(|t| t.ally_team).into(),
        (f64::from(player.ping_ms) / 1000.0).into(),
        (f64::from(player.cpu_permille) / 1000.0).into(),
        player.country.as_str().into(),
        player.rank.into(),
        team.is_some_and(|t| t.has_ai).into(),
        options,
        player.desynced.into(),
    ])
}

fn get_player_controlled_unit(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(player) = world.players.get(args.check_int(1)?) else {
        return nothing();
    };
    let Some(unit) = player.controlled_unit.and_then(|id| world.units.get(id)) else {
        return nothing();
    };
    if !is_ally_unit(ctx, unit) {
        return nothing();
    }
    Ok(vec![unit.id.into()])
}

// =============================================================================
// RULES PARAMS
// =============================================================================

fn get_team_rules_param(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    let key = args.check_string(2)?;
    Ok(rules::lookup(&team.rules_params, &key, team_los_mask(world, ctx, team)))
}

fn get_team_rules_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let team = parse_team(world, &args, 1)?;
    Ok(rules::dump(&team.rules_params, team_los_mask(world, ctx, team)))
}

fn get_player_rules_param(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(player) = world.players.get(args.check_int(1)?) else {
        return nothing();
    };
    let key = args.check_string(2)?;
    match player_los_mask(world, ctx, player) {
        Some(mask) => Ok(rules::lookup(&player.rules_params, &key, mask)),
        None => nothing(),
    }
}

fn get_player_rules_params(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(player) = world.players.get(args.check_int(1)?) else {
        return nothing();
    };
    match player_los_mask(world, ctx, player) {
        Some(mask) => Ok(rules::dump(&player.rules_params, mask)),
        None => nothing(),
    }
}
