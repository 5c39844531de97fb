//! Game-wide state and utility queries.

use crate::access::AccessContext;
use crate::access::resolver::game_los_mask;
use crate::core::fixed::{GAME_SPEED, from_f64};
use crate::core::heading::{heading_from_vector, vector_from_heading};
use crate::error::QueryResult;
use crate::world::state::{GODMODE_ALLIED_BIT, GODMODE_ENEMY_BIT, wind_components};
use crate::world::World;
use super::value::{Value, push_vec3};
use super::{rules, Args, QueryRegistry};

/// Frames in one in-game day.
const DAY_FRAMES: u32 = GAME_SPEED * 24 * 60 * 60;

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("IsCheatingEnabled", is_cheating_enabled);
    registry.register("IsGodModeEnabled", is_god_mode_enabled);
    registry.register("IsGameOver", is_game_over);
    registry.register("GetGameFrame", get_game_frame);
    registry.register("GetGameSeconds", get_game_seconds);
    registry.register("GetGaiaTeamID", get_gaia_team_id);
    registry.register("FixedAllies", fixed_allies);
    registry.register("GetWind", get_wind);
    registry.register("GetTidal", get_tidal);
    registry.register("GetGameRulesParam", get_game_rules_param);
    registry.register("GetGameRulesParams", get_game_rules_params);
    registry.register("GetHeadingFromVector", get_heading_from_vector);
    registry.register("GetVectorFromHeading", get_vector_from_heading);
}

fn is_cheating_enabled(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![world.cheat_enabled.into()])
}

fn is_god_mode_enabled(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![
        (world.god_mode != 0).into(),
        (world.god_mode & GODMODE_ALLIED_BIT != 0).into(),
        (world.god_mode & GODMODE_ENEMY_BIT != 0).into(),
    ])
}

fn is_game_over(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![world.game_over.into()])
}

/// Frame within the current day, then the number of whole days.
fn get_game_frame(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![(world.frame % DAY_FRAMES).into(), (world.frame / DAY_FRAMES).into()])
}

fn get_game_seconds(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![(f64::from(world.frame) / f64::from(GAME_SPEED)).into()])
}

fn get_gaia_team_id(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(world.teams.gaia_team().map(Value::from).into_iter().collect())
}

fn fixed_allies(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![world.teams.fixed_allies().into()])
}

/// Wind vector, strength, normalised direction.
fn get_wind(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    let (strength, dir) = wind_components(world.wind);
    let mut out = Vec::with_capacity(7);
    push_vec3(&mut out, world.wind);
    out.push(Value::fixed(strength));
    push_vec3(&mut out, dir);
    Ok(out)
}

fn get_tidal(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(vec![Value::fixed(world.tidal)])
}

fn get_game_rules_param(world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let key = args.check_string(1)?;
    Ok(rules::lookup(&world.game_rules_params, &key, game_los_mask()))
}

fn get_game_rules_params(world: &World, _ctx: &AccessContext, _args: Args<'_>) -> QueryResult {
    Ok(rules::dump(&world.game_rules_params, game_los_mask()))
}

fn get_heading_from_vector(_world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let x = from_f64(args.check_number(1)?);
    let z = from_f64(args.check_number(2)?);
    Ok(vec![heading_from_vector(x, z).into()])
}

fn get_vector_from_heading(_world: &World, _ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let heading = args.check_int(1)?;
    let (x, z) = vector_from_heading(heading);
    Ok(vec![Value::fixed(x), Value::fixed(z)])
}
