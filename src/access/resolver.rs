//! Access-Control Resolver
//!
//! Every disclosure decision the query layer makes goes through here:
//! which tier of a unit the caller may see, which definition it is shown,
//! and which rules-parameter levels it may read.
//!
//! ## Disclosure lattice
//!
//! ```text
//!   private  ⊇  allied  ⊇  inlos  ⊇  typed  ⊇  inradar  ⊇  public
//!     63         62         60        56        48          32
//! ```
//!
//! Alliance sits above LOS, LOS above identification, identification
//! above a radar blip. Game over unlocks everything.

use tracing::trace;

use crate::config::FeatureVisibility;
use crate::core::fixed::{Fixed, fixed_mul};
use crate::core::vec3::FixedVec3;
use crate::error::QueryError;
use crate::sensor::LosStatus;
use crate::world::defs::UnitDef;
use crate::world::feature::Feature;
use crate::world::player::Player;
use crate::world::projectile::Projectile;
use crate::world::rules_params::RulesParamLevel;
use crate::world::team::Team;
use crate::world::unit::Unit;
use crate::world::World;
use super::context::{AccessContext, ReadScope, NO_ACCESS_TEAM, ALL_ACCESS_TEAM};

// =============================================================================
// MASKS
// =============================================================================

/// OR together the bits of the given levels.
pub const fn level_mask(levels: &[RulesParamLevel]) -> u8 {
    let mut mask = 0;
    let mut i = 0;
    while i < levels.len() {
        mask |= levels[i] as u8;
        i += 1;
    }
    mask
}

/// Public only.
pub const PUBLIC_MASK: u8 = level_mask(&[RulesParamLevel::Public]);
/// Radar contact.
pub const INRADAR_MASK: u8 = level_mask(&[RulesParamLevel::InRadar, RulesParamLevel::Public]);
/// Identified.
pub const TYPED_MASK: u8 = level_mask(&[
    RulesParamLevel::Typed,
    RulesParamLevel::InRadar,
    RulesParamLevel::Public,
]);
/// In line of sight.
pub const INLOS_MASK: u8 = level_mask(&[
    RulesParamLevel::InLos,
    RulesParamLevel::Typed,
    RulesParamLevel::InRadar,
    RulesParamLevel::Public,
]);
/// Declared ally.
pub const ALLIED_MASK: u8 = level_mask(&[
    RulesParamLevel::Allied,
    RulesParamLevel::InLos,
    RulesParamLevel::Typed,
    RulesParamLevel::InRadar,
    RulesParamLevel::Public,
]);
/// Owner, full read or game over.
pub const PRIVATE_MASK: u8 = level_mask(&[
    RulesParamLevel::Private,
    RulesParamLevel::Allied,
    RulesParamLevel::InLos,
    RulesParamLevel::Typed,
    RulesParamLevel::InRadar,
    RulesParamLevel::Public,
]);

// =============================================================================
// UNIT DISCLOSURE
// =============================================================================

/// Ledger status of `unit` for the caller's ally team.
///
/// `None` when the caller has no single ally team.
pub fn unit_status(world: &World, ctx: &AccessContext, unit: &Unit) -> Option<LosStatus> {
    ctx.read_ally_team().map(|at| world.ledger.status(unit.id, at))
}

/// Unit belongs to the caller's ally team (or the caller sees everything).
pub fn is_ally_unit(ctx: &AccessContext, unit: &Unit) -> bool {
    match ctx.read_scope {
        ReadScope::AllyTeam(at) => unit.ally_team == at,
        _ => ctx.full_read,
    }
}

/// Unit is in LOS or on radar for the caller.
pub fn is_unit_visible(world: &World, ctx: &AccessContext, unit: &Unit) -> bool {
    match unit_status(world, ctx, unit) {
        Some(status) => status.in_los() || status.in_radar(),
        None => ctx.full_read,
    }
}

/// Unit is in LOS for the caller.
pub fn is_unit_in_los(world: &World, ctx: &AccessContext, unit: &Unit) -> bool {
    match unit_status(world, ctx, unit) {
        Some(status) => status.in_los(),
        None => ctx.full_read,
    }
}

/// Unit has been identified by the caller: in LOS now, or seen before and
/// tracked on radar ever since.
pub fn is_unit_typed(world: &World, ctx: &AccessContext, unit: &Unit) -> bool {
    match unit_status(world, ctx, unit) {
        Some(status) => status.in_los() || status.is_typed(),
        None => ctx.full_read,
    }
}

/// Two teams are allied through their ally teams.
pub fn is_allied_team(world: &World, a: usize, b: usize) -> bool {
    world.teams.teams_allied(a, b)
}

/// Rules-parameter mask for a unit.
pub fn unit_los_mask(world: &World, ctx: &AccessContext, unit: &Unit) -> u8 {
    if is_ally_unit(ctx, unit) || world.game_over {
        return PRIVATE_MASK;
    }
    if ctx.read_team.is_some_and(|team| is_allied_team(world, unit.team, team)) {
        return ALLIED_MASK;
    }
    let Some(status) = unit_status(world, ctx, unit) else {
        return PUBLIC_MASK;
    };
    if status.in_los() {
        INLOS_MASK
    } else if status.is_typed() {
        TYPED_MASK
    } else if status.in_radar() {
        INRADAR_MASK
    } else {
        PUBLIC_MASK
    }
}

/// Definition the caller is shown for `unit`.
///
/// Allies see the true definition, everyone else the one it imitates.
pub fn effective_unit_def<'w>(world: &'w World, ctx: &AccessContext, unit: &Unit) -> Option<&'w UnitDef> {
    let def = world.defs.unit_def(unit.def_id)?;
    if is_ally_unit(ctx, unit) {
        return Some(def);
    }
    match def.decoy_of {
        Some(shown) => world.defs.unit_def(shown).or(Some(def)),
        None => Some(def),
    }
}

/// Health values as shown to the caller: `(health, max_health)`.
///
/// Non-allies looking at a decoy see values rescaled to the imitated
/// definition. Fails when the true definition has no health, which
/// registration forbids.
pub fn shown_health(
    world: &World,
    ctx: &AccessContext,
    unit: &Unit,
    func: &'static str,
) -> Result<(Fixed, Fixed), QueryError> {
    let malformed = || QueryError::MalformedDefinition {
        func,
        def_id: unit.def_id,
        reason: "non-positive health",
    };
    let def = world.defs.unit_def(unit.def_id).ok_or_else(malformed)?;
    if def.health <= 0 {
        return Err(malformed());
    }
    let shown = match def.decoy_of {
        Some(shown) if !is_ally_unit(ctx, unit) => shown,
        _ => return Ok((unit.health, unit.max_health)),
    };
    let ratio = world.defs.health_ratio(def.id, shown).ok_or_else(malformed)?;
    Ok((fixed_mul(unit.health, ratio), fixed_mul(unit.max_health, ratio)))
}

/// Position offset the caller sees for `unit` (radar error).
pub fn position_error(world: &World, ctx: &AccessContext, unit: &Unit) -> FixedVec3 {
    match ctx.read_ally_team() {
        Some(at) => world.ledger.error_vector(
            unit,
            world.is_building(unit),
            at,
            is_ally_unit(ctx, unit),
        ),
        None => FixedVec3::ZERO,
    }
}

// =============================================================================
// FEATURES AND PROJECTILES
// =============================================================================

fn is_gaia_feature(world: &World, feature: &Feature) -> bool {
    match feature.ally_team {
        None => true,
        Some(at) => world.teams.gaia_ally_team() == Some(at),
    }
}

/// Feature is visible to the given ally team under the configured policy.
pub fn feature_in_los_for(world: &World, feature: &Feature, ally_team: usize) -> bool {
    if feature.always_visible {
        return true;
    }
    let in_los = || world.ledger.in_los(feature.pos, ally_team);
    match world.config.feature_visibility {
        FeatureVisibility::All => true,
        FeatureVisibility::GaiaOnly => is_gaia_feature(world, feature) || in_los(),
        FeatureVisibility::GaiaAllied => {
            is_gaia_feature(world, feature) || feature.ally_team == Some(ally_team) || in_los()
        }
        FeatureVisibility::None => in_los(),
    }
}

/// Feature is visible to the caller.
pub fn is_feature_visible(world: &World, ctx: &AccessContext, feature: &Feature) -> bool {
    if ctx.full_read {
        return true;
    }
    match ctx.read_ally_team() {
        Some(at) => feature_in_los_for(world, feature, at),
        None => false,
    }
}

/// Projectile is visible to the caller: own ally team's or in LOS.
pub fn is_projectile_visible(world: &World, ctx: &AccessContext, projectile: &Projectile) -> bool {
    if ctx.full_read {
        return true;
    }
    match ctx.read_ally_team() {
        Some(at) => projectile.ally_team == at || world.ledger.in_los(projectile.pos, at),
        None => false,
    }
}

/// Rules-parameter mask for a feature.
pub fn feature_los_mask(world: &World, ctx: &AccessContext, feature: &Feature) -> u8 {
    let own = match ctx.read_scope {
        ReadScope::AllyTeam(at) => feature.ally_team == Some(at),
        _ => ctx.full_read,
    };
    if own || world.game_over {
        return PRIVATE_MASK;
    }
    let allied = match (feature.team, ctx.read_team) {
        (Some(owner), Some(reader)) => is_allied_team(world, owner, reader),
        _ => false,
    };
    if allied {
        return ALLIED_MASK;
    }
    if ctx.read_scope == ReadScope::NoAccess {
        return PUBLIC_MASK;
    }
    if is_feature_visible(world, ctx, feature) {
        return INLOS_MASK;
    }
    PUBLIC_MASK
}

// =============================================================================
// TEAMS, PLAYERS, GAME
// =============================================================================

/// Team is on the caller's ally team (or the caller sees everything).
pub fn is_own_ally_team(ctx: &AccessContext, team: &Team) -> bool {
    match ctx.read_scope {
        ReadScope::AllyTeam(at) => team.ally_team == at,
        _ => ctx.full_read,
    }
}

/// Rules-parameter mask for a team.
pub fn team_los_mask(world: &World, ctx: &AccessContext, team: &Team) -> u8 {
    if is_own_ally_team(ctx, team) || world.game_over {
        return PRIVATE_MASK;
    }
    if ctx.read_team.is_some_and(|reader| is_allied_team(world, team.id, reader)) {
        return ALLIED_MASK;
    }
    PUBLIC_MASK
}

/// Player is hidden from synced code while replaying a demo it was not in.
pub fn is_player_hidden(world: &World, ctx: &AccessContext, player: &Player) -> bool {
    ctx.synced && world.config.host_demo && !player.from_demo
}

/// Rules-parameter mask for a player; `None` when the player is hidden.
pub fn player_los_mask(world: &World, ctx: &AccessContext, player: &Player) -> Option<u8> {
    if is_player_hidden(world, ctx, player) {
        return None;
    }
    let own = ctx.my_player == Some(player.id);
    if ctx.synced || own || ctx.full_read || world.game_over {
        return Some(PRIVATE_MASK);
    }
    Some(PUBLIC_MASK)
}

/// Rules-parameter mask for game-wide parameters.
#[inline]
pub fn game_los_mask() -> u8 {
    PRIVATE_MASK
}

// =============================================================================
// EXPLICIT ALLY-TEAM ARGUMENTS
// =============================================================================

/// Resolve an explicit ally-team argument of a sensor query.
///
/// Absent means the caller's own scope. A full-read caller may name any
/// valid ally team or the all-access sentinel; anyone may name no access
/// or their own ally team. Everything else is an error.
pub fn effective_los_ally_team(
    world: &World,
    ctx: &AccessContext,
    requested: Option<i64>,
    func: &'static str,
    arg: usize,
) -> Result<ReadScope, QueryError> {
    let Some(id) = requested else {
        return Ok(ctx.read_scope);
    };
    if id == NO_ACCESS_TEAM {
        return Ok(ReadScope::NoAccess);
    }
    if ctx.full_read {
        if world.teams.is_valid_ally_team(id) {
            return Ok(ReadScope::AllyTeam(id as usize));
        }
        if id == ALL_ACCESS_TEAM {
            return Ok(ReadScope::AllAccess);
        }
    } else if id == ctx.read_scope.as_script_id() {
        return Ok(ctx.read_scope);
    }
    trace!(func, requested = id, "ally team argument rejected");
    Err(QueryError::InvalidAllyTeam { func, arg })
}
