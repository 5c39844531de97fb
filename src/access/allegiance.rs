//! Allegiance filters for team-scoped and spatial queries.

use serde::{Serialize, Deserialize};

use crate::error::QueryError;
use crate::world::unit::Unit;
use crate::world::{TeamId, World};
use super::context::{AccessContext, ReadScope};
use super::resolver::is_unit_visible;

/// Script sentinel: every visible unit.
pub const ALL_UNITS: i64 = -1;
/// Script sentinel: the caller's own team.
pub const MY_UNITS: i64 = -2;
/// Script sentinel: the caller's ally team.
pub const ALLY_UNITS: i64 = -3;
/// Script sentinel: visible units of other ally teams.
pub const ENEMY_UNITS: i64 = -4;

/// Which units a query keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allegiance {
    /// Every unit visible to the caller
    All,
    /// The caller's read team
    Mine,
    /// The caller's ally team
    Ally,
    /// Other ally teams, visible only
    Enemy,
    /// One team; visibility-filtered unless it is on the caller's ally team
    Team(TeamId),
}

impl Allegiance {
    /// Decode a script allegiance argument. Absent means `All`.
    pub fn parse(world: &World, value: Option<i64>, func: &'static str) -> Result<Self, QueryError> {
        match value {
            None | Some(ALL_UNITS) => Ok(Allegiance::All),
            Some(MY_UNITS) => Ok(Allegiance::Mine),
            Some(ALLY_UNITS) => Ok(Allegiance::Ally),
            Some(ENEMY_UNITS) => Ok(Allegiance::Enemy),
            Some(team) if world.teams.is_valid_team(team) => Ok(Allegiance::Team(team as TeamId)),
            Some(other) => Err(QueryError::BadAllegiance { func, value: other }),
        }
    }

    /// Predicate applying this allegiance for `ctx`.
    pub fn filter<'a>(self, world: &'a World, ctx: &'a AccessContext) -> impl Fn(&Unit) -> bool + 'a {
        let team_allied = match self {
            Allegiance::Team(team) => reads_team_raw(world, ctx, team),
            _ => false,
        };
        move |unit: &Unit| match self {
            Allegiance::All => is_unit_visible(world, ctx, unit),
            Allegiance::Mine => ctx.read_team == Some(unit.team),
            Allegiance::Ally => ctx.read_ally_team() == Some(unit.ally_team),
            Allegiance::Enemy => {
                ctx.read_ally_team() != Some(unit.ally_team) && is_unit_visible(world, ctx, unit)
            }
            Allegiance::Team(team) => {
                unit.team == team && (team_allied || is_unit_visible(world, ctx, unit))
            }
        }
    }
}

/// The caller reads `team`'s units unfiltered: same ally team or full read.
pub fn reads_team_raw(world: &World, ctx: &AccessContext, team: TeamId) -> bool {
    match ctx.read_scope {
        ReadScope::AllyTeam(at) => world.teams.ally_team_of(team) == Some(at),
        _ => ctx.full_read,
    }
}
