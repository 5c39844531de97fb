//! Teams and Ally Teams
//!
//! Every team belongs to exactly one ally team. Ally teams declare
//! alliances pairwise; the relation is reflexive and symmetric but not
//! transitive.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::Fixed;
use crate::error::WorldError;
use super::rules_params::RulesParams;
use super::{TeamId, AllyTeamId, PlayerId};

/// One resource (metal or energy) of a team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Stored amount
    pub current: Fixed,
    /// Storage capacity
    pub storage: Fixed,
    /// Demand last slow update
    pub pull: Fixed,
    /// Income last slow update
    pub income: Fixed,
    /// Expense last slow update
    pub expense: Fixed,
    /// Share slider level
    pub share: Fixed,
    /// Sent to allies last slow update
    pub sent: Fixed,
    /// Received from allies last slow update
    pub received: Fixed,
    /// Wasted to full storage last slow update
    pub excess: Fixed,
}

/// Cumulative statistics sample.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    /// Frame the sample was taken
    pub frame: u32,
    /// Metal spent
    pub metal_used: Fixed,
    /// Metal produced
    pub metal_produced: Fixed,
    /// Metal wasted
    pub metal_excess: Fixed,
    /// Metal received
    pub metal_received: Fixed,
    /// Metal sent
    pub metal_sent: Fixed,
    /// Energy spent
    pub energy_used: Fixed,
    /// Energy produced
    pub energy_produced: Fixed,
    /// Energy wasted
    pub energy_excess: Fixed,
    /// Energy received
    pub energy_received: Fixed,
    /// Energy sent
    pub energy_sent: Fixed,
    /// Damage dealt
    pub damage_dealt: Fixed,
    /// Damage received
    pub damage_received: Fixed,
    /// Units finished
    pub units_produced: u32,
    /// Units lost
    pub units_died: u32,
    /// Units received from allies
    pub units_received: u32,
    /// Units given away
    pub units_sent: u32,
    /// Units captured from others
    pub units_captured: u32,
    /// Units captured by others
    pub units_out_captured: u32,
    /// Enemy units destroyed
    pub units_killed: u32,
}

/// A team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Team index
    pub id: TeamId,
    /// Ally team membership
    pub ally_team: AllyTeamId,
    /// Leading player, if any
    pub leader: Option<PlayerId>,
    /// Faction name
    pub side: String,
    /// Team has been eliminated
    pub is_dead: bool,
    /// Name of the scripted AI controlling the team
    pub script_ai: Option<String>,
    /// Team is controlled by any AI
    pub has_ai: bool,
    /// Income multiplier
    pub income_multiplier: Fixed,
    /// Metal
    pub metal: ResourceState,
    /// Energy
    pub energy: ResourceState,
    /// Running totals for the current interval
    pub current_stats: TeamStatistics,
    /// Sampled history, oldest first
    pub stats_history: Vec<TeamStatistics>,
    /// Free-form start options
    pub custom_options: BTreeMap<String, String>,
    /// Game rules parameters
    pub rules_params: RulesParams,
}

impl Team {
    /// New team in the given ally team.
    pub fn new(id: TeamId, ally_team: AllyTeamId) -> Self {
        Self {
            id,
            ally_team,
            leader: None,
            side: String::new(),
            is_dead: false,
            script_ai: None,
            has_ai: false,
            income_multiplier: crate::core::fixed::FIXED_ONE,
            metal: ResourceState::default(),
            energy: ResourceState::default(),
            current_stats: TeamStatistics::default(),
            stats_history: Vec::new(),
            custom_options: BTreeMap::new(),
            rules_params: RulesParams::new(),
        }
    }

    /// Close the running interval into the history.
    pub fn record_stats(&mut self, frame: u32) {
        let mut sample = self.current_stats.clone();
        sample.frame = frame;
        self.stats_history.push(sample);
    }
}

/// An ally team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllyTeam {
    /// Free-form start options
    pub custom_options: BTreeMap<String, String>,
    /// Alliance flags indexed by ally team
    allies: Vec<bool>,
}

/// All teams and ally teams of a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRegistry {
    teams: Vec<Team>,
    ally_teams: Vec<AllyTeam>,
    gaia_team: Option<TeamId>,
    fixed_allies: bool,
}

impl TeamRegistry {
    /// Registry with `num_ally_teams` ally teams and no teams yet.
    pub fn new(num_ally_teams: usize) -> Self {
        let ally_teams = (0..num_ally_teams)
            .map(|at| AllyTeam {
                custom_options: BTreeMap::new(),
                allies: (0..num_ally_teams).map(|other| other == at).collect(),
            })
            .collect();
        Self {
            teams: Vec::new(),
            ally_teams,
            gaia_team: None,
            fixed_allies: true,
        }
    }

    /// Append a team to an ally team. Team ids are assigned in order.
    pub fn add_team(&mut self, ally_team: AllyTeamId) -> Result<TeamId, WorldError> {
        if ally_team >= self.ally_teams.len() {
            return Err(WorldError::UnknownAllyTeam(ally_team));
        }
        let id = self.teams.len();
        self.teams.push(Team::new(id, ally_team));
        debug!(team = id, ally_team, "added team");
        Ok(id)
    }

    /// Mark a team as the Gaia (neutral world) team.
    pub fn set_gaia_team(&mut self, team: TeamId) -> Result<(), WorldError> {
        if team >= self.teams.len() {
            return Err(WorldError::UnknownTeam(team));
        }
        self.gaia_team = Some(team);
        Ok(())
    }

    /// Declare or revoke a mutual alliance between two ally teams.
    pub fn set_alliance(&mut self, a: AllyTeamId, b: AllyTeamId, allied: bool) -> Result<(), WorldError> {
        let n = self.ally_teams.len();
        if a >= n {
            return Err(WorldError::UnknownAllyTeam(a));
        }
        if b >= n {
            return Err(WorldError::UnknownAllyTeam(b));
        }
        if a == b {
            return Ok(());
        }
        self.ally_teams[a].allies[b] = allied;
        self.ally_teams[b].allies[a] = allied;
        Ok(())
    }

    /// Whether alliances may change during the game.
    pub fn set_fixed_allies(&mut self, fixed: bool) {
        self.fixed_allies = fixed;
    }

    /// Alliances cannot change during the game.
    pub fn fixed_allies(&self) -> bool {
        self.fixed_allies
    }

    /// Team by id.
    #[inline]
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Mutable team by id.
    #[inline]
    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(id)
    }

    /// Ally team by id.
    #[inline]
    pub fn ally_team(&self, id: AllyTeamId) -> Option<&AllyTeam> {
        self.ally_teams.get(id)
    }

    /// Mutable ally team by id.
    #[inline]
    pub fn ally_team_mut(&mut self, id: AllyTeamId) -> Option<&mut AllyTeam> {
        self.ally_teams.get_mut(id)
    }

    /// Ally team of a team.
    #[inline]
    pub fn ally_team_of(&self, team: TeamId) -> Option<AllyTeamId> {
        self.teams.get(team).map(|t| t.ally_team)
    }

    /// Number of teams.
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }

    /// Number of ally teams.
    #[inline]
    pub fn num_ally_teams(&self) -> usize {
        self.ally_teams.len()
    }

    /// Valid team id.
    #[inline]
    pub fn is_valid_team(&self, id: i64) -> bool {
        id >= 0 && (id as u64) < self.teams.len() as u64
    }

    /// Valid ally-team id.
    #[inline]
    pub fn is_valid_ally_team(&self, id: i64) -> bool {
        id >= 0 && (id as u64) < self.ally_teams.len() as u64
    }

    /// Gaia team, if the match has one.
    pub fn gaia_team(&self) -> Option<TeamId> {
        self.gaia_team
    }

    /// Ally team of the Gaia team.
    pub fn gaia_ally_team(&self) -> Option<AllyTeamId> {
        self.gaia_team.and_then(|t| self.ally_team_of(t))
    }

    /// Declared alliance between two ally teams.
    pub fn ally_teams_allied(&self, a: AllyTeamId, b: AllyTeamId) -> bool {
        self.ally_teams
            .get(a)
            .and_then(|at| at.allies.get(b))
            .copied()
            .unwrap_or(false)
    }

    /// Declared alliance between the ally teams of two teams.
    pub fn teams_allied(&self, a: TeamId, b: TeamId) -> bool {
        match (self.ally_team_of(a), self.ally_team_of(b)) {
            (Some(x), Some(y)) => self.ally_teams_allied(x, y),
            _ => false,
        }
    }

    /// All teams in id order.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    /// All teams, mutably.
    pub fn teams_mut(&mut self) -> impl Iterator<Item = &mut Team> {
        self.teams.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_way() -> TeamRegistry {
        let mut teams = TeamRegistry::new(3);
        for at in 0..3 {
            teams.add_team(at).unwrap();
        }
        teams
    }

    #[test]
    fn test_alliance_is_reflexive_and_symmetric() {
        let mut teams = three_way();
        assert!(teams.ally_teams_allied(1, 1));
        assert!(!teams.ally_teams_allied(0, 1));

        teams.set_alliance(1, 2, true).unwrap();
        assert!(teams.ally_teams_allied(1, 2));
        assert!(teams.ally_teams_allied(2, 1));
        assert!(teams.teams_allied(2, 1));
    }

    #[test]
    fn test_alliance_not_transitive() {
        let mut teams = three_way();
        teams.set_alliance(0, 1, true).unwrap();
        teams.set_alliance(1, 2, true).unwrap();
        assert!(!teams.ally_teams_allied(0, 2));
    }

    #[test]
    fn test_unknown_ids() {
        let mut teams = three_way();
        assert_eq!(teams.add_team(7), Err(WorldError::UnknownAllyTeam(7)));
        assert_eq!(teams.set_gaia_team(9), Err(WorldError::UnknownTeam(9)));
        assert!(!teams.is_valid_team(-1));
        assert!(!teams.is_valid_team(3));
        assert!(teams.is_valid_ally_team(2));
        assert!(!teams.teams_allied(0, 42));
    }

    #[test]
    fn test_record_stats_appends() {
        let mut teams = three_way();
        let team = teams.team_mut(0).unwrap();
        team.current_stats.units_killed = 4;
        team.record_stats(480);
        team.current_stats.units_killed = 6;
        team.record_stats(960);
        assert_eq!(team.stats_history.len(), 2);
        assert_eq!(team.stats_history[0].units_killed, 4);
        assert_eq!(team.stats_history[1].frame, 960);
    }
}
