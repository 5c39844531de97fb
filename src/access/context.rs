//! Access Context
//!
//! Who is asking. Built fresh for every query invocation, since the same
//! script can run from several perspectives within one frame.

use serde::{Serialize, Deserialize};

use crate::world::{World, AllyTeamId, TeamId, PlayerId};

/// Script-level sentinel for "reads nothing".
pub const NO_ACCESS_TEAM: i64 = -1;
/// Script-level sentinel for "reads everything".
pub const ALL_ACCESS_TEAM: i64 = -2;

/// The ally team whose sensors the caller reads through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadScope {
    /// One ally team
    AllyTeam(AllyTeamId),
    /// Sees nothing that is not public
    NoAccess,
    /// Sees everything
    AllAccess,
}

impl ReadScope {
    /// The ally team, when the scope is a single one.
    #[inline]
    pub fn ally_team(self) -> Option<AllyTeamId> {
        match self {
            ReadScope::AllyTeam(at) => Some(at),
            _ => None,
        }
    }

    /// Script-facing integer (ally team id or sentinel).
    pub fn as_script_id(self) -> i64 {
        match self {
            ReadScope::AllyTeam(at) => at as i64,
            ReadScope::NoAccess => NO_ACCESS_TEAM,
            ReadScope::AllAccess => ALL_ACCESS_TEAM,
        }
    }

    /// Decode a script-facing integer; unknown negatives mean no access.
    pub fn from_script_id(id: i64) -> Self {
        match id {
            ALL_ACCESS_TEAM => ReadScope::AllAccess,
            id if id >= 0 => ReadScope::AllyTeam(id as AllyTeamId),
            _ => ReadScope::NoAccess,
        }
    }
}

/// Calling perspective of one query invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
    /// Running inside synced game logic
    pub synced: bool,
    /// Team the caller acts as
    pub read_team: Option<TeamId>,
    /// Ally team the caller sees through
    pub read_scope: ReadScope,
    /// Global view (spectators, synced game logic)
    pub full_read: bool,
    /// Local player, for unsynced contexts
    pub my_player: Option<PlayerId>,
}

impl AccessContext {
    /// Synced game logic: sees everything, acts as no particular team.
    pub fn synced() -> Self {
        Self {
            synced: true,
            read_team: None,
            read_scope: ReadScope::AllAccess,
            full_read: true,
            my_player: None,
        }
    }

    /// Unsynced context reading as `team`.
    ///
    /// Falls back to no access when the team does not exist.
    pub fn as_team(world: &World, team: TeamId) -> Self {
        let read_scope = world
            .teams
            .ally_team_of(team)
            .map_or(ReadScope::NoAccess, ReadScope::AllyTeam);
        Self {
            synced: false,
            read_team: Some(team),
            read_scope,
            full_read: false,
            my_player: None,
        }
    }

    /// Unsynced spectator with global view.
    pub fn spectator() -> Self {
        Self {
            synced: false,
            read_team: None,
            read_scope: ReadScope::AllAccess,
            full_read: true,
            my_player: None,
        }
    }

    /// Unsynced context without any sensor access.
    pub fn no_access() -> Self {
        Self {
            synced: false,
            read_team: None,
            read_scope: ReadScope::NoAccess,
            full_read: false,
            my_player: None,
        }
    }

    /// Same context, marked as the given local player.
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.my_player = Some(player);
        self
    }

    /// Ally team the caller reads through, if it is a single one.
    #[inline]
    pub fn read_ally_team(&self) -> Option<AllyTeamId> {
        self.read_scope.ally_team()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::world::{DefRegistry, Ground, TeamRegistry};

    #[test]
    fn test_scope_script_ids() {
        assert_eq!(ReadScope::from_script_id(3), ReadScope::AllyTeam(3));
        assert_eq!(ReadScope::from_script_id(-1), ReadScope::NoAccess);
        assert_eq!(ReadScope::from_script_id(-2), ReadScope::AllAccess);
        assert_eq!(ReadScope::from_script_id(-7), ReadScope::NoAccess);
        assert_eq!(ReadScope::AllAccess.as_script_id(), ALL_ACCESS_TEAM);
    }

    #[test]
    fn test_as_team_resolves_ally_team() {
        let mut teams = TeamRegistry::new(2);
        teams.add_team(0).unwrap();
        teams.add_team(1).unwrap();
        let world = World::new(RulesConfig::default(), DefRegistry::new(), teams, Ground::flat(16, 16, 0), 1);

        let ctx = AccessContext::as_team(&world, 1);
        assert_eq!(ctx.read_ally_team(), Some(1));
        assert!(!ctx.full_read);

        let ctx = AccessContext::as_team(&world, 9);
        assert_eq!(ctx.read_scope, ReadScope::NoAccess);
    }
}
