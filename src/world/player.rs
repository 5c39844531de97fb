//! Players

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use super::rules_params::RulesParams;
use super::{PlayerId, TeamId, UnitId};

/// A human participant or spectator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player index
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Connected and playing
    pub active: bool,
    /// Watching only
    pub spectator: bool,
    /// Team played (meaningless for spectators)
    pub team: TeamId,
    /// Round-trip time in milliseconds
    pub ping_ms: u32,
    /// CPU usage fraction in thousandths
    pub cpu_permille: u32,
    /// Two-letter country code
    pub country: String,
    /// Ladder rank
    pub rank: i32,
    /// Simulation checksum diverged from the host
    pub desynced: bool,
    /// Player took part in the recorded demo being replayed
    pub from_demo: bool,
    /// Unit under direct first-person control
    pub controlled_unit: Option<UnitId>,
    /// Free-form start options
    pub custom_options: BTreeMap<String, String>,
    /// Game rules parameters
    pub rules_params: RulesParams,
}

impl Player {
    /// Active, non-spectating player on `team`.
    pub fn new(id: PlayerId, name: impl Into<String>, team: TeamId) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            spectator: false,
            team,
            ping_ms: 0,
            cpu_permille: 0,
            country: String::new(),
            rank: 0,
            desynced: false,
            from_demo: true,
            controlled_unit: None,
            custom_options: BTreeMap::new(),
            rules_params: RulesParams::new(),
        }
    }
}

/// All players of a match, indexed by player id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player; ids are assigned in order.
    pub fn add(&mut self, name: impl Into<String>, team: TeamId) -> PlayerId {
        let id = self.players.len();
        self.players.push(Player::new(id, name, team));
        id
    }

    /// Player by id.
    pub fn get(&self, id: i64) -> Option<&Player> {
        usize::try_from(id).ok().and_then(|i| self.players.get(i))
    }

    /// Mutable player by id.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when no players exist.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_in_order() {
        let mut players = PlayerRegistry::new();
        assert_eq!(players.add("alice", 0), 0);
        assert_eq!(players.add("bob", 1), 1);
        assert_eq!(players.get(1).map(|p| p.name.as_str()), Some("bob"));
        assert!(players.get(-1).is_none());
        assert!(players.get(2).is_none());
    }
}
