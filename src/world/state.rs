//! World Context
//!
//! Bundles every registry, the visibility ledger, the quad field and the
//! ground into one value that queries borrow immutably. Spawning and
//! destroying entities goes through here so the indices never drift apart.

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::config::RulesConfig;
use crate::core::fixed::{Fixed, FIXED_ONE};
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::vec3::FixedVec3;
use crate::error::WorldError;
use crate::sensor::VisibilityLedger;
use crate::spatial::QuadField;
use super::defs::DefRegistry;
use super::feature::Feature;
use super::ground::{Ground, BlockingObject};
use super::player::PlayerRegistry;
use super::projectile::{Projectile, ProjectileKind};
use super::registry::{UnitRegistry, FeatureRegistry, ProjectileRegistry};
use super::rules_params::{RulesParams, ParamValue};
use super::team::TeamRegistry;
use super::unit::Unit;
use super::{UnitId, FeatureId, ProjectileId, TeamId, UnitDefId, FeatureDefId};

/// God mode bit: allied teams may command each other's units
pub const GODMODE_ALLIED_BIT: u8 = 1;
/// God mode bit: enemy teams may command each other's units
pub const GODMODE_ENEMY_BIT: u8 = 2;

/// The synced world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Current simulation frame
    pub frame: u32,
    /// Game has ended (unlocks full rules-param disclosure)
    pub game_over: bool,
    /// Cheats enabled
    pub cheat_enabled: bool,
    /// God mode bits
    pub god_mode: u8,
    /// RNG seed of the match
    pub rng_seed: u64,
    /// Wind vector
    pub wind: FixedVec3,
    /// Tidal strength
    pub tidal: Fixed,
    /// Rules settings
    pub config: RulesConfig,
    /// Definitions
    pub defs: DefRegistry,
    /// Teams and ally teams
    pub teams: TeamRegistry,
    /// Players
    pub players: PlayerRegistry,
    /// Units
    pub units: UnitRegistry,
    /// Features
    pub features: FeatureRegistry,
    /// Projectiles
    pub projectiles: ProjectileRegistry,
    /// Sensor state
    pub ledger: VisibilityLedger,
    /// Spatial buckets
    pub quad_field: QuadField,
    /// Map surface
    pub ground: Ground,
    /// Game-wide rules parameters
    pub game_rules_params: RulesParams,
}

impl World {
    /// Empty world over `ground` with the given teams.
    pub fn new(config: RulesConfig, defs: DefRegistry, teams: TeamRegistry, ground: Ground, rng_seed: u64) -> Self {
        let ledger = VisibilityLedger::new(teams.num_ally_teams(), ground.width(), ground.depth(), &config);
        let quad_field = QuadField::new(ground.width(), ground.depth(), config.quad_size);
        info!(
            width = ground.width(),
            depth = ground.depth(),
            teams = teams.num_teams(),
            ally_teams = teams.num_ally_teams(),
            "world created"
        );
        Self {
            frame: 0,
            game_over: false,
            cheat_enabled: false,
            god_mode: 0,
            rng_seed,
            wind: FixedVec3::ZERO,
            tidal: 0,
            config,
            defs,
            teams,
            players: PlayerRegistry::new(),
            units: UnitRegistry::new(),
            features: FeatureRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            ledger,
            quad_field,
            ground,
            game_rules_params: RulesParams::new(),
        }
    }

    /// True when the unit's definition is an immobile structure.
    pub fn is_building(&self, unit: &Unit) -> bool {
        self.defs.unit_def(unit.def_id).is_some_and(|d| d.is_building)
    }

    // =========================================================================
    // UNITS
    // =========================================================================

    /// Create a finished unit of `def_id` for `team` at `pos`.
    pub fn spawn_unit(&mut self, def_id: UnitDefId, team: TeamId, pos: FixedVec3) -> Result<UnitId, WorldError> {
        let ally_team = self.teams.ally_team_of(team).ok_or(WorldError::UnknownTeam(team))?;
        let def = self.defs.unit_def(def_id).ok_or(WorldError::UnknownUnitDef(def_id))?;
        let id = self.units.allocate_id()?;
        let unit = Unit::new(id, def, team, ally_team, pos);

        if def.is_building {
            self.ground.block_footprint(pos, def.footprint_x, def.footprint_z, BlockingObject::Unit(id));
        }
        self.ledger.register_unit(id, ally_team);
        self.ledger.add_unit_sensors(&unit);
        self.quad_field.insert_unit(id, unit.pos, unit.radius);
        self.units.insert(unit);
        self.refresh_visibility();
        Ok(id)
    }

    /// Remove a unit. Its id becomes a tombstone.
    pub fn destroy_unit(&mut self, id: UnitId) -> Result<Unit, WorldError> {
        let unit = self.units.remove(id).ok_or(WorldError::UnknownUnit(id))?;
        self.ledger.remove_unit_sensors(&unit);
        self.ledger.remove_unit(id);
        self.quad_field.remove_unit(id);
        self.ground.unblock(BlockingObject::Unit(id));
        self.refresh_visibility();
        Ok(unit)
    }

    /// Teleport a unit, carrying its sensors along.
    pub fn move_unit(&mut self, id: UnitId, pos: FixedVec3) -> Result<(), WorldError> {
        let unit = self.units.get_mut(id).ok_or(WorldError::UnknownUnit(id))?;
        self.ledger.remove_unit_sensors(unit);
        unit.set_position(pos);
        self.ledger.add_unit_sensors(unit);
        self.quad_field.insert_unit(id, unit.pos, unit.radius);
        self.refresh_visibility();
        Ok(())
    }

    /// Give a unit to another team.
    pub fn transfer_unit(&mut self, id: UnitId, team: TeamId) -> Result<(), WorldError> {
        let ally_team = self.teams.ally_team_of(team).ok_or(WorldError::UnknownTeam(team))?;
        let unit = self.units.get(id).ok_or(WorldError::UnknownUnit(id))?;
        self.ledger.remove_unit_sensors(unit);
        self.units.transfer(id, team, ally_team)?;
        if let Some(unit) = self.units.get(id) {
            self.ledger.add_unit_sensors(unit);
        }
        self.refresh_visibility();
        Ok(())
    }

    /// Recompute every unit's status from current coverage.
    pub fn refresh_visibility(&mut self) {
        for unit in self.units.iter() {
            self.ledger.update_unit(unit);
        }
    }

    // =========================================================================
    // FEATURES
    // =========================================================================

    /// Create a feature, optionally owned by a team.
    pub fn spawn_feature(&mut self, def_id: FeatureDefId, team: Option<TeamId>, pos: FixedVec3) -> Result<FeatureId, WorldError> {
        let owner = match team {
            Some(team) => Some((team, self.teams.ally_team_of(team).ok_or(WorldError::UnknownTeam(team))?)),
            None => None,
        };
        let def = self.defs.feature_def(def_id).ok_or(WorldError::UnknownFeatureDef(def_id))?;
        let id = self.features.allocate_id()?;
        let feature = Feature::new(id, def, owner, pos);

        self.ground.block_footprint(pos, def.footprint_x, def.footprint_z, BlockingObject::Feature(id));
        self.quad_field.insert_feature(id, feature.pos, feature.radius);
        self.features.insert(feature);
        Ok(id)
    }

    /// Remove a feature.
    pub fn destroy_feature(&mut self, id: FeatureId) -> Result<Feature, WorldError> {
        let feature = self.features.remove(id).ok_or(WorldError::UnknownFeature(id))?;
        self.quad_field.remove_feature(id);
        self.ground.unblock(BlockingObject::Feature(id));
        Ok(feature)
    }

    // =========================================================================
    // PROJECTILES
    // =========================================================================

    /// Create a projectile fired by `team`.
    pub fn spawn_projectile(
        &mut self,
        owner: Option<UnitId>,
        team: TeamId,
        pos: FixedVec3,
        velocity: FixedVec3,
        kind: ProjectileKind,
    ) -> Result<ProjectileId, WorldError> {
        let ally_team = self.teams.ally_team_of(team).ok_or(WorldError::UnknownTeam(team))?;
        if let ProjectileKind::Weapon { def_id, .. } = &kind {
            if self.defs.weapon_def(*def_id).is_none() {
                return Err(WorldError::UnknownWeaponDef(*def_id));
            }
        }
        let id = self.projectiles.allocate_id()?;
        self.quad_field.insert_projectile(id, pos);
        self.projectiles.insert(Projectile {
            id,
            owner,
            team,
            ally_team,
            pos,
            dir: velocity.normalize(),
            velocity,
            gravity: 0,
            kind,
        });
        debug!(projectile = id, team, "projectile spawned");
        Ok(id)
    }

    /// Remove a projectile.
    pub fn destroy_projectile(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.quad_field.remove_projectile(id);
        self.projectiles.remove(id)
    }

    // =========================================================================
    // HASHING AND SNAPSHOTS
    // =========================================================================

    /// Digest of the whole synced state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, self.rng_seed, |hasher| {
            hasher.update_bool(self.game_over);
            hasher.update_vec3(self.wind);
            hasher.update_fixed(self.tidal);

            for unit in self.units.iter() {
                hash_unit(hasher, unit);
            }
            for feature in self.features.iter() {
                hasher.update_u32(feature.id);
                hasher.update_u32(feature.def_id);
                hasher.update_vec3(feature.pos);
                hasher.update_fixed(feature.health);
                hasher.update_fixed(feature.reclaim_left);
                hash_params(hasher, &feature.rules_params);
            }
            for projectile in self.projectiles.iter() {
                hasher.update_u32(projectile.id);
                hasher.update_u32(projectile.team as u32);
                hasher.update_vec3(projectile.pos);
                hasher.update_vec3(projectile.velocity);
            }
            for team in self.teams.teams() {
                hasher.update_fixed(team.metal.current);
                hasher.update_fixed(team.energy.current);
                hasher.update_bool(team.is_dead);
                hasher.update_u32(team.stats_history.len() as u32);
                hash_params(hasher, &team.rules_params);
            }
            for player in self.players.iter() {
                hasher.update_bool(player.active);
                hash_params(hasher, &player.rules_params);
            }
            hash_params(hasher, &self.game_rules_params);
            self.ledger.hash_into(hasher);
        })
    }

    /// Encode the world with bincode.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, WorldError> {
        bincode::serialize(self).map_err(|e| WorldError::Snapshot(e.to_string()))
    }

    /// Decode a world encoded by [`World::to_snapshot`].
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, WorldError> {
        bincode::deserialize(bytes).map_err(|e| {
            warn!(error = %e, "rejected world snapshot");
            WorldError::Snapshot(e.to_string())
        })
    }
}

fn hash_unit(hasher: &mut StateHasher, unit: &Unit) {
    hasher.update_u32(unit.id);
    hasher.update_u32(unit.def_id);
    hasher.update_u32(unit.team as u32);
    hasher.update_vec3(unit.pos);
    hasher.update_vec3(unit.velocity);
    hasher.update_fixed(unit.health);
    hasher.update_fixed(unit.build_progress);
    hasher.update_fixed(unit.experience);
    hasher.update_bool(unit.is_cloaked);
    hasher.update_u32(unit.commands.len() as u32);
    hash_params(hasher, &unit.rules_params);
}

fn hash_params(hasher: &mut StateHasher, params: &RulesParams) {
    for (key, param) in params.iter() {
        hasher.update_str(key);
        hasher.update_u8(param.level.bit());
        match &param.value {
            ParamValue::Number(n) => hasher.update_fixed(*n),
            ParamValue::Bool(b) => hasher.update_bool(*b),
            ParamValue::String(s) => hasher.update_str(s),
        }
    }
}

/// Wind strength and unit direction.
pub fn wind_components(wind: FixedVec3) -> (Fixed, FixedVec3) {
    let strength = wind.length();
    if strength == 0 {
        return (0, FixedVec3::new(0, 0, FIXED_ONE));
    }
    (strength, wind.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::world::defs::{UnitDef, FeatureDef};
    use crate::world::ground::BlockingObject;

    fn world() -> World {
        let mut defs = DefRegistry::new();
        let mut tower = UnitDef::new(1, "tower", from_int(400));
        tower.is_building = true;
        tower.footprint_x = 2;
        tower.footprint_z = 2;
        tower.sensors.los = from_int(100);
        defs.add_unit_def(tower).unwrap();
        defs.add_unit_def(UnitDef::new(2, "scout", from_int(50))).unwrap();
        defs.add_feature_def(FeatureDef::new(1, "rock", from_int(30))).unwrap();

        let mut teams = TeamRegistry::new(2);
        teams.add_team(0).unwrap();
        teams.add_team(1).unwrap();
        World::new(RulesConfig::default(), defs, teams, Ground::flat(64, 64, 0), 42)
    }

    #[test]
    fn test_spawn_updates_every_index() {
        let mut world = world();
        let tower = world.spawn_unit(1, 0, FixedVec3::from_ints(200, 0, 200)).unwrap();
        let scout = world.spawn_unit(2, 1, FixedVec3::from_ints(240, 0, 200)).unwrap();

        assert_eq!(world.units.team_count(0), 1);
        assert_eq!(world.ground.blocked_at(25, 25), Some(BlockingObject::Unit(tower)));
        // The tower's LOS reaches the scout
        assert!(world.ledger.status(scout, 0).in_los());
        assert!(!world.ledger.status(tower, 1).in_los());
        assert!(world.quad_field.units_in_rect(crate::spatial::Rect::around(from_int(240), from_int(200), from_int(4))).contains(&scout));
    }

    #[test]
    fn test_destroy_leaves_tombstone() {
        let mut world = world();
        let tower = world.spawn_unit(1, 0, FixedVec3::from_ints(200, 0, 200)).unwrap();
        let scout = world.spawn_unit(2, 1, FixedVec3::from_ints(240, 0, 200)).unwrap();
        world.destroy_unit(tower).unwrap();

        assert!(world.units.get(tower).is_none());
        assert!(world.units.is_tombstone(tower));
        assert_eq!(world.ground.blocked_at(25, 25), None);
        // Sensor gone: the scout drops out of LOS
        assert!(!world.ledger.status(scout, 0).in_los());
        assert_eq!(world.destroy_unit(tower).unwrap_err(), WorldError::UnknownUnit(tower));
    }

    #[test]
    fn test_unknown_references() {
        let mut world = world();
        assert_eq!(world.spawn_unit(99, 0, FixedVec3::ZERO), Err(WorldError::UnknownUnitDef(99)));
        assert_eq!(world.spawn_unit(1, 7, FixedVec3::ZERO), Err(WorldError::UnknownTeam(7)));
        assert_eq!(world.spawn_feature(5, None, FixedVec3::ZERO), Err(WorldError::UnknownFeatureDef(5)));
    }

    #[test]
    fn test_transfer_moves_sensors() {
        let mut world = world();
        let tower = world.spawn_unit(1, 0, FixedVec3::from_ints(200, 0, 200)).unwrap();
        let scout = world.spawn_unit(2, 1, FixedVec3::from_ints(240, 0, 200)).unwrap();
        world.transfer_unit(tower, 1).unwrap();
        assert!(!world.ledger.in_los(FixedVec3::from_ints(240, 0, 200), 0));
        assert!(world.ledger.status(scout, 1).in_los());
        assert_eq!(world.units.get(tower).map(|u| u.ally_team), Some(1));
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_hash() {
        let mut world = world();
        world.spawn_unit(1, 0, FixedVec3::from_ints(200, 0, 200)).unwrap();
        world.spawn_feature(1, None, FixedVec3::from_ints(50, 0, 50)).unwrap();
        let bytes = world.to_snapshot().unwrap();
        let restored = World::from_snapshot(&bytes).unwrap();
        assert_eq!(restored.compute_hash(), world.compute_hash());
        assert!(World::from_snapshot(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_wind_components() {
        let (strength, dir) = wind_components(FixedVec3::from_ints(3, 0, 4));
        assert_eq!(strength, from_int(5));
        assert_eq!(dir.y, 0);
        assert_eq!(wind_components(FixedVec3::ZERO).0, 0);
    }
}
