//! Entity Registries
//!
//! Id-stable containers for units, features and projectiles.
//!
//! ## Guarantees
//!
//! - O(log n) lookup by id (`BTreeMap`, deterministic iteration)
//! - Ids are handed out monotonically and never reused; a removed id is a
//!   tombstone that resolves to nothing for the rest of the session
//! - Per-team id sets and per-(team, def) counts are maintained on every
//!   insert, remove and transfer, so aggregate counts never scan

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::WorldError;
use super::feature::Feature;
use super::projectile::Projectile;
use super::unit::Unit;
use super::{UnitId, FeatureId, ProjectileId, TeamId, AllyTeamId, UnitDefId};

/// Monotonic id source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct IdPool {
    next: u32,
}

impl IdPool {
    fn allocate(&mut self, kind: &'static str) -> Result<u32, WorldError> {
        let id = self.next;
        self.next = self.next.checked_add(1).ok_or(WorldError::IdsExhausted(kind))?;
        Ok(id)
    }

    fn was_issued(&self, id: u32) -> bool {
        id < self.next
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// All live units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, Unit>,
    by_team: BTreeMap<TeamId, BTreeSet<UnitId>>,
    def_counts: BTreeMap<(TeamId, UnitDefId), u32>,
    ids: IdPool,
}

impl UnitRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next unit id.
    pub fn allocate_id(&mut self) -> Result<UnitId, WorldError> {
        self.ids.allocate("unit")
    }

    /// Insert a unit under an id from `allocate_id`.
    pub fn insert(&mut self, unit: Unit) {
        let (id, team, def) = (unit.id, unit.team, unit.def_id);
        self.by_team.entry(team).or_default().insert(id);
        *self.def_counts.entry((team, def)).or_insert(0) += 1;
        self.units.insert(id, unit);
        debug!(unit = id, team, def, "unit added");
    }

    /// Remove a unit; its id becomes a tombstone.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.unindex(id, unit.team, unit.def_id);
        debug!(unit = id, team = unit.team, "unit removed");
        Some(unit)
    }

    /// Move a unit to another team, keeping the indices in step.
    pub fn transfer(&mut self, id: UnitId, team: TeamId, ally_team: AllyTeamId) -> Result<(), WorldError> {
        let (old_team, def) = match self.units.get(&id) {
            Some(unit) => (unit.team, unit.def_id),
            None => return Err(WorldError::UnknownUnit(id)),
        };
        self.unindex(id, old_team, def);
        self.by_team.entry(team).or_default().insert(id);
        *self.def_counts.entry((team, def)).or_insert(0) += 1;
        if let Some(unit) = self.units.get_mut(&id) {
            unit.team = team;
            unit.ally_team = ally_team;
        }
        debug!(unit = id, from = old_team, to = team, "unit transferred");
        Ok(())
    }

    fn unindex(&mut self, id: UnitId, team: TeamId, def: UnitDefId) {
        if let Some(set) = self.by_team.get_mut(&team) {
            set.remove(&id);
            if set.is_empty() {
                self.by_team.remove(&team);
            }
        }
        if let Some(count) = self.def_counts.get_mut(&(team, def)) {
            *count -= 1;
            if *count == 0 {
                self.def_counts.remove(&(team, def));
            }
        }
    }

    /// Live unit by id.
    #[inline]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Live unit by script-supplied id; negative ids resolve to nothing.
    #[inline]
    pub fn get_raw(&self, id: i64) -> Option<&Unit> {
        u32::try_from(id).ok().and_then(|id| self.units.get(&id))
    }

    /// Mutable unit. Team and definition changes must go through
    /// [`UnitRegistry::transfer`] so the indices stay correct.
    #[inline]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// The id was issued once and the unit is gone.
    pub fn is_tombstone(&self, id: UnitId) -> bool {
        self.ids.was_issued(id) && !self.units.contains_key(&id)
    }

    /// All live units in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// All live unit ids in order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Unit ids owned by a team.
    pub fn team_units(&self, team: TeamId) -> impl Iterator<Item = UnitId> + '_ {
        self.by_team.get(&team).into_iter().flat_map(|set| set.iter().copied())
    }

    /// Number of units a team owns.
    pub fn team_count(&self, team: TeamId) -> usize {
        self.by_team.get(&team).map_or(0, BTreeSet::len)
    }

    /// Number of units of a definition a team owns.
    pub fn def_count(&self, team: TeamId, def: UnitDefId) -> u32 {
        self.def_counts.get(&(team, def)).copied().unwrap_or(0)
    }

    /// Per-definition counts of a team in def order.
    pub fn team_def_counts(&self, team: TeamId) -> impl Iterator<Item = (UnitDefId, u32)> + '_ {
        self.def_counts
            .range((team, UnitDefId::MIN)..=(team, UnitDefId::MAX))
            .map(|(&(_, def), &count)| (def, count))
    }

    /// Number of live units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when no units are alive.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

// =============================================================================
// FEATURES
// =============================================================================

/// All live features.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRegistry {
    features: BTreeMap<FeatureId, Feature>,
    ids: IdPool,
}

impl FeatureRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next feature id.
    pub fn allocate_id(&mut self) -> Result<FeatureId, WorldError> {
        self.ids.allocate("feature")
    }

    /// Insert a feature under an id from `allocate_id`.
    pub fn insert(&mut self, feature: Feature) {
        debug!(feature = feature.id, def = feature.def_id, "feature added");
        self.features.insert(feature.id, feature);
    }

    /// Remove a feature.
    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        let feature = self.features.remove(&id);
        if feature.is_some() {
            debug!(feature = id, "feature removed");
        }
        feature
    }

    /// Live feature by id.
    #[inline]
    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    /// Live feature by script-supplied id.
    #[inline]
    pub fn get_raw(&self, id: i64) -> Option<&Feature> {
        u32::try_from(id).ok().and_then(|id| self.features.get(&id))
    }

    /// Mutable feature.
    #[inline]
    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    /// All live features in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Number of live features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True when no features exist.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// =============================================================================
// PROJECTILES
// =============================================================================

/// All live synced projectiles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRegistry {
    projectiles: BTreeMap<ProjectileId, Projectile>,
    by_team: BTreeMap<TeamId, BTreeSet<ProjectileId>>,
    ids: IdPool,
}

impl ProjectileRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next projectile id.
    pub fn allocate_id(&mut self) -> Result<ProjectileId, WorldError> {
        self.ids.allocate("projectile")
    }

    /// Insert a projectile under an id from `allocate_id`.
    pub fn insert(&mut self, projectile: Projectile) {
        self.by_team.entry(projectile.team).or_default().insert(projectile.id);
        self.projectiles.insert(projectile.id, projectile);
    }

    /// Remove a projectile.
    pub fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        let projectile = self.projectiles.remove(&id)?;
        if let Some(set) = self.by_team.get_mut(&projectile.team) {
            set.remove(&id);
        }
        Some(projectile)
    }

    /// Live projectile by id.
    #[inline]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Live projectile by script-supplied id.
    #[inline]
    pub fn get_raw(&self, id: i64) -> Option<&Projectile> {
        u32::try_from(id).ok().and_then(|id| self.projectiles.get(&id))
    }

    /// Mutable projectile.
    #[inline]
    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    /// Projectile ids fired by a team.
    pub fn team_projectiles(&self, team: TeamId) -> impl Iterator<Item = ProjectileId> + '_ {
        self.by_team.get(&team).into_iter().flat_map(|set| set.iter().copied())
    }

    /// All live projectiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Number of live projectiles.
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// True when no projectiles exist.
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}
