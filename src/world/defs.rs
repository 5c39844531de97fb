//! Definitions
//!
//! Immutable unit, feature and weapon definitions, loaded once before the
//! first frame. Entities refer to them by id; the registry also keeps the
//! reverse decoy index so "count units of def X" can fold in every def
//! that pretends to be X.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::fixed::{Fixed, fixed_div};
use crate::core::vec3::FixedVec3;
use crate::error::WorldError;
use super::{UnitDefId, FeatureDefId, WeaponDefId};

/// Model bounding data shared by every instance of a definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDims {
    /// Model height
    pub height: Fixed,
    /// Bounding radius
    pub radius: Fixed,
    /// Mid-point offset relative to the base position
    pub mid: FixedVec3,
    /// Lower bounding-box corner
    pub mins: FixedVec3,
    /// Upper bounding-box corner
    pub maxs: FixedVec3,
}

/// Default sensor ranges of a unit type (elmos).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRanges {
    /// Line of sight
    pub los: Fixed,
    /// Air line of sight
    pub air_los: Fixed,
    /// Radar
    pub radar: Fixed,
    /// Sonar
    pub sonar: Fixed,
    /// Seismic
    pub seismic: Fixed,
    /// Radar jammer
    pub radar_jammer: Fixed,
    /// Sonar jammer
    pub sonar_jammer: Fixed,
}

/// A unit type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    /// Definition id
    pub id: UnitDefId,
    /// Internal name (build options refer to it)
    pub name: String,
    /// Display name
    pub human_name: String,
    /// Tooltip text
    pub tooltip: String,
    /// Maximum health; must be positive
    pub health: Fixed,
    /// Metal cost
    pub metal_cost: Fixed,
    /// Energy cost
    pub energy_cost: Fixed,
    /// Build time
    pub build_time: Fixed,
    /// Definition shown to non-allies instead of this one
    pub decoy_of: Option<UnitDefId>,
    /// Non-allies never see health values
    pub hide_damage: bool,
    /// Tooltip shows the owning player name
    pub show_player_name: bool,
    /// Buildable unit names
    pub build_options: Vec<String>,
    /// Immobile structure
    pub is_building: bool,
    /// Can carry other units
    pub is_transport: bool,
    /// Footprint width in squares
    pub footprint_x: u32,
    /// Footprint depth in squares
    pub footprint_z: u32,
    /// Default sensors
    pub sensors: SensorRanges,
    /// Model bounds
    pub model: ModelDims,
}

impl UnitDef {
    /// Minimal definition with the given name and health.
    pub fn new(id: UnitDefId, name: impl Into<String>, health: Fixed) -> Self {
        let name = name.into();
        Self {
            id,
            human_name: name.clone(),
            tooltip: String::new(),
            name,
            health,
            metal_cost: 0,
            energy_cost: 0,
            build_time: 0,
            decoy_of: None,
            hide_damage: false,
            show_player_name: false,
            build_options: Vec::new(),
            is_building: false,
            is_transport: false,
            footprint_x: 1,
            footprint_z: 1,
            sensors: SensorRanges::default(),
            model: ModelDims::default(),
        }
    }
}

/// A feature type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    /// Definition id
    pub id: FeatureDefId,
    /// Internal name
    pub name: String,
    /// Display description
    pub description: String,
    /// Maximum health; must be positive
    pub health: Fixed,
    /// Reclaimable metal
    pub metal: Fixed,
    /// Reclaimable energy
    pub energy: Fixed,
    /// Frames to reclaim fully
    pub reclaim_time: Fixed,
    /// Footprint width in squares
    pub footprint_x: u32,
    /// Footprint depth in squares
    pub footprint_z: u32,
    /// Model bounds
    pub model: ModelDims,
}

impl FeatureDef {
    /// Minimal definition with the given name and health.
    pub fn new(id: FeatureDefId, name: impl Into<String>, health: Fixed) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            health,
            metal: 0,
            energy: 0,
            reclaim_time: 0,
            footprint_x: 1,
            footprint_z: 1,
            model: ModelDims::default(),
        }
    }
}

/// A weapon type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDef {
    /// Definition id
    pub id: WeaponDefId,
    /// Internal name
    pub name: String,
    /// Weapon class name ("Cannon", "MissileLauncher", ...)
    pub kind: String,
    /// Maximum range
    pub range: Fixed,
    /// Projectile speed
    pub projectile_speed: Fixed,
    /// Default damage
    pub damage: Fixed,
}

/// All definitions of a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefRegistry {
    unit_defs: BTreeMap<UnitDefId, UnitDef>,
    unit_names: BTreeMap<String, UnitDefId>,
    decoys: BTreeMap<UnitDefId, Vec<UnitDefId>>,
    feature_defs: BTreeMap<FeatureDefId, FeatureDef>,
    weapon_defs: BTreeMap<WeaponDefId, WeaponDef>,
}

impl DefRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit definition.
    ///
    /// A decoy must point at an already registered definition.
    pub fn add_unit_def(&mut self, def: UnitDef) -> Result<(), WorldError> {
        if def.health <= 0 {
            warn!(name = %def.name, "rejected unit definition without health");
            return Err(WorldError::ZeroHealthDefinition { name: def.name });
        }
        if self.unit_defs.contains_key(&def.id) {
            return Err(WorldError::DuplicateDefinition(def.id));
        }
        if let Some(target) = def.decoy_of {
            if !self.unit_defs.contains_key(&target) {
                return Err(WorldError::UnknownUnitDef(target));
            }
            self.decoys.entry(target).or_default().push(def.id);
        }
        debug!(id = def.id, name = %def.name, "registered unit definition");
        self.unit_names.insert(def.name.to_lowercase(), def.id);
        self.unit_defs.insert(def.id, def);
        Ok(())
    }

    /// Register a feature definition.
    pub fn add_feature_def(&mut self, def: FeatureDef) -> Result<(), WorldError> {
        if def.health <= 0 {
            warn!(name = %def.name, "rejected feature definition without health");
            return Err(WorldError::ZeroHealthDefinition { name: def.name });
        }
        if self.feature_defs.contains_key(&def.id) {
            return Err(WorldError::DuplicateDefinition(def.id));
        }
        self.feature_defs.insert(def.id, def);
        Ok(())
    }

    /// Register a weapon definition.
    pub fn add_weapon_def(&mut self, def: WeaponDef) -> Result<(), WorldError> {
        if self.weapon_defs.contains_key(&def.id) {
            return Err(WorldError::DuplicateDefinition(def.id));
        }
        self.weapon_defs.insert(def.id, def);
        Ok(())
    }

    /// Unit definition by id.
    #[inline]
    pub fn unit_def(&self, id: UnitDefId) -> Option<&UnitDef> {
        self.unit_defs.get(&id)
    }

    /// Unit definition by name, case-insensitive.
    pub fn unit_def_by_name(&self, name: &str) -> Option<&UnitDef> {
        self.unit_names
            .get(&name.to_lowercase())
            .and_then(|id| self.unit_defs.get(id))
    }

    /// Definitions that present themselves as `id` to enemies.
    pub fn decoys_of(&self, id: UnitDefId) -> &[UnitDefId] {
        self.decoys.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Feature definition by id.
    #[inline]
    pub fn feature_def(&self, id: FeatureDefId) -> Option<&FeatureDef> {
        self.feature_defs.get(&id)
    }

    /// Weapon definition by id.
    #[inline]
    pub fn weapon_def(&self, id: WeaponDefId) -> Option<&WeaponDef> {
        self.weapon_defs.get(&id)
    }

    /// All unit definitions in id order.
    pub fn unit_defs(&self) -> impl Iterator<Item = &UnitDef> {
        self.unit_defs.values()
    }

    /// Health ratio `shown.health / actual.health`.
    ///
    /// `None` when either def is missing or `actual` has no health, which
    /// registration already forbids.
    pub fn health_ratio(&self, actual: UnitDefId, shown: UnitDefId) -> Option<Fixed> {
        let actual = self.unit_defs.get(&actual)?;
        let shown = self.unit_defs.get(&shown)?;
        if actual.health <= 0 {
            return None;
        }
        Some(fixed_div(shown.health, actual.health))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, FIXED_HALF};

    fn registry_with_decoy() -> DefRegistry {
        let mut defs = DefRegistry::new();
        defs.add_unit_def(UnitDef::new(1, "ArmCom", from_int(3000))).unwrap();
        let mut fake = UnitDef::new(2, "ArmDecoyCom", from_int(1500));
        fake.decoy_of = Some(1);
        defs.add_unit_def(fake).unwrap();
        defs
    }

    #[test]
    fn test_decoy_reverse_index() {
        let defs = registry_with_decoy();
        assert_eq!(defs.decoys_of(1), &[2]);
        assert!(defs.decoys_of(2).is_empty());
    }

    #[test]
    fn test_zero_health_rejected() {
        let mut defs = DefRegistry::new();
        let err = defs.add_unit_def(UnitDef::new(1, "ghost", 0)).unwrap_err();
        assert_eq!(err, WorldError::ZeroHealthDefinition { name: "ghost".into() });
        let err = defs.add_feature_def(FeatureDef::new(1, "rock", -5)).unwrap_err();
        assert!(matches!(err, WorldError::ZeroHealthDefinition { .. }));
    }

    #[test]
    fn test_decoy_must_exist_first() {
        let mut defs = DefRegistry::new();
        let mut fake = UnitDef::new(2, "fake", from_int(10));
        fake.decoy_of = Some(1);
        assert_eq!(defs.add_unit_def(fake), Err(WorldError::UnknownUnitDef(1)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut defs = registry_with_decoy();
        assert_eq!(
            defs.add_unit_def(UnitDef::new(1, "again", from_int(1))),
            Err(WorldError::DuplicateDefinition(1))
        );
    }

    #[test]
    fn test_name_lookup_case_insensitive() {
        let defs = registry_with_decoy();
        assert_eq!(defs.unit_def_by_name("armcom").map(|d| d.id), Some(1));
        assert_eq!(defs.unit_def_by_name("ARMDECOYCOM").map(|d| d.id), Some(2));
    }

    #[test]
    fn test_health_ratio() {
        let defs = registry_with_decoy();
        // Decoy (1500) pretending to be the commander (3000)
        assert_eq!(defs.health_ratio(2, 1), Some(from_int(2)));
        assert_eq!(defs.health_ratio(1, 2), Some(FIXED_HALF));
        assert_eq!(defs.health_ratio(1, 99), None);
    }
}
