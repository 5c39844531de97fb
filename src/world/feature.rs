//! Map features: wrecks, trees, rocks.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use super::defs::FeatureDef;
use super::rules_params::RulesParams;
use super::unit::BlockingFlags;
use super::{FeatureId, FeatureDefId, TeamId, AllyTeamId, UnitDefId};

/// A live feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable id
    pub id: FeatureId,
    /// Definition
    pub def_id: FeatureDefId,
    /// Owning team; `None` for map features
    pub team: Option<TeamId>,
    /// Owning ally team; `None` for map features
    pub ally_team: Option<AllyTeamId>,
    /// Base position
    pub pos: FixedVec3,
    /// Model centre
    pub mid_pos: FixedVec3,
    /// Aim point
    pub aim_pos: FixedVec3,
    /// Velocity per frame
    pub velocity: FixedVec3,
    /// Heading (65536 per turn)
    pub heading: i64,
    /// Model height
    pub height: Fixed,
    /// Bounding radius
    pub radius: Fixed,
    /// Mass
    pub mass: Fixed,
    /// Current health
    pub health: Fixed,
    /// Resurrection progress, 0..1
    pub resurrect_progress: Fixed,
    /// Metal left
    pub metal: Fixed,
    /// Energy left
    pub energy: Fixed,
    /// Fraction not yet reclaimed, 0..1
    pub reclaim_left: Fixed,
    /// Collision bits
    pub blocking: BlockingFlags,
    /// Cannot be selected by players
    pub no_select: bool,
    /// Visible to everyone regardless of sensors
    pub always_visible: bool,
    /// Unit a resurrection brings back
    pub resurrect_def: Option<UnitDefId>,
    /// Facing of the resurrected unit
    pub build_facing: u8,
    /// Game rules parameters
    pub rules_params: RulesParams,
}

impl Feature {
    /// Fresh feature of `def` at `pos`.
    pub fn new(
        id: FeatureId,
        def: &FeatureDef,
        owner: Option<(TeamId, AllyTeamId)>,
        pos: FixedVec3,
    ) -> Self {
        Self {
            id,
            def_id: def.id,
            team: owner.map(|(t, _)| t),
            ally_team: owner.map(|(_, at)| at),
            pos,
            mid_pos: pos.add(def.model.mid),
            aim_pos: pos.add(def.model.mid),
            velocity: FixedVec3::ZERO,
            heading: 0,
            height: def.model.height,
            radius: def.model.radius,
            mass: def.metal.max(crate::core::fixed::FIXED_ONE),
            health: def.health,
            resurrect_progress: 0,
            metal: def.metal,
            energy: def.energy,
            reclaim_left: crate::core::fixed::FIXED_ONE,
            blocking: BlockingFlags::default(),
            no_select: false,
            always_visible: false,
            resurrect_def: None,
            build_facing: 0,
            rules_params: RulesParams::new(),
        }
    }
}
