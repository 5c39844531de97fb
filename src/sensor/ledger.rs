//! Visibility Ledger
//!
//! Per-ally-team coverage grids, the per-(unit, ally team) status bits and
//! the radar error state. Queries only read it; the simulation step owns
//! every mutation.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::config::RulesConfig;
use crate::core::fixed::{Fixed, from_int};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::core::vec3::FixedVec3;
use crate::world::unit::{Unit, MoveKind};
use crate::world::{AllyTeamId, UnitId};
use super::coverage::CoverageGrid;
use super::radar_error::RadarError;
use super::status::LosStatus;

/// Kind of sensor coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Line of sight
    Los,
    /// Air line of sight
    AirLos,
    /// Radar
    Radar,
    /// Sonar
    Sonar,
    /// Radar jammer
    Jammer,
    /// Sonar jammer
    SonarJammer,
}

/// Coverage of one ally team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct AllyCoverage {
    los: CoverageGrid,
    air_los: CoverageGrid,
    radar: CoverageGrid,
    sonar: CoverageGrid,
    jammer: CoverageGrid,
    sonar_jammer: CoverageGrid,
    global_los: bool,
    radar_error_size: Fixed,
}

/// The visibility ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityLedger {
    ally: Vec<AllyCoverage>,
    statuses: BTreeMap<UnitId, Vec<LosStatus>>,
    errors: BTreeMap<UnitId, RadarError>,
    require_sonar_under_water: bool,
    separate_jammers: bool,
    ghosted_buildings: bool,
    base_error_size: Fixed,
    base_error_mult: Fixed,
}

impl VisibilityLedger {
    /// Empty ledger for a map of `width` x `depth` squares.
    pub fn new(num_ally_teams: usize, width: usize, depth: usize, config: &RulesConfig) -> Self {
        let base_error_size = from_int(config.base_radar_error_size as i64);
        let ally = (0..num_ally_teams)
            .map(|_| AllyCoverage {
                los: CoverageGrid::new(width, depth, config.los_mip_level),
                air_los: CoverageGrid::new(width, depth, config.air_mip_level),
                radar: CoverageGrid::new(width, depth, config.radar_mip_level),
                sonar: CoverageGrid::new(width, depth, config.radar_mip_level),
                jammer: CoverageGrid::new(width, depth, config.radar_mip_level),
                sonar_jammer: CoverageGrid::new(width, depth, config.radar_mip_level),
                global_los: false,
                radar_error_size: base_error_size,
            })
            .collect();
        Self {
            ally,
            statuses: BTreeMap::new(),
            errors: BTreeMap::new(),
            require_sonar_under_water: config.require_sonar_under_water,
            separate_jammers: config.separate_jammers,
            ghosted_buildings: config.ghosted_buildings,
            base_error_size,
            base_error_mult: from_int(config.base_radar_error_mult as i64),
        }
    }

    /// Number of ally teams tracked.
    pub fn num_ally_teams(&self) -> usize {
        self.ally.len()
    }

    // =========================================================================
    // UNIT STATUS
    // =========================================================================

    /// Start tracking a unit: unknown to everyone but its own ally team.
    pub fn register_unit(&mut self, unit: UnitId, owner: AllyTeamId) {
        let statuses = (0..self.ally.len())
            .map(|at| if at == owner { LosStatus::seen() } else { LosStatus::NONE })
            .collect();
        self.statuses.insert(unit, statuses);
        self.errors.insert(unit, RadarError::default());
        debug!(unit, owner, "ledger tracking unit");
    }

    /// Stop tracking a unit.
    pub fn remove_unit(&mut self, unit: UnitId) {
        self.statuses.remove(&unit);
        self.errors.remove(&unit);
    }

    /// Status of a unit for an ally team; unknown ids read as nothing seen.
    pub fn status(&self, unit: UnitId, ally_team: AllyTeamId) -> LosStatus {
        self.statuses
            .get(&unit)
            .and_then(|s| s.get(ally_team))
            .copied()
            .unwrap_or(LosStatus::NONE)
    }

    /// Overwrite a status directly.
    pub fn set_status(&mut self, unit: UnitId, ally_team: AllyTeamId, status: LosStatus) {
        if let Some(slot) = self.statuses.get_mut(&unit).and_then(|s| s.get_mut(ally_team)) {
            *slot = status;
        }
    }

    /// Recompute a unit's status for every ally team from coverage.
    pub fn update_unit(&mut self, unit: &Unit) {
        for at in 0..self.ally.len() {
            let next = if at == unit.ally_team {
                LosStatus::seen()
            } else {
                let in_los = self.unit_in_los(unit, at);
                let in_radar = self.unit_in_radar(unit, at);
                self.status(unit.id, at).updated(in_los, in_radar)
            };
            self.set_status(unit.id, at, next);
        }
        trace!(unit = unit.id, "ledger status refreshed");
    }

    // =========================================================================
    // COVERAGE
    // =========================================================================

    fn grid(&self, ally_team: AllyTeamId, kind: SensorKind) -> Option<&CoverageGrid> {
        // Shared jammers live in ally team 0's slot
        let jammer_team = if self.separate_jammers { ally_team } else { 0 };
        match kind {
            SensorKind::Los => self.ally.get(ally_team).map(|a| &a.los),
            SensorKind::AirLos => self.ally.get(ally_team).map(|a| &a.air_los),
            SensorKind::Radar => self.ally.get(ally_team).map(|a| &a.radar),
            SensorKind::Sonar => self.ally.get(ally_team).map(|a| &a.sonar),
            SensorKind::Jammer => self.ally.get(jammer_team).map(|a| &a.jammer),
            SensorKind::SonarJammer => self.ally.get(jammer_team).map(|a| &a.sonar_jammer),
        }
    }

    fn grid_mut(&mut self, ally_team: AllyTeamId, kind: SensorKind) -> Option<&mut CoverageGrid> {
        let jammer_team = if self.separate_jammers { ally_team } else { 0 };
        match kind {
            SensorKind::Los => self.ally.get_mut(ally_team).map(|a| &mut a.los),
            SensorKind::AirLos => self.ally.get_mut(ally_team).map(|a| &mut a.air_los),
            SensorKind::Radar => self.ally.get_mut(ally_team).map(|a| &mut a.radar),
            SensorKind::Sonar => self.ally.get_mut(ally_team).map(|a| &mut a.sonar),
            SensorKind::Jammer => self.ally.get_mut(jammer_team).map(|a| &mut a.jammer),
            SensorKind::SonarJammer => self.ally.get_mut(jammer_team).map(|a| &mut a.sonar_jammer),
        }
    }

    /// Add a sensor circle for an ally team.
    pub fn add_sensor(&mut self, ally_team: AllyTeamId, kind: SensorKind, centre: FixedVec3, radius: Fixed) {
        if let Some(grid) = self.grid_mut(ally_team, kind) {
            grid.add_circle(centre, radius);
        }
    }

    /// Remove a sensor circle added earlier.
    pub fn remove_sensor(&mut self, ally_team: AllyTeamId, kind: SensorKind, centre: FixedVec3, radius: Fixed) {
        if let Some(grid) = self.grid_mut(ally_team, kind) {
            grid.remove_circle(centre, radius);
        }
    }

    /// Add every sensor a unit carries to its own ally team's coverage.
    pub fn add_unit_sensors(&mut self, unit: &Unit) {
        for (kind, radius) in unit_sensors(unit) {
            self.add_sensor(unit.ally_team, kind, unit.pos, radius);
        }
    }

    /// Remove every sensor a unit carries.
    pub fn remove_unit_sensors(&mut self, unit: &Unit) {
        for (kind, radius) in unit_sensors(unit) {
            self.remove_sensor(unit.ally_team, kind, unit.pos, radius);
        }
    }

    fn covers(&self, ally_team: AllyTeamId, kind: SensorKind, pos: FixedVec3) -> bool {
        self.grid(ally_team, kind).is_some_and(|g| g.covers(pos))
    }

    /// Global LOS flag of an ally team.
    pub fn global_los(&self, ally_team: AllyTeamId) -> bool {
        self.ally.get(ally_team).is_some_and(|a| a.global_los)
    }

    /// Set the global LOS flag of an ally team.
    pub fn set_global_los(&mut self, ally_team: AllyTeamId, on: bool) {
        if let Some(a) = self.ally.get_mut(ally_team) {
            a.global_los = on;
        }
    }

    /// Point in an ally team's LOS.
    pub fn in_los(&self, pos: FixedVec3, ally_team: AllyTeamId) -> bool {
        self.global_los(ally_team) || self.covers(ally_team, SensorKind::Los, pos)
    }

    /// Point in an ally team's air LOS.
    pub fn in_air_los(&self, pos: FixedVec3, ally_team: AllyTeamId) -> bool {
        self.global_los(ally_team) || self.covers(ally_team, SensorKind::AirLos, pos)
    }

    /// Point on an ally team's radar; below the water line sonar is
    /// used instead when configured.
    pub fn in_radar(&self, pos: FixedVec3, ally_team: AllyTeamId) -> bool {
        if pos.y < 0 && self.require_sonar_under_water {
            return self.covers(ally_team, SensorKind::Sonar, pos);
        }
        self.covers(ally_team, SensorKind::Radar, pos)
    }

    /// Point inside jammer coverage for an ally team.
    pub fn in_jammer(&self, pos: FixedVec3, ally_team: AllyTeamId) -> bool {
        if pos.y < 0 && self.require_sonar_under_water {
            return self.covers(ally_team, SensorKind::SonarJammer, pos);
        }
        self.covers(ally_team, SensorKind::Jammer, pos)
    }

    /// Unit in an ally team's LOS.
    ///
    /// Always-visible units are, cloaked units are not, submerged units
    /// also need sonar coverage, aircraft use air LOS.
    pub fn unit_in_los(&self, unit: &Unit, ally_team: AllyTeamId) -> bool {
        if unit.always_visible {
            return true;
        }
        if unit.is_cloaked {
            return false;
        }
        if self.require_sonar_under_water
            && unit.is_under_water()
            && !self.covers(ally_team, SensorKind::Sonar, unit.pos)
        {
            return false;
        }
        match unit.move_kind() {
            MoveKind::HoverAir | MoveKind::StrafeAir => self.in_air_los(unit.pos, ally_team),
            _ => self.in_los(unit.pos, ally_team),
        }
    }

    /// Unit in an ally team's air LOS.
    pub fn unit_in_air_los(&self, unit: &Unit, ally_team: AllyTeamId) -> bool {
        unit.always_visible || self.in_air_los(unit.pos, ally_team)
    }

    /// Unit on an ally team's radar and not jammed.
    pub fn unit_in_radar(&self, unit: &Unit, ally_team: AllyTeamId) -> bool {
        let submerged = self.require_sonar_under_water && unit.is_under_water();
        let (sensor, jammer) = if submerged {
            (SensorKind::Sonar, SensorKind::SonarJammer)
        } else {
            (SensorKind::Radar, SensorKind::Jammer)
        };
        self.covers(ally_team, sensor, unit.pos) && !self.covers(ally_team, jammer, unit.pos)
    }

    /// Unit inside jammer coverage for an ally team.
    pub fn unit_in_jammer(&self, unit: &Unit, ally_team: AllyTeamId) -> bool {
        self.in_jammer(unit.pos, ally_team)
    }

    // =========================================================================
    // RADAR ERROR
    // =========================================================================

    /// Error state of a unit.
    pub fn error(&self, unit: UnitId) -> Option<&RadarError> {
        self.errors.get(&unit)
    }

    /// Mutable error state of a unit.
    pub fn error_mut(&mut self, unit: UnitId) -> Option<&mut RadarError> {
        self.errors.get_mut(&unit)
    }

    /// Radar error radius of an ally team.
    pub fn ally_error_size(&self, ally_team: AllyTeamId) -> Fixed {
        self.ally.get(ally_team).map_or(self.base_error_size, |a| a.radar_error_size)
    }

    /// Change the radar error radius of an ally team.
    pub fn set_ally_error_size(&mut self, ally_team: AllyTeamId, size: Fixed) {
        if let Some(a) = self.ally.get_mut(ally_team) {
            a.radar_error_size = size;
        }
    }

    /// Base radar error radius.
    pub fn base_error_size(&self) -> Fixed {
        self.base_error_size
    }

    /// Base radar error multiplier.
    pub fn base_error_mult(&self) -> Fixed {
        self.base_error_mult
    }

    /// Displacement an observing ally team applies to a unit's position.
    ///
    /// Zero when allied or in LOS, zero for a building the observer has
    /// seen (with ghosted buildings on), the scaled error vector when on
    /// radar, zero otherwise.
    pub fn error_vector(&self, unit: &Unit, is_building: bool, observer: AllyTeamId, allied: bool) -> FixedVec3 {
        let status = self.status(unit.id, observer);
        if allied || status.in_los() {
            return FixedVec3::ZERO;
        }
        if self.ghosted_buildings && is_building && status.has(super::status::LOS_PREVLOS) {
            return FixedVec3::ZERO;
        }
        if !status.in_radar() {
            return FixedVec3::ZERO;
        }
        match self.errors.get(&unit.id) {
            Some(err) if err.applies_to(observer) => {
                err.vector.scale(self.ally_error_size(observer))
            }
            _ => FixedVec3::ZERO,
        }
    }

    /// Advance every radar error one frame, in unit id order.
    pub fn walk_errors(&mut self, rng: &mut DeterministicRng, interval: u32) {
        for err in self.errors.values_mut() {
            err.step(rng, interval);
        }
    }

    /// Fold the ledger into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for (unit, statuses) in &self.statuses {
            hasher.update_u32(*unit);
            for status in statuses {
                hasher.update_u16(status.bits());
            }
        }
        for (unit, err) in &self.errors {
            hasher.update_u32(*unit);
            hasher.update_vec3(err.vector);
            hasher.update_vec3(err.delta);
            hasher.update_u32(err.next_update);
            hasher.update_u64(err.mask);
        }
        for ally in &self.ally {
            hasher.update_bool(ally.global_los);
            hasher.update_fixed(ally.radar_error_size);
        }
    }
}

/// Nonzero sensor radii a unit carries.
fn unit_sensors(unit: &Unit) -> Vec<(SensorKind, Fixed)> {
    let s = &unit.sensors;
    [
        (SensorKind::Los, s.los),
        (SensorKind::AirLos, s.air_los),
        (SensorKind::Radar, s.radar),
        (SensorKind::Sonar, s.sonar),
        (SensorKind::Jammer, s.radar_jammer),
        (SensorKind::SonarJammer, s.sonar_jammer),
    ]
    .into_iter()
    .filter(|(_, r)| *r > 0)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::defs::UnitDef;

    fn ledger() -> VisibilityLedger {
        VisibilityLedger::new(2, 64, 64, &RulesConfig::default())
    }

    fn unit_at(id: UnitId, ally_team: AllyTeamId, x: i64, y: i64, z: i64) -> Unit {
        let def = UnitDef::new(1, "probe", from_int(100));
        Unit::new(id, &def, ally_team, ally_team, FixedVec3::from_ints(x, y, z))
    }

    #[test]
    fn test_owner_always_sees_own_unit() {
        let mut ledger = ledger();
        ledger.register_unit(5, 1);
        assert!(ledger.status(5, 1).in_los());
        assert_eq!(ledger.status(5, 0), LosStatus::NONE);
        assert_eq!(ledger.status(99, 0), LosStatus::NONE);
    }

    #[test]
    fn test_update_from_coverage() {
        let mut ledger = ledger();
        let unit = unit_at(1, 1, 200, 0, 200);
        ledger.register_unit(1, 1);

        ledger.add_sensor(0, SensorKind::Radar, FixedVec3::from_ints(200, 0, 200), from_int(64));
        ledger.update_unit(&unit);
        assert_eq!(ledger.status(1, 0), LosStatus::radar_blip());

        ledger.add_sensor(0, SensorKind::Los, FixedVec3::from_ints(200, 0, 200), from_int(64));
        ledger.update_unit(&unit);
        assert!(ledger.status(1, 0).in_los());

        ledger.remove_sensor(0, SensorKind::Los, FixedVec3::from_ints(200, 0, 200), from_int(64));
        ledger.update_unit(&unit);
        let status = ledger.status(1, 0);
        assert!(!status.in_los() && status.is_typed());
    }

    #[test]
    fn test_jammer_hides_radar_contact() {
        let mut ledger = ledger();
        let unit = unit_at(1, 1, 200, 0, 200);
        ledger.add_sensor(0, SensorKind::Radar, unit.pos, from_int(64));
        assert!(ledger.unit_in_radar(&unit, 0));
        ledger.add_sensor(0, SensorKind::Jammer, unit.pos, from_int(64));
        assert!(!ledger.unit_in_radar(&unit, 0));
        assert!(ledger.in_jammer(unit.pos, 0));
    }

    #[test]
    fn test_submerged_units_need_sonar() {
        let mut ledger = ledger();
        let unit = unit_at(1, 1, 200, -40, 200);
        ledger.add_sensor(0, SensorKind::Los, unit.pos, from_int(64));
        assert!(!ledger.unit_in_los(&unit, 0));
        ledger.add_sensor(0, SensorKind::Sonar, unit.pos, from_int(64));
        assert!(ledger.unit_in_los(&unit, 0));
        assert!(ledger.in_radar(unit.pos, 0));
    }

    #[test]
    fn test_cloak_and_always_visible() {
        let ledger = ledger();
        let mut unit = unit_at(1, 1, 10, 0, 10);
        unit.always_visible = true;
        assert!(ledger.unit_in_los(&unit, 0));
        unit.always_visible = false;
        unit.is_cloaked = true;
        assert!(!ledger.unit_in_los(&unit, 0));
    }

    #[test]
    fn test_global_los() {
        let mut ledger = ledger();
        assert!(!ledger.in_los(FixedVec3::from_ints(5, 0, 5), 0));
        ledger.set_global_los(0, true);
        assert!(ledger.in_los(FixedVec3::from_ints(5, 0, 5), 0));
        assert!(!ledger.global_los(1));
    }

    #[test]
    fn test_error_vector_rules() {
        let mut ledger = ledger();
        let unit = unit_at(1, 1, 200, 0, 200);
        ledger.register_unit(1, 1);
        if let Some(err) = ledger.error_mut(1) {
            err.vector = FixedVec3::from_ints(1, 0, 0);
        }

        // Unknown: nothing to displace
        assert_eq!(ledger.error_vector(&unit, false, 0, false), FixedVec3::ZERO);

        ledger.set_status(1, 0, LosStatus::radar_blip());
        assert_eq!(ledger.error_vector(&unit, false, 0, false), FixedVec3::from_ints(96, 0, 0));
        assert_eq!(ledger.error_vector(&unit, false, 0, true), FixedVec3::ZERO);

        // Ghosted building seen before
        ledger.set_status(1, 0, LosStatus::radar_blip().with(super::super::status::LOS_PREVLOS));
        assert_eq!(ledger.error_vector(&unit, true, 0, false), FixedVec3::ZERO);
        assert_ne!(ledger.error_vector(&unit, false, 0, false), FixedVec3::ZERO);

        ledger.set_status(1, 0, LosStatus::seen());
        assert_eq!(ledger.error_vector(&unit, false, 0, false), FixedVec3::ZERO);
    }
}
