//! Units
//!
//! The read-side snapshot of a unit. Movement, weapons and command
//! execution live elsewhere; their state is mirrored here each frame.
//! Capability and movement are closed tags so every reader matches
//! exhaustively instead of probing for subtypes.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE};
use crate::core::vec3::FixedVec3;
use super::commands::{CommandQueue, CommandDescription};
use super::defs::{UnitDef, SensorRanges};
use super::rules_params::RulesParams;
use super::{UnitId, UnitDefId, TeamId, AllyTeamId, WeaponDefId};

// =============================================================================
// CAPABILITY
// =============================================================================

/// What a unit can construct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Mobile or static constructor
    Builder {
        /// Unit under construction
        cur_build: Option<UnitId>,
        /// Build range
        build_distance: Fixed,
    },
    /// Factory producing units in place
    Factory {
        /// Unit under construction
        cur_build: Option<UnitId>,
        /// Orders handed to each finished unit
        new_unit_commands: CommandQueue,
    },
    /// Neither
    Neither,
}

impl Capability {
    /// Unit currently being constructed, if any.
    pub fn cur_build(&self) -> Option<UnitId> {
        match self {
            Capability::Builder { cur_build, .. } | Capability::Factory { cur_build, .. } => *cur_build,
            Capability::Neither => None,
        }
    }

    /// True for factories.
    pub fn is_factory(&self) -> bool {
        matches!(self, Capability::Factory { .. })
    }
}

// =============================================================================
// MOVE TYPES
// =============================================================================

/// Movement model tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MoveKind {
    /// Ground and naval units
    Ground = 0,
    /// Gunships
    HoverAir = 1,
    /// Airplanes
    StrafeAir = 2,
    /// Buildings
    Static = 3,
    /// Script-driven movement
    Scripted = 4,
}

/// Progress toward the current move goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressState {
    /// Goal reached or no goal
    Done,
    /// Moving toward the goal
    Active,
    /// Goal unreachable
    Failed,
}

impl ProgressState {
    /// Script-facing name.
    pub fn name(self) -> &'static str {
        match self {
            ProgressState::Done => "done",
            ProgressState::Active => "active",
            ProgressState::Failed => "failed",
        }
    }
}

/// Aircraft flight phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftState {
    /// On the ground
    Landed,
    /// Airborne
    Flying,
    /// Descending to land
    Landing,
    /// Going down
    Crashing,
    /// Climbing after takeoff
    Takeoff,
    /// Stationary in the air
    Hovering,
}

impl AircraftState {
    /// Script-facing name.
    pub fn name(self) -> &'static str {
        match self {
            AircraftState::Landed => "landed",
            AircraftState::Flying => "flying",
            AircraftState::Landing => "landing",
            AircraftState::Crashing => "crashing",
            AircraftState::Takeoff => "takeoff",
            AircraftState::Hovering => "hovering",
        }
    }
}

/// Gunship flight mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlyState {
    /// Flying to a point
    Cruising,
    /// Circling a point
    Circling,
    /// Engaging a target
    Attacking,
    /// Landing
    Landing,
}

impl FlyState {
    /// Script-facing name.
    pub fn name(self) -> &'static str {
        match self {
            FlyState::Cruising => "cruising",
            FlyState::Circling => "circling",
            FlyState::Attacking => "attacking",
            FlyState::Landing => "landing",
        }
    }
}

/// Fields every move type reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommon {
    /// Maximum speed (elmos per frame)
    pub max_speed: Fixed,
    /// Speed cap requested by orders
    pub max_wanted_speed: Fixed,
    /// Current goal
    pub goal: FixedVec3,
    /// Goal progress
    pub progress: ProgressState,
}

impl Default for MoveCommon {
    fn default() -> Self {
        Self { max_speed: 0, max_wanted_speed: 0, goal: FixedVec3::ZERO, progress: ProgressState::Done }
    }
}

/// Ground movement snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundMove {
    /// Turn rate (heading units per frame)
    pub turn_rate: Fixed,
    /// Acceleration
    pub acc_rate: Fixed,
    /// Deceleration
    pub dec_rate: Fixed,
    /// Reverse speed cap
    pub max_reverse_speed: Fixed,
    /// Target speed
    pub wanted_speed: Fixed,
    /// Current speed
    pub current_speed: Fixed,
    /// Arrival radius
    pub goal_radius: Fixed,
    /// Current path waypoint
    pub curr_waypoint: FixedVec3,
    /// Next path waypoint
    pub next_waypoint: FixedVec3,
}

/// Gunship movement snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverAirMove {
    /// Cruise altitude
    pub wanted_height: Fixed,
    /// Collides with other aircraft
    pub collide: bool,
    /// Follows the smoothed height mesh
    pub use_smooth_mesh: bool,
    /// Flight phase
    pub aircraft_state: AircraftState,
    /// Flight mode
    pub fly_state: FlyState,
    /// Distance to the goal
    pub goal_distance: Fixed,
    /// May bank while turning
    pub banking_allowed: bool,
    /// Current bank
    pub current_bank: Fixed,
    /// Current pitch
    pub current_pitch: Fixed,
    /// Turn rate
    pub turn_rate: Fixed,
    /// Acceleration
    pub acc_rate: Fixed,
    /// Deceleration
    pub dec_rate: Fixed,
    /// Climb rate
    pub altitude_rate: Fixed,
    /// Landing is allowed
    pub allow_landing: bool,
    /// Maximum drift while hovering
    pub max_drift: Fixed,
    /// Lands automatically when idle
    pub auto_land: bool,
}

/// Airplane movement snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrafeAirMove {
    /// Flight phase
    pub aircraft_state: AircraftState,
    /// Cruise altitude
    pub wanted_height: Fixed,
    /// Collides with other aircraft
    pub collide: bool,
    /// Follows the smoothed height mesh
    pub use_smooth_mesh: bool,
    /// Gravity applied to this airframe
    pub my_gravity: Fixed,
    /// Maximum bank
    pub max_bank: Fixed,
    /// Maximum pitch
    pub max_pitch: Fixed,
    /// Turn radius
    pub turn_radius: Fixed,
    /// Maximum acceleration
    pub max_acc: Fixed,
    /// Aileron authority
    pub max_aileron: Fixed,
    /// Elevator authority
    pub max_elevator: Fixed,
    /// Rudder authority
    pub max_rudder: Fixed,
    /// Lands automatically when idle
    pub auto_land: bool,
    /// Loops back after an attack run
    pub loopback_attack: bool,
}

/// Movement state by model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTypeData {
    /// Ground and naval units
    Ground(GroundMove),
    /// Gunships
    HoverAir(HoverAirMove),
    /// Airplanes
    StrafeAir(StrafeAirMove),
    /// Buildings
    Static,
    /// Script-driven movement
    Scripted,
}

impl MoveTypeData {
    /// Tag of this move type.
    pub fn kind(&self) -> MoveKind {
        match self {
            MoveTypeData::Ground(_) => MoveKind::Ground,
            MoveTypeData::HoverAir(_) => MoveKind::HoverAir,
            MoveTypeData::StrafeAir(_) => MoveKind::StrafeAir,
            MoveTypeData::Static => MoveKind::Static,
            MoveTypeData::Scripted => MoveKind::Scripted,
        }
    }
}

// =============================================================================
// SMALLER STATE BLOCKS
// =============================================================================

/// Player-settable states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStates {
    /// 0 hold fire, 1 return fire, 2 fire at will
    pub fire_state: u8,
    /// 0 hold position, 1 maneuver, 2 roam
    pub move_state: u8,
    /// Orders repeat when the queue empties
    pub repeat: bool,
    /// Artillery uses high arcs
    pub high_trajectory: bool,
    /// Mobile command AI retreat threshold; `None` for factories
    pub repair_below_health: Option<Fixed>,
}

impl Default for UnitStates {
    fn default() -> Self {
        Self {
            fire_state: 2,
            move_state: 1,
            repeat: false,
            high_trajectory: false,
            repair_below_health: Some(0),
        }
    }
}

/// Resource production and consumption per slow update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitResources {
    /// Metal produced
    pub metal_make: Fixed,
    /// Metal consumed
    pub metal_use: Fixed,
    /// Energy produced
    pub energy_make: Fixed,
    /// Energy consumed
    pub energy_use: Fixed,
}

/// Stockpiling weapon state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stockpile {
    /// Ready rounds
    pub num_stockpiled: u32,
    /// Queued rounds
    pub num_queued: u32,
    /// Progress on the current round
    pub build_percent: Fixed,
}

/// One mounted weapon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponState {
    /// Weapon definition
    pub def_id: WeaponDefId,
    /// Aimed at the current target
    pub angle_good: bool,
    /// Frame the next shot is ready
    pub reload_frame: u32,
    /// Reload time in frames
    pub reload_time: u32,
    /// Shots left in the current salvo
    pub salvo_left: u32,
    /// Frame of the next salvo shot
    pub next_salvo: u32,
    /// Ready stockpiled rounds
    pub num_stockpiled: u32,
    /// Accuracy spread
    pub accuracy: Fixed,
    /// Spray angle
    pub spray_angle: Fixed,
    /// Range
    pub range: Fixed,
    /// Projectile speed
    pub projectile_speed: Fixed,
    /// Shots per salvo
    pub burst: u32,
    /// Frames between salvo shots
    pub burst_rate: u32,
    /// Projectiles per shot
    pub projectiles: u32,
}

/// Physical and collision state bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingFlags {
    /// Occupies ground squares
    pub blocking: bool,
    /// Collides with other solids
    pub solid_objects: bool,
    /// Collides with projectiles
    pub projectiles: bool,
    /// Hit by map rays
    pub rays: bool,
    /// Can be crushed
    pub crushable: bool,
    /// Cannot be pushed by enemies
    pub block_enemy_pushing: bool,
    /// Prevents terrain changes beneath
    pub block_height_changes: bool,
}

impl Default for BlockingFlags {
    fn default() -> Self {
        Self {
            blocking: true,
            solid_objects: true,
            projectiles: true,
            rays: true,
            crushable: false,
            block_enemy_pushing: true,
            block_height_changes: false,
        }
    }
}

// =============================================================================
// UNIT
// =============================================================================

/// A live unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable id
    pub id: UnitId,
    /// True definition
    pub def_id: UnitDefId,
    /// Owning team
    pub team: TeamId,
    /// Owning ally team
    pub ally_team: AllyTeamId,

    /// Base position
    pub pos: FixedVec3,
    /// Model centre
    pub mid_pos: FixedVec3,
    /// Point enemies aim at
    pub aim_pos: FixedVec3,
    /// Velocity per frame
    pub velocity: FixedVec3,
    /// Facing vector
    pub front: FixedVec3,
    /// Up vector
    pub up: FixedVec3,
    /// Right vector
    pub right: FixedVec3,
    /// Heading (65536 per turn)
    pub heading: i64,
    /// Build facing, 0-3
    pub build_facing: u8,
    /// Model height
    pub height: Fixed,
    /// Bounding radius
    pub radius: Fixed,
    /// Mass
    pub mass: Fixed,

    /// Current health
    pub health: Fixed,
    /// Maximum health
    pub max_health: Fixed,
    /// Accumulated paralysis damage
    pub paralyze_damage: Fixed,
    /// Capture progress, 0..1
    pub capture_progress: Fixed,
    /// Build progress, 0..1
    pub build_progress: Fixed,
    /// Still under construction
    pub being_built: bool,
    /// Paralysed
    pub stunned: bool,
    /// Dying this frame
    pub is_dead: bool,
    /// Ignored by automatic targeting
    pub neutral: bool,

    /// Raw experience
    pub experience: Fixed,
    /// Experience mapped into 0..1
    pub lim_experience: Fixed,
    /// Armor state engaged
    pub armored: bool,
    /// Damage multiplier while armored
    pub armored_multiple: Fixed,
    /// On/off state
    pub activated: bool,
    /// Cloak requested
    pub want_cloak: bool,
    /// Cloak active
    pub is_cloaked: bool,
    /// Visible to everyone regardless of sensors
    pub always_visible: bool,
    /// Frames until self-destruct, 0 when inactive
    pub self_d_countdown: u32,

    /// Resource flow
    pub resources: UnitResources,
    /// Current sensor radii
    pub sensors: SensorRanges,
    /// Player-settable states
    pub states: UnitStates,
    /// Stockpile weapon, if any
    pub stockpile: Option<Stockpile>,
    /// Mounted weapons
    pub weapons: Vec<WeaponState>,
    /// Longest weapon range
    pub max_range: Fixed,

    /// Carrying transport
    pub transporter: Option<UnitId>,
    /// Units carried
    pub transported: Vec<UnitId>,
    /// Last unit that damaged this one
    pub last_attacker: Option<UnitId>,
    /// Collision bits
    pub blocking: BlockingFlags,

    /// Tooltip override text
    pub tooltip: String,
    /// Construction capability
    pub capability: Capability,
    /// Movement state
    pub move_type: MoveTypeData,
    /// Movement state shared by every move type
    pub move_common: MoveCommon,
    /// Pending orders
    pub commands: CommandQueue,
    /// Offered command buttons
    pub cmd_descs: Vec<CommandDescription>,
    /// Game rules parameters
    pub rules_params: RulesParams,
}

impl Unit {
    /// Fresh, fully built unit of `def` at `pos`.
    pub fn new(id: UnitId, def: &UnitDef, team: TeamId, ally_team: AllyTeamId, pos: FixedVec3) -> Self {
        let move_type = if def.is_building { MoveTypeData::Static } else { MoveTypeData::Ground(GroundMove::default()) };
        Self {
            id,
            def_id: def.id,
            team,
            ally_team,
            pos,
            mid_pos: pos.add(def.model.mid),
            aim_pos: pos.add(def.model.mid),
            velocity: FixedVec3::ZERO,
            front: FixedVec3::FORWARD,
            up: FixedVec3::UP,
            right: FixedVec3::RIGHT,
            heading: 0,
            build_facing: 0,
            height: def.model.height,
            radius: def.model.radius,
            mass: FIXED_ONE * 100,
            health: def.health,
            max_health: def.health,
            paralyze_damage: 0,
            capture_progress: 0,
            build_progress: FIXED_ONE,
            being_built: false,
            stunned: false,
            is_dead: false,
            neutral: false,
            experience: 0,
            lim_experience: 0,
            armored: false,
            armored_multiple: FIXED_ONE,
            activated: true,
            want_cloak: false,
            is_cloaked: false,
            always_visible: false,
            self_d_countdown: 0,
            resources: UnitResources::default(),
            sensors: def.sensors,
            states: UnitStates::default(),
            stockpile: None,
            weapons: Vec::new(),
            max_range: 0,
            transporter: None,
            transported: Vec::new(),
            last_attacker: None,
            blocking: BlockingFlags::default(),
            tooltip: String::new(),
            capability: Capability::Neither,
            move_type,
            move_common: MoveCommon::default(),
            commands: CommandQueue::new(),
            cmd_descs: Vec::new(),
            rules_params: RulesParams::new(),
        }
    }

    /// Move the unit, keeping mid and aim offsets.
    pub fn set_position(&mut self, pos: FixedVec3) {
        let mid_offset = self.mid_pos.sub(self.pos);
        let aim_offset = self.aim_pos.sub(self.pos);
        self.pos = pos;
        self.mid_pos = pos.add(mid_offset);
        self.aim_pos = pos.add(aim_offset);
    }

    /// Entirely below the water surface.
    #[inline]
    pub fn is_under_water(&self) -> bool {
        self.pos.y.wrapping_add(self.height) < 0
    }

    /// Orders a script reads as "the queue": factories expose the orders
    /// given to finished units, everyone else their own queue.
    pub fn visible_queue(&self) -> &CommandQueue {
        match &self.capability {
            Capability::Factory { new_unit_commands, .. } => new_unit_commands,
            _ => &self.commands,
        }
    }

    /// Movement tag.
    #[inline]
    pub fn move_kind(&self) -> MoveKind {
        self.move_type.kind()
    }
}
