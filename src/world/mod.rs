//! Synced World Module
//!
//! Authoritative registries for everything the query layer reads. The
//! simulation step owns the mutation side; queries only ever borrow
//! `&World`.
//!
//! ## Module Structure
//!
//! - `defs`: Unit, feature and weapon definitions with decoy links
//! - `rules_params`: Per-entity key/value parameters with visibility levels
//! - `team`: Teams, ally teams, alliance matrix, statistics history
//! - `player`: Players and spectators
//! - `unit`: Unit state, capability and move-type tags
//! - `commands`: Order queues and command descriptions
//! - `feature`: Map features (wrecks, trees, rocks)
//! - `projectile`: Weapon and piece projectiles
//! - `registry`: Id-stable containers with partition indices
//! - `ground`: Height map, terrain types, blocking map
//! - `state`: The `World` context bundling all of the above
//! - `step`: Per-frame bookkeeping owned by the simulation loop

pub mod defs;
pub mod rules_params;
pub mod team;
pub mod player;
pub mod unit;
pub mod commands;
pub mod feature;
pub mod projectile;
pub mod registry;
pub mod ground;
pub mod state;
pub mod step;

/// Stable unit id (never reused within a session)
pub type UnitId = u32;
/// Stable feature id
pub type FeatureId = u32;
/// Stable projectile id
pub type ProjectileId = u32;
/// Team index
pub type TeamId = usize;
/// Ally-team index
pub type AllyTeamId = usize;
/// Player index
pub type PlayerId = usize;
/// Unit definition id
pub type UnitDefId = u32;
/// Feature definition id
pub type FeatureDefId = u32;
/// Weapon definition id
pub type WeaponDefId = u32;

// Re-export key types
pub use defs::{DefRegistry, UnitDef, FeatureDef, WeaponDef, ModelDims};
pub use rules_params::{RulesParams, RulesParam, ParamValue, RulesParamLevel};
pub use team::{Team, AllyTeam, TeamRegistry, ResourceState, TeamStatistics};
pub use player::{Player, PlayerRegistry};
pub use unit::{Unit, Capability, MoveKind, MoveTypeData};
pub use commands::{Command, CommandQueue, CommandDescription};
pub use feature::Feature;
pub use projectile::{Projectile, ProjectileKind, ProjectileTarget};
pub use registry::{UnitRegistry, FeatureRegistry, ProjectileRegistry};
pub use ground::Ground;
pub use state::World;
pub use step::StepResult;
