//! Access Control
//!
//! - `context`: The calling perspective of one query
//! - `resolver`: Disclosure tiers, decoys, rules-parameter masks
//! - `allegiance`: Team-scoped unit filters

pub mod context;
pub mod resolver;
pub mod allegiance;

pub use context::{AccessContext, ReadScope, NO_ACCESS_TEAM, ALL_ACCESS_TEAM};
pub use allegiance::{Allegiance, ALL_UNITS, MY_UNITS, ALLY_UNITS, ENEMY_UNITS};
pub use resolver::{
    PUBLIC_MASK, INRADAR_MASK, TYPED_MASK, INLOS_MASK, ALLIED_MASK, PRIVATE_MASK,
    is_ally_unit, is_unit_visible, is_unit_in_los, is_unit_typed,
    effective_unit_def, shown_health, unit_los_mask,
};
