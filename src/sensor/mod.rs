//! Sensor Module
//!
//! What each ally team can currently sense, and what it has sensed before.
//!
//! ## Module Structure
//!
//! - `status`: Per-(unit, ally team) status bits with mask overrides
//! - `coverage`: Counter grids for LOS, radar, sonar and jammers
//! - `radar_error`: Per-unit radar position error walk
//! - `ledger`: The visibility ledger bundling all of the above

pub mod status;
pub mod coverage;
pub mod radar_error;
pub mod ledger;

// Re-export key types
pub use status::{
    LosStatus, LOS_INLOS, LOS_INRADAR, LOS_PREVLOS, LOS_CONTRADAR,
    LOS_ALL_BITS, LOS_ALL_MASK_BITS, LOS_CURR_BITS, LOS_TYPED_BITS,
};
pub use coverage::CoverageGrid;
pub use radar_error::RadarError;
pub use ledger::{VisibilityLedger, SensorKind};
