//! Spatial Index
//!
//! - `quad_field`: Bucket grid for candidate gathering
//! - `region`: Shape tests and the generic region query

pub mod quad_field;
pub mod region;

pub use quad_field::{QuadField, Rect};
pub use region::{Shape, Plane, units_in_region, features_in_region, projectiles_in_rect, nearest_unit};
