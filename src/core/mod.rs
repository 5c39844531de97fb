//! Core deterministic primitives.
//!
//! Fixed-point scalars and vectors, the seeded RNG, integer headings and
//! the state hasher. Nothing here touches floating point except the
//! explicit script-boundary conversions.

pub mod fixed;
pub mod vec3;
pub mod rng;
pub mod hash;
pub mod heading;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec3::FixedVec3;
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
