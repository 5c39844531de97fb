//! # Synced Read
//!
//! Visibility-filtered, read-only query layer over the synchronized world
//! state of a lockstep RTS simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SYNCED READ                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q48.16 fixed-point arithmetic             │
//! │  ├── vec3.rs     - 3D vector with fixed-point                │
//! │  ├── heading.rs  - Integer headings                          │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for desync checks           │
//! │                                                              │
//! │  world/          - Synced state (units, features, teams...)  │
//! │  sensor/         - LOS/radar ledger and radar error          │
//! │  spatial/        - Quad-field and region containment         │
//! │  access/         - Caller contexts and visibility gates      │
//! │                                                              │
//! │  query/          - Named read-only queries                   │
//! │  ├── args.rs     - Argument checking                         │
//! │  ├── value.rs    - Script-boundary values                    │
//! │  └── ...         - One module per query family               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything under `world/`, `sensor/` and `spatial/` is deterministic:
//! - No floating-point arithmetic in synced state
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - All randomness from seeded Xorshift128+
//!
//! Queries take `&World` and never write to it, so every participant
//! running the same query in the same frame gets the same answer.
//!
//! ## Example
//!
//! ```no_run
//! use synced_read::{AccessContext, QueryRegistry, Value};
//! # fn demo(world: &synced_read::World) -> Result<(), synced_read::QueryError> {
//! let queries = QueryRegistry::new();
//! let ctx = AccessContext::as_team(world, 0);
//! let health = queries.call(world, &ctx, "GetUnitHealth", &[Value::from(1u32)])?;
//! # let _ = health;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod error;
pub mod world;
pub mod sensor;
pub mod spatial;
pub mod access;
pub mod query;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, GAME_SPEED};
pub use core::vec3::FixedVec3;
pub use core::rng::DeterministicRng;
pub use config::{RulesConfig, FeatureVisibility};
pub use error::{QueryError, QueryResult, WorldError, ConfigError};
pub use world::World;
pub use access::{AccessContext, ReadScope};
pub use query::{QueryRegistry, Table, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
