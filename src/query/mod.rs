//! Query Dispatch Layer
//!
//! Read-only queries scripts call by name. Every handler is a plain
//! function of the frozen world, the caller's access context and the
//! argument list; none of them can mutate the world.
//!
//! ## Module Structure
//!
//! - `value`: Values crossing the script boundary
//! - `args`: 1-based argument checking
//! - `rules`: Rules-parameter lookups
//! - `parse`: Object-id arguments gated by visibility tier
//! - `game`: Game-wide state and utilities
//! - `teams`: Teams, ally teams, players
//! - `aggregates`: Per-team unit listings and counts
//! - `spatial`: Region and nearest-unit queries
//! - `units`: Per-unit state
//! - `commands`: Order queues and command descriptions
//! - `features`: Per-feature state
//! - `projectiles`: Per-projectile state
//! - `sensors`: LOS and radar lookups
//! - `ground`: Terrain
//!
//! ## Result convention
//!
//! An empty result vector means "not found", "not visible" or "not
//! permitted". Only malformed calls return `Err`.

use std::collections::BTreeMap;

use tracing::trace;
#[cfg(feature = "debug-tracing")]
use tracing::instrument;

use crate::access::AccessContext;
use crate::error::{QueryError, QueryResult};
use crate::world::World;

pub mod value;
pub mod args;
pub(crate) mod rules;
pub(crate) mod parse;
pub mod game;
pub mod teams;
pub mod aggregates;
pub mod spatial;
pub mod units;
pub mod commands;
pub mod features;
pub mod projectiles;
pub mod sensors;
pub mod ground;

pub use args::Args;
pub use value::{Table, TableKey, Value};

/// A query implementation.
pub type Handler = fn(&World, &AccessContext, Args<'_>) -> QueryResult;

/// Name to handler table.
#[derive(Clone)]
pub struct QueryRegistry {
    handlers: BTreeMap<&'static str, Handler>,
}

impl Default for QueryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryRegistry {
    /// Registry holding every built-in query.
    pub fn new() -> Self {
        let mut registry = Self { handlers: BTreeMap::new() };
        game::register(&mut registry);
        teams::register(&mut registry);
        aggregates::register(&mut registry);
        spatial::register(&mut registry);
        units::register(&mut registry);
        commands::register(&mut registry);
        features::register(&mut registry);
        projectiles::register(&mut registry);
        sensors::register(&mut registry);
        ground::register(&mut registry);
        registry
    }

    /// Add or replace a query.
    pub fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of registered queries.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// No queries registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run query `name` against `world` from the perspective `ctx`.
    #[cfg_attr(feature = "debug-tracing", instrument(skip(self, world, ctx, args), fields(frame = world.frame)))]
    pub fn call(&self, world: &World, ctx: &AccessContext, name: &str, args: &[Value]) -> QueryResult {
        let (&func, handler) = self
            .handlers
            .get_key_value(name)
            .ok_or_else(|| QueryError::UnknownFunction(name.to_string()))?;
        let result = handler(world, ctx, Args::new(func, args));
        match &result {
            Ok(values) => trace!(func, returned = values.len(), "query"),
            Err(err) => trace!(func, %err, "query rejected"),
        }
        result
    }
}

impl std::fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRegistry").field("queries", &self.handlers.len()).finish()
    }
}

/// Shorthand for the "nothing to report" result.
#[inline]
pub(crate) fn nothing() -> QueryResult {
    Ok(Vec::new())
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Shared test world: two enemy ally teams plus an ally of team 1.
    //!
    //! - team 0 on ally team 0
    //! - team 1 on ally team 1
    //! - team 2 on ally team 2 (declared ally of ally team 1)

    use super::*;
    use crate::config::RulesConfig;
    use crate::core::fixed::from_int;
    use crate::world::{DefRegistry, Ground, TeamRegistry, UnitDef, FeatureDef, WeaponDef};

    pub fn world() -> World {
        let mut defs = DefRegistry::new();
        let mut tank = UnitDef::new(42, "tank", from_int(100));
        tank.model.radius = from_int(8);
        tank.model.height = from_int(12);
        defs.add_unit_def(tank).unwrap();
        let mut fake = UnitDef::new(43, "faketank", from_int(50));
        fake.decoy_of = Some(42);
        defs.add_unit_def(fake).unwrap();
        let mut lab = UnitDef::new(50, "lab", from_int(1000));
        lab.is_building = true;
        lab.footprint_x = 4;
        lab.footprint_z = 4;
        lab.build_options = vec!["Tank".into(), "FakeTank".into()];
        defs.add_unit_def(lab).unwrap();
        let mut radar = UnitDef::new(60, "radar", from_int(80));
        radar.sensors.radar = from_int(2000);
        radar.sensors.los = from_int(100);
        defs.add_unit_def(radar).unwrap();
        defs.add_feature_def(FeatureDef::new(1, "rock", from_int(30))).unwrap();
        defs.add_weapon_def(WeaponDef {
            id: 7,
            name: "cannon".into(),
            kind: "Cannon".into(),
            range: from_int(300),
            projectile_speed: from_int(10),
            damage: from_int(20),
        })
        .unwrap();

        let mut teams = TeamRegistry::new(3);
        teams.add_team(0).unwrap();
        teams.add_team(1).unwrap();
        teams.add_team(2).unwrap();
        teams.set_alliance(1, 2, true).unwrap();
        World::new(RulesConfig::default(), defs, teams, Ground::flat(128, 128, 0), 11)
    }

    pub fn call(world: &World, ctx: &AccessContext, name: &str, args: &[Value]) -> QueryResult {
        QueryRegistry::new().call(world, ctx, name, args)
    }

    pub fn n(x: impl Into<f64>) -> Value {
        Value::Number(x.into())
    }
}
