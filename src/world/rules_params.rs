//! Rules Parameters
//!
//! Named values game logic attaches to the game, teams, players, units and
//! features. Each key carries one visibility level; readers see a key only
//! when their access mask contains that level's bit.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;

/// Visibility level of a single parameter.
///
/// The discriminants are the bits tested against an access mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RulesParamLevel {
    /// Owning ally team only
    Private = 1,
    /// Owning and declared-allied ally teams
    Allied = 2,
    /// Anyone with the entity in LOS
    InLos = 4,
    /// Anyone who has identified the entity
    Typed = 8,
    /// Anyone with the entity on radar
    InRadar = 16,
    /// Everyone
    Public = 32,
}

impl RulesParamLevel {
    /// Bit tested against an access mask.
    #[inline]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Parse the level names game code uses.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "private" => Some(Self::Private),
            "allied" => Some(Self::Allied),
            "inlos" => Some(Self::InLos),
            "typed" => Some(Self::Typed),
            "inradar" => Some(Self::InRadar),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// A parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Fixed-point number
    Number(Fixed),
    /// Boolean
    Bool(bool),
    /// String
    String(String),
}

/// One stored parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesParam {
    /// Stored value
    pub value: ParamValue,
    /// Visibility level
    pub level: RulesParamLevel,
}

/// Ordered parameter table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesParams {
    params: BTreeMap<String, RulesParam>,
}

impl RulesParams {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue, level: RulesParamLevel) {
        self.params.insert(key.into(), RulesParam { value, level });
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<RulesParam> {
        self.params.remove(key)
    }

    /// Look up a parameter regardless of level.
    pub fn get(&self, key: &str) -> Option<&RulesParam> {
        self.params.get(key)
    }

    /// Look up a parameter if `mask` admits its level.
    pub fn get_visible(&self, key: &str, mask: u8) -> Option<&ParamValue> {
        self.params
            .get(key)
            .filter(|p| p.level.bit() & mask != 0)
            .map(|p| &p.value)
    }

    /// Parameters admitted by `mask`, in key order.
    pub fn visible(&self, mask: u8) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params
            .iter()
            .filter(move |(_, p)| p.level.bit() & mask != 0)
            .map(|(k, p)| (k.as_str(), &p.value))
    }

    /// All parameters, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RulesParam)> {
        self.params.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    #[test]
    fn test_level_names() {
        assert_eq!(RulesParamLevel::from_name("inradar"), Some(RulesParamLevel::InRadar));
        assert_eq!(RulesParamLevel::from_name("secret"), None);
        assert_eq!(RulesParamLevel::Public.bit(), 32);
    }

    #[test]
    fn test_visible_filters_by_mask() {
        let mut params = RulesParams::new();
        params.set("score", ParamValue::Number(from_int(10)), RulesParamLevel::Allied);
        params.set("name", ParamValue::String("red".into()), RulesParamLevel::Public);

        let public_only = RulesParamLevel::Public.bit();
        assert!(params.get_visible("score", public_only).is_none());
        assert!(params.get_visible("name", public_only).is_some());

        let keys: Vec<&str> = params.visible(public_only).map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name"]);

        let everything = 0x3f;
        assert_eq!(params.visible(everything).count(), 2);
    }

    #[test]
    fn test_overwrite_changes_level() {
        let mut params = RulesParams::new();
        params.set("x", ParamValue::Bool(true), RulesParamLevel::Private);
        params.set("x", ParamValue::Bool(false), RulesParamLevel::Public);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("x").map(|p| p.level), Some(RulesParamLevel::Public));
    }
}
