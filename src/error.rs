//! Error types.
//!
//! Only caller mistakes and broken world construction are errors.
//! Missing, fogged or forbidden entities are empty results, never an `Err`.

use thiserror::Error;

use crate::world::{TeamId, UnitDefId, UnitId, FeatureId};

/// A caller error surfaced to the script host.
///
/// Aborts the calling script invocation only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// An object-id argument was not a number.
    #[error("[{func}] {what} (arg #{arg}) not a number")]
    IdNotANumber {
        /// Query name
        func: &'static str,
        /// 1-based argument position
        arg: usize,
        /// Argument role (unitID, featureID, ...)
        what: &'static str,
    },

    /// An argument had the wrong type.
    #[error("bad argument #{arg} to '{func}' ({expected} expected, got {got})")]
    BadArgument {
        /// Query name
        func: &'static str,
        /// 1-based argument position
        arg: usize,
        /// Expected type
        expected: &'static str,
        /// Actual type
        got: &'static str,
    },

    /// A team argument outside the valid range.
    #[error("Bad teamID in {func}")]
    BadTeam {
        /// Query name
        func: &'static str,
        /// Offending value
        team: i64,
    },

    /// A unit definition argument that names no definition.
    #[error("Bad unitDefID in {func}")]
    BadUnitDef {
        /// Query name
        func: &'static str,
        /// Offending value
        def_id: i64,
    },

    /// An allegiance argument that is neither a team nor a sentinel.
    #[error("[{func}] bad allegiance {value}")]
    BadAllegiance {
        /// Query name
        func: &'static str,
        /// Offending value
        value: i64,
    },

    /// An ally-team argument the caller may not read.
    #[error("bad argument #{arg} to '{func}' (Invalid allyTeam)")]
    InvalidAllyTeam {
        /// Query name
        func: &'static str,
        /// 1-based argument position
        arg: usize,
    },

    /// Unrecognised sensor name in `GetUnitSensorRadius`.
    #[error("[{func}] unknown sensor type \"{name}\"")]
    UnknownSensor {
        /// Query name
        func: &'static str,
        /// Sensor name as given
        name: String,
    },

    /// The call shape does not match any accepted form.
    #[error("Incorrect arguments to {func}({usage})")]
    Usage {
        /// Query name
        func: &'static str,
        /// Accepted argument shape
        usage: &'static str,
    },

    /// A definition that can never legally exist was referenced.
    #[error("[{func}] malformed definition {def_id}: {reason}")]
    MalformedDefinition {
        /// Query name
        func: &'static str,
        /// Definition id
        def_id: UnitDefId,
        /// What is wrong with it
        reason: &'static str,
    },

    /// No query registered under this name.
    #[error("unknown query function \"{0}\"")]
    UnknownFunction(String),
}

/// An error building or mutating the synced world.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// A unit or feature definition declares non-positive health.
    #[error("definition \"{name}\" has non-positive health")]
    ZeroHealthDefinition {
        /// Definition name
        name: String,
    },

    /// Two definitions share an id.
    #[error("duplicate definition id {0}")]
    DuplicateDefinition(u32),

    /// Reference to an unknown unit definition.
    #[error("unknown unit definition {0}")]
    UnknownUnitDef(UnitDefId),

    /// Reference to an unknown feature definition.
    #[error("unknown feature definition {0}")]
    UnknownFeatureDef(u32),

    /// Reference to an unknown weapon definition.
    #[error("unknown weapon definition {0}")]
    UnknownWeaponDef(u32),

    /// Reference to an unknown team.
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    /// Reference to an unknown ally team.
    #[error("unknown ally team {0}")]
    UnknownAllyTeam(usize),

    /// Reference to a unit that is not alive.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// Reference to a feature that is not alive.
    #[error("unknown feature {0}")]
    UnknownFeature(FeatureId),

    /// The id pool for an entity kind is exhausted.
    #[error("no free {0} ids left")]
    IdsExhausted(&'static str),

    /// A world snapshot could not be encoded or decoded.
    #[error("world snapshot failed: {0}")]
    Snapshot(String),
}

/// An error loading the rules configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read rules config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for `RulesConfig`.
    #[error("failed to parse rules config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its legal range.
    #[error("invalid rules config: {0}")]
    Invalid(String),
}

/// Result of a query invocation.
pub type QueryResult = Result<Vec<crate::query::Value>, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_function_and_argument() {
        let err = QueryError::IdNotANumber { func: "GetUnitHealth", arg: 1, what: "unitID" };
        assert_eq!(err.to_string(), "[GetUnitHealth] unitID (arg #1) not a number");

        let err = QueryError::BadTeam { func: "GetTeamInfo", team: 99 };
        assert_eq!(err.to_string(), "Bad teamID in GetTeamInfo");
    }

    #[test]
    fn test_config_error_from_json() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(err.to_string().starts_with("failed to parse rules config"));
    }
}
