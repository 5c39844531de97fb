//! Argument access for query handlers.
//!
//! Positions are 1-based, matching the diagnostics scripts see. `check_*`
//! helpers require the argument; `opt_*` helpers accept a missing or nil
//! argument and fall back to a default, but still reject a present value
//! of the wrong type.

use crate::core::fixed::{Fixed, from_f64};
use crate::error::QueryError;
use super::value::{Table, Value};

/// The arguments of one invocation.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    func: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Wrap the raw argument list of `func`.
    pub fn new(func: &'static str, values: &'a [Value]) -> Self {
        Self { func, values }
    }

    /// Query name.
    #[inline]
    pub fn func(&self) -> &'static str {
        self.func
    }

    /// Number of arguments passed.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No arguments passed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument.
    pub fn get(&self, pos: usize) -> Option<&'a Value> {
        pos.checked_sub(1).and_then(|i| self.values.get(i))
    }

    /// Argument missing or nil.
    pub fn is_none(&self, pos: usize) -> bool {
        matches!(self.get(pos), None | Some(Value::Nil))
    }

    /// Argument is a number.
    pub fn is_number(&self, pos: usize) -> bool {
        matches!(self.get(pos), Some(Value::Number(_)))
    }

    fn bad(&self, pos: usize, expected: &'static str) -> QueryError {
        QueryError::BadArgument {
            func: self.func,
            arg: pos,
            expected,
            got: self.get(pos).map_or("no value", Value::type_name),
        }
    }

    /// Usage error naming the accepted call shape.
    pub fn usage(&self, usage: &'static str) -> QueryError {
        QueryError::Usage { func: self.func, usage }
    }

    // =========================================================================
    // NUMBERS
    // =========================================================================

    /// Required number.
    pub fn check_number(&self, pos: usize) -> Result<f64, QueryError> {
        self.get(pos).and_then(Value::as_number).ok_or_else(|| self.bad(pos, "number"))
    }

    /// Optional number.
    pub fn opt_number(&self, pos: usize, default: f64) -> Result<f64, QueryError> {
        if self.is_none(pos) {
            return Ok(default);
        }
        self.check_number(pos)
    }

    /// Optional number without a default.
    pub fn maybe_number(&self, pos: usize) -> Result<Option<f64>, QueryError> {
        if self.is_none(pos) {
            return Ok(None);
        }
        self.check_number(pos).map(Some)
    }

    /// Required integer (truncated toward zero).
    pub fn check_int(&self, pos: usize) -> Result<i64, QueryError> {
        self.check_number(pos).map(|n| n as i64)
    }

    /// Optional integer.
    pub fn opt_int(&self, pos: usize, default: i64) -> Result<i64, QueryError> {
        if self.is_none(pos) {
            return Ok(default);
        }
        self.check_int(pos)
    }

    /// Optional integer without a default.
    pub fn maybe_int(&self, pos: usize) -> Result<Option<i64>, QueryError> {
        self.maybe_number(pos).map(|n| n.map(|n| n as i64))
    }

    /// Required number as fixed point.
    pub fn check_fixed(&self, pos: usize) -> Result<Fixed, QueryError> {
        self.check_number(pos).map(from_f64)
    }

    /// Optional number as fixed point.
    pub fn opt_fixed(&self, pos: usize, default: Fixed) -> Result<Fixed, QueryError> {
        if self.is_none(pos) {
            return Ok(default);
        }
        self.check_fixed(pos)
    }

    /// Object id: must be a number, otherwise the call aborts.
    pub fn check_id(&self, pos: usize, what: &'static str) -> Result<i64, QueryError> {
        match self.get(pos) {
            Some(Value::Number(n)) => Ok(*n as i64),
            _ => Err(QueryError::IdNotANumber { func: self.func, arg: pos, what }),
        }
    }

    // =========================================================================
    // OTHER TYPES
    // =========================================================================

    /// Required string. Numbers are accepted in their decimal form.
    pub fn check_string(&self, pos: usize) -> Result<String, QueryError> {
        match self.get(pos) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(self.bad(pos, "string")),
        }
    }

    /// Optional boolean using script truthiness; missing or nil gives the default.
    pub fn opt_bool(&self, pos: usize, default: bool) -> bool {
        match self.get(pos) {
            None | Some(Value::Nil) => default,
            Some(v) => v.truthy(),
        }
    }

    /// Table argument, if present.
    pub fn table(&self, pos: usize) -> Option<&'a Table> {
        self.get(pos).and_then(Value::as_table)
    }

    /// Required table.
    pub fn check_table(&self, pos: usize) -> Result<&'a Table, QueryError> {
        self.table(pos).ok_or_else(|| self.bad(pos, "table"))
    }
}
