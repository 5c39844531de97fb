//! Script-boundary values.
//!
//! Queries take and return loosely typed values the way a scripting host
//! passes them: numbers are `f64`, tables map integer or string keys to
//! values and keep insertion order. Fixed-point numbers are converted
//! here and nowhere else.

use std::fmt;

use serde::ser::{Serialize, Serializer, SerializeMap, SerializeSeq};

use crate::core::fixed::{Fixed, to_f64};
use crate::core::vec3::FixedVec3;

/// Table key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableKey {
    /// Integer key (arrays are 1-based)
    Int(i64),
    /// String key
    Str(String),
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Int(i) => write!(f, "{i}"),
            TableKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TableKey {
    fn from(i: i64) -> Self {
        TableKey::Int(i)
    }
}

impl From<&str> for TableKey {
    fn from(s: &str) -> Self {
        TableKey::Str(s.to_string())
    }
}

impl From<String> for TableKey {
    fn from(s: String) -> Self {
        TableKey::Str(s)
    }
}

/// Ordered key/value table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    entries: Vec<(TableKey, Value)>,
}

impl Table {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Array table with keys `1..=n`.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (TableKey::Int(i as i64 + 1), v.into()))
            .collect();
        Self { entries }
    }

    /// Set a key, replacing an existing entry in place.
    pub fn set(&mut self, key: impl Into<TableKey>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Table::set`].
    pub fn with(mut self, key: impl Into<TableKey>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Append at the next array index.
    pub fn push(&mut self, value: impl Into<Value>) {
        let next = self.array_len() as i64 + 1;
        self.entries.push((TableKey::Int(next), value.into()));
    }

    /// Value under a key.
    pub fn get(&self, key: &TableKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Value under a string key.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, TableKey::Str(s) if s == key))
            .map(|(_, v)| v)
    }

    /// Array element, 1-based.
    pub fn index(&self, i: i64) -> Option<&Value> {
        self.get(&TableKey::Int(i))
    }

    /// Length of the `1..=n` array prefix.
    pub fn array_len(&self) -> usize {
        let mut n = 0;
        while self.index(n as i64 + 1).is_some() {
            n += 1;
        }
        n
    }

    /// Array prefix values in order.
    pub fn array_values(&self) -> Vec<&Value> {
        (1..=self.array_len() as i64).filter_map(|i| self.index(i)).collect()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_sequence(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == TableKey::Int(i as i64 + 1))
    }
}

/// A value crossing the script boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Explicit nil (a hole in a multi-value return)
    Nil,
    /// Number
    Number(f64),
    /// Boolean
    Bool(bool),
    /// String
    String(String),
    /// Table
    Table(Table),
}

impl Value {
    /// Fixed-point number.
    #[inline]
    pub fn fixed(f: Fixed) -> Self {
        Value::Number(to_f64(f))
    }

    /// Script type name, as used in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Table(_) => "table",
        }
    }

    /// Number, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Table, if this is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Script truthiness: everything but nil and false.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

/// Push the three components of a vector.
pub fn push_vec3(out: &mut Vec<Value>, v: FixedVec3) {
    out.push(Value::fixed(v.x));
    out.push(Value::fixed(v.y));
    out.push(Value::fixed(v.z));
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as f64)
            }
        })*
    };
}

number_from!(f64, f32, i64, i32, u32, u16, u8, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_sequence() {
            let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
            for (_, v) in &self.entries {
                seq.serialize_element(v)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.entries.len()))?;
            for (k, v) in &self.entries {
                map.serialize_entry(&k.to_string(), v)?;
            }
            map.end()
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Table(t) => t.serialize(serializer),
        }
    }
}
