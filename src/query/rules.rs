//! Rules-parameter lookups shared by every entity kind.

use crate::world::rules_params::{ParamValue, RulesParams};
use super::value::{Table, Value};

fn param_value(value: &ParamValue) -> Value {
    match value {
        ParamValue::Number(n) => Value::fixed(*n),
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::String(s) => Value::String(s.clone()),
    }
}

/// One key: its value, or nothing when absent or masked.
pub(crate) fn lookup(params: &RulesParams, key: &str, mask: u8) -> Vec<Value> {
    params
        .get_visible(key, mask)
        .map(|v| vec![param_value(v)])
        .unwrap_or_default()
}

/// Every key the mask admits, as one table. Masked keys are left out.
pub(crate) fn dump(params: &RulesParams, mask: u8) -> Vec<Value> {
    let mut table = Table::new();
    for (key, value) in params.visible(mask) {
        table.set(key, param_value(value));
    }
    vec![Value::Table(table)]
}
