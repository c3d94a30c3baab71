//! Map (JSON object) operators.

use crate::error::LogicError;
use crate::value::Value;

fn single_map(
    operator: &str,
    mut args: Vec<Value>,
) -> Result<indexmap::IndexMap<String, Value>, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity(operator, "exactly 1 argument", args.len()));
    }
    match args.remove(0) {
        Value::Map(entries) => Ok(entries),
        other => Err(LogicError::type_error_at(operator, "map", other.type_name(), 0)),
    }
}

/// `keys`: the map's keys in insertion order.
pub fn op_keys(args: Vec<Value>) -> Result<Value, LogicError> {
    let entries = single_map("keys", args)?;
    Ok(Value::Array(
        entries.into_keys().map(Value::String).collect(),
    ))
}

/// `values`: the map's values in insertion order.
pub fn op_values(args: Vec<Value>) -> Result<Value, LogicError> {
    let entries = single_map("values", args)?;
    Ok(Value::Array(entries.into_values().collect()))
}

/// `entries`: `[key, value]` pairs in insertion order.
pub fn op_entries(args: Vec<Value>) -> Result<Value, LogicError> {
    let entries = single_map("entries", args)?;
    Ok(Value::Array(
        entries
            .into_iter()
            .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
            .collect(),
    ))
}

/// `get`: `[map, key, fallback?]`. Tolerant: a missing key or a non-map
/// subject yields the fallback (or `Null`) instead of an error.
pub fn op_get(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(LogicError::arity("get", "2 or 3 arguments", args.len()));
    }
    let fallback = if args.len() == 3 { args.remove(2) } else { Value::Null };
    let key = args.remove(1).to_coerced_string();
    let subject = args.remove(0);
    match subject {
        Value::Map(mut entries) => Ok(entries.swap_remove(&key).unwrap_or(fallback)),
        _ => Ok(fallback),
    }
}

/// `has`: whether the map contains the key. Non-maps are simply false.
pub fn op_has(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("has", "exactly 2 arguments", args.len()));
    }
    let key = args[1].to_coerced_string();
    let present = match &args[0] {
        Value::Map(entries) => entries.contains_key(&key),
        _ => false,
    };
    Ok(Value::Bool(present))
}
