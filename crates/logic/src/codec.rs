//! Conversion between JSON and the [`Value`]/[`Expression`] models.
//!
//! Expressions and data documents share one surface syntax (plain JSON) but
//! parse through different entry points. Expression parsing applies a fixed
//! dispatch order, so a JSON form always means the same thing:
//!
//! 1. Scalars become [`Expression::Const`].
//! 2. `["var", ...]` arrays become [`Expression::Var`].
//! 3. Arrays headed by a known operator tag become [`Expression::Apply`].
//! 4. Any other array becomes [`Expression::Array`].
//! 5. A single-key object keyed `""`/`"var"` becomes a Var, keyed by an
//!    operator tag an Apply (array value = positional arguments).
//! 6. Any other object collapses to a `Const` map when every value is
//!    constant, otherwise it becomes [`Expression::Map`].
//!
//! Encoding is the structural inverse. Round-trips preserve evaluation, not
//! bytes: Apply re-encodes in object form and single non-array arguments
//! lose their wrapping array.

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::ast::{Expression, Operator, VarPath};
use crate::error::ParseError;
use crate::value::Value;

/// Converts a JSON document into a data [`Value`]. Total: every JSON value
/// has a data form. Integer literals that fit i64 become `Int`; numbers
/// with a decimal point, an exponent, or beyond i64 become `Float`.
pub fn parse_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(parse_value).collect()),
        Json::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), parse_value(v)))
                .collect(),
        ),
    }
}

/// Converts a [`Value`] back to JSON. Non-finite floats have no JSON form
/// and encode as null; `Function` values encode as their inner expression.
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(encode_value).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect(),
        ),
        Value::Function(expr) => encode_expression(expr),
    }
}

/// Parses an expression from its JSON form, applying the dispatch order
/// documented at module level.
pub fn parse_expression(json: &Json) -> Result<Expression, ParseError> {
    match json {
        Json::Null | Json::Bool(_) | Json::Number(_) | Json::String(_) => {
            Ok(Expression::Const(parse_value(json)))
        }
        Json::Array(items) => parse_array_form(items),
        Json::Object(entries) => parse_object_form(entries),
    }
}

fn parse_array_form(items: &[Json]) -> Result<Expression, ParseError> {
    if let Some(Json::String(head)) = items.first() {
        if head == "var" {
            return parse_var_args(&items[1..], "[\"var\", ...]");
        }
        if let Some(op) = Operator::from_tag(head) {
            let args = items[1..]
                .iter()
                .map(parse_expression)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Expression::Apply { op, args });
        }
    }
    let elements = items
        .iter()
        .map(parse_expression)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expression::Array(elements))
}

fn parse_object_form(entries: &serde_json::Map<String, Json>) -> Result<Expression, ParseError> {
    if let Some((key, value)) = entries.iter().next().filter(|_| entries.len() == 1) {
        if key.is_empty() || key == "var" {
            return match value {
                Json::Array(parts) => parse_var_args(parts, "{\"var\": [...]}"),
                other => Ok(Expression::Var {
                    path: parse_var_path(other)?,
                    default: None,
                }),
            };
        }
        if let Some(op) = Operator::from_tag(key) {
            let args = match value {
                Json::Array(items) => items
                    .iter()
                    .map(parse_expression)
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![parse_expression(single)?],
            };
            return Ok(Expression::Apply { op, args });
        }
    }

    let mut exprs = IndexMap::with_capacity(entries.len());
    let mut all_const = true;
    for (key, value) in entries {
        let expr = parse_expression(value)?;
        if !matches!(expr, Expression::Const(_)) {
            all_const = false;
        }
        exprs.insert(key.clone(), expr);
    }

    if all_const {
        let constants = exprs
            .into_iter()
            .filter_map(|(k, e)| match e {
                Expression::Const(v) => Some((k, v)),
                _ => None,
            })
            .collect();
        Ok(Expression::Const(Value::Map(constants)))
    } else {
        Ok(Expression::Map(exprs))
    }
}

/// Parses the argument list of a `var` form: `[path]` or `[path, default]`.
/// The path may be a literal string, a number (array index), or a nested
/// expression computed at evaluation time. The default is plain data.
fn parse_var_args(parts: &[Json], fragment: &str) -> Result<Expression, ParseError> {
    match parts {
        [] => Err(ParseError::new(fragment, "missing variable path")),
        [path] => Ok(Expression::Var {
            path: parse_var_path(path)?,
            default: None,
        }),
        [path, default] => Ok(Expression::Var {
            path: parse_var_path(path)?,
            default: Some(parse_value(default)),
        }),
        _ => Err(ParseError::new(
            fragment,
            format!("expected 1 or 2 arguments, got {}", parts.len()),
        )),
    }
}

fn parse_var_path(json: &Json) -> Result<VarPath, ParseError> {
    let path = match json {
        Json::String(s) => VarPath::Literal(s.clone()),
        Json::Number(n) => match n.as_i64() {
            Some(i) => VarPath::Literal(i.to_string()),
            None => VarPath::Literal(n.to_string()),
        },
        other => VarPath::Dynamic(Box::new(parse_expression(other)?)),
    };
    Ok(path)
}

/// Encodes an expression back to JSON, the structural inverse of
/// [`parse_expression`].
pub fn encode_expression(expr: &Expression) -> Json {
    match expr {
        Expression::Const(value) => encode_value(value),
        Expression::Var { path, default } => encode_var(path, default),
        Expression::Array(elements) => {
            Json::Array(elements.iter().map(encode_expression).collect())
        }
        Expression::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, e)| (k.clone(), encode_expression(e)))
                .collect(),
        ),
        Expression::Apply { op, args } => {
            let mut encoded: Vec<Json> = args.iter().map(encode_expression).collect();
            // A single array argument must stay wrapped or it would
            // re-parse as an argument list.
            let body = if encoded.len() == 1 && !encoded[0].is_array() {
                encoded.remove(0)
            } else {
                Json::Array(encoded)
            };
            let mut object = serde_json::Map::with_capacity(1);
            object.insert(op.tag().to_string(), body);
            Json::Object(object)
        }
    }
}

fn encode_var(path: &VarPath, default: &Option<Value>) -> Json {
    let path_json = match path {
        VarPath::Literal(s) => Json::String(s.clone()),
        VarPath::Dynamic(expr) => encode_expression(expr),
    };
    // An array-shaped path must stay wrapped or it would re-parse as
    // [path, default].
    let body = match default {
        Some(value) => Json::Array(vec![path_json, encode_value(value)]),
        None if path_json.is_array() => Json::Array(vec![path_json]),
        None => path_json,
    };
    let mut object = serde_json::Map::with_capacity(1);
    object.insert("var".to_string(), body);
    Json::Object(object)
}
