//! Inspection and data-presence operators.
//!
//! `exists`, `missing` and `missing_some` check whether dotted paths
//! resolve in the combined data-and-context document. A key holding
//! `null` is present; only a path that fails to resolve at some segment
//! is missing.

use crate::engine::{self, EvalScope};
use crate::error::LogicError;
use crate::value::Value;

/// `length`: characters of a string, elements of an array, entries of a
/// map. Anything else has no length and yields `Null`.
pub fn op_length(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("length", "exactly 1 argument", args.len()));
    }
    let length = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Map(entries) => entries.len(),
        _ => return Ok(Value::Null),
    };
    Ok(Value::Int(length as i64))
}

/// `typeof`: the value's type tag as a string.
pub fn op_typeof(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("typeof", "exactly 1 argument", args.len()));
    }
    Ok(Value::String(args[0].type_name().to_string()))
}

/// `default`: the first truthy argument, or `Null`.
pub fn op_default(args: Vec<Value>) -> Result<Value, LogicError> {
    for arg in args {
        if arg.is_truthy() {
            return Ok(arg);
        }
    }
    Ok(Value::Null)
}

/// `noop`: discards its arguments.
pub fn op_noop(_args: Vec<Value>) -> Result<Value, LogicError> {
    Ok(Value::Null)
}

/// `exists`: true when every argument path resolves in the document.
pub fn op_exists(args: Vec<Value>, scope: EvalScope) -> Result<Value, LogicError> {
    if args.is_empty() {
        return Err(LogicError::arity("exists", "at least 1 argument", 0));
    }
    let document = engine::combined_document(scope);
    let all_present = args
        .iter()
        .all(|arg| engine::lookup_path(&document, &arg.to_coerced_string()).is_some());
    Ok(Value::Bool(all_present))
}

/// `missing`: the subset of the requested paths that do not resolve, in
/// request order. Paths may arrive as one array argument or variadically.
pub fn op_missing(args: Vec<Value>, scope: EvalScope) -> Result<Value, LogicError> {
    let paths = path_list(args);
    let document = engine::combined_document(scope);
    let absent: Vec<Value> = paths
        .into_iter()
        .filter(|path| engine::lookup_path(&document, path).is_none())
        .map(Value::String)
        .collect();
    Ok(Value::Array(absent))
}

/// `missing_some`: `[minimum, paths]`. Empty result when at least
/// `minimum` of the paths resolve, otherwise the full missing list.
pub fn op_missing_some(mut args: Vec<Value>, scope: EvalScope) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("missing_some", "exactly 2 arguments", args.len()));
    }
    let paths_arg = args.remove(1);
    let minimum = match args[0].to_number() {
        Some(n) => n.trunc() as i64,
        None => {
            return Err(LogicError::type_error_at(
                "missing_some",
                "number",
                args[0].type_name(),
                0,
            ));
        }
    };
    let paths = match paths_arg {
        Value::Array(_) => path_list(vec![paths_arg]),
        other => {
            return Err(LogicError::type_error_at(
                "missing_some",
                "array",
                other.type_name(),
                1,
            ));
        }
    };

    let document = engine::combined_document(scope);
    let mut absent = Vec::new();
    let mut present: i64 = 0;
    for path in paths {
        if engine::lookup_path(&document, &path).is_some() {
            present += 1;
        } else {
            absent.push(Value::String(path));
        }
    }

    if present >= minimum {
        Ok(Value::Array(Vec::new()))
    } else {
        Ok(Value::Array(absent))
    }
}

/// Flattens `missing`-style arguments: one array argument means its
/// elements are the paths, anything else is a path itself.
fn path_list(mut args: Vec<Value>) -> Vec<String> {
    if args.len() == 1 && matches!(args[0], Value::Array(_)) {
        if let Some(Value::Array(items)) = args.pop() {
            args = items;
        }
    }
    args.iter().map(Value::to_coerced_string).collect()
}
