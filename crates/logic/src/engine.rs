//! Expression evaluation with gas metering.
//!
//! The evaluator is a plain recursive tree walk over [`Expression`].
//! Every `Apply` node charges its operator and depth cost before any
//! argument runs, and the nesting bound in `GasConfig::max_depth` is
//! checked at every node, so an adversarial expression fails before the
//! work below it starts rather than after.
//!
//! Evaluation never mutates its inputs. The same expression, data and
//! gas configuration always produce the same value and the same gas
//! figure, which is what lets independent validators agree on a verdict.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::ast::{Expression, Operator, VarPath};
use crate::codec;
use crate::error::LogicError;
use crate::gas::{GasConfig, GasLimit, GasMeter};
use crate::ops;
use crate::value::Value;

/// What one expression sees when it resolves `var` paths: the current
/// data document, plus an optional context document layered by `reduce`.
#[derive(Debug, Clone, Copy)]
pub struct EvalScope<'v> {
    pub data: &'v Value,
    pub context: Option<&'v Value>,
}

/// Result of a metered evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub gas_used: u64,
}

/// Result of [`evaluate_json`], already encoded back to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEvaluation {
    pub result: Json,
    pub gas_used: u64,
}

/// Evaluates a parsed expression against a data document.
pub fn evaluate(
    expr: &Expression,
    data: &Value,
    config: &GasConfig,
    limit: GasLimit,
) -> Result<Evaluation, LogicError> {
    let mut meter = GasMeter::new(config, limit);
    let scope = EvalScope {
        data,
        context: None,
    };
    let value = eval(expr, scope, &mut meter, 0)?;
    Ok(Evaluation {
        value,
        gas_used: meter.used(),
    })
}

/// Parses expression and data from JSON, evaluates, and encodes the
/// result back to JSON. The convenience entry point for callers that
/// never touch the typed representations.
pub fn evaluate_json(
    expression: &Json,
    data: &Json,
    config: &GasConfig,
    limit: GasLimit,
) -> Result<JsonEvaluation, LogicError> {
    let parsed = codec::parse_expression(expression)?;
    let document = codec::parse_value(data);
    let outcome = evaluate(&parsed, &document, config, limit)?;
    Ok(JsonEvaluation {
        result: codec::encode_value(&outcome.value),
        gas_used: outcome.gas_used,
    })
}

pub(crate) fn eval(
    expr: &Expression,
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let max = meter.config().max_depth;
    if depth > max {
        return Err(LogicError::DepthLimit { depth, max });
    }
    match expr {
        Expression::Const(value) => Ok(value.clone()),
        Expression::Var { path, default } => {
            evaluate_var(path, default.as_ref(), scope, meter, depth)
        }
        Expression::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval(element, scope, meter, depth + 1)?);
            }
            Ok(Value::Array(values))
        }
        Expression::Map(entries) => {
            let mut values = IndexMap::with_capacity(entries.len());
            for (key, nested) in entries {
                values.insert(key.clone(), eval(nested, scope, meter, depth + 1)?);
            }
            Ok(Value::Map(values))
        }
        Expression::Apply { op, args } => evaluate_apply(*op, args, scope, meter, depth),
    }
}

fn evaluate_apply(
    op: Operator,
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    meter.charge_operator(op, depth)?;
    let child = depth + 1;
    match op {
        Operator::If => evaluate_if(args, scope, meter, child),
        Operator::And | Operator::Or => evaluate_junction(op, args, scope, meter, child),
        Operator::Let => evaluate_let(args, scope, meter, child),
        Operator::Reduce => evaluate_reduce(args, scope, meter, child),
        Operator::Map
        | Operator::Filter
        | Operator::All
        | Operator::Some
        | Operator::None
        | Operator::Find
        | Operator::Count => evaluate_iteration(op, args, scope, meter, child),
        _ => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, scope, meter, child)?);
            }
            if let Some(len) = collection_input_size(op, &values) {
                meter.charge_elements(len)?;
            }
            ops::apply(op, values, scope)
        }
    }
}

/// Total element count feeding an eager collection operator, or `None`
/// for operators outside the surcharge set.
fn collection_input_size(op: Operator, args: &[Value]) -> Option<usize> {
    match op {
        Operator::Merge
        | Operator::In
        | Operator::Intersect
        | Operator::Unique
        | Operator::Slice
        | Operator::Reverse
        | Operator::Flatten
        | Operator::Values
        | Operator::Keys
        | Operator::Entries
        | Operator::Join => {
            let total = args
                .iter()
                .map(|arg| match arg {
                    Value::Array(items) => items.len(),
                    Value::Map(entries) => entries.len(),
                    _ => 0,
                })
                .sum();
            Some(total)
        }
        _ => None,
    }
}

/// `if`: condition/branch pairs left to right, odd trailing argument as
/// the unconditional else.
fn evaluate_if(
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let mut index = 0;
    while index + 1 < args.len() {
        if eval(&args[index], scope, meter, depth)?.is_truthy() {
            return eval(&args[index + 1], scope, meter, depth);
        }
        index += 2;
    }
    if args.len() % 2 == 1 {
        eval(&args[args.len() - 1], scope, meter, depth)
    } else {
        Ok(Value::Null)
    }
}

/// `and`/`or`: short-circuit, returning the deciding operand itself
/// rather than a coerced boolean.
fn evaluate_junction(
    op: Operator,
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    if args.is_empty() {
        return Err(LogicError::arity(op.tag(), "at least 1 argument", 0));
    }
    let mut last = Value::Null;
    for arg in args {
        last = eval(arg, scope, meter, depth)?;
        let decided = match op {
            Operator::And => !last.is_truthy(),
            _ => last.is_truthy(),
        };
        if decided {
            return Ok(last);
        }
    }
    Ok(last)
}

/// `let`: merges evaluated bindings into the data document for the body,
/// new bindings winning on key conflicts.
fn evaluate_let(
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("let", "exactly 2 arguments", args.len()));
    }
    let bindings = match eval(&args[0], scope, meter, depth)? {
        Value::Map(entries) => entries,
        other => {
            return Err(LogicError::type_error_at(
                "let",
                "map of bindings",
                other.type_name(),
                0,
            ));
        }
    };
    let merged = match scope.data {
        Value::Map(existing) => {
            let mut combined = existing.clone();
            combined.extend(bindings);
            Value::Map(combined)
        }
        _ => Value::Map(bindings),
    };
    let inner = EvalScope {
        data: &merged,
        context: scope.context,
    };
    eval(&args[1], inner, meter, depth)
}

fn evaluate_iteration(
    op: Operator,
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity(op.tag(), "exactly 2 arguments", args.len()));
    }
    let items = match eval(&args[0], scope, meter, depth)? {
        Value::Array(items) => items,
        // Iterating anything else behaves as iterating nothing.
        _ => Vec::new(),
    };
    meter.charge_elements(items.len())?;

    let packed = vec![
        Value::Array(items),
        Value::Function(Box::new(args[1].clone())),
    ];
    match op {
        Operator::Map => ops::array::op_map(packed, meter, depth),
        Operator::Filter => ops::array::op_filter(packed, meter, depth),
        Operator::All => ops::array::op_all(packed, meter, depth),
        Operator::Some => ops::array::op_some(packed, meter, depth),
        Operator::None => ops::array::op_none(packed, meter, depth),
        Operator::Find => ops::array::op_find(packed, meter, depth),
        Operator::Count => ops::array::op_count(packed, meter, depth),
        other => Err(LogicError::runtime(format!(
            "operator '{other}' is not an iteration"
        ))),
    }
}

fn evaluate_reduce(
    args: &[Expression],
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    if args.len() != 3 {
        return Err(LogicError::arity("reduce", "exactly 3 arguments", args.len()));
    }
    let items = match eval(&args[0], scope, meter, depth)? {
        Value::Array(items) => items,
        _ => return Ok(Value::Null),
    };
    meter.charge_elements(items.len())?;
    let initial = eval(&args[2], scope, meter, depth)?;
    ops::array::op_reduce(items, &args[1], initial, scope, meter, depth)
}

fn evaluate_var(
    path: &VarPath,
    default: Option<&Value>,
    scope: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let computed;
    let path_str: &str = match path {
        VarPath::Literal(literal) => literal.as_str(),
        VarPath::Dynamic(expr) => {
            computed = match eval(expr, scope, meter, depth + 1)? {
                Value::String(s) => s,
                Value::Int(i) => i.to_string(),
                other => {
                    return Err(LogicError::variable(format!(
                        "dynamic path evaluated to {}, expected string or integer",
                        other.type_name()
                    )));
                }
            };
            computed.as_str()
        }
    };

    if path_str.is_empty() {
        return Ok(scope.context.unwrap_or(scope.data).clone());
    }
    if path_str.ends_with('.') {
        return Ok(default.cloned().unwrap_or(Value::Null));
    }

    let document = combined_document(scope);
    match lookup_path(&document, path_str) {
        Some(found) => Ok(found.clone()),
        None => Ok(default.cloned().unwrap_or(Value::Null)),
    }
}

/// The document `var` paths resolve against. Without a context this is
/// the data itself; with one, arrays concatenate (data first), maps
/// shallow-merge with context winning key conflicts, and any other
/// pairing resolves to the context alone.
pub(crate) fn combined_document<'v>(scope: EvalScope<'v>) -> Cow<'v, Value> {
    let context = match scope.context {
        Some(context) => context,
        None => return Cow::Borrowed(scope.data),
    };
    match (scope.data, context) {
        (Value::Array(data_items), Value::Array(context_items)) => {
            let mut combined = data_items.clone();
            combined.extend(context_items.iter().cloned());
            Cow::Owned(Value::Array(combined))
        }
        (Value::Map(data_entries), Value::Map(context_entries)) => {
            let mut combined = data_entries.clone();
            for (key, value) in context_entries {
                combined.insert(key.clone(), value.clone());
            }
            Cow::Owned(Value::Map(combined))
        }
        _ => Cow::Borrowed(context),
    }
}

/// Walks a dot-separated path through maps and arrays. A key holding
/// `null` resolves; only a segment that fails to resolve returns `None`.
pub(crate) fn lookup_path<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    let mut cursor = document;
    for segment in path.split('.') {
        cursor = match cursor {
            Value::Map(entries) => entries.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cursor)
}
