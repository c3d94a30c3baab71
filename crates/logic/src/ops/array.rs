//! Array operators, including the higher-order ones.
//!
//! Higher-order operators receive their callback as a [`Value::Function`]
//! wrapping the unevaluated expression. Each element is evaluated in a
//! fresh scope where `var` paths resolve against that element alone;
//! `reduce` instead binds `{"current": .., "accumulator": ..}` as the data
//! and exposes the outer data document as context.

use crate::ast::Expression;
use crate::engine::{self, EvalScope};
use crate::error::LogicError;
use crate::gas::GasMeter;
use crate::value::Value;

fn take_callback(operator: &str, value: Value) -> Result<Box<Expression>, LogicError> {
    match value {
        Value::Function(expr) => Ok(expr),
        other => Err(LogicError::type_error_at(
            operator,
            "function",
            other.type_name(),
            1,
        )),
    }
}

fn take_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn invoke(
    callback: &Expression,
    element: &Value,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let scope = EvalScope {
        data: element,
        context: None,
    };
    engine::eval(callback, scope, meter, depth)
}

pub fn op_map(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("map", args.remove(1))?;
    let items = take_items(args.remove(0));

    let mut results = Vec::with_capacity(items.len());
    for item in &items {
        results.push(invoke(&callback, item, meter, depth)?);
    }
    Ok(Value::Array(results))
}

pub fn op_filter(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("filter", args.remove(1))?;
    let items = take_items(args.remove(0));

    let mut kept = Vec::new();
    for item in items {
        if invoke(&callback, &item, meter, depth)?.is_truthy() {
            kept.push(item);
        }
    }
    Ok(Value::Array(kept))
}

/// `all`: every element satisfies the callback. An empty (or non-array)
/// input is false, unlike `none`.
pub fn op_all(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("all", args.remove(1))?;
    let items = take_items(args.remove(0));

    if items.is_empty() {
        return Ok(Value::Bool(false));
    }
    for item in &items {
        if !invoke(&callback, item, meter, depth)?.is_truthy() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn op_some(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("some", args.remove(1))?;
    let items = take_items(args.remove(0));

    for item in &items {
        if invoke(&callback, item, meter, depth)?.is_truthy() {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub fn op_none(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("none", args.remove(1))?;
    let items = take_items(args.remove(0));

    for item in &items {
        if invoke(&callback, item, meter, depth)?.is_truthy() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// `find`: the first element satisfying the callback, or `Null`.
pub fn op_find(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("find", args.remove(1))?;
    let items = take_items(args.remove(0));

    for item in items {
        if invoke(&callback, &item, meter, depth)?.is_truthy() {
            return Ok(item);
        }
    }
    Ok(Value::Null)
}

/// `count`: how many elements satisfy the callback.
pub fn op_count(
    mut args: Vec<Value>,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let callback = take_callback("count", args.remove(1))?;
    let items = take_items(args.remove(0));

    let mut matched: i64 = 0;
    for item in &items {
        if invoke(&callback, item, meter, depth)?.is_truthy() {
            matched += 1;
        }
    }
    Ok(Value::Int(matched))
}

/// `reduce`: left fold. The caller has already evaluated the collection
/// and initial accumulator and rejected non-array collections.
pub fn op_reduce(
    items: Vec<Value>,
    reducer: &Expression,
    initial: Value,
    outer: EvalScope,
    meter: &mut GasMeter,
    depth: usize,
) -> Result<Value, LogicError> {
    let mut accumulator = initial;
    for item in items {
        let mut frame = indexmap::IndexMap::with_capacity(2);
        frame.insert("current".to_string(), item);
        frame.insert("accumulator".to_string(), accumulator);
        let data = Value::Map(frame);
        let scope = EvalScope {
            data: &data,
            context: Some(outer.data),
        };
        accumulator = engine::eval(reducer, scope, meter, depth)?;
    }
    Ok(accumulator)
}

/// `merge`: concatenates arrays; bare values join as single elements.
pub fn op_merge(args: Vec<Value>) -> Result<Value, LogicError> {
    let mut merged = Vec::new();
    for arg in args {
        match arg {
            Value::Array(items) => merged.extend(items),
            single => merged.push(single),
        }
    }
    Ok(Value::Array(merged))
}

/// `in`: strict membership in an array, or substring containment when
/// the haystack is a string. Any other haystack is simply false.
pub fn op_in(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("in", "exactly 2 arguments", args.len()));
    }
    let found = match &args[1] {
        Value::Array(items) => items.iter().any(|item| item.strict_equals(&args[0])),
        Value::String(haystack) => haystack.contains(&args[0].to_coerced_string()),
        _ => false,
    };
    Ok(Value::Bool(found))
}

/// `intersect`: elements of the first array present in every other,
/// keeping the first array's order and duplicates.
pub fn op_intersect(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.is_empty() {
        return Err(LogicError::arity("intersect", "at least 1 argument", 0));
    }
    let mut sets = Vec::with_capacity(args.len());
    for (position, arg) in args.iter().enumerate() {
        match arg {
            Value::Array(items) => sets.push(items),
            other => {
                return Err(LogicError::type_error_at(
                    "intersect",
                    "array",
                    other.type_name(),
                    position,
                ));
            }
        }
    }
    let (first, rest) = match sets.split_first() {
        Some(split) => split,
        None => return Ok(Value::Array(Vec::new())),
    };
    let common: Vec<Value> = first
        .iter()
        .filter(|candidate| {
            rest.iter()
                .all(|set| set.iter().any(|item| item.strict_equals(candidate)))
        })
        .cloned()
        .collect();
    Ok(Value::Array(common))
}

/// `unique`: strict deduplication, first occurrence kept.
pub fn op_unique(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("unique", "exactly 1 argument", args.len()));
    }
    let items = match args.remove(0) {
        Value::Array(items) => items,
        other => return Err(LogicError::type_error_at("unique", "array", other.type_name(), 0)),
    };
    let mut seen: Vec<Value> = Vec::new();
    for item in items {
        if !seen.iter().any(|kept| kept.strict_equals(&item)) {
            seen.push(item);
        }
    }
    Ok(Value::Array(seen))
}

/// `slice`: `[array, start, end?]` with JavaScript index semantics;
/// negative indices count from the end and out-of-range clamps.
pub fn op_slice(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(LogicError::arity("slice", "2 or 3 arguments", args.len()));
    }
    let end_arg = if args.len() == 3 { Some(args.remove(2)) } else { None };
    let start_arg = args.remove(1);
    let items = match args.remove(0) {
        Value::Array(items) => items,
        other => return Err(LogicError::type_error_at("slice", "array", other.type_name(), 0)),
    };
    let total = items.len() as i64;

    let start = match start_arg.to_number() {
        Some(n) => resolve_index(n.trunc() as i64, total),
        None => return Ok(Value::Null),
    };
    let end = match end_arg {
        None => total,
        Some(value) => match value.to_number() {
            Some(n) => resolve_index(n.trunc() as i64, total),
            None => return Ok(Value::Null),
        },
    };

    if start >= end {
        return Ok(Value::Array(Vec::new()));
    }
    let window = items[start as usize..end as usize].to_vec();
    Ok(Value::Array(window))
}

fn resolve_index(index: i64, total: i64) -> i64 {
    if index < 0 {
        (total + index).max(0)
    } else {
        index.min(total)
    }
}

pub fn op_reverse(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("reverse", "exactly 1 argument", args.len()));
    }
    match args.remove(0) {
        Value::Array(mut items) => {
            items.reverse();
            Ok(Value::Array(items))
        }
        other => Err(LogicError::type_error_at("reverse", "array", other.type_name(), 0)),
    }
}

/// `flatten`: one level only, so `[[1, [2]]]` becomes `[1, [2]]`.
pub fn op_flatten(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("flatten", "exactly 1 argument", args.len()));
    }
    let items = match args.remove(0) {
        Value::Array(items) => items,
        other => return Err(LogicError::type_error_at("flatten", "array", other.type_name(), 0)),
    };
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => flat.extend(inner),
            single => flat.push(single),
        }
    }
    Ok(Value::Array(flat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::Array(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_merge() {
        let result = op_merge(vec![ints(&[1, 2]), Value::Int(3), ints(&[4])]).unwrap();
        assert_eq!(result, ints(&[1, 2, 3, 4]));
        assert_eq!(op_merge(vec![]).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_in_array_is_strict() {
        assert_eq!(
            op_in(vec![Value::Int(2), ints(&[1, 2, 3])]).unwrap(),
            Value::Bool(true)
        );
        // 2 !== 2.0 under strict membership.
        assert_eq!(
            op_in(vec![Value::Float(2.0), ints(&[1, 2, 3])]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            op_in(vec![Value::from("2"), ints(&[1, 2, 3])]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_in_string_is_substring() {
        assert_eq!(
            op_in(vec![Value::from("ell"), Value::from("hello")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            op_in(vec![Value::Int(1), Value::from("x1y")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            op_in(vec![Value::Int(1), Value::Null]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_intersect_keeps_first_order_and_duplicates() {
        let result = op_intersect(vec![
            ints(&[3, 1, 1, 2]),
            ints(&[1, 2, 3]),
            ints(&[3, 1]),
        ])
        .unwrap();
        assert_eq!(result, ints(&[3, 1, 1]));
    }

    #[test]
    fn test_intersect_rejects_non_arrays() {
        let err = op_intersect(vec![ints(&[1]), Value::Int(2)]).unwrap_err();
        match err {
            LogicError::Type {
                operator,
                expected,
                actual,
                argument,
            } => {
                assert_eq!(operator, "intersect");
                assert_eq!(expected, "array");
                assert_eq!(actual, "integer");
                assert_eq!(argument, Some(1));
            }
            other => panic!("expected a type error, got {other:?}"),
        }
        let message = op_unique(vec![Value::Int(7)]).unwrap_err().to_string();
        assert_eq!(message, "Type error in 'unique': expected array, got integer");
    }

    #[test]
    fn test_unique() {
        let mixed = Value::Array(vec![
            Value::Int(1),
            Value::Float(1.0),
            Value::Int(1),
            Value::from("1"),
        ]);
        let result = op_unique(vec![mixed]).unwrap();
        // Int 1, Float 1.0 and "1" are three distinct values strictly.
        assert_eq!(
            result,
            Value::Array(vec![Value::Int(1), Value::Float(1.0), Value::from("1")])
        );
    }

    #[test]
    fn test_slice() {
        let arr = ints(&[0, 1, 2, 3, 4]);
        assert_eq!(
            op_slice(vec![arr.clone(), Value::Int(1), Value::Int(3)]).unwrap(),
            ints(&[1, 2])
        );
        assert_eq!(
            op_slice(vec![arr.clone(), Value::Int(-2)]).unwrap(),
            ints(&[3, 4])
        );
        assert_eq!(
            op_slice(vec![arr.clone(), Value::Int(3), Value::Int(1)]).unwrap(),
            ints(&[])
        );
        assert_eq!(
            op_slice(vec![arr.clone(), Value::Int(0), Value::Int(100)]).unwrap(),
            ints(&[0, 1, 2, 3, 4])
        );
        assert_eq!(
            op_slice(vec![arr, Value::from("x")]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_reverse_and_flatten() {
        assert_eq!(op_reverse(vec![ints(&[1, 2, 3])]).unwrap(), ints(&[3, 2, 1]));

        let nested = Value::Array(vec![
            ints(&[1, 2]),
            Value::Int(3),
            Value::Array(vec![ints(&[4])]),
        ]);
        let result = op_flatten(vec![nested]).unwrap();
        assert_eq!(
            result,
            Value::Array(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                ints(&[4]),
            ])
        );
    }

    #[test]
    fn test_eager_ops_reject_non_array() {
        assert!(op_reverse(vec![Value::Int(1)]).is_err());
        assert!(op_flatten(vec![Value::Null]).is_err());
        assert!(op_unique(vec![Value::from("abc")]).is_err());
        assert!(op_slice(vec![Value::Null, Value::Int(0)]).is_err());
    }
}
