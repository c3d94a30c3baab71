//! Equality and ordering operators.
//!
//! Equality comes in a loose form (`==`, numeric cross-type and
//! numeric-string comparison) and a strict form (`===`, no coercion).
//! Ordering operators chain: `["<", 1, 2, 3]` tests `1 < 2 < 3`. Every
//! ordering operand is coerced to f64 first; any operand with no numeric
//! form makes the whole chain false rather than an error, so data-driven
//! comparisons against missing fields degrade to a rejection.

use crate::error::LogicError;
use crate::value::Value;

pub fn op_eq(args: Vec<Value>) -> Result<Value, LogicError> {
    let (a, b) = pair("==", args)?;
    Ok(Value::Bool(a.loose_equals(&b)))
}

pub fn op_strict_eq(args: Vec<Value>) -> Result<Value, LogicError> {
    let (a, b) = pair("===", args)?;
    Ok(Value::Bool(a.strict_equals(&b)))
}

pub fn op_ne(args: Vec<Value>) -> Result<Value, LogicError> {
    let (a, b) = pair("!=", args)?;
    Ok(Value::Bool(!a.loose_equals(&b)))
}

pub fn op_strict_ne(args: Vec<Value>) -> Result<Value, LogicError> {
    let (a, b) = pair("!==", args)?;
    Ok(Value::Bool(!a.strict_equals(&b)))
}

pub fn op_lt(args: Vec<Value>) -> Result<Value, LogicError> {
    chain(args, |a, b| a < b)
}

pub fn op_le(args: Vec<Value>) -> Result<Value, LogicError> {
    chain(args, |a, b| a <= b)
}

pub fn op_gt(args: Vec<Value>) -> Result<Value, LogicError> {
    chain(args, |a, b| a > b)
}

pub fn op_ge(args: Vec<Value>) -> Result<Value, LogicError> {
    chain(args, |a, b| a >= b)
}

fn pair(operator: &str, mut args: Vec<Value>) -> Result<(Value, Value), LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity(operator, "exactly 2 arguments", args.len()));
    }
    let b = args.remove(1);
    let a = args.remove(0);
    Ok((a, b))
}

fn chain(args: Vec<Value>, ordered: impl Fn(f64, f64) -> bool) -> Result<Value, LogicError> {
    if args.len() < 2 {
        return Ok(Value::Bool(true));
    }
    let mut numbers = Vec::with_capacity(args.len());
    for arg in &args {
        match arg.to_number() {
            Some(n) => numbers.push(n),
            None => return Ok(Value::Bool(false)),
        }
    }
    let holds = numbers.windows(2).all(|w| ordered(w[0], w[1]));
    Ok(Value::Bool(holds))
}
