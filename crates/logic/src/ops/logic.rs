//! Boolean coercion operators.

use crate::error::LogicError;
use crate::value::Value;

/// `!`: negated truthiness of the single argument.
pub fn op_not(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("!", "exactly 1 argument", args.len()));
    }
    Ok(Value::Bool(!args.remove(0).is_truthy()))
}

/// `!!`: truthiness of the single argument as a boolean.
pub fn op_not_not(mut args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity("!!", "exactly 1 argument", args.len()));
    }
    Ok(Value::Bool(args.remove(0).is_truthy()))
}
