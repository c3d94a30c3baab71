//! String operators.
//!
//! Arguments are coerced to text first with [`Value::to_coerced_string`].
//! Positions are counted in characters, not bytes, so multi-byte text
//! slices cleanly.

use crate::error::LogicError;
use crate::value::Value;

/// `cat`: concatenates the coerced text of every argument.
pub fn op_cat(args: Vec<Value>) -> Result<Value, LogicError> {
    let mut out = String::new();
    for arg in &args {
        out.push_str(&arg.to_coerced_string());
    }
    Ok(Value::String(out))
}

/// `substr`: `[text, start, length?]` with JavaScript semantics. A
/// negative start counts from the end; a negative length drops that many
/// characters from the tail instead of taking.
pub fn op_substr(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(LogicError::arity("substr", "2 or 3 arguments", args.len()));
    }
    let text = args[0].to_coerced_string();
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len() as i64;

    let start = match args[1].to_number() {
        Some(n) => n.trunc() as i64,
        None => return Ok(Value::Null),
    };
    let from = clamp_index(start, total);

    let until = match args.get(2) {
        None => total,
        Some(limit) => match limit.to_number() {
            Some(n) => {
                let length = n.trunc() as i64;
                if length < 0 {
                    // Take to the end, then drop |length| characters.
                    (total + length).max(from)
                } else {
                    (from + length).min(total)
                }
            }
            None => return Ok(Value::Null),
        },
    };

    let slice: String = chars[from as usize..until.max(from) as usize].iter().collect();
    Ok(Value::String(slice))
}

fn clamp_index(index: i64, total: i64) -> i64 {
    if index < 0 {
        (total + index).max(0)
    } else {
        index.min(total)
    }
}

/// `join`: `[array, separator?]`, separator defaults to `","`.
pub fn op_join(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.is_empty() || args.len() > 2 {
        return Err(LogicError::arity("join", "1 or 2 arguments", args.len()));
    }
    let separator = args
        .get(1)
        .map(Value::to_coerced_string)
        .unwrap_or_else(|| ",".to_string());
    match &args[0] {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(Value::to_coerced_string).collect();
            Ok(Value::String(parts.join(&separator)))
        }
        other => Err(LogicError::type_error_at("join", "array", other.type_name(), 0)),
    }
}

/// `split`: splits coerced text on a separator. An empty separator
/// yields one string per character.
pub fn op_split(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("split", "exactly 2 arguments", args.len()));
    }
    let text = args[0].to_coerced_string();
    let separator = args[1].to_coerced_string();
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text.split(separator.as_str())
            .map(|p| Value::String(p.to_string()))
            .collect()
    };
    Ok(Value::Array(parts))
}

fn unary_text(operator: &str, args: &[Value]) -> Result<String, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity(operator, "exactly 1 argument", args.len()));
    }
    Ok(args[0].to_coerced_string())
}

pub fn op_trim(args: Vec<Value>) -> Result<Value, LogicError> {
    Ok(Value::String(unary_text("trim", &args)?.trim().to_string()))
}

pub fn op_lower(args: Vec<Value>) -> Result<Value, LogicError> {
    Ok(Value::String(unary_text("lower", &args)?.to_lowercase()))
}

pub fn op_upper(args: Vec<Value>) -> Result<Value, LogicError> {
    Ok(Value::String(unary_text("upper", &args)?.to_uppercase()))
}

fn text_pair(operator: &str, args: &[Value]) -> Result<(String, String), LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity(operator, "exactly 2 arguments", args.len()));
    }
    Ok((args[0].to_coerced_string(), args[1].to_coerced_string()))
}

pub fn op_starts_with(args: Vec<Value>) -> Result<Value, LogicError> {
    let (text, prefix) = text_pair("startsWith", &args)?;
    Ok(Value::Bool(text.starts_with(&prefix)))
}

pub fn op_ends_with(args: Vec<Value>) -> Result<Value, LogicError> {
    let (text, suffix) = text_pair("endsWith", &args)?;
    Ok(Value::Bool(text.ends_with(&suffix)))
}
