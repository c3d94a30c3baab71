//! Arithmetic operators.
//!
//! Integer operands stay integers for as long as the math is exact:
//! sums, products and differences use checked i64 arithmetic and fall
//! back to f64 only on overflow or when a float operand enters the fold.
//! Division always produces a float. An operand with no numeric form
//! makes the operator yield `Null` rather than an error, except where an
//! explicit arity or division-by-zero rule applies.

use crate::error::LogicError;
use crate::value::Value;

/// A number mid-computation, still tracking whether it is exact.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(i) => Value::Int(i),
            Num::Float(f) => Value::Float(f),
        }
    }
}

fn to_num(value: &Value) -> Option<Num> {
    match value {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Bool(b) => Some(Num::Int(i64::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Num::Int(i));
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(Num::Float)
        }
        Value::Null | Value::Array(_) | Value::Map(_) | Value::Function(_) => None,
    }
}

/// Collapses a float that is integral and inside i64 range back to Int.
fn int_exact(f: f64) -> Option<i64> {
    const MIN: f64 = -9_223_372_036_854_775_808.0;
    const MAX: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f >= MIN && f < MAX {
        Some(f as i64)
    } else {
        None
    }
}

fn collapse(f: f64) -> Value {
    match int_exact(f) {
        Some(i) => Value::Int(i),
        None => Value::Float(f),
    }
}

fn fold(
    operator: &str,
    args: &[Value],
    int_step: impl Fn(i64, i64) -> Option<i64>,
    float_step: impl Fn(f64, f64) -> f64,
) -> Result<Value, LogicError> {
    if args.is_empty() {
        return Err(LogicError::arity(operator, "at least 1 argument", 0));
    }
    let mut acc = match to_num(&args[0]) {
        Some(n) => n,
        None => return Ok(Value::Null),
    };
    for arg in &args[1..] {
        let next = match to_num(arg) {
            Some(n) => n,
            None => return Ok(Value::Null),
        };
        acc = match (acc, next) {
            (Num::Int(a), Num::Int(b)) => match int_step(a, b) {
                Some(exact) => Num::Int(exact),
                None => Num::Float(float_step(a as f64, b as f64)),
            },
            (a, b) => Num::Float(float_step(a.as_f64(), b.as_f64())),
        };
    }
    Ok(acc.into_value())
}

/// `+`: variadic sum. One argument casts it to a number.
pub fn op_add(args: Vec<Value>) -> Result<Value, LogicError> {
    fold("+", &args, i64::checked_add, |a, b| a + b)
}

/// `*`: variadic product.
pub fn op_mul(args: Vec<Value>) -> Result<Value, LogicError> {
    fold("*", &args, i64::checked_mul, |a, b| a * b)
}

/// `-`: binary subtraction, or unary negation with one argument.
pub fn op_sub(args: Vec<Value>) -> Result<Value, LogicError> {
    match args.len() {
        1 => match to_num(&args[0]) {
            Some(Num::Int(i)) => Ok(i
                .checked_neg()
                .map(Value::Int)
                .unwrap_or(Value::Float(-(i as f64)))),
            Some(Num::Float(f)) => Ok(Value::Float(-f)),
            None => Ok(Value::Null),
        },
        2 => fold("-", &args, i64::checked_sub, |a, b| a - b),
        n => Err(LogicError::arity("-", "1 or 2 arguments", n)),
    }
}

/// `/`: always a float, even for exactly dividing integers.
pub fn op_div(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("/", "exactly 2 arguments", args.len()));
    }
    let (numerator, divisor) = match (to_num(&args[0]), to_num(&args[1])) {
        (Some(a), Some(b)) => (a.as_f64(), b.as_f64()),
        _ => return Ok(Value::Null),
    };
    if divisor == 0.0 {
        return Err(LogicError::DivisionByZero);
    }
    Ok(Value::Float(numerator / divisor))
}

/// `%`: remainder, integral when the operands and result allow it.
pub fn op_mod(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("%", "exactly 2 arguments", args.len()));
    }
    let (a, b) = match (to_num(&args[0]), to_num(&args[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(Value::Null),
    };
    if b.as_f64() == 0.0 {
        return Err(LogicError::DivisionByZero);
    }
    match (a, b) {
        // i64::MIN % -1 overflows checked_rem; its remainder is 0.
        (Num::Int(x), Num::Int(y)) => Ok(Value::Int(x.checked_rem(y).unwrap_or(0))),
        _ => Ok(Value::Float(a.as_f64() % b.as_f64())),
    }
}

/// `pow`: integer power when the base is Int and the exponent a
/// non-negative Int that fits, float power otherwise.
pub fn op_pow(args: Vec<Value>) -> Result<Value, LogicError> {
    if args.len() != 2 {
        return Err(LogicError::arity("pow", "exactly 2 arguments", args.len()));
    }
    let (base, exp) = match (to_num(&args[0]), to_num(&args[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(Value::Null),
    };
    if let (Num::Int(b), Num::Int(e)) = (base, exp) {
        if e >= 0 {
            if let Ok(e32) = u32::try_from(e) {
                if let Some(exact) = b.checked_pow(e32) {
                    return Ok(Value::Int(exact));
                }
            }
        }
    }
    Ok(Value::Float(base.as_f64().powf(exp.as_f64())))
}

/// `min`/`max` accept loose argument shapes: scalars, one array, or a
/// mix. One level of arrays is flattened before comparison.
fn extremum(args: Vec<Value>, keep_left: impl Fn(f64, f64) -> bool) -> Result<Value, LogicError> {
    let mut best: Option<Num> = None;
    for arg in &args {
        let elements: &[Value] = match arg {
            Value::Array(items) => items,
            single => std::slice::from_ref(single),
        };
        for element in elements {
            let candidate = match to_num(element) {
                Some(n) => n,
                None => return Ok(Value::Null),
            };
            best = Some(match best {
                // First occurrence wins ties, so replace only on strict order.
                Some(current) if !keep_left(current.as_f64(), candidate.as_f64()) => candidate,
                Some(current) => current,
                None => candidate,
            });
        }
    }
    Ok(best.map(Num::into_value).unwrap_or(Value::Null))
}

pub fn op_min(args: Vec<Value>) -> Result<Value, LogicError> {
    extremum(args, |current, candidate| current <= candidate)
}

pub fn op_max(args: Vec<Value>) -> Result<Value, LogicError> {
    extremum(args, |current, candidate| current >= candidate)
}

fn single_num(operator: &str, args: &[Value]) -> Result<Option<Num>, LogicError> {
    if args.len() != 1 {
        return Err(LogicError::arity(operator, "exactly 1 argument", args.len()));
    }
    Ok(to_num(&args[0]))
}

/// `abs`: magnitude, preserving the operand's numeric type.
pub fn op_abs(args: Vec<Value>) -> Result<Value, LogicError> {
    match single_num("abs", &args)? {
        Some(Num::Int(i)) => Ok(i
            .checked_abs()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(i as f64)))),
        Some(Num::Float(f)) => Ok(Value::Float(f.abs())),
        None => Ok(Value::Null),
    }
}

fn rounding(
    operator: &str,
    args: &[Value],
    round: impl Fn(f64) -> f64,
) -> Result<Value, LogicError> {
    match single_num(operator, args)? {
        Some(Num::Int(i)) => Ok(Value::Int(i)),
        Some(Num::Float(f)) => Ok(collapse(round(f))),
        None => Ok(Value::Null),
    }
}

/// `round`: half away from zero, like `f64::round`.
pub fn op_round(args: Vec<Value>) -> Result<Value, LogicError> {
    rounding("round", &args, f64::round)
}

pub fn op_floor(args: Vec<Value>) -> Result<Value, LogicError> {
    rounding("floor", &args, f64::floor)
}

pub fn op_ceil(args: Vec<Value>) -> Result<Value, LogicError> {
    rounding("ceil", &args, f64::ceil)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_integers() {
        let result = op_add(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn test_add_mixed_goes_float() {
        let result = op_add(vec![Value::Int(1), Value::Float(2.5)]).unwrap();
        assert_eq!(result, Value::Float(3.5));
    }

    #[test]
    fn test_add_overflow_falls_back_to_float() {
        let result = op_add(vec![Value::Int(i64::MAX), Value::Int(1)]).unwrap();
        match result {
            // i64::MAX rounds to 2^63 in f64, and adding 1.0 stays there.
            Value::Float(f) => assert_eq!(f, 9.223372036854776e18),
            other => panic!("expected float fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_add_coerces_strings_and_bools() {
        let result = op_add(vec![Value::from("2"), Value::Bool(true)]).unwrap();
        assert_eq!(result, Value::Int(3));
        assert_eq!(op_add(vec![Value::from(" 4.5 ")]).unwrap(), Value::Float(4.5));
    }

    #[test]
    fn test_non_numeric_operand_yields_null() {
        assert_eq!(op_add(vec![Value::Int(1), Value::Null]).unwrap(), Value::Null);
        assert_eq!(
            op_mul(vec![Value::from("abc"), Value::Int(2)]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(op_sub(vec![Value::Int(5)]).unwrap(), Value::Int(-5));
        assert_eq!(op_sub(vec![Value::Float(1.5)]).unwrap(), Value::Float(-1.5));
        // i64::MIN has no i64 negation.
        match op_sub(vec![Value::Int(i64::MIN)]).unwrap() {
            Value::Float(f) => assert_eq!(f, 9.223372036854776e18),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn test_division_is_always_float() {
        assert_eq!(
            op_div(vec![Value::Int(6), Value::Int(3)]).unwrap(),
            Value::Float(2.0)
        );
        assert!(matches!(
            op_div(vec![Value::Int(1), Value::Int(0)]),
            Err(LogicError::DivisionByZero)
        ));
    }

    #[test]
    fn test_modulo() {
        assert_eq!(
            op_mod(vec![Value::Int(7), Value::Int(3)]).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            op_mod(vec![Value::Int(-7), Value::Int(3)]).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            op_mod(vec![Value::Float(7.5), Value::Float(2.5)]).unwrap(),
            Value::Float(0.0)
        );
        assert_eq!(
            op_mod(vec![Value::Float(7.5), Value::Int(2)]).unwrap(),
            Value::Float(1.5)
        );
        assert!(matches!(
            op_mod(vec![Value::Int(1), Value::Int(0)]),
            Err(LogicError::DivisionByZero)
        ));
    }

    #[test]
    fn test_pow() {
        assert_eq!(
            op_pow(vec![Value::Int(2), Value::Int(10)]).unwrap(),
            Value::Int(1024)
        );
        assert_eq!(
            op_pow(vec![Value::Int(2), Value::Int(-1)]).unwrap(),
            Value::Float(0.5)
        );
        assert_eq!(
            op_pow(vec![Value::Float(4.0), Value::Float(0.5)]).unwrap(),
            Value::Float(2.0)
        );
        // Overflowing integer power degrades to float.
        match op_pow(vec![Value::Int(10), Value::Int(40)]).unwrap() {
            Value::Float(f) => assert_eq!(f, 1e40),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn test_min_max_flatten_one_level() {
        let args = vec![
            Value::Array(vec![Value::Int(3), Value::Int(1)]),
            Value::Int(2),
        ];
        assert_eq!(op_min(args.clone()).unwrap(), Value::Int(1));
        assert_eq!(op_max(args).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_min_max_empty_or_bad_input() {
        assert_eq!(op_min(vec![]).unwrap(), Value::Null);
        assert_eq!(op_min(vec![Value::Array(vec![])]).unwrap(), Value::Null);
        assert_eq!(
            op_max(vec![Value::Int(1), Value::from("x")]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_min_first_occurrence_wins_ties() {
        // Int 1 and Float 1.0 tie numerically; the first stays.
        let args = vec![Value::Float(1.0), Value::Int(1)];
        assert_eq!(op_min(args).unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_rounding_family() {
        assert_eq!(op_round(vec![Value::Float(2.5)]).unwrap(), Value::Int(3));
        assert_eq!(op_round(vec![Value::Float(-2.5)]).unwrap(), Value::Int(-3));
        assert_eq!(op_floor(vec![Value::Float(2.9)]).unwrap(), Value::Int(2));
        assert_eq!(op_ceil(vec![Value::Float(2.1)]).unwrap(), Value::Int(3));
        assert_eq!(op_round(vec![Value::Int(7)]).unwrap(), Value::Int(7));
        // Out of i64 range: stays a float.
        assert_eq!(
            op_floor(vec![Value::Float(1e300)]).unwrap(),
            Value::Float(1e300)
        );
    }

    #[test]
    fn test_abs() {
        assert_eq!(op_abs(vec![Value::Int(-4)]).unwrap(), Value::Int(4));
        assert_eq!(op_abs(vec![Value::Float(-2.5)]).unwrap(), Value::Float(2.5));
        assert_eq!(op_abs(vec![Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_fold_arity() {
        assert!(op_add(vec![]).is_err());
        assert!(op_sub(vec![]).is_err());
        assert!(op_sub(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).is_err());
        assert!(op_div(vec![Value::Int(1)]).is_err());
    }
}
