//! Operator implementations, grouped by family.
//!
//! Everything here receives already-evaluated argument values. Operators
//! with lazy argument semantics (`if`, `and`, `let`, the higher-order
//! array operators) are driven directly by the engine, which controls
//! when and whether each argument expression runs; their entries in
//! [`apply`] only guard against a dispatch bug.

pub mod arith;
pub mod array;
pub mod compare;
pub mod logic;
pub mod misc;
pub mod object;
pub mod string;

use crate::ast::Operator;
use crate::engine::EvalScope;
use crate::error::LogicError;
use crate::value::Value;

/// Dispatches one eager operator application.
pub(crate) fn apply(op: Operator, args: Vec<Value>, scope: EvalScope) -> Result<Value, LogicError> {
    use Operator::*;
    match op {
        Not => logic::op_not(args),
        NotNot => logic::op_not_not(args),

        Eq => compare::op_eq(args),
        StrictEq => compare::op_strict_eq(args),
        Ne => compare::op_ne(args),
        StrictNe => compare::op_strict_ne(args),
        Lt => compare::op_lt(args),
        Le => compare::op_le(args),
        Gt => compare::op_gt(args),
        Ge => compare::op_ge(args),

        Add => arith::op_add(args),
        Sub => arith::op_sub(args),
        Mul => arith::op_mul(args),
        Div => arith::op_div(args),
        Mod => arith::op_mod(args),
        Max => arith::op_max(args),
        Min => arith::op_min(args),
        Abs => arith::op_abs(args),
        Round => arith::op_round(args),
        Floor => arith::op_floor(args),
        Ceil => arith::op_ceil(args),
        Pow => arith::op_pow(args),

        Merge => array::op_merge(args),
        In => array::op_in(args),
        Intersect => array::op_intersect(args),
        Unique => array::op_unique(args),
        Slice => array::op_slice(args),
        Reverse => array::op_reverse(args),
        Flatten => array::op_flatten(args),

        Cat => string::op_cat(args),
        Substr => string::op_substr(args),
        Lower => string::op_lower(args),
        Upper => string::op_upper(args),
        Join => string::op_join(args),
        Split => string::op_split(args),
        Trim => string::op_trim(args),
        StartsWith => string::op_starts_with(args),
        EndsWith => string::op_ends_with(args),

        Values => object::op_values(args),
        Keys => object::op_keys(args),
        Get => object::op_get(args),
        Has => object::op_has(args),
        Entries => object::op_entries(args),

        Length => misc::op_length(args),
        TypeOf => misc::op_typeof(args),
        Default => misc::op_default(args),
        Noop => misc::op_noop(args),
        Exists => misc::op_exists(args, scope),
        Missing => misc::op_missing(args, scope),
        MissingSome => misc::op_missing_some(args, scope),

        If | And | Or | Let | Map | Filter | Reduce | All | Some | None | Find | Count => {
            Err(LogicError::runtime(format!(
                "operator '{op}' requires lazy evaluation"
            )))
        }
    }
}
