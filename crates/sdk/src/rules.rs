//! Rule validation boundary.
//!
//! A metagraph attaches a rule expression to its data application and
//! every submitted payload must satisfy it before the update is
//! accepted. This module is the only place the SDK touches the
//! expression VM.

use lattice_logic::{
    GasConfig, GasLimit, LogicError, encode_value, evaluate, parse_expression, parse_value,
};
use serde_json::Value as Json;

use crate::error::Result;

/// Outcome of running a rule against a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleVerdict {
    /// The rule produced a truthy value within the gas budget.
    pub accepted: bool,
    /// Gas consumed, whether or not the payload passed.
    pub gas_used: u64,
    /// The rule's result when evaluation completed; `None` on exhaustion.
    pub result: Option<Json>,
}

/// Runs `rule` against `payload` under the given gas configuration.
///
/// Gas exhaustion rejects rather than errors: an expensive payload is a
/// rejected payload, not a broken rule. Parse and type failures do
/// propagate, since those are defects in the rule itself.
pub fn check_rule(
    rule: &Json,
    payload: &Json,
    config: &GasConfig,
    limit: GasLimit,
) -> Result<RuleVerdict> {
    let expression = parse_expression(rule).map_err(LogicError::from)?;
    let data = parse_value(payload);
    match evaluate(&expression, &data, config, limit) {
        Ok(outcome) => {
            let accepted = outcome.value.is_truthy();
            log::debug!(
                "rule verdict: accepted={accepted} gas_used={}",
                outcome.gas_used
            );
            Ok(RuleVerdict {
                accepted,
                gas_used: outcome.gas_used,
                result: Some(encode_value(&outcome.value)),
            })
        }
        Err(LogicError::OutOfGas { used, limit: budget, .. }) => {
            log::debug!("rule verdict: rejected, gas exhausted ({used} used of {budget})");
            Ok(RuleVerdict {
                accepted: false,
                gas_used: used,
                result: None,
            })
        }
        Err(err) => Err(err.into()),
    }
}
