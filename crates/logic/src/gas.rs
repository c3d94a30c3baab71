//! Gas accounting for expression evaluation.
//!
//! Every node charges its operator class cost plus a depth penalty before
//! any of its children run, so an out-of-gas abort can never happen after
//! a subtree already produced work the budget did not cover. Collection
//! operators charge an additional per-element surcharge once the input
//! size is known.
//!
//! Costs live in a [`GasConfig`] passed to every evaluation. There is no
//! global or default-in-ambient config: callers state their profile each
//! time, which keeps replays of historic expressions pinned to the profile
//! they were accepted under.

use crate::ast::Operator;
use crate::error::LogicError;

/// Cost profile for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasConfig {
    /// Control flow, logic, comparison, and small utility operators.
    pub simple: u64,
    /// Arithmetic operators.
    pub numeric: u64,
    /// Operators that walk arrays, strings, or maps.
    pub collection: u64,
    /// Operators with superlinear or allocation-heavy behavior.
    pub expensive: u64,
    /// Added per nesting level: cost of a node at depth d includes
    /// `depth_penalty * d`.
    pub depth_penalty: u64,
    /// Added per element when a collection operator learns its input size.
    pub size_surcharge: u64,
    /// Hard bound on expression nesting. Exceeding it fails with
    /// [`LogicError::DepthLimit`] regardless of remaining gas.
    pub max_depth: usize,
}

impl GasConfig {
    /// Flat, nearly-free costs for tests and local tooling. Depth is still
    /// bounded.
    pub fn development() -> Self {
        GasConfig {
            simple: 1,
            numeric: 1,
            collection: 1,
            expensive: 2,
            depth_penalty: 0,
            size_surcharge: 0,
            max_depth: 256,
        }
    }

    /// Costs for consensus validation, where expressions come from
    /// untrusted third parties.
    pub fn mainnet() -> Self {
        GasConfig {
            simple: 1,
            numeric: 2,
            collection: 3,
            expensive: 20,
            depth_penalty: 2,
            size_surcharge: 1,
            max_depth: 64,
        }
    }

    /// Base cost of one operator application, before depth and size.
    pub fn operator_cost(&self, op: Operator) -> u64 {
        use Operator::*;
        match op {
            // Superlinear: pow grows its result, unique is quadratic,
            // split and reduce allocate per element.
            Pow | Unique | Split | Reduce => self.expensive,
            Add | Sub | Mul | Div | Mod | Max | Min | Abs | Round | Floor | Ceil => self.numeric,
            Map | Filter | Merge | All | Some | None | Find | Count | In | Intersect | Slice
            | Reverse | Flatten | Cat | Substr | Lower | Upper | Join | Trim | StartsWith
            | EndsWith | Values | Keys | Get | Has | Entries | Length => self.collection,
            If | Default | Let | Noop | Not | NotNot | And | Or | Eq | StrictEq | Ne | StrictNe
            | Lt | Le | Gt | Ge | Exists | Missing | MissingSome | TypeOf => self.simple,
        }
    }

    /// Depth penalty for a node at the given nesting level.
    pub fn depth_cost(&self, depth: usize) -> u64 {
        self.depth_penalty.saturating_mul(depth as u64)
    }

    /// Surcharge for a collection operator over `len` elements.
    pub fn size_cost(&self, len: usize) -> u64 {
        self.size_surcharge.saturating_mul(len as u64)
    }
}

impl Default for GasConfig {
    /// Moderate costs suitable for pre-submission checks.
    fn default() -> Self {
        GasConfig {
            simple: 1,
            numeric: 1,
            collection: 2,
            expensive: 5,
            depth_penalty: 1,
            size_surcharge: 1,
            max_depth: 128,
        }
    }
}

/// Remaining gas, consumed functionally: [`GasLimit::consume`] returns the
/// reduced limit or the exact shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GasLimit(pub u64);

impl GasLimit {
    /// Effectively unmetered. Depth limits still apply.
    pub const MAX: GasLimit = GasLimit(u64::MAX);

    pub fn consume(self, cost: u64) -> Result<GasLimit, GasExhausted> {
        match self.0.checked_sub(cost) {
            Some(rest) => Ok(GasLimit(rest)),
            None => Err(GasExhausted {
                required: cost,
                remaining: self.0,
            }),
        }
    }
}

impl From<u64> for GasLimit {
    fn from(raw: u64) -> Self {
        GasLimit(raw)
    }
}

/// A consume that did not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasExhausted {
    pub required: u64,
    pub remaining: u64,
}

/// Mutable meter threaded through one evaluation. Tracks spend against the
/// initial limit and converts shortfalls into [`LogicError::OutOfGas`].
#[derive(Debug)]
pub struct GasMeter<'a> {
    config: &'a GasConfig,
    limit: GasLimit,
    remaining: GasLimit,
    used: u64,
}

impl<'a> GasMeter<'a> {
    pub fn new(config: &'a GasConfig, limit: GasLimit) -> Self {
        GasMeter {
            config,
            limit,
            remaining: limit,
            used: 0,
        }
    }

    pub fn config(&self) -> &GasConfig {
        self.config
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.remaining.0
    }

    /// Charges one operator application at the given depth.
    pub fn charge_operator(&mut self, op: Operator, depth: usize) -> Result<(), LogicError> {
        let cost = self
            .config
            .operator_cost(op)
            .saturating_add(self.config.depth_cost(depth));
        self.charge(cost)
    }

    /// Charges the per-element surcharge for a known input size.
    pub fn charge_elements(&mut self, len: usize) -> Result<(), LogicError> {
        self.charge(self.config.size_cost(len))
    }

    fn charge(&mut self, cost: u64) -> Result<(), LogicError> {
        match self.remaining.consume(cost) {
            Ok(rest) => {
                self.remaining = rest;
                self.used = self.used.saturating_add(cost);
                Ok(())
            }
            Err(exhausted) => Err(LogicError::OutOfGas {
                used: self.used,
                limit: self.limit.0,
                required: exhausted.required,
                remaining: exhausted.remaining,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_reduces_or_reports_shortfall() {
        let limit = GasLimit(10);
        let rest = limit.consume(4).expect("within budget");
        assert_eq!(rest, GasLimit(6));

        let exhausted = rest.consume(7).expect_err("beyond budget");
        assert_eq!(
            exhausted,
            GasExhausted {
                required: 7,
                remaining: 6
            }
        );
        // A failed consume leaves the original untouched.
        assert_eq!(rest, GasLimit(6));
    }

    #[test]
    fn test_exact_spend_reaches_zero() {
        let rest = GasLimit(5).consume(5).expect("exact spend");
        assert_eq!(rest, GasLimit(0));
        assert!(rest.consume(1).is_err());
        assert!(rest.consume(0).is_ok());
    }

    #[test]
    fn test_meter_accumulates_used() {
        let config = GasConfig::development();
        let mut meter = GasMeter::new(&config, GasLimit(100));
        meter
            .charge_operator(Operator::Add, 0)
            .expect("cheap charge");
        meter
            .charge_operator(Operator::Pow, 3)
            .expect("still within limit");
        assert_eq!(meter.used(), 3);
        assert_eq!(meter.remaining(), 97);
    }

    #[test]
    fn test_meter_out_of_gas_carries_budget() {
        let config = GasConfig::mainnet();
        let mut meter = GasMeter::new(&config, GasLimit(2));
        let err = meter
            .charge_operator(Operator::Pow, 0)
            .expect_err("pow exceeds budget");
        match err {
            LogicError::OutOfGas {
                used,
                limit,
                required,
                remaining,
            } => {
                assert_eq!(used, 0);
                assert_eq!(limit, 2);
                assert_eq!(required, config.expensive);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected OutOfGas, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_penalty_scales_with_depth() {
        let config = GasConfig::mainnet();
        let flat = config.operator_cost(Operator::Eq) + config.depth_cost(0);
        let deep = config.operator_cost(Operator::Eq) + config.depth_cost(10);
        assert_eq!(deep - flat, config.depth_penalty * 10);
    }

    #[test]
    fn test_profiles_order_by_strictness() {
        let dev = GasConfig::development();
        let default = GasConfig::default();
        let mainnet = GasConfig::mainnet();
        assert!(dev.expensive <= default.expensive);
        assert!(default.expensive <= mainnet.expensive);
        assert!(dev.max_depth >= default.max_depth);
        assert!(default.max_depth >= mainnet.max_depth);
    }

    #[test]
    fn test_operator_classes() {
        let config = GasConfig::mainnet();
        assert_eq!(config.operator_cost(Operator::If), config.simple);
        assert_eq!(config.operator_cost(Operator::Mul), config.numeric);
        assert_eq!(config.operator_cost(Operator::Map), config.collection);
        assert_eq!(config.operator_cost(Operator::Unique), config.expensive);
        assert_eq!(config.operator_cost(Operator::Reduce), config.expensive);
    }

    #[test]
    fn test_size_cost_zero_when_disabled() {
        let config = GasConfig::development();
        assert_eq!(config.size_cost(1_000_000), 0);
        let mainnet = GasConfig::mainnet();
        assert_eq!(mainnet.size_cost(100), 100);
    }
}
