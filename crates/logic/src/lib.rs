//! A deterministic JSON expression virtual machine with gas metering.
//!
//! Expressions are plain JSON documents in a JsonLogic-style grammar:
//! `{"operator": [args...]}` applies one of a closed set of operators,
//! `{"var": "path"}` reads from the data document, and everything else
//! is literal data. Evaluation is a pure function of the expression, the
//! data, and a gas configuration, so independent validators running the
//! same rule against the same payload always reach the same verdict and
//! the same gas figure.
//!
//! # Key Types
//!
//! - [`Value`]: the data model, with distinct integer and float tags.
//! - [`Expression`] / [`Operator`]: the parsed form of a rule.
//! - [`parse_expression`] / [`encode_expression`]: the JSON codec.
//! - [`evaluate`] / [`evaluate_json`]: metered evaluation entry points.
//! - [`GasConfig`] / [`GasLimit`]: cost profiles and budgets.
//! - [`LogicError`]: every way evaluation can fail.
//!
//! # Example
//!
//! ```
//! use lattice_logic::{evaluate_json, GasConfig, GasLimit};
//! use serde_json::json;
//!
//! let rule = json!({"<": [{"var": "amount"}, 1000]});
//! let payload = json!({"amount": 250});
//! let outcome = evaluate_json(&rule, &payload, &GasConfig::default(), GasLimit(10_000))?;
//! assert_eq!(outcome.result, json!(true));
//! # Ok::<(), lattice_logic::LogicError>(())
//! ```

pub mod ast;
pub mod codec;
pub mod engine;
pub mod error;
pub mod gas;
pub mod ops;
pub mod value;

pub use ast::{Expression, Operator, VarPath};
pub use codec::{encode_expression, encode_value, parse_expression, parse_value};
pub use engine::{EvalScope, Evaluation, JsonEvaluation, evaluate, evaluate_json};
pub use error::{LogicError, ParseError};
pub use gas::{GasConfig, GasExhausted, GasLimit, GasMeter};
pub use value::Value;
