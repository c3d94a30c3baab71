use thiserror::Error;

/// Static defect in the expression JSON, raised by the codec before any
/// evaluation happens.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error in {fragment}: {message}")]
pub struct ParseError {
    pub fragment: String,
    pub message: String,
}

impl ParseError {
    pub fn new(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            message: message.into(),
        }
    }
}

/// Evaluation-time failure. The first error raised anywhere in a subtree
/// aborts that subtree and propagates unchanged.
#[derive(Error, Debug, Clone)]
pub enum LogicError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Type error in '{operator}': expected {expected}, got {actual}")]
    Type {
        operator: String,
        expected: String,
        actual: String,
        argument: Option<usize>,
    },

    #[error("Operator '{operator}' expected {expected} arguments, got {actual}")]
    Arity {
        operator: String,
        expected: String,
        actual: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Cannot resolve variable: {0}")]
    VariableNotFound(String),

    #[error("Out of gas: needed {required} with {remaining} remaining ({used} used of {limit})")]
    OutOfGas {
        used: u64,
        limit: u64,
        required: u64,
        remaining: u64,
    },

    #[error("Expression nesting depth {depth} exceeds the configured maximum {max}")]
    DepthLimit { depth: usize, max: usize },

    #[error("Runtime error: {message}")]
    Runtime {
        message: String,
        cause: Option<Box<LogicError>>,
    },
}

impl LogicError {
    pub fn type_error(
        operator: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Type {
            operator: operator.into(),
            expected: expected.into(),
            actual: actual.into(),
            argument: None,
        }
    }

    pub fn type_error_at(
        operator: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        argument: usize,
    ) -> Self {
        Self::Type {
            operator: operator.into(),
            expected: expected.into(),
            actual: actual.into(),
            argument: Some(argument),
        }
    }

    pub fn arity(
        operator: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        Self::Arity {
            operator: operator.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn variable(message: impl Into<String>) -> Self {
        Self::VariableNotFound(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            cause: None,
        }
    }

    pub fn runtime_with_cause(message: impl Into<String>, cause: LogicError) -> Self {
        Self::Runtime {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}
