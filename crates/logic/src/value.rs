use std::fmt;

use indexmap::IndexMap;

use crate::ast::Expression;

/// Runtime value. A closed union shared by rule expressions and the data
/// documents they evaluate against.
///
/// `Int` and `Float` are distinct tags even when numerically equal: `1` and
/// `1.0` compare unequal under strict equality, and the distinction survives
/// JSON round-tripping. `Function` wraps a deferred expression; it is
/// produced internally while evaluating higher-order operators and is never
/// valid input data.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Function(Box<Expression>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// Boolean-context interpretation, per tag.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Function(_) => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Same-tag, structurally-equal comparison with no numeric coercion.
    /// Functions are never equal, not even to themselves.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.strict_equals(w)))
            }
            _ => false,
        }
    }

    /// Equality with numeric coercion across compatible tags. Equal tags
    /// delegate to strict equality; `Int`/`Float` compare as f64; a numeric
    /// tag compares against a parseable numeric string. Everything else is
    /// unequal, in particular `Null` never loosely equals a non-null.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) => *a as f64 == *b,
            (Value::Float(a), Value::Int(b)) => *a == *b as f64,
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => {
                a.strict_equals(b)
            }
            (Value::Int(_) | Value::Float(_), Value::String(s))
            | (Value::String(s), Value::Int(_) | Value::Float(_)) => {
                let numeric = if let Value::String(_) = self { other } else { self };
                match parse_numeric_string(s) {
                    Some(parsed) => numeric.to_number() == Some(parsed),
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Numeric coercion used by arithmetic and comparisons. Unparsable
    /// strings yield `None` ("no value") rather than an error.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => parse_numeric_string(s),
            _ => None,
        }
    }

    /// String coercion used by `cat`, `join` and friends. Containers with
    /// no sensible text form (maps, functions) coerce to the empty string.
    pub fn to_coerced_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_coerced_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Map(_) | Value::Function(_) => String::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

fn parse_numeric_string(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// `==` is strict equality. Loose equality is only ever an explicit call so
/// tests and callers cannot conflate the two by accident.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coerced_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}
