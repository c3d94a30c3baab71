use std::fmt;

use indexmap::IndexMap;

use crate::value::Value;

/// Parsed rule expression. Immutable after parsing; evaluated any number of
/// times against different data documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value, returned as-is regardless of data.
    Const(Value),
    /// A data lookup by dot-separated path with an optional fallback.
    Var {
        path: VarPath,
        default: Option<Value>,
    },
    /// An array whose elements are themselves expressions.
    Array(Vec<Expression>),
    /// An object whose values are themselves expressions.
    Map(IndexMap<String, Expression>),
    /// An operator invocation with ordered argument expressions.
    Apply {
        op: Operator,
        args: Vec<Expression>,
    },
}

/// The path of a `Var`: either a literal dot path known at parse time, or an
/// expression computing the path at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum VarPath {
    Literal(String),
    Dynamic(Box<Expression>),
}

/// The closed operator set, seven families. Dispatch is an exhaustive match
/// everywhere, so adding a tag is a compile error until every site handles
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // control flow
    If,
    Default,
    Let,
    Noop,
    // logical
    Not,
    NotNot,
    And,
    Or,
    // comparison
    Eq,
    StrictEq,
    Ne,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Max,
    Min,
    Abs,
    Round,
    Floor,
    Ceil,
    Pow,
    // array
    Map,
    Filter,
    Reduce,
    Merge,
    All,
    Some,
    None,
    Find,
    Count,
    In,
    Intersect,
    Unique,
    Slice,
    Reverse,
    Flatten,
    // string
    Cat,
    Substr,
    Lower,
    Upper,
    Join,
    Split,
    Trim,
    StartsWith,
    EndsWith,
    // object
    Values,
    Keys,
    Get,
    Has,
    Entries,
    // utility
    Length,
    Exists,
    Missing,
    MissingSome,
    TypeOf,
}

impl Operator {
    pub const ALL: [Operator; 62] = [
        Operator::If,
        Operator::Default,
        Operator::Let,
        Operator::Noop,
        Operator::Not,
        Operator::NotNot,
        Operator::And,
        Operator::Or,
        Operator::Eq,
        Operator::StrictEq,
        Operator::Ne,
        Operator::StrictNe,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Max,
        Operator::Min,
        Operator::Abs,
        Operator::Round,
        Operator::Floor,
        Operator::Ceil,
        Operator::Pow,
        Operator::Map,
        Operator::Filter,
        Operator::Reduce,
        Operator::Merge,
        Operator::All,
        Operator::Some,
        Operator::None,
        Operator::Find,
        Operator::Count,
        Operator::In,
        Operator::Intersect,
        Operator::Unique,
        Operator::Slice,
        Operator::Reverse,
        Operator::Flatten,
        Operator::Cat,
        Operator::Substr,
        Operator::Lower,
        Operator::Upper,
        Operator::Join,
        Operator::Split,
        Operator::Trim,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Values,
        Operator::Keys,
        Operator::Get,
        Operator::Has,
        Operator::Entries,
        Operator::Length,
        Operator::Exists,
        Operator::Missing,
        Operator::MissingSome,
        Operator::TypeOf,
    ];

    pub fn from_tag(tag: &str) -> Option<Operator> {
        let op = match tag {
            "if" => Operator::If,
            "default" => Operator::Default,
            "let" => Operator::Let,
            "noop" => Operator::Noop,
            "!" => Operator::Not,
            "!!" => Operator::NotNot,
            "and" => Operator::And,
            "or" => Operator::Or,
            "==" => Operator::Eq,
            "===" => Operator::StrictEq,
            "!=" => Operator::Ne,
            "!==" => Operator::StrictNe,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "%" => Operator::Mod,
            "max" => Operator::Max,
            "min" => Operator::Min,
            "abs" => Operator::Abs,
            "round" => Operator::Round,
            "floor" => Operator::Floor,
            "ceil" => Operator::Ceil,
            "pow" => Operator::Pow,
            "map" => Operator::Map,
            "filter" => Operator::Filter,
            "reduce" => Operator::Reduce,
            "merge" => Operator::Merge,
            "all" => Operator::All,
            "some" => Operator::Some,
            "none" => Operator::None,
            "find" => Operator::Find,
            "count" => Operator::Count,
            "in" => Operator::In,
            "intersect" => Operator::Intersect,
            "unique" => Operator::Unique,
            "slice" => Operator::Slice,
            "reverse" => Operator::Reverse,
            "flatten" => Operator::Flatten,
            "cat" => Operator::Cat,
            "substr" => Operator::Substr,
            "lower" => Operator::Lower,
            "upper" => Operator::Upper,
            "join" => Operator::Join,
            "split" => Operator::Split,
            "trim" => Operator::Trim,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "values" => Operator::Values,
            "keys" => Operator::Keys,
            "get" => Operator::Get,
            "has" => Operator::Has,
            "entries" => Operator::Entries,
            "length" => Operator::Length,
            "exists" => Operator::Exists,
            "missing" => Operator::Missing,
            "missing_some" => Operator::MissingSome,
            "typeof" => Operator::TypeOf,
            _ => return None,
        };
        Some(op)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Operator::If => "if",
            Operator::Default => "default",
            Operator::Let => "let",
            Operator::Noop => "noop",
            Operator::Not => "!",
            Operator::NotNot => "!!",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Eq => "==",
            Operator::StrictEq => "===",
            Operator::Ne => "!=",
            Operator::StrictNe => "!==",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Max => "max",
            Operator::Min => "min",
            Operator::Abs => "abs",
            Operator::Round => "round",
            Operator::Floor => "floor",
            Operator::Ceil => "ceil",
            Operator::Pow => "pow",
            Operator::Map => "map",
            Operator::Filter => "filter",
            Operator::Reduce => "reduce",
            Operator::Merge => "merge",
            Operator::All => "all",
            Operator::Some => "some",
            Operator::None => "none",
            Operator::Find => "find",
            Operator::Count => "count",
            Operator::In => "in",
            Operator::Intersect => "intersect",
            Operator::Unique => "unique",
            Operator::Slice => "slice",
            Operator::Reverse => "reverse",
            Operator::Flatten => "flatten",
            Operator::Cat => "cat",
            Operator::Substr => "substr",
            Operator::Lower => "lower",
            Operator::Upper => "upper",
            Operator::Join => "join",
            Operator::Split => "split",
            Operator::Trim => "trim",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Values => "values",
            Operator::Keys => "keys",
            Operator::Get => "get",
            Operator::Has => "has",
            Operator::Entries => "entries",
            Operator::Length => "length",
            Operator::Exists => "exists",
            Operator::Missing => "missing",
            Operator::MissingSome => "missing_some",
            Operator::TypeOf => "typeof",
        }
    }

    /// Special forms that control their own sub-evaluation instead of
    /// receiving eagerly evaluated arguments.
    pub fn is_lazy(self) -> bool {
        matches!(
            self,
            Operator::If
                | Operator::And
                | Operator::Or
                | Operator::Let
                | Operator::Map
                | Operator::Filter
                | Operator::Reduce
                | Operator::All
                | Operator::Some
                | Operator::None
                | Operator::Find
                | Operator::Count
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_tag(op.tag()), Some(op), "tag {}", op.tag());
        }
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert_eq!(Operator::from_tag("var"), None);
        assert_eq!(Operator::from_tag("IF"), None);
        assert_eq!(Operator::from_tag(""), None);
        assert_eq!(Operator::from_tag("starts_with"), None);
    }

    #[test]
    fn test_lazy_set() {
        let lazy: Vec<_> = Operator::ALL.iter().filter(|op| op.is_lazy()).collect();
        assert_eq!(lazy.len(), 12);
        assert!(Operator::If.is_lazy());
        assert!(Operator::Reduce.is_lazy());
        assert!(!Operator::Default.is_lazy());
        assert!(!Operator::Merge.is_lazy());
    }

    #[test]
    fn test_distinct_tags() {
        let mut seen = std::collections::HashSet::new();
        for op in Operator::ALL {
            assert!(seen.insert(op.tag()), "duplicate tag {}", op.tag());
        }
        assert_eq!(seen.len(), Operator::ALL.len());
    }
}
