//! Single-field query predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::QueryError;
use crate::record::EntityRecord;

/// Maximum number of records a single query returns.
pub const QUERY_MAX_LIMIT: usize = 100;

/// Comparison operator of a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl QueryOp {
    /// The operator's textual form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl FromStr for QueryOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate on one field of a record.
///
/// Numbers compare numerically regardless of their JSON representation, strings
/// and booleans compare naturally. A record without the field never matches, and
/// ordering operators never match values of different types.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// The (possibly dotted) field path.
    pub field: String,
    /// The comparison operator.
    pub op: QueryOp,
    /// The value to compare against.
    pub value: Value,
}

impl FieldFilter {
    /// Create a filter.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyField` if `field` is empty.
    pub fn new(
        field: impl Into<String>,
        op: QueryOp,
        value: impl Into<Value>,
    ) -> Result<Self, QueryError> {
        let field = field.into();
        if field.is_empty() {
            return Err(QueryError::EmptyField);
        }
        Ok(Self {
            field,
            op,
            value: value.into(),
        })
    }

    /// Create an equality filter.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyField` if `field` is empty.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Result<Self, QueryError> {
        Self::new(field, QueryOp::Eq, value)
    }

    /// Check whether a record satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &EntityRecord) -> bool {
        let Some(actual) = record.field(&self.field) else {
            return false;
        };
        let ordering = compare(actual, &self.value);
        match self.op {
            QueryOp::Eq => ordering == Some(Ordering::Equal) || actual == &self.value,
            QueryOp::NotEq => ordering != Some(Ordering::Equal) && actual != &self.value,
            QueryOp::Lt => ordering == Some(Ordering::Less),
            QueryOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            QueryOp::Gt => ordering == Some(Ordering::Greater),
            QueryOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
