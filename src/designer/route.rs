//! Conditional branches for router and decision nodes.

use crate::designer::node::DataType;
use crate::designer::pipeline::NodeHandle;
use crate::error::{DesignError, Result};
use serde_json::{json, Value};

/// What a route inspects on the incoming value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Branch on the data type of the input.
    CheckType,
    /// Branch on the input value itself.
    CheckValue,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::CheckType => "checkType",
            RouteKind::CheckValue => "checkValue",
        }
    }
}

/// Comparison applied between the route's value and the incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOperation {
    Equal,
    Different,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contain,
    NotContain,
}

impl RouteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteOperation::Equal => "equal",
            RouteOperation::Different => "different",
            RouteOperation::GreaterThan => "greaterThan",
            RouteOperation::GreaterThanOrEqual => "greaterThanOrEqual",
            RouteOperation::LessThan => "lessThan",
            RouteOperation::LessThanOrEqual => "lessThanOrEqual",
            RouteOperation::Contain => "contain",
            RouteOperation::NotContain => "notContain",
        }
    }
}

/// The comparison operand: a data type for `CheckType` routes, an arbitrary
/// JSON literal for `CheckValue` routes.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteValue {
    Type(DataType),
    Literal(Value),
}

impl RouteValue {
    pub(crate) fn wire(&self) -> Value {
        match self {
            RouteValue::Type(t) => json!(t.as_str()),
            RouteValue::Literal(v) => v.clone(),
        }
    }
}

/// A conditional edge used by router and decision nodes.
///
/// Node references in `path` are resolved to integer positions exactly once,
/// at construction. A built route never re-resolves, so re-labeling or
/// further graph edits cannot shift it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub value: RouteValue,
    pub path: Vec<usize>,
    pub operation: RouteOperation,
    pub kind: RouteKind,
}

impl Route {
    /// A type-dispatch route: taken when the input's data type equals `value`.
    pub fn check_type(value: DataType, path: &[NodeHandle]) -> Result<Self> {
        Self::build(RouteValue::Type(value), RouteOperation::Equal, RouteKind::CheckType, path)
    }

    /// A value-comparison route with an explicit operation.
    pub fn check_value(value: impl Into<Value>, operation: RouteOperation, path: &[NodeHandle]) -> Result<Self> {
        Self::build(RouteValue::Literal(value.into()), operation, RouteKind::CheckValue, path)
    }

    fn build(
        value: RouteValue,
        operation: RouteOperation,
        kind: RouteKind,
        path: &[NodeHandle],
    ) -> Result<Self> {
        if path.is_empty() {
            return Err(DesignError::Precondition("route path must not be empty".into()));
        }
        Ok(Self {
            value,
            path: path.iter().map(|h| h.position()).collect(),
            operation,
            kind,
        })
    }

    pub(crate) fn wire(&self) -> Value {
        json!({
            "value": self.value.wire(),
            "path": self.path,
            "operation": self.operation.as_str(),
            "type": self.kind.as_str(),
        })
    }
}
