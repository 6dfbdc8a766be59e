//! Expression evaluation.
//!
//! Expressions form a tree the planner can inspect (children, nullability,
//! resolution, type) and the executor can evaluate against a row. Evaluation
//! receives the session explicitly; there is no ambient query state.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::{ExecuteError, ExecuteResult};
use super::generator::Generator;
use super::operators::Row;
use super::session::Session;
use super::types::DataType;

/// Result of evaluating an expression against one row.
pub enum Datum {
    Null,
    Value(Value),
    Generator(Box<dyn Generator>),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Datum::Null
        } else {
            Datum::Value(value)
        }
    }
}

impl fmt::Debug for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "Null"),
            Datum::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Datum::Generator(_) => write!(f, "Generator(..)"),
        }
    }
}

/// An evaluable node in an expression tree.
pub trait Expression: fmt::Display + Send + Sync {
    /// Operands, in order.
    fn children(&self) -> Vec<Arc<dyn Expression>>;

    /// Same expression over new operands. The count must match `children()`.
    fn with_children(&self, children: Vec<Arc<dyn Expression>>) -> ExecuteResult<Arc<dyn Expression>>;

    /// Whether evaluation can produce NULL.
    fn is_nullable(&self) -> bool;

    /// Whether every operand is bound and the expression can be evaluated.
    fn resolved(&self) -> bool;

    fn data_type(&self) -> DataType;

    /// Evaluate against one input row.
    fn eval(&self, session: &Arc<Session>, row: &Row) -> ExecuteResult<Datum>;
}

/// Check a `with_children` call got `expected` operands.
pub fn check_arity(expr: &dyn Expression, children: &[Arc<dyn Expression>], expected: usize) -> ExecuteResult<()> {
    if children.len() != expected {
        return Err(ExecuteError::InvalidChildrenNumber {
            expr: expr.to_string(),
            got: children.len(),
            expected,
        });
    }
    Ok(())
}

/// A constant.
pub struct Literal {
    value: Value,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Arc<dyn Expression> {
        Arc::new(Self { value: value.into() })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other),
        }
    }
}

impl Expression for Literal {
    fn children(&self) -> Vec<Arc<dyn Expression>> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<Arc<dyn Expression>>) -> ExecuteResult<Arc<dyn Expression>> {
        check_arity(self, &children, 0)?;
        Ok(Literal::new(self.value.clone()))
    }

    fn is_nullable(&self) -> bool {
        self.value.is_null()
    }

    fn resolved(&self) -> bool {
        true
    }

    fn data_type(&self) -> DataType {
        DataType::of(&self.value)
    }

    fn eval(&self, _session: &Arc<Session>, _row: &Row) -> ExecuteResult<Datum> {
        Ok(Datum::from(self.value.clone()))
    }
}

/// A reference to a column of the input row.
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Arc<dyn Expression> {
        Arc::new(Self {
            name: name.into(),
            data_type,
            nullable,
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Expression for Column {
    fn children(&self) -> Vec<Arc<dyn Expression>> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<Arc<dyn Expression>>) -> ExecuteResult<Arc<dyn Expression>> {
        check_arity(self, &children, 0)?;
        Ok(Column::new(self.name.clone(), self.data_type.clone(), self.nullable))
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn resolved(&self) -> bool {
        true
    }

    fn data_type(&self) -> DataType {
        self.data_type.clone()
    }

    fn eval(&self, _session: &Arc<Session>, row: &Row) -> ExecuteResult<Datum> {
        row.get(&self.name)
            .cloned()
            .map(Datum::from)
            .ok_or_else(|| ExecuteError::ColumnNotFound(self.name.clone()))
    }
}

/// A placeholder (`?` or `:name`) not yet bound to a value.
pub struct BindVar {
    name: String,
}

impl BindVar {
    pub fn new(name: impl Into<String>) -> Arc<dyn Expression> {
        Arc::new(Self { name: name.into() })
    }
}

impl fmt::Display for BindVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}

impl Expression for BindVar {
    fn children(&self) -> Vec<Arc<dyn Expression>> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<Arc<dyn Expression>>) -> ExecuteResult<Arc<dyn Expression>> {
        check_arity(self, &children, 0)?;
        Ok(BindVar::new(self.name.clone()))
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn resolved(&self) -> bool {
        false
    }

    fn data_type(&self) -> DataType {
        DataType::Null
    }

    fn eval(&self, _session: &Arc<Session>, _row: &Row) -> ExecuteResult<Datum> {
        Err(ExecuteError::Unresolved(self.to_string()))
    }
}

/// Evaluate `expr` and render the result as a string.
///
/// NULL yields `None`. Generators cannot be turned into strings.
pub fn eval_to_string(expr: &dyn Expression, session: &Arc<Session>, row: &Row) -> ExecuteResult<Option<String>> {
    match expr.eval(session, row)? {
        Datum::Null => Ok(None),
        Datum::Value(v) => Ok(Some(value_to_string(&v))),
        Datum::Generator(mut g) => {
            g.close()?;
            Err(ExecuteError::TypeMismatch {
                expected: DataType::Text.to_string(),
                actual: "generator".to_string(),
            })
        }
    }
}

/// Convert JSON value to string.
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        _ => v.to_string(),
    }
}
