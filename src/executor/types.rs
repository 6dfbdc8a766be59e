//! Data types reported to the planner.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SQL-like data types an expression can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Only ever NULL.
    Null,
    /// Text/string data.
    Text,
    /// Integer numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Boolean values.
    Boolean,
    /// JSON objects or arrays.
    Json,
    /// Sequence of values of one type; generators report this.
    Array(Box<DataType>),
}

impl DataType {
    /// Best-fitting type for a literal value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => DataType::Integer,
            Value::Number(_) => DataType::Float,
            Value::String(_) => DataType::Text,
            Value::Array(_) | Value::Object(_) => DataType::Json,
        }
    }

    /// Get the SQL name for this type.
    pub fn sql_name(&self) -> String {
        match self {
            DataType::Null => "NULL".to_string(),
            DataType::Text => "TEXT".to_string(),
            DataType::Integer => "INTEGER".to_string(),
            DataType::Float => "REAL".to_string(),
            DataType::Boolean => "BOOLEAN".to_string(),
            DataType::Json => "JSON".to_string(),
            DataType::Array(inner) => format!("ARRAY<{}>", inner.sql_name()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_of_literal() {
        assert_eq!(DataType::of(&json!("x")), DataType::Text);
        assert_eq!(DataType::of(&json!(1)), DataType::Integer);
        assert_eq!(DataType::of(&json!(1.5)), DataType::Float);
        assert_eq!(DataType::of(&json!({"a": 1})), DataType::Json);
        assert_eq!(DataType::of(&Value::Null), DataType::Null);
    }

    #[test]
    fn test_array_sql_name() {
        let ty = DataType::Array(Box::new(DataType::Json));
        assert_eq!(ty.to_string(), "ARRAY<JSON>");
    }
}
