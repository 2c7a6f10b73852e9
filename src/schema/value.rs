//! Closed set of type tags assigned to JSON values.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Declaration order is the classification precedence and the display order
/// inside a type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl TypeTag {
    /// Classify one value. Numbers written without fraction or exponent are
    /// integers, however many digits they have; nested arrays and objects are
    /// opaque.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => TypeTag::Integer,
            Value::Number(n) if n.to_string().contains(['.', 'e', 'E']) => TypeTag::Float,
            Value::Number(_) => TypeTag::Integer,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_each_json_kind() {
        assert_eq!(TypeTag::of(&json!(null)), TypeTag::Null);
        assert_eq!(TypeTag::of(&json!(false)), TypeTag::Boolean);
        assert_eq!(TypeTag::of(&json!(200)), TypeTag::Integer);
        assert_eq!(TypeTag::of(&json!(-3)), TypeTag::Integer);
        assert_eq!(TypeTag::of(&json!(u64::MAX)), TypeTag::Integer);
        assert_eq!(TypeTag::of(&json!(0.25)), TypeTag::Float);
        assert_eq!(TypeTag::of(&json!("200")), TypeTag::String);
        assert_eq!(TypeTag::of(&json!([1, 2])), TypeTag::Array);
        assert_eq!(TypeTag::of(&json!({"a": 1})), TypeTag::Object);
    }

    #[test]
    fn fractional_literal_is_float() {
        let v: Value = serde_json::from_str("1.0").unwrap();
        assert_eq!(TypeTag::of(&v), TypeTag::Float);
    }

    #[test]
    fn wide_integer_keeps_its_digits() {
        let v: Value = serde_json::from_str("123456789012345678901234").unwrap();
        assert_eq!(TypeTag::of(&v), TypeTag::Integer);
        assert_eq!(v.to_string(), "123456789012345678901234");

        let v: Value = serde_json::from_str("-123456789012345678901234").unwrap();
        assert_eq!(TypeTag::of(&v), TypeTag::Integer);

        let v: Value = serde_json::from_str("1e3").unwrap();
        assert_eq!(TypeTag::of(&v), TypeTag::Float);
    }

    #[test]
    fn ordering_follows_precedence() {
        assert!(TypeTag::Null < TypeTag::Boolean);
        assert!(TypeTag::Integer < TypeTag::Float);
        assert!(TypeTag::String < TypeTag::Array);
        assert!(TypeTag::Array < TypeTag::Object);
    }
}
