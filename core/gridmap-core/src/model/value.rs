//! Storage-native column values.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value as a backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// 타입 이름 (에러 메시지용)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> GridResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch("Boolean")),
        }
    }

    pub fn as_i64(&self) -> GridResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => Err(self.mismatch("Int")),
        }
    }

    pub fn as_f64(&self) -> GridResult<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            _ => Err(self.mismatch("Float")),
        }
    }

    pub fn as_str(&self) -> GridResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch("String")),
        }
    }

    pub fn as_bytes(&self) -> GridResult<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            _ => Err(self.mismatch("Bytes")),
        }
    }

    fn mismatch(&self, expected: &str) -> GridError {
        GridError::TypeMismatch {
            expected: expected.to_string(),
            actual: self.type_name().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert!(Value::Boolean(true).as_bool().unwrap());
        assert_eq!(Value::Int(7).as_i64().unwrap(), 7);
        assert_eq!(Value::from("x").as_str().unwrap(), "x");
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes().unwrap(), &[1, 2]);
    }

    #[test]
    fn accessor_mismatch_reports_types() {
        let err = Value::Int(1).as_str().unwrap_err();
        match err {
            GridError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "String");
                assert_eq!(actual, "Int");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Value::from("bob").to_string(), "\"bob\"");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
