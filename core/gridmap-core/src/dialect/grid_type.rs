//! Logical value types and backend-specific type overrides.
//!
//! The engine describes every mapped property with a [`LogicalType`]. A dialect
//! may return a [`GridType`] for a logical type to change how values of that
//! type are written to and read from its backend.

use crate::error::{GridError, GridResult};
use crate::model::Value;
use std::fmt;

/// Engine-side value types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    /// One Unicode scalar, carried as `Value::Int(code point)`
    Character,
    Binary,
    /// 16 raw bytes, carried as `Value::Bytes`
    Uuid,
    /// Milliseconds since the epoch, carried as `Value::Int`
    Timestamp,
    Custom(String),
}

/// Backend serialization for one logical type.
pub trait GridType: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Engine value → value as stored.
    fn to_backend(&self, value: &Value) -> GridResult<Value>;

    /// Stored value → engine value.
    fn from_backend(&self, value: &Value) -> GridResult<Value>;
}

fn mismatch(expected: &str, value: &Value) -> GridError {
    GridError::TypeMismatch {
        expected: expected.to_string(),
        actual: value.type_name().to_string(),
    }
}

/// Stores UUIDs as their canonical hyphenated text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidAsStringType;

impl GridType for UuidAsStringType {
    fn name(&self) -> &str {
        "uuid_as_string"
    }

    fn to_backend(&self, value: &Value) -> GridResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Bytes(b) if b.len() == 16 => {
                let mut text = String::with_capacity(36);
                for (i, byte) in b.iter().enumerate() {
                    if matches!(i, 4 | 6 | 8 | 10) {
                        text.push('-');
                    }
                    text.push_str(&format!("{byte:02x}"));
                }
                Ok(Value::String(text))
            }
            other => Err(mismatch("Bytes(16)", other)),
        }
    }

    fn from_backend(&self, value: &Value) -> GridResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => {
                let hex: String = s.chars().filter(|c| *c != '-').collect();
                if hex.len() != 32 || !hex.is_ascii() {
                    return Err(GridError::Serialization(format!("malformed uuid '{s}'")));
                }
                let bytes = (0..16)
                    .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16))
                    .collect::<Result<Vec<u8>, _>>()
                    .map_err(|e| GridError::Serialization(format!("malformed uuid '{s}': {e}")))?;
                Ok(Value::Bytes(bytes))
            }
            other => Err(mismatch("String", other)),
        }
    }
}

/// Stores characters as one-character strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterAsStringType;

impl GridType for CharacterAsStringType {
    fn name(&self) -> &str {
        "character_as_string"
    }

    fn to_backend(&self, value: &Value) -> GridResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(code) => u32::try_from(*code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::String(c.to_string()))
                .ok_or_else(|| GridError::Serialization(format!("invalid code point {code}"))),
            other => Err(mismatch("Int", other)),
        }
    }

    fn from_backend(&self, value: &Value) -> GridResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Int(c as i64)),
                    _ => Err(GridError::Serialization(format!(
                        "expected a single character, got '{s}'"
                    ))),
                }
            }
            other => Err(mismatch("String", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_text_form() {
        let bytes: Vec<u8> = (0u8..16).collect();
        let stored = UuidAsStringType.to_backend(&Value::Bytes(bytes.clone())).unwrap();
        assert_eq!(
            stored,
            Value::from("00010203-0405-0607-0809-0a0b0c0d0e0f")
        );
        assert_eq!(UuidAsStringType.from_backend(&stored).unwrap(), Value::Bytes(bytes));
    }

    #[test]
    fn uuid_rejects_wrong_length() {
        assert!(UuidAsStringType.to_backend(&Value::Bytes(vec![1, 2])).is_err());
        assert!(UuidAsStringType.from_backend(&Value::from("abc")).is_err());
    }

    #[test]
    fn character_text_form() {
        let stored = CharacterAsStringType.to_backend(&Value::Int('é' as i64)).unwrap();
        assert_eq!(stored, Value::from("é"));
        assert_eq!(
            CharacterAsStringType.from_backend(&stored).unwrap(),
            Value::Int('é' as i64)
        );
        assert!(CharacterAsStringType.from_backend(&Value::from("ab")).is_err());
        assert!(CharacterAsStringType.to_backend(&Value::Int(-1)).is_err());
    }

    #[test]
    fn null_passes_through() {
        assert_eq!(UuidAsStringType.to_backend(&Value::Null).unwrap(), Value::Null);
        assert_eq!(CharacterAsStringType.from_backend(&Value::Null).unwrap(), Value::Null);
    }
}
