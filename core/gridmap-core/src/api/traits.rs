//! API 트레이트 정의

use crate::error::{GridError, GridResult};
use crate::model::{EntityKey, EntityKeyMetadata, Tuple, Value};
use std::sync::Arc;

/// 구조체 ↔ 튜플 매핑 트레이트
///
/// Usually generated by `#[derive(Entity)]`.
pub trait Entity: Sized {
    /// Key metadata of the type, built once and shared.
    fn entity_key_metadata() -> Arc<EntityKeyMetadata>;

    fn entity_key(&self) -> GridResult<EntityKey>;

    fn to_tuple(&self) -> Tuple;

    fn from_tuple(tuple: &Tuple) -> GridResult<Self>;
}

/// Rust 값을 Value로 변환하는 트레이트
pub trait IntoValue {
    fn to_value(&self) -> Value;
}

/// 튜플 컬럼에서 Rust 값으로 변환하는 트레이트
///
/// `value` is `None` when the column is absent from the tuple.
pub trait FromValue: Sized {
    fn from_value(value: Option<&Value>) -> GridResult<Self>;
}

fn required<'a>(value: Option<&'a Value>, expected: &str) -> GridResult<&'a Value> {
    match value {
        Some(Value::Null) | None => Err(GridError::TypeMismatch {
            expected: expected.to_string(),
            actual: "Null".to_string(),
        }),
        Some(v) => Ok(v),
    }
}

// 기본 타입 구현
impl IntoValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        required(value, "Boolean")?.as_bool()
    }
}

impl IntoValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl FromValue for i32 {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        let v = required(value, "Int")?.as_i64()?;
        i32::try_from(v).map_err(|_| GridError::TypeMismatch {
            expected: "i32".to_string(),
            actual: format!("Int({v})"),
        })
    }
}

impl IntoValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        required(value, "Int")?.as_i64()
    }
}

impl IntoValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        required(value, "Float")?.as_f64()
    }
}

impl IntoValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        Ok(required(value, "String")?.as_str()?.to_string())
    }
}

impl IntoValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        Ok(required(value, "Bytes")?.as_bytes()?.to_vec())
    }
}

// Option<T> 구현
impl<T: IntoValue> IntoValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Option<&Value>) -> GridResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => Ok(Some(T::from_value(Some(v))?)),
        }
    }
}
