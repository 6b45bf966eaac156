//! Runtime cell values and conversions to field types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CoerceError;

/// A single cell value produced by a cursor.
///
/// This enum covers the scalar shapes a tabular source can hand back. The
/// mapping engine never interprets cells itself; it moves them through
/// [`FromValue`] conversions chosen when a mapper is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp as microseconds since Unix epoch.
    Timestamp(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes reference.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
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

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(*v.as_bytes())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Conversion from a cell [`Value`] to a concrete field type.
///
/// A `Null` cell converts only into `Option<T>` (as `None`) or into
/// [`Value`] itself; every other target rejects nulls instead of inventing
/// a default.
pub trait FromValue: Sized {
    /// Rust type name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Convert an owned cell value.
    fn from_value(value: Value) -> Result<Self, CoerceError>;
}

fn kind_error(requested: &'static str, value: &Value) -> CoerceError {
    CoerceError::Kind {
        requested,
        found: value.kind(),
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(value)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Bool(b) => Ok(b),
            // Integer-backed boolean columns: zero is false.
            Value::Int(i) => Ok(i != 0),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for i8 {
    const TYPE_NAME: &'static str = "i8";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Int(i) => i.try_into().map_err(|_| CoerceError::Range {
                requested: Self::TYPE_NAME,
                value: i.to_string(),
            }),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for i16 {
    const TYPE_NAME: &'static str = "i16";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Int(i) => i.try_into().map_err(|_| CoerceError::Range {
                requested: Self::TYPE_NAME,
                value: i.to_string(),
            }),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Int(i) => i.try_into().map_err(|_| CoerceError::Range {
                requested: Self::TYPE_NAME,
                value: i.to_string(),
            }),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            Value::Int(i) => Ok(i as f32),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for Uuid {
    const TYPE_NAME: &'static str = "Uuid";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Uuid(bytes) => Ok(Uuid::from_bytes(bytes)),
            Value::Bytes(b) => {
                Uuid::from_slice(&b).map_err(|e| CoerceError::Parse {
                    requested: Self::TYPE_NAME,
                    message: e.to_string(),
                })
            }
            Value::Text(s) => Uuid::parse_str(&s).map_err(|e| CoerceError::Parse {
                requested: Self::TYPE_NAME,
                message: e.to_string(),
            }),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for OffsetDateTime {
    const TYPE_NAME: &'static str = "OffsetDateTime";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            // Integer cells are interpreted as microseconds since the epoch,
            // the same convention Timestamp carries explicitly.
            Value::Timestamp(micros) | Value::Int(micros) => {
                OffsetDateTime::from_unix_timestamp_nanos(micros as i128 * 1_000).map_err(|_| {
                    CoerceError::Range {
                        requested: Self::TYPE_NAME,
                        value: micros.to_string(),
                    }
                })
            }
            Value::Text(s) => {
                OffsetDateTime::parse(&s, &Rfc3339).map_err(|e| CoerceError::Parse {
                    requested: Self::TYPE_NAME,
                    message: e.to_string(),
                })
            }
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for Decimal {
    const TYPE_NAME: &'static str = "Decimal";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(s) => s.parse::<Decimal>().map_err(|e| CoerceError::Parse {
                requested: Self::TYPE_NAME,
                message: e.to_string(),
            }),
            Value::Int(i) => Ok(Decimal::from(i)),
            Value::Float(f) => Decimal::try_from(f).map_err(|e| CoerceError::Parse {
                requested: Self::TYPE_NAME,
                message: e.to_string(),
            }),
            other => Err(kind_error(Self::TYPE_NAME, &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_i64(), Some(42));
        assert_eq!(Value::Int(42).as_f64(), Some(42.0)); // Widening conversion

        assert_eq!(Value::Text("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Bytes(vec![1, 2, 3]).as_bytes(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn test_value_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Int(1).kind(), "int");
        assert_eq!(Value::Uuid([0; 16]).kind(), "uuid");
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(i8::from_value(Value::Int(127)), Ok(127));
        assert!(matches!(
            i8::from_value(Value::Int(128)),
            Err(CoerceError::Range { requested: "i8", .. })
        ));
        assert_eq!(i16::from_value(Value::Int(-32768)), Ok(-32768));
        assert_eq!(i32::from_value(Value::Int(1 << 20)), Ok(1 << 20));
        assert!(matches!(
            i32::from_value(Value::Int(i64::MAX)),
            Err(CoerceError::Range { .. })
        ));
    }

    #[test]
    fn test_bool_from_integer_cell() {
        assert_eq!(bool::from_value(Value::Int(0)), Ok(false));
        assert_eq!(bool::from_value(Value::Int(3)), Ok(true));
        assert!(bool::from_value(Value::Text("yes".into())).is_err());
    }

    #[test]
    fn test_null_rejected_for_non_optional() {
        let err = String::from_value(Value::Null).unwrap_err();
        assert!(matches!(
            err,
            CoerceError::Kind {
                requested: "String",
                found: "null",
            }
        ));
    }

    #[test]
    fn test_option_absorbs_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(7)), Ok(Some(7)));
        assert!(Option::<i64>::from_value(Value::Text("x".into())).is_err());
    }

    #[test]
    fn test_uuid_from_text_and_bytes() {
        let id = Uuid::from_bytes([7; 16]);
        assert_eq!(Uuid::from_value(Value::Uuid([7; 16])), Ok(id));
        assert_eq!(Uuid::from_value(Value::Bytes(vec![7; 16])), Ok(id));
        assert_eq!(
            Uuid::from_value(Value::Text(id.to_string())),
            Ok(id)
        );
        assert!(Uuid::from_value(Value::Bytes(vec![7; 4])).is_err());
    }

    #[test]
    fn test_datetime_from_micros_and_text() {
        let micros = 1_704_067_200_000_000_i64; // 2024-01-01 00:00:00 UTC
        let dt = OffsetDateTime::from_value(Value::Timestamp(micros)).unwrap();
        assert_eq!(dt.year(), 2024);
        let same = OffsetDateTime::from_value(Value::Int(micros)).unwrap();
        assert_eq!(dt, same);

        let parsed =
            OffsetDateTime::from_value(Value::Text("2024-01-01T00:00:00Z".into())).unwrap();
        assert_eq!(parsed, dt);
    }

    #[test]
    fn test_decimal_sources() {
        assert_eq!(
            Decimal::from_value(Value::Text("12.50".into())),
            Ok(Decimal::new(1250, 2))
        );
        assert_eq!(Decimal::from_value(Value::Int(3)), Ok(Decimal::from(3)));
        assert!(Decimal::from_value(Value::Bytes(vec![1])).is_err());
    }
}
