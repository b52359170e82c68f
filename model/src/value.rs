use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde_json::{Number, Value as JsonValue};

use crate::util::conversion;

/// A single open-record attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Json(JsonValue), // arrays, objects, integers beyond i64
}

impl Value {
    /// Takes a deserialized value as is. Strings stay strings, even when
    /// they happen to look like timestamps.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(value) => Self::Boolean(*value),
            JsonValue::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Self::Integer(integer)
                } else if number.is_f64() {
                    Self::Double(number.as_f64().unwrap_or(f64::NAN))
                } else {
                    Self::Json(value.clone())
                }
            }
            JsonValue::String(value) => Self::String(value.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Self::Json(value.clone()),
        }
    }

    /// A non-finite double has no JSON form and becomes `null`.
    /// [`BaseModel::set`](crate::base::BaseModel::set) refuses those values.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Boolean(value) => JsonValue::Bool(*value),
            Self::Integer(value) => JsonValue::Number((*value).into()),
            Self::Double(value) => match Number::from_f64(*value) {
                Some(number) => JsonValue::Number(number),
                None => JsonValue::Null,
            },
            Self::String(value) => JsonValue::String(value.clone()),
            Self::Timestamp(value) => JsonValue::String(conversion::timestamp_to_iso(value)),
            Self::Json(value) => value.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value:?}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Timestamp(value) => write!(f, "{value:?}"),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}
