use crate::core::data_type::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Json(serde_json::Value),
    Array(Vec<Value>),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Boolean(v) => Some(i64::from(*v)),
            Value::String(v) => v.parse::<i64>().ok(),
            Value::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Json(v) => v.as_str().map(|s| s.to_string()),
            Value::Timestamp(v) => Some(v.to_string()),
            Value::Array(_) | Value::Null => None,
        }
    }

    /// Column type this value would be stored in.
    ///
    /// Arrays take the type of their first non-null scalar leaf, so
    /// `[[1, 2], [3]]` reports `Array(Long)` and an all-null or empty
    /// array falls back to `Array(String)`.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Long,
            Value::Float(_) => DataType::Double,
            Value::Boolean(_) => DataType::Boolean,
            Value::String(_) => DataType::String,
            Value::Json(_) => DataType::Json,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Array(items) => {
                let element = Self::first_leaf(items)
                    .map(|v| v.data_type())
                    .unwrap_or(DataType::String);
                DataType::Array(Box::new(element))
            }
            Value::Null => DataType::Null,
        }
    }

    fn first_leaf(items: &[Value]) -> Option<&Value> {
        items.iter().find_map(|item| match item {
            Value::Array(inner) => Self::first_leaf(inner),
            Value::Null => None,
            other => Some(other),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Option<Value>,
    pub data_type: DataType,
}

impl FieldValue {
    pub fn new(name: &str, value: Value) -> Self {
        let data_type = value.data_type();
        let value = (!value.is_null()).then_some(value);
        FieldValue {
            name: name.to_string(),
            value,
            data_type,
        }
    }

    pub fn value_data_type(&self) -> Option<DataType> {
        self.value.as_ref().map(|v| v.data_type())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Json(v) => {
                let json_str = v.to_string().replace('\'', "''");
                write!(f, "'{json_str}'")
            }
            Value::Array(items) => {
                let inner = items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "ARRAY[{inner}]")
            }
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    i16 => Int,
    i32 => Int,
    i64 => Int,
    f32 => Float,
    f64 => Float,
    bool => Boolean,
    String => String,
    serde_json::Value => Json,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("eek")), Value::String("eek".into()));
    }

    #[test]
    fn test_nested_array_data_type() {
        let value = Value::from(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(
            value.data_type(),
            DataType::Array(Box::new(DataType::Long))
        );
        assert_eq!(value.data_type().element_type(), &DataType::Long);
    }

    #[test]
    fn test_empty_array_defaults_to_text() {
        let value = Value::Array(vec![Value::Null]);
        assert_eq!(
            value.data_type(),
            DataType::Array(Box::new(DataType::String))
        );
    }

    #[test]
    fn test_field_value_stores_null_as_none() {
        let field = FieldValue::new("data", Value::Null);
        assert!(field.value.is_none());
        assert_eq!(field.data_type, DataType::Null);

        let field = FieldValue::new("data", json!({"feels": "meh"}).into());
        assert_eq!(field.value_data_type(), Some(DataType::Json));
    }
}
