use crate::core::errors::ModelError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DataType {
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    VarChar,
    Char,
    Json,
    Timestamp,
    Null,
    Array(Box<DataType>),
}

lazy_static! {
    static ref POSTGRES_TYPE_MAP: HashMap<&'static str, DataType> = build_postgres_type_map();
}

impl DataType {
    pub fn from_postgres_type(type_name: &str) -> Result<Self, ModelError> {
        if let Some(base) = Self::postgres_array_base(type_name) {
            let element = Self::from_postgres_type(base)?;
            return Ok(DataType::Array(Box::new(element)));
        }

        let normalized = Self::normalize_type_name(type_name);
        POSTGRES_TYPE_MAP
            .get(normalized.as_str())
            .cloned()
            .ok_or_else(|| ModelError::UnknownType(type_name.to_string()))
    }

    pub fn postgres_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::Json => Cow::Borrowed("JSONB"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMPTZ"),
            DataType::Null => Cow::Borrowed("NULL"),
            DataType::Array(element) => Cow::Owned(format!("{}[]", element.postgres_name())),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(_))
    }

    /// Innermost element type of an array, or the type itself for scalars.
    pub fn element_type(&self) -> &DataType {
        match self {
            DataType::Array(element) => element.element_type(),
            other => other,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Short | DataType::Int | DataType::Long)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::String | DataType::VarChar | DataType::Char)
    }

    fn normalize_type_name(type_name: &str) -> String {
        type_name.trim().to_uppercase()
    }

    fn postgres_array_base(type_name: &str) -> Option<&str> {
        let trimmed = type_name.trim();
        let base = if let Some(base) = trimmed.strip_prefix('_') {
            base
        } else if let Some(base) = trimmed.strip_suffix("[]") {
            base
        } else {
            return None;
        };

        let base = base.trim();
        (!base.is_empty()).then_some(base)
    }
}

impl TryFrom<&str> for DataType {
    type Error = ModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        DataType::from_postgres_type(s)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.postgres_name())
    }
}

fn build_postgres_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("SMALLINT", Short),
        ("INT2", Short),
        ("INTEGER", Int),
        ("INT", Int),
        ("INT4", Int),
        ("SERIAL", Int),
        ("OID", Int),
        ("INT8", Long),
        ("BIGINT", Long),
        ("BIGSERIAL", Long),
        ("FLOAT4", Float),
        ("REAL", Float),
        ("FLOAT8", Double),
        ("DOUBLE PRECISION", Double),
        ("JSONB", Json),
        ("JSON", Json),
        ("TEXT", String),
        ("NAME", String),
        ("CHARACTER VARYING", VarChar),
        ("VARCHAR", VarChar),
        ("CHARACTER", Char),
        ("CHAR", Char),
        ("BPCHAR", Char),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("TIMESTAMP WITH TIME ZONE", Timestamp),
        ("TIMESTAMPTZ", Timestamp),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(DataType::from_postgres_type("int4").unwrap(), DataType::Int);
        assert_eq!(DataType::from_postgres_type(" jsonb ").unwrap(), DataType::Json);
        assert_eq!(
            DataType::from_postgres_type("timestamptz").unwrap(),
            DataType::Timestamp
        );
    }

    #[test]
    fn test_parse_array_types() {
        let expected = DataType::Array(Box::new(DataType::Int));
        assert_eq!(DataType::from_postgres_type("_int4").unwrap(), expected);
        assert_eq!(DataType::from_postgres_type("integer[]").unwrap(), expected);
        assert_eq!(expected.postgres_name(), "INTEGER[]");
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = DataType::from_postgres_type("tsvector").unwrap_err();
        assert!(matches!(err, ModelError::UnknownType(name) if name == "tsvector"));
        assert!(DataType::from_postgres_type("[]").is_err());
    }
}
