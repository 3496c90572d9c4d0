use crate::sql::{
    base::{copy_options::CopyOptions, encoder::CopyValueDecoder, error::DecodeError},
    postgres::array::{ArrayNode, parse_array_literal},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use model::core::{data_type::DataType, utils::unescape_copy_text, value::Value};

const TIMESTAMP_TZ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const TIMESTAMP_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, Default)]
pub struct PgCopyValueDecoder {
    options: CopyOptions,
}

impl PgCopyValueDecoder {
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Types already-unescaped text according to `data_type`.
    pub fn parse_text(&self, text: &str, data_type: &DataType) -> Result<Value, DecodeError> {
        match data_type {
            DataType::Array(_) => {
                let nodes = parse_array_literal(text)?;
                let element = data_type.element_type();
                Ok(Value::Array(self.type_nodes(nodes, element)?))
            }
            _ => parse_scalar(text, data_type),
        }
    }

    fn type_nodes(
        &self,
        nodes: Vec<ArrayNode>,
        element: &DataType,
    ) -> Result<Vec<Value>, DecodeError> {
        nodes
            .into_iter()
            .map(|node| match node {
                ArrayNode::Null => Ok(Value::Null),
                ArrayNode::Item(text) => parse_scalar(&text, element),
                ArrayNode::Array(inner) => Ok(Value::Array(self.type_nodes(inner, element)?)),
            })
            .collect()
    }
}

impl CopyValueDecoder for PgCopyValueDecoder {
    fn decode_field(&self, raw: &str, data_type: &DataType) -> Result<Value, DecodeError> {
        if raw == self.options.null {
            return Ok(Value::Null);
        }
        let text = unescape_copy_text(raw)
            .map_err(|e| DecodeError::invalid_value(data_type, raw, e))?;
        self.parse_text(&text, data_type)
    }

    fn split_line<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let delimiter = self.options.delimiter;
        let mut fields = Vec::new();
        let mut start = 0;
        let mut escaped = false;

        for (idx, ch) in line.char_indices() {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delimiter {
                fields.push(&line[start..idx]);
                start = idx + ch.len_utf8();
            }
        }

        fields.push(&line[start..]);
        fields
    }
}

fn parse_scalar(text: &str, data_type: &DataType) -> Result<Value, DecodeError> {
    match data_type {
        t if t.is_integer() => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| DecodeError::invalid_value(t, text, e)),
        DataType::Float | DataType::Double => parse_float(text)
            .map(Value::Float)
            .ok_or_else(|| DecodeError::invalid_value(data_type, text, "not a number")),
        DataType::Boolean => parse_bool(text)
            .map(Value::Boolean)
            .ok_or_else(|| DecodeError::invalid_value(data_type, text, "not a boolean")),
        DataType::Json => serde_json::from_str(text)
            .map(Value::Json)
            .map_err(|e| DecodeError::invalid_value(data_type, text, e)),
        DataType::Timestamp => parse_timestamp(text)
            .map(Value::Timestamp)
            .ok_or_else(|| DecodeError::invalid_value(data_type, text, "unrecognised timestamp")),
        DataType::Array(_) => Err(DecodeError::invalid_value(
            data_type,
            text,
            "arrays are not scalar",
        )),
        _ => Ok(Value::String(text.to_string())),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text.trim() {
        t if t.eq_ignore_ascii_case("NaN") => Some(f64::NAN),
        t if t.eq_ignore_ascii_case("Infinity") || t.eq_ignore_ascii_case("+Infinity") => {
            Some(f64::INFINITY)
        }
        t if t.eq_ignore_ascii_case("-Infinity") => Some(f64::NEG_INFINITY),
        t => t.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in TIMESTAMP_TZ_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    TIMESTAMP_NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
