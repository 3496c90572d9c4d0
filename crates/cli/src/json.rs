//! Conversions between JSON documents and COPY values for the `encode` and
//! `dump` subcommands.

use chrono::SecondsFormat;
use connectors::sql::{base::error::DecodeError, postgres::decoder::PgCopyValueDecoder};
use model::core::{data_type::DataType, value::Value};
use serde_json::{Number, Value as JsonValue};

/// Converts one JSON cell into a value.
///
/// Without a column type the JSON shape decides: objects become JSON,
/// arrays become arrays, strings stay text. With a type, strings are parsed
/// the way the server would read them, so `"2024-05-01 12:00:00+00"` under
/// `timestamptz` becomes a timestamp.
pub fn json_to_value(json: &JsonValue, data_type: Option<&DataType>) -> Result<Value, DecodeError> {
    if let Some(DataType::Json) = data_type {
        return Ok(Value::Json(json.clone()));
    }

    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => Ok(number_value(n, data_type)),
        JsonValue::String(s) => match data_type {
            Some(dt) if !dt.is_text() => PgCopyValueDecoder::default().parse_text(s, dt),
            _ => Ok(Value::String(s.clone())),
        },
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                let item_type = if item.is_array() {
                    data_type
                } else {
                    data_type.map(DataType::element_type)
                };
                json_to_value(item, item_type)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        JsonValue::Object(_) => Ok(Value::Json(json.clone())),
    }
}

fn number_value(n: &Number, data_type: Option<&DataType>) -> Value {
    let wants_float = matches!(
        data_type.map(DataType::element_type),
        Some(DataType::Float | DataType::Double)
    );

    match n.as_i64() {
        Some(i) if !wants_float => Value::Int(i),
        _ => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Plain JSON rendering of a value; timestamps use RFC 3339 and
/// non-finite floats become strings.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(f.to_string())),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Json(json) => json.clone(),
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Timestamp(ts) => JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Null => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_untyped_cells_follow_json_shape() {
        assert_eq!(json_to_value(&json!(7), None).unwrap(), Value::Int(7));
        assert_eq!(json_to_value(&json!("eek"), None).unwrap(), Value::from("eek"));
        assert_eq!(json_to_value(&json!(null), None).unwrap(), Value::Null);
        assert_eq!(
            json_to_value(&json!([1, 2, 3]), None).unwrap(),
            Value::from(vec![1, 2, 3])
        );
        assert_eq!(
            json_to_value(&json!({"feels": "meh"}), None).unwrap(),
            Value::Json(json!({"feels": "meh"}))
        );
    }

    #[test]
    fn test_typed_strings_are_parsed() {
        let ts = json_to_value(&json!("2024-05-01 12:00:00+00"), Some(&DataType::Timestamp))
            .unwrap();
        assert_eq!(
            ts,
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );

        let array = json_to_value(
            &json!("{1,2}"),
            Some(&DataType::Array(Box::new(DataType::Int))),
        )
        .unwrap();
        assert_eq!(array, Value::from(vec![1, 2]));

        assert!(json_to_value(&json!("soon"), Some(&DataType::Timestamp)).is_err());
    }

    #[test]
    fn test_json_column_keeps_document() {
        let value = json_to_value(&json!([1, "two"]), Some(&DataType::Json)).unwrap();
        assert_eq!(value, Value::Json(json!([1, "two"])));
    }

    #[test]
    fn test_float_columns_widen_integers() {
        let value = json_to_value(&json!(2), Some(&DataType::Double)).unwrap();
        assert_eq!(value, Value::Float(2.0));
    }

    #[test]
    fn test_value_to_json() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let row = Value::Array(vec![
            Value::Int(1),
            Value::Null,
            Value::Timestamp(ts),
            Value::Float(f64::INFINITY),
        ]);
        assert_eq!(
            value_to_json(&row),
            json!([1, null, "2024-05-01T12:00:00Z", "inf"])
        );
    }
}
