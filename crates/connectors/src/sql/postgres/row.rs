use chrono::{DateTime, NaiveDateTime, Utc};
use core::fmt;
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use std::fmt::Formatter;
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Json as PgJson},
};
use tracing::warn;

/// Reads a driver row into [`RowData`], choosing the Rust type from each
/// column's declared Postgres type.
pub struct PgRowReader<'a>(pub &'a PgRow);

impl PgRowReader<'_> {
    pub fn to_row_data(&self, table: &str) -> RowData {
        let columns = self
            .0
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let type_name = column.type_().name();
                let data_type = DataType::from_postgres_type(type_name).unwrap_or_else(|_| {
                    warn!("Unknown column type: {}", type_name);
                    DataType::String
                });

                FieldValue {
                    name: column.name().to_string(),
                    value: self.get_value(&data_type, idx),
                    data_type,
                }
            })
            .collect();

        RowData::new(table, columns)
    }

    pub fn get_value(&self, data_type: &DataType, idx: usize) -> Option<Value> {
        match data_type {
            DataType::Short => self.try_get::<i16>(idx).map(|v| Value::Int(v.into())),
            DataType::Int => self.try_get::<i32>(idx).map(|v| Value::Int(v.into())),
            DataType::Long => self.try_get::<i64>(idx).map(Value::Int),
            DataType::Float => self.try_get::<f32>(idx).map(|v| Value::Float(v.into())),
            DataType::Double => self.try_get::<f64>(idx).map(Value::Float),
            DataType::Boolean => self.try_get::<bool>(idx).map(Value::Boolean),
            DataType::String | DataType::VarChar | DataType::Char => {
                self.try_get::<String>(idx).map(Value::String)
            }
            DataType::Json => self.try_get_json(idx).map(Value::Json),
            DataType::Timestamp => self.try_get_timestamp(idx).map(Value::Timestamp),
            DataType::Array(element) => self.try_get_array(element, idx).map(Value::Array),
            DataType::Null => None,
        }
    }

    fn try_get<'r, T: FromSql<'r>>(&'r self, idx: usize) -> Option<T> {
        self.0.try_get::<_, Option<T>>(idx).ok().flatten()
    }

    fn try_get_json(&self, idx: usize) -> Option<serde_json::Value> {
        self.try_get::<PgJson<serde_json::Value>>(idx)
            .map(|json| json.0)
    }

    fn try_get_timestamp(&self, idx: usize) -> Option<DateTime<Utc>> {
        self.try_get::<DateTime<Utc>>(idx).or_else(|| {
            self.try_get::<NaiveDateTime>(idx)
                .map(|naive| naive.and_utc())
        })
    }

    /// One-dimensional arrays only; the driver refuses multi-dimensional
    /// ones, which come back as `None` with a warning.
    fn try_get_array(&self, element: &DataType, idx: usize) -> Option<Vec<Value>> {
        let result = match element {
            DataType::Short => self.array_of::<i16>(idx, |v| Value::Int(v.into())),
            DataType::Int => self.array_of::<i32>(idx, |v| Value::Int(v.into())),
            DataType::Long => self.array_of::<i64>(idx, Value::Int),
            DataType::Float => self.array_of::<f32>(idx, |v| Value::Float(v.into())),
            DataType::Double => self.array_of::<f64>(idx, Value::Float),
            DataType::Boolean => self.array_of::<bool>(idx, Value::Boolean),
            DataType::String | DataType::VarChar | DataType::Char => {
                self.array_of::<String>(idx, Value::String)
            }
            DataType::Json => {
                self.array_of::<PgJson<serde_json::Value>>(idx, |json| Value::Json(json.0))
            }
            DataType::Timestamp => self.array_of::<DateTime<Utc>>(idx, Value::Timestamp),
            DataType::Array(_) | DataType::Null => Ok(None),
        };

        result.unwrap_or_else(|err| {
            warn!(
                "Could not read array column {} as {}[]: {}",
                self.0.columns()[idx].name(),
                element,
                err
            );
            None
        })
    }

    fn array_of<'r, T: FromSql<'r>>(
        &'r self,
        idx: usize,
        wrap: impl Fn(T) -> Value,
    ) -> Result<Option<Vec<Value>>, tokio_postgres::Error> {
        let items = self.0.try_get::<_, Option<Vec<Option<T>>>>(idx)?;
        Ok(items.map(|items| {
            items
                .into_iter()
                .map(|item| item.map_or(Value::Null, &wrap))
                .collect()
        }))
    }
}

impl fmt::Debug for PgRowReader<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
