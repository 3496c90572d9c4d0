use crate::core::value::Value;

/// Postgres object identifiers are plain 32-bit integers on the wire.
pub type Oid = i32;

/// A persisted entity whose columns can be written as one COPY row.
pub trait CopyRecord {
    /// Target table.
    fn entity(&self) -> &str;

    /// Persisted columns in table order, surrogate key first.
    fn concrete_fields(&self) -> Vec<&str>;

    /// Current value of a column, `None` if the record has no such column.
    fn field_value(&self, field: &str) -> Option<Value>;

    fn values(&self) -> Vec<Value> {
        self.concrete_fields()
            .into_iter()
            .map(|field| self.field_value(field).unwrap_or(Value::Null))
            .collect()
    }
}

/// Implements [`CopyRecord`] for a struct by listing its table and its
/// persisted fields in column order. Every listed field must convert into
/// [`Value`] through `Clone + Into<Value>`.
///
/// ```ignore
/// copy_record!(Project, "core_project", [id, name, description, created_at]);
/// ```
#[macro_export]
macro_rules! copy_record {
    ($ty:ty, $table:expr, [$($field:ident),+ $(,)?]) => {
        impl $crate::records::record::CopyRecord for $ty {
            fn entity(&self) -> &str {
                $table
            }

            fn concrete_fields(&self) -> Vec<&str> {
                vec![$(stringify!($field)),+]
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::value::Value> {
                match field {
                    $(stringify!($field) => Some(self.$field.clone().into()),)+
                    _ => None,
                }
            }
        }
    };
}
