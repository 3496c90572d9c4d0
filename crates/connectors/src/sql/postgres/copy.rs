//! Building COPY payloads: single rows, whole records, and an in-memory
//! buffer that can be streamed into `PgAdapter::copy_to_table`.

use crate::sql::{
    base::{copy_options::CopyOptions, encoder::CopyValueEncoder, error::CopyError},
    postgres::encoder::PgCopyValueEncoder,
};
use bytes::{BufMut, Bytes, BytesMut};
use model::{core::value::Value, records::record::CopyRecord};
use std::io;

/// Encodes one row as a COPY line, without the terminating newline.
pub fn copyfy_values(values: &[Value], options: &CopyOptions) -> String {
    PgCopyValueEncoder::new(options.clone()).encode_row(values)
}

/// Serialization of a whole record as one COPY row.
pub trait Copyfy: CopyRecord {
    /// Encodes every concrete field in column order, or only `fields` in
    /// the order given.
    fn copyfy(&self, options: &CopyOptions, fields: Option<&[&str]>) -> Result<String, CopyError> {
        let values = record_values(self, fields)?;
        Ok(copyfy_values(&values, options))
    }
}

impl<T: CopyRecord + ?Sized> Copyfy for T {}

fn record_values<R: CopyRecord + ?Sized>(
    record: &R,
    fields: Option<&[&str]>,
) -> Result<Vec<Value>, CopyError> {
    let names = match fields {
        Some(fields) => fields.to_vec(),
        None => record.concrete_fields(),
    };

    names
        .into_iter()
        .map(|field| {
            record
                .field_value(field)
                .ok_or_else(|| CopyError::UnknownField {
                    entity: record.entity().to_string(),
                    field: field.to_string(),
                })
        })
        .collect()
}

/// In-memory COPY payload, one encoded row per line.
///
/// Rows can be pushed already typed, or written as text through
/// [`io::Write`]; either way the same options must be handed to the COPY
/// that consumes the buffer.
#[derive(Debug, Clone)]
pub struct CopyBuffer {
    encoder: PgCopyValueEncoder,
    data: BytesMut,
    rows: usize,
    width: Option<usize>,
}

impl CopyBuffer {
    pub fn new(options: CopyOptions) -> Result<Self, CopyError> {
        options.validate()?;
        Ok(Self {
            encoder: PgCopyValueEncoder::new(options),
            data: BytesMut::new(),
            rows: 0,
            width: None,
        })
    }

    pub fn options(&self) -> &CopyOptions {
        self.encoder.options()
    }

    /// Appends a typed row. Every row must carry the same number of values.
    pub fn push_row(&mut self, values: &[Value]) -> Result<(), CopyError> {
        match self.width {
            Some(expected) if expected != values.len() => {
                return Err(CopyError::ColumnMismatch {
                    expected,
                    found: values.len(),
                });
            }
            None => self.width = Some(values.len()),
            _ => {}
        }

        let line = self.encoder.encode_row(values);
        self.push_line(&line);
        Ok(())
    }

    pub fn push_record<R: CopyRecord + ?Sized>(
        &mut self,
        record: &R,
        fields: Option<&[&str]>,
    ) -> Result<(), CopyError> {
        let values = record_values(record, fields)?;
        self.push_row(&values)
    }

    /// Appends a line that is already in COPY text form.
    pub fn push_line(&mut self, line: &str) {
        let line = line.strip_suffix('\n').unwrap_or(line);
        self.data.put_slice(line.as_bytes());
        self.data.put_u8(b'\n');
        self.rows += 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

impl io::Write for CopyBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.rows += buf.iter().filter(|b| **b == b'\n').count();
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::copy_options::{DEFAULT_NULL, DEFAULT_SEP};
    use chrono::{TimeZone, Utc};
    use model::copy_record;
    use serde_json::json;
    use std::io::Write;

    #[derive(Debug, Clone)]
    struct Project {
        id: Option<i64>,
        name: String,
        description: String,
        url: String,
        git_hash: String,
        import_state: String,
        import_error: Option<String>,
        created_at: chrono::DateTime<Utc>,
        modified_at: chrono::DateTime<Utc>,
    }

    copy_record!(
        Project,
        "core_project",
        [
            id,
            name,
            description,
            url,
            git_hash,
            import_state,
            import_error,
            created_at,
            modified_at
        ]
    );

    fn project() -> Project {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Project {
            id: None,
            name: "proj-1".to_string(),
            description: "test project".to_string(),
            url: String::new(),
            git_hash: String::new(),
            import_state: "pending".to_string(),
            import_error: None,
            created_at: now,
            modified_at: now,
        }
    }

    fn sample_values() -> Vec<Value> {
        vec![
            Value::Int(1),
            Value::from("eek"),
            Value::Null,
            Value::Json(json!({"feels": "meh"})),
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            Value::from(vec![1, 2, 3, 4]),
        ]
    }

    #[test]
    fn test_copyfy_values_default_separator() {
        let line = copyfy_values(&sample_values(), &CopyOptions::default());
        let fields: Vec<&str> = line.split(DEFAULT_SEP).collect();

        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[1], "eek");
        assert_eq!(fields[2], DEFAULT_NULL);
        assert_eq!(fields[3], r#"{"feels":"meh"}"#);
        assert_eq!(fields[4], "2024-05-01 12:00:00+00:00");
        assert_eq!(fields[5], "{1,2,3,4}");
    }

    #[test]
    fn test_copyfy_values_custom_separator() {
        let options = CopyOptions::default().with_delimiter('|');
        let line = copyfy_values(&sample_values(), &options);
        assert_eq!(line.split('|').count(), 6);
        assert!(!line.contains(DEFAULT_SEP));
    }

    #[test]
    fn test_copyfy_record_all_fields() {
        let p = project();
        let line = p.copyfy(&CopyOptions::default(), None).unwrap();
        let fields: Vec<&str> = line.split(DEFAULT_SEP).collect();
        assert_eq!(fields.len(), p.concrete_fields().len());
        assert_eq!(fields[0], DEFAULT_NULL);
        assert_eq!(fields[1], "proj-1");
    }

    #[test]
    fn test_copyfy_record_with_separator() {
        let p = project();
        let line = p
            .copyfy(&CopyOptions::default().with_delimiter('|'), None)
            .unwrap();
        assert_eq!(line.split('|').count(), p.concrete_fields().len());
    }

    #[test]
    fn test_copyfy_record_selected_fields() {
        let p = project();
        let line = p
            .copyfy(&CopyOptions::default(), Some(&["name", "description"][..]))
            .unwrap();
        assert_eq!(line, format!("proj-1{DEFAULT_SEP}test project"));
        assert!(!line.contains("2024"));
    }

    #[test]
    fn test_copyfy_record_unknown_field() {
        let err = project()
            .copyfy(&CopyOptions::default(), Some(&["name", "owner"][..]))
            .unwrap_err();
        assert!(matches!(
            err,
            CopyError::UnknownField { ref entity, ref field }
                if entity == "core_project" && field == "owner"
        ));
    }

    #[test]
    fn test_buffer_collects_rows() {
        let mut buffer = CopyBuffer::new(CopyOptions::default()).unwrap();
        assert!(buffer.is_empty());

        buffer.push_row(&sample_values()).unwrap();
        let fields = ["id", "name", "description", "url", "git_hash", "import_state"];
        buffer.push_record(&project(), Some(&fields[..])).unwrap();
        assert_eq!(buffer.rows(), 2);

        let text = String::from_utf8(buffer.as_bytes().to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_buffer_rejects_ragged_rows() {
        let mut buffer = CopyBuffer::new(CopyOptions::default()).unwrap();
        buffer.push_row(&[Value::Int(1), Value::Int(2)]).unwrap();
        let err = buffer.push_row(&[Value::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            CopyError::ColumnMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_buffer_accepts_written_lines() {
        let options = CopyOptions::default().with_delimiter('|');
        let mut buffer = CopyBuffer::new(options.clone()).unwrap();
        for values in [sample_values(), sample_values()] {
            writeln!(buffer, "{}", copyfy_values(&values, &options)).unwrap();
        }
        assert_eq!(buffer.rows(), 2);
        assert_eq!(buffer.into_bytes().iter().filter(|b| **b == b'\n').count(), 2);
    }

    #[test]
    fn test_buffer_validates_options() {
        let err = CopyBuffer::new(CopyOptions::default().with_delimiter('\n')).unwrap_err();
        assert!(matches!(err, CopyError::InvalidOptions(_)));
    }
}
