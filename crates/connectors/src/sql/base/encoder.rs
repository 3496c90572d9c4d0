use crate::sql::base::error::DecodeError;
use model::core::{data_type::DataType, value::Value};

/// Provides database-specific text encoding for COPY style ingestion.
pub trait CopyValueEncoder {
    /// Encodes a concrete value into one field of a COPY row.
    fn encode_value(&self, value: &Value) -> String;

    /// Encodes a SQL NULL into its sentinel form (e.g. `\N`).
    fn encode_null(&self) -> String;

    /// Separator placed between fields of a row.
    fn delimiter(&self) -> char;

    /// Helper that encodes an optional value, delegating NULL handling.
    fn encode_optional(&self, value: Option<&Value>) -> String {
        match value {
            Some(v) => self.encode_value(v),
            None => self.encode_null(),
        }
    }

    /// Encodes a full row, without the line terminator.
    fn encode_row(&self, values: &[Value]) -> String {
        let mut line = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter());
            }
            line.push_str(&self.encode_value(value));
        }
        line
    }
}

/// Reads COPY rows produced by the matching [`CopyValueEncoder`] (or by the
/// server itself) back into values.
pub trait CopyValueDecoder {
    /// Decodes one raw (still escaped) field into a value of `data_type`.
    fn decode_field(&self, raw: &str, data_type: &DataType) -> Result<Value, DecodeError>;

    /// Splits a line into its raw fields, honouring escaped delimiters.
    fn split_line<'a>(&self, line: &'a str) -> Vec<&'a str>;

    /// Decodes a full row; `types` gives one column type per field.
    fn decode_line(&self, line: &str, types: &[DataType]) -> Result<Vec<Value>, DecodeError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields = self.split_line(line);

        if fields.len() != types.len() {
            return Err(DecodeError::ColumnCount {
                expected: types.len(),
                found: fields.len(),
            });
        }

        fields
            .into_iter()
            .zip(types)
            .map(|(raw, data_type)| self.decode_field(raw, data_type))
            .collect()
    }
}
