use crate::sql::{
    base::{copy_options::CopyOptions, encoder::CopyValueEncoder},
    postgres::array::encode_array_literal,
};
use chrono::{DateTime, SubsecRound, Timelike, Utc};
use model::core::{utils::escape_copy_text, value::Value};

/// Timestamps with a fractional part: `2024-05-01 12:00:00.123456+00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// Same as [`TIMESTAMP_FORMAT`] for whole seconds.
pub const TIMESTAMP_SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Clone, Default)]
pub struct PgCopyValueEncoder {
    options: CopyOptions,
}

impl PgCopyValueEncoder {
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Unescaped text of a non-null value. Arrays come out as a complete
    /// array literal.
    pub fn value_text(value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format_float(*v),
            Value::Boolean(v) => v.to_string(),
            Value::String(s) => s.clone(),
            Value::Json(v) => v.to_string(),
            Value::Array(items) => encode_array_literal(items),
            Value::Timestamp(ts) => format_timestamp(ts),
            Value::Null => String::new(),
        }
    }
}

impl CopyValueEncoder for PgCopyValueEncoder {
    fn encode_value(&self, value: &Value) -> String {
        match value {
            Value::Null => self.encode_null(),
            other => {
                let text = Self::value_text(other);
                let escaped = escape_copy_text(&text, self.options.delimiter);
                if escaped == self.options.null {
                    escape_leading_char(&text, self.options.delimiter)
                } else {
                    escaped
                }
            }
        }
    }

    fn encode_null(&self) -> String {
        self.options.null.clone()
    }

    fn delimiter(&self) -> char {
        self.options.delimiter
    }
}

pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        ryu::Buffer::new().format_finite(value).to_string()
    }
}

/// Escapes `text` with its first character spelled as octal bytes, so a
/// value that reads exactly like the null sentinel still loads as text.
fn escape_leading_char(text: &str, delimiter: char) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut utf8 = [0u8; 4];
    let mut out: String = first
        .encode_utf8(&mut utf8)
        .bytes()
        .map(|byte| format!("\\{byte:03o}"))
        .collect();
    out.push_str(&escape_copy_text(chars.as_str(), delimiter));
    out
}

/// The server keeps microseconds, so anything finer is truncated here
/// rather than rounded on load.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let ts = ts.trunc_subsecs(6);
    let format = if ts.nanosecond() == 0 {
        TIMESTAMP_SECONDS_FORMAT
    } else {
        TIMESTAMP_FORMAT
    };
    ts.format(format).to_string()
}
