use crate::sql::base::error::CopyError;
use serde::{Deserialize, Serialize};

/// Field separator used when the caller does not pick one. Tab is the
/// server's own default for the text format and is always escaped inside
/// field data.
pub const DEFAULT_SEP: char = '\t';

/// Token standing for SQL NULL in a COPY row.
pub const DEFAULT_NULL: &str = "\\N";

/// Delimiter and null sentinel shared by the row encoder and the COPY
/// statement; both sides must agree or the server misreads the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyOptions {
    pub delimiter: char,
    pub null: String,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_SEP,
            null: DEFAULT_NULL.to_string(),
        }
    }
}

impl CopyOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_null(mut self, null: impl Into<String>) -> Self {
        self.null = null.into();
        self
    }

    /// Applies the server's restrictions for text-format COPY.
    pub fn validate(&self) -> Result<(), CopyError> {
        let delimiter = self.delimiter;

        if !delimiter.is_ascii() {
            return Err(CopyError::InvalidOptions(format!(
                "delimiter {delimiter:?} must be a single one-byte character"
            )));
        }

        if matches!(delimiter, '\r' | '\n' | '\\' | '.')
            || delimiter.is_ascii_lowercase()
            || delimiter.is_ascii_digit()
        {
            return Err(CopyError::InvalidOptions(format!(
                "delimiter {delimiter:?} is not allowed in text format"
            )));
        }

        if self.null.is_empty() {
            return Err(CopyError::InvalidOptions(
                "null sentinel cannot be empty, it would read like an empty string".to_string(),
            ));
        }

        if self.null.contains(['\r', '\n']) {
            return Err(CopyError::InvalidOptions(
                "null sentinel cannot contain newline or carriage return".to_string(),
            ));
        }

        if self.null.contains(delimiter) {
            return Err(CopyError::InvalidOptions(format!(
                "null sentinel {:?} contains the delimiter {delimiter:?}",
                self.null
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let options = CopyOptions::default();
        assert_eq!(options.delimiter, DEFAULT_SEP);
        assert_eq!(options.null, DEFAULT_NULL);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_pipe_delimiter_is_valid() {
        assert!(CopyOptions::default().with_delimiter('|').validate().is_ok());
    }

    #[test]
    fn test_rejected_delimiters() {
        for delimiter in ['\n', '\r', '\\', '.', 'a', '7', 'é'] {
            let options = CopyOptions::default().with_delimiter(delimiter);
            assert!(
                matches!(options.validate(), Err(CopyError::InvalidOptions(_))),
                "delimiter {delimiter:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_null_cannot_contain_delimiter() {
        let options = CopyOptions::default().with_delimiter('|').with_null("a|b");
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_null_cannot_be_empty() {
        let options = CopyOptions::default().with_null("");
        assert!(matches!(
            options.validate(),
            Err(CopyError::InvalidOptions(_))
        ));
        assert!(CopyOptions::default().with_null("<null>").validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let options: CopyOptions = serde_json::from_str(r#"{"delimiter": "|"}"#).unwrap();
        assert_eq!(options.delimiter, '|');
        assert_eq!(options.null, DEFAULT_NULL);
    }
}
