use std::string::FromUtf8Error;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Low‐level I/O failure, e.g. reading the COPY payload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any error reported by the server or the driver, including rejected
    /// COPY data.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// UTF-8 decoding failed on some byte data.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// The rows or options handed to a COPY were unusable.
    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),

    /// Text coming back from the server did not decode.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}

/// Errors raised while preparing COPY rows on the client side.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Invalid COPY options: {0}")]
    InvalidOptions(String),

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Row has {found} values but {expected} columns were given")]
    ColumnMismatch { expected: usize, found: usize },
}

/// Errors raised while turning COPY text back into values.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Expected {expected} fields, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Invalid {data_type} value '{value}': {reason}")]
    InvalidValue {
        data_type: String,
        value: String,
        reason: String,
    },

    #[error("Malformed array literal '{literal}': {reason}")]
    InvalidArray { literal: String, reason: String },
}

impl DecodeError {
    pub(crate) fn invalid_value(
        data_type: &model::core::data_type::DataType,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        DecodeError::InvalidValue {
            data_type: data_type.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
