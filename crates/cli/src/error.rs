use connectors::sql::base::error::{ConnectorError, CopyError, DbError};
use model::core::errors::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid column type: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to build COPY rows: {0}")]
    Copy(#[from] CopyError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Connection failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No connection string: pass --conn-str or set {0}")]
    MissingConnection(&'static str),

    #[error("Invalid input at line {line}: {reason}")]
    InvalidInput { line: usize, reason: String },
}
