use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown column type: {0}")]
    UnknownType(String),

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },
}
