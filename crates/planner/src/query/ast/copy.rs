//! Defines the AST for SQL COPY statements.

use crate::query::ast::common::TableRef;

#[derive(Debug, Clone)]
pub struct Copy {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub direction: CopyDirection,
    pub endpoint: CopyEndpoint,
    pub options: Vec<CopyOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyDirection {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyEndpoint {
    Stdin,
    Stdout,
}

#[derive(Debug, Clone)]
pub struct CopyOption {
    pub key: String,
    pub value: Option<CopyOptionValue>,
}

/// Option values are either bare keywords (`FORMAT text`) or string
/// literals the dialect must quote (`DELIMITER E'\t'`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOptionValue {
    Keyword(String),
    Literal(String),
}
