use crate::sql::base::{
    copy_options::CopyOptions,
    error::{ConnectorError, DbError},
};
use async_trait::async_trait;
use model::{
    core::{data_type::DataType, value::Value},
    records::row::RowData,
};
use tokio::io::AsyncRead;

#[async_trait]
pub trait SqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    // Exec / query
    async fn exec(&self, query: &str) -> Result<(), DbError>;
    async fn query_rows(&self, sql: &str) -> Result<Vec<RowData>, DbError>;
    async fn ping(&self) -> Result<(), DbError>;

    // Introspection
    async fn table_exists(&self, table: &str) -> Result<bool, DbError>;

    /// Column names and types of `table`, restricted to `columns` unless
    /// that list is empty.
    async fn column_types(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<(String, DataType)>, DbError>;

    // Bulk copy
    /// Streams COPY text rows from `reader` into `table` and returns the
    /// number of rows the server accepted.
    async fn copy_in(
        &self,
        table: &str,
        columns: &[String],
        reader: &mut (dyn AsyncRead + Send + Unpin),
        options: &CopyOptions,
    ) -> Result<u64, DbError>;

    /// Reads `table` back through COPY and decodes every row.
    async fn copy_out(
        &self,
        table: &str,
        columns: &[String],
        options: &CopyOptions,
    ) -> Result<Vec<Vec<Value>>, DbError>;
}
