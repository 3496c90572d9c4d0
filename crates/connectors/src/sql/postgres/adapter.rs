use crate::sql::{
    base::{
        adapter::SqlAdapter,
        copy_options::CopyOptions,
        encoder::CopyValueDecoder,
        error::{ConnectorError, CopyError, DbError},
    },
    postgres::{
        copy::CopyBuffer, decoder::PgCopyValueDecoder, row::PgRowReader, utils::connect_client,
    },
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt, pin_mut};
use model::{
    core::{data_type::DataType, value::Value},
    records::row::RowData,
};
use planner::query::{
    ast::{
        common::TableRef,
        copy::{CopyDirection, CopyEndpoint},
    },
    builder::copy::CopyBuilder,
    dialect::{self, Dialect},
    renderer::{Renderer, render_sql},
};
use std::sync::Arc;
use tokio::{
    io::AsyncRead,
    sync::{RwLock, RwLockWriteGuard},
};
use tokio_postgres::Client;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Size of the chunks read from a COPY source before they are sent.
const COPY_CHUNK_SIZE: usize = 64 * 1024;

const QUERY_TABLE_EXISTS_SQL: &str = "SELECT to_regclass($1) IS NOT NULL";

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Client>>,
    dialect: dialect::Postgres,
}

impl PgAdapter {
    pub fn from_client(client: Client) -> Self {
        PgAdapter {
            client: Arc::new(RwLock::new(client)),
            dialect: dialect::Postgres,
        }
    }

    pub async fn lock_client(&self) -> RwLockWriteGuard<'_, Client> {
        self.client.write().await
    }

    /// Streams a COPY text payload into `table`.
    ///
    /// `reader` must hold rows encoded with the same `options`; the number
    /// of rows the server stored is returned. Rows the server rejects fail
    /// the whole COPY with [`DbError::Sql`] and nothing is stored.
    pub async fn copy_to_table<R>(
        &self,
        table: &str,
        columns: &[String],
        mut reader: R,
        options: &CopyOptions,
    ) -> Result<u64, DbError>
    where
        R: AsyncRead + Send + Unpin,
    {
        self.copy_in(table, columns, &mut reader, options).await
    }

    /// Encodes `rows` and loads them in a single COPY.
    pub async fn copy_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
        options: &CopyOptions,
    ) -> Result<u64, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let buffer = encode_rows(columns, rows, options)?;
        debug!(table, rows = buffer.rows(), "Encoded COPY payload");
        self.copy_to_table(table, columns, buffer.as_bytes(), options)
            .await
    }

    fn select_statement(&self, table: &str, columns: &[String]) -> String {
        let mut renderer = Renderer::new(&self.dialect);
        renderer.render_table_ref(&TableRef::from_qualified(table));
        let table = renderer.finish();

        let projection = if columns.is_empty() {
            "*".to_string()
        } else {
            columns
                .iter()
                .map(|col| self.dialect.quote_identifier(col))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!("SELECT {projection} FROM {table}")
    }
}

/// Encodes `rows` for a COPY over `columns`. With no columns listed the
/// COPY covers the whole table, so only the rows' agreement with each
/// other is checked.
pub(crate) fn encode_rows(
    columns: &[String],
    rows: &[Vec<Value>],
    options: &CopyOptions,
) -> Result<CopyBuffer, CopyError> {
    let mut buffer = CopyBuffer::new(options.clone())?;
    for row in rows {
        if !columns.is_empty() && row.len() != columns.len() {
            return Err(CopyError::ColumnMismatch {
                expected: columns.len(),
                found: row.len(),
            });
        }
        buffer.push_row(row)?;
    }
    Ok(buffer)
}

/// Renders a text-format COPY for `table`, reading from STDIN or writing to
/// STDOUT depending on `direction`.
pub(crate) fn copy_statement(
    dialect: &dyn Dialect,
    table: &str,
    columns: &[String],
    direction: CopyDirection,
    options: &CopyOptions,
) -> String {
    let endpoint = match direction {
        CopyDirection::From => CopyEndpoint::Stdin,
        CopyDirection::To => CopyEndpoint::Stdout,
    };

    let copy = CopyBuilder::new(TableRef::from_qualified(table))
        .columns(columns)
        .direction(direction)
        .endpoint(endpoint)
        .option("FORMAT", Some("text"))
        .literal_option("DELIMITER", &options.delimiter.to_string())
        .literal_option("NULL", &options.null)
        .build();

    render_sql(&copy, dialect)
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(PgAdapter::from_client(client))
    }

    async fn exec(&self, query: &str) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.batch_execute(query).await?;
        Ok(())
    }

    async fn query_rows(&self, sql: &str) -> Result<Vec<RowData>, DbError> {
        let client = self.client.read().await;
        let rows = client.query(sql, &[]).await?;
        let result = rows
            .iter()
            .map(|row| PgRowReader(row).to_row_data(""))
            .collect();
        Ok(result)
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool, DbError> {
        let client = self.client.read().await;
        let row = client.query_one(QUERY_TABLE_EXISTS_SQL, &[&table]).await?;
        Ok(row.get(0))
    }

    async fn column_types(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<(String, DataType)>, DbError> {
        let sql = self.select_statement(table, columns);
        let client = self.client.read().await;
        let statement = client.prepare(&sql).await?;

        let types = statement
            .columns()
            .iter()
            .map(|column| {
                let type_name = column.type_().name();
                let data_type = DataType::from_postgres_type(type_name).unwrap_or_else(|_| {
                    warn!("Unknown column type: {}, reading as text", type_name);
                    DataType::String
                });
                (column.name().to_string(), data_type)
            })
            .collect();

        Ok(types)
    }

    async fn copy_in(
        &self,
        table: &str,
        columns: &[String],
        reader: &mut (dyn AsyncRead + Send + Unpin),
        options: &CopyOptions,
    ) -> Result<u64, DbError> {
        options.validate()?;

        let statement =
            copy_statement(&self.dialect, table, columns, CopyDirection::From, options);
        debug!("Executing COPY statement: {}", statement);

        let client = self.client.read().await;
        let sink = client.copy_in::<str, Bytes>(statement.as_str()).await?;
        pin_mut!(sink);

        let mut chunks = ReaderStream::with_capacity(reader, COPY_CHUNK_SIZE);
        while let Some(chunk) = chunks.next().await {
            sink.as_mut().send(chunk?).await?;
        }

        let rows = sink.as_mut().finish().await?;
        info!(table, rows, "COPY into table finished");
        Ok(rows)
    }

    async fn copy_out(
        &self,
        table: &str,
        columns: &[String],
        options: &CopyOptions,
    ) -> Result<Vec<Vec<Value>>, DbError> {
        options.validate()?;

        let described = self.column_types(table, columns).await?;
        let (names, types): (Vec<String>, Vec<DataType>) = described.into_iter().unzip();

        let statement = copy_statement(&self.dialect, table, &names, CopyDirection::To, options);
        debug!("Executing COPY statement: {}", statement);

        let decoder = PgCopyValueDecoder::new(options.clone());
        let client = self.client.read().await;
        let stream = client.copy_out(statement.as_str()).await?;
        pin_mut!(stream);

        let mut rows = Vec::new();
        let mut pending = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            pending.extend_from_slice(&chunk?);
            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line = pending.split_to(pos + 1);
                let text = String::from_utf8(line.to_vec())?;
                rows.push(decoder.decode_line(&text, &types)?);
            }
        }

        if !pending.is_empty() {
            let text = String::from_utf8(pending.to_vec())?;
            rows.push(decoder.decode_line(&text, &types)?);
        }

        info!(table, rows = rows.len(), "COPY out of table finished");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_copy_in_statement_default_options() {
        let sql = copy_statement(
            &dialect::Postgres,
            "eek",
            &columns(&["label", "data"]),
            CopyDirection::From,
            &CopyOptions::default(),
        );
        assert_eq!(
            sql,
            r#"COPY "eek" ("label", "data") FROM STDIN WITH (FORMAT text, DELIMITER E'\t', NULL E'\\N')"#
        );
    }

    #[test]
    fn test_copy_out_statement_qualified_table_and_pipe() {
        let options = CopyOptions::default().with_delimiter('|');
        let sql = copy_statement(
            &dialect::Postgres,
            "public.eek",
            &columns(&["label"]),
            CopyDirection::To,
            &options,
        );
        assert!(sql.starts_with(r#"COPY "public"."eek" ("label") TO STDOUT"#));
        assert!(sql.contains("DELIMITER E'|'"));
    }

    #[test]
    fn test_encode_rows_without_columns_covers_whole_rows() {
        let rows = vec![
            vec![Value::Int(1), Value::from("eek"), Value::Null],
            vec![Value::Int(2), Value::from("ook"), Value::Boolean(true)],
        ];
        let buffer = encode_rows(&[], &rows, &CopyOptions::default()).unwrap();
        assert_eq!(buffer.rows(), 2);
        assert_eq!(buffer.as_bytes(), b"1\teek\t\\N\n2\took\ttrue\n");

        let ragged = vec![vec![Value::Int(1), Value::Null], vec![Value::Int(2)]];
        assert!(matches!(
            encode_rows(&[], &ragged, &CopyOptions::default()),
            Err(CopyError::ColumnMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_encode_rows_checks_listed_columns() {
        let rows = vec![vec![Value::from("only-label")]];
        let err = encode_rows(&columns(&["label", "data"]), &rows, &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CopyError::ColumnMismatch {
                expected: 2,
                found: 1
            }
        ));
    }
}
