#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use model::{copy_record, core::value::Value, records::row::RowData};
use serde_json::json;

/// DDL of the table most tests load into.
pub const EEK_TABLE_DDL: &str = r#"
    CREATE TABLE {table} (
        id serial PRIMARY KEY,
        label text NOT NULL,
        data jsonb,
        lista int[],
        created_ts timestamptz
    );
"#;

/// Same shape as `EEK_TABLE_DDL` with a two-dimensional array column.
pub const GRID_TABLE_DDL: &str = r#"
    CREATE TABLE {table} (
        id serial PRIMARY KEY,
        label text NOT NULL,
        grid int[][],
        tags text[],
        score double precision
    );
"#;

pub const EEK_COLUMNS: [&str; 4] = ["label", "data", "lista", "created_ts"];

/// A row type for `EEK_TABLE_DDL`, serialized through `copy_record!`.
#[derive(Debug, Clone)]
pub struct Eek {
    pub id: Option<i64>,
    pub label: String,
    pub data: Option<serde_json::Value>,
    pub lista: Option<Vec<i32>>,
    pub created_ts: DateTime<Utc>,
}

copy_record!(Eek, "eek", [id, label, data, lista, created_ts]);

pub fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Timestamps carry whole microseconds so they survive `timestamptz`.
pub fn ts(secs_offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        + chrono::Duration::seconds(secs_offset)
        + chrono::Duration::microseconds(250_125)
}

pub fn eek_rows() -> Vec<Vec<Value>> {
    vec![
        vec![
            Value::from("label-1"),
            Value::Json(json!({"type": "rulebook", "data": {"ruleset": "ruleset-1"}})),
            Value::Null,
            Value::Timestamp(ts(0)),
        ],
        vec![
            Value::from("label-2"),
            Value::Null,
            Value::from(vec![1, 2, 3, 4]),
            Value::Timestamp(ts(60)),
        ],
    ]
}

pub fn eek_records() -> Vec<Eek> {
    vec![
        Eek {
            id: None,
            label: "eek\twith\ttabs".to_string(),
            data: Some(json!({"feels": "meh"})),
            lista: Some(vec![7]),
            created_ts: ts(0),
        },
        Eek {
            id: None,
            label: r"back\slash and \N".to_string(),
            data: None,
            lista: None,
            created_ts: ts(1),
        },
    ]
}

/// Fetch `columns` of every row of `table`, ordered by id.
pub async fn fetch_rows(adapter: &PgAdapter, table: &str, columns: &[&str]) -> Vec<RowData> {
    let sql = format!("SELECT {} FROM {table} ORDER BY id", columns.join(", "));
    adapter.query_rows(&sql).await.expect("fetch rows")
}

/// Rows as plain value lists, NULL columns as `Value::Null`.
pub fn row_values(rows: &[RowData], columns: &[&str]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| columns.iter().map(|col| row.get_value(col)).collect())
        .collect()
}

pub async fn row_count(adapter: &PgAdapter, table: &str) -> i64 {
    let rows = adapter
        .query_rows(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .await
        .expect("count rows");
    rows[0].get_value("n").as_i64().expect("count is an integer")
}
